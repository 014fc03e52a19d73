//! Cooldown and deduplication of outgoing alerts

use crate::config::DispatchConfig;
use smartcap_core::{Alert, AlertKey};
use std::collections::VecDeque;
use std::time::{Duration, Instant};
use tracing::debug;

/// Owns the dispatch history. An alert passes when the cooldown since the
/// previous dispatch has elapsed and its `(category, message)` key is not
/// among the recent keys still inside the dedup window.
#[derive(Debug)]
pub struct DispatchGate {
    cooldown: Duration,
    dedup_window: Duration,
    history_size: usize,
    last_dispatch: Option<Instant>,
    recent: VecDeque<(AlertKey, Instant)>,
    last_alert: Option<Alert>,
}

impl DispatchGate {
    pub fn new(config: &DispatchConfig) -> Self {
        Self {
            cooldown: config.cooldown(),
            dedup_window: config.dedup_window(),
            history_size: config.history_size.max(1),
            last_dispatch: None,
            recent: VecDeque::with_capacity(config.history_size),
            last_alert: None,
        }
    }

    /// Let the alert through and record it, or suppress it
    pub fn gate(&mut self, alert: Alert, now: Instant) -> Option<Alert> {
        if let Some(last) = self.last_dispatch {
            if now.saturating_duration_since(last) < self.cooldown {
                debug!("Suppressed (cooldown): {}", alert.message);
                return None;
            }
        }

        let key = alert.key();
        let duplicate = self
            .recent
            .iter()
            .any(|(k, at)| *k == key && now.saturating_duration_since(*at) < self.dedup_window);
        if duplicate {
            debug!("Suppressed (duplicate): {}", alert.message);
            return None;
        }

        self.last_dispatch = Some(now);
        self.recent.push_back((key, now));
        while self.recent.len() > self.history_size {
            self.recent.pop_front();
        }
        self.last_alert = Some(alert.clone());
        Some(alert)
    }

    /// Most recently dispatched alert
    pub fn last_dispatched(&self) -> Option<&Alert> {
        self.last_alert.as_ref()
    }

    pub fn last_dispatch_at(&self) -> Option<Instant> {
        self.last_dispatch
    }

    /// Keys currently remembered, oldest first
    pub fn recent_keys(&self) -> impl Iterator<Item = &AlertKey> {
        self.recent.iter().map(|(key, _)| key)
    }
}

impl Default for DispatchGate {
    fn default() -> Self {
        Self::new(&DispatchConfig::default())
    }
}
