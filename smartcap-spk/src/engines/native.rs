//! Native platform TTS engine

use crate::config::SpeechConfig;
use crate::engines::TtsEngine;
use crate::error::SpeechError;
use async_trait::async_trait;
use tokio::process::Command;
use tracing::{debug, info, warn};

const MAX_TEXT_LEN: usize = 1_000;

/// Speech program found on this machine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Program {
    /// Linux
    EspeakNg,
    /// macOS
    Say,
}

impl Program {
    fn command(self) -> &'static str {
        match self {
            Program::EspeakNg => "espeak-ng",
            Program::Say => "say",
        }
    }
}

/// Native TTS engine (platform speech program)
pub struct NativeTtsEngine {
    program: Option<Program>,
}

impl NativeTtsEngine {
    /// Probe for the platform speech program. A missing program is not an
    /// error here; `is_available` reports it.
    pub fn new() -> Self {
        let program = detect_program();
        match program {
            Some(p) => info!("Native TTS engine initialized ({})", p.command()),
            None => warn!("No native TTS program found, speech will fail"),
        }
        Self { program }
    }

    fn build_command(program: Program, text: &str, config: &SpeechConfig) -> Command {
        let mut cmd = Command::new(program.command());
        match program {
            Program::EspeakNg => {
                cmd.arg("-s").arg(config.rate.to_string());

                // espeak-ng amplitude is 0-200, 100 is normal
                let amplitude = ((config.volume * 200.0).round() as u32).min(200);
                cmd.arg("-a").arg(amplitude.to_string());

                // espeak-ng pitch is 0-99, 50 is normal
                let pitch = ((50.0 + config.pitch * 49.0).round().max(0.0) as u32).min(99);
                cmd.arg("-p").arg(pitch.to_string());

                if let Some(voice) = &config.voice {
                    cmd.arg("-v").arg(voice);
                }
            }
            Program::Say => {
                cmd.arg("-r").arg(config.rate.to_string());
                if let Some(voice) = &config.voice {
                    cmd.arg("-v").arg(voice);
                }
            }
        }
        cmd.arg("--").arg(text);
        cmd.kill_on_drop(true);
        cmd
    }
}

impl Default for NativeTtsEngine {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl TtsEngine for NativeTtsEngine {
    async fn speak(&self, text: &str, config: &SpeechConfig) -> Result<(), SpeechError> {
        let program = self
            .program
            .ok_or_else(|| SpeechError::Engine("Native TTS engine not available".to_string()))?;

        let sanitized = sanitize_text(text);
        if sanitized.is_empty() {
            return Err(SpeechError::Synthesizer("Text is empty after sanitization".to_string()));
        }

        debug!("Speaking via {}: {}", program.command(), sanitized);
        let output = Self::build_command(program, &sanitized, config)
            .output()
            .await
            .map_err(|e| SpeechError::Engine(format!("Failed to run {}: {}", program.command(), e)))?;

        if !output.status.success() {
            return Err(SpeechError::Engine(format!(
                "{} failed: {}",
                program.command(),
                String::from_utf8_lossy(&output.stderr).trim()
            )));
        }
        Ok(())
    }

    fn is_available(&self) -> bool {
        self.program.is_some()
    }

    fn name(&self) -> &str {
        "native"
    }
}

fn detect_program() -> Option<Program> {
    let candidates: &[Program] = if cfg!(target_os = "macos") {
        &[Program::Say, Program::EspeakNg]
    } else {
        &[Program::EspeakNg]
    };

    candidates.iter().copied().find(|p| probe(*p))
}

fn probe(program: Program) -> bool {
    let mut cmd = std::process::Command::new(program.command());
    match program {
        Program::EspeakNg => {
            cmd.arg("--version");
        }
        // `say` has no version flag; listing voices is cheap and side-effect free
        Program::Say => {
            cmd.arg("-v").arg("?");
        }
    }
    cmd.output().map(|o| o.status.success()).unwrap_or(false)
}

/// Strip control and shell metacharacters, bound the length and collapse
/// whitespace so the text is safe to pass as a single argument.
pub fn sanitize_text(text: &str) -> String {
    let filtered: String = text
        .chars()
        .map(|c| if c == '\n' || c == '\r' || c == '\t' { ' ' } else { c })
        .filter(|c| {
            !c.is_control()
                && !matches!(c, ';' | '|' | '&' | '$' | '`' | '(' | ')' | '<' | '>' | '\\')
        })
        .take(MAX_TEXT_LEN)
        .collect();

    filtered.split_whitespace().collect::<Vec<_>>().join(" ")
}
