//! smartcap-cns: haptic feedback for SmartCap
//!
//! Alert levels map to vibration patterns that a background worker plays on a
//! motor driver. Drivers speak a 4-byte command protocol over any async byte
//! sink (serial port, socket, pipe).

pub mod config;
pub mod controller;
pub mod driver;
pub mod error;
pub mod pattern;

pub use config::HapticConfig;
pub use controller::HapticController;
pub use driver::{HapticDriver, LogHapticDriver, WriterHapticDriver};
pub use error::HapticError;
pub use pattern::{HapticCommand, HapticPattern, PulseStep};
