//! Pump driver implementations
//!
//! Each pump is a brushed DC motor behind an H-bridge driver board: one PWM
//! output sets the magnitude and one GPIO selects the direction.

pub mod bank;
pub mod dc;

pub use bank::PumpBank;
pub use dc::{DcPump, PumpError, PumpOutput};
