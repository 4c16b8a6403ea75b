//! Hardware driver implementations
//!
//! Concrete implementations of the collaborator traits defined in
//! pumpstep-core:
//!
//! - DC pump channel (PWM magnitude + direction pin) over embedded-hal 1.0
//! - Pump bank mapping channel ids onto pump channels

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_code)]

pub mod pump;

pub use pump::{DcPump, PumpBank, PumpError, PumpOutput};
