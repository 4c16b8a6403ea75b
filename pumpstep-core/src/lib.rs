//! Board-agnostic core logic for the pump controller firmware
//!
//! This crate contains all application logic that does not depend on
//! specific hardware implementations:
//!
//! - Collaborator traits (actuator driver, transport)
//! - Channel state machine and channel group
//! - Step scheduler
//! - Command handler (busy guard, group-atomic step acceptance)
//! - Polling controller tying the above together
//! - Configuration type definitions

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_code)]

pub mod channel;
pub mod config;
pub mod controller;
pub mod error;
pub mod handler;
pub mod scheduler;
pub mod traits;

#[cfg(test)]
pub(crate) mod testing;

pub use controller::{PollOutcome, PumpController};
pub use error::CommandError;
