//! Step scheduler
//!
//! Polls every channel once per tick, detects elapsed step durations and
//! clears completed steps.

pub mod step;

pub use step::{StepScheduler, TickReport};
