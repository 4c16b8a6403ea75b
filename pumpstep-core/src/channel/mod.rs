//! Channel data model
//!
//! One [`Channel`] per pump, created idle at startup and never destroyed.
//! Only the command handler and the step scheduler mutate channels.

pub mod group;
pub mod state;

pub use group::{ChannelGroup, GroupStatus};
pub use state::{Channel, ChannelEvent, ChannelPhase, Millis, StepRequest};
