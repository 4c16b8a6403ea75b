//! Collaborator traits
//!
//! These traits define the interface between the channel logic and the
//! hardware-specific pieces it drives: the pump outputs and the host link.

pub mod actuator;
pub mod transport;

pub use actuator::{ActuatorDriver, ChannelId, Direction};
pub use transport::Transport;
