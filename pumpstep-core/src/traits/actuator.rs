//! Actuator driver trait
//!
//! A pump channel is driven with a speed magnitude and a direction.
//! The core never reads the output back; it only commands it.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Stable identifier of a pump channel (0..N-1)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ChannelId(pub u8);

impl ChannelId {
    /// Index into a channel array
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Pump rotation direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Direction {
    /// Forward flow
    #[default]
    Forward,
    /// Reverse flow
    Reverse,
}

impl Direction {
    /// Decode from the wire flag (`true` = forward)
    pub fn from_forward(forward: bool) -> Self {
        if forward {
            Direction::Forward
        } else {
            Direction::Reverse
        }
    }

    /// Encode as the wire flag
    pub fn is_forward(self) -> bool {
        self == Direction::Forward
    }
}

/// Pump output driver
///
/// Implementations must be idempotent: re-applying the same output, or
/// stopping an already stopped channel, has no further effect. Neither call
/// may block.
pub trait ActuatorDriver {
    /// Drive a channel at `speed` in `direction`
    ///
    /// Safe to call while the channel is already running; the new output
    /// replaces the old one.
    fn set_output(&mut self, channel: ChannelId, speed: u16, direction: Direction);

    /// Set a channel's output magnitude to zero
    fn stop(&mut self, channel: ChannelId);
}
