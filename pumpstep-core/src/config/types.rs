//! Configuration type definitions
//!
//! These types represent the controller configuration. The firmware build
//! parses them from TOML on the host and embeds them as postcard-serialized
//! binary data.

use heapless::{String, Vec};
use pumpstep_protocol::MAX_ARG_LEN;

use crate::traits::ChannelId;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Maximum pump channels per controller
pub const MAX_CHANNELS: usize = 4;

/// Maximum label length
pub const MAX_LABEL_LEN: usize = 16;

/// Maximum length of texts sent as a single protocol argument
pub const MAX_TEXT_LEN: usize = MAX_ARG_LEN;

/// Full-scale speed value used by the host software
pub const DEFAULT_MAX_SPEED: u16 = 4096;

/// Identifier returned to Watchdog requests
pub const DEFAULT_DEVICE_ID: &str = "0000000-0000-0000-0000-00000000001";

/// Acknowledge text sent once after startup
pub const DEFAULT_READY_MESSAGE: &str = "Pump controller ready";

const DEFAULT_LABELS: [&str; MAX_CHANNELS] = ["A", "B", "C", "D"];

/// Configuration errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigError {
    /// Configured channels do not match the firmware's channel count
    ChannelCountMismatch { configured: u8, expected: u8 },
    /// Maximum speed must be non-zero
    ZeroMaxSpeed,
    /// Device identifier must not be empty
    EmptyDeviceId,
}

/// Per-channel configuration
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ChannelConfig {
    /// Human-readable label
    pub label: String<MAX_LABEL_LEN>,
    /// Swap forward/reverse at the direction pin (pump plumbed backwards)
    #[cfg_attr(feature = "serde", serde(default))]
    pub invert_direction: bool,
}

impl ChannelConfig {
    /// Channel with the default label for its position
    pub fn for_channel(id: ChannelId) -> Self {
        let mut label = String::new();
        let _ = label.push_str(DEFAULT_LABELS.get(id.index()).copied().unwrap_or("?"));
        Self {
            label,
            invert_direction: false,
        }
    }
}

/// Controller configuration
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct ControllerConfig {
    /// Identifier returned to Watchdog requests
    pub device_id: String<MAX_TEXT_LEN>,
    /// Acknowledge text sent once after startup
    pub ready_message: String<MAX_TEXT_LEN>,
    /// Speeds above this are clamped
    pub max_speed: u16,
    /// Channels in address order
    pub channels: Vec<ChannelConfig, MAX_CHANNELS>,
}

impl ControllerConfig {
    /// Default configuration for `count` channels
    pub fn with_channels(count: usize) -> Self {
        let mut device_id = String::new();
        let _ = device_id.push_str(DEFAULT_DEVICE_ID);
        let mut ready_message = String::new();
        let _ = ready_message.push_str(DEFAULT_READY_MESSAGE);

        let mut channels = Vec::new();
        for i in 0..count.min(MAX_CHANNELS) {
            let _ = channels.push(ChannelConfig::for_channel(ChannelId(i as u8)));
        }

        Self {
            device_id,
            ready_message,
            max_speed: DEFAULT_MAX_SPEED,
            channels,
        }
    }

    /// Get a channel's configuration
    pub fn channel(&self, id: ChannelId) -> Option<&ChannelConfig> {
        self.channels.get(id.index())
    }

    /// Check this configuration against the firmware's channel count
    pub fn validate(&self, channel_count: usize) -> Result<(), ConfigError> {
        if self.channels.len() != channel_count {
            return Err(ConfigError::ChannelCountMismatch {
                configured: self.channels.len() as u8,
                expected: channel_count as u8,
            });
        }
        if self.max_speed == 0 {
            return Err(ConfigError::ZeroMaxSpeed);
        }
        if self.device_id.is_empty() {
            return Err(ConfigError::EmptyDeviceId);
        }
        Ok(())
    }
}

impl Default for ControllerConfig {
    /// Three channels, matching the reference pump board
    fn default() -> Self {
        Self::with_channels(3)
    }
}
