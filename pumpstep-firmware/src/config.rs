//! Embedded configuration
//!
//! `build.rs` parses pumps.toml and writes it as postcard bytes; this module
//! decodes them at boot. A blob that fails to decode or validate falls back
//! to the built-in defaults.

use defmt::*;

use pumpstep_core::config::ControllerConfig;

/// Postcard-serialized pumps.toml
static EMBEDDED_CONFIG: &[u8] = include_bytes!(concat!(env!("OUT_DIR"), "/pumps.postcard"));

/// Load the embedded configuration for a board with `channel_count` pumps
pub fn load(channel_count: usize) -> ControllerConfig {
    let config = match postcard::from_bytes::<ControllerConfig>(EMBEDDED_CONFIG) {
        Ok(config) => config,
        Err(e) => {
            warn!(
                "Failed to decode embedded config: {}, using defaults",
                Debug2Format(&e)
            );
            return ControllerConfig::with_channels(channel_count);
        }
    };

    if let Err(e) = config.validate(channel_count) {
        warn!("Embedded config rejected: {:?}, using defaults", e);
        return ControllerConfig::with_channels(channel_count);
    }

    log_config_summary(&config);
    config
}

/// Log a summary of the loaded configuration
fn log_config_summary(config: &ControllerConfig) {
    info!("Configuration loaded successfully");
    debug!("  device id: {}", config.device_id.as_str());
    debug!("  max speed: {}", config.max_speed);
    for (i, channel) in config.channels.iter().enumerate() {
        debug!(
            "  channel {}: {} (inverted={})",
            i,
            channel.label.as_str(),
            channel.invert_direction
        );
    }
}
