//! Build script for pumpstep-firmware
//!
//! - Sets up linker search paths for memory.x
//! - Parses and validates pumps.toml at compile time
//! - Embeds the parsed configuration as postcard bytes

use std::env;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use pumpstep_core::config::{ConfigError, ControllerConfig, MAX_CHANNELS};

/// Pump channels wired on the board (matches `PUMP_COUNT` in main.rs)
const BOARD_CHANNELS: usize = 3;

/// File name of the embedded configuration in OUT_DIR
const CONFIG_BLOB: &str = "pumps.postcard";

fn main() {
    let out_dir = PathBuf::from(env::var("OUT_DIR").expect("OUT_DIR is set by cargo"));
    setup_linker(&out_dir);
    embed_config(&out_dir);
}

/// Set up linker search paths for memory.x
fn setup_linker(out_dir: &Path) {
    // Copy memory.x to the output directory
    let memory_x = include_bytes!("memory.x");
    let mut f = File::create(out_dir.join("memory.x")).expect("create memory.x");
    f.write_all(memory_x).expect("write memory.x");

    // Tell rustc where to find memory.x
    println!("cargo:rustc-link-search={}", out_dir.display());

    println!("cargo:rustc-link-arg-bins=--nmagic");
    println!("cargo:rustc-link-arg-bins=-Tlink.x");
    println!("cargo:rustc-link-arg-bins=-Tlink-rp.x");
    println!("cargo:rustc-link-arg-bins=-Tdefmt.x");

    // Re-run if memory.x changes
    println!("cargo:rerun-if-changed=memory.x");
    println!("cargo:rerun-if-changed=build.rs");
}

/// Parse pumps.toml, validate it and write it to OUT_DIR as postcard
fn embed_config(out_dir: &Path) {
    println!("cargo:rerun-if-changed=pumps.toml");

    let config_path = Path::new("pumps.toml");

    if !config_path.exists() {
        fail(
            "pumps.toml not found!",
            &["The firmware requires a pumps.toml configuration file".to_string()],
        );
    }

    let content = match fs::read_to_string(config_path) {
        Ok(content) => content,
        Err(e) => fail("Failed to read pumps.toml", &[e.to_string()]),
    };

    let config: ControllerConfig = match toml::from_str(&content) {
        Ok(config) => config,
        Err(e) => fail(
            "Invalid pumps.toml",
            &e.to_string().lines().map(str::to_string).collect::<Vec<_>>(),
        ),
    };

    if let Err(e) = config.validate(BOARD_CHANNELS) {
        fail("Invalid pump configuration", &[describe(e)]);
    }

    let bytes = match postcard::to_stdvec(&config) {
        Ok(bytes) => bytes,
        Err(e) => fail("Failed to serialize configuration", &[e.to_string()]),
    };
    fs::write(out_dir.join(CONFIG_BLOB), bytes).expect("write embedded configuration");

    println!(
        "cargo:warning=pumps.toml validated successfully ({} channels)",
        config.channels.len()
    );
}

fn describe(error: ConfigError) -> String {
    match error {
        ConfigError::ChannelCountMismatch { configured, .. } => format!(
            "{} [[channels]] configured, board has {} (max {})",
            configured, BOARD_CHANNELS, MAX_CHANNELS
        ),
        ConfigError::ZeroMaxSpeed => "max_speed must be greater than 0".to_string(),
        ConfigError::EmptyDeviceId => "device_id must not be empty".to_string(),
    }
}

/// Abort the build with a boxed error message
fn fail(title: &str, lines: &[String]) -> ! {
    panic!(
        "\n\
        ╔══════════════════════════════════════════════════════════════════╗\n\
        ║  ERROR: {:<57}║\n\
        ╠══════════════════════════════════════════════════════════════════╣\n\
        {}\n\
        ╚══════════════════════════════════════════════════════════════════╝\n",
        title,
        format_error_lines(lines)
    );
}

/// Format error message lines with box drawing
fn format_error_lines(lines: &[String]) -> String {
    lines
        .iter()
        .map(|line| {
            let truncated = if line.chars().count() > 64 {
                format!("{}...", line.chars().take(61).collect::<String>())
            } else {
                line.clone()
            };
            format!("║  {:<64} ║", truncated)
        })
        .collect::<Vec<_>>()
        .join("\n")
}
