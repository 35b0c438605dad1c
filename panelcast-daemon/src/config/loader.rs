//! Configuration file loading
//!
//! An explicitly given path must exist. The default path is optional and
//! its absence means built-in defaults.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use log::{debug, info};
use panelcast_core::ST7789_320X170;
use thiserror::Error;

use super::Config;

/// Where the daemon looks when no `--config` is given
pub const DEFAULT_CONFIG_PATH: &str = "/etc/panelcast.toml";

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Read { path: PathBuf, source: io::Error },

    #[error("invalid TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("framebuffer.bytes_per_pixel must be at least 2, got {0}")]
    BytesPerPixel(usize),

    #[error("framebuffer.line_length {line_length} is shorter than a panel row ({needed} bytes)")]
    LineLength { line_length: usize, needed: usize },

    #[error("spi.mode must be 0..=3, got {0}")]
    SpiMode(u8),

    #[error("spi.max_transfer must be non-zero")]
    MaxTransfer,

    #[error("spi.speed_hz must be non-zero")]
    SpiSpeed,

    #[error("diagnostics.fps_interval must be non-zero")]
    FpsInterval,
}

/// Parse and validate configuration text
pub fn parse(text: &str) -> Result<Config, ConfigError> {
    let config: Config = toml::from_str(text)?;
    config.validate(&ST7789_320X170)?;
    Ok(config)
}

/// Load configuration from `path`, or from [`DEFAULT_CONFIG_PATH`] if it exists
pub fn load(path: Option<&Path>) -> Result<Config, ConfigError> {
    match path {
        Some(path) => load_file(path),
        None => {
            let path = Path::new(DEFAULT_CONFIG_PATH);
            if path.exists() {
                load_file(path)
            } else {
                debug!("{} not found, using defaults", path.display());
                Ok(Config::default())
            }
        }
    }
}

fn load_file(path: &Path) -> Result<Config, ConfigError> {
    let text = fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let config = parse(&text)?;
    info!("Loaded configuration from {}", path.display());
    log_config_summary(&config);
    Ok(config)
}

fn log_config_summary(config: &Config) {
    debug!(
        "  SPI {} at {} Hz, mode {}",
        config.spi.device.display(),
        config.spi.speed_hz,
        config.spi.mode
    );
    debug!("  DC GPIO {}, reset GPIO {}", config.gpio.dc, config.gpio.reset);
    debug!(
        "  Framebuffer {} ({} bytes/line)",
        config.framebuffer.device.display(),
        config.framebuffer.line_length
    );
}
