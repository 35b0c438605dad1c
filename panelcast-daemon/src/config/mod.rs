//! Daemon configuration
//!
//! Read from a TOML file. Every key is optional and defaults to the
//! wiring of the reference board.
//!
//! ```toml
//! [spi]
//! device = "/dev/spidev0.0"
//! speed_hz = 80000000
//!
//! [gpio]
//! dc = 57
//! reset = 56
//!
//! [framebuffer]
//! device = "/dev/fb0"
//! line_length = 640
//! ```

pub mod loader;

use std::path::PathBuf;

use panelcast_core::frame_loop::FPS_REPORT_INTERVAL;
use panelcast_core::panel::SPI_CHUNK_SIZE;
use panelcast_core::{InitStep, PanelGeometry, ST7789_INIT, ST7789_INIT_INVERTED};
use panelcast_hal::{FrameLayout, Mode, SpiConfig};
use panelcast_hal_linux::BoardConfig;
use serde::Deserialize;

pub use loader::{load, ConfigError};

/// Top-level configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub spi: SpiSection,
    pub gpio: GpioSection,
    pub framebuffer: FramebufferSection,
    pub panel: PanelSection,
    pub diagnostics: DiagnosticsSection,
}

/// `[spi]`
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SpiSection {
    pub device: PathBuf,
    pub speed_hz: u32,
    pub mode: u8,
    pub bits_per_word: u8,
    /// Largest single write handed to the driver
    pub max_transfer: usize,
}

impl Default for SpiSection {
    fn default() -> Self {
        let spi = SpiConfig::default();
        Self {
            device: PathBuf::from("/dev/spidev0.0"),
            speed_hz: spi.frequency,
            mode: spi.mode.number(),
            bits_per_word: spi.bits_per_word,
            max_transfer: SPI_CHUNK_SIZE,
        }
    }
}

/// `[gpio]`
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GpioSection {
    pub dc: u32,
    pub reset: u32,
    pub sysfs_root: PathBuf,
}

impl Default for GpioSection {
    fn default() -> Self {
        Self {
            dc: 57,
            reset: 56,
            sysfs_root: PathBuf::from("/sys/class/gpio"),
        }
    }
}

/// `[framebuffer]`
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FramebufferSection {
    pub device: PathBuf,
    /// Bytes per scan line
    pub line_length: usize,
    pub bytes_per_pixel: usize,
}

impl Default for FramebufferSection {
    fn default() -> Self {
        Self {
            device: PathBuf::from("/dev/fb0"),
            line_length: 640,
            bytes_per_pixel: 2,
        }
    }
}

/// `[panel]`
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PanelSection {
    /// Send INVON during init, for modules wired with inverted colors
    pub invert_colors: bool,
}

/// `[diagnostics]`
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DiagnosticsSection {
    /// Frames between FPS reports
    pub fps_interval: u32,
}

impl Default for DiagnosticsSection {
    fn default() -> Self {
        Self {
            fps_interval: FPS_REPORT_INTERVAL,
        }
    }
}

impl Config {
    /// Check the values against the panel they will drive
    pub fn validate(&self, geometry: &PanelGeometry) -> Result<(), ConfigError> {
        let fb = &self.framebuffer;
        if fb.bytes_per_pixel < 2 {
            return Err(ConfigError::BytesPerPixel(fb.bytes_per_pixel));
        }
        let needed = geometry.width as usize * fb.bytes_per_pixel;
        if fb.line_length < needed {
            return Err(ConfigError::LineLength {
                line_length: fb.line_length,
                needed,
            });
        }
        if Mode::from_number(self.spi.mode).is_none() {
            return Err(ConfigError::SpiMode(self.spi.mode));
        }
        if self.spi.max_transfer == 0 {
            return Err(ConfigError::MaxTransfer);
        }
        if self.spi.speed_hz == 0 {
            return Err(ConfigError::SpiSpeed);
        }
        if self.diagnostics.fps_interval == 0 {
            return Err(ConfigError::FpsInterval);
        }
        Ok(())
    }

    /// Bus settings
    pub fn spi_config(&self) -> SpiConfig {
        SpiConfig {
            frequency: self.spi.speed_hz,
            mode: Mode::from_number(self.spi.mode).unwrap_or(Mode::Mode0),
            bits_per_word: self.spi.bits_per_word,
        }
    }

    /// Controller init sequence
    pub fn init_sequence(&self) -> &'static [InitStep] {
        if self.panel.invert_colors {
            ST7789_INIT_INVERTED
        } else {
            ST7789_INIT
        }
    }

    /// Device paths and pins for `geometry`
    pub fn board_config(&self, geometry: &PanelGeometry) -> BoardConfig {
        BoardConfig {
            spi_device: self.spi.device.clone(),
            gpio_root: self.gpio.sysfs_root.clone(),
            dc_pin: self.gpio.dc,
            reset_pin: self.gpio.reset,
            framebuffer: self.framebuffer.device.clone(),
            layout: FrameLayout {
                stride: self.framebuffer.line_length,
                bytes_per_pixel: self.framebuffer.bytes_per_pixel,
                height: geometry.height as usize,
            },
        }
    }
}
