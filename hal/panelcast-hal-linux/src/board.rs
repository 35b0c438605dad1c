//! Linux board: hands out sysfs pins, a spidev bus and the mapped framebuffer

use std::path::PathBuf;

use log::info;
use panelcast_hal::{Board, FrameLayout, PinRole};
use thiserror::Error;

use crate::framebuffer::{FramebufferError, MappedFramebuffer, FRAMEBUFFER_DEVICE};
use crate::gpio::{GpioError, SysfsPin, SYSFS_GPIO_ROOT};
use crate::spi::{SpiError, SpidevBus, SPI_DEVICE};

/// Device paths and pin numbers
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoardConfig {
    /// spidev node
    pub spi_device: PathBuf,
    /// sysfs GPIO directory
    pub gpio_root: PathBuf,
    /// Data/command GPIO number
    pub dc_pin: u32,
    /// Reset GPIO number
    pub reset_pin: u32,
    /// fbdev node
    pub framebuffer: PathBuf,
    /// Shape of the framebuffer region to map
    pub layout: FrameLayout,
}

impl Default for BoardConfig {
    fn default() -> Self {
        Self {
            spi_device: PathBuf::from(SPI_DEVICE),
            gpio_root: PathBuf::from(SYSFS_GPIO_ROOT),
            dc_pin: 57,
            reset_pin: 56,
            framebuffer: PathBuf::from(FRAMEBUFFER_DEVICE),
            layout: FrameLayout {
                stride: 640,
                bytes_per_pixel: 2,
                height: 170,
            },
        }
    }
}

/// Acquisition errors
#[derive(Debug, Error)]
pub enum BoardError {
    #[error(transparent)]
    Gpio(#[from] GpioError),

    #[error(transparent)]
    Spi(#[from] SpiError),

    #[error(transparent)]
    Framebuffer(#[from] FramebufferError),
}

/// Board backed by Linux userspace device interfaces
#[derive(Debug, Clone)]
pub struct LinuxBoard {
    config: BoardConfig,
}

impl LinuxBoard {
    pub fn new(config: BoardConfig) -> Self {
        Self { config }
    }

    /// Current configuration
    pub fn config(&self) -> &BoardConfig {
        &self.config
    }
}

impl Board for LinuxBoard {
    type Pin = SysfsPin;
    type Bus = SpidevBus;
    type Source = MappedFramebuffer;
    type Error = BoardError;

    fn output_pin(&mut self, role: PinRole) -> Result<SysfsPin, BoardError> {
        let number = match role {
            PinRole::DataCommand => self.config.dc_pin,
            PinRole::Reset => self.config.reset_pin,
        };
        let pin = SysfsPin::export(&self.config.gpio_root, number)?;
        info!("GPIO {} ready ({:?})", number, role);
        Ok(pin)
    }

    fn spi_bus(&mut self) -> Result<SpidevBus, BoardError> {
        let bus = SpidevBus::open(&self.config.spi_device)?;
        info!("Opened {}", self.config.spi_device.display());
        Ok(bus)
    }

    fn frame_source(&mut self) -> Result<MappedFramebuffer, BoardError> {
        let fb = MappedFramebuffer::open(&self.config.framebuffer, self.config.layout)?;
        info!("Mapped {}", self.config.framebuffer.display());
        Ok(fb)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use panelcast_hal::{FrameSource, OutputPin};
    use std::fs;
    use tempfile::TempDir;

    fn fake_system() -> (TempDir, BoardConfig) {
        let dir = TempDir::new().unwrap();
        let gpio_root = dir.path().join("gpio");
        for n in [57, 56] {
            let pin = gpio_root.join(format!("gpio{}", n));
            fs::create_dir_all(&pin).unwrap();
            fs::write(pin.join("direction"), "in").unwrap();
            fs::write(pin.join("value"), "0").unwrap();
        }
        let framebuffer = dir.path().join("fb0");
        fs::write(&framebuffer, vec![0u8; 640 * 170]).unwrap();

        let config = BoardConfig {
            spi_device: dir.path().join("spidev0.0"),
            gpio_root,
            framebuffer,
            ..BoardConfig::default()
        };
        (dir, config)
    }

    #[test]
    fn test_default_config() {
        let config = BoardConfig::default();
        assert_eq!(config.spi_device, PathBuf::from("/dev/spidev0.0"));
        assert_eq!(config.dc_pin, 57);
        assert_eq!(config.reset_pin, 56);
        assert_eq!(config.layout.len(), 640 * 170);
    }

    #[test]
    fn test_pins_by_role() {
        let (dir, config) = fake_system();
        let mut board = LinuxBoard::new(config);

        let mut dc = board.output_pin(PinRole::DataCommand).unwrap();
        let reset = board.output_pin(PinRole::Reset).unwrap();
        assert_eq!(dc.number(), 57);
        assert_eq!(reset.number(), 56);

        dc.set_high().unwrap();
        let value = fs::read_to_string(dir.path().join("gpio/gpio57/value")).unwrap();
        assert_eq!(value, "1");
    }

    #[test]
    fn test_frame_source_uses_layout() {
        let (_dir, config) = fake_system();
        let layout = config.layout;
        let mut board = LinuxBoard::new(config);

        let fb = board.frame_source().unwrap();
        assert_eq!(fb.layout(), layout);
    }

    #[test]
    fn test_missing_spi_device() {
        let (_dir, config) = fake_system();
        let mut board = LinuxBoard::new(config);

        let err = board.spi_bus().err().unwrap();
        assert!(matches!(err, BoardError::Spi(SpiError::Open { .. })));
    }
}
