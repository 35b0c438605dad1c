//! spidev SPI bus

use std::io;
use std::path::{Path, PathBuf};

use log::debug;
use panelcast_hal::{Mode, SpiBus, SpiConfig};
use spidev::{SpiModeFlags, Spidev, SpidevOptions, SpidevTransfer};
use thiserror::Error;

/// Default spidev node
pub const SPI_DEVICE: &str = "/dev/spidev0.0";

/// SPI errors
#[derive(Debug, Error)]
pub enum SpiError {
    #[error("failed to open {path}: {source}")]
    Open { path: PathBuf, source: io::Error },

    #[error("failed to configure SPI: {0}")]
    Configure(#[source] io::Error),

    #[error("SPI transfer failed: {0}")]
    Transfer(#[source] io::Error),
}

/// A spidev device used as a write-only bus
pub struct SpidevBus {
    dev: Spidev,
}

impl SpidevBus {
    /// Open a spidev node such as `/dev/spidev0.0`
    pub fn open(path: impl AsRef<Path>) -> Result<Self, SpiError> {
        let path = path.as_ref();
        let dev = Spidev::open(path).map_err(|source| SpiError::Open {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(Self { dev })
    }
}

impl SpiBus for SpidevBus {
    type Error = SpiError;

    fn configure(&mut self, config: &SpiConfig) -> Result<(), SpiError> {
        debug!(
            "SPI mode {}, {} bits, {} Hz",
            config.mode.number(),
            config.bits_per_word,
            config.frequency
        );
        let options = SpidevOptions::new()
            .bits_per_word(config.bits_per_word)
            .max_speed_hz(config.frequency)
            .mode(mode_flags(config.mode))
            .build();
        self.dev.configure(&options).map_err(SpiError::Configure)
    }

    fn write(&mut self, data: &[u8]) -> Result<(), SpiError> {
        let mut transfer = SpidevTransfer::write(data);
        self.dev.transfer(&mut transfer).map_err(SpiError::Transfer)
    }
}

fn mode_flags(mode: Mode) -> SpiModeFlags {
    match mode {
        Mode::Mode0 => SpiModeFlags::SPI_MODE_0,
        Mode::Mode1 => SpiModeFlags::SPI_MODE_1,
        Mode::Mode2 => SpiModeFlags::SPI_MODE_2,
        Mode::Mode3 => SpiModeFlags::SPI_MODE_3,
    }
}
