//! SPI bus abstractions
//!
//! The panel link is write-only: nothing is ever read back from the
//! controller, so the bus trait only exposes configuration and writes.

/// Write-only SPI bus master
pub trait SpiBus {
    /// Error type for SPI operations
    type Error: core::fmt::Debug;

    /// Apply mode, word size and clock speed
    ///
    /// Called once at bring-up, before the first write.
    fn configure(&mut self, config: &SpiConfig) -> Result<(), Self::Error>;

    /// Write `data` in a single blocking transfer
    ///
    /// Exactly `data.len()` bytes are clocked out; no receive data is kept.
    fn write(&mut self, data: &[u8]) -> Result<(), Self::Error>;
}

/// SPI configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SpiConfig {
    /// Clock frequency in Hz
    pub frequency: u32,
    /// Clock polarity and phase
    pub mode: Mode,
    /// Bits per word
    pub bits_per_word: u8,
}

impl Default for SpiConfig {
    fn default() -> Self {
        Self {
            frequency: 80_000_000, // ST7789 tolerates well past its 62.5 MHz rating
            mode: Mode::Mode0,
            bits_per_word: 8,
        }
    }
}

/// SPI mode (clock polarity and phase)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Mode {
    /// Mode 0: CPOL=0, CPHA=0
    Mode0,
    /// Mode 1: CPOL=0, CPHA=1
    Mode1,
    /// Mode 2: CPOL=1, CPHA=0
    Mode2,
    /// Mode 3: CPOL=1, CPHA=1
    Mode3,
}

impl Mode {
    /// Build a mode from its conventional number (0-3)
    pub fn from_number(n: u8) -> Option<Self> {
        match n {
            0 => Some(Mode::Mode0),
            1 => Some(Mode::Mode1),
            2 => Some(Mode::Mode2),
            3 => Some(Mode::Mode3),
            _ => None,
        }
    }

    /// Conventional mode number (0-3)
    pub fn number(self) -> u8 {
        match self {
            Mode::Mode0 => 0,
            Mode::Mode1 => 1,
            Mode::Mode2 => 2,
            Mode::Mode3 => 3,
        }
    }
}
