//! ST7789 panel protocol
//!
//! The controller is driven over a write-only 4-wire SPI link. A separate
//! data/command (DC) line tells it how to interpret each byte:
//!
//! - DC low: the byte is a command opcode (always sent alone)
//! - DC high: the bytes are parameters or pixel data for the last command
//!
//! Nothing is read back, so malformed timing or sequencing only ever shows
//! up as artifacts on the glass.

use embedded_hal::delay::DelayNs;
use log::{debug, trace};
use panelcast_hal::{Level, OutputPin, SpiBus};

use crate::error::DisplayError;
use crate::geometry::{PanelGeometry, Window};

/// Largest single SPI transfer; spidev rejects messages over its buffer size
pub const SPI_CHUNK_SIZE: usize = 4096;

/// ST7789 commands
#[allow(dead_code)]
pub mod cmd {
    pub const NOP: u8 = 0x00;
    pub const SWRESET: u8 = 0x01;
    pub const SLPIN: u8 = 0x10;
    pub const SLPOUT: u8 = 0x11;
    pub const NORON: u8 = 0x13;
    pub const INVOFF: u8 = 0x20;
    pub const INVON: u8 = 0x21;
    pub const DISPOFF: u8 = 0x28;
    pub const DISPON: u8 = 0x29;
    pub const CASET: u8 = 0x2A;
    pub const RASET: u8 = 0x2B;
    pub const RAMWR: u8 = 0x2C;
    pub const MADCTL: u8 = 0x36;
    pub const COLMOD: u8 = 0x3A;
}

/// One step of the controller bring-up
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct InitStep {
    /// Command opcode
    pub command: u8,
    /// Parameter bytes sent as data after the command
    pub params: &'static [u8],
    /// Minimum wait after the step before the next command
    pub settle_ms: u32,
}

impl InitStep {
    pub const fn new(command: u8, params: &'static [u8], settle_ms: u32) -> Self {
        Self {
            command,
            params,
            settle_ms,
        }
    }
}

/// Interface pixel format: 16 bits/pixel (RGB565) on both RGB and MCU interfaces
const COLMOD_16BPP: u8 = 0x55;

/// MV | MX: landscape, mirrored columns for this module's mounting
const MADCTL_LANDSCAPE: u8 = 0x60;

/// Bring-up sequence for the 320x170 module
///
/// The address ranges cover the whole 320x240 controller memory, not just
/// the visible area; the renderer narrows them per frame.
///
/// Display inversion is left off. Builds for the common IPS module sent
/// INVON here; use [`ST7789_INIT_INVERTED`] for that behavior.
pub const ST7789_INIT: &[InitStep] = &[
    InitStep::new(cmd::SWRESET, &[], 150),
    InitStep::new(cmd::SLPOUT, &[], 150),
    InitStep::new(cmd::COLMOD, &[COLMOD_16BPP], 10),
    InitStep::new(cmd::MADCTL, &[MADCTL_LANDSCAPE], 10),
    InitStep::new(cmd::CASET, &[0x00, 0x00, 0x01, 0x3F], 10),
    InitStep::new(cmd::RASET, &[0x00, 0x00, 0x00, 0xEF], 10),
    InitStep::new(cmd::NORON, &[], 10),
    InitStep::new(cmd::DISPON, &[], 150),
];

/// Same as [`ST7789_INIT`] with display inversion enabled
///
/// IPS variants of the module show a negative image without it.
pub const ST7789_INIT_INVERTED: &[InitStep] = &[
    InitStep::new(cmd::SWRESET, &[], 150),
    InitStep::new(cmd::SLPOUT, &[], 150),
    InitStep::new(cmd::COLMOD, &[COLMOD_16BPP], 10),
    InitStep::new(cmd::MADCTL, &[MADCTL_LANDSCAPE], 10),
    InitStep::new(cmd::CASET, &[0x00, 0x00, 0x01, 0x3F], 10),
    InitStep::new(cmd::RASET, &[0x00, 0x00, 0x00, 0xEF], 10),
    InitStep::new(cmd::INVON, &[], 10),
    InitStep::new(cmd::NORON, &[], 10),
    InitStep::new(cmd::DISPON, &[], 150),
];

/// Reset pulse timing in milliseconds: high, low, then wait before first command
const RESET_HIGH_MS: u32 = 100;
const RESET_LOW_MS: u32 = 100;
const RESET_RECOVERY_MS: u32 = 120;

/// Pulse the controller's reset line
///
/// Must run before [`PanelProtocol::run_init_sequence`].
pub fn hard_reset<P, D>(reset: &mut P, delay: &mut D) -> Result<(), DisplayError>
where
    P: OutputPin,
    D: DelayNs,
{
    debug!("Resetting display");
    reset.set_high().map_err(pin_error)?;
    delay.delay_ms(RESET_HIGH_MS);
    reset.set_low().map_err(pin_error)?;
    delay.delay_ms(RESET_LOW_MS);
    reset.set_high().map_err(pin_error)?;
    delay.delay_ms(RESET_RECOVERY_MS);
    Ok(())
}

/// Command/data framing for an ST7789 on a write-only SPI bus
pub struct PanelProtocol<SPI, DC> {
    spi: SPI,
    dc: DC,
    geometry: PanelGeometry,
    max_transfer: usize,
}

impl<SPI, DC> PanelProtocol<SPI, DC>
where
    SPI: SpiBus,
    DC: OutputPin,
{
    /// Wrap a configured bus and the DC line
    pub fn new(spi: SPI, dc: DC, geometry: PanelGeometry) -> Self {
        Self {
            spi,
            dc,
            geometry,
            max_transfer: SPI_CHUNK_SIZE,
        }
    }

    /// Limit the size of a single SPI transfer
    pub fn with_max_transfer(mut self, max_transfer: usize) -> Self {
        self.max_transfer = max_transfer.max(1);
        self
    }

    /// Current transfer size limit
    pub fn max_transfer(&self) -> usize {
        self.max_transfer
    }

    /// Send one command byte with DC low
    pub fn send_command(&mut self, command: u8) -> Result<(), DisplayError> {
        trace!("cmd {:#04x}", command);
        self.dc.set(Level::Low).map_err(pin_error)?;
        self.spi.write(&[command]).map_err(bus_error)
    }

    /// Send a data payload with DC high
    ///
    /// Payloads larger than the transfer limit go out as several
    /// back-to-back transfers; DC is only driven once.
    pub fn send_data(&mut self, data: &[u8]) -> Result<(), DisplayError> {
        if data.is_empty() {
            return Ok(());
        }
        self.dc.set(Level::High).map_err(pin_error)?;
        for chunk in data.chunks(self.max_transfer) {
            self.spi.write(chunk).map_err(bus_error)?;
        }
        Ok(())
    }

    /// Send a command followed by its parameters
    pub fn send_command_with_data(&mut self, command: u8, data: &[u8]) -> Result<(), DisplayError> {
        self.send_command(command)?;
        self.send_data(data)
    }

    /// Program the addressing window and open a memory write
    ///
    /// Afterwards the controller consumes exactly `window.pixel_count()`
    /// big-endian pixels in row-major order.
    pub fn program_window(&mut self, window: Window) -> Result<(), DisplayError> {
        let x0 = window.x0 + self.geometry.x_offset;
        let x1 = window.x1 + self.geometry.x_offset;
        let y0 = window.y0 + self.geometry.y_offset;
        let y1 = window.y1 + self.geometry.y_offset;

        self.send_command_with_data(cmd::CASET, &address_pair(x0, x1))?;
        self.send_command_with_data(cmd::RASET, &address_pair(y0, y1))?;
        self.send_command(cmd::RAMWR)
    }

    /// Run the bring-up sequence, honoring every settle delay
    pub fn run_init_sequence<D: DelayNs>(
        &mut self,
        steps: &[InitStep],
        delay: &mut D,
    ) -> Result<(), DisplayError> {
        for step in steps {
            self.send_command_with_data(step.command, step.params)?;
            delay.delay_ms(step.settle_ms);
        }
        Ok(())
    }

    /// Give back the bus and DC line
    pub fn release(self) -> (SPI, DC) {
        (self.spi, self.dc)
    }
}

/// Big-endian start/end address payload for CASET/RASET
fn address_pair(start: u16, end: u16) -> [u8; 4] {
    let [s_hi, s_lo] = start.to_be_bytes();
    let [e_hi, e_lo] = end.to_be_bytes();
    [s_hi, s_lo, e_hi, e_lo]
}

pub(crate) fn bus_error<E: core::fmt::Debug>(e: E) -> DisplayError {
    debug!("SPI error: {:?}", e);
    DisplayError::Bus
}

pub(crate) fn pin_error<E: core::fmt::Debug>(e: E) -> DisplayError {
    debug!("GPIO error: {:?}", e);
    DisplayError::Pin
}
