//! Display lifecycle
//!
//! Owns every resource the pipeline uses and the order they are brought up
//! and torn down in:
//!
//! 1. DC and reset lines
//! 2. SPI bus (opened, then configured)
//! 3. Transfer buffer
//! 4. Hardware reset and controller init sequence
//! 5. Framebuffer (attached separately, after bring-up)
//!
//! Each resource sits in its own `Option`, so a bring-up that fails half
//! way leaves exactly the acquired part held and `shutdown` releases only
//! that.

use embedded_hal::delay::DelayNs;
use log::{debug, info, warn};
use panelcast_hal::{Board, PinRole, SpiBus, SpiConfig};

use crate::color::NativeColor;
use crate::error::DisplayError;
use crate::frame_loop::RenderTarget;
use crate::geometry::{PanelGeometry, CHUNK_LINES};
use crate::panel::{self, InitStep, PanelProtocol, SPI_CHUNK_SIZE, ST7789_INIT};
use crate::render::{ChunkedRenderer, CHUNK_BYTES};

/// Self-test hold times in milliseconds
const TEST_COLOR_HOLD_MS: u32 = 500;
const TEST_BLACK_HOLD_MS: u32 = 100;
const CLEAR_HOLD_MS: u32 = 50;

/// Resources released by a [`Display::shutdown`] call
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Released {
    pub buffer: bool,
    pub source: bool,
    pub bus: bool,
    pub dc: bool,
    pub reset: bool,
}

impl Released {
    /// Check if anything was released
    pub fn any(&self) -> bool {
        self.buffer || self.source || self.bus || self.dc || self.reset
    }
}

/// An ST7789 panel mirroring a framebuffer, plus everything it holds
pub struct Display<B: Board, const N: usize = CHUNK_BYTES> {
    geometry: PanelGeometry,
    init: &'static [InitStep],
    spi_config: SpiConfig,
    max_transfer: usize,
    panel: Option<PanelProtocol<B::Bus, B::Pin>>,
    dc: Option<B::Pin>,
    reset: Option<B::Pin>,
    renderer: ChunkedRenderer<B::Source, N>,
}

impl<B: Board, const N: usize> Display<B, N> {
    /// Create a display holding no resources
    pub fn new(geometry: PanelGeometry) -> Self {
        Self {
            geometry,
            init: ST7789_INIT,
            spi_config: SpiConfig::default(),
            max_transfer: SPI_CHUNK_SIZE,
            panel: None,
            dc: None,
            reset: None,
            renderer: ChunkedRenderer::new(geometry, CHUNK_LINES),
        }
    }

    /// Use a different controller init sequence
    pub fn with_init_sequence(mut self, init: &'static [InitStep]) -> Self {
        self.init = init;
        self
    }

    /// Bus mode, word size and clock
    pub fn with_spi_config(mut self, config: SpiConfig) -> Self {
        self.spi_config = config;
        self
    }

    /// Largest single SPI transfer
    pub fn with_max_transfer(mut self, max_transfer: usize) -> Self {
        self.max_transfer = max_transfer;
        self
    }

    /// Scan lines per rendered chunk
    pub fn with_chunk_lines(mut self, chunk_lines: usize) -> Self {
        self.renderer = ChunkedRenderer::new(self.geometry, chunk_lines);
        self
    }

    /// Panel geometry
    pub fn geometry(&self) -> PanelGeometry {
        self.geometry
    }

    /// Check if the controller is initialized and a framebuffer is attached
    pub fn is_ready(&self) -> bool {
        self.panel.is_some() && self.renderer.has_buffer() && self.renderer.has_source()
    }

    /// Frames rendered so far
    pub fn frames_rendered(&self) -> u32 {
        self.renderer.frames_rendered()
    }

    /// Acquire lines and bus, reset the controller and run its init sequence
    ///
    /// On error, whatever was acquired stays held until [`shutdown`](Self::shutdown).
    pub fn bring_up<D: DelayNs>(
        &mut self,
        board: &mut B,
        delay: &mut D,
    ) -> Result<(), DisplayError> {
        info!("Initializing display");

        if self.panel.is_none() && self.dc.is_none() {
            self.dc = Some(board.output_pin(PinRole::DataCommand).map_err(acquire_error)?);
        }
        if self.reset.is_none() {
            self.reset = Some(board.output_pin(PinRole::Reset).map_err(acquire_error)?);
        }

        if self.panel.is_none() {
            let mut bus = board.spi_bus().map_err(acquire_error)?;
            // A bus that cannot be configured is closed right here
            bus.configure(&self.spi_config).map_err(panel::bus_error)?;
            info!("SPI initialized at {} Hz", self.spi_config.frequency);

            let dc = self.dc.take().ok_or(DisplayError::NotInitialized)?;
            self.panel = Some(
                PanelProtocol::new(bus, dc, self.geometry).with_max_transfer(self.max_transfer),
            );
        }

        self.renderer.allocate()?;

        let reset = self.reset.as_mut().ok_or(DisplayError::NotInitialized)?;
        panel::hard_reset(reset, delay)?;

        let panel = self.panel.as_mut().ok_or(DisplayError::NotInitialized)?;
        panel.run_init_sequence(self.init, delay)?;

        info!("Display initialized");
        Ok(())
    }

    /// Map the upstream framebuffer and check it can hold the panel
    pub fn attach_source(&mut self, board: &mut B) -> Result<(), DisplayError> {
        let source = board.frame_source().map_err(acquire_error)?;
        self.renderer.attach(source)?;
        info!("Framebuffer initialized");
        Ok(())
    }

    /// Convert and send one frame from the attached framebuffer
    pub fn render_frame(&mut self) -> Result<(), DisplayError> {
        let panel = self.panel.as_mut().ok_or(DisplayError::NotInitialized)?;
        self.renderer.render_frame(panel)
    }

    /// Paint the whole panel one color
    ///
    /// The transfer buffer is filled once and sent in full bursts, with a
    /// shorter last burst when the frame is not a whole number of buffers.
    pub fn fill(&mut self, color: NativeColor) -> Result<(), DisplayError> {
        let panel = self.panel.as_mut().ok_or(DisplayError::NotInitialized)?;
        let buffer = self
            .renderer
            .buffer_mut()
            .ok_or(DisplayError::BufferUnavailable)?;

        panel.program_window(self.geometry.full_window())?;

        buffer.fill(color);
        let burst = buffer.as_slice();
        let total = self.geometry.frame_bytes();
        let mut sent = 0;
        while sent < total {
            let len = (total - sent).min(burst.len());
            panel.send_data(&burst[..len])?;
            sent += len;
        }
        Ok(())
    }

    /// Paint the whole panel an 8-bit RGB color
    pub fn fill_rgb(&mut self, r: u8, g: u8, b: u8) -> Result<(), DisplayError> {
        info!("Testing RGB({},{},{})", r, g, b);
        self.fill(NativeColor::from_rgb(r, g, b))
    }

    /// Blank the panel and give it a moment before the first frame
    pub fn clear<D: DelayNs>(&mut self, delay: &mut D) -> Result<(), DisplayError> {
        self.fill(NativeColor::BLACK)?;
        delay.delay_ms(CLEAR_HOLD_MS);
        Ok(())
    }

    /// Cycle red, green and blue, then blank
    pub fn self_test<D: DelayNs>(&mut self, delay: &mut D) -> Result<(), DisplayError> {
        info!("Running color self-test");
        for (r, g, b) in [(255, 0, 0), (0, 255, 0), (0, 0, 255)] {
            self.fill_rgb(r, g, b)?;
            delay.delay_ms(TEST_COLOR_HOLD_MS);
        }
        self.fill_rgb(0, 0, 0)?;
        delay.delay_ms(TEST_BLACK_HOLD_MS);
        Ok(())
    }

    /// Release everything held, in reverse order of need
    ///
    /// Safe to call repeatedly and after a failed bring-up.
    pub fn shutdown(&mut self) -> Released {
        let mut released = Released {
            buffer: self.renderer.release_buffer(),
            source: self.renderer.detach().is_some(),
            ..Released::default()
        };

        if let Some(panel) = self.panel.take() {
            let (bus, dc) = panel.release();
            drop(bus);
            drop(dc);
            released.bus = true;
            released.dc = true;
        }
        if self.dc.take().is_some() {
            released.dc = true;
        }
        released.reset = self.reset.take().is_some();

        if released.any() {
            debug!("Released {:?}", released);
        }
        released
    }
}

impl<B: Board, const N: usize> RenderTarget for Display<B, N> {
    fn render_frame(&mut self) -> Result<(), DisplayError> {
        Display::render_frame(self)
    }

    fn shutdown(&mut self) {
        Display::shutdown(self);
    }
}

fn acquire_error<E: core::fmt::Debug>(e: E) -> DisplayError {
    warn!("Resource acquisition failed: {:?}", e);
    DisplayError::Acquire
}
