//! Chunked frame rendering
//!
//! A frame is converted and sent a few scan lines at a time through one
//! reusable transfer buffer. Larger chunks amortize per-transfer overhead;
//! smaller ones keep the working set and per-chunk latency down.

use heapless::Vec;
use log::debug;
use panelcast_hal::{FrameSource, FrameSourceError, OutputPin, SpiBus};

use crate::color::{self, NativeColor};
use crate::error::DisplayError;
use crate::geometry::{PanelGeometry, CHUNK_LINES, ST7789_320X170};
use crate::panel::PanelProtocol;

/// Transfer buffer size for the default panel and chunk height
pub const CHUNK_BYTES: usize = ST7789_320X170.line_bytes() * CHUNK_LINES;

/// Reusable buffer of panel-native pixels
///
/// `N` bounds the storage; the usable capacity is fixed at allocation so
/// one chunk of scan lines fills it exactly.
#[derive(Debug, Clone)]
pub struct TransferBuffer<const N: usize> {
    data: Vec<u8, N>,
    capacity: usize,
}

impl<const N: usize> TransferBuffer<N> {
    /// Allocate a buffer holding `capacity` bytes
    ///
    /// Fails if `capacity` is zero, odd, or larger than `N`.
    pub fn new(capacity: usize) -> Result<Self, DisplayError> {
        if capacity == 0 || capacity % 2 != 0 || capacity > N {
            return Err(DisplayError::BufferTooSmall);
        }
        Ok(Self {
            data: Vec::new(),
            capacity,
        })
    }

    /// Usable capacity in bytes
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Bytes currently packed
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Check if nothing is packed
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Packed bytes
    pub fn as_slice(&self) -> &[u8] {
        &self.data
    }

    /// Drop all packed bytes
    pub fn clear(&mut self) {
        self.data.clear();
    }

    /// Append one pixel high byte first
    #[inline(always)]
    pub fn push_color(&mut self, color: u16) -> Result<(), DisplayError> {
        if self.data.len() + 2 > self.capacity {
            return Err(DisplayError::BufferTooSmall);
        }
        self.data
            .extend_from_slice(&color.to_be_bytes())
            .map_err(|_| DisplayError::BufferTooSmall)
    }

    /// Fill the whole capacity with one color
    pub fn fill(&mut self, color: NativeColor) {
        self.data.clear();
        let bytes = color.to_be_bytes();
        while self.data.len() + 2 <= self.capacity {
            // Cannot fail: capacity <= N
            let _ = self.data.extend_from_slice(&bytes);
        }
    }
}

/// Walks the framebuffer in line groups and streams converted pixels
pub struct ChunkedRenderer<S, const N: usize = CHUNK_BYTES> {
    geometry: PanelGeometry,
    chunk_lines: usize,
    source: Option<S>,
    buffer: Option<TransferBuffer<N>>,
    frames: u32,
}

impl<S, const N: usize> ChunkedRenderer<S, N>
where
    S: FrameSource,
{
    /// Create a renderer with nothing attached or allocated
    pub fn new(geometry: PanelGeometry, chunk_lines: usize) -> Self {
        Self {
            geometry,
            chunk_lines: chunk_lines.max(1),
            source: None,
            buffer: None,
            frames: 0,
        }
    }

    /// Scan lines per chunk
    pub fn chunk_lines(&self) -> usize {
        self.chunk_lines
    }

    /// Allocate the transfer buffer for one chunk
    pub fn allocate(&mut self) -> Result<(), DisplayError> {
        if self.buffer.is_none() {
            let capacity = self.geometry.line_bytes() * self.chunk_lines;
            self.buffer = Some(TransferBuffer::new(capacity)?);
        }
        Ok(())
    }

    /// Release the transfer buffer; returns whether one was held
    pub fn release_buffer(&mut self) -> bool {
        self.buffer.take().is_some()
    }

    /// Attach the upstream framebuffer
    ///
    /// The source is dropped if its layout cannot hold the panel.
    pub fn attach(&mut self, source: S) -> Result<(), DisplayError> {
        let layout = source.layout();
        if !layout.covers(self.geometry.width as usize, self.geometry.height as usize) {
            debug!("Framebuffer layout {:?} cannot hold the panel", layout);
            return Err(DisplayError::Source(FrameSourceError::LayoutMismatch));
        }
        self.source = Some(source);
        Ok(())
    }

    /// Detach the upstream framebuffer
    pub fn detach(&mut self) -> Option<S> {
        self.source.take()
    }

    /// Check if a framebuffer is attached
    pub fn has_source(&self) -> bool {
        self.source.is_some()
    }

    /// Check if the transfer buffer is allocated
    pub fn has_buffer(&self) -> bool {
        self.buffer.is_some()
    }

    /// Lend the transfer buffer, e.g. for solid fills
    pub fn buffer_mut(&mut self) -> Option<&mut TransferBuffer<N>> {
        self.buffer.as_mut()
    }

    /// Frames completed since creation
    pub fn frames_rendered(&self) -> u32 {
        self.frames
    }

    /// Convert and send one full frame
    ///
    /// The window is programmed once, then every chunk goes out top to
    /// bottom. A failed frame is not retried.
    pub fn render_frame<SPI, DC>(
        &mut self,
        panel: &mut PanelProtocol<SPI, DC>,
    ) -> Result<(), DisplayError>
    where
        SPI: SpiBus,
        DC: OutputPin,
    {
        let source = self.source.as_ref().ok_or(DisplayError::SourceUnavailable)?;
        let buffer = self.buffer.as_mut().ok_or(DisplayError::BufferUnavailable)?;

        let layout = source.layout();
        let width = self.geometry.width as usize;
        let height = self.geometry.height as usize;
        let bpp = layout.bytes_per_pixel;
        let line_len = width * bpp;

        panel.program_window(self.geometry.full_window())?;

        let mut row = 0;
        while row < height {
            let end = (row + self.chunk_lines).min(height);
            buffer.clear();

            for y in row..end {
                let line = source.read(layout.offset(0, y), line_len)?;
                for pixel in line.chunks_exact(bpp) {
                    buffer.push_color(color::convert(pixel[0], pixel[1]))?;
                }
            }

            panel.send_data(buffer.as_slice())?;
            row = end;
        }

        self.frames = self.frames.wrapping_add(1);
        Ok(())
    }
}
