//! Board-agnostic core of the framebuffer mirror
//!
//! This crate contains everything between the upstream framebuffer and the
//! SPI bus that does not depend on a specific platform:
//!
//! - Pixel conversion from the upstream encoding to panel-native RGB565
//! - ST7789 command/data framing, addressing window and init sequence
//! - Chunked frame rendering into a reusable transfer buffer
//! - Display bring-up, solid fills and teardown
//! - The frame loop with cooperative shutdown and FPS diagnostics
//!
//! # Data flow
//!
//! ```text
//! FrameSource ─▶ color::convert ─▶ TransferBuffer ─▶ PanelProtocol ─▶ SpiBus
//! ```

#![no_std]
#![deny(unsafe_code)]

#[cfg(test)]
extern crate std;

pub mod color;
pub mod error;
pub mod frame_loop;
pub mod geometry;
pub mod lifecycle;
pub mod panel;
pub mod render;

#[cfg(test)]
pub(crate) mod mock;

pub use color::NativeColor;
pub use error::DisplayError;
pub use frame_loop::{FpsMeter, FrameLoop, LoopState, LoopSummary, RenderTarget};
pub use geometry::{PanelGeometry, Window, CHUNK_LINES, ST7789_320X170};
pub use lifecycle::{Display, Released};
pub use panel::{InitStep, PanelProtocol, ST7789_INIT, ST7789_INIT_INVERTED};
pub use render::{ChunkedRenderer, TransferBuffer, CHUNK_BYTES};
