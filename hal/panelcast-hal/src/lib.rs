//! Panelcast Hardware Abstraction Layer
//!
//! This crate defines the capabilities the display core needs from the
//! platform. The core never opens a device itself: it is handed pins, a bus
//! and a framebuffer view through these traits, which keeps it testable on
//! the host and independent of how the platform exposes its peripherals.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │  panelcast-daemon (process surface)     │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//! ┌─────────────────────────────────────────┐
//! │  panelcast-core (codec, panel, render)  │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//! ┌─────────────────────────────────────────┐
//! │  panelcast-hal (this crate - traits)    │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//!             ┌───────────────┐
//!             │ panelcast-hal-│
//!             │     linux     │
//!             └───────────────┘
//! ```
//!
//! # Traits
//!
//! - [`gpio::OutputPin`] - Digital outputs (data/command select, reset)
//! - [`spi::SpiBus`] - Write-only SPI transport
//! - [`framebuffer::FrameSource`] - Read-only view of the upstream framebuffer
//! - [`time::Clock`] - Monotonic time for throughput diagnostics
//! - [`board::Board`] - Acquisition of all of the above

#![no_std]
#![deny(unsafe_code)]

pub mod board;
pub mod framebuffer;
pub mod gpio;
pub mod spi;
pub mod time;

// Re-export key traits at crate root for convenience
pub use board::{Board, PinRole};
pub use framebuffer::{FrameLayout, FrameSource, FrameSourceError, SliceSource};
pub use gpio::{Level, OutputPin};
pub use spi::{Mode, SpiBus, SpiConfig};
pub use time::Clock;
