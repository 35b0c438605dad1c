//! Resource acquisition
//!
//! A board hands out the concrete pins, bus and framebuffer view. Each
//! resource is released by dropping it, so a caller that only got part of
//! the way through acquisition only releases what it actually holds.

use crate::framebuffer::FrameSource;
use crate::gpio::OutputPin;
use crate::spi::SpiBus;

/// Role of an output line on the panel connector
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PinRole {
    /// Data/command select (low = command, high = data)
    DataCommand,
    /// Controller reset (active low)
    Reset,
}

/// Platform resource provider
pub trait Board {
    /// Output pin type
    type Pin: OutputPin;
    /// SPI bus type
    type Bus: SpiBus;
    /// Framebuffer view type
    type Source: FrameSource;
    /// Acquisition error
    type Error: core::fmt::Debug;

    /// Acquire the output line serving `role`
    fn output_pin(&mut self, role: PinRole) -> Result<Self::Pin, Self::Error>;

    /// Open the SPI bus (unconfigured)
    fn spi_bus(&mut self) -> Result<Self::Bus, Self::Error>;

    /// Map the upstream framebuffer
    fn frame_source(&mut self) -> Result<Self::Source, Self::Error>;
}
