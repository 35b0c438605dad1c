//! Linux userspace implementation of the Panelcast HAL
//!
//! Provides:
//! - GPIO outputs through the sysfs GPIO interface
//! - SPI through spidev
//! - The upstream framebuffer as a read-only shared mapping of the fbdev node
//! - Sleep-based delays and an `Instant`-based clock
//! - [`LinuxBoard`], which hands all of these out from one configuration

pub mod board;
pub mod delay;
pub mod framebuffer;
pub mod gpio;
pub mod spi;

pub use board::{BoardConfig, BoardError, LinuxBoard};
pub use delay::{StdClock, StdDelay};
pub use framebuffer::{FramebufferError, MappedFramebuffer};
pub use gpio::{GpioError, SysfsPin};
pub use spi::{SpiError, SpidevBus};
