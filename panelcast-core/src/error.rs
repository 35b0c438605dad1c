//! Display errors

use panelcast_hal::FrameSourceError;

/// Errors raised by the rendering pipeline
///
/// Transport errors are logged where they occur and collapsed into a
/// variant here; the panel link is write-only so nothing finer is
/// actionable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DisplayError {
    /// SPI bus write or configuration failed
    Bus,
    /// GPIO write failed
    Pin,
    /// Framebuffer read failed
    Source(FrameSourceError),
    /// No framebuffer attached
    SourceUnavailable,
    /// Transfer buffer not allocated
    BufferUnavailable,
    /// Bus or pins not acquired
    NotInitialized,
    /// Transfer buffer too small for one chunk
    BufferTooSmall,
    /// Platform could not provide a resource
    Acquire,
}

impl From<FrameSourceError> for DisplayError {
    fn from(e: FrameSourceError) -> Self {
        DisplayError::Source(e)
    }
}

impl core::fmt::Display for DisplayError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            DisplayError::Bus => f.write_str("SPI transfer failed"),
            DisplayError::Pin => f.write_str("GPIO write failed"),
            DisplayError::Source(e) => write!(f, "framebuffer read failed: {:?}", e),
            DisplayError::SourceUnavailable => f.write_str("framebuffer not attached"),
            DisplayError::BufferUnavailable => f.write_str("transfer buffer not allocated"),
            DisplayError::NotInitialized => f.write_str("display not initialized"),
            DisplayError::BufferTooSmall => f.write_str("transfer buffer too small"),
            DisplayError::Acquire => f.write_str("resource acquisition failed"),
        }
    }
}
