//! GPIO pin abstractions
//!
//! The panel only needs outputs: the data/command select line and the
//! active-low reset line.

/// Logic level of a digital line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Level {
    /// Logic 0
    Low,
    /// Logic 1
    High,
}

impl Level {
    /// Check if this is logic 1
    pub fn is_high(self) -> bool {
        matches!(self, Level::High)
    }
}

impl From<bool> for Level {
    fn from(high: bool) -> Self {
        if high {
            Level::High
        } else {
            Level::Low
        }
    }
}

/// Digital output pin
///
/// `set` must not return before the new level is driven on the line: the
/// data/command select has to be settled before the bus transfer that
/// depends on it begins.
pub trait OutputPin {
    /// Error type for pin operations
    type Error: core::fmt::Debug;

    /// Drive the pin to `level`
    fn set(&mut self, level: Level) -> Result<(), Self::Error>;

    /// Set the pin high (logic 1)
    fn set_high(&mut self) -> Result<(), Self::Error> {
        self.set(Level::High)
    }

    /// Set the pin low (logic 0)
    fn set_low(&mut self) -> Result<(), Self::Error> {
        self.set(Level::Low)
    }
}
