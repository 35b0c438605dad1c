//! Time abstractions
//!
//! Settle delays go through `embedded_hal::delay::DelayNs`; this module
//! only covers reading the time, which the throughput diagnostics need.

/// Monotonic clock
pub trait Clock {
    /// Microseconds since an arbitrary fixed origin
    fn now_micros(&self) -> u64;
}
