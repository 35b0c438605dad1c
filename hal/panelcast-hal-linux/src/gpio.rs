//! Sysfs GPIO outputs
//!
//! Lines are exported through `<root>/export`, switched to output through
//! `gpioN/direction`, and driven through `gpioN/value`. The value file is
//! kept open so each level change is a single `pwrite`.

use std::fs::{self, File, OpenOptions};
use std::io;
use std::os::unix::fs::FileExt;
use std::path::{Path, PathBuf};
use std::thread;
use std::time::Duration;

use log::debug;
use panelcast_hal::{Level, OutputPin};
use thiserror::Error;

/// Default sysfs GPIO directory
pub const SYSFS_GPIO_ROOT: &str = "/sys/class/gpio";

/// Wait after writing to `export` before the pin directory appears
const EXPORT_SETTLE: Duration = Duration::from_millis(10);

/// Wait for udev to fix up permissions on a freshly exported pin
const PERMISSION_SETTLE: Duration = Duration::from_millis(100);

/// GPIO errors
#[derive(Debug, Error)]
pub enum GpioError {
    #[error("failed to export GPIO {number}: {source}")]
    Export { number: u32, source: io::Error },

    #[error("failed to set GPIO {number} as output: {source}")]
    Direction { number: u32, source: io::Error },

    #[error("failed to open GPIO {number} value: {source}")]
    Open { number: u32, source: io::Error },

    #[error("failed to write GPIO {number}: {source}")]
    Write { number: u32, source: io::Error },
}

/// An exported sysfs GPIO line configured as output
#[derive(Debug)]
pub struct SysfsPin {
    number: u32,
    value: File,
}

impl SysfsPin {
    /// Export `number` under `root` (if needed) and make it an output
    pub fn export(root: impl AsRef<Path>, number: u32) -> Result<Self, GpioError> {
        let root = root.as_ref();
        let pin_dir = pin_dir(root, number);

        if !pin_dir.exists() {
            debug!("Exporting GPIO {}", number);
            fs::write(root.join("export"), number.to_string())
                .map_err(|source| GpioError::Export { number, source })?;
            thread::sleep(EXPORT_SETTLE);
            thread::sleep(PERMISSION_SETTLE);
        }

        fs::write(pin_dir.join("direction"), "out")
            .map_err(|source| GpioError::Direction { number, source })?;

        let value = OpenOptions::new()
            .write(true)
            .open(pin_dir.join("value"))
            .map_err(|source| GpioError::Open { number, source })?;

        Ok(Self { number, value })
    }

    /// GPIO number
    pub fn number(&self) -> u32 {
        self.number
    }
}

impl OutputPin for SysfsPin {
    type Error = GpioError;

    fn set(&mut self, level: Level) -> Result<(), GpioError> {
        let byte: &[u8] = if level.is_high() { b"1" } else { b"0" };
        self.value
            .write_at(byte, 0)
            .map(|_| ())
            .map_err(|source| GpioError::Write {
                number: self.number,
                source,
            })
    }
}

fn pin_dir(root: &Path, number: u32) -> PathBuf {
    root.join(format!("gpio{}", number))
}
