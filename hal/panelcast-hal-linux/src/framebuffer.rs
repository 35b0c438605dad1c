//! fbdev framebuffer mapped read-only

use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};

use log::debug;
use memmap2::{Mmap, MmapOptions};
use panelcast_hal::{FrameLayout, FrameSource, FrameSourceError};
use thiserror::Error;

/// Default framebuffer node
pub const FRAMEBUFFER_DEVICE: &str = "/dev/fb0";

/// Framebuffer errors
#[derive(Debug, Error)]
pub enum FramebufferError {
    #[error("failed to open {path}: {source}")]
    Open { path: PathBuf, source: io::Error },

    #[error("failed to map {path}: {source}")]
    Map { path: PathBuf, source: io::Error },

    #[error("{path} holds {actual} bytes, layout needs {required}")]
    TooSmall {
        path: PathBuf,
        actual: u64,
        required: usize,
    },

    #[error("framebuffer layout is empty")]
    EmptyLayout,
}

/// Shared read-only mapping of a framebuffer device
#[derive(Debug)]
pub struct MappedFramebuffer {
    map: Mmap,
    layout: FrameLayout,
}

impl MappedFramebuffer {
    /// Map `layout.len()` bytes of `path`
    pub fn open(path: impl AsRef<Path>, layout: FrameLayout) -> Result<Self, FramebufferError> {
        let path = path.as_ref();
        if layout.is_empty() {
            return Err(FramebufferError::EmptyLayout);
        }

        let file = File::open(path).map_err(|source| FramebufferError::Open {
            path: path.to_path_buf(),
            source,
        })?;

        // Device nodes report a zero length, only plain files can be checked
        if let Ok(meta) = file.metadata() {
            if meta.is_file() && meta.len() < layout.len() as u64 {
                return Err(FramebufferError::TooSmall {
                    path: path.to_path_buf(),
                    actual: meta.len(),
                    required: layout.len(),
                });
            }
        }

        // SAFETY: the mapping is read-only and shared. Another process may
        // write into it while we read; torn pixels are acceptable and no
        // bytes are interpreted beyond plain integers.
        let map = unsafe { MmapOptions::new().len(layout.len()).map(&file) }.map_err(|source| {
            FramebufferError::Map {
                path: path.to_path_buf(),
                source,
            }
        })?;

        debug!("Mapped {} bytes of {}", layout.len(), path.display());
        Ok(Self { map, layout })
    }
}

impl FrameSource for MappedFramebuffer {
    fn layout(&self) -> FrameLayout {
        self.layout
    }

    fn read(&self, offset: usize, length: usize) -> Result<&[u8], FrameSourceError> {
        let end = offset
            .checked_add(length)
            .ok_or(FrameSourceError::OutOfBounds)?;
        self.map
            .get(offset..end)
            .ok_or(FrameSourceError::OutOfBounds)
    }
}
