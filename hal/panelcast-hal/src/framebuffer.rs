//! Upstream framebuffer abstraction
//!
//! A frame source is a fixed-shape, read-only byte region that another
//! process renders into. Pixel `(col, row)` starts at
//! `row * stride + col * bytes_per_pixel`.

/// Shape of the upstream framebuffer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct FrameLayout {
    /// Bytes per scan line
    pub stride: usize,
    /// Bytes per pixel of the upstream encoding
    pub bytes_per_pixel: usize,
    /// Number of scan lines
    pub height: usize,
}

impl FrameLayout {
    /// Total size of the region in bytes
    pub const fn len(&self) -> usize {
        self.stride * self.height
    }

    /// Check if the region is empty
    pub const fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Byte offset of pixel `(col, row)`
    pub const fn offset(&self, col: usize, row: usize) -> usize {
        row * self.stride + col * self.bytes_per_pixel
    }

    /// Check that a `width` x `height` panel can be read from this layout
    ///
    /// Each scan line must hold `width` pixels of at least two bytes.
    pub const fn covers(&self, width: usize, height: usize) -> bool {
        self.bytes_per_pixel >= 2
            && self.stride >= width * self.bytes_per_pixel
            && self.height >= height
    }
}

/// Frame source errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FrameSourceError {
    /// Requested range lies outside the mapped region
    OutOfBounds,
    /// Layout cannot hold the panel
    LayoutMismatch,
}

/// Read-only view of the upstream framebuffer
///
/// Contents may change between reads; reads are neither atomic nor
/// fenced beyond what the platform gives mapped memory by default.
pub trait FrameSource {
    /// Shape of the region; never changes during a run
    fn layout(&self) -> FrameLayout;

    /// Borrow `length` bytes starting at `offset`
    fn read(&self, offset: usize, length: usize) -> Result<&[u8], FrameSourceError>;
}

/// Frame source over a plain byte slice
///
/// Used for still images and host-side testing.
#[derive(Debug, Clone, Copy)]
pub struct SliceSource<'a> {
    data: &'a [u8],
    layout: FrameLayout,
}

impl<'a> SliceSource<'a> {
    /// Wrap `data`, which must be at least `layout.len()` bytes
    pub fn new(data: &'a [u8], layout: FrameLayout) -> Result<Self, FrameSourceError> {
        if data.len() < layout.len() {
            return Err(FrameSourceError::LayoutMismatch);
        }
        Ok(Self { data, layout })
    }
}

impl FrameSource for SliceSource<'_> {
    fn layout(&self) -> FrameLayout {
        self.layout
    }

    fn read(&self, offset: usize, length: usize) -> Result<&[u8], FrameSourceError> {
        let end = offset
            .checked_add(length)
            .ok_or(FrameSourceError::OutOfBounds)?;
        self.data
            .get(offset..end)
            .ok_or(FrameSourceError::OutOfBounds)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const LAYOUT: FrameLayout = FrameLayout {
        stride: 8,
        bytes_per_pixel: 2,
        height: 2,
    };

    #[test]
    fn test_offset() {
        assert_eq!(LAYOUT.offset(0, 0), 0);
        assert_eq!(LAYOUT.offset(3, 0), 6);
        assert_eq!(LAYOUT.offset(1, 1), 10);
        assert_eq!(LAYOUT.len(), 16);
    }

    #[test]
    fn test_covers() {
        assert!(LAYOUT.covers(4, 2));
        assert!(LAYOUT.covers(3, 1));
        // Stride too short for five 2-byte pixels
        assert!(!LAYOUT.covers(5, 2));
        assert!(!LAYOUT.covers(4, 3));

        let narrow = FrameLayout {
            bytes_per_pixel: 1,
            ..LAYOUT
        };
        assert!(!narrow.covers(4, 2));
    }

    #[test]
    fn test_slice_source_reads() {
        let data: [u8; 16] = core::array::from_fn(|i| i as u8);
        let source = SliceSource::new(&data, LAYOUT).unwrap();

        assert_eq!(source.read(8, 4).unwrap(), &[8, 9, 10, 11]);
        assert_eq!(source.read(14, 3), Err(FrameSourceError::OutOfBounds));
        assert_eq!(source.read(usize::MAX, 2), Err(FrameSourceError::OutOfBounds));
    }

    #[test]
    fn test_slice_source_too_small() {
        let data = [0u8; 15];
        assert_eq!(
            SliceSource::new(&data, LAYOUT).unwrap_err(),
            FrameSourceError::LayoutMismatch
        );
    }
}
