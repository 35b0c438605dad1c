//! Panel geometry and addressing windows

/// Visible panel dimensions plus the origin of the visible area inside the
/// controller's memory
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PanelGeometry {
    /// Visible width in pixels
    pub width: u16,
    /// Visible height in pixels
    pub height: u16,
    /// Column of logical x = 0 in controller memory
    pub x_offset: u16,
    /// Row of logical y = 0 in controller memory
    pub y_offset: u16,
}

/// 1.9" 320x170 ST7789 module, landscape; the 170 visible rows sit 35 rows
/// into the controller's 240-row memory
pub const ST7789_320X170: PanelGeometry = PanelGeometry {
    width: 320,
    height: 170,
    x_offset: 0,
    y_offset: 35,
};

/// Scan lines converted and sent per chunk
pub const CHUNK_LINES: usize = 4;

impl PanelGeometry {
    /// Total number of visible pixels
    pub const fn pixel_count(&self) -> usize {
        self.width as usize * self.height as usize
    }

    /// Bytes in one full frame of native pixels
    pub const fn frame_bytes(&self) -> usize {
        self.pixel_count() * 2
    }

    /// Bytes in one native scan line
    pub const fn line_bytes(&self) -> usize {
        self.width as usize * 2
    }

    /// Window covering the whole visible area
    pub const fn full_window(&self) -> Window {
        Window {
            x0: 0,
            y0: 0,
            x1: self.width - 1,
            y1: self.height - 1,
        }
    }
}

/// Inclusive rectangle in logical panel coordinates
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Window {
    pub x0: u16,
    pub y0: u16,
    pub x1: u16,
    pub y1: u16,
}

impl Window {
    /// Create a window; returns `None` if the corners are reversed
    pub const fn new(x0: u16, y0: u16, x1: u16, y1: u16) -> Option<Self> {
        if x1 < x0 || y1 < y0 {
            return None;
        }
        Some(Self { x0, y0, x1, y1 })
    }

    /// Width in pixels
    pub const fn width(&self) -> usize {
        (self.x1 - self.x0) as usize + 1
    }

    /// Height in pixels
    pub const fn height(&self) -> usize {
        (self.y1 - self.y0) as usize + 1
    }

    /// Pixels the controller expects after the window is programmed
    pub const fn pixel_count(&self) -> usize {
        self.width() * self.height()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_full_window() {
        let window = ST7789_320X170.full_window();
        assert_eq!(window, Window::new(0, 0, 319, 169).unwrap());
        assert_eq!(window.pixel_count(), 320 * 170);
        assert_eq!(ST7789_320X170.frame_bytes(), 108_800);
    }

    #[test]
    fn test_reversed_window_rejected() {
        assert!(Window::new(5, 0, 4, 0).is_none());
        assert!(Window::new(0, 3, 0, 2).is_none());
        assert_eq!(Window::new(2, 2, 2, 2).unwrap().pixel_count(), 1);
    }

    #[test]
    fn test_chunk_size() {
        assert_eq!(ST7789_320X170.line_bytes() * CHUNK_LINES, 2560);
        // 170 rows leave a two-line final chunk
        assert_eq!(ST7789_320X170.height as usize % CHUNK_LINES, 2);
    }
}
