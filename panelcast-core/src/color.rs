//! Pixel conversion
//!
//! The upstream framebuffer stores 16-bit BGR565 pixels little-endian:
//!
//! ```text
//! high byte: BBBBBGGG   low byte: GGGRRRRR
//! ```
//!
//! The panel wants RGB565 (`RRRRRGGG GGGBBBBB`) clocked out high byte
//! first. Conversion is pure bit extraction; no channel is rescaled.

/// A pixel in the panel's native RGB565 encoding
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct NativeColor(pub u16);

impl NativeColor {
    pub const BLACK: Self = Self(0x0000);
    pub const WHITE: Self = Self(0xFFFF);
    pub const RED: Self = Self(0xF800);
    pub const GREEN: Self = Self(0x07E0);
    pub const BLUE: Self = Self(0x001F);

    /// Build from 8-bit RGB components by truncation
    pub const fn from_rgb(r: u8, g: u8, b: u8) -> Self {
        Self(rgb(r, g, b))
    }

    /// Bytes in bus order (high byte first)
    pub const fn to_be_bytes(self) -> [u8; 2] {
        self.0.to_be_bytes()
    }

    /// Split into (red 0-31, green 0-63, blue 0-31)
    pub const fn channels(self) -> (u8, u8, u8) {
        (
            (self.0 >> 11) as u8,
            ((self.0 >> 5) & 0x3F) as u8,
            (self.0 & 0x1F) as u8,
        )
    }
}

/// Convert one upstream BGR565 pixel to native RGB565
#[inline(always)]
pub const fn convert(low: u8, high: u8) -> u16 {
    let b = (high >> 3) as u16;
    let g = (((high & 0x07) << 3) | (low >> 5)) as u16;
    let r = (low & 0x1F) as u16;
    (r << 11) | (g << 5) | b
}

/// Inverse of [`convert`]: native color back to upstream `[low, high]`
pub const fn to_source(native: u16) -> [u8; 2] {
    let r = ((native >> 11) & 0x1F) as u8;
    let g = ((native >> 5) & 0x3F) as u8;
    let b = (native & 0x1F) as u8;
    let low = ((g & 0x07) << 5) | r;
    let high = (b << 3) | (g >> 3);
    [low, high]
}

/// Pack 8-bit RGB into native RGB565 by dropping the low bits
///
/// Fill colors are given in logical RGB order and skip the upstream
/// channel reorder.
pub const fn rgb(r: u8, g: u8, b: u8) -> u16 {
    (((r & 0xF8) as u16) << 8) | (((g & 0xFC) as u16) << 3) | ((b >> 3) as u16)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    /// Upstream sample for the given 5/6/5 channel values
    fn upstream(r: u8, g: u8, b: u8) -> (u8, u8) {
        let raw: u16 = ((b as u16) << 11) | ((g as u16) << 5) | r as u16;
        let [low, high] = raw.to_le_bytes();
        (low, high)
    }

    #[test]
    fn test_pure_channels_at_full_intensity() {
        let (low, high) = upstream(0x1F, 0, 0);
        assert_eq!(NativeColor(convert(low, high)), NativeColor::RED);

        let (low, high) = upstream(0, 0x3F, 0);
        assert_eq!(NativeColor(convert(low, high)), NativeColor::GREEN);

        let (low, high) = upstream(0, 0, 0x1F);
        assert_eq!(NativeColor(convert(low, high)), NativeColor::BLUE);
    }

    #[test]
    fn test_black_and_white() {
        assert_eq!(convert(0x00, 0x00), 0x0000);
        assert_eq!(convert(0xFF, 0xFF), 0xFFFF);
    }

    #[test]
    fn test_rgb_fill_colors() {
        assert_eq!(NativeColor::from_rgb(255, 0, 0), NativeColor::RED);
        assert_eq!(NativeColor::from_rgb(0, 255, 0), NativeColor::GREEN);
        assert_eq!(NativeColor::from_rgb(0, 0, 255), NativeColor::BLUE);
        assert_eq!(NativeColor::from_rgb(0, 0, 0), NativeColor::BLACK);
        // Low bits are truncated, not rounded
        assert_eq!(rgb(0x07, 0x03, 0x07), 0);
    }

    #[test]
    fn test_be_bytes() {
        assert_eq!(NativeColor::RED.to_be_bytes(), [0xF8, 0x00]);
        assert_eq!(NativeColor::BLUE.to_be_bytes(), [0x00, 0x1F]);
    }

    proptest! {
        #[test]
        fn test_convert_preserves_channels(r in 0u8..32, g in 0u8..64, b in 0u8..32) {
            let (low, high) = upstream(r, g, b);
            let native = NativeColor(convert(low, high));
            prop_assert_eq!(native.channels(), (r, g, b));
        }

        #[test]
        fn test_to_source_inverts_convert(low: u8, high: u8) {
            prop_assert_eq!(to_source(convert(low, high)), [low, high]);
        }

        #[test]
        fn test_convert_is_injective(a: u16, b: u16) {
            let [al, ah] = a.to_le_bytes();
            let [bl, bh] = b.to_le_bytes();
            prop_assert_eq!(convert(al, ah) == convert(bl, bh), a == b);
        }
    }
}
