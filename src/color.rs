//! RGBA color value type
//!
//! Channels are floats in [0,1]. Colors are plain values with no identity;
//! every operation returns a new color.

use std::fmt;

/// An RGBA color, each channel in [0,1]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

/// Error returned when a hex color string does not match `rrggbb`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColorParseError {
    input: String,
}

impl fmt::Display for ColorParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid hex color {:?}, expected 6 hex digits", self.input)
    }
}

impl std::error::Error for ColorParseError {}

impl Color {
    pub const fn new(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    pub const fn rgb(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b, a: 1.0 }
    }

    pub const WHITE: Color = Color::rgb(1.0, 1.0, 1.0);
    pub const BLACK: Color = Color::rgb(0.0, 0.0, 0.0);

    /// Copy with a replaced alpha; the original is unchanged
    #[inline]
    pub fn with_alpha(self, a: f32) -> Self {
        Self { a, ..self }
    }

    /// Blend toward the luminance gray by `t` (0 = unchanged, 1 = fully gray).
    ///
    /// Uses the Rec. 601 luma weights.
    pub fn desaturate(self, t: f32) -> Self {
        let t = t.clamp(0.0, 1.0);
        let luma = 0.299 * self.r + 0.587 * self.g + 0.114 * self.b;
        Self {
            r: self.r + (luma - self.r) * t,
            g: self.g + (luma - self.g) * t,
            b: self.b + (luma - self.b) * t,
            a: self.a,
        }
    }

    /// Parse a 6-hex-digit `rrggbb` string (no leading `#`)
    pub fn from_hex(s: &str) -> Result<Self, ColorParseError> {
        let err = || ColorParseError {
            input: s.to_string(),
        };
        if s.len() != 6 || !s.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(err());
        }
        let channel = |range: std::ops::Range<usize>| -> Result<f32, ColorParseError> {
            u8::from_str_radix(&s[range], 16)
                .map(|v| v as f32 / 255.0)
                .map_err(|_| err())
        };
        Ok(Self {
            r: channel(0..2)?,
            g: channel(2..4)?,
            b: channel(4..6)?,
            a: 1.0,
        })
    }

    /// Device color string with r/g/b scaled to 0-255
    pub fn to_css(self) -> String {
        format!(
            "rgba({},{},{},{})",
            (self.r * 255.0).round() as u8,
            (self.g * 255.0).round() as u8,
            (self.b * 255.0).round() as u8,
            self.a
        )
    }

    /// Channels as an array for GPU upload
    #[inline]
    pub fn as_array(self) -> [f32; 4] {
        [self.r, self.g, self.b, self.a]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn from_hex_parses_channels() {
        let c = Color::from_hex("ff8000").unwrap();
        assert!((c.r - 1.0).abs() < 1e-6);
        assert!((c.g - 128.0 / 255.0).abs() < 1e-6);
        assert!(c.b.abs() < 1e-6);
        assert_eq!(c.a, 1.0);
    }

    #[test]
    fn from_hex_rejects_bad_input() {
        assert!(Color::from_hex("").is_err());
        assert!(Color::from_hex("fff").is_err());
        assert!(Color::from_hex("gg0000").is_err());
        assert!(Color::from_hex("#ff8000").is_err());
        assert!(Color::from_hex("ff80001").is_err());
    }

    #[test]
    fn with_alpha_leaves_original_unchanged() {
        let c = Color::rgb(0.2, 0.4, 0.6);
        let faded = c.with_alpha(0.5);
        assert_eq!(c.a, 1.0);
        assert_eq!(faded.a, 0.5);
        assert_eq!(faded.r, c.r);
    }

    #[test]
    fn desaturate_full_is_gray() {
        let c = Color::rgb(1.0, 0.0, 0.0).desaturate(1.0);
        assert!((c.r - c.g).abs() < 1e-6);
        assert!((c.g - c.b).abs() < 1e-6);
        // Red's luma
        assert!((c.r - 0.299).abs() < 1e-6);
    }

    #[test]
    fn desaturate_zero_is_identity() {
        let c = Color::rgb(0.3, 0.5, 0.7);
        assert_eq!(c.desaturate(0.0), c);
    }

    #[test]
    fn to_css_scales_to_255() {
        let c = Color::new(1.0, 0.0, 0.5, 0.25);
        assert_eq!(c.to_css(), "rgba(255,0,128,0.25)");
    }

    proptest! {
        #[test]
        fn hex_round_trip(r in 0u8..=255, g in 0u8..=255, b in 0u8..=255) {
            let s = format!("{:02x}{:02x}{:02x}", r, g, b);
            let c = Color::from_hex(&s).unwrap();
            prop_assert!((c.r - r as f32 / 255.0).abs() < 1e-6);
            prop_assert!((c.g - g as f32 / 255.0).abs() < 1e-6);
            prop_assert!((c.b - b as f32 / 255.0).abs() < 1e-6);
        }

        #[test]
        fn desaturate_stays_in_range(
            r in 0.0f32..=1.0, g in 0.0f32..=1.0, b in 0.0f32..=1.0,
            t in 0.0f32..=1.0,
        ) {
            let c = Color::rgb(r, g, b).desaturate(t);
            for ch in [c.r, c.g, c.b] {
                prop_assert!((0.0..=1.0).contains(&ch));
            }
        }
    }
}
