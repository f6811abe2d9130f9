use std::fmt;
use std::str::FromStr;

use ratatui::style::Color;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ColorParseError {
    #[error("color `{0}` must start with '#'")]
    MissingHash(String),
    #[error("color `{0}` must have exactly six hex digits")]
    BadLength(String),
    #[error("color `{0}` contains a non-hex digit")]
    BadDigit(String),
}

/// An opaque sRGB color that travels over the wire as `#rrggbb`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct HexColor {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl HexColor {
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    pub fn to_color(self) -> Color {
        Color::Rgb(self.r, self.g, self.b)
    }
}

impl FromStr for HexColor {
    type Err = ColorParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let Some(hex) = s.strip_prefix('#') else {
            return Err(ColorParseError::MissingHash(s.to_string()));
        };
        if hex.len() != 6 {
            return Err(ColorParseError::BadLength(s.to_string()));
        }
        if !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(ColorParseError::BadDigit(s.to_string()));
        }
        let channel = |range: std::ops::Range<usize>| {
            u8::from_str_radix(&hex[range], 16)
                .map_err(|_| ColorParseError::BadDigit(s.to_string()))
        };
        Ok(Self {
            r: channel(0..2)?,
            g: channel(2..4)?,
            b: channel(4..6)?,
        })
    }
}

impl TryFrom<String> for HexColor {
    type Error = ColorParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<HexColor> for String {
    fn from(color: HexColor) -> Self {
        color.to_string()
    }
}

impl fmt::Display for HexColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

/// A color with straight (non-premultiplied) alpha.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Rgba {
    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// `color` at `percent` opacity (0..=100).
    pub fn with_opacity(color: HexColor, percent: u8) -> Self {
        let percent = u32::from(percent.min(100));
        let a = (percent * 255 + 50) / 100;
        Self::rgba(color.r, color.g, color.b, a as u8)
    }

    /// Source-over composite onto an opaque backdrop.
    pub fn over(self, backdrop: HexColor) -> HexColor {
        let a = u32::from(self.a);
        let mix = |src: u8, dst: u8| -> u8 {
            ((u32::from(src) * a + u32::from(dst) * (255 - a) + 127) / 255) as u8
        };
        HexColor::rgb(
            mix(self.r, backdrop.r),
            mix(self.g, backdrop.g),
            mix(self.b, backdrop.b),
        )
    }

    pub fn is_opaque(self) -> bool {
        self.a == 255
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_lowercase_and_uppercase() {
        assert_eq!("#e0e0e0".parse::<HexColor>().unwrap(), HexColor::rgb(0xe0, 0xe0, 0xe0));
        assert_eq!("#FF0000".parse::<HexColor>().unwrap(), HexColor::rgb(255, 0, 0));
    }

    #[test]
    fn test_parse_rejects_malformed() {
        assert!(matches!("e0e0e0".parse::<HexColor>(), Err(ColorParseError::MissingHash(_))));
        assert!(matches!("#fff".parse::<HexColor>(), Err(ColorParseError::BadLength(_))));
        assert!(matches!("#gg0000".parse::<HexColor>(), Err(ColorParseError::BadDigit(_))));
        // multi-byte chars must not slice mid-codepoint
        assert!("#ééé".parse::<HexColor>().is_err());
    }

    #[test]
    fn test_display_is_lowercase() {
        assert_eq!(HexColor::rgb(0xAB, 0x01, 0xFF).to_string(), "#ab01ff");
    }

    #[test]
    fn test_serde_uses_hex_string() {
        let json = serde_json::to_string(&HexColor::rgb(255, 0, 0)).unwrap();
        assert_eq!(json, "\"#ff0000\"");
        let back: HexColor = serde_json::from_str("\"#00FF00\"").unwrap();
        assert_eq!(back, HexColor::rgb(0, 255, 0));
        assert!(serde_json::from_str::<HexColor>("\"red\"").is_err());
    }

    #[test]
    fn test_with_opacity_bounds() {
        let c = HexColor::rgb(10, 20, 30);
        assert_eq!(Rgba::with_opacity(c, 0).a, 0);
        assert_eq!(Rgba::with_opacity(c, 50).a, 128);
        assert_eq!(Rgba::with_opacity(c, 100).a, 255);
        assert_eq!(Rgba::with_opacity(c, 250).a, 255);
    }

    #[test]
    fn test_over_extremes() {
        let backdrop = HexColor::rgb(0, 0, 0);
        let red = HexColor::rgb(255, 0, 0);
        assert_eq!(Rgba::with_opacity(red, 100).over(backdrop), red);
        assert_eq!(Rgba::with_opacity(red, 0).over(backdrop), backdrop);
        assert_eq!(Rgba::with_opacity(red, 50).over(backdrop), HexColor::rgb(128, 0, 0));
    }
}
