/// Color utilities for book spines
///
/// This module handles the two color representations the shelf engine needs:
/// - Hex colors (`#RRGGBB`), which is what users pick and what gets saved
/// - HSL triples, which is the space gradients are interpolated in
///
/// HSL values follow the CSS convention: hue in degrees (0-360),
/// saturation and lightness in percent (0-100).

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Reasons a color string can be rejected
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ColorParseError {
    #[error("empty color string")]
    Empty,
    #[error("invalid hex length")]
    InvalidLength,
    #[error("invalid hex digits")]
    InvalidHex,
}

/// A 24-bit sRGB color as picked by the user
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct HexColor {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl HexColor {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Parse a hex color.
    ///
    /// The leading `#` is optional. Allowed lengths:
    /// * RGB (each digit doubled)
    /// * RRGGBB
    pub fn parse(s: &str) -> Result<Self, ColorParseError> {
        use ColorParseError::*;

        let hex = s.trim();
        let hex = hex.strip_prefix('#').unwrap_or(hex);
        if hex.is_empty() {
            return Err(Empty);
        }

        let nibble = |c: u8| -> Result<u8, ColorParseError> {
            match c {
                b'0'..=b'9' => Ok(c - b'0'),
                b'a'..=b'f' => Ok(c - b'a' + 10),
                b'A'..=b'F' => Ok(c - b'A' + 10),
                _ => Err(InvalidHex),
            }
        };

        let bytes = hex.as_bytes();
        match bytes.len() {
            3 => Ok(Self::new(
                nibble(bytes[0])? * 17,
                nibble(bytes[1])? * 17,
                nibble(bytes[2])? * 17,
            )),
            6 => {
                let pair = |hi: u8, lo: u8| -> Result<u8, ColorParseError> {
                    Ok(nibble(hi)? << 4 | nibble(lo)?)
                };
                Ok(Self::new(
                    pair(bytes[0], bytes[1])?,
                    pair(bytes[2], bytes[3])?,
                    pair(bytes[4], bytes[5])?,
                ))
            }
            _ => Err(InvalidLength),
        }
    }

    /// Convert to HSL (degrees, percent, percent).
    ///
    /// Channels are normalized to [0,1]; lightness is the max/min midpoint,
    /// saturation uses the conditional formula around l = 0.5 and hue the
    /// six-sector formula on whichever channel is maximal.
    pub fn to_hsl(self) -> Hsl {
        let r = self.r as f64 / 255.0;
        let g = self.g as f64 / 255.0;
        let b = self.b as f64 / 255.0;

        let max = r.max(g).max(b);
        let min = r.min(g).min(b);
        let l = (max + min) / 2.0;

        if max == min {
            // achromatic
            return Hsl { h: 0.0, s: 0.0, l: l * 100.0 };
        }

        let d = max - min;
        let s = if l > 0.5 { d / (2.0 - max - min) } else { d / (max + min) };

        let h = if max == r {
            (g - b) / d + if g < b { 6.0 } else { 0.0 }
        } else if max == g {
            (b - r) / d + 2.0
        } else {
            (r - g) / d + 4.0
        };

        Hsl {
            h: h / 6.0 * 360.0,
            s: s * 100.0,
            l: l * 100.0,
        }
    }

    /// Lowercase `#rrggbb` form
    pub fn to_hex(self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

impl fmt::Display for HexColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl FromStr for HexColor {
    type Err = ColorParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for HexColor {
    type Error = ColorParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<HexColor> for String {
    fn from(color: HexColor) -> Self {
        color.to_hex()
    }
}

/// Hue (degrees), saturation (percent), lightness (percent)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Hsl {
    pub h: f64,
    pub s: f64,
    pub l: f64,
}

impl Hsl {
    /// Blend each channel independently.
    ///
    /// Hue is a plain numeric blend of its 0-360 value, so 10° -> 350°
    /// sweeps through 180° rather than wrapping across 0°.
    pub fn lerp(self, other: Hsl, t: f64) -> Hsl {
        Hsl {
            h: lerp(self.h, other.h, t),
            s: lerp(self.s, other.s, t),
            l: lerp(self.l, other.l, t),
        }
    }

    /// Convert back to 24-bit RGB
    pub fn to_rgb(self) -> HexColor {
        // solution from https://www.rapidtables.com/convert/color/hsl-to-rgb.html
        let h = self.h.rem_euclid(360.0);
        let s = (self.s / 100.0).clamp(0.0, 1.0);
        let l = (self.l / 100.0).clamp(0.0, 1.0);

        let c = (1.0 - (2.0 * l - 1.0).abs()) * s;
        let x = c * (1.0 - ((h / 60.0).rem_euclid(2.0) - 1.0).abs());
        let m = l - c / 2.0;

        let (r, g, b) = match h {
            h if h < 60.0 => (c, x, 0.0),
            h if h < 120.0 => (x, c, 0.0),
            h if h < 180.0 => (0.0, c, x),
            h if h < 240.0 => (0.0, x, c),
            h if h < 300.0 => (x, 0.0, c),
            _ => (c, 0.0, x),
        };

        let channel = |v: f64| ((v + m) * 255.0).round().clamp(0.0, 255.0) as u8;
        HexColor::new(channel(r), channel(g), channel(b))
    }
}

impl fmt::Display for Hsl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "hsl({}, {}%, {}%)", self.h, self.s, self.l)
    }
}

/// Linear interpolation: `start + (end - start) * t`
pub fn lerp(start: f64, end: f64, t: f64) -> f64 {
    start + (end - start) * t
}

/// The color a spine is rendered with
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SpineColor {
    /// An explicit user color, rendered as-is
    Anchor(HexColor),
    /// A color interpolated between two anchors
    Blend(Hsl),
}

impl SpineColor {
    /// CSS value for the `--book-c` custom property
    pub fn to_css(&self) -> String {
        match self {
            SpineColor::Anchor(hex) => hex.to_hex(),
            SpineColor::Blend(hsl) => hsl.to_string(),
        }
    }

    pub fn to_rgb(&self) -> HexColor {
        match self {
            SpineColor::Anchor(hex) => *hex,
            SpineColor::Blend(hsl) => hsl.to_rgb(),
        }
    }
}

impl fmt::Display for SpineColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_css())
    }
}
