//! 8-bit RGBA colors, hex literals and alpha-over compositing.

use crate::error::HexColorError;
use bytemuck::{Pod, Zeroable};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Byte order used when handing pixels to a display surface
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChannelOrder {
    Rgb,
    #[default]
    Rgba,
    Bgr,
    Bgra,
}

impl ChannelOrder {
    /// Bytes per pixel
    #[inline]
    pub const fn len(self) -> usize {
        match self {
            Self::Rgb | Self::Bgr => 3,
            Self::Rgba | Self::Bgra => 4,
        }
    }

    #[inline]
    pub const fn has_alpha(self) -> bool {
        self.len() == 4
    }
}

/// Straight (non-premultiplied) RGBA pixel.
///
/// `#[repr(C)]` so a `&[Color]` can be viewed as RGBA bytes.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Pod, Zeroable, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const TRANSPARENT: Self = Self::rgba(0, 0, 0, 0);
    pub const BLACK: Self = Self::rgb(0, 0, 0);
    pub const WHITE: Self = Self::rgb(255, 255, 255);

    #[inline]
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    #[inline]
    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Parse `#RRGGBB` or `#RRGGBBAA` (case-insensitive). Usable in const
    /// context, see [`hex_color!`](crate::hex_color).
    pub const fn from_hex(s: &str) -> Result<Self, HexColorError> {
        let bytes = s.as_bytes();
        if bytes.is_empty() || bytes[0] != b'#' {
            return Err(HexColorError::MissingHash);
        }
        if bytes.len() != 7 && bytes.len() != 9 {
            return Err(HexColorError::InvalidLength(bytes.len()));
        }

        let r = match hex_pair(bytes, 1) {
            Ok(v) => v,
            Err(e) => return Err(e),
        };
        let g = match hex_pair(bytes, 3) {
            Ok(v) => v,
            Err(e) => return Err(e),
        };
        let b = match hex_pair(bytes, 5) {
            Ok(v) => v,
            Err(e) => return Err(e),
        };
        let a = if bytes.len() == 9 {
            match hex_pair(bytes, 7) {
                Ok(v) => v,
                Err(e) => return Err(e),
            }
        } else {
            255
        };
        Ok(Self::rgba(r, g, b, a))
    }

    /// Lowercase `#rrggbbaa`
    pub fn to_hex(&self) -> String {
        format!("#{:02x}{:02x}{:02x}{:02x}", self.r, self.g, self.b, self.a)
    }

    /// HSV to RGB. h: 0-360, s: 0-1, v: 0-1
    pub fn from_hsv(h: f64, s: f64, v: f64) -> Self {
        let h = h.rem_euclid(360.0);
        let c = v * s;
        let h_prime = h / 60.0;
        let x = c * (1.0 - ((h_prime % 2.0) - 1.0).abs());
        let m = v - c;

        let (r1, g1, b1) = match h_prime as u32 {
            0 => (c, x, 0.0),
            1 => (x, c, 0.0),
            2 => (0.0, c, x),
            3 => (0.0, x, c),
            4 => (x, 0.0, c),
            _ => (c, 0.0, x),
        };

        Self::rgb(
            unit_to_u8(r1 + m),
            unit_to_u8(g1 + m),
            unit_to_u8(b1 + m),
        )
    }

    #[inline]
    pub const fn with_alpha(self, a: u8) -> Self {
        Self { a, ..self }
    }

    /// Scale alpha by `factor` (clamped to [0, 1]), truncating
    #[inline]
    pub fn with_multiplied_alpha(self, factor: f64) -> Self {
        let factor = factor.clamp(0.0, 1.0);
        self.with_alpha((f64::from(self.a) * factor) as u8)
    }

    /// Alpha-over: `incoming` painted on top of `self`.
    ///
    /// Colors blend as `a_top * c_top + (1 - a_top) * c_bot`, alpha as
    /// `a_bot + (1 - a_bot) * a_top`, all in straight alpha.
    #[inline]
    pub fn composite_over(self, incoming: Color) -> Color {
        match incoming.a {
            0 => return self,
            255 => return incoming,
            _ => {},
        }

        let a_top = f64::from(incoming.a) / 255.0;
        let a_bot = f64::from(self.a) / 255.0;
        let inv = 1.0 - a_top;
        let blend = |top: u8, bot: u8| -> u8 {
            (a_top * f64::from(top) + inv * f64::from(bot)).round() as u8
        };

        Color {
            r: blend(incoming.r, self.r),
            g: blend(incoming.g, self.g),
            b: blend(incoming.b, self.b),
            a: ((a_bot + (1.0 - a_bot) * a_top) * 255.0).round() as u8,
        }
    }

    /// In-place form of [`composite_over`](Self::composite_over)
    #[inline]
    pub fn add_alpha_over(&mut self, incoming: Color) {
        *self = self.composite_over(incoming);
    }

    /// Linear interpolation toward `other`, `t` clamped to [0, 1]
    pub fn lerp(self, other: Color, t: f64) -> Color {
        let t = t.clamp(0.0, 1.0);
        let mix = |a: u8, b: u8| (f64::from(a) + (f64::from(b) - f64::from(a)) * t).round() as u8;
        Color {
            r: mix(self.r, other.r),
            g: mix(self.g, other.g),
            b: mix(self.b, other.b),
            a: mix(self.a, other.a),
        }
    }

    /// Append this pixel's channels to `out` in `order`
    #[inline]
    pub fn extend_formatted(self, order: ChannelOrder, out: &mut Vec<u8>) {
        match order {
            ChannelOrder::Rgb => out.extend_from_slice(&[self.r, self.g, self.b]),
            ChannelOrder::Rgba => out.extend_from_slice(&[self.r, self.g, self.b, self.a]),
            ChannelOrder::Bgr => out.extend_from_slice(&[self.b, self.g, self.r]),
            ChannelOrder::Bgra => out.extend_from_slice(&[self.b, self.g, self.r, self.a]),
        }
    }

    /// Inverse of [`extend_formatted`](Self::extend_formatted). Three-channel
    /// orders come back opaque. `bytes` must hold at least `order.len()` bytes.
    #[inline]
    pub fn from_formatted(order: ChannelOrder, bytes: &[u8]) -> Color {
        match order {
            ChannelOrder::Rgb => Color::rgb(bytes[0], bytes[1], bytes[2]),
            ChannelOrder::Rgba => Color::rgba(bytes[0], bytes[1], bytes[2], bytes[3]),
            ChannelOrder::Bgr => Color::rgb(bytes[2], bytes[1], bytes[0]),
            ChannelOrder::Bgra => Color::rgba(bytes[2], bytes[1], bytes[0], bytes[3]),
        }
    }
}

impl Default for Color {
    fn default() -> Self {
        Self::BLACK
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl FromStr for Color {
    type Err = HexColorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_hex(s)
    }
}

impl TryFrom<String> for Color {
    type Error = HexColorError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::from_hex(&s)
    }
}

impl From<Color> for String {
    fn from(color: Color) -> Self {
        color.to_hex()
    }
}

/// Compile-time checked color literal: `hex_color!("#ff1745")`.
///
/// A malformed literal fails the build.
#[macro_export]
macro_rules! hex_color {
    ($lit:literal) => {
        const {
            match $crate::color::Color::from_hex($lit) {
                Ok(color) => color,
                Err(_) => panic!(concat!("invalid hex color literal: ", $lit)),
            }
        }
    };
}

const fn hex_digit(bytes: &[u8], index: usize) -> Result<u8, HexColorError> {
    let byte = bytes[index];
    match byte {
        b'0'..=b'9' => Ok(byte - b'0'),
        b'a'..=b'f' => Ok(byte - b'a' + 10),
        b'A'..=b'F' => Ok(byte - b'A' + 10),
        _ => Err(HexColorError::InvalidDigit { index, byte }),
    }
}

const fn hex_pair(bytes: &[u8], index: usize) -> Result<u8, HexColorError> {
    let hi = match hex_digit(bytes, index) {
        Ok(v) => v,
        Err(e) => return Err(e),
    };
    let lo = match hex_digit(bytes, index + 1) {
        Ok(v) => v,
        Err(e) => return Err(e),
    };
    Ok(hi * 16 + lo)
}

#[inline]
fn unit_to_u8(v: f64) -> u8 {
    (v.clamp(0.0, 1.0) * 255.0).round() as u8
}
