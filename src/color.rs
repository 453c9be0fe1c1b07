use std::{fmt::Display, str::FromStr};

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Invalid hex color {0:?}, expected RRGGBB or RRGGBBAA")]
pub struct ColorParseError(pub String);

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Default)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    // Named colors

    /// #000000FF
    pub fn black() -> Self {
        Self::rgb(0, 0, 0)
    }

    /// #FFFFFFFF
    pub fn white() -> Self {
        Self::rgb(255, 255, 255)
    }

    /// #FF0000FF
    pub fn red() -> Self {
        Self::rgb(255, 0, 0)
    }

    /// #00FF00FF
    pub fn green() -> Self {
        Self::rgb(0, 255, 0)
    }

    /// #0000FFFF
    pub fn blue() -> Self {
        Self::rgb(0, 0, 255)
    }

    /// #FFFF00FF
    pub fn yellow() -> Self {
        Self::rgb(255, 255, 0)
    }

    /// Parses a hex color string in either RRGGBB or RRGGBBAA format, with or without a
    /// leading '#'.
    pub fn hex(s: &str) -> Result<Self, ColorParseError> {
        let err = || ColorParseError(s.to_owned());
        let digits = s.trim_start_matches('#');

        if !digits.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(err());
        }

        let val = u32::from_str_radix(digits, 16).map_err(|_| err())?;

        // Extract the individual channels
        let (r, g, b, a) = match digits.len() {
            // RRGGBB
            6 => ((val & 0xFF0000) >> 16, (val & 0xFF00) >> 8, val & 0xFF, 255),
            // RRGGBBAA
            8 => (
                (val & 0xFF000000) >> 24,
                (val & 0xFF0000) >> 16,
                (val & 0xFF00) >> 8,
                val & 0xFF,
            ),
            _ => return Err(err()),
        };

        Ok(Self {
            r: r as _,
            g: g as _,
            b: b as _,
            a: a as _,
        })
    }

    /// Constructs a fully opaque color with rgb components
    pub fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    /// Constructs a color from rgba values
    pub fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Linearly interpolates the rgb channels towards `other` by `t`, keeping the alpha of
    /// `self`.
    ///
    /// Every channel is computed as `round(self + (other - self) * t)`. `t` is not clamped;
    /// results outside of `0..=255` saturate and a NaN `t` yields 0.
    pub fn lerp(&self, other: Color, t: f32) -> Self {
        Self {
            r: lerp_channel(self.r, other.r, t),
            g: lerp_channel(self.g, other.g, t),
            b: lerp_channel(self.b, other.b, t),
            a: self.a,
        }
    }
}

impl Display for Color {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "#{:02x}{:02x}{:02x}{:02x}",
            self.r, self.g, self.b, self.a
        )
    }
}

impl FromStr for Color {
    type Err = ColorParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::hex(s)
    }
}

// `as` saturates float to int casts
fn lerp_channel(a: u8, b: u8, t: f32) -> u8 {
    let (a, b) = (a as f32, b as f32);
    (a + (b - a) * t).round() as u8
}
