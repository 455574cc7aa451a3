use crate::foundation::error::{EngineError, EngineResult};

/// Straight-alpha 8-bit ARGB color. Every pixel format converts through this type.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize,
)]
pub struct Color {
    /// Alpha channel.
    pub a: u8,
    /// Red channel.
    pub r: u8,
    /// Green channel.
    pub g: u8,
    /// Blue channel.
    pub b: u8,
}

impl Color {
    /// Fully transparent black.
    pub const TRANSPARENT: Self = Self::from_argb(0, 0, 0, 0);
    /// Opaque black.
    pub const BLACK: Self = Self::from_rgb(0, 0, 0);
    /// Opaque white.
    pub const WHITE: Self = Self::from_rgb(255, 255, 255);
    /// Opaque red.
    pub const RED: Self = Self::from_rgb(255, 0, 0);
    /// Opaque green.
    pub const GREEN: Self = Self::from_rgb(0, 255, 0);
    /// Opaque blue.
    pub const BLUE: Self = Self::from_rgb(0, 0, 255);

    /// Build from alpha and color channels.
    pub const fn from_argb(a: u8, r: u8, g: u8, b: u8) -> Self {
        Self { a, r, g, b }
    }

    /// Build an opaque color.
    pub const fn from_rgb(r: u8, g: u8, b: u8) -> Self {
        Self::from_argb(255, r, g, b)
    }

    /// Same color with a different alpha.
    pub const fn with_alpha(self, a: u8) -> Self {
        Self { a, ..self }
    }

    /// Parse `#RRGGBB` or `#AARRGGBB` (leading `#` optional).
    pub fn parse_hex(s: &str) -> EngineResult<Self> {
        let hex = s.trim().trim_start_matches('#');
        let byte = |i: usize| -> EngineResult<u8> {
            hex.get(i..i + 2)
                .and_then(|h| u8::from_str_radix(h, 16).ok())
                .ok_or_else(|| EngineError::validation(format!("invalid color literal '{s}'")))
        };
        match hex.len() {
            6 => Ok(Self::from_rgb(byte(0)?, byte(2)?, byte(4)?)),
            8 => Ok(Self::from_argb(byte(0)?, byte(2)?, byte(4)?, byte(6)?)),
            _ => Err(EngineError::validation(format!(
                "invalid color literal '{s}'"
            ))),
        }
    }

    /// BT.601 luma approximation in integer arithmetic.
    pub fn luminance(self) -> u8 {
        ((u32::from(self.r) * 77 + u32::from(self.g) * 150 + u32::from(self.b) * 29 + 128) >> 8)
            as u8
    }
}
