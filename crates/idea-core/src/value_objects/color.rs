//! Embed colour as a 24-bit RGB value

use serde::{Deserialize, Serialize};
use std::fmt;

/// 24-bit RGB colour of an idea post
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Color(u32);

impl Color {
    /// Negative rating band
    pub const RED: Color = Color(0x00ED_4245);
    /// Neutral rating band
    pub const YELLOW: Color = Color(0x00FE_E75C);
    /// Positive rating band
    pub const GREEN: Color = Color(0x0057_F287);
    /// Default post colour for new channels
    pub const BLURPLE: Color = Color(0x0058_65F2);

    #[inline]
    pub const fn new(rgb: u32) -> Self {
        Self(rgb & 0x00FF_FFFF)
    }

    #[inline]
    pub const fn rgb(self) -> u32 {
        self.0
    }
}

/// Error when parsing a `#rrggbb` colour
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid colour `{0}`, expected #rrggbb")]
pub struct ColorParseError(pub String);

impl std::str::FromStr for Color {
    type Err = ColorParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let hex = s.trim().trim_start_matches('#');
        if hex.len() != 6 {
            return Err(ColorParseError(s.to_string()));
        }
        u32::from_str_radix(hex, 16)
            .map(Color::new)
            .map_err(|_| ColorParseError(s.to_string()))
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:06x}", self.0)
    }
}
