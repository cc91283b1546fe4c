//! English Metric Units and slide dimensions.
//!
//! OOXML expresses every length in EMU: 914 400 per inch, 12 700 per point.

use serde::{Deserialize, Serialize};
use std::fmt;

/// EMU per inch.
pub const EMU_PER_INCH: i64 = 914_400;

/// Resolution assumed for rasters that carry no DPI information.
pub const DEFAULT_DPI: i64 = 72;

/// A length in English Metric Units.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Emu(pub i64);

impl Emu {
    /// Convert inches to EMU, truncating any fractional unit.
    pub fn from_inches(inches: f64) -> Self {
        Emu((inches * EMU_PER_INCH as f64) as i64)
    }

    /// Native size of `px` pixels at [`DEFAULT_DPI`].
    pub fn from_pixels(px: u32) -> Self {
        Emu(px as i64 * EMU_PER_INCH / DEFAULT_DPI)
    }

    pub fn to_inches(self) -> f64 {
        self.0 as f64 / EMU_PER_INCH as f64
    }
}

impl fmt::Display for Emu {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Slide canvas dimensions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlideSize {
    pub width: Emu,
    pub height: Emu,
}

impl SlideSize {
    /// 13.33in x 7.5in (16:9).
    pub const WIDESCREEN: SlideSize = SlideSize {
        width: Emu(12_188_952),
        height: Emu(6_858_000),
    };
}

impl Default for SlideSize {
    fn default() -> Self {
        Self::WIDESCREEN
    }
}
