//! Deck building options.

use crate::error::{Error, Result};
use crate::layout::{HorizontalAlignment, VerticalAlignment};
use crate::raster::CropMargins;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Smallest accepted target picture height, in inches.
pub const MIN_HEIGHT_INCHES: f64 = 1.0;

/// Largest accepted target picture height, in inches.
pub const MAX_HEIGHT_INCHES: f64 = 10.0;

/// Largest accepted crop margin, in pixels.
pub const MAX_CROP_PIXELS: u32 = 1000;

/// Options controlling how images become slides.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DeckOptions {
    /// Pixels removed from each edge before scaling
    pub crop: CropMargins,

    /// Height of every picture on its slide, in inches
    pub target_height_inches: f64,

    /// Horizontal placement on the canvas
    pub horizontal: HorizontalAlignment,

    /// Vertical placement on the canvas
    pub vertical: VerticalAlignment,

    /// Presentation whose masters, layouts and slides seed the deck
    #[serde(skip_serializing_if = "Option::is_none")]
    pub template: Option<PathBuf>,
}

impl Default for DeckOptions {
    fn default() -> Self {
        Self {
            crop: CropMargins::default(),
            target_height_inches: 6.0,
            horizontal: HorizontalAlignment::Right,
            vertical: VerticalAlignment::Bottom,
            template: None,
        }
    }
}

impl DeckOptions {
    /// Create options with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set all four crop margins.
    pub fn with_crop(mut self, crop: CropMargins) -> Self {
        self.crop = crop;
        self
    }

    /// Set the target picture height in inches.
    pub fn with_height(mut self, inches: f64) -> Self {
        self.target_height_inches = inches;
        self
    }

    /// Set both alignment choices.
    pub fn with_alignment(
        mut self,
        horizontal: HorizontalAlignment,
        vertical: VerticalAlignment,
    ) -> Self {
        self.horizontal = horizontal;
        self.vertical = vertical;
        self
    }

    /// Seed the deck from a template presentation.
    pub fn with_template(mut self, template: impl Into<PathBuf>) -> Self {
        self.template = Some(template.into());
        self
    }

    /// Check that the target height can produce a picture at all.
    pub fn check_height(&self) -> Result<()> {
        let h = self.target_height_inches;
        if !h.is_finite() || h <= 0.0 {
            return Err(Error::InvalidOption(format!(
                "target height must be a positive number of inches, got {}",
                h
            )));
        }
        Ok(())
    }

    /// Check every value against the ranges the input form accepts.
    pub fn validate(&self) -> Result<()> {
        self.check_height()?;

        let h = self.target_height_inches;
        if !(MIN_HEIGHT_INCHES..=MAX_HEIGHT_INCHES).contains(&h) {
            return Err(Error::InvalidOption(format!(
                "target height must be between {} and {} inches, got {}",
                MIN_HEIGHT_INCHES, MAX_HEIGHT_INCHES, h
            )));
        }

        let max = self.crop.max_margin();
        if max > MAX_CROP_PIXELS {
            return Err(Error::InvalidOption(format!(
                "crop margins must be at most {} pixels, got {}",
                MAX_CROP_PIXELS, max
            )));
        }

        Ok(())
    }
}
