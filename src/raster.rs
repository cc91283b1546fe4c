//! Cropping source images into slide-ready rasters.

use crate::error::{Error, Result};
use image::{DynamicImage, ImageFormat, ImageReader};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::{BufWriter, Write};
use std::path::Path;

/// Pixels to remove from each edge of a source image.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CropMargins {
    pub left: u32,
    pub right: u32,
    pub top: u32,
    pub bottom: u32,
}

/// Region of a source image kept after cropping.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CropRect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl CropMargins {
    pub fn new(left: u32, right: u32, top: u32, bottom: u32) -> Self {
        Self {
            left,
            right,
            top,
            bottom,
        }
    }

    /// The margin with the largest value.
    pub fn max_margin(&self) -> u32 {
        self.left.max(self.right).max(self.top).max(self.bottom)
    }

    /// Crop rectangle for a `width` x `height` image.
    ///
    /// Fails when the margins leave an empty region on either axis.
    pub fn rect_for(&self, width: u32, height: u32) -> Result<CropRect> {
        let kept_width = (width as u64).checked_sub(self.left as u64 + self.right as u64);
        let kept_height = (height as u64).checked_sub(self.top as u64 + self.bottom as u64);

        match (kept_width, kept_height) {
            (Some(w), Some(h)) if w > 0 && h > 0 => Ok(CropRect {
                x: self.left,
                y: self.top,
                width: w as u32,
                height: h as u32,
            }),
            _ => Err(Error::InvalidCrop {
                width,
                height,
                left: self.left,
                right: self.right,
                top: self.top,
                bottom: self.bottom,
            }),
        }
    }
}

/// A cropped image encoded as PNG.
#[derive(Debug, Clone)]
pub struct CroppedImage {
    pub png: Vec<u8>,
    pub width: u32,
    pub height: u32,
}

/// Load and decode an image, trusting its content over its extension.
pub fn load_image(path: &Path) -> Result<DynamicImage> {
    let img = ImageReader::open(path)?.with_guessed_format()?.decode()?;
    Ok(img)
}

/// Crop `img` by `margins`.
pub fn crop(img: &DynamicImage, margins: &CropMargins) -> Result<DynamicImage> {
    let rect = margins.rect_for(img.width(), img.height())?;
    Ok(img.crop_imm(rect.x, rect.y, rect.width, rect.height))
}

/// Crop the image at `path` and encode the result as PNG.
///
/// The raster goes through a scratch file in `scratch_dir` that is removed
/// before returning.
pub fn crop_file(path: &Path, margins: &CropMargins, scratch_dir: &Path) -> Result<CroppedImage> {
    let img = load_image(path)?;
    let cropped = crop(&img, margins)?;

    let scratch = tempfile::Builder::new()
        .prefix("crop-")
        .suffix(".png")
        .tempfile_in(scratch_dir)?;
    {
        let mut writer = BufWriter::new(scratch.as_file());
        cropped.write_to(&mut writer, ImageFormat::Png)?;
        writer.flush()?;
    }
    let png = fs::read(scratch.path())?;
    scratch.close()?;

    Ok(CroppedImage {
        png,
        width: cropped.width(),
        height: cropped.height(),
    })
}
