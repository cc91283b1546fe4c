//! Deck building: one cropped, scaled and aligned picture per slide.

use crate::deck::Deck;
use crate::error::Result;
use crate::layout::{self, Frame};
use crate::options::DeckOptions;
use crate::raster;
use crate::units::{Emu, SlideSize};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// What happened to one input image.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum ImageOutcome {
    /// The image became slide number `slide` (1-based, template slides included).
    Added {
        image: PathBuf,
        slide: usize,
        frame: Frame,
    },
    /// The image was left out of the deck.
    Skipped { image: PathBuf, reason: String },
}

impl ImageOutcome {
    pub fn image(&self) -> &Path {
        match self {
            ImageOutcome::Added { image, .. } | ImageOutcome::Skipped { image, .. } => image,
        }
    }

    pub fn is_added(&self) -> bool {
        matches!(self, ImageOutcome::Added { .. })
    }
}

/// Result of a build run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BuildReport {
    /// Where the deck was saved; `None` when there was nothing to build
    pub output: Option<PathBuf>,
    /// One entry per input image, in input order
    pub outcomes: Vec<ImageOutcome>,
}

impl BuildReport {
    pub fn added(&self) -> usize {
        self.outcomes.iter().filter(|o| o.is_added()).count()
    }

    pub fn skipped(&self) -> usize {
        self.outcomes.len() - self.added()
    }

    /// Skipped images with their reasons.
    pub fn skipped_images(&self) -> impl Iterator<Item = (&Path, &str)> {
        self.outcomes.iter().filter_map(|o| match o {
            ImageOutcome::Skipped { image, reason } => Some((image.as_path(), reason.as_str())),
            ImageOutcome::Added { .. } => None,
        })
    }
}

/// A picture ready to be placed on a slide.
#[derive(Debug, Clone)]
pub struct PreparedPicture {
    pub png: Vec<u8>,
    pub native_width: Emu,
    pub native_height: Emu,
    pub frame: Frame,
}

/// Builds widescreen decks from image files.
///
/// # Example
///
/// ```no_run
/// use imgdeck::{DeckBuilder, DeckOptions, HorizontalAlignment, VerticalAlignment};
/// use std::path::PathBuf;
///
/// let options = DeckOptions::new()
///     .with_height(5.0)
///     .with_alignment(HorizontalAlignment::Center, VerticalAlignment::Middle);
/// let images: Vec<PathBuf> = vec!["a.png".into(), "b.jpg".into()];
/// let report = DeckBuilder::new(options).build("deck.pptx", &images)?;
/// println!("{} slides, {} skipped", report.added(), report.skipped());
/// # Ok::<(), imgdeck::Error>(())
/// ```
#[derive(Debug, Clone, Default)]
pub struct DeckBuilder {
    options: DeckOptions,
    canvas: SlideSize,
    scratch_dir: Option<PathBuf>,
}

impl DeckBuilder {
    pub fn new(options: DeckOptions) -> Self {
        Self {
            options,
            canvas: SlideSize::WIDESCREEN,
            scratch_dir: None,
        }
    }

    /// Keep scratch rasters under `dir` instead of the system temp dir.
    pub fn with_scratch_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.scratch_dir = Some(dir.into());
        self
    }

    pub fn options(&self) -> &DeckOptions {
        &self.options
    }

    fn scratch_base(&self) -> PathBuf {
        self.scratch_dir.clone().unwrap_or_else(std::env::temp_dir)
    }

    /// Open the deck the pictures go into, sized to the widescreen canvas.
    pub fn open_deck(&self) -> Result<Deck> {
        let mut deck = match &self.options.template {
            Some(path) => Deck::open_template(path)?,
            None => Deck::new()?,
        };
        deck.set_slide_size(self.canvas);
        Ok(deck)
    }

    /// Crop, scale and place the image at `path`.
    pub fn prepare(&self, path: &Path) -> Result<PreparedPicture> {
        self.prepare_in(path, &self.scratch_base())
    }

    fn prepare_in(&self, path: &Path, scratch_dir: &Path) -> Result<PreparedPicture> {
        let cropped = raster::crop_file(path, &self.options.crop, scratch_dir)?;

        // Inserted at (0, 0) with its native size, then resized and moved
        let native_width = Emu::from_pixels(cropped.width);
        let native_height = Emu::from_pixels(cropped.height);
        let target = Emu::from_inches(self.options.target_height_inches);
        let (width, height) = layout::scale_to_height(native_width, native_height, target);
        let frame = layout::place(
            self.canvas,
            width,
            height,
            self.options.horizontal,
            self.options.vertical,
        );

        Ok(PreparedPicture {
            png: cropped.png,
            native_width,
            native_height,
            frame,
        })
    }

    /// Build a deck from `images` and save it to `output`.
    ///
    /// A failing image is logged, recorded as skipped and left out; the deck
    /// is saved even when every image was skipped. With no images at all
    /// nothing is written and the report has no output path.
    pub fn build(&self, output: impl AsRef<Path>, images: &[PathBuf]) -> Result<BuildReport> {
        self.options.check_height()?;
        let mut deck = self.open_deck()?;

        let mut report = BuildReport::default();
        if images.is_empty() {
            log::warn!("No images found to add to the presentation.");
            return Ok(report);
        }

        let run_dir = tempfile::Builder::new()
            .prefix("imgdeck-run-")
            .tempdir_in(self.scratch_base())?;

        for image in images {
            match self.prepare_in(image, run_dir.path()) {
                Ok(picture) => {
                    let slide =
                        deck.add_picture_slide(picture.png, &description(image), picture.frame);
                    log::debug!("Added {} as slide {}", image.display(), slide);
                    report.outcomes.push(ImageOutcome::Added {
                        image: image.clone(),
                        slide,
                        frame: picture.frame,
                    });
                }
                Err(e) => {
                    log::warn!("Could not add image '{}': {}", image.display(), e);
                    report.outcomes.push(ImageOutcome::Skipped {
                        image: image.clone(),
                        reason: e.to_string(),
                    });
                }
            }
        }

        drop(run_dir);

        let output = output.as_ref();
        deck.save(output)?;
        log::info!(
            "Presentation created with {} slides ({} images skipped): {}",
            deck.slide_count(),
            report.skipped(),
            output.display()
        );

        report.output = Some(output.to_path_buf());
        Ok(report)
    }
}

/// Alt text for a picture: the image's file name.
fn description(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}
