//! # imgdeck
//!
//! Turn a ZIP archive of images into a widescreen PowerPoint deck.
//!
//! Every image becomes one slide: it is cropped by fixed pixel margins,
//! scaled to a target height with its aspect ratio kept, and aligned on a
//! 13.33in x 7.5in canvas. An existing presentation can serve as template.
//!
//! ## Quick Start
//!
//! ```no_run
//! use imgdeck::{build_deck, extract_images, DeckOptions};
//! use imgdeck::raster::CropMargins;
//!
//! let scratch = tempfile::tempdir()?;
//! let images = extract_images(std::fs::File::open("photos.zip")?, scratch.path())?;
//!
//! let options = DeckOptions::new()
//!     .with_crop(CropMargins::new(250, 0, 0, 42))
//!     .with_height(6.0);
//! let report = build_deck("photos.pptx", &images, &options)?;
//! println!("{} slides", report.added());
//! # Ok::<(), imgdeck::Error>(())
//! ```
//!
//! ## Reading a deck back
//!
//! ```no_run
//! use imgdeck::DeckSummary;
//!
//! let summary = DeckSummary::open("photos.pptx")?;
//! for picture in summary.pictures() {
//!     println!("{:?}", picture.frame);
//! }
//! # Ok::<(), imgdeck::Error>(())
//! ```

pub mod archive;
pub mod builder;
pub mod container;
pub mod deck;
pub mod driver;
pub mod error;
pub mod inspect;
pub mod layout;
pub mod options;
pub mod package;
pub mod raster;
pub mod units;

// Re-exports
pub use archive::{extract_images, extract_images_from_path, is_image_entry, list_images};
pub use builder::{BuildReport, DeckBuilder, ImageOutcome};
pub use container::{OoxmlContainer, Relationship, Relationships};
pub use deck::Deck;
pub use driver::{generate, Download, GenerateRequest, PPTX_MIME};
pub use error::{Error, Result};
pub use inspect::{DeckSummary, PictureFrame, SlideSummary};
pub use layout::{Frame, HorizontalAlignment, VerticalAlignment};
pub use options::DeckOptions;
pub use raster::CropMargins;
pub use units::{Emu, SlideSize};

use std::path::{Path, PathBuf};

/// Build a deck from image files with the given options.
///
/// # Example
///
/// ```no_run
/// use imgdeck::{build_deck, DeckOptions};
///
/// let images: Vec<std::path::PathBuf> = vec!["a.png".into(), "b.jpg".into()];
/// let report = build_deck("deck.pptx", &images, &DeckOptions::default())?;
/// for (image, reason) in report.skipped_images() {
///     eprintln!("{}: {}", image.display(), reason);
/// }
/// # Ok::<(), imgdeck::Error>(())
/// ```
pub fn build_deck(
    output: impl AsRef<Path>,
    images: &[PathBuf],
    options: &DeckOptions,
) -> Result<BuildReport> {
    DeckBuilder::new(options.clone()).build(output, images)
}
