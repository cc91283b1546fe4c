//! One-shot generation: uploaded ZIP (plus optional template) in, PPTX bytes out.

use crate::archive;
use crate::builder::{BuildReport, DeckBuilder};
use crate::error::{Error, Result};
use crate::layout::{HorizontalAlignment, VerticalAlignment};
use crate::options::DeckOptions;
use crate::raster::CropMargins;
use std::io::Cursor;
use std::path::Path;

/// MIME type of the generated deck.
pub const PPTX_MIME: &str =
    "application/vnd.openxmlformats-officedocument.presentationml.presentation";

/// Output name offered by the input form.
pub const DEFAULT_OUTPUT_NAME: &str = "output_presentation.pptx";

const TEMPLATE_FILE_NAME: &str = "template.pptx";
const IMAGES_DIR: &str = "images";
const OUTPUT_DIR: &str = "deck";
const MISSING_INPUT: &str = "Please upload a ZIP file and specify the output file name.";

/// The options the input form starts with.
pub fn form_defaults() -> DeckOptions {
    DeckOptions::new()
        .with_crop(CropMargins::new(250, 0, 0, 42))
        .with_height(6.0)
        .with_alignment(HorizontalAlignment::Left, VerticalAlignment::Top)
}

/// Everything a submission carries.
#[derive(Debug, Clone)]
pub struct GenerateRequest {
    /// ZIP archive with the images
    pub archive: Option<Vec<u8>>,
    /// Presentation to build on
    pub template: Option<Vec<u8>>,
    pub output_name: String,
    /// Layout options; any `template` path set here is replaced by the upload
    pub options: DeckOptions,
}

impl Default for GenerateRequest {
    fn default() -> Self {
        Self {
            archive: None,
            template: None,
            output_name: DEFAULT_OUTPUT_NAME.to_string(),
            options: form_defaults(),
        }
    }
}

/// A finished deck ready to be handed out.
#[derive(Debug, Clone)]
pub struct Download {
    pub file_name: String,
    pub mime: &'static str,
    pub data: Vec<u8>,
    pub report: BuildReport,
}

/// Run a submission end to end.
///
/// All intermediate files live in a temporary directory removed before
/// returning, whatever the outcome.
///
/// # Example
///
/// ```no_run
/// use imgdeck::driver::{generate, GenerateRequest};
///
/// let request = GenerateRequest {
///     archive: Some(std::fs::read("photos.zip")?),
///     ..Default::default()
/// };
/// let download = generate(request)?;
/// std::fs::write(&download.file_name, &download.data)?;
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub fn generate(request: GenerateRequest) -> Result<Download> {
    let archive_bytes = match request.archive {
        Some(bytes) if !request.output_name.trim().is_empty() => bytes,
        _ => return Err(Error::MissingInput(MISSING_INPUT.to_string())),
    };
    let file_name = output_file_name(&request.output_name)?;
    request.options.validate()?;

    let scratch = tempfile::Builder::new().prefix("imgdeck-").tempdir()?;

    let images =
        archive::extract_images(Cursor::new(archive_bytes), scratch.path().join(IMAGES_DIR))?;
    if images.is_empty() {
        return Err(Error::NoImages);
    }
    log::debug!("Extracted {} images", images.len());

    let mut options = request.options;
    options.template = None;
    if let Some(template) = request.template {
        let path = scratch.path().join(TEMPLATE_FILE_NAME);
        std::fs::write(&path, template)?;
        options.template = Some(path);
    }

    // Own directory so no output name can land on the images or the template
    let output_dir = scratch.path().join(OUTPUT_DIR);
    std::fs::create_dir(&output_dir)?;
    let output = output_dir.join(&file_name);
    let report = DeckBuilder::new(options)
        .with_scratch_dir(scratch.path())
        .build(&output, &images)?;
    let data = std::fs::read(&output)?;

    Ok(Download {
        file_name,
        mime: PPTX_MIME,
        data,
        report,
    })
}

/// File-name component of a requested output name.
fn output_file_name(requested: &str) -> Result<String> {
    Path::new(requested.trim())
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .ok_or_else(|| Error::InvalidOption(format!("not a file name: '{}'", requested)))
}
