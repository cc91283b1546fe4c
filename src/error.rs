//! Error types for the imgdeck library.

use std::io;
use thiserror::Error;

/// Result type alias for imgdeck operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while extracting images or building a deck.
#[derive(Error, Debug)]
pub enum Error {
    /// I/O error during file operations.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Error reading or writing a ZIP archive.
    #[error("ZIP archive error: {0}")]
    ZipArchive(String),

    /// Error parsing XML content.
    #[error("XML parse error: {0}")]
    XmlParse(String),

    /// The image could not be decoded or encoded.
    #[error("Image error: {0}")]
    Image(String),

    /// The crop margins leave nothing of the image.
    #[error(
        "Crop margins (left {left}, right {right}, top {top}, bottom {bottom}) \
         leave no pixels of a {width}x{height} image"
    )]
    InvalidCrop {
        width: u32,
        height: u32,
        left: u32,
        right: u32,
        top: u32,
        bottom: u32,
    },

    /// An option value is out of range or malformed.
    #[error("Invalid option: {0}")]
    InvalidOption(String),

    /// A required package component is missing.
    #[error("Missing component: {0}")]
    MissingComponent(String),

    /// Invalid or malformed data in a package.
    #[error("Invalid data: {0}")]
    InvalidData(String),

    /// A required input was not supplied.
    #[error("{0}")]
    MissingInput(String),

    /// The archive did not contain any usable image.
    #[error("No valid images found in the uploaded ZIP file.")]
    NoImages,
}

impl From<zip::result::ZipError> for Error {
    fn from(err: zip::result::ZipError) -> Self {
        Error::ZipArchive(err.to_string())
    }
}

impl From<quick_xml::Error> for Error {
    fn from(err: quick_xml::Error) -> Self {
        Error::XmlParse(err.to_string())
    }
}

impl From<quick_xml::events::attributes::AttrError> for Error {
    fn from(err: quick_xml::events::attributes::AttrError) -> Self {
        Error::XmlParse(err.to_string())
    }
}

impl From<image::ImageError> for Error {
    fn from(err: image::ImageError) -> Self {
        match err {
            image::ImageError::IoError(e) => Error::Io(e),
            other => Error::Image(other.to_string()),
        }
    }
}
