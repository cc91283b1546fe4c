//! PPTX package assembly.
//!
//! Parts are kept in memory and written out as a ZIP with
//! `[Content_Types].xml` first.

pub mod content_types;
pub mod presentation;
pub mod slide;
pub mod template;

use crate::error::Result;
use std::collections::BTreeMap;
use std::io::{Seek, Write};
use zip::write::SimpleFileOptions;
use zip::CompressionMethod;

pub use content_types::{ContentTypes, CONTENT_TYPES_PART};

/// Write `parts` as an OPC package.
///
/// `content_types` is serialized as the first entry; directory-like part
/// names are never emitted.
pub fn write_package<W: Write + Seek>(
    writer: W,
    content_types: &ContentTypes,
    parts: &BTreeMap<String, Vec<u8>>,
) -> Result<W> {
    let mut zip = zip::ZipWriter::new(writer);
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

    zip.start_file(CONTENT_TYPES_PART, options)?;
    zip.write_all(content_types.to_xml().as_bytes())?;

    for (name, data) in parts {
        if name == CONTENT_TYPES_PART || name.ends_with('/') {
            continue;
        }
        zip.start_file(name.as_str(), options)?;
        zip.write_all(data)?;
    }

    Ok(zip.finish()?)
}
