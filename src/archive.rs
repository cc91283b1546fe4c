//! Image extraction from ZIP archives.

use crate::error::Result;
use std::fs::{self, File};
use std::io::{self, BufWriter, Read, Seek, Write};
use std::path::{Path, PathBuf};

/// Extensions (lowercase, without the dot) of entries treated as images.
pub const IMAGE_EXTENSIONS: [&str; 5] = ["jpg", "jpeg", "png", "bmp", "gif"];

/// Base-name prefix of macOS resource-fork entries (`__MACOSX/._photo.jpg`).
pub const RESOURCE_FORK_PREFIX: &str = "._";

/// Whether an archive entry name refers to an image worth extracting.
///
/// Only the extension and the base name (after the last `/`) are checked.
pub fn is_image_entry(name: &str) -> bool {
    let base = name.rsplit('/').next().unwrap_or(name);
    if base.starts_with(RESOURCE_FORK_PREFIX) {
        return false;
    }

    Path::new(base)
        .extension()
        .and_then(|e| e.to_str())
        .map(|ext| {
            IMAGE_EXTENSIONS
                .iter()
                .any(|allowed| ext.eq_ignore_ascii_case(allowed))
        })
        .unwrap_or(false)
}

/// List the names of qualifying image entries, in archive order.
pub fn list_images<R: Read + Seek>(reader: R) -> Result<Vec<String>> {
    let mut archive = zip::ZipArchive::new(reader)?;
    let mut names = Vec::new();

    for i in 0..archive.len() {
        let entry = archive.by_index(i)?;
        if !entry.is_dir() && is_image_entry(entry.name()) {
            names.push(entry.name().to_string());
        }
    }

    Ok(names)
}

/// Extract every qualifying image entry under `dest`.
///
/// Relative paths inside the archive are preserved. Absolute names and `..`
/// components are stripped, so every file lands under `dest`. Returns the
/// absolute paths of the written files in archive order.
///
/// # Example
///
/// ```no_run
/// use std::fs::File;
///
/// let zip = File::open("photos.zip")?;
/// let images = imgdeck::extract_images(zip, "extracted")?;
/// println!("{} images", images.len());
/// # Ok::<(), imgdeck::Error>(())
/// ```
pub fn extract_images<R: Read + Seek>(reader: R, dest: impl AsRef<Path>) -> Result<Vec<PathBuf>> {
    let mut archive = zip::ZipArchive::new(reader)?;

    fs::create_dir_all(dest.as_ref())?;
    let dest = std::path::absolute(dest.as_ref())?;

    let mut extracted = Vec::new();
    for i in 0..archive.len() {
        let mut entry = archive.by_index(i)?;
        if entry.is_dir() || !is_image_entry(entry.name()) {
            continue;
        }

        // Root and `..` components are dropped so the file stays under `dest`
        let relative = entry.mangled_name();
        if relative.as_os_str() != entry.name() {
            log::debug!("Extracting '{}' as '{}'", entry.name(), relative.display());
        }

        let target = dest.join(relative);
        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent)?;
        }

        let mut out = BufWriter::new(File::create(&target)?);
        io::copy(&mut entry, &mut out)?;
        out.flush()?;
        extracted.push(target);
    }

    Ok(extracted)
}

/// Extract images from the archive stored at `path`.
pub fn extract_images_from_path(
    path: impl AsRef<Path>,
    dest: impl AsRef<Path>,
) -> Result<Vec<PathBuf>> {
    let file = File::open(path.as_ref())?;
    extract_images(io::BufReader::new(file), dest)
}
