//! Archive extraction for hurl release archives.
//!
//! Unpacks `.tar.gz` and `.zip` archives into a destination directory with
//! path traversal protection to prevent zip-slip attacks. Unix permission
//! bits are kept so the extracted executable stays runnable.

use super::naming::ArchiveFormat;
use flate2::read::GzDecoder;
use std::fs::File;
use std::path::{Component, Path, PathBuf};

/// Trait for extracting release archives, enabling test mocking.
///
/// # Examples
///
/// ```
/// use hurl_installer::artefact::extraction::ArchiveUnpacker;
///
/// let extractor = ArchiveUnpacker;
/// // Use extractor.extract(archive_path, format, dest_dir) in production
/// ```
#[cfg_attr(test, mockall::automock)]
pub trait ArchiveExtractor {
    /// Extract the archive at `archive_path` into `dest_dir`.
    ///
    /// Returns the archive-relative paths of the extracted files.
    ///
    /// # Errors
    ///
    /// Returns [`ExtractionError::PathTraversal`] if any entry
    /// attempts to escape the destination directory.
    /// Returns [`ExtractionError::EmptyArchive`] if no files are found.
    /// Returns [`ExtractionError::Io`] or [`ExtractionError::Zip`] on
    /// read failures.
    fn extract(
        &self,
        archive_path: &Path,
        format: ArchiveFormat,
        dest_dir: &Path,
    ) -> Result<Vec<String>, ExtractionError>;
}

/// Errors arising from archive extraction.
#[derive(Debug, thiserror::Error)]
pub enum ExtractionError {
    /// I/O error during extraction.
    #[error("extraction I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The zip container could not be read.
    #[error("invalid zip archive: {0}")]
    Zip(#[from] zip::result::ZipError),

    /// A path in the archive attempts to traverse outside the destination.
    #[error("path traversal detected: {path}")]
    PathTraversal {
        /// The offending path from the archive entry.
        path: String,
    },

    /// The archive contains no files.
    #[error("archive contains no files")]
    EmptyArchive,

    /// The archive name carries a suffix with no unpack strategy.
    #[error("unsupported archive format: {name}")]
    UnsupportedFormat {
        /// The archive file name.
        name: String,
    },
}

/// Default extractor using `tar`/`flate2` and `zip`.
///
/// Validates each entry path before extraction to guard against
/// path traversal attacks (zip-slip).
#[derive(Debug, Clone, Copy, Default)]
pub struct ArchiveUnpacker;

impl ArchiveExtractor for ArchiveUnpacker {
    fn extract(
        &self,
        archive_path: &Path,
        format: ArchiveFormat,
        dest_dir: &Path,
    ) -> Result<Vec<String>, ExtractionError> {
        std::fs::create_dir_all(dest_dir)?;
        let extracted = match format {
            ArchiveFormat::TarGz => extract_tar_gz(archive_path, dest_dir)?,
            ArchiveFormat::Zip => extract_zip(archive_path, dest_dir)?,
        };

        if extracted.is_empty() {
            return Err(ExtractionError::EmptyArchive);
        }
        Ok(extracted)
    }
}

fn extract_tar_gz(archive_path: &Path, dest_dir: &Path) -> Result<Vec<String>, ExtractionError> {
    let file = File::open(archive_path)?;
    let mut archive = tar::Archive::new(GzDecoder::new(file));
    let mut extracted = Vec::new();

    for entry_result in archive.entries()? {
        let mut entry = entry_result?;
        let entry_path = entry.path()?.into_owned();

        validate_entry_path(&entry_path)?;

        let dest_path = dest_dir.join(&entry_path);
        if let Some(parent) = dest_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        entry.unpack(&dest_path)?;

        if !entry.header().entry_type().is_dir() {
            extracted.push(entry_path.to_string_lossy().into_owned());
        }
    }

    Ok(extracted)
}

fn extract_zip(archive_path: &Path, dest_dir: &Path) -> Result<Vec<String>, ExtractionError> {
    let file = File::open(archive_path)?;
    let mut archive = zip::ZipArchive::new(file)?;
    let mut extracted = Vec::new();

    for index in 0..archive.len() {
        let mut entry = archive.by_index(index)?;
        let entry_path: PathBuf = entry
            .enclosed_name()
            .ok_or_else(|| ExtractionError::PathTraversal {
                path: entry.name().to_owned(),
            })?;

        validate_entry_path(&entry_path)?;

        let dest_path = dest_dir.join(&entry_path);
        if entry.is_dir() {
            std::fs::create_dir_all(&dest_path)?;
            continue;
        }
        if let Some(parent) = dest_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let mut outfile = File::create(&dest_path)?;
        std::io::copy(&mut entry, &mut outfile)?;
        apply_unix_mode(&dest_path, entry.unix_mode())?;

        extracted.push(entry_path.to_string_lossy().into_owned());
    }

    Ok(extracted)
}

#[cfg(unix)]
fn apply_unix_mode(path: &Path, mode: Option<u32>) -> std::io::Result<()> {
    use std::os::unix::fs::PermissionsExt;

    match mode {
        Some(mode) => std::fs::set_permissions(path, std::fs::Permissions::from_mode(mode & 0o777)),
        None => Ok(()),
    }
}

#[cfg(not(unix))]
fn apply_unix_mode(_path: &Path, _mode: Option<u32>) -> std::io::Result<()> {
    Ok(())
}

/// Validate that an entry path does not escape the destination
/// directory via `..` components or absolute paths.
fn validate_entry_path(path: &Path) -> Result<(), ExtractionError> {
    let escapes = path.is_absolute()
        || path
            .components()
            .any(|component| matches!(
                component,
                Component::ParentDir | Component::RootDir | Component::Prefix(_)
            ));
    if escapes {
        return Err(ExtractionError::PathTraversal {
            path: path.display().to_string(),
        });
    }
    Ok(())
}
