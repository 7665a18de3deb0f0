//! Directory staging helpers.
//!
//! Install directories are populated in a sibling staging directory and
//! published with a single rename, so a reader never observes a partially
//! written tree. When the staging location and the destination sit on
//! different filesystems the rename falls back to a recursive copy.

use log::debug;
use std::fs;
use std::io;
use std::path::Path;
use tempfile::TempDir;

/// Prefix of staging directories created next to their destination.
const STAGING_PREFIX: &str = ".hurl-";

/// Create an empty staging directory next to `dest`.
///
/// The directory is removed when the returned guard drops, unless its
/// contents were moved away first.
///
/// # Errors
///
/// Returns an error if the parent of `dest` cannot be created or written.
pub fn staging_dir_for(dest: &Path) -> io::Result<TempDir> {
    let parent = dest
        .parent()
        .filter(|parent| !parent.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    fs::create_dir_all(parent)?;
    tempfile::Builder::new()
        .prefix(STAGING_PREFIX)
        .tempdir_in(parent)
}

/// Publish `src` at `dest`, replacing anything already there.
///
/// # Errors
///
/// Returns an error if the existing destination cannot be removed or the
/// tree cannot be moved.
pub fn replace_dir(src: &Path, dest: &Path) -> io::Result<()> {
    remove_existing(dest)?;
    if let Some(parent) = dest.parent() {
        fs::create_dir_all(parent)?;
    }
    match fs::rename(src, dest) {
        Ok(()) => Ok(()),
        Err(error) => {
            debug!(
                "rename {} -> {} failed ({error}); copying instead",
                src.display(),
                dest.display()
            );
            copy_tree(src, dest)?;
            remove_existing(src)
        }
    }
}

/// Recursively copy the tree at `src` into `dest`.
///
/// Symbolic links are recreated rather than followed on Unix.
///
/// # Errors
///
/// Returns the first I/O error encountered.
pub fn copy_tree(src: &Path, dest: &Path) -> io::Result<()> {
    let metadata = fs::symlink_metadata(src)?;
    if metadata.is_dir() {
        fs::create_dir_all(dest)?;
        for entry in fs::read_dir(src)? {
            let entry = entry?;
            copy_tree(&entry.path(), &dest.join(entry.file_name()))?;
        }
        Ok(())
    } else if metadata.file_type().is_symlink() {
        copy_symlink(src, dest)
    } else {
        fs::copy(src, dest).map(|_| ())
    }
}

#[cfg(unix)]
fn copy_symlink(src: &Path, dest: &Path) -> io::Result<()> {
    std::os::unix::fs::symlink(fs::read_link(src)?, dest)
}

#[cfg(not(unix))]
fn copy_symlink(src: &Path, dest: &Path) -> io::Result<()> {
    fs::copy(src, dest).map(|_| ())
}

/// Remove a file or directory tree if it exists.
fn remove_existing(path: &Path) -> io::Result<()> {
    match fs::symlink_metadata(path) {
        Ok(metadata) if metadata.is_dir() => fs::remove_dir_all(path),
        Ok(_) => fs::remove_file(path),
        Err(error) if error.kind() == io::ErrorKind::NotFound => Ok(()),
        Err(error) => Err(error),
    }
}
