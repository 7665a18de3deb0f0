//! Platform base directories used as installer defaults.
//!
//! The local cache defaults to the per-user cache directory and install
//! directories default to the OS temporary directory. Both lookups sit
//! behind [`BaseDirs`] so path derivation is testable.

use directories_next::ProjectDirs;
use std::path::PathBuf;

/// Application name used for per-user directories.
const APPLICATION: &str = "setup-hurl";

/// Source of platform directories.
#[cfg_attr(test, mockall::automock)]
pub trait BaseDirs {
    /// Per-user cache directory for this application, if one exists.
    fn cache_dir(&self) -> Option<PathBuf>;

    /// Directory for short-lived files.
    fn temp_dir(&self) -> PathBuf;
}

/// [`BaseDirs`] backed by `directories-next` and the process environment.
///
/// # Examples
///
/// ```
/// use hurl_installer::dirs::{BaseDirs, SystemBaseDirs};
///
/// let dirs = SystemBaseDirs::new();
/// assert!(dirs.temp_dir().is_absolute());
/// ```
#[derive(Debug, Clone)]
pub struct SystemBaseDirs {
    project: Option<ProjectDirs>,
}

impl SystemBaseDirs {
    /// Resolve platform directories for the current user.
    #[must_use]
    pub fn new() -> Self {
        Self {
            project: ProjectDirs::from("", "", APPLICATION),
        }
    }
}

impl Default for SystemBaseDirs {
    fn default() -> Self {
        Self::new()
    }
}

impl BaseDirs for SystemBaseDirs {
    fn cache_dir(&self) -> Option<PathBuf> {
        self.project
            .as_ref()
            .map(|project| project.cache_dir().to_path_buf())
    }

    fn temp_dir(&self) -> PathBuf {
        std::env::temp_dir()
    }
}
