//! Post-install verification.
//!
//! The installed executable must be reachable on the search path the rest
//! of the run will use, and must run `--version` successfully. Its output is
//! discarded.

use crate::error::{InstallerError, Result};
use crate::exec::CommandExecutor;
use log::debug;
use std::ffi::{OsStr, OsString};
use std::io;
use std::path::{Path, PathBuf};

/// Build a search path with `dir` placed before `inherited`.
///
/// # Errors
///
/// Returns [`InstallerError::Io`] if `dir` contains the platform's path
/// separator and cannot be joined.
///
/// # Examples
///
/// ```
/// use hurl_installer::verify::search_path_with;
/// use std::ffi::OsStr;
/// use std::path::Path;
///
/// let path = search_path_with(Path::new("/opt/hurl"), Some(OsStr::new("/usr/bin")))
///     .expect("joinable");
/// # #[cfg(unix)]
/// assert_eq!(path, "/opt/hurl:/usr/bin");
/// ```
pub fn search_path_with(dir: &Path, inherited: Option<&OsStr>) -> Result<OsString> {
    let inherited_dirs = inherited.into_iter().flat_map(std::env::split_paths);
    std::env::join_paths(std::iter::once(dir.to_path_buf()).chain(inherited_dirs))
        .map_err(|error| InstallerError::Io(io::Error::other(error.to_string())))
}

/// Confirms an installed executable is reachable and runnable.
pub struct InstallationVerifier<'a> {
    executor: &'a dyn CommandExecutor,
    search_path: OsString,
    cwd: PathBuf,
}

impl<'a> InstallationVerifier<'a> {
    /// Create a verifier resolving executables against `search_path`.
    ///
    /// Relative search path entries are resolved against `cwd`.
    #[must_use]
    pub const fn new(
        executor: &'a dyn CommandExecutor,
        search_path: OsString,
        cwd: PathBuf,
    ) -> Self {
        Self {
            executor,
            search_path,
            cwd,
        }
    }

    /// Resolve `executable` on the search path and check that it runs.
    ///
    /// Returns the resolved path of the executable.
    ///
    /// # Errors
    ///
    /// Returns [`InstallerError::NotFound`] when the executable is not on the
    /// search path, and [`InstallerError::Verification`] when it cannot be
    /// spawned or exits unsuccessfully.
    pub fn verify(&self, executable: &str) -> Result<PathBuf> {
        let path = which::which_in(executable, Some(&self.search_path), &self.cwd).map_err(
            |error| InstallerError::NotFound {
                executable: executable.to_owned(),
                reason: error.to_string(),
            },
        )?;
        debug!("Resolved {executable} to {}", path.display());

        let output = match self.executor.run(&path, &["--version"], &self.search_path) {
            Ok(output) => output,
            Err(InstallerError::Io(error)) => {
                return Err(InstallerError::Verification {
                    path,
                    reason: format!("failed to run: {error}"),
                });
            }
            Err(other) => return Err(other),
        };

        if !output.status.success() {
            return Err(InstallerError::Verification {
                path,
                reason: format!("`--version` exited with {}", output.status),
            });
        }
        Ok(path)
    }
}
