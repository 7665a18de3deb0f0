//! Binary-root discovery inside an unpacked tarball.
//!
//! Tarballs wrap their payload in a single `hurl-<version>...` directory.
//! Up to 4.2.x the executable sits directly in that directory; from 4.3.0 it
//! moved into a nested `bin` directory. The root to install is found with a
//! version-gated glob which must match exactly one entry.

use crate::error::{InstallerError, Result};
use crate::version::ResolvedVersion;
use glob::{MatchOptions, Pattern, glob_with};
use semver::Version;
use std::io;
use std::path::{Path, PathBuf};

/// First release whose tarballs nest the executable under `bin/`.
pub const NESTED_BIN_SINCE: Version = Version::new(4, 3, 0);

/// Build the glob pattern locating the binary root under `staging_dir`.
///
/// Literal path components are escaped, so staging directories containing
/// glob metacharacters are matched verbatim.
///
/// # Errors
///
/// Returns [`InstallerError::InvalidVersion`] when the version cannot be
/// ordered against the layout threshold.
///
/// # Examples
///
/// ```
/// use hurl_installer::artefact::discovery::binary_root_pattern;
/// use hurl_installer::version::ResolvedVersion;
/// use std::path::Path;
///
/// let pattern = binary_root_pattern(Path::new("/stage"), &ResolvedVersion::new("4.3.0"))
///     .expect("valid version");
/// assert!(pattern.ends_with("hurl-4.3.0*/bin"));
/// ```
pub fn binary_root_pattern(staging_dir: &Path, version: &ResolvedVersion) -> Result<String> {
    let root = Pattern::escape(&staging_dir.to_string_lossy());
    let entry = format!("hurl-{}*", Pattern::escape(version.as_str()));
    let pattern = if version.semver()? >= NESTED_BIN_SINCE {
        format!("{root}/{entry}/bin")
    } else {
        format!("{root}/{entry}")
    };
    Ok(pattern)
}

/// Locate the single binary root below `staging_dir`.
///
/// Files and directories both count as matches; the search never descends
/// past the pattern's own components.
///
/// # Errors
///
/// Returns [`InstallerError::AmbiguousArchiveLayout`] unless exactly one
/// entry matches, and [`InstallerError::Io`] if the staged tree cannot be
/// read.
pub fn discover_binary_root(staging_dir: &Path, version: &ResolvedVersion) -> Result<PathBuf> {
    let pattern = binary_root_pattern(staging_dir, version)?;
    let options = MatchOptions {
        case_sensitive: true,
        require_literal_separator: true,
        require_literal_leading_dot: true,
    };
    let walker = glob_with(&pattern, options).map_err(|error| io::Error::other(error.to_string()))?;

    let mut matches = Vec::new();
    for entry in walker {
        matches.push(entry.map_err(io::Error::from)?);
    }

    match <[PathBuf; 1]>::try_from(matches) {
        Ok([root]) => Ok(root),
        Err(matches) => Err(InstallerError::AmbiguousArchiveLayout {
            pattern,
            matches: matches.len(),
        }),
    }
}
