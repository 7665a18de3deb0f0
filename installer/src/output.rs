//! Output formatting for the installer CLI.
//!
//! This module renders the dry-run plan and the closing success message.

use crate::artefact::naming::DistributionLocation;
use crate::artefact::target::{Architecture, Platform};
use crate::cache::CacheKey;
use crate::version::ResolvedVersion;
use std::io::Write;
use std::path::Path;

/// Write `message` and a newline to `out`, ignoring write failures.
pub fn write_line(out: &mut dyn Write, message: impl std::fmt::Display) {
    if writeln!(out, "{message}").is_err() {
        // Best-effort output; ignore write failures.
    }
}

/// Format a success message after installation.
///
/// # Example
///
/// ```
/// use hurl_installer::output::success_message;
/// use hurl_installer::version::ResolvedVersion;
/// use std::path::Path;
///
/// let msg = success_message(
///     &ResolvedVersion::new("4.3.0"),
///     Path::new("/tmp/hurl-4.3.0/hurl"),
///     true,
/// );
/// assert_eq!(msg, "hurl 4.3.0 restored from cache at /tmp/hurl-4.3.0/hurl");
/// ```
#[must_use]
pub fn success_message(version: &ResolvedVersion, executable: &Path, from_cache: bool) -> String {
    let how = if from_cache {
        "restored from cache"
    } else {
        "installed"
    };
    format!("hurl {version} {how} at {}", executable.display())
}

/// Installation plan shown in dry-run mode.
///
/// # Example
///
/// ```
/// use hurl_installer::artefact::naming::DistributionLocator;
/// use hurl_installer::artefact::target::{Architecture, Platform};
/// use hurl_installer::cache::CacheKey;
/// use hurl_installer::output::DryRunInfo;
/// use hurl_installer::version::ResolvedVersion;
/// use std::path::Path;
///
/// let version = ResolvedVersion::new("4.3.0");
/// let location = DistributionLocator::default()
///     .locate(&Platform::Linux, &Architecture::X64, &version)
///     .expect("supported target");
/// let key = CacheKey::new(&version, &Platform::Linux, &Architecture::X64);
///
/// let info = DryRunInfo {
///     version: &version,
///     platform: &Platform::Linux,
///     arch: &Architecture::X64,
///     location: &location,
///     cache_key: &key,
///     install_dir: Path::new("/tmp/hurl-4.3.0"),
///     cache_enabled: true,
/// };
///
/// let output = info.display_text();
/// assert!(output.contains("Dry run"));
/// assert!(output.contains("hurl-4.3.0-x86_64-unknown-linux-gnu.tar.gz"));
/// ```
#[derive(Debug)]
pub struct DryRunInfo<'a> {
    /// Version that would be installed.
    pub version: &'a ResolvedVersion,
    /// Target platform.
    pub platform: &'a Platform,
    /// Target architecture.
    pub arch: &'a Architecture,
    /// Where the archive would be downloaded from.
    pub location: &'a DistributionLocation,
    /// Cache entry that would be restored or saved.
    pub cache_key: &'a CacheKey,
    /// Directory the release would be installed into.
    pub install_dir: &'a Path,
    /// Whether the cache would be consulted.
    pub cache_enabled: bool,
}

impl DryRunInfo<'_> {
    /// Format the dry-run information for display.
    #[must_use]
    pub fn display_text(&self) -> String {
        let cache = if self.cache_enabled {
            self.cache_key.to_string()
        } else {
            format!("{} (disabled)", self.cache_key)
        };
        [
            "Dry run - no files will be modified".to_owned(),
            String::new(),
            format!("Version: {}", self.version),
            format!("Target: {}/{}", self.platform, self.arch),
            format!("Archive: {}", self.location.artefact_name()),
            format!("Download URL: {}", self.location.url()),
            format!("Cache key: {cache}"),
            format!("Install directory: {}", self.install_dir.display()),
        ]
        .join("\n")
    }
}
