//! Error types for the hurl installer.
//!
//! Every fatal failure of a run is one of the variants below. Cache failures
//! are deliberately absent: the cache layer converts them into misses and
//! warnings before they can reach this type.

use crate::artefact::download::DownloadError;
use crate::artefact::extraction::ExtractionError;
use crate::release::LookupError;
use std::path::PathBuf;
use thiserror::Error;

/// Errors that abort an installation run.
#[derive(Debug, Error)]
pub enum InstallerError {
    /// The "latest release" query against the release metadata service failed.
    #[error("failed to look up the latest hurl release: {0}")]
    MetadataLookup(#[from] LookupError),

    /// No artefact is published for the platform, architecture and version.
    #[error("unsupported target {platform}/{arch} for hurl {version}: {reason}")]
    UnsupportedTarget {
        /// Platform token of the rejected combination.
        platform: String,
        /// Architecture token of the rejected combination.
        arch: String,
        /// Version that was requested.
        version: String,
        /// Why the combination has no artefact.
        reason: String,
    },

    /// A version string could not be interpreted as a semantic version.
    #[error("invalid version \"{value}\": {reason}")]
    InvalidVersion {
        /// The rejected version string.
        value: String,
        /// Parser diagnostic.
        reason: String,
    },

    /// Downloading the release archive failed.
    #[error(transparent)]
    Download(#[from] DownloadError),

    /// Unpacking the release archive failed.
    #[error(transparent)]
    Extraction(#[from] ExtractionError),

    /// Binary discovery inside the unpacked archive did not yield exactly one entry.
    #[error("distribution archive layout is ambiguous: pattern {pattern} matched {matches} entries")]
    AmbiguousArchiveLayout {
        /// Glob pattern used for discovery.
        pattern: String,
        /// Number of entries matched (anything other than one).
        matches: usize,
    },

    /// The installed executable could not be found on the search path.
    #[error("{executable} binary file not found in PATH: {reason}")]
    NotFound {
        /// Executable name that was looked up.
        executable: String,
        /// Lookup diagnostic.
        reason: String,
    },

    /// The installed executable exists but did not run successfully.
    #[error("installation check failed for {path}: {reason}")]
    Verification {
        /// Resolved path of the executable.
        path: PathBuf,
        /// Spawn failure or exit status description.
        reason: String,
    },

    /// Writing a runner output file failed.
    #[error("failed to write runner file {path}: {source}")]
    Output {
        /// Path of the runner file.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// An I/O operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Test stub received an unexpected or mismatched invocation.
    #[cfg(any(test, feature = "test-support"))]
    #[error("stub mismatch: {message}")]
    StubMismatch {
        /// Description of what was expected versus what was received.
        message: String,
    },
}

/// Result type alias using [`InstallerError`].
pub type Result<T> = std::result::Result<T, InstallerError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unsupported_target_names_the_combination() {
        let err = InstallerError::UnsupportedTarget {
            platform: "linux".to_owned(),
            arch: "arm64".to_owned(),
            version: "4.2.0".to_owned(),
            reason: "no arm64 build before 4.3.0".to_owned(),
        };
        let msg = err.to_string();
        assert!(msg.contains("linux/arm64"));
        assert!(msg.contains("4.2.0"));
    }

    #[test]
    fn ambiguous_layout_reports_match_count() {
        let err = InstallerError::AmbiguousArchiveLayout {
            pattern: "/tmp/stage/hurl-4.3.0*/bin".to_owned(),
            matches: 2,
        };
        let msg = err.to_string();
        assert!(msg.contains("matched 2 entries"));
        assert!(msg.contains("hurl-4.3.0*/bin"));
    }

    #[test]
    fn lookup_failure_converts_into_metadata_error() {
        let err = InstallerError::from(LookupError::NotFound {
            url: "https://api.github.com/repos/o/r/releases/latest".to_owned(),
        });
        assert!(matches!(err, InstallerError::MetadataLookup(_)));
        assert!(err.to_string().contains("latest hurl release"));
    }

    #[test]
    fn output_error_preserves_source() {
        let err = InstallerError::Output {
            path: PathBuf::from("/tmp/github_output"),
            source: std::io::Error::other("disk full"),
        };
        assert!(std::error::Error::source(&err).is_some());
        assert!(err.to_string().contains("github_output"));
    }
}
