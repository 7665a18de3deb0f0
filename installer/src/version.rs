//! Version specifier parsing and resolution.
//!
//! A requested version is either the `latest` sentinel (matched without
//! regard to case) or an explicit version with an optional single `v`/`V`
//! prefix. Resolution turns either form into a [`ResolvedVersion`]; the
//! sentinel costs one release-metadata lookup.
//!
//! Resolution does not validate explicit versions. Consumers that need
//! ordering call [`ResolvedVersion::semver`], which parses loosely so that
//! two-component releases such as `1.8` compare correctly.

use crate::error::{InstallerError, Result};
use crate::release::{ReleaseLookup, UPSTREAM_OWNER, UPSTREAM_REPO};
use log::debug;
use semver::Version;
use std::fmt;

/// The sentinel that requests the most recent upstream release.
const LATEST: &str = "latest";

/// A raw version request as supplied by the caller.
///
/// # Examples
///
/// ```
/// use hurl_installer::version::VersionSpec;
///
/// assert_eq!(VersionSpec::parse("LATEST"), VersionSpec::Latest);
/// assert_eq!(
///     VersionSpec::parse("v4.3.0"),
///     VersionSpec::Exact("4.3.0".to_owned())
/// );
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VersionSpec {
    /// The most recent published release.
    Latest,
    /// An explicit version with any leading `v`/`V` removed.
    Exact(String),
}

impl VersionSpec {
    /// Parse a raw version request.
    #[must_use]
    pub fn parse(raw: &str) -> Self {
        let version = strip_v_prefix(raw.trim());
        if version.eq_ignore_ascii_case(LATEST) {
            Self::Latest
        } else {
            Self::Exact(version.to_owned())
        }
    }
}

impl fmt::Display for VersionSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Latest => f.write_str(LATEST),
            Self::Exact(version) => f.write_str(version),
        }
    }
}

/// A concrete version, used for cache keys, install paths and artefact URLs.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ResolvedVersion(String);

impl ResolvedVersion {
    /// Wrap a concrete version string without validating it.
    #[must_use]
    pub fn new(version: impl Into<String>) -> Self {
        Self(version.into())
    }

    /// Return the version as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Parse the version for ordering comparisons.
    ///
    /// Missing minor or patch components are filled with zero, so `4.1`
    /// compares equal to `4.1.0`.
    ///
    /// # Errors
    ///
    /// Returns [`InstallerError::InvalidVersion`] when the string is not a
    /// semantic version even after padding.
    pub fn semver(&self) -> Result<Version> {
        parse_loose(&self.0)
    }
}

impl fmt::Display for ResolvedVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Resolve a version request into a concrete version.
///
/// `latest` queries `lookup` for the newest upstream release tag; the tag's
/// single leading `v`/`V` is dropped. Explicit versions are returned as-is
/// after prefix stripping. Any credential is carried by `lookup` itself.
///
/// # Errors
///
/// Returns [`InstallerError::MetadataLookup`] when the latest-release query
/// fails. The query is not retried.
pub fn resolve_version(spec: &VersionSpec, lookup: &dyn ReleaseLookup) -> Result<ResolvedVersion> {
    match spec {
        VersionSpec::Latest => {
            debug!("Requesting latest hurl version...");
            let tag = lookup.latest_tag(UPSTREAM_OWNER, UPSTREAM_REPO)?;
            debug!("Latest hurl release tag: {tag}");
            Ok(ResolvedVersion::new(strip_v_prefix(tag.trim())))
        }
        VersionSpec::Exact(version) => Ok(ResolvedVersion::new(version.as_str())),
    }
}

/// Parse a version string, padding absent minor/patch components.
///
/// # Errors
///
/// Returns [`InstallerError::InvalidVersion`] when the padded string is not
/// a valid semantic version.
///
/// # Examples
///
/// ```
/// use hurl_installer::version::parse_loose;
///
/// let version = parse_loose("1.8").expect("two-component version");
/// assert_eq!(version.to_string(), "1.8.0");
/// ```
pub fn parse_loose(raw: &str) -> Result<Version> {
    let trimmed = strip_v_prefix(raw.trim().trim_start_matches('='));
    let split_at = trimmed.find(['-', '+']).unwrap_or(trimmed.len());
    let (core, suffix) = trimmed.split_at(split_at);
    let missing = 2_usize.saturating_sub(core.matches('.').count());
    let padded = format!("{core}{}{suffix}", ".0".repeat(missing));

    Version::parse(&padded).map_err(|e| InstallerError::InvalidVersion {
        value: raw.to_owned(),
        reason: e.to_string(),
    })
}

fn strip_v_prefix(value: &str) -> &str {
    value
        .strip_prefix('v')
        .or_else(|| value.strip_prefix('V'))
        .unwrap_or(value)
}
