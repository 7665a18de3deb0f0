//! Distribution naming policy for hurl release archives.
//!
//! Upstream renamed its archives several times and added architectures along
//! the way, so the file name for a given platform and architecture depends on
//! the release. The policy is an ordered table of [`NamingRule`]s: for a
//! (platform, architecture) pair the rule with the highest `since` version
//! not above the requested version wins.
//!
//! Release URLs take the form
//! `<base>/<version>/hurl-<version>-<suffix>`.

use super::extraction::ExtractionError;
use super::target::{Architecture, Platform};
use crate::error::{InstallerError, Result};
use crate::version::ResolvedVersion;
use semver::Version;
use std::fmt;

/// Release download root for the upstream project.
pub const DEFAULT_BASE_URL: &str = "https://github.com/Orange-OpenSource/hurl/releases/download";

/// Placeholder substituted with the resolved version in name templates.
const VERSION_PLACEHOLDER: &str = "{version}";

/// Archive formats published upstream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArchiveFormat {
    /// Gzip-compressed tarball (`.tar.gz`).
    TarGz,
    /// Zip archive (`.zip`).
    Zip,
}

impl ArchiveFormat {
    /// Infer the format from an artefact file name.
    ///
    /// # Errors
    ///
    /// Returns [`ExtractionError::UnsupportedFormat`] for any other suffix.
    ///
    /// # Examples
    ///
    /// ```
    /// use hurl_installer::artefact::naming::ArchiveFormat;
    ///
    /// let format = ArchiveFormat::from_file_name("hurl-4.3.0-win64.zip")
    ///     .expect("zip suffix");
    /// assert_eq!(format, ArchiveFormat::Zip);
    /// ```
    pub fn from_file_name(name: &str) -> std::result::Result<Self, ExtractionError> {
        if name.ends_with(".tar.gz") {
            Ok(Self::TarGz)
        } else if name.ends_with(".zip") {
            Ok(Self::Zip)
        } else {
            Err(ExtractionError::UnsupportedFormat {
                name: name.to_owned(),
            })
        }
    }

    /// Return the file extension including the leading dot.
    #[must_use]
    pub fn extension(self) -> &'static str {
        match self {
            Self::TarGz => ".tar.gz",
            Self::Zip => ".zip",
        }
    }
}

impl fmt::Display for ArchiveFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension().trim_start_matches('.'))
    }
}

/// One row of the naming table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NamingRule {
    platform: Platform,
    arch: Architecture,
    since: Version,
    template: String,
}

impl NamingRule {
    /// Create a rule applying to `platform`/`arch` from `since` onwards.
    ///
    /// `template` names the archive; `{version}` is replaced with the
    /// resolved version.
    #[must_use]
    pub fn new(
        platform: Platform,
        arch: Architecture,
        since: Version,
        template: impl Into<String>,
    ) -> Self {
        Self {
            platform,
            arch,
            since,
            template: template.into(),
        }
    }

    /// Return the first version this rule applies to.
    #[must_use]
    pub fn since(&self) -> &Version {
        &self.since
    }

    /// Whether the rule covers the given platform and architecture.
    #[must_use]
    pub fn matches(&self, platform: &Platform, arch: &Architecture) -> bool {
        &self.platform == platform && &self.arch == arch
    }

    /// Render the artefact file name for `version`.
    #[must_use]
    pub fn artefact_name(&self, version: &ResolvedVersion) -> String {
        self.template.replace(VERSION_PLACEHOLDER, version.as_str())
    }
}

/// The upstream naming history.
#[must_use]
pub fn default_rules() -> Vec<NamingRule> {
    use Architecture::{Arm64, X64};
    use Platform::{Darwin, Linux, Windows};

    let rule = |platform: Platform,
                arch: Architecture,
                (major, minor, patch): (u64, u64, u64),
                suffix: &str| {
        NamingRule::new(
            platform,
            arch,
            Version::new(major, minor, patch),
            format!("hurl-{VERSION_PLACEHOLDER}-{suffix}"),
        )
    };

    vec![
        rule(Linux, X64, (0, 0, 0), "x86_64-linux.tar.gz"),
        rule(Linux, X64, (4, 1, 0), "x86_64-unknown-linux-gnu.tar.gz"),
        rule(Linux, Arm64, (4, 3, 0), "aarch64-unknown-linux-gnu.tar.gz"),
        rule(Darwin, X64, (0, 0, 0), "x86_64-osx.tar.gz"),
        rule(Darwin, X64, (1, 7, 0), "x86_64-macos.tar.gz"),
        rule(Darwin, X64, (4, 1, 0), "x86_64-apple-darwin.tar.gz"),
        rule(Darwin, Arm64, (0, 0, 0), "arm64-macos.tar.gz"),
        rule(Darwin, Arm64, (4, 1, 0), "aarch64-apple-darwin.tar.gz"),
        rule(Windows, X64, (0, 0, 0), "win64.zip"),
        rule(Windows, X64, (4, 1, 0), "x86_64-pc-windows-msvc.zip"),
    ]
}

/// A fully qualified download location for one release archive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DistributionLocation {
    url: String,
    artefact_name: String,
}

impl DistributionLocation {
    /// Return the download URL.
    #[must_use]
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Return the archive file name.
    #[must_use]
    pub fn artefact_name(&self) -> &str {
        &self.artefact_name
    }

    /// Return the archive format implied by the file name.
    ///
    /// # Errors
    ///
    /// Returns [`ExtractionError::UnsupportedFormat`] when the name carries
    /// neither a `.tar.gz` nor a `.zip` suffix.
    pub fn format(&self) -> std::result::Result<ArchiveFormat, ExtractionError> {
        ArchiveFormat::from_file_name(&self.artefact_name)
    }
}

impl fmt::Display for DistributionLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.url)
    }
}

/// Maps (platform, architecture, version) onto a release download location.
///
/// # Examples
///
/// ```
/// use hurl_installer::artefact::naming::DistributionLocator;
/// use hurl_installer::artefact::target::{Architecture, Platform};
/// use hurl_installer::version::ResolvedVersion;
///
/// let locator = DistributionLocator::default();
/// let location = locator
///     .locate(&Platform::Linux, &Architecture::X64, &ResolvedVersion::new("4.3.0"))
///     .expect("supported target");
/// assert!(location.url().ends_with("/4.3.0/hurl-4.3.0-x86_64-unknown-linux-gnu.tar.gz"));
/// ```
#[derive(Debug, Clone)]
pub struct DistributionLocator {
    base_url: String,
    rules: Vec<NamingRule>,
}

impl Default for DistributionLocator {
    fn default() -> Self {
        Self::new(DEFAULT_BASE_URL, default_rules())
    }
}

impl DistributionLocator {
    /// Create a locator with a custom download root and rule table.
    #[must_use]
    pub fn new(base_url: impl Into<String>, rules: Vec<NamingRule>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_owned(),
            rules,
        }
    }

    /// Resolve the download location for a target and version.
    ///
    /// # Errors
    ///
    /// Returns [`InstallerError::UnsupportedTarget`] when no rule covers the
    /// platform/architecture pair or the version predates every rule for it,
    /// and [`InstallerError::InvalidVersion`] when the version cannot be
    /// ordered.
    pub fn locate(
        &self,
        platform: &Platform,
        arch: &Architecture,
        version: &ResolvedVersion,
    ) -> Result<DistributionLocation> {
        let unsupported = |reason: String| InstallerError::UnsupportedTarget {
            platform: platform.to_string(),
            arch: arch.to_string(),
            version: version.to_string(),
            reason,
        };

        let candidates: Vec<&NamingRule> = self
            .rules
            .iter()
            .filter(|rule| rule.matches(platform, arch))
            .collect();
        let earliest = candidates
            .iter()
            .map(|rule| rule.since())
            .min()
            .ok_or_else(|| {
                unsupported("no hurl artefacts are published for this target".to_owned())
            })?;

        let wanted = version.semver()?;
        let rule = candidates
            .iter()
            .filter(|rule| rule.since() <= &wanted)
            .max_by(|a, b| a.since().cmp(b.since()))
            .ok_or_else(|| unsupported(format!("artefacts for this target start at {earliest}")))?;

        let artefact_name = rule.artefact_name(version);
        Ok(DistributionLocation {
            url: format!("{}/{version}/{artefact_name}", self.base_url),
            artefact_name,
        })
    }
}
