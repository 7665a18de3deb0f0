//! Whole-run orchestration for `setup-hurl`.
//!
//! A run resolves the requested version, populates the install directory
//! through the [`AcquisitionPipeline`], registers the directory on the
//! search path, verifies the executable and publishes its path as the
//! `hurl-bin` output. The CLI entrypoint only wires production capabilities
//! into an [`InstallContext`].

use crate::artefact::naming::DistributionLocation;
use crate::cache::CacheKey;
use crate::error::Result;
use crate::exec::CommandExecutor;
use crate::output::success_message;
use crate::pipeline::{AcquireOutcome, AcquisitionPipeline};
use crate::release::ReleaseLookup;
use crate::runner::{RunnerOutputs, end_group, start_group};
use crate::verify::{InstallationVerifier, search_path_with};
use crate::version::{ResolvedVersion, VersionSpec, resolve_version};
use log::info;
use std::ffi::OsString;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Name of the step output carrying the executable path.
pub const OUTPUT_NAME: &str = "hurl-bin";

const INSTALL_GROUP: &str = "Install hurl";
const CHECK_GROUP: &str = "Installation check";

/// Return the install directory for `version` below `root`.
///
/// # Examples
///
/// ```
/// use hurl_installer::install_flow::install_dir_for;
/// use hurl_installer::version::ResolvedVersion;
/// use std::path::Path;
///
/// let dir = install_dir_for(Path::new("/runner/_temp"), &ResolvedVersion::new("4.3.0"));
/// assert_eq!(dir, Path::new("/runner/_temp/hurl-4.3.0"));
/// ```
#[must_use]
pub fn install_dir_for(root: &Path, version: &ResolvedVersion) -> PathBuf {
    root.join(format!("hurl-{version}"))
}

/// Capabilities and settings for one run.
pub struct InstallContext<'a> {
    /// Release metadata lookup used for `latest`.
    pub lookup: &'a dyn ReleaseLookup,
    /// Cache-aware acquisition of the release tree.
    pub pipeline: AcquisitionPipeline<'a>,
    /// Process spawner used by verification.
    pub executor: &'a dyn CommandExecutor,
    /// Destinations for step outputs and search-path additions.
    pub outputs: &'a RunnerOutputs,
    /// Parent directory of the install directory.
    pub install_root: PathBuf,
    /// Search path inherited from the environment.
    pub inherited_path: Option<OsString>,
    /// Working directory used to resolve relative search path entries.
    pub cwd: PathBuf,
}

/// What a dry run would do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstallPlan {
    /// Concrete version to install.
    pub version: ResolvedVersion,
    /// Archive location for the target.
    pub location: DistributionLocation,
    /// Cache entry for the target.
    pub cache_key: CacheKey,
    /// Directory the release would be installed into.
    pub install_dir: PathBuf,
}

/// Result of a completed run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstallReport {
    /// Version that was installed.
    pub version: ResolvedVersion,
    /// Directory holding the release tree.
    pub install_dir: PathBuf,
    /// Resolved path of the verified executable.
    pub executable: PathBuf,
    /// How the install directory was populated.
    pub outcome: AcquireOutcome,
}

impl InstallContext<'_> {
    /// Resolve `spec` and describe the installation without side effects.
    ///
    /// # Errors
    ///
    /// Returns [`InstallerError::MetadataLookup`] when `latest` cannot be
    /// resolved and [`InstallerError::UnsupportedTarget`] when no archive
    /// exists for the target.
    ///
    /// [`InstallerError::MetadataLookup`]: crate::error::InstallerError::MetadataLookup
    /// [`InstallerError::UnsupportedTarget`]: crate::error::InstallerError::UnsupportedTarget
    pub fn plan(&self, spec: &VersionSpec) -> Result<InstallPlan> {
        let version = resolve_version(spec, self.lookup)?;
        let location =
            self.pipeline
                .locator
                .locate(&self.pipeline.platform, &self.pipeline.arch, &version)?;
        Ok(InstallPlan {
            cache_key: self.pipeline.cache_key(&version),
            install_dir: install_dir_for(&self.install_root, &version),
            version,
            location,
        })
    }

    /// Install the release named by `spec`.
    ///
    /// Group markers and fallback workflow commands are written to `out`.
    ///
    /// # Errors
    ///
    /// Returns the first fatal error of any stage: version resolution,
    /// acquisition, search-path registration, verification or output
    /// publication.
    pub fn install(&self, spec: &VersionSpec, out: &mut dyn Write) -> Result<InstallReport> {
        let version = resolve_version(spec, self.lookup)?;
        let install_dir = install_dir_for(&self.install_root, &version);

        start_group(out, INSTALL_GROUP)?;
        let acquired = self.pipeline.acquire(&version, &install_dir);
        end_group(out)?;
        let outcome = acquired?;

        self.outputs.add_path(&install_dir, out)?;

        start_group(out, CHECK_GROUP)?;
        let verified = self.verify(&install_dir);
        end_group(out)?;
        let executable = verified?;

        self.outputs
            .set_output(OUTPUT_NAME, &executable.to_string_lossy(), out)?;
        info!(
            "{}",
            success_message(
                &version,
                &executable,
                matches!(outcome, AcquireOutcome::Restored { .. })
            )
        );

        Ok(InstallReport {
            version,
            install_dir,
            executable,
            outcome,
        })
    }

    fn verify(&self, install_dir: &Path) -> Result<PathBuf> {
        let search_path = search_path_with(install_dir, self.inherited_path.as_deref())?;
        InstallationVerifier::new(self.executor, search_path, self.cwd.clone())
            .verify(self.pipeline.platform.executable_name())
    }
}

#[cfg(test)]
#[path = "install_flow_tests.rs"]
mod tests;
