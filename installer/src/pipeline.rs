//! Cache-aware acquisition of a hurl release.
//!
//! The pipeline runs each stage in order and stops at the first fatal
//! error:
//!
//! 1. restore the install directory from the cache; a hit ends the run,
//! 2. locate and download the release archive into a staging directory,
//! 3. unpack it with the strategy implied by the archive suffix,
//! 4. for tarballs, discover the single binary root inside the tree,
//! 5. publish the root as the install directory with one rename,
//! 6. save the install directory to the cache.
//!
//! Everything before step 5 happens next to the install directory in a
//! staging directory that is removed afterwards, so a failed run never
//! leaves a partially populated install directory behind.

use crate::artefact::discovery::discover_binary_root;
use crate::artefact::download::ArtefactDownloader;
use crate::artefact::extraction::ArchiveExtractor;
use crate::artefact::naming::{ArchiveFormat, DistributionLocation, DistributionLocator};
use crate::artefact::target::{Architecture, Platform};
use crate::cache::{CacheKey, CachePolicy};
use crate::error::Result;
use crate::stager::{replace_dir, staging_dir_for};
use crate::version::ResolvedVersion;
use log::{debug, info};
use std::fs;
use std::path::Path;

/// Name of the unpack directory inside the staging directory.
const UNPACK_DIR: &str = "unpacked";

/// How the install directory was populated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AcquireOutcome {
    /// The tree was restored from the cache.
    Restored {
        /// Key of the cache entry.
        key: CacheKey,
    },
    /// The tree was downloaded and unpacked.
    Installed {
        /// Where the archive came from.
        location: DistributionLocation,
    },
}

/// Orchestrates cache restore, download, extraction and cache save.
pub struct AcquisitionPipeline<'a> {
    /// Platform to fetch artefacts for.
    pub platform: Platform,
    /// Architecture to fetch artefacts for.
    pub arch: Architecture,
    /// Naming table used to find the archive.
    pub locator: &'a DistributionLocator,
    /// Archive download capability.
    pub downloader: &'a dyn ArtefactDownloader,
    /// Archive unpack capability.
    pub extractor: &'a dyn ArchiveExtractor,
    /// Best-effort cache.
    pub cache: CachePolicy<'a>,
}

impl AcquisitionPipeline<'_> {
    /// Return the cache key for `version` on this pipeline's target.
    #[must_use]
    pub fn cache_key(&self, version: &ResolvedVersion) -> CacheKey {
        CacheKey::new(version, &self.platform, &self.arch)
    }

    /// Populate `install_dir` with hurl `version`.
    ///
    /// # Errors
    ///
    /// Returns [`InstallerError::UnsupportedTarget`] when no archive exists
    /// for the target, [`InstallerError::Download`] when the archive cannot
    /// be fetched, [`InstallerError::Extraction`] when it cannot be
    /// unpacked, and [`InstallerError::AmbiguousArchiveLayout`] when binary
    /// discovery does not find exactly one root. Cache failures are never
    /// returned.
    ///
    /// [`InstallerError::UnsupportedTarget`]: crate::error::InstallerError::UnsupportedTarget
    /// [`InstallerError::Download`]: crate::error::InstallerError::Download
    /// [`InstallerError::Extraction`]: crate::error::InstallerError::Extraction
    /// [`InstallerError::AmbiguousArchiveLayout`]: crate::error::InstallerError::AmbiguousArchiveLayout
    pub fn acquire(&self, version: &ResolvedVersion, install_dir: &Path) -> Result<AcquireOutcome> {
        let key = self.cache_key(version);
        if self.cache.restore(install_dir, &key) {
            return Ok(AcquireOutcome::Restored { key });
        }

        let location = self.locator.locate(&self.platform, &self.arch, version)?;
        let format = location.format()?;

        let staging = staging_dir_for(install_dir)?;
        let archive_path = staging.path().join(location.artefact_name());
        info!("Downloading hurl {version} from {}", location.url());
        self.downloader.download(location.url(), &archive_path)?;

        let unpack_dir = staging.path().join(UNPACK_DIR);
        debug!("Extracting {} to {}", archive_path.display(), unpack_dir.display());
        self.extractor.extract(&archive_path, format, &unpack_dir)?;
        fs::remove_file(&archive_path)?;

        let binary_root = match format {
            ArchiveFormat::TarGz => discover_binary_root(&unpack_dir, version)?,
            ArchiveFormat::Zip => unpack_dir,
        };
        debug!("Moving {} to {}", binary_root.display(), install_dir.display());
        replace_dir(&binary_root, install_dir)?;
        drop(staging);

        self.cache.save(install_dir, &key);
        Ok(AcquireOutcome::Installed { location })
    }
}

#[cfg(test)]
#[path = "pipeline_tests.rs"]
mod tests;
