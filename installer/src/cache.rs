//! Best-effort caching of installed trees.
//!
//! A cache entry is a complete, already-extracted install directory
//! addressed by a [`CacheKey`]. Backends implement [`ArtifactCache`] and
//! report failures through [`CacheError`]; [`CachePolicy`] is the only
//! caller the pipeline talks to, and it turns every backend failure into a
//! miss or a no-op plus a warning.
//!
//! [`DirectoryCache`] stores entries under a local directory. Writers are
//! serialised per key with an advisory lock and publish with a rename, so
//! readers never see a half-written entry. The last writer wins.

use crate::artefact::target::{Architecture, Platform};
use crate::stager::{copy_tree, replace_dir, staging_dir_for};
use crate::version::ResolvedVersion;
use log::{debug, info, warn};
use std::fmt;
use std::fs::{self, File, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};

/// Namespace prefix of every cache key.
pub const CACHE_NAMESPACE: &str = "hurl-cache";

/// Identifies a cached install tree.
///
/// # Examples
///
/// ```
/// use hurl_installer::artefact::target::{Architecture, Platform};
/// use hurl_installer::cache::CacheKey;
/// use hurl_installer::version::ResolvedVersion;
///
/// let key = CacheKey::new(&ResolvedVersion::new("4.3.0"), &Platform::Linux, &Architecture::X64);
/// assert_eq!(key.as_str(), "hurl-cache-4.3.0-linux-x64");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey(String);

impl CacheKey {
    /// Derive the key for a version and target.
    #[must_use]
    pub fn new(version: &ResolvedVersion, platform: &Platform, arch: &Architecture) -> Self {
        Self(format!("{CACHE_NAMESPACE}-{version}-{platform}-{arch}"))
    }

    /// Return the key as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Return the key as a file name.
    ///
    /// Bytes outside `[A-Za-z0-9.-]` are written as `_XX` (uppercase hex),
    /// `_` included, so distinct keys never share an entry.
    #[must_use]
    pub fn file_name(&self) -> String {
        let mut name = String::with_capacity(self.0.len());
        for byte in self.0.bytes() {
            if byte.is_ascii_alphanumeric() || matches!(byte, b'.' | b'-') {
                name.push(char::from(byte));
            } else {
                name.push_str(&format!("_{byte:02X}"));
            }
        }
        name
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Errors raised by cache backends.
#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    /// A filesystem operation on the cache failed.
    #[error("cache I/O error at {path}: {source}")]
    Io {
        /// Path being accessed.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },

    /// The cache service cannot be used at all.
    #[error("cache unavailable: {reason}")]
    Unavailable {
        /// Why the cache cannot be used.
        reason: String,
    },
}

impl CacheError {
    fn io(path: &Path, source: io::Error) -> Self {
        Self::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}

/// A key-addressed store of install trees.
#[cfg_attr(test, mockall::automock)]
pub trait ArtifactCache {
    /// Populate `install_dir` from the entry for `key`.
    ///
    /// Returns `Ok(false)` on a miss.
    ///
    /// # Errors
    ///
    /// Returns [`CacheError`] when the cache cannot be read.
    fn restore(&self, install_dir: &Path, key: &CacheKey) -> Result<bool, CacheError>;

    /// Store the tree at `install_dir` under `key`.
    ///
    /// # Errors
    ///
    /// Returns [`CacheError`] when the entry cannot be written.
    fn save(&self, install_dir: &Path, key: &CacheKey) -> Result<(), CacheError>;
}

/// Applies the installer's cache policy to an optional backend.
///
/// Disabled caching skips both operations. Backend failures are logged as
/// warnings and never propagate.
pub struct CachePolicy<'a> {
    backend: Option<&'a dyn ArtifactCache>,
}

impl<'a> CachePolicy<'a> {
    /// Use `backend` for restore and save.
    #[must_use]
    pub const fn enabled(backend: &'a dyn ArtifactCache) -> Self {
        Self {
            backend: Some(backend),
        }
    }

    /// Skip caching entirely.
    #[must_use]
    pub const fn disabled() -> Self {
        Self { backend: None }
    }

    /// Whether a backend is in use.
    #[must_use]
    pub const fn is_enabled(&self) -> bool {
        self.backend.is_some()
    }

    /// Try to restore `install_dir` from the cache. Any failure is a miss.
    pub fn restore(&self, install_dir: &Path, key: &CacheKey) -> bool {
        let Some(backend) = self.backend else {
            debug!("Cache disabled; skipping restore of {key}");
            return false;
        };
        match backend.restore(install_dir, key) {
            Ok(true) => {
                info!("Restored hurl from cache ({key})");
                true
            }
            Ok(false) => {
                debug!("No cache entry for {key}");
                false
            }
            Err(error) => {
                warn!("Failed to restore hurl from cache: {error}");
                false
            }
        }
    }

    /// Try to save `install_dir` to the cache. Any failure is ignored.
    pub fn save(&self, install_dir: &Path, key: &CacheKey) {
        let Some(backend) = self.backend else {
            debug!("Cache disabled; skipping save of {key}");
            return;
        };
        match backend.save(install_dir, key) {
            Ok(()) => debug!("Saved hurl to cache ({key})"),
            Err(error) => warn!("Failed to save hurl to cache: {error}"),
        }
    }
}

/// [`ArtifactCache`] storing entries as directories under a root.
#[derive(Debug, Clone)]
pub struct DirectoryCache {
    root: PathBuf,
}

impl DirectoryCache {
    /// Use `root` as the cache directory. It is created on first save.
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Return the cache root.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Return the directory holding the entry for `key`.
    #[must_use]
    pub fn entry_dir(&self, key: &CacheKey) -> PathBuf {
        self.root.join(key.file_name())
    }

    fn lock(&self, key: &CacheKey) -> Result<File, CacheError> {
        fs::create_dir_all(&self.root).map_err(|e| CacheError::io(&self.root, e))?;
        let lock_path = self.root.join(format!(".{}.lock", key.file_name()));
        let file = OpenOptions::new()
            .create(true)
            .truncate(false)
            .write(true)
            .open(&lock_path)
            .map_err(|e| CacheError::io(&lock_path, e))?;
        fs2::FileExt::lock_exclusive(&file).map_err(|e| CacheError::io(&lock_path, e))?;
        Ok(file)
    }
}

impl ArtifactCache for DirectoryCache {
    fn restore(&self, install_dir: &Path, key: &CacheKey) -> Result<bool, CacheError> {
        let entry = self.entry_dir(key);
        if !entry.is_dir() {
            return Ok(false);
        }

        let staging = staging_dir_for(install_dir).map_err(|e| CacheError::io(install_dir, e))?;
        let staged = staging.path().join("tree");
        let lock = self.lock(key)?;
        let copied = copy_tree(&entry, &staged).map_err(|e| CacheError::io(&entry, e));
        if let Err(error) = fs2::FileExt::unlock(&lock) {
            debug!("Failed to release cache lock for {key}: {error}");
        }
        copied?;
        replace_dir(&staged, install_dir).map_err(|e| CacheError::io(install_dir, e))?;
        Ok(true)
    }

    fn save(&self, install_dir: &Path, key: &CacheKey) -> Result<(), CacheError> {
        if !install_dir.is_dir() {
            return Err(CacheError::Unavailable {
                reason: format!("{} is not a directory", install_dir.display()),
            });
        }

        let lock = self.lock(key)?;
        let partial = self.root.join(format!(".{}.partial", key.file_name()));
        let entry = self.entry_dir(key);

        let result = fs::remove_dir_all(&partial)
            .or_else(|e| if e.kind() == io::ErrorKind::NotFound { Ok(()) } else { Err(e) })
            .and_then(|()| copy_tree(install_dir, &partial))
            .and_then(|()| replace_dir(&partial, &entry))
            .map_err(|e| CacheError::io(&entry, e));

        if let Err(error) = fs2::FileExt::unlock(&lock) {
            debug!("Failed to release cache lock for {key}: {error}");
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::{fixture, rstest};

    #[fixture]
    fn key() -> CacheKey {
        CacheKey::new(&ResolvedVersion::new("4.3.0"), &Platform::Linux, &Architecture::X64)
    }

    fn populate(dir: &Path) {
        fs::create_dir_all(dir.join("bin")).expect("create bin");
        fs::write(dir.join("bin/hurl"), b"hurl").expect("write hurl");
    }

    #[rstest]
    fn key_combines_namespace_version_and_target(key: CacheKey) {
        assert_eq!(key.to_string(), "hurl-cache-4.3.0-linux-x64");
    }

    #[test]
    fn key_differs_by_architecture() {
        let version = ResolvedVersion::new("4.3.0");
        let x64 = CacheKey::new(&version, &Platform::Darwin, &Architecture::X64);
        let arm64 = CacheKey::new(&version, &Platform::Darwin, &Architecture::Arm64);
        assert_ne!(x64, arm64);
    }

    #[test]
    fn file_name_escapes_unsafe_characters() {
        let key = CacheKey::new(
            &ResolvedVersion::new("4.3.0+build/1"),
            &Platform::Linux,
            &Architecture::X64,
        );
        assert_eq!(key.file_name(), "hurl-cache-4.3.0_2Bbuild_2F1-linux-x64");
    }

    #[test]
    fn distinct_keys_get_distinct_file_names() {
        let slash = CacheKey::new(
            &ResolvedVersion::new("4.3.0+a/b"),
            &Platform::Linux,
            &Architecture::X64,
        );
        let underscore = CacheKey::new(
            &ResolvedVersion::new("4.3.0+a_b"),
            &Platform::Linux,
            &Architecture::X64,
        );
        assert_ne!(slash.file_name(), underscore.file_name());
    }

    #[rstest]
    fn disabled_policy_skips_backend(key: CacheKey) {
        let policy = CachePolicy::disabled();
        assert!(!policy.is_enabled());
        assert!(!policy.restore(Path::new("/nonexistent"), &key));
        policy.save(Path::new("/nonexistent"), &key);
    }

    #[rstest]
    fn restore_failure_is_a_miss(key: CacheKey) {
        let mut backend = MockArtifactCache::new();
        backend.expect_restore().times(1).returning(|_, _| {
            Err(CacheError::Unavailable {
                reason: "service down".to_owned(),
            })
        });

        assert!(!CachePolicy::enabled(&backend).restore(Path::new("/tmp/hurl"), &key));
    }

    #[rstest]
    fn save_failure_is_swallowed(key: CacheKey) {
        let mut backend = MockArtifactCache::new();
        backend.expect_save().times(1).returning(|_, _| {
            Err(CacheError::Unavailable {
                reason: "quota exceeded".to_owned(),
            })
        });

        CachePolicy::enabled(&backend).save(Path::new("/tmp/hurl"), &key);
    }

    #[rstest]
    fn restore_hit_is_reported(key: CacheKey) {
        let mut backend = MockArtifactCache::new();
        backend.expect_restore().returning(|_, _| Ok(true));

        assert!(CachePolicy::enabled(&backend).restore(Path::new("/tmp/hurl"), &key));
    }

    #[rstest]
    fn directory_cache_misses_when_empty(key: CacheKey) {
        let temp = tempfile::tempdir().expect("temp dir");
        let cache = DirectoryCache::new(temp.path().join("cache"));

        let hit = cache
            .restore(&temp.path().join("install"), &key)
            .expect("restore");
        assert!(!hit);
    }

    #[rstest]
    fn directory_cache_round_trips_a_tree(key: CacheKey) {
        let temp = tempfile::tempdir().expect("temp dir");
        let cache = DirectoryCache::new(temp.path().join("cache"));
        let installed = temp.path().join("hurl-4.3.0");
        populate(&installed);

        cache.save(&installed, &key).expect("save");
        fs::remove_dir_all(&installed).expect("remove install");
        let hit = cache.restore(&installed, &key).expect("restore");

        assert!(hit);
        assert_eq!(fs::read(installed.join("bin/hurl")).expect("read"), b"hurl");
        assert!(cache.entry_dir(&key).join("bin/hurl").is_file());
    }

    #[rstest]
    fn directory_cache_last_writer_wins(key: CacheKey) {
        let temp = tempfile::tempdir().expect("temp dir");
        let cache = DirectoryCache::new(temp.path().join("cache"));
        let first = temp.path().join("first");
        populate(&first);
        let second = temp.path().join("second");
        fs::create_dir_all(&second).expect("create second");
        fs::write(second.join("marker"), b"2").expect("write marker");

        cache.save(&first, &key).expect("first save");
        cache.save(&second, &key).expect("second save");

        let entry = cache.entry_dir(&key);
        assert!(entry.join("marker").is_file());
        assert!(!entry.join("bin").exists());
    }

    #[rstest]
    fn saving_missing_tree_fails(key: CacheKey) {
        let temp = tempfile::tempdir().expect("temp dir");
        let cache = DirectoryCache::new(temp.path().join("cache"));

        let err = cache
            .save(&temp.path().join("absent"), &key)
            .expect_err("nothing to save");
        assert!(matches!(err, CacheError::Unavailable { .. }));
    }
}
