//! Unit tests for whole-run orchestration.

use super::*;
use crate::artefact::download::{ArtefactDownloader, DownloadError, MockArtefactDownloader};
use crate::artefact::extraction::ArchiveUnpacker;
use crate::artefact::naming::DistributionLocator;
use crate::artefact::target::{Architecture, Platform};
use crate::cache::CachePolicy;
use crate::error::InstallerError;
use crate::release::{LookupError, MockReleaseLookup};
use crate::test_utils::{
    ExpectedCall, StubExecutor, failure_output, success_output, write_release_tarball,
};
use mockall::predicate::{always, eq};
use rstest::{fixture, rstest};
use std::fs;

const LINUX_430_URL: &str = concat!(
    "https://github.com/Orange-OpenSource/hurl/releases/download/",
    "4.3.0/hurl-4.3.0-x86_64-unknown-linux-gnu.tar.gz"
);

struct Runner {
    temp: tempfile::TempDir,
    outputs: RunnerOutputs,
}

impl Runner {
    fn root(&self) -> PathBuf {
        self.temp.path().join("runner-temp")
    }

    fn output_file(&self) -> PathBuf {
        self.temp.path().join("github-output")
    }

    fn path_file(&self) -> PathBuf {
        self.temp.path().join("github-path")
    }

    fn read(path: &Path) -> String {
        fs::read_to_string(path).unwrap_or_default()
    }
}

#[fixture]
fn runner() -> Runner {
    let temp = tempfile::tempdir().expect("temp dir");
    let outputs = RunnerOutputs::new(
        Some(temp.path().join("github-output")),
        Some(temp.path().join("github-path")),
    );
    fs::create_dir(temp.path().join("runner-temp")).expect("create runner temp");
    Runner { temp, outputs }
}

fn context<'a>(
    runner: &'a Runner,
    lookup: &'a dyn ReleaseLookup,
    locator: &'a DistributionLocator,
    downloader: &'a dyn ArtefactDownloader,
    executor: &'a dyn CommandExecutor,
) -> InstallContext<'a> {
    InstallContext {
        lookup,
        pipeline: AcquisitionPipeline {
            platform: Platform::Linux,
            arch: Architecture::X64,
            locator,
            downloader,
            extractor: &ArchiveUnpacker,
            cache: CachePolicy::disabled(),
        },
        executor,
        outputs: &runner.outputs,
        install_root: runner.root(),
        inherited_path: None,
        cwd: runner.temp.path().to_path_buf(),
    }
}

fn serving_430() -> MockArtefactDownloader {
    let mut downloader = MockArtefactDownloader::new();
    downloader
        .expect_download()
        .with(eq(LINUX_430_URL), always())
        .times(1)
        .returning(|_, dest| write_release_tarball(dest, "4.3.0", true).map_err(DownloadError::Io));
    downloader
}

#[test]
fn install_dir_is_named_after_version() {
    assert_eq!(
        install_dir_for(Path::new("/tmp"), &ResolvedVersion::new("1.8.0")),
        Path::new("/tmp/hurl-1.8.0")
    );
}

#[rstest]
fn plan_describes_download_without_side_effects(runner: Runner) {
    let lookup = MockReleaseLookup::new();
    let downloader = MockArtefactDownloader::new();
    let executor = StubExecutor::new(vec![]);
    let locator = DistributionLocator::default();
    let context = context(&runner, &lookup, &locator, &downloader, &executor);

    let plan = context
        .plan(&VersionSpec::Exact("4.3.0".to_owned()))
        .expect("plan");

    assert_eq!(plan.version.as_str(), "4.3.0");
    assert_eq!(plan.location.url(), LINUX_430_URL);
    assert_eq!(plan.cache_key.as_str(), "hurl-cache-4.3.0-linux-x64");
    assert_eq!(plan.install_dir, runner.root().join("hurl-4.3.0"));
    assert!(!plan.install_dir.exists());
    executor.assert_finished();
}

#[rstest]
fn plan_resolves_latest(runner: Runner) {
    let mut lookup = MockReleaseLookup::new();
    lookup
        .expect_latest_tag()
        .with(eq("Orange-OpenSource"), eq("hurl"))
        .times(1)
        .returning(|_, _| Ok("v5.0.0".to_owned()));
    let downloader = MockArtefactDownloader::new();
    let executor = StubExecutor::new(vec![]);
    let locator = DistributionLocator::default();
    let context = context(&runner, &lookup, &locator, &downloader, &executor);

    let plan = context.plan(&VersionSpec::Latest).expect("plan");

    assert_eq!(plan.version.as_str(), "5.0.0");
    assert!(plan.location.url().ends_with("/5.0.0/hurl-5.0.0-x86_64-unknown-linux-gnu.tar.gz"));
}

#[rstest]
fn lookup_failure_aborts_before_any_output(runner: Runner) {
    let mut lookup = MockReleaseLookup::new();
    lookup.expect_latest_tag().times(1).returning(|_, _| {
        Err(LookupError::Http {
            url: "https://api.github.com".to_owned(),
            reason: "connection refused".to_owned(),
        })
    });
    let downloader = MockArtefactDownloader::new();
    let executor = StubExecutor::new(vec![]);
    let locator = DistributionLocator::default();
    let context = context(&runner, &lookup, &locator, &downloader, &executor);
    let mut out = Vec::new();

    let err = context
        .install(&VersionSpec::Latest, &mut out)
        .expect_err("lookup fails");

    assert!(matches!(err, InstallerError::MetadataLookup(_)));
    assert!(out.is_empty());
    assert!(Runner::read(&runner.output_file()).is_empty());
}

#[cfg(unix)]
#[rstest]
fn install_registers_path_and_publishes_executable(runner: Runner) {
    let lookup = MockReleaseLookup::new();
    let downloader = serving_430();
    let locator = DistributionLocator::default();
    let install_dir = runner.root().join("hurl-4.3.0");
    let executor = StubExecutor::new(vec![ExpectedCall::version_query(
        install_dir.join("hurl"),
        Ok(success_output("hurl 4.3.0\n")),
    )]);
    let context = context(&runner, &lookup, &locator, &downloader, &executor);
    let mut out = Vec::new();

    let report = context
        .install(&VersionSpec::Exact("4.3.0".to_owned()), &mut out)
        .expect("install");

    assert_eq!(report.install_dir, install_dir);
    assert_eq!(report.executable, install_dir.join("hurl"));
    assert!(matches!(report.outcome, AcquireOutcome::Installed { .. }));
    assert_eq!(
        Runner::read(&runner.path_file()),
        format!("{}\n", install_dir.display())
    );
    assert_eq!(
        Runner::read(&runner.output_file()),
        format!("hurl-bin={}\n", install_dir.join("hurl").display())
    );
    assert_eq!(
        String::from_utf8(out).expect("utf8"),
        concat!(
            "::group::Install hurl\n",
            "::endgroup::\n",
            "::group::Installation check\n",
            "::endgroup::\n",
        )
    );
    let search_paths = executor.search_paths();
    let [search_path] = search_paths.as_slice() else {
        panic!("expected one invocation, got {search_paths:?}");
    };
    assert_eq!(
        std::env::split_paths(search_path).next(),
        Some(install_dir.clone())
    );
    executor.assert_finished();
}

#[cfg(unix)]
#[rstest]
fn failed_verification_publishes_no_output(runner: Runner) {
    let lookup = MockReleaseLookup::new();
    let downloader = serving_430();
    let locator = DistributionLocator::default();
    let install_dir = runner.root().join("hurl-4.3.0");
    let executor = StubExecutor::new(vec![ExpectedCall::version_query(
        install_dir.join("hurl"),
        Ok(failure_output("error while loading shared libraries")),
    )]);
    let context = context(&runner, &lookup, &locator, &downloader, &executor);
    let mut out = Vec::new();

    let err = context
        .install(&VersionSpec::Exact("4.3.0".to_owned()), &mut out)
        .expect_err("verification fails");

    assert!(matches!(err, InstallerError::Verification { .. }));
    assert!(Runner::read(&runner.output_file()).is_empty());
    assert!(
        String::from_utf8(out)
            .expect("utf8")
            .ends_with("::group::Installation check\n::endgroup::\n")
    );
}

#[rstest]
fn download_failure_closes_group(runner: Runner) {
    let lookup = MockReleaseLookup::new();
    let mut downloader = MockArtefactDownloader::new();
    downloader.expect_download().times(1).returning(|url, _| {
        Err(DownloadError::NotFound {
            url: url.to_owned(),
        })
    });
    let executor = StubExecutor::new(vec![]);
    let locator = DistributionLocator::default();
    let context = context(&runner, &lookup, &locator, &downloader, &executor);
    let mut out = Vec::new();

    let err = context
        .install(&VersionSpec::Exact("4.3.0".to_owned()), &mut out)
        .expect_err("download fails");

    assert!(matches!(err, InstallerError::Download(DownloadError::NotFound { .. })));
    assert_eq!(
        String::from_utf8(out).expect("utf8"),
        "::group::Install hurl\n::endgroup::\n"
    );
    assert!(Runner::read(&runner.path_file()).is_empty());
}
