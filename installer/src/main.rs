//! `setup-hurl` CLI entrypoint.
//!
//! This binary installs a prebuilt hurl release for the current runner,
//! registers it on the search path and publishes the executable path as the
//! `hurl-bin` step output.

use clap::Parser;
use hurl_installer::artefact::download::HttpDownloader;
use hurl_installer::artefact::extraction::ArchiveUnpacker;
use hurl_installer::artefact::naming::DistributionLocator;
use hurl_installer::cache::{CachePolicy, DirectoryCache};
use hurl_installer::cli::Cli;
use hurl_installer::dirs::{BaseDirs, SystemBaseDirs};
use hurl_installer::error::Result;
use hurl_installer::exec::SystemCommandExecutor;
use hurl_installer::install_flow::InstallContext;
use hurl_installer::logging::{self, RUNNER_DEBUG_VAR, format_record, level_filter};
use hurl_installer::output::{DryRunInfo, write_line};
use hurl_installer::pipeline::AcquisitionPipeline;
use hurl_installer::release::GithubReleaseLookup;
use hurl_installer::runner::RunnerOutputs;
use log::{Level, debug, warn};
use std::io::Write;
use std::path::PathBuf;

fn main() {
    let cli = Cli::parse();
    let runner_debug = std::env::var_os(RUNNER_DEBUG_VAR).is_some_and(|value| value == "1");
    if logging::init(level_filter(cli.quiet, cli.verbosity, runner_debug)).is_err() {
        // A logger is already installed; keep it.
    }

    let mut stdout = std::io::stdout();
    let run_result = run(&cli, &mut stdout);
    let exit_code = exit_code_for_run_result(run_result, &mut stdout);
    if exit_code != 0 {
        std::process::exit(exit_code);
    }
}

fn run(cli: &Cli, out: &mut dyn Write) -> Result<()> {
    let dirs = SystemBaseDirs::new();
    let lookup = GithubReleaseLookup::new(cli.token());
    let locator = DistributionLocator::default();
    let directory_cache = cache_root(cli, &dirs).map(DirectoryCache::new);
    let cache = cache_policy(cli.disable_cache, directory_cache.as_ref());
    let outputs = RunnerOutputs::from_env();

    let context = InstallContext {
        lookup: &lookup,
        pipeline: AcquisitionPipeline {
            platform: cli.target_platform(),
            arch: cli.target_arch(),
            locator: &locator,
            downloader: &HttpDownloader,
            extractor: &ArchiveUnpacker,
            cache,
        },
        executor: &SystemCommandExecutor,
        outputs: &outputs,
        install_root: install_root(cli, &dirs),
        inherited_path: std::env::var_os("PATH"),
        cwd: std::env::current_dir()?,
    };

    let spec = cli.version_spec();
    if cli.dry_run {
        let plan = context.plan(&spec)?;
        let info = DryRunInfo {
            version: &plan.version,
            platform: &context.pipeline.platform,
            arch: &context.pipeline.arch,
            location: &plan.location,
            cache_key: &plan.cache_key,
            install_dir: &plan.install_dir,
            cache_enabled: context.pipeline.cache.is_enabled(),
        };
        write_line(out, info.display_text());
        return Ok(());
    }

    context.install(&spec, out)?;
    Ok(())
}

/// Determines the cache directory from CLI or falls back to the user cache.
fn cache_root(cli: &Cli, dirs: &dyn BaseDirs) -> Option<PathBuf> {
    cli.cache_dir()
        .map(|dir| dir.as_std_path().to_path_buf())
        .or_else(|| dirs.cache_dir())
}

/// Determines the install root from CLI or falls back to the temp directory.
fn install_root(cli: &Cli, dirs: &dyn BaseDirs) -> PathBuf {
    cli.install_root()
        .map_or_else(|| dirs.temp_dir(), |dir| dir.as_std_path().to_path_buf())
}

fn cache_policy(disabled: bool, cache: Option<&DirectoryCache>) -> CachePolicy<'_> {
    match (disabled, cache) {
        (true, _) => {
            debug!("Cache disabled by configuration");
            CachePolicy::disabled()
        }
        (false, Some(cache)) => {
            debug!("Using cache at {}", cache.root().display());
            CachePolicy::enabled(cache)
        }
        (false, None) => {
            warn!("No cache directory available; caching is disabled for this run");
            CachePolicy::disabled()
        }
    }
}

fn exit_code_for_run_result(result: Result<()>, out: &mut dyn Write) -> i32 {
    match result {
        Ok(()) => 0,
        Err(err) => {
            write_line(out, format_record(Level::Error, &err.to_string()));
            1
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hurl_installer::error::InstallerError;
    use rstest::rstest;
    use std::path::Path;

    struct FixedDirs;

    impl BaseDirs for FixedDirs {
        fn cache_dir(&self) -> Option<PathBuf> {
            Some(PathBuf::from("/home/user/.cache/setup-hurl"))
        }

        fn temp_dir(&self) -> PathBuf {
            PathBuf::from("/tmp")
        }
    }

    fn parse(args: &[&str]) -> Cli {
        temp_env::with_vars_unset(["INPUT_CACHE-DIR", "RUNNER_TEMP", "INPUT_VERSION"], || {
            Cli::parse_from(args.iter().copied())
        })
    }

    #[test]
    fn exit_code_for_run_result_returns_zero_on_success() {
        let mut out = Vec::new();
        assert_eq!(exit_code_for_run_result(Ok(()), &mut out), 0);
        assert!(out.is_empty());
    }

    #[test]
    fn exit_code_for_run_result_prints_error_annotation() {
        let err = InstallerError::UnsupportedTarget {
            platform: "freebsd".to_owned(),
            arch: "x64".to_owned(),
            version: "4.3.0".to_owned(),
            reason: "no archive is published for this platform".to_owned(),
        };

        let mut out = Vec::new();
        assert_eq!(exit_code_for_run_result(Err(err), &mut out), 1);

        let text = String::from_utf8(out).expect("output was not UTF-8");
        assert!(text.starts_with("::error::unsupported target freebsd/x64"));
    }

    #[rstest]
    #[case::flag(&["setup-hurl", "--version", "4.3.0", "--cache-dir", "/srv/cache"], "/srv/cache")]
    #[case::default(&["setup-hurl", "--version", "4.3.0"], "/home/user/.cache/setup-hurl")]
    fn cache_root_prefers_cli(#[case] args: &[&str], #[case] expected: &str) {
        let cli = parse(args);
        assert_eq!(cache_root(&cli, &FixedDirs), Some(PathBuf::from(expected)));
    }

    #[rstest]
    #[case::flag(
        &["setup-hurl", "--version", "4.3.0", "--install-root", "/runner/_temp"],
        "/runner/_temp"
    )]
    #[case::default(&["setup-hurl", "--version", "4.3.0"], "/tmp")]
    fn install_root_prefers_cli(#[case] args: &[&str], #[case] expected: &str) {
        let cli = parse(args);
        assert_eq!(install_root(&cli, &FixedDirs), Path::new(expected));
    }

    #[test]
    fn disabled_cache_ignores_backend() {
        let cache = DirectoryCache::new("/srv/cache");
        assert!(!cache_policy(true, Some(&cache)).is_enabled());
        assert!(cache_policy(false, Some(&cache)).is_enabled());
        assert!(!cache_policy(false, None).is_enabled());
    }
}
