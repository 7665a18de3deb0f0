//! CLI argument definitions for `setup-hurl`.
//!
//! Every input can also be supplied through the environment variable a CI
//! runner uses for action inputs, so the binary works both as a step and as
//! a plain command.

use crate::artefact::target::{Architecture, Platform};
use crate::version::VersionSpec;
use camino::Utf8PathBuf;
use clap::Parser;
use clap::builder::BoolishValueParser;

/// Install a prebuilt hurl release and put it on the search path.
#[derive(Parser, Debug, Clone)]
#[command(name = "setup-hurl", about)]
#[command(long_about = concat!(
    "Install a prebuilt hurl release and put it on the search path.\n\n",
    "The requested version is resolved (\"latest\" queries the upstream release ",
    "metadata), the matching archive for this platform is restored from the ",
    "cache or downloaded and unpacked, and the installed executable is checked ",
    "with `hurl --version`. Its path is published as the `hurl-bin` output.",
))]
#[command(after_help = concat!(
    "EXAMPLES:\n",
    "  Install the most recent release:\n",
    "    $ setup-hurl --version latest\n\n",
    "  Install a specific release without the cache:\n",
    "    $ setup-hurl --version 4.3.0 --disable-cache\n\n",
    "  Show what would be downloaded:\n",
    "    $ setup-hurl --version 4.0.0 --dry-run",
))]
pub struct Cli {
    /// Version to install: `latest` or an explicit version such as `4.3.0`.
    #[arg(long, env = "INPUT_VERSION", value_name = "VERSION")]
    pub version: String,

    /// Token used for the latest-release lookup.
    #[arg(long, env = "INPUT_GITHUB-TOKEN", hide_env_values = true, value_name = "TOKEN")]
    pub github_token: Option<String>,

    /// Skip restoring from and saving to the cache.
    #[arg(
        long,
        env = "INPUT_DISABLE-CACHE",
        action = clap::ArgAction::Set,
        value_parser = BoolishValueParser::new(),
        num_args = 0..=1,
        default_value_t = false,
        default_missing_value = "true",
        value_name = "BOOL"
    )]
    pub disable_cache: bool,

    /// Parent directory of the install directory [default: OS temp dir].
    #[arg(long, env = "RUNNER_TEMP", value_name = "DIR")]
    pub install_root: Option<Utf8PathBuf>,

    /// Cache directory [default: per-user cache dir].
    #[arg(long, env = "INPUT_CACHE-DIR", value_name = "DIR")]
    pub cache_dir: Option<Utf8PathBuf>,

    /// Override the detected platform.
    #[arg(long, hide = true, value_name = "PLATFORM")]
    pub platform: Option<String>,

    /// Override the detected architecture.
    #[arg(long, hide = true, value_name = "ARCH")]
    pub arch: Option<String>,

    /// Resolve the version and show the download plan without installing.
    #[arg(long)]
    pub dry_run: bool,

    /// Increase log verbosity (repeatable: -v, -vv).
    #[arg(
        short,
        long = "verbose",
        action = clap::ArgAction::Count,
        conflicts_with = "quiet"
    )]
    pub verbosity: u8,

    /// Only show warnings and errors.
    #[arg(short, long, conflicts_with = "verbosity")]
    pub quiet: bool,
}

impl Cli {
    /// Return the parsed version request.
    #[must_use]
    pub fn version_spec(&self) -> VersionSpec {
        VersionSpec::parse(&self.version)
    }

    /// Return the lookup token, treating blank values as absent.
    #[must_use]
    pub fn token(&self) -> Option<String> {
        non_blank(self.github_token.as_deref()).map(str::to_owned)
    }

    /// Return the target platform, honouring any override.
    #[must_use]
    pub fn target_platform(&self) -> Platform {
        non_blank(self.platform.as_deref()).map_or_else(Platform::current, Platform::parse)
    }

    /// Return the target architecture, honouring any override.
    #[must_use]
    pub fn target_arch(&self) -> Architecture {
        non_blank(self.arch.as_deref()).map_or_else(Architecture::current, Architecture::parse)
    }

    /// Return the install root if one was given.
    #[must_use]
    pub fn install_root(&self) -> Option<&Utf8PathBuf> {
        self.install_root.as_ref().filter(|dir| !dir.as_str().is_empty())
    }

    /// Return the cache directory if one was given.
    #[must_use]
    pub fn cache_dir(&self) -> Option<&Utf8PathBuf> {
        self.cache_dir.as_ref().filter(|dir| !dir.as_str().is_empty())
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

#[cfg(test)]
#[path = "cli_tests.rs"]
mod tests;
