//! `log` backend that speaks the runner's workflow-command dialect.
//!
//! Warnings and errors become `::warning::` and `::error::` annotations,
//! debug and trace records become `::debug::` lines (shown only when the
//! runner has step debugging enabled), and info records are printed as-is.
//! Only records from this crate and the `setup-hurl` binary are emitted.

use crate::runner::escape_data;
use log::{Level, LevelFilter, Log, Metadata, Record, SetLoggerError};
use std::io::Write;

/// Log targets emitted by [`RunnerLogger`].
const TARGETS: &[&str] = &["hurl_installer", "setup_hurl"];

/// Environment variable the runner sets when step debugging is enabled.
pub const RUNNER_DEBUG_VAR: &str = "RUNNER_DEBUG";

/// Writes log records to stdout as workflow commands.
#[derive(Debug, Clone, Copy, Default)]
pub struct RunnerLogger;

static LOGGER: RunnerLogger = RunnerLogger;

/// Install [`RunnerLogger`] as the global logger.
///
/// # Errors
///
/// Returns an error if a logger has already been installed.
pub fn init(level: LevelFilter) -> Result<(), SetLoggerError> {
    log::set_logger(&LOGGER)?;
    log::set_max_level(level);
    Ok(())
}

/// Choose the maximum level from verbosity flags.
///
/// `quiet` wins over `verbose`; runner step debugging raises the floor to
/// debug.
///
/// # Examples
///
/// ```
/// use hurl_installer::logging::level_filter;
/// use log::LevelFilter;
///
/// assert_eq!(level_filter(false, 0, false), LevelFilter::Info);
/// assert_eq!(level_filter(false, 2, false), LevelFilter::Trace);
/// assert_eq!(level_filter(true, 2, true), LevelFilter::Warn);
/// ```
#[must_use]
pub fn level_filter(quiet: bool, verbose: u8, runner_debug: bool) -> LevelFilter {
    if quiet {
        return LevelFilter::Warn;
    }
    match (verbose, runner_debug) {
        (0, false) => LevelFilter::Info,
        (0 | 1, _) => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    }
}

/// Render a record as a workflow command line (without the newline).
#[must_use]
pub fn format_record(level: Level, message: &str) -> String {
    match level {
        Level::Error => format!("::error::{}", escape_data(message)),
        Level::Warn => format!("::warning::{}", escape_data(message)),
        Level::Info => message.to_owned(),
        Level::Debug | Level::Trace => format!("::debug::{}", escape_data(message)),
    }
}

impl Log for RunnerLogger {
    fn enabled(&self, metadata: &Metadata<'_>) -> bool {
        metadata.level() <= log::max_level()
            && TARGETS
                .iter()
                .any(|target| metadata.target().starts_with(target))
    }

    fn log(&self, record: &Record<'_>) {
        if !self.enabled(record.metadata()) {
            return;
        }
        let line = format_record(record.level(), &record.args().to_string());
        let mut stdout = std::io::stdout().lock();
        if writeln!(stdout, "{line}").is_err() {
            // Best-effort logging; ignore write failures.
        }
    }

    fn flush(&self) {
        if std::io::stdout().lock().flush().is_err() {
            // Best-effort logging; ignore flush failures.
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case::error(Level::Error, "boom", "::error::boom")]
    #[case::warn(Level::Warn, "cache down", "::warning::cache down")]
    #[case::info(Level::Info, "Installing hurl 4.3.0", "Installing hurl 4.3.0")]
    #[case::debug(Level::Debug, "detail", "::debug::detail")]
    #[case::trace(Level::Trace, "more", "::debug::more")]
    fn maps_levels_to_commands(
        #[case] level: Level,
        #[case] message: &str,
        #[case] expected: &str,
    ) {
        assert_eq!(format_record(level, message), expected);
    }

    #[test]
    fn escapes_annotation_messages() {
        assert_eq!(
            format_record(Level::Warn, "first\nsecond"),
            "::warning::first%0Asecond"
        );
    }

    #[rstest]
    #[case::default(false, 0, false, LevelFilter::Info)]
    #[case::verbose(false, 1, false, LevelFilter::Debug)]
    #[case::runner_debug(false, 0, true, LevelFilter::Debug)]
    #[case::very_verbose(false, 3, false, LevelFilter::Trace)]
    #[case::quiet(true, 0, false, LevelFilter::Warn)]
    fn chooses_level(
        #[case] quiet: bool,
        #[case] verbose: u8,
        #[case] runner_debug: bool,
        #[case] expected: LevelFilter,
    ) {
        assert_eq!(level_filter(quiet, verbose, runner_debug), expected);
    }

    #[test]
    fn ignores_foreign_targets() {
        let metadata = Metadata::builder()
            .level(Level::Error)
            .target("ureq::unversioned")
            .build();
        assert!(!RunnerLogger.enabled(&metadata));
    }
}
