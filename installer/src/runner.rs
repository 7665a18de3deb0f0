//! CI runner integration.
//!
//! Results are handed back to the calling workflow through workflow
//! commands written to stdout (`::group::`, `::set-output`) and through the
//! files named by `GITHUB_OUTPUT` and `GITHUB_PATH`.

use crate::error::{InstallerError, Result};
use std::fs::OpenOptions;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

/// Environment variable naming the step output file.
pub const OUTPUT_FILE_VAR: &str = "GITHUB_OUTPUT";

/// Environment variable naming the search-path file.
pub const PATH_FILE_VAR: &str = "GITHUB_PATH";

/// Prefix of heredoc delimiters for multiline outputs.
const DELIMITER_PREFIX: &str = "ghadelimiter_";

/// Escape a message for use as workflow command data.
///
/// # Examples
///
/// ```
/// use hurl_installer::runner::escape_data;
///
/// assert_eq!(escape_data("50%\ndone"), "50%25%0Adone");
/// ```
#[must_use]
pub fn escape_data(value: &str) -> String {
    value
        .replace('%', "%25")
        .replace('\r', "%0D")
        .replace('\n', "%0A")
}

/// Open a collapsible log group.
///
/// # Errors
///
/// Returns any error from writing to `out`.
pub fn start_group(out: &mut dyn Write, title: &str) -> io::Result<()> {
    writeln!(out, "::group::{}", escape_data(title))
}

/// Close the innermost log group.
///
/// # Errors
///
/// Returns any error from writing to `out`.
pub fn end_group(out: &mut dyn Write) -> io::Result<()> {
    writeln!(out, "::endgroup::")
}

/// Destinations for step outputs and search-path additions.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunnerOutputs {
    output_file: Option<PathBuf>,
    path_file: Option<PathBuf>,
}

impl RunnerOutputs {
    /// Use explicit output and path files. `None` falls back to stdout.
    #[must_use]
    pub const fn new(output_file: Option<PathBuf>, path_file: Option<PathBuf>) -> Self {
        Self {
            output_file,
            path_file,
        }
    }

    /// Read the file locations from the process environment.
    ///
    /// Unset or empty variables fall back to stdout.
    #[must_use]
    pub fn from_env() -> Self {
        let var = |name: &str| {
            std::env::var_os(name)
                .filter(|value| !value.is_empty())
                .map(PathBuf::from)
        };
        Self::new(var(OUTPUT_FILE_VAR), var(PATH_FILE_VAR))
    }

    /// Prepend `dir` to the executable search path of later steps.
    ///
    /// # Errors
    ///
    /// Returns [`InstallerError::Output`] if the path file cannot be
    /// appended to, or [`InstallerError::Io`] if `out` cannot be written.
    pub fn add_path(&self, dir: &Path, out: &mut dyn Write) -> Result<()> {
        match &self.path_file {
            Some(file) => append(file, &format!("{}\n", dir.display())),
            None => {
                writeln!(out, "Add {} to PATH to use hurl in later steps", dir.display())?;
                Ok(())
            }
        }
    }

    /// Publish a named step output.
    ///
    /// Multiline values use the heredoc form of the output file.
    ///
    /// # Errors
    ///
    /// Returns [`InstallerError::Output`] if the output file cannot be
    /// appended to, or [`InstallerError::Io`] if `out` cannot be written.
    pub fn set_output(&self, name: &str, value: &str, out: &mut dyn Write) -> Result<()> {
        match &self.output_file {
            Some(file) => append(file, &output_record(name, value)),
            None => {
                writeln!(out, "::set-output name={name}::{}", escape_data(value))?;
                Ok(())
            }
        }
    }
}

/// Format one entry of the output file.
fn output_record(name: &str, value: &str) -> String {
    if !value.contains(['\n', '\r']) {
        return format!("{name}={value}\n");
    }
    let mut delimiter = format!("{DELIMITER_PREFIX}{}", std::process::id());
    while value.contains(&delimiter) {
        delimiter.push('_');
    }
    format!("{name}<<{delimiter}\n{value}\n{delimiter}\n")
}

fn append(path: &Path, contents: &str) -> Result<()> {
    let to_output_error = |source| InstallerError::Output {
        path: path.to_path_buf(),
        source,
    };
    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(to_output_error)?;
    file.write_all(contents.as_bytes()).map_err(to_output_error)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::{fixture, rstest};
    use std::fs;

    struct Files {
        dir: tempfile::TempDir,
    }

    impl Files {
        fn output(&self) -> PathBuf {
            self.dir.path().join("output")
        }

        fn path(&self) -> PathBuf {
            self.dir.path().join("path")
        }

        fn outputs(&self) -> RunnerOutputs {
            RunnerOutputs::new(Some(self.output()), Some(self.path()))
        }
    }

    #[fixture]
    fn files() -> Files {
        Files {
            dir: tempfile::tempdir().expect("temp dir"),
        }
    }

    #[rstest]
    #[case::plain("hello", "hello")]
    #[case::percent("100%", "100%25")]
    #[case::newlines("a\r\nb", "a%0D%0Ab")]
    fn escapes_command_data(#[case] raw: &str, #[case] expected: &str) {
        assert_eq!(escape_data(raw), expected);
    }

    #[test]
    fn groups_wrap_titles() {
        let mut out = Vec::new();
        start_group(&mut out, "Install hurl").expect("write");
        end_group(&mut out).expect("write");
        assert_eq!(
            String::from_utf8(out).expect("utf8"),
            "::group::Install hurl\n::endgroup::\n"
        );
    }

    #[rstest]
    fn set_output_appends_to_output_file(files: Files) {
        let outputs = files.outputs();
        let mut out = Vec::new();
        fs::write(files.output(), "previous=1\n").expect("seed file");

        outputs
            .set_output("hurl-bin", "/tmp/hurl-4.3.0/hurl", &mut out)
            .expect("set output");

        assert_eq!(
            fs::read_to_string(files.output()).expect("read"),
            "previous=1\nhurl-bin=/tmp/hurl-4.3.0/hurl\n"
        );
        assert!(out.is_empty());
    }

    #[rstest]
    fn multiline_output_uses_delimiter(files: Files) {
        files
            .outputs()
            .set_output("notes", "line one\nline two", &mut Vec::new())
            .expect("set output");

        let written = fs::read_to_string(files.output()).expect("read");
        let mut lines = written.lines();
        let header = lines.next().expect("header");
        let delimiter = header.strip_prefix("notes<<").expect("heredoc header");
        assert_eq!(lines.next(), Some("line one"));
        assert_eq!(lines.next(), Some("line two"));
        assert_eq!(lines.next(), Some(delimiter));
    }

    #[test]
    fn set_output_without_file_prints_command() {
        let mut out = Vec::new();
        RunnerOutputs::default()
            .set_output("hurl-bin", "/opt/hurl", &mut out)
            .expect("set output");
        assert_eq!(
            String::from_utf8(out).expect("utf8"),
            "::set-output name=hurl-bin::/opt/hurl\n"
        );
    }

    #[rstest]
    fn add_path_appends_directory(files: Files) {
        let dir = Path::new("/tmp/hurl-4.3.0");
        files
            .outputs()
            .add_path(dir, &mut Vec::new())
            .expect("add path");
        assert_eq!(
            fs::read_to_string(files.path()).expect("read"),
            format!("{}\n", dir.display())
        );
    }

    #[rstest]
    fn unwritable_file_is_an_output_error(files: Files) {
        let outputs = RunnerOutputs::new(Some(files.dir.path().join("missing/output")), None);
        let err = outputs
            .set_output("hurl-bin", "/opt/hurl", &mut Vec::new())
            .expect_err("parent directory is missing");
        assert!(matches!(err, InstallerError::Output { .. }));
    }

    #[test]
    fn from_env_ignores_empty_values() {
        temp_env::with_vars(
            [(OUTPUT_FILE_VAR, Some("")), (PATH_FILE_VAR, None::<&str>)],
            || assert_eq!(RunnerOutputs::from_env(), RunnerOutputs::default()),
        );
    }
}
