//! Shared test utilities for the installer crate.

use crate::error::{InstallerError, Result};
use crate::exec::CommandExecutor;
use flate2::Compression;
use flate2::write::GzEncoder;
use std::cell::RefCell;
use std::collections::VecDeque;
use std::ffi::OsStr;
use std::fs::File;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process::{ExitStatus, Output};

/// Permission bits given to every archive entry.
const ENTRY_MODE: u32 = 0o755;

/// Creates an `ExitStatus` from an exit code (Unix implementation).
#[cfg(unix)]
pub fn exit_status(code: i32) -> ExitStatus {
    use std::os::unix::process::ExitStatusExt;

    ExitStatus::from_raw(code << 8)
}

/// Creates an `ExitStatus` from an exit code (Windows implementation).
#[cfg(windows)]
pub fn exit_status(code: i32) -> ExitStatus {
    use std::os::windows::process::ExitStatusExt;

    ExitStatus::from_raw(code.cast_unsigned())
}

/// Creates a successful command `Output` with the given stdout.
pub fn success_output(stdout: &str) -> Output {
    Output {
        status: exit_status(0),
        stdout: stdout.as_bytes().to_vec(),
        stderr: Vec::new(),
    }
}

/// Creates a failed command `Output` with the given stderr message.
pub fn failure_output(stderr: &str) -> Output {
    Output {
        status: exit_status(1),
        stdout: Vec::new(),
        stderr: stderr.as_bytes().to_vec(),
    }
}

/// Represents an expected command invocation for testing.
#[derive(Debug)]
pub struct ExpectedCall {
    /// The program to execute.
    pub program: PathBuf,
    /// The arguments to pass to the program.
    pub args: Vec<String>,
    /// The result to return when this command is invoked.
    pub result: Result<Output>,
}

impl ExpectedCall {
    /// Expect `program --version`, answering with `result`.
    pub fn version_query(program: impl Into<PathBuf>, result: Result<Output>) -> Self {
        Self {
            program: program.into(),
            args: vec!["--version".to_owned()],
            result,
        }
    }
}

/// A stub implementation of `CommandExecutor` for testing.
///
/// Records expected command invocations and returns predefined results,
/// allowing tests to verify command execution without side effects.
/// Invocations that were not expected yield
/// [`InstallerError::StubMismatch`].
#[derive(Debug)]
pub struct StubExecutor {
    expected: RefCell<VecDeque<ExpectedCall>>,
    search_paths: RefCell<Vec<std::ffi::OsString>>,
}

impl StubExecutor {
    /// Creates a new `StubExecutor` with the given expected calls.
    pub fn new(expected: Vec<ExpectedCall>) -> Self {
        Self {
            expected: RefCell::new(expected.into()),
            search_paths: RefCell::new(Vec::new()),
        }
    }

    /// Returns the `PATH` values passed to each invocation so far.
    pub fn search_paths(&self) -> Vec<std::ffi::OsString> {
        self.search_paths.borrow().clone()
    }

    /// Asserts that all expected command invocations have been consumed.
    ///
    /// # Panics
    ///
    /// Panics if there are remaining expected calls that were not invoked.
    pub fn assert_finished(&self) {
        assert!(
            self.expected.borrow().is_empty(),
            "expected no further command invocations"
        );
    }
}

impl CommandExecutor for StubExecutor {
    fn run(&self, program: &Path, args: &[&str], search_path: &OsStr) -> Result<Output> {
        self.search_paths.borrow_mut().push(search_path.to_owned());
        let call = self
            .expected
            .borrow_mut()
            .pop_front()
            .ok_or_else(|| InstallerError::StubMismatch {
                message: format!("unexpected invocation of {}", program.display()),
            })?;

        if call.program != program || call.args != args {
            return Err(InstallerError::StubMismatch {
                message: format!(
                    "expected {} {:?}, got {} {:?}",
                    call.program.display(),
                    call.args,
                    program.display(),
                    args
                ),
            });
        }
        call.result
    }
}

/// Writes a `.tar.gz` archive containing `entries` (path, contents) to `path`.
///
/// Every entry is a regular file with mode `0755`.
///
/// # Errors
///
/// Returns any I/O error raised while writing the archive.
pub fn write_tar_gz(path: &Path, entries: &[(&str, &[u8])]) -> io::Result<()> {
    let encoder = GzEncoder::new(File::create(path)?, Compression::default());
    let mut builder = tar::Builder::new(encoder);
    for (name, contents) in entries {
        let mut header = tar::Header::new_gnu();
        header.set_size(contents.len() as u64);
        header.set_mode(ENTRY_MODE);
        builder.append_data(&mut header, name, *contents)?;
    }
    builder.into_inner()?.finish()?.flush()
}

/// Writes a `.zip` archive containing `entries` (path, contents) to `path`.
///
/// Every entry is a regular file with Unix mode `0755`.
///
/// # Errors
///
/// Returns any I/O error raised while writing the archive.
pub fn write_zip(path: &Path, entries: &[(&str, &[u8])]) -> io::Result<()> {
    let mut writer = zip::ZipWriter::new(File::create(path)?);
    let options = zip::write::SimpleFileOptions::default().unix_permissions(ENTRY_MODE);
    for (name, contents) in entries {
        writer.start_file(*name, options).map_err(io::Error::other)?;
        writer.write_all(contents)?;
    }
    writer.finish().map_err(io::Error::other)?;
    Ok(())
}

/// Writes a release tarball shaped like upstream's for `version`.
///
/// From 4.3.0 the executable sits in a nested `bin` directory; earlier
/// releases keep it in the top-level directory.
///
/// # Errors
///
/// Returns any I/O error raised while writing the archive.
pub fn write_release_tarball(path: &Path, version: &str, nested_bin: bool) -> io::Result<()> {
    let root = format!("hurl-{version}-x86_64-unknown-linux-gnu");
    let binary_dir = if nested_bin {
        format!("{root}/bin")
    } else {
        root.clone()
    };
    let hurl = format!("{binary_dir}/hurl");
    let hurlfmt = format!("{binary_dir}/hurlfmt");
    let readme = format!("{root}/README.md");
    write_tar_gz(
        path,
        &[
            (hurl.as_str(), b"#!/bin/sh\necho hurl\n".as_slice()),
            (hurlfmt.as_str(), b"#!/bin/sh\necho hurlfmt\n".as_slice()),
            (readme.as_str(), b"hurl".as_slice()),
        ],
    )
}
