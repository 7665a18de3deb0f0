//! Process spawning.
//!
//! The verifier runs the installed executable through [`CommandExecutor`]
//! so tests can substitute canned results for real processes.

use crate::error::{InstallerError, Result};
use std::ffi::OsStr;
use std::path::Path;
use std::process::{Command, Output, Stdio};

/// Abstraction for running external commands.
pub trait CommandExecutor {
    /// Runs `program` with `args`, using `search_path` as its `PATH`, and
    /// returns the captured output.
    ///
    /// # Errors
    ///
    /// Returns any I/O errors encountered while spawning or running the command.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use hurl_installer::exec::{CommandExecutor, SystemCommandExecutor};
    /// use std::ffi::OsStr;
    /// use std::path::Path;
    ///
    /// let executor = SystemCommandExecutor;
    /// let output = executor.run(Path::new("hurl"), &["--version"], OsStr::new("/usr/bin"))?;
    /// assert!(output.status.success());
    /// # Ok::<(), hurl_installer::error::InstallerError>(())
    /// ```
    fn run(&self, program: &Path, args: &[&str], search_path: &OsStr) -> Result<Output>;
}

/// Executes commands on the host system.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemCommandExecutor;

impl CommandExecutor for SystemCommandExecutor {
    fn run(&self, program: &Path, args: &[&str], search_path: &OsStr) -> Result<Output> {
        Command::new(program)
            .args(args)
            .env("PATH", search_path)
            .stdin(Stdio::null())
            .output()
            .map_err(InstallerError::from)
    }
}
