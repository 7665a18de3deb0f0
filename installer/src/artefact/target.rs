//! Platform and architecture identification.
//!
//! Both values come from the execution environment rather than the caller.
//! Unknown values are preserved verbatim so that the locator can name them
//! when it rejects the combination.

use std::fmt;

/// Operating system family of the runner.
///
/// # Examples
///
/// ```
/// use hurl_installer::artefact::target::Platform;
///
/// assert_eq!(Platform::parse("macos"), Platform::Darwin);
/// assert_eq!(Platform::parse("win32"), Platform::Windows);
/// assert_eq!(Platform::parse("freebsd").as_str(), "freebsd");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Platform {
    /// Linux.
    Linux,
    /// macOS.
    Darwin,
    /// Windows.
    Windows,
    /// Any platform without published hurl artefacts.
    Other(String),
}

impl Platform {
    /// Parse a platform token, accepting common runtime aliases.
    #[must_use]
    pub fn parse(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "linux" => Self::Linux,
            "darwin" | "macos" | "osx" => Self::Darwin,
            "windows" | "win32" => Self::Windows,
            _ => Self::Other(raw.trim().to_owned()),
        }
    }

    /// Detect the platform this binary was compiled for.
    #[must_use]
    pub fn current() -> Self {
        Self::parse(std::env::consts::OS)
    }

    /// Return the canonical token used in cache keys and messages.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Linux => "linux",
            Self::Darwin => "darwin",
            Self::Windows => "windows",
            Self::Other(value) => value,
        }
    }

    /// Return the file name of the hurl executable on this platform.
    #[must_use]
    pub const fn executable_name(&self) -> &'static str {
        match self {
            Self::Windows => "hurl.exe",
            _ => "hurl",
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// CPU architecture of the runner.
///
/// # Examples
///
/// ```
/// use hurl_installer::artefact::target::Architecture;
///
/// assert_eq!(Architecture::parse("x86_64"), Architecture::X64);
/// assert_eq!(Architecture::parse("aarch64"), Architecture::Arm64);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Architecture {
    /// 64-bit x86.
    X64,
    /// 64-bit ARM.
    Arm64,
    /// Any architecture without published hurl artefacts.
    Other(String),
}

impl Architecture {
    /// Parse an architecture token, accepting common aliases.
    #[must_use]
    pub fn parse(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "x64" | "x86_64" | "amd64" => Self::X64,
            "arm64" | "aarch64" => Self::Arm64,
            _ => Self::Other(raw.trim().to_owned()),
        }
    }

    /// Detect the architecture this binary was compiled for.
    #[must_use]
    pub fn current() -> Self {
        Self::parse(std::env::consts::ARCH)
    }

    /// Return the canonical token used in cache keys and messages.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::X64 => "x64",
            Self::Arm64 => "arm64",
            Self::Other(value) => value,
        }
    }
}

impl fmt::Display for Architecture {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
