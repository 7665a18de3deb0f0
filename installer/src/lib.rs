//! hurl installer library.
//!
//! This crate resolves a requested hurl version, locates the prebuilt
//! archive for the running platform, restores it from a cache or downloads
//! and unpacks it, and verifies the installed executable. It is used by the
//! `setup-hurl` CLI binary and can be consumed programmatically for testing.
//!
//! # Modules
//!
//! - [`artefact`] - Target detection, archive naming, download, extraction and binary discovery
//! - [`cache`] - Cache keys and the best-effort cache layer
//! - [`cli`] - Command-line argument definitions
//! - [`dirs`] - Directory resolution abstraction for platform-specific paths
//! - [`error`] - Error taxonomy for a run
//! - [`exec`] - Process spawning abstraction
//! - [`install_flow`] - Whole-run orchestration
//! - [`logging`] - `log` backend speaking the runner's workflow commands
//! - [`output`] - Dry-run and success message formatting
//! - [`pipeline`] - Cache-aware acquisition of a release
//! - [`release`] - Release metadata lookup
//! - [`runner`] - Step outputs, search-path registration and log groups
//! - [`stager`] - Staging directories and whole-directory replacement
//! - [`verify`] - Post-install verification
//! - [`version`] - Version requests and their resolution

pub mod artefact;
pub mod cache;
pub mod cli;
pub mod dirs;
pub mod error;
pub mod exec;
pub mod install_flow;
pub mod logging;
pub mod output;
pub mod pipeline;
pub mod release;
pub mod runner;
pub mod stager;
#[cfg(any(test, feature = "test-support"))]
pub mod test_utils;
pub mod verify;
pub mod version;
