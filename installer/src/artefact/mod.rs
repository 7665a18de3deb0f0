//! Release artefact handling: naming, retrieval, unpacking and discovery.
//!
//! # Sub-modules
//!
//! - [`target`] - Runner platform and architecture (`Platform`, `Architecture`).
//! - [`naming`] - Version-gated archive naming table (`DistributionLocator`).
//! - [`download`] - Archive download trait and HTTP implementation.
//! - [`extraction`] - tar.gz and zip extraction with path traversal protection.
//! - [`discovery`] - Binary-root discovery inside unpacked tarballs.

pub mod discovery;
pub mod download;
pub mod extraction;
pub mod naming;
pub mod target;
