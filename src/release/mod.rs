//! Fetching declaration sets from published releases
//!
//! - [`source`]: release model and the [`ReleaseSource`] trait
//! - [`github`]: GitHub Releases API implementation
//! - [`archive`]: `headers/*.d.ts` extraction from the release zip
//! - [`install`]: release selection and catalog installation

pub mod archive;
pub mod github;
pub mod install;
pub mod source;

pub use github::GitHubReleases;
pub use install::{ReleaseInstaller, ReleaseSelector};
pub use source::{Asset, Release, ReleaseSource};
