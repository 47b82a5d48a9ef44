//! Global catalog of downloaded declaration versions
//!
//! One subdirectory per version under the catalog root, each holding flat
//! `.d.ts` files.

pub mod store;
pub mod version;

pub use store::{DECLARATION_SUFFIX, StagedVersion, VersionCatalog, is_declaration_file};
pub use version::Version;
