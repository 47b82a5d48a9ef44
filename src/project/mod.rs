//! Project type-checking config (tsconfig.json) synchronization
//!
//! - options.rs: typed table of compiler-option toggles
//! - synchronizer.rs: include-glob merge/restore driving the JSONC editor

pub mod options;
pub mod synchronizer;

pub use synchronizer::{IncludeChange, PendingConfig, ProjectConfigSynchronizer};
