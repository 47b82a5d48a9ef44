//! JSONC document layer
//!
//! - path.rs: key paths and edits
//! - document.rs: tree-sitter backed read-only view (lookup, decoding)
//! - editor.rs: format-preserving application of edits
//! - format.rs: indentation detection and value rendering

pub mod document;
pub mod editor;
pub mod format;
pub mod path;

pub use document::{JsoncDocument, parse_value};
pub use editor::apply;
pub use path::{JsonEdit, Segment, key_path};
