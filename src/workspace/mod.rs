//! Workspace binding layer
//!
//! ```text
//! ┌──────────────┐     ┌──────────────┐     ┌──────────────┐
//! │   Catalog    │────▶│  Controller  │────▶│   Project    │
//! │ (validate)   │     │ (copy+marker)│     │ (tsconfig)   │
//! └──────────────┘     └──────────────┘     └──────────────┘
//!                             │
//!                             ▼
//!                      ┌──────────────┐
//!                      │   Chooser    │
//!                      │ (which root) │
//!                      └──────────────┘
//! ```
//!
//! - [`binding`]: workspace roots, layout and resolved binding
//! - [`chooser`]: selection among several candidates
//! - [`controller`]: activate / deactivate / query
//! - [`marker`]: persisted record of the active version
//! - [`replicate`]: staged replacement of the synced directory

pub mod binding;
pub mod chooser;
pub mod controller;
pub mod marker;
pub mod replicate;

pub use binding::{Workspace, WorkspaceBinding, WorkspaceLayout};
pub use chooser::{Chooser, PromptChooser};
pub use controller::WorkspaceActivationController;
pub use marker::ActiveVersionMarker;
