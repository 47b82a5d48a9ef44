pub mod catalog;
pub mod config;
pub mod error;
pub mod jsonc;
pub mod logging;
pub mod plugin;
pub mod project;
pub mod release;
pub mod workspace;
