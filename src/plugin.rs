//! One-way configuration push to the language-service plugin
//!
//! The plugin only needs the absolute paths of the active declaration files.
//! Pushes are fire-and-forget: failures are logged, never returned.

use std::path::{Path, PathBuf};

#[cfg(test)]
use mockall::automock;
use serde::Serialize;
use tracing::{debug, warn};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PluginConfig {
    pub absolute_paths: Vec<String>,
}

impl PluginConfig {
    pub fn from_paths(paths: &[PathBuf]) -> Self {
        Self {
            absolute_paths: paths.iter().map(|p| p.display().to_string()).collect(),
        }
    }
}

#[cfg_attr(test, automock)]
pub trait PluginNotifier {
    fn configure(&self, config: &PluginConfig);
}

/// Writes the plugin configuration as JSON to a file the plugin watches
pub struct FilePluginNotifier {
    path: PathBuf,
}

impl FilePluginNotifier {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl PluginNotifier for FilePluginNotifier {
    fn configure(&self, config: &PluginConfig) {
        let text = match serde_json::to_string_pretty(config) {
            Ok(text) => text,
            Err(e) => {
                warn!("Failed to serialize plugin config: {}", e);
                return;
            }
        };
        if let Some(parent) = self.path.parent()
            && let Err(e) = std::fs::create_dir_all(parent)
        {
            warn!("Failed to create {:?}: {}", parent, e);
            return;
        }
        match std::fs::write(&self.path, text) {
            Ok(()) => debug!(
                "Pushed {} paths to plugin config {:?}",
                config.absolute_paths.len(),
                self.path
            ),
            Err(e) => warn!("Failed to write plugin config {:?}: {}", self.path, e),
        }
    }
}
