//! Record of the version active in a workspace, stored inside the synced directory

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::Error;
use crate::project::IncludeChange;

/// Marker file name inside the synced directory
pub const MARKER_FILE: &str = ".decl-sync.json";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActiveVersionMarker {
    /// Catalog name of the active version
    pub name: String,
    /// Include globs that activation appended to the project config
    #[serde(default)]
    pub added_includes: Vec<String>,
    /// Activation created `include`, so restoring may drop the key
    #[serde(default)]
    pub created_include: bool,
}

impl ActiveVersionMarker {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            added_includes: Vec::new(),
            created_include: false,
        }
    }

    pub fn path_in(dir: &Path) -> PathBuf {
        dir.join(MARKER_FILE)
    }

    /// Read the marker from `dir`; absent or unreadable markers read as `None`
    pub fn read(dir: &Path) -> Option<Self> {
        let path = Self::path_in(dir);
        let text = std::fs::read_to_string(&path).ok()?;
        match serde_json::from_str(&text) {
            Ok(marker) => Some(marker),
            Err(e) => {
                warn!("Ignoring unreadable marker {:?}: {}", path, e);
                None
            }
        }
    }

    pub fn write(&self, dir: &Path) -> Result<(), Error> {
        let path = Self::path_in(dir);
        let text = serde_json::to_string_pretty(self)
            .map_err(|e| Error::storage(&path)(std::io::Error::other(e)))?;
        std::fs::write(&path, text).map_err(Error::storage(&path))
    }

    /// Remove the marker from `dir`; `false` if there was none
    pub fn clear(dir: &Path) -> Result<bool, Error> {
        let path = Self::path_in(dir);
        match std::fs::remove_file(&path) {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(Error::storage(&path)(e)),
        }
    }

    /// Fold a config change into what this marker remembers
    pub fn record(&mut self, change: IncludeChange) {
        let mut merged = self.include_change();
        merged.merge(change);
        self.added_includes = merged.added;
        self.created_include = merged.created;
    }

    /// Everything activation did to `include`, for undoing it
    pub fn include_change(&self) -> IncludeChange {
        IncludeChange {
            added: self.added_includes.clone(),
            created: self.created_include,
        }
    }
}
