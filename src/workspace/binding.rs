use std::path::PathBuf;

use tracing::debug;

use crate::config::{DEFAULT_CONFIG_FILE, DEFAULT_TYPES_DIRECTORY, Settings, default_include_globs};
use crate::error::Error;
use crate::workspace::chooser::Chooser;

/// The workspace roots an operation may target
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Workspace {
    /// Every open root, in the order the caller knows them
    pub roots: Vec<PathBuf>,
    /// Root chosen up front by the caller, bypassing selection
    pub pinned: Option<PathBuf>,
}

impl Workspace {
    pub fn new(roots: Vec<PathBuf>) -> Self {
        Self {
            roots,
            pinned: None,
        }
    }

    pub fn single(root: impl Into<PathBuf>) -> Self {
        Self::new(vec![root.into()])
    }

    pub fn with_pinned(mut self, root: impl Into<PathBuf>) -> Self {
        self.pinned = Some(root.into());
        self
    }

    /// Pick the target root: pinned, the only one, or the chooser's pick among several
    ///
    /// With `ask_when_multiple` off the first root wins instead of asking.
    pub fn resolve_root(
        &self,
        chooser: &dyn Chooser,
        ask_when_multiple: bool,
    ) -> Result<PathBuf, Error> {
        if let Some(pinned) = &self.pinned {
            return Ok(pinned.clone());
        }

        match self.roots.as_slice() {
            [] => Err(Error::NoWorkspace),
            [only] => Ok(only.clone()),
            [first, ..] if !ask_when_multiple => Ok(first.clone()),
            roots => {
                let labels: Vec<String> = roots.iter().map(|r| r.display().to_string()).collect();
                let index = chooser
                    .choose("Select workspace folder", &labels)
                    .filter(|&i| i < roots.len())
                    .ok_or(Error::SelectionCancelled)?;
                debug!("Selected workspace root {:?}", roots[index]);
                Ok(roots[index].clone())
            }
        }
    }
}

/// Where the synced directory and the project config live inside a workspace root
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkspaceLayout {
    pub types_directory: String,
    pub config_file: String,
    pub include_globs: Vec<String>,
}

impl WorkspaceLayout {
    pub fn bind(&self, root: PathBuf) -> WorkspaceBinding {
        WorkspaceBinding {
            synced_dir: root.join(&self.types_directory),
            config_path: root.join(&self.config_file),
            root,
        }
    }
}

impl Default for WorkspaceLayout {
    fn default() -> Self {
        Self {
            types_directory: DEFAULT_TYPES_DIRECTORY.to_string(),
            config_file: DEFAULT_CONFIG_FILE.to_string(),
            include_globs: default_include_globs(),
        }
    }
}

impl From<&Settings> for WorkspaceLayout {
    fn from(settings: &Settings) -> Self {
        Self {
            types_directory: settings.types_directory.clone(),
            config_file: settings.project_config_file.clone(),
            include_globs: settings.include_globs.clone(),
        }
    }
}

/// One resolved workspace root with its derived paths; recomputed per operation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkspaceBinding {
    pub root: PathBuf,
    pub synced_dir: PathBuf,
    pub config_path: PathBuf,
}
