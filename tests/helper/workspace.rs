//! Workspace test utilities

use std::cell::RefCell;
use std::path::{Path, PathBuf};

use serde_json::Value;
use tempfile::TempDir;

use decl_sync::catalog::{Version, VersionCatalog};
use decl_sync::jsonc::{JsoncDocument, key_path};
use decl_sync::workspace::{Chooser, Workspace, WorkspaceActivationController, WorkspaceLayout};

/// Chooser that always gives the same answer and records what it was offered
pub struct ScriptedChooser {
    answer: Option<usize>,
    offered: RefCell<Vec<Vec<String>>>,
}

impl ScriptedChooser {
    pub fn answering(answer: Option<usize>) -> Self {
        Self {
            answer,
            offered: RefCell::new(Vec::new()),
        }
    }

    /// A chooser for tests that must never prompt
    pub fn silent() -> Self {
        Self::answering(None)
    }

    pub fn offered(&self) -> Vec<Vec<String>> {
        self.offered.borrow().clone()
    }
}

impl Chooser for ScriptedChooser {
    fn choose(&self, _prompt: &str, candidates: &[String]) -> Option<usize> {
        self.offered.borrow_mut().push(candidates.to_vec());
        self.answer
    }
}

/// A temporary workspace root next to a temporary catalog
pub struct TestWorkspace {
    temp_dir: TempDir,
    pub root: PathBuf,
    pub catalog: VersionCatalog,
}

impl TestWorkspace {
    pub fn new() -> Self {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path().join("ws");
        std::fs::create_dir_all(&root).unwrap();
        let catalog = VersionCatalog::new(temp_dir.path().join("versions"));
        Self {
            temp_dir,
            root,
            catalog,
        }
    }

    /// Create another workspace root beside the default one
    pub fn add_root(&self, name: &str) -> PathBuf {
        let root = self.temp_dir.path().join(name);
        std::fs::create_dir_all(&root).unwrap();
        root
    }

    /// Create a catalog version holding `files`
    pub fn version(&self, name: &str, files: &[&str]) -> Version {
        let version = self.catalog.create(name).unwrap();
        for file in files {
            std::fs::write(
                version.location.join(file),
                format!("declare const {}: string;", file.trim_end_matches(".d.ts")),
            )
            .unwrap();
        }
        version
    }

    pub fn workspace(&self) -> Workspace {
        Workspace::single(&self.root)
    }

    pub fn controller(
        &self,
        chooser: ScriptedChooser,
    ) -> WorkspaceActivationController<ScriptedChooser> {
        WorkspaceActivationController::new(self.catalog.clone(), WorkspaceLayout::default(), chooser)
    }

    pub fn synced_dir(&self) -> PathBuf {
        synced_dir(&self.root)
    }

    pub fn config_path(&self) -> PathBuf {
        self.root.join("tsconfig.json")
    }

    pub fn write_config(&self, text: &str) {
        std::fs::write(self.config_path(), text).unwrap();
    }

    pub fn read_config(&self) -> String {
        std::fs::read_to_string(self.config_path()).unwrap()
    }
}

pub fn synced_dir(root: &Path) -> PathBuf {
    root.join(".jsm_types")
}

/// Value at `path` in a JSONC document
pub fn value_at(text: &str, path: &[&str]) -> Option<Value> {
    JsoncDocument::parse(text)
        .unwrap()
        .value_at(&key_path(path))
        .unwrap()
}
