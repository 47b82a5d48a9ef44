use std::path::{Path, PathBuf};

use indexmap::IndexSet;
use serde_json::Value;
use tracing::{debug, info};

use crate::error::Error;
use crate::jsonc::{self, JsonEdit, JsoncDocument, key_path};
use crate::project::options::{COMPILER_OPTIONS, OptionToggle, evaluate};

/// Content assumed when the project has no config file yet
const EMPTY_CONFIG: &str = "{}";

/// What enabling did to `include`, kept so disabling can undo exactly that
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IncludeChange {
    /// Globs that were not listed before
    pub added: Vec<String>,
    /// `include` was absent and enabling created it
    pub created: bool,
}

impl IncludeChange {
    /// Fold a later change into this one, keeping earlier globs first
    pub fn merge(&mut self, other: IncludeChange) {
        for glob in other.added {
            if !self.added.contains(&glob) {
                self.added.push(glob);
            }
        }
        self.created |= other.created;
    }
}

/// A config rewrite computed up front; nothing touches disk before [`Self::commit`]
#[derive(Debug)]
pub struct PendingConfig {
    path: PathBuf,
    original: Option<String>,
    updated: String,
    change: IncludeChange,
}

impl PendingConfig {
    pub fn change(&self) -> &IncludeChange {
        &self.change
    }

    pub fn into_change(self) -> IncludeChange {
        self.change
    }

    /// Write the rewritten config, creating the file if it was missing
    pub fn commit(&self) -> Result<(), Error> {
        match &self.original {
            Some(original) => write_if_changed(&self.path, original, &self.updated),
            None => {
                info!("Creating {:?}", self.path);
                std::fs::write(&self.path, &self.updated).map_err(Error::storage(&self.path))
            }
        }
    }
}

/// Keeps a project's type-checking config in line with the synced declarations
pub struct ProjectConfigSynchronizer {
    options: &'static [OptionToggle],
}

impl ProjectConfigSynchronizer {
    pub fn new() -> Self {
        Self {
            options: COMPILER_OPTIONS,
        }
    }

    /// Merge `globs` into `include` and apply the enabling option table
    ///
    /// A missing file is created. Returns what changed in `include`, which a
    /// later [`Self::disable`] needs to restore it.
    pub fn enable(&self, config_path: &Path, globs: &[String]) -> Result<IncludeChange, Error> {
        let pending = self.prepare_enable(config_path, globs)?;
        pending.commit()?;
        info!(
            "Enabled declarations in {:?} (added includes: {:?})",
            config_path,
            pending.change().added
        );
        Ok(pending.into_change())
    }

    /// Compute [`Self::enable`]'s rewrite without writing it
    ///
    /// Fails with [`Error::MalformedDocument`] before anything is written.
    pub fn prepare_enable(&self, config_path: &Path, globs: &[String]) -> Result<PendingConfig, Error> {
        let original = match std::fs::read_to_string(config_path) {
            Ok(text) => Some(text),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => None,
            Err(e) => return Err(Error::storage(config_path)(e)),
        };

        let (updated, change) = self
            .enable_text(original.as_deref().unwrap_or(EMPTY_CONFIG), globs)
            .map_err(|e| e.at_path(config_path))?;

        Ok(PendingConfig {
            path: config_path.to_path_buf(),
            original,
            updated,
            change,
        })
    }

    /// Undo `change` in `include` and apply the disabling option table
    ///
    /// Returns `false` without touching anything when the file doesn't exist.
    pub fn disable(&self, config_path: &Path, change: &IncludeChange) -> Result<bool, Error> {
        if !config_path.exists() {
            debug!("{:?} does not exist, nothing to disable", config_path);
            return Ok(false);
        }

        let text = std::fs::read_to_string(config_path).map_err(Error::storage(config_path))?;
        let updated = self
            .disable_text(&text, change)
            .map_err(|e| e.at_path(config_path))?;

        write_if_changed(config_path, &text, &updated)?;
        info!("Disabled declarations in {:?}", config_path);
        Ok(true)
    }

    /// Text-level counterpart of [`Self::enable`]
    pub fn enable_text(&self, text: &str, globs: &[String]) -> Result<(String, IncludeChange), Error> {
        let document = JsoncDocument::parse(text)?;
        let existed = document.find(&key_path(&["include"])).is_some();
        let current = include_list(&document)?;

        let mut merged: IndexSet<String> = current.iter().cloned().collect();
        let added: Vec<String> = globs
            .iter()
            .filter(|glob| merged.insert((*glob).clone()))
            .cloned()
            .collect();

        let mut edits = evaluate(self.options, true, &document)?;
        if merged.len() != current.len() || !added.is_empty() {
            edits.push(include_edit(merged.into_iter()));
        }

        let change = IncludeChange {
            created: !existed && !added.is_empty(),
            added,
        };
        Ok((jsonc::apply(text, &edits)?, change))
    }

    /// Text-level counterpart of [`Self::disable`]
    ///
    /// An `include` left empty is dropped only if enabling created it.
    pub fn disable_text(&self, text: &str, change: &IncludeChange) -> Result<String, Error> {
        let document = JsoncDocument::parse(text)?;
        let mut edits = evaluate(self.options, false, &document)?;

        if document.find(&key_path(&["include"])).is_some() {
            let current = include_list(&document)?;
            let remaining: Vec<String> = current
                .iter()
                .filter(|entry| !change.added.contains(entry))
                .cloned()
                .collect();

            if remaining.len() != current.len() {
                if remaining.is_empty() && change.created {
                    edits.push(JsonEdit::remove(key_path(&["include"])));
                } else {
                    edits.push(include_edit(remaining.into_iter()));
                }
            }
        }

        jsonc::apply(text, &edits)
    }
}

impl Default for ProjectConfigSynchronizer {
    fn default() -> Self {
        Self::new()
    }
}

fn include_edit(entries: impl Iterator<Item = String>) -> JsonEdit {
    JsonEdit::set(
        key_path(&["include"]),
        Value::Array(entries.map(Value::String).collect()),
    )
}

/// Current `include` entries; an absent key reads as empty
fn include_list(document: &JsoncDocument<'_>) -> Result<Vec<String>, Error> {
    match document.value_at(&key_path(&["include"]))? {
        None => Ok(Vec::new()),
        Some(Value::Array(entries)) => entries
            .into_iter()
            .map(|entry| match entry {
                Value::String(glob) => Ok(glob),
                other => Err(Error::malformed(format!(
                    "include entries must be strings, found {other}"
                ))),
            })
            .collect(),
        Some(other) => Err(Error::malformed(format!(
            "include must be an array, found {other}"
        ))),
    }
}

fn write_if_changed(path: &Path, original: &str, updated: &str) -> Result<(), Error> {
    if original == updated {
        debug!("{:?} already up to date", path);
        return Ok(());
    }
    std::fs::write(path, updated).map_err(Error::storage(path))
}
