use regex::Regex;
use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::error::{Error, ReleaseError};
use crate::jsonc;

// =============================================================================
// Defaults
// =============================================================================

/// Repository whose releases carry the declaration archives
pub const DEFAULT_REPO_URL: &str = "https://github.com/JsMacros/JsMacros";

/// Release assets whose name matches this are declaration archives
pub const DEFAULT_ASSET_PATTERN: &str = "^typescript";

/// Workspace-local directory the active version is copied into
pub const DEFAULT_TYPES_DIRECTORY: &str = ".jsm_types";

/// Project config file kept in sync, relative to the workspace root
pub const DEFAULT_CONFIG_FILE: &str = "tsconfig.json";

/// Catalog name the newest release is stored under
pub const LATEST_VERSION_NAME: &str = "latest";

pub fn default_include_globs() -> Vec<String> {
    vec![
        format!("{DEFAULT_TYPES_DIRECTORY}/**/*.d.ts"),
        "**/*.ts".to_string(),
        "**/*.js".to_string(),
    ]
}

/// User settings, read from `config.json` in the data directory
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct Settings {
    pub repo_url: String,
    pub asset_reg_exp: String,
    /// Ask which root to use when several are open; otherwise take the first
    pub ask_when_multiple_workspaces: bool,
    /// Push absolute declaration paths to the language-service plugin
    pub experimental_hinting: bool,
    pub types_directory: String,
    pub project_config_file: String,
    pub include_globs: Vec<String>,
    /// Where the plugin push writes its configuration
    pub plugin_config_path: Option<PathBuf>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            repo_url: DEFAULT_REPO_URL.to_string(),
            asset_reg_exp: DEFAULT_ASSET_PATTERN.to_string(),
            ask_when_multiple_workspaces: true,
            experimental_hinting: false,
            types_directory: DEFAULT_TYPES_DIRECTORY.to_string(),
            project_config_file: DEFAULT_CONFIG_FILE.to_string(),
            include_globs: default_include_globs(),
            plugin_config_path: None,
        }
    }
}

impl Settings {
    /// Load settings from a JSONC file; a missing file yields the defaults
    pub fn load(path: &Path) -> Result<Self, Error> {
        let text = match std::fs::read_to_string(path) {
            Ok(text) => text,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Self::default()),
            Err(e) => return Err(Error::storage(path)(e)),
        };
        Self::from_jsonc(&text).map_err(|e| e.at_path(path))
    }

    pub fn from_jsonc(text: &str) -> Result<Self, Error> {
        match jsonc::parse_value(text)? {
            None => Ok(Self::default()),
            Some(value) => serde_json::from_value(value).map_err(|e| Error::malformed(e.to_string())),
        }
    }

    /// `(owner, repo)` parsed from `repo_url`
    pub fn repository(&self) -> Result<(String, String), ReleaseError> {
        let pattern = Regex::new(r"^https://github\.com/([\w.-]+)/([\w.-]+)$")?;
        let captures = pattern
            .captures(self.repo_url.trim_end_matches('/'))
            .ok_or_else(|| ReleaseError::InvalidRepositoryUrl(self.repo_url.clone()))?;
        Ok((captures[1].to_string(), captures[2].to_string()))
    }

    pub fn asset_pattern(&self) -> Result<Regex, ReleaseError> {
        Ok(Regex::new(&self.asset_reg_exp)?)
    }
}

/// Returns the path to the data directory for decl-sync.
/// Uses $XDG_DATA_HOME/decl-sync if XDG_DATA_HOME is set,
/// otherwise falls back to ~/.local/share/decl-sync,
/// or ./decl-sync if neither is available.
pub fn data_dir() -> PathBuf {
    data_dir_with_env(std::env::var("XDG_DATA_HOME").ok(), dirs::home_dir())
}

/// Returns the path to the version catalog root.
pub fn catalog_dir() -> PathBuf {
    data_dir().join("versions")
}

/// Returns the path to the settings file.
pub fn settings_path() -> PathBuf {
    data_dir().join("config.json")
}

/// Returns the path to the log file.
pub fn log_path() -> PathBuf {
    data_dir().join("decl-sync.log")
}

fn data_dir_with_env(xdg_data_home: Option<String>, home_dir: Option<PathBuf>) -> PathBuf {
    let data_dir = xdg_data_home
        .map(PathBuf::from)
        .or_else(|| home_dir.map(|home| home.join(".local/share")))
        .unwrap_or_else(|| PathBuf::from("."));

    data_dir.join("decl-sync")
}
