use std::path::{Path, PathBuf};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Storage error at {}: {source}", path.display())]
    Storage {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Version {name} at {} contains no declaration files", location.display())]
    InvalidVersion { name: String, location: PathBuf },

    #[error("Invalid version name: {0:?}")]
    InvalidVersionName(String),

    #[error("No workspace folder is open")]
    NoWorkspace,

    #[error("No version is active for this workspace")]
    NoActiveVersion,

    #[error("Malformed document{}: {reason}", path.as_ref().map(|p| format!(" {}", p.display())).unwrap_or_default())]
    MalformedDocument {
        path: Option<PathBuf>,
        reason: String,
    },

    #[error("Selection cancelled")]
    SelectionCancelled,
}

impl Error {
    /// Build a closure mapping an io error at `path` into [`Error::Storage`]
    pub fn storage(path: &Path) -> impl FnOnce(std::io::Error) -> Error + '_ {
        move |source| Error::Storage {
            path: path.to_path_buf(),
            source,
        }
    }

    pub fn malformed(reason: impl Into<String>) -> Self {
        Error::MalformedDocument {
            path: None,
            reason: reason.into(),
        }
    }

    /// Attach the document path to a malformed-document error
    pub fn at_path(self, path: &Path) -> Self {
        match self {
            Error::MalformedDocument { reason, .. } => Error::MalformedDocument {
                path: Some(path.to_path_buf()),
                reason,
            },
            other => other,
        }
    }
}

#[derive(Debug, Error)]
pub enum ReleaseError {
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Rate limited: retry after {retry_after_secs:?} seconds")]
    RateLimited { retry_after_secs: Option<u64> },

    #[error("Release not found: {0}")]
    NotFound(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("No asset of release {release} matches {pattern}")]
    NoMatchingAsset { release: String, pattern: String },

    #[error("Archive error: {0}")]
    Archive(#[from] zip::result::ZipError),

    #[error("Repository URL doesn't match https://github.com/<owner>/<repo>: {0}")]
    InvalidRepositoryUrl(String),

    #[error("Invalid asset pattern: {0}")]
    InvalidAssetPattern(#[from] regex::Error),

    #[error(transparent)]
    Core(#[from] Error),
}
