//! Replacement of the workspace-local synced directory
//!
//! The new content (files plus marker) is assembled in a temporary sibling
//! directory, then swapped in: the old directory is removed and the staged one
//! renamed into place. A crash between the removal and the rename leaves the
//! workspace without a synced directory, and therefore without a marker; the
//! old directory is never touched before the staged copy is complete.

use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::error::Error;
use crate::workspace::marker::ActiveVersionMarker;

const STAGING_PREFIX: &str = ".decl-sync-staging-";

/// Replace `target` with a copy of `source` plus `marker`; returns the number of files copied
pub fn replace_directory(
    source: &Path,
    target: &Path,
    marker: &ActiveVersionMarker,
) -> Result<usize, Error> {
    let parent = target
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or(Path::new("."));
    let staging = tempfile::Builder::new()
        .prefix(STAGING_PREFIX)
        .tempdir_in(parent)
        .map_err(Error::storage(parent))?;

    let copied = copy_tree(source, staging.path())?;
    marker.write(staging.path())?;
    debug!("Staged {} files from {:?} in {:?}", copied, source, staging.path());

    remove_directory(target)?;

    let staged: PathBuf = staging.keep();
    if let Err(e) = std::fs::rename(&staged, target) {
        if let Err(cleanup) = std::fs::remove_dir_all(&staged) {
            warn!("Failed to clean up staging directory {:?}: {}", staged, cleanup);
        }
        return Err(Error::storage(target)(e));
    }

    Ok(copied)
}

/// Remove `dir` recursively; `false` if it did not exist
pub fn remove_directory(dir: &Path) -> Result<bool, Error> {
    match std::fs::remove_dir_all(dir) {
        Ok(()) => Ok(true),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
        Err(e) => Err(Error::storage(dir)(e)),
    }
}

fn copy_tree(source: &Path, target: &Path) -> Result<usize, Error> {
    let mut copied = 0;
    for entry in std::fs::read_dir(source).map_err(Error::storage(source))? {
        let entry = entry.map_err(Error::storage(source))?;
        let from = entry.path();
        let to = target.join(entry.file_name());
        if from.is_dir() {
            std::fs::create_dir(&to).map_err(Error::storage(&to))?;
            copied += copy_tree(&from, &to)?;
        } else {
            std::fs::copy(&from, &to).map_err(Error::storage(&to))?;
            copied += 1;
        }
    }
    Ok(copied)
}
