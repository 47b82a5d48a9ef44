//! Extraction of declaration files from a release archive

use std::io::Cursor;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use regex::Regex;
use tracing::{debug, trace};

use crate::error::{Error, ReleaseError};

/// Declaration files live flat under `headers/` in the archive
static HEADER_ENTRY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^headers/([^/]+?\.d\.ts)$").expect("header entry pattern is valid")
});

/// Extract every `headers/*.d.ts` entry of the zip in `bytes` into `target`
///
/// Entries are flattened to their file name. Existing files are overwritten.
/// Returns the written paths in archive order.
pub fn extract_declarations(bytes: &[u8], target: &Path) -> Result<Vec<PathBuf>, ReleaseError> {
    let mut archive = zip::ZipArchive::new(Cursor::new(bytes))?;
    std::fs::create_dir_all(target).map_err(Error::storage(target))?;

    let mut written = Vec::new();
    for index in 0..archive.len() {
        let mut entry = archive.by_index(index)?;
        if !entry.is_file() {
            continue;
        }

        let entry_name = entry.name().to_string();
        let Some(file_name) = HEADER_ENTRY
            .captures(&entry_name)
            .and_then(|captures| captures.get(1))
            .map(|m| m.as_str().to_string())
        else {
            trace!("Skipping archive entry {}", entry_name);
            continue;
        };

        let path = target.join(&file_name);
        let mut file = std::fs::File::create(&path).map_err(Error::storage(&path))?;
        std::io::copy(&mut entry, &mut file).map_err(Error::storage(&path))?;
        written.push(path);
    }

    debug!(
        "Extracted {} declaration files into {:?}",
        written.len(),
        target
    );
    Ok(written)
}
