use std::path::{Path, PathBuf};

use tempfile::TempDir;
use tracing::{debug, info, warn};

use crate::catalog::version::{Version, compare_names};
use crate::error::Error;

/// Prefix of in-progress entries; never listed as versions
const STAGING_PREFIX: &str = ".staging-";

/// Suffix every declaration file carries
pub const DECLARATION_SUFFIX: &str = ".d.ts";

pub fn is_declaration_file(file_name: &str) -> bool {
    file_name.len() > DECLARATION_SUFFIX.len() && file_name.ends_with(DECLARATION_SUFFIX)
}

/// Global, directory-per-version cache of declaration sets
#[derive(Debug, Clone)]
pub struct VersionCatalog {
    root: PathBuf,
}

impl VersionCatalog {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Ensure a directory for `name` exists; existing content is left alone
    pub fn create(&self, name: &str) -> Result<Version, Error> {
        validate_name(name)?;
        let location = self.root.join(name);
        std::fs::create_dir_all(&location).map_err(Error::storage(&location))?;
        debug!("Catalog entry {} at {:?}", name, location);
        Ok(Version::new(name, location))
    }

    /// Temporary directory inside the catalog root to fill before [`Self::commit`]
    ///
    /// Dropping the result without committing removes it.
    pub fn stage(&self, name: &str) -> Result<StagedVersion, Error> {
        validate_name(name)?;
        std::fs::create_dir_all(&self.root).map_err(Error::storage(&self.root))?;
        let dir = tempfile::Builder::new()
            .prefix(STAGING_PREFIX)
            .tempdir_in(&self.root)
            .map_err(Error::storage(&self.root))?;
        debug!("Staging catalog entry {} in {:?}", name, dir.path());
        Ok(StagedVersion {
            name: name.to_string(),
            dir,
        })
    }

    /// Move `staged` into place, replacing any existing entry of the same name
    pub fn commit(&self, staged: StagedVersion) -> Result<Version, Error> {
        let location = self.root.join(&staged.name);
        match std::fs::remove_dir_all(&location) {
            Ok(()) => debug!("Replacing catalog entry {}", staged.name),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => return Err(Error::storage(&location)(e)),
        }

        let path = staged.dir.keep();
        if let Err(e) = std::fs::rename(&path, &location) {
            if let Err(cleanup) = std::fs::remove_dir_all(&path) {
                warn!("Failed to clean up staged entry {:?}: {}", path, cleanup);
            }
            return Err(Error::storage(&location)(e));
        }
        Ok(Version::new(staged.name, location))
    }

    /// Immediate subdirectories of the catalog root, in filesystem order
    pub fn list(&self) -> Result<Vec<Version>, Error> {
        let entries = match std::fs::read_dir(&self.root) {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(Error::storage(&self.root)(e)),
        };

        let mut versions = Vec::new();
        for entry in entries {
            let entry = entry.map_err(Error::storage(&self.root))?;
            let path = entry.path();
            if !path.is_dir() {
                continue;
            }
            match entry.file_name().into_string() {
                Ok(name) if name.starts_with(STAGING_PREFIX) => {}
                Ok(name) => versions.push(Version::new(name, path)),
                Err(name) => warn!("Skipping non UTF-8 catalog entry {:?}", name),
            }
        }
        Ok(versions)
    }

    /// [`Self::list`] ordered newest semver first
    pub fn list_sorted(&self) -> Result<Vec<Version>, Error> {
        let mut versions = self.list()?;
        versions.sort_by(|a, b| compare_names(&a.name, &b.name));
        Ok(versions)
    }

    pub fn get(&self, name: &str) -> Result<Option<Version>, Error> {
        Ok(self.list()?.into_iter().find(|v| v.name == name))
    }

    /// Remove the version called `name`; `false` if there is no such version
    pub fn delete(&self, name: &str) -> Result<bool, Error> {
        match self.get(name)? {
            Some(version) => self.delete_version(&version),
            None => Ok(false),
        }
    }

    /// Remove `version`'s directory recursively; `false` if it is already gone
    pub fn delete_version(&self, version: &Version) -> Result<bool, Error> {
        match std::fs::remove_dir_all(&version.location) {
            Ok(()) => {
                info!("Deleted version {} at {:?}", version.name, version.location);
                Ok(true)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(Error::storage(&version.location)(e)),
        }
    }

    /// True iff `location` directly contains at least one declaration file
    pub fn is_structurally_valid(location: &Path) -> bool {
        Self::declaration_files(location).is_ok_and(|files| !files.is_empty())
    }

    /// Absolute paths of the declaration files directly inside `location`, sorted
    pub fn declaration_files(location: &Path) -> Result<Vec<PathBuf>, Error> {
        let entries = std::fs::read_dir(location).map_err(Error::storage(location))?;
        let mut files = Vec::new();
        for entry in entries {
            let entry = entry.map_err(Error::storage(location))?;
            let path = entry.path();
            let is_declaration = entry
                .file_name()
                .to_str()
                .is_some_and(is_declaration_file);
            if is_declaration && path.is_file() {
                files.push(std::path::absolute(&path).unwrap_or(path));
            }
        }
        files.sort();
        Ok(files)
    }
}

/// A catalog entry being assembled
#[derive(Debug)]
pub struct StagedVersion {
    name: String,
    dir: TempDir,
}

impl StagedVersion {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }
}

/// Catalog keys become directory names, so they must be a single plain path component
fn validate_name(name: &str) -> Result<(), Error> {
    let plain = !name.trim().is_empty()
        && name != "."
        && name != ".."
        && !name.contains(['/', '\\'])
        && !name.contains('\0');
    if plain {
        Ok(())
    } else {
        Err(Error::InvalidVersionName(name.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use tempfile::TempDir;

    fn catalog() -> (TempDir, VersionCatalog) {
        let temp_dir = TempDir::new().unwrap();
        let catalog = VersionCatalog::new(temp_dir.path().join("versions"));
        (temp_dir, catalog)
    }

    #[test]
    fn create_twice_keeps_single_entry_and_files() {
        let (_temp_dir, catalog) = catalog();

        let version = catalog.create("v1").unwrap();
        std::fs::write(version.location.join("Graphics.d.ts"), "declare const g: 1;").unwrap();
        catalog.create("v1").unwrap();

        let versions = catalog.list().unwrap();
        assert_eq!(versions.len(), 1);
        assert_eq!(versions[0].name, "v1");
        assert!(version.location.join("Graphics.d.ts").exists());
    }

    #[test]
    fn list_ignores_plain_files_in_root() {
        let (_temp_dir, catalog) = catalog();
        catalog.create("1.0.0").unwrap();
        std::fs::write(catalog.root().join("stray.txt"), "").unwrap();

        let names: Vec<String> = catalog.list().unwrap().into_iter().map(|v| v.name).collect();

        assert_eq!(names, vec!["1.0.0".to_string()]);
    }

    #[test]
    fn staged_entry_is_hidden_until_committed() {
        let (_temp_dir, catalog) = catalog();
        let staged = catalog.stage("1.0.0").unwrap();
        std::fs::write(staged.path().join("Player.d.ts"), "").unwrap();

        assert!(catalog.list().unwrap().is_empty());

        let version = catalog.commit(staged).unwrap();

        assert_eq!(catalog.list().unwrap(), vec![version.clone()]);
        assert!(version.location.join("Player.d.ts").exists());
    }

    #[test]
    fn commit_replaces_existing_entry_contents() {
        let (_temp_dir, catalog) = catalog();
        let old = catalog.create("latest").unwrap();
        std::fs::write(old.location.join("Removed.d.ts"), "").unwrap();
        let staged = catalog.stage("latest").unwrap();
        std::fs::write(staged.path().join("Player.d.ts"), "").unwrap();

        let version = catalog.commit(staged).unwrap();

        assert!(version.location.join("Player.d.ts").exists());
        assert!(!version.location.join("Removed.d.ts").exists());
        assert_eq!(catalog.list().unwrap().len(), 1);
    }

    #[test]
    fn dropped_stage_leaves_nothing_behind() {
        let (_temp_dir, catalog) = catalog();

        let path = {
            let staged = catalog.stage("1.0.0").unwrap();
            staged.path().to_path_buf()
        };

        assert!(!path.exists());
        assert!(catalog.list().unwrap().is_empty());
    }

    #[test]
    fn stage_rejects_invalid_name() {
        let (_temp_dir, catalog) = catalog();

        assert!(matches!(
            catalog.stage("../escape"),
            Err(Error::InvalidVersionName(_))
        ));
    }

    #[test]
    fn list_returns_empty_when_root_is_missing() {
        let (_temp_dir, catalog) = catalog();

        assert!(catalog.list().unwrap().is_empty());
    }

    #[test]
    fn list_sorted_orders_newest_first() {
        let (_temp_dir, catalog) = catalog();
        for name in ["1.0.0", "latest", "1.1.0"] {
            catalog.create(name).unwrap();
        }

        let names: Vec<String> = catalog
            .list_sorted()
            .unwrap()
            .into_iter()
            .map(|v| v.name)
            .collect();

        assert_eq!(names, vec!["1.1.0", "1.0.0", "latest"]);
    }

    #[test]
    fn get_matches_exact_name_only() {
        let (_temp_dir, catalog) = catalog();
        catalog.create("1.1.0").unwrap();

        assert!(catalog.get("1.1.0").unwrap().is_some());
        assert!(catalog.get("1.1").unwrap().is_none());
    }

    #[test]
    fn delete_missing_returns_false() {
        let (_temp_dir, catalog) = catalog();

        assert!(!catalog.delete("missing").unwrap());
    }

    #[test]
    fn delete_removes_directory_recursively() {
        let (_temp_dir, catalog) = catalog();
        let version = catalog.create("1.0.0").unwrap();
        std::fs::create_dir(version.location.join("nested")).unwrap();
        std::fs::write(version.location.join("nested").join("a.d.ts"), "").unwrap();

        assert!(catalog.delete("1.0.0").unwrap());
        assert!(!version.location.exists());
        assert!(!catalog.delete_version(&version).unwrap());
    }

    #[test]
    fn is_structurally_valid_requires_direct_declaration_file() {
        let (_temp_dir, catalog) = catalog();
        let version = catalog.create("1.0.0").unwrap();
        assert!(!VersionCatalog::is_structurally_valid(&version.location));

        std::fs::write(version.location.join("README.md"), "").unwrap();
        std::fs::create_dir(version.location.join("headers")).unwrap();
        std::fs::write(version.location.join("headers").join("a.d.ts"), "").unwrap();
        assert!(!VersionCatalog::is_structurally_valid(&version.location));

        std::fs::write(version.location.join("Player.d.ts"), "").unwrap();
        assert!(VersionCatalog::is_structurally_valid(&version.location));
    }

    #[test]
    fn is_structurally_valid_is_false_for_missing_directory() {
        let (temp_dir, _catalog) = catalog();

        assert!(!VersionCatalog::is_structurally_valid(&temp_dir.path().join("nope")));
    }

    #[test]
    fn declaration_files_returns_sorted_absolute_paths() {
        let (_temp_dir, catalog) = catalog();
        let version = catalog.create("1.0.0").unwrap();
        for name in ["b.d.ts", "a.d.ts", "c.ts"] {
            std::fs::write(version.location.join(name), "").unwrap();
        }

        let files = VersionCatalog::declaration_files(&version.location).unwrap();

        assert_eq!(
            files,
            vec![version.location.join("a.d.ts"), version.location.join("b.d.ts")]
        );
        assert!(files.iter().all(|f| f.is_absolute()));
    }

    #[rstest]
    #[case("1.0.0", true)]
    #[case("latest", true)]
    #[case("", false)]
    #[case("..", false)]
    #[case("a/b", false)]
    #[case("a\\b", false)]
    fn create_validates_names(#[case] name: &str, #[case] valid: bool) {
        let (_temp_dir, catalog) = catalog();

        let result = catalog.create(name);

        assert_eq!(result.is_ok(), valid);
        if !valid {
            assert!(matches!(result, Err(Error::InvalidVersionName(_))));
        }
    }

    #[rstest]
    #[case("Player.d.ts", true)]
    #[case(".d.ts", false)]
    #[case("index.ts", false)]
    #[case("types.d.ts.bak", false)]
    fn is_declaration_file_returns_expected(#[case] name: &str, #[case] expected: bool) {
        assert_eq!(is_declaration_file(name), expected);
    }
}
