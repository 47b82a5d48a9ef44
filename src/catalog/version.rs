use std::cmp::Ordering;
use std::path::PathBuf;

/// A named set of declaration files cached in the catalog
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Version {
    /// Unique catalog key (the directory name)
    pub name: String,
    /// Directory holding the declaration files
    pub location: PathBuf,
}

impl Version {
    pub fn new(name: impl Into<String>, location: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            location: location.into(),
        }
    }
}

fn parse_semver(name: &str) -> Option<semver::Version> {
    semver::Version::parse(name.strip_prefix('v').unwrap_or(name)).ok()
}

/// Order for display: semver names newest first, then everything else by name
pub fn compare_names(a: &str, b: &str) -> Ordering {
    match (parse_semver(a), parse_semver(b)) {
        (Some(a), Some(b)) => b.cmp(&a),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => a.cmp(b),
    }
}
