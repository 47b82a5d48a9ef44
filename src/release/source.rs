//! Release source trait and the release/asset model

#[cfg(test)]
use mockall::automock;
use regex::Regex;
use serde::Deserialize;

use crate::error::ReleaseError;

/// A published release as listed by the hosting API
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct Release {
    pub id: u64,
    #[serde(default)]
    pub name: Option<String>,
    pub tag_name: String,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub assets: Vec<Asset>,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct Asset {
    pub name: String,
    pub browser_download_url: String,
}

impl Release {
    /// Release title, falling back to the tag when the title is empty
    pub fn display_name(&self) -> &str {
        self.name
            .as_deref()
            .filter(|name| !name.trim().is_empty())
            .unwrap_or(&self.tag_name)
    }

    /// Creation date as `YYYY-MM-DD`
    pub fn created_date(&self) -> Option<String> {
        let created_at = self.created_at.as_deref()?;
        chrono::DateTime::parse_from_rfc3339(created_at)
            .ok()
            .map(|date| date.format("%Y-%m-%d").to_string())
    }

    /// Label shown when choosing among releases
    pub fn label(&self) -> String {
        match self.created_date() {
            Some(date) => format!("{} ({date})", self.display_name()),
            None => self.display_name().to_string(),
        }
    }
}

/// Assets of `release` whose name matches `pattern`
pub fn matching_assets<'a>(release: &'a Release, pattern: &Regex) -> Vec<&'a Asset> {
    release
        .assets
        .iter()
        .filter(|asset| pattern.is_match(&asset.name))
        .collect()
}

/// Trait for discovering and downloading declaration releases
#[cfg_attr(test, automock)]
#[async_trait::async_trait]
pub trait ReleaseSource: Send + Sync {
    /// All releases, newest first
    async fn list_releases(&self) -> Result<Vec<Release>, ReleaseError>;

    /// The most recent non-draft, non-prerelease release
    async fn latest_release(&self) -> Result<Release, ReleaseError>;

    /// Raw bytes of `asset`
    async fn download(&self, asset: &Asset) -> Result<Vec<u8>, ReleaseError>;
}
