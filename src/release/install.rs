//! Install pipeline: pick release → stage catalog entry → download → extract → validate → commit
//!
//! Nothing is visible in the catalog until the staged entry validates, so a
//! failed install never leaves a partial or stale version behind.

use regex::Regex;
use tracing::{info, warn};

use crate::catalog::{Version, VersionCatalog};
use crate::config::LATEST_VERSION_NAME;
use crate::error::{Error, ReleaseError};
use crate::release::archive::extract_declarations;
use crate::release::source::{Asset, Release, ReleaseSource, matching_assets};
use crate::workspace::Chooser;

/// Which release to install
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReleaseSelector {
    /// Newest release, stored as [`LATEST_VERSION_NAME`]
    Latest,
    /// Release whose title or tag equals the name
    Named(String),
    /// Ask the chooser among all releases
    Choose,
}

pub struct ReleaseInstaller<'a> {
    source: &'a dyn ReleaseSource,
    catalog: &'a VersionCatalog,
    asset_pattern: Regex,
    chooser: &'a dyn Chooser,
}

impl<'a> ReleaseInstaller<'a> {
    pub fn new(
        source: &'a dyn ReleaseSource,
        catalog: &'a VersionCatalog,
        asset_pattern: Regex,
        chooser: &'a dyn Chooser,
    ) -> Self {
        Self {
            source,
            catalog,
            asset_pattern,
            chooser,
        }
    }

    /// Resolve `selector` to a release and the catalog name it is stored under
    pub async fn resolve(&self, selector: &ReleaseSelector) -> Result<(Release, String), ReleaseError> {
        match selector {
            ReleaseSelector::Latest => {
                let release = self.source.latest_release().await?;
                Ok((release, LATEST_VERSION_NAME.to_string()))
            }
            ReleaseSelector::Named(name) => {
                let release = self
                    .source
                    .list_releases()
                    .await?
                    .into_iter()
                    .find(|r| r.display_name() == name || &r.tag_name == name)
                    .ok_or_else(|| ReleaseError::NotFound(name.clone()))?;
                let catalog_name = release.display_name().to_string();
                Ok((release, catalog_name))
            }
            ReleaseSelector::Choose => {
                let mut releases = self.source.list_releases().await?;
                let labels: Vec<String> = releases.iter().map(Release::label).collect();
                let index = self
                    .chooser
                    .choose("Select release", &labels)
                    .ok_or(Error::SelectionCancelled)?;
                let release = releases.swap_remove(index);
                let catalog_name = release.display_name().to_string();
                Ok((release, catalog_name))
            }
        }
    }

    /// Resolve `selector` and install the release into the catalog
    pub async fn install(&self, selector: &ReleaseSelector) -> Result<Version, ReleaseError> {
        let (release, name) = self.resolve(selector).await?;
        self.install_release(&release, &name).await
    }

    /// Download `release`'s declaration archive and extract it into catalog entry `name`
    pub async fn install_release(
        &self,
        release: &Release,
        name: &str,
    ) -> Result<Version, ReleaseError> {
        let asset = self.pick_asset(release)?.clone();
        let staged = self.catalog.stage(name)?;

        let bytes = self.source.download(&asset).await?;
        let written = extract_declarations(&bytes, staged.path())?;

        if !VersionCatalog::is_structurally_valid(staged.path()) {
            warn!(
                "Release {} produced no declaration files; discarding it",
                release.display_name()
            );
            return Err(Error::InvalidVersion {
                name: name.to_string(),
                location: self.catalog.root().join(name),
            }
            .into());
        }

        let version = self.catalog.commit(staged)?;
        info!(
            "Installed {} ({} files) from {} as {}",
            release.display_name(),
            written.len(),
            asset.name,
            version.name
        );
        Ok(version)
    }

    fn pick_asset<'r>(&self, release: &'r Release) -> Result<&'r Asset, ReleaseError> {
        let candidates = matching_assets(release, &self.asset_pattern);
        match candidates.as_slice() {
            [] => Err(ReleaseError::NoMatchingAsset {
                release: release.display_name().to_string(),
                pattern: self.asset_pattern.to_string(),
            }),
            [only] => Ok(*only),
            _ => {
                let labels: Vec<String> = candidates.iter().map(|a| a.name.clone()).collect();
                let index = self
                    .chooser
                    .choose("Select asset", &labels)
                    .ok_or(Error::SelectionCancelled)?;
                Ok(candidates[index])
            }
        }
    }
}
