//! GitHub Releases API release source

use tracing::{debug, warn};

use crate::error::ReleaseError;
use crate::release::source::{Asset, Release, ReleaseSource};

/// Default base URL for GitHub API
const DEFAULT_BASE_URL: &str = "https://api.github.com";

/// Releases requested per listing call
const PER_PAGE: u32 = 100;

pub struct GitHubReleases {
    client: reqwest::Client,
    base_url: String,
    owner: String,
    repo: String,
}

impl GitHubReleases {
    /// Creates a release source for `owner/repo` against a custom base URL
    pub fn new(base_url: &str, owner: &str, repo: &str) -> Result<Self, ReleaseError> {
        Ok(Self {
            client: reqwest::Client::builder().user_agent("decl-sync").build()?,
            base_url: base_url.trim_end_matches('/').to_string(),
            owner: owner.to_string(),
            repo: repo.to_string(),
        })
    }

    /// Creates a release source for `owner/repo` on github.com
    pub fn for_repository(owner: &str, repo: &str) -> Result<Self, ReleaseError> {
        Self::new(DEFAULT_BASE_URL, owner, repo)
    }

    fn repo_url(&self, path: &str) -> String {
        format!(
            "{}/repos/{}/{}/{}",
            self.base_url, self.owner, self.repo, path
        )
    }

    async fn get(&self, url: &str, what: &str) -> Result<reqwest::Response, ReleaseError> {
        let response = self
            .client
            .get(url)
            .header("Accept", "application/vnd.github+json")
            .send()
            .await?;

        let status = response.status();

        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(ReleaseError::NotFound(what.to_string()));
        }

        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            let retry_after = response
                .headers()
                .get("retry-after")
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.parse().ok());
            return Err(ReleaseError::RateLimited {
                retry_after_secs: retry_after,
            });
        }

        if !status.is_success() {
            warn!("GitHub API returned status {}: {}", status, url);
            return Err(ReleaseError::InvalidResponse(format!(
                "Unexpected status: {}",
                status
            )));
        }

        Ok(response)
    }
}

#[async_trait::async_trait]
impl ReleaseSource for GitHubReleases {
    async fn list_releases(&self) -> Result<Vec<Release>, ReleaseError> {
        let url = self.repo_url(&format!("releases?per_page={PER_PAGE}"));
        let repository = format!("{}/{}", self.owner, self.repo);

        let releases: Vec<Release> = self.get(&url, &repository).await?.json().await.map_err(|e| {
            warn!("Failed to parse GitHub releases response: {}", e);
            ReleaseError::InvalidResponse(e.to_string())
        })?;

        debug!("Listed {} releases of {}", releases.len(), repository);
        Ok(releases)
    }

    async fn latest_release(&self) -> Result<Release, ReleaseError> {
        let url = self.repo_url("releases/latest");
        let what = format!("latest release of {}/{}", self.owner, self.repo);

        self.get(&url, &what).await?.json().await.map_err(|e| {
            warn!("Failed to parse GitHub release response: {}", e);
            ReleaseError::InvalidResponse(e.to_string())
        })
    }

    async fn download(&self, asset: &Asset) -> Result<Vec<u8>, ReleaseError> {
        let response = self
            .client
            .get(&asset.browser_download_url)
            .header("Accept", "application/octet-stream")
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            warn!(
                "Download of {} returned status {}",
                asset.browser_download_url, status
            );
            return Err(ReleaseError::InvalidResponse(format!(
                "Unable to fetch {}: {}",
                asset.browser_download_url, status
            )));
        }

        let bytes = response.bytes().await?;
        debug!("Downloaded {} bytes of {}", bytes.len(), asset.name);
        Ok(bytes.to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Server;

    #[tokio::test]
    async fn list_releases_returns_releases_with_assets() {
        let mut server = Server::new_async().await;

        let mock = server
            .mock("GET", "/repos/JsMacros/JsMacros/releases?per_page=100")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                r#"[
                    {
                        "id": 2,
                        "name": "1.9.2",
                        "tag_name": "1.9.2",
                        "created_at": "2024-03-05T10:00:00Z",
                        "assets": [
                            {"name": "typescript.zip", "browser_download_url": "https://example.com/ts.zip"}
                        ]
                    },
                    {"id": 1, "name": null, "tag_name": "1.9.1", "assets": []}
                ]"#,
            )
            .create_async()
            .await;

        let source = GitHubReleases::new(&server.url(), "JsMacros", "JsMacros").unwrap();
        let releases = source.list_releases().await.unwrap();

        mock.assert_async().await;
        assert_eq!(releases.len(), 2);
        assert_eq!(releases[0].assets[0].name, "typescript.zip");
        assert_eq!(releases[1].display_name(), "1.9.1");
    }

    #[tokio::test]
    async fn latest_release_returns_not_found_for_missing_repo() {
        let mut server = Server::new_async().await;

        let mock = server
            .mock("GET", "/repos/nobody/nothing/releases/latest")
            .with_status(404)
            .with_header("content-type", "application/json")
            .with_body(r#"{"message": "Not Found"}"#)
            .create_async()
            .await;

        let source = GitHubReleases::new(&server.url(), "nobody", "nothing").unwrap();
        let result = source.latest_release().await;

        mock.assert_async().await;
        assert!(matches!(result, Err(ReleaseError::NotFound(_))));
    }

    #[tokio::test]
    async fn list_releases_returns_rate_limited_for_429() {
        let mut server = Server::new_async().await;

        let mock = server
            .mock("GET", "/repos/JsMacros/JsMacros/releases?per_page=100")
            .with_status(429)
            .with_header("retry-after", "60")
            .with_body(r#"{"message": "API rate limit exceeded"}"#)
            .create_async()
            .await;

        let source = GitHubReleases::new(&server.url(), "JsMacros", "JsMacros").unwrap();
        let result = source.list_releases().await;

        mock.assert_async().await;
        assert!(matches!(
            result,
            Err(ReleaseError::RateLimited {
                retry_after_secs: Some(60)
            })
        ));
    }

    #[tokio::test]
    async fn download_returns_asset_bytes() {
        let mut server = Server::new_async().await;

        let mock = server
            .mock("GET", "/assets/ts.zip")
            .with_status(200)
            .with_body(b"PK\x03\x04")
            .create_async()
            .await;

        let source = GitHubReleases::new(&server.url(), "JsMacros", "JsMacros").unwrap();
        let asset = Asset {
            name: "ts.zip".to_string(),
            browser_download_url: format!("{}/assets/ts.zip", server.url()),
        };
        let bytes = source.download(&asset).await.unwrap();

        mock.assert_async().await;
        assert_eq!(bytes, b"PK\x03\x04");
    }

    #[tokio::test]
    async fn download_reports_failed_status() {
        let mut server = Server::new_async().await;

        let mock = server
            .mock("GET", "/assets/gone.zip")
            .with_status(410)
            .create_async()
            .await;

        let source = GitHubReleases::new(&server.url(), "JsMacros", "JsMacros").unwrap();
        let asset = Asset {
            name: "gone.zip".to_string(),
            browser_download_url: format!("{}/assets/gone.zip", server.url()),
        };
        let result = source.download(&asset).await;

        mock.assert_async().await;
        assert!(matches!(result, Err(ReleaseError::InvalidResponse(_))));
    }
}
