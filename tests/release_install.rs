//! Fetching a release from a GitHub-compatible API into the catalog, then activating it

mod helper;

use std::io::{Cursor, Write};

use mockito::Server;
use regex::Regex;
use zip::write::SimpleFileOptions;

use decl_sync::catalog::VersionCatalog;
use decl_sync::config::LATEST_VERSION_NAME;
use decl_sync::error::ReleaseError;
use decl_sync::release::{GitHubReleases, ReleaseInstaller, ReleaseSelector};
use helper::{ScriptedChooser, TestWorkspace};

fn declaration_zip() -> Vec<u8> {
    let mut writer = zip::ZipWriter::new(Cursor::new(Vec::new()));
    let options = SimpleFileOptions::default();
    for (name, content) in [
        ("headers/Player.d.ts", "declare const Player: any;"),
        ("headers/World.d.ts", "declare const World: any;"),
        ("LICENSE", "MIT"),
    ] {
        writer.start_file(name, options).unwrap();
        writer.write_all(content.as_bytes()).unwrap();
    }
    writer.finish().unwrap().into_inner()
}

fn release_json(server_url: &str, name: &str) -> String {
    format!(
        r#"{{
            "id": 7,
            "name": "{name}",
            "tag_name": "{name}",
            "created_at": "2024-03-05T10:00:00Z",
            "assets": [
                {{"name": "jsmacros-{name}.jar", "browser_download_url": "{server_url}/download/mod.jar"}},
                {{"name": "typescript-{name}.zip", "browser_download_url": "{server_url}/download/ts.zip"}}
            ]
        }}"#
    )
}

#[tokio::test]
async fn latest_release_is_installed_and_can_be_activated() {
    let mut server = Server::new_async().await;
    let latest = server
        .mock("GET", "/repos/JsMacros/JsMacros/releases/latest")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(release_json(&server.url(), "1.9.2"))
        .create_async()
        .await;
    let download = server
        .mock("GET", "/download/ts.zip")
        .with_status(200)
        .with_body(declaration_zip())
        .create_async()
        .await;

    let ws = TestWorkspace::new();
    let source = GitHubReleases::new(&server.url(), "JsMacros", "JsMacros").unwrap();
    let chooser = ScriptedChooser::silent();
    let installer = ReleaseInstaller::new(
        &source,
        &ws.catalog,
        Regex::new("^typescript").unwrap(),
        &chooser,
    );

    let version = installer.install(&ReleaseSelector::Latest).await.unwrap();

    latest.assert_async().await;
    download.assert_async().await;
    assert_eq!(version.name, LATEST_VERSION_NAME);
    assert_eq!(
        VersionCatalog::declaration_files(&version.location)
            .unwrap()
            .len(),
        2
    );
    assert!(!version.location.join("LICENSE").exists());

    let controller = ws.controller(ScriptedChooser::silent());
    controller.activate(&ws.workspace(), &version).unwrap();
    assert!(ws.synced_dir().join("World.d.ts").exists());
}

#[tokio::test]
async fn named_release_is_stored_under_its_name() {
    let mut server = Server::new_async().await;
    let body = format!(
        "[{}, {}]",
        release_json(&server.url(), "1.9.2"),
        release_json(&server.url(), "1.9.1")
    );
    server
        .mock("GET", "/repos/JsMacros/JsMacros/releases?per_page=100")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(body)
        .create_async()
        .await;
    server
        .mock("GET", "/download/ts.zip")
        .with_status(200)
        .with_body(declaration_zip())
        .create_async()
        .await;

    let ws = TestWorkspace::new();
    let source = GitHubReleases::new(&server.url(), "JsMacros", "JsMacros").unwrap();
    let chooser = ScriptedChooser::silent();
    let installer = ReleaseInstaller::new(
        &source,
        &ws.catalog,
        Regex::new("^typescript").unwrap(),
        &chooser,
    );

    let version = installer
        .install(&ReleaseSelector::Named("1.9.1".to_string()))
        .await
        .unwrap();

    assert_eq!(version.name, "1.9.1");
    assert_eq!(ws.catalog.get("1.9.1").unwrap(), Some(version));
}

#[tokio::test]
async fn rate_limit_is_reported_without_touching_the_catalog() {
    let mut server = Server::new_async().await;
    server
        .mock("GET", "/repos/JsMacros/JsMacros/releases/latest")
        .with_status(429)
        .with_header("retry-after", "30")
        .create_async()
        .await;

    let ws = TestWorkspace::new();
    let source = GitHubReleases::new(&server.url(), "JsMacros", "JsMacros").unwrap();
    let chooser = ScriptedChooser::silent();
    let installer = ReleaseInstaller::new(
        &source,
        &ws.catalog,
        Regex::new("^typescript").unwrap(),
        &chooser,
    );

    let result = installer.install(&ReleaseSelector::Latest).await;

    assert!(matches!(
        result,
        Err(ReleaseError::RateLimited {
            retry_after_secs: Some(30)
        })
    ));
    assert!(ws.catalog.list().unwrap().is_empty());
}

#[tokio::test]
async fn failed_download_adds_no_catalog_entry() {
    let mut server = Server::new_async().await;
    server
        .mock("GET", "/repos/JsMacros/JsMacros/releases/latest")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(release_json(&server.url(), "1.9.2"))
        .create_async()
        .await;
    server
        .mock("GET", "/download/ts.zip")
        .with_status(500)
        .create_async()
        .await;

    let ws = TestWorkspace::new();
    let source = GitHubReleases::new(&server.url(), "JsMacros", "JsMacros").unwrap();
    let chooser = ScriptedChooser::silent();
    let installer = ReleaseInstaller::new(
        &source,
        &ws.catalog,
        Regex::new("^typescript").unwrap(),
        &chooser,
    );

    let result = installer.install(&ReleaseSelector::Latest).await;

    assert!(result.is_err());
    assert!(ws.catalog.list().unwrap().is_empty());
}
