use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing::warn;

use decl_sync::catalog::{Version, VersionCatalog};
use decl_sync::config::{self, Settings};
use decl_sync::error::Error;
use decl_sync::logging;
use decl_sync::plugin::FilePluginNotifier;
use decl_sync::release::source::matching_assets;
use decl_sync::release::{GitHubReleases, ReleaseInstaller, ReleaseSelector, ReleaseSource};
use decl_sync::workspace::{
    Chooser, PromptChooser, Workspace, WorkspaceActivationController, WorkspaceLayout,
};

#[derive(Parser)]
#[command(name = "decl-sync")]
#[command(
    version,
    about = "Cache type-declaration releases and bind one to a workspace's tsconfig"
)]
struct Cli {
    /// Open workspace root (repeatable); defaults to the current directory
    #[arg(long = "workspace", value_name = "DIR", global = true)]
    workspaces: Vec<PathBuf>,

    /// Use this root without asking, whatever else is open
    #[arg(long, value_name = "DIR", global = true)]
    pin: Option<PathBuf>,

    /// Also print debug logs on stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Download a release into the catalog (the newest one by default)
    Fetch {
        /// Release title or tag to download
        #[arg(long, conflicts_with = "choose")]
        release: Option<String>,
        /// Pick the release from a list
        #[arg(long)]
        choose: bool,
        /// Activate the downloaded version in the workspace right away
        #[arg(long = "use")]
        activate: bool,
    },
    /// List published releases
    Releases,
    /// List downloaded versions
    List,
    /// Activate a downloaded version in the workspace
    Use { version: Option<String> },
    /// Show the version active in the workspace
    Current,
    /// Deactivate the workspace's version and restore its config
    RemoveLocal,
    /// Delete a downloaded version from the catalog
    Remove { version: Option<String> },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let _guard = logging::init(&config::log_path(), cli.verbose)?;
    let settings = Settings::load(&config::settings_path())?;
    let catalog = VersionCatalog::new(config::catalog_dir());

    match cli.command {
        Command::Fetch {
            release,
            choose,
            activate,
        } => {
            let selector = match (release, choose) {
                (Some(name), _) => ReleaseSelector::Named(name),
                (None, true) => ReleaseSelector::Choose,
                (None, false) => ReleaseSelector::Latest,
            };
            let version = runtime()?.block_on(fetch(&settings, &catalog, &selector))?;
            println!("Downloaded {} to {}", version.name, version.location.display());

            if activate {
                let controller = controller(&settings, catalog);
                let binding = controller.activate(&workspace(cli.workspaces, cli.pin)?, &version)?;
                println!("Using {} in {}", version.name, binding.root.display());
            }
        }
        Command::Releases => {
            let pattern = settings.asset_pattern()?;
            let releases = runtime()?.block_on(async {
                let source = release_source(&settings)?;
                source.list_releases().await
            })?;
            for release in &releases {
                let assets = matching_assets(release, &pattern).len();
                println!("{}\t{} matching asset(s)", release.label(), assets);
            }
        }
        Command::List => {
            let versions = catalog.list_sorted()?;
            if versions.is_empty() {
                println!("No versions downloaded; run `decl-sync fetch`");
            }
            for version in versions {
                println!("{}", version.name);
            }
        }
        Command::Use { version } => {
            let version = pick_version(&catalog, version, "Select version to use")?;
            let controller = controller(&settings, catalog);
            let binding = controller.activate(&workspace(cli.workspaces, cli.pin)?, &version)?;
            println!("Using {} in {}", version.name, binding.root.display());
        }
        Command::Current => {
            let controller = controller(&settings, catalog);
            match controller.get_active(&workspace(cli.workspaces, cli.pin)?)? {
                Some(version) => println!("{}", version.name),
                None => println!("No version is active"),
            }
        }
        Command::RemoveLocal => {
            let controller = controller(&settings, catalog);
            let name = controller.deactivate(&workspace(cli.workspaces, cli.pin)?)?;
            println!("Deactivated {name}");
        }
        Command::Remove { version } => {
            let version = pick_version(&catalog, version, "Select version to delete")?;
            if catalog.delete_version(&version)? {
                println!("Deleted {}", version.name);
            } else {
                println!("{} was already gone", version.name);
            }
        }
    }

    Ok(())
}

fn runtime() -> anyhow::Result<tokio::runtime::Runtime> {
    Ok(tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?)
}

fn release_source(settings: &Settings) -> Result<GitHubReleases, decl_sync::error::ReleaseError> {
    let (owner, repo) = settings.repository()?;
    GitHubReleases::for_repository(&owner, &repo)
}

async fn fetch(
    settings: &Settings,
    catalog: &VersionCatalog,
    selector: &ReleaseSelector,
) -> anyhow::Result<Version> {
    let source = release_source(settings)?;
    let installer = ReleaseInstaller::new(&source, catalog, settings.asset_pattern()?, &PromptChooser);
    Ok(installer.install(selector).await?)
}

fn workspace(roots: Vec<PathBuf>, pin: Option<PathBuf>) -> anyhow::Result<Workspace> {
    let roots = if roots.is_empty() {
        vec![std::env::current_dir().context("Unable to read the current directory")?]
    } else {
        roots
    };
    let workspace = Workspace::new(roots);
    Ok(match pin {
        Some(pin) => workspace.with_pinned(pin),
        None => workspace,
    })
}

fn controller(
    settings: &Settings,
    catalog: VersionCatalog,
) -> WorkspaceActivationController<PromptChooser> {
    let controller =
        WorkspaceActivationController::new(catalog, WorkspaceLayout::from(settings), PromptChooser)
            .ask_when_multiple(settings.ask_when_multiple_workspaces);

    if !settings.experimental_hinting {
        return controller;
    }
    match &settings.plugin_config_path {
        Some(path) => controller.with_notifier(Box::new(FilePluginNotifier::new(path))),
        None => {
            warn!("experimentalHinting is enabled but pluginConfigPath is not set");
            controller
        }
    }
}

fn pick_version(
    catalog: &VersionCatalog,
    name: Option<String>,
    prompt: &str,
) -> anyhow::Result<Version> {
    if let Some(name) = name {
        return catalog
            .get(&name)?
            .with_context(|| format!("Version {name} is not downloaded"));
    }

    let mut versions = catalog.list_sorted()?;
    if versions.is_empty() {
        anyhow::bail!("No versions downloaded; run `decl-sync fetch`");
    }
    let labels: Vec<String> = versions.iter().map(|v| v.name.clone()).collect();
    let index = PromptChooser
        .choose(prompt, &labels)
        .ok_or(Error::SelectionCancelled)?;
    Ok(versions.swap_remove(index))
}
