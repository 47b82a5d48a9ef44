//! Activation and deactivation of a catalog version for one workspace
//!
//! A workspace is either Unbound (no marker, or a marker naming a version the
//! catalog no longer has) or Bound to a version name. Nothing here locks:
//! overlapping operations on the same workspace must be serialized by the caller.

use tracing::{debug, info, warn};

use crate::catalog::{Version, VersionCatalog};
use crate::error::Error;
use crate::plugin::{PluginConfig, PluginNotifier};
use crate::project::ProjectConfigSynchronizer;
use crate::workspace::binding::{Workspace, WorkspaceBinding, WorkspaceLayout};
use crate::workspace::chooser::Chooser;
use crate::workspace::marker::ActiveVersionMarker;
use crate::workspace::replicate::{remove_directory, replace_directory};

pub struct WorkspaceActivationController<C: Chooser> {
    catalog: VersionCatalog,
    synchronizer: ProjectConfigSynchronizer,
    layout: WorkspaceLayout,
    chooser: C,
    ask_when_multiple: bool,
    notifier: Option<Box<dyn PluginNotifier>>,
}

impl<C: Chooser> WorkspaceActivationController<C> {
    pub fn new(catalog: VersionCatalog, layout: WorkspaceLayout, chooser: C) -> Self {
        Self {
            catalog,
            synchronizer: ProjectConfigSynchronizer::new(),
            layout,
            chooser,
            ask_when_multiple: true,
            notifier: None,
        }
    }

    /// Take the first open root instead of asking when several are open
    pub fn ask_when_multiple(mut self, ask: bool) -> Self {
        self.ask_when_multiple = ask;
        self
    }

    pub fn with_notifier(mut self, notifier: Box<dyn PluginNotifier>) -> Self {
        self.notifier = Some(notifier);
        self
    }

    pub fn catalog(&self) -> &VersionCatalog {
        &self.catalog
    }

    pub fn chooser(&self) -> &C {
        &self.chooser
    }

    /// Resolve the workspace root this operation targets
    pub fn resolve(&self, workspace: &Workspace) -> Result<WorkspaceBinding, Error> {
        let root = workspace.resolve_root(&self.chooser, self.ask_when_multiple)?;
        Ok(self.layout.bind(root))
    }

    /// Bind `version` to the workspace: copy its files, write the marker, enable it in the config
    ///
    /// Validation, root selection and the config rewrite are all worked out
    /// before anything is written, so a failure there leaves any previous
    /// binding as it was.
    pub fn activate(
        &self,
        workspace: &Workspace,
        version: &Version,
    ) -> Result<WorkspaceBinding, Error> {
        if !VersionCatalog::is_structurally_valid(&version.location) {
            return Err(Error::InvalidVersion {
                name: version.name.clone(),
                location: version.location.clone(),
            });
        }

        let binding = self.resolve(workspace)?;
        let pending = self
            .synchronizer
            .prepare_enable(&binding.config_path, &self.layout.include_globs)?;

        // Globs recorded by an earlier activation are still in the config
        let mut marker = ActiveVersionMarker::new(&version.name);
        if let Some(previous) = ActiveVersionMarker::read(&binding.synced_dir) {
            debug!("Replacing active version {}", previous.name);
            marker.record(previous.include_change());
        }
        marker.record(pending.change().clone());

        let copied = replace_directory(&version.location, &binding.synced_dir, &marker)?;
        info!(
            "Copied {} files of version {} into {:?}",
            copied, version.name, binding.synced_dir
        );

        pending.commit()?;
        debug!(
            "Enabled declarations in {:?} (added includes: {:?})",
            binding.config_path,
            pending.change().added
        );

        self.push_plugin_config(&binding);
        info!("Activated version {} for {:?}", version.name, binding.root);
        Ok(binding)
    }

    /// Unbind the workspace: restore the config, then drop the marker and the synced directory
    ///
    /// The marker outlives a failed config restore so the call can be retried.
    /// Returns the name of the version that was active.
    pub fn deactivate(&self, workspace: &Workspace) -> Result<String, Error> {
        let binding = self.resolve(workspace)?;
        let marker = self
            .bound_marker(&binding)?
            .ok_or(Error::NoActiveVersion)?;

        self.synchronizer
            .disable(&binding.config_path, &marker.include_change())?;
        ActiveVersionMarker::clear(&binding.synced_dir)?;
        remove_directory(&binding.synced_dir)?;

        if let Some(notifier) = &self.notifier {
            notifier.configure(&PluginConfig::default());
        }
        info!("Deactivated version {} for {:?}", marker.name, binding.root);
        Ok(marker.name)
    }

    /// The version bound to the workspace, or `None` when Unbound
    pub fn get_active(&self, workspace: &Workspace) -> Result<Option<Version>, Error> {
        let binding = self.resolve(workspace)?;
        let Some(marker) = self.bound_marker(&binding)? else {
            return Ok(None);
        };
        self.catalog.get(&marker.name)
    }

    /// Marker of a Bound workspace; dangling markers read as `None`
    fn bound_marker(&self, binding: &WorkspaceBinding) -> Result<Option<ActiveVersionMarker>, Error> {
        let Some(marker) = ActiveVersionMarker::read(&binding.synced_dir) else {
            return Ok(None);
        };
        if self.catalog.get(&marker.name)?.is_none() {
            warn!(
                "Marker in {:?} names version {} which is no longer in the catalog",
                binding.synced_dir, marker.name
            );
            return Ok(None);
        }
        Ok(Some(marker))
    }

    /// Best effort; the binding stands even if the plugin can't be told about it
    fn push_plugin_config(&self, binding: &WorkspaceBinding) {
        let Some(notifier) = &self.notifier else {
            return;
        };
        match VersionCatalog::declaration_files(&binding.synced_dir) {
            Ok(paths) => notifier.configure(&PluginConfig::from_paths(&paths)),
            Err(e) => warn!(
                "Not updating plugin config, cannot list {:?}: {}",
                binding.synced_dir, e
            ),
        }
    }
}
