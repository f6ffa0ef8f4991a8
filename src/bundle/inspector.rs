use super::manifest::{PackManifest, MANIFEST_FILE};
use super::tree::{rel_string, FileTree};
use crate::error::{DeployError, Result};
use serde::Serialize;
use std::collections::BTreeSet;
use std::path::Path;
use tracing::{debug, info};

/// Conventional startup script names, matched case-insensitively.
pub const STARTUP_SCRIPTS: &[&str] = &[
    "start.sh",
    "start.bat",
    "startserver.sh",
    "startserver.bat",
    "run.sh",
    "run.bat",
    "server.sh",
];

/// Directory names whose contents count as pack configuration.
pub const CONFIG_DIRS: &[&str] = &["config", "defaultconfigs", "scripts"];

/// Raw identifying signals extracted from a bundle.
///
/// Absence is always an empty collection or `None`, never an error.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct BundleSignals {
    pub manifest: Option<PackManifest>,
    /// Lowercased forge/neoforge jar names (installers and universal jars).
    pub installer_filenames: BTreeSet<String>,
    /// Lowercased fabric-style server launch jar names.
    pub launch_artifacts: BTreeSet<String>,
    pub startup_script_paths: Vec<String>,
    pub config_tree_paths: Vec<String>,
    pub is_packaged_with_manifest: bool,
    pub bundle_name: Option<String>,
}

impl BundleSignals {
    pub fn has_fabric_launcher(&self) -> bool {
        !self.launch_artifacts.is_empty()
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct BundleInspector;

impl BundleInspector {
    pub fn new() -> Self {
        Self
    }

    pub fn inspect(&self, tree: &FileTree) -> Result<BundleSignals> {
        let manifest = self.read_manifest(tree)?;

        let mut signals = BundleSignals {
            is_packaged_with_manifest: manifest.is_some(),
            bundle_name: manifest
                .as_ref()
                .and_then(PackManifest::display_name)
                .or_else(|| tree.name().map(str::to_string)),
            manifest,
            ..Default::default()
        };

        for path in tree.shallow_files() {
            let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
                continue;
            };
            let lower = name.to_lowercase();

            if is_loader_artifact(&lower) {
                signals.installer_filenames.insert(lower);
            } else if is_fabric_launch_artifact(&lower) {
                signals.launch_artifacts.insert(lower);
            } else if STARTUP_SCRIPTS.contains(&lower.as_str()) {
                signals.startup_script_paths.push(rel_string(path));
            }
        }

        signals.config_tree_paths = tree
            .files()
            .iter()
            .filter(|p| is_config_path(p))
            .map(|p| rel_string(p))
            .collect();

        info!(
            bundle = %tree.root().display(),
            manifest = signals.is_packaged_with_manifest,
            installers = signals.installer_filenames.len(),
            launchers = signals.launch_artifacts.len(),
            scripts = signals.startup_script_paths.len(),
            config_files = signals.config_tree_paths.len(),
            "Bundle inspected"
        );

        Ok(signals)
    }

    fn read_manifest(&self, tree: &FileTree) -> Result<Option<PackManifest>> {
        if !tree.contains(MANIFEST_FILE) {
            debug!("No manifest found, treating bundle as bare server layout");
            return Ok(None);
        }

        let content = tree.read_to_string(MANIFEST_FILE)?;
        let manifest =
            PackManifest::from_json(&content).map_err(|source| DeployError::MalformedManifest {
                path: tree.root().join(MANIFEST_FILE),
                source,
            })?;

        debug!(
            runtime_version = ?manifest.runtime_version(),
            loader = ?manifest.first_loader_id(),
            "Parsed pack manifest"
        );
        Ok(Some(manifest))
    }
}

fn is_loader_artifact(lower_name: &str) -> bool {
    lower_name.ends_with(".jar")
        && (lower_name.starts_with("forge-") || lower_name.starts_with("neoforge-"))
}

fn is_fabric_launch_artifact(lower_name: &str) -> bool {
    matches!(
        lower_name,
        "fabric-server-launch.jar" | "fabric-server-launcher.jar"
    ) || (lower_name.starts_with("fabric-server-mc.") && lower_name.ends_with(".jar"))
}

/// A file below a config directory at the root or one level down
/// (`config/...`, `overrides/config/...`).
fn is_config_path(path: &Path) -> bool {
    let components: Vec<String> = path
        .components()
        .map(|c| c.as_os_str().to_string_lossy().to_lowercase())
        .collect();

    components
        .iter()
        .take(2)
        .enumerate()
        .any(|(i, c)| i + 1 < components.len() && CONFIG_DIRS.contains(&c.as_str()))
}
