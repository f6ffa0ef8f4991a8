//! Bundle inspection and loader resolution over on-disk fixture bundles

mod support;

use pterodeploy::bundle::{BundleInspector, FileTree, ScanConfig};
use pterodeploy::fs::MockFileSystem;
use pterodeploy::loader::{LoaderFamily, LoaderResolver, StartupStrategy};
use pterodeploy::DeployError;
use std::path::Path;
use std::sync::Arc;
use support::bundle_path;
use yare::parameterized;

fn resolve_dir(dir: &Path) -> Result<pterodeploy::LoaderIdentity, DeployError> {
    let tree = FileTree::scan(dir, &ScanConfig::default())?;
    let signals = BundleInspector::new().inspect(&tree)?;
    LoaderResolver::new().resolve(&signals)
}

#[parameterized(
    forge_manifest = { "forge-manifest", LoaderFamily::Forge, Some("47.2.0"), "1.20.1", 17, StartupStrategy::Modern, false },
    legacy_installer = { "forge-legacy-installer", LoaderFamily::Forge, Some("14.23.5.2860"), "1.12.2", 8, StartupStrategy::Legacy, false },
    neoforge_installer = { "neoforge-installer", LoaderFamily::NeoForge, Some("21.1.77"), "1.21.1", 21, StartupStrategy::Modern, true },
    forge_universal = { "forge-universal", LoaderFamily::Forge, Some("36.2.39"), "1.16.5", 8, StartupStrategy::Legacy, false },
    fabric_server = { "fabric-server", LoaderFamily::Fabric, Some("unknown"), "1.21.1", 21, StartupStrategy::FabricStyle, true },
    quilt_manifest = { "quilt-manifest", LoaderFamily::Quilt, Some("0.26.0"), "1.20.4", 17, StartupStrategy::FabricStyle, false },
    vanilla_server = { "vanilla-server", LoaderFamily::Vanilla, None, "1.21.1", 21, StartupStrategy::Modern, true },
)]
fn test_fixture_resolution(
    fixture: &str,
    family: LoaderFamily,
    loader_version: Option<&str>,
    runtime_version: &str,
    java: u8,
    strategy: StartupStrategy,
    assumed: bool,
) {
    let identity = resolve_dir(&bundle_path(fixture)).unwrap();

    assert_eq!(identity.family(), family);
    assert_eq!(identity.loader_version(), loader_version);
    assert_eq!(identity.target_runtime_version(), runtime_version);
    assert_eq!(identity.managed_runtime_version(), java);
    assert_eq!(identity.startup_strategy(), strategy);
    assert_eq!(identity.runtime_version_assumed(), assumed);
}

#[test]
fn test_manifest_bundle_signals() {
    let tree = FileTree::scan(bundle_path("forge-manifest"), &ScanConfig::default()).unwrap();
    let signals = BundleInspector::new().inspect(&tree).unwrap();

    assert!(signals.is_packaged_with_manifest);
    assert_eq!(signals.bundle_name.as_deref(), Some("Cool Pack 1.0.0"));
    assert_eq!(
        signals.config_tree_paths,
        vec![
            "overrides/config/jei/jei-client.ini".to_string(),
            "overrides/defaultconfigs/ftbchunks-world.snbt".to_string(),
        ]
    );
    assert!(signals.installer_filenames.is_empty());
}

#[test]
fn test_server_bundle_signals() {
    let tree = FileTree::scan(bundle_path("forge-legacy-installer"), &ScanConfig::default()).unwrap();
    let signals = BundleInspector::new().inspect(&tree).unwrap();

    assert!(!signals.is_packaged_with_manifest);
    assert_eq!(signals.bundle_name.as_deref(), Some("forge-legacy-installer"));
    assert!(signals
        .installer_filenames
        .contains("forge-1.12.2-14.23.5.2860-installer.jar"));
    assert_eq!(signals.startup_script_paths, vec!["start.sh".to_string()]);
    assert_eq!(signals.config_tree_paths, vec!["config/forge.cfg".to_string()]);
}

/// Bundles without a manifest, installer or fabric launcher always resolve to
/// vanilla, whatever else they contain.
#[parameterized(
    empty = { &[] },
    plain_server = { &["server.jar", "eula.txt"] },
    scripts_and_configs = { &["start.sh", "config/a.toml", "mods/jei.jar"] },
    deep_loader_jar = { &["libs/nested/forge-1.20.1-47.2.0-installer.jar"] },
    lookalike_names = { &["my-forge-notes.txt", "fabric.txt", "quilt-loader.json"] },
)]
fn test_bundles_without_loader_signals_are_vanilla(files: &[&str]) {
    let fs = MockFileSystem::with_root("/bundle");
    for file in files {
        fs.add_file(format!("/bundle/{}", file), "");
    }

    let tree = FileTree::from_fs(Arc::new(fs), "/bundle", &ScanConfig::default()).unwrap();
    let signals = BundleInspector::new().inspect(&tree).unwrap();
    let identity = LoaderResolver::new().resolve(&signals).unwrap();

    assert_eq!(identity.family(), LoaderFamily::Vanilla);
    assert_eq!(identity.loader_version(), None);
}

#[test]
fn test_malformed_manifest_is_an_error() {
    let fs = MockFileSystem::with_root("/bundle");
    fs.add_file("/bundle/manifest.json", "{\"minecraft\": ");
    fs.add_file("/bundle/forge-1.20.1-47.2.0-installer.jar", "");

    let tree = FileTree::from_fs(Arc::new(fs), "/bundle", &ScanConfig::default()).unwrap();
    let err = BundleInspector::new().inspect(&tree).unwrap_err();
    assert!(matches!(err, DeployError::MalformedManifest { .. }));
}

#[parameterized(
    unsupported_prefix = { r#"{"minecraft": {"version": "1.20.1", "modLoaders": [{"id": "liteloader-1.12"}]}}"# },
    no_loaders = { r#"{"minecraft": {"version": "1.20.1", "modLoaders": []}}"# },
    no_version = { r#"{"minecraft": {"modLoaders": [{"id": "forge-47.2.0"}]}}"# },
)]
fn test_unresolvable_manifests(manifest: &str) {
    let fs = MockFileSystem::with_root("/bundle");
    fs.add_file("/bundle/manifest.json", manifest);

    let tree = FileTree::from_fs(Arc::new(fs), "/bundle", &ScanConfig::default()).unwrap();
    let signals = BundleInspector::new().inspect(&tree).unwrap();
    let err = LoaderResolver::new().resolve(&signals).unwrap_err();
    assert!(matches!(err, DeployError::UnresolvableLoader(_)));
}

#[test]
fn test_manifest_survives_file_limit() {
    let temp = tempfile::TempDir::new().unwrap();
    let pack = temp.path().join("pack");
    std::fs::create_dir_all(pack.join("overrides/config")).unwrap();
    std::fs::write(
        pack.join("manifest.json"),
        r#"{"minecraft": {"version": "1.20.1", "modLoaders": [{"id": "forge-47.2.0", "primary": true}]}}"#,
    )
    .unwrap();
    for i in 0..20 {
        std::fs::write(pack.join(format!("overrides/config/f{}.toml", i)), "x").unwrap();
    }

    let config = ScanConfig {
        max_depth: 16,
        max_files: 20,
    };
    let tree = FileTree::scan(&pack, &config).unwrap();
    assert!(tree.contains("manifest.json"));
    assert_eq!(tree.len(), 20);

    let signals = BundleInspector::new().inspect(&tree).unwrap();
    assert!(signals.is_packaged_with_manifest);
    let identity = LoaderResolver::new().resolve(&signals).unwrap();
    assert_eq!(identity.family(), LoaderFamily::Forge);
    assert_eq!(identity.loader_version(), Some("47.2.0"));
    assert_eq!(identity.target_runtime_version(), "1.20.1");
}
