use super::identity::{LoaderFamily, LoaderIdentity};
use crate::bundle::BundleSignals;
use crate::bundle::PackManifest;
use crate::error::{DeployError, Result};
use regex::Regex;
use std::sync::OnceLock;
use tracing::{debug, info, warn};

/// Game version assumed when the bundle does not reveal one (NeoForge installer
/// only, fabric launcher, vanilla). This is an approximation, and identities
/// built with it are flagged via [`LoaderIdentity::runtime_version_assumed`].
pub const DEFAULT_TARGET_RUNTIME_VERSION: &str = "1.21.1";

const UNKNOWN_LOADER_VERSION: &str = "unknown";

/// Manifest loader-id prefixes, tried in order.
const LOADER_ID_PREFIXES: &[(&str, LoaderFamily)] = &[
    ("forge-", LoaderFamily::Forge),
    ("neoforge-", LoaderFamily::NeoForge),
    ("fabric-", LoaderFamily::Fabric),
    ("quilt-", LoaderFamily::Quilt),
];

fn forge_installer_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^forge-(\d+\.\d+(?:\.\d+)?)-(\d+(?:\.\d+)+)-installer\.jar$")
            .expect("valid regex")
    })
}

fn neoforge_installer_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^neoforge-(\d+(?:\.\d+)+(?:-beta)?)-installer\.jar$").expect("valid regex")
    })
}

fn forge_universal_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^forge-(\d+\.\d+(?:\.\d+)?)-(\d+(?:\.\d+)+)(?:-universal|-server)?\.jar$")
            .expect("valid regex")
    })
}

/// Splits a manifest loader id such as `forge-47.2.0` into family and version.
///
/// The version part must start with a digit and contain only version
/// characters; anything else is unresolvable rather than silently accepted.
pub fn parse_loader_id(id: &str) -> Result<(LoaderFamily, String)> {
    let id = id.trim();
    for (prefix, family) in LOADER_ID_PREFIXES {
        let Some(version) = id.strip_prefix(prefix) else {
            continue;
        };
        if is_version_token(version) {
            return Ok((*family, version.to_string()));
        }
        return Err(DeployError::unresolvable(format!(
            "loader id '{}' has no valid version after '{}'",
            id, prefix
        )));
    }

    Err(DeployError::unresolvable(format!(
        "unknown loader id '{}'",
        id
    )))
}

fn is_version_token(version: &str) -> bool {
    version.starts_with(|c: char| c.is_ascii_digit())
        && version
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '+' | '_'))
}

/// Decides a bundle's [`LoaderIdentity`] from its signals.
///
/// Rules are tried in a fixed order and the first match wins:
/// manifest, installer/universal jar names, fabric launcher, vanilla.
#[derive(Debug, Clone)]
pub struct LoaderResolver {
    default_runtime_version: String,
}

impl Default for LoaderResolver {
    fn default() -> Self {
        Self {
            default_runtime_version: DEFAULT_TARGET_RUNTIME_VERSION.to_string(),
        }
    }
}

impl LoaderResolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_default_runtime_version(mut self, version: impl Into<String>) -> Self {
        self.default_runtime_version = version.into();
        self
    }

    pub fn resolve(&self, signals: &BundleSignals) -> Result<LoaderIdentity> {
        let identity = if signals.is_packaged_with_manifest {
            let manifest = signals.manifest.as_ref().ok_or_else(|| {
                DeployError::unresolvable("bundle is flagged as packaged but has no manifest")
            })?;
            self.from_manifest(manifest)?
        } else if let Some(identity) = self.from_installers(signals) {
            identity
        } else if signals.has_fabric_launcher() {
            debug!(launchers = ?signals.launch_artifacts, "Fabric launch artifact present");
            self.assumed(LoaderFamily::Fabric, Some(UNKNOWN_LOADER_VERSION.to_string()))
        } else {
            debug!("No loader signals found, falling back to vanilla");
            self.assumed(LoaderFamily::Vanilla, None)
        };

        info!(
            family = %identity.family(),
            loader_version = identity.loader_version().unwrap_or("-"),
            runtime_version = identity.target_runtime_version(),
            java = identity.managed_runtime_version(),
            strategy = %identity.startup_strategy(),
            "Resolved loader identity"
        );

        Ok(identity)
    }

    fn from_manifest(&self, manifest: &PackManifest) -> Result<LoaderIdentity> {
        let runtime_version = manifest
            .runtime_version()
            .ok_or_else(|| DeployError::unresolvable("manifest declares no game version"))?;
        let loader_id = manifest
            .first_loader_id()
            .ok_or_else(|| DeployError::unresolvable("manifest declares no mod loaders"))?;

        let (family, version) = parse_loader_id(loader_id)?;
        Ok(LoaderIdentity::new(family, Some(version), runtime_version))
    }

    fn from_installers(&self, signals: &BundleSignals) -> Option<LoaderIdentity> {
        for name in &signals.installer_filenames {
            if let Some(caps) = forge_installer_re().captures(name) {
                debug!(installer = %name, "Matched forge installer");
                return Some(LoaderIdentity::new(
                    LoaderFamily::Forge,
                    Some(caps[2].to_string()),
                    &caps[1],
                ));
            }
            if let Some(caps) = neoforge_installer_re().captures(name) {
                warn!(
                    installer = %name,
                    assumed_runtime_version = %self.default_runtime_version,
                    "NeoForge installer does not name its game version, assuming default"
                );
                return Some(self.assumed(LoaderFamily::NeoForge, Some(caps[1].to_string())));
            }
        }

        signals.installer_filenames.iter().find_map(|name| {
            forge_universal_re().captures(name).map(|caps| {
                debug!(jar = %name, "Matched forge universal jar");
                LoaderIdentity::new(LoaderFamily::Forge, Some(caps[2].to_string()), &caps[1])
            })
        })
    }

    fn assumed(&self, family: LoaderFamily, loader_version: Option<String>) -> LoaderIdentity {
        LoaderIdentity::new(family, loader_version, self.default_runtime_version.clone())
            .with_assumed_runtime_version()
    }
}
