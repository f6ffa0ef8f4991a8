use super::version::{managed_runtime_version, GameVersion};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LoaderFamily {
    Forge,
    NeoForge,
    Fabric,
    Quilt,
    Vanilla,
    Unknown,
}

impl LoaderFamily {
    pub fn as_str(&self) -> &'static str {
        match self {
            LoaderFamily::Forge => "forge",
            LoaderFamily::NeoForge => "neoforge",
            LoaderFamily::Fabric => "fabric",
            LoaderFamily::Quilt => "quilt",
            LoaderFamily::Vanilla => "vanilla",
            LoaderFamily::Unknown => "unknown",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            LoaderFamily::Forge => "Forge",
            LoaderFamily::NeoForge => "NeoForge",
            LoaderFamily::Fabric => "Fabric",
            LoaderFamily::Quilt => "Quilt",
            LoaderFamily::Vanilla => "Vanilla",
            LoaderFamily::Unknown => "Unknown",
        }
    }

    /// Forge and NeoForge share memory defaults and launch conventions.
    pub fn is_forge_like(&self) -> bool {
        matches!(self, LoaderFamily::Forge | LoaderFamily::NeoForge)
    }

    pub fn is_fabric_like(&self) -> bool {
        matches!(self, LoaderFamily::Fabric | LoaderFamily::Quilt)
    }
}

impl fmt::Display for LoaderFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Shape of the launch command a server needs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StartupStrategy {
    /// Direct `-jar` on the forge universal jar.
    #[serde(rename = "legacy")]
    Legacy,
    /// Argument-file launch (`@user_jvm_args.txt @libraries/.../unix_args.txt`).
    #[serde(rename = "modern")]
    Modern,
    /// Direct `-jar` on the loader's server launch jar.
    #[serde(rename = "fabric-style")]
    FabricStyle,
}

impl StartupStrategy {
    pub fn for_family(family: LoaderFamily, target_runtime_version: &str) -> Self {
        match family {
            LoaderFamily::Fabric | LoaderFamily::Quilt => StartupStrategy::FabricStyle,
            LoaderFamily::Forge | LoaderFamily::NeoForge => {
                let modern = GameVersion::parse(target_runtime_version)
                    .map(|v| v.minor >= 17)
                    .unwrap_or(false);
                if modern {
                    StartupStrategy::Modern
                } else {
                    StartupStrategy::Legacy
                }
            }
            LoaderFamily::Vanilla | LoaderFamily::Unknown => StartupStrategy::Modern,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            StartupStrategy::Legacy => "legacy",
            StartupStrategy::Modern => "modern",
            StartupStrategy::FabricStyle => "fabric-style",
        }
    }
}

impl fmt::Display for StartupStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Canonical runtime identity of a bundle. Built once per analysis and never mutated.
///
/// The managed runtime version and startup strategy are always derived from the
/// family and target runtime version, so they cannot drift from them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LoaderIdentity {
    family: LoaderFamily,
    loader_version: Option<String>,
    target_runtime_version: String,
    managed_runtime_version: u8,
    startup_strategy: StartupStrategy,
    runtime_version_assumed: bool,
}

impl LoaderIdentity {
    pub fn new(
        family: LoaderFamily,
        loader_version: Option<String>,
        target_runtime_version: impl Into<String>,
    ) -> Self {
        let target_runtime_version = target_runtime_version.into();
        let loader_version = match family {
            LoaderFamily::Vanilla => None,
            _ => loader_version,
        };

        Self {
            managed_runtime_version: managed_runtime_version(&target_runtime_version),
            startup_strategy: StartupStrategy::for_family(family, &target_runtime_version),
            family,
            loader_version,
            target_runtime_version,
            runtime_version_assumed: false,
        }
    }

    /// Marks the target runtime version as a fixed default rather than one read
    /// from the bundle.
    pub fn with_assumed_runtime_version(mut self) -> Self {
        self.runtime_version_assumed = true;
        self
    }

    pub fn family(&self) -> LoaderFamily {
        self.family
    }

    pub fn loader_version(&self) -> Option<&str> {
        self.loader_version.as_deref()
    }

    pub fn target_runtime_version(&self) -> &str {
        &self.target_runtime_version
    }

    pub fn managed_runtime_version(&self) -> u8 {
        self.managed_runtime_version
    }

    pub fn startup_strategy(&self) -> StartupStrategy {
        self.startup_strategy
    }

    pub fn runtime_version_assumed(&self) -> bool {
        self.runtime_version_assumed
    }

    pub fn game_version(&self) -> Option<GameVersion> {
        GameVersion::parse(&self.target_runtime_version)
    }
}

impl fmt::Display for LoaderIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.family)?;
        if let Some(version) = &self.loader_version {
            write!(f, " {}", version)?;
        }
        write!(
            f,
            " for {} (Java {}, {})",
            self.target_runtime_version, self.managed_runtime_version, self.startup_strategy
        )
    }
}
