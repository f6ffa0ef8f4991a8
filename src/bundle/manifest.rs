use serde::{Deserialize, Serialize};

/// Well-known location of the pack manifest inside a bundle.
pub const MANIFEST_FILE: &str = "manifest.json";

const DEFAULT_OVERRIDES_DIR: &str = "overrides";

/// Client modpack manifest (`manifest.json`) as exported by pack launchers.
///
/// Only the fields the resolver and synthesizer need are modelled; anything
/// else in the document is ignored.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PackManifest {
    #[serde(default, deserialize_with = "crate::util::serde_helpers::deserialize_null_default")]
    pub minecraft: MinecraftSection,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub manifest_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub overrides: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MinecraftSection {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(default, deserialize_with = "crate::util::serde_helpers::deserialize_null_default")]
    pub mod_loaders: Vec<ModLoaderEntry>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ModLoaderEntry {
    #[serde(default, deserialize_with = "crate::util::serde_helpers::deserialize_null_default")]
    pub id: String,
    #[serde(default)]
    pub primary: bool,
}

impl PackManifest {
    pub fn from_json(content: &str) -> serde_json::Result<Self> {
        serde_json::from_str(content)
    }

    /// Declared game version, if non-blank.
    pub fn runtime_version(&self) -> Option<&str> {
        self.minecraft
            .version
            .as_deref()
            .map(str::trim)
            .filter(|v| !v.is_empty())
    }

    /// First declared loader identifier, e.g. `forge-47.2.0`.
    pub fn first_loader_id(&self) -> Option<&str> {
        self.minecraft.mod_loaders.first().map(|l| l.id.trim())
    }

    pub fn overrides_dir(&self) -> &str {
        self.overrides
            .as_deref()
            .filter(|o| !o.is_empty())
            .unwrap_or(DEFAULT_OVERRIDES_DIR)
    }

    /// Pack name with its version appended when both are declared.
    pub fn display_name(&self) -> Option<String> {
        let name = self.name.as_deref().map(str::trim).filter(|n| !n.is_empty())?;
        match self.version.as_deref().map(str::trim).filter(|v| !v.is_empty()) {
            Some(version) => Some(format!("{} {}", name, version)),
            None => Some(name.to_string()),
        }
    }
}
