//! Deployment descriptors (Pterodactyl eggs) and their synthesis from templates

pub mod image;
pub mod synthesizer;
pub mod template;

pub use image::{runtime_image, runtime_label_from_image, RUNTIME_IMAGE_PREFIX};
pub use synthesizer::{MemoryBounds, Synthesizer};
pub use template::{Placeholder, Template};

use crate::error::{DeployError, Result};
use anyhow::Context;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::fs;
use std::path::Path;

/// One configurable egg variable.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Variable {
    #[serde(default, deserialize_with = "crate::util::serde_helpers::deserialize_null_default")]
    pub name: String,
    #[serde(default, deserialize_with = "crate::util::serde_helpers::deserialize_null_default")]
    pub env_variable: String,
    #[serde(default, deserialize_with = "crate::util::serde_helpers::deserialize_null_default")]
    pub default_value: Value,
}

impl Variable {
    pub fn default_str(&self) -> Option<&str> {
        self.default_value.as_str()
    }
}

/// A deployment descriptor document.
///
/// Arbitrarily nested JSON with no schema beyond the fields a deployment needs
/// (`startup`, `docker_images`, `meta`, `variables`). Descriptors are values:
/// synthesis and comparison always return new documents.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Descriptor(Value);

impl Descriptor {
    pub fn from_value(value: Value) -> Self {
        Self(value)
    }

    pub fn from_json(content: &str) -> serde_json::Result<Self> {
        serde_json::from_str(content).map(Self)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| DeployError::Read {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        Self::from_json(&content).map_err(|e| DeployError::Read {
            path: path.to_path_buf(),
            message: format!("invalid descriptor JSON: {}", e),
        })
    }

    pub fn as_value(&self) -> &Value {
        &self.0
    }

    pub fn into_value(self) -> Value {
        self.0
    }

    /// Looks up a dotted path such as `meta.version`.
    pub fn get(&self, dotted_path: &str) -> Option<&Value> {
        dotted_path
            .split('.')
            .try_fold(&self.0, |value, key| value.as_object()?.get(key))
    }

    pub fn startup(&self) -> Option<&str> {
        self.0.get("startup").and_then(Value::as_str)
    }

    pub fn docker_images(&self) -> Option<&Map<String, Value>> {
        self.0.get("docker_images").and_then(Value::as_object)
    }

    pub fn meta(&self) -> Option<&Map<String, Value>> {
        self.0.get("meta").and_then(Value::as_object)
    }

    pub fn variables(&self) -> Vec<Variable> {
        self.0
            .get("variables")
            .and_then(Value::as_array)
            .map(|vars| {
                vars.iter()
                    .filter_map(|v| serde_json::from_value(v.clone()).ok())
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn variable(&self, env_variable: &str) -> Option<Variable> {
        self.variables()
            .into_iter()
            .find(|v| v.env_variable == env_variable)
    }

    /// Names of the minimum deployment fields this document lacks or has with
    /// the wrong shape.
    pub fn missing_required_fields(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if self.startup().is_none() {
            missing.push("startup");
        }
        if self.docker_images().is_none() {
            missing.push("docker_images");
        }
        if self.meta().is_none() {
            missing.push("meta");
        }
        let variables_ok = self
            .0
            .get("variables")
            .and_then(Value::as_array)
            .map(|vars| {
                vars.iter().all(|v| {
                    ["name", "env_variable", "default_value"]
                        .iter()
                        .all(|k| v.get(k).is_some())
                })
            })
            .unwrap_or(false);
        if !variables_ok {
            missing.push("variables");
        }
        missing
    }

    pub fn to_json_pretty(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(&self.0)
    }

    pub fn to_yaml(&self) -> anyhow::Result<String> {
        serde_yaml::to_string(&self.0).context("Failed to serialize descriptor to YAML")
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let write_err = |message: String| DeployError::Write {
            path: path.to_path_buf(),
            message,
        };

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| write_err(e.to_string()))?;
        }
        let json = self.to_json_pretty().map_err(|e| write_err(e.to_string()))?;
        fs::write(path, json).map_err(|e| write_err(e.to_string()))
    }
}

impl From<Value> for Descriptor {
    fn from(value: Value) -> Self {
        Self(value)
    }
}

impl fmt::Display for Descriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.to_yaml() {
            Ok(yaml) => write!(f, "{}", yaml),
            Err(e) => write!(f, "Error formatting descriptor: {}", e),
        }
    }
}
