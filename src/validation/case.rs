use crate::loader::LoaderFamily;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// A bundle with a known-good descriptor and the identity it should resolve to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReferenceCase {
    pub name: String,
    pub bundle_dir: PathBuf,
    pub reference_path: PathBuf,
    /// Locator handed to synthesis; defaults to a `file://` URL of the bundle.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_locator: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expected_family: Option<LoaderFamily>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expected_runtime_version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expected_managed_runtime: Option<u8>,
    #[serde(default)]
    pub description: String,
}

impl ReferenceCase {
    pub fn new(
        name: impl Into<String>,
        bundle_dir: impl Into<PathBuf>,
        reference_path: impl Into<PathBuf>,
    ) -> Self {
        Self {
            name: name.into(),
            bundle_dir: bundle_dir.into(),
            reference_path: reference_path.into(),
            source_locator: None,
            expected_family: None,
            expected_runtime_version: None,
            expected_managed_runtime: None,
            description: String::new(),
        }
    }

    pub fn expecting(
        mut self,
        family: LoaderFamily,
        runtime_version: impl Into<String>,
        managed_runtime: u8,
    ) -> Self {
        self.expected_family = Some(family);
        self.expected_runtime_version = Some(runtime_version.into());
        self.expected_managed_runtime = Some(managed_runtime);
        self
    }

    pub fn with_source_locator(mut self, locator: impl Into<String>) -> Self {
        self.source_locator = Some(locator.into());
        self
    }

    pub fn source_locator(&self) -> String {
        self.source_locator
            .clone()
            .unwrap_or_else(|| format!("file://{}", self.bundle_dir.display()))
    }

    /// Resolves relative paths against `base`.
    pub fn rooted_at(mut self, base: &Path) -> Self {
        if self.bundle_dir.is_relative() {
            self.bundle_dir = base.join(&self.bundle_dir);
        }
        if self.reference_path.is_relative() {
            self.reference_path = base.join(&self.reference_path);
        }
        self
    }
}

/// Loads a YAML list of cases. Relative paths resolve against the file's directory.
pub fn load_cases(path: impl AsRef<Path>) -> Result<Vec<ReferenceCase>> {
    let path = path.as_ref();
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read case file {}", path.display()))?;
    let cases: Vec<ReferenceCase> = serde_yaml::from_str(&content)
        .with_context(|| format!("Failed to parse case file {}", path.display()))?;

    let base = path.parent().unwrap_or_else(|| Path::new("."));
    Ok(cases.into_iter().map(|c| c.rooted_at(base)).collect())
}
