use super::difference::{ComparisonVerdict, Difference};
use crate::descriptor::{runtime_label_from_image, Descriptor};
use serde_json::{Map, Value};
use std::collections::BTreeSet;
use tracing::debug;

/// A verdict needs a score strictly above this to match.
pub const DEFAULT_MATCH_THRESHOLD: f64 = 0.8;

/// Environment key of the variable holding the bundle download URL.
pub const SOURCE_URL_ENV: &str = "SERVER_PACK_URL";

const IGNORED_PATHS: &[&str] = &["exported_at", "_comment", "meta.update_url", "author"];

const CRITICAL_PATHS: &[&str] = &[
    "startup",
    "docker_images",
    "scripts.installation.script",
    "variables[name='Memory'].default_value",
    "variables[name='Startup Memory'].default_value",
];

const NORMALIZED: &str = "NORMALIZED";
const NORMALIZED_URL: &str = "NORMALIZED_URL";

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
enum ImageLabel {
    Runtime(u8),
    Unknown(String),
}

/// Compares candidate descriptors against references.
///
/// Holds configuration only; `compare` is a pure function of its two inputs.
#[derive(Debug, Clone)]
pub struct DescriptorComparator {
    ignored_paths: Vec<String>,
    critical_paths: Vec<String>,
    match_threshold: f64,
    source_url_env: String,
}

impl Default for DescriptorComparator {
    fn default() -> Self {
        Self::new()
    }
}

impl DescriptorComparator {
    pub fn new() -> Self {
        Self {
            ignored_paths: IGNORED_PATHS.iter().map(|p| p.to_string()).collect(),
            critical_paths: CRITICAL_PATHS.iter().map(|p| p.to_string()).collect(),
            match_threshold: DEFAULT_MATCH_THRESHOLD,
            source_url_env: SOURCE_URL_ENV.to_string(),
        }
    }

    pub fn with_match_threshold(mut self, threshold: f64) -> Self {
        self.match_threshold = threshold;
        self
    }

    /// Excludes a dotted path from diffing and field counting.
    pub fn with_ignored_path(mut self, path: impl Into<String>) -> Self {
        self.ignored_paths.push(path.into());
        self
    }

    /// Promotes any difference whose path contains `name` to critical.
    pub fn with_critical_path(mut self, name: impl Into<String>) -> Self {
        self.critical_paths.push(name.into());
        self
    }

    pub fn with_source_url_env(mut self, env_variable: impl Into<String>) -> Self {
        self.source_url_env = env_variable.into();
        self
    }

    pub fn compare(&self, candidate: &Descriptor, reference: &Descriptor) -> ComparisonVerdict {
        let candidate = self.normalize(candidate);
        let reference = self.normalize(reference);

        let mut critical = Vec::new();
        let mut cosmetic = Vec::new();

        let candidate_startup = candidate.startup().unwrap_or_default();
        let reference_startup = reference.startup().unwrap_or_default();
        if !Self::startup_commands_compatible(candidate_startup, reference_startup) {
            critical.push(Difference::StartupIncompatible {
                candidate: candidate_startup.to_string(),
                reference: reference_startup.to_string(),
            });
        }

        let candidate_images = images_of(&candidate);
        let reference_images = images_of(&reference);
        if !Self::docker_images_compatible(&candidate_images, &reference_images) {
            critical.push(Difference::ImageIncompatible {
                candidate: candidate_images.to_string(),
                reference: reference_images.to_string(),
            });
        }

        for difference in self.diff(candidate.as_value(), reference.as_value()) {
            if self.is_critical(&difference) {
                critical.push(difference);
            } else {
                cosmetic.push(difference);
            }
        }

        let total_fields = self.count_fields(reference.as_value());
        let total_differences = critical.len() + cosmetic.len();
        let score = if total_fields == 0 {
            0.0
        } else {
            ((total_fields as f64 - total_differences as f64) / total_fields as f64).max(0.0)
        };

        let verdict = ComparisonVerdict {
            matches: critical.is_empty() && score > self.match_threshold,
            score,
            critical_mismatches: critical,
            cosmetic_differences: cosmetic,
        };

        debug!(
            matches = verdict.matches,
            score = verdict.score,
            critical = verdict.critical_mismatches.len(),
            cosmetic = verdict.cosmetic_differences.len(),
            total_fields,
            "Compared descriptors"
        );
        verdict
    }

    /// Copy of `descriptor` with volatile fields replaced by sentinels.
    pub fn normalize(&self, descriptor: &Descriptor) -> Descriptor {
        let mut value = descriptor.as_value().clone();

        if let Some(root) = value.as_object_mut() {
            if let Some(exported) = root.get_mut("exported_at") {
                *exported = Value::String(NORMALIZED.to_string());
            }
            root.remove("_comment");
            if let Some(update_url) = root
                .get_mut("meta")
                .and_then(Value::as_object_mut)
                .and_then(|meta| meta.get_mut("update_url"))
            {
                *update_url = Value::Null;
            }
            if let Some(author) = root.get_mut("author") {
                *author = Value::String(NORMALIZED.to_string());
            }

            let variables = root
                .get_mut("variables")
                .and_then(Value::as_array_mut)
                .into_iter()
                .flatten()
                .filter_map(Value::as_object_mut);
            for variable in variables {
                let bound_to_source = variable
                    .get("env_variable")
                    .and_then(Value::as_str)
                    .map(|env| env == self.source_url_env)
                    .unwrap_or(false);
                if !bound_to_source {
                    continue;
                }
                if let Some(default) = variable.get_mut("default_value") {
                    if default.as_str().is_some_and(|url| url.starts_with("http")) {
                        *default = Value::String(NORMALIZED_URL.to_string());
                    }
                }
            }
        }

        Descriptor::from_value(value)
    }

    /// Both lines must agree on carrying heap flags (`-Xms`/`-Xmx`) and on
    /// running headless. The flag values themselves may differ.
    pub fn startup_commands_compatible(candidate: &str, reference: &str) -> bool {
        let has_memory = |line: &str| {
            line.split_whitespace()
                .any(|t| t.contains("Xms") || t.contains("Xmx"))
        };
        let has_nogui = |line: &str| line.split_whitespace().any(|t| t.contains("nogui"));

        has_memory(candidate) == has_memory(reference)
            && has_nogui(candidate) == has_nogui(reference)
    }

    /// Images are compatible when they resolve to the same set of runtime
    /// versions. Images outside the `java_<N>` convention only match by exact
    /// string. When either side declares nothing, the two must be equal.
    pub fn docker_images_compatible(candidate: &Value, reference: &Value) -> bool {
        let candidate_labels = image_labels(candidate);
        let reference_labels = image_labels(reference);
        if candidate_labels.is_empty() || reference_labels.is_empty() {
            return candidate == reference;
        }
        candidate_labels == reference_labels
    }

    /// Structural differences between two documents, keys visited in sorted order.
    pub fn diff(&self, candidate: &Value, reference: &Value) -> Vec<Difference> {
        let mut out = Vec::new();
        self.diff_into(candidate, reference, "", &mut out);
        out
    }

    fn diff_into(&self, candidate: &Value, reference: &Value, path: &str, out: &mut Vec<Difference>) {
        match (candidate, reference) {
            (Value::Object(c), Value::Object(r)) => {
                let keys: BTreeSet<&String> = c.keys().chain(r.keys()).collect();
                for key in keys {
                    let child = key_path(path, key);
                    if self.is_ignored(&child) {
                        continue;
                    }
                    match (c.get(key), r.get(key)) {
                        (None, Some(_)) => out.push(Difference::MissingKey { path: child }),
                        (Some(_), None) => out.push(Difference::ExtraKey { path: child }),
                        (Some(cv), Some(rv)) => self.diff_into(cv, rv, &child, out),
                        (None, None) => {}
                    }
                }
            }
            (Value::Array(c), Value::Array(r)) => {
                if c.len() != r.len() {
                    out.push(Difference::LengthMismatch {
                        path: path.to_string(),
                        candidate: c.len(),
                        reference: r.len(),
                    });
                    return;
                }
                for (index, (cv, rv)) in c.iter().zip(r).enumerate() {
                    self.diff_into(cv, rv, &element_path(path, index, rv), out);
                }
            }
            _ if candidate != reference => {
                out.push(Difference::value_mismatch(path, candidate, reference));
            }
            _ => {}
        }
    }

    /// Counts every mapping entry and every leaf, skipping ignored paths.
    pub fn count_fields(&self, value: &Value) -> usize {
        self.count_fields_at(value, "")
    }

    fn count_fields_at(&self, value: &Value, path: &str) -> usize {
        match value {
            Value::Object(map) => map
                .iter()
                .map(|(key, child)| (key_path(path, key), child))
                .filter(|(child_path, _)| !self.is_ignored(child_path))
                .map(|(child_path, child)| 1 + self.count_fields_at(child, &child_path))
                .sum(),
            Value::Array(items) => items
                .iter()
                .enumerate()
                .map(|(index, item)| self.count_fields_at(item, &element_path(path, index, item)))
                .sum(),
            _ => 1,
        }
    }

    fn is_ignored(&self, path: &str) -> bool {
        self.ignored_paths.iter().any(|p| p == path)
    }

    fn is_critical(&self, difference: &Difference) -> bool {
        match difference.path() {
            None => true,
            Some(path) => self.critical_paths.iter().any(|name| path.contains(name.as_str())),
        }
    }
}

fn images_of(descriptor: &Descriptor) -> Value {
    descriptor
        .as_value()
        .get("docker_images")
        .cloned()
        .unwrap_or_else(|| Value::Object(Map::new()))
}

fn image_labels(images: &Value) -> BTreeSet<ImageLabel> {
    let values: Vec<&Value> = match images {
        Value::Object(map) => map.values().collect(),
        Value::Array(items) => items.iter().collect(),
        Value::Null => Vec::new(),
        other => vec![other],
    };

    values
        .into_iter()
        .map(|image| match image.as_str() {
            Some(name) => runtime_label_from_image(name)
                .map(ImageLabel::Runtime)
                .unwrap_or_else(|| ImageLabel::Unknown(name.to_string())),
            None => ImageLabel::Unknown(image.to_string()),
        })
        .collect()
}

fn key_path(parent: &str, key: &str) -> String {
    if parent.is_empty() {
        key.to_string()
    } else {
        format!("{}.{}", parent, key)
    }
}

/// `variables[name='Memory']` for named mappings, `variables[3]` otherwise.
fn element_path(parent: &str, index: usize, reference_element: &Value) -> String {
    match reference_element.get("name").and_then(Value::as_str) {
        Some(name) => format!("{}[name='{}']", parent, name),
        None => format!("{}[{}]", parent, index),
    }
}
