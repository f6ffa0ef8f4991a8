use crate::error::{DeployError, Result};
use regex::Regex;
use serde_json::Value;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

/// Substitution tokens a descriptor template may contain, written as
/// `{{{NAME}}}` anywhere in the document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Placeholder {
    ExportDate,
    ModpackName,
    AuthorEmail,
    ModpackDescription,
    ModpackDisplayName,
    ModpackUrl,
    DefaultMaxMemory,
    DefaultMinMemory,
    DefaultJvmArgs,
    DefaultLauncherTarget,
    DefaultModloaderType,
    DefaultModloaderVersion,
    JavaVersionName,
    DockerImage,
}

impl Placeholder {
    pub const ALL: [Placeholder; 14] = [
        Placeholder::ExportDate,
        Placeholder::ModpackName,
        Placeholder::AuthorEmail,
        Placeholder::ModpackDescription,
        Placeholder::ModpackDisplayName,
        Placeholder::ModpackUrl,
        Placeholder::DefaultMaxMemory,
        Placeholder::DefaultMinMemory,
        Placeholder::DefaultJvmArgs,
        Placeholder::DefaultLauncherTarget,
        Placeholder::DefaultModloaderType,
        Placeholder::DefaultModloaderVersion,
        Placeholder::JavaVersionName,
        Placeholder::DockerImage,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Placeholder::ExportDate => "EXPORT_DATE",
            Placeholder::ModpackName => "MODPACK_NAME",
            Placeholder::AuthorEmail => "AUTHOR_EMAIL",
            Placeholder::ModpackDescription => "MODPACK_DESCRIPTION",
            Placeholder::ModpackDisplayName => "MODPACK_DISPLAY_NAME",
            Placeholder::ModpackUrl => "MODPACK_URL",
            Placeholder::DefaultMaxMemory => "DEFAULT_MAX_MEMORY",
            Placeholder::DefaultMinMemory => "DEFAULT_MIN_MEMORY",
            Placeholder::DefaultJvmArgs => "DEFAULT_JVM_ARGS",
            Placeholder::DefaultLauncherTarget => "DEFAULT_LAUNCHER_TARGET",
            Placeholder::DefaultModloaderType => "DEFAULT_MODLOADER_TYPE",
            Placeholder::DefaultModloaderVersion => "DEFAULT_MODLOADER_VERSION",
            Placeholder::JavaVersionName => "JAVA_VERSION_NAME",
            Placeholder::DockerImage => "DOCKER_IMAGE",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|p| p.name() == name)
    }

    pub fn token(&self) -> String {
        format!("{{{{{{{}}}}}}}", self.name())
    }
}

impl fmt::Display for Placeholder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.token())
    }
}

fn token_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\{\{\{([A-Z0-9_]+)\}\}\}").expect("valid regex"))
}

/// Every distinct `{{{NAME}}}` token in `text`, in sorted order.
pub fn find_tokens(text: &str) -> BTreeSet<String> {
    token_regex()
        .find_iter(text)
        .map(|m| m.as_str().to_string())
        .collect()
}

/// Escapes a value for insertion inside a JSON string literal.
fn json_escape(value: &str) -> String {
    let quoted = serde_json::Value::String(value.to_string()).to_string();
    quoted[1..quoted.len() - 1].to_string()
}

/// A parsed descriptor template.
///
/// Substitution runs over the serialized form of the document, so tokens are
/// replaced wherever they appear, keys included.
#[derive(Debug, Clone)]
pub struct Template {
    source: Option<PathBuf>,
    serialized: String,
}

impl Template {
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.is_file() {
            return Err(DeployError::TemplateMissing(path.to_path_buf()));
        }

        let content = fs::read_to_string(path).map_err(|e| DeployError::Read {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;

        let mut template = Self::from_json(&content)?;
        template.source = Some(path.to_path_buf());
        Ok(template)
    }

    pub fn from_json(content: &str) -> Result<Self> {
        let value: Value = serde_json::from_str(content)
            .map_err(|e| DeployError::TemplateMalformed(format!("invalid JSON: {}", e)))?;
        Self::from_value(value)
    }

    pub fn from_value(value: Value) -> Result<Self> {
        if !value.is_object() {
            return Err(DeployError::TemplateMalformed(
                "template root must be a JSON object".to_string(),
            ));
        }
        let serialized = serde_json::to_string(&value)
            .map_err(|e| DeployError::TemplateMalformed(e.to_string()))?;
        Ok(Self {
            source: None,
            serialized,
        })
    }

    pub fn source(&self) -> Option<&Path> {
        self.source.as_deref()
    }

    /// Tokens present in the template.
    pub fn tokens(&self) -> BTreeSet<String> {
        find_tokens(&self.serialized)
    }

    /// Replaces every placeholder with its value in a single pass and parses the
    /// result.
    ///
    /// Values are JSON-escaped so that quotes or backslashes in names cannot break
    /// the document. Any `{{{NAME}}}` left afterwards, whether unknown or without a
    /// value in `values`, is an error.
    pub fn render(&self, values: &BTreeMap<Placeholder, String>) -> Result<Value> {
        let rendered = token_regex().replace_all(&self.serialized, |caps: &regex::Captures| {
            Placeholder::from_name(&caps[1])
                .and_then(|p| values.get(&p))
                .map(|v| json_escape(v))
                .unwrap_or_else(|| caps[0].to_string())
        });

        let leftover = find_tokens(&rendered);
        if !leftover.is_empty() {
            return Err(DeployError::PlaceholderSubstitution {
                tokens: leftover.into_iter().collect(),
            });
        }

        serde_json::from_str(&rendered).map_err(|e| {
            DeployError::TemplateMalformed(format!("substituted template is not valid JSON: {}", e))
        })
    }
}
