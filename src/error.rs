use std::path::PathBuf;
use thiserror::Error;

/// Errors raised by bundle inspection, loader resolution and descriptor synthesis.
///
/// Every variant is deterministic for a given input: replaying the same bundle
/// and template reproduces the same error.
#[derive(Error, Debug)]
pub enum DeployError {
    #[error("Bundle path does not exist: {}", .0.display())]
    BundleNotFound(PathBuf),

    #[error("Bundle path is not a directory: {}", .0.display())]
    NotADirectory(PathBuf),

    #[error("Failed to read {}: {message}", .path.display())]
    Read { path: PathBuf, message: String },

    #[error("Failed to write {}: {message}", .path.display())]
    Write { path: PathBuf, message: String },

    #[error("Malformed manifest {}: {source}", .path.display())]
    MalformedManifest {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Could not resolve mod loader: {0}")]
    UnresolvableLoader(String),

    #[error("Template not found: {}", .0.display())]
    TemplateMissing(PathBuf),

    #[error("Malformed template: {0}")]
    TemplateMalformed(String),

    #[error("Unresolved placeholders after substitution: {}", .tokens.join(", "))]
    PlaceholderSubstitution { tokens: Vec<String> },
}

impl DeployError {
    pub fn unresolvable(reason: impl Into<String>) -> Self {
        DeployError::UnresolvableLoader(reason.into())
    }

    /// True for errors caused by the bundle contents rather than the template or disk.
    pub fn is_bundle_error(&self) -> bool {
        matches!(
            self,
            DeployError::MalformedManifest { .. } | DeployError::UnresolvableLoader(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, DeployError>;
