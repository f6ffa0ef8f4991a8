//! Configuration management for pterodeploy
//!
//! Settings are loaded from environment variables with sensible defaults.
//!
//! # Environment Variables
//!
//! - `PTERODEPLOY_TEMPLATE_PATH`: Descriptor template - default: "assets/egg_template.json"
//! - `PTERODEPLOY_OUTPUT_DIR`: Where generated descriptors are written - default: "generated_eggs"
//! - `PTERODEPLOY_AUTHOR_EMAIL`: Author placed in generated descriptors - default: "pterodeploy@generated.com"
//! - `PTERODEPLOY_LOG_LEVEL`: Logging level - default: "info"
//! - `PTERODEPLOY_MAX_SCAN_DEPTH`: Directory depth scanned in a bundle - default: "16"
//! - `PTERODEPLOY_MAX_SCAN_FILES`: File count cap per bundle - default: "50000"
//!
//! # Example
//!
//! ```no_run
//! use pterodeploy::DeployConfig;
//!
//! let config = DeployConfig::default();
//! config.validate().expect("Invalid configuration");
//! println!("{}", config);
//! ```

use crate::bundle::ScanConfig;
use crate::descriptor::synthesizer::DEFAULT_AUTHOR_EMAIL;
use std::env;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use thiserror::Error;

const DEFAULT_TEMPLATE_PATH: &str = "assets/egg_template.json";
const DEFAULT_OUTPUT_DIR: &str = "generated_eggs";
const DEFAULT_LOG_LEVEL: &str = "info";
const DEFAULT_MAX_SCAN_DEPTH: usize = 16;
const DEFAULT_MAX_SCAN_FILES: usize = 50_000;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration validation failed: {0}")]
    ValidationFailed(String),

    #[error("Failed to parse {field}: {error}")]
    ParseError { field: String, error: String },
}

#[derive(Debug, Clone)]
pub struct DeployConfig {
    pub template_path: PathBuf,
    pub output_dir: PathBuf,
    pub author_email: String,
    /// Logging level (trace, debug, info, warn, error)
    pub log_level: String,
    pub max_scan_depth: usize,
    pub max_scan_files: usize,
}

impl Default for DeployConfig {
    /// Reads `PTERODEPLOY_*` variables, falling back to defaults for anything
    /// missing or unparseable.
    fn default() -> Self {
        let template_path = env::var("PTERODEPLOY_TEMPLATE_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(DEFAULT_TEMPLATE_PATH));

        let output_dir = env::var("PTERODEPLOY_OUTPUT_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(DEFAULT_OUTPUT_DIR));

        let author_email = env::var("PTERODEPLOY_AUTHOR_EMAIL")
            .unwrap_or_else(|_| DEFAULT_AUTHOR_EMAIL.to_string());

        let log_level = env::var("PTERODEPLOY_LOG_LEVEL")
            .unwrap_or_else(|_| DEFAULT_LOG_LEVEL.to_string())
            .to_lowercase();

        let max_scan_depth = env::var("PTERODEPLOY_MAX_SCAN_DEPTH")
            .ok()
            .and_then(|v| v.parse::<usize>().ok())
            .unwrap_or(DEFAULT_MAX_SCAN_DEPTH);

        let max_scan_files = env::var("PTERODEPLOY_MAX_SCAN_FILES")
            .ok()
            .and_then(|v| v.parse::<usize>().ok())
            .unwrap_or(DEFAULT_MAX_SCAN_FILES);

        Self {
            template_path,
            output_dir,
            author_email,
            log_level,
            max_scan_depth,
            max_scan_files,
        }
    }
}

fn parse_env<T>(key: &str) -> Result<Option<T>, ConfigError>
where
    T: FromStr,
    T::Err: fmt::Display,
{
    match env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .map(Some)
            .map_err(|e| ConfigError::ParseError {
                field: key.to_string(),
                error: e.to_string(),
            }),
        Err(_) => Ok(None),
    }
}

impl DeployConfig {
    /// Like `default()`, but an unparseable numeric variable is an error and the
    /// result is validated.
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut config = Self::default();
        if let Some(depth) = parse_env("PTERODEPLOY_MAX_SCAN_DEPTH")? {
            config.max_scan_depth = depth;
        }
        if let Some(files) = parse_env("PTERODEPLOY_MAX_SCAN_FILES")? {
            config.max_scan_files = files;
        }
        config.validate()?;
        Ok(config)
    }

    /// Validates the configuration
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::ValidationFailed` for an empty author email, an
    /// unknown log level, a scan depth outside 2..=64 or a zero file limit.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.author_email.trim().is_empty() {
            return Err(ConfigError::ValidationFailed(
                "Author email cannot be empty".to_string(),
            ));
        }

        // Bundles need at least the root plus one nested level
        if !(2..=64).contains(&self.max_scan_depth) {
            return Err(ConfigError::ValidationFailed(format!(
                "Max scan depth must be between 2 and 64, got {}",
                self.max_scan_depth
            )));
        }

        if self.max_scan_files == 0 {
            return Err(ConfigError::ValidationFailed(
                "Max scan files must be at least 1".to_string(),
            ));
        }

        match self.log_level.as_str() {
            "trace" | "debug" | "info" | "warn" | "error" => {}
            _ => {
                return Err(ConfigError::ValidationFailed(format!(
                    "Invalid log level: {}. Valid options: trace, debug, info, warn, error",
                    self.log_level
                )))
            }
        }

        Ok(())
    }

    pub fn scan_config(&self) -> ScanConfig {
        ScanConfig {
            max_depth: self.max_scan_depth,
            max_files: self.max_scan_files,
        }
    }

    /// Output file for a pack: `<output_dir>/<slug>_egg.json`.
    pub fn output_path(&self, display_name: &str) -> PathBuf {
        self.output_dir.join(format!("{}_egg.json", slug(display_name)))
    }
}

/// Lowercased, filesystem-safe file stem for a pack name.
pub fn slug(name: &str) -> String {
    let slug = name
        .trim()
        .to_lowercase()
        .replace(['/', '\\', ':', '*', '?', '"', '<', '>', '|'], "_")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("_");
    if slug.is_empty() {
        "modpack".to_string()
    } else {
        slug
    }
}

impl fmt::Display for DeployConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Pterodeploy Configuration:")?;
        writeln!(f, "  Template: {}", self.template_path.display())?;
        writeln!(f, "  Output Dir: {}", self.output_dir.display())?;
        writeln!(f, "  Author Email: {}", self.author_email)?;
        writeln!(f, "  Log Level: {}", self.log_level)?;
        writeln!(f, "  Max Scan Depth: {}", self.max_scan_depth)?;
        writeln!(f, "  Max Scan Files: {}", self.max_scan_files)?;
        Ok(())
    }
}
