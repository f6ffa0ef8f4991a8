//! Structured logging setup for pterodeploy
//!
//! Builds a `tracing-subscriber` registry with an `EnvFilter` and either the
//! pretty console formatter or the JSON formatter. Initialization happens at
//! most once per process; later calls are no-ops.
//!
//! # Example
//!
//! ```no_run
//! use pterodeploy::util::logging;
//!
//! // PTERODEPLOY_LOG_LEVEL=debug PTERODEPLOY_LOG_JSON=true
//! logging::init_from_env();
//!
//! tracing::info!(bundle = "atm9", "Inspecting bundle");
//! ```

use crate::config::DeployConfig;
use std::env;
use std::sync::Once;
use tracing::Level;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

static INIT: Once = Once::new();

/// Crates whose debug output drowns ours when `RUST_LOG` is unset.
const QUIET_TARGETS: &[&str] = &["ignore=warn", "globset=warn"];

#[derive(Debug, Clone)]
pub struct LoggingConfig {
    pub level: Level,

    /// JSON lines instead of the human-readable console format
    pub use_json: bool,

    /// Include the module target (e.g. `pterodeploy::loader::resolver`)
    pub include_target: bool,

    /// Include file and line number
    pub include_location: bool,

    pub include_thread_ids: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: Level::INFO,
            use_json: false,
            include_target: true,
            include_location: false,
            include_thread_ids: false,
        }
    }
}

impl LoggingConfig {
    pub fn with_level(level: Level) -> Self {
        Self {
            level,
            ..Default::default()
        }
    }

    /// JSON output with location and thread metadata, for log collectors.
    pub fn production() -> Self {
        Self {
            level: Level::INFO,
            use_json: true,
            include_target: true,
            include_location: true,
            include_thread_ids: true,
        }
    }

    pub fn development() -> Self {
        Self::with_level(Level::DEBUG)
    }

    pub fn from_deploy_config(config: &DeployConfig) -> Self {
        Self::with_level(parse_level(&config.log_level))
    }
}

/// Parses a level name case-insensitively; anything unknown is `INFO`.
///
/// ```
/// use pterodeploy::util::logging::parse_level;
/// use tracing::Level;
///
/// assert_eq!(parse_level("Debug"), Level::DEBUG);
/// assert_eq!(parse_level("loud"), Level::INFO);
/// ```
pub fn parse_level(level_str: &str) -> Level {
    match level_str.trim().to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" | "warning" => Level::WARN,
        "error" => Level::ERROR,
        _ => {
            eprintln!(
                "Invalid log level '{}', defaulting to INFO. Valid levels: trace, debug, info, warn, error",
                level_str
            );
            Level::INFO
        }
    }
}

fn build_filter(level: Level) -> EnvFilter {
    let mut directives = vec![format!("pterodeploy={}", level)];
    if env::var("RUST_LOG").is_err() {
        directives.extend(QUIET_TARGETS.iter().map(|d| d.to_string()));
    }

    directives
        .iter()
        .filter_map(|d| d.parse().ok())
        .fold(EnvFilter::from_default_env(), |filter, directive| {
            filter.add_directive(directive)
        })
}

/// Installs the global subscriber. Only the first call in a process has any
/// effect, and a subscriber installed elsewhere is left in place.
pub fn init_logging(config: LoggingConfig) {
    INIT.call_once(|| {
        let filter = build_filter(config.level);

        let result = if config.use_json {
            tracing_subscriber::registry()
                .with(filter)
                .with(
                    fmt::layer()
                        .json()
                        .with_target(config.include_target)
                        .with_file(config.include_location)
                        .with_line_number(config.include_location)
                        .with_thread_ids(config.include_thread_ids)
                        .with_thread_names(config.include_thread_ids),
                )
                .try_init()
        } else {
            tracing_subscriber::registry()
                .with(filter)
                .with(
                    fmt::layer()
                        .with_target(config.include_target)
                        .with_file(config.include_location)
                        .with_line_number(config.include_location)
                        .with_thread_ids(config.include_thread_ids)
                        .with_thread_names(config.include_thread_ids),
                )
                .try_init()
        };

        if let Err(e) = result {
            eprintln!("Logging already initialized: {}", e);
        }
    });
}

pub fn init_default() {
    init_logging(LoggingConfig::default());
}

/// Reads `PTERODEPLOY_LOG_LEVEL` and `PTERODEPLOY_LOG_JSON`; `RUST_LOG` still
/// applies on top.
pub fn init_from_env() {
    let level_str = env::var("PTERODEPLOY_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

    let use_json = env::var("PTERODEPLOY_LOG_JSON")
        .ok()
        .and_then(|v| v.parse::<bool>().ok())
        .unwrap_or(false);

    init_logging(LoggingConfig {
        level: parse_level(&level_str),
        use_json,
        ..Default::default()
    });
}
