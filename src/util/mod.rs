//! Utility modules for pterodeploy

pub mod logging;
pub(crate) mod serde_helpers;

pub use logging::{init_default, init_from_env, init_logging, LoggingConfig};
