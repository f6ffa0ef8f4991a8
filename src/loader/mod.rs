//! Mod loader identity and resolution

pub mod identity;
pub mod resolver;
pub mod version;

pub use identity::{LoaderFamily, LoaderIdentity, StartupStrategy};
pub use resolver::{parse_loader_id, LoaderResolver, DEFAULT_TARGET_RUNTIME_VERSION};
pub use version::{managed_runtime_version, GameVersion};
