//! pterodeploy - modpack bundle analysis and Pterodactyl egg synthesis
//!
//! Turns an extracted Minecraft server bundle into a deployment descriptor
//! (a Pterodactyl "egg") and validates descriptors against known-good
//! references.
//!
//! # Core Concepts
//!
//! - **Bundle inspection**: walks an extracted bundle and collects identifying
//!   signals (manifest, installer jars, launch artifacts, startup scripts,
//!   configuration trees)
//! - **Loader resolution**: a fixed-precedence decision table that turns those
//!   signals into a [`LoaderIdentity`] (family, versions, Java version,
//!   startup strategy)
//! - **Synthesis**: fills a placeholder template to produce a [`Descriptor`]
//! - **Comparison**: normalizes and diffs a descriptor against a reference,
//!   separating critical mismatches from cosmetic differences
//!
//! # Example Usage
//!
//! ```no_run
//! use pterodeploy::{DeployConfig, DeployPipeline};
//! use std::path::Path;
//!
//! # fn main() -> anyhow::Result<()> {
//! pterodeploy::init_from_env();
//!
//! let pipeline = DeployPipeline::new(DeployConfig::from_env()?);
//! let output = pipeline.run(Path::new("extracted/atm9"), "https://example.com/atm9.zip")?;
//! println!("{}", output.identity);
//! pipeline.persist(&output.descriptor, &output.display_name)?;
//! # Ok(())
//! # }
//! ```

pub mod bundle;
pub mod compare;
pub mod config;
pub mod descriptor;
pub mod error;
pub mod fs;
pub mod loader;
pub mod pipeline;
pub mod progress;
pub mod util;
pub mod validation;

pub use bundle::{BundleInspector, BundleSignals, FileTree, PackManifest, ScanConfig};
pub use compare::{ComparisonVerdict, DescriptorComparator, Difference};
pub use config::{ConfigError, DeployConfig};
pub use descriptor::{Descriptor, Placeholder, Synthesizer, Template};
pub use error::DeployError;
pub use loader::{LoaderFamily, LoaderIdentity, LoaderResolver, StartupStrategy};
pub use pipeline::{DeployPipeline, PipelineOutput};
pub use progress::{LoggingHandler, ProgressEvent, ProgressHandler};
pub use util::{init_default, init_from_env, init_logging, LoggingConfig};
pub use validation::{CaseOutcome, ReferenceCase, SuiteSummary, ValidationRunner};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");
