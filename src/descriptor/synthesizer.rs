use super::image::runtime_image;
use super::template::{Placeholder, Template};
use super::Descriptor;
use crate::error::{DeployError, Result};
use crate::loader::{GameVersion, LoaderFamily, LoaderIdentity, StartupStrategy};
use chrono::{DateTime, SecondsFormat, Utc};
use std::collections::BTreeMap;
use tracing::{debug, info};

pub const DEFAULT_AUTHOR_EMAIL: &str = "pterodeploy@generated.com";

/// Release lines that get the larger memory allowance.
const RECENT_RELEASE_LINES: &[(u32, u32)] = &[(1, 20), (1, 21)];

const BASE_JVM_FLAGS: &[&str] = &[
    "-XX:+UseG1GC",
    "-XX:MaxGCPauseMillis=200",
    "-Dfml.queryResult=confirm",
];

/// Only understood by runtimes from Java 17 on.
const MODERN_JVM_FLAG: &str = "-XX:+ParallelRefProcEnabled";

/// Default heap bounds in megabytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MemoryBounds {
    pub min_mb: u32,
    pub max_mb: u32,
}

impl MemoryBounds {
    pub fn for_identity(identity: &LoaderIdentity) -> Self {
        let (mut min_mb, mut max_mb) = if identity.family().is_forge_like() {
            (4096, 8192)
        } else {
            (2048, 6144)
        };

        let recent = GameVersion::parse(identity.target_runtime_version())
            .map(|v| RECENT_RELEASE_LINES.contains(&v.release_line()))
            .unwrap_or(false);
        if recent {
            min_mb += 1024;
            max_mb += 2048;
        }

        Self { min_mb, max_mb }
    }
}

/// JVM flags for a managed runtime version, space separated.
pub fn jvm_flags(managed_runtime_version: u8) -> String {
    let mut flags: Vec<&str> = BASE_JVM_FLAGS.to_vec();
    if managed_runtime_version >= 17 {
        flags.insert(1, MODERN_JVM_FLAG);
    }
    flags.join(" ")
}

/// Arguments that follow `java <flags>` in the startup line.
pub fn launch_target(identity: &LoaderIdentity) -> String {
    let game = identity.target_runtime_version();
    let loader = identity.loader_version().unwrap_or("unknown");

    match (identity.startup_strategy(), identity.family()) {
        (StartupStrategy::Legacy, _) => {
            format!("-jar forge-{}-{}-universal.jar nogui", game, loader)
        }
        (StartupStrategy::Modern, LoaderFamily::Forge) => format!(
            "@user_jvm_args.txt @libraries/net/minecraftforge/forge/{}-{}/unix_args.txt --nogui",
            game, loader
        ),
        (StartupStrategy::Modern, LoaderFamily::NeoForge) => format!(
            "@user_jvm_args.txt @libraries/net/neoforged/neoforge/{}/unix_args.txt --nogui",
            loader
        ),
        (StartupStrategy::FabricStyle, family) => {
            format!("-jar {}-server-launch.jar nogui", family.as_str())
        }
        (StartupStrategy::Modern, _) => "-jar server.jar nogui".to_string(),
    }
}

/// Human-readable pack name from a download locator: the last path segment
/// without query, fragment or file extension.
pub fn display_name_from_locator(source_locator: &str) -> Option<String> {
    let path = source_locator
        .split(['?', '#'])
        .next()
        .unwrap_or_default()
        .trim_end_matches(['/', '\\']);
    let segment = path.rsplit(['/', '\\']).next()?;
    let stem = match segment.rsplit_once('.') {
        Some((stem, _)) if !stem.is_empty() => stem,
        _ => segment,
    };
    let name = stem.replace("%20", " ").replace(['_', '+'], " ");
    let name = name.trim();
    (!name.is_empty() && !name.contains(':')).then(|| name.to_string())
}

/// Fills a descriptor template from a loader identity.
///
/// Synthesis is deterministic: with a fixed export date the same identity,
/// locator and template always produce the same descriptor.
#[derive(Debug, Clone)]
pub struct Synthesizer {
    author_email: String,
    display_name: Option<String>,
    export_date: Option<DateTime<Utc>>,
}

impl Default for Synthesizer {
    fn default() -> Self {
        Self::new()
    }
}

impl Synthesizer {
    pub fn new() -> Self {
        Self {
            author_email: DEFAULT_AUTHOR_EMAIL.to_string(),
            display_name: None,
            export_date: None,
        }
    }

    pub fn with_author_email(mut self, email: impl Into<String>) -> Self {
        self.author_email = email.into();
        self
    }

    /// Overrides the name otherwise derived from the source locator.
    pub fn with_display_name(mut self, name: impl Into<String>) -> Self {
        self.display_name = Some(name.into());
        self
    }

    /// Pins the export timestamp instead of reading the clock.
    pub fn with_export_date(mut self, date: DateTime<Utc>) -> Self {
        self.export_date = Some(date);
        self
    }

    pub fn display_name(&self) -> Option<&str> {
        self.display_name.as_deref()
    }

    /// The explicit display name, else one derived from the locator.
    pub fn display_name_for(&self, source_locator: &str) -> String {
        self.display_name
            .clone()
            .or_else(|| display_name_from_locator(source_locator))
            .unwrap_or_else(|| "Modpack".to_string())
    }

    pub fn placeholder_values(
        &self,
        identity: &LoaderIdentity,
        source_locator: &str,
    ) -> BTreeMap<Placeholder, String> {
        let java = identity.managed_runtime_version();
        let memory = MemoryBounds::for_identity(identity);
        let game = identity.target_runtime_version();
        let display_name = self.display_name_for(source_locator);

        let description = match identity.loader_version() {
            Some(version) => format!(
                "{} modpack - {} {}",
                display_name,
                identity.family().display_name(),
                version
            ),
            None => format!(
                "{} modpack - {}",
                display_name,
                identity.family().display_name()
            ),
        };

        let export_date = self
            .export_date
            .unwrap_or_else(Utc::now)
            .to_rfc3339_opts(SecondsFormat::Secs, true);

        BTreeMap::from([
            (Placeholder::ExportDate, export_date),
            (
                Placeholder::ModpackName,
                format!("{} ({})", display_name, game),
            ),
            (Placeholder::AuthorEmail, self.author_email.clone()),
            (Placeholder::ModpackDescription, description),
            (Placeholder::ModpackDisplayName, display_name),
            (Placeholder::ModpackUrl, source_locator.to_string()),
            (Placeholder::DefaultMaxMemory, memory.max_mb.to_string()),
            (Placeholder::DefaultMinMemory, memory.min_mb.to_string()),
            (Placeholder::DefaultJvmArgs, jvm_flags(java)),
            (Placeholder::DefaultLauncherTarget, launch_target(identity)),
            (
                Placeholder::DefaultModloaderType,
                identity.family().as_str().to_string(),
            ),
            (
                Placeholder::DefaultModloaderVersion,
                identity.loader_version().unwrap_or_default().to_string(),
            ),
            (Placeholder::JavaVersionName, format!("Java {}", java)),
            (Placeholder::DockerImage, runtime_image(java)),
        ])
    }

    pub fn synthesize(
        &self,
        identity: &LoaderIdentity,
        source_locator: &str,
        template: &Template,
    ) -> Result<Descriptor> {
        let values = self.placeholder_values(identity, source_locator);
        debug!(tokens = ?template.tokens(), "Substituting template placeholders");

        let descriptor = Descriptor::from_value(template.render(&values)?);

        let missing = descriptor.missing_required_fields();
        if !missing.is_empty() {
            return Err(DeployError::TemplateMalformed(format!(
                "rendered descriptor is missing required fields: {}",
                missing.join(", ")
            )));
        }

        info!(
            identity = %identity,
            image = %runtime_image(identity.managed_runtime_version()),
            "Synthesized descriptor"
        );
        Ok(descriptor)
    }
}
