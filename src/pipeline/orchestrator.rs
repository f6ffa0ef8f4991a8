use super::output::PipelineOutput;
use crate::bundle::{BundleInspector, BundleSignals, FileTree};
use crate::config::DeployConfig;
use crate::descriptor::{Descriptor, Synthesizer, Template};
use crate::loader::{LoaderIdentity, LoaderResolver};
use crate::progress::{Phase, ProgressEvent, ProgressHandler};
use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info};

pub struct DeployPipeline {
    config: DeployConfig,
    inspector: BundleInspector,
    resolver: LoaderResolver,
    synthesizer: Synthesizer,
    progress_handler: Option<Arc<dyn ProgressHandler>>,
}

impl DeployPipeline {
    pub fn new(config: DeployConfig) -> Self {
        let synthesizer = Synthesizer::new().with_author_email(config.author_email.clone());
        Self {
            config,
            inspector: BundleInspector::new(),
            resolver: LoaderResolver::new(),
            synthesizer,
            progress_handler: None,
        }
    }

    pub fn with_progress_handler(mut self, handler: Arc<dyn ProgressHandler>) -> Self {
        self.progress_handler = Some(handler);
        self
    }

    pub fn with_resolver(mut self, resolver: LoaderResolver) -> Self {
        self.resolver = resolver;
        self
    }

    pub fn with_synthesizer(mut self, synthesizer: Synthesizer) -> Self {
        self.synthesizer = synthesizer;
        self
    }

    pub fn config(&self) -> &DeployConfig {
        &self.config
    }

    /// Forwards an event to the progress handler, if one is attached.
    pub(crate) fn notify(&self, event: &ProgressEvent) {
        if let Some(handler) = &self.progress_handler {
            handler.on_progress(event);
        }
    }

    fn emit(&self, event: ProgressEvent) {
        self.notify(&event);
    }

    fn phase<T>(&self, phase: Phase, work: impl FnOnce() -> Result<T>) -> Result<T> {
        self.emit(ProgressEvent::PhaseStarted { phase });
        let started = Instant::now();

        match work() {
            Ok(value) => {
                self.emit(ProgressEvent::PhaseComplete {
                    phase,
                    duration: started.elapsed(),
                });
                debug!(phase = %phase, "Phase complete");
                Ok(value)
            }
            Err(e) => {
                self.emit(ProgressEvent::Failed {
                    phase,
                    error: format!("{:#}", e),
                });
                Err(e)
            }
        }
    }

    /// Loads the configured template. Runs before any bundle work.
    pub fn load_template(&self) -> Result<Template> {
        Template::load(&self.config.template_path).with_context(|| {
            format!(
                "Failed to load template {}",
                self.config.template_path.display()
            )
        })
    }

    /// Scans, inspects and resolves a bundle directory.
    ///
    /// Fails with a [`ConfigError`](crate::config::ConfigError) when the configuration does not validate,
    /// e.g. a scan depth too shallow to reach nested signals.
    pub fn analyze(&self, bundle_dir: &Path) -> Result<(BundleSignals, LoaderIdentity)> {
        self.config
            .validate()
            .context("Invalid pipeline configuration")?;

        let tree = self.phase(Phase::Scan, || {
            FileTree::scan(bundle_dir, &self.config.scan_config())
                .with_context(|| format!("Failed to scan bundle {}", bundle_dir.display()))
        })?;

        let signals = self.phase(Phase::Inspect, || {
            self.inspector
                .inspect(&tree)
                .with_context(|| format!("Failed to inspect bundle {}", bundle_dir.display()))
        })?;

        let identity = self.phase(Phase::Resolve, || {
            self.resolver
                .resolve(&signals)
                .context("Failed to resolve mod loader")
        })?;

        Ok((signals, identity))
    }

    /// Runs the pipeline with the configured template.
    pub fn run(&self, bundle_dir: &Path, source_locator: &str) -> Result<PipelineOutput> {
        let template = self.load_template()?;
        self.run_with_template(bundle_dir, source_locator, &template)
    }

    pub fn run_with_template(
        &self,
        bundle_dir: &Path,
        source_locator: &str,
        template: &Template,
    ) -> Result<PipelineOutput> {
        let start = Instant::now();
        info!(bundle = %bundle_dir.display(), "Starting pipeline");
        self.emit(ProgressEvent::Started {
            bundle_path: bundle_dir.display().to_string(),
        });

        let (signals, identity) = self.analyze(bundle_dir)?;

        // The bundle's own name wins over the locator unless one was set explicitly
        let synthesizer = match (self.synthesizer.display_name(), &signals.bundle_name) {
            (None, Some(name)) => self.synthesizer.clone().with_display_name(name.clone()),
            _ => self.synthesizer.clone(),
        };
        let display_name = synthesizer.display_name_for(source_locator);

        let descriptor = self.phase(Phase::Synthesize, || {
            synthesizer
                .synthesize(&identity, source_locator, template)
                .with_context(|| format!("Failed to synthesize descriptor for {}", display_name))
        })?;

        info!(
            name = %display_name,
            identity = %identity,
            "Pipeline complete"
        );
        self.emit(ProgressEvent::Completed {
            identity: identity.to_string(),
            total_time: start.elapsed(),
        });

        Ok(PipelineOutput {
            signals,
            identity,
            descriptor,
            display_name,
        })
    }

    /// Writes the descriptor to `<output_dir>/<slug>_egg.json`.
    pub fn persist(&self, descriptor: &Descriptor, display_name: &str) -> Result<PathBuf> {
        let path = self.config.output_path(display_name);
        self.phase(Phase::Persist, || {
            descriptor
                .save(&path)
                .with_context(|| format!("Failed to persist descriptor for {}", display_name))
        })?;
        info!(path = %path.display(), "Descriptor written");
        Ok(path)
    }

    /// Runs the pipeline and persists the result.
    pub fn run_and_persist(
        &self,
        bundle_dir: &Path,
        source_locator: &str,
    ) -> Result<(PipelineOutput, PathBuf)> {
        let output = self.run(bundle_dir, source_locator)?;
        let path = self.persist(&output.descriptor, &output.display_name)?;
        Ok((output, path))
    }
}
