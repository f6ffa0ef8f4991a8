#![allow(dead_code)]

use pterodeploy::{DeployConfig, DeployPipeline, Synthesizer};
use chrono::{TimeZone, Utc};
use std::path::{Path, PathBuf};

pub fn fixtures_dir() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures")
}

pub fn bundle_path(name: &str) -> PathBuf {
    fixtures_dir().join("bundles").join(name)
}

pub fn template_path() -> PathBuf {
    fixtures_dir().join("template/egg_template.json")
}

pub fn reference_path(name: &str) -> PathBuf {
    fixtures_dir().join("references").join(name)
}

/// Config pointing at the fixture template and writing into `output_dir`.
pub fn test_config(output_dir: &Path) -> DeployConfig {
    DeployConfig {
        template_path: template_path(),
        output_dir: output_dir.to_path_buf(),
        author_email: "pterodeploy@generated.com".to_string(),
        log_level: "info".to_string(),
        max_scan_depth: 16,
        max_scan_files: 50_000,
    }
}

/// Pipeline with a pinned export date so runs are reproducible.
pub fn test_pipeline(output_dir: &Path) -> DeployPipeline {
    let synthesizer = Synthesizer::new()
        .with_export_date(Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap());
    DeployPipeline::new(test_config(output_dir)).with_synthesizer(synthesizer)
}
