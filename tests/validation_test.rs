//! Reference suite runs over the fixture cases

mod support;

use pterodeploy::validation::{load_cases, ReferenceCase, ValidationRunner, MAX_WARNINGS};
use pterodeploy::{LoaderFamily, ProgressEvent, ProgressHandler};
use std::sync::{Arc, Mutex};
use support::{bundle_path, fixtures_dir, reference_path, test_pipeline};
use tempfile::TempDir;

fn fixture_cases() -> Vec<ReferenceCase> {
    load_cases(fixtures_dir().join("cases.yaml")).unwrap()
}

#[derive(Default)]
struct CaseRecorder {
    names: Mutex<Vec<String>>,
}

impl ProgressHandler for CaseRecorder {
    fn on_progress(&self, event: &ProgressEvent) {
        if let ProgressEvent::CaseComplete { name, success, .. } = event {
            self.names
                .lock()
                .unwrap()
                .push(format!("{}:{}", name, success));
        }
    }
}

#[test]
fn test_fixture_suite() {
    let temp = TempDir::new().unwrap();
    let runner = ValidationRunner::new(test_pipeline(temp.path()));
    let summary = runner.run_all(&fixture_cases());

    assert_eq!(summary.total(), 3);
    assert_eq!(summary.passed, 2);
    assert_eq!(summary.failed, 1);
    assert!(!summary.all_passed());

    let cool = summary.find("Cool Pack").unwrap();
    assert!(cool.success, "{:?}", cool.errors);
    assert_eq!(cool.message, "Test passed - Similarity score: 1.00");
    assert!(cool.errors.is_empty());

    let legacy = summary.find("Legacy Forge").unwrap();
    assert!(legacy.success, "{:?}", legacy.errors);
}

#[test]
fn test_older_runtime_case_reports_critical_mismatches() {
    let temp = TempDir::new().unwrap();
    let runner = ValidationRunner::new(test_pipeline(temp.path()));
    let outcome = runner
        .run_single(&fixture_cases(), "Cool Pack on Java 8")
        .unwrap();

    assert!(!outcome.success);
    assert!(outcome.message.starts_with("Test failed - Critical mismatches: "));
    assert!(outcome
        .errors
        .iter()
        .any(|e| e.starts_with("Docker image mismatch")));
    assert!(outcome.warnings.len() <= MAX_WARNINGS);
    assert!(outcome.verdict.is_some());
}

#[test]
fn test_expectation_mismatch_fails_matching_descriptor() {
    let temp = TempDir::new().unwrap();
    let runner = ValidationRunner::new(test_pipeline(temp.path()));
    let case = ReferenceCase::new(
        "Wrong family",
        bundle_path("forge-manifest"),
        reference_path("cool_pack_egg.json"),
    )
    .expecting(LoaderFamily::NeoForge, "1.20.1", 17);

    let outcome = runner.run_case(&case);
    assert!(!outcome.success);
    assert_eq!(outcome.score, 1.0);
    assert!(outcome.errors.iter().any(|e| e.starts_with("[LoaderFamily]")));
}

#[test]
fn test_missing_reference() {
    let temp = TempDir::new().unwrap();
    let runner = ValidationRunner::new(test_pipeline(temp.path()));
    let case = ReferenceCase::new(
        "No reference",
        bundle_path("forge-manifest"),
        reference_path("does_not_exist.json"),
    );

    let outcome = runner.run_case(&case);
    assert!(!outcome.success);
    assert_eq!(outcome.message, "Failed to load reference descriptor");
    assert_eq!(outcome.score, 0.0);
    assert!(outcome.verdict.is_none());
}

#[test]
fn test_missing_bundle() {
    let temp = TempDir::new().unwrap();
    let runner = ValidationRunner::new(test_pipeline(temp.path()));
    let case = ReferenceCase::new(
        "No bundle",
        bundle_path("does-not-exist"),
        reference_path("cool_pack_egg.json"),
    );

    let outcome = runner.run_case(&case);
    assert!(!outcome.success);
    assert!(outcome.message.starts_with("Test bundle not found: "));
}

#[test]
fn test_run_single_unknown_name() {
    let temp = TempDir::new().unwrap();
    let runner = ValidationRunner::new(test_pipeline(temp.path()));
    assert!(runner.run_single(&fixture_cases(), "Nope").is_none());
}

#[test]
fn test_case_events_reported_in_order() {
    let temp = TempDir::new().unwrap();
    let recorder = Arc::new(CaseRecorder::default());
    let pipeline = test_pipeline(temp.path()).with_progress_handler(recorder.clone());
    let summary = ValidationRunner::new(pipeline).run_all(&fixture_cases());

    assert_eq!(summary.success_rate(), 2.0 / 3.0);
    assert_eq!(
        *recorder.names.lock().unwrap(),
        vec![
            "Cool Pack:true".to_string(),
            "Legacy Forge:true".to_string(),
            "Cool Pack on Java 8:false".to_string(),
        ]
    );
}
