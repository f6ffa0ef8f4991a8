use super::case::ReferenceCase;
use super::rules::{default_rules, ExpectationRule};
use crate::compare::{ComparisonVerdict, DescriptorComparator};
use crate::descriptor::Descriptor;
use crate::pipeline::DeployPipeline;
use crate::progress::ProgressEvent;
use serde::Serialize;
use std::time::{Duration, Instant};
use tracing::{error, info};

/// Cosmetic differences carried into a failed outcome's warnings.
pub const MAX_WARNINGS: usize = 5;

#[derive(Debug, Clone, Serialize)]
pub struct CaseOutcome {
    pub name: String,
    pub success: bool,
    pub message: String,
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
    pub score: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub verdict: Option<ComparisonVerdict>,
    pub elapsed: Duration,
}

impl CaseOutcome {
    fn failed(name: &str, message: String, error: String) -> Self {
        Self {
            name: name.to_string(),
            success: false,
            message,
            errors: vec![error],
            warnings: Vec::new(),
            score: 0.0,
            verdict: None,
            elapsed: Duration::ZERO,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct SuiteSummary {
    pub outcomes: Vec<CaseOutcome>,
    pub passed: usize,
    pub failed: usize,
    pub total_time: Duration,
}

impl SuiteSummary {
    pub fn total(&self) -> usize {
        self.outcomes.len()
    }

    pub fn all_passed(&self) -> bool {
        self.failed == 0
    }

    pub fn find(&self, name: &str) -> Option<&CaseOutcome> {
        self.outcomes.iter().find(|o| o.name == name)
    }

    /// Share of passing cases, `0.0` for an empty suite.
    pub fn success_rate(&self) -> f64 {
        if self.outcomes.is_empty() {
            0.0
        } else {
            self.passed as f64 / self.outcomes.len() as f64
        }
    }
}

/// Runs reference cases through the pipeline and the comparator.
pub struct ValidationRunner {
    pipeline: DeployPipeline,
    comparator: DescriptorComparator,
    rules: Vec<Box<dyn ExpectationRule>>,
}

impl ValidationRunner {
    pub fn new(pipeline: DeployPipeline) -> Self {
        Self {
            pipeline,
            comparator: DescriptorComparator::new(),
            rules: default_rules(),
        }
    }

    pub fn with_comparator(mut self, comparator: DescriptorComparator) -> Self {
        self.comparator = comparator;
        self
    }

    pub fn with_rules(mut self, rules: Vec<Box<dyn ExpectationRule>>) -> Self {
        self.rules = rules;
        self
    }

    pub fn run_case(&self, case: &ReferenceCase) -> CaseOutcome {
        let start = Instant::now();
        let mut outcome = self.evaluate(case);
        outcome.elapsed = start.elapsed();
        outcome
    }

    fn evaluate(&self, case: &ReferenceCase) -> CaseOutcome {
        let reference = match Descriptor::load(&case.reference_path) {
            Ok(reference) => reference,
            Err(e) => {
                error!(case = %case.name, error = %e, "Failed to load reference descriptor");
                return CaseOutcome::failed(
                    &case.name,
                    "Failed to load reference descriptor".to_string(),
                    format!("Reference descriptor not found: {}", case.reference_path.display()),
                );
            }
        };

        if !case.bundle_dir.is_dir() {
            return CaseOutcome::failed(
                &case.name,
                format!("Test bundle not found: {}", case.bundle_dir.display()),
                format!("Bundle directory not found: {}", case.bundle_dir.display()),
            );
        }

        let output = match self.pipeline.run(&case.bundle_dir, &case.source_locator()) {
            Ok(output) => output,
            Err(e) => {
                error!(case = %case.name, error = %format!("{:#}", e), "Reference case execution failed");
                return CaseOutcome::failed(
                    &case.name,
                    format!("Test execution failed: {:#}", e),
                    format!("{:#}", e),
                );
            }
        };

        let verdict = self.comparator.compare(&output.descriptor, &reference);
        let expectation_errors: Vec<String> = self
            .rules
            .iter()
            .filter_map(|rule| {
                rule.check(case, &output.identity)
                    .err()
                    .map(|e| format!("[{}] {}", rule.name(), e))
            })
            .collect();

        let success = verdict.matches && expectation_errors.is_empty();
        let (message, errors, warnings) = if success {
            (
                format!("Test passed - Similarity score: {:.2}", verdict.score),
                Vec::new(),
                Vec::new(),
            )
        } else {
            let errors = verdict
                .critical_mismatches
                .iter()
                .map(ToString::to_string)
                .chain(expectation_errors)
                .collect::<Vec<_>>();
            let warnings = verdict
                .cosmetic_differences
                .iter()
                .take(MAX_WARNINGS)
                .map(ToString::to_string)
                .collect();
            (
                format!(
                    "Test failed - Critical mismatches: {}",
                    verdict.critical_mismatches.len()
                ),
                errors,
                warnings,
            )
        };

        CaseOutcome {
            name: case.name.clone(),
            success,
            message,
            errors,
            warnings,
            score: verdict.score,
            verdict: Some(verdict),
            elapsed: Duration::ZERO,
        }
    }

    pub fn run_all(&self, cases: &[ReferenceCase]) -> SuiteSummary {
        let start = Instant::now();
        let mut summary = SuiteSummary::default();

        for case in cases {
            self.emit(ProgressEvent::CaseStarted {
                name: case.name.clone(),
            });
            let outcome = self.run_case(case);
            self.emit(ProgressEvent::CaseComplete {
                name: outcome.name.clone(),
                success: outcome.success,
                score: outcome.score,
                duration: outcome.elapsed,
            });

            if outcome.success {
                summary.passed += 1;
            } else {
                summary.failed += 1;
            }
            summary.outcomes.push(outcome);
        }

        summary.total_time = start.elapsed();
        info!(
            total = summary.total(),
            passed = summary.passed,
            failed = summary.failed,
            "Reference suite complete"
        );
        summary
    }

    /// Runs the case named `name`, if any.
    pub fn run_single(&self, cases: &[ReferenceCase], name: &str) -> Option<CaseOutcome> {
        cases
            .iter()
            .find(|c| c.name == name)
            .map(|c| self.run_case(c))
    }

    fn emit(&self, event: ProgressEvent) {
        self.pipeline.notify(&event);
    }
}
