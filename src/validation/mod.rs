//! Reference validation: run the pipeline on known bundles and compare the
//! results against trusted descriptors.

pub mod case;
pub mod rules;
pub mod runner;

pub use case::{load_cases, ReferenceCase};
pub use rules::{ExpectationRule, FamilyRule, ManagedRuntimeRule, RuntimeVersionRule};
pub use runner::{CaseOutcome, SuiteSummary, ValidationRunner, MAX_WARNINGS};
