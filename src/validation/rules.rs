use super::case::ReferenceCase;
use crate::loader::LoaderIdentity;
use anyhow::Result;

/// A check of a resolved identity against what a reference case expects.
pub trait ExpectationRule: Send + Sync {
    fn name(&self) -> &'static str;
    fn check(&self, case: &ReferenceCase, identity: &LoaderIdentity) -> Result<()>;
}

pub struct FamilyRule;

impl ExpectationRule for FamilyRule {
    fn name(&self) -> &'static str {
        "LoaderFamily"
    }

    fn check(&self, case: &ReferenceCase, identity: &LoaderIdentity) -> Result<()> {
        match case.expected_family {
            Some(expected) if expected != identity.family() => {
                anyhow::bail!("expected {}, resolved {}", expected, identity.family())
            }
            _ => Ok(()),
        }
    }
}

pub struct RuntimeVersionRule;

impl ExpectationRule for RuntimeVersionRule {
    fn name(&self) -> &'static str {
        "RuntimeVersion"
    }

    fn check(&self, case: &ReferenceCase, identity: &LoaderIdentity) -> Result<()> {
        match case.expected_runtime_version.as_deref() {
            Some(expected) if expected != identity.target_runtime_version() => {
                let note = if identity.runtime_version_assumed() {
                    " (assumed default)"
                } else {
                    ""
                };
                anyhow::bail!(
                    "expected {}, resolved {}{}",
                    expected,
                    identity.target_runtime_version(),
                    note
                )
            }
            _ => Ok(()),
        }
    }
}

pub struct ManagedRuntimeRule;

impl ExpectationRule for ManagedRuntimeRule {
    fn name(&self) -> &'static str {
        "ManagedRuntime"
    }

    fn check(&self, case: &ReferenceCase, identity: &LoaderIdentity) -> Result<()> {
        match case.expected_managed_runtime {
            Some(expected) if expected != identity.managed_runtime_version() => anyhow::bail!(
                "expected Java {}, resolved Java {}",
                expected,
                identity.managed_runtime_version()
            ),
            _ => Ok(()),
        }
    }
}

pub fn default_rules() -> Vec<Box<dyn ExpectationRule>> {
    vec![
        Box::new(FamilyRule),
        Box::new(RuntimeVersionRule),
        Box::new(ManagedRuntimeRule),
    ]
}
