use serde::Serialize;
use serde_json::Value;
use std::fmt;

/// One difference between a candidate descriptor and its reference.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Difference {
    /// Key present in the reference only.
    MissingKey { path: String },
    /// Key present in the candidate only.
    ExtraKey { path: String },
    LengthMismatch {
        path: String,
        candidate: usize,
        reference: usize,
    },
    ValueMismatch {
        path: String,
        candidate: String,
        reference: String,
    },
    /// Startup lines disagree on memory flags or the headless flag.
    StartupIncompatible { candidate: String, reference: String },
    /// Declared images resolve to different runtime versions.
    ImageIncompatible { candidate: String, reference: String },
}

impl Difference {
    pub(crate) fn value_mismatch(path: &str, candidate: &Value, reference: &Value) -> Self {
        Difference::ValueMismatch {
            path: path.to_string(),
            candidate: render_scalar(candidate),
            reference: render_scalar(reference),
        }
    }

    /// Dotted path of a structural difference. Functional checks have none.
    pub fn path(&self) -> Option<&str> {
        match self {
            Difference::MissingKey { path }
            | Difference::ExtraKey { path }
            | Difference::LengthMismatch { path, .. }
            | Difference::ValueMismatch { path, .. } => Some(path),
            Difference::StartupIncompatible { .. } | Difference::ImageIncompatible { .. } => None,
        }
    }

    pub fn is_functional(&self) -> bool {
        self.path().is_none()
    }
}

fn render_scalar(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

impl fmt::Display for Difference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Difference::MissingKey { path } => write!(f, "Missing key in generated: {}", path),
            Difference::ExtraKey { path } => write!(f, "Extra key in generated: {}", path),
            Difference::LengthMismatch {
                path,
                candidate,
                reference,
            } => write!(
                f,
                "Array length mismatch at {}: {} vs {}",
                path, candidate, reference
            ),
            Difference::ValueMismatch {
                path,
                candidate,
                reference,
            } => write!(
                f,
                "Value mismatch at {}: '{}' vs '{}'",
                path, candidate, reference
            ),
            Difference::StartupIncompatible {
                candidate,
                reference,
            } => write!(
                f,
                "Startup command mismatch: '{}' vs '{}'",
                candidate, reference
            ),
            Difference::ImageIncompatible {
                candidate,
                reference,
            } => write!(f, "Docker image mismatch: {} vs {}", candidate, reference),
        }
    }
}

/// Outcome of one comparison. Derived fresh per call, never persisted.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComparisonVerdict {
    pub matches: bool,
    /// Similarity in `[0, 1]` over the normalized reference.
    pub score: f64,
    pub critical_mismatches: Vec<Difference>,
    pub cosmetic_differences: Vec<Difference>,
}

impl ComparisonVerdict {
    /// Critical mismatches first, then cosmetic differences.
    pub fn differences(&self) -> impl Iterator<Item = &Difference> {
        self.critical_mismatches
            .iter()
            .chain(self.cosmetic_differences.iter())
    }

    pub fn total_differences(&self) -> usize {
        self.critical_mismatches.len() + self.cosmetic_differences.len()
    }
}

impl fmt::Display for ComparisonVerdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} (score {:.2}, {} critical, {} cosmetic)",
            if self.matches { "match" } else { "mismatch" },
            self.score,
            self.critical_mismatches.len(),
            self.cosmetic_differences.len()
        )
    }
}
