//! Progress handler trait and events

use std::fmt;
use std::time::Duration;

/// Stages of turning a bundle directory into a persisted descriptor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Phase {
    Scan,
    Inspect,
    Resolve,
    Synthesize,
    Persist,
}

impl Phase {
    pub fn as_str(&self) -> &'static str {
        match self {
            Phase::Scan => "scan",
            Phase::Inspect => "inspect",
            Phase::Resolve => "resolve",
            Phase::Synthesize => "synthesize",
            Phase::Persist => "persist",
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone)]
pub enum ProgressEvent {
    Started { bundle_path: String },

    PhaseStarted { phase: Phase },

    PhaseComplete { phase: Phase, duration: Duration },

    /// Descriptor synthesized for the resolved identity
    Completed {
        identity: String,
        total_time: Duration,
    },

    Failed { phase: Phase, error: String },

    /// A reference validation case started
    CaseStarted { name: String },

    CaseComplete {
        name: String,
        success: bool,
        score: f64,
        duration: Duration,
    },
}

/// Receives progress events. Implementations must not block the pipeline.
pub trait ProgressHandler: Send + Sync {
    fn on_progress(&self, event: &ProgressEvent);
}

#[derive(Debug, Default, Clone, Copy)]
pub struct NoOpHandler;

impl ProgressHandler for NoOpHandler {
    fn on_progress(&self, _event: &ProgressEvent) {}
}
