//! Logging-based progress handler

use super::{ProgressEvent, ProgressHandler};
use tracing::{debug, info, warn};

/// Handler that logs progress events using tracing
#[derive(Debug, Default, Clone, Copy)]
pub struct LoggingHandler;

impl ProgressHandler for LoggingHandler {
    fn on_progress(&self, event: &ProgressEvent) {
        match event {
            ProgressEvent::Started { bundle_path } => {
                info!(bundle = %bundle_path, "Starting bundle analysis");
            }
            ProgressEvent::PhaseStarted { phase } => {
                debug!(phase = %phase, "Starting phase");
            }
            ProgressEvent::PhaseComplete { phase, duration } => {
                debug!(
                    phase = %phase,
                    duration_ms = duration.as_millis(),
                    "Phase complete"
                );
            }
            ProgressEvent::Completed {
                identity,
                total_time,
            } => {
                info!(
                    identity = %identity,
                    total_time_ms = total_time.as_millis(),
                    "Descriptor generated"
                );
            }
            ProgressEvent::Failed { phase, error } => {
                warn!(phase = %phase, error = %error, "Bundle analysis failed");
            }
            ProgressEvent::CaseStarted { name } => {
                info!(case = %name, "Running reference case");
            }
            ProgressEvent::CaseComplete {
                name,
                success,
                score,
                duration,
            } => {
                if *success {
                    info!(
                        case = %name,
                        score = format!("{:.2}", score),
                        duration_ms = duration.as_millis(),
                        "Reference case passed"
                    );
                } else {
                    warn!(
                        case = %name,
                        score = format!("{:.2}", score),
                        duration_ms = duration.as_millis(),
                        "Reference case failed"
                    );
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::progress::Phase;
    use std::time::Duration;

    #[test]
    fn test_logging_all_events() {
        let handler = LoggingHandler;

        let events = vec![
            ProgressEvent::Started {
                bundle_path: "/packs/atm9".to_string(),
            },
            ProgressEvent::PhaseStarted {
                phase: Phase::Inspect,
            },
            ProgressEvent::PhaseComplete {
                phase: Phase::Inspect,
                duration: Duration::from_millis(12),
            },
            ProgressEvent::Failed {
                phase: Phase::Resolve,
                error: "no rule matched".to_string(),
            },
            ProgressEvent::Completed {
                identity: "fabric 0.15.7 for 1.20.1".to_string(),
                total_time: Duration::from_millis(80),
            },
            ProgressEvent::CaseStarted {
                name: "ATM9".to_string(),
            },
            ProgressEvent::CaseComplete {
                name: "ATM9".to_string(),
                success: true,
                score: 0.97,
                duration: Duration::from_millis(120),
            },
            ProgressEvent::CaseComplete {
                name: "ATM9".to_string(),
                success: false,
                score: 0.4,
                duration: Duration::from_millis(120),
            },
        ];

        for event in events {
            handler.on_progress(&event);
        }
    }
}
