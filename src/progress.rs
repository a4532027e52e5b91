//! Progress notification at loop transition points.
//!
//! The loop's only requirement is "notify on state transitions"; observers
//! are infallible by contract so a notification can never disturb loop
//! progress. The default observer emits structured tracing events.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Status of a loop sub-step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProgressStatus {
    Starting,
    Completed,
    Failed,
    Skipped,
}

impl ProgressStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProgressStatus::Starting => "starting",
            ProgressStatus::Completed => "completed",
            ProgressStatus::Failed => "failed",
            ProgressStatus::Skipped => "skipped",
        }
    }
}

impl fmt::Display for ProgressStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Observer for loop transition events.
pub trait ProgressObserver: Send + Sync {
    /// Called at each transition with the sub-step name, status, iteration
    /// number, and an optional detail string.
    fn notify(&self, step: &str, status: ProgressStatus, iteration: u32, detail: Option<&str>);
}

/// Observer that emits tracing events.
#[derive(Debug, Default)]
pub struct TracingProgress;

impl ProgressObserver for TracingProgress {
    fn notify(&self, step: &str, status: ProgressStatus, iteration: u32, detail: Option<&str>) {
        match status {
            ProgressStatus::Failed => {
                tracing::warn!(step, status = %status, iteration, detail, "Loop step failed");
            }
            _ => {
                tracing::info!(step, status = %status, iteration, detail, "Loop step");
            }
        }
    }
}

/// Observer that drops all notifications.
#[derive(Debug, Default)]
pub struct NoopProgress;

impl ProgressObserver for NoopProgress {
    fn notify(&self, _step: &str, _status: ProgressStatus, _iteration: u32, _detail: Option<&str>) {}
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[test]
    fn test_status_as_str() {
        assert_eq!(ProgressStatus::Starting.as_str(), "starting");
        assert_eq!(ProgressStatus::Completed.as_str(), "completed");
        assert_eq!(ProgressStatus::Failed.as_str(), "failed");
        assert_eq!(ProgressStatus::Skipped.as_str(), "skipped");
    }

    #[test]
    fn test_status_serde() {
        assert_eq!(serde_json::to_string(&ProgressStatus::Starting).unwrap(), "\"starting\"");
    }

    struct CollectingObserver {
        events: Mutex<Vec<(String, ProgressStatus, u32)>>,
    }

    impl ProgressObserver for CollectingObserver {
        fn notify(&self, step: &str, status: ProgressStatus, iteration: u32, _detail: Option<&str>) {
            self.events.lock().unwrap().push((step.to_string(), status, iteration));
        }
    }

    #[test]
    fn test_custom_observer_receives_events() {
        let observer = CollectingObserver {
            events: Mutex::new(Vec::new()),
        };
        observer.notify("validation", ProgressStatus::Starting, 0, None);
        observer.notify("validation", ProgressStatus::Completed, 0, Some("ok"));

        let events = observer.events.lock().unwrap();
        assert_eq!(events.len(), 2);
        assert_eq!(events[0], ("validation".to_string(), ProgressStatus::Starting, 0));
    }

    #[test]
    fn test_noop_observer() {
        // Must not panic or block.
        NoopProgress.notify("anything", ProgressStatus::Failed, 7, Some("detail"));
    }
}
