//! Terminal loop results.

use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use std::fmt;

use crate::tracker::IterationRecord;

/// Terminal status of a refinement run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FinalStatus {
    /// A single attempt met every threshold.
    Passed,
    /// Degradation detector stopped the run; best historical attempt kept.
    EarlyStoppedDegradation,
    /// Iteration budget exhausted; best historical attempt kept.
    MaxIterationsReached,
    /// The artifact never met the structural bar.
    FailedSchemaValidation,
    /// A collaborator error was absorbed; best-effort result returned.
    Failed,
}

impl FinalStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            FinalStatus::Passed => "passed",
            FinalStatus::EarlyStoppedDegradation => "early_stopped_degradation",
            FinalStatus::MaxIterationsReached => "max_iterations_reached",
            FinalStatus::FailedSchemaValidation => "failed_schema_validation",
            FinalStatus::Failed => "failed",
        }
    }

    /// Degradation and budget exhaustion are valid outcomes, not failures.
    pub fn is_failure(&self) -> bool {
        matches!(self, FinalStatus::FailedSchemaValidation | FinalStatus::Failed)
    }
}

impl fmt::Display for FinalStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Terminal record of a refinement run. Immutable once returned.
#[derive(Debug, Clone, Serialize)]
pub struct LoopResult {
    /// Winning artifact, if any attempt produced one.
    pub best_result: Option<Value>,
    /// Validation report for the winning artifact.
    pub best_validation: Option<Value>,
    /// Full iteration history, in order.
    pub history: Vec<IterationRecord>,
    pub final_status: FinalStatus,
    /// Number of assessed iterations.
    pub iteration_count: u32,
    /// Quality-score sequence across the run.
    pub quality_trajectory: Vec<f64>,
    /// Index of the winning iteration.
    pub best_iteration: Option<u32>,
    /// Why the winner was chosen.
    pub selection_reason: Option<String>,
    /// Absorbed error message, when `final_status` is a failure.
    pub error: Option<String>,
    /// Iteration in flight when the failure occurred.
    pub failed_iteration: Option<u32>,
}

impl LoopResult {
    /// Render the result as one keyed mapping for persistence or display.
    ///
    /// `best_key` names the best-result field to match each stage's external
    /// schema (e.g. `best_extraction`, `best_appraisal`, `best_report`).
    pub fn to_value(&self, best_key: &str) -> Value {
        let mut map = serde_json::Map::new();
        map.insert(best_key.to_string(), self.best_result.clone().unwrap_or(Value::Null));
        map.insert(
            "best_validation".to_string(),
            self.best_validation.clone().unwrap_or(Value::Null),
        );
        map.insert("final_status".to_string(), json!(self.final_status.as_str()));
        map.insert("iteration_count".to_string(), json!(self.iteration_count));
        map.insert("quality_trajectory".to_string(), json!(self.quality_trajectory));
        map.insert("best_iteration".to_string(), json!(self.best_iteration));
        map.insert("selection_reason".to_string(), json!(self.selection_reason));
        map.insert("error".to_string(), json!(self.error));
        map.insert("failed_iteration".to_string(), json!(self.failed_iteration));
        map.insert(
            "iteration_history".to_string(),
            serde_json::to_value(&self.history).unwrap_or(Value::Null),
        );
        Value::Object(map)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_result() -> LoopResult {
        LoopResult {
            best_result: Some(json!({"field": "value"})),
            best_validation: Some(json!({"verification_summary": {}})),
            history: Vec::new(),
            final_status: FinalStatus::Passed,
            iteration_count: 1,
            quality_trajectory: vec![0.9],
            best_iteration: Some(0),
            selection_reason: Some("final_iteration_best".to_string()),
            error: None,
            failed_iteration: None,
        }
    }

    #[test]
    fn test_status_strings() {
        assert_eq!(FinalStatus::Passed.as_str(), "passed");
        assert_eq!(FinalStatus::EarlyStoppedDegradation.as_str(), "early_stopped_degradation");
        assert_eq!(FinalStatus::MaxIterationsReached.as_str(), "max_iterations_reached");
        assert_eq!(FinalStatus::FailedSchemaValidation.as_str(), "failed_schema_validation");
        assert_eq!(FinalStatus::Failed.as_str(), "failed");
    }

    #[test]
    fn test_status_serde_matches_as_str() {
        for status in [
            FinalStatus::Passed,
            FinalStatus::EarlyStoppedDegradation,
            FinalStatus::MaxIterationsReached,
            FinalStatus::FailedSchemaValidation,
            FinalStatus::Failed,
        ] {
            let json = serde_json::to_string(&status).unwrap();
            assert_eq!(json, format!("\"{}\"", status.as_str()));
        }
    }

    #[test]
    fn test_is_failure() {
        assert!(!FinalStatus::Passed.is_failure());
        assert!(!FinalStatus::EarlyStoppedDegradation.is_failure());
        assert!(!FinalStatus::MaxIterationsReached.is_failure());
        assert!(FinalStatus::FailedSchemaValidation.is_failure());
        assert!(FinalStatus::Failed.is_failure());
    }

    #[test]
    fn test_to_value_uses_caller_key() {
        let result = sample_result();
        let value = result.to_value("best_extraction");
        assert_eq!(value["best_extraction"]["field"], "value");
        assert_eq!(value["final_status"], "passed");
        assert_eq!(value["iteration_count"], 1);
        assert_eq!(value["best_iteration"], 0);
        assert!(value["error"].is_null());
    }

    #[test]
    fn test_to_value_null_best_result() {
        let mut result = sample_result();
        result.best_result = None;
        result.final_status = FinalStatus::FailedSchemaValidation;
        let value = result.to_value("best_report");
        assert!(value["best_report"].is_null());
        assert_eq!(value["final_status"], "failed_schema_validation");
    }
}
