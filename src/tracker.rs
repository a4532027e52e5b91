//! Iteration history for a single refinement run.
//!
//! The tracker owns the ordered, append-only list of attempts. It is the
//! single source for peak quality, improvement deltas, and the degradation
//! signal that triggers early stopping.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::path::PathBuf;

use crate::metrics::QualityMetrics;

/// Filesystem locations of a persisted iteration, when a sink is wired in.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SavedPaths {
    pub result_path: Option<PathBuf>,
    pub validation_path: Option<PathBuf>,
}

/// One attempt in a refinement run. Created once per loop pass, never
/// mutated afterwards.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IterationRecord {
    /// 0-indexed, equal to the record's position in the history.
    pub iteration_num: u32,
    /// The artifact produced by the stage (opaque to the loop).
    pub result: Value,
    /// The raw validation report for this artifact.
    pub validation: Value,
    /// Metrics derived from the validation report.
    pub metrics: QualityMetrics,
    pub result_path: Option<PathBuf>,
    pub validation_path: Option<PathBuf>,
    pub timestamp: DateTime<Utc>,
}

/// Append-only history of attempts for one run.
///
/// The loop runner is the only writer; no external mutation is permitted.
#[derive(Debug, Default)]
pub struct IterationTracker {
    records: Vec<IterationRecord>,
}

impl IterationTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn records(&self) -> &[IterationRecord] {
        &self.records
    }

    /// Append an attempt, assigning `iteration_num` from the current length.
    pub fn add(
        &mut self,
        result: Value,
        validation: Value,
        metrics: QualityMetrics,
        paths: SavedPaths,
    ) -> &IterationRecord {
        let record = IterationRecord {
            iteration_num: self.records.len() as u32,
            result,
            validation,
            metrics,
            result_path: paths.result_path,
            validation_path: paths.validation_path,
            timestamp: Utc::now(),
        };
        self.records.push(record);
        self.records.last().expect("record was just pushed")
    }

    /// Composite quality score of each record, in append order.
    pub fn quality_scores(&self) -> Vec<f64> {
        self.records.iter().map(|r| r.metrics.quality_score).collect()
    }

    /// Highest quality score seen so far, or 0.0 when empty.
    pub fn peak_quality(&self) -> f64 {
        self.records
            .iter()
            .map(|r| r.metrics.quality_score)
            .fold(0.0, f64::max)
    }

    /// Consecutive quality deltas (length = count - 1; empty below 2 records).
    pub fn improvement_trajectory(&self) -> Vec<f64> {
        let scores = self.quality_scores();
        scores.windows(2).map(|w| w[1] - w[0]).collect()
    }

    /// Sustained-decline signal for early stopping.
    ///
    /// Requires at least `window + 1` records. True only when every one of
    /// the last `window` scores is strictly below the all-time peak; a score
    /// exactly tied with the peak does not count as degraded. Comparing
    /// against the all-time peak rather than a rolling maximum is
    /// intentional: one bad iteration after a good one never triggers, but a
    /// sustained plateau below an early spike eventually does.
    pub fn detect_degradation(&self, window: u32) -> bool {
        let window = window as usize;
        if window == 0 || self.records.len() < window + 1 {
            return false;
        }
        let peak = self.peak_quality();
        let scores = self.quality_scores();
        scores[scores.len() - window..].iter().all(|s| *s < peak)
    }
}
