//! Quality metrics extraction from raw validation reports.
//!
//! External validators produce loosely-structured JSON. This module
//! normalizes a stage's raw report into a uniform numeric record with a
//! weighted composite score.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::metrics::scores::StageScores;
use crate::stage::Stage;

/// Status tag used when the raw report is absent or unusable.
pub const STATUS_MISSING: &str = "missing";

/// Uniform numeric quality record for one validation report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QualityMetrics {
    /// Normalized per-stage component scores.
    pub scores: StageScores,
    /// Number of critical defects reported. Nonzero disqualifies the
    /// iteration from sufficiency regardless of composite score.
    pub critical_issues: u32,
    /// Validator's overall status tag (`passed`, `failed`, `missing`, ...).
    pub overall_status: String,
    /// Weighted composite in [0.0, 1.0].
    pub quality_score: f64,
}

impl QualityMetrics {
    /// Metrics for a missing or empty report: all zeros, status `missing`.
    pub fn missing(stage: Stage) -> Self {
        Self {
            scores: StageScores::zeroed(stage),
            critical_issues: 0,
            overall_status: STATUS_MISSING.to_string(),
            quality_score: 0.0,
        }
    }

    /// Normalize a raw validation report into metrics.
    ///
    /// The report layout is keyed per stage: extraction reports nest their
    /// numbers under `verification_summary`, appraisal and report under
    /// `validation_summary`. An absent or empty report, or one missing the
    /// summary key, yields all-zero metrics with status `missing` rather
    /// than an error.
    ///
    /// Appraisal and report summaries may carry a precomputed
    /// `quality_score` (the external validator applies additional
    /// judgment); when present it replaces the locally computed composite.
    /// Extraction always recomputes locally.
    pub fn from_report(report: Option<&Value>, stage: Stage) -> Self {
        let summary = report
            .and_then(|r| r.as_object())
            .filter(|obj| !obj.is_empty())
            .and_then(|obj| obj.get(stage.summary_key()))
            .filter(|s| s.is_object());

        let Some(summary) = summary else {
            return Self::missing(stage);
        };

        let scores = StageScores::from_summary(stage, summary);

        let critical_issues = summary
            .get("critical_issues")
            .and_then(Value::as_u64)
            .unwrap_or(0)
            .min(u32::MAX as u64) as u32;

        let overall_status = summary
            .get("overall_status")
            .and_then(Value::as_str)
            .unwrap_or("unknown")
            .to_string();

        let precomputed = match stage {
            Stage::Extraction => None,
            Stage::Appraisal | Stage::Report => summary.get("quality_score").and_then(Value::as_f64),
        };
        let quality_score = precomputed
            .map(|q| q.clamp(0.0, 1.0))
            .unwrap_or_else(|| scores.composite());

        Self {
            scores,
            critical_issues,
            overall_status,
            quality_score,
        }
    }

    /// The stage this record was extracted for.
    pub fn stage(&self) -> Stage {
        self.scores.stage()
    }
}
