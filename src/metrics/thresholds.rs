//! Quality thresholds and the sufficiency check.
//!
//! Thresholds are per-stage minimums for every score field plus a ceiling on
//! critical issues. They are monotone: raising a minimum or lowering the
//! ceiling can only make acceptance harder.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::metrics::model::QualityMetrics;
use crate::metrics::scores::{AppraisalScores, ExtractionScores, ReportScores, StageScores};
use crate::stage::Stage;

/// Minimum acceptable scores and maximum acceptable critical issues for one
/// stage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QualityThresholds {
    pub stage: Stage,
    pub minimums: StageScores,
    pub max_critical_issues: u32,
}

impl QualityThresholds {
    /// Default thresholds for the given stage. Critical issues are never
    /// tolerated by default.
    pub fn defaults(stage: Stage) -> Self {
        let minimums = match stage {
            Stage::Extraction => StageScores::Extraction(ExtractionScores {
                completeness: 0.90,
                accuracy: 0.95,
                schema_compliance: 0.95,
            }),
            Stage::Appraisal => StageScores::Appraisal(AppraisalScores {
                logical_consistency: 0.90,
                completeness: 0.85,
                evidence_support: 0.85,
                schema_compliance: 0.95,
            }),
            Stage::Report => StageScores::Report(ReportScores {
                accuracy: 0.95,
                completeness: 0.90,
                cross_reference_consistency: 0.90,
                data_consistency: 0.90,
                schema_compliance: 0.95,
            }),
        };
        Self {
            stage,
            minimums,
            max_critical_issues: 0,
        }
    }

    /// True if every score meets its minimum and critical issues are within
    /// the ceiling. All conditions must hold; there is no partial credit.
    pub fn is_met_by(&self, metrics: &QualityMetrics) -> bool {
        metrics.scores.meets(&self.minimums) && metrics.critical_issues <= self.max_critical_issues
    }
}

/// Is this raw validation report good enough to stop iterating?
///
/// Fail-safe: returns false for an absent report, a non-object report, or a
/// report missing the stage's summary key. Otherwise every score must be at
/// or above its threshold minimum and critical issues at or below the
/// ceiling. When `thresholds` is `None` the stage defaults apply.
pub fn is_sufficient(report: Option<&Value>, stage: Stage, thresholds: Option<&QualityThresholds>) -> bool {
    let Some(report) = report else {
        return false;
    };
    let Some(obj) = report.as_object() else {
        return false;
    };
    if obj.is_empty() || !obj.contains_key(stage.summary_key()) {
        return false;
    }

    let metrics = QualityMetrics::from_report(Some(report), stage);
    match thresholds {
        Some(t) => t.is_met_by(&metrics),
        None => QualityThresholds::defaults(stage).is_met_by(&metrics),
    }
}
