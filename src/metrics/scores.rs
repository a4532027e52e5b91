//! Per-stage score records and composite weight tables.
//!
//! Each stage has a fixed set of normalized scores in [0.0, 1.0] and a
//! published weight table for the composite quality score. The weights in
//! each table sum to 1.0.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::stage::Stage;

/// Scores for the extraction stage.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ExtractionScores {
    pub completeness: f64,
    pub accuracy: f64,
    pub schema_compliance: f64,
}

impl ExtractionScores {
    pub const WEIGHT_COMPLETENESS: f64 = 0.40;
    pub const WEIGHT_ACCURACY: f64 = 0.40;
    pub const WEIGHT_SCHEMA_COMPLIANCE: f64 = 0.20;

    /// Weighted composite quality score.
    pub fn composite(&self) -> f64 {
        self.completeness * Self::WEIGHT_COMPLETENESS
            + self.accuracy * Self::WEIGHT_ACCURACY
            + self.schema_compliance * Self::WEIGHT_SCHEMA_COMPLIANCE
    }
}

/// Scores for the critical appraisal stage.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AppraisalScores {
    pub logical_consistency: f64,
    pub completeness: f64,
    pub evidence_support: f64,
    pub schema_compliance: f64,
}

impl AppraisalScores {
    pub const WEIGHT_LOGICAL_CONSISTENCY: f64 = 0.35;
    pub const WEIGHT_COMPLETENESS: f64 = 0.25;
    pub const WEIGHT_EVIDENCE_SUPPORT: f64 = 0.25;
    pub const WEIGHT_SCHEMA_COMPLIANCE: f64 = 0.15;

    /// Weighted composite quality score.
    pub fn composite(&self) -> f64 {
        self.logical_consistency * Self::WEIGHT_LOGICAL_CONSISTENCY
            + self.completeness * Self::WEIGHT_COMPLETENESS
            + self.evidence_support * Self::WEIGHT_EVIDENCE_SUPPORT
            + self.schema_compliance * Self::WEIGHT_SCHEMA_COMPLIANCE
    }
}

/// Scores for the report generation stage.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ReportScores {
    pub accuracy: f64,
    pub completeness: f64,
    pub cross_reference_consistency: f64,
    pub data_consistency: f64,
    pub schema_compliance: f64,
}

impl ReportScores {
    pub const WEIGHT_ACCURACY: f64 = 0.35;
    pub const WEIGHT_COMPLETENESS: f64 = 0.30;
    pub const WEIGHT_CROSS_REFERENCE: f64 = 0.10;
    pub const WEIGHT_DATA_CONSISTENCY: f64 = 0.10;
    pub const WEIGHT_SCHEMA_COMPLIANCE: f64 = 0.15;

    /// Weighted composite quality score.
    pub fn composite(&self) -> f64 {
        self.accuracy * Self::WEIGHT_ACCURACY
            + self.completeness * Self::WEIGHT_COMPLETENESS
            + self.cross_reference_consistency * Self::WEIGHT_CROSS_REFERENCE
            + self.data_consistency * Self::WEIGHT_DATA_CONSISTENCY
            + self.schema_compliance * Self::WEIGHT_SCHEMA_COMPLIANCE
    }
}

/// Closed sum type over the per-stage score records.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StageScores {
    Extraction(ExtractionScores),
    Appraisal(AppraisalScores),
    Report(ReportScores),
}

/// Read a score field defensively: absent or non-numeric values become 0.0,
/// and anything numeric is clamped into [0.0, 1.0].
pub(crate) fn read_score(summary: &Value, key: &str) -> f64 {
    summary
        .get(key)
        .and_then(Value::as_f64)
        .unwrap_or(0.0)
        .clamp(0.0, 1.0)
}

impl StageScores {
    /// All-zero scores for the given stage.
    pub fn zeroed(stage: Stage) -> Self {
        match stage {
            Stage::Extraction => StageScores::Extraction(ExtractionScores {
                completeness: 0.0,
                accuracy: 0.0,
                schema_compliance: 0.0,
            }),
            Stage::Appraisal => StageScores::Appraisal(AppraisalScores {
                logical_consistency: 0.0,
                completeness: 0.0,
                evidence_support: 0.0,
                schema_compliance: 0.0,
            }),
            Stage::Report => StageScores::Report(ReportScores {
                accuracy: 0.0,
                completeness: 0.0,
                cross_reference_consistency: 0.0,
                data_consistency: 0.0,
                schema_compliance: 0.0,
            }),
        }
    }

    /// Extract scores from a validator summary mapping, defensively.
    pub fn from_summary(stage: Stage, summary: &Value) -> Self {
        match stage {
            Stage::Extraction => StageScores::Extraction(ExtractionScores {
                completeness: read_score(summary, "completeness_score"),
                accuracy: read_score(summary, "accuracy_score"),
                schema_compliance: read_score(summary, "schema_compliance_score"),
            }),
            Stage::Appraisal => StageScores::Appraisal(AppraisalScores {
                logical_consistency: read_score(summary, "logical_consistency_score"),
                completeness: read_score(summary, "completeness_score"),
                evidence_support: read_score(summary, "evidence_support_score"),
                schema_compliance: read_score(summary, "schema_compliance_score"),
            }),
            Stage::Report => StageScores::Report(ReportScores {
                accuracy: read_score(summary, "accuracy_score"),
                completeness: read_score(summary, "completeness_score"),
                cross_reference_consistency: read_score(summary, "cross_reference_consistency_score"),
                data_consistency: read_score(summary, "data_consistency_score"),
                schema_compliance: read_score(summary, "schema_compliance_score"),
            }),
        }
    }

    /// The stage these scores belong to.
    pub fn stage(&self) -> Stage {
        match self {
            StageScores::Extraction(_) => Stage::Extraction,
            StageScores::Appraisal(_) => Stage::Appraisal,
            StageScores::Report(_) => Stage::Report,
        }
    }

    /// Weighted composite over this variant's weight table.
    pub fn composite(&self) -> f64 {
        match self {
            StageScores::Extraction(s) => s.composite(),
            StageScores::Appraisal(s) => s.composite(),
            StageScores::Report(s) => s.composite(),
        }
    }

    /// Completeness score (present in every variant).
    pub fn completeness(&self) -> f64 {
        match self {
            StageScores::Extraction(s) => s.completeness,
            StageScores::Appraisal(s) => s.completeness,
            StageScores::Report(s) => s.completeness,
        }
    }

    /// Accuracy score. Appraisal has no literal accuracy field; its
    /// logical-consistency score plays that role.
    pub fn accuracy(&self) -> f64 {
        match self {
            StageScores::Extraction(s) => s.accuracy,
            StageScores::Appraisal(s) => s.logical_consistency,
            StageScores::Report(s) => s.accuracy,
        }
    }

    /// Schema compliance score (present in every variant).
    pub fn schema_compliance(&self) -> f64 {
        match self {
            StageScores::Extraction(s) => s.schema_compliance,
            StageScores::Appraisal(s) => s.schema_compliance,
            StageScores::Report(s) => s.schema_compliance,
        }
    }

    /// True if every score is >= its counterpart in `minimums`.
    ///
    /// Mismatched variants never meet each other.
    pub fn meets(&self, minimums: &StageScores) -> bool {
        match (self, minimums) {
            (StageScores::Extraction(s), StageScores::Extraction(m)) => {
                s.completeness >= m.completeness
                    && s.accuracy >= m.accuracy
                    && s.schema_compliance >= m.schema_compliance
            }
            (StageScores::Appraisal(s), StageScores::Appraisal(m)) => {
                s.logical_consistency >= m.logical_consistency
                    && s.completeness >= m.completeness
                    && s.evidence_support >= m.evidence_support
                    && s.schema_compliance >= m.schema_compliance
            }
            (StageScores::Report(s), StageScores::Report(m)) => {
                s.accuracy >= m.accuracy
                    && s.completeness >= m.completeness
                    && s.cross_reference_consistency >= m.cross_reference_consistency
                    && s.data_consistency >= m.data_consistency
                    && s.schema_compliance >= m.schema_compliance
            }
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const EPS: f64 = 1e-9;

    #[test]
    fn test_weight_tables_sum_to_one() {
        let extraction = ExtractionScores::WEIGHT_COMPLETENESS
            + ExtractionScores::WEIGHT_ACCURACY
            + ExtractionScores::WEIGHT_SCHEMA_COMPLIANCE;
        assert!((extraction - 1.0).abs() < EPS);

        let appraisal = AppraisalScores::WEIGHT_LOGICAL_CONSISTENCY
            + AppraisalScores::WEIGHT_COMPLETENESS
            + AppraisalScores::WEIGHT_EVIDENCE_SUPPORT
            + AppraisalScores::WEIGHT_SCHEMA_COMPLIANCE;
        assert!((appraisal - 1.0).abs() < EPS);

        let report = ReportScores::WEIGHT_ACCURACY
            + ReportScores::WEIGHT_COMPLETENESS
            + ReportScores::WEIGHT_CROSS_REFERENCE
            + ReportScores::WEIGHT_DATA_CONSISTENCY
            + ReportScores::WEIGHT_SCHEMA_COMPLIANCE;
        assert!((report - 1.0).abs() < EPS);
    }

    #[test]
    fn test_extraction_composite_matches_published_weights() {
        let scores = ExtractionScores {
            completeness: 0.9,
            accuracy: 0.8,
            schema_compliance: 0.7,
        };
        let expected = 0.4 * 0.9 + 0.4 * 0.8 + 0.2 * 0.7;
        assert!((scores.composite() - expected).abs() < EPS);
    }

    #[test]
    fn test_appraisal_composite_matches_published_weights() {
        let scores = AppraisalScores {
            logical_consistency: 0.9,
            completeness: 0.8,
            evidence_support: 0.7,
            schema_compliance: 0.6,
        };
        let expected = 0.35 * 0.9 + 0.25 * 0.8 + 0.25 * 0.7 + 0.15 * 0.6;
        assert!((scores.composite() - expected).abs() < EPS);
    }

    #[test]
    fn test_report_composite_matches_published_weights() {
        let scores = ReportScores {
            accuracy: 0.9,
            completeness: 0.8,
            cross_reference_consistency: 0.7,
            data_consistency: 0.6,
            schema_compliance: 0.5,
        };
        let expected = 0.35 * 0.9 + 0.30 * 0.8 + 0.10 * 0.7 + 0.10 * 0.6 + 0.15 * 0.5;
        assert!((scores.composite() - expected).abs() < EPS);
    }

    #[test]
    fn test_zeroed_composite_is_zero() {
        for stage in Stage::all() {
            let scores = StageScores::zeroed(stage);
            assert_eq!(scores.stage(), stage);
            assert_eq!(scores.composite(), 0.0);
        }
    }

    #[test]
    fn test_read_score_defensive() {
        let summary = json!({
            "completeness_score": 0.9,
            "accuracy_score": "not a number",
            "out_of_range": 1.7,
            "negative": -0.3,
        });
        assert_eq!(read_score(&summary, "completeness_score"), 0.9);
        assert_eq!(read_score(&summary, "accuracy_score"), 0.0);
        assert_eq!(read_score(&summary, "missing"), 0.0);
        assert_eq!(read_score(&summary, "out_of_range"), 1.0);
        assert_eq!(read_score(&summary, "negative"), 0.0);
    }

    #[test]
    fn test_from_summary_extraction() {
        let summary = json!({
            "completeness_score": 0.92,
            "accuracy_score": 0.98,
            "schema_compliance_score": 0.97,
        });
        let scores = StageScores::from_summary(Stage::Extraction, &summary);
        match scores {
            StageScores::Extraction(s) => {
                assert_eq!(s.completeness, 0.92);
                assert_eq!(s.accuracy, 0.98);
                assert_eq!(s.schema_compliance, 0.97);
            }
            _ => panic!("expected extraction scores"),
        }
    }

    #[test]
    fn test_from_summary_report_missing_fields_default_to_zero() {
        let summary = json!({ "accuracy_score": 0.8 });
        let scores = StageScores::from_summary(Stage::Report, &summary);
        assert_eq!(scores.accuracy(), 0.8);
        assert_eq!(scores.completeness(), 0.0);
        assert_eq!(scores.schema_compliance(), 0.0);
    }

    #[test]
    fn test_accuracy_accessor_maps_appraisal_logical_consistency() {
        let scores = StageScores::Appraisal(AppraisalScores {
            logical_consistency: 0.77,
            completeness: 0.5,
            evidence_support: 0.5,
            schema_compliance: 0.5,
        });
        assert_eq!(scores.accuracy(), 0.77);
    }

    #[test]
    fn test_meets_all_at_or_above() {
        let minimums = StageScores::Extraction(ExtractionScores {
            completeness: 0.9,
            accuracy: 0.95,
            schema_compliance: 0.95,
        });
        let passing = StageScores::Extraction(ExtractionScores {
            completeness: 0.9,
            accuracy: 0.98,
            schema_compliance: 0.97,
        });
        let failing = StageScores::Extraction(ExtractionScores {
            completeness: 0.89,
            accuracy: 0.98,
            schema_compliance: 0.97,
        });
        assert!(passing.meets(&minimums));
        assert!(!failing.meets(&minimums));
    }

    #[test]
    fn test_meets_mismatched_variants() {
        let extraction = StageScores::zeroed(Stage::Extraction);
        let report = StageScores::zeroed(Stage::Report);
        assert!(!extraction.meets(&report));
    }
}
