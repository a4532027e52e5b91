//! Pipeline stage tags.
//!
//! The refinement loop is instantiated for three stages of the document
//! pipeline: data extraction, critical appraisal, and report generation.
//! Each stage carries its own weight table, thresholds, and validation
//! report layout, dispatched through this tag.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The three contexts in which the generic loop runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    /// Structured data extraction from a source document
    Extraction,
    /// Critical appraisal of the extracted evidence
    Appraisal,
    /// Final report generation
    Report,
}

impl Stage {
    /// All stages, in pipeline order.
    pub fn all() -> [Stage; 3] {
        [Stage::Extraction, Stage::Appraisal, Stage::Report]
    }

    /// Stage name as used in artifact filenames and progress events.
    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::Extraction => "extraction",
            Stage::Appraisal => "appraisal",
            Stage::Report => "report",
        }
    }

    /// Key under which the external validator nests its summary.
    ///
    /// Extraction validators report under `verification_summary`; the
    /// appraisal and report validators use `validation_summary`.
    pub fn summary_key(&self) -> &'static str {
        match self {
            Stage::Extraction => "verification_summary",
            Stage::Appraisal | Stage::Report => "validation_summary",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stage_as_str() {
        assert_eq!(Stage::Extraction.as_str(), "extraction");
        assert_eq!(Stage::Appraisal.as_str(), "appraisal");
        assert_eq!(Stage::Report.as_str(), "report");
    }

    #[test]
    fn test_stage_summary_key() {
        assert_eq!(Stage::Extraction.summary_key(), "verification_summary");
        assert_eq!(Stage::Appraisal.summary_key(), "validation_summary");
        assert_eq!(Stage::Report.summary_key(), "validation_summary");
    }

    #[test]
    fn test_stage_display() {
        assert_eq!(format!("{}", Stage::Extraction), "extraction");
    }

    #[test]
    fn test_stage_serde_roundtrip() {
        for stage in Stage::all() {
            let json = serde_json::to_string(&stage).unwrap();
            let restored: Stage = serde_json::from_str(&json).unwrap();
            assert_eq!(stage, restored);
        }
        assert_eq!(serde_json::to_string(&Stage::Extraction).unwrap(), "\"extraction\"");
    }

    #[test]
    fn test_stage_all_in_pipeline_order() {
        assert_eq!(
            Stage::all(),
            [Stage::Extraction, Stage::Appraisal, Stage::Report]
        );
    }
}
