//! Dual (cheap-then-expensive) validation.
//!
//! Structural checks are deterministic and cheap; semantic validation costs
//! an LLM call. [`DualValidator`] gates the expensive call on structural
//! quality so a hopelessly broken artifact never burns a semantic critique.

pub mod dual;

pub use dual::{DEFAULT_STRUCTURAL_GATE, DualValidator, SemanticValidator, StructuralValidator};

use serde_json::Value;

/// Structural quality carried by a unified validation report, if any.
///
/// Reports produced by [`DualValidator`] nest the structural result under
/// `schema_validation`; its `quality_score` is read defensively (absent or
/// non-numeric becomes 0.0). A report without a `schema_validation` block
/// carries no structural information and returns `None`, which callers
/// treat as "gate not applicable".
pub fn schema_quality(report: &Value) -> Option<f64> {
    report
        .get("schema_validation")
        .map(|block| block.get("quality_score").and_then(Value::as_f64).unwrap_or(0.0))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_schema_quality_present() {
        let report = json!({ "schema_validation": { "quality_score": 0.8 } });
        assert_eq!(schema_quality(&report), Some(0.8));
    }

    #[test]
    fn test_schema_quality_block_without_score_is_zero() {
        let report = json!({ "schema_validation": { "errors": ["bad shape"] } });
        assert_eq!(schema_quality(&report), Some(0.0));
    }

    #[test]
    fn test_schema_quality_absent_block() {
        let report = json!({ "validation_summary": {} });
        assert_eq!(schema_quality(&report), None);
    }
}
