//! Structural-then-semantic validator.

use async_trait::async_trait;
use serde_json::{Value, json};

use crate::error::Result;
use crate::hooks::StageValidator;
use crate::stage::Stage;

/// Minimum structural quality required before spending a semantic call.
pub const DEFAULT_STRUCTURAL_GATE: f64 = 0.5;

/// Cheap, deterministic shape-checking of a produced artifact.
///
/// Implementations return a mapping carrying a `quality_score` in [0.0, 1.0]
/// and, on defects, an `errors` array of strings.
#[async_trait]
pub trait StructuralValidator: Send + Sync {
    async fn validate(&self, artifact: &Value) -> Result<Value>;
}

/// Expensive, judgment-based validation (an external LLM call).
///
/// Implementations return the stage's raw validation report, with scores
/// nested under the stage's summary key.
#[async_trait]
pub trait SemanticValidator: Send + Sync {
    async fn validate(&self, artifact: &Value) -> Result<Value>;
}

/// Runs structural validation always, and semantic validation only when the
/// structural quality score clears the gate.
pub struct DualValidator<S, M> {
    stage: Stage,
    structural: S,
    semantic: M,
    gate: f64,
}

impl<S, M> DualValidator<S, M>
where
    S: StructuralValidator,
    M: SemanticValidator,
{
    pub fn new(stage: Stage, structural: S, semantic: M) -> Self {
        Self {
            stage,
            structural,
            semantic,
            gate: DEFAULT_STRUCTURAL_GATE,
        }
    }

    /// Override the structural gate.
    pub fn with_gate(mut self, gate: f64) -> Self {
        self.gate = gate;
        self
    }

    pub fn gate(&self) -> f64 {
        self.gate
    }

    /// Validate an artifact, producing one unified report.
    ///
    /// When the structural score is below the gate, the semantic call is
    /// skipped entirely and a synthetic failed report is returned whose
    /// recommendations point at the structural defects. When the semantic
    /// call runs, the structural result is nested under `schema_validation`
    /// in the merged report.
    pub async fn validate(&self, artifact: &Value) -> Result<Value> {
        let structural = self.structural.validate(artifact).await?;
        let structural_quality = structural
            .get("quality_score")
            .and_then(Value::as_f64)
            .unwrap_or(0.0);

        if structural_quality < self.gate {
            tracing::debug!(
                stage = %self.stage,
                structural_quality,
                gate = self.gate,
                "Structural quality below gate, skipping semantic validation"
            );
            return Ok(self.synthetic_failure(structural));
        }

        let semantic = self.semantic.validate(artifact).await?;
        Ok(merge_reports(semantic, structural))
    }

    /// Build a failed report without spending the semantic call.
    fn synthetic_failure(&self, structural: Value) -> Value {
        let errors: Vec<Value> = structural
            .get("errors")
            .and_then(Value::as_array)
            .cloned()
            .unwrap_or_default();
        let recommendations = if errors.is_empty() {
            vec![json!("Fix structural defects before resubmitting")]
        } else {
            errors
        };
        let critical_issues = recommendations.len().max(1);

        json!({
            self.stage.summary_key(): {
                "overall_status": "failed",
                "critical_issues": critical_issues,
            },
            "recommendations": recommendations,
            "schema_validation": structural,
        })
    }
}

/// Nest the structural result inside the semantic report.
fn merge_reports(semantic: Value, structural: Value) -> Value {
    match semantic {
        Value::Object(mut obj) => {
            obj.insert("schema_validation".to_string(), structural);
            Value::Object(obj)
        }
        other => json!({
            "semantic_report": other,
            "schema_validation": structural,
        }),
    }
}

#[async_trait]
impl<S, M> StageValidator for DualValidator<S, M>
where
    S: StructuralValidator,
    M: SemanticValidator,
{
    async fn validate(&self, result: &Value) -> Result<Value> {
        DualValidator::validate(self, result).await
    }
}
