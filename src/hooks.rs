//! Collaborator seams for the refinement loop.
//!
//! The loop consumes, but does not implement, stage validation, correction,
//! artifact persistence, and initial-result regeneration. Each seam is a
//! narrow trait so the loop can be constructed and unit-tested with fakes
//! without touching real LLM or filesystem code.

use async_trait::async_trait;
use serde_json::Value;

use crate::error::Result;
use crate::tracker::SavedPaths;

/// Produces a raw validation report for a stage artifact.
///
/// Typically backed by [`DualValidator`](crate::validation::DualValidator),
/// which runs cheap structural checks before the expensive semantic call.
#[async_trait]
pub trait StageValidator: Send + Sync {
    async fn validate(&self, result: &Value) -> Result<Value>;
}

/// Produces a corrected artifact from a failing result and its validation
/// report.
#[async_trait]
pub trait StageCorrector: Send + Sync {
    async fn correct(&self, result: &Value, validation: &Value) -> Result<Value>;
}

/// Persists run artifacts. All methods are best-effort from the loop's
/// perspective; `save_failed` is a debugging aid with a no-op default.
#[async_trait]
pub trait ArtifactSink: Send + Sync {
    /// Persist one iteration's result and validation report.
    async fn save_iteration(&self, iteration_num: u32, result: &Value, validation: &Value) -> Result<SavedPaths>;

    /// Persist the winning result.
    async fn save_best(&self, result: &Value, validation: &Value) -> Result<SavedPaths>;

    /// Persist a structurally-broken result for post-mortem inspection.
    async fn save_failed(&self, _result: &Value, _validation: &Value) -> Result<SavedPaths> {
        Ok(SavedPaths::default())
    }
}

/// Regenerates the initial result when it fails the structural gate.
/// Optional; without it a broken initial attempt is terminal.
#[async_trait]
pub trait InitialRegenerator: Send + Sync {
    async fn regenerate(&self) -> Result<Value>;
}
