//! Loop configuration.

use serde::{Deserialize, Serialize};

use crate::metrics::QualityThresholds;
use crate::stage::Stage;
use crate::validation::DEFAULT_STRUCTURAL_GATE;

/// Configuration for one refinement run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoopConfig {
    /// Stage this loop refines.
    pub stage: Stage,

    /// Highest iteration number the loop will assess before stopping.
    /// The loop performs at most `max_iterations + 1` validations.
    pub max_iterations: u32,

    /// Trailing window for the degradation detector.
    pub degradation_window: u32,

    /// Acceptance thresholds; stage defaults apply when unset.
    #[serde(default)]
    pub thresholds: Option<QualityThresholds>,

    /// Minimum structural quality a validation must show before the loop
    /// accepts it. Separate from the stage's own thresholds.
    pub schema_quality_gate: f64,

    /// Regeneration attempts allowed for a structurally-broken initial result.
    pub initial_retry_limit: u32,

    /// Consecutive structurally-broken corrections tolerated before giving up.
    pub correction_retry_limit: u32,
}

impl LoopConfig {
    /// Default configuration for the given stage.
    pub fn for_stage(stage: Stage) -> Self {
        Self {
            stage,
            max_iterations: 3,
            degradation_window: 2,
            thresholds: None,
            schema_quality_gate: DEFAULT_STRUCTURAL_GATE,
            initial_retry_limit: 2,
            correction_retry_limit: 2,
        }
    }

    /// Acceptance thresholds, falling back to the stage defaults.
    pub fn resolved_thresholds(&self) -> QualityThresholds {
        self.thresholds
            .clone()
            .unwrap_or_else(|| QualityThresholds::defaults(self.stage))
    }

    /// Validate the configuration.
    pub fn validate(&self) -> eyre::Result<()> {
        if self.max_iterations == 0 {
            eyre::bail!("max_iterations must be > 0");
        }
        if self.degradation_window == 0 {
            eyre::bail!("degradation_window must be > 0");
        }
        if !(0.0..=1.0).contains(&self.schema_quality_gate) {
            eyre::bail!("schema_quality_gate must be within [0.0, 1.0]");
        }
        if let Some(thresholds) = &self.thresholds {
            if thresholds.stage != self.stage {
                eyre::bail!(
                    "thresholds stage {} does not match loop stage {}",
                    thresholds.stage,
                    self.stage
                );
            }
        }
        Ok(())
    }
}

impl Default for LoopConfig {
    fn default() -> Self {
        Self::for_stage(Stage::Extraction)
    }
}
