//! Iterative refinement loop runner.
//!
//! Drives the validate -> assess -> correct cycle for one stage artifact:
//! validate the current result, derive metrics, stop when thresholds are
//! met, the quality degrades, or the iteration budget runs out, otherwise
//! ask the corrector for a better attempt and go around again. Structurally
//! broken artifacts are handled on a separate hard-failure path with bounded
//! retries.
//!
//! `run` never surfaces an error: every collaborator failure is absorbed
//! into a well-formed [`LoopResult`].

use std::sync::Arc;

use serde_json::Value;

use crate::error::Result;
use crate::hooks::{ArtifactSink, InitialRegenerator, StageCorrector, StageValidator};
use crate::metrics::QualityMetrics;
use crate::progress::{NoopProgress, ProgressObserver, ProgressStatus};
use crate::runner::config::LoopConfig;
use crate::runner::result::{FinalStatus, LoopResult};
use crate::selector::{REASON_FINAL_ITERATION, select_best};
use crate::tracker::{IterationTracker, SavedPaths};
use crate::validation::schema_quality;

/// Executes the refinement loop for one stage.
///
/// Strictly sequential: every validate/correct call blocks the loop until it
/// returns, and each iteration depends on the previous one's output.
pub struct LoopRunner<V, C>
where
    V: StageValidator,
    C: StageCorrector,
{
    validator: Arc<V>,
    corrector: Arc<C>,
    config: LoopConfig,
    sink: Option<Arc<dyn ArtifactSink>>,
    regenerator: Option<Arc<dyn InitialRegenerator>>,
    progress: Arc<dyn ProgressObserver>,
}

impl<V, C> LoopRunner<V, C>
where
    V: StageValidator,
    C: StageCorrector,
{
    pub fn new(config: LoopConfig, validator: Arc<V>, corrector: Arc<C>) -> Self {
        Self {
            validator,
            corrector,
            config,
            sink: None,
            regenerator: None,
            progress: Arc::new(NoopProgress),
        }
    }

    /// Persist iteration/best/failed artifacts through the given sink.
    pub fn with_sink(mut self, sink: Arc<dyn ArtifactSink>) -> Self {
        self.sink = Some(sink);
        self
    }

    /// Enable retrying a structurally-broken initial attempt.
    pub fn with_regenerator(mut self, regenerator: Arc<dyn InitialRegenerator>) -> Self {
        self.regenerator = Some(regenerator);
        self
    }

    /// Observe state transitions.
    pub fn with_progress(mut self, progress: Arc<dyn ProgressObserver>) -> Self {
        self.progress = progress;
        self
    }

    pub fn config(&self) -> &LoopConfig {
        &self.config
    }

    /// Run the loop to a terminal result.
    ///
    /// Never returns an error: collaborator failures are absorbed into a
    /// `failed` result carrying the best historical iteration when one
    /// exists.
    pub async fn run(&self, initial: Value) -> LoopResult {
        let mut tracker = IterationTracker::new();
        match self.run_inner(initial, &mut tracker).await {
            Ok(result) => result,
            Err(err) => self.absorb_failure(&tracker, err.to_string()),
        }
    }

    async fn run_inner(&self, initial: Value, tracker: &mut IterationTracker) -> Result<LoopResult> {
        let stage = self.config.stage;
        let thresholds = self.config.resolved_thresholds();

        let mut current = initial;
        let mut cached_validation: Option<Value> = None;
        let mut iteration: u32 = 0;
        let mut initial_retries: u32 = 0;
        let mut correction_retries: u32 = 0;

        loop {
            // VALIDATING: corrections arrive pre-validated via the cache, so
            // a fresh validator call happens only for the initial result and
            // its regenerations.
            let validation = match cached_validation.take() {
                Some(v) => v,
                None => self.validate_step(&current, iteration).await?,
            };

            // Structural gate on the initial artifact. A result too broken
            // for its schema is a hard failure, not a correction candidate.
            if tracker.is_empty() {
                if let Some(quality) = schema_quality(&validation) {
                    if quality < self.config.schema_quality_gate {
                        match &self.regenerator {
                            Some(regenerator) if initial_retries < self.config.initial_retry_limit => {
                                initial_retries += 1;
                                self.notify("regenerate_initial", ProgressStatus::Starting, iteration, None);
                                current = regenerator.regenerate().await?;
                                self.notify("regenerate_initial", ProgressStatus::Completed, iteration, None);
                                continue;
                            }
                            _ => {
                                self.dump_failed(&current, &validation).await;
                                self.notify(
                                    "schema_validation",
                                    ProgressStatus::Failed,
                                    iteration,
                                    Some("structural quality below gate"),
                                );
                                return Ok(self.schema_failure(tracker, iteration));
                            }
                        }
                    }
                }
            }

            // ASSESSING
            self.notify("assessment", ProgressStatus::Starting, iteration, None);
            let metrics = QualityMetrics::from_report(Some(&validation), stage);
            let sufficient = thresholds.is_met_by(&metrics);
            let quality = metrics.quality_score;

            let paths = match &self.sink {
                Some(sink) => sink.save_iteration(iteration, &current, &validation).await?,
                None => SavedPaths::default(),
            };
            tracker.add(current.clone(), validation.clone(), metrics, paths);

            if sufficient {
                self.notify("assessment", ProgressStatus::Completed, iteration, Some("thresholds met"));
                tracing::info!(stage = %stage, iteration, quality, "Refinement passed");
                return self.passed_result(tracker, current, validation, iteration).await;
            }
            self.notify("assessment", ProgressStatus::Completed, iteration, Some("thresholds not met"));

            if tracker.detect_degradation(self.config.degradation_window) {
                tracing::info!(
                    stage = %stage,
                    iteration,
                    window = self.config.degradation_window,
                    "Quality degrading, stopping early"
                );
                return self.select_and_finish(tracker, FinalStatus::EarlyStoppedDegradation).await;
            }

            if iteration >= self.config.max_iterations {
                tracing::info!(stage = %stage, iteration, "Iteration budget exhausted");
                return self.select_and_finish(tracker, FinalStatus::MaxIterationsReached).await;
            }

            // CORRECTING: corrections are re-validated immediately and pass
            // through the same structural gate. A broken correction resets
            // to the last known-good pair instead of poisoning the loop.
            self.notify("correction", ProgressStatus::Starting, iteration, None);
            let corrected = match self.corrector.correct(&current, &validation).await {
                Ok(c) => c,
                Err(err) => {
                    self.notify("correction", ProgressStatus::Failed, iteration, Some(&err.to_string()));
                    return Err(err);
                }
            };
            self.notify("correction", ProgressStatus::Completed, iteration, None);

            let corrected_validation = self.validate_step(&corrected, iteration + 1).await?;

            let gate_ok = schema_quality(&corrected_validation)
                .map_or(true, |q| q >= self.config.schema_quality_gate);
            if !gate_ok {
                correction_retries += 1;
                self.notify(
                    "correction",
                    ProgressStatus::Failed,
                    iteration,
                    Some("corrected result below structural gate"),
                );
                if correction_retries > self.config.correction_retry_limit {
                    tracing::warn!(
                        stage = %stage,
                        retries = correction_retries,
                        "Correction retries exhausted"
                    );
                    if tracker.is_empty() {
                        return Ok(self.schema_failure(tracker, iteration + 1));
                    }
                    return self.select_and_finish(tracker, FinalStatus::MaxIterationsReached).await;
                }
                // Re-enter at the next iteration number from the last
                // known-good pair.
                cached_validation = Some(validation);
                iteration += 1;
                continue;
            }

            correction_retries = 0;
            current = corrected;
            cached_validation = Some(corrected_validation);
            iteration += 1;
        }
    }

    async fn validate_step(&self, result: &Value, iteration: u32) -> Result<Value> {
        self.notify("validation", ProgressStatus::Starting, iteration, None);
        match self.validator.validate(result).await {
            Ok(report) => {
                self.notify("validation", ProgressStatus::Completed, iteration, None);
                Ok(report)
            }
            Err(err) => {
                self.notify("validation", ProgressStatus::Failed, iteration, Some(&err.to_string()));
                Err(err)
            }
        }
    }

    async fn passed_result(
        &self,
        tracker: &IterationTracker,
        result: Value,
        validation: Value,
        iteration: u32,
    ) -> Result<LoopResult> {
        if let Some(sink) = &self.sink {
            sink.save_best(&result, &validation).await?;
        }
        Ok(LoopResult {
            best_result: Some(result),
            best_validation: Some(validation),
            history: tracker.records().to_vec(),
            final_status: FinalStatus::Passed,
            iteration_count: tracker.len() as u32,
            quality_trajectory: tracker.quality_scores(),
            best_iteration: Some(iteration),
            selection_reason: Some(REASON_FINAL_ITERATION.to_string()),
            error: None,
            failed_iteration: None,
        })
    }

    async fn select_and_finish(&self, tracker: &IterationTracker, status: FinalStatus) -> Result<LoopResult> {
        let (best_result, best_validation, best_iteration, reason) = {
            let best = select_best(tracker.records(), self.config.stage)?;
            (
                best.record.result.clone(),
                best.record.validation.clone(),
                best.record.iteration_num,
                best.reason,
            )
        };
        if let Some(sink) = &self.sink {
            sink.save_best(&best_result, &best_validation).await?;
        }
        Ok(LoopResult {
            best_result: Some(best_result),
            best_validation: Some(best_validation),
            history: tracker.records().to_vec(),
            final_status: status,
            iteration_count: tracker.len() as u32,
            quality_trajectory: tracker.quality_scores(),
            best_iteration: Some(best_iteration),
            selection_reason: Some(reason),
            error: None,
            failed_iteration: None,
        })
    }

    fn schema_failure(&self, tracker: &IterationTracker, iteration: u32) -> LoopResult {
        LoopResult {
            best_result: None,
            best_validation: None,
            history: tracker.records().to_vec(),
            final_status: FinalStatus::FailedSchemaValidation,
            iteration_count: tracker.len() as u32,
            quality_trajectory: tracker.quality_scores(),
            best_iteration: None,
            selection_reason: None,
            error: Some("structural quality below gate".to_string()),
            failed_iteration: Some(iteration),
        }
    }

    fn absorb_failure(&self, tracker: &IterationTracker, message: String) -> LoopResult {
        tracing::error!(stage = %self.config.stage, error = %message, "Loop failed, returning best-effort result");
        let failed_iteration = Some(tracker.len() as u32);

        let selected = select_best(tracker.records(), self.config.stage).ok();
        match selected {
            Some(best) => LoopResult {
                best_result: Some(best.record.result.clone()),
                best_validation: Some(best.record.validation.clone()),
                best_iteration: Some(best.record.iteration_num),
                selection_reason: Some(best.reason),
                history: tracker.records().to_vec(),
                final_status: FinalStatus::Failed,
                iteration_count: tracker.len() as u32,
                quality_trajectory: tracker.quality_scores(),
                error: Some(message),
                failed_iteration,
            },
            None => LoopResult {
                best_result: None,
                best_validation: None,
                best_iteration: None,
                selection_reason: None,
                history: Vec::new(),
                final_status: FinalStatus::Failed,
                iteration_count: 0,
                quality_trajectory: Vec::new(),
                error: Some(message),
                failed_iteration,
            },
        }
    }

    async fn dump_failed(&self, result: &Value, validation: &Value) {
        if let Some(sink) = &self.sink {
            if let Err(err) = sink.save_failed(result, validation).await {
                tracing::warn!(error = %err, "Failed to persist broken artifact");
            }
        }
    }

    fn notify(&self, step: &str, status: ProgressStatus, iteration: u32, detail: Option<&str>) {
        self.progress.notify(step, status, iteration, detail);
    }
}
