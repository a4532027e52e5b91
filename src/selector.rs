//! Best-iteration selection.
//!
//! When a run terminates without any single attempt meeting its thresholds,
//! the selector ranks the full history and returns the best attempt with a
//! human-readable reason.

use std::cmp::Ordering;

use crate::error::{DocloopError, Result};
use crate::stage::Stage;
use crate::tracker::IterationRecord;

/// Selection reason when the history holds a single record.
pub const REASON_ONLY_ITERATION: &str = "only_iteration";
/// Selection reason when the last iteration wins.
pub const REASON_FINAL_ITERATION: &str = "final_iteration_best";

/// The winning record plus the reason it was chosen.
#[derive(Debug)]
pub struct BestIteration<'a> {
    pub record: &'a IterationRecord,
    pub reason: String,
}

/// Tiebreaker score for ranking: reports prioritize factual accuracy over
/// coverage, every other stage uses completeness.
fn tiebreaker_score(record: &IterationRecord, stage: Stage) -> f64 {
    match stage {
        Stage::Report => record.metrics.scores.accuracy(),
        Stage::Extraction | Stage::Appraisal => record.metrics.scores.completeness(),
    }
}

/// Compare two records for ranking, greatest-first under `max_by`.
///
/// Sort key, descending:
/// 1. absence of critical issues (clean beats dirty regardless of score)
/// 2. composite quality score
/// 3. stage tiebreaker score
/// 4. earlier iteration number (the cheaper attempt wins a full tie)
fn rank(a: &IterationRecord, b: &IterationRecord, stage: Stage) -> Ordering {
    let a_clean = a.metrics.critical_issues == 0;
    let b_clean = b.metrics.critical_issues == 0;
    a_clean
        .cmp(&b_clean)
        .then_with(|| a.metrics.quality_score.total_cmp(&b.metrics.quality_score))
        .then_with(|| tiebreaker_score(a, stage).total_cmp(&tiebreaker_score(b, stage)))
        .then_with(|| b.iteration_num.cmp(&a.iteration_num))
}

/// Pick the single best attempt from a run's history.
///
/// Errors on an empty history; that is a programmer error, not a runtime
/// condition the loop can produce.
pub fn select_best(records: &[IterationRecord], stage: Stage) -> Result<BestIteration<'_>> {
    let (first, rest) = records.split_first().ok_or(DocloopError::EmptyHistory)?;

    if rest.is_empty() {
        return Ok(BestIteration {
            record: first,
            reason: REASON_ONLY_ITERATION.to_string(),
        });
    }

    let best = records
        .iter()
        .max_by(|a, b| rank(a, b, stage))
        .unwrap_or(first);

    let last_num = records[records.len() - 1].iteration_num;
    let reason = if best.iteration_num == last_num {
        REASON_FINAL_ITERATION.to_string()
    } else {
        format!("quality_peaked_at_iteration_{}", best.iteration_num)
    };

    tracing::debug!(
        stage = %stage,
        best_iteration = best.iteration_num,
        quality = best.metrics.quality_score,
        reason = %reason,
        "Selected best iteration"
    );

    Ok(BestIteration { record: best, reason })
}
