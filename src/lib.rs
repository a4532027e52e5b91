//! docloop - iterative quality-controlled refinement loops
//!
//! docloop drives the validate -> assess -> correct cycle for LLM document
//! pipelines: score each attempt against stage thresholds, stop on success,
//! sustained degradation, or budget exhaustion, and keep the best attempt
//! produced across the run. The LLM calls, prompts, and file formats live
//! behind narrow trait seams supplied by the caller.

pub mod artifacts;
pub mod error;
pub mod hooks;
pub mod metrics;
pub mod progress;
pub mod retry;
pub mod runner;
pub mod selector;
pub mod stage;
pub mod tracker;
pub mod validation;

pub use error::{DocloopError, Result};
pub use metrics::{QualityMetrics, QualityThresholds, StageScores, is_sufficient};
pub use runner::{FinalStatus, LoopConfig, LoopResult, LoopRunner};
pub use stage::Stage;
pub use tracker::{IterationRecord, IterationTracker, SavedPaths};
