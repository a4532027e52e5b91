//! Quality metrics model and threshold evaluation.
//!
//! Normalizes raw validation reports into uniform numeric records
//! ([`QualityMetrics`]) and answers whether a result is good enough to stop
//! iterating ([`is_sufficient`]).

pub mod model;
pub mod scores;
pub mod thresholds;

pub use model::{QualityMetrics, STATUS_MISSING};
pub use scores::{AppraisalScores, ExtractionScores, ReportScores, StageScores};
pub use thresholds::{QualityThresholds, is_sufficient};
