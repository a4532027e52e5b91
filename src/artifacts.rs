//! Default filesystem sink for run artifacts.
//!
//! Writes pretty-printed JSON under a run directory using append-style
//! filenames keyed by iteration number, so concurrent runs over different
//! identifiers never collide. Two runs over the same identifier are not
//! safe and must be serialized by the caller.

use async_trait::async_trait;
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::Result;
use crate::hooks::ArtifactSink;
use crate::stage::Stage;
use crate::tracker::SavedPaths;

/// File-based [`ArtifactSink`] following the pipeline naming convention:
/// `{identifier}-{stage}{n}.json` per iteration,
/// `{identifier}-{stage}-best.json` for the winner, and
/// `{identifier}-{stage}-failed.json` for debugging dumps. Validation
/// reports go next to their results with a `-validation` suffix.
pub struct JsonFileSink {
    dir: PathBuf,
    identifier: String,
    stage: Stage,
}

impl JsonFileSink {
    pub fn new(dir: impl Into<PathBuf>, identifier: impl Into<String>, stage: Stage) -> Self {
        Self {
            dir: dir.into(),
            identifier: identifier.into(),
            stage,
        }
    }

    fn path_for(&self, suffix: &str) -> PathBuf {
        self.dir.join(format!("{}-{}{}.json", self.identifier, self.stage, suffix))
    }

    fn write(&self, path: &Path, value: &Value) -> Result<PathBuf> {
        fs::create_dir_all(&self.dir)?;
        let json = serde_json::to_string_pretty(value)?;
        fs::write(path, json)?;
        tracing::debug!(path = %path.display(), "Wrote artifact");
        Ok(path.to_path_buf())
    }

    fn write_pair(&self, suffix: &str, result: &Value, validation: &Value) -> Result<SavedPaths> {
        let result_path = self.write(&self.path_for(suffix), result)?;
        let validation_path = self.write(&self.path_for(&format!("{suffix}-validation")), validation)?;
        Ok(SavedPaths {
            result_path: Some(result_path),
            validation_path: Some(validation_path),
        })
    }
}

#[async_trait]
impl ArtifactSink for JsonFileSink {
    async fn save_iteration(&self, iteration_num: u32, result: &Value, validation: &Value) -> Result<SavedPaths> {
        self.write_pair(&iteration_num.to_string(), result, validation)
    }

    async fn save_best(&self, result: &Value, validation: &Value) -> Result<SavedPaths> {
        self.write_pair("-best", result, validation)
    }

    async fn save_failed(&self, result: &Value, validation: &Value) -> Result<SavedPaths> {
        self.write_pair("-failed", result, validation)
    }
}
