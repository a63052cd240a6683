//! Persistence of batch results.

use crate::error::EvalResult;
use crate::result::BatchResult;
use std::path::{Path, PathBuf};
use tracing::info;

/// Saves and loads batch results.
pub trait ResultStore {
    /// Persist a result.
    fn save(&self, result: &BatchResult) -> EvalResult<()>;

    /// Read a previously saved result.
    fn load(&self) -> EvalResult<BatchResult>;
}

/// Stores one [`BatchResult`] as pretty-printed UTF-8 JSON at a fixed path.
///
/// Non-ASCII text is written verbatim and floats keep full precision, so a
/// save followed by a load returns an equal value.
#[derive(Debug, Clone)]
pub struct JsonResultStore {
    path: PathBuf,
}

impl JsonResultStore {
    /// Create a store for `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Target file.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ResultStore for JsonResultStore {
    fn save(&self, result: &BatchResult) -> EvalResult<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        std::fs::write(&self.path, result.to_json()?)?;
        info!(path = %self.path.display(), samples = result.total_samples(), "Saved results");
        Ok(())
    }

    fn load(&self) -> EvalResult<BatchResult> {
        let json = std::fs::read_to_string(&self.path)?;
        BatchResult::from_json(&json)
    }
}
