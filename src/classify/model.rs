//! Model file layout and label loading
//!
//! The model directory holds two artifacts: the exported ONNX graph and an
//! ordered JSON array of label strings whose index is the model's class id.

use std::path::{Path, PathBuf};

use crate::classify::ClassifyError;

/// Typed paths for the required model files.
pub struct ModelPaths {
    /// Exported classification graph (`model.onnx`)
    pub model: PathBuf,
    /// Ordered class labels (`labels.json`)
    pub labels: PathBuf,
}

impl ModelPaths {
    /// All required model filenames.
    pub const NAMES: &[&str] = &["model.onnx", "labels.json"];

    /// Construct paths for all model files under `dir`.
    pub fn from_dir(dir: impl AsRef<Path>) -> Self {
        let dir = dir.as_ref();
        Self {
            model: dir.join("model.onnx"),
            labels: dir.join("labels.json"),
        }
    }

    /// Check that both required files exist.
    pub fn all_exist(&self) -> bool {
        self.model.exists() && self.labels.exists()
    }
}

/// Load the ordered label list from `labels.json`.
pub fn load_labels(path: &Path) -> Result<Vec<String>, ClassifyError> {
    let content = std::fs::read_to_string(path)?;
    let labels: Vec<String> = serde_json::from_str(&content)
        .map_err(|e| ClassifyError::ModelNotAvailable(format!("labels.json: {e}")))?;

    if labels.is_empty() {
        return Err(ClassifyError::ModelNotAvailable(
            "labels.json contains no labels".into(),
        ));
    }

    Ok(labels)
}
