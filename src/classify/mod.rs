//! Dialect classification via ONNX Runtime
//!
//! Wraps a pretrained audio-classification model exported to ONNX. The
//! session is loaded once at startup and shared read-only across requests;
//! it sits behind a `Mutex` because `Session::run` takes `&mut self`.
//!
//! The output is a passthrough of the model's ranking: every label paired
//! with its softmax score, sorted descending. No thresholding, no re-ranking.

pub mod model;

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use ort::session::Session;
use ort::value::Tensor;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};

/// Intra-op thread count for the classification session.
const INTRA_THREADS: usize = 4;

/// One predicted label with its confidence score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    pub label: String,
    pub score: f32,
}

/// Classification errors
#[derive(Debug, Error)]
pub enum ClassifyError {
    /// Model files missing or unreadable
    #[error("model not available: {0}")]
    ModelNotAvailable(String),

    /// ONNX Runtime session creation or inference failure
    #[error("inference error: {0}")]
    Inference(String),

    /// I/O error (model file read)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Seam between the pipeline and the model runtime.
///
/// The HTTP layer and its tests only see this trait, so exercising the
/// endpoint does not require model files on disk.
pub trait Classifier: Send + Sync + 'static {
    /// Classify a 16kHz mono waveform into ranked (label, score) pairs.
    fn classify(&self, samples: &[f32]) -> Result<Vec<Prediction>, ClassifyError>;
}

/// ONNX-backed dialect classifier.
pub struct OnnxClassifier {
    session: Mutex<Session>,
    labels: Vec<String>,
}

impl OnnxClassifier {
    /// Load the model from `model_dir` on a blocking thread.
    ///
    /// Called once at server startup; the returned instance is shared
    /// read-only for the lifetime of the process.
    pub async fn load(model_dir: PathBuf) -> Result<Arc<Self>, ClassifyError> {
        tokio::task::spawn_blocking(move || Self::load_sync(&model_dir))
            .await
            .map_err(|e| ClassifyError::Inference(format!("load task: {e}")))?
            .map(Arc::new)
    }

    fn load_sync(model_dir: &Path) -> Result<Self, ClassifyError> {
        info!("Loading classification model from {}", model_dir.display());

        let paths = model::ModelPaths::from_dir(model_dir);
        if !paths.all_exist() {
            return Err(ClassifyError::ModelNotAvailable(format!(
                "expected {:?} in {}",
                model::ModelPaths::NAMES,
                model_dir.display()
            )));
        }

        let session = Session::builder()
            .map_err(|e| ClassifyError::Inference(format!("session builder: {e}")))?
            .with_intra_threads(INTRA_THREADS)
            .map_err(|e| ClassifyError::Inference(format!("set threads: {e}")))?
            .commit_from_file(&paths.model)
            .map_err(|e| ClassifyError::Inference(format!("load model: {e}")))?;

        let labels = model::load_labels(&paths.labels)?;
        info!("Classifier ready: {} labels", labels.len());

        Ok(Self {
            session: Mutex::new(session),
            labels,
        })
    }

    fn infer(&self, samples: &[f32]) -> Result<Vec<Prediction>, ClassifyError> {
        if samples.is_empty() {
            return Err(ClassifyError::Inference("empty waveform".into()));
        }

        // Waveform tensor [1, N]
        let input = Tensor::from_array(([1i64, samples.len() as i64], samples.to_vec()))
            .map_err(|e| ClassifyError::Inference(format!("waveform tensor: {e}")))?;

        let mut session = self
            .session
            .lock()
            .map_err(|_| ClassifyError::Inference("classifier lock poisoned".into()))?;

        let outputs = session
            .run(ort::inputs!["input_values" => input])
            .map_err(|e| ClassifyError::Inference(format!("model run: {e}")))?;

        let (_, logits) = outputs["logits"]
            .try_extract_tensor::<f32>()
            .map_err(|e| ClassifyError::Inference(format!("extract logits: {e}")))?;

        if logits.len() != self.labels.len() {
            return Err(ClassifyError::Inference(format!(
                "logit count {} does not match label count {}",
                logits.len(),
                self.labels.len()
            )));
        }

        let scores = softmax(logits);
        debug!("Classifier scores: {scores:?}");

        let mut predictions: Vec<Prediction> = self
            .labels
            .iter()
            .zip(scores)
            .map(|(label, score)| Prediction {
                label: label.clone(),
                score,
            })
            .collect();
        predictions.sort_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(std::cmp::Ordering::Equal)
        });

        Ok(predictions)
    }
}

impl Classifier for OnnxClassifier {
    fn classify(&self, samples: &[f32]) -> Result<Vec<Prediction>, ClassifyError> {
        self.infer(samples)
    }
}

/// Numerically stable softmax over a logit slice.
fn softmax(logits: &[f32]) -> Vec<f32> {
    let max = logits.iter().copied().fold(f32::NEG_INFINITY, f32::max);
    let exps: Vec<f32> = logits.iter().map(|&l| (l - max).exp()).collect();
    let sum: f32 = exps.iter().sum();
    exps.iter().map(|&e| e / sum).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn softmax_sums_to_one_and_preserves_order() {
        let scores = softmax(&[2.0, 1.0, 0.1]);
        let sum: f32 = scores.iter().sum();
        assert!((sum - 1.0).abs() < 1e-5);
        assert!(scores[0] > scores[1] && scores[1] > scores[2]);
    }

    #[test]
    fn softmax_handles_large_logits() {
        let scores = softmax(&[1000.0, 999.0]);
        assert!(scores.iter().all(|s| s.is_finite()));
        assert!(scores[0] > scores[1]);
    }

    #[test]
    fn softmax_uniform_for_equal_logits() {
        let scores = softmax(&[0.5, 0.5, 0.5, 0.5]);
        for s in scores {
            assert!((s - 0.25).abs() < 1e-6);
        }
    }

    #[tokio::test]
    async fn load_requires_model_files() {
        let tmp = tempfile::tempdir().unwrap();
        let result = OnnxClassifier::load(tmp.path().to_path_buf()).await;
        assert!(matches!(result, Err(ClassifyError::ModelNotAvailable(_))));
    }
}
