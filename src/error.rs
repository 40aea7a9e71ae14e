//! Pipeline error type
//!
//! One error per failed pipeline stage. All three kinds are recovered at the
//! handler boundary and reported to the caller in the response body; none of
//! them propagate as a process crash.

use thiserror::Error;

use crate::audio::AudioError;
use crate::classify::ClassifyError;
use crate::pipeline::extract::ExtractError;
use crate::pipeline::fetch::FetchError;

/// Error from the per-request classification pipeline
#[derive(Debug, Error)]
pub enum PipelineError {
    /// Video download failed (tool missing, network, unsupported source)
    #[error("download failed: {0}")]
    Download(#[from] FetchError),

    /// Audio extraction failed (missing input or media toolchain error)
    #[error("extraction failed: {0}")]
    Extract(#[from] ExtractError),

    /// Anything unexpected from the normalize or classify stages
    #[error("internal error: {0}")]
    Internal(String),
}

impl PipelineError {
    /// Caller-facing error message for the `error` response field.
    pub fn user_message(&self) -> String {
        match self {
            Self::Download(_) => "Failed to download the video.".to_string(),
            Self::Extract(_) => "Failed to extract audio from the video.".to_string(),
            Self::Internal(detail) => {
                format!("An internal server error occurred: {detail}")
            }
        }
    }
}

impl From<AudioError> for PipelineError {
    fn from(err: AudioError) -> Self {
        Self::Internal(err.to_string())
    }
}

impl From<ClassifyError> for PipelineError {
    fn from(err: ClassifyError) -> Self {
        Self::Internal(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn download_failure_message_is_stable() {
        let err = PipelineError::Download(FetchError::ToolMissing("yt-dlp".into()));
        assert_eq!(err.user_message(), "Failed to download the video.");
    }

    #[test]
    fn extract_failure_message_is_stable() {
        let err = PipelineError::Extract(ExtractError::InputMissing("/tmp/x.mp4".into()));
        assert_eq!(
            err.user_message(),
            "Failed to extract audio from the video."
        );
    }

    #[test]
    fn normalize_and_classify_errors_become_internal() {
        let err: PipelineError = AudioError::Decode("no audio track found".into()).into();
        assert!(matches!(err, PipelineError::Internal(_)));
        assert!(err.user_message().starts_with("An internal server error occurred:"));

        let err: PipelineError = ClassifyError::Inference("logits missing".into()).into();
        assert!(matches!(err, PipelineError::Internal(_)));
    }
}
