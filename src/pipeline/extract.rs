//! Audio extraction via ffmpeg
//!
//! Demuxes the audio track from a downloaded video and writes it as
//! single-channel 16kHz 16-bit PCM WAV, the input format the classification
//! model expects.

use std::ffi::OsString;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tokio::process::Command;
use tracing::{debug, info};

use crate::config::Config;

/// Extraction target: speech-model rate, mono, s16 PCM.
const TARGET_SAMPLE_RATE: &str = "16000";

/// Audio extraction errors
#[derive(Debug, Error)]
pub enum ExtractError {
    /// Input video file does not exist
    #[error("video file not found: {0}")]
    InputMissing(String),

    /// ffmpeg binary not found on the host
    #[error("extraction tool not found: {0}")]
    ToolMissing(String),

    /// ffmpeg exited with a failure status
    #[error("ffmpeg failed (exit code {code:?}): {stderr}")]
    ToolFailed {
        code: Option<i32>,
        stderr: String,
    },

    /// ffmpeg reported success but wrote nothing usable
    #[error("extraction produced no output at {0}")]
    NoOutput(String),

    /// I/O error around the subprocess invocation
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// ffmpeg subprocess wrapper
pub struct AudioExtractor {
    binary: PathBuf,
}

impl AudioExtractor {
    pub fn new(config: &Config) -> Self {
        Self {
            binary: config.ffmpeg_binary(),
        }
    }

    /// Extract the audio track of `video` into a 16kHz mono PCM WAV at
    /// `output`. The input is checked before the tool is spawned so a missing
    /// video surfaces as its own error kind.
    pub async fn extract(&self, video: &Path, output: &Path) -> Result<(), ExtractError> {
        if !video.exists() {
            return Err(ExtractError::InputMissing(video.display().to_string()));
        }

        info!("Extracting audio from: {}", video.display());

        let args = build_args(video, output);
        debug!("Invoking {} {:?}", self.binary.display(), args);

        let result = Command::new(&self.binary).args(&args).output().await;

        let out = match result {
            Ok(out) => out,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(ExtractError::ToolMissing(
                    self.binary.display().to_string(),
                ));
            }
            Err(e) => return Err(ExtractError::Io(e)),
        };

        if !out.status.success() {
            let stderr = String::from_utf8_lossy(&out.stderr).trim().to_string();
            return Err(ExtractError::ToolFailed {
                code: out.status.code(),
                stderr,
            });
        }

        let wrote_output = tokio::fs::metadata(output)
            .await
            .map(|m| m.len() > 0)
            .unwrap_or(false);
        if !wrote_output {
            return Err(ExtractError::NoOutput(output.display().to_string()));
        }

        info!("Audio extracted successfully to: {}", output.display());
        Ok(())
    }
}

/// ffmpeg argument list: drop video, encode pcm_s16le, 16kHz, mono.
fn build_args(video: &Path, output: &Path) -> Vec<OsString> {
    vec![
        "-y".into(),
        "-i".into(),
        video.as_os_str().to_os_string(),
        "-vn".into(),
        "-acodec".into(),
        "pcm_s16le".into(),
        "-ar".into(),
        TARGET_SAMPLE_RATE.into(),
        "-ac".into(),
        "1".into(),
        output.as_os_str().to_os_string(),
    ]
}
