//! Video download via yt-dlp
//!
//! Supports direct media links and the hosting platforms yt-dlp knows about.
//! Every failure mode is an explicit `FetchError` variant rather than a
//! panic; the caller degrades to an error response.

use std::ffi::OsString;
use std::path::Path;

use thiserror::Error;
use tokio::process::Command;
use tracing::{debug, info, warn};
use url::Url;

use crate::config::Config;

/// Format preference: a single MP4 combining best video+audio, falling back
/// to whatever combined media yt-dlp can produce.
const FORMAT_PREFERENCE: &str = "bestvideo[ext=mp4]+bestaudio[ext=m4a]/best[ext=mp4]/best";

/// Video fetch errors
#[derive(Debug, Error)]
pub enum FetchError {
    /// yt-dlp binary not found on the host
    #[error("download tool not found: {0}")]
    ToolMissing(String),

    /// yt-dlp exited with a failure status
    #[error("yt-dlp failed (exit code {code:?}): {stderr}")]
    ToolFailed {
        code: Option<i32>,
        stderr: String,
    },

    /// yt-dlp reported success but wrote nothing usable
    #[error("download produced no output at {0}")]
    NoOutput(String),

    /// I/O error around the subprocess invocation
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// yt-dlp subprocess wrapper
pub struct VideoFetcher {
    binary: String,
    ffmpeg_location: Option<OsString>,
}

impl VideoFetcher {
    pub fn new(config: &Config) -> Self {
        // yt-dlp needs ffmpeg for format merging; forward an override only
        // when it actually exists, otherwise let yt-dlp search PATH.
        let ffmpeg_location = match &config.ffmpeg_path {
            Some(path) if path.exists() => path
                .parent()
                .map(|dir| dir.as_os_str().to_os_string()),
            Some(path) => {
                warn!(
                    "Configured ffmpeg path {} does not exist; yt-dlp will search PATH",
                    path.display()
                );
                None
            }
            None => None,
        };

        Self {
            binary: config.yt_dlp_path.clone(),
            ffmpeg_location,
        }
    }

    /// Check whether the download tool can be invoked on this host.
    pub fn is_available(&self) -> bool {
        std::process::Command::new(&self.binary)
            .arg("--version")
            .output()
            .is_ok()
    }

    /// Download the video at `url` to `output`.
    ///
    /// A pre-existing file at the output path is removed first so yt-dlp
    /// starts from a clean slate. After a zero exit the output must exist
    /// and be non-empty.
    pub async fn download(&self, url: &Url, output: &Path) -> Result<(), FetchError> {
        info!("Attempting to download video from: {url}");

        if output.exists() {
            tokio::fs::remove_file(output).await?;
        }

        let args = self.build_args(url, output);
        debug!("Invoking {} {:?}", self.binary, args);

        let result = Command::new(&self.binary).args(&args).output().await;

        let out = match result {
            Ok(out) => out,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(FetchError::ToolMissing(self.binary.clone()));
            }
            Err(e) => return Err(FetchError::Io(e)),
        };

        if !out.status.success() {
            let stderr = String::from_utf8_lossy(&out.stderr).trim().to_string();
            return Err(FetchError::ToolFailed {
                code: out.status.code(),
                stderr,
            });
        }

        let wrote_output = tokio::fs::metadata(output)
            .await
            .map(|m| m.len() > 0)
            .unwrap_or(false);
        if !wrote_output {
            return Err(FetchError::NoOutput(output.display().to_string()));
        }

        info!("Video downloaded successfully to: {}", output.display());
        Ok(())
    }

    /// yt-dlp argument list for one download.
    fn build_args(&self, url: &Url, output: &Path) -> Vec<OsString> {
        let mut args: Vec<OsString> = vec![
            "-o".into(),
            output.as_os_str().to_os_string(),
            "--no-check-certificate".into(),
        ];

        if let Some(dir) = &self.ffmpeg_location {
            args.push("--ffmpeg-location".into());
            args.push(dir.clone());
        }

        args.push("-f".into());
        args.push(FORMAT_PREFERENCE.into());
        args.push(url.as_str().into());

        args
    }
}
