//! Service configuration
//!
//! Resolution priority: command-line argument, then environment variable
//! (both handled by clap in main.rs), then TOML config file, then compiled
//! defaults.

use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

/// Configuration loading errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Read {
        path: String,
        source: std::io::Error,
    },

    #[error("Failed to parse config file {path}: {source}")]
    Parse {
        path: String,
        source: toml::de::Error,
    },
}

/// Dialect API configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// HTTP listen port
    pub port: u16,

    /// Origins allowed to call the API with credentials
    pub allowed_origins: Vec<String>,

    /// yt-dlp binary name or path
    pub yt_dlp_path: String,

    /// ffmpeg binary name or path (also forwarded to yt-dlp as
    /// --ffmpeg-location when it points at an existing file)
    pub ffmpeg_path: Option<PathBuf>,

    /// Directory containing model.onnx and labels.json
    pub model_dir: PathBuf,

    /// Directory for per-request scratch files
    pub scratch_dir: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: 8000,
            allowed_origins: vec!["http://localhost:3000".to_string()],
            yt_dlp_path: "yt-dlp".to_string(),
            ffmpeg_path: None,
            model_dir: PathBuf::from("model"),
            scratch_dir: std::env::temp_dir(),
        }
    }
}

impl Config {
    /// Load configuration from an optional TOML file.
    ///
    /// With no file, compiled defaults are returned. A file that exists but
    /// cannot be read or parsed is an error rather than a silent fallback.
    pub fn load(config_file: Option<&Path>) -> Result<Self, ConfigError> {
        let Some(path) = config_file else {
            return Ok(Self::default());
        };

        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;

        toml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.display().to_string(),
            source,
        })
    }

    /// Effective ffmpeg binary for the audio extraction step.
    pub fn ffmpeg_binary(&self) -> PathBuf {
        self.ffmpeg_path
            .clone()
            .unwrap_or_else(|| PathBuf::from("ffmpeg"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_service_contract() {
        let config = Config::default();
        assert_eq!(config.port, 8000);
        assert_eq!(config.allowed_origins, vec!["http://localhost:3000"]);
        assert_eq!(config.yt_dlp_path, "yt-dlp");
        assert!(config.ffmpeg_path.is_none());
        assert_eq!(config.ffmpeg_binary(), PathBuf::from("ffmpeg"));
    }

    #[test]
    fn load_without_file_returns_defaults() {
        let config = Config::load(None).unwrap();
        assert_eq!(config.port, Config::default().port);
    }

    #[test]
    fn partial_toml_overrides_defaults() {
        let toml_content = r#"
            port = 9100
            allowed_origins = ["https://frontend.example.com"]
            yt_dlp_path = "/opt/bin/yt-dlp"
        "#;
        let config: Config = toml::from_str(toml_content).unwrap();
        assert_eq!(config.port, 9100);
        assert_eq!(config.allowed_origins, vec!["https://frontend.example.com"]);
        assert_eq!(config.yt_dlp_path, "/opt/bin/yt-dlp");
        // Unspecified fields keep defaults
        assert_eq!(config.model_dir, PathBuf::from("model"));
    }

    #[test]
    fn unknown_field_rejected() {
        let result = toml::from_str::<Config>("listen_port = 9100");
        assert!(result.is_err());
    }

    #[test]
    fn load_missing_file_is_error() {
        let result = Config::load(Some(Path::new("/nonexistent/dialect-api.toml")));
        assert!(matches!(result, Err(ConfigError::Read { .. })));
    }

    #[test]
    fn ffmpeg_override_used_when_set() {
        let config = Config {
            ffmpeg_path: Some(PathBuf::from("/opt/ffmpeg/ffmpeg")),
            ..Config::default()
        };
        assert_eq!(config.ffmpeg_binary(), PathBuf::from("/opt/ffmpeg/ffmpeg"));
    }
}
