//! Pipeline integration tests
//!
//! Exercises the orchestrator directly with fake tool binaries, asserting
//! the error classification of each stage, unconditional scratch cleanup,
//! and scratch-path isolation under concurrent load.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use url::Url;

use dialect_api::classify::{Classifier, ClassifyError, Prediction};
use dialect_api::pipeline::classify_url;
use dialect_api::{Config, PipelineError};

struct StubClassifier;

impl Classifier for StubClassifier {
    fn classify(&self, samples: &[f32]) -> Result<Vec<Prediction>, ClassifyError> {
        assert!(!samples.is_empty(), "classifier received empty waveform");
        Ok(vec![Prediction {
            label: "australia".to_string(),
            score: 0.9,
        }])
    }
}

fn stub() -> Arc<dyn Classifier> {
    Arc::new(StubClassifier)
}

fn test_url() -> Url {
    Url::parse("https://example.com/clip.mp4").unwrap()
}

#[cfg(unix)]
fn write_script(dir: &Path, name: &str, body: &str) -> PathBuf {
    use std::os::unix::fs::PermissionsExt;
    let path = dir.join(name);
    std::fs::write(&path, body).unwrap();
    std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
    path
}

#[cfg(unix)]
fn write_wav_fixture(path: &Path) {
    let spec = hound::WavSpec {
        channels: 1,
        sample_rate: 16000,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };
    let mut writer = hound::WavWriter::create(path, spec).unwrap();
    for i in 0..8000 {
        let s = (i as f32 / 16000.0 * 220.0 * std::f32::consts::TAU).sin() * 0.4;
        writer.write_sample((s * i16::MAX as f32) as i16).unwrap();
    }
    writer.finalize().unwrap();
}

/// Fake yt-dlp (writes its `-o` argument) plus fake ffmpeg (copies the WAV
/// fixture to its final argument).
#[cfg(unix)]
fn working_toolchain(tools: &Path) -> (PathBuf, PathBuf) {
    let fixture = tools.join("fixture.wav");
    write_wav_fixture(&fixture);

    let yt_dlp = write_script(tools, "yt-dlp", "#!/bin/sh\nprintf video > \"$2\"\n");
    let ffmpeg = write_script(
        tools,
        "ffmpeg",
        &format!(
            "#!/bin/sh\nfor a in \"$@\"; do out=\"$a\"; done\ncp {} \"$out\"\n",
            fixture.display()
        ),
    );
    (yt_dlp, ffmpeg)
}

#[tokio::test]
async fn missing_downloader_classified_as_download_failure() {
    let scratch = tempfile::tempdir().unwrap();
    let config = Config {
        yt_dlp_path: "/nonexistent/yt-dlp".to_string(),
        scratch_dir: scratch.path().to_path_buf(),
        ..Config::default()
    };

    let err = classify_url(&config, stub(), &test_url()).await.unwrap_err();
    assert!(matches!(err, PipelineError::Download(_)));
    assert_eq!(std::fs::read_dir(scratch.path()).unwrap().count(), 0);
}

#[cfg(unix)]
#[tokio::test]
async fn failing_extractor_classified_as_extract_failure() {
    let tools = tempfile::tempdir().unwrap();
    let scratch = tempfile::tempdir().unwrap();

    let yt_dlp = write_script(tools.path(), "yt-dlp", "#!/bin/sh\nprintf video > \"$2\"\n");
    let ffmpeg = write_script(tools.path(), "ffmpeg", "#!/bin/sh\nexit 1\n");

    let config = Config {
        yt_dlp_path: yt_dlp.display().to_string(),
        ffmpeg_path: Some(ffmpeg),
        scratch_dir: scratch.path().to_path_buf(),
        ..Config::default()
    };

    let err = classify_url(&config, stub(), &test_url()).await.unwrap_err();
    assert!(matches!(err, PipelineError::Extract(_)));

    // Both scratch files removed even though only the video was written
    assert_eq!(std::fs::read_dir(scratch.path()).unwrap().count(), 0);
}

#[cfg(unix)]
#[tokio::test]
async fn full_pipeline_succeeds_with_working_toolchain() {
    let tools = tempfile::tempdir().unwrap();
    let scratch = tempfile::tempdir().unwrap();
    let (yt_dlp, ffmpeg) = working_toolchain(tools.path());

    let config = Config {
        yt_dlp_path: yt_dlp.display().to_string(),
        ffmpeg_path: Some(ffmpeg),
        scratch_dir: scratch.path().to_path_buf(),
        ..Config::default()
    };

    let results = classify_url(&config, stub(), &test_url()).await.unwrap();
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].label, "australia");

    assert_eq!(std::fs::read_dir(scratch.path()).unwrap().count(), 0);
}

#[cfg(unix)]
#[tokio::test]
async fn concurrent_requests_do_not_collide_on_scratch_files() {
    let tools = tempfile::tempdir().unwrap();
    let scratch = tempfile::tempdir().unwrap();
    let (yt_dlp, ffmpeg) = working_toolchain(tools.path());

    let config = Config {
        yt_dlp_path: yt_dlp.display().to_string(),
        ffmpeg_path: Some(ffmpeg),
        scratch_dir: scratch.path().to_path_buf(),
        ..Config::default()
    };

    let mut handles = Vec::new();
    for _ in 0..8 {
        let config = config.clone();
        handles.push(tokio::spawn(async move {
            classify_url(&config, stub(), &test_url()).await
        }));
    }

    for handle in handles {
        let results = handle.await.unwrap().unwrap();
        assert_eq!(results[0].label, "australia");
    }

    // Every request cleaned up its own uniquely named pair
    assert_eq!(std::fs::read_dir(scratch.path()).unwrap().count(), 0);
}
