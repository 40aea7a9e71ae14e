//! Per-request classification pipeline
//!
//! One linear pass per request:
//! download → extract → normalize → classify.
//!
//! Both scratch files live behind `ScratchFile` guards, so cleanup happens
//! on every exit path, success or failure. Subprocesses run under
//! `tokio::process`; decoding and inference run on blocking threads so
//! concurrent requests are not stalled.

pub mod extract;
pub mod fetch;
pub mod scratch;

use std::sync::Arc;
use std::time::Instant;

use tracing::{debug, info};
use url::Url;

use crate::audio;
use crate::classify::{Classifier, Prediction};
use crate::config::Config;
use crate::error::PipelineError;
use extract::AudioExtractor;
use fetch::VideoFetcher;
use scratch::ScratchFile;

/// Run the full pipeline for one URL and return the ranked predictions.
pub async fn classify_url(
    config: &Config,
    classifier: Arc<dyn Classifier>,
    url: &Url,
) -> Result<Vec<Prediction>, PipelineError> {
    let started = Instant::now();

    let video = ScratchFile::new(&config.scratch_dir, "mp4");
    let audio_file = ScratchFile::new(&config.scratch_dir, "wav");

    VideoFetcher::new(config)
        .download(url, video.path())
        .await?;

    AudioExtractor::new(config)
        .extract(video.path(), audio_file.path())
        .await?;

    // Normalize: decode, downmix to mono, resample to 16kHz
    let wav_path = audio_file.path().to_path_buf();
    let samples = tokio::task::spawn_blocking(move || audio::load_mono_16k(&wav_path))
        .await
        .map_err(|e| PipelineError::Internal(format!("normalize task: {e}")))??;
    debug!(
        "Normalized waveform: {} samples ({:.1}s at {}Hz)",
        samples.len(),
        samples.len() as f64 / f64::from(audio::TARGET_SAMPLE_RATE),
        audio::TARGET_SAMPLE_RATE
    );

    // Classify on a blocking thread; the model session is shared read-only
    let results = tokio::task::spawn_blocking(move || classifier.classify(&samples))
        .await
        .map_err(|e| PipelineError::Internal(format!("classify task: {e}")))??;

    info!(
        "Pipeline completed in {:.2}s ({} predictions)",
        started.elapsed().as_secs_f64(),
        results.len()
    );

    Ok(results)
}
