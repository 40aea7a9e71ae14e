//! Audio decoding and normalization to 16kHz mono f32
//!
//! Loads the extracted waveform file with symphonia at its native rate and
//! channel count, downmixes multi-channel audio to mono by averaging, and
//! resamples to 16kHz with rubato when the native rate differs.

use std::fs::File;
use std::path::Path;

use rubato::{
    Resampler, SincFixedIn, SincInterpolationParameters, SincInterpolationType, WindowFunction,
};
use symphonia::core::audio::SampleBuffer;
use symphonia::core::codecs::{DecoderOptions, CODEC_TYPE_NULL};
use symphonia::core::formats::FormatOptions;
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;
use thiserror::Error;
use tracing::debug;

/// Sample rate the classification model expects.
pub const TARGET_SAMPLE_RATE: u32 = 16_000;

/// Waveform loading errors
#[derive(Debug, Error)]
pub enum AudioError {
    /// Probe, codec, or packet decoding failure
    #[error("audio decode error: {0}")]
    Decode(String),

    /// Rubato resampler failure
    #[error("resample error: {0}")]
    Resample(String),

    /// File open or read failure
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Load a waveform file as a flat mono f32 buffer at 16kHz.
pub fn load_mono_16k(path: &Path) -> Result<Vec<f32>, AudioError> {
    let file = File::open(path)?;
    let mss = MediaSourceStream::new(Box::new(file), Default::default());

    let mut hint = Hint::new();
    if let Some(ext) = path.extension().and_then(|e| e.to_str()) {
        hint.with_extension(ext);
    }

    let probed = symphonia::default::get_probe()
        .format(
            &hint,
            mss,
            &FormatOptions::default(),
            &MetadataOptions::default(),
        )
        .map_err(|e| AudioError::Decode(format!("probe failed: {e}")))?;

    let mut format = probed.format;

    let track = format
        .tracks()
        .iter()
        .find(|t| t.codec_params.codec != CODEC_TYPE_NULL)
        .ok_or_else(|| AudioError::Decode("no audio track found".into()))?;

    let codec_params = track.codec_params.clone();
    let track_id = track.id;
    let source_rate = codec_params.sample_rate.unwrap_or(TARGET_SAMPLE_RATE);
    let channels = codec_params.channels.map_or(1, |c| c.count());

    debug!(
        "Loading {}: {} channel(s) at {}Hz",
        path.display(),
        channels,
        source_rate
    );

    let mut decoder = symphonia::default::get_codecs()
        .make(&codec_params, &DecoderOptions::default())
        .map_err(|e| AudioError::Decode(format!("codec init failed: {e}")))?;

    let mut samples: Vec<f32> = Vec::new();

    loop {
        let packet = match format.next_packet() {
            Ok(p) => p,
            Err(symphonia::core::errors::Error::IoError(ref e))
                if e.kind() == std::io::ErrorKind::UnexpectedEof =>
            {
                break;
            }
            Err(e) => return Err(AudioError::Decode(format!("packet read: {e}"))),
        };

        if packet.track_id() != track_id {
            continue;
        }

        let decoded = match decoder.decode(&packet) {
            Ok(d) => d,
            // Malformed packets are skipped, not fatal
            Err(symphonia::core::errors::Error::DecodeError(_)) => continue,
            Err(e) => return Err(AudioError::Decode(format!("decode: {e}"))),
        };

        let spec = *decoded.spec();
        let n_frames = decoded.capacity();
        let mut sample_buf = SampleBuffer::<f32>::new(n_frames as u64, spec);
        sample_buf.copy_interleaved_ref(decoded);
        let interleaved = sample_buf.samples();

        // Downmix to mono by averaging across channels
        if channels > 1 {
            for frame in interleaved.chunks(channels) {
                let mono: f32 = frame.iter().sum::<f32>() / channels as f32;
                samples.push(mono);
            }
        } else {
            samples.extend_from_slice(interleaved);
        }
    }

    if samples.is_empty() {
        return Err(AudioError::Decode("no audio samples decoded".into()));
    }

    if source_rate != TARGET_SAMPLE_RATE {
        samples = resample(&samples, source_rate, TARGET_SAMPLE_RATE)?;
    }

    Ok(samples)
}

/// Resample mono audio from `from_rate` to `to_rate` using rubato sinc
/// interpolation. The final chunk is zero-padded to the fixed chunk size,
/// and the filter delay line is flushed with zero input so the tail of the
/// waveform is not lost; the output is trimmed to the exact rate-scaled
/// length.
fn resample(samples: &[f32], from_rate: u32, to_rate: u32) -> Result<Vec<f32>, AudioError> {
    let params = SincInterpolationParameters {
        sinc_len: 256,
        f_cutoff: 0.95,
        interpolation: SincInterpolationType::Linear,
        oversampling_factor: 256,
        window: WindowFunction::BlackmanHarris2,
    };

    let ratio = f64::from(to_rate) / f64::from(from_rate);
    let chunk_size = 1024;

    let mut resampler = SincFixedIn::<f32>::new(ratio, 2.0, params, chunk_size, 1)
        .map_err(|e| AudioError::Resample(format!("init: {e}")))?;

    let delay = resampler.output_delay();
    let expected = (samples.len() as f64 * ratio).round() as usize;

    let mut output = Vec::with_capacity(expected + chunk_size);

    for chunk in samples.chunks(chunk_size) {
        let input = if chunk.len() < chunk_size {
            let mut padded = chunk.to_vec();
            padded.resize(chunk_size, 0.0);
            vec![padded]
        } else {
            vec![chunk.to_vec()]
        };

        let resampled = resampler
            .process(&input, None)
            .map_err(|e| AudioError::Resample(format!("process: {e}")))?;

        if let Some(channel) = resampled.first() {
            output.extend_from_slice(channel);
        }
    }

    // Zero input until the filter has emitted everything still in flight
    let flush = vec![vec![0.0f32; chunk_size]];
    while output.len() < delay + expected {
        let resampled = resampler
            .process(&flush, None)
            .map_err(|e| AudioError::Resample(format!("flush: {e}")))?;

        match resampled.first() {
            Some(channel) if !channel.is_empty() => output.extend_from_slice(channel),
            _ => break,
        }
    }

    // Drop the leading filter delay and the trailing padding
    output.drain(..delay.min(output.len()));
    output.truncate(expected);

    debug!(
        "Resampled {} samples ({}Hz) to {} samples ({}Hz)",
        samples.len(),
        from_rate,
        output.len(),
        to_rate
    );

    Ok(output)
}
