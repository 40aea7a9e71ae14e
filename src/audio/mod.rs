//! Waveform loading and normalization

pub mod loader;

pub use loader::{load_mono_16k, AudioError, TARGET_SAMPLE_RATE};
