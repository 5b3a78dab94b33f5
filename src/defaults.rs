//! Default configuration constants for cantosub.
//!
//! Shared constants used across configuration types to keep the audio,
//! recognition and merge stages agreeing on the same values.

/// Canonical audio sample rate in Hz.
///
/// 16kHz mono is what both the voice activity detector and the Whisper
/// models expect; every decoded waveform is normalized to this rate.
pub const SAMPLE_RATE: u32 = 16000;

/// RMS threshold (0.0 to 1.0) above which a frame counts as speech.
pub const VAD_THRESHOLD: f32 = 0.02;

/// Minimum silence run in milliseconds before a voice interval is closed.
///
/// 300ms keeps natural mid-sentence pauses inside one interval while still
/// splitting between sentences.
pub const MIN_SILENCE_MS: u32 = 300;

/// Minimum speech run in milliseconds for an interval to be kept.
///
/// Shorter bursts are treated as noise. 50ms is low on purpose so that
/// fast speech is not dropped.
pub const MIN_SPEECH_MS: u32 = 50;

/// Padding in milliseconds added around each detected voice interval.
///
/// Preserves soft onsets and word endings that sit below the energy
/// threshold.
pub const SPEECH_PAD_MS: u32 = 500;

/// Frame length in milliseconds used by the energy detector.
pub const VAD_FRAME_MS: u32 = 30;

/// Maximum gap in seconds between voice intervals before the merger stops
/// trusting a single recognition segment's own boundaries.
pub const MAX_GAP_SECS: f64 = 0.8;

/// Default language hint passed to the recognizer.
pub const DEFAULT_LANGUAGE: &str = "yue";

/// Default Whisper model name. Cantonese needs a multilingual model.
pub const DEFAULT_MODEL: &str = "large-v3";

/// Base vocabulary hint fed to the recognizer as its initial prompt.
///
/// Seeds the decoder with common Cantonese particles so it prefers
/// colloquial written forms over Mandarin homophones. Caller-supplied
/// vocabulary is appended to this, never substituted for it.
pub const BASE_VOCABULARY_PROMPT: &str =
    "以下係廣東話對白，請用粵語口語字幕：佢、喺、睇、嘅、咁、啲、咗、嚟、冇、諗、唔、咩、乜、點、邊、噉、嗰、呢、哋、咪、囉、喎、啦、㗎、吖。";

/// Frame rate of the fixed FCPXML format resource.
pub const FCPXML_FPS: u32 = 30;

/// Report the GPU backend compiled into this build.
///
/// Returns a human-readable name based on the compile-time feature flags.
/// Only one GPU backend can be active at a time; if none is enabled, returns "CPU".
pub fn gpu_backend() -> &'static str {
    if cfg!(feature = "cuda") {
        "CUDA"
    } else if cfg!(feature = "vulkan") {
        "Vulkan"
    } else if cfg!(feature = "hipblas") {
        "HipBLAS (AMD)"
    } else if cfg!(feature = "openblas") {
        "OpenBLAS"
    } else {
        "CPU"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gpu_backend_matches_compiled_feature() {
        let expected = if cfg!(feature = "cuda") {
            "CUDA"
        } else if cfg!(feature = "vulkan") {
            "Vulkan"
        } else if cfg!(feature = "hipblas") {
            "HipBLAS (AMD)"
        } else if cfg!(feature = "openblas") {
            "OpenBLAS"
        } else {
            "CPU"
        };
        assert_eq!(gpu_backend(), expected);
    }

    #[test]
    fn vad_frame_is_whole_samples() {
        // 30ms at 16kHz must be a whole number of samples
        assert_eq!(SAMPLE_RATE * VAD_FRAME_MS % 1000, 0);
    }
}
