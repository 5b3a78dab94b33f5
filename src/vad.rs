//! Voice activity detection over a decoded waveform.
//!
//! Walks the waveform in fixed frames, classifies each frame by RMS energy
//! and folds runs of speech frames into ordered `VoiceInterval`s. The
//! detector sits behind a trait so the pipeline can be tested without
//! audio at all.

use crate::audio::Waveform;
use crate::defaults;
use crate::error::Result;
use crate::segment::{TimeSpan, VoiceInterval};

/// Trait for voice activity detection.
///
/// Implementations return ordered, non-overlapping intervals of detected
/// speech energy.
pub trait VoiceDetector: Send + Sync {
    fn detect(&self, waveform: &Waveform) -> Result<Vec<VoiceInterval>>;

    /// Name of the detector for logging.
    fn name(&self) -> &str;
}

/// Configuration for the energy detector.
#[derive(Debug, Clone, Copy)]
pub struct VadConfig {
    /// RMS threshold for detecting speech (0.0 to 1.0).
    pub speech_threshold: f32,
    /// Silence run in milliseconds that closes an interval.
    pub min_silence_ms: u32,
    /// Minimum interval length in milliseconds to keep.
    pub min_speech_ms: u32,
    /// Padding added to both ends of each interval.
    pub speech_pad_ms: u32,
}

impl Default for VadConfig {
    fn default() -> Self {
        Self {
            speech_threshold: defaults::VAD_THRESHOLD,
            min_silence_ms: defaults::MIN_SILENCE_MS,
            min_speech_ms: defaults::MIN_SPEECH_MS,
            speech_pad_ms: defaults::SPEECH_PAD_MS,
        }
    }
}

/// RMS-energy voice detector.
pub struct EnergyVad {
    config: VadConfig,
}

impl EnergyVad {
    pub fn new(config: VadConfig) -> Self {
        Self { config }
    }
}

impl Default for EnergyVad {
    fn default() -> Self {
        Self::new(VadConfig::default())
    }
}

impl VoiceDetector for EnergyVad {
    fn detect(&self, waveform: &Waveform) -> Result<Vec<VoiceInterval>> {
        if waveform.is_empty() {
            return Ok(Vec::new());
        }

        let frame_len =
            (waveform.sample_rate as u64 * defaults::VAD_FRAME_MS as u64 / 1000) as usize;
        let frame_secs = frame_len as f64 / waveform.sample_rate as f64;
        let silence_frames = frames_for_ms(self.config.min_silence_ms, frame_secs);
        let pad_secs = self.config.speech_pad_ms as f64 / 1000.0;
        let min_speech_secs = self.config.min_speech_ms as f64 / 1000.0;
        let total_secs = waveform.duration_secs();

        // Raw speech runs in seconds, before padding
        let mut runs: Vec<(f64, f64)> = Vec::new();
        let mut run_start: Option<f64> = None;
        let mut silent_count: usize = 0;
        let mut last_voiced_end = 0.0;

        for (i, frame) in waveform.samples.chunks(frame_len).enumerate() {
            let t = i as f64 * frame_secs;
            let voiced = calculate_rms(frame) > self.config.speech_threshold;

            if voiced {
                if run_start.is_none() {
                    run_start = Some(t);
                }
                silent_count = 0;
                last_voiced_end = t + frame.len() as f64 / waveform.sample_rate as f64;
            } else if let Some(start) = run_start {
                silent_count += 1;
                if silent_count >= silence_frames {
                    runs.push((start, last_voiced_end));
                    run_start = None;
                    silent_count = 0;
                }
            }
        }
        if let Some(start) = run_start {
            runs.push((start, last_voiced_end));
        }

        // Drop too-short runs, pad the rest, and clamp pads so neighbouring
        // intervals never overlap.
        let mut intervals = Vec::new();
        for (i, &(start, end)) in runs.iter().enumerate() {
            if end - start < min_speech_secs {
                continue;
            }

            let mut padded_start = (start - pad_secs).max(0.0);
            let mut padded_end = (end + pad_secs).min(total_secs);

            if i > 0 {
                let prev_end = runs[i - 1].1;
                padded_start = padded_start.max((prev_end + start) / 2.0).min(start);
            }
            if i + 1 < runs.len() {
                let next_start = runs[i + 1].0;
                padded_end = padded_end.min((end + next_start) / 2.0).max(end);
            }

            if padded_end > padded_start {
                intervals.push(VoiceInterval::new(TimeSpan::new(padded_start, padded_end)?));
            }
        }

        Ok(intervals)
    }

    fn name(&self) -> &str {
        "energy-vad"
    }
}

fn frames_for_ms(ms: u32, frame_secs: f64) -> usize {
    ((ms as f64 / 1000.0) / frame_secs).ceil().max(1.0) as usize
}

/// Root mean square of a frame, normalized to [0.0, 1.0].
pub fn calculate_rms(samples: &[i16]) -> f32 {
    if samples.is_empty() {
        return 0.0;
    }

    let sum_squares: f64 = samples
        .iter()
        .map(|&sample| {
            let normalized = sample as f64 / i16::MAX as f64;
            normalized * normalized
        })
        .sum();

    let mean_square = sum_squares / samples.len() as f64;
    mean_square.sqrt() as f32
}

/// Mock detector returning canned intervals.
#[derive(Debug, Clone, Default)]
pub struct MockVoiceDetector {
    intervals: Vec<VoiceInterval>,
}

impl MockVoiceDetector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_intervals(mut self, intervals: Vec<VoiceInterval>) -> Self {
        self.intervals = intervals;
        self
    }
}

impl VoiceDetector for MockVoiceDetector {
    fn detect(&self, _waveform: &Waveform) -> Result<Vec<VoiceInterval>> {
        Ok(self.intervals.clone())
    }

    fn name(&self) -> &str {
        "mock-vad"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const RATE: u32 = 16000;

    fn samples_for_secs(secs: f64, amplitude: i16) -> Vec<i16> {
        vec![amplitude; (secs * RATE as f64) as usize]
    }

    fn detect(pattern: &[(f64, i16)]) -> Vec<VoiceInterval> {
        let mut samples = Vec::new();
        for &(secs, amp) in pattern {
            samples.extend(samples_for_secs(secs, amp));
        }
        EnergyVad::default()
            .detect(&Waveform::new(samples))
            .unwrap()
    }

    #[test]
    fn rms_silence_is_zero() {
        assert_eq!(calculate_rms(&vec![0i16; 1000]), 0.0);
    }

    #[test]
    fn rms_max_amplitude_is_one() {
        let rms = calculate_rms(&vec![i16::MAX; 1000]);
        assert!((rms - 1.0).abs() < 0.001, "RMS should be ~1.0, got {}", rms);
    }

    #[test]
    fn rms_negative_samples_match_positive() {
        let rms = calculate_rms(&vec![i16::MIN; 1000]);
        assert!(rms > 0.99);
    }

    #[test]
    fn rms_empty_is_zero() {
        assert_eq!(calculate_rms(&[]), 0.0);
    }

    #[test]
    fn empty_waveform_yields_no_intervals() {
        let intervals = EnergyVad::default()
            .detect(&Waveform::new(Vec::new()))
            .unwrap();
        assert!(intervals.is_empty());
    }

    #[test]
    fn pure_silence_yields_no_intervals() {
        let intervals = detect(&[(2.0, 0)]);
        assert!(intervals.is_empty());
    }

    #[test]
    fn single_speech_burst_yields_one_interval() {
        let intervals = detect(&[(0.5, 0), (1.0, 3000), (0.5, 0)]);

        assert_eq!(intervals.len(), 1);
        let span = intervals[0].span;
        // Padding widens the raw 0.5..1.5 run, bounded by the waveform
        assert!(span.start() <= 0.5);
        assert!(span.end() >= 1.5);
        assert!(span.start() >= 0.0);
        assert!(span.end() <= 2.0 + 1e-9);
    }

    #[test]
    fn long_silence_splits_into_two_intervals() {
        let intervals = detect(&[(1.0, 3000), (1.5, 0), (1.0, 3000)]);

        assert_eq!(intervals.len(), 2);
        assert!(intervals[0].span.end() <= intervals[1].span.start());
    }

    #[test]
    fn short_pause_stays_one_interval() {
        // 100ms pause is below the 300ms silence threshold
        let intervals = detect(&[(1.0, 3000), (0.1, 0), (1.0, 3000)]);
        assert_eq!(intervals.len(), 1);
    }

    #[test]
    fn tiny_burst_is_dropped() {
        let config = VadConfig {
            min_speech_ms: 200,
            speech_pad_ms: 0,
            ..Default::default()
        };
        // 60ms of speech is below the 200ms minimum
        let mut samples = samples_for_secs(0.5, 0);
        samples.extend(samples_for_secs(0.06, 3000));
        samples.extend(samples_for_secs(0.5, 0));

        let intervals = EnergyVad::new(config)
            .detect(&Waveform::new(samples))
            .unwrap();
        assert!(intervals.is_empty());
    }

    #[test]
    fn intervals_are_ordered_and_disjoint() {
        let intervals = detect(&[
            (0.5, 3000),
            (0.6, 0),
            (0.5, 3000),
            (0.6, 0),
            (0.5, 3000),
        ]);

        assert_eq!(intervals.len(), 3);
        for pair in intervals.windows(2) {
            assert!(pair[0].span.end() <= pair[1].span.start() + 1e-9);
        }
    }

    #[test]
    fn speech_at_end_of_file_is_closed() {
        let intervals = detect(&[(0.5, 0), (1.0, 3000)]);
        assert_eq!(intervals.len(), 1);
        assert!(intervals[0].span.end() <= 1.5 + 1e-9);
    }

    #[test]
    fn mock_detector_returns_canned_intervals() {
        let canned = vec![VoiceInterval::new(TimeSpan::new(0.2, 3.8).unwrap())];
        let detector = MockVoiceDetector::new().with_intervals(canned.clone());
        let result = detector.detect(&Waveform::new(Vec::new())).unwrap();
        assert_eq!(result, canned);
    }

    #[test]
    fn detector_trait_is_object_safe() {
        let detector: Box<dyn VoiceDetector> = Box::new(MockVoiceDetector::new());
        assert_eq!(detector.name(), "mock-vad");
    }
}
