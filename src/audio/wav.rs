//! WAV parsing into the canonical waveform.
//!
//! Accepts arbitrary sample rates and channel counts, downmixing to mono
//! and resampling to 16kHz.

use crate::audio::Waveform;
use crate::defaults::SAMPLE_RATE;
use crate::error::{CantosubError, Result};
use std::io::Read;

/// Parse WAV data from any reader into a canonical waveform.
pub fn read_wav(reader: impl Read) -> Result<Waveform> {
    let mut wav_reader = hound::WavReader::new(reader).map_err(|e| CantosubError::Decode {
        message: format!("Failed to parse WAV data: {}", e),
    })?;

    let spec = wav_reader.spec();
    let source_rate = spec.sample_rate;
    let source_channels = spec.channels;

    let raw_samples: Vec<i16> = match spec.sample_format {
        hound::SampleFormat::Int => wav_reader
            .samples::<i16>()
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(|e| CantosubError::Decode {
                message: format!("Failed to read WAV samples: {}", e),
            })?,
        hound::SampleFormat::Float => wav_reader
            .samples::<f32>()
            .map(|s| s.map(|v| (v.clamp(-1.0, 1.0) * i16::MAX as f32) as i16))
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(|e| CantosubError::Decode {
                message: format!("Failed to read WAV samples: {}", e),
            })?,
    };

    // Downmix to mono by averaging channels
    let mono_samples = if source_channels > 1 {
        raw_samples
            .chunks_exact(source_channels as usize)
            .map(|frame| {
                let sum: i32 = frame.iter().map(|&s| s as i32).sum();
                (sum / source_channels as i32) as i16
            })
            .collect()
    } else {
        raw_samples
    };

    let samples = if source_rate != SAMPLE_RATE {
        resample(&mono_samples, source_rate, SAMPLE_RATE)
    } else {
        mono_samples
    };

    Ok(Waveform::new(samples))
}

/// Simple linear interpolation resampling.
fn resample(samples: &[i16], from_rate: u32, to_rate: u32) -> Vec<i16> {
    if from_rate == to_rate || samples.is_empty() {
        return samples.to_vec();
    }

    let ratio = from_rate as f64 / to_rate as f64;
    let output_len = (samples.len() as f64 / ratio).ceil() as usize;

    (0..output_len)
        .map(|i| {
            let source_pos = i as f64 * ratio;
            let source_idx = source_pos.floor() as usize;
            let fraction = source_pos - source_idx as f64;

            if source_idx + 1 >= samples.len() {
                samples[samples.len() - 1]
            } else {
                let left = samples[source_idx] as f64;
                let right = samples[source_idx + 1] as f64;
                (left + (right - left) * fraction) as i16
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn make_wav_data(sample_rate: u32, channels: u16, samples: &[i16]) -> Vec<u8> {
        let mut cursor = Cursor::new(Vec::new());
        let spec = hound::WavSpec {
            channels,
            sample_rate,
            bits_per_sample: 16,
            sample_format: hound::SampleFormat::Int,
        };
        let mut writer = hound::WavWriter::new(&mut cursor, spec).unwrap();
        for &s in samples {
            writer.write_sample(s).unwrap();
        }
        writer.finalize().unwrap();
        cursor.into_inner()
    }

    #[test]
    fn mono_16khz_passes_through_unchanged() {
        let input = vec![100i16, 200, 300, 400, 500];
        let wav_data = make_wav_data(16000, 1, &input);

        let wf = read_wav(Cursor::new(wav_data)).unwrap();

        assert_eq!(wf.samples, input);
        assert_eq!(wf.sample_rate, 16000);
    }

    #[test]
    fn stereo_downmixes_to_mono() {
        // Stereo pairs: (100, 200), (300, 400), (500, 600)
        let stereo = vec![100i16, 200, 300, 400, 500, 600];
        let wav_data = make_wav_data(16000, 2, &stereo);

        let wf = read_wav(Cursor::new(wav_data)).unwrap();

        assert_eq!(wf.samples, vec![150i16, 350, 550]);
    }

    #[test]
    fn stereo_downmix_handles_negative_values() {
        let stereo = vec![-100i16, 100, 300, -300];
        let wav_data = make_wav_data(16000, 2, &stereo);

        let wf = read_wav(Cursor::new(wav_data)).unwrap();

        assert_eq!(wf.samples, vec![0i16, 0]);
    }

    #[test]
    fn resamples_48khz_to_16khz() {
        let input = vec![0i16; 48000]; // 1 second at 48kHz
        let wav_data = make_wav_data(48000, 1, &input);

        let wf = read_wav(Cursor::new(wav_data)).unwrap();

        assert!(wf.samples.len() >= 15900 && wf.samples.len() <= 16100);
    }

    #[test]
    fn resamples_44100hz_preserving_amplitude() {
        let input = vec![1000i16; 44100];
        let wav_data = make_wav_data(44100, 1, &input);

        let wf = read_wav(Cursor::new(wav_data)).unwrap();

        assert!(wf.samples.len() >= 15900 && wf.samples.len() <= 16100);
        assert!(wf.samples.iter().all(|&s| (900..=1100).contains(&s)));
    }

    #[test]
    fn invalid_data_returns_decode_error() {
        let invalid = vec![0u8, 1, 2, 3, 4, 5];

        let result = read_wav(Cursor::new(invalid));

        match result {
            Err(CantosubError::Decode { message }) => {
                assert!(message.contains("Failed to parse WAV"));
            }
            _ => panic!("Expected Decode error"),
        }
    }

    #[test]
    fn empty_data_returns_error() {
        assert!(read_wav(Cursor::new(Vec::new())).is_err());
    }

    #[test]
    fn truncated_header_returns_error() {
        let truncated = b"RIFF\x00\x00".to_vec();
        assert!(read_wav(Cursor::new(truncated)).is_err());
    }

    #[test]
    fn resample_identity_same_rate() {
        let samples = vec![100i16, 200, 300];
        assert_eq!(resample(&samples, 16000, 16000), samples);
    }

    #[test]
    fn resample_upsample_interpolates() {
        let samples = vec![0i16, 1000, 2000];
        let out = resample(&samples, 8000, 16000);

        assert_eq!(out.len(), 6);
        assert_eq!(out[0], 0);
        assert!(out[1] > 0 && out[1] < 1000);
        assert_eq!(out[2], 1000);
    }

    #[test]
    fn resample_downsample_halves_count() {
        let samples = vec![0i16; 3200];
        assert_eq!(resample(&samples, 16000, 8000).len(), 1600);
    }

    #[test]
    fn resample_handles_empty_and_single() {
        assert!(resample(&[], 16000, 8000).is_empty());
        let single = resample(&[100i16], 16000, 8000);
        assert_eq!(single, vec![100i16]);
    }
}
