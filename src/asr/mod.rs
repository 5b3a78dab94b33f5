//! Speech recognition behind a swappable trait.

pub mod prompt;
pub mod whisper;

use crate::audio::Waveform;
use crate::error::{CantosubError, Result};
use crate::segment::SpeechSegment;

/// Trait for speech-to-text transcription.
///
/// This trait allows swapping implementations (real Whisper vs mock).
pub trait Transcriber: Send + Sync {
    /// Transcribe a waveform into ordered, timestamped segments.
    ///
    /// # Arguments
    /// * `waveform` - mono 16kHz PCM audio
    /// * `language` - language hint, e.g. "yue"
    /// * `prompt` - optional vocabulary prompt steering recognition
    fn transcribe(
        &self,
        waveform: &Waveform,
        language: &str,
        prompt: Option<&str>,
    ) -> Result<Vec<SpeechSegment>>;

    /// Get the name of the loaded model
    fn model_name(&self) -> &str;

    /// Check if the transcriber is ready
    fn is_ready(&self) -> bool;
}

/// Mock transcriber for testing
#[derive(Debug, Clone)]
pub struct MockTranscriber {
    model_name: String,
    segments: Vec<SpeechSegment>,
    should_fail: bool,
}

impl MockTranscriber {
    /// Create a new mock transcriber with default settings
    pub fn new(model_name: &str) -> Self {
        Self {
            model_name: model_name.to_string(),
            segments: Vec::new(),
            should_fail: false,
        }
    }

    /// Configure the mock to return specific segments
    pub fn with_segments(mut self, segments: Vec<SpeechSegment>) -> Self {
        self.segments = segments;
        self
    }

    /// Configure the mock to fail on transcribe
    pub fn with_failure(mut self) -> Self {
        self.should_fail = true;
        self
    }
}

impl Transcriber for MockTranscriber {
    fn transcribe(
        &self,
        _waveform: &Waveform,
        _language: &str,
        _prompt: Option<&str>,
    ) -> Result<Vec<SpeechSegment>> {
        if self.should_fail {
            Err(CantosubError::Inference {
                message: "mock transcription failure".to_string(),
            })
        } else {
            Ok(self.segments.clone())
        }
    }

    fn model_name(&self) -> &str {
        &self.model_name
    }

    fn is_ready(&self) -> bool {
        !self.should_fail
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::segment::TimeSpan;

    fn seg(start: f64, end: f64, text: &str) -> SpeechSegment {
        SpeechSegment::new(TimeSpan::new(start, end).unwrap(), text)
    }

    #[test]
    fn mock_returns_configured_segments() {
        let segments = vec![seg(0.0, 2.0, "早晨"), seg(2.5, 4.0, "食咗飯未")];
        let transcriber = MockTranscriber::new("test-model").with_segments(segments.clone());

        let result = transcriber
            .transcribe(&Waveform::new(vec![0i16; 100]), "yue", None)
            .unwrap();

        assert_eq!(result, segments);
    }

    #[test]
    fn mock_returns_error_when_configured() {
        let transcriber = MockTranscriber::new("test-model").with_failure();

        let result = transcriber.transcribe(&Waveform::new(vec![0i16; 100]), "yue", None);

        assert!(matches!(result, Err(CantosubError::Inference { .. })));
        assert!(!transcriber.is_ready());
    }

    #[test]
    fn mock_model_name() {
        let transcriber = MockTranscriber::new("whisper-large-v3");
        assert_eq!(transcriber.model_name(), "whisper-large-v3");
        assert!(transcriber.is_ready());
    }

    #[test]
    fn transcriber_trait_is_object_safe() {
        let transcriber: Box<dyn Transcriber> =
            Box::new(MockTranscriber::new("boxed").with_segments(vec![seg(0.0, 1.0, "好")]));

        let result = transcriber
            .transcribe(&Waveform::new(Vec::new()), "yue", Some("hint"))
            .unwrap();
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].text, "好");
    }

    #[test]
    fn empty_mock_returns_no_segments() {
        let transcriber = MockTranscriber::new("empty");
        let result = transcriber
            .transcribe(&Waveform::new(vec![0i16; 16000]), "yue", None)
            .unwrap();
        assert!(result.is_empty());
    }
}
