//! Whisper-based speech recognition via whisper-rs.
//!
//! # Feature Gate
//!
//! This module requires the `whisper` feature to be enabled and cmake to
//! be installed:
//!
//! ```bash
//! cargo build --features whisper
//! ```

use crate::asr::Transcriber;
use crate::audio::Waveform;
use crate::error::{CantosubError, Result};
use crate::segment::SpeechSegment;
#[cfg(feature = "whisper")]
use crate::segment::TimeSpan;
use std::path::PathBuf;

#[cfg(feature = "whisper")]
use std::sync::{Mutex, Once};
#[cfg(feature = "whisper")]
use whisper_rs::{
    FullParams, SamplingStrategy, WhisperContext, WhisperContextParameters, install_logging_hooks,
};

#[cfg(feature = "whisper")]
static LOGGING_HOOKS_INSTALLED: Once = Once::new();

/// Whisper segment timestamps are expressed in 10ms ticks.
#[cfg(feature = "whisper")]
const TICK_SECS: f64 = 0.01;

/// Configuration for the Whisper transcriber.
#[derive(Debug, Clone)]
pub struct WhisperConfig {
    /// Path to the ggml model file
    pub model_path: PathBuf,
    /// Number of threads for inference (None = auto-detect)
    pub threads: Option<usize>,
}

impl Default for WhisperConfig {
    fn default() -> Self {
        Self {
            model_path: PathBuf::from("models/ggml-large-v3.bin"),
            threads: None,
        }
    }
}

/// Whisper transcriber implementation.
///
/// The WhisperContext is wrapped in a Mutex to ensure thread safety.
#[cfg(feature = "whisper")]
pub struct WhisperTranscriber {
    context: Mutex<WhisperContext>,
    config: WhisperConfig,
    model_name: String,
}

#[cfg(feature = "whisper")]
impl std::fmt::Debug for WhisperTranscriber {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WhisperTranscriber")
            .field("config", &self.config)
            .field("model_name", &self.model_name)
            .field("context", &"<WhisperContext>")
            .finish()
    }
}

/// Whisper transcriber placeholder (without the whisper feature).
///
/// A stub that returns errors when used; enable the `whisper` feature
/// for real recognition.
#[cfg(not(feature = "whisper"))]
#[derive(Debug)]
pub struct WhisperTranscriber {
    config: WhisperConfig,
    model_name: String,
}

impl WhisperTranscriber {
    fn model_name_from(config: &WhisperConfig) -> String {
        config
            .model_path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("unknown")
            .to_string()
    }
}

#[cfg(feature = "whisper")]
impl WhisperTranscriber {
    /// Load a Whisper model.
    ///
    /// # Errors
    /// `ModelNotFound` if the model file does not exist,
    /// `ModelLoad` if whisper.cpp rejects it.
    pub fn new(config: WhisperConfig) -> Result<Self> {
        LOGGING_HOOKS_INSTALLED.call_once(|| {
            install_logging_hooks();
        });

        if !config.model_path.exists() {
            return Err(CantosubError::ModelNotFound {
                path: config.model_path.to_string_lossy().to_string(),
            });
        }

        let model_name = Self::model_name_from(&config);

        let mut context_params = WhisperContextParameters::default();
        context_params.flash_attn(true);
        let context = WhisperContext::new_with_params(
            config.model_path.to_str().ok_or_else(|| CantosubError::ModelLoad {
                model: model_name.clone(),
                message: "Invalid UTF-8 in model path".to_string(),
            })?,
            context_params,
        )
        .map_err(|e| CantosubError::ModelLoad {
            model: model_name.clone(),
            message: format!("Failed to load Whisper model: {}", e),
        })?;

        Ok(Self {
            context: Mutex::new(context),
            config,
            model_name,
        })
    }

    pub fn config(&self) -> &WhisperConfig {
        &self.config
    }
}

#[cfg(not(feature = "whisper"))]
impl WhisperTranscriber {
    /// Create a stub transcriber; only validates that the model file exists.
    pub fn new(config: WhisperConfig) -> Result<Self> {
        if !config.model_path.exists() {
            return Err(CantosubError::ModelNotFound {
                path: config.model_path.to_string_lossy().to_string(),
            });
        }

        let model_name = Self::model_name_from(&config);
        Ok(Self { config, model_name })
    }

    pub fn config(&self) -> &WhisperConfig {
        &self.config
    }
}

#[cfg(feature = "whisper")]
impl Transcriber for WhisperTranscriber {
    fn transcribe(
        &self,
        waveform: &Waveform,
        language: &str,
        prompt: Option<&str>,
    ) -> Result<Vec<SpeechSegment>> {
        let audio_f32 = waveform.to_f32();

        let context = self.context.lock().map_err(|e| CantosubError::Inference {
            message: format!("Failed to acquire context lock: {}", e),
        })?;

        let mut state = context.create_state().map_err(|e| CantosubError::Inference {
            message: format!("Failed to create Whisper state: {}", e),
        })?;

        let mut params = FullParams::new(SamplingStrategy::Greedy { best_of: 1 });
        params.set_language(Some(language));
        if let Some(prompt) = prompt {
            params.set_initial_prompt(prompt);
        }
        if let Some(threads) = self.config.threads {
            params.set_n_threads(threads as i32);
        }
        params.set_print_special(false);
        params.set_print_progress(false);
        params.set_print_realtime(false);
        params.set_print_timestamps(false);
        params.set_token_timestamps(false);

        state
            .full(params, &audio_f32)
            .map_err(|e| CantosubError::Inference {
                message: format!("Whisper inference failed: {}", e),
            })?;

        let mut segments = Vec::new();
        for segment in state.as_iter() {
            let text = segment.to_string().trim().to_string();
            if text.is_empty() {
                continue;
            }

            let start = segment.start_timestamp() as f64 * TICK_SECS;
            let end = segment.end_timestamp() as f64 * TICK_SECS;
            // Degenerate timestamps occasionally come out of greedy decoding;
            // skip rather than fail the whole transcription.
            let Ok(span) = TimeSpan::new(start.max(0.0), end) else {
                eprintln!(
                    "cantosub: skipping segment with degenerate timing {:.2}..{:.2}: {}",
                    start, end, text
                );
                continue;
            };
            segments.push(SpeechSegment::new(span, text));
        }

        Ok(segments)
    }

    fn model_name(&self) -> &str {
        &self.model_name
    }

    fn is_ready(&self) -> bool {
        true
    }
}

#[cfg(not(feature = "whisper"))]
impl Transcriber for WhisperTranscriber {
    fn transcribe(
        &self,
        _waveform: &Waveform,
        _language: &str,
        _prompt: Option<&str>,
    ) -> Result<Vec<SpeechSegment>> {
        Err(CantosubError::Inference {
            message: concat!(
                "Whisper feature not enabled. This binary was built without speech recognition.\n",
                "To fix: cargo build --release (whisper is enabled by default)\n",
                "If build fails with cmake errors, install: sudo apt install cmake"
            )
            .to_string(),
        })
    }

    fn model_name(&self) -> &str {
        &self.model_name
    }

    fn is_ready(&self) -> bool {
        false
    }
}
