//! cantosub - Offline Cantonese subtitle generation
//!
//! Media file in, time-aligned Traditional Chinese subtitles out, with
//! configurable register, English handling and numeral formatting.

#![warn(clippy::unwrap_used)]
#![warn(clippy::expect_used)]
#![warn(clippy::let_underscore_must_use)]

pub mod asr;
pub mod audio;
#[cfg(feature = "cli")]
pub mod cli;
pub mod config;
pub mod defaults;
pub mod error;
pub mod export;
pub mod merge;
pub mod models;
pub mod pipeline;
pub mod segment;
pub mod style;
pub mod vad;

// Core traits (decode → detect → recognize → transform)
pub use asr::Transcriber;
pub use audio::extractor::{AudioExtractor, CommandExecutor, SystemCommandExecutor};
pub use style::script::ScriptNormalizer;
pub use vad::VoiceDetector;

// Pipeline
pub use pipeline::{Orchestrator, PipelineOptions, RunHandle, RunOutcome, Stage};

// Error handling
pub use error::{CantosubError, Result};

// Config
pub use config::Config;

// Data model
pub use segment::{MergedSegment, SpeechSegment, StyledSegment, TimeSpan, VoiceInterval};

// Style engine
pub use style::{EnglishHandling, NumeralFormat, Register, StyleEngine, StyleOptions};

/// Build version string with optional git commit hash.
///
/// Returns `"0.3.1+abc1234"` when git hash is available, `"0.3.1"` otherwise.
pub fn version_string() -> String {
    let version = env!("CARGO_PKG_VERSION");
    match option_env!("GIT_HASH") {
        Some(hash) if !hash.is_empty() => format!("{}+{}", version, hash),
        _ => version.to_string(),
    }
}
