//! Error types for cantosub.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum CantosubError {
    // Configuration errors
    #[error("Configuration file not found at {path}")]
    ConfigFileNotFound { path: String },

    #[error("Invalid configuration value for {key}: {message}")]
    ConfigInvalidValue { key: String, message: String },

    #[error("Configuration error: {0}")]
    Config(#[from] toml::de::Error),

    // Timing invariant violations, rejected at construction
    #[error("Invalid segment timing: {message}")]
    InvalidSegment { message: String },

    // Media extraction errors
    #[error("Unsupported media format: {path}")]
    UnsupportedFormat { path: String },

    #[error("Audio decode failed: {message}")]
    Decode { message: String },

    // Model errors
    #[error("Model not found at {path}")]
    ModelNotFound { path: String },

    #[error("Failed to load {model}: {message}")]
    ModelLoad { model: String, message: String },

    #[error("Inference failed: {message}")]
    Inference { message: String },

    // Style engine conditions
    #[error("Translation stage {stage} degraded: {message}")]
    TranslationDegraded { stage: String, message: String },

    #[error("Script normalizer unavailable; output may contain Simplified characters")]
    ScriptNormalizerUnavailable,

    // Export errors
    #[error("Failed to write {path}: {message}")]
    ExportIo { path: String, message: String },

    // Run terminated by the caller
    #[error("Run cancelled")]
    Cancelled,

    // General I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    // Generic error for cases not covered above
    #[error("{0}")]
    Other(String),
}

// Type alias for convenience
pub type Result<T> = std::result::Result<T, CantosubError>;

impl CantosubError {
    /// True for conditions the pipeline absorbs and logs rather than
    /// surfacing as a run failure.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            CantosubError::TranslationDegraded { .. } | CantosubError::ScriptNormalizerUnavailable
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    #[test]
    fn invalid_segment_display() {
        let error = CantosubError::InvalidSegment {
            message: "end 1.0 <= start 2.0".to_string(),
        };
        assert_eq!(
            error.to_string(),
            "Invalid segment timing: end 1.0 <= start 2.0"
        );
    }

    #[test]
    fn unsupported_format_display() {
        let error = CantosubError::UnsupportedFormat {
            path: "/clips/slides.pptx".to_string(),
        };
        assert_eq!(
            error.to_string(),
            "Unsupported media format: /clips/slides.pptx"
        );
    }

    #[test]
    fn decode_display() {
        let error = CantosubError::Decode {
            message: "no audio track".to_string(),
        };
        assert_eq!(error.to_string(), "Audio decode failed: no audio track");
    }

    #[test]
    fn model_load_display() {
        let error = CantosubError::ModelLoad {
            model: "whisper".to_string(),
            message: "out of memory".to_string(),
        };
        assert_eq!(error.to_string(), "Failed to load whisper: out of memory");
    }

    #[test]
    fn export_io_display() {
        let error = CantosubError::ExportIo {
            path: "/out/video.srt".to_string(),
            message: "permission denied".to_string(),
        };
        assert_eq!(
            error.to_string(),
            "Failed to write /out/video.srt: permission denied"
        );
    }

    #[test]
    fn cancelled_display() {
        assert_eq!(CantosubError::Cancelled.to_string(), "Run cancelled");
    }

    #[test]
    fn degraded_conditions_are_recoverable() {
        assert!(
            CantosubError::TranslationDegraded {
                stage: "llm".to_string(),
                message: "model crashed".to_string(),
            }
            .is_recoverable()
        );
        assert!(CantosubError::ScriptNormalizerUnavailable.is_recoverable());
        assert!(
            !CantosubError::Decode {
                message: "bad".to_string()
            }
            .is_recoverable()
        );
        assert!(!CantosubError::Cancelled.is_recoverable());
    }

    #[test]
    fn from_io_error() {
        let io_error = io::Error::new(io::ErrorKind::NotFound, "file not found");
        let error: CantosubError = io_error.into();
        assert!(error.to_string().contains("file not found"));
    }

    #[test]
    fn from_toml_error() {
        let toml_error = toml::from_str::<toml::Value>("invalid = toml = syntax").unwrap_err();
        let error: CantosubError = toml_error.into();
        assert!(error.to_string().contains("Configuration error"));
    }

    #[test]
    fn error_source_chain_io() {
        let io_error = io::Error::new(io::ErrorKind::PermissionDenied, "access denied");
        let error: CantosubError = io_error.into();
        let error_trait: &dyn std::error::Error = &error;
        assert!(error_trait.source().is_some());
    }

    #[test]
    fn error_is_send_and_sync() {
        fn assert_send<T: Send>() {}
        fn assert_sync<T: Sync>() {}

        assert_send::<CantosubError>();
        assert_sync::<CantosubError>();
    }

    #[test]
    fn result_type_alias() {
        fn returns_result() -> Result<i32> {
            Ok(42)
        }
        assert_eq!(returns_result().unwrap(), 42);
    }
}
