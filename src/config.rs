use crate::defaults;
use crate::style::StyleOptions;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Root configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct Config {
    pub asr: AsrConfig,
    pub merge: MergeConfig,
    pub style: StyleConfig,
    pub export: ExportConfig,
}

/// Speech recognition configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct AsrConfig {
    /// Model name from the catalog, or a path to a ggml file
    pub model: String,
    pub language: String,
    /// Extra vocabulary appended to the recognition prompt
    pub custom_vocabulary: Option<String>,
    pub threads: Option<usize>,
}

/// Segment merge configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct MergeConfig {
    /// Pause length in seconds beyond which a recognition segment is
    /// flagged as spanning two utterances
    pub max_gap: f64,
    pub vad_threshold: f32,
    pub min_silence_ms: u32,
    pub min_speech_ms: u32,
    pub speech_pad_ms: u32,
}

/// Style configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct StyleConfig {
    #[serde(flatten)]
    pub options: StyleOptions,
    /// Disable the Simplified-to-Traditional output sweep. Risks
    /// Simplified characters in the output; off only for debugging.
    pub disable_script_normalization: bool,
    /// Skip loading the rewrite and translation models even when built in
    pub dictionary_only: bool,
}

/// Export configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ExportConfig {
    /// Formats written per run ("srt", "ass", "fcpxml")
    pub formats: Vec<String>,
    /// Output directory; defaults to the media file's directory
    pub output_dir: Option<PathBuf>,
}

impl Default for AsrConfig {
    fn default() -> Self {
        Self {
            model: defaults::DEFAULT_MODEL.to_string(),
            language: defaults::DEFAULT_LANGUAGE.to_string(),
            custom_vocabulary: None,
            threads: None,
        }
    }
}

impl Default for MergeConfig {
    fn default() -> Self {
        Self {
            max_gap: defaults::MAX_GAP_SECS,
            vad_threshold: defaults::VAD_THRESHOLD,
            min_silence_ms: defaults::MIN_SILENCE_MS,
            min_speech_ms: defaults::MIN_SPEECH_MS,
            speech_pad_ms: defaults::SPEECH_PAD_MS,
        }
    }
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            formats: vec!["srt".to_string()],
            output_dir: None,
        }
    }
}

impl Config {
    /// Load configuration from a TOML file
    ///
    /// Returns an error if the file contains invalid TOML.
    /// Missing fields will use default values.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let contents = fs::read_to_string(path)?;
        let config: Config = toml::from_str(&contents)?;
        Ok(config)
    }

    /// Load configuration from a file or return defaults if the file is
    /// missing. Invalid TOML is still an error.
    pub fn load_or_default(path: &Path) -> anyhow::Result<Self> {
        match Self::load(path) {
            Ok(config) => Ok(config),
            Err(e) => {
                if e.downcast_ref::<std::io::Error>()
                    .map(|io_err| io_err.kind() == std::io::ErrorKind::NotFound)
                    .unwrap_or(false)
                {
                    Ok(Self::default())
                } else {
                    Err(e)
                }
            }
        }
    }

    /// Apply environment variable overrides
    ///
    /// Supported environment variables:
    /// - CANTOSUB_MODEL → asr.model
    /// - CANTOSUB_LANGUAGE → asr.language
    /// - CANTOSUB_OUTPUT_DIR → export.output_dir
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(model) = std::env::var("CANTOSUB_MODEL")
            && !model.is_empty()
        {
            self.asr.model = model;
        }

        if let Ok(language) = std::env::var("CANTOSUB_LANGUAGE")
            && !language.is_empty()
        {
            self.asr.language = language;
        }

        if let Ok(dir) = std::env::var("CANTOSUB_OUTPUT_DIR")
            && !dir.is_empty()
        {
            self.export.output_dir = Some(PathBuf::from(dir));
        }

        self
    }

    /// Get the default configuration file path
    ///
    /// Returns ~/.config/cantosub/config.toml on Linux
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("cantosub")
            .join("config.toml")
    }
}
