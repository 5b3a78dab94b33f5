//! Command-line interface for cantosub
//!
//! Provides argument parsing using clap derive macros.

use clap::{Parser, Subcommand, ValueEnum};
use clap_complete::Shell;
use std::path::PathBuf;

/// Offline Cantonese subtitle generation
#[derive(Parser, Debug)]
#[command(name = "cantosub", version, about = "Offline Cantonese subtitle generation")]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Media file to subtitle (video or audio)
    #[arg(value_name = "MEDIA")]
    pub media: Option<PathBuf>,

    /// Path to configuration file
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Suppress progress output (quiet mode)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Output directory (default: next to the media file)
    #[arg(short, long, value_name = "DIR")]
    pub output: Option<PathBuf>,

    /// Comma-separated output formats: srt, ass, fcpxml
    #[arg(long, value_name = "LIST", value_delimiter = ',')]
    pub formats: Vec<String>,

    /// Whisper model name (see `cantosub models`) or path to a ggml file
    #[arg(long, value_name = "MODEL")]
    pub model: Option<String>,

    /// Language hint for recognition (default: yue)
    #[arg(long, value_name = "LANG")]
    pub language: Option<String>,

    /// Formality of the output text
    #[arg(long, value_enum, value_name = "REGISTER")]
    pub register: Option<RegisterArg>,

    /// Handling of embedded English
    #[arg(long, value_enum, value_name = "MODE")]
    pub english: Option<EnglishArg>,

    /// Numeral formatting
    #[arg(long, value_enum, value_name = "FORMAT")]
    pub numerals: Option<NumeralsArg>,

    /// Extra vocabulary appended to the recognition prompt
    #[arg(long, value_name = "WORDS")]
    pub vocabulary: Option<String>,

    /// Merge gap tolerance in seconds
    #[arg(long, value_name = "SECONDS")]
    pub max_gap: Option<f64>,

    /// Use only the built-in dictionary for translation (skip models)
    #[arg(long)]
    pub dictionary_only: bool,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
pub enum RegisterArg {
    Colloquial,
    SemiFormal,
    Formal,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
pub enum EnglishArg {
    Keep,
    Translate,
    Annotate,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
pub enum NumeralsArg {
    Arabic,
    ChineseLowercase,
}

impl From<RegisterArg> for crate::style::Register {
    fn from(value: RegisterArg) -> Self {
        match value {
            RegisterArg::Colloquial => Self::Colloquial,
            RegisterArg::SemiFormal => Self::SemiFormal,
            RegisterArg::Formal => Self::Formal,
        }
    }
}

impl From<EnglishArg> for crate::style::EnglishHandling {
    fn from(value: EnglishArg) -> Self {
        match value {
            EnglishArg::Keep => Self::Keep,
            EnglishArg::Translate => Self::Translate,
            EnglishArg::Annotate => Self::Annotate,
        }
    }
}

impl From<NumeralsArg> for crate::style::NumeralFormat {
    fn from(value: NumeralsArg) -> Self {
        match value {
            NumeralsArg::Arabic => Self::Arabic,
            NumeralsArg::ChineseLowercase => Self::ChineseLowercase,
        }
    }
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List known models
    Models,

    /// Check system dependencies (ffmpeg, model files)
    Check,

    /// Generate shell completions
    Completions {
        /// Shell to generate for
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_bare_media_path() {
        let cli = Cli::try_parse_from(["cantosub", "video.mp4"]).unwrap();
        assert_eq!(cli.media, Some(PathBuf::from("video.mp4")));
        assert!(cli.command.is_none());
        assert!(!cli.quiet);
    }

    #[test]
    fn parses_style_options() {
        let cli = Cli::try_parse_from([
            "cantosub",
            "video.mp4",
            "--register",
            "formal",
            "--english",
            "translate",
            "--numerals",
            "chinese-lowercase",
        ])
        .unwrap();
        assert!(matches!(cli.register, Some(RegisterArg::Formal)));
        assert!(matches!(cli.english, Some(EnglishArg::Translate)));
        assert!(matches!(cli.numerals, Some(NumeralsArg::ChineseLowercase)));
    }

    #[test]
    fn parses_comma_separated_formats() {
        let cli =
            Cli::try_parse_from(["cantosub", "a.mp4", "--formats", "srt,ass,fcpxml"]).unwrap();
        assert_eq!(cli.formats, vec!["srt", "ass", "fcpxml"]);
    }

    #[test]
    fn parses_models_subcommand() {
        let cli = Cli::try_parse_from(["cantosub", "models"]).unwrap();
        assert!(matches!(cli.command, Some(Commands::Models)));
    }

    #[test]
    fn parses_vocabulary_and_max_gap() {
        let cli = Cli::try_parse_from([
            "cantosub",
            "a.mp4",
            "--vocabulary",
            "美highland、茶記",
            "--max-gap",
            "1.5",
        ])
        .unwrap();
        assert_eq!(cli.vocabulary, Some("美highland、茶記".to_string()));
        assert_eq!(cli.max_gap, Some(1.5));
    }

    #[test]
    fn invalid_register_is_rejected() {
        assert!(Cli::try_parse_from(["cantosub", "a.mp4", "--register", "shouty"]).is_err());
    }
}
