//! Audio extraction from media containers with testable command execution.
//!
//! WAV files are decoded in-process. Everything else is handed to ffmpeg,
//! which decodes the first audio track straight to 16kHz mono WAV on
//! stdout. The `CommandExecutor` trait keeps the subprocess boundary
//! mockable.

use crate::audio::{Waveform, wav};
use crate::error::{CantosubError, Result};
use std::io::Cursor;
use std::path::Path;
use std::process::Command;

/// Extensions decoded in-process with hound.
const WAV_EXTENSIONS: &[&str] = &["wav", "wave"];

/// Extensions handed to ffmpeg.
const FFMPEG_EXTENSIONS: &[&str] = &[
    "mp4", "mov", "mkv", "webm", "m4v", "avi", "m4a", "mp3", "aac", "flac", "ogg", "opus",
];

/// Trait for executing system commands and capturing binary stdout.
///
/// Object-safe, Send + Sync for use from the pipeline worker thread.
/// Enables testing the extractor without a real ffmpeg installation.
pub trait CommandExecutor: Send + Sync {
    /// Execute a command with arguments, returning its stdout bytes.
    fn execute(&self, command: &str, args: &[&str]) -> Result<Vec<u8>>;
}

/// Production command executor using std::process::Command.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemCommandExecutor;

impl CommandExecutor for SystemCommandExecutor {
    fn execute(&self, command: &str, args: &[&str]) -> Result<Vec<u8>> {
        let output = Command::new(command).args(args).output().map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                CantosubError::Decode {
                    message: format!(
                        "{} not found. Install ffmpeg:\n\
                         Ubuntu/Debian: sudo apt install ffmpeg\n\
                         macOS: brew install ffmpeg",
                        command
                    ),
                }
            } else {
                CantosubError::Decode {
                    message: format!("Failed to execute {}: {}", command, e),
                }
            }
        })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(CantosubError::Decode {
                message: format!(
                    "{} failed with status {:?}: {}",
                    command,
                    output.status,
                    stderr.trim()
                ),
            });
        }

        Ok(output.stdout)
    }
}

/// Audio extractor that normalizes any supported media file into the
/// canonical waveform.
pub struct AudioExtractor<E: CommandExecutor = SystemCommandExecutor> {
    executor: E,
}

impl Default for AudioExtractor {
    fn default() -> Self {
        Self {
            executor: SystemCommandExecutor,
        }
    }
}

impl AudioExtractor {
    pub fn new() -> Self {
        Self::default()
    }
}

impl<E: CommandExecutor> AudioExtractor<E> {
    /// Create an extractor with a custom executor (for tests).
    pub fn with_executor(executor: E) -> Self {
        Self { executor }
    }

    /// Decode the audio track of `media` into a 16kHz mono waveform.
    ///
    /// Dispatches on file extension: WAV is parsed directly, known
    /// container formats go through ffmpeg, anything else is rejected
    /// with `UnsupportedFormat`.
    pub fn extract(&self, media: &Path) -> Result<Waveform> {
        let ext = media
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase())
            .unwrap_or_default();

        if WAV_EXTENSIONS.contains(&ext.as_str()) {
            let data = std::fs::read(media).map_err(|e| CantosubError::Decode {
                message: format!("Failed to read {}: {}", media.display(), e),
            })?;
            return wav::read_wav(Cursor::new(data));
        }

        if !FFMPEG_EXTENSIONS.contains(&ext.as_str()) {
            return Err(CantosubError::UnsupportedFormat {
                path: media.display().to_string(),
            });
        }

        let path_str = media.to_str().ok_or_else(|| CantosubError::Decode {
            message: format!("Non-UTF-8 path: {}", media.display()),
        })?;

        let wav_bytes = self.executor.execute(
            "ffmpeg",
            &[
                "-nostdin",
                "-i",
                path_str,
                "-vn",
                "-ac",
                "1",
                "-ar",
                "16000",
                "-f",
                "wav",
                "-loglevel",
                "error",
                "-",
            ],
        )?;

        let waveform = wav::read_wav(Cursor::new(wav_bytes))?;
        if waveform.is_empty() {
            return Err(CantosubError::Decode {
                message: format!("No audio decoded from {}", media.display()),
            });
        }
        Ok(waveform)
    }
}

/// True if the extension is one the extractor understands at all.
pub fn is_supported_media(path: &Path) -> bool {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .unwrap_or_default();
    WAV_EXTENSIONS.contains(&ext.as_str()) || FFMPEG_EXTENSIONS.contains(&ext.as_str())
}
