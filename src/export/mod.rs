//! Subtitle serialization into SRT, ASS and FCPXML.
//!
//! Timecode formatting is part of the contract: sub-second fields are
//! derived by truncating the fractional seconds, never rounding, so the
//! same input always produces byte-identical output.

pub mod ass;
pub mod fcpxml;
pub mod srt;

use crate::error::{CantosubError, Result};
use crate::segment::StyledSegment;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Supported output formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SubtitleFormat {
    Srt,
    Ass,
    Fcpxml,
}

impl SubtitleFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            SubtitleFormat::Srt => "srt",
            SubtitleFormat::Ass => "ass",
            SubtitleFormat::Fcpxml => "fcpxml",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.to_ascii_lowercase().as_str() {
            "srt" => Some(SubtitleFormat::Srt),
            "ass" => Some(SubtitleFormat::Ass),
            "fcpxml" => Some(SubtitleFormat::Fcpxml),
            _ => None,
        }
    }
}

impl std::fmt::Display for SubtitleFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.extension())
    }
}

/// Serialize `segments` to `path` in the given format.
///
/// A write failure is fatal to this format only; the caller decides
/// whether to attempt other formats. No partial-file guarantee is made on
/// error.
pub fn export(segments: &[StyledSegment], path: &Path, format: SubtitleFormat) -> Result<()> {
    let rendered = match format {
        SubtitleFormat::Srt => srt::render(segments),
        SubtitleFormat::Ass => ass::render(segments),
        SubtitleFormat::Fcpxml => fcpxml::render(segments),
    };

    std::fs::write(path, rendered).map_err(|e| CantosubError::ExportIo {
        path: path.display().to_string(),
        message: e.to_string(),
    })
}

/// Split seconds into whole seconds plus a truncated fractional part at
/// the given scale (1000 for milliseconds, 100 for centiseconds).
///
/// The epsilon counters binary representation error: 3.8 stores as
/// 3.7999...98 and must still read as 800 milliseconds. Values a true
/// hair below a unit boundary (within a nanosecond) land on it; anything
/// farther truncates.
pub(crate) fn split_seconds(seconds: f64, scale: u32) -> (u64, u32) {
    let whole = seconds as u64;
    let frac = ((seconds - whole as f64) * scale as f64 + 1e-6) as u32;
    (whole, frac.min(scale - 1))
}
