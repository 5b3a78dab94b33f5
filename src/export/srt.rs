//! SRT serialization.
//!
//! One block per segment: 1-based sequence number, timecode line with
//! comma-separated milliseconds, text, blank line.

use crate::export::split_seconds;
use crate::segment::StyledSegment;
use std::fmt::Write;

/// Render segments to SRT text.
pub fn render(segments: &[StyledSegment]) -> String {
    let mut out = String::new();
    for (i, seg) in segments.iter().enumerate() {
        writeln!(out, "{}", i + 1).ok();
        writeln!(
            out,
            "{} --> {}",
            timestamp(seg.span.start()),
            timestamp(seg.span.end())
        )
        .ok();
        writeln!(out, "{}", seg.text).ok();
        writeln!(out).ok();
    }
    out
}

/// SRT timecode: `HH:MM:SS,mmm`, all fields zero-padded.
pub fn timestamp(seconds: f64) -> String {
    let (total, millis) = split_seconds(seconds, 1000);
    let hours = total / 3600;
    let minutes = (total % 3600) / 60;
    let secs = total % 60;
    format!("{:02}:{:02}:{:02},{:03}", hours, minutes, secs, millis)
}
