//! ASS (Advanced SubStation Alpha) serialization.
//!
//! Fixed script header with one Default style, then one Dialogue line per
//! segment. ASS timecodes use centiseconds with an unpadded hour field,
//! and internal newlines become the literal two-character escape `\N`.

use crate::export::split_seconds;
use crate::segment::StyledSegment;
use std::fmt::Write;

const STYLE_NAME: &str = "Default";

/// Render segments to ASS text.
pub fn render(segments: &[StyledSegment]) -> String {
    let mut out = String::new();

    out.push_str("[Script Info]\n");
    out.push_str("Title: cantosub export\n");
    out.push_str("ScriptType: v4.00+\n");
    out.push_str("Collisions: Normal\n");
    out.push_str("PlayDepth: 0\n\n");

    out.push_str("[V4+ Styles]\n");
    out.push_str(
        "Format: Name, Fontname, Fontsize, PrimaryColour, SecondaryColour, \
         OutlineColour, BackColour, Bold, Italic, Underline, StrikeOut, \
         ScaleX, ScaleY, Spacing, Angle, BorderStyle, Outline, Shadow, \
         Alignment, MarginL, MarginR, MarginV, Encoding\n",
    );
    writeln!(
        out,
        "Style: {},Arial,20,&H00FFFFFF,&H000000FF,&H00000000,\
         &H00000000,0,0,0,0,100,100,0,0,1,2,2,2,10,10,10,1",
        STYLE_NAME
    )
    .ok();
    out.push('\n');

    out.push_str("[Events]\n");
    out.push_str("Format: Layer, Start, End, Style, Name, MarginL, MarginR, MarginV, Effect, Text\n");

    for seg in segments {
        let text = seg.text.replace('\n', "\\N");
        writeln!(
            out,
            "Dialogue: 0,{},{},{},,0,0,0,,{}",
            timestamp(seg.span.start()),
            timestamp(seg.span.end()),
            STYLE_NAME,
            text
        )
        .ok();
    }

    out
}

/// ASS timecode: `H:MM:SS.cc`, hour field unpadded.
pub fn timestamp(seconds: f64) -> String {
    let (total, centis) = split_seconds(seconds, 100);
    let hours = total / 3600;
    let minutes = (total % 3600) / 60;
    let secs = total % 60;
    format!("{}:{:02}:{:02}.{:02}", hours, minutes, secs, centis)
}
