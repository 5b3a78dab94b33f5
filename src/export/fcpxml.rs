//! FCPXML serialization for Final Cut Pro import.
//!
//! One fixed 1080p/30fps format resource and one title effect resource,
//! then a spine carrying one title element per segment. Times are
//! expressed as rational `<frames>/30s` values; frame counts come from
//! truncating seconds at the frame rate.

use crate::defaults::FCPXML_FPS;
use crate::segment::StyledSegment;
use std::fmt::Write;

/// Render segments to an FCPXML document.
pub fn render(segments: &[StyledSegment]) -> String {
    let total_end = segments
        .last()
        .map(|seg| seg.span.end())
        .unwrap_or_default();

    let mut out = String::new();
    out.push_str("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n");
    out.push_str("<!DOCTYPE fcpxml>\n");
    out.push_str("<fcpxml version=\"1.9\">\n");
    out.push_str("  <resources>\n");
    writeln!(
        out,
        "    <format id=\"r1\" name=\"FFVideoFormat1080p30\" frameDuration=\"1/{}s\" width=\"1920\" height=\"1080\"/>",
        FCPXML_FPS
    )
    .ok();
    out.push_str(
        "    <effect id=\"r2\" name=\"Basic Title\" \
         uid=\".../Titles.localized/Bumper:Opener.localized/Basic Title.localized/Basic Title.moti\"/>\n",
    );
    out.push_str("  </resources>\n");
    out.push_str("  <library>\n");
    out.push_str("    <event name=\"cantosub\">\n");
    out.push_str("      <project name=\"Subtitles\">\n");
    writeln!(
        out,
        "        <sequence format=\"r1\" duration=\"{}\" tcStart=\"0s\" tcFormat=\"NDF\">",
        rational_time(total_end)
    )
    .ok();
    out.push_str("          <spine>\n");

    for (i, seg) in segments.iter().enumerate() {
        let style_id = format!("ts{}", i + 1);
        let text = escape_xml(&seg.text);
        writeln!(
            out,
            "            <title ref=\"r2\" name=\"{}\" offset=\"{}\" duration=\"{}\">",
            text,
            rational_time(seg.span.start()),
            rational_time(seg.span.duration())
        )
        .ok();
        writeln!(
            out,
            "              <text><text-style ref=\"{}\">{}</text-style></text>",
            style_id, text
        )
        .ok();
        writeln!(
            out,
            "              <text-style-def id=\"{}\"><text-style font=\"PingFang HK\" fontSize=\"60\" fontColor=\"1 1 1 1\" alignment=\"center\"/></text-style-def>",
            style_id
        )
        .ok();
        out.push_str("            </title>\n");
    }

    out.push_str("          </spine>\n");
    out.push_str("        </sequence>\n");
    out.push_str("      </project>\n");
    out.push_str("    </event>\n");
    out.push_str("  </library>\n");
    out.push_str("</fcpxml>\n");
    out
}

/// Rational time at the fixed frame rate: `<frames>/30s`.
///
/// Frame counts are truncated from seconds, consistent with the other
/// exporters' sub-second handling.
pub fn rational_time(seconds: f64) -> String {
    let frames = (seconds * FCPXML_FPS as f64 + 1e-6) as u64;
    format!("{}/{}s", frames, FCPXML_FPS)
}

/// Escape the five XML-reserved characters.
fn escape_xml(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            _ => out.push(c),
        }
    }
    out
}
