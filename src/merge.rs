//! Reconciles recognition segments against voice intervals.
//!
//! The recognizer knows what was said but times silence boundaries from
//! its internal alignment, which drifts. The voice detector knows exactly
//! when speech energy was present but carries no text. The merger combines
//! both: when a recognition segment pairs with a single nested voice
//! interval, the interval's acoustically precise boundaries win; in every
//! ambiguous case the recognizer's own span is kept, because text cannot
//! be re-partitioned after the fact.

use crate::segment::{MergedSegment, SpeechSegment, TimeSpan, VoiceInterval};

/// Merge recognition segments with voice intervals.
///
/// Output invariants: ordered ascending by start, non-overlapping
/// (`end[i] <= start[i+1]`), non-empty text, positive duration.
///
/// `max_gap` is the pause length between overlapping voice intervals
/// beyond which the recognizer is assumed to have glued two utterances
/// together. Such segments keep their original undivided span; splitting
/// would require fabricating a text boundary.
pub fn merge_segments(
    speech: &[SpeechSegment],
    voice: &[VoiceInterval],
    max_gap: f64,
) -> Vec<MergedSegment> {
    let mut merged: Vec<MergedSegment> = Vec::with_capacity(speech.len());

    for seg in speech {
        let text = seg.text.trim();
        if text.is_empty() {
            continue;
        }

        let overlapping: Vec<&VoiceInterval> = voice
            .iter()
            .filter(|v| v.span.overlaps(&seg.span))
            .collect();

        let span = match overlapping.as_slice() {
            // VAD has no signal here (very quiet speech or missing
            // detection): the recognizer is the fallback source of truth.
            [] => seg.span,

            // One interval nested with the segment, either direction:
            // adopt the interval's boundaries, they are acoustically
            // tighter at silences than the recognizer's alignment.
            [only]
                if only.span.contains(&seg.span) || seg.span.contains(&only.span) =>
            {
                only.span
            }

            // Partial single overlap or multiple intervals: the segment's
            // text may straddle boundaries, keep its own span. When the
            // gap between intervals exceeds max_gap the recognizer merged
            // two utterances, but under-splitting beats inventing a text
            // boundary, so the span is still kept whole.
            intervals => {
                if exceeds_gap(intervals, max_gap) {
                    eprintln!(
                        "cantosub: segment {:.2}..{:.2} spans a pause over {:.1}s, keeping undivided",
                        seg.span.start(),
                        seg.span.end(),
                        max_gap
                    );
                }
                seg.span
            }
        };

        merged.push(MergedSegment {
            span,
            text: text.to_string(),
        });
    }

    clamp_ordering(merged)
}

/// True when any pause between consecutive intervals exceeds `max_gap`.
fn exceeds_gap(intervals: &[&VoiceInterval], max_gap: f64) -> bool {
    intervals
        .windows(2)
        .any(|pair| pair[1].span.start() - pair[0].span.end() > max_gap)
}

/// Enforce ordering and non-overlap by pulling the earlier segment's end
/// down to the later segment's start, dropping anything left with zero or
/// negative duration.
fn clamp_ordering(mut segments: Vec<MergedSegment>) -> Vec<MergedSegment> {
    segments.sort_by(|a, b| {
        a.span
            .start()
            .partial_cmp(&b.span.start())
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    let mut result: Vec<MergedSegment> = Vec::with_capacity(segments.len());
    for seg in segments.into_iter().rev() {
        let limit = result.last().map(|next: &MergedSegment| next.span.start());
        let end = match limit {
            Some(limit) => seg.span.end().min(limit),
            None => seg.span.end(),
        };
        match TimeSpan::new(seg.span.start(), end) {
            Ok(span) => result.push(MergedSegment {
                span,
                text: seg.text,
            }),
            // Clamping collapsed the segment to zero duration: drop it.
            Err(_) => continue,
        }
    }
    result.reverse();
    result
}
