//! Timed segment types shared by every pipeline stage.
//!
//! `TimeSpan` validates its invariant at construction; everything built on
//! top of it can assume `start >= 0` and `end > start` without re-checking.

use crate::error::{CantosubError, Result};

/// A half-open time interval in seconds.
///
/// Immutable value type. Construction is the only place timing is
/// validated; malformed input is rejected, never silently corrected.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimeSpan {
    start: f64,
    end: f64,
}

impl TimeSpan {
    /// Create a span, rejecting `start < 0` and `end <= start`.
    pub fn new(start: f64, end: f64) -> Result<Self> {
        if !start.is_finite() || !end.is_finite() {
            return Err(CantosubError::InvalidSegment {
                message: format!("non-finite bounds {start}..{end}"),
            });
        }
        if start < 0.0 {
            return Err(CantosubError::InvalidSegment {
                message: format!("negative start {start}"),
            });
        }
        if end <= start {
            return Err(CantosubError::InvalidSegment {
                message: format!("end {end} <= start {start}"),
            });
        }
        Ok(Self { start, end })
    }

    pub fn start(&self) -> f64 {
        self.start
    }

    pub fn end(&self) -> f64 {
        self.end
    }

    pub fn duration(&self) -> f64 {
        self.end - self.start
    }

    /// Interval overlap test: `a.start < b.end && b.start < a.end`.
    pub fn overlaps(&self, other: &TimeSpan) -> bool {
        self.start < other.end && other.start < self.end
    }

    /// True if `other` lies entirely within this span.
    pub fn contains(&self, other: &TimeSpan) -> bool {
        self.start <= other.start && other.end <= self.end
    }
}

/// One recognized word with its own timing.
#[derive(Debug, Clone, PartialEq)]
pub struct WordSpan {
    pub text: String,
    pub span: TimeSpan,
}

/// One timestamped text segment produced by the speech recognizer.
///
/// Read-only after construction.
#[derive(Debug, Clone, PartialEq)]
pub struct SpeechSegment {
    pub span: TimeSpan,
    pub text: String,
    pub words: Vec<WordSpan>,
}

impl SpeechSegment {
    pub fn new(span: TimeSpan, text: impl Into<String>) -> Self {
        Self {
            span,
            text: text.into(),
            words: Vec::new(),
        }
    }

    pub fn with_words(mut self, words: Vec<WordSpan>) -> Self {
        self.words = words;
        self
    }
}

/// A contiguous region of detected speech energy.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VoiceInterval {
    pub span: TimeSpan,
}

impl VoiceInterval {
    pub fn new(span: TimeSpan) -> Self {
        Self { span }
    }
}

/// A segment after reconciling recognition output against voice intervals.
///
/// Lists of merged segments are strictly ordered by start, non-overlapping,
/// and carry non-empty text.
#[derive(Debug, Clone, PartialEq)]
pub struct MergedSegment {
    pub span: TimeSpan,
    pub text: String,
}

/// A merged segment whose text has passed style transformation.
#[derive(Debug, Clone, PartialEq)]
pub struct StyledSegment {
    pub span: TimeSpan,
    pub text: String,
}

impl StyledSegment {
    pub fn new(span: TimeSpan, text: impl Into<String>) -> Self {
        Self {
            span,
            text: text.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn valid_span_is_accepted() {
        let span = TimeSpan::new(0.5, 2.0).unwrap();
        assert_eq!(span.start(), 0.5);
        assert_eq!(span.end(), 2.0);
        assert!((span.duration() - 1.5).abs() < 1e-9);
    }

    #[test]
    fn zero_start_is_accepted() {
        assert!(TimeSpan::new(0.0, 0.1).is_ok());
    }

    #[test]
    fn negative_start_is_rejected() {
        let result = TimeSpan::new(-0.1, 1.0);
        assert!(matches!(
            result,
            Err(CantosubError::InvalidSegment { .. })
        ));
    }

    #[test]
    fn end_before_start_is_rejected() {
        assert!(TimeSpan::new(2.0, 1.0).is_err());
    }

    #[test]
    fn zero_duration_is_rejected() {
        assert!(TimeSpan::new(1.0, 1.0).is_err());
    }

    #[test]
    fn nan_bounds_are_rejected() {
        assert!(TimeSpan::new(f64::NAN, 1.0).is_err());
        assert!(TimeSpan::new(0.0, f64::INFINITY).is_err());
    }

    #[test]
    fn overlap_detects_partial_overlap() {
        let a = TimeSpan::new(0.0, 2.0).unwrap();
        let b = TimeSpan::new(1.0, 3.0).unwrap();
        assert!(a.overlaps(&b));
        assert!(b.overlaps(&a));
    }

    #[test]
    fn overlap_rejects_touching_spans() {
        // Half-open semantics: a span ending exactly where another starts
        // does not overlap it.
        let a = TimeSpan::new(0.0, 1.0).unwrap();
        let b = TimeSpan::new(1.0, 2.0).unwrap();
        assert!(!a.overlaps(&b));
        assert!(!b.overlaps(&a));
    }

    #[test]
    fn overlap_rejects_disjoint_spans() {
        let a = TimeSpan::new(0.0, 1.0).unwrap();
        let b = TimeSpan::new(5.0, 6.0).unwrap();
        assert!(!a.overlaps(&b));
    }

    #[test]
    fn contains_full_containment() {
        let outer = TimeSpan::new(0.0, 5.0).unwrap();
        let inner = TimeSpan::new(1.0, 4.0).unwrap();
        assert!(outer.contains(&inner));
        assert!(!inner.contains(&outer));
    }

    #[test]
    fn contains_allows_equal_bounds() {
        let a = TimeSpan::new(1.0, 4.0).unwrap();
        assert!(a.contains(&a));
    }

    #[test]
    fn speech_segment_with_words() {
        let span = TimeSpan::new(0.0, 2.0).unwrap();
        let words = vec![WordSpan {
            text: "早晨".to_string(),
            span: TimeSpan::new(0.0, 0.5).unwrap(),
        }];
        let seg = SpeechSegment::new(span, "早晨").with_words(words.clone());
        assert_eq!(seg.words, words);
        assert_eq!(seg.text, "早晨");
    }
}
