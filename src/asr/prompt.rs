//! Vocabulary prompt construction for the recognizer.
//!
//! The initial prompt is the only supported hook for steering recognition
//! toward domain vocabulary. It is always the fixed Cantonese base hint,
//! with any caller-supplied custom vocabulary appended after it.

use crate::defaults::BASE_VOCABULARY_PROMPT;

/// Build the recognizer prompt from the base hint plus optional custom
/// vocabulary (proper nouns, brand names, jargon).
pub fn build_prompt(custom_vocabulary: Option<&str>) -> String {
    match custom_vocabulary.map(str::trim) {
        Some(custom) if !custom.is_empty() => {
            format!("{}{}", BASE_VOCABULARY_PROMPT, custom)
        }
        _ => BASE_VOCABULARY_PROMPT.to_string(),
    }
}
