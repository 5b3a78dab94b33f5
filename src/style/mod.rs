//! Style transformation engine.
//!
//! Takes each merged segment's text through register conversion, English
//! handling and numeral formatting, with one hard contract on top: the
//! final text is Traditional script no matter which internal stage
//! produced it.

pub mod llm;
pub mod mt;
pub mod numerals;
pub mod register;
pub mod script;

use crate::error::CantosubError;
use crate::style::llm::LlmBackend;
use crate::style::mt::MtBackend;
use crate::style::register::SubstitutionTable;
use crate::style::script::{HkScriptNormalizer, ScriptNormalizer};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Embedded English phrase dictionary.
const ENGLISH_MAPPING_JSON: &str = include_str!("../../resources/english_mapping.json");

/// Formality level of the output phrasing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum Register {
    /// Keep spoken Cantonese as recognized.
    #[default]
    Colloquial,
    /// Convert to written Chinese, keeping a few colloquial words.
    SemiFormal,
    /// Full written Chinese.
    Formal,
}

/// What to do with embedded English spans.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum EnglishHandling {
    /// Leave English untouched.
    #[default]
    Keep,
    /// Replace English with Chinese.
    Translate,
    /// Keep English, appending a parenthetical Chinese gloss.
    Annotate,
}

/// Digit formatting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum NumeralFormat {
    /// Leave Arabic digits as-is.
    #[default]
    Arabic,
    /// Convert digit runs to Chinese lowercase numerals.
    ChineseLowercase,
}

/// User-selected style options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct StyleOptions {
    pub register: Register,
    pub english: EnglishHandling,
    pub numerals: NumeralFormat,
}

/// Style transformation engine.
///
/// Owns the mapping tables, the per-run translation cache and the model
/// handles. One instance lives for the duration of a pipeline run; the
/// cache is never persisted.
pub struct StyleEngine {
    corrections: SubstitutionTable,
    cantonese: SubstitutionTable,
    english_dict: HashMap<String, String>,
    cache: HashMap<String, String>,
    llm: Option<Box<dyn LlmBackend>>,
    mt: Option<Box<dyn MtBackend>>,
    normalizer: Option<Box<dyn ScriptNormalizer>>,
}

impl StyleEngine {
    /// Build an engine with the embedded tables and the built-in script
    /// normalizer, without any model backends.
    pub fn new() -> Self {
        let english_dict: HashMap<String, String> = serde_json::from_str(ENGLISH_MAPPING_JSON)
            .unwrap_or_else(|e| panic!("embedded english_mapping.json is invalid: {}", e));

        Self {
            corrections: register::correction_table(),
            cantonese: register::cantonese_table(),
            english_dict,
            cache: HashMap::new(),
            llm: None,
            mt: None,
            normalizer: Some(Box::new(HkScriptNormalizer::new())),
        }
    }

    pub fn with_llm(mut self, llm: Box<dyn LlmBackend>) -> Self {
        self.llm = Some(llm);
        self
    }

    pub fn with_mt(mut self, mt: Box<dyn MtBackend>) -> Self {
        self.mt = Some(mt);
        self
    }

    /// Override or remove the script normalizer.
    ///
    /// Running without one is a configuration defect: translations may
    /// leak Simplified characters. It is reported loudly here, once, and
    /// processing continues, because degraded subtitles beat none.
    pub fn with_normalizer(mut self, normalizer: Option<Box<dyn ScriptNormalizer>>) -> Self {
        if normalizer.is_none() {
            let err = CantosubError::ScriptNormalizerUnavailable;
            eprintln!("cantosub: WARNING: {err}");
            eprintln!("cantosub: WARNING: translated text will be emitted unconverted");
        }
        self.normalizer = normalizer;
        self
    }

    /// Number of cached phrase translations.
    pub fn cache_len(&self) -> usize {
        self.cache.len()
    }

    /// Transform one segment's text according to `options`.
    pub fn transform(&mut self, text: &str, options: &StyleOptions) -> String {
        // Recognizer noise first, so annotation glosses added later keep
        // their own parentheses
        let mut out = register::strip_brackets(text);
        out = self.corrections.apply(&out);

        out = match options.register {
            Register::Colloquial => out,
            Register::SemiFormal => self
                .cantonese
                .apply_filtered(&out, |key| !register::is_semi_keep(key)),
            Register::Formal => self.cantonese.apply(&out),
        };

        if options.english != EnglishHandling::Keep {
            out = self.process_english(&out, options.english);
        }

        if options.numerals == NumeralFormat::ChineseLowercase {
            out = numerals::convert_digit_runs(&out);
        }

        out = register::strip_trailing_punctuation(&out);

        // Final sweep: nothing Simplified leaves this function as long as
        // a normalizer is configured.
        if let Some(normalizer) = &self.normalizer {
            out = normalizer.to_traditional_hk(&out);
        }

        out
    }

    /// Rewrite or annotate every English span in the text.
    fn process_english(&mut self, text: &str, mode: EnglishHandling) -> String {
        let spans = find_english_spans(text);
        if spans.is_empty() {
            return text.to_string();
        }

        let mut out = String::with_capacity(text.len());
        let mut cursor = 0;
        for (start, end) in spans {
            out.push_str(&text[cursor..start]);
            let phrase = &text[start..end];
            match (self.translate_phrase(phrase), mode) {
                (Some(translation), EnglishHandling::Translate) => {
                    out.push_str(&translation);
                }
                (Some(translation), _) => {
                    out.push_str(phrase);
                    out.push('（');
                    out.push_str(&translation);
                    out.push('）');
                }
                // Never fabricate a translation; the span stays English.
                (None, _) => out.push_str(phrase),
            }
            cursor = end;
        }
        out.push_str(&text[cursor..]);
        out
    }

    /// Run one phrase through the cascade: cache, dictionary, language
    /// model, statistical translator. First success wins and is memoized.
    fn translate_phrase(&mut self, phrase: &str) -> Option<String> {
        let key = phrase.to_lowercase();
        if let Some(hit) = self.cache.get(&key) {
            return Some(hit.clone());
        }

        let translation = self
            .dictionary_translate(&key)
            .or_else(|| self.llm_translate(phrase))
            .or_else(|| self.mt_translate(phrase));

        if let Some(ref value) = translation {
            self.cache.insert(key, value.clone());
        }
        translation
    }

    /// Exact dictionary match, then word-by-word when every word is known.
    ///
    /// The dictionary is Traditional by construction; no conversion
    /// needed.
    fn dictionary_translate(&self, key: &str) -> Option<String> {
        if let Some(hit) = self.english_dict.get(key) {
            return Some(hit.clone());
        }

        let words: Vec<&str> = key.split_whitespace().collect();
        if words.len() < 2 {
            return None;
        }
        let translated: Option<Vec<&str>> = words
            .iter()
            .map(|w| {
                self.english_dict
                    .get(w.trim_matches(|c: char| "-'.,!?".contains(c)))
                    .map(|s| s.as_str())
            })
            .collect();
        translated.map(|parts| parts.concat())
    }

    /// Language model stage. The model is prompted for Traditional output
    /// but may slip; normalization is a post-condition, not an
    /// optimization.
    fn llm_translate(&mut self, phrase: &str) -> Option<String> {
        let llm = self.llm.as_mut()?;
        let prompt = llm::translation_prompt(phrase);
        match llm.generate(&prompt) {
            Ok(raw) => {
                let cleaned = llm::clean_generation(&raw);
                if cleaned.is_empty() || cleaned.eq_ignore_ascii_case(phrase) {
                    return None;
                }
                Some(self.normalize(&cleaned))
            }
            Err(e) => {
                let degraded = CantosubError::TranslationDegraded {
                    stage: llm.name().to_string(),
                    message: e.to_string(),
                };
                eprintln!("cantosub: {degraded}");
                None
            }
        }
    }

    /// Statistical translator stage. Marian emits Simplified script;
    /// output is normalized unconditionally, never accepted raw.
    fn mt_translate(&mut self, phrase: &str) -> Option<String> {
        let mt = self.mt.as_mut()?;
        match mt.translate(phrase) {
            Ok(raw) => {
                let trimmed = raw.trim();
                if trimmed.is_empty() || trimmed.eq_ignore_ascii_case(phrase) {
                    return None;
                }
                Some(self.normalize(trimmed))
            }
            Err(e) => {
                let degraded = CantosubError::TranslationDegraded {
                    stage: mt.name().to_string(),
                    message: e.to_string(),
                };
                eprintln!("cantosub: {degraded}");
                None
            }
        }
    }

    fn normalize(&self, text: &str) -> String {
        match &self.normalizer {
            Some(normalizer) => normalizer.to_traditional_hk(text),
            // Accepted risk: without a normalizer the text passes through
            // unconverted, which was already reported at configuration.
            None => text.to_string(),
        }
    }
}

impl Default for StyleEngine {
    fn default() -> Self {
        Self::new()
    }
}

/// Byte ranges of English spans: ASCII letter runs joined by single
/// spaces, hyphens or apostrophes.
fn find_english_spans(text: &str) -> Vec<(usize, usize)> {
    let bytes = text.as_bytes();
    let mut spans = Vec::new();
    let mut i = 0;

    while i < bytes.len() {
        if !bytes[i].is_ascii_alphabetic() {
            i += 1;
            continue;
        }
        let start = i;
        let mut end = i;
        while i < bytes.len() {
            if bytes[i].is_ascii_alphabetic() {
                i += 1;
                end = i;
            } else if matches!(bytes[i], b' ' | b'-' | b'\'')
                && i + 1 < bytes.len()
                && bytes[i + 1].is_ascii_alphabetic()
            {
                i += 1;
            } else {
                break;
            }
        }
        spans.push((start, end));
    }

    spans
}
