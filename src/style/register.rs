//! Register conversion: vernacular Cantonese to standard written Chinese.
//!
//! Substitution is longest-match-first over a maintained mapping table, so
//! multi-character idioms are never shadowed by single-character
//! substrings. The table ships embedded in the binary, keyed the same way
//! the recognizer writes colloquial Cantonese.

use std::collections::HashMap;

/// Embedded colloquial-to-written mapping.
const CANTONESE_MAPPING_JSON: &str = include_str!("../../resources/cantonese_mapping.json");

/// Colloquial words kept as-is in the semi-formal register.
const KEEP_SEMI: &[&str] = &["睇", "靚", "啲", "咁", "咗", "嘅", "冇", "唔"];

/// Frequent recognizer mis-transcriptions and their corrections.
///
/// Applied to every segment before any register conversion, regardless of
/// the selected style. Longest match first, same as the register table.
const ASR_CORRECTIONS: &[(&str, &str)] = &[
    ("梗系", "梗係"),
    ("緊係", "梗係"),
    ("点解", "點解"),
    ("点样", "點樣"),
    ("咩事", "乜事"),
    ("乜野", "乜嘢"),
    ("系咪", "係咪"),
    ("唔系", "唔係"),
    ("有無", "有冇"),
    ("有没", "有冇"),
    ("克苦耐勞", "刻苦耐勞"),
    ("一視同人", "一視同仁"),
    ("事倍公半", "事倍功半"),
    ("事半公倍", "事半功倍"),
    ("莫名奇妙", "莫名其妙"),
    ("親力親維", "親力親為"),
    ("執粒", "執笠"),
    ("凌射", "零舍"),
    ("係統", "系統"),
    ("遊意", "猶豫"),
    ("既", "嘅"),
    ("系", "係"),
    ("距", "佢"),
    ("黎", "嚟"),
    ("野", "嘢"),
    ("吾", "唔"),
];

/// A substitution table ordered for longest-match-first scanning.
#[derive(Debug, Clone)]
pub struct SubstitutionTable {
    // (key, replacement), sorted by descending key length in chars
    entries: Vec<(String, String)>,
}

impl SubstitutionTable {
    pub fn new(pairs: impl IntoIterator<Item = (String, String)>) -> Self {
        let mut entries: Vec<(String, String)> = pairs.into_iter().collect();
        entries.sort_by(|a, b| {
            b.0.chars()
                .count()
                .cmp(&a.0.chars().count())
                .then_with(|| a.0.cmp(&b.0))
        });
        Self { entries }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Apply substitutions in a single left-to-right pass.
    ///
    /// At each position the longest matching key wins. Replacement text is
    /// appended to the output and never rescanned, so substitutions cannot
    /// cascade into each other.
    pub fn apply(&self, text: &str) -> String {
        self.apply_filtered(text, |_| true)
    }

    /// Like `apply`, but keys rejected by `keep` are skipped.
    pub fn apply_filtered(&self, text: &str, keep: impl Fn(&str) -> bool) -> String {
        let mut out = String::with_capacity(text.len());
        let mut rest = text;

        'outer: while !rest.is_empty() {
            for (key, replacement) in &self.entries {
                if rest.starts_with(key.as_str()) && keep(key) {
                    out.push_str(replacement);
                    rest = &rest[key.len()..];
                    continue 'outer;
                }
            }
            let c = rest.chars().next().unwrap_or_default();
            out.push(c);
            rest = &rest[c.len_utf8()..];
        }

        out
    }
}

/// Load the embedded colloquial-to-written table.
///
/// Panics only if the embedded resource is malformed, which is a build
/// defect rather than a runtime condition.
pub fn cantonese_table() -> SubstitutionTable {
    let map: HashMap<String, String> = serde_json::from_str(CANTONESE_MAPPING_JSON)
        .unwrap_or_else(|e| panic!("embedded cantonese_mapping.json is invalid: {}", e));
    SubstitutionTable::new(map)
}

/// Recognizer correction table.
pub fn correction_table() -> SubstitutionTable {
    SubstitutionTable::new(
        ASR_CORRECTIONS
            .iter()
            .map(|&(k, v)| (k.to_string(), v.to_string())),
    )
}

/// True if this key survives conversion in the semi-formal register.
pub fn is_semi_keep(key: &str) -> bool {
    KEEP_SEMI.contains(&key)
}

/// Strip every bracket character.
///
/// The recognizer likes wrapping uncertain words in brackets; subtitles
/// carry none. Applied before any other transformation so later stages
/// can add their own parentheses (annotation glosses) safely.
pub fn strip_brackets(text: &str) -> String {
    text.chars()
        .filter(|c| !"()（）﹙﹚[]【】「」".contains(*c))
        .collect()
}

/// Strip trailing sentence punctuation.
pub fn strip_trailing_punctuation(text: &str) -> String {
    let mut out = text.to_string();
    while out
        .chars()
        .last()
        .map(|c| "。，！？；：、.!?,;:".contains(c))
        .unwrap_or(false)
    {
        out.pop();
    }
    out.trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn embedded_table_parses() {
        let table = cantonese_table();
        assert!(table.len() > 50);
    }

    #[test]
    fn single_character_substitution() {
        let table = cantonese_table();
        assert_eq!(table.apply("我係學生"), "我是學生");
    }

    #[test]
    fn longest_match_wins_over_substring() {
        // 你哋 must be replaced as a unit, not as 你 + 哋
        let table = SubstitutionTable::new([
            ("哋".to_string(), "們".to_string()),
            ("你哋".to_string(), "你們".to_string()),
        ]);
        assert_eq!(table.apply("你哋好"), "你們好");
    }

    #[test]
    fn replacements_do_not_cascade() {
        // 佢 maps to 他; a rule for 他 must not rewrite that output
        let table = SubstitutionTable::new([
            ("佢".to_string(), "他".to_string()),
            ("他".to_string(), "X".to_string()),
        ]);
        assert_eq!(table.apply("佢他"), "他X");
    }

    #[test]
    fn phrase_level_conversion() {
        let table = cantonese_table();
        assert_eq!(table.apply("點解唔食飯"), "為什麼不吃飯");
    }

    #[test]
    fn idiom_not_shadowed_by_char() {
        let table = cantonese_table();
        // 唔係 is a phrase entry; must not become 不係 via the 唔 rule
        assert_eq!(table.apply("唔係"), "不是");
    }

    #[test]
    fn filtered_apply_skips_kept_words() {
        let table = cantonese_table();
        let out = table.apply_filtered("我睇咗", |k| !is_semi_keep(k));
        // 睇 and 咗 survive in semi-formal
        assert_eq!(out, "我睇咗");
    }

    #[test]
    fn semi_keep_list() {
        assert!(is_semi_keep("睇"));
        assert!(is_semi_keep("嘅"));
        assert!(!is_semi_keep("係"));
    }

    #[test]
    fn corrections_fix_common_errors() {
        let table = correction_table();
        assert_eq!(table.apply("我系學生"), "我係學生");
        assert_eq!(table.apply("点解唔得"), "點解唔得");
    }

    #[test]
    fn corrections_prefer_phrases() {
        let table = correction_table();
        // 系統 is legitimate; the phrase rule protects it from 系 -> 係
        assert_eq!(table.apply("係統壞咗"), "系統壞咗");
    }

    #[test]
    fn non_matching_text_is_unchanged() {
        let table = cantonese_table();
        assert_eq!(table.apply("hello world 123"), "hello world 123");
    }

    #[test]
    fn empty_input() {
        let table = cantonese_table();
        assert_eq!(table.apply(""), "");
    }

    #[test]
    fn strip_brackets_removes_all_bracket_kinds() {
        assert_eq!(strip_brackets("（笑）你好"), "笑你好");
        assert_eq!(strip_brackets("「引用」[note]"), "引用note");
    }

    #[test]
    fn strip_trailing_punctuation_removes_runs() {
        assert_eq!(strip_trailing_punctuation("你好。"), "你好");
        assert_eq!(strip_trailing_punctuation("你好！？"), "你好");
        assert_eq!(strip_trailing_punctuation("good, "), "good");
    }

    #[test]
    fn strip_trailing_punctuation_keeps_internal() {
        assert_eq!(strip_trailing_punctuation("你好，世界"), "你好，世界");
    }
}
