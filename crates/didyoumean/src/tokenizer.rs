//! Query tokenization.
//!
//! Turns raw query text into a short, ordered list of search tokens. Two
//! candidate streams feed it: nouns found by a [`NounExtractor`] and ASCII
//! word runs (`[A-Za-z0-9_]+`). Nouns come first so they survive truncation.
//! Text without word separators, such as Japanese, only yields tokens
//! through the extractor; a whole unsegmented phrase is never a token.

use crate::errors::{self, SearchError};
use anyhow::{Context, Result};
use regex::Regex;
use std::collections::{HashMap, HashSet};
use std::path::Path;
use std::sync::OnceLock;

/// Upper bound on the number of tokens a single query can produce.
pub const MAX_TOKENS: usize = 5;

static WORD_REGEX: OnceLock<Regex> = OnceLock::new();

fn word_regex() -> &'static Regex {
    WORD_REGEX.get_or_init(|| Regex::new(r"[A-Za-z0-9_]+").expect("Word regex should compile"))
}

/// A normalized search fragment taken from the query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub raw: String,
}

impl Token {
    pub fn new(raw: impl Into<String>) -> Self {
        Self { raw: raw.into() }
    }

    /// Wildcard pattern matching any text that contains this token.
    ///
    /// ```
    /// use didyoumean::tokenizer::Token;
    ///
    /// assert_eq!(Token::new("login").contains_pattern(), "%login%");
    /// ```
    pub fn contains_pattern(&self) -> String {
        format!("%{}%", self.raw)
    }
}

/// Extracts noun phrases from free text.
///
/// Implementations are built once at startup and shared read-only by all
/// concurrent requests, hence `Send + Sync` and `&self`.
pub trait NounExtractor: Send + Sync {
    fn extract_nouns(&self, text: &str) -> Result<Vec<String>>;
}

/// Extractor used when no dictionary is configured.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoNounExtractor;

impl NounExtractor for NoNounExtractor {
    fn extract_nouns(&self, _text: &str) -> Result<Vec<String>> {
        Ok(Vec::new())
    }
}

/// Dictionary-driven noun extractor for text without word separators.
///
/// The dictionary holds one `surface<TAB>part-of-speech` entry per line.
/// Text is segmented left to right by the longest dictionary entry starting
/// at each position; segments whose part of speech is a noun (`名詞...` or
/// `noun...`) are returned.
#[derive(Debug, Clone, Default)]
pub struct DictionaryNounExtractor {
    /// surface -> is noun
    entries: HashMap<String, bool>,
    /// Longest surface, in characters
    max_chars: usize,
}

impl DictionaryNounExtractor {
    /// Load the dictionary file. Called once at process start.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| errors::dictionary_unreadable(path, &e.to_string()))?;

        Self::parse(&content)
            .with_context(|| format!("Failed to parse dictionary {}", path.display()))
    }

    /// Parse dictionary content. Blank lines and `#` comments are skipped.
    pub fn parse(content: &str) -> Result<Self> {
        let mut entries = Vec::new();

        for (line_no, line) in content.lines().enumerate() {
            let line = line.trim_end_matches('\r');
            if line.trim().is_empty() || line.starts_with('#') {
                continue;
            }

            let (surface, pos) = line.split_once('\t').with_context(|| {
                format!(
                    "line {}: expected 'surface<TAB>part-of-speech'",
                    line_no + 1
                )
            })?;
            entries.push((surface.to_string(), pos.to_string()));
        }

        Ok(Self::from_entries(entries))
    }

    /// Build from `(surface, part_of_speech)` pairs.
    pub fn from_entries<I>(entries: I) -> Self
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let mut extractor = Self::default();

        for (surface, pos) in entries {
            if surface.is_empty() {
                continue;
            }
            extractor.max_chars = extractor.max_chars.max(surface.chars().count());
            *extractor.entries.entry(surface).or_insert(false) |= is_noun(&pos);
        }

        extractor
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

fn is_noun(part_of_speech: &str) -> bool {
    part_of_speech.starts_with("名詞") || part_of_speech.to_lowercase().starts_with("noun")
}

impl NounExtractor for DictionaryNounExtractor {
    fn extract_nouns(&self, text: &str) -> Result<Vec<String>> {
        let chars: Vec<char> = text.chars().collect();
        let mut nouns = Vec::new();
        let mut i = 0;

        while i < chars.len() {
            let longest = self.max_chars.min(chars.len() - i);
            let matched = (1..=longest).rev().find_map(|len| {
                let candidate: String = chars[i..i + len].iter().collect();
                self.entries
                    .get(&candidate)
                    .map(|&noun| (len, noun, candidate))
            });

            match matched {
                Some((len, noun, surface)) => {
                    if noun {
                        nouns.push(surface);
                    }
                    i += len;
                }
                None => i += 1,
            }
        }

        Ok(nouns)
    }
}

/// Split `query` into at most `max_tokens` search tokens.
///
/// Candidates are the extracted nouns followed by every ASCII word run. They are
/// deduplicated case-sensitively in first-seen order, then tokens shorter
/// than `min_length` characters are dropped, then the list is truncated.
///
/// # Errors
///
/// Returns [`SearchError::NounExtraction`] if the extractor fails. There is
/// no fallback to word splitting alone.
pub fn tokenize(
    query: &str,
    extractor: &dyn NounExtractor,
    min_length: usize,
    max_tokens: usize,
) -> Result<Vec<Token>> {
    let nouns = extractor
        .extract_nouns(query)
        .map_err(|e| SearchError::NounExtraction(format!("{:#}", e)))?;

    let words = word_regex().find_iter(query).map(|m| m.as_str().to_string());

    let mut seen = HashSet::new();
    let tokens = nouns
        .into_iter()
        .chain(words)
        .filter(|candidate| seen.insert(candidate.clone()))
        .filter(|candidate| candidate.chars().count() >= min_length)
        .take(max_tokens)
        .map(Token::new)
        .collect();

    Ok(tokens)
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::anyhow;
    use proptest::prelude::*;

    struct FixedNouns(Vec<&'static str>);

    impl NounExtractor for FixedNouns {
        fn extract_nouns(&self, _text: &str) -> Result<Vec<String>> {
            Ok(self.0.iter().map(|s| s.to_string()).collect())
        }
    }

    struct BrokenExtractor;

    impl NounExtractor for BrokenExtractor {
        fn extract_nouns(&self, _text: &str) -> Result<Vec<String>> {
            Err(anyhow!("dictionary not loaded"))
        }
    }

    fn raw(tokens: &[Token]) -> Vec<&str> {
        tokens.iter().map(|t| t.raw.as_str()).collect()
    }

    #[test]
    fn test_words_without_nouns() {
        let tokens = tokenize("login bug", &NoNounExtractor, 2, MAX_TOKENS).unwrap();
        assert_eq!(raw(&tokens), vec!["login", "bug"]);
    }

    #[test]
    fn test_dedup_is_case_sensitive_and_precedes_length_filter() {
        let tokens = tokenize("bug bug Bug", &NoNounExtractor, 2, MAX_TOKENS).unwrap();
        assert_eq!(raw(&tokens), vec!["bug", "Bug"]);
    }

    #[test]
    fn test_short_tokens_are_dropped() {
        let tokens = tokenize("a fix to UI", &NoNounExtractor, 3, MAX_TOKENS).unwrap();
        assert_eq!(raw(&tokens), vec!["fix"]);
    }

    #[test]
    fn test_length_counts_characters_not_bytes() {
        // 2 characters, 6 bytes
        let extractor = FixedNouns(vec!["障害"]);
        let tokens = tokenize("障害", &extractor, 3, MAX_TOKENS).unwrap();
        assert!(tokens.is_empty());

        let tokens = tokenize("障害", &extractor, 2, MAX_TOKENS).unwrap();
        assert_eq!(raw(&tokens), vec!["障害"]);
    }

    #[test]
    fn test_unsegmented_text_is_not_a_word() {
        let tokens = tokenize("画面のログイン", &NoNounExtractor, 1, MAX_TOKENS).unwrap();
        assert!(tokens.is_empty());

        let extractor = FixedNouns(vec!["画面", "ログイン"]);
        let tokens = tokenize("画面のログインv2", &extractor, 2, MAX_TOKENS).unwrap();
        assert_eq!(raw(&tokens), vec!["画面", "ログイン", "v2"]);
    }

    #[test]
    fn test_nouns_come_first_and_win_truncation() {
        let extractor = FixedNouns(vec!["ログイン", "画面"]);
        let tokens = tokenize("one two three four five", &extractor, 2, MAX_TOKENS).unwrap();
        assert_eq!(
            raw(&tokens),
            vec!["ログイン", "画面", "one", "two", "three"]
        );
    }

    #[test]
    fn test_noun_repeated_as_word_is_kept_once() {
        let extractor = FixedNouns(vec!["server"]);
        let tokens = tokenize("server crash", &extractor, 2, MAX_TOKENS).unwrap();
        assert_eq!(raw(&tokens), vec!["server", "crash"]);
    }

    #[test]
    fn test_punctuation_splits_words() {
        let tokens = tokenize("crash@startup, (again)!", &NoNounExtractor, 2, MAX_TOKENS).unwrap();
        assert_eq!(raw(&tokens), vec!["crash", "startup", "again"]);
    }

    #[test]
    fn test_extractor_failure_is_fatal() {
        let err = tokenize("login bug", &BrokenExtractor, 2, MAX_TOKENS).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<SearchError>(),
            Some(SearchError::NounExtraction(_))
        ));
    }

    #[test]
    fn test_contains_pattern() {
        assert_eq!(Token::new("bug").contains_pattern(), "%bug%");
    }

    #[test]
    fn test_dictionary_extracts_nouns_only() {
        let extractor = DictionaryNounExtractor::parse(
            "# test dictionary\n\
             ログイン\t名詞,サ変接続\n\
             画面\t名詞,一般\n\
             の\t助詞,連体化\n\
             \n\
             できない\t動詞,自立\n",
        )
        .unwrap();
        assert_eq!(extractor.len(), 4);

        let nouns = extractor.extract_nouns("ログイン画面のエラーができない").unwrap();
        assert_eq!(nouns, vec!["ログイン", "画面"]);
    }

    #[test]
    fn test_dictionary_prefers_longest_match() {
        let extractor = DictionaryNounExtractor::from_entries(vec![
            ("検索".to_string(), "名詞".to_string()),
            ("検索結果".to_string(), "名詞".to_string()),
        ]);

        let nouns = extractor.extract_nouns("検索結果が空").unwrap();
        assert_eq!(nouns, vec!["検索結果"]);
    }

    #[test]
    fn test_dictionary_accepts_english_noun_tag() {
        let extractor = DictionaryNounExtractor::from_entries(vec![(
            "timeout".to_string(),
            "Noun".to_string(),
        )]);
        assert_eq!(
            extractor.extract_nouns("a timeout occurred").unwrap(),
            vec!["timeout"]
        );
    }

    #[test]
    fn test_dictionary_rejects_line_without_tab() {
        let err = DictionaryNounExtractor::parse("ログイン 名詞").unwrap_err();
        assert!(err.to_string().contains("line 1"));
    }

    #[test]
    fn test_dictionary_load_missing_file() {
        let err = DictionaryNounExtractor::load(Path::new("/nonexistent/nouns.tsv")).unwrap_err();
        assert!(err.to_string().contains("Cannot load noun dictionary"));
    }

    #[test]
    fn test_dictionary_load_from_file() {
        let temp = tempfile::TempDir::new().unwrap();
        let path = temp.path().join("nouns.tsv");
        std::fs::write(&path, "障害\t名詞,一般\n").unwrap();

        let extractor = DictionaryNounExtractor::load(&path).unwrap();
        assert_eq!(extractor.extract_nouns("障害発生").unwrap(), vec!["障害"]);
    }

    proptest! {
        #[test]
        fn prop_token_count_is_bounded(words in prop::collection::vec("[a-zA-Z]{1,8}", 0..30)) {
            let query = words.join(" ");
            let tokens = tokenize(&query, &NoNounExtractor, 1, MAX_TOKENS).unwrap();
            prop_assert!(tokens.len() <= MAX_TOKENS);
        }

        #[test]
        fn prop_tokens_are_unique_and_long_enough(
            words in prop::collection::vec("[a-cA-C]{1,4}", 0..20),
            min_length in 0usize..5,
        ) {
            let query = words.join(" ");
            let tokens = tokenize(&query, &NoNounExtractor, min_length, MAX_TOKENS).unwrap();

            let unique: HashSet<_> = tokens.iter().map(|t| t.raw.clone()).collect();
            prop_assert_eq!(unique.len(), tokens.len());
            prop_assert!(tokens.iter().all(|t| t.raw.chars().count() >= min_length));
        }
    }
}
