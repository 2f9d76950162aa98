//! Text normalization for transaction descriptions
//!
//! `normalize` turns free text into a canonical lower-case string with
//! reference numbers, dates and punctuation removed. `Tokenizer` splits the
//! canonical text into the token set used for learning and lookup.
//! Stopwords match regardless of accents; the tokens themselves keep theirs.

use std::collections::{BTreeSet, HashSet};
use std::sync::OnceLock;

use regex::Regex;
use unicode_normalization::UnicodeNormalization;

use crate::config::EngineConfig;

fn long_digit_run() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\d{4,}").expect("valid digit-run regex"))
}

fn date_like() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"\d{1,2}[/-]\d{1,2}(?:[/-]\d{2,4})?").expect("valid date regex")
    })
}

fn punctuation() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[^\p{L}\p{N}\s]").expect("valid punctuation regex"))
}

/// Canonicalize a description.
///
/// Removed spans become a space, so two neighbouring runs are never glued
/// together; this keeps `normalize(normalize(x)) == normalize(x)`.
pub fn normalize(text: &str) -> String {
    let lowered = text.to_lowercase();
    let without_refs = long_digit_run().replace_all(&lowered, " ");
    let without_dates = date_like().replace_all(&without_refs, " ");
    let without_punct = punctuation().replace_all(&without_dates, " ");
    without_punct.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// `normalize` for optional input; absent text is the empty string
pub fn normalize_opt(text: Option<&str>) -> String {
    text.map(normalize).unwrap_or_default()
}

/// Drop combining marks after NFD decomposition ("comisión" -> "comision")
fn fold_accents(s: &str) -> String {
    s.nfd().filter(|c| !is_combining_mark(*c)).collect()
}

fn is_combining_mark(c: char) -> bool {
    ('\u{0300}'..='\u{036F}').contains(&c)
}

/// Splits canonical text into learning tokens
#[derive(Debug, Clone)]
pub struct Tokenizer {
    stopwords: HashSet<String>,
    min_token_len: usize,
}

impl Tokenizer {
    pub fn new<I, S>(stopwords: I, min_token_len: usize) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            stopwords: stopwords
                .into_iter()
                .map(|w| fold_accents(&w.as_ref().trim().to_lowercase()))
                .collect(),
            min_token_len,
        }
    }

    pub fn from_config(config: &EngineConfig) -> Self {
        Self::new(&config.stopwords, config.min_token_len)
    }

    /// Token set of already-normalized text, in lexicographic order
    pub fn tokenize(&self, canonical: &str) -> BTreeSet<String> {
        canonical
            .split_whitespace()
            .filter(|t| t.chars().count() >= self.min_token_len)
            .filter(|t| !self.is_stopword(t))
            .map(str::to_string)
            .collect()
    }

    /// Normalize then tokenize a raw description
    pub fn tokens_of(&self, description: Option<&str>) -> BTreeSet<String> {
        self.tokenize(&normalize_opt(description))
    }

    pub fn is_stopword(&self, token: &str) -> bool {
        self.stopwords.contains(&fold_accents(token))
    }
}
