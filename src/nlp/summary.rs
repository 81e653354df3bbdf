//! Keyword and extractive summary derivation.
//!
//! Both functions rank content words (lowercased, stopwords and words of
//! fewer than three letters dropped) by frequency across title and body.

use crate::nlp::is_stopword;
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::{HashMap, HashSet};

/// Number of keywords kept per article.
pub const KEYWORD_COUNT: usize = 10;

/// Number of sentences kept in a summary.
pub const SUMMARY_SENTENCES: usize = 5;

static WORD_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\p{L}[\p{L}'’\-]*").expect("word regex is valid"));

static SENTENCE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[^.!?\n]+[.!?]*").expect("sentence regex is valid"));

fn content_words(text: &str) -> impl Iterator<Item = String> + '_ {
    WORD_RE
        .find_iter(text)
        .map(|m| m.as_str().to_lowercase())
        .filter(|w| w.chars().count() > 2 && !is_stopword(w))
}

/// Content-word frequencies, plus the position each word first appeared at.
fn frequencies(title: &str, text: &str) -> HashMap<String, (usize, usize)> {
    let mut freq: HashMap<String, (usize, usize)> = HashMap::new();
    for (position, word) in content_words(title).chain(content_words(text)).enumerate() {
        freq.entry(word).or_insert((0, position)).0 += 1;
    }
    freq
}

/// The `limit` most frequent content words, most frequent first.
///
/// Ties are broken by first occurrence.
pub fn keywords(title: &str, text: &str, limit: usize) -> Vec<String> {
    let mut ranked: Vec<(String, (usize, usize))> = frequencies(title, text).into_iter().collect();
    ranked.sort_by(|(_, (ca, pa)), (_, (cb, pb))| cb.cmp(ca).then(pa.cmp(pb)));
    ranked.into_iter().take(limit).map(|(w, _)| w).collect()
}

/// Pick the `limit` highest-scoring sentences of `text`, in original order.
///
/// A sentence scores the summed frequency of its content words, doubled for
/// words that also appear in the title, normalized by sentence length.
pub fn summarize(title: &str, text: &str, limit: usize) -> String {
    let freq = frequencies(title, text);
    let title_words: HashSet<String> = content_words(title).collect();

    let sentences: Vec<&str> = SENTENCE_RE
        .find_iter(text)
        .map(|m| m.as_str().trim())
        .filter(|s| !s.is_empty())
        .collect();

    let mut scored: Vec<(usize, f64)> = sentences
        .iter()
        .enumerate()
        .map(|(i, sentence)| {
            let words: Vec<String> = content_words(sentence).collect();
            if words.is_empty() {
                return (i, 0.0);
            }
            let total: usize = words
                .iter()
                .map(|w| {
                    let count = freq.get(w).map_or(0, |(c, _)| *c);
                    if title_words.contains(w) { count * 2 } else { count }
                })
                .sum();
            (i, total as f64 / words.len() as f64)
        })
        .collect();

    scored.sort_by(|(ia, sa), (ib, sb)| sb.total_cmp(sa).then(ia.cmp(ib)));
    let mut picked: Vec<usize> = scored.into_iter().take(limit).map(|(i, _)| i).collect();
    picked.sort_unstable();

    picked
        .into_iter()
        .map(|i| sentences[i])
        .collect::<Vec<_>>()
        .join(" ")
}
