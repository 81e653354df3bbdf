//! Local text processing: tagging, entity extraction, keywords and summaries.
//!
//! # Submodules
//!
//! - [`tagger`]: The [`Tagger`] capability trait and a heuristic implementation
//! - [`entities`]: Named-entity mention extraction over any [`Tagger`]
//! - [`summary`]: Frequency-based keyword and extractive summary derivation
//!
//! Everything here is synchronous and CPU-bound. Callers on the async side
//! run it under `tokio::task::spawn_blocking`.

pub mod entities;
pub mod summary;
pub mod tagger;

pub use entities::extract_entities;
pub use summary::{keywords, summarize};
pub use tagger::{Chunk, HeuristicTagger, TaggedToken, Tagger};

use once_cell::sync::Lazy;
use std::collections::HashSet;

/// English function words ignored by the tagger and keyword scoring.
pub(crate) static STOPWORDS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        "a", "about", "above", "after", "again", "against", "all", "also", "am", "an", "and",
        "any", "are", "as", "at", "be", "because", "been", "before", "being", "below",
        "between", "both", "but", "by", "can", "could", "did", "do", "does", "doing", "down",
        "during", "each", "even", "few", "for", "from", "further", "had", "has", "have",
        "having", "he", "her", "here", "hers", "herself", "him", "himself", "his", "how",
        "however", "i", "if", "in", "into", "is", "it", "its", "itself", "just", "last",
        "many", "may", "me", "meanwhile", "might", "more", "most", "much", "must", "my",
        "myself", "no", "nor", "not", "now", "of", "off", "on", "once", "one", "only",
        "or", "other", "our", "ours", "ourselves", "out", "over", "own", "said", "same",
        "says", "she", "should", "since", "so", "some", "still", "such", "than", "that",
        "the", "their", "theirs", "them", "themselves", "then", "there", "these", "they",
        "this", "those", "though", "through", "to", "too", "two", "under", "until", "up",
        "very", "was", "we", "were", "what", "when", "where", "whether", "which",
        "while", "who", "whom", "why", "will", "with", "would", "year", "years", "yet",
        "you", "your", "yours", "yourself", "yourselves",
    ]
    .into_iter()
    .collect()
});

pub(crate) fn is_stopword(word: &str) -> bool {
    STOPWORDS.contains(word.to_lowercase().as_str())
}
