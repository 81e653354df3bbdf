//! Tokenizer, part-of-speech tagger and entity chunker.
//!
//! The entity extractor only sees the [`Tagger`] trait, so any tagging
//! backend (or a fake in tests) can be plugged in. [`HeuristicTagger`] is the
//! built-in backend: it needs no model data and tags proper nouns by
//! capitalization, then chunks with the grammar `NE: {<NNP>+}`.

use crate::error::Result;
use crate::nlp::is_stopword;
use once_cell::sync::Lazy;
use regex::Regex;

/// A token with its part-of-speech tag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaggedToken {
    pub token: String,
    pub tag: String,
}

impl TaggedToken {
    pub fn new(token: impl Into<String>, tag: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            tag: tag.into(),
        }
    }
}

/// One node of a chunked sentence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Chunk {
    /// A contiguous span the grammar labelled as a named entity.
    Entity {
        label: String,
        tokens: Vec<TaggedToken>,
    },
    /// A token outside any entity span.
    Outside(TaggedToken),
}

/// Capability interface over a tokenize → tag → chunk pipeline.
///
/// Implementations must be deterministic and free of side effects for a
/// given input.
pub trait Tagger: Send + Sync {
    fn tokenize(&self, text: &str) -> Vec<String>;

    fn tag(&self, tokens: Vec<String>) -> Result<Vec<TaggedToken>>;

    fn chunk(&self, tagged: Vec<TaggedToken>) -> Result<Vec<Chunk>>;
}

static TOKEN_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"[\p{L}\p{N}]+(?:['’&.\-][\p{L}\p{N}]+)*|[^\s\p{L}\p{N}]")
        .expect("token regex is valid")
});

/// Dependency-free tagger based on capitalization.
#[derive(Debug, Clone, Copy, Default)]
pub struct HeuristicTagger;

impl HeuristicTagger {
    pub const ENTITY_LABEL: &'static str = "NE";

    fn tag_token(token: &str) -> &'static str {
        let mut chars = token.chars();
        let Some(first) = chars.next() else {
            return "NN";
        };
        if !first.is_alphanumeric() {
            return match token {
                "." | "!" | "?" => ".",
                "," => ",",
                _ => ":",
            };
        }
        if first.is_numeric() {
            return "CD";
        }
        if first.is_uppercase() && !is_stopword(token) {
            return "NNP";
        }
        "NN"
    }
}

impl Tagger for HeuristicTagger {
    fn tokenize(&self, text: &str) -> Vec<String> {
        TOKEN_RE
            .find_iter(text)
            .map(|m| m.as_str().to_string())
            .collect()
    }

    fn tag(&self, tokens: Vec<String>) -> Result<Vec<TaggedToken>> {
        Ok(tokens
            .into_iter()
            .map(|token| {
                let tag = Self::tag_token(&token);
                TaggedToken { token, tag: tag.to_string() }
            })
            .collect())
    }

    fn chunk(&self, tagged: Vec<TaggedToken>) -> Result<Vec<Chunk>> {
        let mut chunks = Vec::new();
        let mut current: Vec<TaggedToken> = Vec::new();

        for token in tagged {
            if token.tag == "NNP" {
                current.push(token);
                continue;
            }
            if !current.is_empty() {
                chunks.push(Chunk::Entity {
                    label: Self::ENTITY_LABEL.to_string(),
                    tokens: std::mem::take(&mut current),
                });
            }
            chunks.push(Chunk::Outside(token));
        }
        if !current.is_empty() {
            chunks.push(Chunk::Entity {
                label: Self::ENTITY_LABEL.to_string(),
                tokens: current,
            });
        }

        Ok(chunks)
    }
}
