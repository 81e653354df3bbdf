//! Word-weight lexicon classifier for general news text.

use super::Classifier;
use crate::error::Result;
use crate::models::Classification;

/// News lexicon weights.
///
/// Keys are lowercase single words. Values in `(0.0, 1.0]` are positive,
/// in `[-1.0, 0.0)` are negative.
pub(crate) const LEXICON: &[(&str, f32)] = &[
    // Positive
    ("gain", 0.3),
    ("gains", 0.3),
    ("growth", 0.3),
    ("growing", 0.3),
    ("rally", 0.4),
    ("rallied", 0.4),
    ("record", 0.2),
    ("surge", 0.4),
    ("surged", 0.4),
    ("profit", 0.3),
    ("profits", 0.3),
    ("beat", 0.3),
    ("upgrade", 0.4),
    ("recovery", 0.4),
    ("success", 0.4),
    ("successful", 0.4),
    ("win", 0.4),
    ("wins", 0.4),
    ("victory", 0.5),
    ("breakthrough", 0.5),
    ("agreement", 0.3),
    ("approved", 0.4),
    ("strong", 0.3),
    ("good", 0.3),
    ("great", 0.4),
    ("excellent", 0.5),
    ("optimism", 0.4),
    ("optimistic", 0.4),
    ("improve", 0.3),
    ("improved", 0.3),
    ("peace", 0.4),
    ("safe", 0.3),
    // Negative
    ("loss", -0.4),
    ("losses", -0.4),
    ("decline", -0.3),
    ("declined", -0.3),
    ("fall", -0.3),
    ("fell", -0.3),
    ("plunge", -0.5),
    ("plunged", -0.5),
    ("crash", -0.6),
    ("slump", -0.4),
    ("downgrade", -0.4),
    ("recession", -0.5),
    ("layoffs", -0.5),
    ("bankruptcy", -0.6),
    ("fraud", -0.6),
    ("lawsuit", -0.4),
    ("inquiry", -0.3),
    ("scandal", -0.5),
    ("crisis", -0.5),
    ("war", -0.5),
    ("attack", -0.5),
    ("killed", -0.6),
    ("dead", -0.5),
    ("warning", -0.3),
    ("fears", -0.3),
    ("concern", -0.3),
    ("concerns", -0.3),
    ("weak", -0.3),
    ("bad", -0.4),
    ("terrible", -0.6),
    ("failed", -0.4),
    ("failure", -0.4),
    ("recall", -0.5),
    ("ban", -0.4),
    ("banned", -0.4),
];

/// Score a text using the news lexicon.
///
/// Splits on whitespace, strips non-alphabetic edges, sums matching weights
/// and clamps to `[-1.0, 1.0]`. Returns `0.0` for empty or unknown text.
#[must_use]
pub fn lexicon_score(text: &str) -> f32 {
    let mut score = 0.0_f32;
    for word in text.split_whitespace() {
        let w = word
            .trim_matches(|c: char| !c.is_alphabetic())
            .to_lowercase();
        if let Some(&(_, weight)) = LEXICON.iter().find(|(lex, _)| *lex == w) {
            score += weight;
        }
    }
    score.clamp(-1.0, 1.0)
}

/// Local classifier labelling text `POSITIVE`, `NEGATIVE` or `NEUTRAL`.
///
/// The confidence maps the magnitude of the lexicon score onto
/// `[0.5, 1.0]`: neutral text scores exactly `0.5`.
#[derive(Debug, Clone, Copy, Default)]
pub struct LexiconClassifier;

impl LexiconClassifier {
    pub fn new() -> Self {
        Self
    }
}

impl Classifier for LexiconClassifier {
    fn classify(&self, text: &str) -> Result<Classification> {
        let s = lexicon_score(text);
        let label = if s > 0.0 {
            "POSITIVE"
        } else if s < 0.0 {
            "NEGATIVE"
        } else {
            "NEUTRAL"
        };
        Ok(Classification {
            label: label.to_string(),
            score: 0.5 + s.abs() / 2.0,
        })
    }
}
