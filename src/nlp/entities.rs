//! Named-entity mention extraction.

use crate::error::Result;
use crate::nlp::tagger::{Chunk, Tagger};
use itertools::Itertools;

/// Extract the distinct named-entity mentions found in `text`.
///
/// Runs the tagger's tokenize → tag → chunk pipeline and walks the chunks in
/// order. Each entity chunk becomes one mention, its tokens joined with
/// single spaces. Mentions already seen are skipped (exact, case-sensitive
/// match), so the result keeps first-occurrence order. Adjacent entity chunks
/// stay separate mentions.
///
/// # Errors
///
/// Propagates tagger or chunker failures as
/// [`NewsError::Extraction`](crate::NewsError::Extraction).
pub fn extract_entities<T: Tagger + ?Sized>(text: &str, tagger: &T) -> Result<Vec<String>> {
    if text.is_empty() {
        return Ok(Vec::new());
    }

    let tokens = tagger.tokenize(text);
    let tagged = tagger.tag(tokens)?;
    let chunks = tagger.chunk(tagged)?;

    let mentions = chunks
        .into_iter()
        .filter_map(|chunk| match chunk {
            Chunk::Entity { tokens, .. } if !tokens.is_empty() => {
                Some(tokens.iter().map(|t| t.token.as_str()).join(" "))
            }
            _ => None,
        })
        .unique()
        .collect();

    Ok(mentions)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::NewsError;
    use crate::nlp::tagger::{HeuristicTagger, TaggedToken};

    /// Replays a fixed chunk sequence regardless of input.
    struct ScriptedTagger {
        chunks: Vec<Chunk>,
    }

    impl Tagger for ScriptedTagger {
        fn tokenize(&self, text: &str) -> Vec<String> {
            text.split_whitespace().map(str::to_string).collect()
        }

        fn tag(&self, tokens: Vec<String>) -> Result<Vec<TaggedToken>> {
            Ok(tokens.into_iter().map(|t| TaggedToken::new(t, "NN")).collect())
        }

        fn chunk(&self, _tagged: Vec<TaggedToken>) -> Result<Vec<Chunk>> {
            Ok(self.chunks.clone())
        }
    }

    struct BrokenTagger;

    impl Tagger for BrokenTagger {
        fn tokenize(&self, text: &str) -> Vec<String> {
            vec![text.to_string()]
        }

        fn tag(&self, _tokens: Vec<String>) -> Result<Vec<TaggedToken>> {
            Err(NewsError::Extraction("tagger model not loaded".to_string()))
        }

        fn chunk(&self, _tagged: Vec<TaggedToken>) -> Result<Vec<Chunk>> {
            unreachable!()
        }
    }

    fn entity(label: &str, words: &[&str]) -> Chunk {
        Chunk::Entity {
            label: label.to_string(),
            tokens: words.iter().map(|w| TaggedToken::new(*w, "NNP")).collect(),
        }
    }

    fn outside(word: &str) -> Chunk {
        Chunk::Outside(TaggedToken::new(word, "NN"))
    }

    #[test]
    fn empty_text_yields_nothing() {
        assert!(extract_entities("", &HeuristicTagger).unwrap().is_empty());
    }

    #[test]
    fn text_without_entities_yields_nothing() {
        let text = "stocks fell sharply on thursday after the report.";
        assert!(extract_entities(text, &HeuristicTagger).unwrap().is_empty());
    }

    #[test]
    fn dedups_in_first_occurrence_order() {
        let text = "Elon Musk said Tesla will grow. Tesla shares rose while Elon Musk sold. SpaceX too.";
        let ners = extract_entities(text, &HeuristicTagger).unwrap();
        assert_eq!(ners, vec!["Elon Musk", "Tesla", "SpaceX"]);
    }

    #[test]
    fn dedup_is_case_sensitive() {
        let tagger = ScriptedTagger {
            chunks: vec![entity("ORG", &["Apple"]), outside("and"), entity("ORG", &["APPLE"])],
        };
        let ners = extract_entities("ignored", &tagger).unwrap();
        assert_eq!(ners, vec!["Apple", "APPLE"]);
    }

    #[test]
    fn adjacent_chunks_are_not_merged() {
        let tagger = ScriptedTagger {
            chunks: vec![
                entity("PERSON", &["Janet", "Yellen"]),
                entity("GPE", &["Washington"]),
                outside("said"),
            ],
        };
        let ners = extract_entities("ignored", &tagger).unwrap();
        assert_eq!(ners, vec!["Janet Yellen", "Washington"]);
    }

    #[test]
    fn mentions_are_contiguous_token_runs() {
        let text = "Reuters reported that Bank of England officials met Rishi Sunak in London, \
                    then Rishi Sunak left for Paris.";
        let tagger = HeuristicTagger;
        let tokens = tagger.tokenize(text);
        let ners = extract_entities(text, &tagger).unwrap();

        assert!(!ners.is_empty());
        let unique: std::collections::HashSet<_> = ners.iter().collect();
        assert_eq!(unique.len(), ners.len());
        for mention in &ners {
            let parts: Vec<&str> = mention.split(' ').collect();
            let found = tokens
                .windows(parts.len())
                .any(|w| w.iter().map(String::as_str).eq(parts.iter().copied()));
            assert!(found, "{mention} is not a contiguous token run");
        }
    }

    #[test]
    fn tagger_failure_propagates() {
        let err = extract_entities("Some text", &BrokenTagger).unwrap_err();
        assert!(matches!(err, NewsError::Extraction(_)));
    }
}
