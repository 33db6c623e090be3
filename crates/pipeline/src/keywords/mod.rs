//! Keyword extraction.
//!
//! A primary ranker (TF-IDF over word segmentation) is tried first; if it
//! reports a failure the deterministic frequency ranker takes over. The
//! failure is a value, never propagated past [`KeywordExtractor::extract`].

mod frequency;
mod tfidf;

pub use frequency::FrequencyRanker;
pub use tfidf::TfIdfRanker;

use std::collections::HashSet;
use thiserror::Error;

/// Texts shorter than this many characters get no keywords.
pub const MIN_KEYWORD_TEXT_CHARS: usize = 10;

/// Failure of a keyword ranker.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum KeywordError {
    #[error("keyword ranker unavailable: {0}")]
    Unavailable(String),

    #[error("keyword ranking failed: {0}")]
    Failed(String),
}

/// Ranks the salient terms of a text, most salient first.
pub trait KeywordRanker: Send + Sync + std::fmt::Debug {
    /// Short name for logging
    fn name(&self) -> &'static str;

    /// Up to `max` candidate terms in ranking order.
    fn rank(&self, text: &str, max: usize) -> Result<Vec<String>, KeywordError>;
}

/// Primary-then-fallback keyword strategy.
#[derive(Debug)]
pub struct KeywordExtractor {
    primary: Box<dyn KeywordRanker>,
    fallback: FrequencyRanker,
    max_keywords: usize,
}

impl KeywordExtractor {
    /// TF-IDF primary with `dictionary` terms kept whole by the segmenter.
    pub fn new(max_keywords: usize, dictionary: &[String]) -> Self {
        Self::with_primary(Box::new(TfIdfRanker::new(dictionary)), max_keywords)
    }

    pub fn with_primary(primary: Box<dyn KeywordRanker>, max_keywords: usize) -> Self {
        Self {
            primary,
            fallback: FrequencyRanker::new(),
            max_keywords,
        }
    }

    /// Frequency ranking only; output does not depend on any dictionary.
    pub fn frequency_only(max_keywords: usize) -> Self {
        Self::with_primary(Box::new(FrequencyRanker::new()), max_keywords)
    }

    /// At most `max_keywords` distinct keywords, most salient first.
    ///
    /// Keywords containing a comma are dropped so the joined column
    /// splits back into the same list.
    pub fn extract(&self, text: &str) -> Vec<String> {
        if text.chars().count() < MIN_KEYWORD_TEXT_CHARS || self.max_keywords == 0 {
            return Vec::new();
        }

        // Over-fetch so filtering still leaves a full list
        let wanted = self.max_keywords * 2;
        let ranked = match self.primary.rank(text, wanted) {
            Ok(ranked) => ranked,
            Err(e) => {
                tracing::debug!(
                    "Keyword ranker '{}' failed, using '{}': {}",
                    self.primary.name(),
                    self.fallback.name(),
                    e
                );
                self.fallback.frequency_rank(text, wanted)
            }
        };

        let mut seen = HashSet::new();
        ranked
            .into_iter()
            .map(|k| k.trim().to_string())
            .filter(|k| !k.is_empty() && !k.contains([',', '，']))
            .filter(|k| seen.insert(k.clone()))
            .take(self.max_keywords)
            .collect()
    }
}
