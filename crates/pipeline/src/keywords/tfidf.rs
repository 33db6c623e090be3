//! TF-IDF ranking over jieba word segmentation.

use std::fmt;

use super::{KeywordError, KeywordRanker};

#[cfg(feature = "jieba")]
use jieba_rs::{Jieba, KeywordExtract, TfIdf};

/// TF-IDF ranker with domain terms registered as user words.
///
/// Built without the `jieba` feature it always reports `Unavailable`.
pub struct TfIdfRanker {
    #[cfg(feature = "jieba")]
    jieba: Jieba,
    #[cfg(feature = "jieba")]
    tfidf: TfIdf,
    dictionary_size: usize,
}

impl TfIdfRanker {
    #[cfg(feature = "jieba")]
    pub fn new(dictionary: &[String]) -> Self {
        let mut jieba = Jieba::new();
        for term in dictionary.iter().filter(|t| !t.trim().is_empty()) {
            jieba.add_word(term.trim(), None, None);
        }

        Self {
            jieba,
            tfidf: TfIdf::default(),
            dictionary_size: dictionary.len(),
        }
    }

    #[cfg(not(feature = "jieba"))]
    pub fn new(dictionary: &[String]) -> Self {
        Self {
            dictionary_size: dictionary.len(),
        }
    }
}

impl fmt::Debug for TfIdfRanker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TfIdfRanker")
            .field("dictionary_size", &self.dictionary_size)
            .field("enabled", &cfg!(feature = "jieba"))
            .finish()
    }
}

impl KeywordRanker for TfIdfRanker {
    fn name(&self) -> &'static str {
        "tfidf"
    }

    #[cfg(feature = "jieba")]
    fn rank(&self, text: &str, max: usize) -> Result<Vec<String>, KeywordError> {
        Ok(self
            .tfidf
            .extract_keywords(&self.jieba, text, max, Vec::new())
            .into_iter()
            .map(|k| k.keyword)
            .collect())
    }

    #[cfg(not(feature = "jieba"))]
    fn rank(&self, _text: &str, _max: usize) -> Result<Vec<String>, KeywordError> {
        Err(KeywordError::Unavailable(
            "built without the jieba feature".to_string(),
        ))
    }
}
