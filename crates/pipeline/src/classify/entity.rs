//! Disease-name candidates from outline titles.

use regex::Regex;
use texchunk_core::{AppError, AppResult};

use crate::taxonomy::Taxonomy;

/// Pulls a disease or condition name out of a node or section title.
///
/// Candidates that look like a category label rather than a disease are
/// rejected: bare stop terms, the system category itself, and anything
/// containing a category keyword.
#[derive(Debug, Clone)]
pub struct EntityExtractor {
    patterns: Vec<Regex>,
    stop_terms: Vec<String>,
    category_keywords: Vec<String>,
}

impl EntityExtractor {
    pub fn new(taxonomy: &Taxonomy) -> AppResult<Self> {
        let patterns = taxonomy
            .entity_patterns
            .iter()
            .map(|pattern| {
                Regex::new(pattern).map_err(|e| {
                    AppError::Config(format!("Invalid entity pattern '{}': {}", pattern, e))
                })
            })
            .collect::<AppResult<Vec<_>>>()?;

        Ok(Self {
            patterns,
            stop_terms: taxonomy.entity_stop_terms.clone(),
            category_keywords: taxonomy.category_keywords().map(str::to_string).collect(),
        })
    }

    /// First accepted candidate from `node_title`, then from `section_title`.
    pub fn extract(
        &self,
        node_title: &str,
        section_title: &str,
        system_category: &str,
    ) -> Option<String> {
        [node_title, section_title]
            .into_iter()
            .filter(|title| !title.is_empty())
            .find_map(|title| self.extract_from(title, system_category))
    }

    fn extract_from(&self, title: &str, system_category: &str) -> Option<String> {
        self.patterns
            .iter()
            .filter_map(|pattern| pattern.find(title))
            .map(|m| m.as_str())
            .find(|candidate| self.accepts(candidate, system_category))
            .map(str::to_string)
    }

    fn accepts(&self, candidate: &str, system_category: &str) -> bool {
        !self.stop_terms.iter().any(|term| term == candidate)
            && candidate != system_category
            && !self
                .category_keywords
                .iter()
                .any(|keyword| candidate.contains(keyword.as_str()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn extractor() -> EntityExtractor {
        EntityExtractor::new(&Taxonomy::default()).unwrap()
    }

    #[test]
    fn test_acute_prefix_keeps_whole_match() {
        assert_eq!(
            extractor().extract("急性阑尾炎", "", "其他"),
            Some("急性阑尾炎".to_string())
        );
    }

    #[test]
    fn test_rejects_category_vocabulary() {
        let extractor = extractor();
        // "肺炎" is a respiratory keyword
        assert_eq!(extractor.extract("肺炎", "", "呼吸系统疾病"), None);
        // "呼吸系统疾病" matches `(.+)病` but contains "呼吸"
        assert_eq!(extractor.extract("呼吸系统疾病", "", "呼吸系统疾病"), None);
    }

    #[test]
    fn test_falls_back_to_section_title() {
        assert_eq!(
            extractor().extract("临床表现", "急性阑尾炎", "其他"),
            Some("急性阑尾炎".to_string())
        );
    }

    #[test]
    fn test_no_candidate() {
        assert_eq!(extractor().extract("概述", "治疗原则", "其他"), None);
        assert_eq!(extractor().extract("", "", "其他"), None);
    }

    #[test]
    fn test_invalid_pattern_is_config_error() {
        let taxonomy = Taxonomy {
            entity_patterns: vec!["(unclosed".to_string()],
            ..Taxonomy::default()
        };
        assert!(matches!(
            EntityExtractor::new(&taxonomy),
            Err(AppError::Config(_))
        ));
    }
}
