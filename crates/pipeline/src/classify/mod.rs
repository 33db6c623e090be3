//! Rule-based classification of chunks.
//!
//! Every classification is a first-match scan over an ordered table from
//! the [`Taxonomy`]; table order is priority. All four are total: a miss
//! resolves to the taxonomy's "other" label, never an error.

mod entity;
mod role;

pub use entity::EntityExtractor;
pub use role::ChunkRole;

use texchunk_core::AppResult;

use crate::taxonomy::Taxonomy;

/// Characters of chunk text included in the role probe.
const ROLE_PROBE_CHARS: usize = 500;

/// Characters of chunk text checked by the last role stage.
const ROLE_BODY_CHARS: usize = 200;

/// Role keyword sets, lowercased once at construction.
#[derive(Debug, Clone)]
struct RoleMatcher {
    role: ChunkRole,
    keywords: Vec<String>,
    title_keywords: Vec<String>,
    body_keywords: Vec<String>,
}

fn lowered(keywords: &[String]) -> Vec<String> {
    keywords.iter().map(|k| k.to_lowercase()).collect()
}

fn contains_any(haystack: &str, keywords: &[String]) -> bool {
    keywords.iter().any(|k| haystack.contains(k.as_str()))
}

fn char_prefix(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

/// Classifier over an immutable taxonomy.
#[derive(Debug, Clone)]
pub struct Classifier {
    taxonomy: Taxonomy,
    roles: Vec<RoleMatcher>,
    entities: EntityExtractor,
}

impl Classifier {
    /// Build a classifier; fails only if the taxonomy carries an invalid
    /// entity pattern.
    pub fn new(taxonomy: Taxonomy) -> AppResult<Self> {
        let roles = taxonomy
            .roles
            .iter()
            .map(|rule| RoleMatcher {
                role: rule.role,
                keywords: lowered(&rule.keywords),
                title_keywords: lowered(&rule.title_keywords),
                body_keywords: lowered(&rule.body_keywords),
            })
            .collect();
        let entities = EntityExtractor::new(&taxonomy)?;

        Ok(Self {
            taxonomy,
            roles,
            entities,
        })
    }

    /// System category from the title, falling back to the body text.
    ///
    /// Every category is tried against the title before any is tried
    /// against the body, so a title hit always wins.
    pub fn classify_system_category(&self, body_text: &str, node_title: &str) -> String {
        [node_title, body_text]
            .into_iter()
            .find_map(|probe| {
                self.taxonomy
                    .categories
                    .iter()
                    .find(|category| contains_any(probe, &category.keywords))
            })
            .map(|category| category.name.clone())
            .unwrap_or_else(|| self.taxonomy.other_label.clone())
    }

    pub fn classify_department(&self, system_category: &str) -> String {
        self.taxonomy
            .categories
            .iter()
            .find(|category| category.name == system_category)
            .map(|category| category.department.clone())
            .unwrap_or_else(|| self.taxonomy.other_department.clone())
    }

    /// Content type from the corpus group name (substring match).
    pub fn classify_content_type(&self, source_group_name: &str) -> String {
        self.taxonomy
            .content_types
            .iter()
            .find(|rule| source_group_name.contains(rule.pattern.as_str()))
            .map(|rule| rule.label.clone())
            .unwrap_or_else(|| self.taxonomy.other_label.clone())
    }

    /// Role of a chunk, in three stages of decreasing breadth.
    ///
    /// 1. role keywords against chapter title, node title and the head of
    ///    the chunk
    /// 2. curated title keywords against the node title alone
    /// 3. curated body keywords against the first 200 characters
    pub fn classify_chunk_type(
        &self,
        node_title: &str,
        chunk_text: &str,
        ancestor_chapter_title: &str,
    ) -> ChunkRole {
        let probe = format!(
            "{} {} {}",
            ancestor_chapter_title,
            node_title,
            char_prefix(chunk_text, ROLE_PROBE_CHARS)
        )
        .to_lowercase();
        if let Some(matcher) = self.roles.iter().find(|m| contains_any(&probe, &m.keywords)) {
            return matcher.role;
        }

        let title = node_title.to_lowercase();
        if let Some(matcher) = self
            .roles
            .iter()
            .find(|m| contains_any(&title, &m.title_keywords))
        {
            return matcher.role;
        }

        let head = char_prefix(chunk_text, ROLE_BODY_CHARS).to_lowercase();
        self.roles
            .iter()
            .find(|m| contains_any(&head, &m.body_keywords))
            .map(|m| m.role)
            .unwrap_or(ChunkRole::Other)
    }

    /// Disease-name candidate for a node; see [`EntityExtractor`].
    pub fn extract_entity(
        &self,
        node_title: &str,
        section_title: &str,
        system_category: &str,
    ) -> Option<String> {
        self.entities
            .extract(node_title, section_title, system_category)
    }
}
