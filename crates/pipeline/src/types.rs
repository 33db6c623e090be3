//! Outline and chunk record types.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::path::PathBuf;

use crate::classify::ChunkRole;

/// Depth of an outline node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(into = "u8", try_from = "u8")]
pub enum HierarchyLevel {
    Chapter = 1,
    Section = 2,
    Subsection = 3,
}

impl HierarchyLevel {
    /// Markup command that opens a node at this level.
    pub fn marker(&self) -> &'static str {
        match self {
            Self::Chapter => "chapter",
            Self::Section => "section",
            Self::Subsection => "subsection",
        }
    }

    /// Level of this level's children, if any.
    pub fn child(&self) -> Option<Self> {
        match self {
            Self::Chapter => Some(Self::Section),
            Self::Section => Some(Self::Subsection),
            Self::Subsection => None,
        }
    }

    pub fn as_u8(&self) -> u8 {
        *self as u8
    }

    /// Human-readable name.
    pub fn as_str(&self) -> &'static str {
        self.marker()
    }
}

impl From<HierarchyLevel> for u8 {
    fn from(level: HierarchyLevel) -> Self {
        level.as_u8()
    }
}

impl TryFrom<u8> for HierarchyLevel {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(Self::Chapter),
            2 => Ok(Self::Section),
            3 => Ok(Self::Subsection),
            other => Err(format!("invalid hierarchy level: {}", other)),
        }
    }
}

/// One outline unit (chapter, section or subsection).
///
/// `raw_span` borrows the unmodified markup belonging to this node alone:
/// descendant spans are sliced off before the node's own text is sanitized
/// into `sanitized_text`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DocumentNode<'a> {
    pub title: String,
    pub level: HierarchyLevel,
    #[serde(skip)]
    pub raw_span: &'a str,
    pub sanitized_text: String,
    pub children: Vec<DocumentNode<'a>>,
}

impl<'a> DocumentNode<'a> {
    /// Sanitized text of this node and all of its descendants, in document order.
    pub fn subtree_text(&self) -> String {
        let mut parts = Vec::new();
        self.collect_text(&mut parts);
        parts.join(" ")
    }

    fn collect_text<'s>(&'s self, parts: &mut Vec<&'s str>) {
        if !self.sanitized_text.is_empty() {
            parts.push(&self.sanitized_text);
        }
        for child in &self.children {
            child.collect_text(parts);
        }
    }

    /// Number of nodes in this subtree, including this one.
    pub fn node_count(&self) -> usize {
        1 + self.children.iter().map(DocumentNode::node_count).sum::<usize>()
    }

    /// Depth of this subtree (a leaf has depth 1).
    pub fn depth(&self) -> usize {
        1 + self.children.iter().map(DocumentNode::depth).max().unwrap_or(0)
    }
}

/// A document handed to the pipeline by corpus traversal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentSource {
    /// Absolute (or caller-relative) path used for reading
    pub path: PathBuf,

    /// Path relative to the corpus root, recorded on every chunk
    pub relative_path: String,

    /// Name of the group directory, used for content-type classification
    pub group_name: String,
}

/// Per-node values shared by every chunk cut from that node.
#[derive(Debug, Clone, Default)]
pub struct ChunkContext {
    pub source_file: String,
    pub chapter: String,
    pub section: String,
    pub subsection: String,
    pub department: String,
    pub system_category: String,
    pub content_type: String,
}

/// A classified chunk, the unit handed to persistence.
///
/// Field order is the tabular column order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChunkRecord {
    pub content: String,
    pub source_file: String,
    pub chapter: String,
    pub section: String,
    pub subsection: String,
    pub department: String,
    pub system_category: String,
    pub content_type: String,
    pub chunk_type: ChunkRole,
    pub hierarchy_level: HierarchyLevel,
    /// Reserved link field; always empty
    pub parent_chunk: String,
    #[serde(serialize_with = "join_keywords", deserialize_with = "split_keywords")]
    pub keywords: Vec<String>,
    pub char_count: usize,
    #[serde(rename = "token_count")]
    pub token_count_estimate: usize,
}

impl ChunkRecord {
    pub fn new(
        content: String,
        context: &ChunkContext,
        level: HierarchyLevel,
        chunk_type: ChunkRole,
        keywords: Vec<String>,
    ) -> Self {
        let char_count = content.chars().count();
        Self {
            content,
            source_file: context.source_file.clone(),
            chapter: context.chapter.clone(),
            section: context.section.clone(),
            subsection: context.subsection.clone(),
            department: context.department.clone(),
            system_category: context.system_category.clone(),
            content_type: context.content_type.clone(),
            chunk_type,
            hierarchy_level: level,
            parent_chunk: String::new(),
            keywords,
            char_count,
            token_count_estimate: char_count / 2,
        }
    }
}

/// Column names in serialization order.
pub const CSV_HEADER: [&str; 14] = [
    "content",
    "source_file",
    "chapter",
    "section",
    "subsection",
    "department",
    "system_category",
    "content_type",
    "chunk_type",
    "hierarchy_level",
    "parent_chunk",
    "keywords",
    "char_count",
    "token_count",
];

fn join_keywords<S: Serializer>(keywords: &[String], serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&keywords.join(","))
}

fn split_keywords<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<String>, D::Error> {
    let joined = String::deserialize(deserializer)?;
    Ok(joined
        .split(',')
        .map(str::trim)
        .filter(|k| !k.is_empty())
        .map(str::to_string)
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn leaf(title: &str, level: HierarchyLevel, text: &str) -> DocumentNode<'static> {
        DocumentNode {
            title: title.to_string(),
            level,
            raw_span: "",
            sanitized_text: text.to_string(),
            children: Vec::new(),
        }
    }

    #[test]
    fn test_level_children() {
        assert_eq!(HierarchyLevel::Chapter.child(), Some(HierarchyLevel::Section));
        assert_eq!(HierarchyLevel::Section.child(), Some(HierarchyLevel::Subsection));
        assert_eq!(HierarchyLevel::Subsection.child(), None);
        assert_eq!(HierarchyLevel::try_from(2u8), Ok(HierarchyLevel::Section));
        assert!(HierarchyLevel::try_from(4u8).is_err());
    }

    #[test]
    fn test_subtree_text_and_shape() {
        let mut section = leaf("第一节", HierarchyLevel::Section, "节正文");
        section
            .children
            .push(leaf("一、", HierarchyLevel::Subsection, "小节正文"));
        let mut chapter = leaf("第一章", HierarchyLevel::Chapter, "");
        chapter.children.push(section);
        chapter.children.push(leaf("第二节", HierarchyLevel::Section, "另一节"));

        assert_eq!(chapter.subtree_text(), "节正文 小节正文 另一节");
        assert_eq!(chapter.node_count(), 4);
        assert_eq!(chapter.depth(), 3);
    }

    #[test]
    fn test_record_counts() {
        let context = ChunkContext {
            source_file: "group/content/a.tex".to_string(),
            chapter: "第一章".to_string(),
            ..Default::default()
        };
        let record = ChunkRecord::new(
            "发热伴咳嗽。".to_string(),
            &context,
            HierarchyLevel::Chapter,
            ChunkRole::ClinicalPresentation,
            vec!["发热".to_string()],
        );
        assert_eq!(record.char_count, 6);
        assert_eq!(record.token_count_estimate, 3);
        assert!(record.parent_chunk.is_empty());
        assert!(record.section.is_empty());
    }
}
