//! Outline-aware chunking of LaTeX medical textbooks.
//!
//! Recovers the chapter/section/subsection outline of each document,
//! strips markup, cuts node text into sentence-preserving chunks and tags
//! every chunk with rule-based classifications and keywords.

pub mod chunker;
pub mod classify;
pub mod corpus;
pub mod export;
pub mod keywords;
pub mod outline;
pub mod pipeline;
pub mod sanitize;
pub mod stats;
pub mod taxonomy;
pub mod types;

#[cfg(test)]
mod tests;

// Re-export commonly used types
pub use chunker::Chunker;
pub use classify::{ChunkRole, Classifier, EntityExtractor};
pub use corpus::discover_documents;
pub use export::{read_records, split_by_department, write_records};
pub use keywords::{KeywordError, KeywordExtractor, KeywordRanker};
pub use outline::extract_outline;
pub use pipeline::{BatchReport, DocumentError, Pipeline, SkippedDocument};
pub use sanitize::sanitize;
pub use stats::CorpusStats;
pub use taxonomy::Taxonomy;
pub use types::{ChunkRecord, DocumentNode, DocumentSource, HierarchyLevel};
