//! Pipeline orchestration.
//!
//! Per document: outline extraction, then a depth-first walk emitting each
//! node's own chunks before its children's. Documents are independent, so a
//! corpus is processed on a rayon pool and merged back in corpus order.

use rayon::prelude::*;
use std::fs;
use std::path::PathBuf;
use texchunk_core::{AppConfig, AppError, AppResult, ChunkingConfig};
use thiserror::Error;

use crate::chunker::Chunker;
use crate::classify::Classifier;
use crate::keywords::KeywordExtractor;
use crate::outline::extract_outline;
use crate::taxonomy::Taxonomy;
use crate::types::{ChunkContext, ChunkRecord, DocumentNode, DocumentSource, HierarchyLevel};

/// Why a single document produced no records.
#[derive(Debug, Error)]
pub enum DocumentError {
    #[error("failed to read {path:?}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("no chapter markers found in {0}")]
    NoStructure(String),
}

impl From<DocumentError> for AppError {
    fn from(err: DocumentError) -> Self {
        match err {
            DocumentError::Read { source, .. } => AppError::Io(source),
            other => AppError::Parse(other.to_string()),
        }
    }
}

/// A document left out of the batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedDocument {
    pub path: String,
    pub reason: String,
}

/// Outcome of a corpus run.
#[derive(Debug, Default)]
pub struct BatchReport {
    /// Records of every processed document, in corpus order
    pub records: Vec<ChunkRecord>,

    /// Documents that produced records (possibly zero of them)
    pub documents: usize,

    pub skipped: Vec<SkippedDocument>,
}

/// Turns documents into classified chunk records.
#[derive(Debug)]
pub struct Pipeline {
    chunker: Chunker,
    classifier: Classifier,
    keywords: KeywordExtractor,
    jobs: Option<usize>,
}

/// Titles of the enclosing nodes while walking a chapter.
struct Ancestry<'t> {
    chapter: &'t str,
    section: &'t str,
}

impl Pipeline {
    /// Build a pipeline; invalid limits or taxonomy patterns are rejected
    /// here, before any document is read.
    pub fn new(chunking: &ChunkingConfig, taxonomy: Taxonomy) -> AppResult<Self> {
        chunking.validate()?;
        taxonomy.validate()?;

        let keywords = KeywordExtractor::new(chunking.max_keywords, &taxonomy.dictionary);
        let classifier = Classifier::new(taxonomy)?;

        Ok(Self {
            chunker: Chunker::from_config(chunking),
            classifier,
            keywords,
            jobs: None,
        })
    }

    /// Build from application config, loading a custom taxonomy if set.
    pub fn from_config(config: &AppConfig) -> AppResult<Self> {
        let taxonomy = match &config.taxonomy {
            Some(path) => Taxonomy::load(path)?,
            None => Taxonomy::default(),
        };

        Ok(Self::new(&config.chunking, taxonomy)?.with_jobs(config.jobs))
    }

    /// Worker threads for corpus runs (None = rayon default).
    pub fn with_jobs(mut self, jobs: Option<usize>) -> Self {
        self.jobs = jobs;
        self
    }

    pub fn with_keyword_extractor(mut self, keywords: KeywordExtractor) -> Self {
        self.keywords = keywords;
        self
    }

    /// Process one document's text.
    ///
    /// `source_file` is recorded on every chunk; `group_name` selects the
    /// content type.
    pub fn process_document(
        &self,
        text: &str,
        source_file: &str,
        group_name: &str,
    ) -> Result<Vec<ChunkRecord>, DocumentError> {
        let outline = extract_outline(text, source_file);
        if outline.is_empty() {
            return Err(DocumentError::NoStructure(source_file.to_string()));
        }

        let content_type = self.classifier.classify_content_type(group_name);
        let mut records = Vec::new();

        for chapter in &outline {
            let system_category = self
                .classifier
                .classify_system_category(&chapter.subtree_text(), &chapter.title);
            let department = self.classifier.classify_department(&system_category);

            let context = ChunkContext {
                source_file: source_file.to_string(),
                chapter: chapter.title.clone(),
                department,
                system_category,
                content_type: content_type.clone(),
                ..Default::default()
            };
            let ancestry = Ancestry {
                chapter: &chapter.title,
                section: "",
            };
            self.walk(chapter, &context, &ancestry, &mut records);
        }

        tracing::debug!(
            file = source_file,
            chapters = outline.len(),
            chunks = records.len(),
            "Processed document"
        );

        Ok(records)
    }

    /// Read and process one document from disk.
    pub fn process_source(&self, source: &DocumentSource) -> Result<Vec<ChunkRecord>, DocumentError> {
        let text = fs::read_to_string(&source.path).map_err(|e| DocumentError::Read {
            path: source.path.clone(),
            source: e,
        })?;
        self.process_document(&text, &source.relative_path, &source.group_name)
    }

    /// Process every document; failing documents are skipped, not fatal.
    pub fn process_corpus(&self, sources: &[DocumentSource]) -> AppResult<BatchReport> {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(self.jobs.unwrap_or(0))
            .build()
            .map_err(|e| AppError::Pipeline(format!("Failed to build worker pool: {}", e)))?;

        tracing::info!(
            "Processing {} documents on {} workers",
            sources.len(),
            pool.current_num_threads()
        );

        let results: Vec<_> = pool.install(|| {
            sources
                .par_iter()
                .map(|source| (source, self.process_source(source)))
                .collect()
        });

        let mut report = BatchReport::default();
        for (source, result) in results {
            match result {
                Ok(records) => {
                    report.documents += 1;
                    report.records.extend(records);
                }
                Err(e) => {
                    tracing::warn!("Skipping {}: {}", source.relative_path, e);
                    report.skipped.push(SkippedDocument {
                        path: source.relative_path.clone(),
                        reason: e.to_string(),
                    });
                }
            }
        }

        tracing::info!(
            "Processed {} documents into {} chunks ({} skipped)",
            report.documents,
            report.records.len(),
            report.skipped.len()
        );

        Ok(report)
    }

    fn walk(
        &self,
        node: &DocumentNode<'_>,
        context: &ChunkContext,
        ancestry: &Ancestry<'_>,
        records: &mut Vec<ChunkRecord>,
    ) {
        if let Some(entity) = self.classifier.extract_entity(
            &node.title,
            entity_section(node, ancestry),
            &context.system_category,
        ) {
            tracing::debug!(node = %node.title, entity = %entity, "Entity candidate");
        }

        let chunks = self.chunker.chunk(&node.sanitized_text);
        tracing::debug!(
            node = %node.title,
            level = node.level.as_u8(),
            chunks = chunks.len(),
            "Chunked node"
        );

        for chunk in chunks {
            let chunk_type =
                self.classifier
                    .classify_chunk_type(&node.title, &chunk, ancestry.chapter);
            let keywords = self.keywords.extract(&chunk);
            records.push(ChunkRecord::new(chunk, context, node.level, chunk_type, keywords));
        }

        for child in &node.children {
            let mut child_context = context.clone();
            let mut child_ancestry = Ancestry {
                chapter: ancestry.chapter,
                section: ancestry.section,
            };
            match child.level {
                HierarchyLevel::Section => {
                    child_context.section = child.title.clone();
                    child_ancestry.section = &child.title;
                }
                HierarchyLevel::Subsection => child_context.subsection = child.title.clone(),
                HierarchyLevel::Chapter => {}
            }
            self.walk(child, &child_context, &child_ancestry, records);
        }
    }
}

/// Enclosing section title for entity lookup; only a subsection has one
/// distinct from its own title.
fn entity_section<'a>(node: &DocumentNode<'_>, ancestry: &Ancestry<'a>) -> &'a str {
    match node.level {
        HierarchyLevel::Subsection => ancestry.section,
        HierarchyLevel::Chapter | HierarchyLevel::Section => "",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pipeline() -> Pipeline {
        let chunking = ChunkingConfig {
            max_chunk_chars: 800,
            min_content_length: 10,
            max_keywords: 5,
        };
        Pipeline::new(&chunking, Taxonomy::default())
            .unwrap()
            .with_keyword_extractor(KeywordExtractor::frequency_only(5))
    }

    #[test]
    fn test_rejects_invalid_limits() {
        let chunking = ChunkingConfig {
            max_chunk_chars: 0,
            ..ChunkingConfig::default()
        };
        assert!(matches!(
            Pipeline::new(&chunking, Taxonomy::default()),
            Err(AppError::Config(_))
        ));
    }

    #[test]
    fn test_no_structure_is_document_error() {
        let result = pipeline().process_document("只有正文，没有任何章标记的文档内容。", "a.tex", "g");
        assert!(matches!(result, Err(DocumentError::NoStructure(_))));
    }

    #[test]
    fn test_read_failure_is_document_error() {
        let source = DocumentSource {
            path: PathBuf::from("/nonexistent/doc.tex"),
            relative_path: "g/content/doc.tex".to_string(),
            group_name: "g".to_string(),
        };
        assert!(matches!(
            pipeline().process_source(&source),
            Err(DocumentError::Read { .. })
        ));
    }

    #[test]
    fn test_entity_section_only_for_subsections() {
        let node = |title: &str, level| DocumentNode {
            title: title.to_string(),
            level,
            raw_span: "",
            sanitized_text: String::new(),
            children: Vec::new(),
        };
        let ancestry = Ancestry {
            chapter: "呼吸系统疾病",
            section: "慢性阻塞性肺疾病",
        };

        let section = node("慢性阻塞性肺疾病", HierarchyLevel::Section);
        assert_eq!(entity_section(&section, &ancestry), "");
        let chapter = node("呼吸系统疾病", HierarchyLevel::Chapter);
        assert_eq!(entity_section(&chapter, &ancestry), "");
        let subsection = node("治疗", HierarchyLevel::Subsection);
        assert_eq!(entity_section(&subsection, &ancestry), "慢性阻塞性肺疾病");
    }

    #[test]
    fn test_document_error_converts() {
        let err: AppError = DocumentError::NoStructure("a.tex".to_string()).into();
        assert!(matches!(err, AppError::Parse(_)));
    }

    #[test]
    fn test_hierarchy_fields_follow_nesting() {
        let doc = r"\chapter{第一章 肺炎}
肺炎是肺实质的炎症，常见病原体为细菌。
\section{临床表现}
患者常有发热、咳嗽、咳痰等症状。
\subsection{体格检查}
肺部听诊可闻及湿啰音，叩诊呈浊音。";
        let records = pipeline().process_document(doc, "g/content/a.tex", "g").unwrap();

        assert_eq!(records.len(), 3);
        assert_eq!(records[0].hierarchy_level, HierarchyLevel::Chapter);
        assert!(records[0].section.is_empty());
        assert_eq!(records[1].section, "临床表现");
        assert!(records[1].subsection.is_empty());
        assert_eq!(records[2].section, "临床表现");
        assert_eq!(records[2].subsection, "体格检查");
        assert_eq!(records[2].hierarchy_level, HierarchyLevel::Subsection);

        for record in &records {
            assert_eq!(record.chapter, "第一章 肺炎");
            assert_eq!(record.system_category, "呼吸系统疾病");
            assert_eq!(record.department, "呼吸内科");
            assert_eq!(record.source_file, "g/content/a.tex");
        }
    }
}
