//! Summary statistics over chunk records.

use serde::Serialize;
use std::collections::HashMap;
use std::fmt::Write as _;

use crate::types::ChunkRecord;

/// One label and how many records carry it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LabelCount {
    pub label: String,
    pub count: usize,
    pub percentage: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SizeStats {
    pub total_chars: usize,
    pub min: usize,
    pub max: usize,
    pub mean: f64,
    pub median: f64,
}

/// Corpus-level summary of a chunk record set.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CorpusStats {
    pub total_chunks: usize,
    pub sizes: Option<SizeStats>,
    pub by_department: Vec<LabelCount>,
    pub by_system_category: Vec<LabelCount>,
    pub by_content_type: Vec<LabelCount>,
    pub by_chunk_type: Vec<LabelCount>,
    pub by_hierarchy_level: Vec<LabelCount>,
    /// Share of chunks that belong to a section
    pub with_section: f64,
    /// Share of chunks that belong to a subsection
    pub with_subsection: f64,
    pub unique_keywords: usize,
    pub top_keywords: Vec<LabelCount>,
}

fn percentage(count: usize, total: usize) -> f64 {
    if total == 0 {
        0.0
    } else {
        count as f64 * 100.0 / total as f64
    }
}

/// Count labels, sorted by descending count then label.
fn tally<'r, I>(labels: I, total: usize) -> Vec<LabelCount>
where
    I: IntoIterator<Item = &'r str>,
{
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for label in labels {
        *counts.entry(label).or_default() += 1;
    }

    let mut tallied: Vec<LabelCount> = counts
        .into_iter()
        .map(|(label, count)| LabelCount {
            label: label.to_string(),
            count,
            percentage: percentage(count, total),
        })
        .collect();
    tallied.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.label.cmp(&b.label)));
    tallied
}

fn size_stats(records: &[ChunkRecord]) -> Option<SizeStats> {
    let mut sizes: Vec<usize> = records.iter().map(|r| r.char_count).collect();
    if sizes.is_empty() {
        return None;
    }
    sizes.sort_unstable();

    let total_chars: usize = sizes.iter().sum();
    let mid = sizes.len() / 2;
    let median = if sizes.len() % 2 == 0 {
        (sizes[mid - 1] + sizes[mid]) as f64 / 2.0
    } else {
        sizes[mid] as f64
    };

    Some(SizeStats {
        total_chars,
        min: sizes[0],
        max: sizes[sizes.len() - 1],
        mean: total_chars as f64 / sizes.len() as f64,
        median,
    })
}

impl CorpusStats {
    /// Summarise `records`, keeping the `top_n` most frequent keywords.
    pub fn from_records(records: &[ChunkRecord], top_n: usize) -> Self {
        let total = records.len();
        let levels: Vec<String> = records
            .iter()
            .map(|r| format!("{} ({})", r.hierarchy_level.as_str(), r.hierarchy_level.as_u8()))
            .collect();

        let keyword_counts = tally(
            records.iter().flat_map(|r| r.keywords.iter().map(String::as_str)),
            total,
        );
        let unique_keywords = keyword_counts.len();
        let top_keywords = keyword_counts.into_iter().take(top_n).collect();

        Self {
            total_chunks: total,
            sizes: size_stats(records),
            by_department: tally(records.iter().map(|r| r.department.as_str()), total),
            by_system_category: tally(records.iter().map(|r| r.system_category.as_str()), total),
            by_content_type: tally(records.iter().map(|r| r.content_type.as_str()), total),
            by_chunk_type: tally(records.iter().map(|r| r.chunk_type.as_str()), total),
            by_hierarchy_level: tally(levels.iter().map(String::as_str), total),
            with_section: percentage(records.iter().filter(|r| !r.section.is_empty()).count(), total),
            with_subsection: percentage(
                records.iter().filter(|r| !r.subsection.is_empty()).count(),
                total,
            ),
            unique_keywords,
            top_keywords,
        }
    }

    /// Plain-text report.
    pub fn render_text(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "Total chunks: {}", self.total_chunks);
        if let Some(sizes) = &self.sizes {
            let _ = writeln!(out, "Total characters: {}", sizes.total_chars);
            let _ = writeln!(
                out,
                "Chunk size: min {} / mean {:.1} / median {:.1} / max {}",
                sizes.min, sizes.mean, sizes.median, sizes.max
            );
        }
        let _ = writeln!(out, "With section: {:.1}%", self.with_section);
        let _ = writeln!(out, "With subsection: {:.1}%", self.with_subsection);

        let sections = [
            ("By department", &self.by_department),
            ("By system category", &self.by_system_category),
            ("By content type", &self.by_content_type),
            ("By chunk type", &self.by_chunk_type),
            ("By hierarchy level", &self.by_hierarchy_level),
        ];
        for (heading, counts) in sections {
            let _ = writeln!(out, "\n{} ({}):", heading, counts.len());
            for entry in counts {
                let _ = writeln!(
                    out,
                    "  {}: {} ({:.1}%)",
                    entry.label, entry.count, entry.percentage
                );
            }
        }

        let _ = writeln!(
            out,
            "\nKeywords: {} unique, top {}:",
            self.unique_keywords,
            self.top_keywords.len()
        );
        for entry in &self.top_keywords {
            let _ = writeln!(out, "  {}: {}", entry.label, entry.count);
        }

        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classify::ChunkRole;
    use crate::types::{ChunkContext, HierarchyLevel};

    fn record(
        chars: usize,
        department: &str,
        level: HierarchyLevel,
        role: ChunkRole,
        keywords: &[&str],
    ) -> ChunkRecord {
        let context = ChunkContext {
            department: department.to_string(),
            section: if level == HierarchyLevel::Chapter {
                String::new()
            } else {
                "节".to_string()
            },
            subsection: if level == HierarchyLevel::Subsection {
                "小节".to_string()
            } else {
                String::new()
            },
            ..Default::default()
        };
        ChunkRecord::new(
            "字".repeat(chars),
            &context,
            level,
            role,
            keywords.iter().map(|k| k.to_string()).collect(),
        )
    }

    fn sample() -> Vec<ChunkRecord> {
        vec![
            record(100, "呼吸内科", HierarchyLevel::Chapter, ChunkRole::Overview, &["肺炎", "咳嗽"]),
            record(200, "呼吸内科", HierarchyLevel::Section, ChunkRole::Treatment, &["肺炎"]),
            record(300, "心血管内科", HierarchyLevel::Subsection, ChunkRole::Treatment, &["高血压"]),
            record(400, "肾内科", HierarchyLevel::Section, ChunkRole::Diagnosis, &[]),
        ]
    }

    #[test]
    fn test_counts_sorted_by_count_then_label() {
        let stats = CorpusStats::from_records(&sample(), 10);
        assert_eq!(stats.total_chunks, 4);
        assert_eq!(stats.by_department[0].label, "呼吸内科");
        assert_eq!(stats.by_department[0].count, 2);
        assert_eq!(stats.by_department[0].percentage, 50.0);
        assert_eq!(stats.by_chunk_type[0].label, "治疗");
        assert_eq!(stats.by_hierarchy_level[0].label, "section (2)");

        // Ties are broken by label
        let tail: Vec<_> = stats.by_department[1..].iter().map(|c| c.label.as_str()).collect();
        let mut sorted = tail.clone();
        sorted.sort();
        assert_eq!(tail, sorted);
    }

    #[test]
    fn test_sizes_and_shares() {
        let stats = CorpusStats::from_records(&sample(), 10);
        let sizes = stats.sizes.unwrap();
        assert_eq!(sizes.total_chars, 1000);
        assert_eq!(sizes.min, 100);
        assert_eq!(sizes.max, 400);
        assert_eq!(sizes.mean, 250.0);
        assert_eq!(sizes.median, 250.0);
        assert_eq!(stats.with_section, 75.0);
        assert_eq!(stats.with_subsection, 25.0);
    }

    #[test]
    fn test_top_keywords() {
        let stats = CorpusStats::from_records(&sample(), 1);
        assert_eq!(stats.unique_keywords, 3);
        assert_eq!(stats.top_keywords.len(), 1);
        assert_eq!(stats.top_keywords[0].label, "肺炎");
        assert_eq!(stats.top_keywords[0].count, 2);
    }

    #[test]
    fn test_empty_records() {
        let stats = CorpusStats::from_records(&[], 5);
        assert_eq!(stats.total_chunks, 0);
        assert!(stats.sizes.is_none());
        assert_eq!(stats.with_section, 0.0);
        assert!(stats.render_text().contains("Total chunks: 0"));
    }

    #[test]
    fn test_render_text_and_json() {
        let stats = CorpusStats::from_records(&sample(), 5);
        let text = stats.render_text();
        assert!(text.contains("By department (3):"));
        assert!(text.contains("  呼吸内科: 2 (50.0%)"));

        let json = serde_json::to_value(&stats).unwrap();
        assert_eq!(json["total_chunks"], 4);
        assert_eq!(json["top_keywords"][0]["label"], "肺炎");
    }
}
