//! Whole-pipeline scenarios over realistic documents.

#[cfg(test)]
mod tests {
    use crate::classify::ChunkRole;
    use crate::corpus::discover_documents;
    use crate::export::{read_records, write_records};
    use crate::keywords::KeywordExtractor;
    use crate::pipeline::Pipeline;
    use crate::sanitize::sanitize;
    use crate::taxonomy::Taxonomy;
    use crate::types::{ChunkRecord, HierarchyLevel};
    use std::fs;
    use std::path::Path;
    use tempfile::TempDir;
    use texchunk_core::ChunkingConfig;

    const TEXTBOOK: &str = r"\documentclass{book}
\usepackage{graphicx}
\begin{document}
\chapter{心力衰竭}
心力衰竭是各种心脏疾病导致心功能不全的一种综合征\cite{guide2018}。本章介绍其诊断和治疗的基本原则[1]。
\section{临床表现}
左心衰竭以肺循环淤血及心排血量降低为主要表现。患者常出现\textbf{劳力性呼吸困难}、端坐呼吸和夜间阵发性呼吸困难。
\begin{table}[h]
\caption{NYHA心功能分级}
\begin{tabular}{cc}
I & 无症状 \\
\end{tabular}
\end{table}
右心衰竭以体循环淤血为主要表现，可见颈静脉怒张和下肢水肿。
\subsection{体征}
双肺底可闻及湿啰音，心尖部可闻及舒张期奔马律。
\section{诊断与鉴别诊断}
根据病史、呼吸困难和水肿的表现，结合利钠肽水平升高即可确立诊断。需要与支气管哮喘所致的呼吸困难相鉴别。
\chapter{支气管哮喘}
支气管哮喘是由多种细胞参与的气道慢性炎症性疾病，表现为反复发作的喘息和气促。
\section{治疗}
治疗目标是达到并维持哮喘控制，首选吸入性糖皮质激素\textsuperscript{[2]}，必要时联合长效β2受体激动剂。
\end{document}
";

    const EMERGENCY: &str = r"\chapter{休克}
休克是机体有效循环血容量减少、组织灌注不足所导致的临床综合征，需紧急抢救。";

    fn pipeline() -> Pipeline {
        let chunking = ChunkingConfig {
            max_chunk_chars: 800,
            min_content_length: 20,
            max_keywords: 5,
        };
        Pipeline::new(&chunking, Taxonomy::default())
            .unwrap()
            .with_keyword_extractor(KeywordExtractor::frequency_only(5))
            .with_jobs(Some(2))
    }

    fn write(root: &Path, relative: &str, content: &str) {
        let path = root.join(relative);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    #[test]
    fn test_textbook_records() {
        let records = pipeline()
            .process_document(TEXTBOOK, "内科治疗指南/content/01.tex", "内科治疗指南")
            .unwrap();

        let levels: Vec<u8> = records.iter().map(|r| r.hierarchy_level.as_u8()).collect();
        assert_eq!(levels, vec![1, 2, 3, 2, 1, 2]);

        let heart = &records[..4];
        for record in heart {
            assert_eq!(record.chapter, "心力衰竭");
            assert_eq!(record.system_category, "心血管系统疾病");
            assert_eq!(record.department, "心血管内科");
        }
        let asthma = &records[4..];
        for record in asthma {
            assert_eq!(record.chapter, "支气管哮喘");
            assert_eq!(record.department, "呼吸内科");
        }

        assert_eq!(records[2].section, "临床表现");
        assert_eq!(records[2].subsection, "体征");
        assert_eq!(records[2].chunk_type, ChunkRole::ClinicalPresentation);
        assert_eq!(records[3].section, "诊断与鉴别诊断");
        assert_eq!(records[3].chunk_type, ChunkRole::Diagnosis);
        assert_eq!(records[5].chunk_type, ChunkRole::Treatment);

        for record in &records {
            assert_eq!(record.content_type, "治疗指南");
            assert!(record.parent_chunk.is_empty());
            assert!(!record.content.contains('\\'));
            assert!(!record.content.contains('{'));
            assert!(!record.content.contains("NYHA"));
            assert!(!record.content.contains("[1]"));
            assert_eq!(sanitize(&record.content), record.content);
            assert_eq!(record.char_count, record.content.chars().count());
            assert_eq!(record.token_count_estimate, record.char_count / 2);
            assert!(record.keywords.len() <= 5);
            assert!(record.keywords.iter().all(|k| !k.contains(',')));
        }
    }

    #[test]
    fn test_small_chunks_stay_bounded() {
        let chunking = ChunkingConfig {
            max_chunk_chars: 30,
            min_content_length: 20,
            max_keywords: 3,
        };
        let pipeline = Pipeline::new(&chunking, Taxonomy::default())
            .unwrap()
            .with_keyword_extractor(KeywordExtractor::frequency_only(3));
        let records = pipeline
            .process_document(TEXTBOOK, "a.tex", "内科学")
            .unwrap();

        assert!(records.len() > 6);
        for record in &records {
            assert_eq!(record.content_type, "其他");
            let single_fragment = record
                .content
                .trim_end_matches(['。', '！', '？', '；'])
                .chars()
                .all(|c| !['。', '！', '？', '；'].contains(&c));
            assert!(record.char_count < 30 || single_fragment);
        }
    }

    #[test]
    fn test_corpus_run_skips_and_keeps_order() {
        let temp = TempDir::new().unwrap();
        write(temp.path(), "内科治疗指南/content/01.tex", TEXTBOOK);
        write(temp.path(), "内科治疗指南/content/02.tex", "没有章标记的讲义，应当被跳过。");
        write(temp.path(), "急诊内科学/content/01.tex", EMERGENCY);

        let pipeline = pipeline();
        let sources = discover_documents(temp.path()).unwrap();
        assert_eq!(sources.len(), 3);

        let report = pipeline.process_corpus(&sources).unwrap();
        assert_eq!(report.documents, 2);
        assert_eq!(report.skipped.len(), 1);
        assert_eq!(report.skipped[0].path, "内科治疗指南/content/02.tex");

        let sequential: Vec<ChunkRecord> = sources
            .iter()
            .filter_map(|source| pipeline.process_source(source).ok())
            .flatten()
            .collect();
        assert_eq!(report.records, sequential);

        let last = report.records.last().unwrap();
        assert_eq!(last.source_file, "急诊内科学/content/01.tex");
        assert_eq!(last.system_category, "急诊医学");
        assert_eq!(last.department, "急诊科");
        assert_eq!(last.content_type, "急诊处理");
        assert_eq!(last.hierarchy_level, HierarchyLevel::Chapter);
    }

    #[test]
    fn test_csv_round_trip_of_batch() {
        let temp = TempDir::new().unwrap();
        let records = pipeline()
            .process_document(TEXTBOOK, "内科治疗指南/content/01.tex", "内科治疗指南")
            .unwrap();

        let path = temp.path().join("chunks.csv");
        write_records(&path, &records).unwrap();
        assert_eq!(read_records(&path).unwrap(), records);
    }
}
