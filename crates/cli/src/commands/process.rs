//! Process command handler.
//!
//! Runs the whole pipeline over a corpus and writes the chunk CSV.

use clap::Args;
use std::path::PathBuf;
use std::time::Instant;
use texchunk_core::{config::AppConfig, AppResult};
use texchunk_pipeline::{discover_documents, write_records, CorpusStats, Pipeline};

/// Chunk a corpus and write the records as CSV
#[derive(Args, Debug)]
pub struct ProcessCommand {
    /// Corpus root (one directory per group, documents under <group>/content/)
    pub corpus: PathBuf,

    /// Output CSV path
    #[arg(short, long, default_value = "chunks.csv")]
    pub output: PathBuf,

    /// Chunk size bound in characters
    #[arg(long, env = "TEXCHUNK_MAX_CHUNK_CHARS")]
    pub max_chunk_chars: Option<usize>,

    /// Node text shorter than this yields no chunks
    #[arg(long, env = "TEXCHUNK_MIN_CONTENT_LENGTH")]
    pub min_content_length: Option<usize>,

    /// Keyword cap per chunk
    #[arg(long, env = "TEXCHUNK_MAX_KEYWORDS")]
    pub max_keywords: Option<usize>,

    /// YAML taxonomy replacing the built-in one
    #[arg(long)]
    pub taxonomy: Option<PathBuf>,

    /// Worker threads (default: one per core)
    #[arg(short, long)]
    pub jobs: Option<usize>,

    /// Number of top keywords in the summary
    #[arg(long, default_value = "20")]
    pub top: usize,

    /// Print the summary as JSON
    #[arg(long)]
    pub json: bool,
}

impl ProcessCommand {
    pub fn execute(&self, config: AppConfig) -> AppResult<()> {
        tracing::info!("Executing process command for {:?}", self.corpus);

        let config = config.with_pipeline_overrides(
            self.max_chunk_chars,
            self.min_content_length,
            self.max_keywords,
            self.taxonomy.clone(),
            self.jobs,
        );
        config.validate()?;

        let start = Instant::now();
        let pipeline = Pipeline::from_config(&config)?;
        let sources = discover_documents(&self.corpus)?;
        let report = pipeline.process_corpus(&sources)?;
        write_records(&self.output, &report.records)?;

        let stats = CorpusStats::from_records(&report.records, self.top);
        let duration = start.elapsed().as_secs_f64();

        if self.json {
            let output = serde_json::json!({
                "output": self.output,
                "documents": report.documents,
                "skipped": report
                    .skipped
                    .iter()
                    .map(|s| serde_json::json!({ "path": s.path, "reason": s.reason }))
                    .collect::<Vec<_>>(),
                "durationSecs": duration,
                "stats": stats,
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
        } else {
            println!(
                "Processed {} documents into {} chunks in {:.2}s -> {}",
                report.documents,
                report.records.len(),
                duration,
                self.output.display()
            );
            for skipped in &report.skipped {
                println!("Skipped {}: {}", skipped.path, skipped.reason);
            }
            println!();
            print!("{}", stats.render_text());
        }

        Ok(())
    }
}
