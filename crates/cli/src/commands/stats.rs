//! Stats command handler.
//!
//! Summarises an existing chunk CSV.

use clap::Args;
use std::path::PathBuf;
use texchunk_core::AppResult;
use texchunk_pipeline::{read_records, CorpusStats};

/// Summarise a chunk CSV
#[derive(Args, Debug)]
pub struct StatsCommand {
    /// Chunk CSV written by `process`
    pub input: PathBuf,

    /// Number of top keywords to show
    #[arg(long, default_value = "20")]
    pub top: usize,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

impl StatsCommand {
    pub fn execute(&self) -> AppResult<()> {
        tracing::info!("Executing stats command for {:?}", self.input);
        tracing::debug!("Stats options: {:?}", self);

        let records = read_records(&self.input)?;
        let stats = CorpusStats::from_records(&records, self.top);

        if self.json {
            println!("{}", serde_json::to_string_pretty(&stats)?);
        } else {
            print!("{}", stats.render_text());
        }

        Ok(())
    }
}
