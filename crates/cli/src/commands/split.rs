//! Split command handler.

use clap::Args;
use std::path::PathBuf;
use texchunk_core::AppResult;
use texchunk_pipeline::{read_records, split_by_department};

/// Split a chunk CSV into one file per department
#[derive(Args, Debug)]
pub struct SplitCommand {
    /// Chunk CSV written by `process`
    pub input: PathBuf,

    /// Output directory
    #[arg(short, long, default_value = "departments")]
    pub output: PathBuf,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

impl SplitCommand {
    pub fn execute(&self) -> AppResult<()> {
        tracing::info!("Executing split command for {:?}", self.input);

        let records = read_records(&self.input)?;
        let written = split_by_department(&records, &self.output)?;

        if self.json {
            println!("{}", serde_json::to_string_pretty(&written)?);
        } else {
            println!(
                "Split {} records into {} files under {}",
                records.len(),
                written.len(),
                self.output.display()
            );
            for (file, count) in &written {
                println!("  {}: {}", file, count);
            }
        }

        Ok(())
    }
}
