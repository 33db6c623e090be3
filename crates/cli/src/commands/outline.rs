//! Outline command handler.

use clap::Args;
use std::path::PathBuf;
use texchunk_core::{AppError, AppResult};
use texchunk_pipeline::extract_outline;

/// Print the outline tree of one document as JSON
#[derive(Args, Debug)]
pub struct OutlineCommand {
    /// Document to inspect
    pub file: PathBuf,

    /// Titles and levels only, without node text
    #[arg(long)]
    pub titles: bool,
}

impl OutlineCommand {
    pub fn execute(&self) -> AppResult<()> {
        tracing::info!("Executing outline command for {:?}", self.file);

        let text = std::fs::read_to_string(&self.file)?;
        let name = self.file.display().to_string();
        let outline = extract_outline(&text, &name);
        if outline.is_empty() {
            return Err(AppError::Parse(format!("no chapter markers found in {}", name)));
        }

        let mut value = serde_json::to_value(&outline)?;
        if self.titles {
            strip_text(&mut value);
        }
        println!("{}", serde_json::to_string_pretty(&value)?);

        Ok(())
    }
}

fn strip_text(value: &mut serde_json::Value) {
    match value {
        serde_json::Value::Array(nodes) => nodes.iter_mut().for_each(strip_text),
        serde_json::Value::Object(node) => {
            node.remove("sanitized_text");
            if let Some(children) = node.get_mut("children") {
                strip_text(children);
            }
        }
        _ => {}
    }
}
