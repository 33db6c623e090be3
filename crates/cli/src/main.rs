//! Texchunk CLI
//!
//! Main entry point for the texchunk command-line tool.
//! Turns a corpus of LaTeX textbooks into classified chunk records.

mod commands;

use clap::{Parser, Subcommand};
use commands::{OutlineCommand, ProcessCommand, SplitCommand, StatsCommand};
use std::path::PathBuf;
use texchunk_core::{config::AppConfig, logging, AppResult};

/// Texchunk - outline-aware chunking of LaTeX medical textbooks
#[derive(Parser, Debug)]
#[command(name = "texchunk")]
#[command(about = "Outline-aware chunking of LaTeX medical textbooks", long_about = None)]
#[command(version)]
struct Cli {
    /// Path to workspace directory (default: current directory)
    #[arg(short, long, global = true, env = "TEXCHUNK_WORKSPACE")]
    workspace: Option<PathBuf>,

    /// Path to config file
    #[arg(short, long, global = true, env = "TEXCHUNK_CONFIG")]
    config: Option<PathBuf>,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long, global = true, env = "RUST_LOG")]
    log_level: Option<String>,

    /// Enable verbose output (sets log level to debug)
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Disable colored output
    #[arg(long, global = true, env = "NO_COLOR")]
    no_color: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Chunk a corpus and write the records as CSV
    Process(ProcessCommand),

    /// Print the outline tree of one document as JSON
    Outline(OutlineCommand),

    /// Split a chunk CSV into one file per department
    Split(SplitCommand),

    /// Summarise a chunk CSV
    Stats(StatsCommand),
}

fn main() -> AppResult<()> {
    // Parse command-line arguments first (needed for logging config)
    let cli = Cli::parse();

    // Load configuration from defaults, config file and environment
    let config = AppConfig::load(cli.workspace, cli.config)?;

    // Apply CLI overrides
    let config = config.with_overrides(cli.log_level, cli.verbose, cli.no_color);

    // Initialize logging with final configuration
    logging::init_logging(config.log_level.as_deref(), config.no_color)?;

    tracing::info!("Texchunk CLI starting");
    tracing::debug!("Workspace: {:?}", config.workspace);

    let command_name = match &cli.command {
        Commands::Process(_) => "process",
        Commands::Outline(_) => "outline",
        Commands::Split(_) => "split",
        Commands::Stats(_) => "stats",
    };
    let _span = tracing::info_span!("command", name = command_name).entered();

    // Route to command handlers
    let result = match cli.command {
        Commands::Process(cmd) => cmd.execute(config),
        Commands::Outline(cmd) => cmd.execute(),
        Commands::Split(cmd) => cmd.execute(),
        Commands::Stats(cmd) => cmd.execute(),
    };

    match &result {
        Ok(_) => tracing::info!("Command completed successfully"),
        Err(e) => tracing::error!("Command failed: {}", e),
    }

    result
}
