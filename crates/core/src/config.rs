//! Configuration management for texchunk.
//!
//! This module handles loading and merging configuration from multiple sources,
//! lowest precedence first:
//! - Built-in defaults
//! - Config file (`.texchunk/config.yaml` in the workspace, or `TEXCHUNK_CONFIG`)
//! - Environment variables
//! - Command-line flags
//!
//! Malformed values are rejected here, before any document is read.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{AppError, AppResult};

/// Default chunk size bound, in characters.
pub const DEFAULT_MAX_CHUNK_CHARS: usize = 800;

/// Default minimum node text length, in characters.
pub const DEFAULT_MIN_CONTENT_LENGTH: usize = 50;

/// Default keyword cap per chunk.
pub const DEFAULT_MAX_KEYWORDS: usize = 5;

/// Main application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Workspace root (contains .texchunk/)
    pub workspace: PathBuf,

    /// Optional config file path
    pub config_file: Option<PathBuf>,

    /// Chunking and keyword limits
    pub chunking: ChunkingConfig,

    /// Optional YAML taxonomy replacing the built-in one
    pub taxonomy: Option<PathBuf>,

    /// Worker threads for per-document processing (None = rayon default)
    pub jobs: Option<usize>,

    /// Log level override
    pub log_level: Option<String>,

    /// Verbose mode (enables debug logging)
    pub verbose: bool,

    /// Disable colored output
    pub no_color: bool,
}

/// Limits applied by the chunker and keyword extractor.
///
/// All lengths are measured in characters, not bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChunkingConfig {
    /// Chunk size bound
    #[serde(default = "default_max_chunk_chars")]
    pub max_chunk_chars: usize,

    /// Node text shorter than this yields no chunks
    #[serde(default = "default_min_content_length")]
    pub min_content_length: usize,

    /// Keyword cap per chunk
    #[serde(default = "default_max_keywords")]
    pub max_keywords: usize,
}

fn default_max_chunk_chars() -> usize {
    DEFAULT_MAX_CHUNK_CHARS
}

fn default_min_content_length() -> usize {
    DEFAULT_MIN_CONTENT_LENGTH
}

fn default_max_keywords() -> usize {
    DEFAULT_MAX_KEYWORDS
}

impl Default for ChunkingConfig {
    fn default() -> Self {
        Self {
            max_chunk_chars: default_max_chunk_chars(),
            min_content_length: default_min_content_length(),
            max_keywords: default_max_keywords(),
        }
    }
}

impl ChunkingConfig {
    /// Reject limits the pipeline cannot honor.
    pub fn validate(&self) -> AppResult<()> {
        if self.max_chunk_chars == 0 {
            return Err(AppError::Config(
                "max_chunk_chars must be greater than 0".to_string(),
            ));
        }
        if self.max_keywords == 0 {
            return Err(AppError::Config(
                "max_keywords must be greater than 0".to_string(),
            ));
        }
        Ok(())
    }
}

/// Full configuration file structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct ConfigFile {
    chunking: Option<ChunkingFile>,
    taxonomy: Option<String>,
    jobs: Option<usize>,
    logging: Option<LoggingConfig>,
}

/// Chunking section of the config file; absent keys keep the current value.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct ChunkingFile {
    max_chunk_chars: Option<usize>,
    min_content_length: Option<usize>,
    max_keywords: Option<usize>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct LoggingConfig {
    level: Option<String>,
    color: Option<bool>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            workspace: std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
            config_file: None,
            chunking: ChunkingConfig::default(),
            taxonomy: None,
            jobs: None,
            log_level: None,
            verbose: false,
            no_color: false,
        }
    }
}

impl AppConfig {
    /// Load configuration from defaults, the config file and the environment.
    ///
    /// Explicit `workspace` / `config_file` arguments win over
    /// `TEXCHUNK_WORKSPACE` / `TEXCHUNK_CONFIG`.
    ///
    /// Environment variables:
    /// - `TEXCHUNK_WORKSPACE`: Override workspace path
    /// - `TEXCHUNK_CONFIG`: Path to config file
    /// - `TEXCHUNK_MAX_CHUNK_CHARS`, `TEXCHUNK_MIN_CONTENT_LENGTH`,
    ///   `TEXCHUNK_MAX_KEYWORDS`: Chunking limits
    /// - `RUST_LOG`: Log level
    /// - `NO_COLOR`: Disable colored output
    ///
    /// # Example
    /// ```no_run
    /// use texchunk_core::config::AppConfig;
    ///
    /// let config = AppConfig::load(None, None).expect("Failed to load config");
    /// println!("Max chunk chars: {}", config.chunking.max_chunk_chars);
    /// ```
    pub fn load(workspace: Option<PathBuf>, config_file: Option<PathBuf>) -> AppResult<Self> {
        let mut config = Self::default();

        if let Some(workspace) =
            workspace.or_else(|| std::env::var_os("TEXCHUNK_WORKSPACE").map(PathBuf::from))
        {
            config.workspace = workspace;
        }

        config.config_file =
            config_file.or_else(|| std::env::var_os("TEXCHUNK_CONFIG").map(PathBuf::from));

        if !config.workspace.exists() {
            return Err(AppError::Config(format!(
                "Workspace directory does not exist: {:?}",
                config.workspace
            )));
        }

        let config_path = match config.config_file {
            Some(ref cf) => {
                if !cf.exists() {
                    return Err(AppError::Config(format!("Config file not found: {:?}", cf)));
                }
                cf.clone()
            }
            None => config.texchunk_dir().join("config.yaml"),
        };

        if config_path.exists() {
            config = config.merge_yaml(&config_path)?;
        }

        // Environment variables override YAML config
        if let Some(value) = env_usize("TEXCHUNK_MAX_CHUNK_CHARS")? {
            config.chunking.max_chunk_chars = value;
        }
        if let Some(value) = env_usize("TEXCHUNK_MIN_CONTENT_LENGTH")? {
            config.chunking.min_content_length = value;
        }
        if let Some(value) = env_usize("TEXCHUNK_MAX_KEYWORDS")? {
            config.chunking.max_keywords = value;
        }

        if let Ok(level) = std::env::var("RUST_LOG") {
            config.log_level = Some(level);
        }

        if std::env::var_os("NO_COLOR").is_some() {
            config.no_color = true;
        }

        Ok(config)
    }

    /// Merge a YAML configuration file into this config.
    fn merge_yaml(mut self, path: &Path) -> AppResult<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| {
            AppError::Config(format!("Failed to read config file {:?}: {}", path, e))
        })?;

        let file: ConfigFile = serde_yaml::from_str(&contents).map_err(|e| {
            AppError::Config(format!("Failed to parse config file {:?}: {}", path, e))
        })?;

        if let Some(chunking) = file.chunking {
            if let Some(v) = chunking.max_chunk_chars {
                self.chunking.max_chunk_chars = v;
            }
            if let Some(v) = chunking.min_content_length {
                self.chunking.min_content_length = v;
            }
            if let Some(v) = chunking.max_keywords {
                self.chunking.max_keywords = v;
            }
        }

        if let Some(taxonomy) = file.taxonomy {
            // Relative taxonomy paths resolve against the config file's directory
            let taxonomy = PathBuf::from(taxonomy);
            self.taxonomy = Some(match path.parent() {
                Some(dir) if taxonomy.is_relative() => dir.join(taxonomy),
                _ => taxonomy,
            });
        }

        if file.jobs.is_some() {
            self.jobs = file.jobs;
        }

        if let Some(logging) = file.logging {
            if let Some(level) = logging.level {
                self.log_level = Some(level);
            }
            if let Some(color) = logging.color {
                self.no_color = !color;
            }
        }

        tracing::debug!("Merged config file {:?}", path);
        Ok(self)
    }

    /// Apply CLI logging overrides, giving precedence to command-line flags.
    pub fn with_overrides(mut self, log_level: Option<String>, verbose: bool, no_color: bool) -> Self {
        if let Some(log_level) = log_level {
            self.log_level = Some(log_level);
        }

        if verbose {
            self.verbose = true;
            // Verbose mode implies debug logging
            if self.log_level.is_none() {
                self.log_level = Some("debug".to_string());
            }
        }

        if no_color {
            self.no_color = true;
        }

        self
    }

    /// Apply CLI chunking and taxonomy overrides.
    pub fn with_pipeline_overrides(
        mut self,
        max_chunk_chars: Option<usize>,
        min_content_length: Option<usize>,
        max_keywords: Option<usize>,
        taxonomy: Option<PathBuf>,
        jobs: Option<usize>,
    ) -> Self {
        if let Some(v) = max_chunk_chars {
            self.chunking.max_chunk_chars = v;
        }
        if let Some(v) = min_content_length {
            self.chunking.min_content_length = v;
        }
        if let Some(v) = max_keywords {
            self.chunking.max_keywords = v;
        }
        if taxonomy.is_some() {
            self.taxonomy = taxonomy;
        }
        if jobs.is_some() {
            self.jobs = jobs;
        }
        self
    }

    /// Get the path to the .texchunk directory.
    pub fn texchunk_dir(&self) -> PathBuf {
        self.workspace.join(".texchunk")
    }

    /// Validate the configuration. Called once before a batch starts.
    pub fn validate(&self) -> AppResult<()> {
        self.chunking.validate()?;

        if self.jobs == Some(0) {
            return Err(AppError::Config("jobs must be greater than 0".to_string()));
        }

        if let Some(ref taxonomy) = self.taxonomy {
            if !taxonomy.is_file() {
                return Err(AppError::Config(format!(
                    "Taxonomy file not found: {:?}",
                    taxonomy
                )));
            }
        }

        Ok(())
    }
}

/// Read an optional numeric environment variable.
fn env_usize(name: &str) -> AppResult<Option<usize>> {
    match std::env::var(name) {
        Ok(raw) => raw.trim().parse::<usize>().map(Some).map_err(|e| {
            AppError::Config(format!("Invalid value for {}: {:?} ({})", name, raw, e))
        }),
        Err(_) => Ok(None),
    }
}
