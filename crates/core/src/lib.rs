//! Texchunk Core Library
//!
//! This crate provides the foundational utilities shared by the texchunk
//! pipeline and CLI:
//! - Error handling (`AppError`, `AppResult`)
//! - Logging infrastructure
//! - Configuration management (`AppConfig`, `ChunkingConfig`)

pub mod config;
pub mod error;
pub mod logging;

// Re-export commonly used types
pub use config::{AppConfig, ChunkingConfig};
pub use error::{AppError, AppResult};
