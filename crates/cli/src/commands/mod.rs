//! Command handlers for the texchunk CLI.
//!
//! This module organizes all CLI commands into separate submodules.

pub mod outline;
pub mod process;
pub mod split;
pub mod stats;

// Re-export command types for convenience
pub use outline::OutlineCommand;
pub use process::ProcessCommand;
pub use split::SplitCommand;
pub use stats::StatsCommand;
