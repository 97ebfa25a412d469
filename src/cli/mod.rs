//! Command-line interface module
//!
//! Handles argument parsing, the preset listing and interactive selection

pub mod args;
pub mod prompt;

pub use args::*;
pub use prompt::TerminalPrompt;
