//! Operations module
//!
//! Contains the reconciliation steps and the sync coordinator

pub mod cleanup;
pub mod install;
pub mod scan;
pub mod sync;

pub use cleanup::remove_legacy_configs;
pub use install::install_configs;
pub use scan::{SKIP_DIRS, list_repository_files, walk_files};
pub use sync::{PresetPrompt, SyncOperation, SyncReport, expand_choices};
