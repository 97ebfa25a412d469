//! Git operations module
//!
//! Handles working tree queries and the guarded auto-commit

pub mod commit;
pub mod repository;

pub use commit::*;
pub use repository::*;
