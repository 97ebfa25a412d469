//! # `format-configs`
//!
//! Keeps formatter and linter configuration consistent across repositories.
//!
//! ## Usage
//!
//! ```sh
//! format-configs                      # detect presets in the current directory
//! format-configs --only web,sql ../app
//! format-configs --interactive --commit
//! format-configs --list
//! ```
//!
//! Logs go to stderr; set `RUST_LOG` to override the level.

use clap::Parser as _;
use format_configs::cli::Args;
use format_configs::error::SyncError;
use tracing::error;
use tracing_subscriber::{EnvFilter, fmt};

fn main() {
    let args = Args::parse();

    let log_level = if args.verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));

    fmt()
        .with_target(false)
        .with_writer(std::io::stderr)
        .with_env_filter(filter)
        .init();

    match format_configs::run(&args) {
        Ok(_) => std::process::exit(0),
        Err(err) => {
            error!("{err:#}");
            std::process::exit(
                err.downcast_ref::<SyncError>()
                    .map_or(1, SyncError::exit_code),
            );
        }
    }
}
