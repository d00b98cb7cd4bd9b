//! Command-line front end for boot blob assembly.
//!
//! This crate turns command-line flags and JSON manifests into a
//! [`bootblob_format::ComponentRegistry`], hands it to the core planner and
//! writer, and reports the result:
//! - `config`: argument parsing and ordered component flags
//! - `manifest`: JSON manifest loading
//! - `commands`: build and inspect operations
//! - `error`: CLI error types
//!
//! # Example
//!
//! ```no_run
//! use bootblob_cli::{Invocation, commands};
//!
//! fn main() -> anyhow::Result<()> {
//!     let invocation = Invocation::from_args();
//!     let report = commands::build(&invocation)?;
//!     println!("{}", report.layout);
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![cfg_attr(test, allow(clippy::unwrap_used))]

pub mod commands;
pub mod config;
pub mod error;
pub mod manifest;

pub use config::{Cli, Directive, Invocation, LogLevel};
pub use error::{CliError, Result};
pub use manifest::Manifest;

use tracing::Level;

/// Install the stderr log subscriber.
///
/// `RUST_LOG` wins over `level` when it is set.
pub fn init_logging(level: LogLevel) {
    let fallback = Level::from(level).to_string().to_lowercase();
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(fallback)),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}
