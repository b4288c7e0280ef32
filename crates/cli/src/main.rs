//! Mobius ops CLI - environment diagnostics and table replication.
//!
//! Responsibilities:
//! - Parse command-line arguments and environment variables.
//! - Install logging and run the selected command.
//! - Map failures to structured exit codes.
//!
//! Does NOT handle:
//! - Environment layering (see `crates/config`).
//! - Token minting or Vertex calls (see `crates/client`).
//! - The copy algorithm (see `crates/replicator`).
//!
//! Invariants:
//! - Reports go to stdout; logs and errors go to stderr.

mod args;
mod commands;
mod dispatch;
mod error;

use args::Cli;
use clap::Parser;
use dispatch::run_command;
use error::{ExitCode, ExitCodeExt};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let cli = Cli::parse();

    tracing_subscriber::registry()
        .with(env_filter(cli.verbose))
        .with(fmt::layer().with_writer(std::io::stderr))
        .init();

    let exit_code = match run_command(cli).await {
        Ok(()) => ExitCode::Success,
        Err(e) => {
            eprintln!("{:#}", e);
            e.exit_code()
        }
    };

    std::process::exit(exit_code.as_i32());
}

/// `RUST_LOG` wins; otherwise `-v` raises the default `warn` level.
fn env_filter(verbose: u8) -> EnvFilter {
    let default = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default))
}
