//! readgen binary entry point.
//!
//! Initializes tracing, parses command-line arguments with clap, and
//! dispatches to the selected subcommand via [`Cli::run`].

mod cli;
mod logging;
mod server;

use std::path::Path;

use anyhow::Result;
use clap::Parser;

use crate::cli::Cli;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Logs live next to the working directory, like the default config file.
    let log_root = Path::new(".");

    // Best-effort, before tracing is initialized.
    logging::cleanup_old_logs(log_root);

    let _guard = logging::init_tracing(log_root, cli.log_channel())?;

    cli.run().await
}
