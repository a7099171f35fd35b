use tracing::error;

/// CLI module for command-line interface logic.
mod cli;
/// Commands module with the argument definitions and the run entry point.
mod commands;
/// Logging module for setting up tracing.
mod logging;

#[tokio::main]
async fn main() {
    if let Err(e) = cli::run().await {
        error!("{}", e);
        std::process::exit(1);
    }
}
