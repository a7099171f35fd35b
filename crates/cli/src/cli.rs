use clap::Parser;

use crate::{
    commands::{run_command, Cli},
    logging::init_tracing,
};

/// Run the Scholar CLI application.
///
/// Parses command-line arguments, initializes tracing, and runs the
/// walkthrough.
///
/// # Returns
/// Returns `Ok(())` on successful execution, or the error that ended the run.
pub async fn run() -> scholar::Result<()> {
    let cli = Cli::parse();

    init_tracing(cli.json, cli.verbose);

    run_command(cli).await
}
