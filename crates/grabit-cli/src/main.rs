use clap::Parser;
use grabit_core::logging;

mod cli;

use crate::cli::Cli;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Initialize logging as early as possible; fall back to stderr if the state dir is unusable.
    if logging::init_logging(&cli.log_level).is_err() {
        logging::init_logging_stderr(&cli.log_level);
    }

    if let Err(err) = cli.run().await {
        eprintln!("grabit error: {:#}", err);
        std::process::exit(1);
    }
}
