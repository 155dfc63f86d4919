mod browser;
mod cleanup;
mod cli;
mod config;
mod credentials;
mod error;
mod host;
mod manifest;
mod model;
mod orchestrator;
mod process;
mod prompt;
mod resolve;
mod stack;
#[cfg(test)]
mod testing;
mod text_summary;

use clap::Parser;
use tracing_subscriber::EnvFilter;

/// Diagnostics go to stderr; RUST_LOG wins over --verbose.
fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact()
        .init();
}

#[tokio::main]
async fn main() {
    let args = cli::Cli::parse();
    init_logging(args.verbose);

    match cli::run(args).await {
        // Exit explicitly: the stdin reader thread may still be blocked on a read.
        Ok(()) => std::process::exit(0),
        Err(e) if error::is_interrupted(&e) => {
            eprintln!("Interrupted.");
            std::process::exit(130);
        }
        Err(e) => {
            eprintln!("Error: {e:#}");
            std::process::exit(1);
        }
    }
}
