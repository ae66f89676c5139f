//! imptool - configuration tools for cloud-connected imp devices.

use clap::Parser;
use imptool::cli::{Cli, CliRunner};
use tracing::info;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Initialize logging
    let log_level = match cli.log_level.as_str() {
        "trace" => tracing::Level::TRACE,
        "debug" => tracing::Level::DEBUG,
        "info" => tracing::Level::INFO,
        "warn" => tracing::Level::WARN,
        "error" => tracing::Level::ERROR,
        _ => tracing::Level::WARN,
    };

    tracing_subscriber::fmt()
        .with_max_level(log_level)
        .init();

    // Change working directory if specified
    if let Some(directory) = &cli.directory {
        if let Err(e) = std::env::set_current_dir(directory) {
            println!(
                "ERROR: failed to change directory to {}: {}",
                directory.display(),
                e
            );
            std::process::exit(1);
        }
        info!("changed working directory to {}", directory.display());
    }

    let mut runner = CliRunner::new(&cli);
    if let Err(e) = runner.run(cli.command).await {
        runner.print_error(&e.to_string());
        std::process::exit(1);
    }
}
