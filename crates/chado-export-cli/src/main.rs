//! chado-export - Main entry point

use chado_export_cli::Cli;
use chado_export_common::logging::{init_logging, LogConfig, LogLevel, LogOutput};
use clap::Parser;
use std::process;
use tracing::error;

#[tokio::main]
async fn main() {
    // Parse command-line arguments
    let cli = Cli::parse();

    // Pick up environment overrides from a .env file if present
    dotenvy::dotenv().ok();

    // Initialize logging based on verbose flag and environment
    let log_config = if cli.verbose {
        LogConfig::new()
            .with_level(LogLevel::Debug)
            .with_output(LogOutput::Console)
            .with_file_prefix("chado-export")
    } else {
        LogConfig::new()
            .with_level(LogLevel::Info)
            .with_output(LogOutput::Console)
            .with_file_prefix("chado-export")
    };

    // Environment variables take precedence when set
    let log_config = log_config.with_env_overrides().unwrap_or_default();

    // The export must still run if logging cannot be initialized
    let _ = init_logging(&log_config);

    // Execute the export
    if let Err(e) = chado_export_cli::commands::export::run(&cli).await {
        error!(error = %e, "Export failed");
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}
