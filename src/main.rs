use std::process::ExitCode;

use clap::Parser;
use tracing::{error, info};

mod cleaning;
mod cli;
mod config;
mod db;
mod error;
mod loader;
mod logging;

use crate::cli::Cli;

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // Load configuration from environment
    let config = match config::Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to load configuration: {}", e);
            return ExitCode::FAILURE;
        }
    };

    if let Err(e) = logging::init(&config.log_dir) {
        eprintln!("Failed to initialize logging in {}: {}", config.log_dir, e);
        return ExitCode::FAILURE;
    }

    info!("Starting job-warehouse");
    info!("Configuration loaded successfully:");
    info!("  - MySQL: {}@{}:{}/{}", config.database.user, config.database.host, config.database.port, config.database.database);
    info!("  - Raw CSV: {}", config.raw_csv_path.display());
    info!("  - Cleaned CSV: {}", config.cleaned_csv_path.display());
    info!("  - Batch size: {}", config.batch_size);

    match cli::run(cli, &config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{:#}", e);
            ExitCode::FAILURE
        }
    }
}
