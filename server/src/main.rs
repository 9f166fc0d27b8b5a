mod config;
mod logging;
mod setup;

use anyhow::{Context, Result};
use clap::Parser;
use config::Config;
use logging::{init_logging, log_config_validation, log_shutdown_info, log_startup_info};
use setup::{ensure_database_directory_from_config, initialize_app};
use tracing::{error, info};

#[derive(Parser)]
#[command(name = "taskd")]
#[command(about = "Task Management API Server")]
#[command(version)]
struct Cli {
    /// Configuration file path
    #[arg(short, long, env = "CONFIG_FILE")]
    config: Option<String>,

    /// Database URL override
    #[arg(long, env = "DATABASE_URL")]
    database_url: Option<String>,

    /// Listen address override
    #[arg(long, env = "LISTEN_ADDR")]
    listen_addr: Option<String>,

    /// Listen port override
    #[arg(long, env = "PORT")]
    port: Option<u16>,

    /// Log level override
    #[arg(long, env = "LOG_LEVEL")]
    log_level: Option<String>,
}

fn load_config(cli: &Cli) -> Result<Config> {
    let mut config = match &cli.config {
        Some(config_file) => Config::from_file(config_file)?,
        None => Config::from_env()?,
    };

    // Apply CLI overrides
    if let Some(ref database_url) = cli.database_url {
        config.database.url = Some(database_url.clone());
    }

    if let Some(ref listen_addr) = cli.listen_addr {
        config.server.listen_addr = listen_addr.clone();
    }

    if let Some(port) = cli.port {
        config.server.port = port;
    }

    if let Some(ref log_level) = cli.log_level {
        config.logging.level = log_level.clone();
    }

    Ok(config)
}

/// Resolves when the process receives SIGTERM or SIGINT. A second signal
/// aborts immediately instead of waiting for in-flight requests.
async fn shutdown_signal() {
    let mut sigterm = tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
        .expect("Failed to register SIGTERM handler");
    let mut sigint = tokio::signal::unix::signal(tokio::signal::unix::SignalKind::interrupt())
        .expect("Failed to register SIGINT handler");

    tokio::select! {
        _ = sigterm.recv() => {
            info!("Received SIGTERM, initiating graceful shutdown");
        }
        _ = sigint.recv() => {
            info!("Received SIGINT, initiating graceful shutdown");
        }
    }

    tokio::spawn(async move {
        tokio::select! {
            _ = sigterm.recv() => {}
            _ = sigint.recv() => {}
        }
        error!("Received second signal, aborting");
        std::process::exit(130);
    });
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file
    dotenv::dotenv().ok();

    // Parse CLI arguments
    let cli = Cli::parse();

    // Load configuration
    let config = load_config(&cli).context("Failed to load configuration")?;

    // Initialize the logging system; the guards flush the file channels on exit
    let _log_guards =
        init_logging(&config.logging).context("Failed to initialize logging")?;

    // Log configuration validation
    log_config_validation(&config);

    // Validate configuration (will exit if invalid)
    if let Err(e) = config.validate() {
        error!(error = %e, "Configuration validation failed");
        std::process::exit(1);
    }

    // Log startup information
    log_startup_info(&config);

    // Ensure database directory exists
    ensure_database_directory_from_config(&config)
        .context("Failed to create database directory")?;

    // Initialize application (database, repositories, server)
    info!("Initializing server components");
    let server = initialize_app(&config)
        .await
        .context("Failed to initialize application")?;

    // Start the server with graceful shutdown
    let addr = config.server_address();
    info!("Starting API server on {}", addr);

    match server.serve(&addr, shutdown_signal()).await {
        Ok(()) => {
            log_shutdown_info();
            Ok(())
        }
        Err(e) => {
            error!(error = %e, "API server error");
            std::process::exit(3);
        }
    }
}
