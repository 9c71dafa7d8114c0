use std::sync::Arc;

use clap::Parser;
use tracing::{error, info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use kgegen_console::{
    cli::{execute_command, Cli},
    config::{Config, LogFormat},
    notify::TracingNotifier,
    Console, StartupSession,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Load configuration
    let config = match Config::from_env() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Configuration error: {}", e);
            std::process::exit(1);
        }
    };

    // Initialize logging
    init_logging(&config);

    info!(
        version = env!("CARGO_PKG_VERSION"),
        base_url = %config.api.base_url,
        "KGE-Gen console starting..."
    );

    let console = match Console::open(config, Arc::new(TracingNotifier)).await {
        Ok(c) => c,
        Err(e) => {
            error!(error = %e, "Failed to initialize console");
            return Err(e.into());
        }
    };

    // Restore the persisted session before any command runs
    match console.start().await {
        Ok(StartupSession::Degraded) => {
            warn!("Backend could not confirm the session, continuing with the cached profile")
        }
        Ok(StartupSession::Hydrated(outcome)) => info!(?outcome, "Session restored"),
        Err(e) => warn!(error = %e, "Session restore failed"),
    }

    let result = execute_command(cli.command, &console).await;
    if let Some(redirect) = console.context.navigator.take_redirect() {
        info!(to = %redirect, "Redirected");
    }

    if result.exit_code == 0 {
        println!("{}", result.message);
        Ok(())
    } else {
        eprintln!("{}", result.message);
        std::process::exit(result.exit_code);
    }
}

/// Initialize tracing/logging
fn init_logging(config: &Config) {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.logging.level));

    match config.logging.format {
        LogFormat::Json => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(fmt::layer().json().with_writer(std::io::stderr))
                .init();
        }
        LogFormat::Pretty => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(fmt::layer().with_writer(std::io::stderr))
                .init();
        }
    }
}
