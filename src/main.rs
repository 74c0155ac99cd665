//! Chatlens - engagement metrics for local chat history
//!
#![doc = "Chatlens - engagement metrics for local chat history"]
#![doc = "Main entry point for the chatlens CLI."]

use anyhow::Result;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use chatlens::cli::{Cli, Commands};
use chatlens::commands;
use chatlens::config::Config;

#[tokio::main]
async fn main() -> Result<()> {
    // Parse command line arguments
    let cli = Cli::parse_args();

    // Initialize tracing
    init_tracing(cli.verbose);

    // Load configuration
    let config_path = cli.config.as_deref().unwrap_or("config/config.yaml");
    let config = Config::load(config_path, &cli)?;

    // Validate configuration
    config.validate()?;

    if !config.display.color {
        colored::control::set_override(false);
    }

    // Execute command
    match cli.command {
        Commands::Metrics { json, input, days } => {
            tracing::info!("Starting metrics command");
            if let Some(path) = &input {
                tracing::debug!("Using input file: {}", path.display());
            }
            commands::metrics::run_metrics(&config, input, json, days).await?;
            Ok(())
        }
        Commands::History { command } => {
            tracing::info!("Starting history command");
            commands::history::handle_history(&config, command)?;
            Ok(())
        }
        Commands::Presets { category, json } => {
            tracing::info!("Starting presets command");
            commands::presets::show_presets(category.as_deref(), json)?;
            Ok(())
        }
    }
}

/// Initialize tracing subscriber with environment filter
///
/// Logs go to stderr so `--json` output on stdout stays machine-readable.
fn init_tracing(verbose: bool) {
    let default_filter = if verbose {
        "chatlens=debug"
    } else {
        "chatlens=info"
    };
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}
