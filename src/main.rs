//! Tubechat CLI entry point.

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};
use tubechat::cli::{commands, Cli, Commands};
use tubechat::config::Settings;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Load configuration
    let config_path = cli
        .config
        .as_deref()
        .map(Settings::expand_path)
        .unwrap_or_else(Settings::default_config_path);
    let settings = Settings::load_from(Some(&config_path))?;

    // Initialize logging
    let log_level = match cli.verbose {
        0 => settings.general.log_level.as_str(),
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::registry()
        .with(EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| format!("tubechat={}", log_level)),
        ))
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();

    // Execute command
    match cli.command {
        Commands::Doctor => {
            commands::run_doctor(&settings)?;
        }

        Commands::Chat { inputs, model } => {
            commands::run_chat(&inputs, model, settings).await?;
        }

        Commands::Ask {
            inputs,
            question,
            model,
            top_k,
        } => {
            commands::run_ask(&inputs, &question, model, top_k, settings).await?;
        }

        Commands::Search {
            inputs,
            query,
            limit,
        } => {
            commands::run_search(&inputs, &query, limit, settings).await?;
        }

        Commands::Transcript {
            input,
            format,
            output,
        } => {
            commands::run_transcript(&input, format, output, settings).await?;
        }

        Commands::Config { action } => {
            commands::run_config(&action, &config_path, settings)?;
        }
    }

    Ok(())
}
