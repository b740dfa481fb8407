use anyhow::Context;
use clap::Parser;
use pretino::domain::model::LogLevel;
use pretino::utils::{logger, validation::Validate};
use pretino::{build_state, start_server, CliConfig};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Values from .env act like PRETINO_* variables.
    dotenvy::dotenv().ok();

    let cli = CliConfig::parse();

    let settings = match cli.load_settings() {
        Ok(settings) => settings,
        Err(e) => {
            eprintln!("❌ Failed to load settings: {}", e.user_friendly_message());
            std::process::exit(1);
        }
    };

    let level = if cli.verbose {
        LogLevel::Debug
    } else {
        settings.log_level
    };
    if cli.json_logs {
        logger::init_json_logger(level);
    } else {
        logger::init_logger(level);
    }

    tracing::info!("Starting pretino");
    tracing::debug!("CLI config: {:?}", cli);

    if let Err(e) = settings.validate() {
        tracing::error!("Configuration validation failed: {}", e);
        eprintln!("❌ {}", e.user_friendly_message());
        std::process::exit(1);
    }

    tracing::info!(
        "Serving orders of {}/{} with {} API keys",
        settings.organizer,
        settings.event_name,
        settings.api_keys.len()
    );

    let state = build_state(&settings).context("Failed to build the Pretix client")?;
    let addr = settings.bind_addr();
    start_server(state, addr)
        .await
        .with_context(|| format!("HTTP server on {} failed", addr))?;

    Ok(())
}
