//! obmm bot entry point.

use anyhow::Result;
use clap::Parser;
use tracing::info;

/// Single-pair order-book market-making bot.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Configuration file path (can also be set via OBMM_CONFIG env var)
    #[arg(short, long)]
    config: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    obmm_telemetry::init_logging()?;

    info!("Starting obmm bot v{}", env!("CARGO_PKG_VERSION"));

    let config = match args.config.or_else(|| std::env::var("OBMM_CONFIG").ok()) {
        Some(path) => {
            info!(config_path = %path, "Loading configuration");
            obmm_bot::AppConfig::from_file(&path)?
        }
        None => obmm_bot::AppConfig::load()?,
    };
    info!(instrument = %config.instrument, ?config.mode, "Configuration loaded");

    let app = obmm_bot::App::new(config)?;
    app.run().await?;

    Ok(())
}
