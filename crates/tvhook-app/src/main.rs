//! tvhook - TradingView webhook to market order service - Entry Point

use anyhow::Result;
use clap::Parser;
use tracing::info;

/// TradingView webhook to market order service
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Configuration file path (can also be set via TVHOOK_CONFIG env var)
    #[arg(short, long)]
    config: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Determine config path: CLI arg > TVHOOK_CONFIG env var > default
    let config_path = args
        .config
        .or_else(|| std::env::var("TVHOOK_CONFIG").ok())
        .unwrap_or_else(|| "config/default.toml".to_string());

    // Logging settings live in the config, so load it first.
    let config = tvhook_app::AppConfig::load(&config_path)?;
    tvhook_telemetry::init_logging(&config.logging)?;

    info!(
        config_path = %config_path,
        from_file = std::path::Path::new(&config_path).exists(),
        "Starting tvhook v{}",
        env!("CARGO_PKG_VERSION")
    );

    let app = tvhook_app::Application::new(config)?;
    app.run().await?;

    Ok(())
}
