use anyhow::Result;
use clap::{Arg, Command};
use std::path::PathBuf;
use tracing::{info, warn};

use kotahi_server::api::{start_http_server, AppState};
use kotahi_server::Config;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter("kotahi_server=info,tower_http=info,warn")
        .init();

    let matches = Command::new("Kotahi Server")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Backend for the Kotahi Māori-language video learning platform")
        .arg(
            Arg::new("port")
                .short('p')
                .long("port")
                .value_name("PORT")
                .help("Port to listen on"),
        )
        .arg(
            Arg::new("data-dir")
                .short('d')
                .long("data-dir")
                .value_name("DIR")
                .help("Directory for the JSON collection files"),
        )
        .arg(
            Arg::new("vtt-dir")
                .long("vtt-dir")
                .value_name("DIR")
                .help("Root directory of the VTT subtitle store"),
        )
        .get_matches();

    // Load configuration
    let mut config = Config::load().unwrap_or_else(|e| {
        warn!("Failed to load config, using defaults: {}", e);
        Config::default()
    });

    // Command-line overrides
    if let Some(port) = matches.get_one::<String>("port") {
        config.server.port = port.parse()?;
    }
    if let Some(data_dir) = matches.get_one::<String>("data-dir") {
        config.storage.data_dir = PathBuf::from(data_dir);
    }
    if let Some(vtt_dir) = matches.get_one::<String>("vtt-dir") {
        config.storage.vtt_dir = PathBuf::from(vtt_dir);
    }

    config.validate()?;

    info!("🚀 Kotahi server starting...");
    for line in config.summary().lines() {
        info!("{}", line);
    }

    let state = AppState::init(config).await?;
    start_http_server(state).await?;

    Ok(())
}
