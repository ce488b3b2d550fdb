//! STAKEBOOK — Personal Sports-Betting Ledger Engine
//!
//! Entry point. Loads configuration, initialises structured logging,
//! prepares the data directory, and serves the JSON API with graceful
//! shutdown.

use anyhow::Result;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

use stakebook::api::{self, AppState};
use stakebook::config;
use stakebook::storage;

const BANNER: &str = r#"
 ____  _        _        _               _
/ ___|| |_ __ _| | _____| |__   ___  ___ | | __
\___ \| __/ _` | |/ / _ \ '_ \ / _ \/ _ \| |/ /
 ___) | || (_| |   <  __/ |_) | (_) | (_) |   <
|____/ \__\__,_|_|\_\___|_.__/ \___/ \___/|_|\_\

  Personal Sports-Betting Ledger
  v0.1.0
"#;

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (non-fatal if missing)
    let _ = dotenv::dotenv();

    let config_path =
        std::env::var("STAKEBOOK_CONFIG").unwrap_or_else(|_| "config.toml".to_string());
    let cfg = config::AppConfig::load(&config_path)?;

    init_logging();

    println!("{BANNER}");
    info!(
        port = cfg.server.port,
        data_dir = %cfg.storage.data_dir,
        starting_balance = %cfg.ledger.starting_balance,
        "STAKEBOOK starting up"
    );

    let data_dir = PathBuf::from(&cfg.storage.data_dir);
    storage::init(&data_dir)?;

    let state = Arc::new(AppState::new(data_dir, cfg.ledger.starting_balance));
    api::serve(state, cfg.server.port).await?;

    info!("STAKEBOOK shut down cleanly.");
    Ok(())
}

/// Initialise the `tracing` subscriber.
fn init_logging() {
    use tracing_subscriber::{fmt, EnvFilter};

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("stakebook=info"));

    let json_logging = std::env::var("STAKEBOOK_LOG_JSON").is_ok();

    if json_logging {
        fmt()
            .json()
            .with_env_filter(env_filter)
            .with_target(true)
            .with_thread_ids(true)
            .init();
    } else {
        fmt().with_env_filter(env_filter).with_target(true).init();
    }
}
