//! QUINALAB — Quina Draw-History Statistics and Guess Engine
//!
//! Entry point. Loads configuration, initialises structured logging,
//! restores the draw history from disk (or starts fresh), refreshes it
//! against the official source, and serves the HTTP API until shutdown.

use anyhow::Result;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{error, info, warn};

use quinalab::api::{self, EngineState};
use quinalab::config;
use quinalab::refresh;
use quinalab::source::caixa::CaixaClient;
use quinalab::storage;
use quinalab::store::DrawStore;

const BANNER: &str = r#"
  ___  _   _ ___ _   _    _    _        _    ____
 / _ \| | | |_ _| \ | |  / \  | |      / \  | __ )
| | | | | | || ||  \| | / _ \ | |     / _ \ |  _ \
| |_| | |_| || || |\  |/ ___ \| |___ / ___ \| |_) |
 \__\_\\___/|___|_| \_/_/   \_\_____/_/   \_\____/

  Quina Draw-History Statistics & Guess Engine
  v0.1.0
"#;

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (non-fatal if missing)
    let _ = dotenv::dotenv();

    // Load configuration from TOML
    let cfg = config::AppConfig::load("config.toml").unwrap_or_else(|e| {
        eprintln!("Config not loaded ({e}), using defaults");
        config::AppConfig::default()
    });

    // Initialise structured logging
    init_logging();

    // Print startup banner
    println!("{BANNER}");
    info!(
        port = cfg.server.port,
        source = cfg.source.base_url.as_deref().unwrap_or("caixa (official)"),
        "QUINALAB starting up"
    );

    // -- Restore or create the draw history -------------------------------

    let store_path = cfg.storage.path.clone();
    let store = match storage::load_store(store_path.as_deref())? {
        Some(s) => {
            info!(
                draws = s.len(),
                latest = s.latest().map(|d| d.contest_number).unwrap_or(0),
                "Resumed draw history from disk"
            );
            s
        }
        None => {
            info!("Fresh start, empty draw history");
            DrawStore::new()
        }
    };

    // -- Initial refresh ---------------------------------------------------

    let source = Arc::new(CaixaClient::new(
        cfg.source.base_url.clone(),
        cfg.source.timeout_secs,
    )?);

    let store_lock = RwLock::new(store);
    let report = refresh::refresh(source.as_ref(), &store_lock, false).await;
    let store = store_lock.into_inner();
    if report.total_errors > 0 {
        warn!(%report, "Initial refresh finished with errors");
    } else {
        info!(%report, "Initial refresh finished");
    }
    if report.total_inserted > 0 {
        if let Err(e) = storage::save_store(&store, store_path.as_deref()) {
            error!(error = %e, "Failed to persist draw history");
        }
    }

    // -- Serve the API -----------------------------------------------------

    let state = Arc::new(EngineState::new(store, source, store_path.clone()));
    api::spawn_server(Arc::clone(&state), cfg.server.port)?;

    info!("Serving. Press Ctrl+C to stop.");
    tokio::signal::ctrl_c().await?;
    info!("Shutdown signal received.");

    // Save final history
    let store = state.store.read().await;
    storage::save_store(&store, store_path.as_deref())?;
    info!(draws = store.len(), "QUINALAB shut down cleanly.");

    Ok(())
}

/// Initialise the `tracing` subscriber.
fn init_logging() {
    use tracing_subscriber::{fmt, EnvFilter};

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("quinalab=info"));

    let json_logging = std::env::var("QUINALAB_LOG_JSON").is_ok();

    if json_logging {
        fmt()
            .json()
            .with_env_filter(env_filter)
            .with_target(true)
            .with_thread_ids(true)
            .init();
    } else {
        fmt()
            .with_env_filter(env_filter)
            .with_target(true)
            .init();
    }
}
