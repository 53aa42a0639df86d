//! Persistence layer.
//!
//! Saves and loads the draw history to/from a JSON file. The store is the
//! only mutable state in the system, so one snapshot file is all the
//! persistence the engine needs; statistics are always recomputed.

use anyhow::{Context, Result};
use std::path::Path;
use tracing::{debug, info};

use crate::store::DrawStore;
use crate::types::Draw;

/// Default snapshot file path.
const DEFAULT_STORE_FILE: &str = "quinalab_draws.json";

/// Save the draw history to a JSON file.
pub fn save_store(store: &DrawStore, path: Option<&str>) -> Result<()> {
    let path = path.unwrap_or(DEFAULT_STORE_FILE);
    let draws: Vec<&Draw> = store.all().collect();
    let json = serde_json::to_string_pretty(&draws)
        .context("Failed to serialise draw history")?;

    std::fs::write(path, &json)
        .context(format!("Failed to write draws to {path}"))?;

    debug!(path, draws = store.len(), "Draw history saved");
    Ok(())
}

/// Load the draw history from a JSON file.
/// Returns None if the file doesn't exist (fresh start).
pub fn load_store(path: Option<&str>) -> Result<Option<DrawStore>> {
    let path = path.unwrap_or(DEFAULT_STORE_FILE);

    if !Path::new(path).exists() {
        info!(path, "No saved draw history found, starting fresh");
        return Ok(None);
    }

    let json = std::fs::read_to_string(path)
        .context(format!("Failed to read draws from {path}"))?;

    let draws: Vec<Draw> = serde_json::from_str(&json)
        .context(format!("Failed to parse draws from {path}"))?;

    let store = DrawStore::from_draws(draws)
        .map_err(|e| anyhow::anyhow!("Invalid draw history in {path}: {e}"))?;

    info!(path, draws = store.len(), "Draw history loaded from disk");

    Ok(Some(store))
}

/// Delete the snapshot file (for testing or reset).
pub fn delete_store(path: Option<&str>) -> Result<()> {
    let path = path.unwrap_or(DEFAULT_STORE_FILE);
    if Path::new(path).exists() {
        std::fs::remove_file(path)
            .context(format!("Failed to delete snapshot file {path}"))?;
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
