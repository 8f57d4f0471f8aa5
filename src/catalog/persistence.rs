//! Background snapshot worker for the asset catalog.
//!
//! Mutations publish full catalog snapshots through a `watch` channel, which
//! holds only the most recent value; the worker debounces bursts and writes
//! the latest snapshot to disk atomically (temp file plus rename), so a
//! crash never leaves a half-written catalog file and a burst never loses
//! its final mutations.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use tokio::sync::watch;
use uuid::Uuid;

use crate::asset::models::Asset;

const DEBOUNCE_MS: u64 = 500;

/// Loads the catalog snapshot from disk. A missing file is an empty catalog.
pub fn load_snapshot(path: &Path) -> std::io::Result<HashMap<Uuid, Asset>> {
    let data = match std::fs::read(path) {
        Ok(data) => data,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(HashMap::new()),
        Err(e) => return Err(e),
    };
    let assets: Vec<Asset> = serde_json::from_slice(&data)
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
    Ok(assets.into_iter().map(|a| (a.id, a)).collect())
}

/// Writes a catalog snapshot atomically. The worker uses this internally;
/// short-lived provisioning runs call it directly before exiting so they
/// never race the debounce window.
pub async fn write_snapshot(path: &Path, assets: &[Asset]) -> std::io::Result<()> {
    let data = serde_json::to_vec_pretty(assets)
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
    let tmp = path.with_extension("json.tmp");
    tokio::fs::write(&tmp, &data).await?;
    tokio::fs::rename(&tmp, path).await?;
    Ok(())
}

/// Starts the background snapshot worker.
///
/// Wakes on each change notification, waits out the debounce window so a
/// burst of mutations collapses into one write, then persists whatever the
/// channel holds at that point. The channel keeps only the latest snapshot,
/// so the write always reflects the newest catalog state.
pub async fn start_snapshot_worker(mut receiver: watch::Receiver<Vec<Asset>>, path: PathBuf) {
    log::info!("Catalog snapshot worker started ({})", path.display());

    while receiver.changed().await.is_ok() {
        tokio::time::sleep(tokio::time::Duration::from_millis(DEBOUNCE_MS)).await;

        let latest = receiver.borrow_and_update().clone();
        match write_snapshot(&path, &latest).await {
            Ok(()) => {
                log::info!("Catalog snapshot persisted ({} assets)", latest.len());
            }
            Err(e) => {
                log::error!("Failed to persist catalog snapshot: {}", e);
            }
        }
    }

    log::info!("Catalog snapshot worker stopped");
}
