//! Provisioning entry point: seeds the standard asset inventory (or one
//! supplied as a JSON file) into the store, idempotently.

use std::path::Path;

use anyhow::Context;

use lonier_media_server::catalog::persistence;
use lonier_media_server::seed::{default_inventory, run_seed, SeedItem};
use lonier_media_server::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    if std::env::var("RUST_LOG").is_err() {
        std::env::set_var("RUST_LOG", "info");
    }
    env_logger::init();

    let state = AppState::new()
        .await
        .map_err(|e| anyhow::anyhow!("failed to initialize app state: {}", e))?;

    let items: Vec<SeedItem> = match std::env::args().nth(1) {
        Some(path) => {
            let data = std::fs::read(&path)
                .with_context(|| format!("failed to read inventory file '{}'", path))?;
            serde_json::from_slice(&data)
                .with_context(|| format!("invalid inventory JSON in '{}'", path))?
        }
        None => default_inventory(Path::new("./seed-assets")),
    };

    log::info!("Seeding {} inventory items", items.len());
    let outcomes = run_seed(&state.store, &state.http_client, &items).await?;

    let created = outcomes.iter().filter(|o| o.created).count();
    let skipped = outcomes.len() - created;
    for outcome in &outcomes {
        println!(
            "{}  {}  {}",
            if outcome.created { "created" } else { "skipped" },
            outcome.slug,
            outcome.asset_id
        );
    }
    log::info!("Seed finished: {} created, {} skipped", created, skipped);

    // Flush the catalog to disk directly instead of waiting out the
    // background worker's debounce window.
    let snapshot_path = state.config.data_dir.join("catalog.json");
    persistence::write_snapshot(&snapshot_path, &state.store.snapshot())
        .await
        .context("failed to write final catalog snapshot")?;

    Ok(())
}
