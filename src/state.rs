//! Application state wiring: store, read cache, HTTP client and the catalog
//! snapshot worker.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use moka::future::Cache;
use tokio::sync::watch;

use crate::asset::models::{Asset, MediaKind};
use crate::asset::store::AssetStore;
use crate::blob::FsBlobBackend;
use crate::catalog::{persistence, AssetCatalog};
use crate::config::AppConfig;

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<AssetStore>,
    /// Read cache over section listings. The public site used to re-fetch
    /// lists on a 30 s interval; this is that pattern as an explicit TTL
    /// cache, invalidated on every mutation.
    pub section_cache: Cache<String, Vec<Asset>>,
    pub http_client: reqwest::Client,
    /// Directory uploads are spooled into before promotion into the blob
    /// store. Same filesystem as the blob dir so the rename is atomic.
    pub spool_dir: PathBuf,
    pub config: AppConfig,
}

impl AppState {
    pub async fn new() -> Result<Self, Box<dyn std::error::Error>> {
        let config = AppConfig::from_env()?;
        Self::new_with_config(config).await
    }

    pub async fn new_with_config(config: AppConfig) -> Result<Self, Box<dyn std::error::Error>> {
        let spool_dir = config.data_dir.join("tmp");
        std::fs::create_dir_all(&spool_dir)?;
        let backend = Arc::new(FsBlobBackend::new(config.data_dir.join("blobs"))?);

        let snapshot_path = config.data_dir.join("catalog.json");
        let records = persistence::load_snapshot(&snapshot_path)?;
        log::info!(
            "Catalog loaded with {} assets from {}",
            records.len(),
            snapshot_path.display()
        );

        let (snapshot_tx, receiver) = watch::channel(Vec::new());
        tokio::spawn(async move {
            persistence::start_snapshot_worker(receiver, snapshot_path).await;
        });

        let catalog = AssetCatalog::with_snapshots(records, snapshot_tx);
        let store = Arc::new(AssetStore::new(catalog, backend));
        Ok(Self::new_with_store(store, config, spool_dir)?)
    }

    /// Wires state around an existing store; tests use this with a mock blob
    /// backend and a snapshot-less catalog.
    pub fn new_with_store(
        store: Arc<AssetStore>,
        config: AppConfig,
        spool_dir: PathBuf,
    ) -> Result<Self, Box<dyn std::error::Error>> {
        let section_cache = Cache::builder()
            .time_to_live(Duration::from_secs(config.section_cache_ttl_secs))
            .max_capacity(100)
            .build();

        let http_client = reqwest::Client::builder()
            .pool_idle_timeout(Duration::from_secs(900))
            .user_agent("lonier-media-server/1.0")
            .build()?;

        Ok(AppState {
            store,
            section_cache,
            http_client,
            spool_dir,
            config,
        })
    }

    /// Section listing through the TTL cache.
    pub async fn cached_section(&self, section: &str, kind: Option<MediaKind>) -> Vec<Asset> {
        let key = match kind {
            Some(kind) => format!("{}|{}", section, kind),
            None => format!("{}|all", section),
        };
        if let Some(assets) = self.section_cache.get(&key).await {
            log::debug!("Section cache hit for '{}'", key);
            return assets;
        }
        let assets = self.store.list_section(section, kind);
        self.section_cache.insert(key, assets.clone()).await;
        assets
    }

    /// Drops every cached section listing; called after each mutation so
    /// admin operations read their own writes.
    pub fn invalidate_sections(&self) {
        self.section_cache.invalidate_all();
    }
}
