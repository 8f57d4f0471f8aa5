//! Asset catalog - metadata records keyed by id.
//!
//! The catalog is an in-process index guarded by a `parking_lot` RwLock.
//! Every mutation publishes a full snapshot to a background worker that
//! persists it as JSON (see `persistence`), so the server can reload its
//! state on startup.

pub mod persistence;

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use tokio::sync::watch;
use uuid::Uuid;

use crate::asset::models::{Asset, MediaKind};

/// Merge-update applied by `AssetCatalog::patch`. `None` fields are left
/// untouched; `section`, `slug` and `poster_asset_id` use a double Option so
/// callers can clear them explicitly.
#[derive(Debug, Default)]
pub struct AssetPatch {
    pub content_type: Option<String>,
    pub uploaded_at: Option<DateTime<Utc>>,
    pub order: Option<i64>,
    pub category: Option<String>,
    pub section: Option<Option<String>>,
    pub slug: Option<Option<String>>,
    pub poster_asset_id: Option<Option<Uuid>>,
}

pub struct AssetCatalog {
    records: RwLock<HashMap<Uuid, Asset>>,
    snapshot_tx: Option<watch::Sender<Vec<Asset>>>,
}

impl AssetCatalog {
    /// Catalog without snapshot persistence, used by tests.
    pub fn new() -> Self {
        AssetCatalog {
            records: RwLock::new(HashMap::new()),
            snapshot_tx: None,
        }
    }

    pub fn with_snapshots(records: HashMap<Uuid, Asset>, tx: watch::Sender<Vec<Asset>>) -> Self {
        AssetCatalog {
            records: RwLock::new(records),
            snapshot_tx: Some(tx),
        }
    }

    /// Insert or full overwrite of the record for `asset.id`.
    pub fn put(&self, asset: Asset) {
        self.records.write().insert(asset.id, asset);
        self.publish();
    }

    /// Merge-update. Returns the updated record, or `None` if absent.
    pub fn patch(&self, id: Uuid, patch: AssetPatch) -> Option<Asset> {
        let updated = {
            let mut records = self.records.write();
            let record = records.get_mut(&id)?;
            if let Some(content_type) = patch.content_type {
                record.content_type = content_type;
            }
            if let Some(uploaded_at) = patch.uploaded_at {
                record.uploaded_at = uploaded_at;
            }
            if let Some(order) = patch.order {
                record.order = order;
            }
            if let Some(category) = patch.category {
                record.category = category;
            }
            if let Some(section) = patch.section {
                record.section = section;
            }
            if let Some(slug) = patch.slug {
                record.slug = slug;
            }
            if let Some(poster_asset_id) = patch.poster_asset_id {
                record.poster_asset_id = poster_asset_id;
            }
            record.clone()
        };
        self.publish();
        Some(updated)
    }

    pub fn remove(&self, id: Uuid) -> Option<Asset> {
        let removed = self.records.write().remove(&id);
        if removed.is_some() {
            self.publish();
        }
        removed
    }

    pub fn find_by_id(&self, id: Uuid) -> Option<Asset> {
        self.records.read().get(&id).cloned()
    }

    /// Slug lookup. Slug uniqueness is advisory only: when several records
    /// share a slug the most recently uploaded one wins.
    pub fn find_by_slug(&self, slug: &str) -> Option<Asset> {
        self.records
            .read()
            .values()
            .filter(|a| a.slug.as_deref() == Some(slug))
            .max_by_key(|a| a.uploaded_at)
            .cloned()
    }

    /// Assets in `section`, optionally restricted to one media kind, sorted
    /// by `(order asc, uploaded_at asc)`.
    pub fn list_by_section(&self, section: &str, kind: Option<MediaKind>) -> Vec<Asset> {
        let mut assets: Vec<Asset> = self
            .records
            .read()
            .values()
            .filter(|a| a.section.as_deref() == Some(section))
            .filter(|a| kind.map_or(true, |k| a.media_kind == k))
            .cloned()
            .collect();
        assets.sort_by(|a, b| {
            a.order
                .cmp(&b.order)
                .then_with(|| a.uploaded_at.cmp(&b.uploaded_at))
        });
        assets
    }

    pub fn snapshot(&self) -> Vec<Asset> {
        self.records.read().values().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.records.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.read().is_empty()
    }

    // Latest-value semantics: a mutation burst coalesces into one pending
    // snapshot and the newest state is never lost, however slow the worker.
    fn publish(&self) {
        if let Some(tx) = &self.snapshot_tx {
            tx.send_replace(self.snapshot());
        }
    }
}

impl Default for AssetCatalog {
    fn default() -> Self {
        Self::new()
    }
}
