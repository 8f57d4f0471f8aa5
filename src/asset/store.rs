//! Asset store - the operation surface composing catalog and blob backend.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::Utc;
use parking_lot::Mutex;
use tokio::sync::Mutex as AsyncMutex;
use uuid::Uuid;

use crate::asset::models::{Asset, MediaKind};
use crate::blob::{BlobBackend, BlobContent, BlobPayload};
use crate::catalog::{AssetCatalog, AssetPatch};
use crate::error::StoreError;

/// Spacing between order values assigned by `reorder`, so an admin can later
/// insert an asset between two neighbours without renumbering the section.
pub const REORDER_STRIDE: i64 = 100;

#[derive(Debug, Clone, Default)]
pub struct UploadOptions {
    pub filename: String,
    /// Explicit MIME type. When absent it is guessed from the filename.
    pub content_type: Option<String>,
    pub category: String,
    pub section: Option<String>,
    pub slug: Option<String>,
    pub order: Option<i64>,
    pub poster_asset_id: Option<Uuid>,
    pub seeded: bool,
}

pub struct AssetStore {
    catalog: AssetCatalog,
    backend: Arc<dyn BlobBackend>,
    // Serializes mutations per asset id. The catalog and backend are safe on
    // their own; this keeps concurrent Replace/Delete on one id from
    // interleaving.
    mutation_locks: Mutex<HashMap<Uuid, Arc<AsyncMutex<()>>>>,
}

impl AssetStore {
    pub fn new(catalog: AssetCatalog, backend: Arc<dyn BlobBackend>) -> Self {
        AssetStore {
            catalog,
            backend,
            mutation_locks: Mutex::new(HashMap::new()),
        }
    }

    fn lock_for(&self, id: Uuid) -> Arc<AsyncMutex<()>> {
        self.mutation_locks
            .lock()
            .entry(id)
            .or_default()
            .clone()
    }

    fn resolve_content_type(
        filename: &str,
        explicit: Option<String>,
    ) -> Result<String, StoreError> {
        if let Some(content_type) = explicit {
            if !content_type.is_empty() {
                return Ok(content_type);
            }
        }
        mime_guess::from_path(filename)
            .first()
            .map(|m| m.essence_str().to_string())
            .ok_or_else(|| {
                StoreError::validation(format!(
                    "content type could not be determined for '{}'",
                    filename
                ))
            })
    }

    /// Creates a new asset. Never deduplicates by slug; a duplicate slug is
    /// logged as a conflict risk and the upload proceeds.
    pub async fn upload(
        &self,
        payload: BlobPayload,
        opts: UploadOptions,
    ) -> Result<Asset, StoreError> {
        if payload.is_empty()? {
            return Err(StoreError::validation("payload is empty"));
        }
        if opts.category.is_empty() {
            return Err(StoreError::validation("category is required"));
        }
        let content_type = Self::resolve_content_type(&opts.filename, opts.content_type)?;
        let media_kind = MediaKind::from_content_type(&content_type).ok_or_else(|| {
            StoreError::validation(format!("unsupported content type '{}'", content_type))
        })?;

        if let Some(slug) = &opts.slug {
            if let Some(existing) = self.catalog.find_by_slug(slug) {
                log::warn!(
                    "Duplicate slug '{}' on upload: asset {} already carries it, slug reads will resolve most-recent",
                    slug,
                    existing.id
                );
            }
        }

        let id = self.backend.create(payload).await?;
        let asset = Asset {
            id,
            filename: opts.filename,
            content_type,
            media_kind,
            uploaded_at: Utc::now(),
            category: opts.category,
            section: opts.section,
            slug: opts.slug,
            order: opts.order.unwrap_or(0),
            poster_asset_id: opts.poster_asset_id,
            seeded: opts.seeded,
        };
        self.catalog.put(asset.clone());
        log::info!(
            "Asset {} uploaded ({}, section {:?})",
            asset.id,
            asset.media_kind,
            asset.section
        );
        Ok(asset)
    }

    /// Replaces the content stored under `id` in place.
    ///
    /// The id itself is untouched so every external content reference stays
    /// valid; only the byte payload, content type and `uploaded_at` change.
    pub async fn replace(
        &self,
        id: Uuid,
        payload: BlobPayload,
        content_type: Option<String>,
    ) -> Result<Asset, StoreError> {
        let lock = self.lock_for(id);
        let _guard = lock.lock().await;

        let existing = self
            .catalog
            .find_by_id(id)
            .ok_or_else(|| StoreError::not_found(format!("asset {}", id)))?;
        if payload.is_empty()? {
            return Err(StoreError::validation("payload is empty"));
        }
        let content_type = content_type.unwrap_or_else(|| existing.content_type.clone());
        match MediaKind::from_content_type(&content_type) {
            Some(kind) if kind == existing.media_kind => {}
            _ => {
                return Err(StoreError::validation(format!(
                    "replacement content type '{}' does not match {} asset {}",
                    content_type, existing.media_kind, id
                )));
            }
        }

        self.backend.replace(id, payload).await?;
        let updated = self
            .catalog
            .patch(
                id,
                AssetPatch {
                    content_type: Some(content_type),
                    uploaded_at: Some(Utc::now()),
                    ..Default::default()
                },
            )
            .ok_or_else(|| StoreError::not_found(format!("asset {}", id)))?;
        log::info!("Asset {} content replaced", id);
        Ok(updated)
    }

    /// Metadata-only order update.
    pub async fn patch_order(&self, id: Uuid, order: i64) -> Result<Asset, StoreError> {
        self.catalog
            .patch(
                id,
                AssetPatch {
                    order: Some(order),
                    ..Default::default()
                },
            )
            .ok_or_else(|| StoreError::not_found(format!("asset {}", id)))
    }

    /// Removes the catalog record and the blob content.
    ///
    /// Performs no reference check against content entities: deleting an
    /// asset still referenced by a service or blog post leaves a dangling id
    /// that 404s at render time.
    pub async fn delete(&self, id: Uuid) -> Result<(), StoreError> {
        let lock = self.lock_for(id);
        {
            let _guard = lock.lock().await;

            self.catalog
                .find_by_id(id)
                .ok_or_else(|| StoreError::not_found(format!("asset {}", id)))?;
            match self.backend.delete(id).await {
                Ok(()) => {}
                Err(StoreError::NotFound(_)) => {
                    log::warn!("Blob for asset {} already gone, removing record anyway", id);
                }
                Err(e) => return Err(e),
            }
            self.catalog.remove(id);
        }
        self.mutation_locks.lock().remove(&id);
        log::info!("Asset {} deleted", id);
        Ok(())
    }

    pub fn list_section(&self, section: &str, kind: Option<MediaKind>) -> Vec<Asset> {
        self.catalog.list_by_section(section, kind)
    }

    pub fn get_by_id(&self, id: Uuid) -> Result<Asset, StoreError> {
        self.catalog
            .find_by_id(id)
            .ok_or_else(|| StoreError::not_found(format!("asset {}", id)))
    }

    pub fn get_by_slug(&self, slug: &str) -> Result<Asset, StoreError> {
        self.catalog
            .find_by_slug(slug)
            .ok_or_else(|| StoreError::not_found(format!("slug '{}'", slug)))
    }

    pub async fn read_content(&self, id: Uuid) -> Result<(Asset, BlobContent), StoreError> {
        let asset = self.get_by_id(id)?;
        let content = self.backend.read(id).await?;
        Ok((asset, content))
    }

    /// Full catalog contents, for snapshot persistence.
    pub fn snapshot(&self) -> Vec<Asset> {
        self.catalog.snapshot()
    }

    /// Assigns each id an order value spaced by `REORDER_STRIDE` following
    /// the caller-supplied sequence.
    ///
    /// Issued as independent per-asset patches, not a batch: a failure
    /// mid-way leaves earlier patches applied. Order is a display hint, so a
    /// mixed state is tolerated and the next reorder heals it.
    pub async fn reorder(&self, ids: &[Uuid]) -> Result<Vec<Asset>, StoreError> {
        let mut updated = Vec::with_capacity(ids.len());
        for (index, id) in ids.iter().enumerate() {
            let order = (index as i64 + 1) * REORDER_STRIDE;
            updated.push(self.patch_order(*id, order).await?);
        }
        Ok(updated)
    }
}
