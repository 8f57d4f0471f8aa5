//! Idempotent seeding of a known asset inventory.
//!
//! Provisioning scripts are re-run often; seeding is slug-keyed
//! create-if-absent. An existing slug is reused as-is, with no content
//! re-upload even when the source payload changed since the first run
//! (first write wins, not last write wins).

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::asset::store::{AssetStore, UploadOptions};
use crate::blob::BlobPayload;
use crate::error::StoreError;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum SeedSource {
    File { path: PathBuf },
    Url { url: String },
}

/// One desired inventory entry. `poster_slug` references an image item that
/// must appear earlier in the inventory (or already exist) so the poster
/// asset id can be resolved at seed time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeedItem {
    pub slug: String,
    pub category: String,
    pub section: Option<String>,
    pub order: i64,
    pub filename: String,
    pub content_type: Option<String>,
    pub poster_slug: Option<String>,
    pub source: SeedSource,
}

#[derive(Debug, thiserror::Error)]
pub enum SeedError {
    #[error("store error: {0}")]
    Store(#[from] StoreError),
    #[error("failed to fetch source payload: {0}")]
    Http(#[from] reqwest::Error),
    #[error("failed to read source file: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Debug, Clone)]
pub struct SeedOutcome {
    pub slug: String,
    pub asset_id: Uuid,
    pub created: bool,
}

async fn fetch_source(
    client: &reqwest::Client,
    source: &SeedSource,
) -> Result<Vec<u8>, SeedError> {
    match source {
        SeedSource::File { path } => Ok(tokio::fs::read(path).await?),
        SeedSource::Url { url } => {
            let response = client.get(url).send().await?.error_for_status()?;
            Ok(response.bytes().await?.to_vec())
        }
    }
}

/// Ensures exactly one asset per inventory slug exists.
///
/// Aborts the batch on the first failure; items already created stay
/// created, and a rerun skips them.
pub async fn run_seed(
    store: &AssetStore,
    client: &reqwest::Client,
    items: &[SeedItem],
) -> Result<Vec<SeedOutcome>, SeedError> {
    let mut outcomes = Vec::with_capacity(items.len());

    for item in items {
        if let Ok(existing) = store.get_by_slug(&item.slug) {
            log::info!(
                "Seed: slug '{}' already present as asset {}, skipping upload",
                item.slug,
                existing.id
            );
            outcomes.push(SeedOutcome {
                slug: item.slug.clone(),
                asset_id: existing.id,
                created: false,
            });
            continue;
        }

        log::info!("Seed: creating asset for slug '{}'", item.slug);
        let payload = fetch_source(client, &item.source).await?;
        let poster_asset_id = item
            .poster_slug
            .as_deref()
            .and_then(|slug| store.get_by_slug(slug).ok())
            .map(|poster| poster.id);

        let asset = store
            .upload(
                BlobPayload::Buffered(payload),
                UploadOptions {
                    filename: item.filename.clone(),
                    content_type: item.content_type.clone(),
                    category: item.category.clone(),
                    section: item.section.clone(),
                    slug: Some(item.slug.clone()),
                    order: Some(item.order),
                    poster_asset_id,
                    seeded: true,
                },
            )
            .await?;
        outcomes.push(SeedOutcome {
            slug: item.slug.clone(),
            asset_id: asset.id,
            created: true,
        });
    }

    Ok(outcomes)
}

/// The standard Lonier marketing inventory, sourced from a local directory
/// of shipped payload files. Poster images precede the videos that
/// reference them.
pub fn default_inventory(assets_dir: &Path) -> Vec<SeedItem> {
    let file = |name: &str| SeedSource::File {
        path: assets_dir.join(name),
    };
    vec![
        SeedItem {
            slug: "hero-marina-dusk".to_string(),
            category: "hero".to_string(),
            section: Some("hero-home".to_string()),
            order: 100,
            filename: "hero-marina-dusk.jpg".to_string(),
            content_type: None,
            poster_slug: None,
            source: file("hero-marina-dusk.jpg"),
        },
        SeedItem {
            slug: "hero-open-sea".to_string(),
            category: "hero".to_string(),
            section: Some("hero-home".to_string()),
            order: 200,
            filename: "hero-open-sea.jpg".to_string(),
            content_type: None,
            poster_slug: None,
            source: file("hero-open-sea.jpg"),
        },
        SeedItem {
            slug: "hero-lonier-video".to_string(),
            category: "hero".to_string(),
            section: Some("hero-home".to_string()),
            order: 0,
            filename: "hero-lonier.mp4".to_string(),
            content_type: None,
            poster_slug: Some("hero-marina-dusk".to_string()),
            source: file("hero-lonier.mp4"),
        },
        SeedItem {
            slug: "services-crew".to_string(),
            category: "services".to_string(),
            section: Some("services-page".to_string()),
            order: 100,
            filename: "services-crew.jpg".to_string(),
            content_type: None,
            poster_slug: None,
            source: file("services-crew.jpg"),
        },
        SeedItem {
            slug: "services-maintenance".to_string(),
            category: "services".to_string(),
            section: Some("services-page".to_string()),
            order: 200,
            filename: "services-maintenance.jpg".to_string(),
            content_type: None,
            poster_slug: None,
            source: file("services-maintenance.jpg"),
        },
        SeedItem {
            slug: "services-charter".to_string(),
            category: "services".to_string(),
            section: Some("services-page".to_string()),
            order: 300,
            filename: "services-charter.jpg".to_string(),
            content_type: None,
            poster_slug: None,
            source: file("services-charter.jpg"),
        },
        SeedItem {
            slug: "about-shipyard".to_string(),
            category: "about".to_string(),
            section: Some("about-page".to_string()),
            order: 100,
            filename: "about-shipyard.jpg".to_string(),
            content_type: None,
            poster_slug: None,
            source: file("about-shipyard.jpg"),
        },
        SeedItem {
            slug: "blog-cover-default".to_string(),
            category: "blog".to_string(),
            section: Some("blog-index".to_string()),
            order: 100,
            filename: "blog-cover-default.jpg".to_string(),
            content_type: None,
            poster_slug: None,
            source: file("blog-cover-default.jpg"),
        },
    ]
}
