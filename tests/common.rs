use std::collections::HashMap;
use std::sync::Arc;

use actix_web::web::Bytes;
use async_trait::async_trait;
use uuid::Uuid;

use lonier_media_server::asset::store::{AssetStore, UploadOptions};
use lonier_media_server::blob::{BlobBackend, BlobContent, BlobPayload};
use lonier_media_server::catalog::AssetCatalog;
use lonier_media_server::error::StoreError;

/// In-memory blob backend for tests.
pub struct MockBlobBackend {
    blobs: std::sync::Mutex<HashMap<Uuid, Vec<u8>>>,
}

impl MockBlobBackend {
    pub fn new() -> Self {
        Self {
            blobs: std::sync::Mutex::new(HashMap::new()),
        }
    }

    pub fn has_blob(&self, id: Uuid) -> bool {
        self.blobs.lock().unwrap().contains_key(&id)
    }

    pub fn blob_bytes(&self, id: Uuid) -> Option<Vec<u8>> {
        self.blobs.lock().unwrap().get(&id).cloned()
    }

    fn payload_bytes(payload: BlobPayload) -> Result<Vec<u8>, StoreError> {
        match payload {
            BlobPayload::Buffered(data) => Ok(data),
            BlobPayload::Spooled(tmp) => Ok(std::fs::read(tmp.path())?),
        }
    }
}

#[async_trait]
impl BlobBackend for MockBlobBackend {
    async fn create(&self, payload: BlobPayload) -> Result<Uuid, StoreError> {
        let id = Uuid::new_v4();
        let data = Self::payload_bytes(payload)?;
        self.blobs.lock().unwrap().insert(id, data);
        Ok(id)
    }

    async fn replace(&self, id: Uuid, payload: BlobPayload) -> Result<(), StoreError> {
        let data = Self::payload_bytes(payload)?;
        let mut blobs = self.blobs.lock().unwrap();
        if !blobs.contains_key(&id) {
            return Err(StoreError::not_found(format!("blob {}", id)));
        }
        blobs.insert(id, data);
        Ok(())
    }

    async fn read(&self, id: Uuid) -> Result<BlobContent, StoreError> {
        let data = self
            .blobs
            .lock()
            .unwrap()
            .get(&id)
            .cloned()
            .ok_or_else(|| StoreError::not_found(format!("blob {}", id)))?;
        let len = data.len() as u64;
        let stream = futures::stream::iter(vec![Ok(Bytes::from(data))]);
        Ok(BlobContent {
            stream: Box::pin(stream),
            len,
        })
    }

    async fn delete(&self, id: Uuid) -> Result<(), StoreError> {
        self.blobs
            .lock()
            .unwrap()
            .remove(&id)
            .map(|_| ())
            .ok_or_else(|| StoreError::not_found(format!("blob {}", id)))
    }
}

pub fn test_store() -> (AssetStore, Arc<MockBlobBackend>) {
    let backend = Arc::new(MockBlobBackend::new());
    let store = AssetStore::new(AssetCatalog::new(), backend.clone());
    (store, backend)
}

pub fn image_opts(section: &str, slug: Option<&str>, order: i64) -> UploadOptions {
    UploadOptions {
        filename: "photo.jpg".to_string(),
        content_type: None,
        category: "hero".to_string(),
        section: Some(section.to_string()),
        slug: slug.map(|s| s.to_string()),
        order: Some(order),
        poster_asset_id: None,
        seeded: false,
    }
}

pub fn video_opts(section: &str, slug: Option<&str>, order: i64) -> UploadOptions {
    UploadOptions {
        filename: "clip.mp4".to_string(),
        content_type: None,
        category: "hero".to_string(),
        section: Some(section.to_string()),
        slug: slug.map(|s| s.to_string()),
        order: Some(order),
        poster_asset_id: None,
        seeded: false,
    }
}

pub async fn collect_content(mut content: BlobContent) -> Vec<u8> {
    use futures::StreamExt;
    let mut out = Vec::new();
    while let Some(chunk) = content.stream.next().await {
        out.extend_from_slice(&chunk.expect("stream chunk"));
    }
    out
}
