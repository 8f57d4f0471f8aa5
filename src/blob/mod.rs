//! Blob backend - chunked binary storage addressed by issued ids.
//!
//! Payloads are spooled to a temp file next to the blob directory and
//! promoted with an atomic rename, so a replaced blob's previous bytes are
//! never readable under the same id and an abandoned upload leaves nothing
//! behind but a temp file that is removed on drop.

use std::io::Write;
use std::path::{Path, PathBuf};
use std::pin::Pin;

use actix_web::web::Bytes;
use async_trait::async_trait;
use futures::Stream;
use tempfile::NamedTempFile;
use tokio_util::io::ReaderStream;
use uuid::Uuid;

use crate::error::StoreError;

/// Chunk size for writes and streamed reads.
pub const CHUNK_SIZE: usize = 1024 * 1024;

pub type BlobStream = Pin<Box<dyn Stream<Item = Result<Bytes, std::io::Error>> + Send>>;

/// A payload handed to the backend: either already spooled to disk by the
/// upload path, or an in-memory buffer (seeding, tests).
pub enum BlobPayload {
    Spooled(NamedTempFile),
    Buffered(Vec<u8>),
}

impl BlobPayload {
    pub fn len(&self) -> std::io::Result<u64> {
        match self {
            BlobPayload::Spooled(tmp) => Ok(tmp.as_file().metadata()?.len()),
            BlobPayload::Buffered(data) => Ok(data.len() as u64),
        }
    }

    pub fn is_empty(&self) -> std::io::Result<bool> {
        Ok(self.len()? == 0)
    }
}

/// Streamed read handle for one blob.
pub struct BlobContent {
    pub stream: BlobStream,
    pub len: u64,
}

#[async_trait]
pub trait BlobBackend: Send + Sync {
    /// Stores a new payload and returns the issued id.
    async fn create(&self, payload: BlobPayload) -> Result<Uuid, StoreError>;

    /// Overwrites the content stored under `id`. The previous bytes must not
    /// remain readable under the same id afterwards.
    async fn replace(&self, id: Uuid, payload: BlobPayload) -> Result<(), StoreError>;

    async fn read(&self, id: Uuid) -> Result<BlobContent, StoreError>;

    async fn delete(&self, id: Uuid) -> Result<(), StoreError>;
}

/// Filesystem-backed blob storage, one file per blob under the root dir.
pub struct FsBlobBackend {
    root: PathBuf,
}

impl FsBlobBackend {
    pub fn new(root: impl Into<PathBuf>) -> std::io::Result<Self> {
        let root = root.into();
        std::fs::create_dir_all(&root)?;
        Ok(FsBlobBackend { root })
    }

    fn blob_path(&self, id: Uuid) -> PathBuf {
        self.root.join(format!("{}.bin", id))
    }

    fn spool_buffered(&self, data: &[u8]) -> std::io::Result<NamedTempFile> {
        let mut tmp = NamedTempFile::new_in(&self.root)?;
        for chunk in data.chunks(CHUNK_SIZE) {
            tmp.write_all(chunk)?;
        }
        tmp.flush()?;
        Ok(tmp)
    }

    fn promote(&self, payload: BlobPayload, dest: &Path) -> Result<(), StoreError> {
        let tmp = match payload {
            BlobPayload::Spooled(tmp) => tmp,
            BlobPayload::Buffered(data) => self.spool_buffered(&data)?,
        };
        tmp.persist(dest).map_err(|e| StoreError::Io(e.error))?;
        Ok(())
    }
}

#[async_trait]
impl BlobBackend for FsBlobBackend {
    async fn create(&self, payload: BlobPayload) -> Result<Uuid, StoreError> {
        let id = Uuid::new_v4();
        self.promote(payload, &self.blob_path(id))?;
        log::debug!("Blob {} created", id);
        Ok(id)
    }

    async fn replace(&self, id: Uuid, payload: BlobPayload) -> Result<(), StoreError> {
        let dest = self.blob_path(id);
        match tokio::fs::metadata(&dest).await {
            Ok(_) => {}
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(StoreError::not_found(format!("blob {}", id)));
            }
            Err(e) => return Err(StoreError::Io(e)),
        }
        self.promote(payload, &dest)?;
        log::debug!("Blob {} content replaced", id);
        Ok(())
    }

    async fn read(&self, id: Uuid) -> Result<BlobContent, StoreError> {
        let path = self.blob_path(id);
        let file = match tokio::fs::File::open(&path).await {
            Ok(file) => file,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(StoreError::not_found(format!("blob {}", id)));
            }
            Err(e) => return Err(StoreError::Io(e)),
        };
        let len = file.metadata().await?.len();
        let stream = ReaderStream::with_capacity(file, CHUNK_SIZE);
        Ok(BlobContent {
            stream: Box::pin(stream),
            len,
        })
    }

    async fn delete(&self, id: Uuid) -> Result<(), StoreError> {
        match tokio::fs::remove_file(self.blob_path(id)).await {
            Ok(()) => {
                log::debug!("Blob {} deleted", id);
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(StoreError::not_found(format!("blob {}", id)))
            }
            Err(e) => Err(StoreError::Io(e)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::StreamExt;

    async fn collect(mut content: BlobContent) -> Vec<u8> {
        let mut out = Vec::new();
        while let Some(chunk) = content.stream.next().await {
            out.extend_from_slice(&chunk.expect("read chunk"));
        }
        out
    }

    #[tokio::test]
    async fn create_then_read_roundtrips() {
        let dir = tempfile::tempdir().expect("tempdir");
        let backend = FsBlobBackend::new(dir.path().join("blobs")).expect("backend");

        let id = backend
            .create(BlobPayload::Buffered(b"yacht hero".to_vec()))
            .await
            .expect("create");

        let content = backend.read(id).await.expect("read");
        assert_eq!(content.len, 10);
        assert_eq!(collect(content).await, b"yacht hero");
    }

    #[tokio::test]
    async fn replace_overwrites_previous_bytes() {
        let dir = tempfile::tempdir().expect("tempdir");
        let backend = FsBlobBackend::new(dir.path().join("blobs")).expect("backend");

        let id = backend
            .create(BlobPayload::Buffered(b"old content".to_vec()))
            .await
            .expect("create");
        backend
            .replace(id, BlobPayload::Buffered(b"new".to_vec()))
            .await
            .expect("replace");

        let content = backend.read(id).await.expect("read");
        assert_eq!(collect(content).await, b"new");
    }

    #[tokio::test]
    async fn replace_missing_blob_is_not_found() {
        let dir = tempfile::tempdir().expect("tempdir");
        let backend = FsBlobBackend::new(dir.path().join("blobs")).expect("backend");

        let err = backend
            .replace(Uuid::new_v4(), BlobPayload::Buffered(b"x".to_vec()))
            .await
            .expect_err("must fail");
        assert!(matches!(err, StoreError::NotFound(_)));
    }

    #[tokio::test]
    async fn delete_then_read_is_not_found() {
        let dir = tempfile::tempdir().expect("tempdir");
        let backend = FsBlobBackend::new(dir.path().join("blobs")).expect("backend");

        let id = backend
            .create(BlobPayload::Buffered(b"temporary".to_vec()))
            .await
            .expect("create");
        backend.delete(id).await.expect("delete");

        assert!(matches!(
            backend.read(id).await,
            Err(StoreError::NotFound(_))
        ));
        assert!(matches!(
            backend.delete(id).await,
            Err(StoreError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn payload_larger_than_one_chunk_roundtrips() {
        let dir = tempfile::tempdir().expect("tempdir");
        let backend = FsBlobBackend::new(dir.path().join("blobs")).expect("backend");

        let payload: Vec<u8> = (0..(CHUNK_SIZE * 2 + 17)).map(|i| (i % 251) as u8).collect();
        let id = backend
            .create(BlobPayload::Buffered(payload.clone()))
            .await
            .expect("create");

        let content = backend.read(id).await.expect("read");
        assert_eq!(content.len as usize, payload.len());
        assert_eq!(collect(content).await, payload);
    }
}
