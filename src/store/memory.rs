use super::{ChunkedStore, StoredObject};
use crate::error::TransferError;
use chrono::Utc;
use mongodb::bson::Bson;
use mongodb::bson::oid::ObjectId;
use tokio::sync::RwLock;
use tracing::debug;

/// GridFS default chunk size (255 KiB).
pub const DEFAULT_CHUNK_SIZE: u32 = 255 * 1024;

struct MemoryObject {
    meta: StoredObject,
    chunks: Vec<Vec<u8>>,
}

/// Chunked store held in process memory.
///
/// Objects are kept in insertion order. Ids are fresh `ObjectId`s, which grow
/// monotonically within a process, so insertion order equals the
/// `(uploadDate, _id)` order GridFS lookups use.
pub struct MemoryStore {
    chunk_size: u32,
    objects: RwLock<Vec<MemoryObject>>,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new(DEFAULT_CHUNK_SIZE)
    }
}

impl MemoryStore {
    pub fn new(chunk_size: u32) -> Self {
        Self {
            chunk_size: chunk_size.max(1),
            objects: RwLock::new(Vec::new()),
        }
    }

    /// Number of stored objects.
    pub async fn len(&self) -> usize {
        self.objects.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    /// Number of chunks backing object `id`, if present.
    pub async fn chunk_count(&self, id: &Bson) -> Option<usize> {
        self.objects
            .read()
            .await
            .iter()
            .find(|o| &o.meta.id == id)
            .map(|o| o.chunks.len())
    }
}

impl ChunkedStore for MemoryStore {
    async fn put(&self, filename: &str, bytes: &[u8]) -> Result<Bson, TransferError> {
        let id = Bson::ObjectId(ObjectId::new());
        let chunks: Vec<Vec<u8>> = bytes
            .chunks(self.chunk_size as usize)
            .map(<[u8]>::to_vec)
            .collect();
        let meta = StoredObject {
            id: id.clone(),
            filename: Some(filename.to_string()),
            length: bytes.len() as u64,
            chunk_size_bytes: self.chunk_size,
            upload_date: Utc::now(),
        };
        debug!(filename, id = %id, chunks = chunks.len(), "memory object written");
        self.objects.write().await.push(MemoryObject { meta, chunks });
        Ok(id)
    }

    async fn find_first(&self, filename: &str) -> Result<Option<StoredObject>, TransferError> {
        Ok(self
            .objects
            .read()
            .await
            .iter()
            .find(|o| o.meta.filename.as_deref() == Some(filename))
            .map(|o| o.meta.clone()))
    }

    async fn find_all(&self, filename: &str) -> Result<Vec<StoredObject>, TransferError> {
        Ok(self
            .objects
            .read()
            .await
            .iter()
            .filter(|o| o.meta.filename.as_deref() == Some(filename))
            .map(|o| o.meta.clone())
            .collect())
    }

    async fn read(&self, id: &Bson) -> Result<Vec<u8>, TransferError> {
        let objects = self.objects.read().await;
        let object = objects
            .iter()
            .find(|o| &o.meta.id == id)
            .ok_or_else(|| TransferError::RemoteObjectNotFound(id.to_string()))?;
        Ok(object.chunks.concat())
    }

    async fn delete(&self, id: &Bson) -> Result<(), TransferError> {
        let mut objects = self.objects.write().await;
        let pos = objects
            .iter()
            .position(|o| &o.meta.id == id)
            .ok_or_else(|| TransferError::RemoteObjectNotFound(id.to_string()))?;
        objects.remove(pos);
        Ok(())
    }
}
