//! Chunked storage namespace: the handle Uploader and Reader operate on.
//!
//! Layout:
//! - `models.rs`: the stored-object record shared by every backend
//! - `gridfs.rs`: MongoDB GridFS bucket (the production namespace)
//! - `memory.rs`: in-process chunked store with the same ordering rules

pub mod gridfs;
pub mod memory;
pub mod models;

pub use gridfs::GridFsNamespace;
pub use memory::MemoryStore;
pub use models::StoredObject;

use crate::error::TransferError;
use mongodb::bson::Bson;
use std::future::Future;

/// Sort applied to every filename lookup: oldest upload first, `_id` breaks ties.
pub const FILENAME_ORDER: [(&str, i32); 2] = [("uploadDate", 1), ("_id", 1)];

/// Access to a chunked binary object store addressed by (non-unique) filenames.
///
/// Lookups by filename return matches in [`FILENAME_ORDER`], so when several
/// objects share a name the earliest upload is the "first" one.
pub trait ChunkedStore: Send + Sync {
    /// Store `bytes` as a new object. Never replaces an existing object.
    fn put(
        &self,
        filename: &str,
        bytes: &[u8],
    ) -> impl Future<Output = Result<Bson, TransferError>> + Send;

    fn find_first(
        &self,
        filename: &str,
    ) -> impl Future<Output = Result<Option<StoredObject>, TransferError>> + Send;

    fn find_all(
        &self,
        filename: &str,
    ) -> impl Future<Output = Result<Vec<StoredObject>, TransferError>> + Send;

    /// Reassemble the full payload of object `id`.
    fn read(&self, id: &Bson) -> impl Future<Output = Result<Vec<u8>, TransferError>> + Send;

    /// Remove object `id` and all of its chunks.
    fn delete(&self, id: &Bson) -> impl Future<Output = Result<(), TransferError>> + Send;
}
