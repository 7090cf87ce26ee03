//! Uploader and Reader: whole-file transfers against a [`ChunkedStore`].

use crate::config::DuplicatePolicy;
use crate::error::TransferError;
use crate::store::{ChunkedStore, StoredObject};
use mongodb::bson::Bson;
use std::io::ErrorKind;
use std::path::Path;
use tracing::{info, warn};

/// Read the file at `path` fully and store it as a new object named `filename`.
///
/// The local read happens before anything touches the store, so a missing
/// file never causes a remote write. Returns the new object's id.
///
/// [`DuplicatePolicy::Reject`] is best-effort: the name check and the write
/// are separate calls, so two concurrent uploaders can both pass the check.
pub async fn upload_file<S: ChunkedStore>(
    store: &S,
    path: impl AsRef<Path>,
    filename: &str,
    policy: DuplicatePolicy,
) -> Result<Bson, TransferError> {
    let path = path.as_ref();
    let data = match tokio::fs::read(path).await {
        Ok(data) => data,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            warn!(path = %path.display(), "invalid file name or path");
            return Err(TransferError::LocalFileNotFound(path.to_path_buf()));
        }
        Err(source) => {
            return Err(TransferError::LocalFileUnreadable {
                path: path.to_path_buf(),
                source,
            });
        }
    };

    if policy == DuplicatePolicy::Reject && store.find_first(filename).await?.is_some() {
        warn!(filename, "refusing upload; filename already stored");
        return Err(TransferError::DuplicateFilename(filename.to_string()));
    }

    let id = store.put(filename, &data).await?;
    info!(
        path = %path.display(),
        filename,
        id = %id,
        bytes = data.len(),
        "upload finished"
    );
    Ok(id)
}

/// Payload of the first object named `filename` (oldest upload wins).
pub async fn read_file<S: ChunkedStore>(store: &S, filename: &str) -> Result<Vec<u8>, TransferError> {
    let object = store
        .find_first(filename)
        .await?
        .ok_or_else(|| TransferError::RemoteObjectNotFound(filename.to_string()))?;
    read_file_by_id(store, &object.id).await
}

pub async fn read_file_by_id<S: ChunkedStore>(
    store: &S,
    id: &Bson,
) -> Result<Vec<u8>, TransferError> {
    let data = store.read(id).await?;
    info!(id = %id, bytes = data.len(), "read finished");
    Ok(data)
}

/// Every object stored under `filename`, oldest first.
pub async fn list_versions<S: ChunkedStore>(
    store: &S,
    filename: &str,
) -> Result<Vec<StoredObject>, TransferError> {
    store.find_all(filename).await
}
