use super::{ChunkedStore, FILENAME_ORDER, StoredObject};
use crate::error::TransferError;
use futures::{AsyncReadExt, AsyncWriteExt, TryStreamExt};
use mongodb::Client;
use mongodb::bson::{Bson, Document, doc};
use mongodb::error::{Error as MongoError, ErrorKind, GridFsErrorKind};
use mongodb::gridfs::GridFsBucket;
use mongodb::options::GridFsBucketOptions;
use tracing::{debug, warn};

/// GridFS bucket inside one database of an authenticated cluster session.
#[derive(Clone)]
pub struct GridFsNamespace {
    bucket: GridFsBucket,
}

impl GridFsNamespace {
    pub fn new(
        client: Client,
        database: &str,
        bucket_name: &str,
        chunk_size_bytes: Option<u32>,
    ) -> Self {
        let options = GridFsBucketOptions::builder()
            .bucket_name(bucket_name.to_string())
            .chunk_size_bytes(chunk_size_bytes)
            .build();
        let bucket = client.database(database).gridfs_bucket(options);
        Self { bucket }
    }
}

fn filename_order() -> Document {
    FILENAME_ORDER
        .iter()
        .map(|(key, dir)| (key.to_string(), Bson::Int32(*dir)))
        .collect()
}

/// GridFS reports a missing `_id` as its own error kind; surface it as a lookup miss.
fn missing_or_fault(e: MongoError, id: &Bson) -> TransferError {
    match e.kind.as_ref() {
        ErrorKind::GridFs(GridFsErrorKind::FileNotFound { .. }) => {
            TransferError::RemoteObjectNotFound(id.to_string())
        }
        _ => e.into(),
    }
}

fn stream_fault(e: std::io::Error) -> TransferError {
    TransferError::StorageFault(e.to_string())
}

impl ChunkedStore for GridFsNamespace {
    async fn put(&self, filename: &str, bytes: &[u8]) -> Result<Bson, TransferError> {
        let mut upload = self.bucket.open_upload_stream(filename).await?;
        let id = upload.id().clone();

        if let Err(e) = upload.write_all(bytes).await {
            warn!(filename, id = %id, error = %e, "upload interrupted; aborting");
            if let Err(abort_err) = upload.abort().await {
                warn!(id = %id, error = %abort_err, "failed to discard partial chunks");
            }
            return Err(stream_fault(e));
        }
        upload.close().await.map_err(stream_fault)?;

        debug!(filename, id = %id, bytes = bytes.len(), "gridfs object written");
        Ok(id)
    }

    async fn find_first(&self, filename: &str) -> Result<Option<StoredObject>, TransferError> {
        let found = self
            .bucket
            .find_one(doc! { "filename": filename })
            .sort(filename_order())
            .await?;
        Ok(found.map(StoredObject::from))
    }

    async fn find_all(&self, filename: &str) -> Result<Vec<StoredObject>, TransferError> {
        let cursor = self
            .bucket
            .find(doc! { "filename": filename })
            .sort(filename_order())
            .await?;
        let files: Vec<_> = cursor.try_collect().await?;
        Ok(files.into_iter().map(StoredObject::from).collect())
    }

    async fn read(&self, id: &Bson) -> Result<Vec<u8>, TransferError> {
        let mut download = self
            .bucket
            .open_download_stream(id.clone())
            .await
            .map_err(|e| missing_or_fault(e, id))?;

        let mut buf = Vec::new();
        download.read_to_end(&mut buf).await.map_err(stream_fault)?;
        debug!(id = %id, bytes = buf.len(), "gridfs object read");
        Ok(buf)
    }

    async fn delete(&self, id: &Bson) -> Result<(), TransferError> {
        self.bucket
            .delete(id.clone())
            .await
            .map_err(|e| missing_or_fault(e, id))
    }
}
