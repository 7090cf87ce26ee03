use chrono::{DateTime, Utc};
use mongodb::bson::Bson;
use mongodb::gridfs::FilesCollectionDocument;

/// Metadata of one stored object; the payload lives in its chunks.
#[derive(Debug, Clone, PartialEq)]
pub struct StoredObject {
    pub id: Bson,
    pub filename: Option<String>,
    pub length: u64,
    pub chunk_size_bytes: u32,
    pub upload_date: DateTime<Utc>,
}

impl From<FilesCollectionDocument> for StoredObject {
    fn from(d: FilesCollectionDocument) -> Self {
        Self {
            id: d.id,
            filename: d.filename,
            length: d.length,
            chunk_size_bytes: d.chunk_size_bytes,
            upload_date: d.upload_date.to_chrono(),
        }
    }
}
