pub mod config;
pub mod connector;
pub mod error;
pub mod store;
pub mod transfer;

pub use config::{Config, DuplicatePolicy};
pub use connector::connect;
pub use error::TransferError;
pub use store::{ChunkedStore, GridFsNamespace, MemoryStore, StoredObject};
pub use transfer::{list_versions, read_file, read_file_by_id, upload_file};
