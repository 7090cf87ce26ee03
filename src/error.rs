use mongodb::error::{Error as MongoError, ErrorKind};
use std::path::PathBuf;
use thiserror::Error as ThisError;

#[derive(Debug, ThisError)]
pub enum TransferError {
    #[error("failed to connect: {0}")]
    ConnectionFailed(String),

    #[error("local file not found: {}", .0.display())]
    LocalFileNotFound(PathBuf),

    #[error("local file unreadable: {}: {source}", .path.display())]
    LocalFileUnreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("no stored object named {0:?}")]
    RemoteObjectNotFound(String),

    #[error("a stored object named {0:?} already exists")]
    DuplicateFilename(String),

    #[error("storage fault: {0}")]
    StorageFault(String),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

impl From<MongoError> for TransferError {
    fn from(e: MongoError) -> Self {
        TransferError::StorageFault(e.to_string())
    }
}

impl From<figment::Error> for TransferError {
    fn from(e: figment::Error) -> Self {
        TransferError::InvalidConfig(e.to_string())
    }
}

/// Transient faults that may succeed when the same call is repeated.
pub trait IsRetryable {
    fn is_retryable(&self) -> bool;
}

impl IsRetryable for MongoError {
    fn is_retryable(&self) -> bool {
        matches!(
            *self.kind,
            ErrorKind::Io(_)
                | ErrorKind::ServerSelection { .. }
                | ErrorKind::DnsResolve { .. }
                | ErrorKind::ConnectionPoolCleared { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_name_the_subject() {
        let err = TransferError::RemoteObjectNotFound("missing.geojson".into());
        assert_eq!(err.to_string(), "no stored object named \"missing.geojson\"");

        let err = TransferError::LocalFileNotFound(PathBuf::from("/tmp/a.geojson"));
        assert_eq!(err.to_string(), "local file not found: /tmp/a.geojson");
    }
}
