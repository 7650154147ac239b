#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("Object not found: {0}")]
    NotFound(String),

    #[error("Object already exists: {0}")]
    AlreadyExists(String),

    #[error("Invalid object key: {0}")]
    InvalidKey(String),

    #[error("Signature rejected: {0}")]
    SignatureRejected(String),

    #[error("Storage backend error: {0}")]
    Backend(String),
}
