//! Object storage backends for the portal.
//!
//! [`ObjectStore`] abstracts file persistence and signed-URL issuance so
//! the API layer is agnostic to where files live:
//!
//! - [`s3::S3ObjectStore`] -- S3-compatible bucket, presigned GET URLs.
//! - [`local::LocalObjectStore`] -- filesystem directory, HMAC-signed
//!   URLs verified by the API's file-serving route.
//! - [`memory::MemoryObjectStore`] -- in-memory map for tests.

pub mod error;
pub mod local;
pub mod memory;
pub mod s3;

use std::time::Duration;

pub use error::StorageError;

/// How a signed URL should instruct the browser to handle the file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Disposition {
    /// Render in the browser (document preview).
    Inline,
    /// Force a download under the given file name.
    Attachment { file_name: String },
}

impl Disposition {
    /// `Content-Disposition` header value for this disposition.
    pub fn header_value(&self) -> String {
        match self {
            Disposition::Inline => "inline".to_string(),
            Disposition::Attachment { file_name } => {
                // Quotes and control characters would corrupt the header.
                let sanitized: String = file_name
                    .chars()
                    .filter(|c| !c.is_control() && *c != '"')
                    .collect();
                format!("attachment; filename=\"{sanitized}\"")
            }
        }
    }
}

/// Abstraction over the portal's file storage provider.
#[async_trait::async_trait]
pub trait ObjectStore: Send + Sync {
    /// Store `bytes` at `path`. With `upsert = false`, writing over an
    /// existing object fails with [`StorageError::AlreadyExists`].
    async fn put(
        &self,
        path: &str,
        bytes: Vec<u8>,
        content_type: &str,
        upsert: bool,
    ) -> Result<(), StorageError>;

    /// Retrieve the object at `path`.
    async fn get(&self, path: &str) -> Result<Vec<u8>, StorageError>;

    /// Whether an object exists at `path`.
    async fn exists(&self, path: &str) -> Result<bool, StorageError>;

    /// Remove the given objects. Missing paths are ignored so cleanup of
    /// partially uploaded sets stays idempotent.
    async fn delete(&self, paths: &[String]) -> Result<(), StorageError>;

    /// Issue a time-limited URL granting read access to `path`.
    async fn signed_url(
        &self,
        path: &str,
        expires_in: Duration,
        disposition: &Disposition,
    ) -> Result<String, StorageError>;
}

/// Reject paths that could escape the storage root or collide with the
/// signing scheme. Shared by every backend.
pub(crate) fn validate_path(path: &str) -> Result<(), StorageError> {
    if path.is_empty() || path.starts_with('/') || path.contains("..") || path.contains('\\') {
        return Err(StorageError::InvalidKey(path.to_string()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn inline_disposition_header() {
        assert_eq!(Disposition::Inline.header_value(), "inline");
    }

    #[test]
    fn attachment_disposition_carries_file_name() {
        let d = Disposition::Attachment {
            file_name: "Årsrapport 2025.pdf".into(),
        };
        assert_eq!(
            d.header_value(),
            "attachment; filename=\"Årsrapport 2025.pdf\""
        );
    }

    #[test]
    fn attachment_disposition_strips_quotes() {
        let d = Disposition::Attachment {
            file_name: "a\"b.pdf".into(),
        };
        assert_eq!(d.header_value(), "attachment; filename=\"ab.pdf\"");
    }

    #[test]
    fn traversal_paths_are_rejected() {
        assert!(validate_path("../etc/passwd").is_err());
        assert!(validate_path("/absolute").is_err());
        assert!(validate_path("a\\b").is_err());
        assert!(validate_path("").is_err());
        assert!(validate_path("documents/1700-abc.pdf").is_ok());
    }
}
