//! S3-compatible object store backend.
//!
//! Signed URLs are native S3 presigned GET requests, so downloads never
//! pass through the API server.

use std::time::Duration;

use aws_sdk_s3::presigning::PresigningConfig;
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::Client;

use crate::{validate_path, Disposition, ObjectStore, StorageError};

pub struct S3ObjectStore {
    client: Client,
    bucket: String,
}

impl S3ObjectStore {
    pub fn new(client: Client, bucket: impl Into<String>) -> Self {
        Self {
            client,
            bucket: bucket.into(),
        }
    }
}

#[async_trait::async_trait]
impl ObjectStore for S3ObjectStore {
    async fn put(
        &self,
        path: &str,
        bytes: Vec<u8>,
        content_type: &str,
        upsert: bool,
    ) -> Result<(), StorageError> {
        validate_path(path)?;

        // S3 PUTs overwrite unconditionally; emulate the upsert flag with
        // an existence probe.
        if !upsert && self.exists(path).await? {
            return Err(StorageError::AlreadyExists(path.to_string()));
        }

        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(path)
            .content_type(content_type)
            .body(ByteStream::from(bytes))
            .send()
            .await
            .map_err(|e| StorageError::Backend(e.to_string()))?;
        Ok(())
    }

    async fn get(&self, path: &str) -> Result<Vec<u8>, StorageError> {
        validate_path(path)?;

        let output = self
            .client
            .get_object()
            .bucket(&self.bucket)
            .key(path)
            .send()
            .await
            .map_err(|e| {
                let service_err = e.into_service_error();
                if service_err.is_no_such_key() {
                    StorageError::NotFound(path.to_string())
                } else {
                    StorageError::Backend(service_err.to_string())
                }
            })?;

        let bytes = output
            .body
            .collect()
            .await
            .map_err(|e| StorageError::Backend(e.to_string()))?;
        Ok(bytes.into_bytes().to_vec())
    }

    async fn exists(&self, path: &str) -> Result<bool, StorageError> {
        validate_path(path)?;

        match self
            .client
            .head_object()
            .bucket(&self.bucket)
            .key(path)
            .send()
            .await
        {
            Ok(_) => Ok(true),
            Err(e) => {
                let service_err = e.into_service_error();
                if service_err.is_not_found() {
                    Ok(false)
                } else {
                    Err(StorageError::Backend(service_err.to_string()))
                }
            }
        }
    }

    async fn delete(&self, paths: &[String]) -> Result<(), StorageError> {
        for path in paths {
            validate_path(path)?;
            // DeleteObject on a missing key succeeds, which matches the
            // trait's idempotency contract.
            self.client
                .delete_object()
                .bucket(&self.bucket)
                .key(path)
                .send()
                .await
                .map_err(|e| StorageError::Backend(e.to_string()))?;
        }
        Ok(())
    }

    async fn signed_url(
        &self,
        path: &str,
        expires_in: Duration,
        disposition: &Disposition,
    ) -> Result<String, StorageError> {
        validate_path(path)?;

        let presigning = PresigningConfig::expires_in(expires_in)
            .map_err(|e| StorageError::Backend(e.to_string()))?;

        let presigned = self
            .client
            .get_object()
            .bucket(&self.bucket)
            .key(path)
            .response_content_disposition(disposition.header_value())
            .presigned(presigning)
            .await
            .map_err(|e| StorageError::Backend(e.to_string()))?;

        Ok(presigned.uri().to_string())
    }
}
