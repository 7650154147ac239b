//! In-memory object store for tests.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

use crate::{validate_path, Disposition, ObjectStore, StorageError};

#[derive(Debug, Default)]
pub struct MemoryObjectStore {
    objects: Mutex<HashMap<String, StoredObject>>,
}

#[derive(Debug, Clone)]
struct StoredObject {
    bytes: Vec<u8>,
    content_type: String,
}

impl MemoryObjectStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// All stored keys, for assertions.
    pub fn keys(&self) -> Vec<String> {
        self.objects.lock().unwrap().keys().cloned().collect()
    }

    /// Recorded content type for a key, for assertions.
    pub fn content_type(&self, path: &str) -> Option<String> {
        self.objects
            .lock()
            .unwrap()
            .get(path)
            .map(|o| o.content_type.clone())
    }

    pub fn len(&self) -> usize {
        self.objects.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.lock().unwrap().is_empty()
    }
}

#[async_trait::async_trait]
impl ObjectStore for MemoryObjectStore {
    async fn put(
        &self,
        path: &str,
        bytes: Vec<u8>,
        content_type: &str,
        upsert: bool,
    ) -> Result<(), StorageError> {
        validate_path(path)?;
        let mut objects = self.objects.lock().unwrap();
        if !upsert && objects.contains_key(path) {
            return Err(StorageError::AlreadyExists(path.to_string()));
        }
        objects.insert(
            path.to_string(),
            StoredObject {
                bytes,
                content_type: content_type.to_string(),
            },
        );
        Ok(())
    }

    async fn get(&self, path: &str) -> Result<Vec<u8>, StorageError> {
        validate_path(path)?;
        self.objects
            .lock()
            .unwrap()
            .get(path)
            .map(|o| o.bytes.clone())
            .ok_or_else(|| StorageError::NotFound(path.to_string()))
    }

    async fn exists(&self, path: &str) -> Result<bool, StorageError> {
        validate_path(path)?;
        Ok(self.objects.lock().unwrap().contains_key(path))
    }

    async fn delete(&self, paths: &[String]) -> Result<(), StorageError> {
        let mut objects = self.objects.lock().unwrap();
        for path in paths {
            objects.remove(path);
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
        if !self.objects.lock().unwrap().contains_key(path) {
            return Err(StorageError::NotFound(path.to_string()));
        }
        let exp = chrono::Utc::now().timestamp() + expires_in.as_secs() as i64;
        let mut url = format!("memory://{path}?exp={exp}");
        if matches!(disposition, Disposition::Attachment { .. }) {
            url.push_str("&download=true");
        }
        Ok(url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn round_trip_and_content_type() {
        let store = MemoryObjectStore::new();
        store
            .put("documents/a.pdf", vec![1, 2, 3], "application/pdf", false)
            .await
            .unwrap();
        assert_eq!(store.get("documents/a.pdf").await.unwrap(), vec![1, 2, 3]);
        assert_eq!(
            store.content_type("documents/a.pdf").as_deref(),
            Some("application/pdf")
        );
    }

    #[tokio::test]
    async fn signed_url_requires_existing_object() {
        let store = MemoryObjectStore::new();
        let err = store
            .signed_url("missing.pdf", Duration::from_secs(60), &Disposition::Inline)
            .await
            .unwrap_err();
        assert!(matches!(err, StorageError::NotFound(_)));
    }
}
