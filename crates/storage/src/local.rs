//! Filesystem-backed object store.
//!
//! Objects live under a root directory. Signed URLs point at the API's
//! `/api/v1/files/local/{path}` route and carry an expiry plus an
//! HMAC-SHA256 signature over `"{path}|{exp}"`; the route calls
//! [`LocalObjectStore::verify`] before streaming the file.

use std::path::{Path, PathBuf};
use std::time::Duration;

use hmac::{Hmac, Mac};
use sha2::Sha256;

use crate::{validate_path, Disposition, ObjectStore, StorageError};

type HmacSha256 = Hmac<Sha256>;

pub struct LocalObjectStore {
    root: PathBuf,
    /// External base URL of the API, e.g. `http://localhost:3000`.
    base_url: String,
    /// Secret for URL signatures. Independent of the JWT secret so the
    /// two capabilities can be rotated separately.
    signing_secret: String,
}

impl LocalObjectStore {
    pub fn new(
        root: impl Into<PathBuf>,
        base_url: impl Into<String>,
        signing_secret: impl Into<String>,
    ) -> Self {
        Self {
            root: root.into(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            signing_secret: signing_secret.into(),
        }
    }

    fn full_path(&self, path: &str) -> Result<PathBuf, StorageError> {
        validate_path(path)?;
        Ok(self.root.join(path))
    }

    fn sign(&self, path: &str, exp: i64) -> String {
        let mut mac = HmacSha256::new_from_slice(self.signing_secret.as_bytes())
            .expect("HMAC accepts keys of any length");
        mac.update(format!("{path}|{exp}").as_bytes());
        hex_encode(&mac.finalize().into_bytes())
    }

    /// Validate a signed-URL signature and expiry for `path`.
    pub fn verify(&self, path: &str, exp: i64, sig: &str) -> Result<(), StorageError> {
        validate_path(path)?;

        if exp < chrono::Utc::now().timestamp() {
            return Err(StorageError::SignatureRejected("URL has expired".into()));
        }

        let expected = self.sign(path, exp);
        if !constant_time_eq(expected.as_bytes(), sig.as_bytes()) {
            return Err(StorageError::SignatureRejected(
                "Signature mismatch".into(),
            ));
        }
        Ok(())
    }
}

#[async_trait::async_trait]
impl ObjectStore for LocalObjectStore {
    async fn put(
        &self,
        path: &str,
        bytes: Vec<u8>,
        _content_type: &str,
        upsert: bool,
    ) -> Result<(), StorageError> {
        let full = self.full_path(path)?;

        if !upsert && full.exists() {
            return Err(StorageError::AlreadyExists(path.to_string()));
        }

        if let Some(parent) = full.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| StorageError::Backend(e.to_string()))?;
        }

        tokio::fs::write(&full, bytes)
            .await
            .map_err(|e| StorageError::Backend(e.to_string()))
    }

    async fn get(&self, path: &str) -> Result<Vec<u8>, StorageError> {
        let full = self.full_path(path)?;
        match tokio::fs::read(&full).await {
            Ok(bytes) => Ok(bytes),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(StorageError::NotFound(path.to_string()))
            }
            Err(e) => Err(StorageError::Backend(e.to_string())),
        }
    }

    async fn exists(&self, path: &str) -> Result<bool, StorageError> {
        let full = self.full_path(path)?;
        Ok(full.exists())
    }

    async fn delete(&self, paths: &[String]) -> Result<(), StorageError> {
        for path in paths {
            let full = self.full_path(path)?;
            match tokio::fs::remove_file(&full).await {
                Ok(()) => {}
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                Err(e) => return Err(StorageError::Backend(e.to_string())),
            }
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

        let exp = chrono::Utc::now().timestamp() + expires_in.as_secs() as i64;
        let sig = self.sign(path, exp);

        let mut url = format!(
            "{}/api/v1/files/local/{path}?exp={exp}&sig={sig}",
            self.base_url
        );
        if matches!(disposition, Disposition::Attachment { .. }) {
            url.push_str("&download=true");
        }
        Ok(url)
    }
}

/// Resolve a verified path inside the store root for streaming.
impl LocalObjectStore {
    pub fn resolve(&self, path: &str) -> Result<PathBuf, StorageError> {
        self.full_path(path)
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

fn hex_encode(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}

fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store(root: &Path) -> LocalObjectStore {
        LocalObjectStore::new(root, "http://localhost:3000/", "test-signing-secret")
    }

    #[tokio::test]
    async fn put_get_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let store = store(dir.path());

        store
            .put("documents/a.pdf", b"pdf bytes".to_vec(), "application/pdf", false)
            .await
            .unwrap();
        assert_eq!(store.get("documents/a.pdf").await.unwrap(), b"pdf bytes");
    }

    #[tokio::test]
    async fn put_without_upsert_rejects_overwrite() {
        let dir = tempfile::tempdir().unwrap();
        let store = store(dir.path());

        store
            .put("avatars/1.png", vec![1], "image/png", false)
            .await
            .unwrap();
        let err = store
            .put("avatars/1.png", vec![2], "image/png", false)
            .await
            .unwrap_err();
        assert!(matches!(err, StorageError::AlreadyExists(_)));

        // Upsert overwrites.
        store
            .put("avatars/1.png", vec![2], "image/png", true)
            .await
            .unwrap();
        assert_eq!(store.get("avatars/1.png").await.unwrap(), vec![2]);
    }

    #[tokio::test]
    async fn delete_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let store = store(dir.path());

        store
            .put("documents/a.pdf", vec![1], "application/pdf", false)
            .await
            .unwrap();
        store
            .delete(&["documents/a.pdf".into(), "documents/missing.pdf".into()])
            .await
            .unwrap();
        assert!(!store.exists("documents/a.pdf").await.unwrap());
    }

    #[tokio::test]
    async fn signed_url_verifies() {
        let dir = tempfile::tempdir().unwrap();
        let store = store(dir.path());

        let url = store
            .signed_url(
                "documents/a.pdf",
                Duration::from_secs(600),
                &Disposition::Inline,
            )
            .await
            .unwrap();
        assert!(url.starts_with("http://localhost:3000/api/v1/files/local/documents/a.pdf?exp="));

        // Pull exp + sig back out of the query string.
        let query = url.split_once('?').unwrap().1;
        let mut exp = 0i64;
        let mut sig = String::new();
        for pair in query.split('&') {
            let (k, v) = pair.split_once('=').unwrap();
            match k {
                "exp" => exp = v.parse().unwrap(),
                "sig" => sig = v.to_string(),
                _ => {}
            }
        }

        assert!(store.verify("documents/a.pdf", exp, &sig).is_ok());
        assert!(store.verify("documents/b.pdf", exp, &sig).is_err());
        assert!(store.verify("documents/a.pdf", exp + 1, &sig).is_err());
    }

    #[tokio::test]
    async fn expired_signature_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let store = store(dir.path());

        let exp = chrono::Utc::now().timestamp() - 60;
        let sig = store.sign("documents/a.pdf", exp);
        let err = store.verify("documents/a.pdf", exp, &sig).unwrap_err();
        assert!(matches!(err, StorageError::SignatureRejected(_)));
    }

    #[tokio::test]
    async fn attachment_urls_carry_download_flag() {
        let dir = tempfile::tempdir().unwrap();
        let store = store(dir.path());

        let url = store
            .signed_url(
                "documents/a.pdf",
                Duration::from_secs(600),
                &Disposition::Attachment {
                    file_name: "rapport.pdf".into(),
                },
            )
            .await
            .unwrap();
        assert!(url.ends_with("&download=true"));
    }
}
