//! Blob storage for product and post images.

use async_trait::async_trait;
use mockall::automock;
use rustc_hash::FxHashMap;
use thiserror::Error;
use tokio::sync::RwLock;
use tracing::debug;
use uuid::Uuid;

use crate::slugs::slugify;

/// Largest accepted upload.
pub const MAX_UPLOAD_BYTES: usize = 5 * 1024 * 1024;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("only images can be uploaded, got {0}")]
    UnsupportedContentType(String),

    #[error("file is {size} bytes, the limit is {limit}")]
    TooLarge { size: usize, limit: usize },

    #[error("file is empty")]
    Empty,

    #[error("invalid folder name: {0:?}")]
    InvalidFolder(String),

    #[error("blob not found")]
    NotFound,
}

/// Where an upload landed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredBlob {
    /// Path inside the bucket
    pub path: String,

    /// Public URL
    pub url: String,
}

#[derive(Debug, Clone)]
struct Blob {
    content_type: String,
    bytes: Vec<u8>,
}

/// Check an upload against the image rules before storing it.
///
/// # Errors
///
/// Returns an error for non-image content, empty files and files over [`MAX_UPLOAD_BYTES`].
pub fn validate_upload(content_type: &str, size: usize) -> Result<(), StorageError> {
    if !content_type.trim().to_ascii_lowercase().starts_with("image/") {
        return Err(StorageError::UnsupportedContentType(content_type.to_string()));
    }

    if size == 0 {
        return Err(StorageError::Empty);
    }

    if size > MAX_UPLOAD_BYTES {
        return Err(StorageError::TooLarge {
            size,
            limit: MAX_UPLOAD_BYTES,
        });
    }

    Ok(())
}

/// Unique object name keeping the original extension.
fn object_name(file_name: &str) -> String {
    let (stem, extension) = file_name
        .rsplit_once('.')
        .filter(|(stem, _)| !stem.is_empty())
        .unwrap_or((file_name, ""));

    let stem = slugify(stem);
    let extension = extension.to_ascii_lowercase();
    let id = Uuid::now_v7().simple();

    match (stem.is_empty(), extension.is_empty()) {
        (true, true) => id.to_string(),
        (true, false) => format!("{id}.{extension}"),
        (false, true) => format!("{id}-{stem}"),
        (false, false) => format!("{id}-{stem}.{extension}"),
    }
}

/// Blobs held in process memory and served under a base URL.
#[derive(Debug)]
pub struct InMemoryBlobStorage {
    base_url: String,
    blobs: RwLock<FxHashMap<String, Blob>>,
}

impl InMemoryBlobStorage {
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            blobs: RwLock::default(),
        }
    }

    /// Content type and size of a stored blob.
    pub async fn metadata(&self, url: &str) -> Option<(String, usize)> {
        let path = self.path_for(url)?;

        self.blobs
            .read()
            .await
            .get(path)
            .map(|blob| (blob.content_type.clone(), blob.bytes.len()))
    }

    fn path_for<'a>(&self, url: &'a str) -> Option<&'a str> {
        url.strip_prefix(&self.base_url)?.strip_prefix('/')
    }
}

#[async_trait]
impl BlobStorage for InMemoryBlobStorage {
    async fn upload(
        &self,
        folder: &str,
        file_name: &str,
        content_type: &str,
        bytes: Vec<u8>,
    ) -> Result<StoredBlob, StorageError> {
        validate_upload(content_type, bytes.len())?;

        let folder = folder.trim_matches('/');

        if folder.is_empty() || folder.split('/').any(|segment| slugify(segment) != segment) {
            return Err(StorageError::InvalidFolder(folder.to_string()));
        }

        let path = format!("{folder}/{}", object_name(file_name));
        let url = format!("{}/{path}", self.base_url);

        debug!(%path, size = bytes.len(), "stored blob");

        self.blobs.write().await.insert(
            path.clone(),
            Blob {
                content_type: content_type.to_string(),
                bytes,
            },
        );

        Ok(StoredBlob { path, url })
    }

    async fn delete(&self, url: &str) -> Result<(), StorageError> {
        let path = self.path_for(url).ok_or(StorageError::NotFound)?;

        self.blobs
            .write()
            .await
            .remove(path)
            .map(|_| ())
            .ok_or(StorageError::NotFound)
    }
}

#[automock]
#[async_trait]
pub trait BlobStorage: Send + Sync {
    /// Store an image under `folder`, returning its path and public URL.
    async fn upload(
        &self,
        folder: &str,
        file_name: &str,
        content_type: &str,
        bytes: Vec<u8>,
    ) -> Result<StoredBlob, StorageError>;

    /// Delete a blob by its public URL.
    async fn delete(&self, url: &str) -> Result<(), StorageError>;
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use super::*;

    const BASE_URL: &str = "https://cdn.biuty.test/";

    #[tokio::test]
    async fn upload_returns_public_url() -> TestResult {
        let storage = InMemoryBlobStorage::new(BASE_URL);

        let blob = storage
            .upload("products", "Sérum Frente.JPG", "image/jpeg", vec![1, 2, 3])
            .await?;

        assert!(blob.path.starts_with("products/"));
        assert!(blob.path.ends_with("-serum-frente.jpg"), "{}", blob.path);
        assert_eq!(blob.url, format!("https://cdn.biuty.test/{}", blob.path));
        assert_eq!(
            storage.metadata(&blob.url).await,
            Some(("image/jpeg".to_string(), 3))
        );

        Ok(())
    }

    #[tokio::test]
    async fn same_file_name_gets_distinct_paths() -> TestResult {
        let storage = InMemoryBlobStorage::new(BASE_URL);

        let first = storage.upload("posts", "capa.png", "image/png", vec![1]).await?;
        let second = storage.upload("posts", "capa.png", "image/png", vec![2]).await?;

        assert_ne!(first.path, second.path);

        Ok(())
    }

    #[tokio::test]
    async fn non_images_are_rejected() {
        let storage = InMemoryBlobStorage::new(BASE_URL);

        let result = storage
            .upload("products", "notes.pdf", "application/pdf", vec![1])
            .await;

        assert!(matches!(
            result,
            Err(StorageError::UnsupportedContentType(_))
        ));
    }

    #[test]
    fn size_limit_is_inclusive() {
        assert!(validate_upload("image/png", MAX_UPLOAD_BYTES).is_ok());
        assert!(matches!(
            validate_upload("image/png", MAX_UPLOAD_BYTES + 1),
            Err(StorageError::TooLarge { .. })
        ));
        assert!(matches!(validate_upload("image/png", 0), Err(StorageError::Empty)));
    }

    #[tokio::test]
    async fn folder_must_be_slug_like() {
        let storage = InMemoryBlobStorage::new(BASE_URL);

        let result = storage
            .upload("../etc", "capa.png", "image/png", vec![1])
            .await;

        assert!(matches!(result, Err(StorageError::InvalidFolder(_))));
    }

    #[tokio::test]
    async fn delete_removes_blob_once() -> TestResult {
        let storage = InMemoryBlobStorage::new(BASE_URL);
        let blob = storage.upload("products", "a.webp", "image/webp", vec![1]).await?;

        storage.delete(&blob.url).await?;

        assert!(matches!(
            storage.delete(&blob.url).await,
            Err(StorageError::NotFound)
        ));
        assert!(matches!(
            storage.delete("https://elsewhere.test/a.webp").await,
            Err(StorageError::NotFound)
        ));

        Ok(())
    }
}
