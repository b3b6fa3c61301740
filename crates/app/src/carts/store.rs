//! Cart persistence port and its adapters.

use std::{
    io::ErrorKind,
    path::{Path, PathBuf},
};

use async_trait::async_trait;
use biuty::prelude::CartSnapshot;
use mockall::automock;
use thiserror::Error;
use tokio::{fs, sync::RwLock};

#[derive(Debug, Error)]
pub enum CartStoreError {
    #[error("cart file {} could not be read or written", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("stored cart is not valid JSON")]
    Json(#[from] serde_json::Error),
}

#[automock]
#[async_trait]
pub trait CartStore: Send + Sync {
    /// The saved cart, if one was saved.
    async fn load(&self) -> Result<Option<CartSnapshot>, CartStoreError>;

    /// Replace the saved cart.
    async fn save(&self, snapshot: &CartSnapshot) -> Result<(), CartStoreError>;

    /// Forget the saved cart.
    async fn clear(&self) -> Result<(), CartStoreError>;
}

/// Keeps the cart snapshot in process memory.
#[derive(Debug, Default)]
pub struct MemoryCartStore {
    snapshot: RwLock<Option<CartSnapshot>>,
}

impl MemoryCartStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CartStore for MemoryCartStore {
    async fn load(&self) -> Result<Option<CartSnapshot>, CartStoreError> {
        Ok(self.snapshot.read().await.clone())
    }

    async fn save(&self, snapshot: &CartSnapshot) -> Result<(), CartStoreError> {
        *self.snapshot.write().await = Some(snapshot.clone());

        Ok(())
    }

    async fn clear(&self) -> Result<(), CartStoreError> {
        *self.snapshot.write().await = None;

        Ok(())
    }
}

/// Keeps the cart snapshot in a JSON file.
#[derive(Debug, Clone)]
pub struct JsonFileCartStore {
    path: PathBuf,
}

impl JsonFileCartStore {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn io_error(&self, source: std::io::Error) -> CartStoreError {
        CartStoreError::Io {
            path: self.path.clone(),
            source,
        }
    }
}

#[async_trait]
impl CartStore for JsonFileCartStore {
    async fn load(&self) -> Result<Option<CartSnapshot>, CartStoreError> {
        let contents = match fs::read(&self.path).await {
            Ok(contents) => contents,
            Err(error) if error.kind() == ErrorKind::NotFound => return Ok(None),
            Err(error) => return Err(self.io_error(error)),
        };

        Ok(Some(serde_json::from_slice(&contents)?))
    }

    async fn save(&self, snapshot: &CartSnapshot) -> Result<(), CartStoreError> {
        let parent = self
            .path
            .parent()
            .filter(|parent| !parent.as_os_str().is_empty());

        if let Some(parent) = parent {
            fs::create_dir_all(parent)
                .await
                .map_err(|error| self.io_error(error))?;
        }

        let contents = serde_json::to_vec_pretty(snapshot)?;

        fs::write(&self.path, contents)
            .await
            .map_err(|error| self.io_error(error))
    }

    async fn clear(&self) -> Result<(), CartStoreError> {
        match fs::remove_file(&self.path).await {
            Ok(()) => Ok(()),
            Err(error) if error.kind() == ErrorKind::NotFound => Ok(()),
            Err(error) => Err(self.io_error(error)),
        }
    }
}

#[cfg(test)]
mod tests {
    use biuty::prelude::{LineId, LineSnapshot, ProductId};
    use testresult::TestResult;

    use super::*;

    fn snapshot() -> CartSnapshot {
        CartSnapshot {
            currency: "BRL".to_string(),
            lines: vec![LineSnapshot {
                id: LineId::new(),
                product_id: ProductId::new(),
                variant_id: None,
                name: "Sérum Vitamina C".to_string(),
                slug: "serum-vitamina-c".to_string(),
                image: None,
                quantity: 2,
                unit_price: 149_90,
            }],
            coupon: Some("BIUTY10".to_string()),
        }
    }

    #[tokio::test]
    async fn file_store_persists_across_instances() -> TestResult {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("nested").join("cart.json");
        let saved = snapshot();

        JsonFileCartStore::new(&path).save(&saved).await?;

        let loaded = JsonFileCartStore::new(&path).load().await?;

        assert_eq!(loaded, Some(saved));

        Ok(())
    }

    #[tokio::test]
    async fn missing_file_loads_nothing() -> TestResult {
        let dir = tempfile::tempdir()?;
        let store = JsonFileCartStore::new(dir.path().join("cart.json"));

        assert_eq!(store.load().await?, None);

        store.clear().await?;

        Ok(())
    }

    #[tokio::test]
    async fn corrupt_file_is_a_json_error() -> TestResult {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("cart.json");

        std::fs::write(&path, "{ not json")?;

        let result = JsonFileCartStore::new(&path).load().await;

        assert!(matches!(result, Err(CartStoreError::Json(_))));

        Ok(())
    }

    #[tokio::test]
    async fn memory_store_clear_forgets_snapshot() -> TestResult {
        let store = MemoryCartStore::new();

        store.save(&snapshot()).await?;

        assert!(store.load().await?.is_some());

        store.clear().await?;

        assert_eq!(store.load().await?, None);

        Ok(())
    }
}
