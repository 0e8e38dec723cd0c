use std::time::Duration;

use async_trait::async_trait;
use serde::{Serialize, de::DeserializeOwned};

use crate::Result;

/// Byte-level storage with expiry
#[async_trait]
pub trait CacheBackend: Send + Sync {
    async fn set_raw(&self, key: &str, value: &[u8], ttl: Duration) -> Result<()>;
    /// `None` when missing or expired
    async fn get_raw(&self, key: &str) -> Result<Option<Vec<u8>>>;
    async fn delete(&self, key: &str) -> Result<()>;
}

#[async_trait]
pub trait Cache: CacheBackend {
    async fn set<T>(&self, key: &str, value: &T, ttl: Duration) -> Result<()>
    where
        T: Serialize + Send + Sync,
    {
        let value_bytes = serde_json::to_vec(value)
            .map_err(|e| crate::Error::Internal(format!("Failed to serialize value: {e}")))?;

        self.set_raw(key, &value_bytes, ttl).await
    }

    /// Stale or undecodable entries are dropped and reported as a miss
    async fn get<T>(&self, key: &str) -> Result<Option<T>>
    where
        T: DeserializeOwned + Send,
    {
        let Some(raw) = self.get_raw(key).await? else {
            return Ok(None);
        };

        match serde_json::from_slice::<T>(&raw) {
            Ok(value) => Ok(Some(value)),
            Err(e) => {
                tracing::warn!("Dropping undecodable cache entry {}: {}", key, e);
                self.delete(key).await?;
                Ok(None)
            }
        }
    }
}

impl<T: CacheBackend> Cache for T {}
