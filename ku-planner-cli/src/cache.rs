use std::{
    collections::hash_map::DefaultHasher,
    hash::{Hash, Hasher},
    path::PathBuf,
    time::{Duration, SystemTime, UNIX_EPOCH},
};

use async_trait::async_trait;

use ku_planner_core::{Error, Result, cache::CacheBackend};

fn now_secs() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |d| d.as_secs())
}

/// Entry header: expiry timestamp then creation timestamp, both little endian
const HEADER_SIZE: usize = 16;

fn encode_entry(data: &[u8], ttl: Duration) -> Vec<u8> {
    let now = now_secs();
    let expires_at = now.saturating_add(ttl.as_secs());

    let mut entry = Vec::with_capacity(HEADER_SIZE + data.len());
    entry.extend_from_slice(&expires_at.to_le_bytes());
    entry.extend_from_slice(&now.to_le_bytes());
    entry.extend_from_slice(data);
    entry
}

/// Payload of a live entry, `None` once expired
fn decode_entry(raw: &[u8]) -> Result<Option<&[u8]>> {
    let (header, data) = raw
        .split_at_checked(HEADER_SIZE)
        .ok_or_else(|| Error::Config("Truncated cache entry".to_string()))?;

    let mut expires_at = [0u8; 8];
    expires_at.copy_from_slice(&header[..8]);

    if now_secs() > u64::from_le_bytes(expires_at) {
        Ok(None)
    } else {
        Ok(Some(data))
    }
}

/// Expiring key/value files under the user cache directory
#[derive(Debug, Clone)]
pub struct FileCache {
    cache_dir: PathBuf,
}

impl FileCache {
    pub fn new(cache_dir: PathBuf) -> Result<Self> {
        std::fs::create_dir_all(&cache_dir).map_err(|e| {
            Error::Config(format!(
                "Failed to create cache directory {}: {}",
                cache_dir.display(),
                e
            ))
        })?;

        Ok(Self { cache_dir })
    }

    pub fn with_default_dir(app_name: &str) -> Result<Self> {
        Self::new(default_cache_dir(app_name)?)
    }

    fn entry_path(&self, key: &str) -> PathBuf {
        let mut hasher = DefaultHasher::new();
        key.hash(&mut hasher);
        self.cache_dir.join(format!("{:x}.cache", hasher.finish()))
    }
}

fn default_cache_dir(app_name: &str) -> Result<PathBuf> {
    let unknown = || Error::Config("Cannot determine cache directory".to_string());

    #[cfg(target_os = "macos")]
    {
        std::env::var_os("HOME")
            .map(|home| PathBuf::from(home).join("Library/Caches").join(app_name))
            .ok_or_else(unknown)
    }

    #[cfg(target_os = "windows")]
    {
        std::env::var_os("LOCALAPPDATA")
            .map(|dir| PathBuf::from(dir).join(app_name))
            .ok_or_else(unknown)
    }

    #[cfg(not(any(target_os = "macos", target_os = "windows")))]
    {
        std::env::var_os("XDG_CACHE_HOME")
            .map(PathBuf::from)
            .or_else(|| std::env::var_os("HOME").map(|home| PathBuf::from(home).join(".cache")))
            .map(|dir| dir.join(app_name))
            .ok_or_else(unknown)
    }
}

#[async_trait]
impl CacheBackend for FileCache {
    async fn set_raw(&self, key: &str, value: &[u8], ttl: Duration) -> Result<()> {
        tokio::fs::write(self.entry_path(key), encode_entry(value, ttl))
            .await
            .map_err(|e| Error::Internal(format!("Failed to write cache file: {e}")))
    }

    async fn get_raw(&self, key: &str) -> Result<Option<Vec<u8>>> {
        let path = self.entry_path(key);

        let content = match tokio::fs::read(&path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(Error::Config(format!("Failed to read cache file: {e}"))),
        };

        match decode_entry(&content) {
            Ok(Some(data)) => Ok(Some(data.to_vec())),
            Ok(None) => {
                tracing::debug!("Cache entry {} expired", key);
                self.delete(key).await?;
                Ok(None)
            }
            Err(e) => {
                tracing::warn!("Discarding cache entry {}: {}", key, e);
                self.delete(key).await?;
                Ok(None)
            }
        }
    }

    async fn delete(&self, key: &str) -> Result<()> {
        match tokio::fs::remove_file(self.entry_path(key)).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(Error::Config(format!("Failed to delete cache file: {e}"))),
        }
    }
}
