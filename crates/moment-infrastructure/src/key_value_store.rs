//! Local key-value store implementations.
//!
//! The platform capability this client depends on is a durable, async,
//! string-keyed map. Two implementations are provided: an in-memory store
//! for tests and previews, and a single-file JSON store for desktop use.
//! Neither offers multi-key atomicity; callers that issue several writes in
//! sequence must tolerate a crash between them.

use async_trait::async_trait;
use moment_core::error::{MomentError, Result};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tokio::sync::RwLock;

/// Durable, async, string-keyed get/set/remove.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Reads the value stored under `key`, if any.
    async fn get(&self, key: &str) -> Result<Option<String>>;

    /// Stores `value` under `key`, overwriting any previous value.
    async fn set(&self, key: &str, value: &str) -> Result<()>;

    /// Removes `key`. Removing an absent key is not an error.
    async fn remove(&self, key: &str) -> Result<()>;
}

/// In-memory key-value store.
///
/// Not durable. Intended as a test fake and for ephemeral sessions.
#[derive(Default)]
pub struct MemoryKeyValueStore {
    entries: RwLock<HashMap<String, String>>,
}

impl MemoryKeyValueStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl KeyValueStore for MemoryKeyValueStore {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.entries.read().await.get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> Result<()> {
        self.entries
            .write()
            .await
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<()> {
        self.entries.write().await.remove(key);
        Ok(())
    }
}

/// Key-value store persisted as a single JSON object file.
///
/// The whole map is kept in memory and rewritten on every mutation; the file
/// is small (a handful of session keys), so read-modify-write is fine. The
/// cache avoids re-reading the file on every `get`, the same way the orcs
/// app-state service caches its backing file.
pub struct JsonFileKeyValueStore {
    path: PathBuf,
    cache: RwLock<Option<HashMap<String, String>>>,
}

impl JsonFileKeyValueStore {
    /// Creates a store backed by the given file. The file is created lazily
    /// on the first write; a missing file reads as an empty map.
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            cache: RwLock::new(None),
        }
    }

    /// Creates a store at the default location (`~/.momentcount/store.json`).
    ///
    /// # Errors
    ///
    /// Returns an error if the home directory cannot be determined.
    pub fn default_location() -> Result<Self> {
        let home_dir = dirs::home_dir()
            .ok_or_else(|| MomentError::store("Failed to get home directory"))?;
        Ok(Self::new(home_dir.join(".momentcount").join("store.json")))
    }

    async fn load_entries(&self) -> Result<HashMap<String, String>> {
        {
            let cache = self.cache.read().await;
            if let Some(entries) = cache.as_ref() {
                return Ok(entries.clone());
            }
        }

        let entries = match tokio::fs::read_to_string(&self.path).await {
            Ok(content) => serde_json::from_str(&content)?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => HashMap::new(),
            Err(e) => {
                return Err(MomentError::store(format!(
                    "Failed to read store file {:?}: {}",
                    self.path, e
                )));
            }
        };

        *self.cache.write().await = Some(entries.clone());
        Ok(entries)
    }

    async fn persist(&self, entries: &HashMap<String, String>) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent).await.map_err(|e| {
                MomentError::store(format!("Failed to create store directory: {}", e))
            })?;
        }

        let content = serde_json::to_string_pretty(entries)?;
        tokio::fs::write(&self.path, content).await.map_err(|e| {
            MomentError::store(format!("Failed to write store file {:?}: {}", self.path, e))
        })?;

        *self.cache.write().await = Some(entries.clone());
        Ok(())
    }
}

#[async_trait]
impl KeyValueStore for JsonFileKeyValueStore {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.load_entries().await?.get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> Result<()> {
        let mut entries = self.load_entries().await?;
        entries.insert(key.to_string(), value.to_string());
        self.persist(&entries).await
    }

    async fn remove(&self, key: &str) -> Result<()> {
        let mut entries = self.load_entries().await?;
        if entries.remove(key).is_some() {
            self.persist(&entries).await?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_memory_store_set_get_remove() {
        let store = MemoryKeyValueStore::new();

        assert_eq!(store.get("user:uuid").await.unwrap(), None);

        store.set("user:uuid", "u-1").await.unwrap();
        assert_eq!(
            store.get("user:uuid").await.unwrap(),
            Some("u-1".to_string())
        );

        store.remove("user:uuid").await.unwrap();
        assert_eq!(store.get("user:uuid").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_file_store_missing_file_reads_empty() {
        let temp_dir = TempDir::new().unwrap();
        let store = JsonFileKeyValueStore::new(temp_dir.path().join("store.json"));

        assert_eq!(store.get("anything").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_file_store_persists_across_instances() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("store.json");

        {
            let store = JsonFileKeyValueStore::new(&path);
            store.set("user:uuid", "u-1").await.unwrap();
            store.set("user:loginAt", "1700000000000").await.unwrap();
        }

        let reopened = JsonFileKeyValueStore::new(&path);
        assert_eq!(
            reopened.get("user:uuid").await.unwrap(),
            Some("u-1".to_string())
        );
        assert_eq!(
            reopened.get("user:loginAt").await.unwrap(),
            Some("1700000000000".to_string())
        );
    }

    #[tokio::test]
    async fn test_file_store_remove_absent_key_is_ok() {
        let temp_dir = TempDir::new().unwrap();
        let store = JsonFileKeyValueStore::new(temp_dir.path().join("store.json"));

        store.remove("user:linkId").await.unwrap();
    }
}
