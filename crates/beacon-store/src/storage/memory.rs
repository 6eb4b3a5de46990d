//! In-memory key/value storage.

use async_trait::async_trait;
use dashmap::DashMap;

use beacon_core::result::AppResult;
use beacon_core::traits::storage::KvStorage;

/// In-memory storage backend, used by tests and the demo daemon.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    /// Key → serialized value.
    entries: DashMap<String, String>,
}

impl MemoryStorage {
    /// Create an empty in-memory store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored keys.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the store holds no keys.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[async_trait]
impl KvStorage for MemoryStorage {
    async fn get(&self, key: &str) -> AppResult<Option<String>> {
        Ok(self.entries.get(key).map(|e| e.value().clone()))
    }

    async fn set(&self, key: &str, value: &str) -> AppResult<()> {
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn remove(&self, key: &str) -> AppResult<()> {
        self.entries.remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_set_get() {
        let storage = MemoryStorage::new();
        storage.set("k", "v").await.unwrap();
        assert_eq!(storage.get("k").await.unwrap(), Some("v".to_string()));
    }

    #[tokio::test]
    async fn test_remove() {
        let storage = MemoryStorage::new();
        storage.set("k", "v").await.unwrap();
        storage.remove("k").await.unwrap();
        assert_eq!(storage.get("k").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_json_roundtrip() {
        let storage = MemoryStorage::new();
        let data = serde_json::json!({"enabled": true, "count": 3});
        storage.set_json("json_key", &data).await.unwrap();
        let result: Option<serde_json::Value> = storage.get_json("json_key").await.unwrap();
        assert_eq!(result, Some(data));
    }
}
