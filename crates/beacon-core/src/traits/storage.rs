//! Durable key/value storage trait.

use async_trait::async_trait;

use crate::result::AppResult;

/// Trait for durable key/value storage backends.
///
/// All values are serialized as strings (JSON). Corrupt or missing data is
/// never an error at the call sites of the delivery core; readers fall
/// back to fixed defaults.
#[async_trait]
pub trait KvStorage: Send + Sync + std::fmt::Debug + 'static {
    /// Get a value by key. Returns `None` if the key does not exist.
    async fn get(&self, key: &str) -> AppResult<Option<String>>;

    /// Set a value, overwriting any previous one.
    async fn set(&self, key: &str, value: &str) -> AppResult<()>;

    /// Remove a key.
    async fn remove(&self, key: &str) -> AppResult<()>;

    /// Get a typed value by deserializing from JSON.
    async fn get_json<T: serde::de::DeserializeOwned + Send>(
        &self,
        key: &str,
    ) -> AppResult<Option<T>>
    where
        Self: Sized,
    {
        match self.get(key).await? {
            Some(value) => {
                let parsed = serde_json::from_str(&value)?;
                Ok(Some(parsed))
            }
            None => Ok(None),
        }
    }

    /// Set a typed value by serializing to JSON.
    async fn set_json<T: serde::Serialize + Send + Sync>(
        &self,
        key: &str,
        value: &T,
    ) -> AppResult<()>
    where
        Self: Sized,
    {
        let json = serde_json::to_string(value)?;
        self.set(key, &json).await
    }
}
