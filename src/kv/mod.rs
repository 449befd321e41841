// Key-value backend
//
// The stores persist each collection as one serialized JSON value under a
// single string key. The backend is a black-box get/set; Redis is used when
// configured, otherwise a process-local map.

pub mod memory_store;
pub mod redis_store;

pub use memory_store::MemoryKvStore;
pub use redis_store::RedisKvStore;

use async_trait::async_trait;
use std::sync::Arc;

/// Errors raised by a key-value backend
#[derive(Debug, thiserror::Error)]
pub enum KvError {
    #[error("redis error: {0}")]
    Redis(#[from] redis::RedisError),

    #[error("backend unavailable: {0}")]
    Unavailable(String),
}

/// String get/set over one keyspace
#[async_trait]
pub trait KvStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<String>, KvError>;

    async fn set(&self, key: &str, value: &str) -> Result<(), KvError>;

    /// Short backend name for logs
    fn backend(&self) -> &'static str;
}

/// Connect to Redis when a URL is configured, otherwise use memory
pub async fn connect(redis_url: Option<&str>) -> Result<Arc<dyn KvStore>, KvError> {
    match redis_url {
        Some(url) => {
            tracing::info!("Initializing Redis key-value store");
            let store = RedisKvStore::connect(url).await?;
            Ok(Arc::new(store))
        }
        None => {
            tracing::warn!("REDIS_URL not set: using in-memory store, data is lost on restart");
            Ok(Arc::new(MemoryKvStore::new()))
        }
    }
}

/// Decode a stored JSON list
///
/// A missing key is an empty list. A value that does not parse as a list is
/// also treated as empty so a corrupted entry never blocks a read path.
/// Entries that do not decode are dropped one by one; the rest are kept.
pub fn decode_list<T>(key: &str, raw: Option<String>) -> Vec<T>
where
    T: serde::de::DeserializeOwned,
{
    let Some(raw) = raw else {
        return Vec::new();
    };
    let entries = match serde_json::from_str::<Vec<serde_json::Value>>(&raw) {
        Ok(entries) => entries,
        Err(e) => {
            tracing::warn!("Discarding unparseable value under '{}': {}", key, e);
            return Vec::new();
        }
    };

    entries
        .into_iter()
        .enumerate()
        .filter_map(|(index, entry)| match serde_json::from_value(entry) {
            Ok(item) => Some(item),
            Err(e) => {
                tracing::warn!("Skipping entry {} under '{}': {}", index, key, e);
                None
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_missing_is_empty() {
        let list: Vec<u32> = decode_list("k", None);
        assert!(list.is_empty());
    }

    #[test]
    fn test_decode_garbage_is_empty() {
        let list: Vec<u32> = decode_list("k", Some("{not json".to_string()));
        assert!(list.is_empty());
        let list: Vec<u32> = decode_list("k", Some("{\"a\":1}".to_string()));
        assert!(list.is_empty());
    }

    #[test]
    fn test_decode_keeps_valid_entries() {
        let list: Vec<u32> = decode_list("k", Some("[1,\"two\",3,-4]".to_string()));
        assert_eq!(list, vec![1, 3]);
    }

    #[test]
    fn test_decode_list() {
        let list: Vec<u32> = decode_list("k", Some("[1,2,3]".to_string()));
        assert_eq!(list, vec![1, 2, 3]);
    }
}
