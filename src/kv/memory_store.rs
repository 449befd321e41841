use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use super::{KvError, KvStore};

/// Process-local key-value store
///
/// Used when no Redis URL is configured and in tests. Contents live as long
/// as the process.
#[derive(Debug, Clone, Default)]
pub struct MemoryKvStore {
    entries: Arc<RwLock<HashMap<String, String>>>,
}

impl MemoryKvStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl KvStore for MemoryKvStore {
    async fn get(&self, key: &str) -> Result<Option<String>, KvError> {
        Ok(self.entries.read().await.get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), KvError> {
        self.entries
            .write()
            .await
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn backend(&self) -> &'static str {
        "memory"
    }
}
