/// In-process key/value backend
use crate::{error::RsvpResult, kv_store::KvBackend};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Memory storage backend
///
/// Nothing survives the process. Clones share the same map, which makes it
/// handy for simulating two tabs over one store.
#[derive(Clone, Default)]
pub struct MemoryKvBackend {
    values: Arc<RwLock<HashMap<String, String>>>,
}

impl MemoryKvBackend {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl KvBackend for MemoryKvBackend {
    async fn get(&self, key: &str) -> RsvpResult<Option<String>> {
        Ok(self.values.read().await.get(key).cloned())
    }

    async fn put(&self, key: &str, value: String) -> RsvpResult<()> {
        self.values.write().await.insert(key.to_string(), value);
        Ok(())
    }

    async fn remove(&self, key: &str) -> RsvpResult<()> {
        self.values.write().await.remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_clones_share_state() {
        let first = MemoryKvBackend::new();
        let second = first.clone();

        first.put("k", "v".to_string()).await.unwrap();
        assert_eq!(second.get("k").await.unwrap().as_deref(), Some("v"));

        second.remove("k").await.unwrap();
        assert_eq!(first.get("k").await.unwrap(), None);
    }
}
