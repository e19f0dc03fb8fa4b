/// Persistent Store Adapter
///
/// Wraps a key/value backend with JSON-object semantics. Failures never leave
/// this layer: unreadable or corrupted values come back as empty state and
/// failed writes are logged.
use crate::kv_store::KvBackend;
use serde_json::{Map, Value};
use std::sync::Arc;
use tracing::{debug, error, warn};

/// Shared handle to the durable local store
#[derive(Clone)]
pub struct PersistentStore {
    backend: Arc<dyn KvBackend>,
}

impl PersistentStore {
    pub fn new(backend: Arc<dyn KvBackend>) -> Self {
        Self { backend }
    }

    /// Read a JSON object, defaulting to `{}` on absence or parse failure
    pub async fn get_map(&self, key: &str) -> Map<String, Value> {
        let raw = match self.backend.get(key).await {
            Ok(Some(raw)) => raw,
            Ok(None) => return Map::new(),
            Err(e) => {
                error!("Failed to read {}: {}", key, e);
                return Map::new();
            }
        };

        match serde_json::from_str::<Value>(&raw) {
            Ok(Value::Object(map)) => map,
            Ok(other) => {
                warn!(
                    "Stored value for {} is not an object ({}), treating as empty",
                    key,
                    json_kind(&other)
                );
                Map::new()
            }
            Err(e) => {
                warn!("Corrupted value for {}, treating as empty: {}", key, e);
                Map::new()
            }
        }
    }

    /// Overwrite the whole object stored under a key
    pub async fn set_map(&self, key: &str, map: &Map<String, Value>) {
        let raw = Value::Object(map.clone()).to_string();

        debug!("Store SET: {} ({} entries)", key, map.len());

        if let Err(e) = self.backend.put(key, raw).await {
            error!("Failed to write {}: {}", key, e);
        }
    }

    /// Read a raw string value
    pub async fn get_string(&self, key: &str) -> Option<String> {
        match self.backend.get(key).await {
            Ok(value) => value,
            Err(e) => {
                error!("Failed to read {}: {}", key, e);
                None
            }
        }
    }

    /// Overwrite a raw string value
    pub async fn set_string(&self, key: &str, value: &str) {
        if let Err(e) = self.backend.put(key, value.to_string()).await {
            error!("Failed to write {}: {}", key, e);
        }
    }

    /// Remove a key entirely
    pub async fn remove(&self, key: &str) {
        if let Err(e) = self.backend.remove(key).await {
            error!("Failed to remove {}: {}", key, e);
        }
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{RsvpError, RsvpResult};
    use crate::kv_store::MemoryKvBackend;
    use async_trait::async_trait;
    use serde_json::json;

    struct FailingBackend;

    #[async_trait]
    impl KvBackend for FailingBackend {
        async fn get(&self, _key: &str) -> RsvpResult<Option<String>> {
            Err(RsvpError::Storage("unavailable".to_string()))
        }

        async fn put(&self, _key: &str, _value: String) -> RsvpResult<()> {
            Err(RsvpError::Storage("unavailable".to_string()))
        }

        async fn remove(&self, _key: &str) -> RsvpResult<()> {
            Err(RsvpError::Storage("unavailable".to_string()))
        }
    }

    #[tokio::test]
    async fn test_missing_key_is_empty_map() {
        let store = PersistentStore::new(Arc::new(MemoryKvBackend::new()));
        assert!(store.get_map("absent").await.is_empty());
    }

    #[tokio::test]
    async fn test_set_then_get_map() {
        let store = PersistentStore::new(Arc::new(MemoryKvBackend::new()));

        let mut map = Map::new();
        map.insert("froska".to_string(), json!({"status": "coming"}));
        store.set_map("records", &map).await;

        assert_eq!(store.get_map("records").await, map);
    }

    #[tokio::test]
    async fn test_corrupted_value_recovers_as_empty() {
        let backend = MemoryKvBackend::new();
        backend.put("records", "{not json".to_string()).await.unwrap();
        let store = PersistentStore::new(Arc::new(backend));

        assert!(store.get_map("records").await.is_empty());
    }

    #[tokio::test]
    async fn test_non_object_value_recovers_as_empty() {
        let backend = MemoryKvBackend::new();
        backend.put("records", "[1, 2, 3]".to_string()).await.unwrap();
        let store = PersistentStore::new(Arc::new(backend));

        assert!(store.get_map("records").await.is_empty());
    }

    #[tokio::test]
    async fn test_backend_failures_do_not_escape() {
        let store = PersistentStore::new(Arc::new(FailingBackend));

        store.set_map("records", &Map::new()).await;
        store.set_string("session", "m9re").await;
        store.remove("session").await;

        assert!(store.get_map("records").await.is_empty());
        assert_eq!(store.get_string("session").await, None);
    }

    #[tokio::test]
    async fn test_string_roundtrip_and_remove() {
        let store = PersistentStore::new(Arc::new(MemoryKvBackend::new()));

        store.set_string("session", "ktoosh").await;
        assert_eq!(store.get_string("session").await.as_deref(), Some("ktoosh"));

        store.remove("session").await;
        assert_eq!(store.get_string("session").await, None);
    }
}
