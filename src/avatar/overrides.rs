/// Per-category custom avatar images
use crate::{avatar::AvatarCategory, kv_store::PersistentStore};
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::info;

/// Custom image map persisted as `{ category: imageData }`
///
/// Does not check upload permission; callers do. Clones share one write lock.
#[derive(Clone)]
pub struct AvatarOverrideStore {
    store: PersistentStore,
    key: String,
    write_lock: Arc<Mutex<()>>,
}

impl AvatarOverrideStore {
    pub fn new(store: PersistentStore, key: impl Into<String>) -> Self {
        Self {
            store,
            key: key.into(),
            write_lock: Arc::new(Mutex::new(())),
        }
    }

    /// Override for a category; empty or non-string values count as absent
    pub async fn get(&self, category: AvatarCategory) -> Option<String> {
        let mut images = self.store.get_map(&self.key).await;
        match images.remove(category.key()) {
            Some(Value::String(data)) if !data.is_empty() => Some(data),
            _ => None,
        }
    }

    pub async fn has(&self, category: AvatarCategory) -> bool {
        self.get(category).await.is_some()
    }

    /// Every usable override, ignoring keys that are not categories
    pub async fn all(&self) -> BTreeMap<AvatarCategory, String> {
        self.store
            .get_map(&self.key)
            .await
            .into_iter()
            .filter_map(|(key, value)| match (AvatarCategory::from_key(&key), value) {
                (Some(category), Value::String(data)) if !data.is_empty() => Some((category, data)),
                _ => None,
            })
            .collect()
    }

    /// Create or overwrite the override for a category
    pub async fn save(&self, category: AvatarCategory, image_data: String) {
        let _guard = self.write_lock.lock().await;
        let mut images = self.store.get_map(&self.key).await;
        images.insert(category.key().to_string(), Value::String(image_data));
        self.store.set_map(&self.key, &images).await;

        info!("Saved custom image for {}", category);
    }

    /// Remove the override, reverting the category to its defaults
    pub async fn clear(&self, category: AvatarCategory) {
        let _guard = self.write_lock.lock().await;
        let mut images = self.store.get_map(&self.key).await;
        if images.remove(category.key()).is_some() {
            self.store.set_map(&self.key, &images).await;
            info!("Cleared custom image for {}", category);
        }
    }
}
