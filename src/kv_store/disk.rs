/// Disk-based key/value backend
use crate::{
    error::{RsvpError, RsvpResult},
    kv_store::KvBackend,
};
use async_trait::async_trait;
use std::path::PathBuf;
use tokio::fs;
use uuid::Uuid;

/// Disk storage backend
///
/// Stores each key as its own file under the base directory. Writes go to a
/// temporary sibling first and are renamed into place, so readers never see a
/// half-written value.
#[derive(Clone)]
pub struct DiskKvBackend {
    base_path: PathBuf,
}

impl DiskKvBackend {
    /// Create a new disk storage backend
    pub fn new(base_path: PathBuf) -> Self {
        Self { base_path }
    }

    /// Get the file path for a key
    ///
    /// Anything outside `[A-Za-z0-9_-]` becomes `_` so a key can never escape
    /// the base directory.
    fn get_value_path(&self, key: &str) -> PathBuf {
        let file_name: String = key
            .chars()
            .map(|c| {
                if c.is_ascii_alphanumeric() || c == '_' || c == '-' {
                    c
                } else {
                    '_'
                }
            })
            .collect();
        let file_name = if file_name.is_empty() {
            "_".to_string()
        } else {
            file_name
        };

        self.base_path.join(format!("{}.json", file_name))
    }

    async fn ensure_base_dir(&self) -> RsvpResult<()> {
        fs::create_dir_all(&self.base_path).await.map_err(|e| {
            RsvpError::Storage(format!("Failed to create storage directory: {}", e))
        })
    }
}

#[async_trait]
impl KvBackend for DiskKvBackend {
    async fn get(&self, key: &str) -> RsvpResult<Option<String>> {
        let path = self.get_value_path(key);

        match fs::read_to_string(&path).await {
            Ok(value) => Ok(Some(value)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(RsvpError::Storage(format!(
                "Failed to read key {}: {}",
                key, e
            ))),
        }
    }

    async fn put(&self, key: &str, value: String) -> RsvpResult<()> {
        self.ensure_base_dir().await?;

        let path = self.get_value_path(key);
        // Unique per write so concurrent puts never rename each other's file
        let tmp_path = path.with_extension(format!("{}.tmp", Uuid::new_v4().simple()));

        fs::write(&tmp_path, value).await.map_err(|e| {
            RsvpError::Storage(format!("Failed to write key {}: {}", key, e))
        })?;

        fs::rename(&tmp_path, &path).await.map_err(|e| {
            RsvpError::Storage(format!("Failed to commit key {}: {}", key, e))
        })?;

        Ok(())
    }

    async fn remove(&self, key: &str) -> RsvpResult<()> {
        let path = self.get_value_path(key);

        match fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(RsvpError::Storage(format!(
                "Failed to remove key {}: {}",
                key, e
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[tokio::test]
    async fn test_put_and_get_value() {
        let dir = tempdir().unwrap();
        let backend = DiskKvBackend::new(dir.path().to_path_buf());

        backend
            .put("rsvp_records_v2", "{\"a\":1}".to_string())
            .await
            .unwrap();

        let value = backend.get("rsvp_records_v2").await.unwrap();
        assert_eq!(value.as_deref(), Some("{\"a\":1}"));
    }

    #[tokio::test]
    async fn test_get_missing_key() {
        let dir = tempdir().unwrap();
        let backend = DiskKvBackend::new(dir.path().to_path_buf());

        assert_eq!(backend.get("nothing").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_remove_value() {
        let dir = tempdir().unwrap();
        let backend = DiskKvBackend::new(dir.path().to_path_buf());

        backend.put("rsvp_session", "froska".to_string()).await.unwrap();
        backend.remove("rsvp_session").await.unwrap();
        assert_eq!(backend.get("rsvp_session").await.unwrap(), None);

        // Removing twice is fine
        backend.remove("rsvp_session").await.unwrap();
    }

    #[tokio::test]
    async fn test_creates_missing_directory() {
        let dir = tempdir().unwrap();
        let nested = dir.path().join("nested").join("store");
        let backend = DiskKvBackend::new(nested.clone());

        backend.put("k", "v".to_string()).await.unwrap();
        assert!(nested.join("k.json").exists());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_puts_on_one_key_all_commit() {
        let dir = tempdir().unwrap();
        let backend = DiskKvBackend::new(dir.path().to_path_buf());

        let writes = (0..16).map(|i| {
            let backend = backend.clone();
            tokio::spawn(async move { backend.put("rsvp_records_v2", format!("{{\"n\":{}}}", i)).await })
        });
        for write in writes.collect::<Vec<_>>() {
            write.await.unwrap().unwrap();
        }

        let value = backend.get("rsvp_records_v2").await.unwrap().unwrap();
        assert!(value.starts_with("{\"n\":"));

        let leftovers = std::fs::read_dir(dir.path())
            .unwrap()
            .filter(|entry| {
                entry
                    .as_ref()
                    .map(|e| e.path().extension().map_or(false, |ext| ext == "tmp"))
                    .unwrap_or(false)
            })
            .count();
        assert_eq!(leftovers, 0);
    }

    #[test]
    fn test_key_cannot_escape_base_dir() {
        let backend = DiskKvBackend::new(PathBuf::from("/tmp/base"));
        let path = backend.get_value_path("../etc/passwd");

        assert_eq!(path, PathBuf::from("/tmp/base/___etc_passwd.json"));
    }
}
