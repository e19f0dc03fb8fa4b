/// RSVP State Store
///
/// Pure data access over the persisted `{ identity: record }` object. Writes
/// read-modify-write the whole object and keep entries they do not touch
/// verbatim, including ones this version cannot decode.
use crate::{
    clock::Clock,
    kv_store::PersistentStore,
    rsvp::{RsvpRecord, RsvpStatus},
};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, error};

/// Clones share one write lock, so the tick job and user operations never
/// interleave their read-modify-write cycles.
#[derive(Clone)]
pub struct RsvpStore {
    store: PersistentStore,
    key: String,
    clock: Arc<dyn Clock>,
    write_lock: Arc<Mutex<()>>,
}

impl RsvpStore {
    pub fn new(store: PersistentStore, key: impl Into<String>, clock: Arc<dyn Clock>) -> Self {
        Self {
            store,
            key: key.into(),
            clock,
            write_lock: Arc::new(Mutex::new(())),
        }
    }

    /// All decodable records, keyed by identity
    pub async fn get_all(&self) -> BTreeMap<String, RsvpRecord> {
        let raw = self.store.get_map(&self.key).await;

        raw.into_iter()
            .filter_map(|(identity, value)| decode_record(&identity, value).map(|r| (identity, r)))
            .collect()
    }

    pub async fn get_record(&self, identity: &str) -> Option<RsvpRecord> {
        let mut raw = self.store.get_map(&self.key).await;
        raw.remove(identity)
            .and_then(|value| decode_record(identity, value))
    }

    /// Pending iff there is no record
    pub async fn get_status(&self, identity: &str) -> RsvpStatus {
        RsvpStatus::from(self.get_record(identity).await.map(|r| r.status))
    }

    /// Set a participant's status
    ///
    /// Pending deletes the record. Any other status is stored with a fresh
    /// timestamp, restarting the timer even when the status is unchanged.
    pub async fn set_status(&self, identity: &str, status: RsvpStatus) -> Option<RsvpRecord> {
        let _guard = self.write_lock.lock().await;
        let mut raw = self.store.get_map(&self.key).await;

        let record = match status.response() {
            None => {
                raw.remove(identity);
                None
            }
            Some(response) => {
                let record = RsvpRecord::new(response, self.clock.now());
                let value = encode_record(identity, &record)?;
                raw.insert(identity.to_string(), value);
                Some(record)
            }
        };

        self.store.set_map(&self.key, &raw).await;
        debug!("RSVP for {} set to {}", identity, status.as_str());

        record
    }

    /// Clear every record
    ///
    /// Returns how many records were present.
    pub async fn reset_all(&self) -> usize {
        let _guard = self.write_lock.lock().await;
        let cleared = self.store.get_map(&self.key).await.len();
        self.store.set_map(&self.key, &Map::new()).await;
        cleared
    }

    /// Remove every decodable record matching the predicate in a single write
    ///
    /// The predicate sees the same snapshot that is written back. Nothing is
    /// written when no record matches.
    pub async fn remove_where<F>(&self, predicate: F) -> Vec<String>
    where
        F: Fn(&str, &RsvpRecord) -> bool,
    {
        let _guard = self.write_lock.lock().await;
        let mut raw = self.store.get_map(&self.key).await;

        let doomed: Vec<String> = raw
            .iter()
            .filter_map(|(identity, value)| {
                decode_record(identity, value.clone())
                    .filter(|record| predicate(identity.as_str(), record))
                    .map(|_| identity.clone())
            })
            .collect();

        if doomed.is_empty() {
            return doomed;
        }

        for identity in &doomed {
            raw.remove(identity);
        }
        self.store.set_map(&self.key, &raw).await;

        doomed
    }
}

fn decode_record(identity: &str, value: Value) -> Option<RsvpRecord> {
    match serde_json::from_value::<RsvpRecord>(value) {
        Ok(record) => Some(record),
        Err(e) => {
            debug!("Skipping malformed RSVP entry for {}: {}", identity, e);
            None
        }
    }
}

fn encode_record(identity: &str, record: &RsvpRecord) -> Option<Value> {
    match serde_json::to_value(record) {
        Ok(value) => Some(value),
        Err(e) => {
            error!("Failed to encode RSVP for {}: {}", identity, e);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::kv_store::{KvBackend, MemoryKvBackend};
    use crate::rsvp::Response;
    use chrono::{Duration, TimeZone, Utc};

    fn setup() -> (RsvpStore, Arc<ManualClock>, MemoryKvBackend) {
        let backend = MemoryKvBackend::new();
        let clock = Arc::new(ManualClock::new(
            Utc.timestamp_millis_opt(1_700_000_000_000).unwrap(),
        ));
        let store = RsvpStore::new(
            PersistentStore::new(Arc::new(backend.clone())),
            "rsvp_records_v2",
            clock.clone(),
        );
        (store, clock, backend)
    }

    #[tokio::test]
    async fn test_pending_when_no_record() {
        let (store, _, _) = setup();
        assert_eq!(store.get_status("froska").await, RsvpStatus::Pending);
        assert!(store.get_all().await.is_empty());
    }

    #[tokio::test]
    async fn test_set_coming_creates_record() {
        let (store, clock, _) = setup();

        let record = store.set_status("froska", RsvpStatus::Coming).await.unwrap();
        assert_eq!(record.status, Response::Coming);
        assert_eq!(record.created_at, clock.now());
        assert_eq!(store.get_status("froska").await, RsvpStatus::Coming);
    }

    #[tokio::test]
    async fn test_reconfirming_resets_timer() {
        let (store, clock, _) = setup();

        store.set_status("m9re", RsvpStatus::Coming).await;
        clock.advance(Duration::hours(3));
        store.set_status("m9re", RsvpStatus::Coming).await;

        let record = store.get_record("m9re").await.unwrap();
        assert_eq!(record.created_at, clock.now());
    }

    #[tokio::test]
    async fn test_pending_removes_record() {
        let (store, _, _) = setup();

        store.set_status("m9re", RsvpStatus::NotComing).await;
        assert!(store.set_status("m9re", RsvpStatus::Pending).await.is_none());

        assert!(store.get_record("m9re").await.is_none());
        assert_eq!(store.get_status("m9re").await, RsvpStatus::Pending);
    }

    #[tokio::test]
    async fn test_reset_all_clears_everything() {
        let (store, _, _) = setup();

        store.set_status("a", RsvpStatus::Coming).await;
        store.set_status("b", RsvpStatus::NotComing).await;

        assert_eq!(store.reset_all().await, 2);
        assert!(store.get_all().await.is_empty());
    }

    #[tokio::test]
    async fn test_malformed_entries_are_skipped_but_kept() {
        let (store, _, backend) = setup();
        backend
            .put(
                "rsvp_records_v2",
                r#"{"ghost": {"status": "coming"}, "m9re": {"status": "coming", "timestamp": 1700000000000}}"#
                    .to_string(),
            )
            .await
            .unwrap();

        let all = store.get_all().await;
        assert_eq!(all.len(), 1);
        assert!(all.contains_key("m9re"));
        assert_eq!(store.get_status("ghost").await, RsvpStatus::Pending);

        store.set_status("froska", RsvpStatus::Coming).await;
        let raw = backend.get("rsvp_records_v2").await.unwrap().unwrap();
        assert!(raw.contains("ghost"));
    }

    #[tokio::test]
    async fn test_remove_where_only_writes_on_match() {
        let (store, _, backend) = setup();

        store.set_status("a", RsvpStatus::Coming).await;
        store.set_status("b", RsvpStatus::NotComing).await;

        let removed = store
            .remove_where(|_, record| record.status == Response::NotComing)
            .await;
        assert_eq!(removed, vec!["b".to_string()]);
        assert_eq!(store.get_all().await.len(), 1);

        backend.put("rsvp_records_v2", "{broken".to_string()).await.unwrap();
        let removed = store.remove_where(|_, _| true).await;
        assert!(removed.is_empty());
        assert_eq!(
            backend.get("rsvp_records_v2").await.unwrap().as_deref(),
            Some("{broken")
        );
    }
}
