/// Key/Value Storage System
///
/// Durable local storage for the board's three persisted blobs: the session
/// identity, the RSVP records and the custom avatar images. Values are whole
/// strings; callers read-modify-write them.

pub mod disk;
pub mod memory;
pub mod store;

pub use disk::DiskKvBackend;
pub use memory::MemoryKvBackend;
pub use store::PersistentStore;

use crate::error::RsvpResult;
use async_trait::async_trait;

/// Key/value backend trait
///
/// Implementations handle the raw storage of string values by key.
#[async_trait]
pub trait KvBackend: Send + Sync {
    /// Read the raw value stored under a key
    async fn get(&self, key: &str) -> RsvpResult<Option<String>>;

    /// Overwrite the value stored under a key
    async fn put(&self, key: &str, value: String) -> RsvpResult<()>;

    /// Remove a key; missing keys are not an error
    async fn remove(&self, key: &str) -> RsvpResult<()>;
}
