/// Application context and dependency injection
use crate::{
    account::AccountDirectory,
    admin::RsvpAdmin,
    auth::SessionGate,
    avatar::{AvatarCatalog, AvatarOverrideStore, AvatarResolver},
    board::Redisplay,
    clock::{Clock, SystemClock},
    config::{AppConfig, StorageBackendConfig},
    error::{RsvpError, RsvpResult},
    kv_store::{DiskKvBackend, KvBackend, MemoryKvBackend, PersistentStore},
    rsvp::{ExpiryReconciler, RsvpStore, StatusAggregator},
};
use std::sync::Arc;
use tokio::sync::broadcast;

/// Buffered redisplay signals per subscriber before the oldest are dropped
const REDISPLAY_CHANNEL_CAPACITY: usize = 64;

/// Application context holding all shared services
#[derive(Clone)]
pub struct AppContext {
    pub config: Arc<AppConfig>,
    pub clock: Arc<dyn Clock>,
    pub directory: Arc<AccountDirectory>,
    pub store: PersistentStore,
    // RSVP state
    pub records: RsvpStore,
    pub reconciler: ExpiryReconciler,
    pub aggregator: StatusAggregator,
    // Avatars
    pub avatars: AvatarResolver,
    // Sessions & admin
    pub sessions: SessionGate,
    pub admin: RsvpAdmin,
    // Redisplay signals for the renderer
    pub redisplay: broadcast::Sender<Redisplay>,
}

impl AppContext {
    /// Create a new application context from configuration
    pub async fn new(config: AppConfig) -> RsvpResult<Self> {
        // Validate configuration
        config.validate()?;

        // Create data directories if they don't exist
        Self::ensure_directories(&config).await?;

        // Load the account directory once; it never changes at runtime
        let directory = AccountDirectory::load(&config.storage.roster_path).await?;

        let backend: Arc<dyn KvBackend> = match &config.storage.backend {
            StorageBackendConfig::Disk { location } => {
                tracing::info!("Using disk storage at {}", location.display());
                Arc::new(DiskKvBackend::new(location.clone()))
            }
            StorageBackendConfig::Memory => {
                tracing::info!("Using in-memory storage; nothing will survive a restart");
                Arc::new(MemoryKvBackend::new())
            }
        };

        Self::with_parts(config, directory, backend, Arc::new(SystemClock))
    }

    /// Wire the services from already-built parts
    pub fn with_parts(
        config: AppConfig,
        directory: AccountDirectory,
        backend: Arc<dyn KvBackend>,
        clock: Arc<dyn Clock>,
    ) -> RsvpResult<Self> {
        config.validate()?;

        let directory = Arc::new(directory);
        let store = PersistentStore::new(backend);

        let (redisplay, _) = broadcast::channel(REDISPLAY_CHANNEL_CAPACITY);

        let records = RsvpStore::new(store.clone(), config.keys.records.clone(), clock.clone());
        let reconciler = ExpiryReconciler::new(
            records.clone(),
            clock.clone(),
            config.rsvp.reset_interval(),
        )
        .with_notifier(redisplay.clone());
        let aggregator = StatusAggregator::new(
            directory.clone(),
            records.clone(),
            reconciler.clone(),
            config.rsvp.sweep_on_read,
        );

        let overrides = AvatarOverrideStore::new(store.clone(), config.keys.custom_images.clone());
        let avatars = AvatarResolver::new(Arc::new(AvatarCatalog::default()), overrides);

        let sessions = SessionGate::new(
            directory.clone(),
            store.clone(),
            config.keys.session.clone(),
            clock.clone(),
        );
        let admin = RsvpAdmin::new(records.clone(), aggregator.clone(), sessions.clone());

        Ok(Self {
            config: Arc::new(config),
            clock,
            directory,
            store,
            records,
            reconciler,
            aggregator,
            avatars,
            sessions,
            admin,
            redisplay,
        })
    }

    /// Tell every subscriber that dependent views need recomputing
    pub fn notify(&self, signal: Redisplay) {
        // No subscribers is fine; the next view() call picks up the change
        if let Err(e) = self.redisplay.send(signal) {
            tracing::trace!("Redisplay signal dropped: {:?}", e.0);
        }
    }

    /// Ensure required directories exist
    async fn ensure_directories(config: &AppConfig) -> RsvpResult<()> {
        let mut dirs = vec![&config.storage.data_directory];
        if let StorageBackendConfig::Disk { location } = &config.storage.backend {
            dirs.push(location);
        }

        for dir in dirs {
            if !dir.exists() {
                tokio::fs::create_dir_all(dir).await.map_err(|e| {
                    RsvpError::Storage(format!("Failed to create directory {:?}: {}", dir, e))
                })?;
            }
        }

        Ok(())
    }
}
