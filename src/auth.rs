/// Session and role gate
///
/// Login checks an identity and credential against the account directory. A
/// successful login persists the bare identity so the next start can restore
/// it without asking again.
use crate::{
    account::{Account, AccountDirectory},
    admin::Role,
    avatar::AvatarCategory,
    clock::Clock,
    error::{RsvpError, RsvpResult},
    kv_store::PersistentStore,
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Logged-in participant
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub session_id: String,
    pub identity: String,
    pub display_name: String,
    pub category: AvatarCategory,
    pub role: Role,
    pub can_upload_image: bool,
    pub created_at: DateTime<Utc>,
}

impl Session {
    fn for_account(account: &Account, created_at: DateTime<Utc>) -> Self {
        Self {
            session_id: Uuid::new_v4().to_string(),
            identity: account.identity.clone(),
            display_name: account.display_name.clone(),
            category: account.category,
            role: account.role,
            can_upload_image: account.can_upload_image,
            created_at,
        }
    }

    /// Drives the admin badge and the admin panel
    pub fn is_admin(&self) -> bool {
        self.role.is_admin()
    }
}

/// Require a role on a session
/// Usage: require_role!(session, Role::Admin);
#[macro_export]
macro_rules! require_role {
    ($session:expr, $required:expr) => {
        if !$session.role.can_act_as($required) {
            tracing::warn!(
                "{} attempted an action requiring the {} role",
                $session.identity,
                $required.as_str()
            );
            return Err($crate::error::RsvpError::PermissionDenied(format!(
                "Requires {} role",
                $required.as_str()
            )));
        }
    };
}

#[derive(Clone)]
pub struct SessionGate {
    directory: Arc<AccountDirectory>,
    store: PersistentStore,
    session_key: String,
    clock: Arc<dyn Clock>,
}

impl SessionGate {
    pub fn new(
        directory: Arc<AccountDirectory>,
        store: PersistentStore,
        session_key: impl Into<String>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            directory,
            store,
            session_key: session_key.into(),
            clock,
        }
    }

    /// Check credentials and persist the identity on success
    pub async fn authenticate(&self, identity: &str, credential: &str) -> RsvpResult<Session> {
        let identity = identity.trim();
        if identity.is_empty() {
            return Err(RsvpError::NoIdentitySelected);
        }

        let account = self.directory.get(identity).ok_or_else(|| {
            warn!("Login attempt for unknown participant {}", identity);
            RsvpError::UnknownIdentity(identity.to_string())
        })?;

        if !account.verify_credential(credential) {
            warn!("Failed login for {}: wrong password", identity);
            return Err(RsvpError::WrongCredential);
        }

        self.store.set_string(&self.session_key, identity).await;

        let session = Session::for_account(account, self.clock.now());
        info!(
            "{} logged in (role: {}, session: {})",
            session.identity,
            session.role.as_str(),
            session.session_id
        );

        Ok(session)
    }

    /// Rebuild the session from the persisted identity
    ///
    /// An identity that no longer names an account is discarded.
    pub async fn restore(&self) -> Option<Session> {
        let identity = self.store.get_string(&self.session_key).await?;

        match self.directory.get(&identity) {
            Some(account) => {
                info!("Restored session for {}", identity);
                Some(Session::for_account(account, self.clock.now()))
            }
            None => {
                warn!("Discarding stored session for unknown participant {}", identity);
                self.store.remove(&self.session_key).await;
                None
            }
        }
    }

    pub async fn logout(&self, session: &Session) {
        self.store.remove(&self.session_key).await;
        debug!("{} logged out", session.identity);
    }

    /// Admin-only actions check this before touching any state
    pub fn require_admin(&self, session: &Session) -> RsvpResult<()> {
        require_role!(session, Role::Admin);
        Ok(())
    }
}
