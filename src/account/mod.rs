/// Account directory
///
/// The fixed roster of participants. Loaded once at startup and read-only for
/// the lifetime of the process.

mod directory;

pub use directory::AccountDirectory;

use crate::{admin::Role, avatar::AvatarCategory};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Roster participant
#[derive(Clone, PartialEq, Eq)]
pub struct Account {
    pub identity: String,
    credential: String,
    /// Label shown under the avatar, e.g. "Smoking Wolf"
    pub display_name: String,
    pub category: AvatarCategory,
    pub role: Role,
    pub can_upload_image: bool,
}

impl Account {
    pub fn new(
        identity: impl Into<String>,
        credential: impl Into<String>,
        display_name: impl Into<String>,
        role: Role,
        can_upload_image: bool,
    ) -> Self {
        let display_name = display_name.into();
        Self {
            identity: identity.into(),
            credential: credential.into(),
            category: AvatarCategory::from_display_name(&display_name),
            display_name,
            role,
            can_upload_image,
        }
    }

    /// Plain equality check; there is no security model behind it
    pub fn verify_credential(&self, supplied: &str) -> bool {
        self.credential == supplied
    }

    pub fn is_admin(&self) -> bool {
        self.role.is_admin()
    }
}

impl fmt::Debug for Account {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Account")
            .field("identity", &self.identity)
            .field("credential", &"<redacted>")
            .field("display_name", &self.display_name)
            .field("category", &self.category)
            .field("role", &self.role)
            .field("can_upload_image", &self.can_upload_image)
            .finish()
    }
}

/// One roster entry as written in the directory file
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RosterEntry {
    pub password: String,
    pub animal: String,
    #[serde(default)]
    pub is_admin: bool,
    #[serde(default)]
    pub can_upload_image: bool,
}

impl RosterEntry {
    pub fn into_account(self, identity: String) -> Account {
        Account::new(
            identity,
            self.password,
            self.animal,
            Role::from_admin_flag(self.is_admin),
            self.can_upload_image,
        )
    }
}
