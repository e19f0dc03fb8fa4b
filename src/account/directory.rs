/// Account directory lookups and loading
use crate::{
    account::{Account, RosterEntry},
    error::{RsvpError, RsvpResult},
};
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::path::Path;

/// Immutable, ordered set of accounts
#[derive(Debug, Clone)]
pub struct AccountDirectory {
    accounts: Vec<Account>,
    index: HashMap<String, usize>,
}

impl AccountDirectory {
    /// Build a directory, rejecting empty or duplicate identities
    pub fn new(accounts: Vec<Account>) -> RsvpResult<Self> {
        let mut index = HashMap::with_capacity(accounts.len());

        for (position, account) in accounts.iter().enumerate() {
            if account.identity.is_empty() {
                return Err(RsvpError::Roster("Identity cannot be empty".to_string()));
            }
            if index.insert(account.identity.clone(), position).is_some() {
                return Err(RsvpError::Roster(format!(
                    "Duplicate identity: {}",
                    account.identity
                )));
            }
        }

        Ok(Self { accounts, index })
    }

    /// Parse the roster file format: an object keyed by identity
    ///
    /// Entries keep the order they appear in the file.
    pub fn from_json_str(raw: &str) -> RsvpResult<Self> {
        let entries: Map<String, Value> = serde_json::from_str(raw)
            .map_err(|e| RsvpError::Roster(format!("Invalid roster file: {}", e)))?;

        let mut accounts = Vec::with_capacity(entries.len());
        for (identity, value) in entries {
            let entry: RosterEntry = serde_json::from_value(value).map_err(|e| {
                RsvpError::Roster(format!("Invalid roster entry {}: {}", identity, e))
            })?;
            accounts.push(entry.into_account(identity));
        }

        Self::new(accounts)
    }

    /// Load the roster file from disk
    pub async fn load(path: &Path) -> RsvpResult<Self> {
        let raw = tokio::fs::read_to_string(path).await.map_err(|e| {
            RsvpError::Roster(format!("Failed to read roster {}: {}", path.display(), e))
        })?;

        let directory = Self::from_json_str(&raw)?;
        tracing::info!(
            "Loaded {} accounts from {}",
            directory.len(),
            path.display()
        );

        Ok(directory)
    }

    pub fn get(&self, identity: &str) -> Option<&Account> {
        self.index.get(identity).map(|&i| &self.accounts[i])
    }

    /// Accounts in roster order
    pub fn iter(&self) -> impl Iterator<Item = &Account> {
        self.accounts.iter()
    }

    pub fn len(&self) -> usize {
        self.accounts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.accounts.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{admin::Role, avatar::AvatarCategory};

    const ROSTER: &str = r#"{
        "al5ya6": { "password": "5759", "animal": "Sloth", "isWolf": false, "canUploadImage": true },
        "shded alba's": { "password": "6969", "animal": "Lion", "canUploadImage": false },
        "ktoosh": { "password": "1195", "animal": "Smoking Wolf", "isAdmin": true, "isWolf": true }
    }"#;

    #[test]
    fn test_parse_roster_keeps_order() {
        let directory = AccountDirectory::from_json_str(ROSTER).unwrap();

        let identities: Vec<&str> = directory.iter().map(|a| a.identity.as_str()).collect();
        assert_eq!(identities, vec!["al5ya6", "shded alba's", "ktoosh"]);
        assert_eq!(directory.len(), 3);
    }

    #[test]
    fn test_parse_roster_fields() {
        let directory = AccountDirectory::from_json_str(ROSTER).unwrap();

        let sloth = directory.get("al5ya6").unwrap();
        assert_eq!(sloth.category, AvatarCategory::Sloth);
        assert!(sloth.can_upload_image);
        assert_eq!(sloth.role, Role::Member);
        assert!(sloth.verify_credential("5759"));
        assert!(!sloth.verify_credential("0000"));

        let wolf = directory.get("ktoosh").unwrap();
        assert_eq!(wolf.category, AvatarCategory::Wolf);
        assert!(wolf.is_admin());
        assert!(!wolf.can_upload_image);
    }

    #[test]
    fn test_duplicate_identity_rejected() {
        let accounts = vec![
            Account::new("m9re", "1", "Alligator", Role::Member, true),
            Account::new("m9re", "2", "Skunk", Role::Member, false),
        ];

        assert!(AccountDirectory::new(accounts).is_err());
    }

    #[test]
    fn test_invalid_entry_rejected() {
        let raw = r#"{ "froska": { "animal": "Skunk" } }"#;
        let err = AccountDirectory::from_json_str(raw).unwrap_err();
        assert!(err.to_string().contains("froska"));
    }

    #[test]
    fn test_debug_redacts_credential() {
        let account = Account::new("froska", "7182", "Skunk", Role::Member, true);
        let rendered = format!("{:?}", account);
        assert!(!rendered.contains("7182"));
    }

    #[tokio::test]
    async fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("roster.json");
        tokio::fs::write(&path, ROSTER).await.unwrap();

        let directory = AccountDirectory::load(&path).await.unwrap();
        assert!(directory.get("shded alba's").is_some());
        assert!(directory.get("nobody").is_none());
    }
}
