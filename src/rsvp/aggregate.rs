/// Status Aggregator
///
/// Derives per-participant status and roster-wide counts. Every pass is over
/// the account directory, so identities without a record count as pending and
/// records for identities outside the roster are ignored.
use crate::{
    account::AccountDirectory,
    avatar::AvatarCategory,
    rsvp::{ExpiryReconciler, RsvpStatus, RsvpStore, TimeRemaining},
};
use serde::Serialize;
use std::sync::Arc;

/// Roster-wide tallies
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RosterCounts {
    pub coming: usize,
    pub not_coming: usize,
    pub pending: usize,
}

impl RosterCounts {
    pub fn total(&self) -> usize {
        self.coming + self.not_coming + self.pending
    }
}

/// One roster row
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RosterMember {
    pub identity: String,
    pub display_name: String,
    pub category: AvatarCategory,
    pub is_admin: bool,
    pub status: RsvpStatus,
    pub time_remaining: TimeRemaining,
}

#[derive(Clone)]
pub struct StatusAggregator {
    directory: Arc<AccountDirectory>,
    records: RsvpStore,
    reconciler: ExpiryReconciler,
    sweep_on_read: bool,
}

impl StatusAggregator {
    pub fn new(
        directory: Arc<AccountDirectory>,
        records: RsvpStore,
        reconciler: ExpiryReconciler,
        sweep_on_read: bool,
    ) -> Self {
        Self {
            directory,
            records,
            reconciler,
            sweep_on_read,
        }
    }

    /// Run a sweep first when reads are configured to reconcile
    async fn reconcile(&self) {
        if self.sweep_on_read {
            self.reconciler.sweep().await;
        }
    }

    pub async fn status_of(&self, identity: &str) -> RsvpStatus {
        self.reconcile().await;
        self.records.get_status(identity).await
    }

    pub async fn time_remaining(&self, identity: &str) -> TimeRemaining {
        self.reconcile().await;
        self.reconciler.remaining(identity).await
    }

    pub async fn counts(&self) -> RosterCounts {
        self.reconcile().await;
        let records = self.records.get_all().await;

        let mut counts = RosterCounts::default();
        for account in self.directory.iter() {
            match RsvpStatus::from(records.get(&account.identity).map(|r| r.status)) {
                RsvpStatus::Coming => counts.coming += 1,
                RsvpStatus::NotComing => counts.not_coming += 1,
                RsvpStatus::Pending => counts.pending += 1,
            }
        }

        counts
    }

    /// Every participant in roster order, with status and timer
    pub async fn roster(&self) -> Vec<RosterMember> {
        self.reconcile().await;
        let records = self.records.get_all().await;

        self.directory
            .iter()
            .map(|account| {
                let record = records.get(&account.identity);
                RosterMember {
                    identity: account.identity.clone(),
                    display_name: account.display_name.clone(),
                    category: account.category,
                    is_admin: account.is_admin(),
                    status: RsvpStatus::from(record.map(|r| r.status)),
                    time_remaining: record
                        .map(|r| self.reconciler.remaining_for(r))
                        .unwrap_or(TimeRemaining::NoActiveTimer),
                }
            })
            .collect()
    }
}
