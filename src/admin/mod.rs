/// Admin System
///
/// Roster-wide actions reserved for admins: clearing every response and
/// reading the aggregate counts.

pub mod roles;

pub use roles::Role;

use crate::{
    auth::{Session, SessionGate},
    error::RsvpResult,
    rsvp::{RosterCounts, RsvpStore, StatusAggregator},
};
use tracing::info;

#[derive(Clone)]
pub struct RsvpAdmin {
    records: RsvpStore,
    aggregator: StatusAggregator,
    sessions: SessionGate,
}

impl RsvpAdmin {
    pub fn new(records: RsvpStore, aggregator: StatusAggregator, sessions: SessionGate) -> Self {
        Self {
            records,
            aggregator,
            sessions,
        }
    }

    /// Clear every participant's response
    ///
    /// Non-admins get `PermissionDenied` and the records are left alone.
    pub async fn reset_all(&self, session: &Session) -> RsvpResult<usize> {
        self.sessions.require_admin(session)?;

        let cleared = self.records.reset_all().await;
        info!("{} reset all RSVPs ({} cleared)", session.identity, cleared);

        Ok(cleared)
    }

    /// Coming / not coming / pending tallies for the admin panel
    pub async fn stats(&self, session: &Session) -> RsvpResult<RosterCounts> {
        self.sessions.require_admin(session)?;

        Ok(self.aggregator.counts().await)
    }
}
