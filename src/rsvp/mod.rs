/// Individual RSVP system
///
/// Every participant's response carries its own timer. A response that is
/// older than the reset interval is swept away and the participant goes back
/// to pending.

pub mod aggregate;
pub mod expiry;
pub mod store;

pub use aggregate::{RosterCounts, RosterMember, StatusAggregator};
pub use expiry::{ExpiryReconciler, SweepOutcome, TimeRemaining};
pub use store::RsvpStore;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Status a participant can be in
///
/// `Pending` is never stored: it is the absence of a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RsvpStatus {
    Coming,
    NotComing,
    Pending,
}

impl RsvpStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            RsvpStatus::Coming => "coming",
            RsvpStatus::NotComing => "not-coming",
            RsvpStatus::Pending => "pending",
        }
    }

    /// Roster label
    pub fn label(&self) -> &'static str {
        match self {
            RsvpStatus::Coming => "Coming",
            RsvpStatus::NotComing => "Not Coming",
            RsvpStatus::Pending => "Pending",
        }
    }

    /// Message shown to the participant about their own response
    pub fn own_message(&self) -> &'static str {
        match self {
            RsvpStatus::Coming => "You're Coming!",
            RsvpStatus::NotComing => "You're Not Coming",
            RsvpStatus::Pending => "You haven't responded yet",
        }
    }

    /// The stored response, `None` for pending
    pub fn response(&self) -> Option<Response> {
        match self {
            RsvpStatus::Coming => Some(Response::Coming),
            RsvpStatus::NotComing => Some(Response::NotComing),
            RsvpStatus::Pending => None,
        }
    }
}

impl From<Option<Response>> for RsvpStatus {
    fn from(response: Option<Response>) -> Self {
        match response {
            Some(Response::Coming) => RsvpStatus::Coming,
            Some(Response::NotComing) => RsvpStatus::NotComing,
            None => RsvpStatus::Pending,
        }
    }
}

/// An active answer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Response {
    Coming,
    NotComing,
}

/// Stored RSVP record
///
/// Wire shape: `{ "status": "coming", "timestamp": 1700000000000 }`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RsvpRecord {
    pub status: Response,
    /// Timer origin
    #[serde(rename = "timestamp", with = "chrono::serde::ts_milliseconds")]
    pub created_at: DateTime<Utc>,
}

impl RsvpRecord {
    pub fn new(status: Response, created_at: DateTime<Utc>) -> Self {
        Self { status, created_at }
    }
}
