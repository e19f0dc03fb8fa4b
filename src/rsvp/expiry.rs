/// Expiry Reconciler
///
/// Sweeps RSVP records whose timer ran out. Eviction is the only way out of
/// the active state, and it needs no user action.
use crate::{
    board::Redisplay,
    clock::Clock,
    rsvp::{RsvpRecord, RsvpStore},
};
use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use std::fmt;
use std::sync::Arc;
use tokio::sync::broadcast;
use tracing::{info, trace};

/// Result of one sweep
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SweepOutcome {
    /// Identities whose records were evicted, in key order
    pub expired: Vec<String>,
}

impl SweepOutcome {
    /// Whether dependent views need recomputing
    pub fn changed(&self) -> bool {
        !self.expired.is_empty()
    }
}

/// Time left on a participant's timer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "camelCase")]
pub enum TimeRemaining {
    Active { hours: i64, minutes: i64, seconds: i64 },
    /// Deadline passed but the next sweep has not run yet
    Expired,
    NoActiveTimer,
}

impl TimeRemaining {
    /// Split `interval - (now - created_at)` into whole hours, minutes and seconds
    pub fn compute(created_at: DateTime<Utc>, now: DateTime<Utc>, interval: Duration) -> Self {
        let remaining_ms = (interval - (now - created_at)).num_milliseconds();

        if remaining_ms <= 0 {
            return TimeRemaining::Expired;
        }

        TimeRemaining::Active {
            hours: remaining_ms / (1000 * 60 * 60),
            minutes: (remaining_ms % (1000 * 60 * 60)) / (1000 * 60),
            seconds: (remaining_ms % (1000 * 60)) / 1000,
        }
    }

    /// Line shown on the participant's own RSVP card
    pub fn own_timer_text(&self) -> String {
        match self {
            TimeRemaining::Active { .. } => format!("Your response resets in: {}", self),
            _ => "No active timer - respond to start your 12-hour countdown".to_string(),
        }
    }
}

impl fmt::Display for TimeRemaining {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TimeRemaining::Active {
                hours,
                minutes,
                seconds,
            } => write!(f, "{:02}:{:02}:{:02}", hours, minutes, seconds),
            TimeRemaining::Expired => f.write_str("Resetting..."),
            TimeRemaining::NoActiveTimer => Ok(()),
        }
    }
}

#[derive(Clone)]
pub struct ExpiryReconciler {
    records: RsvpStore,
    clock: Arc<dyn Clock>,
    reset_interval: Duration,
    notifier: Option<broadcast::Sender<Redisplay>>,
}

impl ExpiryReconciler {
    pub fn new(records: RsvpStore, clock: Arc<dyn Clock>, reset_interval: Duration) -> Self {
        Self {
            records,
            clock,
            reset_interval,
            notifier: None,
        }
    }

    /// Send `TimersExpired` whenever a sweep evicts something, whoever ran it
    pub fn with_notifier(mut self, notifier: broadcast::Sender<Redisplay>) -> Self {
        self.notifier = Some(notifier);
        self
    }

    pub fn reset_interval(&self) -> Duration {
        self.reset_interval
    }

    /// Whether a record's timer has run out at `now`
    pub fn is_expired(&self, record: &RsvpRecord, now: DateTime<Utc>) -> bool {
        now - record.created_at >= self.reset_interval
    }

    /// Evict every record whose timer has run out
    ///
    /// With nothing to evict the store is left untouched.
    pub async fn sweep(&self) -> SweepOutcome {
        let now = self.clock.now();

        let expired = self
            .records
            .remove_where(|_, record| self.is_expired(record, now))
            .await;

        for identity in &expired {
            info!(
                "{}'s RSVP has been reset ({} hours expired)",
                identity,
                self.reset_interval.num_hours()
            );
        }

        let outcome = SweepOutcome { expired };
        if outcome.changed() {
            if let Some(notifier) = &self.notifier {
                if notifier
                    .send(Redisplay::TimersExpired(outcome.expired.clone()))
                    .is_err()
                {
                    trace!("No redisplay subscribers for expired RSVPs");
                }
            }
        }

        outcome
    }

    /// Time left for one participant
    pub async fn remaining(&self, identity: &str) -> TimeRemaining {
        match self.records.get_record(identity).await {
            Some(record) => self.remaining_for(&record),
            None => TimeRemaining::NoActiveTimer,
        }
    }

    /// Time left on a record already in hand
    pub fn remaining_for(&self, record: &RsvpRecord) -> TimeRemaining {
        TimeRemaining::compute(record.created_at, self.clock.now(), self.reset_interval)
    }
}
