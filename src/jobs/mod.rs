use crate::board::Redisplay;
use std::sync::Arc;
use tokio::task::JoinHandle;
use tokio::time::{interval, MissedTickBehavior};
use tracing::{debug, info};

pub mod tasks;

/// Job scheduler for background tasks
pub struct JobScheduler {
    context: Arc<crate::context::AppContext>,
}

impl JobScheduler {
    pub fn new(context: Arc<crate::context::AppContext>) -> Self {
        Self { context }
    }

    /// Start all background jobs
    ///
    /// The jobs run until their handles are aborted or the runtime shuts down.
    pub fn start(self: Arc<Self>) -> Vec<JoinHandle<()>> {
        info!("Starting background job scheduler");

        let handles = vec![tokio::spawn(Self::expiry_sweep_job(Arc::clone(&self)))];

        info!("Background jobs started");
        handles
    }

    /// Evict expired RSVPs and refresh timers (runs every tick, 1s by default)
    async fn expiry_sweep_job(scheduler: Arc<Self>) {
        let period = scheduler.context.config.rsvp.tick_interval();
        let mut interval = interval(period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

        debug!("Expiry sweep running every {:?}", period);

        loop {
            interval.tick().await;

            // The reconciler itself signals TimersExpired on eviction
            let outcome = tasks::sweep_expired_rsvps(&scheduler.context).await;
            if outcome.changed() {
                info!("Expired {} RSVP(s)", outcome.expired.len());
            }

            // Countdown displays change every tick even when nothing expired
            scheduler.context.notify(Redisplay::Tick);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::account::AccountDirectory;
    use crate::clock::ManualClock;
    use crate::config::AppConfig;
    use crate::context::AppContext;
    use crate::kv_store::MemoryKvBackend;
    use crate::rsvp::RsvpStatus;
    use chrono::{Duration, TimeZone, Utc};

    #[tokio::test]
    async fn test_sweep_job_signals_expiry() {
        let clock = Arc::new(ManualClock::new(
            Utc.timestamp_millis_opt(1_700_000_000_000).unwrap(),
        ));
        let mut config = AppConfig::default();
        config.rsvp.tick_interval_ms = 10;
        config.rsvp.sweep_on_read = false;

        let ctx = Arc::new(
            AppContext::with_parts(
                config,
                AccountDirectory::from_json_str(
                    r#"{ "froska": { "password": "7182", "animal": "Skunk" } }"#,
                )
                .unwrap(),
                Arc::new(MemoryKvBackend::new()),
                clock.clone(),
            )
            .unwrap(),
        );

        ctx.records.set_status("froska", RsvpStatus::Coming).await;
        clock.advance(Duration::hours(12));

        let mut rx = ctx.redisplay.subscribe();
        let handles = Arc::new(JobScheduler::new(ctx.clone())).start();

        let expired = tokio::time::timeout(std::time::Duration::from_secs(5), async {
            loop {
                if let Ok(Redisplay::TimersExpired(ids)) = rx.recv().await {
                    return ids;
                }
            }
        })
        .await
        .unwrap();

        assert_eq!(expired, vec!["froska".to_string()]);
        assert_eq!(ctx.records.get_status("froska").await, RsvpStatus::Pending);

        for handle in handles {
            handle.abort();
        }
    }
}
