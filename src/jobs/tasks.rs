/// Background task implementations
use crate::{context::AppContext, rsvp::SweepOutcome};

/// Evict every RSVP whose timer has run out
pub async fn sweep_expired_rsvps(ctx: &AppContext) -> SweepOutcome {
    ctx.reconciler.sweep().await
}
