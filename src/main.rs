/// RSVP Board
///
/// Runs the RSVP engine: loads the roster, restores any persisted session and
/// keeps sweeping expired responses until interrupted.

use rsvp_board::{
    board::{Redisplay, RsvpBoard},
    config::AppConfig,
    context::AppContext,
    error::RsvpResult,
    jobs::JobScheduler,
};
use std::sync::Arc;
use tokio::sync::broadcast::error::RecvError;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> RsvpResult<()> {
    // Load configuration first so a .env file can set the log level
    let config = AppConfig::from_env()?;

    // Initialize logging
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_new(&config.logging.level).unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Print banner
    print_banner();

    // Create application context
    let ctx = Arc::new(AppContext::new(config).await?);

    let board = RsvpBoard::new(Arc::clone(&ctx));
    if let Some(session) = board.restore_session().await {
        tracing::info!("Welcome back, {}", session.display_name);
    }

    let view = board.view().await;
    tracing::info!(
        "{} participants on the roster, {} active RSVP(s)",
        ctx.directory.len(),
        ctx.records.get_all().await.len()
    );
    if let Some(counts) = view.counts {
        tracing::info!(
            "Coming: {}, not coming: {}, pending: {}",
            counts.coming,
            counts.not_coming,
            counts.pending
        );
    }

    // Start background jobs
    let mut signals = board.subscribe();
    let scheduler = Arc::new(JobScheduler::new(Arc::clone(&ctx)));
    let handles = scheduler.start();

    let shutdown = tokio::signal::ctrl_c();
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            signal = signals.recv() => match signal {
                Ok(Redisplay::TimersExpired(identities)) => {
                    tracing::info!("Responses reset for: {}", identities.join(", "));
                }
                Ok(Redisplay::Tick) => {}
                Ok(other) => tracing::debug!("Redisplay: {:?}", other),
                Err(RecvError::Lagged(skipped)) => {
                    tracing::warn!("Missed {} redisplay signals", skipped);
                }
                Err(RecvError::Closed) => break,
            },
            _ = &mut shutdown => {
                tracing::info!("Shutting down");
                break;
            }
        }
    }

    for handle in handles {
        handle.abort();
    }

    Ok(())
}

fn print_banner() {
    println!(
        r#"
    ____  _____ _    ______     ____                      __
   / __ \/ ___/| |  / / __ \   / __ )____  ____ _________/ /
  / /_/ /\__ \ | | / / /_/ /  / __  / __ \/ __ `/ ___/ __  /
 / _, _/___/ / | |/ / ____/  / /_/ / /_/ / /_/ / /  / /_/ /
/_/ |_|/____/  |___/_/      /_____/\____/\__,_/_/   \__,_/

        RSVP Board v{}
        "#,
        env!("CARGO_PKG_VERSION")
    );
}
