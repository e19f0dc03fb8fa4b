/// RSVP Board - per-participant RSVP tracking with self-expiring responses
///
/// Participants log in against a fixed roster, answer coming or not coming,
/// and each answer resets itself after twelve hours. Admins see the tallies
/// and can clear every response at once.

pub mod account;
pub mod admin;
pub mod auth;
pub mod avatar;
pub mod board;
pub mod clock;
pub mod config;
pub mod context;
pub mod error;
pub mod jobs;
pub mod kv_store;
pub mod rsvp;

pub use board::{BoardView, Redisplay, RsvpBoard};
pub use config::AppConfig;
pub use context::AppContext;
pub use error::{RsvpError, RsvpResult};
