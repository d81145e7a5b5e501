//! Repository implementations
//!
//! PostgreSQL implementations of the repository traits defined in idea-core.

mod channel_settings;
mod error;
mod idea;

pub use channel_settings::PgChannelSettingsRepository;
pub use idea::{PgExpiredCursor, PgIdeaRepository};
