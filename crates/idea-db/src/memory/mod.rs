//! In-memory repository implementations
//!
//! Same contracts as the PostgreSQL repositories, backed by process memory.
//! Used by tests and by single-process deployments without a database.

mod channel_settings;
mod idea;

pub use channel_settings::MemoryChannelSettingsRepository;
pub use idea::{MemoryIdeaCursor, MemoryIdeaRepository};
