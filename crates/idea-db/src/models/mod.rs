//! Database models - rows as stored in PostgreSQL

mod channel_settings;
mod idea;

pub use channel_settings::ChannelSettingsModel;
pub use idea::IdeaModel;
