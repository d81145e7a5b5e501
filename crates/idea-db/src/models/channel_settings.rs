//! Channel settings database model

use sqlx::FromRow;

/// Database model for channel_settings table
#[derive(Debug, Clone, FromRow)]
pub struct ChannelSettingsModel {
    pub channel_id: i64,
    pub vote_type: i16,
    pub vote_duration_secs: i64,
    pub anonymous: bool,
    pub color: i32,
}
