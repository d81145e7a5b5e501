//! Idea database model

use chrono::{DateTime, Utc};
use sqlx::types::Json;
use sqlx::FromRow;

use idea_core::entities::SectionGroup;

/// Database model for ideas table
#[derive(Debug, Clone, FromRow)]
pub struct IdeaModel {
    pub message_id: i64,
    pub guild_id: i64,
    pub channel_id: i64,
    pub global_section_emojis: Vec<String>,
    pub groups: Json<Vec<SectionGroup>>,
    pub vote_type: i16,
    pub vote_until: Option<DateTime<Utc>>,
}
