//! Idea entity <-> model mapper

use chrono::{DateTime, Utc};
use sqlx::types::Json;

use idea_core::entities::{Idea, SectionGroup, VoteType};
use idea_core::error::DomainError;
use idea_core::value_objects::Snowflake;

use crate::models::IdeaModel;

/// Convert IdeaModel to Idea entity
impl TryFrom<IdeaModel> for Idea {
    type Error = DomainError;

    fn try_from(model: IdeaModel) -> Result<Self, Self::Error> {
        let vote_type = VoteType::from_i16(model.vote_type).ok_or_else(|| {
            DomainError::CorruptRecord(format!(
                "idea {} has unknown vote type {}",
                model.message_id, model.vote_type
            ))
        })?;

        Ok(Idea {
            guild_id: Snowflake::new(model.guild_id),
            channel_id: Snowflake::new(model.channel_id),
            message_id: Snowflake::new(model.message_id),
            global_section_emojis: model.global_section_emojis,
            groups: model.groups.0,
            vote_type,
            vote_until: model.vote_until,
        })
    }
}

/// Idea values prepared for database insertion
pub struct IdeaInsert<'a> {
    pub message_id: i64,
    pub guild_id: i64,
    pub channel_id: i64,
    pub global_section_emojis: &'a [String],
    pub groups: Json<&'a [SectionGroup]>,
    pub vote_type: i16,
    pub vote_until: Option<DateTime<Utc>>,
}

impl<'a> IdeaInsert<'a> {
    pub fn new(idea: &'a Idea) -> Self {
        Self {
            message_id: idea.message_id.into_inner(),
            guild_id: idea.guild_id.into_inner(),
            channel_id: idea.channel_id.into_inner(),
            global_section_emojis: &idea.global_section_emojis,
            groups: Json(&idea.groups),
            vote_type: idea.vote_type.to_i16(),
            vote_until: idea.vote_until,
        }
    }
}
