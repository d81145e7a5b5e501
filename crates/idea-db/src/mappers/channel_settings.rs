//! Channel settings entity <-> model mapper

use chrono::Duration;

use idea_core::entities::{ChannelSettings, VoteType};
use idea_core::error::DomainError;
use idea_core::value_objects::Color;

use crate::models::ChannelSettingsModel;

impl TryFrom<ChannelSettingsModel> for ChannelSettings {
    type Error = DomainError;

    fn try_from(model: ChannelSettingsModel) -> Result<Self, Self::Error> {
        let vote_type = VoteType::from_i16(model.vote_type).ok_or_else(|| {
            DomainError::CorruptRecord(format!(
                "channel {} has unknown vote type {}",
                model.channel_id, model.vote_type
            ))
        })?;

        Ok(ChannelSettings {
            vote_type,
            vote_duration: Duration::seconds(model.vote_duration_secs),
            anonymous: model.anonymous,
            color: Color::new(model.color as u32),
        })
    }
}

/// Channel settings values prepared for database insertion
pub struct ChannelSettingsInsert {
    pub vote_type: i16,
    pub vote_duration_secs: i64,
    pub anonymous: bool,
    pub color: i32,
}

impl ChannelSettingsInsert {
    pub fn new(settings: &ChannelSettings) -> Self {
        Self {
            vote_type: settings.vote_type.to_i16(),
            vote_duration_secs: settings.vote_duration.num_seconds(),
            anonymous: settings.anonymous,
            // 24-bit values always fit
            color: settings.color.rgb() as i32,
        }
    }
}
