//! Platform events - what the gateway delivers to the idea service

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::value_objects::Snowflake;

/// All events the idea service reacts to
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PlatformEvent {
    MessageCreated(MessageCreated),
    ReactionAdded(ReactionAdded),
    MessageDeleted(MessageDeleted),
}

/// The user who sent a message
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageAuthor {
    pub id: Snowflake,
    pub name: String,
    pub avatar_url: Option<String>,
    #[serde(default)]
    pub bot: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageCreated {
    pub id: Snowflake,
    /// `None` for direct messages
    pub guild_id: Option<Snowflake>,
    pub channel_id: Snowflake,
    pub author: MessageAuthor,
    pub content: String,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReactionAdded {
    /// `None` for direct messages
    pub guild_id: Option<Snowflake>,
    pub channel_id: Snowflake,
    pub message_id: Snowflake,
    pub user_id: Snowflake,
    #[serde(default)]
    pub user_is_bot: bool,
    /// Unicode emoji, or `None` for custom emojis
    pub emoji: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageDeleted {
    pub channel_id: Snowflake,
    pub message_id: Snowflake,
}

impl PlatformEvent {
    /// Short event name for logging
    pub fn name(&self) -> &'static str {
        match self {
            Self::MessageCreated(_) => "MESSAGE_CREATED",
            Self::ReactionAdded(_) => "REACTION_ADDED",
            Self::MessageDeleted(_) => "MESSAGE_DELETED",
        }
    }
}
