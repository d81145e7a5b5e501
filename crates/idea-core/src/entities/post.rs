//! Posted content - the embed-like message the bot sends and edits

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::value_objects::{Color, Snowflake};

/// Author block shown on a non-anonymous idea
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostAuthor {
    pub name: String,
    pub icon_url: Option<String>,
}

/// A named field below the description
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostField {
    pub name: String,
    pub value: String,
}

impl PostField {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// The idea as rendered in the channel
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct IdeaPost {
    pub title: String,
    pub description: Option<String>,
    pub author: Option<PostAuthor>,
    pub fields: Vec<PostField>,
    pub footer: Option<String>,
    pub timestamp: Option<DateTime<Utc>>,
    pub color: Color,
}

/// Aggregated reaction count on a message
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReactionCount {
    pub emoji: String,
    pub count: i32,
    pub me: bool,
}

impl ReactionCount {
    pub fn new(emoji: impl Into<String>, count: i32, me: bool) -> Self {
        Self {
            emoji: emoji.into(),
            count,
            me,
        }
    }
}

/// A message as fetched from the platform
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlatformMessage {
    pub id: Snowflake,
    pub channel_id: Snowflake,
    /// `None` if the message carries no idea post (e.g. the embed was suppressed)
    pub post: Option<IdeaPost>,
    pub reactions: Vec<ReactionCount>,
}

/// Severity of a transient notice
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NoticeKind {
    Info,
    Error,
}

/// A short, self-deleting message sent in response to a user
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notice {
    pub kind: NoticeKind,
    pub text: String,
    /// Who the notice is addressed to
    pub mention: Option<Snowflake>,
}

impl Notice {
    pub fn info(text: impl Into<String>) -> Self {
        Self {
            kind: NoticeKind::Info,
            text: text.into(),
            mention: None,
        }
    }

    pub fn error(text: impl Into<String>) -> Self {
        Self {
            kind: NoticeKind::Error,
            text: text.into(),
            mention: None,
        }
    }

    pub fn mentioning(mut self, user_id: Snowflake) -> Self {
        self.mention = Some(user_id);
        self
    }
}

impl PlatformMessage {
    /// Reaction count for an emoji, if the reaction still exists
    pub fn reaction_count(&self, emoji: &str) -> Option<i32> {
        self.reactions.iter().find(|r| r.emoji == emoji).map(|r| r.count)
    }
}
