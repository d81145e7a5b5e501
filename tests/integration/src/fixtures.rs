//! Test fixtures and data generators
//!
//! Provides reusable test data for integration tests.

use std::sync::atomic::{AtomicI64, Ordering};

use chrono::{DateTime, Duration, Utc};

use idea_core::{
    ChannelSettings, Color, Idea, MessageAuthor, MessageCreated, MessageDeleted, ReactionAdded,
    SectionGroup, Snowflake, VoteType,
};

/// Counter for unique test ids
static COUNTER: AtomicI64 = AtomicI64::new(1_000);

/// Get a unique id for test data
pub fn unique_id() -> Snowflake {
    Snowflake::new(COUNTER.fetch_add(1, Ordering::SeqCst))
}

pub const GUILD_ID: Snowflake = Snowflake::new(1);

/// Settings for a channel without a deadline
pub fn settings(vote_type: VoteType) -> ChannelSettings {
    ChannelSettings {
        vote_type,
        vote_duration: Duration::zero(),
        anonymous: false,
        color: Color::BLURPLE,
    }
}

/// Settings for a channel whose ideas close `duration` after posting
pub fn timed_settings(vote_type: VoteType, duration: Duration) -> ChannelSettings {
    ChannelSettings {
        vote_duration: duration,
        ..settings(vote_type)
    }
}

/// A user message in a guild channel
pub fn message(channel_id: Snowflake, content: &str) -> MessageCreated {
    MessageCreated {
        id: unique_id(),
        guild_id: Some(GUILD_ID),
        channel_id,
        author: MessageAuthor {
            id: Snowflake::new(77),
            name: "grace".to_string(),
            avatar_url: None,
            bot: false,
        },
        content: content.to_string(),
        timestamp: Utc::now(),
    }
}

/// A message sent at `timestamp`
pub fn message_at(channel_id: Snowflake, content: &str, timestamp: DateTime<Utc>) -> MessageCreated {
    MessageCreated {
        timestamp,
        ..message(channel_id, content)
    }
}

pub fn reaction(idea: &Idea, user_id: Snowflake, emoji: &str) -> ReactionAdded {
    ReactionAdded {
        guild_id: Some(idea.guild_id),
        channel_id: idea.channel_id,
        message_id: idea.message_id,
        user_id,
        user_is_bot: false,
        emoji: Some(emoji.to_string()),
    }
}

pub fn deletion(idea: &Idea) -> MessageDeleted {
    MessageDeleted {
        channel_id: idea.channel_id,
        message_id: idea.message_id,
    }
}

/// A stored idea with two ungrouped sections and one group
pub fn stored_idea(channel_id: Snowflake, vote_until: Option<DateTime<Utc>>) -> Idea {
    Idea {
        guild_id: GUILD_ID,
        channel_id,
        message_id: unique_id(),
        global_section_emojis: vec!["🇦".to_string(), "🇧".to_string()],
        groups: vec![SectionGroup::new(
            "Color",
            vec!["🇨".to_string(), "🇩".to_string()],
        )],
        vote_type: VoteType::Thumbs,
        vote_until,
    }
}

/// Message text with ungrouped sections and a group
pub const IDEA_WITH_GROUP: &str = "Paint the shed\n\
                                   It is getting shabby.\n\
                                   * Do it this weekend\n\
                                   * Hire someone\n\
                                   # Color\n\
                                   * Red\n\
                                   * Green";
