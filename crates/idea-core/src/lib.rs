//! # idea-core
//!
//! Domain layer containing the idea entities, value objects, platform events,
//! and the ports (repository and chat platform traits) the service layer consumes.
//! This crate has zero dependencies on infrastructure (database, chat gateway, etc.).

pub mod entities;
pub mod error;
pub mod events;
pub mod traits;
pub mod value_objects;

// Re-export commonly used types at crate root
pub use entities::{
    ChannelSettings, Idea, IdeaPost, Notice, NoticeKind, PlatformMessage, PostAuthor, PostField,
    ReactionCount, SectionGroup, VoteType, MAX_SECTIONS, SECTION_EMOJIS,
};
pub use error::{DomainError, PlatformError, PlatformResult};
pub use events::{MessageAuthor, MessageCreated, MessageDeleted, PlatformEvent, ReactionAdded};
pub use traits::{
    ChannelSettingsRepository, ChatPlatform, IdeaCursor, IdeaRepository, RepoResult,
};
pub use value_objects::{Color, ColorParseError, Permissions, Snowflake, SnowflakeParseError};
