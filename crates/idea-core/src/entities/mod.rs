//! Domain entities - core business objects

mod channel_settings;
mod idea;
mod post;

pub use channel_settings::ChannelSettings;
pub use idea::{Idea, SectionGroup, VoteType, MAX_SECTIONS, SECTION_EMOJIS};
pub use post::{IdeaPost, Notice, NoticeKind, PlatformMessage, PostAuthor, PostField, ReactionCount};
