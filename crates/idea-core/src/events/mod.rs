//! Platform events consumed by the idea service

mod platform_event;

pub use platform_event::{MessageAuthor, MessageCreated, MessageDeleted, PlatformEvent, ReactionAdded};
