//! Entity to model mappers
//!
//! - `TryFrom<Model> for Entity`: Convert database rows to domain objects,
//!   rejecting values the domain cannot represent
//! - `*Insert` structs: Prepare entity data for database operations

mod channel_settings;
mod idea;

pub use channel_settings::ChannelSettingsInsert;
pub use idea::IdeaInsert;
