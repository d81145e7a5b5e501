//! Ports - traits implemented by the infrastructure layer

mod platform;
mod repositories;

pub use platform::ChatPlatform;
pub use repositories::{ChannelSettingsRepository, IdeaCursor, IdeaRepository, RepoResult};
