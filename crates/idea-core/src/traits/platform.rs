//! Chat platform port - the subset of the platform API the bot uses

use async_trait::async_trait;

use crate::entities::{IdeaPost, Notice, PlatformMessage};
use crate::error::PlatformResult;
use crate::value_objects::{Permissions, Snowflake};

#[async_trait]
pub trait ChatPlatform: Send + Sync {
    /// The bot's own permissions in a channel
    async fn permissions(&self, channel_id: Snowflake) -> PlatformResult<Permissions>;

    /// Send an idea post
    async fn send_post(&self, channel_id: Snowflake, post: &IdeaPost) -> PlatformResult<PlatformMessage>;

    /// Fetch a message with its post and reaction counts; `None` if it no longer exists
    async fn fetch_message(
        &self,
        channel_id: Snowflake,
        message_id: Snowflake,
    ) -> PlatformResult<Option<PlatformMessage>>;

    /// Replace the post of a message
    async fn edit_post(
        &self,
        channel_id: Snowflake,
        message_id: Snowflake,
        post: &IdeaPost,
    ) -> PlatformResult<()>;

    /// Add the bot's own reaction
    async fn react(&self, channel_id: Snowflake, message_id: Snowflake, emoji: &str) -> PlatformResult<()>;

    /// Remove a user's reaction
    async fn delete_user_reaction(
        &self,
        channel_id: Snowflake,
        message_id: Snowflake,
        user_id: Snowflake,
        emoji: &str,
    ) -> PlatformResult<()>;

    async fn delete_message(&self, channel_id: Snowflake, message_id: Snowflake) -> PlatformResult<()>;

    /// Send a notice, returning the id of the sent message
    async fn send_notice(&self, channel_id: Snowflake, notice: &Notice) -> PlatformResult<Snowflake>;
}
