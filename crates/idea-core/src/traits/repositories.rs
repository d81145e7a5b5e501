//! Repository traits (ports) - define the interface for data access
//!
//! The domain layer defines what it needs, and the infrastructure layer
//! provides the implementation. The repository is the source of truth for
//! idea existence and deadlines; in-memory structures only mirror it.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::entities::{ChannelSettings, Idea};
use crate::error::DomainError;
use crate::value_objects::Snowflake;

/// Result type for repository operations
pub type RepoResult<T> = Result<T, DomainError>;

// ============================================================================
// Idea Repository
// ============================================================================

#[async_trait]
pub trait IdeaRepository: Send + Sync {
    /// Find the idea posted as the given message
    async fn idea(&self, message_id: Snowflake) -> RepoResult<Option<Idea>>;

    /// Insert or replace an idea
    async fn save_idea(&self, idea: &Idea) -> RepoResult<()>;

    /// Delete an idea; deleting a missing idea is not an error
    async fn delete_idea(&self, message_id: Snowflake) -> RepoResult<()>;

    /// Ideas expiring at or after `after`, ordered by `(vote_until, message_id)`
    ///
    /// Ideas expiring exactly at `after` are only returned if their id is
    /// greater than `after_id`.
    async fn expiring_ideas(
        &self,
        after: DateTime<Utc>,
        after_id: Snowflake,
        limit: usize,
    ) -> RepoResult<Vec<Idea>>;

    /// Cursor over all ideas that expired before `before`
    async fn expired_ideas(&self, before: DateTime<Utc>) -> RepoResult<Box<dyn IdeaCursor>>;

    /// Delete all ideas that expired before `before`, returning how many were removed
    async fn delete_expired_ideas(&self, before: DateTime<Utc>) -> RepoResult<u64>;
}

/// Forward-only, server-paginated sequence of ideas
///
/// Not restartable. Dropping a cursor before it is exhausted is safe.
#[async_trait]
pub trait IdeaCursor: Send {
    /// Number of ideas in the currently buffered page
    fn batch_len(&self) -> usize;

    /// Next idea, or `None` once the sequence is exhausted
    async fn next(&mut self) -> RepoResult<Option<Idea>>;
}

// ============================================================================
// Channel Settings Repository
// ============================================================================

#[async_trait]
pub trait ChannelSettingsRepository: Send + Sync {
    /// Settings of an idea channel; `None` if ideas are not enabled there
    async fn channel_settings(&self, channel_id: Snowflake) -> RepoResult<Option<ChannelSettings>>;

    /// Enable ideas in a channel or replace its settings
    async fn set_channel_settings(
        &self,
        channel_id: Snowflake,
        settings: &ChannelSettings,
    ) -> RepoResult<()>;

    /// Disable ideas in a channel, returning whether they were enabled
    async fn disable_channel(&self, channel_id: Snowflake) -> RepoResult<bool>;
}
