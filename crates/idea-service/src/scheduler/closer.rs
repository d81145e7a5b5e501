use async_trait::async_trait;
use chrono::{DateTime, Utc};

use idea_core::Idea;

use crate::services::ServiceResult;

/// Publishes the final results of an idea
#[async_trait]
pub trait IdeaCloser: Send + Sync + 'static {
    /// Close an idea whose deadline just passed
    async fn close(&self, idea: Idea) -> ServiceResult<()>;

    /// Close an idea whose deadline passed while the process was not running
    ///
    /// The idea's persisted state is removed separately, in bulk.
    async fn close_expired(&self, idea: Idea, now: DateTime<Utc>) -> ServiceResult<()>;
}
