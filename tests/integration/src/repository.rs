//! Idea repository with slow writes

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use idea_core::{Idea, IdeaCursor, IdeaRepository, RepoResult, Snowflake};
use idea_db::MemoryIdeaRepository;

/// Memory repository whose saves take `save_delay` to complete
pub struct SlowSaveRepository {
    inner: Arc<MemoryIdeaRepository>,
    save_delay: Duration,
}

impl SlowSaveRepository {
    pub fn new(inner: Arc<MemoryIdeaRepository>, save_delay: Duration) -> Self {
        Self { inner, save_delay }
    }
}

#[async_trait]
impl IdeaRepository for SlowSaveRepository {
    async fn idea(&self, message_id: Snowflake) -> RepoResult<Option<Idea>> {
        self.inner.idea(message_id).await
    }

    async fn save_idea(&self, idea: &Idea) -> RepoResult<()> {
        tokio::time::sleep(self.save_delay).await;
        self.inner.save_idea(idea).await
    }

    async fn delete_idea(&self, message_id: Snowflake) -> RepoResult<()> {
        self.inner.delete_idea(message_id).await
    }

    async fn expiring_ideas(
        &self,
        after: DateTime<Utc>,
        after_id: Snowflake,
        limit: usize,
    ) -> RepoResult<Vec<Idea>> {
        self.inner.expiring_ideas(after, after_id, limit).await
    }

    async fn expired_ideas(&self, before: DateTime<Utc>) -> RepoResult<Box<dyn IdeaCursor>> {
        self.inner.expired_ideas(before).await
    }

    async fn delete_expired_ideas(&self, before: DateTime<Utc>) -> RepoResult<u64> {
        self.inner.delete_expired_ideas(before).await
    }
}
