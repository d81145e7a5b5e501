//! Idea repository access through the closed-idea cache
//!
//! The cache only short-cuts reaction lookups. Anything that decides whether
//! an idea is closed or removed reads the repository through [`CachedIdeas::stored`].

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use idea_core::traits::IdeaRepository;
use idea_core::{Idea, Snowflake};

use super::cache::ClosedIdeaCache;
use super::error::ServiceResult;
use super::timeout;

#[derive(Clone)]
pub(crate) struct CachedIdeas {
    repo: Arc<dyn IdeaRepository>,
    closed: ClosedIdeaCache,
    /// Bumped by every save; a miss read across a save is not cached
    saves: Arc<AtomicU64>,
    timeout: Duration,
}

impl CachedIdeas {
    pub(crate) fn new(repo: Arc<dyn IdeaRepository>, closed: ClosedIdeaCache, timeout: Duration) -> Self {
        Self {
            repo,
            closed,
            saves: Arc::new(AtomicU64::new(0)),
            timeout,
        }
    }

    /// The idea posted as `message_id`, consulting the cache first
    pub(crate) async fn idea(&self, message_id: Snowflake) -> ServiceResult<Option<Idea>> {
        if self.closed.contains(message_id).await {
            return Ok(None);
        }

        let saves = self.saves.load(Ordering::SeqCst);
        let idea = self.stored(message_id).await?;
        if idea.is_none() {
            self.closed.mark_closed(message_id).await;
            // a save that finished meanwhile may already have cleared the
            // entry, so drop it again
            if self.saves.load(Ordering::SeqCst) != saves {
                self.closed.forget(message_id).await;
            }
        }
        Ok(idea)
    }

    /// The idea posted as `message_id`, straight from the repository
    pub(crate) async fn stored(&self, message_id: Snowflake) -> ServiceResult<Option<Idea>> {
        let idea = timeout::repo(self.timeout, "idea", self.repo.idea(message_id)).await?;
        Ok(idea)
    }

    pub(crate) async fn save(&self, idea: &Idea) -> ServiceResult<()> {
        timeout::repo(self.timeout, "save idea", self.repo.save_idea(idea)).await?;
        self.saves.fetch_add(1, Ordering::SeqCst);
        self.closed.forget(idea.message_id).await;
        Ok(())
    }

    /// Delete an idea; the cache learns about it first so reactions racing
    /// the delete stop at the cache
    pub(crate) async fn delete(&self, message_id: Snowflake) -> ServiceResult<()> {
        self.closed.mark_closed(message_id).await;
        timeout::repo(self.timeout, "delete idea", self.repo.delete_idea(message_id)).await?;
        Ok(())
    }
}
