//! In-memory implementation of IdeaRepository

use std::collections::{HashMap, VecDeque};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use tracing::instrument;

use idea_core::entities::Idea;
use idea_core::traits::{IdeaCursor, IdeaRepository, RepoResult};
use idea_core::value_objects::Snowflake;

/// In-memory implementation of IdeaRepository
#[derive(Debug, Default)]
pub struct MemoryIdeaRepository {
    ideas: RwLock<HashMap<Snowflake, Idea>>,
}

impl MemoryIdeaRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored ideas
    pub fn len(&self) -> usize {
        self.ideas.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.ideas.read().is_empty()
    }

    /// Ideas with a deadline matching `filter`, sorted by `(vote_until, message_id)`
    fn sorted_by_deadline(&self, filter: impl Fn(DateTime<Utc>, Snowflake) -> bool) -> Vec<Idea> {
        let mut ideas: Vec<Idea> = self
            .ideas
            .read()
            .values()
            .filter(|idea| idea.deadline_key().is_some_and(|(until, id)| filter(until, id)))
            .cloned()
            .collect();
        ideas.sort_by_key(Idea::deadline_key);
        ideas
    }
}

#[async_trait]
impl IdeaRepository for MemoryIdeaRepository {
    #[instrument(skip(self))]
    async fn idea(&self, message_id: Snowflake) -> RepoResult<Option<Idea>> {
        Ok(self.ideas.read().get(&message_id).cloned())
    }

    #[instrument(skip(self, idea), fields(message_id = %idea.message_id))]
    async fn save_idea(&self, idea: &Idea) -> RepoResult<()> {
        self.ideas.write().insert(idea.message_id, idea.clone());
        Ok(())
    }

    #[instrument(skip(self))]
    async fn delete_idea(&self, message_id: Snowflake) -> RepoResult<()> {
        self.ideas.write().remove(&message_id);
        Ok(())
    }

    #[instrument(skip(self))]
    async fn expiring_ideas(
        &self,
        after: DateTime<Utc>,
        after_id: Snowflake,
        limit: usize,
    ) -> RepoResult<Vec<Idea>> {
        let mut ideas = self.sorted_by_deadline(|until, id| {
            until > after || (until == after && id > after_id)
        });
        ideas.truncate(limit);
        Ok(ideas)
    }

    #[instrument(skip(self))]
    async fn expired_ideas(&self, before: DateTime<Utc>) -> RepoResult<Box<dyn IdeaCursor>> {
        let ideas = self.sorted_by_deadline(|until, _| until < before);
        Ok(Box::new(MemoryIdeaCursor::new(ideas)))
    }

    #[instrument(skip(self))]
    async fn delete_expired_ideas(&self, before: DateTime<Utc>) -> RepoResult<u64> {
        let mut ideas = self.ideas.write();
        let count = ideas.len();
        ideas.retain(|_, idea| !idea.is_expired(before));
        Ok((count - ideas.len()) as u64)
    }
}

/// Cursor over a snapshot of ideas, delivered as a single batch
#[derive(Debug)]
pub struct MemoryIdeaCursor {
    ideas: VecDeque<Idea>,
}

impl MemoryIdeaCursor {
    pub fn new(ideas: Vec<Idea>) -> Self {
        Self {
            ideas: ideas.into(),
        }
    }
}

#[async_trait]
impl IdeaCursor for MemoryIdeaCursor {
    fn batch_len(&self) -> usize {
        self.ideas.len()
    }

    async fn next(&mut self) -> RepoResult<Option<Idea>> {
        Ok(self.ideas.pop_front())
    }
}
