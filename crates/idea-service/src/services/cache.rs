//! Negative cache of message ids that have no idea
//!
//! Reactions keep arriving on closed ideas long after their deadline. The
//! cache keeps those lookups from reaching the repository. It is bounded and
//! only ever saves a lookup: a miss falls through to the repository.

use moka::future::Cache;

use idea_core::Snowflake;

#[derive(Clone)]
pub struct ClosedIdeaCache {
    inner: Cache<Snowflake, ()>,
}

impl ClosedIdeaCache {
    pub fn new(capacity: u64) -> Self {
        Self {
            inner: Cache::builder().max_capacity(capacity).build(),
        }
    }

    /// Whether `message_id` is known to have no idea
    ///
    /// Counts as an access for eviction purposes.
    pub async fn contains(&self, message_id: Snowflake) -> bool {
        self.inner.get(&message_id).await.is_some()
    }

    /// Remember that `message_id` has no idea
    pub async fn mark_closed(&self, message_id: Snowflake) {
        self.inner.insert(message_id, ()).await;
    }

    /// Forget `message_id`, e.g. because an idea was just saved for it
    pub async fn forget(&self, message_id: Snowflake) {
        self.inner.invalidate(&message_id).await;
    }
}

impl std::fmt::Debug for ClosedIdeaCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClosedIdeaCache")
            .field("entries", &self.inner.entry_count())
            .finish()
    }
}
