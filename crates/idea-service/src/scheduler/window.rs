//! Bounded, time-ordered window of upcoming deadlines

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};

use idea_core::{Idea, Snowflake};

/// Sort key of a window entry
///
/// Ties on the deadline are broken by message id, so ideas expiring at the
/// same instant are always processed in the same order.
pub type DeadlineKey = (DateTime<Utc>, Snowflake);

/// The earliest upcoming deadlines, at most `capacity` of them
///
/// Only ideas with a deadline are ever held. Entries pushed past the end are
/// dropped; the repository still has them and they come back on a refill.
#[derive(Debug, Clone)]
pub struct DeadlineWindow {
    entries: BTreeMap<DeadlineKey, Idea>,
    capacity: usize,
}

impl DeadlineWindow {
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: BTreeMap::new(),
            capacity,
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Insert an idea, returning whether it is in the window afterwards
    ///
    /// Re-inserting an idea with the same deadline replaces the entry.
    pub fn insert(&mut self, idea: Idea) -> bool {
        let Some(key) = idea.deadline_key() else {
            return false;
        };

        self.entries.insert(key, idea);
        if self.entries.len() > self.capacity {
            self.entries.pop_last();
        }
        self.entries.contains_key(&key)
    }

    pub fn extend(&mut self, ideas: impl IntoIterator<Item = Idea>) {
        for idea in ideas {
            self.insert(idea);
        }
    }

    /// The idea expiring next
    pub fn head(&self) -> Option<&Idea> {
        self.entries.first_key_value().map(|(_, idea)| idea)
    }

    pub fn head_key(&self) -> Option<DeadlineKey> {
        self.entries.first_key_value().map(|(key, _)| *key)
    }

    pub fn pop_head(&mut self) -> Option<Idea> {
        self.entries.pop_first().map(|(_, idea)| idea)
    }

    /// Keys in processing order
    pub fn keys(&self) -> impl Iterator<Item = DeadlineKey> + '_ {
        self.entries.keys().copied()
    }
}
