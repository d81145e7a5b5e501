//! Recording fake of the chat platform

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicI64, Ordering};

use async_trait::async_trait;
use parking_lot::Mutex;

use idea_core::{
    ChatPlatform, IdeaPost, Notice, Permissions, PlatformError, PlatformMessage, PlatformResult,
    ReactionCount, Snowflake,
};

/// A notice sent by the bot
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentNotice {
    pub id: Snowflake,
    pub channel_id: Snowflake,
    pub notice: Notice,
}

/// A user reaction removed by the bot
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemovedReaction {
    pub message_id: Snowflake,
    pub user_id: Snowflake,
    pub emoji: String,
}

#[derive(Default)]
struct State {
    messages: HashMap<Snowflake, PlatformMessage>,
    permissions: HashMap<Snowflake, Permissions>,
    notices: Vec<SentNotice>,
    deleted: Vec<Snowflake>,
    removed_reactions: Vec<RemovedReaction>,
    edits: Vec<(Snowflake, IdeaPost)>,
}

/// In-memory chat platform that records what the bot does
///
/// Channels grant [`Permissions::IDEA_CHANNEL`] unless configured otherwise.
pub struct FakePlatform {
    state: Mutex<State>,
    next_id: AtomicI64,
    fail_edits: AtomicBool,
}

impl Default for FakePlatform {
    fn default() -> Self {
        Self {
            state: Mutex::new(State::default()),
            next_id: AtomicI64::new(900_000_000_000),
            fail_edits: AtomicBool::new(false),
        }
    }
}

impl FakePlatform {
    pub fn new() -> Self {
        Self::default()
    }

    fn next_id(&self) -> Snowflake {
        Snowflake::new(self.next_id.fetch_add(1, Ordering::SeqCst))
    }

    // === Setup ===

    pub fn set_permissions(&self, channel_id: Snowflake, permissions: Permissions) {
        self.state.lock().permissions.insert(channel_id, permissions);
    }

    /// Make every post edit fail with a request error
    pub fn fail_edits(&self, fail: bool) {
        self.fail_edits.store(fail, Ordering::SeqCst);
    }

    /// Put a message on the platform, e.g. an idea posted before a restart
    pub fn insert_message(&self, message: PlatformMessage) {
        self.state.lock().messages.insert(message.id, message);
    }

    /// Simulate `count` users reacting with `emoji`
    pub fn add_votes(&self, message_id: Snowflake, emoji: &str, count: i32) {
        let mut state = self.state.lock();
        if let Some(message) = state.messages.get_mut(&message_id) {
            match message.reactions.iter_mut().find(|r| r.emoji == emoji) {
                Some(reaction) => reaction.count += count,
                None => message.reactions.push(ReactionCount::new(emoji, count, false)),
            }
        }
    }

    /// Simulate a moderator clearing all reactions of one symbol
    pub fn clear_reactions(&self, message_id: Snowflake, emoji: &str) {
        if let Some(message) = self.state.lock().messages.get_mut(&message_id) {
            message.reactions.retain(|r| r.emoji != emoji);
        }
    }

    // === Inspection ===

    pub fn message(&self, message_id: Snowflake) -> Option<PlatformMessage> {
        self.state.lock().messages.get(&message_id).cloned()
    }

    pub fn post(&self, message_id: Snowflake) -> Option<IdeaPost> {
        self.message(message_id).and_then(|m| m.post)
    }

    /// Symbols of the bot's own reactions on a message, in the order added
    pub fn own_reactions(&self, message_id: Snowflake) -> Vec<String> {
        self.message(message_id)
            .map(|m| {
                m.reactions
                    .into_iter()
                    .filter(|r| r.me)
                    .map(|r| r.emoji)
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn notices(&self) -> Vec<SentNotice> {
        self.state.lock().notices.clone()
    }

    pub fn deleted_messages(&self) -> Vec<Snowflake> {
        self.state.lock().deleted.clone()
    }

    pub fn removed_reactions(&self) -> Vec<RemovedReaction> {
        self.state.lock().removed_reactions.clone()
    }

    pub fn edit_count(&self, message_id: Snowflake) -> usize {
        self.state
            .lock()
            .edits
            .iter()
            .filter(|(id, _)| *id == message_id)
            .count()
    }

    /// Ids of the messages carrying a post, lowest first
    pub fn sent_post_ids(&self) -> Vec<Snowflake> {
        let mut ids: Vec<Snowflake> = self
            .state
            .lock()
            .messages
            .values()
            .filter(|m| m.post.is_some())
            .map(|m| m.id)
            .collect();
        ids.sort();
        ids
    }

    pub fn sent_posts(&self) -> usize {
        self.state.lock().messages.values().filter(|m| m.post.is_some()).count()
    }
}

#[async_trait]
impl ChatPlatform for FakePlatform {
    async fn permissions(&self, channel_id: Snowflake) -> PlatformResult<Permissions> {
        Ok(self
            .state
            .lock()
            .permissions
            .get(&channel_id)
            .copied()
            .unwrap_or(Permissions::IDEA_CHANNEL))
    }

    async fn send_post(&self, channel_id: Snowflake, post: &IdeaPost) -> PlatformResult<PlatformMessage> {
        let message = PlatformMessage {
            id: self.next_id(),
            channel_id,
            post: Some(post.clone()),
            reactions: Vec::new(),
        };
        self.state.lock().messages.insert(message.id, message.clone());
        Ok(message)
    }

    async fn fetch_message(
        &self,
        _channel_id: Snowflake,
        message_id: Snowflake,
    ) -> PlatformResult<Option<PlatformMessage>> {
        Ok(self.message(message_id))
    }

    async fn edit_post(
        &self,
        _channel_id: Snowflake,
        message_id: Snowflake,
        post: &IdeaPost,
    ) -> PlatformResult<()> {
        if self.fail_edits.load(Ordering::SeqCst) {
            return Err(PlatformError::Request("edit rejected".to_string()));
        }

        let mut state = self.state.lock();
        let message = state
            .messages
            .get_mut(&message_id)
            .ok_or_else(|| PlatformError::UnknownResource("message".to_string()))?;
        message.post = Some(post.clone());
        state.edits.push((message_id, post.clone()));
        Ok(())
    }

    async fn react(&self, _channel_id: Snowflake, message_id: Snowflake, emoji: &str) -> PlatformResult<()> {
        let mut state = self.state.lock();
        let message = state
            .messages
            .get_mut(&message_id)
            .ok_or_else(|| PlatformError::UnknownResource("message".to_string()))?;

        match message.reactions.iter_mut().find(|r| r.emoji == emoji) {
            Some(reaction) if !reaction.me => {
                reaction.count += 1;
                reaction.me = true;
            }
            Some(_) => {}
            None => message.reactions.push(ReactionCount::new(emoji, 1, true)),
        }
        Ok(())
    }

    async fn delete_user_reaction(
        &self,
        _channel_id: Snowflake,
        message_id: Snowflake,
        user_id: Snowflake,
        emoji: &str,
    ) -> PlatformResult<()> {
        self.state.lock().removed_reactions.push(RemovedReaction {
            message_id,
            user_id,
            emoji: emoji.to_string(),
        });
        Ok(())
    }

    async fn delete_message(&self, _channel_id: Snowflake, message_id: Snowflake) -> PlatformResult<()> {
        let mut state = self.state.lock();
        state.messages.remove(&message_id);
        state.deleted.push(message_id);
        Ok(())
    }

    async fn send_notice(&self, channel_id: Snowflake, notice: &Notice) -> PlatformResult<Snowflake> {
        let id = self.next_id();
        self.state.lock().notices.push(SentNotice {
            id,
            channel_id,
            notice: notice.clone(),
        });
        Ok(id)
    }
}
