//! Idea service
//!
//! Wires platform events and the startup sequence to the formatter, the
//! per-idea serializer, the deadline scheduler, and the expired sweep.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use dashmap::DashSet;
use futures::FutureExt;
use tracing::{debug, info, instrument, warn};

use idea_core::{
    Idea, MessageCreated, MessageDeleted, Notice, Permissions, PlatformEvent, ReactionAdded,
    Snowflake,
};

use crate::concurrency::Serializer;
use crate::format::{self, FormattedIdea};
use crate::scheduler::{sweep, DeadlineScheduler, IdeaCloser, SchedulerConfig, SweepConfig};

use super::cache::ClosedIdeaCache;
use super::closing::VoteCloser;
use super::context::ServiceContext;
use super::error::{ErrorKind, ServiceError, ServiceResult};
use super::store::CachedIdeas;
use super::timeout;

const GROUP_VOTE_PERMISSION_NOTICE: &str = "I need the 'Manage Messages' permission to enforce group votes.\n\
                                            Otherwise, voting results may be inaccurate.";

/// Reposts ideas, keeps votes consistent, and publishes voting results
///
/// Cheap to clone; clones share all state.
#[derive(Clone)]
pub struct IdeaService {
    inner: Arc<Inner>,
}

struct Inner {
    ctx: ServiceContext,
    ideas: CachedIdeas,
    serializer: Serializer<Snowflake>,
    closer: Arc<dyn IdeaCloser>,
    scheduler: DeadlineScheduler,
    /// Channels already told about a missing Manage Messages permission
    permission_warned: DashSet<Snowflake>,
}

impl IdeaService {
    pub fn new(ctx: ServiceContext) -> Self {
        let options = ctx.options().clone();
        let closed = ClosedIdeaCache::new(options.negative_cache_capacity);
        let ideas = CachedIdeas::new(Arc::clone(ctx.idea_repo()), closed, options.repo_timeout);
        let serializer = Serializer::new();

        let closer: Arc<dyn IdeaCloser> =
            Arc::new(VoteCloser::new(ctx.clone(), ideas.clone(), serializer.clone()));
        let scheduler = DeadlineScheduler::new(
            Arc::clone(ctx.idea_repo()),
            Arc::clone(&closer),
            Arc::clone(ctx.spawner()),
            Arc::clone(ctx.reporter()),
            SchedulerConfig::from(&options),
        );

        Self {
            inner: Arc::new(Inner {
                ctx,
                ideas,
                serializer,
                closer,
                scheduler,
                permission_warned: DashSet::new(),
            }),
        }
    }

    pub fn context(&self) -> &ServiceContext {
        &self.inner.ctx
    }

    /// Serializer that orders vote handling against closing, keyed by message id
    pub fn serializer(&self) -> &Serializer<Snowflake> {
        &self.inner.serializer
    }

    /// Catch up on missed deadlines, then start watching upcoming ones
    ///
    /// Sweep failures are captured, not returned; they only affect how past
    /// results are displayed.
    ///
    /// # Errors
    /// Fails if the deadline window cannot be loaded.
    #[instrument(skip(self))]
    pub async fn start(&self, now: DateTime<Utc>) -> ServiceResult<()> {
        let ctx = &self.inner.ctx;
        let config = SweepConfig::from(ctx.options());

        match sweep(ctx.idea_repo(), &self.inner.closer, &config, now).await {
            Ok(deleted) => debug!(deleted, "Sweep finished"),
            Err(err) => ctx.reporter().capture(&err),
        }

        self.inner.scheduler.start(now).await?;
        info!("Idea service started");
        Ok(())
    }

    /// Route a platform event to its handler
    ///
    /// Errors are handled here: rejected ideas get a self-deleting notice,
    /// everything else is captured.
    pub async fn dispatch(&self, event: PlatformEvent) {
        debug!(event = event.name(), "Dispatching event");

        match event {
            PlatformEvent::MessageCreated(msg) => {
                if let Err(err) = self.on_new_message(&msg).await {
                    self.reject(&msg, &err).await;
                }
            }
            PlatformEvent::ReactionAdded(event) => {
                if let Err(err) = self.on_reaction_added(&event).await {
                    self.capture(&err);
                }
            }
            PlatformEvent::MessageDeleted(event) => {
                if let Err(err) = self.on_message_deleted(&event).await {
                    self.capture(&err);
                }
            }
        }
    }

    // =========================================================================
    // New ideas
    // =========================================================================

    /// Turn a message in an idea channel into an idea post
    ///
    /// Returns the stored idea, or `None` if the message was not meant to
    /// become one.
    #[instrument(skip(self, msg), fields(message_id = %msg.id, channel_id = %msg.channel_id))]
    pub async fn on_new_message(&self, msg: &MessageCreated) -> ServiceResult<Option<Idea>> {
        if msg.author.bot {
            return Ok(None);
        }
        let Some(guild_id) = msg.guild_id else {
            return Ok(None);
        };

        let ctx = &self.inner.ctx;
        let options = ctx.options();

        let settings = timeout::repo(
            options.repo_timeout,
            "channel settings",
            ctx.settings_repo().channel_settings(msg.channel_id),
        )
        .await?;
        let Some(settings) = settings else {
            return Ok(None);
        };

        debug!("New idea");

        if !self.ensure_permissions(msg.channel_id).await? {
            debug!("Cannot send messages, ignoring idea");
            return Ok(None);
        }

        let FormattedIdea { post, mut idea } = format::idea(msg, &settings)?;

        let sent = timeout::platform(
            options.platform_timeout,
            ctx.platform().send_post(msg.channel_id, &post),
        )
        .await?;

        idea.guild_id = guild_id;
        idea.channel_id = sent.channel_id;
        idea.message_id = sent.id;
        idea.validate()?;

        // stored before the scheduler can see it, a due deadline closes right away
        self.inner.ideas.save(&idea).await?;
        self.inner.scheduler.schedule(&idea);

        // losing the source message is not worth failing the idea over
        let deleted = timeout::platform(
            options.platform_timeout,
            ctx.platform().delete_message(msg.channel_id, msg.id),
        )
        .await;
        if let Err(err) = deleted {
            ctx.reporter().capture(&err.into());
        }

        let mut seeds: Vec<&str> = idea.vote_type.emojis().to_vec();
        seeds.extend(idea.section_emojis());
        for emoji in seeds {
            timeout::platform(
                options.platform_timeout,
                ctx.platform().react(idea.channel_id, idea.message_id, emoji),
            )
            .await?;
        }

        info!(idea_id = %idea.message_id, vote_until = ?idea.vote_until, "Idea posted");
        Ok(Some(idea))
    }

    /// Whether the bot may post ideas in a channel
    ///
    /// `Ok(false)` if it cannot even send messages; an error if it can, but
    /// lacks the permissions to run the vote.
    async fn ensure_permissions(&self, channel_id: Snowflake) -> ServiceResult<bool> {
        let ctx = &self.inner.ctx;
        let permissions = timeout::platform(
            ctx.options().platform_timeout,
            ctx.platform().permissions(channel_id),
        )
        .await?;

        if !permissions.has(Permissions::SEND_MESSAGES) {
            return Ok(false);
        }

        let missing = permissions.missing(Permissions::ADD_REACTIONS | Permissions::MANAGE_MESSAGES);
        if !missing.is_empty() {
            return Err(ServiceError::missing_permissions(missing));
        }
        Ok(true)
    }

    /// Tell the author why their message was not turned into an idea
    ///
    /// The notice and the message are deleted after the notice lifetime.
    async fn reject(&self, msg: &MessageCreated, err: &ServiceError) {
        let notice = match err.kind() {
            ErrorKind::UserFormat | ErrorKind::Permission => {
                debug!(code = err.code(), "Idea rejected");
                Notice::info(err.user_message())
            }
            ErrorKind::Transient | ErrorKind::Invariant => {
                self.inner.ctx.reporter().capture(err);
                Notice::error(err.user_message())
            }
        }
        .mentioning(msg.author.id);

        let ctx = &self.inner.ctx;
        let sent = timeout::platform(
            ctx.options().platform_timeout,
            ctx.platform().send_notice(msg.channel_id, &notice),
        )
        .await;

        match sent {
            Ok(notice_id) => self.delete_later(msg.channel_id, [notice_id, msg.id]),
            Err(err) => warn!(error = %err, "Failed to send notice"),
        }
    }

    fn delete_later(&self, channel_id: Snowflake, message_ids: [Snowflake; 2]) {
        let ctx = self.inner.ctx.clone();
        let lifetime = ctx.options().notice_lifetime;

        self.inner.ctx.spawner().spawn(
            async move {
                tokio::time::sleep(lifetime).await;
                for message_id in message_ids {
                    let deleted = timeout::platform(
                        ctx.options().platform_timeout,
                        ctx.platform().delete_message(channel_id, message_id),
                    )
                    .await;
                    if let Err(err) = deleted {
                        if !err.is_unknown_resource() {
                            ctx.reporter().capture(&err.into());
                        }
                    }
                }
            }
            .boxed(),
        );
    }

    // =========================================================================
    // Votes
    // =========================================================================

    /// Keep a user's votes consistent after they reacted to an idea
    ///
    /// Runs as a shared task for the idea, so it never overlaps its closing.
    #[instrument(skip(self, event), fields(message_id = %event.message_id, user_id = %event.user_id))]
    pub async fn on_reaction_added(&self, event: &ReactionAdded) -> ServiceResult<()> {
        if event.guild_id.is_none() || event.user_is_bot {
            return Ok(());
        }
        let Some(emoji) = event.emoji.clone() else {
            return Ok(());
        };

        let service = self.clone();
        let event = event.clone();
        self.inner
            .serializer
            .run_shared(event.message_id, async move { service.apply_vote(&event, &emoji).await })
            .await?
    }

    async fn apply_vote(&self, event: &ReactionAdded, emoji: &str) -> ServiceResult<()> {
        let Some(idea) = self.inner.ideas.idea(event.message_id).await? else {
            return Ok(());
        };

        debug!(vote_until = ?idea.vote_until, emoji, "New vote");

        if let Some(group) = idea.group_of(emoji) {
            if self.can_manage_messages(event.channel_id).await? {
                self.remove_other_reactions(event, emoji, &group.emojis).await?;
            }
        }

        if idea.vote_type.contains(emoji) {
            let scale: Vec<String> = idea.vote_type.emojis().iter().map(|e| (*e).to_string()).collect();
            self.remove_other_reactions(event, emoji, &scale).await?;
        }

        Ok(())
    }

    /// Check Manage Messages, announcing its absence once per channel
    ///
    /// The announcement is repeated only after the permission was granted
    /// and then taken away again.
    async fn can_manage_messages(&self, channel_id: Snowflake) -> ServiceResult<bool> {
        let ctx = &self.inner.ctx;
        let permissions = timeout::platform(
            ctx.options().platform_timeout,
            ctx.platform().permissions(channel_id),
        )
        .await?;

        if permissions.has(Permissions::MANAGE_MESSAGES) {
            self.inner.permission_warned.remove(&channel_id);
            return Ok(true);
        }

        if self.inner.permission_warned.insert(channel_id) {
            warn!(%channel_id, "Missing Manage Messages, group votes are not enforced");
            timeout::platform(
                ctx.options().platform_timeout,
                ctx.platform()
                    .send_notice(channel_id, &Notice::info(GROUP_VOTE_PERMISSION_NOTICE)),
            )
            .await?;
        }
        Ok(false)
    }

    /// Remove the user's reactions for every symbol in `symbols` but `keep`
    async fn remove_other_reactions(
        &self,
        event: &ReactionAdded,
        keep: &str,
        symbols: &[String],
    ) -> ServiceResult<()> {
        let ctx = &self.inner.ctx;

        for symbol in symbols.iter().filter(|s| s.as_str() != keep) {
            let removed = timeout::platform(
                ctx.options().platform_timeout,
                ctx.platform()
                    .delete_user_reaction(event.channel_id, event.message_id, event.user_id, symbol),
            )
            .await;

            match removed {
                Ok(()) => {}
                Err(err) if err.is_unknown_resource() => {}
                Err(err) => return Err(err.into()),
            }
        }
        Ok(())
    }

    // =========================================================================
    // Deletion
    // =========================================================================

    /// Forget the idea of a deleted message
    ///
    /// Runs as an exclusive task so it cannot interleave with vote handling.
    #[instrument(skip(self, event), fields(message_id = %event.message_id))]
    pub async fn on_message_deleted(&self, event: &MessageDeleted) -> ServiceResult<()> {
        let ideas = self.inner.ideas.clone();
        let message_id = event.message_id;

        self.inner
            .serializer
            .run_exclusive(message_id, async move {
                if ideas.stored(message_id).await?.is_some() {
                    ideas.delete(message_id).await?;
                    info!("Idea message deleted, idea removed");
                }
                Ok::<(), ServiceError>(())
            })
            .await?
    }

    fn capture(&self, err: &ServiceError) {
        if err.should_capture() {
            self.inner.ctx.reporter().capture(err);
        } else {
            warn!(code = err.code(), error = %err, "Event handling failed");
        }
    }
}

impl std::fmt::Debug for IdeaService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IdeaService")
            .field("ctx", &self.inner.ctx)
            .field("scheduler", &self.inner.scheduler)
            .finish()
    }
}
