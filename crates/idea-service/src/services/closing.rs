//! Publishing the final results of an idea

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tracing::{debug, info, instrument};

use idea_core::{Idea, IdeaPost, PlatformMessage, Snowflake};

use crate::concurrency::Serializer;
use crate::format::humanize;
use crate::format::{tally, VoteSummary};
use crate::scheduler::IdeaCloser;

use super::context::ServiceContext;
use super::error::ServiceResult;
use super::store::CachedIdeas;
use super::timeout;

pub const VOTING_ENDED_FOOTER: &str = "Voting ended:";
pub const ORIGINAL_DEADLINE_FOOTER: &str = "Original voting deadline:";

/// Closes ideas as exclusive tasks on the per-idea serializer
#[derive(Clone)]
pub struct VoteCloser {
    ctx: ServiceContext,
    ideas: CachedIdeas,
    serializer: Serializer<Snowflake>,
}

impl VoteCloser {
    pub(crate) fn new(ctx: ServiceContext, ideas: CachedIdeas, serializer: Serializer<Snowflake>) -> Self {
        Self {
            ctx,
            ideas,
            serializer,
        }
    }

    #[instrument(skip_all, fields(message_id = %idea.message_id, channel_id = %idea.channel_id))]
    async fn publish_at_deadline(&self, idea: Idea) -> ServiceResult<()> {
        // closed before, or its message was deleted
        let Some(idea) = self.ideas.stored(idea.message_id).await? else {
            debug!("Idea already gone, nothing to close");
            return Ok(());
        };

        info!("Counting votes");
        self.ideas.delete(idea.message_id).await?;

        let Some((message, mut post)) = self.live_post(&idea).await? else {
            return Ok(());
        };

        let summary = tally(&idea, &message.reactions);
        finish_post(&mut post, summary, VOTING_ENDED_FOOTER);
        self.edit(&idea, &post).await
    }

    #[instrument(skip_all, fields(message_id = %idea.message_id, channel_id = %idea.channel_id))]
    async fn publish_expired(&self, idea: Idea, now: DateTime<Utc>) -> ServiceResult<()> {
        debug!(vote_until = ?idea.vote_until, "Counting past due votes");

        let Some((message, mut post)) = self.live_post(&idea).await? else {
            return Ok(());
        };

        let deadline = post.timestamp.or(idea.vote_until).unwrap_or(now);
        let mut summary = tally(&idea, &message.reactions);
        summary.rating_field.value.push_str(&format!(
            "\n\nI was offline during the voting deadline. \
             The results you see here are from {} the deadline.",
            humanize::relative(deadline, now)
        ));

        finish_post(&mut post, summary, ORIGINAL_DEADLINE_FOOTER);
        self.edit(&idea, &post).await
    }

    /// The idea's message and post, `None` if either is gone
    async fn live_post(&self, idea: &Idea) -> ServiceResult<Option<(PlatformMessage, IdeaPost)>> {
        let limit = self.ctx.options().platform_timeout;
        let fetched = timeout::platform(
            limit,
            self.ctx.platform().fetch_message(idea.channel_id, idea.message_id),
        )
        .await;

        let message = match fetched {
            Ok(Some(message)) => message,
            Ok(None) => {
                debug!("Idea message no longer exists");
                return Ok(None);
            }
            Err(err) if err.is_unknown_resource() => return Ok(None),
            Err(err) => return Err(err.into()),
        };

        Ok(message.post.clone().map(|post| (message, post)))
    }

    async fn edit(&self, idea: &Idea, post: &IdeaPost) -> ServiceResult<()> {
        let limit = self.ctx.options().platform_timeout;
        timeout::platform(
            limit,
            self.ctx.platform().edit_post(idea.channel_id, idea.message_id, post),
        )
        .await?;
        Ok(())
    }
}

fn finish_post(post: &mut IdeaPost, summary: VoteSummary, footer: &str) {
    post.footer = Some(footer.to_string());
    post.color = summary.color;
    post.fields.push(summary.rating_field);
    if let Some(field) = summary.section_votes_field {
        post.fields.push(field);
    }
}

#[async_trait]
impl IdeaCloser for VoteCloser {
    async fn close(&self, idea: Idea) -> ServiceResult<()> {
        let closer = self.clone();
        self.serializer
            .run_exclusive(idea.message_id, async move { closer.publish_at_deadline(idea).await })
            .await?
    }

    async fn close_expired(&self, idea: Idea, now: DateTime<Utc>) -> ServiceResult<()> {
        let closer = self.clone();
        self.serializer
            .run_exclusive(idea.message_id, async move { closer.publish_expired(idea, now).await })
            .await?
    }
}
