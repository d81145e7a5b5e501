//! Channel service
//!
//! Enables, reconfigures, and disables idea channels.

use chrono::{Duration, Utc};
use tracing::{info, instrument};

use idea_core::{ChannelSettings, DomainError, Snowflake};

use super::context::ServiceContext;
use super::error::{ServiceError, ServiceResult};
use super::timeout;

/// Channel service
pub struct ChannelService<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> ChannelService<'a> {
    /// Create a new ChannelService
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    /// Settings of an idea channel, `None` if ideas are disabled there
    #[instrument(skip(self))]
    pub async fn settings(&self, channel_id: Snowflake) -> ServiceResult<Option<ChannelSettings>> {
        let settings = timeout::repo(
            self.ctx.options().repo_timeout,
            "channel settings",
            self.ctx.settings_repo().channel_settings(channel_id),
        )
        .await?;
        Ok(settings)
    }

    /// Enable ideas in a channel, or replace its settings
    #[instrument(skip(self, settings))]
    pub async fn enable(&self, channel_id: Snowflake, settings: &ChannelSettings) -> ServiceResult<()> {
        if settings.vote_duration < Duration::zero() {
            return Err(ServiceError::validation("vote duration must not be negative"));
        }
        if Utc::now().checked_add_signed(settings.vote_duration).is_none() {
            return Err(ServiceError::validation("vote duration is too long"));
        }

        timeout::repo(
            self.ctx.options().repo_timeout,
            "set channel settings",
            self.ctx.settings_repo().set_channel_settings(channel_id, settings),
        )
        .await?;

        info!(
            vote_type = %settings.vote_type,
            vote_duration_secs = settings.vote_duration.num_seconds(),
            anonymous = settings.anonymous,
            "Ideas enabled"
        );
        Ok(())
    }

    /// Disable ideas in a channel
    ///
    /// # Errors
    /// Returns `DomainError::ChannelAlreadyDisabled` if ideas were not enabled.
    #[instrument(skip(self))]
    pub async fn disable(&self, channel_id: Snowflake) -> ServiceResult<()> {
        let disabled = timeout::repo(
            self.ctx.options().repo_timeout,
            "disable channel",
            self.ctx.settings_repo().disable_channel(channel_id),
        )
        .await?;

        if !disabled {
            return Err(DomainError::ChannelAlreadyDisabled(channel_id).into());
        }

        info!("Ideas disabled");
        Ok(())
    }
}
