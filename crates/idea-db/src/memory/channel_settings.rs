//! In-memory implementation of ChannelSettingsRepository

use std::collections::HashMap;

use async_trait::async_trait;
use parking_lot::RwLock;
use tracing::instrument;

use idea_core::entities::ChannelSettings;
use idea_core::traits::{ChannelSettingsRepository, RepoResult};
use idea_core::value_objects::Snowflake;

#[derive(Debug, Default)]
pub struct MemoryChannelSettingsRepository {
    settings: RwLock<HashMap<Snowflake, ChannelSettings>>,
}

impl MemoryChannelSettingsRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ChannelSettingsRepository for MemoryChannelSettingsRepository {
    #[instrument(skip(self))]
    async fn channel_settings(&self, channel_id: Snowflake) -> RepoResult<Option<ChannelSettings>> {
        Ok(self.settings.read().get(&channel_id).cloned())
    }

    #[instrument(skip(self, settings))]
    async fn set_channel_settings(
        &self,
        channel_id: Snowflake,
        settings: &ChannelSettings,
    ) -> RepoResult<()> {
        self.settings.write().insert(channel_id, settings.clone());
        Ok(())
    }

    #[instrument(skip(self))]
    async fn disable_channel(&self, channel_id: Snowflake) -> RepoResult<bool> {
        Ok(self.settings.write().remove(&channel_id).is_some())
    }
}
