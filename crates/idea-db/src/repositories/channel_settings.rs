//! PostgreSQL implementation of ChannelSettingsRepository

use async_trait::async_trait;
use sqlx::PgPool;
use tracing::instrument;

use idea_core::entities::ChannelSettings;
use idea_core::traits::{ChannelSettingsRepository, RepoResult};
use idea_core::value_objects::Snowflake;

use crate::mappers::ChannelSettingsInsert;
use crate::models::ChannelSettingsModel;

use super::error::map_db_error;

/// PostgreSQL implementation of ChannelSettingsRepository
#[derive(Clone)]
pub struct PgChannelSettingsRepository {
    pool: PgPool,
}

impl PgChannelSettingsRepository {
    /// Create a new PgChannelSettingsRepository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ChannelSettingsRepository for PgChannelSettingsRepository {
    #[instrument(skip(self))]
    async fn channel_settings(&self, channel_id: Snowflake) -> RepoResult<Option<ChannelSettings>> {
        let result = sqlx::query_as::<_, ChannelSettingsModel>(
            r#"
            SELECT channel_id, vote_type, vote_duration_secs, anonymous, color
            FROM channel_settings
            WHERE channel_id = $1
            "#,
        )
        .bind(channel_id.into_inner())
        .fetch_optional(&self.pool)
        .await
        .map_err(map_db_error)?;

        result.map(ChannelSettings::try_from).transpose()
    }

    #[instrument(skip(self, settings))]
    async fn set_channel_settings(
        &self,
        channel_id: Snowflake,
        settings: &ChannelSettings,
    ) -> RepoResult<()> {
        let insert = ChannelSettingsInsert::new(settings);

        sqlx::query(
            r#"
            INSERT INTO channel_settings (channel_id, vote_type, vote_duration_secs, anonymous, color)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (channel_id) DO UPDATE SET
                vote_type = EXCLUDED.vote_type,
                vote_duration_secs = EXCLUDED.vote_duration_secs,
                anonymous = EXCLUDED.anonymous,
                color = EXCLUDED.color
            "#,
        )
        .bind(channel_id.into_inner())
        .bind(insert.vote_type)
        .bind(insert.vote_duration_secs)
        .bind(insert.anonymous)
        .bind(insert.color)
        .execute(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(())
    }

    #[instrument(skip(self))]
    async fn disable_channel(&self, channel_id: Snowflake) -> RepoResult<bool> {
        let result = sqlx::query("DELETE FROM channel_settings WHERE channel_id = $1")
            .bind(channel_id.into_inner())
            .execute(&self.pool)
            .await
            .map_err(map_db_error)?;

        Ok(result.rows_affected() > 0)
    }
}
