//! PostgreSQL implementation of IdeaRepository

use std::collections::VecDeque;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use tracing::{debug, instrument};

use idea_core::entities::Idea;
use idea_core::traits::{IdeaCursor, IdeaRepository, RepoResult};
use idea_core::value_objects::Snowflake;

use crate::mappers::IdeaInsert;
use crate::models::IdeaModel;

use super::error::{map_db_error, sql_limit};

/// Page size of the expired-idea cursor
const EXPIRED_PAGE_SIZE: usize = 100;

/// PostgreSQL implementation of IdeaRepository
#[derive(Clone)]
pub struct PgIdeaRepository {
    pool: PgPool,
}

impl PgIdeaRepository {
    /// Create a new PgIdeaRepository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn into_ideas(models: Vec<IdeaModel>) -> RepoResult<Vec<Idea>> {
    models.into_iter().map(Idea::try_from).collect()
}

#[async_trait]
impl IdeaRepository for PgIdeaRepository {
    #[instrument(skip(self))]
    async fn idea(&self, message_id: Snowflake) -> RepoResult<Option<Idea>> {
        let result = sqlx::query_as::<_, IdeaModel>(
            r#"
            SELECT message_id, guild_id, channel_id, global_section_emojis, groups, vote_type, vote_until
            FROM ideas
            WHERE message_id = $1
            "#,
        )
        .bind(message_id.into_inner())
        .fetch_optional(&self.pool)
        .await
        .map_err(map_db_error)?;

        result.map(Idea::try_from).transpose()
    }

    #[instrument(skip(self, idea), fields(message_id = %idea.message_id))]
    async fn save_idea(&self, idea: &Idea) -> RepoResult<()> {
        let insert = IdeaInsert::new(idea);

        sqlx::query(
            r#"
            INSERT INTO ideas (message_id, guild_id, channel_id, global_section_emojis, groups, vote_type, vote_until)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            ON CONFLICT (message_id) DO UPDATE SET
                guild_id = EXCLUDED.guild_id,
                channel_id = EXCLUDED.channel_id,
                global_section_emojis = EXCLUDED.global_section_emojis,
                groups = EXCLUDED.groups,
                vote_type = EXCLUDED.vote_type,
                vote_until = EXCLUDED.vote_until
            "#,
        )
        .bind(insert.message_id)
        .bind(insert.guild_id)
        .bind(insert.channel_id)
        .bind(insert.global_section_emojis)
        .bind(insert.groups)
        .bind(insert.vote_type)
        .bind(insert.vote_until)
        .execute(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(())
    }

    #[instrument(skip(self))]
    async fn delete_idea(&self, message_id: Snowflake) -> RepoResult<()> {
        sqlx::query("DELETE FROM ideas WHERE message_id = $1")
            .bind(message_id.into_inner())
            .execute(&self.pool)
            .await
            .map_err(map_db_error)?;

        Ok(())
    }

    #[instrument(skip(self))]
    async fn expiring_ideas(
        &self,
        after: DateTime<Utc>,
        after_id: Snowflake,
        limit: usize,
    ) -> RepoResult<Vec<Idea>> {
        let results = sqlx::query_as::<_, IdeaModel>(
            r#"
            SELECT message_id, guild_id, channel_id, global_section_emojis, groups, vote_type, vote_until
            FROM ideas
            WHERE vote_until > $1 OR (vote_until = $1 AND message_id > $2)
            ORDER BY vote_until ASC, message_id ASC
            LIMIT $3
            "#,
        )
        .bind(after)
        .bind(after_id.into_inner())
        .bind(sql_limit(limit))
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)?;

        into_ideas(results)
    }

    #[instrument(skip(self))]
    async fn expired_ideas(&self, before: DateTime<Utc>) -> RepoResult<Box<dyn IdeaCursor>> {
        let mut cursor = PgExpiredCursor {
            pool: self.pool.clone(),
            before,
            page: VecDeque::new(),
            last_key: None,
            exhausted: false,
        };
        cursor.fetch_page().await?;
        Ok(Box::new(cursor))
    }

    #[instrument(skip(self))]
    async fn delete_expired_ideas(&self, before: DateTime<Utc>) -> RepoResult<u64> {
        let result = sqlx::query("DELETE FROM ideas WHERE vote_until < $1")
            .bind(before)
            .execute(&self.pool)
            .await
            .map_err(map_db_error)?;

        Ok(result.rows_affected())
    }
}

/// Keyset-paginated cursor over expired ideas
///
/// Each page resumes after the `(vote_until, message_id)` of the previous
/// page's last row, so no server-side state is held between pages.
pub struct PgExpiredCursor {
    pool: PgPool,
    before: DateTime<Utc>,
    page: VecDeque<Idea>,
    last_key: Option<(DateTime<Utc>, i64)>,
    exhausted: bool,
}

impl PgExpiredCursor {
    async fn fetch_page(&mut self) -> RepoResult<()> {
        let query = match self.last_key {
            None => sqlx::query_as::<_, IdeaModel>(
                r#"
                SELECT message_id, guild_id, channel_id, global_section_emojis, groups, vote_type, vote_until
                FROM ideas
                WHERE vote_until < $1
                ORDER BY vote_until ASC, message_id ASC
                LIMIT $2
                "#,
            )
            .bind(self.before)
            .bind(sql_limit(EXPIRED_PAGE_SIZE)),
            Some((until, id)) => sqlx::query_as::<_, IdeaModel>(
                r#"
                SELECT message_id, guild_id, channel_id, global_section_emojis, groups, vote_type, vote_until
                FROM ideas
                WHERE vote_until < $1 AND (vote_until, message_id) > ($3, $4)
                ORDER BY vote_until ASC, message_id ASC
                LIMIT $2
                "#,
            )
            .bind(self.before)
            .bind(sql_limit(EXPIRED_PAGE_SIZE))
            .bind(until)
            .bind(id),
        };

        let models = query.fetch_all(&self.pool).await.map_err(map_db_error)?;
        self.exhausted = models.len() < EXPIRED_PAGE_SIZE;

        if let Some(last) = models.last() {
            if let Some(until) = last.vote_until {
                self.last_key = Some((until, last.message_id));
            }
        }

        debug!(rows = models.len(), exhausted = self.exhausted, "Fetched expired idea page");
        self.page.extend(into_ideas(models)?);
        Ok(())
    }
}

#[async_trait]
impl IdeaCursor for PgExpiredCursor {
    fn batch_len(&self) -> usize {
        self.page.len()
    }

    async fn next(&mut self) -> RepoResult<Option<Idea>> {
        if self.page.is_empty() && !self.exhausted {
            self.fetch_page().await?;
        }
        Ok(self.page.pop_front())
    }
}
