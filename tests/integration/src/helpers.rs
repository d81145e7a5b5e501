//! Test helpers for integration tests
//!
//! Provides a fully wired idea service on in-memory repositories and a fake
//! platform, plus small polling utilities.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{bail, Result};

use idea_common::{try_init_tracing_with_config, TracingConfig};
use idea_core::{ChannelSettings, ChannelSettingsRepository, IdeaRepository, Snowflake};
use idea_db::{MemoryChannelSettingsRepository, MemoryIdeaRepository};
use idea_service::{
    ChannelService, IdeaService, ManualSpawner, ServiceContext, ServiceOptions, TaskSpawner,
    TokioSpawner,
};

use crate::fixtures::unique_id;
use crate::platform::FakePlatform;
use crate::repository::SlowSaveRepository;

/// Install a test subscriber once; later calls are no-ops
pub fn init_test_tracing() {
    let _ = try_init_tracing_with_config(TracingConfig::test());
}

/// Options with short timings so tests finish quickly
pub fn test_options() -> ServiceOptions {
    ServiceOptions {
        deadline_window: 50,
        sweep_max_workers: 16,
        negative_cache_capacity: 1_000,
        repo_timeout: Duration::from_secs(1),
        query_timeout: Duration::from_secs(1),
        platform_timeout: Duration::from_secs(1),
        notice_lifetime: Duration::from_millis(10),
        refill_retry: Duration::from_millis(100),
    }
}

/// An idea service with everything it talks to exposed for inspection
pub struct TestApp {
    pub service: IdeaService,
    pub ctx: ServiceContext,
    pub platform: Arc<FakePlatform>,
    pub ideas: Arc<MemoryIdeaRepository>,
    pub settings: Arc<MemoryChannelSettingsRepository>,
    /// Set when background tasks are held back for manual execution
    pub spawner: Option<Arc<ManualSpawner>>,
}

impl TestApp {
    /// Background tasks run on the Tokio runtime
    pub fn new() -> Self {
        Self::build(Arc::new(TokioSpawner), None, None)
    }

    /// Idea saves take `delay` to reach the repository
    pub fn with_save_delay(delay: Duration) -> Self {
        Self::build(Arc::new(TokioSpawner), None, Some(delay))
    }

    /// Background tasks wait for [`ManualSpawner::run_pending`]
    pub fn with_manual_spawner() -> Self {
        let spawner = Arc::new(ManualSpawner::new());
        Self::build(spawner.clone(), Some(spawner), None)
    }

    fn build(
        spawner: Arc<dyn TaskSpawner>,
        manual: Option<Arc<ManualSpawner>>,
        save_delay: Option<Duration>,
    ) -> Self {
        init_test_tracing();

        let platform = Arc::new(FakePlatform::new());
        let ideas = Arc::new(MemoryIdeaRepository::new());
        let settings = Arc::new(MemoryChannelSettingsRepository::new());

        let idea_repo: Arc<dyn IdeaRepository> = match save_delay {
            Some(delay) => Arc::new(SlowSaveRepository::new(ideas.clone(), delay)),
            None => ideas.clone(),
        };

        let ctx = ServiceContext::builder()
            .idea_repo(idea_repo)
            .settings_repo(settings.clone())
            .platform(platform.clone())
            .spawner(spawner)
            .options(test_options())
            .build()
            .expect("test context is complete");

        Self {
            service: IdeaService::new(ctx.clone()),
            ctx,
            platform,
            ideas,
            settings,
            spawner: manual,
        }
    }

    pub fn channels(&self) -> ChannelService<'_> {
        ChannelService::new(&self.ctx)
    }

    /// Enable ideas in a new channel
    pub async fn idea_channel(&self, settings: ChannelSettings) -> Snowflake {
        let channel_id = unique_id();
        self.settings
            .set_channel_settings(channel_id, &settings)
            .await
            .expect("memory repository does not fail");
        channel_id
    }

    /// Run background tasks held by the manual spawner
    pub async fn run_background(&self) -> usize {
        match &self.spawner {
            Some(spawner) => spawner.run_pending().await,
            None => 0,
        }
    }
}

impl Default for TestApp {
    fn default() -> Self {
        Self::new()
    }
}

/// Poll `check` until it holds or `limit` passes
pub async fn wait_until<F, Fut>(limit: Duration, mut check: F) -> Result<()>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = bool>,
{
    let deadline = tokio::time::Instant::now() + limit;
    loop {
        if check().await {
            return Ok(());
        }
        if tokio::time::Instant::now() >= deadline {
            bail!("condition not met within {limit:?}");
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
}
