//! Service context - dependency container for services
//!
//! Holds the repositories, the chat platform, and the collaborators the
//! services hand background work and errors to.

use std::sync::Arc;

use idea_core::traits::{ChannelSettingsRepository, ChatPlatform, IdeaRepository};

use crate::concurrency::{TaskSpawner, TokioSpawner};

use super::error::{ServiceError, ServiceResult};
use super::options::ServiceOptions;
use super::reporter::{ErrorReporter, TracingReporter};

/// Service context containing all dependencies
///
/// Cheap to clone; every dependency is shared.
#[derive(Clone)]
pub struct ServiceContext {
    // Repositories
    idea_repo: Arc<dyn IdeaRepository>,
    settings_repo: Arc<dyn ChannelSettingsRepository>,

    // Chat platform
    platform: Arc<dyn ChatPlatform>,

    // Collaborators
    spawner: Arc<dyn TaskSpawner>,
    reporter: Arc<dyn ErrorReporter>,

    options: ServiceOptions,
}

impl ServiceContext {
    pub fn new(
        idea_repo: Arc<dyn IdeaRepository>,
        settings_repo: Arc<dyn ChannelSettingsRepository>,
        platform: Arc<dyn ChatPlatform>,
        spawner: Arc<dyn TaskSpawner>,
        reporter: Arc<dyn ErrorReporter>,
        options: ServiceOptions,
    ) -> Self {
        Self {
            idea_repo,
            settings_repo,
            platform,
            spawner,
            reporter,
            options,
        }
    }

    pub fn builder() -> ServiceContextBuilder {
        ServiceContextBuilder::new()
    }

    // === Repositories ===

    /// Get the idea repository
    pub fn idea_repo(&self) -> &Arc<dyn IdeaRepository> {
        &self.idea_repo
    }

    /// Get the channel settings repository
    pub fn settings_repo(&self) -> &dyn ChannelSettingsRepository {
        self.settings_repo.as_ref()
    }

    // === Platform ===

    pub fn platform(&self) -> &dyn ChatPlatform {
        self.platform.as_ref()
    }

    // === Collaborators ===

    pub fn spawner(&self) -> &Arc<dyn TaskSpawner> {
        &self.spawner
    }

    pub fn reporter(&self) -> &Arc<dyn ErrorReporter> {
        &self.reporter
    }

    pub fn options(&self) -> &ServiceOptions {
        &self.options
    }
}

impl std::fmt::Debug for ServiceContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceContext")
            .field("repositories", &"...")
            .field("platform", &"...")
            .field("options", &self.options)
            .finish()
    }
}

/// Builder for creating ServiceContext with custom configuration
///
/// The spawner defaults to [`TokioSpawner`], the reporter to
/// [`TracingReporter`], and the options to [`ServiceOptions::default`].
pub struct ServiceContextBuilder {
    idea_repo: Option<Arc<dyn IdeaRepository>>,
    settings_repo: Option<Arc<dyn ChannelSettingsRepository>>,
    platform: Option<Arc<dyn ChatPlatform>>,
    spawner: Option<Arc<dyn TaskSpawner>>,
    reporter: Option<Arc<dyn ErrorReporter>>,
    options: Option<ServiceOptions>,
}

impl ServiceContextBuilder {
    pub fn new() -> Self {
        Self {
            idea_repo: None,
            settings_repo: None,
            platform: None,
            spawner: None,
            reporter: None,
            options: None,
        }
    }

    pub fn idea_repo(mut self, repo: Arc<dyn IdeaRepository>) -> Self {
        self.idea_repo = Some(repo);
        self
    }

    pub fn settings_repo(mut self, repo: Arc<dyn ChannelSettingsRepository>) -> Self {
        self.settings_repo = Some(repo);
        self
    }

    pub fn platform(mut self, platform: Arc<dyn ChatPlatform>) -> Self {
        self.platform = Some(platform);
        self
    }

    pub fn spawner(mut self, spawner: Arc<dyn TaskSpawner>) -> Self {
        self.spawner = Some(spawner);
        self
    }

    pub fn reporter(mut self, reporter: Arc<dyn ErrorReporter>) -> Self {
        self.reporter = Some(reporter);
        self
    }

    pub fn options(mut self, options: ServiceOptions) -> Self {
        self.options = Some(options);
        self
    }

    /// Build the ServiceContext
    ///
    /// # Errors
    /// Returns `ServiceError::Validation` if a required dependency is missing
    /// or the options are unusable
    pub fn build(self) -> ServiceResult<ServiceContext> {
        let options = self.options.unwrap_or_default();
        if options.deadline_window == 0 {
            return Err(ServiceError::validation("deadline_window must be positive"));
        }
        if options.sweep_max_workers == 0 {
            return Err(ServiceError::validation("sweep_max_workers must be positive"));
        }

        Ok(ServiceContext::new(
            self.idea_repo
                .ok_or_else(|| ServiceError::validation("idea_repo is required"))?,
            self.settings_repo
                .ok_or_else(|| ServiceError::validation("settings_repo is required"))?,
            self.platform
                .ok_or_else(|| ServiceError::validation("platform is required"))?,
            self.spawner.unwrap_or_else(|| Arc::new(TokioSpawner)),
            self.reporter.unwrap_or_else(|| Arc::new(TracingReporter)),
            options,
        ))
    }
}

impl Default for ServiceContextBuilder {
    fn default() -> Self {
        Self::new()
    }
}
