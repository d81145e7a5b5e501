//! Tunables of the idea services

use std::time::Duration;

use idea_common::IdeaConfig;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceOptions {
    /// Capacity of the in-memory deadline window
    pub deadline_window: usize,
    /// Upper bound on concurrent sweep workers
    pub sweep_max_workers: usize,
    pub negative_cache_capacity: u64,
    /// Timeout of a single repository call
    pub repo_timeout: Duration,
    /// Timeout of window and sweep queries
    pub query_timeout: Duration,
    /// Timeout of a single chat platform call
    pub platform_timeout: Duration,
    /// How long info notices stay up before deleting themselves
    pub notice_lifetime: Duration,
    /// Delay before a failed window refill is retried
    pub refill_retry: Duration,
}

impl Default for ServiceOptions {
    fn default() -> Self {
        Self::from(&IdeaConfig::default())
    }
}

impl From<&IdeaConfig> for ServiceOptions {
    fn from(config: &IdeaConfig) -> Self {
        Self {
            deadline_window: config.deadline_window,
            sweep_max_workers: config.sweep_max_workers,
            negative_cache_capacity: config.negative_cache_capacity,
            repo_timeout: Duration::from_millis(config.repo_timeout_ms),
            query_timeout: Duration::from_millis(config.query_timeout_ms),
            platform_timeout: Duration::from_millis(config.platform_timeout_ms),
            notice_lifetime: Duration::from_secs(config.notice_lifetime_secs),
            refill_retry: Duration::from_secs(config.refill_retry_secs),
        }
    }
}
