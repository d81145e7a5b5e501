//! Per-call timeouts for repository and platform calls
//!
//! A timeout surfaces as an ordinary error of the call it bounds.

use std::future::Future;
use std::time::Duration;

use idea_core::{DomainError, PlatformError, PlatformResult, RepoResult};

pub(crate) async fn repo<T>(
    limit: Duration,
    what: &'static str,
    call: impl Future<Output = RepoResult<T>>,
) -> RepoResult<T> {
    tokio::time::timeout(limit, call)
        .await
        .unwrap_or(Err(DomainError::Timeout(what)))
}

pub(crate) async fn platform<T>(
    limit: Duration,
    call: impl Future<Output = PlatformResult<T>>,
) -> PlatformResult<T> {
    tokio::time::timeout(limit, call)
        .await
        .unwrap_or(Err(PlatformError::Timeout))
}
