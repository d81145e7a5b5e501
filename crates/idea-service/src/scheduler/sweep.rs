//! Expired sweep
//!
//! Runs once at startup for ideas whose deadline passed while the process
//! was down. Every such idea gets its results published by a pool of
//! workers, then all of them are deleted in one bulk operation. Publishing
//! is cosmetic and best-effort; the bulk delete runs no matter how many
//! publishes failed.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::sync::{mpsc, Mutex};
use tokio::task::JoinSet;
use tracing::{debug, info, instrument, warn};

use idea_core::traits::IdeaRepository;
use idea_core::Idea;

use crate::concurrency::SerializerError;
use crate::services::{timeout, ServiceError, ServiceOptions, ServiceResult};

use super::closer::IdeaCloser;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SweepConfig {
    /// Upper bound on concurrent workers
    pub max_workers: usize,
    /// Timeout of opening the cursor and of the bulk delete
    pub query_timeout: Duration,
    /// Timeout of fetching one idea from the cursor
    pub repo_timeout: Duration,
}

impl From<&ServiceOptions> for SweepConfig {
    fn from(options: &ServiceOptions) -> Self {
        Self {
            max_workers: options.sweep_max_workers,
            query_timeout: options.query_timeout,
            repo_timeout: options.repo_timeout,
        }
    }
}

/// Publish and delete every idea that expired before `now`
///
/// Returns the number of deleted ideas. Per-idea failures are collected and
/// returned together once everything else is done.
///
/// # Errors
/// Fails without deleting anything if the expired ideas cannot be listed.
/// If the listing breaks off halfway, the ideas seen so far are published
/// but nothing is deleted, so the remainder is picked up on the next start.
#[instrument(skip_all, fields(now = %now))]
pub async fn sweep(
    repo: &Arc<dyn IdeaRepository>,
    closer: &Arc<dyn IdeaCloser>,
    config: &SweepConfig,
    now: DateTime<Utc>,
) -> ServiceResult<u64> {
    info!("Checking for votes that are past due");

    let mut cursor = timeout::repo(config.query_timeout, "expired ideas", repo.expired_ideas(now)).await?;

    let batch_len = cursor.batch_len();
    if batch_len == 0 {
        info!("Found no past due votes");
        return Ok(0);
    }
    info!(batch_len, "Found past due votes");

    let workers = batch_len.min(config.max_workers).max(1);
    let (tx, rx) = mpsc::channel::<Idea>(workers);
    let rx = Arc::new(Mutex::new(rx));

    let mut pool = JoinSet::new();
    for _ in 0..workers {
        let rx = Arc::clone(&rx);
        let closer = Arc::clone(closer);
        pool.spawn(async move {
            let mut errors = Vec::new();
            loop {
                let next = rx.lock().await.recv().await;
                let Some(idea) = next else { break };

                let message_id = idea.message_id;
                if let Err(err) = closer.close_expired(idea, now).await {
                    warn!(%message_id, error = %err, "Failed to publish past due vote");
                    errors.push(err);
                }
            }
            errors
        });
    }

    let mut errors: Vec<ServiceError> = Vec::new();
    let mut listed_all = true;
    loop {
        match timeout::repo(config.repo_timeout, "expired ideas cursor", cursor.next()).await {
            Ok(Some(idea)) => {
                if tx.send(idea).await.is_err() {
                    break;
                }
            }
            Ok(None) => break,
            Err(err) => {
                errors.push(err.into());
                listed_all = false;
                break;
            }
        }
    }
    drop(tx);

    while let Some(joined) = pool.join_next().await {
        match joined {
            Ok(worker_errors) => errors.extend(worker_errors),
            Err(err) => errors.push(SerializerError::Panicked(err.to_string()).into()),
        }
    }

    let mut deleted = 0;
    if listed_all {
        match timeout::repo(config.query_timeout, "delete expired ideas", repo.delete_expired_ideas(now)).await {
            Ok(count) => {
                deleted = count;
                debug!(deleted, "Deleted past due ideas");
            }
            Err(err) => errors.push(err.into()),
        }
    }

    info!(deleted, failed = errors.len(), "Past due votes processed");

    match ServiceError::combine(errors) {
        Some(err) => Err(err),
        None => Ok(deleted),
    }
}
