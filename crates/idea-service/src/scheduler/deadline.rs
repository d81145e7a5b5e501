//! Deadline scheduler
//!
//! Keeps the next few deadlines in a [`DeadlineWindow`] and sleeps until the
//! earliest one. When it passes, the idea is handed to the [`IdeaCloser`]
//! through the task spawner, so a slow close never delays the next deadline.
//! Once the window runs dry it is refilled from the repository, starting
//! right after the entry that fired last.
//!
//! States of the loop:
//!
//! - *idle*: window empty, waiting for a new deadline
//! - *armed*: sleeping until the head of the window is due
//! - *firing*: handing the head off, refilling if that emptied the window

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use futures::FutureExt;
use parking_lot::Mutex;
use tokio::sync::mpsc;
use tokio::time::Instant;
use tracing::{debug, info, instrument, warn};

use idea_core::traits::IdeaRepository;
use idea_core::{Idea, Snowflake};

use crate::concurrency::TaskSpawner;
use crate::services::{timeout, ErrorReporter, ServiceError, ServiceOptions, ServiceResult};

use super::closer::IdeaCloser;
use super::window::{DeadlineKey, DeadlineWindow};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchedulerConfig {
    /// Capacity of the deadline window
    pub window: usize,
    /// Timeout of the window load and refill queries
    pub query_timeout: Duration,
    /// Delay before a failed refill is retried
    pub refill_retry: Duration,
}

impl From<&ServiceOptions> for SchedulerConfig {
    fn from(options: &ServiceOptions) -> Self {
        Self {
            window: options.deadline_window,
            query_timeout: options.query_timeout,
            refill_retry: options.refill_retry,
        }
    }
}

/// Handle to the scheduling loop
pub struct DeadlineScheduler {
    tx: mpsc::UnboundedSender<Idea>,
    /// Taken by the loop on start
    rx: Mutex<Option<mpsc::UnboundedReceiver<Idea>>>,
    repo: Arc<dyn IdeaRepository>,
    closer: Arc<dyn IdeaCloser>,
    spawner: Arc<dyn TaskSpawner>,
    reporter: Arc<dyn ErrorReporter>,
    config: SchedulerConfig,
}

impl DeadlineScheduler {
    pub fn new(
        repo: Arc<dyn IdeaRepository>,
        closer: Arc<dyn IdeaCloser>,
        spawner: Arc<dyn TaskSpawner>,
        reporter: Arc<dyn ErrorReporter>,
        config: SchedulerConfig,
    ) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self {
            tx,
            rx: Mutex::new(Some(rx)),
            repo,
            closer,
            spawner,
            reporter,
            config,
        }
    }

    /// Track the deadline of a new idea
    ///
    /// Ideas without a deadline are ignored. Deadlines added before
    /// [`start`](Self::start) are picked up once the loop runs.
    pub fn schedule(&self, idea: &Idea) {
        if idea.vote_until.is_none() {
            return;
        }
        if self.tx.send(idea.clone()).is_err() {
            debug!(message_id = %idea.message_id, "Deadline scheduler stopped, deadline left to the repository");
        }
    }

    /// Load the earliest deadlines at or after `now` and start the loop
    ///
    /// # Errors
    /// Fails if the window cannot be loaded, in which case the scheduler can
    /// be started again, or if it is already running.
    #[instrument(skip(self))]
    pub async fn start(&self, now: DateTime<Utc>) -> ServiceResult<()> {
        let Some(rx) = self.rx.lock().take() else {
            return Err(ServiceError::validation("deadline scheduler is already running"));
        };

        let loaded = timeout::repo(
            self.config.query_timeout,
            "expiring ideas",
            self.repo
                .expiring_ideas(now, Snowflake::default(), self.config.window),
        )
        .await;

        let ideas = match loaded {
            Ok(ideas) => ideas,
            Err(err) => {
                *self.rx.lock() = Some(rx);
                return Err(err.into());
            }
        };

        let mut window = DeadlineWindow::new(self.config.window);
        window.extend(ideas);
        info!(loaded = window.len(), "Deadline scheduler started");

        let worker = DeadlineLoop {
            window,
            rx,
            repo: Arc::clone(&self.repo),
            closer: Arc::clone(&self.closer),
            spawner: Arc::clone(&self.spawner),
            reporter: Arc::clone(&self.reporter),
            query_timeout: self.config.query_timeout,
            refill_retry: self.config.refill_retry,
            cursor: None,
            retry_at: None,
        };
        tokio::spawn(worker.run());

        Ok(())
    }
}

impl std::fmt::Debug for DeadlineScheduler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DeadlineScheduler")
            .field("running", &self.rx.lock().is_none())
            .field("config", &self.config)
            .finish()
    }
}

struct DeadlineLoop {
    window: DeadlineWindow,
    rx: mpsc::UnboundedReceiver<Idea>,
    repo: Arc<dyn IdeaRepository>,
    closer: Arc<dyn IdeaCloser>,
    spawner: Arc<dyn TaskSpawner>,
    reporter: Arc<dyn ErrorReporter>,
    query_timeout: Duration,
    refill_retry: Duration,
    /// Exclusive lower bound of the next refill
    cursor: Option<DeadlineKey>,
    /// Set while a failed refill waits to be retried
    retry_at: Option<Instant>,
}

impl DeadlineLoop {
    async fn run(mut self) {
        loop {
            let wake = self.next_wake();
            tokio::select! {
                received = self.rx.recv() => match received {
                    Some(idea) => self.insert(idea),
                    None => break,
                },
                () = sleep_until(wake) => self.on_wake().await,
            }
        }
        debug!("Deadline scheduler stopped");
    }

    fn insert(&mut self, idea: Idea) {
        let message_id = idea.message_id;
        if self.window.insert(idea) {
            debug!(%message_id, "Deadline added to window");
        } else {
            debug!(%message_id, "Deadline beyond window, left to refill");
        }
    }

    /// When the loop has to act next; `None` while idle
    fn next_wake(&self) -> Option<Instant> {
        match self.window.head_key() {
            Some((until, _)) => {
                let delay = (until - Utc::now()).to_std().unwrap_or_default();
                Some(Instant::now() + delay)
            }
            None => self.retry_at,
        }
    }

    async fn on_wake(&mut self) {
        if let Some((until, _)) = self.window.head_key() {
            // clocks disagree slightly; re-arm and try again
            if until > Utc::now() {
                return;
            }
            if let Some(idea) = self.window.pop_head() {
                self.fire(idea);
            }
        }

        if self.window.is_empty() {
            self.refill().await;
        }
    }

    fn fire(&mut self, idea: Idea) {
        // while a refill is pending its bound must not move past the ideas
        // it has yet to fetch
        if self.retry_at.is_none() {
            self.cursor = idea.deadline_key();
        }

        info!(
            message_id = %idea.message_id,
            channel_id = %idea.channel_id,
            vote_until = ?idea.vote_until,
            "Voting deadline reached"
        );

        let closer = Arc::clone(&self.closer);
        let reporter = Arc::clone(&self.reporter);
        self.spawner.spawn(
            async move {
                if let Err(err) = closer.close(idea).await {
                    reporter.capture(&err);
                }
            }
            .boxed(),
        );
    }

    async fn refill(&mut self) {
        let Some((after, after_id)) = self.cursor else {
            return;
        };
        if self.retry_at.is_some_and(|at| at > Instant::now()) {
            return;
        }

        let fetched = timeout::repo(
            self.query_timeout,
            "expiring ideas",
            self.repo
                .expiring_ideas(after, after_id, self.window.capacity()),
        )
        .await;

        match fetched {
            Ok(ideas) => {
                debug!(count = ideas.len(), after = %after, "Deadline window refilled");
                self.window.extend(ideas);
                self.retry_at = None;
            }
            Err(err) => {
                warn!(error = %err, retry_in = ?self.refill_retry, "Deadline window refill failed");
                self.reporter.capture(&err.into());
                self.retry_at = Some(Instant::now() + self.refill_retry);
            }
        }
    }
}

async fn sleep_until(at: Option<Instant>) {
    match at {
        Some(at) => tokio::time::sleep_until(at).await,
        None => std::future::pending().await,
    }
}
