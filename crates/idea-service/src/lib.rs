//! # idea-service
//!
//! Application layer: turns chat messages into ideas, arbitrates votes
//! against closing work per idea, and closes every idea once its voting
//! deadline passes, including deadlines missed while the process was down.
//!
//! ## Modules
//!
//! - [`format`]: message parser, idea and vote formatters
//! - [`concurrency`]: per-idea serializer and task spawner
//! - [`scheduler`]: deadline window, deadline scheduler, expired sweep
//! - [`services`]: `IdeaService` and `ChannelService` over the ports of `idea-core`

pub mod concurrency;
pub mod format;
pub mod scheduler;
pub mod services;

pub use concurrency::{ManualSpawner, Serializer, SerializerError, TaskSpawner, TokioSpawner};
pub use scheduler::{DeadlineScheduler, DeadlineWindow, IdeaCloser};
pub use services::{
    ChannelService, ClosedIdeaCache, ErrorKind, ErrorReporter, IdeaService, ServiceContext,
    ServiceContextBuilder, ServiceError, ServiceOptions, ServiceResult, TracingReporter,
};
