//! Business logic services
//!
//! [`IdeaService`] handles platform events and the idea lifecycle,
//! [`ChannelService`] manages which channels take ideas.

pub mod cache;
pub mod channel;
pub mod closing;
pub mod context;
pub mod error;
pub mod idea;
pub mod options;
pub mod reporter;
mod store;
pub(crate) mod timeout;

pub use cache::ClosedIdeaCache;
pub use channel::ChannelService;
pub use closing::VoteCloser;
pub use context::{ServiceContext, ServiceContextBuilder};
pub use error::{ErrorKind, ServiceError, ServiceResult};
pub use idea::IdeaService;
pub use options::ServiceOptions;
pub use reporter::{ErrorReporter, TracingReporter};
