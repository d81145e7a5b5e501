//! Error types for the domain layer and the chat platform port

mod domain_error;
mod platform_error;

pub use domain_error::DomainError;
pub use platform_error::{PlatformError, PlatformResult};
