//! Errors returned by the chat platform port

use thiserror::Error;

/// Chat platform failures
#[derive(Debug, Clone, Error)]
pub enum PlatformError {
    /// The channel, message, or reaction no longer exists
    #[error("Unknown resource: {0}")]
    UnknownResource(String),

    #[error("Missing permission: {0}")]
    MissingPermission(String),

    #[error("Platform request failed: {0}")]
    Request(String),

    #[error("Platform request timed out")]
    Timeout,
}

impl PlatformError {
    pub fn code(&self) -> &'static str {
        match self {
            Self::UnknownResource(_) => "UNKNOWN_RESOURCE",
            Self::MissingPermission(_) => "MISSING_PERMISSIONS",
            Self::Request(_) => "PLATFORM_REQUEST_FAILED",
            Self::Timeout => "PLATFORM_TIMEOUT",
        }
    }

    #[inline]
    pub fn is_unknown_resource(&self) -> bool {
        matches!(self, Self::UnknownResource(_))
    }

    #[inline]
    pub fn is_missing_permission(&self) -> bool {
        matches!(self, Self::MissingPermission(_))
    }
}

pub type PlatformResult<T> = Result<T, PlatformError>;
