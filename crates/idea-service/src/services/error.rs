//! Service layer error types
//!
//! Provides a unified error type for all service operations and sorts every
//! failure into one of four kinds that decide how it is surfaced.

use idea_core::{DomainError, Permissions, PlatformError};
use thiserror::Error;

use crate::concurrency::SerializerError;
use crate::format::FormatError;

/// Shown in place of internal error details
pub const APOLOGY: &str =
    "Something went wrong while processing this idea. The error has been recorded, please try again later.";

/// How a failure is surfaced
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The author can fix it; shown verbatim
    UserFormat,
    /// Repository or platform failure; captured, operation aborted for that idea only
    Transient,
    /// The bot lacks a platform permission; announced once per channel
    Permission,
    /// A defect; never expected once input passed the parser
    Invariant,
}

/// Service layer error type
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error(transparent)]
    Platform(#[from] PlatformError),

    #[error(transparent)]
    Format(#[from] FormatError),

    #[error(transparent)]
    Serializer(#[from] SerializerError),

    /// The bot's own permissions in a channel are insufficient
    #[error("I need the following permissions in this channel: {}", .missing.names())]
    MissingPermissions { missing: Permissions },

    /// Service wiring error (e.g. a missing dependency)
    #[error("Validation error: {0}")]
    Validation(String),

    /// Per-item failures of a batch operation
    #[error("{} errors occurred: {}", .0.len(), join(.0))]
    Multiple(Vec<ServiceError>),
}

fn join(errors: &[ServiceError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

impl ServiceError {
    /// Create a validation error
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Create a missing permissions error
    pub fn missing_permissions(missing: Permissions) -> Self {
        Self::MissingPermissions { missing }
    }

    /// Combine per-item errors, `None` if there were none
    pub fn combine(mut errors: Vec<ServiceError>) -> Option<Self> {
        match errors.len() {
            0 => None,
            1 => errors.pop(),
            _ => Some(Self::Multiple(errors)),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Domain(e) if e.is_invariant_violation() => ErrorKind::Invariant,
            Self::Domain(e) if e.is_user_facing() => ErrorKind::UserFormat,
            Self::Domain(_) => ErrorKind::Transient,
            Self::Platform(e) if e.is_missing_permission() => ErrorKind::Permission,
            Self::Platform(_) => ErrorKind::Transient,
            Self::Format(_) => ErrorKind::UserFormat,
            Self::Serializer(SerializerError::Panicked(_)) => ErrorKind::Invariant,
            Self::Serializer(SerializerError::Closed) => ErrorKind::Transient,
            Self::MissingPermissions { .. } => ErrorKind::Permission,
            Self::Validation(_) => ErrorKind::Invariant,
            // the most severe kind among the items
            Self::Multiple(errors) => errors
                .iter()
                .map(Self::kind)
                .max_by_key(|kind| match kind {
                    ErrorKind::UserFormat => 0,
                    ErrorKind::Transient => 1,
                    ErrorKind::Permission => 2,
                    ErrorKind::Invariant => 3,
                })
                .unwrap_or(ErrorKind::Transient),
        }
    }

    /// Get the error code for logging and error capture
    pub fn code(&self) -> &'static str {
        match self {
            Self::Domain(e) => e.code(),
            Self::Platform(e) => e.code(),
            Self::Format(_) => "INVALID_IDEA_FORMAT",
            Self::Serializer(SerializerError::Panicked(_)) => "TASK_PANICKED",
            Self::Serializer(SerializerError::Closed) => "TASK_ABANDONED",
            Self::MissingPermissions { .. } => "MISSING_PERMISSIONS",
            Self::Validation(_) => "VALIDATION_ERROR",
            Self::Multiple(_) => "MULTIPLE_ERRORS",
        }
    }

    /// Text that may be shown in the channel
    ///
    /// User-correctable and permission errors are shown as-is, anything
    /// else is replaced by a generic apology.
    pub fn user_message(&self) -> String {
        match self.kind() {
            ErrorKind::UserFormat | ErrorKind::Permission if !matches!(self, Self::Multiple(_)) => {
                self.to_string()
            }
            _ => APOLOGY.to_string(),
        }
    }

    /// Whether the error should be sent to the error reporter
    pub fn should_capture(&self) -> bool {
        matches!(self.kind(), ErrorKind::Transient | ErrorKind::Invariant)
    }
}

/// Result type for service operations
pub type ServiceResult<T> = Result<T, ServiceError>;
