//! Domain errors - error types for the domain layer

use thiserror::Error;

use crate::value_objects::Snowflake;

/// Domain layer errors
#[derive(Debug, Error)]
pub enum DomainError {
    // =========================================================================
    // Not Found Errors
    // =========================================================================
    #[error("Idea not found: {0}")]
    IdeaNotFound(Snowflake),

    #[error("Channel settings not found: {0}")]
    ChannelSettingsNotFound(Snowflake),

    // =========================================================================
    // Channel Errors
    // =========================================================================
    #[error("Ideas are already disabled in channel {0}")]
    ChannelAlreadyDisabled(Snowflake),

    // =========================================================================
    // Invariant Errors
    // =========================================================================
    #[error("Idea has {0} sections, at most 15 are allowed")]
    TooManySections(usize),

    #[error("Emoji {0} is used more than once")]
    DuplicateEmoji(String),

    #[error("Invariant violated: {0}")]
    InvariantViolation(String),

    // =========================================================================
    // Infrastructure Errors
    // =========================================================================
    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Corrupt record: {0}")]
    CorruptRecord(String),

    #[error("Repository call timed out: {0}")]
    Timeout(&'static str),
}

impl DomainError {
    /// Get error code for logging and error capture
    pub fn code(&self) -> &'static str {
        match self {
            Self::IdeaNotFound(_) => "UNKNOWN_IDEA",
            Self::ChannelSettingsNotFound(_) => "UNKNOWN_CHANNEL_SETTINGS",
            Self::ChannelAlreadyDisabled(_) => "CHANNEL_ALREADY_DISABLED",
            Self::TooManySections(_) => "TOO_MANY_SECTIONS",
            Self::DuplicateEmoji(_) => "DUPLICATE_EMOJI",
            Self::InvariantViolation(_) => "INVARIANT_VIOLATION",
            Self::DatabaseError(_) => "DATABASE_ERROR",
            Self::CorruptRecord(_) => "CORRUPT_RECORD",
            Self::Timeout(_) => "REPOSITORY_TIMEOUT",
        }
    }

    /// Check if this is a "not found" error
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            Self::IdeaNotFound(_) | Self::ChannelSettingsNotFound(_)
        )
    }

    /// Check if this error is a defect rather than a runtime condition
    pub fn is_invariant_violation(&self) -> bool {
        matches!(
            self,
            Self::TooManySections(_)
                | Self::DuplicateEmoji(_)
                | Self::InvariantViolation(_)
                | Self::CorruptRecord(_)
        )
    }

    /// Check if the operation may succeed when retried
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::DatabaseError(_) | Self::Timeout(_))
    }

    /// Check if the error should be shown to the user as-is
    pub fn is_user_facing(&self) -> bool {
        matches!(self, Self::ChannelAlreadyDisabled(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        assert_eq!(DomainError::IdeaNotFound(Snowflake::new(1)).code(), "UNKNOWN_IDEA");
        assert_eq!(
            DomainError::ChannelAlreadyDisabled(Snowflake::new(1)).code(),
            "CHANNEL_ALREADY_DISABLED"
        );
        assert_eq!(DomainError::Timeout("idea").code(), "REPOSITORY_TIMEOUT");
    }

    #[test]
    fn test_classification() {
        assert!(DomainError::IdeaNotFound(Snowflake::new(1)).is_not_found());
        assert!(DomainError::TooManySections(16).is_invariant_violation());
        assert!(DomainError::DatabaseError("conn reset".to_string()).is_transient());
        assert!(!DomainError::DuplicateEmoji("🇦".to_string()).is_transient());
        assert!(DomainError::ChannelAlreadyDisabled(Snowflake::new(1)).is_user_facing());
    }

    #[test]
    fn test_error_display() {
        let err = DomainError::TooManySections(16);
        assert_eq!(err.to_string(), "Idea has 16 sections, at most 15 are allowed");

        let err = DomainError::ChannelAlreadyDisabled(Snowflake::new(42));
        assert_eq!(err.to_string(), "Ideas are already disabled in channel 42");
    }
}
