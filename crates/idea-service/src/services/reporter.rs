//! Error capture
//!
//! Failures that nobody waits for (scheduler closes, sweep items, reaction
//! handling) end up here instead of being returned.

use tracing::{error, warn};

use super::error::{ErrorKind, ServiceError};

/// Collects errors that cannot be returned to a caller
pub trait ErrorReporter: Send + Sync {
    fn capture(&self, err: &ServiceError);
}

/// Reports errors through `tracing`
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingReporter;

impl ErrorReporter for TracingReporter {
    fn capture(&self, err: &ServiceError) {
        if let ServiceError::Multiple(errors) = err {
            for err in errors {
                self.capture(err);
            }
            return;
        }

        match err.kind() {
            ErrorKind::Transient | ErrorKind::Invariant => {
                error!(code = err.code(), kind = ?err.kind(), error = %err, "Captured error");
            }
            ErrorKind::UserFormat | ErrorKind::Permission => {
                warn!(code = err.code(), kind = ?err.kind(), error = %err, "Captured error");
            }
        }
    }
}
