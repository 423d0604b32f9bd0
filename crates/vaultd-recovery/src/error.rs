//! Error types for the recovery coordinator.
//!
//! The flow runs while the wallet is already broken, so almost every
//! failure inside it is absorbed locally. A failed backup lookup degrades
//! to "no backup" and a malformed snapshot to defaults; a failed delivery
//! is a boolean rather than an error. The single class that propagates is
//! a failing repair action, and it reaches exactly one caller: the channel
//! whose repair request was admitted.

use thiserror::Error;

/// Boxed error used at collaborator seams (backup store, repair action).
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Errors surfaced through a channel's completion future.
#[derive(Debug, Error)]
pub enum RecoveryError {
    /// The admitted repair action failed.
    #[error("repair action failed: {0}")]
    Repair(#[source] BoxError),
}

impl RecoveryError {
    /// Wraps a repair action failure.
    #[must_use]
    pub fn repair(error: impl Into<BoxError>) -> Self {
        Self::Repair(error.into())
    }
}

/// Result type for recovery operations.
pub type RecoveryResult<T> = Result<T, RecoveryError>;
