//! Backup resolution.
//!
//! The resolved backup feeds two consumers: the corruption report shown on
//! every UI, and the repair action itself. Resolution prefers a snapshot
//! attached to the fault at the detection site and otherwise asks the
//! persistence collaborator. The flow is already responding to one failure,
//! so a secondary failure here must never block it: store errors degrade to
//! "no backup".

use async_trait::async_trait;
use serde_json::Value;
use tracing::warn;

use vaultd_core::fault::CorruptionFault;

use crate::error::BoxError;

/// Persistence collaborator holding the most recent pre-corruption backup.
#[async_trait]
pub trait BackupStore: Send + Sync {
    /// Fetches the last backup, if one was ever written.
    async fn get_backup(&self) -> Result<Option<Value>, BoxError>;
}

/// Resolves the best-effort backup for a session.
pub(crate) async fn resolve_backup(
    fault: &CorruptionFault,
    store: &dyn BackupStore,
) -> Option<Value> {
    if let Some(attached) = fault.attached_backup() {
        return Some(attached.clone());
    }
    match store.get_backup().await {
        Ok(Some(backup)) if !backup.is_null() => Some(backup),
        Ok(_) => None,
        Err(error) => {
            warn!(%error, "backup lookup failed during recovery; continuing without one");
            None
        }
    }
}
