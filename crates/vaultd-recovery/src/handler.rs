//! The corruption recovery coordinator.
//!
//! One [`CorruptionHandler`] spans one recovery session: every UI channel
//! that was open when a fault was detected is handed to
//! [`handle_corruption`](CorruptionHandler::handle_corruption), and the
//! handler coordinates notification, repair admission, the serialized
//! repair attempt, and the reload broadcast across all of them.
//!
//! # Flow per channel
//!
//! 1. Resolve the backup and derive the corruption report (memoized; the
//!    first caller does the work, racing callers share it).
//! 2. Send the report. A failed send ends that channel's participation
//!    immediately with a successful no-op completion; it is never
//!    registered and no listener is attached.
//! 3. Register the channel and spawn its listener task.
//! 4. The listener admits the session's single repair request, runs the
//!    repair under the named lock, broadcasts the reload, and settles
//!    futures; the channel's own disconnect finalizes whatever is left.
//!
//! # Invariants
//!
//! - At most one repair request is admitted per session (mutex-guarded
//!   claim in the session registry).
//! - At most one repair action runs at any instant across every session
//!   sharing the lock registry (named try-once lock).
//! - A repair failure reaches only the admitted channel's future.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::{mpsc, OnceCell};
use tracing::{debug, info, warn};

use vaultd_core::fault::CorruptionFault;
use vaultd_core::messages::{InboundMessage, OutboundMessage};
use vaultd_core::report::CorruptionReport;

use crate::backup::{resolve_backup, BackupStore};
use crate::channel::UiChannel;
use crate::error::{BoxError, RecoveryError};
use crate::lock::{NamedLockRegistry, DEFAULT_REPAIR_LOCK};
use crate::session::{ChannelId, RecoverySession};

/// Caller-supplied repair action.
///
/// Runs at most once per session, with the resolved backup, under the named
/// repair lock. The blanket impl lets an async closure serve directly:
///
/// ```rust,ignore
/// let repair = Arc::new(|backup: Option<Value>| async move {
///     rebuild_database(backup).await
/// });
/// ```
#[async_trait]
pub trait RepairAction: Send + Sync {
    /// Attempts the repair with the resolved backup.
    async fn repair(&self, backup: Option<Value>) -> Result<(), BoxError>;
}

#[async_trait]
impl<F, Fut> RepairAction for F
where
    F: Fn(Option<Value>) -> Fut + Send + Sync,
    Fut: std::future::Future<Output = Result<(), BoxError>> + Send + 'static,
{
    async fn repair(&self, backup: Option<Value>) -> Result<(), BoxError> {
        (self)(backup).await
    }
}

/// Configuration for a [`CorruptionHandler`].
#[derive(Clone, Debug)]
pub struct CorruptionHandlerConfig {
    /// Name guarding the repair action. Sessions sharing a lock registry
    /// and a name exclude each other's repair attempts.
    pub lock_name: String,

    /// Lock registry to acquire from. Defaults to the process-global one.
    pub locks: NamedLockRegistry,
}

impl Default for CorruptionHandlerConfig {
    fn default() -> Self {
        Self {
            lock_name: DEFAULT_REPAIR_LOCK.to_owned(),
            locks: NamedLockRegistry::global().clone(),
        }
    }
}

impl CorruptionHandlerConfig {
    /// Creates the default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the repair lock name.
    #[must_use]
    pub fn with_lock_name(mut self, name: impl Into<String>) -> Self {
        self.lock_name = name.into();
        self
    }

    /// Uses an explicit lock registry instead of the process-global one.
    #[must_use]
    pub fn with_lock_registry(mut self, locks: NamedLockRegistry) -> Self {
        self.locks = locks;
        self
    }
}

/// Once-per-session resolution product: the backup and the report derived
/// from it.
#[derive(Clone)]
struct SessionSnapshot {
    backup: Option<Value>,
    report: CorruptionReport,
}

struct HandlerShared {
    session: RecoverySession,
    snapshot: OnceCell<SessionSnapshot>,
    config: CorruptionHandlerConfig,
}

/// Coordinates the recovery flow across every UI channel open at detection
/// time.
///
/// One handler is one session. Cloning is cheap and shares the session;
/// the handler is expected to be called once per open channel with the same
/// fault, store, and repair action.
#[derive(Clone)]
pub struct CorruptionHandler {
    shared: Arc<HandlerShared>,
}

impl Default for CorruptionHandler {
    fn default() -> Self {
        Self::new()
    }
}

impl CorruptionHandler {
    /// Creates a handler with the default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(CorruptionHandlerConfig::default())
    }

    /// Creates a handler with an explicit configuration.
    #[must_use]
    pub fn with_config(config: CorruptionHandlerConfig) -> Self {
        Self {
            shared: Arc::new(HandlerShared {
                session: RecoverySession::default(),
                snapshot: OnceCell::new(),
                config,
            }),
        }
    }

    /// Number of channels currently registered in the session.
    ///
    /// Drains to zero once every notified client has reacted to the reload
    /// instruction by disconnecting.
    #[must_use]
    pub fn registered_count(&self) -> usize {
        self.shared.session.len()
    }

    /// Runs the recovery flow for one channel.
    ///
    /// Called once per channel that was open when the fault was detected.
    /// The returned future is the channel's completion: it resolves when
    /// the channel disconnects (or when its delivery already failed), and,
    /// for the single channel whose repair request is admitted, it resolves
    /// or fails with the repair outcome.
    ///
    /// # Errors
    ///
    /// [`RecoveryError::Repair`] iff this channel's repair request was
    /// admitted and the repair action failed. Every other channel in the
    /// session completes with `Ok(())` regardless.
    pub async fn handle_corruption(
        &self,
        channel: Arc<dyn UiChannel>,
        fault: CorruptionFault,
        store: Arc<dyn BackupStore>,
        repair: Arc<dyn RepairAction>,
    ) -> Result<(), RecoveryError> {
        let snapshot = self
            .shared
            .snapshot
            .get_or_init(|| async {
                let backup = resolve_backup(&fault, store.as_ref()).await;
                let report = CorruptionReport::derive(&fault, backup.as_ref());
                SessionSnapshot { backup, report }
            })
            .await
            .clone();

        let notified = channel
            .send(OutboundMessage::DisplayCorruption(snapshot.report))
            .await;
        if !notified {
            debug!("channel closed before corruption notice; completing without registration");
            return Ok(());
        }

        let events = channel.subscribe();
        let (id, completion) = self.shared.session.register(Arc::clone(&channel));

        let coordinator = self.clone();
        tokio::spawn(async move {
            coordinator.listen(id, events, snapshot.backup, repair).await;
        });

        match completion.await {
            Ok(outcome) => outcome,
            // The listener died without settling (runtime teardown). The
            // channel cannot observe anything further; report completion.
            Err(_) => Ok(()),
        }
    }

    /// Per-channel listener: drains the inbound feed until disconnect.
    async fn listen(
        &self,
        id: ChannelId,
        mut events: mpsc::UnboundedReceiver<InboundMessage>,
        backup: Option<Value>,
        repair: Arc<dyn RepairAction>,
    ) {
        while let Some(message) = events.recv().await {
            if !message.is_repair_request() {
                // Not ours to interpret; the contract says ignore.
                continue;
            }
            if !self.shared.session.try_admit(id) {
                debug!("repair request after admission; dropping");
                continue;
            }
            self.execute_repair(id, backup.clone(), repair.as_ref())
                .await;
        }
        self.shared.session.deregister(id);
    }

    /// Runs the admitted repair attempt under the named lock and settles
    /// the admitted channel's future with the outcome.
    async fn execute_repair(&self, id: ChannelId, backup: Option<Value>, repair: &dyn RepairAction) {
        let lock_name = &self.shared.config.lock_name;
        let Some(ticket) = self.shared.config.locks.try_acquire(lock_name) else {
            // Another session's repair is in flight. This session performs
            // no repair and sends no reload; the admitted channel still
            // completes cleanly.
            warn!(lock = %lock_name, "repair already running elsewhere; skipping this attempt");
            self.shared.session.settle(id, Ok(()));
            return;
        };

        info!("repair request admitted; running repair action");
        let outcome = repair.repair(backup).await;

        // The reload goes out whether the repair succeeded or not: every
        // client that saw the corruption screen must tear itself down and
        // reinitialize against whatever state the attempt left behind.
        self.broadcast_reload().await;
        drop(ticket);

        match outcome {
            Ok(()) => {
                info!("repair action completed");
                self.shared.session.settle(id, Ok(()));
            }
            Err(error) => {
                warn!(%error, "repair action failed");
                self.shared.session.settle(id, Err(RecoveryError::Repair(error)));
            }
        }
    }

    /// Best-effort reload instruction to every channel still registered.
    async fn broadcast_reload(&self) {
        let channels = self.shared.session.registered_channels();
        debug!(channels = channels.len(), "broadcasting reload instruction");
        for channel in channels {
            // A peer that vanished since registration is a harmless no-op.
            let _ = channel.send(OutboundMessage::ReloadWindow).await;
        }
    }
}
