//! Session registry and repair admission.
//!
//! One [`RecoverySession`] spans every channel notified for a single
//! detected fault. The registry is an explicit object guarded by a mutex,
//! and that mutex doubles as the admission guard: the first repair request
//! to claim it wins, and the claim retires repair-listening for the whole
//! session inside the same critical section, so a request already in
//! flight on another channel can never be admitted as well.
//!
//! The mutex is never held across an await point.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tokio::sync::oneshot;
use tracing::debug;

use crate::channel::UiChannel;
use crate::error::RecoveryError;

/// Registry-local channel identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) struct ChannelId(u64);

pub(crate) type CompletionSender = oneshot::Sender<Result<(), RecoveryError>>;
pub(crate) type CompletionReceiver = oneshot::Receiver<Result<(), RecoveryError>>;

struct Registered {
    channel: Arc<dyn UiChannel>,
    /// Present until the channel's future settles. Taken on first settle so
    /// a disconnect and a repair outcome landing together cannot settle the
    /// same future twice.
    completion: Option<CompletionSender>,
}

/// Channel set and admission state for one recovery session.
#[derive(Default)]
pub(crate) struct RecoverySession {
    inner: Mutex<SessionInner>,
}

#[derive(Default)]
struct SessionInner {
    next_id: u64,
    admitted: bool,
    channels: HashMap<u64, Registered>,
}

impl RecoverySession {
    /// Registers a channel that received the corruption report.
    ///
    /// Returns the registry id and the receiving half of the channel's
    /// completion cell.
    pub(crate) fn register(
        &self,
        channel: Arc<dyn UiChannel>,
    ) -> (ChannelId, CompletionReceiver) {
        let (tx, rx) = oneshot::channel();
        let mut inner = self.lock();
        let id = ChannelId(inner.next_id);
        inner.next_id += 1;
        inner.channels.insert(
            id.0,
            Registered {
                channel,
                completion: Some(tx),
            },
        );
        debug!(
            channel = id.0,
            registered = inner.channels.len(),
            "channel registered for recovery"
        );
        (id, rx)
    }

    /// Attempts to claim the session's single repair admission for `id`.
    ///
    /// The claim and the retirement of every channel's repair-listening
    /// happen under one lock acquisition: once this returns `true`, every
    /// later repair request in the session (including one already in
    /// flight on another channel) observes the claimed state and is
    /// dropped.
    pub(crate) fn try_admit(&self, id: ChannelId) -> bool {
        let mut inner = self.lock();
        if inner.admitted {
            return false;
        }
        inner.admitted = true;
        debug!(channel = id.0, "repair request admitted");
        true
    }

    /// Settles a channel's completion future, if it has not settled yet.
    ///
    /// The channel stays registered; only its own disconnect removes it.
    pub(crate) fn settle(&self, id: ChannelId, outcome: Result<(), RecoveryError>) {
        let completion = self
            .lock()
            .channels
            .get_mut(&id.0)
            .and_then(|registered| registered.completion.take());
        if let Some(tx) = completion {
            // The receiving half may already be gone; nothing left to tell.
            let _ = tx.send(outcome);
        }
    }

    /// Removes a disconnected channel and settles its future if the repair
    /// outcome has not settled it already.
    pub(crate) fn deregister(&self, id: ChannelId) {
        let removed = self.lock().channels.remove(&id.0);
        if let Some(mut registered) = removed {
            debug!(channel = id.0, "channel disconnected; deregistered");
            if let Some(tx) = registered.completion.take() {
                let _ = tx.send(Ok(()));
            }
        }
    }

    /// Snapshot of every channel still registered.
    pub(crate) fn registered_channels(&self) -> Vec<Arc<dyn UiChannel>> {
        self.lock()
            .channels
            .values()
            .map(|registered| Arc::clone(&registered.channel))
            .collect()
    }

    /// Number of channels currently registered.
    pub(crate) fn len(&self) -> usize {
        self.lock().channels.len()
    }

    fn lock(&self) -> MutexGuard<'_, SessionInner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
