//! Process-wide named repair lock.
//!
//! Mutual exclusion between repair attempts is the only cross-session
//! coupling in the recovery flow. The lock is named, try-once, and
//! non-blocking: acquisition either succeeds immediately or reports the
//! name as held; it never queues and never waits. Release happens when the
//! ticket drops, including on the failure path of a repair attempt.

use std::collections::HashSet;
use std::sync::{Arc, Mutex, OnceLock, PoisonError};

use tracing::debug;

/// Name guarding the repair action unless the handler is configured with a
/// different one.
pub const DEFAULT_REPAIR_LOCK: &str = "vaultd.state-repair";

/// Registry of held lock names.
///
/// Cloning shares the underlying registry. The process-global instance is
/// reachable via [`NamedLockRegistry::global`]; tests inject their own to
/// stay isolated from each other.
#[derive(Clone, Debug, Default)]
pub struct NamedLockRegistry {
    held: Arc<Mutex<HashSet<String>>>,
}

impl NamedLockRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The process-global registry.
    pub fn global() -> &'static Self {
        static GLOBAL: OnceLock<NamedLockRegistry> = OnceLock::new();
        GLOBAL.get_or_init(NamedLockRegistry::new)
    }

    /// Attempts to acquire `name` exclusively.
    ///
    /// Returns a ticket on success, `None` if the name is held anywhere
    /// that shares this registry. Determined immediately; never waits.
    #[must_use]
    pub fn try_acquire(&self, name: &str) -> Option<RepairLockTicket> {
        let mut held = self.held.lock().unwrap_or_else(PoisonError::into_inner);
        if held.insert(name.to_owned()) {
            debug!(lock = name, "repair lock acquired");
            Some(RepairLockTicket {
                held: Arc::clone(&self.held),
                name: name.to_owned(),
            })
        } else {
            None
        }
    }

    /// Whether `name` is currently held.
    #[must_use]
    pub fn is_held(&self, name: &str) -> bool {
        self.held
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .contains(name)
    }
}

/// Exclusive hold on a lock name. Dropping the ticket releases the name.
#[derive(Debug)]
pub struct RepairLockTicket {
    held: Arc<Mutex<HashSet<String>>>,
    name: String,
}

impl RepairLockTicket {
    /// The held name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }
}

impl Drop for RepairLockTicket {
    fn drop(&mut self) {
        self.held
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&self.name);
        debug!(lock = %self.name, "repair lock released");
    }
}
