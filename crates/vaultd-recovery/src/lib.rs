//! vaultd-recovery - Coordination of the post-corruption recovery flow.
//!
//! When the wallet's persisted state is detected as corrupted, an unknown
//! number of UI clients may be connected. This crate coordinates what
//! happens next:
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                     CorruptionHandler                        │
//! │                                                              │
//! │  notify every channel ──► register survivors                 │
//! │         │                        │                           │
//! │         │              inbound REPAIR_DATABASE               │
//! │         │                        │                           │
//! │         │              admission (exactly one wins)          │
//! │         │                        │                           │
//! │         │              named try-once repair lock            │
//! │         │                        │                           │
//! │         │              repair action (caller-supplied)       │
//! │         │                        │                           │
//! │         └───────────── reload broadcast ─────────────────────│
//! │                                                              │
//! │  each channel's future settles on its own disconnect, or     │
//! │  (admitted channel only) on the repair outcome               │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Guarantees
//!
//! - Every channel open at detection time is offered the corruption report;
//!   a channel whose delivery fails completes immediately and is never
//!   registered.
//! - At most one repair request is admitted per session, and at most one
//!   repair action runs process-wide at any instant (the named lock is the
//!   only cross-session coupling).
//! - One channel's repair failure reaches only that channel's completion
//!   future; every other channel completes cleanly.
//! - A completion future settles exactly once.
//!
//! # Modules
//!
//! - [`channel`]: the UI channel contract (transport seam)
//! - [`backup`]: once-per-session backup resolution
//! - [`lock`]: process-wide named try-once repair lock
//! - [`handler`]: the coordinator and its public entry point
//! - [`error`]: the one propagating error class

pub mod backup;
pub mod channel;
pub mod error;
pub mod handler;
pub mod lock;
mod session;

pub use backup::BackupStore;
pub use channel::UiChannel;
pub use error::{BoxError, RecoveryError, RecoveryResult};
pub use handler::{CorruptionHandler, CorruptionHandlerConfig, RepairAction};
pub use lock::{NamedLockRegistry, RepairLockTicket, DEFAULT_REPAIR_LOCK};
