//! vaultd-core - Core data types for the vaultd recovery flow
//!
//! This crate holds the pure data layer shared by the recovery coordinator
//! and its callers: the triggering fault, shape-tolerant inspection of an
//! untrusted backup snapshot, the user-facing corruption report, and the
//! wire message schema exchanged with UI clients.
//!
//! Nothing in here performs I/O or touches the async runtime; everything is
//! total over malformed input, since the whole flow runs while the wallet's
//! persisted state is already known to be broken.
//!
//! # Modules
//!
//! - [`fault`]: the triggering fault and its user-facing error view
//! - [`backup`]: total accessors over an untrusted backup snapshot
//! - [`report`]: corruption report derivation
//! - [`messages`]: JSON wire schema for the recovery flow

pub mod backup;
pub mod fault;
pub mod messages;
pub mod report;

pub use fault::{CorruptionFault, ErrorInfo};
pub use messages::{InboundMessage, OutboundMessage};
pub use report::CorruptionReport;
