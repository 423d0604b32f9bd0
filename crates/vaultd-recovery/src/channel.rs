//! The UI channel contract.
//!
//! A channel is one live connection to a UI client. The transport behind it
//! (extension port, local socket, in-process double) is out of scope here;
//! the coordinator only needs best-effort delivery, an inbound feed, and a
//! one-shot disconnect signal.

use async_trait::async_trait;
use tokio::sync::mpsc;

use vaultd_core::messages::{InboundMessage, OutboundMessage};

/// One UI client connection, as seen by the recovery coordinator.
///
/// # Contract
///
/// - [`send`](Self::send) is best-effort and must not error: `false` means
///   the peer is already gone. Delivery to a live peer preserves send
///   order.
/// - [`subscribe`](Self::subscribe) hands over the inbound feed. The
///   coordinator calls it at most once, and only after a successful send;
///   implementations asked twice should return an already-closed feed.
///   Messages arrive in the peer's send order. The feed closing
///   (`recv() -> None`) is the channel's one-shot, irreversible disconnect
///   signal; no message follows it.
///
/// Feeds are unbounded: inbound traffic here is a handful of user-driven
/// frames per client, not a data path.
#[async_trait]
pub trait UiChannel: Send + Sync + 'static {
    /// Attempts to deliver a frame to the peer.
    async fn send(&self, message: OutboundMessage) -> bool;

    /// Takes the inbound feed for this channel.
    fn subscribe(&self) -> mpsc::UnboundedReceiver<InboundMessage>;
}
