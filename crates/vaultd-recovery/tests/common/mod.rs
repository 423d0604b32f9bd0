#![allow(dead_code)] // not every double is used by every test binary

//! In-process doubles for the recovery flow tests.
//!
//! `TestChannel` plays the role of one UI client: outbound frames are
//! recorded, the test injects inbound frames, and a reload instruction
//! makes the client tear itself down, mirroring what a real UI does.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::{mpsc, oneshot};

use vaultd_core::messages::{InboundMessage, OutboundMessage};
use vaultd_core::report::CorruptionReport;
use vaultd_recovery::{BackupStore, BoxError, CorruptionHandler, RepairAction, UiChannel};

/// One fake UI client connection.
pub struct TestChannel {
    connected: AtomicBool,
    sent: Mutex<Vec<OutboundMessage>>,
    feed_tx: Mutex<Option<mpsc::UnboundedSender<InboundMessage>>>,
    feed_rx: Mutex<Option<mpsc::UnboundedReceiver<InboundMessage>>>,
}

impl TestChannel {
    pub fn new() -> Arc<Self> {
        let (tx, rx) = mpsc::unbounded_channel();
        Arc::new(Self {
            connected: AtomicBool::new(true),
            sent: Mutex::new(Vec::new()),
            feed_tx: Mutex::new(Some(tx)),
            feed_rx: Mutex::new(Some(rx)),
        })
    }

    /// Severs the connection: later sends fail and the inbound feed closes
    /// once already-queued frames are drained.
    pub fn disconnect(&self) {
        self.connected.store(false, Ordering::SeqCst);
        self.feed_tx.lock().unwrap().take();
    }

    /// Injects an inbound frame, as the UI process would send it.
    pub fn push_inbound(&self, message: InboundMessage) {
        if let Some(tx) = self.feed_tx.lock().unwrap().as_ref() {
            let _ = tx.send(message);
        }
    }

    /// Clicks the repair button.
    pub fn click_repair(&self) {
        self.push_inbound(InboundMessage::repair_request());
    }

    /// Everything the coordinator managed to deliver.
    pub fn sent(&self) -> Vec<OutboundMessage> {
        self.sent.lock().unwrap().clone()
    }

    /// Corruption reports received by this client.
    pub fn corruption_reports(&self) -> Vec<CorruptionReport> {
        self.sent()
            .into_iter()
            .filter_map(|message| match message {
                OutboundMessage::DisplayCorruption(report) => Some(report),
                OutboundMessage::ReloadWindow => None,
            })
            .collect()
    }

    /// Number of reload instructions received by this client.
    pub fn reload_count(&self) -> usize {
        self.sent()
            .iter()
            .filter(|message| matches!(message, OutboundMessage::ReloadWindow))
            .count()
    }
}

#[async_trait]
impl UiChannel for TestChannel {
    async fn send(&self, message: OutboundMessage) -> bool {
        if !self.connected.load(Ordering::SeqCst) {
            return false;
        }
        let is_reload = matches!(message, OutboundMessage::ReloadWindow);
        self.sent.lock().unwrap().push(message);
        if is_reload {
            // A real client reacts to the reload instruction by tearing
            // itself down, which surfaces here as its disconnect.
            self.disconnect();
        }
        true
    }

    fn subscribe(&self) -> mpsc::UnboundedReceiver<InboundMessage> {
        self.feed_rx
            .lock()
            .unwrap()
            .take()
            .unwrap_or_else(|| mpsc::unbounded_channel().1)
    }
}

/// Backup store double that counts lookups.
pub struct TestStore {
    result: Result<Option<Value>, String>,
    calls: AtomicUsize,
}

impl TestStore {
    pub fn with_backup(backup: Value) -> Arc<Self> {
        Arc::new(Self {
            result: Ok(Some(backup)),
            calls: AtomicUsize::new(0),
        })
    }

    pub fn empty() -> Arc<Self> {
        Arc::new(Self {
            result: Ok(None),
            calls: AtomicUsize::new(0),
        })
    }

    pub fn broken(message: &str) -> Arc<Self> {
        Arc::new(Self {
            result: Err(message.to_owned()),
            calls: AtomicUsize::new(0),
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl BackupStore for TestStore {
    async fn get_backup(&self) -> Result<Option<Value>, BoxError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match &self.result {
            Ok(backup) => Ok(backup.clone()),
            Err(message) => Err(message.clone().into()),
        }
    }
}

/// Repair action double: counts runs, records the backup it saw, optionally
/// fails, optionally parks until the test releases it.
pub struct TestRepair {
    calls: AtomicUsize,
    fail_message: Option<String>,
    hold: tokio::sync::Mutex<Option<oneshot::Receiver<()>>>,
    last_backup: Mutex<Option<Option<Value>>>,
}

impl TestRepair {
    pub fn succeeding() -> Arc<Self> {
        Arc::new(Self {
            calls: AtomicUsize::new(0),
            fail_message: None,
            hold: tokio::sync::Mutex::new(None),
            last_backup: Mutex::new(None),
        })
    }

    pub fn failing(message: &str) -> Arc<Self> {
        Arc::new(Self {
            calls: AtomicUsize::new(0),
            fail_message: Some(message.to_owned()),
            hold: tokio::sync::Mutex::new(None),
            last_backup: Mutex::new(None),
        })
    }

    /// A repair that blocks until the returned sender fires.
    pub fn held() -> (Arc<Self>, oneshot::Sender<()>) {
        let (tx, rx) = oneshot::channel();
        let repair = Arc::new(Self {
            calls: AtomicUsize::new(0),
            fail_message: None,
            hold: tokio::sync::Mutex::new(Some(rx)),
            last_backup: Mutex::new(None),
        });
        (repair, tx)
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// The backup passed to the most recent run, if any run happened.
    pub fn last_backup(&self) -> Option<Option<Value>> {
        self.last_backup.lock().unwrap().clone()
    }
}

#[async_trait]
impl RepairAction for TestRepair {
    async fn repair(&self, backup: Option<Value>) -> Result<(), BoxError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last_backup.lock().unwrap() = Some(backup);
        let release = self.hold.lock().await.take();
        if let Some(release) = release {
            let _ = release.await;
        }
        match &self.fail_message {
            Some(message) => Err(message.clone().into()),
            None => Ok(()),
        }
    }
}

/// Polls `condition` until it holds, failing the test after a second.
pub async fn wait_until(what: &str, mut condition: impl FnMut() -> bool) {
    for _ in 0..1000 {
        if condition() {
            return;
        }
        tokio::time::sleep(Duration::from_millis(1)).await;
    }
    panic!("timed out waiting for {what}");
}

/// Waits for every channel to leave the session registry.
pub async fn wait_for_drain(handler: &CorruptionHandler) {
    let handler = handler.clone();
    wait_until("session registry to drain", move || {
        handler.registered_count() == 0
    })
    .await;
}
