//! Test doubles shared by the call-session suites

#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use omnicall_client_core::session::CallPhase;
use omnicall_client_core::{
    CallSession, CallSessionHandle, DirectoryLookup, LookupError, SessionConfig,
    TelephonyTransport, TransportAction, TransportError, TransportEvent,
};
use omnicall_directory_core::DirectoryEntry;
use parking_lot::Mutex;
use tokio::sync::{mpsc, Notify};

pub fn customer(first: &str, last: &str, phone: &str) -> DirectoryEntry {
    DirectoryEntry {
        id: 1,
        first_name: first.to_string(),
        last_name: last.to_string(),
        phone: Some(phone.to_string()),
        affiliation: Some("Discovery Health".to_string()),
        plan: Some("Classic Saver".to_string()),
        company_id: Some(1),
        created_at: Utc::now(),
    }
}

/// Transport that records every action and can be told to fail dials
#[derive(Default)]
pub struct RecordingTransport {
    actions: Mutex<Vec<TransportAction>>,
    fail_dial: bool,
}

impl RecordingTransport {
    pub fn failing_dial() -> Self {
        Self {
            actions: Mutex::new(Vec::new()),
            fail_dial: true,
        }
    }

    pub fn actions(&self) -> Vec<TransportAction> {
        self.actions.lock().clone()
    }

    fn record(&self, action: TransportAction) {
        self.actions.lock().push(action);
    }
}

#[async_trait]
impl TelephonyTransport for RecordingTransport {
    async fn dial(&self, number: &str) -> Result<(), TransportError> {
        self.record(TransportAction::Dial { number: number.to_string() });
        if self.fail_dial {
            return Err(TransportError::new("dial", "no route to destination"));
        }
        Ok(())
    }

    async fn accept(&self) -> Result<(), TransportError> {
        self.record(TransportAction::Accept);
        Ok(())
    }

    async fn reject(&self) -> Result<(), TransportError> {
        self.record(TransportAction::Reject);
        Ok(())
    }

    async fn disconnect(&self) -> Result<(), TransportError> {
        self.record(TransportAction::Disconnect);
        Ok(())
    }

    async fn send_digit(&self, digit: char) -> Result<(), TransportError> {
        self.record(TransportAction::SendDigit { digit });
        Ok(())
    }
}

/// Directory whose answer is held back until the test releases it
pub struct GatedDirectory {
    entry: DirectoryEntry,
    gate: Notify,
}

impl GatedDirectory {
    pub fn new(entry: DirectoryEntry) -> Self {
        Self { entry, gate: Notify::new() }
    }

    pub fn release(&self) {
        self.gate.notify_one();
    }
}

#[async_trait]
impl DirectoryLookup for GatedDirectory {
    async fn lookup_by_phone(&self, _phone: &str) -> Result<Option<DirectoryEntry>, LookupError> {
        self.gate.notified().await;
        Ok(Some(self.entry.clone()))
    }
}

/// Directory that answers after a fixed delay
pub struct SlowDirectory {
    entry: DirectoryEntry,
    delay: Duration,
}

impl SlowDirectory {
    pub fn new(entry: DirectoryEntry, delay: Duration) -> Self {
        Self { entry, delay }
    }
}

#[async_trait]
impl DirectoryLookup for SlowDirectory {
    async fn lookup_by_phone(&self, _phone: &str) -> Result<Option<DirectoryEntry>, LookupError> {
        tokio::time::sleep(self.delay).await;
        Ok(Some(self.entry.clone()))
    }
}

/// Directory that is always down
pub struct DownDirectory;

#[async_trait]
impl DirectoryLookup for DownDirectory {
    async fn lookup_by_phone(&self, _phone: &str) -> Result<Option<DirectoryEntry>, LookupError> {
        Err(LookupError::Unreachable("connection refused".to_string()))
    }
}

pub struct Harness {
    pub session: CallSessionHandle,
    pub transport: Arc<RecordingTransport>,
    pub events: mpsc::UnboundedSender<TransportEvent>,
}

impl Harness {
    pub fn start(directory: Arc<dyn DirectoryLookup>) -> Self {
        Self::with(SessionConfig::default(), RecordingTransport::default(), directory)
    }

    pub fn with(
        config: SessionConfig,
        transport: RecordingTransport,
        directory: Arc<dyn DirectoryLookup>,
    ) -> Self {
        let transport = Arc::new(transport);
        let (events, events_rx) = mpsc::unbounded_channel();
        let session = CallSession::spawn(config, transport.clone(), directory, events_rx)
            .expect("valid session config");
        Self { session, transport, events }
    }

    pub fn ring(&self, number: &str) {
        self.events
            .send(TransportEvent::InboundRing { number: number.to_string() })
            .expect("session running");
    }

    pub fn remote(&self, event: TransportEvent) {
        self.events.send(event).expect("session running");
    }

    /// Wait until the session reaches `phase`
    pub async fn wait_for_phase(&self, phase: CallPhase) {
        let mut state = self.session.watch();
        tokio::time::timeout(Duration::from_secs(30), state.wait_for(|s| s.phase == phase))
            .await
            .expect("phase reached in time")
            .expect("session running");
    }

    /// Let spawned tasks run without advancing the clock
    pub async fn settle(&self) {
        for _ in 0..10 {
            tokio::task::yield_now().await;
        }
    }
}
