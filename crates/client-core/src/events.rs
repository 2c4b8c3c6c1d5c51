//! Observer events for the call session
//!
//! Every change an observer could render is published as a
//! [`SessionEvent`] carrying a full [`SessionSnapshot`]; observers never
//! need to read session state any other way and cannot mutate it.

use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

use crate::session::{CallPhase, SessionSnapshot};

/// What happened
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionEventKind {
    /// The session moved to `snapshot.phase`
    PhaseChanged { previous: CallPhase },
    /// A directory lookup enriched the caller display
    CallerResolved,
    /// Periodic duration update while active
    DurationTick,
    /// A transport failure ended the call; shown to the user as a notice
    CallFailed { reason: String },
}

/// Event delivered to observers
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionEvent {
    pub kind: SessionEventKind,
    pub snapshot: SessionSnapshot,
}

/// Event emitter for the call session
#[derive(Debug, Clone)]
pub struct EventEmitter {
    sender: broadcast::Sender<SessionEvent>,
}

impl EventEmitter {
    /// Create a new event emitter with the specified capacity
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Emit an event
    pub fn emit(&self, event: SessionEvent) {
        // No receivers is fine
        let _ = self.sender.send(event);
    }

    /// Subscribe to events
    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.sender.subscribe()
    }

    /// Get the number of active receivers
    pub fn receiver_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for EventEmitter {
    fn default() -> Self {
        Self::new(256)
    }
}
