//! Telephony transport seam
//!
//! The real transport (a provider's voice SDK) is not part of this crate.
//! It delivers [`TransportEvent`]s over a channel handed to
//! [`crate::CallSession::spawn`] and executes [`TransportAction`]s through
//! the [`TelephonyTransport`] trait.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Events emitted by the telephony transport
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum TransportEvent {
    /// An inbound call is ringing on this line
    InboundRing { number: String },
    /// The remote party answered our outgoing call
    Accepted,
    /// The remote party rejected our outgoing call
    Rejected { reason: Option<String> },
    /// The remote caller hung up before we answered
    Cancelled,
    /// The call was torn down by the remote side or the network
    Disconnected,
    /// Connection, negotiation or media failure
    Error { reason: String },
}

/// Actions the session asks the transport to perform
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum TransportAction {
    Dial { number: String },
    Accept,
    Reject,
    Disconnect,
    SendDigit { digit: char },
}

impl TransportAction {
    /// Short name for logs
    pub fn name(&self) -> &'static str {
        match self {
            Self::Dial { .. } => "dial",
            Self::Accept => "accept",
            Self::Reject => "reject",
            Self::Disconnect => "disconnect",
            Self::SendDigit { .. } => "send_digit",
        }
    }
}

/// Failure reported by the transport for an action
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("{action} failed: {reason}")]
pub struct TransportError {
    pub action: &'static str,
    pub reason: String,
}

impl TransportError {
    pub fn new(action: &'static str, reason: impl Into<String>) -> Self {
        Self { action, reason: reason.into() }
    }
}

/// Action side of a telephony transport
#[async_trait]
pub trait TelephonyTransport: Send + Sync {
    /// Start an outgoing call; completion arrives later as an event
    async fn dial(&self, number: &str) -> Result<(), TransportError>;

    /// Answer the ringing inbound call
    async fn accept(&self) -> Result<(), TransportError>;

    /// Refuse the ringing inbound call
    async fn reject(&self) -> Result<(), TransportError>;

    /// Hang up or cancel the current call
    async fn disconnect(&self) -> Result<(), TransportError>;

    /// Send a DTMF digit on the active call
    async fn send_digit(&self, digit: char) -> Result<(), TransportError>;

    /// Dispatch a [`TransportAction`] to the matching method
    async fn execute(&self, action: TransportAction) -> Result<(), TransportError> {
        match action {
            TransportAction::Dial { number } => self.dial(&number).await,
            TransportAction::Accept => self.accept().await,
            TransportAction::Reject => self.reject().await,
            TransportAction::Disconnect => self.disconnect().await,
            TransportAction::SendDigit { digit } => self.send_digit(digit).await,
        }
    }
}
