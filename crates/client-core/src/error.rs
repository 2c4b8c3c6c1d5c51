//! Error types for the client-core library
//!
//! Only errors a caller can act on surface here. Directory lookup
//! failures never do: they are absorbed at the [`crate::directory`]
//! boundary and the call proceeds with the raw number. Transport
//! failures during a call are not returned either; they show up as a
//! transition to `Ended` with a failure notice in the snapshot.
//!
//! # Error Categories
//!
//! - **Input errors** - the request was rejected before any state changed
//! - **State errors** - the action does not apply to the current phase
//! - **Lifecycle errors** - the session task is gone

use thiserror::Error;

use crate::session::CallPhase;

/// Result type for client-core operations
pub type ClientResult<T> = Result<T, ClientError>;

/// Errors returned by call-session operations
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ClientError {
    /// Rejected before a session was created or touched
    #[error("Invalid input: {reason}")]
    InvalidInput { reason: String },

    /// Action not valid in the current phase
    #[error("Cannot {action} while {phase}")]
    InvalidState { action: String, phase: CallPhase },

    /// The line already carries a call
    #[error("Call already in progress ({phase})")]
    CallInProgress { phase: CallPhase },

    /// Invalid session configuration
    #[error("Invalid configuration for {field}: {reason}")]
    InvalidConfiguration { field: String, reason: String },

    /// The session task has shut down
    #[error("Call session is closed")]
    SessionClosed,
}

impl ClientError {
    /// Create an invalid-input error
    pub fn invalid_input(reason: impl Into<String>) -> Self {
        Self::InvalidInput { reason: reason.into() }
    }

    /// Create an invalid-state error
    pub fn invalid_state(action: impl Into<String>, phase: CallPhase) -> Self {
        Self::InvalidState { action: action.into(), phase }
    }

    /// Short category label for logs and metrics
    pub fn category(&self) -> &'static str {
        match self {
            Self::InvalidInput { .. } => "input",
            Self::InvalidState { .. } | Self::CallInProgress { .. } => "state",
            Self::InvalidConfiguration { .. } => "configuration",
            Self::SessionClosed => "lifecycle",
        }
    }
}
