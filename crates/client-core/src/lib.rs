//! Client-core: softphone call-session coordination layer
//!
//! This crate drives one softphone line: it tracks the lifecycle of the
//! current call, reconciles asynchronous telephony events with user
//! actions, and enriches the caller display from the customer directory
//! in the background.
//!
//! ## Layering
//! ```text
//! UI observers ◄── events ── CallSession ──► TelephonyTransport (dial/accept/...)
//!                                 │
//!                                 └──► DirectoryLookup (fire-and-forget enrichment)
//! ```
//!
//! The transport and the directory are injected as trait objects, so the
//! whole state machine can be exercised with test doubles and synthetic
//! [`TransportEvent`]s.
//!
//! ## Quick start
//! ```rust,no_run
//! # use std::sync::Arc;
//! # use omnicall_client_core::*;
//! # async fn example(transport: Arc<dyn TelephonyTransport>) -> ClientResult<()> {
//! let directory = Arc::new(HttpDirectoryClient::new("http://localhost:3000"));
//! let (_events_tx, events_rx) = tokio::sync::mpsc::unbounded_channel();
//!
//! let session = CallSession::spawn(SessionConfig::default(), transport, directory, events_rx)?;
//! let mut updates = session.subscribe();
//!
//! session.dial("+27 67 296 6361").await?;
//! while let Ok(event) = updates.recv().await {
//!     println!("{} {}", event.snapshot.phase, event.snapshot.formatted_duration());
//! }
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod directory;
pub mod error;
pub mod events;
pub mod recovery;
pub mod session;
pub mod transport;

pub use config::SessionConfig;
pub use directory::{DirectoryLookup, HttpDirectoryClient, LookupError, StaticDirectory};
pub use error::{ClientError, ClientResult};
pub use events::{EventEmitter, SessionEvent, SessionEventKind};
pub use session::{
    format_duration, CallPhase, CallSession, CallSessionHandle, CallStateMachine, CallerIdentity,
    SessionSnapshot,
};
pub use transport::{TelephonyTransport, TransportAction, TransportError, TransportEvent};

/// Client-core version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
