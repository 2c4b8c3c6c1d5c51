//! Common infrastructure for the OmniCall crates.
//!
//! Holds the pieces every binary and library in the workspace shares:
//! the tracing subscriber setup and the small error type it reports
//! through, plus a helper for building structured log spans.

pub mod errors;
pub mod logging;

pub use errors::types::{Error, Result};
pub use logging::context::LogContext;
pub use logging::setup::{log_welcome, parse_log_level, setup_logging, LoggingConfig};
