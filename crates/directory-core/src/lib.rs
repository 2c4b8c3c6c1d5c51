//! # Directory-Core
//!
//! Customer directory and phone-number identity resolution for OmniCall.
//!
//! This crate provides:
//! - Phone number normalization and the [`PhoneMatcher`] used to resolve a
//!   dialed or received number against the directory despite formatting skew
//! - The directory data model (customers, companies, agents)
//! - A SQLite-backed [`DirectoryStore`] implementation
//!
//! ## Resolution order
//!
//! ```text
//! query ──► exact stored match ──► normalized match ──► (country-code match) ──► not found
//! ```
//!
//! A miss is never an error: callers fall back to displaying the raw number.

pub mod config;
pub mod error;
pub mod phone;
pub mod store;
pub mod types;

pub use config::DirectoryConfig;
pub use error::{Error, Result};
pub use phone::{is_dialable, normalize, to_international, PhoneMatcher, PhoneRecord};
pub use store::{DirectoryStore, SqliteDirectoryStore};
pub use types::{Agent, Company, CreateAgentRequest, CreateCustomerRequest, DirectoryEntry};

/// Open the directory store described by `config`
pub async fn init(config: &DirectoryConfig) -> Result<SqliteDirectoryStore> {
    let store = SqliteDirectoryStore::connect(&config.database_url, config.max_connections).await?;
    tracing::info!("Directory store ready at {}", config.database_url);
    Ok(store)
}
