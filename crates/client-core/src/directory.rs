//! Directory provider seam
//!
//! A lookup is an out-of-process round trip that may fail, may be slow and
//! may finish after the call it was issued for is long gone. Errors stop
//! here: [`lookup_quietly`] turns every failure into "no identity".

use std::time::Duration;

use async_trait::async_trait;
use omnicall_directory_core::{DirectoryEntry, PhoneMatcher};
use parking_lot::RwLock;
use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, warn};

use crate::recovery::{retry_with_backoff, Recoverable, RetryConfig};

/// Why a directory lookup produced no answer
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum LookupError {
    /// Could not reach the provider
    #[error("directory unreachable: {0}")]
    Unreachable(String),

    /// Provider answered with an unexpected status
    #[error("directory returned status {0}")]
    Status(u16),

    /// Provider answered with a body we could not read
    #[error("invalid directory response: {0}")]
    Decode(String),
}

impl Recoverable for LookupError {
    fn is_recoverable(&self) -> bool {
        match self {
            Self::Unreachable(_) => true,
            Self::Status(code) => *code >= 500,
            Self::Decode(_) => false,
        }
    }
}

/// Resolves a phone string to a directory entry
#[async_trait]
pub trait DirectoryLookup: Send + Sync {
    /// `Ok(None)` is a normal miss, not an error
    async fn lookup_by_phone(&self, phone: &str) -> Result<Option<DirectoryEntry>, LookupError>;
}

/// Run a lookup and absorb any failure as a miss
pub async fn lookup_quietly(directory: &dyn DirectoryLookup, phone: &str) -> Option<DirectoryEntry> {
    match directory.lookup_by_phone(phone).await {
        Ok(Some(entry)) => {
            debug!("Directory match for {}: {}", phone, entry.display_name());
            Some(entry)
        }
        Ok(None) => {
            debug!("No directory entry for {}", phone);
            None
        }
        Err(e) => {
            warn!("Directory lookup for {} failed: {}", phone, e);
            None
        }
    }
}

/// In-memory directory snapshot resolved with a [`PhoneMatcher`]
///
/// Useful offline and in tests; the snapshot can be swapped at runtime.
#[derive(Debug, Default)]
pub struct StaticDirectory {
    entries: RwLock<Vec<DirectoryEntry>>,
    matcher: PhoneMatcher,
}

impl StaticDirectory {
    pub fn new(entries: Vec<DirectoryEntry>) -> Self {
        Self {
            entries: RwLock::new(entries),
            matcher: PhoneMatcher::new(),
        }
    }

    pub fn with_matcher(mut self, matcher: PhoneMatcher) -> Self {
        self.matcher = matcher;
        self
    }

    /// Replace the snapshot
    pub fn replace(&self, entries: Vec<DirectoryEntry>) {
        *self.entries.write() = entries;
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }
}

#[async_trait]
impl DirectoryLookup for StaticDirectory {
    async fn lookup_by_phone(&self, phone: &str) -> Result<Option<DirectoryEntry>, LookupError> {
        let entries = self.entries.read();
        Ok(self.matcher.resolve(phone, entries.as_slice()).cloned())
    }
}

#[derive(Debug, Deserialize)]
struct CustomerResponse {
    success: bool,
    customer: Option<DirectoryEntry>,
}

/// Directory provider backed by the OmniCall HTTP API
#[derive(Debug, Clone)]
pub struct HttpDirectoryClient {
    base_url: String,
    client: reqwest::Client,
    retry: RetryConfig,
}

impl HttpDirectoryClient {
    /// Client for the API rooted at `base_url`, e.g. `http://localhost:3000`
    pub fn new(base_url: impl Into<String>) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            client,
            retry: RetryConfig::quick(),
        }
    }

    pub fn with_retry(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }

    async fn fetch(&self, phone: &str) -> Result<Option<DirectoryEntry>, LookupError> {
        let url = format!("{}/api/customers/by-phone", self.base_url);
        let response = self
            .client
            .get(&url)
            .query(&[("phone", phone)])
            .send()
            .await
            .map_err(|e| LookupError::Unreachable(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(LookupError::Status(status.as_u16()));
        }

        let body: CustomerResponse = response
            .json()
            .await
            .map_err(|e| LookupError::Decode(e.to_string()))?;

        Ok(if body.success { body.customer } else { None })
    }
}

#[async_trait]
impl DirectoryLookup for HttpDirectoryClient {
    async fn lookup_by_phone(&self, phone: &str) -> Result<Option<DirectoryEntry>, LookupError> {
        retry_with_backoff("directory_lookup", self.retry.clone(), || self.fetch(phone)).await
    }
}
