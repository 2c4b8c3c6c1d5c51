//! Directory storage
//!
//! [`DirectoryStore`] is the seam the HTTP layer talks to; the SQLite
//! implementation lives in [`sqlite`].

pub mod sqlite;

use async_trait::async_trait;

use crate::error::Result;
use crate::phone::PhoneMatcher;
use crate::types::{Agent, Company, CreateAgentRequest, CreateCustomerRequest, DirectoryEntry};

pub use sqlite::SqliteDirectoryStore;

/// Name given to the company created when the table is empty
pub const DEFAULT_COMPANY_NAME: &str = "Default Company";

/// Persistent directory of companies, customers and agents
#[async_trait]
pub trait DirectoryStore: Send + Sync {
    /// All companies, oldest first
    async fn list_companies(&self) -> Result<Vec<Company>>;

    /// Create a company; names are unique
    async fn create_company(&self, name: &str) -> Result<Company>;

    /// List companies, creating [`DEFAULT_COMPANY_NAME`] first if there are none
    async fn ensure_default_company(&self) -> Result<Vec<Company>> {
        let companies = self.list_companies().await?;
        if !companies.is_empty() {
            return Ok(companies);
        }
        let company = self.create_company(DEFAULT_COMPANY_NAME).await?;
        tracing::info!("Created default company {}", company.id);
        Ok(vec![company])
    }

    /// Add a customer
    async fn create_customer(&self, request: CreateCustomerRequest) -> Result<DirectoryEntry>;

    /// All customers, most recently created first
    async fn list_customers(&self) -> Result<Vec<DirectoryEntry>>;

    /// Customer whose stored phone equals `phone` byte for byte
    async fn find_customer_by_exact_phone(&self, phone: &str) -> Result<Option<DirectoryEntry>>;

    /// Resolve a raw phone string to a customer.
    ///
    /// The exact lookup goes to the database; only on a miss is the full
    /// directory scanned with `matcher`.
    async fn lookup_by_phone(&self, phone: &str, matcher: &PhoneMatcher) -> Result<Option<DirectoryEntry>> {
        if let Some(customer) = self.find_customer_by_exact_phone(phone).await? {
            return Ok(Some(customer));
        }

        let customers = self.list_customers().await?;
        tracing::debug!("Checking {} customers for {}", customers.len(), phone);
        Ok(matcher.resolve(phone, &customers).cloned())
    }

    /// Add an agent
    async fn create_agent(&self, request: CreateAgentRequest) -> Result<Agent>;

    /// Identity of the oldest agent, used for inbound routing
    async fn first_agent_id(&self) -> Result<Option<String>>;
}
