//! SQLite implementation of [`DirectoryStore`]

use std::str::FromStr;

use async_trait::async_trait;
use chrono::Utc;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use tracing::debug;

use super::DirectoryStore;
use crate::error::{Error, Result};
use crate::phone::is_dialable;
use crate::types::{Agent, Company, CreateAgentRequest, CreateCustomerRequest, DirectoryEntry};

const SCHEMA: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS companies (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        name TEXT NOT NULL UNIQUE,
        created_at TEXT NOT NULL
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS agents (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        agent_id TEXT NOT NULL UNIQUE,
        first_name TEXT NOT NULL,
        last_name TEXT NOT NULL,
        email TEXT NOT NULL UNIQUE,
        company_id INTEGER NOT NULL REFERENCES companies (id),
        created_at TEXT NOT NULL
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS customers (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        first_name TEXT NOT NULL,
        last_name TEXT NOT NULL,
        phone TEXT,
        affiliation TEXT,
        plan TEXT,
        company_id INTEGER REFERENCES companies (id),
        created_at TEXT NOT NULL
    )
    "#,
    "CREATE INDEX IF NOT EXISTS idx_customers_phone ON customers (phone)",
];

const CUSTOMER_COLUMNS: &str =
    "id, first_name, last_name, phone, affiliation, plan, company_id, created_at";

/// Directory store backed by a sqlx SQLite pool
#[derive(Clone)]
pub struct SqliteDirectoryStore {
    pool: SqlitePool,
}

impl SqliteDirectoryStore {
    /// Connect to `database_url`, creating the file and schema when missing
    pub async fn connect(database_url: &str, max_connections: u32) -> Result<Self> {
        let options = SqliteConnectOptions::from_str(database_url)?
            .create_if_missing(true)
            .foreign_keys(true);

        // Every connection to :memory: is its own database
        let max_connections = if database_url.contains(":memory:") { 1 } else { max_connections.max(1) };

        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections)
            .connect_with(options)
            .await?;

        let store = Self { pool };
        store.init_schema().await?;
        Ok(store)
    }

    /// Access the underlying pool
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    async fn init_schema(&self) -> Result<()> {
        for statement in SCHEMA {
            sqlx::query(*statement).execute(&self.pool).await?;
        }
        debug!("Directory schema initialized");
        Ok(())
    }
}

fn required(field: &str, value: &str) -> Result<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(Error::invalid(format!("{} is required", field)));
    }
    Ok(trimmed.to_string())
}

#[async_trait]
impl DirectoryStore for SqliteDirectoryStore {
    async fn list_companies(&self) -> Result<Vec<Company>> {
        let companies = sqlx::query_as::<_, Company>(
            "SELECT id, name, created_at FROM companies ORDER BY id ASC",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(companies)
    }

    async fn create_company(&self, name: &str) -> Result<Company> {
        let name = required("Company name", name)?;

        let company = sqlx::query_as::<_, Company>(
            "INSERT INTO companies (name, created_at) VALUES (?, ?) RETURNING id, name, created_at",
        )
        .bind(&name)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| Error::from_insert(e, "Company", &name))?;

        debug!("Created company {} ({})", company.name, company.id);
        Ok(company)
    }

    async fn create_customer(&self, request: CreateCustomerRequest) -> Result<DirectoryEntry> {
        let first_name = required("First name", &request.first_name)?;
        let last_name = request.last_name.trim().to_string();

        let phone = match request.phone {
            Some(phone) if phone.trim().is_empty() => None,
            Some(phone) if !is_dialable(&phone) => {
                return Err(Error::invalid(format!("Phone number is not dialable: {}", phone)));
            }
            other => other,
        };

        let sql = format!(
            "INSERT INTO customers (first_name, last_name, phone, affiliation, plan, company_id, created_at) \
             VALUES (?, ?, ?, ?, ?, ?, ?) RETURNING {}",
            CUSTOMER_COLUMNS
        );
        let customer = sqlx::query_as::<_, DirectoryEntry>(&sql)
            .bind(first_name)
            .bind(last_name)
            .bind(phone)
            .bind(request.affiliation)
            .bind(request.plan)
            .bind(request.company_id)
            .bind(Utc::now())
            .fetch_one(&self.pool)
            .await?;

        debug!("Created customer {}", customer.id);
        Ok(customer)
    }

    async fn list_customers(&self) -> Result<Vec<DirectoryEntry>> {
        let sql = format!(
            "SELECT {} FROM customers ORDER BY created_at DESC, id DESC",
            CUSTOMER_COLUMNS
        );
        let customers = sqlx::query_as::<_, DirectoryEntry>(&sql)
            .fetch_all(&self.pool)
            .await?;
        Ok(customers)
    }

    async fn find_customer_by_exact_phone(&self, phone: &str) -> Result<Option<DirectoryEntry>> {
        let sql = format!(
            "SELECT {} FROM customers WHERE phone = ? ORDER BY created_at DESC, id DESC LIMIT 1",
            CUSTOMER_COLUMNS
        );
        let customer = sqlx::query_as::<_, DirectoryEntry>(&sql)
            .bind(phone)
            .fetch_optional(&self.pool)
            .await?;
        Ok(customer)
    }

    async fn create_agent(&self, request: CreateAgentRequest) -> Result<Agent> {
        let agent_id = required("Agent ID", &request.agent_id)?;
        let email = required("Email", &request.email)?;
        let first_name = required("First name", &request.first_name)?;
        let last_name = required("Last name", &request.last_name)?;

        let taken: Option<i64> = sqlx::query_scalar("SELECT id FROM agents WHERE agent_id = ? OR email = ?")
            .bind(&agent_id)
            .bind(&email)
            .fetch_optional(&self.pool)
            .await?;
        if taken.is_some() {
            return Err(Error::AlreadyExists { entity: "Agent", value: agent_id });
        }

        let agent = sqlx::query_as::<_, Agent>(
            "INSERT INTO agents (agent_id, first_name, last_name, email, company_id, created_at) \
             VALUES (?, ?, ?, ?, ?, ?) \
             RETURNING id, agent_id, first_name, last_name, email, company_id, created_at",
        )
        .bind(&agent_id)
        .bind(first_name)
        .bind(last_name)
        .bind(email)
        .bind(request.company_id)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| Error::from_insert(e, "Agent", &agent_id))?;

        debug!("Created agent {}", agent.agent_id);
        Ok(agent)
    }

    async fn first_agent_id(&self) -> Result<Option<String>> {
        let agent_id = sqlx::query_scalar::<_, String>("SELECT agent_id FROM agents ORDER BY id ASC LIMIT 1")
            .fetch_optional(&self.pool)
            .await?;
        Ok(agent_id)
    }
}
