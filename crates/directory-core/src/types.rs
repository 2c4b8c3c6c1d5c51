//! Core types for directory-core

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Customer record in the clinic directory
///
/// Owned by the store; resolution code only ever reads snapshots of it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct DirectoryEntry {
    pub id: i64,
    pub first_name: String,
    pub last_name: String,
    /// Phone exactly as it was stored, no canonical form implied
    pub phone: Option<String>,
    /// Affiliation label, e.g. the medical aid scheme
    pub affiliation: Option<String>,
    /// Plan or option label within the affiliation
    pub plan: Option<String>,
    pub company_id: Option<i64>,
    pub created_at: DateTime<Utc>,
}

impl DirectoryEntry {
    /// "First Last", tolerating an empty half
    pub fn display_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name).trim().to_string()
    }
}

/// Company (practice) that agents and customers belong to
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Company {
    pub id: i64,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

/// Operator who answers calls in the softphone
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Agent {
    pub id: i64,
    /// Identity the telephony provider routes browser calls to
    pub agent_id: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub company_id: i64,
    pub created_at: DateTime<Utc>,
}

/// Request to add a customer to the directory
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct CreateCustomerRequest {
    pub first_name: String,
    pub last_name: String,
    pub phone: Option<String>,
    pub affiliation: Option<String>,
    pub plan: Option<String>,
    pub company_id: Option<i64>,
}

/// Request to add an agent
#[derive(Debug, Clone, Deserialize)]
pub struct CreateAgentRequest {
    pub agent_id: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub company_id: i64,
}
