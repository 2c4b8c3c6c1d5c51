//! Server configuration
//!
//! Layers, lowest to highest precedence:
//! 1. built-in defaults
//! 2. legacy environment names (`DATABASE_PATH`, `TWILIO_PHONE_NUMBER`)
//! 3. the optional TOML file (`omnicall.toml` unless a path is given)
//! 4. `OMNICALL_*` environment variables
//!
//! Command-line flags are applied on top by the binary.

use std::path::Path;

use config::{Config, ConfigError, Environment, File, Map};
use omnicall_directory_core::DirectoryConfig;
use serde::Deserialize;

/// Default caller id presented on outbound calls
pub const DEFAULT_CALLER_ID: &str = "+13612664115";

/// Browser origins of the development front ends
pub const DEFAULT_ALLOWED_ORIGINS: [&str; 3] = [
    "http://localhost:8000",
    "http://localhost:3001",
    "http://localhost:5173",
];

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Listen address, e.g. `0.0.0.0:3000`
    pub bind_address: String,
    /// sqlx SQLite URL of the directory database
    pub database_url: String,
    pub max_connections: u32,
    /// Number presented as caller id on outbound calls
    pub caller_id: String,
    /// Client identity that inbound calls ring when no agent exists
    pub fallback_agent_id: String,
    /// CORS origins allowed to call the API
    pub allowed_origins: Vec<String>,
    pub log_level: String,
    pub json_logs: bool,
}

impl ServerConfig {
    /// Load from defaults, an optional file and the process environment
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        Self::load_with(path, std::env::vars().collect())
    }

    /// Load using `vars` in place of the process environment
    pub fn load_with(path: Option<&Path>, vars: Map<String, String>) -> Result<Self, ConfigError> {
        let mut builder = Config::builder()
            .set_default("bind_address", "0.0.0.0:3000")?
            .set_default("database_url", "sqlite://./omnicall.db")?
            .set_default("max_connections", 5)?
            .set_default("caller_id", DEFAULT_CALLER_ID)?
            .set_default("fallback_agent_id", "agent001")?
            .set_default("allowed_origins", DEFAULT_ALLOWED_ORIGINS.to_vec())?
            .set_default("log_level", "info")?
            .set_default("json_logs", false)?;

        if let Some(db_path) = vars.get("DATABASE_PATH").filter(|v| !v.is_empty()) {
            builder = builder.set_default("database_url", DirectoryConfig::from_path(db_path).database_url)?;
        }
        if let Some(number) = vars.get("TWILIO_PHONE_NUMBER").filter(|v| !v.is_empty()) {
            builder = builder.set_default("caller_id", number.as_str())?;
        }

        builder = match path {
            Some(path) => builder.add_source(File::from(path)),
            None => builder.add_source(File::with_name("omnicall").required(false)),
        };

        builder
            .add_source(
                Environment::with_prefix("OMNICALL")
                    .try_parsing(true)
                    .list_separator(",")
                    .with_list_parse_key("allowed_origins")
                    .source(Some(vars)),
            )
            .build()?
            .try_deserialize()
    }

    pub fn directory(&self) -> DirectoryConfig {
        DirectoryConfig {
            database_url: self.database_url.clone(),
            max_connections: self.max_connections,
        }
    }
}
