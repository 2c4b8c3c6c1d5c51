//! Configuration for directory-core

use serde::Deserialize;

/// Directory store configuration
#[derive(Debug, Clone, Deserialize)]
pub struct DirectoryConfig {
    /// sqlx connection URL, e.g. `sqlite://omnicall.db`
    pub database_url: String,
    /// Pool size; in-memory databases are always pinned to one connection
    pub max_connections: u32,
}

impl DirectoryConfig {
    /// Build a configuration from a plain SQLite file path
    pub fn from_path(path: &str) -> Self {
        Self {
            database_url: format!("sqlite://{}", path),
            ..Self::default()
        }
    }
}

impl Default for DirectoryConfig {
    fn default() -> Self {
        Self {
            database_url: "sqlite://omnicall.db".to_string(),
            max_connections: 5,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_path_builds_sqlite_url() {
        let cfg = DirectoryConfig::from_path("./omnicall.db");
        assert_eq!(cfg.database_url, "sqlite://./omnicall.db");
        assert_eq!(cfg.max_connections, 5);
    }
}
