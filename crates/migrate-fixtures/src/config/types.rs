//! Configuration type definitions.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::FixtureError;

/// Environment variable holding the base connection string.
pub const CONNECTION_STRING_ENV: &str = "MIGRATE_TEST_CONNECTION_STRING";

/// Environment variable selecting the platform adapter.
pub const PLATFORM_ENV: &str = "MIGRATE_TEST_PLATFORM";

/// Environment variable overriding the PostgreSQL TLS mode.
pub const SSL_MODE_ENV: &str = "MIGRATE_TEST_SSL_MODE";

/// Supported database platforms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum PlatformKind {
    #[default]
    #[serde(rename = "postgresql", alias = "postgres", alias = "pg")]
    PostgreSql,
    #[serde(rename = "sqlserver", alias = "mssql", alias = "sql_server")]
    SqlServer,
    #[serde(rename = "mysql", alias = "mariadb")]
    MySql,
}

impl PlatformKind {
    /// All supported platforms.
    pub const ALL: [PlatformKind; 3] = [
        PlatformKind::PostgreSql,
        PlatformKind::SqlServer,
        PlatformKind::MySql,
    ];

    /// Canonical lower-case name.
    pub fn as_str(&self) -> &'static str {
        match self {
            PlatformKind::PostgreSql => "postgresql",
            PlatformKind::SqlServer => "sqlserver",
            PlatformKind::MySql => "mysql",
        }
    }
}

impl fmt::Display for PlatformKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PlatformKind {
    type Err = FixtureError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "postgresql" | "postgres" | "pg" => Ok(PlatformKind::PostgreSql),
            "sqlserver" | "mssql" | "sql_server" => Ok(PlatformKind::SqlServer),
            "mysql" | "mariadb" => Ok(PlatformKind::MySql),
            other => Err(FixtureError::Config(format!(
                "Unknown platform: '{}'. Supported platforms: postgresql, sqlserver, mysql",
                other
            ))),
        }
    }
}

/// Root configuration for a test run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TestConfig {
    /// Platform adapter to use (default: postgresql).
    #[serde(default)]
    pub platform: PlatformKind,

    /// Base connection string. Never serialized; usually supplied through
    /// `MIGRATE_TEST_CONNECTION_STRING`.
    #[serde(default, skip_serializing)]
    pub connection_string: Option<String>,

    /// Maintenance database override (default: the platform's own).
    #[serde(default)]
    pub maintenance_database: Option<String>,

    /// PostgreSQL TLS mode: disable, require, verify-full (default: disable).
    #[serde(default = "default_ssl_mode")]
    pub ssl_mode: String,
}

impl Default for TestConfig {
    fn default() -> Self {
        Self {
            platform: PlatformKind::default(),
            connection_string: None,
            maintenance_database: None,
            ssl_mode: default_ssl_mode(),
        }
    }
}

fn default_ssl_mode() -> String {
    "disable".to_string()
}
