//! Error types for the fixture library.

use thiserror::Error;

/// Main error type for fixture and lifecycle operations.
#[derive(Error, Debug)]
pub enum FixtureError {
    /// Configuration error (missing environment variable, invalid YAML, bad platform name, etc.)
    #[error("Configuration error: {0}")]
    Config(String),

    /// A fixture was requested that the platform cannot produce.
    #[error(
        "Capability '{flag}' is not supported on platform '{platform}'. \
         See {platform}.capabilities().{flag}"
    )]
    UnsupportedCapability {
        platform: &'static str,
        flag: &'static str,
    },

    /// PostgreSQL connection or query error
    #[error("PostgreSQL error: {0}")]
    Postgres(#[from] tokio_postgres::Error),

    /// SQL Server connection or query error
    #[error("SQL Server error: {0}")]
    SqlServer(#[from] tiberius::error::Error),

    /// MySQL connection or query error
    #[error("MySQL error: {0}")]
    MySql(#[from] mysql_async::Error),

    /// Connection error with context
    #[error("Connection error: {message}\n  Context: {context}")]
    Connection { message: String, context: String },

    /// Best-effort database cleanup did not complete
    #[error("Cleanup of database {database} failed: {message}")]
    Cleanup { database: String, message: String },

    /// Fixture lifecycle was driven through an invalid transition
    #[error("Lifecycle error: {0}")]
    Lifecycle(String),

    /// IO error (script files)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// YAML serialization/deserialization error
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl FixtureError {
    /// Create a Connection error with context about where it occurred
    pub fn connection(message: impl ToString, context: impl Into<String>) -> Self {
        FixtureError::Connection {
            message: message.to_string(),
            context: context.into(),
        }
    }

    /// Create a Cleanup error
    pub fn cleanup(database: impl Into<String>, message: impl ToString) -> Self {
        FixtureError::Cleanup {
            database: database.into(),
            message: message.to_string(),
        }
    }

    /// Create an UnsupportedCapability error
    pub fn unsupported(platform: &'static str, flag: &'static str) -> Self {
        FixtureError::UnsupportedCapability { platform, flag }
    }

    /// Whether the error must abort the current test.
    ///
    /// Configuration, capability and lifecycle errors are programming or
    /// environment errors. Connectivity and cleanup errors are operational
    /// noise that callers may choose to tolerate.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            FixtureError::Config(_)
                | FixtureError::UnsupportedCapability { .. }
                | FixtureError::Lifecycle(_)
                | FixtureError::Yaml(_)
        )
    }

    /// Process exit code for the CLI.
    pub fn exit_code(&self) -> u8 {
        match self {
            FixtureError::Config(_) | FixtureError::Yaml(_) => 2,
            FixtureError::UnsupportedCapability { .. } => 3,
            FixtureError::Postgres(_)
            | FixtureError::SqlServer(_)
            | FixtureError::MySql(_)
            | FixtureError::Connection { .. } => 4,
            FixtureError::Cleanup { .. } => 5,
            FixtureError::Lifecycle(_) | FixtureError::Io(_) | FixtureError::Json(_) => 1,
        }
    }

    /// Format error with full details including error chain
    pub fn format_detailed(&self) -> String {
        let mut output = format!("Error: {}\n", self);

        let mut source = std::error::Error::source(self);
        let mut depth = 1;
        while let Some(err) = source {
            output.push_str(&format!("\nCaused by:\n  {}: {}", depth, err));
            source = err.source();
            depth += 1;
        }

        output
    }
}

/// Result type alias for fixture operations.
pub type Result<T> = std::result::Result<T, FixtureError>;
