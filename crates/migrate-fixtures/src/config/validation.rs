//! Configuration validation.

use super::TestConfig;
use crate::core::ConnectionDescriptor;
use crate::drivers::common::SslMode;
use crate::error::{FixtureError, Result};

/// Validate the configuration.
pub fn validate(config: &TestConfig) -> Result<()> {
    SslMode::parse(&config.ssl_mode)?;

    if let Some(ref db) = config.maintenance_database {
        if db.trim().is_empty() {
            return Err(FixtureError::Config(
                "maintenance_database must not be empty when set".into(),
            ));
        }
    }

    // A blank connection string is treated as missing and reported on first use.
    if let Some(conn) = config.connection_string.as_deref() {
        if !conn.trim().is_empty() {
            ConnectionDescriptor::parse(conn)?;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(validate(&TestConfig::default()).is_ok());
    }

    #[test]
    fn test_invalid_ssl_mode() {
        let config = TestConfig {
            ssl_mode: "sometimes".into(),
            ..Default::default()
        };
        assert!(validate(&config).unwrap_err().to_string().contains("ssl_mode"));
    }

    #[test]
    fn test_empty_maintenance_database() {
        let config = TestConfig {
            maintenance_database: Some(" ".into()),
            ..Default::default()
        };
        assert!(validate(&config).is_err());
    }

    #[test]
    fn test_malformed_connection_string() {
        let config = TestConfig {
            connection_string: Some("Host=localhost;garbage".into()),
            ..Default::default()
        };
        assert!(validate(&config).is_err());

        let blank = TestConfig {
            connection_string: Some(String::new()),
            ..Default::default()
        };
        assert!(validate(&blank).is_ok());
    }
}
