//! Configuration loading and validation.

mod types;
mod validation;

pub use types::*;

use std::path::Path;

use tracing::debug;

use crate::core::ConnectionDescriptor;
use crate::error::{FixtureError, Result};

impl TestConfig {
    /// Load configuration from the process environment.
    ///
    /// A missing connection string is not an error here; it only becomes one
    /// when a connection is requested.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration from an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let config = Self::default().with_overrides(lookup)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a YAML file, then apply environment overrides.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config = Self::from_yaml(&content)?.with_overrides(|key| std::env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    /// Parse configuration from a YAML string.
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let config: TestConfig = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Apply variables from `lookup` over the current values.
    pub fn with_overrides<F>(mut self, lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(platform) = lookup(PLATFORM_ENV).filter(|v| !v.trim().is_empty()) {
            self.platform = platform.parse()?;
            debug!("Platform from {}: {}", PLATFORM_ENV, self.platform);
        }
        if let Some(conn) = lookup(CONNECTION_STRING_ENV) {
            self.connection_string = Some(conn);
        }
        if let Some(ssl_mode) = lookup(SSL_MODE_ENV).filter(|v| !v.trim().is_empty()) {
            self.ssl_mode = ssl_mode;
        }
        Ok(self)
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<()> {
        validation::validate(self)
    }

    /// The base connection string as a descriptor.
    ///
    /// # Errors
    ///
    /// Returns `FixtureError::Config` when the connection string is missing or blank.
    pub fn base_connection_string(&self) -> Result<ConnectionDescriptor> {
        match self.connection_string.as_deref() {
            Some(conn) if !conn.trim().is_empty() => ConnectionDescriptor::parse(conn),
            _ => Err(FixtureError::Config(format!(
                "Missing environment variable {}. Set it to a {} connection string, \
                 e.g. Host=localhost;Port=5432;Username=app;Password=...;Database=app",
                CONNECTION_STRING_ENV, self.platform
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_from_lookup_defaults_to_postgres() {
        let config = TestConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config.platform, PlatformKind::PostgreSql);
        assert!(config.connection_string.is_none());
    }

    #[test]
    fn test_missing_connection_string_fails_only_when_requested() {
        let config = TestConfig::from_lookup(lookup(&[])).unwrap();
        let err = config.base_connection_string().unwrap_err();
        assert!(matches!(err, FixtureError::Config(_)));
        assert!(err.to_string().contains(CONNECTION_STRING_ENV));
    }

    #[test]
    fn test_blank_connection_string_is_missing() {
        let config = TestConfig::from_lookup(lookup(&[(CONNECTION_STRING_ENV, "  ")])).unwrap();
        assert!(config.base_connection_string().is_err());
    }

    #[test]
    fn test_from_lookup_reads_platform_and_connection() {
        let config = TestConfig::from_lookup(lookup(&[
            (PLATFORM_ENV, "SqlServer"),
            (CONNECTION_STRING_ENV, "Server=localhost,1433;User Id=sa;Password=P@ssw0rd!"),
        ]))
        .unwrap();
        assert_eq!(config.platform, PlatformKind::SqlServer);
        let conn = config.base_connection_string().unwrap();
        assert_eq!(conn.get("user id"), Some("sa"));
    }

    #[test]
    fn test_unknown_platform_is_rejected() {
        let err = TestConfig::from_lookup(lookup(&[(PLATFORM_ENV, "oracle")])).unwrap_err();
        assert!(err.to_string().contains("Unknown platform: 'oracle'"));
    }

    #[test]
    fn test_from_yaml() {
        let yaml = r#"
platform: mssql
maintenance_database: master
"#;
        let config = TestConfig::from_yaml(yaml).unwrap();
        assert_eq!(config.platform, PlatformKind::SqlServer);
        assert_eq!(config.maintenance_database.as_deref(), Some("master"));
        assert_eq!(config.ssl_mode, "disable");
    }

    #[test]
    fn test_connection_string_is_never_serialized() {
        let config = TestConfig {
            connection_string: Some("Host=x;Password=super_secret".into()),
            ..Default::default()
        };
        let yaml = serde_yaml::to_string(&config).unwrap();
        assert!(!yaml.contains("super_secret"));
    }

    #[test]
    fn test_overrides_apply_over_yaml() {
        let config = TestConfig::from_yaml("platform: mysql\n")
            .unwrap()
            .with_overrides(lookup(&[(PLATFORM_ENV, "pg"), (SSL_MODE_ENV, "require")]))
            .unwrap();
        assert_eq!(config.platform, PlatformKind::PostgreSql);
        assert_eq!(config.ssl_mode, "require");
    }

    #[test]
    fn test_platform_kind_parsing() {
        assert_eq!("postgres".parse::<PlatformKind>().unwrap(), PlatformKind::PostgreSql);
        assert_eq!("MSSQL".parse::<PlatformKind>().unwrap(), PlatformKind::SqlServer);
        assert_eq!("mariadb".parse::<PlatformKind>().unwrap(), PlatformKind::MySql);
        for kind in PlatformKind::ALL {
            assert_eq!(kind.as_str().parse::<PlatformKind>().unwrap(), kind);
        }
    }
}
