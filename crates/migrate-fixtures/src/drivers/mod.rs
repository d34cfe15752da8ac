//! Database driver implementations.
//!
//! This module provides database-specific implementations of the core traits:
//!
//! - [`postgres`]: PostgreSQL driver
//! - [`mssql`]: Microsoft SQL Server driver
//! - [`mysql`]: MySQL/MariaDB driver
//! - [`common`]: Shared utilities (TLS, scalar interpretation)
//!
//! # Architecture
//!
//! Each driver module implements:
//! - `Platform`: fixture text, catalog probes and the drop plan (pure, no I/O)
//! - `QueryExecutor`: the two query primitives over the native driver
//!
//! # Adding New Databases
//!
//! 1. Create a new module under `drivers/`
//! 2. Implement `Platform` and `QueryExecutor`
//! 3. Add a variant to [`PlatformImpl`] and to `PlatformKind`
//! 4. Wire the executor into [`executor_for`]

pub mod common;
pub mod mssql;
pub mod mysql;
pub mod postgres;

use std::sync::Arc;

pub use common::SslMode;
pub use mssql::{MssqlExecutor, MssqlPlatform};
pub use mysql::{MysqlExecutor, MysqlPlatform};
pub use postgres::{PostgresExecutor, PostgresPlatform};

use crate::config::PlatformKind;
use crate::core::traits::{
    CapabilityFlags, CatalogProbe, Platform, QueryExecutor, SUPPORTS_BATCH_STATEMENTS,
};
use crate::core::{ConnectionDescriptor, ObjectRef};
use crate::error::{FixtureError, Result};
use crate::fixtures::{BatchFixture, FixtureScript};
use crate::lifecycle::DropPlan;

/// Enum-based static dispatch over the platform adapters.
///
/// The set of platforms is closed, so a match replaces a vtable. The
/// `dispatch!` macro below writes the match arms.
#[derive(Debug, Clone)]
pub enum PlatformImpl {
    Postgres(PostgresPlatform),
    SqlServer(MssqlPlatform),
    MySql(MysqlPlatform),
}

macro_rules! dispatch {
    ($self:ident, $p:ident => $body:expr) => {
        match $self {
            PlatformImpl::Postgres($p) => $body,
            PlatformImpl::SqlServer($p) => $body,
            PlatformImpl::MySql($p) => $body,
        }
    };
}

impl PlatformImpl {
    /// Create the adapter for a platform kind.
    pub fn from_kind(kind: PlatformKind) -> Self {
        match kind {
            PlatformKind::PostgreSql => PlatformImpl::Postgres(PostgresPlatform::new()),
            PlatformKind::SqlServer => PlatformImpl::SqlServer(MssqlPlatform::new()),
            PlatformKind::MySql => PlatformImpl::MySql(MysqlPlatform::new()),
        }
    }

    /// Create the adapter from a platform name such as `"pg"` or `"mssql"`.
    ///
    /// # Errors
    ///
    /// Returns an error if the platform name is not recognized.
    pub fn from_name(name: &str) -> Result<Self> {
        name.parse().map(Self::from_kind)
    }

    /// The platform kind this adapter serves.
    pub fn kind(&self) -> PlatformKind {
        match self {
            PlatformImpl::Postgres(_) => PlatformKind::PostgreSql,
            PlatformImpl::SqlServer(_) => PlatformKind::SqlServer,
            PlatformImpl::MySql(_) => PlatformKind::MySql,
        }
    }
}

impl Platform for PlatformImpl {
    fn name(&self) -> &'static str {
        dispatch!(self, p => p.name())
    }

    fn default_schema(&self) -> Option<&'static str> {
        dispatch!(self, p => p.default_schema())
    }

    fn maintenance_database(&self) -> &'static str {
        dispatch!(self, p => p.maintenance_database())
    }

    fn capabilities(&self) -> CapabilityFlags {
        dispatch!(self, p => p.capabilities())
    }

    fn default_schema_for(&self, conn: &ConnectionDescriptor) -> Result<String> {
        dispatch!(self, p => p.default_schema_for(conn))
    }

    fn database_exists_query(&self, database: &str) -> Result<String> {
        dispatch!(self, p => p.database_exists_query(database))
    }

    fn object_probes(&self, object: &ObjectRef) -> Result<Vec<CatalogProbe>> {
        dispatch!(self, p => p.object_probes(object))
    }

    fn create_database_script(&self, database: &str) -> Result<FixtureScript> {
        dispatch!(self, p => p.create_database_script(database))
    }

    fn schema_creation_script(&self, schema: &str) -> Result<FixtureScript> {
        dispatch!(self, p => p.schema_creation_script(schema))
    }

    fn object_creation_script(&self, object_name: &str) -> Result<FixtureScript> {
        dispatch!(self, p => p.object_creation_script(object_name))
    }

    fn object_creation_script_with_error(&self, object_name: &str) -> Result<FixtureScript> {
        dispatch!(self, p => p.object_creation_script_with_error(object_name))
    }

    fn object_creation_script_with_tokens(&self, object_name: &str) -> Result<FixtureScript> {
        dispatch!(self, p => p.object_creation_script_with_tokens(object_name))
    }

    fn bulk_table_script(&self, table_name: &str) -> Result<FixtureScript> {
        dispatch!(self, p => p.bulk_table_script(table_name))
    }

    /// Checks the capability flag before asking the adapter, so no platform
    /// can hand out batch text it has declared unsupported.
    fn batch_script(&self, fixture: &BatchFixture) -> Result<FixtureScript> {
        if !self.capabilities().supports_batch_statements {
            return Err(FixtureError::unsupported(
                self.name(),
                SUPPORTS_BATCH_STATEMENTS,
            ));
        }
        dispatch!(self, p => p.batch_script(fixture))
    }

    fn cleanup_script(&self) -> FixtureScript {
        dispatch!(self, p => p.cleanup_script())
    }

    fn drop_database_plan(&self, database: &str) -> Result<DropPlan> {
        dispatch!(self, p => p.drop_database_plan(database))
    }
}

/// Build the native executor for a platform.
///
/// `ssl_mode` applies to PostgreSQL and MySQL. SQL Server takes its
/// encryption settings from the connection string.
pub fn executor_for(kind: PlatformKind, ssl_mode: SslMode) -> Arc<dyn QueryExecutor> {
    match kind {
        PlatformKind::PostgreSql => Arc::new(PostgresExecutor::new(ssl_mode)),
        PlatformKind::SqlServer => Arc::new(MssqlExecutor::new()),
        PlatformKind::MySql => Arc::new(MysqlExecutor::new(ssl_mode)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_platform_impl_from_name() {
        assert_eq!(PlatformImpl::from_name("pg").unwrap().name(), "postgresql");
        assert_eq!(PlatformImpl::from_name("mssql").unwrap().name(), "sqlserver");
        assert_eq!(PlatformImpl::from_name("mariadb").unwrap().name(), "mysql");
        assert!(PlatformImpl::from_name("oracle").is_err());
    }

    #[test]
    fn test_kind_round_trip() {
        for kind in PlatformKind::ALL {
            let platform = PlatformImpl::from_kind(kind);
            assert_eq!(platform.kind(), kind);
            assert_eq!(platform.name(), kind.as_str());
        }
    }

    #[test]
    fn test_batch_gate_follows_capability_flag() {
        let fixture = BatchFixture::from_kind("single-line", &[]).unwrap();
        for kind in PlatformKind::ALL {
            let platform = PlatformImpl::from_kind(kind);
            let result = platform.batch_script(&fixture);
            assert_eq!(
                result.is_ok(),
                platform.capabilities().supports_batch_statements,
                "{}",
                kind
            );
        }
    }

    #[test]
    fn test_every_platform_produces_deterministic_fixtures() {
        for kind in PlatformKind::ALL {
            let platform = PlatformImpl::from_kind(kind);
            let renders: [fn(&PlatformImpl, &str) -> Result<FixtureScript>; 4] = [
                PlatformImpl::object_creation_script,
                PlatformImpl::object_creation_script_with_error,
                PlatformImpl::object_creation_script_with_tokens,
                PlatformImpl::bulk_table_script,
            ];
            for render in renders {
                let first = render(&platform, "Visitor").unwrap();
                let second = render(&platform, "Visitor").unwrap();
                assert_eq!(first, second);
                assert!(!first.is_blank());
            }
            assert!(!platform.cleanup_script().is_blank());
        }
    }

    #[test]
    fn test_drop_plan_ends_with_drop_everywhere() {
        for kind in PlatformKind::ALL {
            let plan = PlatformImpl::from_kind(kind).drop_database_plan("testdb").unwrap();
            assert_eq!(
                plan.phases().last(),
                Some(&crate::lifecycle::DropPhase::Drop)
            );
        }
    }

    #[test]
    fn test_executor_for() {
        assert_eq!(
            executor_for(PlatformKind::PostgreSql, SslMode::Disable).executor_type(),
            "postgres"
        );
        assert_eq!(
            executor_for(PlatformKind::SqlServer, SslMode::Disable).executor_type(),
            "mssql"
        );
        assert_eq!(
            executor_for(PlatformKind::MySql, SslMode::Disable).executor_type(),
            "mysql"
        );
    }
}
