//! # migrate-fixtures
//!
//! Platform-aware test fixtures for schema-migration engine test suites.
//!
//! One integration-test suite can run unchanged against PostgreSQL,
//! SQL Server and MySQL. This library provides:
//!
//! - **Fixture DDL** per platform, including deliberately broken and
//!   `${TokenN}`-tokenized variants
//! - **Batch-statement scenarios** gated by per-platform capability flags
//! - **Catalog checks** for databases and schema-qualified objects
//! - **Safe teardown** that forces out attached sessions before dropping
//!
//! ## Example
//!
//! ```rust,no_run
//! use migrate_fixtures::TestDataService;
//!
//! #[tokio::main]
//! async fn main() -> migrate_fixtures::Result<()> {
//!     let service = TestDataService::from_env()?;
//!     let conn = service.connection_string_for("migration_test")?;
//!     service.ensure_database(&conn).await?;
//!
//!     let ddl = service.object_creation_script("visitor")?;
//!     service.write_script_file("v0.00/visitor.sql", ddl.as_str())?;
//!
//!     service.drop_database_best_effort(&conn).await;
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod core;
pub mod drivers;
pub mod error;
pub mod fixtures;
pub mod lifecycle;
pub mod service;

#[cfg(test)]
mod testing;

// Re-exports for convenient access
pub use crate::config::{PlatformKind, TestConfig};
pub use crate::core::{
    resolve_object_name, CapabilityFlags, ConnectionDescriptor, ObjectRef, Platform,
    QueryExecutor,
};
pub use drivers::{PlatformImpl, SslMode};
pub use error::{FixtureError, Result};
pub use fixtures::{BatchFixture, FixtureScript};
pub use lifecycle::{DropOutcome, DropPhase, DropPlan, FixtureLifecycle, FixtureState};
pub use service::TestDataService;
