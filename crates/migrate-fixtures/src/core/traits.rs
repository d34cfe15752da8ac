//! Core traits for platform-aware test fixtures.
//!
//! - [`QueryExecutor`]: the two query primitives every platform driver provides
//! - [`Platform`]: the per-platform SQL contract (fixtures, catalog probes, drop plan)
//! - [`CapabilityFlags`]: what a platform's SQL dialect supports
//!
//! # Design Patterns
//!
//! - **Strategy**: each platform adapter is an interchangeable `Platform`
//! - **Template Method**: default trait methods hold the shared behaviour
//!   (unsupported batch fixtures, default-schema lookup)

use async_trait::async_trait;
use serde::Serialize;

use crate::error::{FixtureError, Result};
use crate::fixtures::{BatchFixture, FixtureScript};
use crate::lifecycle::DropPlan;

use super::connection::ConnectionDescriptor;
use super::object_name::ObjectRef;

/// Name of the batch-statement capability, as reported in errors.
pub const SUPPORTS_BATCH_STATEMENTS: &str = "supports_batch_statements";

/// Per-platform capability flags.
///
/// Fixed per adapter; read by the fixture generators to decide whether a
/// fixture can be produced at all.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CapabilityFlags {
    /// Scripts may contain several batches separated by a client-side terminator (e.g. `GO`).
    pub supports_batch_statements: bool,
    /// DDL statements participate in transactions and roll back.
    pub supports_transactional_ddl: bool,
    /// Schemas are namespaces inside a database rather than databases themselves.
    pub supports_multiple_schemas: bool,
}

/// A single catalog lookup used by object existence checks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogProbe {
    /// Catalog queried, for logging (e.g. `pg_proc`).
    pub catalog: &'static str,
    /// Query returning a truthy scalar when the object is present.
    pub sql: String,
}

impl CatalogProbe {
    pub fn new(catalog: &'static str, sql: impl Into<String>) -> Self {
        Self {
            catalog,
            sql: sql.into(),
        }
    }
}

/// Query primitives against a connection descriptor.
///
/// Implementations open a connection for every call and close it before
/// returning. No retries: connectivity errors surface to the caller.
#[async_trait]
pub trait QueryExecutor: Send + Sync {
    /// Run a query and interpret the first column of the first row as a boolean.
    ///
    /// No rows, `NULL`, zero, `false` and empty text are all `false`.
    async fn query_single_bool(&self, conn: &ConnectionDescriptor, sql: &str) -> Result<bool>;

    /// Run a query and return the first column of every row as text.
    ///
    /// `NULL` values are skipped.
    async fn query_text_column(&self, conn: &ConnectionDescriptor, sql: &str) -> Result<Vec<String>>;

    /// Run one or more statements, discarding any results.
    async fn execute_non_query(&self, conn: &ConnectionDescriptor, sql: &str) -> Result<()>;

    /// Get the executor type name for logging/debugging.
    fn executor_type(&self) -> &'static str;
}

/// The per-platform SQL contract.
///
/// Every method is a pure function of its arguments: no I/O, no shared
/// mutable state. Output text is stable across calls with the same input.
pub trait Platform: Send + Sync {
    /// Platform name (e.g. "postgresql").
    fn name(&self) -> &'static str;

    /// Schema used when an object name is unqualified.
    ///
    /// `None` means the platform's schemas are databases and the connection's
    /// active database is the default (see [`Platform::default_schema_for`]).
    fn default_schema(&self) -> Option<&'static str>;

    /// Always-present database used for catalog and administrative queries.
    fn maintenance_database(&self) -> &'static str;

    /// Capability flags for this platform.
    fn capabilities(&self) -> CapabilityFlags;

    /// Default schema for object names resolved against `conn`.
    fn default_schema_for(&self, conn: &ConnectionDescriptor) -> Result<String> {
        match self.default_schema() {
            Some(schema) => Ok(schema.to_string()),
            None => conn.require_database().map(str::to_string),
        }
    }

    /// Catalog query that is truthy when `database` exists.
    fn database_exists_query(&self, database: &str) -> Result<String>;

    /// Catalog probes for `object`, in the order they must be tried.
    fn object_probes(&self, object: &ObjectRef) -> Result<Vec<CatalogProbe>>;

    /// DDL creating a database.
    fn create_database_script(&self, database: &str) -> Result<FixtureScript>;

    /// DDL creating a schema.
    fn schema_creation_script(&self, schema: &str) -> Result<FixtureScript>;

    /// DDL creating the standard visitor table.
    fn object_creation_script(&self, object_name: &str) -> Result<FixtureScript>;

    /// The visitor table DDL with an invalid column definition.
    fn object_creation_script_with_error(&self, object_name: &str) -> Result<FixtureScript>;

    /// The visitor table DDL with `${Token1}`..`${Token3}` appended to the table name.
    fn object_creation_script_with_tokens(&self, object_name: &str) -> Result<FixtureScript>;

    /// DDL creating the table used by bulk-load tests.
    fn bulk_table_script(&self, table_name: &str) -> Result<FixtureScript>;

    /// Multi-statement text for a batch scenario.
    ///
    /// The default implementation fails with
    /// [`FixtureError::UnsupportedCapability`]; platforms that set
    /// `supports_batch_statements` override it.
    fn batch_script(&self, fixture: &BatchFixture) -> Result<FixtureScript> {
        let _ = fixture;
        Err(FixtureError::unsupported(
            self.name(),
            SUPPORTS_BATCH_STATEMENTS,
        ))
    }

    /// DDL removing the objects created by the standard scenarios.
    fn cleanup_script(&self) -> FixtureScript;

    /// Ordered steps that force out sessions and drop `database`.
    fn drop_database_plan(&self, database: &str) -> Result<DropPlan>;
}
