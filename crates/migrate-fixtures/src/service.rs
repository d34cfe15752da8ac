//! The test data service.
//!
//! [`TestDataService`] combines a platform adapter, a query executor and the
//! test configuration. It is what a test suite holds on to: connection
//! strings per database, catalog checks, fixture text and teardown.

use std::path::Path;
use std::sync::Arc;

use tracing::{debug, info};

use crate::config::TestConfig;
use crate::core::identifier::validate_identifier;
use crate::core::{
    resolve_object_name, CapabilityFlags, ConnectionDescriptor, Platform, QueryExecutor,
};
use crate::drivers::{executor_for, PlatformImpl, SslMode};
use crate::error::Result;
use crate::fixtures::{self, BatchFixture, FixtureScript};
use crate::lifecycle::{self, DropOutcome};

/// Platform-aware fixtures and database lifecycle for one test run.
pub struct TestDataService {
    platform: PlatformImpl,
    executor: Arc<dyn QueryExecutor>,
    config: TestConfig,
}

impl TestDataService {
    /// Assemble a service from its parts.
    pub fn new(platform: PlatformImpl, executor: Arc<dyn QueryExecutor>, config: TestConfig) -> Self {
        Self {
            platform,
            executor,
            config,
        }
    }

    /// Build the adapter and native executor selected by `config`.
    pub fn from_config(config: TestConfig) -> Result<Self> {
        config.validate()?;
        let ssl_mode = SslMode::parse(&config.ssl_mode)?;
        let platform = PlatformImpl::from_kind(config.platform);
        let executor = executor_for(config.platform, ssl_mode);

        debug!(
            "Test data service for {} using {} executor",
            platform.name(),
            executor.executor_type()
        );
        Ok(Self::new(platform, executor, config))
    }

    /// Build from the process environment.
    pub fn from_env() -> Result<Self> {
        Self::from_config(TestConfig::from_env()?)
    }

    pub fn platform(&self) -> &PlatformImpl {
        &self.platform
    }

    pub fn config(&self) -> &TestConfig {
        &self.config
    }

    pub fn capabilities(&self) -> CapabilityFlags {
        self.platform.capabilities()
    }

    // ===== Connections =====

    /// The base connection string with its active database set to `database`.
    ///
    /// # Errors
    ///
    /// Returns `FixtureError::Config` when no base connection string is
    /// configured or `database` is not a valid name.
    pub fn connection_string_for(&self, database: &str) -> Result<ConnectionDescriptor> {
        validate_identifier(database)?;
        Ok(self.config.base_connection_string()?.with_database(database))
    }

    /// `conn` rebound to the maintenance database.
    pub fn maintenance_connection(&self, conn: &ConnectionDescriptor) -> ConnectionDescriptor {
        let maintenance = self
            .config
            .maintenance_database
            .as_deref()
            .unwrap_or_else(|| self.platform.maintenance_database());
        conn.with_database(maintenance)
    }

    // ===== Catalog checks =====

    /// Whether the database named in `conn` exists.
    ///
    /// The catalog is queried from the maintenance database, so this works
    /// whether or not the target database is there.
    pub async fn database_exists(&self, conn: &ConnectionDescriptor) -> Result<bool> {
        let database = conn.require_database()?;
        let sql = self.platform.database_exists_query(database)?;
        let exists = self
            .executor
            .query_single_bool(&self.maintenance_connection(conn), &sql)
            .await?;

        debug!("Database {} exists: {}", database, exists);
        Ok(exists)
    }

    /// Whether `object_name` (optionally `schema.name`) exists in the database of `conn`.
    ///
    /// Probes run in platform order and stop at the first match.
    pub async fn object_exists(&self, conn: &ConnectionDescriptor, object_name: &str) -> Result<bool> {
        let default_schema = self.platform.default_schema_for(conn)?;
        let object = resolve_object_name(object_name, &default_schema)?;

        for probe in self.platform.object_probes(&object)? {
            if self.executor.query_single_bool(conn, &probe.sql).await? {
                debug!("Found {} in {}", object, probe.catalog);
                return Ok(true);
            }
        }

        debug!("{} not found", object);
        Ok(false)
    }

    // ===== Fixture scripts =====

    pub fn create_database_script(&self, database: &str) -> Result<FixtureScript> {
        self.platform.create_database_script(database)
    }

    pub fn schema_creation_script(&self, schema: &str) -> Result<FixtureScript> {
        self.platform.schema_creation_script(schema)
    }

    pub fn object_creation_script(&self, object_name: &str) -> Result<FixtureScript> {
        self.platform.object_creation_script(object_name)
    }

    pub fn object_creation_script_with_error(&self, object_name: &str) -> Result<FixtureScript> {
        self.platform.object_creation_script_with_error(object_name)
    }

    pub fn object_creation_script_with_tokens(&self, object_name: &str) -> Result<FixtureScript> {
        self.platform.object_creation_script_with_tokens(object_name)
    }

    pub fn bulk_table_script(&self, table_name: &str) -> Result<FixtureScript> {
        self.platform.bulk_table_script(table_name)
    }

    /// Text for any batch scenario; fails unless the platform supports batches.
    pub fn batch_script(&self, fixture: &BatchFixture) -> Result<FixtureScript> {
        self.platform.batch_script(fixture)
    }

    pub fn single_line_script(&self, object: &str) -> Result<FixtureScript> {
        self.batch_script(&BatchFixture::SingleLine {
            object: object.to_string(),
        })
    }

    pub fn single_line_without_terminator_script(&self, object: &str) -> Result<FixtureScript> {
        self.batch_script(&BatchFixture::SingleLineWithoutTerminator {
            object: object.to_string(),
        })
    }

    pub fn multiline_without_terminator_in_last_line_script(
        &self,
        object1: &str,
        object2: &str,
        object3: &str,
    ) -> Result<FixtureScript> {
        self.batch_script(&BatchFixture::MultilineWithoutTerminatorInLastLine {
            objects: [object1.into(), object2.into(), object3.into()],
        })
    }

    pub fn multiline_with_terminator_in_comment_block_script(
        &self,
        object1: &str,
        object2: &str,
        object3: &str,
    ) -> Result<FixtureScript> {
        self.batch_script(&BatchFixture::MultilineWithTerminatorInCommentBlock {
            objects: [object1.into(), object2.into(), object3.into()],
        })
    }

    pub fn multiline_with_terminator_inside_statements_script(
        &self,
        object1: &str,
        object2: &str,
        object3: &str,
    ) -> Result<FixtureScript> {
        self.batch_script(&BatchFixture::MultilineWithTerminatorInsideStatements {
            objects: [object1.into(), object2.into(), object3.into()],
        })
    }

    pub fn multiline_with_error_script(&self, object1: &str, object2: &str) -> Result<FixtureScript> {
        self.batch_script(&BatchFixture::MultilineWithError {
            objects: [object1.into(), object2.into()],
        })
    }

    pub fn cleanup_script(&self) -> FixtureScript {
        self.platform.cleanup_script()
    }

    /// Write `sql` to `path` as one line.
    pub fn write_script_file(&self, path: impl AsRef<Path>, sql: &str) -> Result<()> {
        fixtures::write_script_file(path, sql)
    }

    // ===== Lifecycle =====

    /// Run `script` against the database of `conn`.
    pub async fn execute_script(&self, conn: &ConnectionDescriptor, script: &FixtureScript) -> Result<()> {
        self.executor.execute_non_query(conn, script.as_str()).await
    }

    /// Create the database named in `conn` unless it exists.
    ///
    /// Returns `true` when the database was created by this call.
    pub async fn ensure_database(&self, conn: &ConnectionDescriptor) -> Result<bool> {
        if self.database_exists(conn).await? {
            return Ok(false);
        }

        let database = conn.require_database()?;
        let script = self.platform.create_database_script(database)?;
        self.executor
            .execute_non_query(&self.maintenance_connection(conn), script.as_str())
            .await?;

        info!("Created database {}", database);
        Ok(true)
    }

    /// Force out attached sessions and drop the database named in `conn`.
    ///
    /// # Errors
    ///
    /// Returns `FixtureError::Cleanup` naming the phase that failed.
    pub async fn drop_database(&self, conn: &ConnectionDescriptor) -> Result<()> {
        let plan = self.platform.drop_database_plan(conn.require_database()?)?;
        lifecycle::run_drop_plan(self.executor.as_ref(), &self.maintenance_connection(conn), &plan)
            .await
    }

    /// Like [`drop_database`](Self::drop_database) but never fails.
    pub async fn drop_database_best_effort(&self, conn: &ConnectionDescriptor) -> DropOutcome {
        let plan = match conn
            .require_database()
            .and_then(|db| self.platform.drop_database_plan(db))
        {
            Ok(plan) => plan,
            Err(e) => {
                return DropOutcome::LeakedToContainerTeardown {
                    reason: e.to_string(),
                }
            }
        };
        lifecycle::run_drop_plan_best_effort(
            self.executor.as_ref(),
            &self.maintenance_connection(conn),
            &plan,
        )
        .await
    }
}
