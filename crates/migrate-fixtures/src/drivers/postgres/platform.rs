//! PostgreSQL platform adapter.
//!
//! PostgreSQL executes a script as a single batch, so the batch-statement
//! fixtures are not available here.

use crate::core::identifier::{quote_literal, quote_pg, validate_bare_identifier};
use crate::core::traits::{CapabilityFlags, CatalogProbe, Platform};
use crate::core::ObjectRef;
use crate::error::Result;
use crate::fixtures::{tokenized_name, FixtureScript, STANDARD_SCENARIO_OBJECTS};
use crate::fixtures::tokens::DEFAULT_TOKEN_COUNT;
use crate::lifecycle::{DropPhase, DropPlan, DropStep};

/// PostgreSQL platform adapter.
#[derive(Debug, Clone, Default)]
pub struct PostgresPlatform;

impl PostgresPlatform {
    /// Create a new PostgreSQL platform instance.
    pub fn new() -> Self {
        Self
    }

    fn visitor_table(table: &str, email_type: &str) -> String {
        format!(
            r#"
CREATE TABLE public.{} (
	VisitorID SERIAL NOT NULL,
	FirstName VARCHAR(255) NULL,
	LastName VARCHAR(255) NULL,
	Address VARCHAR(255) NULL,
	Email {}(255) NULL
);
"#,
            table, email_type
        )
    }
}

impl Platform for PostgresPlatform {
    fn name(&self) -> &'static str {
        "postgresql"
    }

    fn default_schema(&self) -> Option<&'static str> {
        Some("public")
    }

    fn maintenance_database(&self) -> &'static str {
        "postgres"
    }

    fn capabilities(&self) -> CapabilityFlags {
        CapabilityFlags {
            supports_batch_statements: false,
            supports_transactional_ddl: true,
            supports_multiple_schemas: true,
        }
    }

    fn database_exists_query(&self, database: &str) -> Result<String> {
        Ok(format!(
            "SELECT 1 FROM pg_database WHERE datname = {};",
            quote_literal(database)?
        ))
    }

    fn object_probes(&self, object: &ObjectRef) -> Result<Vec<CatalogProbe>> {
        let schema = quote_literal(&object.schema)?;
        let name = quote_literal(&object.name)?;

        Ok(vec![
            CatalogProbe::new(
                "pg_proc",
                format!(
                    "SELECT 1 FROM pg_proc p JOIN pg_namespace n ON n.oid = p.pronamespace \
                     WHERE n.nspname = {} AND p.proname = {};",
                    schema, name
                ),
            ),
            CatalogProbe::new(
                "pg_class",
                format!(
                    "SELECT 1 FROM pg_class c JOIN pg_namespace n ON n.oid = c.relnamespace \
                     WHERE n.nspname = {} AND c.relname = {};",
                    schema, name
                ),
            ),
            CatalogProbe::new(
                "information_schema.tables",
                format!(
                    "SELECT 1 FROM information_schema.tables \
                     WHERE table_schema = {} AND table_name = {};",
                    schema, name
                ),
            ),
        ])
    }

    fn create_database_script(&self, database: &str) -> Result<FixtureScript> {
        Ok(FixtureScript::new(format!(
            "CREATE DATABASE {};",
            quote_pg(database)?
        )))
    }

    fn schema_creation_script(&self, schema: &str) -> Result<FixtureScript> {
        validate_bare_identifier(schema)?;
        Ok(FixtureScript::new(format!("\nCREATE SCHEMA {};\n", schema)))
    }

    fn object_creation_script(&self, object_name: &str) -> Result<FixtureScript> {
        validate_bare_identifier(object_name)?;
        Ok(FixtureScript::new(Self::visitor_table(object_name, "VARCHAR")))
    }

    fn object_creation_script_with_error(&self, object_name: &str) -> Result<FixtureScript> {
        validate_bare_identifier(object_name)?;
        // Bracketed type names are SQL Server syntax and fail to parse here.
        Ok(FixtureScript::new(Self::visitor_table(object_name, "[VARCHAR]")))
    }

    fn object_creation_script_with_tokens(&self, object_name: &str) -> Result<FixtureScript> {
        validate_bare_identifier(object_name)?;
        let table = tokenized_name(object_name, DEFAULT_TOKEN_COUNT);
        Ok(FixtureScript::new(Self::visitor_table(&table, "VARCHAR")))
    }

    fn bulk_table_script(&self, table_name: &str) -> Result<FixtureScript> {
        validate_bare_identifier(table_name)?;
        Ok(FixtureScript::new(format!(
            r#"
CREATE TABLE {}(
	FirstName VARCHAR(50) NOT NULL,
	LastName VARCHAR(50) NOT NULL,
	BirthDate TIMESTAMP NULL
);
"#,
            table_name
        )))
    }

    fn cleanup_script(&self) -> FixtureScript {
        let mut sql = String::from("\n");
        for object in STANDARD_SCENARIO_OBJECTS {
            sql.push_str(&format!("DROP TABLE {};\n", object));
        }
        FixtureScript::new(sql)
    }

    fn drop_database_plan(&self, database: &str) -> Result<DropPlan> {
        let ident = quote_pg(database)?;
        let literal = quote_literal(database)?;

        DropPlan::new(
            database,
            vec![
                DropStep::new(DropPhase::VerifyPresence, self.database_exists_query(database)?),
                DropStep::new(
                    DropPhase::DisallowConnections,
                    format!("ALTER DATABASE {} WITH ALLOW_CONNECTIONS false;", ident),
                ),
                DropStep::new(
                    DropPhase::LimitConnections,
                    format!("ALTER DATABASE {} CONNECTION LIMIT 1;", ident),
                ),
                DropStep::new(
                    DropPhase::TerminateSessions,
                    format!(
                        "SELECT pg_terminate_backend(pid) FROM pg_stat_activity \
                         WHERE datname = {} AND pid <> pg_backend_pid();",
                        literal
                    ),
                ),
                DropStep::new(DropPhase::Drop, format!("DROP DATABASE {};", ident)),
            ],
        )
    }
}
