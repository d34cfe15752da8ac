//! MySQL/MariaDB platform adapter.
//!
//! In MySQL a schema is a database, so unqualified names resolve against the
//! connection's active database and there is no separate schema namespace.

use crate::core::identifier::{quote_mysql, quote_mysql_literal, validate_bare_identifier};
use crate::core::traits::{CapabilityFlags, CatalogProbe, Platform};
use crate::core::ObjectRef;
use crate::error::Result;
use crate::fixtures::tokens::DEFAULT_TOKEN_COUNT;
use crate::fixtures::{tokenized_name, FixtureScript, STANDARD_SCENARIO_OBJECTS};
use crate::lifecycle::{DropPhase, DropPlan, DropStep};

/// Upper bound, in seconds, on the metadata-lock wait of `DROP DATABASE`.
/// The server default is a year.
const DROP_LOCK_WAIT_SECONDS: u32 = 30;

/// MySQL/MariaDB platform adapter.
#[derive(Debug, Clone, Default)]
pub struct MysqlPlatform;

impl MysqlPlatform {
    /// Create a new MySQL platform instance.
    pub fn new() -> Self {
        Self
    }

    fn visitor_table(table: &str, email_type: &str) -> String {
        format!(
            r#"
CREATE TABLE {} (
	VisitorID INT AUTO_INCREMENT NOT NULL PRIMARY KEY,
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

impl Platform for MysqlPlatform {
    fn name(&self) -> &'static str {
        "mysql"
    }

    fn default_schema(&self) -> Option<&'static str> {
        None
    }

    fn maintenance_database(&self) -> &'static str {
        "information_schema"
    }

    fn capabilities(&self) -> CapabilityFlags {
        CapabilityFlags {
            supports_batch_statements: false,
            supports_transactional_ddl: false,
            supports_multiple_schemas: false,
        }
    }

    fn database_exists_query(&self, database: &str) -> Result<String> {
        Ok(format!(
            "SELECT 1 FROM information_schema.SCHEMATA WHERE SCHEMA_NAME = {};",
            quote_mysql_literal(database)?
        ))
    }

    fn object_probes(&self, object: &ObjectRef) -> Result<Vec<CatalogProbe>> {
        let schema = quote_mysql_literal(&object.schema)?;
        let name = quote_mysql_literal(&object.name)?;

        Ok(vec![
            CatalogProbe::new(
                "information_schema.ROUTINES",
                format!(
                    "SELECT 1 FROM information_schema.ROUTINES \
                     WHERE LOWER(ROUTINE_SCHEMA) = {} AND LOWER(ROUTINE_NAME) = {};",
                    schema, name
                ),
            ),
            CatalogProbe::new(
                "information_schema.TABLES",
                format!(
                    "SELECT 1 FROM information_schema.TABLES \
                     WHERE LOWER(TABLE_SCHEMA) = {} AND LOWER(TABLE_NAME) = {};",
                    schema, name
                ),
            ),
        ])
    }

    fn create_database_script(&self, database: &str) -> Result<FixtureScript> {
        Ok(FixtureScript::new(format!(
            "CREATE DATABASE {};",
            quote_mysql(database)?
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
        Ok(FixtureScript::new(Self::visitor_table(object_name, "VARCHARX")))
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
	BirthDate DATETIME NULL
);
"#,
            table_name
        )))
    }

    fn cleanup_script(&self) -> FixtureScript {
        let mut sql = String::from("\n");
        for object in STANDARD_SCENARIO_OBJECTS {
            sql.push_str(&format!("DROP TABLE IF EXISTS {};\n", object));
        }
        FixtureScript::new(sql)
    }

    fn drop_database_plan(&self, database: &str) -> Result<DropPlan> {
        DropPlan::new(
            database,
            vec![
                DropStep::new(DropPhase::VerifyPresence, self.database_exists_query(database)?),
                DropStep::generated(
                    DropPhase::TerminateSessions,
                    format!(
                        "SELECT CONCAT('KILL ', ID) FROM information_schema.PROCESSLIST \
                         WHERE DB = {} AND ID <> CONNECTION_ID();",
                        quote_mysql_literal(database)?
                    ),
                ),
                DropStep::new(
                    DropPhase::Drop,
                    format!(
                        "SET SESSION lock_wait_timeout = {}; DROP DATABASE {};",
                        DROP_LOCK_WAIT_SECONDS,
                        quote_mysql(database)?
                    ),
                ),
            ],
        )
    }
}
