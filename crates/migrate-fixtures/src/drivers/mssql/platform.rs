//! SQL Server platform adapter.
//!
//! SQL Server is the one platform whose scripts may hold several batches
//! separated by a `GO` line, so it renders every [`BatchFixture`].

use crate::core::identifier::{qualify_mssql, quote_literal, quote_mssql, validate_bare_identifier};
use crate::core::traits::{CapabilityFlags, CatalogProbe, Platform};
use crate::core::ObjectRef;
use crate::error::Result;
use crate::fixtures::tokens::DEFAULT_TOKEN_COUNT;
use crate::fixtures::{tokenized_name, BatchFixture, FixtureScript, STANDARD_SCENARIO_OBJECTS};
use crate::lifecycle::{DropPhase, DropPlan, DropStep};

/// Batch terminator understood by SQL Server client tools.
pub const BATCH_TERMINATOR: &str = "GO";

/// Microsoft SQL Server platform adapter.
#[derive(Debug, Clone, Default)]
pub struct MssqlPlatform;

impl MssqlPlatform {
    /// Create a new SQL Server platform instance.
    pub fn new() -> Self {
        Self
    }

    fn visitor_table(table: &str, email_type: &str) -> Result<String> {
        Ok(format!(
            r#"
CREATE TABLE {} (
	[VisitorID] INT IDENTITY(1000,1) NOT NULL,
	[FirstName] NVARCHAR(255) NULL,
	[LastName] NVARCHAR(255) NULL,
	[Address] NVARCHAR(255) NULL,
	[Email] {}(255) NULL
);
"#,
            qualify_mssql("dbo", table)?,
            email_type
        ))
    }

    /// `CREATE PROC` for one scenario object, validated and schema-qualified.
    fn proc(object: &str, body: &str) -> Result<String> {
        validate_bare_identifier(object)?;
        Ok(format!(
            "CREATE PROC {} AS {}",
            qualify_mssql("dbo", object)?,
            body
        ))
    }
}

impl Platform for MssqlPlatform {
    fn name(&self) -> &'static str {
        "sqlserver"
    }

    fn default_schema(&self) -> Option<&'static str> {
        Some("dbo")
    }

    fn maintenance_database(&self) -> &'static str {
        "master"
    }

    fn capabilities(&self) -> CapabilityFlags {
        CapabilityFlags {
            supports_batch_statements: true,
            supports_transactional_ddl: true,
            supports_multiple_schemas: true,
        }
    }

    fn database_exists_query(&self, database: &str) -> Result<String> {
        Ok(format!(
            "SELECT 1 FROM sys.databases WHERE name = {};",
            quote_literal(database)?
        ))
    }

    fn object_probes(&self, object: &ObjectRef) -> Result<Vec<CatalogProbe>> {
        let schema = quote_literal(&object.schema)?;
        let name = quote_literal(&object.name)?;
        let sys_objects = |types: &str| {
            format!(
                "SELECT 1 FROM sys.objects o JOIN sys.schemas s ON s.schema_id = o.schema_id \
                 WHERE LOWER(s.name) = {} AND LOWER(o.name) = {} AND o.type IN ({});",
                schema, name, types
            )
        };

        Ok(vec![
            CatalogProbe::new("sys.objects (routines)", sys_objects("'P', 'FN', 'IF', 'TF'")),
            CatalogProbe::new("sys.objects (relations)", sys_objects("'U', 'V'")),
            CatalogProbe::new(
                "INFORMATION_SCHEMA.TABLES",
                format!(
                    "SELECT 1 FROM INFORMATION_SCHEMA.TABLES \
                     WHERE LOWER(TABLE_SCHEMA) = {} AND LOWER(TABLE_NAME) = {};",
                    schema, name
                ),
            ),
        ])
    }

    fn create_database_script(&self, database: &str) -> Result<FixtureScript> {
        Ok(FixtureScript::new(format!(
            "CREATE DATABASE {};",
            quote_mssql(database)?
        )))
    }

    fn schema_creation_script(&self, schema: &str) -> Result<FixtureScript> {
        validate_bare_identifier(schema)?;
        Ok(FixtureScript::new(format!(
            "\nCREATE SCHEMA {};\n",
            quote_mssql(schema)?
        )))
    }

    fn object_creation_script(&self, object_name: &str) -> Result<FixtureScript> {
        validate_bare_identifier(object_name)?;
        Self::visitor_table(object_name, "NVARCHAR").map(FixtureScript::new)
    }

    fn object_creation_script_with_error(&self, object_name: &str) -> Result<FixtureScript> {
        validate_bare_identifier(object_name)?;
        Self::visitor_table(object_name, "[NVARCHARX]").map(FixtureScript::new)
    }

    fn object_creation_script_with_tokens(&self, object_name: &str) -> Result<FixtureScript> {
        validate_bare_identifier(object_name)?;
        let table = tokenized_name(object_name, DEFAULT_TOKEN_COUNT);
        Self::visitor_table(&table, "NVARCHAR").map(FixtureScript::new)
    }

    fn bulk_table_script(&self, table_name: &str) -> Result<FixtureScript> {
        validate_bare_identifier(table_name)?;
        Ok(FixtureScript::new(format!(
            r#"
CREATE TABLE {}(
	[FirstName] NVARCHAR(50) NOT NULL,
	[LastName] NVARCHAR(50) NOT NULL,
	[BirthDate] DATETIME NULL
);
"#,
            qualify_mssql("dbo", table_name)?
        )))
    }

    fn batch_script(&self, fixture: &BatchFixture) -> Result<FixtureScript> {
        let go = BATCH_TERMINATOR;
        let sql = match fixture {
            BatchFixture::SingleLine { object } => {
                format!("{}\n{}\n", Self::proc(object, "SELECT 1;")?, go)
            }
            BatchFixture::SingleLineWithoutTerminator { object } => {
                format!("{}\n", Self::proc(object, "SELECT 1;")?)
            }
            BatchFixture::MultilineWithoutTerminatorInLastLine { objects: [o1, o2, o3] } => {
                format!(
                    "{}\n{go}\n\n{}\n{go}\n\n{}\n",
                    Self::proc(o1, "SELECT 1;")?,
                    Self::proc(o2, "SELECT 1;")?,
                    Self::proc(o3, "SELECT 1;")?,
                )
            }
            BatchFixture::MultilineWithTerminatorInCommentBlock { objects: [o1, o2, o3] } => {
                format!(
                    "--{go} inline comment\n{}\n{go}\n\n/*\n{go} in comment block\n*/\n{}\n{go}\n\n\
                     /* multiline comment block\n{go}\n*/\n{}\n{go}\n",
                    Self::proc(o1, "SELECT 1;")?,
                    Self::proc(o2, "SELECT 1;")?,
                    Self::proc(o3, "SELECT 1;")?,
                )
            }
            BatchFixture::MultilineWithTerminatorInsideStatements { objects: [o1, o2, o3] } => {
                format!(
                    "{}\n{go}\n\n{}\n{go}\n\n{}\n{go}\n",
                    Self::proc(o1, "SELECT 'GO' AS [GO];")?,
                    Self::proc(o2, "SELECT 1 AS GOAL, 'LETS GO' AS CHEER;")?,
                    Self::proc(o3, "SELECT 'GOING\nGONE' AS STATUS;")?,
                )
            }
            BatchFixture::MultilineWithError { objects: [o1, o2] } => {
                format!(
                    "{}\n{go}\n\n{}\n{go}\n",
                    Self::proc(o1, "SELECT 1;")?,
                    Self::proc(o2, "SELECT 1 FROM;")?,
                )
            }
        };
        Ok(FixtureScript::new(sql))
    }

    fn cleanup_script(&self) -> FixtureScript {
        let mut sql = String::from("\n");
        for object in STANDARD_SCENARIO_OBJECTS {
            sql.push_str(&format!("DROP PROCEDURE IF EXISTS [dbo].[{}];\n", object));
            sql.push_str(&format!("DROP TABLE IF EXISTS [dbo].[{}];\n", object));
        }
        FixtureScript::new(sql)
    }

    fn drop_database_plan(&self, database: &str) -> Result<DropPlan> {
        let ident = quote_mssql(database)?;

        DropPlan::new(
            database,
            vec![
                DropStep::new(DropPhase::VerifyPresence, self.database_exists_query(database)?),
                // SINGLE_USER with ROLLBACK IMMEDIATE ends every other session. Sent in
                // the same batch as the drop so no client can take the single slot first.
                DropStep::new(
                    DropPhase::Drop,
                    format!(
                        "ALTER DATABASE {ident} SET SINGLE_USER WITH ROLLBACK IMMEDIATE;\n\
                         DROP DATABASE {ident};"
                    ),
                ),
            ],
        )
    }
}
