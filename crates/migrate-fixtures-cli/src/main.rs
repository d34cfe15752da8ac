//! migrate-fixtures CLI - platform test fixtures and database teardown.

use clap::{Parser, Subcommand, ValueEnum};
use migrate_fixtures::{
    BatchFixture, FixtureError, FixtureScript, Platform, PlatformKind, TestConfig,
    TestDataService,
};
use serde_json::json;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{info, Level};
use tracing_subscriber::fmt::format::FmtSpan;

#[derive(Parser)]
#[command(name = "migrate-fixtures")]
#[command(about = "Platform-aware test fixtures for migration engine test suites")]
#[command(version)]
struct Cli {
    /// Path to YAML configuration file (default: environment only)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override the platform: postgresql, sqlserver, mysql
    #[arg(short, long)]
    platform: Option<String>,

    /// Output JSON result to stdout
    #[arg(long)]
    output_json: bool,

    /// Log format: text or json
    #[arg(long, default_value = "text")]
    log_format: String,

    /// Log verbosity: debug, info, warn, error
    #[arg(long, default_value = "warn")]
    verbosity: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the platform's capability flags and defaults
    Capabilities,

    /// Print a fixture script
    Script {
        /// Fixture to render
        #[arg(value_enum)]
        kind: ScriptKind,

        /// Object, schema or database names the fixture needs
        names: Vec<String>,

        /// Write the script to this file instead of stdout
        #[arg(short, long)]
        out: Option<PathBuf>,
    },

    /// Check whether a database exists
    DbExists {
        database: String,
    },

    /// Check whether an object exists in a database
    ObjectExists {
        database: String,

        /// Object name, optionally schema-qualified
        object: String,
    },

    /// Create a database unless it exists
    CreateDb {
        database: String,
    },

    /// Force out attached sessions and drop a database
    DropDb {
        database: String,

        /// Report a failed drop instead of exiting with an error
        #[arg(long)]
        best_effort: bool,
    },
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum ScriptKind {
    CreateDatabase,
    Schema,
    Object,
    ObjectWithError,
    ObjectWithTokens,
    BulkTable,
    Cleanup,
    DropPlan,
    SingleLine,
    SingleLineWithoutTerminator,
    MultilineWithoutTerminatorInLastLine,
    MultilineWithTerminatorInCommentBlock,
    MultilineWithTerminatorInsideStatements,
    MultilineWithError,
}

#[tokio::main]
async fn main() -> ExitCode {
    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{}", e.format_detailed());
            ExitCode::from(e.exit_code())
        }
    }
}

async fn run() -> Result<(), FixtureError> {
    let cli = Cli::parse();

    setup_logging(&cli.verbosity, &cli.log_format).map_err(FixtureError::Config)?;

    let mut config = match &cli.config {
        Some(path) => {
            let config = TestConfig::load(path)?;
            info!("Loaded configuration from {:?}", path);
            config
        }
        None => TestConfig::from_env()?,
    };
    if let Some(ref platform) = cli.platform {
        config.platform = platform.parse::<PlatformKind>()?;
    }

    let service = TestDataService::from_config(config)?;

    match cli.command {
        Commands::Capabilities => {
            let platform = service.platform();
            let flags = service.capabilities();
            if cli.output_json {
                let result = json!({
                    "platform": platform.name(),
                    "default_schema": platform.default_schema(),
                    "maintenance_database": platform.maintenance_database(),
                    "capabilities": flags,
                });
                println!("{}", serde_json::to_string_pretty(&result)?);
            } else {
                println!("Platform: {}", platform.name());
                println!(
                    "  Default schema: {}",
                    platform.default_schema().unwrap_or("(active database)")
                );
                println!("  Maintenance database: {}", platform.maintenance_database());
                println!("  supports_batch_statements: {}", flags.supports_batch_statements);
                println!("  supports_transactional_ddl: {}", flags.supports_transactional_ddl);
                println!("  supports_multiple_schemas: {}", flags.supports_multiple_schemas);
            }
        }

        Commands::Script { kind, names, out } => {
            let script = render_script(&service, kind, &names)?;
            match out {
                Some(path) => {
                    service.write_script_file(&path, script.as_str())?;
                    info!("Wrote {:?}", path);
                }
                None => print!("{}", script),
            }
        }

        Commands::DbExists { database } => {
            let conn = service.connection_string_for(&database)?;
            let exists = service.database_exists(&conn).await?;
            print_bool(cli.output_json, "exists", exists)?;
        }

        Commands::ObjectExists { database, object } => {
            let conn = service.connection_string_for(&database)?;
            let exists = service.object_exists(&conn, &object).await?;
            print_bool(cli.output_json, "exists", exists)?;
        }

        Commands::CreateDb { database } => {
            let conn = service.connection_string_for(&database)?;
            let created = service.ensure_database(&conn).await?;
            if cli.output_json {
                println!("{}", json!({ "database": database, "created": created }));
            } else if created {
                println!("Created database {}", database);
            } else {
                println!("Database {} already exists", database);
            }
        }

        Commands::DropDb {
            database,
            best_effort,
        } => {
            let conn = service.connection_string_for(&database)?;
            if best_effort {
                let outcome = service.drop_database_best_effort(&conn).await;
                if cli.output_json {
                    println!("{}", serde_json::to_string(&outcome)?);
                } else {
                    println!("{}: {}", database, outcome.fixture_state());
                }
            } else {
                service.drop_database(&conn).await?;
                if cli.output_json {
                    println!("{}", json!({ "database": database, "outcome": "dropped" }));
                } else {
                    println!("Dropped database {}", database);
                }
            }
        }
    }

    Ok(())
}

fn render_script(
    service: &TestDataService,
    kind: ScriptKind,
    names: &[String],
) -> Result<FixtureScript, FixtureError> {
    let name = || {
        names.first().map(String::as_str).ok_or_else(|| {
            FixtureError::Config(format!("script {:?} needs a name argument", kind))
        })
    };

    let script = match kind {
        ScriptKind::CreateDatabase => service.create_database_script(name()?)?,
        ScriptKind::Schema => service.schema_creation_script(name()?)?,
        ScriptKind::Object => service.object_creation_script(name()?)?,
        ScriptKind::ObjectWithError => service.object_creation_script_with_error(name()?)?,
        ScriptKind::ObjectWithTokens => service.object_creation_script_with_tokens(name()?)?,
        ScriptKind::BulkTable => service.bulk_table_script(name()?)?,
        ScriptKind::Cleanup => service.cleanup_script(),
        ScriptKind::DropPlan => {
            FixtureScript::new(service.platform().drop_database_plan(name()?)?.to_script())
        }
        batch => {
            let kind_name = batch
                .to_possible_value()
                .map(|v| v.get_name().to_string())
                .unwrap_or_default();
            let fixture = BatchFixture::from_kind(&kind_name, names).ok_or_else(|| {
                FixtureError::Config(format!("Unknown batch fixture '{}'", kind_name))
            })?;
            service.batch_script(&fixture)?
        }
    };

    Ok(script)
}

fn print_bool(as_json: bool, key: &str, value: bool) -> Result<(), FixtureError> {
    if as_json {
        let mut map = serde_json::Map::new();
        map.insert(key.to_string(), value.into());
        println!("{}", serde_json::to_string(&map)?);
    } else {
        println!("{}", value);
    }
    Ok(())
}

fn setup_logging(verbosity: &str, format: &str) -> Result<(), String> {
    let level = match verbosity.to_lowercase().as_str() {
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        other => return Err(format!("Invalid verbosity '{}'", other)),
    };

    // Logs go to stderr so scripts on stdout stay pipeable.
    let subscriber = tracing_subscriber::fmt()
        .with_max_level(level)
        .with_span_events(FmtSpan::CLOSE)
        .with_target(false)
        .with_writer(std::io::stderr);

    if format == "json" {
        subscriber.json().init();
    } else {
        subscriber.init();
    }

    Ok(())
}
