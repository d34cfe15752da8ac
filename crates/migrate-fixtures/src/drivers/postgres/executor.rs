//! PostgreSQL query executor.
//!
//! Opens a fresh `tokio-postgres` connection for every call. Scripts run via
//! the simple query protocol so multi-statement fixtures work unchanged.

use std::time::Duration;

use async_trait::async_trait;
use tokio_postgres::{Client, Config as PgConfig, NoTls, SimpleQueryMessage};
use tracing::{debug, warn};

use crate::core::{ConnectionDescriptor, QueryExecutor};
use crate::drivers::common::{text_is_truthy, SslMode};
use crate::error::{FixtureError, Result};

const HOST_KEYS: &[&str] = &["host", "server", "data source"];
const PORT_KEYS: &[&str] = &["port"];
const USER_KEYS: &[&str] = &["username", "user id", "user", "uid"];
const PASSWORD_KEYS: &[&str] = &["password", "pwd"];
const TIMEOUT_KEYS: &[&str] = &["timeout", "connect timeout"];

/// PostgreSQL executor.
#[derive(Debug, Clone, Default)]
pub struct PostgresExecutor {
    ssl_mode: SslMode,
}

impl PostgresExecutor {
    pub fn new(ssl_mode: SslMode) -> Self {
        Self { ssl_mode }
    }

    /// Translate a connection descriptor into a driver config.
    pub(crate) fn build_config(conn: &ConnectionDescriptor) -> Result<PgConfig> {
        let mut config = PgConfig::new();

        config.host(conn.get_any(HOST_KEYS).unwrap_or("localhost"));

        if let Some(port) = conn.get_any(PORT_KEYS) {
            let port: u16 = port.parse().map_err(|_| {
                FixtureError::Config(format!("Invalid PostgreSQL port '{}'", port))
            })?;
            config.port(port);
        }
        if let Some(user) = conn.get_any(USER_KEYS) {
            config.user(user);
        }
        if let Some(password) = conn.get_any(PASSWORD_KEYS) {
            config.password(password);
        }
        if let Some(db) = conn.database() {
            config.dbname(db);
        }
        if let Some(timeout) = conn.get_any(TIMEOUT_KEYS) {
            let secs: u64 = timeout.parse().map_err(|_| {
                FixtureError::Config(format!("Invalid PostgreSQL timeout '{}'", timeout))
            })?;
            config.connect_timeout(Duration::from_secs(secs));
        }

        Ok(config)
    }

    async fn connect(&self, conn: &ConnectionDescriptor) -> Result<Client> {
        let config = Self::build_config(conn)?;
        let context = format!("connecting to PostgreSQL {}", conn.redacted());

        let client = match self.ssl_mode.connector()? {
            None => {
                let (client, connection) = config
                    .connect(NoTls)
                    .await
                    .map_err(|e| FixtureError::connection(e, context))?;
                tokio::spawn(async move {
                    if let Err(e) = connection.await {
                        warn!("PostgreSQL connection closed with error: {}", e);
                    }
                });
                client
            }
            Some(tls) => {
                let (client, connection) = config
                    .connect(tls)
                    .await
                    .map_err(|e| FixtureError::connection(e, context))?;
                tokio::spawn(async move {
                    if let Err(e) = connection.await {
                        warn!("PostgreSQL connection closed with error: {}", e);
                    }
                });
                client
            }
        };

        Ok(client)
    }
}

#[async_trait]
impl QueryExecutor for PostgresExecutor {
    async fn query_single_bool(&self, conn: &ConnectionDescriptor, sql: &str) -> Result<bool> {
        let client = self.connect(conn).await?;
        debug!("PostgreSQL query: {}", sql);

        let messages = client.simple_query(sql).await?;
        let value = messages.iter().find_map(|m| match m {
            SimpleQueryMessage::Row(row) => Some(text_is_truthy(row.get(0))),
            _ => None,
        });

        Ok(value.unwrap_or(false))
    }

    async fn query_text_column(&self, conn: &ConnectionDescriptor, sql: &str) -> Result<Vec<String>> {
        let client = self.connect(conn).await?;
        debug!("PostgreSQL query: {}", sql);

        let messages = client.simple_query(sql).await?;
        Ok(messages
            .iter()
            .filter_map(|m| match m {
                SimpleQueryMessage::Row(row) => row.get(0).map(str::to_string),
                _ => None,
            })
            .collect())
    }

    async fn execute_non_query(&self, conn: &ConnectionDescriptor, sql: &str) -> Result<()> {
        let client = self.connect(conn).await?;
        debug!("PostgreSQL execute: {}", sql);
        client.batch_execute(sql).await?;
        Ok(())
    }

    fn executor_type(&self) -> &'static str {
        "postgres"
    }
}
