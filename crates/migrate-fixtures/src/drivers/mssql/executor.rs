//! SQL Server query executor.
//!
//! Uses Tiberius over a plain tokio `TcpStream`. The descriptor is handed to
//! Tiberius as an ADO.NET string, so `Encrypt` and `TrustServerCertificate`
//! are honored exactly as SQL Server clients expect.
//!
//! Scripts are sent as a single batch. `GO` is a client-side terminator and
//! must not appear in text passed to [`MssqlExecutor::execute_non_query`].

use async_trait::async_trait;
use tiberius::{Client, Config, Row};
use tokio::net::TcpStream;
use tokio_util::compat::{Compat, TokioAsyncWriteCompatExt};
use tracing::debug;

use crate::core::{ConnectionDescriptor, QueryExecutor};
use crate::drivers::common::text_is_truthy;
use crate::error::{FixtureError, Result};

/// SQL Server executor.
#[derive(Debug, Clone, Default)]
pub struct MssqlExecutor;

impl MssqlExecutor {
    pub fn new() -> Self {
        Self
    }

    pub(crate) fn build_config(conn: &ConnectionDescriptor) -> Result<Config> {
        Config::from_ado_string(&conn.to_string()).map_err(|e| {
            FixtureError::Config(format!(
                "Invalid SQL Server connection string {}: {}",
                conn.redacted(),
                e
            ))
        })
    }

    async fn connect(&self, conn: &ConnectionDescriptor) -> Result<Client<Compat<TcpStream>>> {
        let config = Self::build_config(conn)?;
        let context = format!("connecting to SQL Server {}", conn.redacted());

        let tcp = TcpStream::connect(config.get_addr())
            .await
            .map_err(|e| FixtureError::connection(e, context.clone()))?;
        tcp.set_nodelay(true).ok();

        Client::connect(config, tcp.compat_write())
            .await
            .map_err(|e| FixtureError::connection(e, context))
    }
}

/// Interpret the first column of a row as a boolean.
fn row_is_truthy(row: &Row) -> bool {
    if let Ok(v) = row.try_get::<i32, _>(0) {
        return v.is_some_and(|v| v != 0);
    }
    if let Ok(v) = row.try_get::<u8, _>(0) {
        return v.is_some_and(|v| v != 0);
    }
    if let Ok(v) = row.try_get::<i64, _>(0) {
        return v.is_some_and(|v| v != 0);
    }
    if let Ok(v) = row.try_get::<bool, _>(0) {
        return v.unwrap_or(false);
    }
    match row.try_get::<&str, _>(0) {
        Ok(v) => text_is_truthy(v),
        Err(_) => false,
    }
}

#[async_trait]
impl QueryExecutor for MssqlExecutor {
    async fn query_single_bool(&self, conn: &ConnectionDescriptor, sql: &str) -> Result<bool> {
        let mut client = self.connect(conn).await?;
        debug!("SQL Server query: {}", sql);

        let row = client.simple_query(sql).await?.into_row().await?;
        let value = row.as_ref().map(row_is_truthy).unwrap_or(false);

        client.close().await?;
        Ok(value)
    }

    async fn query_text_column(&self, conn: &ConnectionDescriptor, sql: &str) -> Result<Vec<String>> {
        let mut client = self.connect(conn).await?;
        debug!("SQL Server query: {}", sql);

        let rows = client.simple_query(sql).await?.into_first_result().await?;
        let values = rows
            .iter()
            .filter_map(|row| row.try_get::<&str, _>(0).ok().flatten())
            .map(str::to_string)
            .collect();

        client.close().await?;
        Ok(values)
    }

    async fn execute_non_query(&self, conn: &ConnectionDescriptor, sql: &str) -> Result<()> {
        let mut client = self.connect(conn).await?;
        debug!("SQL Server execute: {}", sql);

        // Drain every result set so errors in later statements surface.
        client.simple_query(sql).await?.into_results().await?;

        client.close().await?;
        Ok(())
    }

    fn executor_type(&self) -> &'static str {
        "mssql"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_config_from_ado_string() {
        let conn = ConnectionDescriptor::parse(
            "Server=tcp:localhost,1433;Database=appdb;User Id=sa;Password=P@ssw0rd!;TrustServerCertificate=true",
        )
        .unwrap();
        let config = MssqlExecutor::build_config(&conn).unwrap();
        assert_eq!(config.get_addr(), "localhost:1433");
    }

    #[test]
    fn test_build_config_after_rebinding() {
        let conn = ConnectionDescriptor::parse("Server=tcp:db,1434;User Id=sa;Password=x")
            .unwrap()
            .with_database("master");
        assert!(MssqlExecutor::build_config(&conn).is_ok());
    }

    #[test]
    fn test_build_config_with_separator_in_password() {
        let conn = ConnectionDescriptor::parse("Server=tcp:db,1433;User Id=sa;Password=\"p;w\"")
            .unwrap()
            .with_database("master");
        assert!(conn.to_string().contains("Password=\"p;w\""));
        assert!(MssqlExecutor::build_config(&conn).is_ok());
    }

    #[test]
    fn test_executor_type() {
        assert_eq!(MssqlExecutor::new().executor_type(), "mssql");
    }
}
