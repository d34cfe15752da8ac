//! MySQL/MariaDB query executor.
//!
//! Opens a single `mysql_async` connection per call and disconnects before
//! returning. Multi-statement scripts are sent through the text protocol.

use async_trait::async_trait;
use mysql_async::prelude::*;
use mysql_async::{Conn, OptsBuilder, Row, SslOpts, Value};
use tracing::{debug, warn};

use crate::core::{ConnectionDescriptor, QueryExecutor};
use crate::drivers::common::{text_is_truthy, SslMode};
use crate::error::{FixtureError, Result};

const HOST_KEYS: &[&str] = &["server", "host", "data source"];
const PORT_KEYS: &[&str] = &["port"];
const USER_KEYS: &[&str] = &["uid", "user", "user id", "username"];
const PASSWORD_KEYS: &[&str] = &["pwd", "password"];

/// MySQL executor.
#[derive(Debug, Clone, Default)]
pub struct MysqlExecutor {
    ssl_mode: SslMode,
}

impl MysqlExecutor {
    pub fn new(ssl_mode: SslMode) -> Self {
        Self { ssl_mode }
    }

    pub(crate) fn build_opts(&self, conn: &ConnectionDescriptor) -> Result<OptsBuilder> {
        let mut builder = OptsBuilder::default()
            .ip_or_hostname(conn.get_any(HOST_KEYS).unwrap_or("localhost"))
            .user(conn.get_any(USER_KEYS))
            .pass(conn.get_any(PASSWORD_KEYS))
            .db_name(conn.database());

        if let Some(port) = conn.get_any(PORT_KEYS) {
            let port: u16 = port
                .parse()
                .map_err(|_| FixtureError::Config(format!("Invalid MySQL port '{}'", port)))?;
            builder = builder.tcp_port(port);
        }

        if !self.ssl_mode.requires_tls() {
            debug!("MySQL TLS is disabled");
            return Ok(builder.ssl_opts(None::<SslOpts>));
        }
        let ssl_opts = match self.ssl_mode {
            SslMode::Require => SslOpts::default().with_danger_accept_invalid_certs(true),
            _ => SslOpts::default(),
        };

        Ok(builder.ssl_opts(Some(ssl_opts)))
    }

    async fn connect(&self, conn: &ConnectionDescriptor) -> Result<Conn> {
        let opts = self.build_opts(conn)?;
        Conn::new(opts).await.map_err(|e| {
            FixtureError::connection(e, format!("connecting to MySQL {}", conn.redacted()))
        })
    }

    async fn disconnect(conn: Conn) {
        if let Err(e) = conn.disconnect().await {
            warn!("MySQL disconnect failed: {}", e);
        }
    }
}

fn value_is_truthy(value: &Value) -> bool {
    match value {
        Value::NULL => false,
        Value::Int(i) => *i != 0,
        Value::UInt(u) => *u != 0,
        Value::Float(f) => *f != 0.0,
        Value::Double(d) => *d != 0.0,
        Value::Bytes(bytes) => text_is_truthy(std::str::from_utf8(bytes).ok()),
        _ => true,
    }
}

#[async_trait]
impl QueryExecutor for MysqlExecutor {
    async fn query_single_bool(&self, conn: &ConnectionDescriptor, sql: &str) -> Result<bool> {
        let mut client = self.connect(conn).await?;
        debug!("MySQL query: {}", sql);

        let result: std::result::Result<Option<Row>, _> = client.query_first(sql).await;
        Self::disconnect(client).await;

        let value = result?
            .as_ref()
            .and_then(|row| row.as_ref(0))
            .map(value_is_truthy)
            .unwrap_or(false);
        Ok(value)
    }

    async fn query_text_column(&self, conn: &ConnectionDescriptor, sql: &str) -> Result<Vec<String>> {
        let mut client = self.connect(conn).await?;
        debug!("MySQL query: {}", sql);

        let result: std::result::Result<Vec<Option<String>>, _> = client.query(sql).await;
        Self::disconnect(client).await;

        Ok(result?.into_iter().flatten().collect())
    }

    async fn execute_non_query(&self, conn: &ConnectionDescriptor, sql: &str) -> Result<()> {
        let mut client = self.connect(conn).await?;
        debug!("MySQL execute: {}", sql);

        let result = client.query_drop(sql).await;
        Self::disconnect(client).await;
        result?;
        Ok(())
    }

    fn executor_type(&self) -> &'static str {
        "mysql"
    }
}
