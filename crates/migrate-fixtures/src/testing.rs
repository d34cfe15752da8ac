//! In-memory query executor for unit tests.

use std::sync::Mutex;

use async_trait::async_trait;

use crate::core::{ConnectionDescriptor, QueryExecutor};
use crate::error::{FixtureError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum CallKind {
    Query,
    QueryRows,
    Execute,
}

#[derive(Debug, Clone)]
pub(crate) struct Call {
    pub kind: CallKind,
    pub sql: String,
    pub database: Option<String>,
}

/// Records every call; answers queries by substring match.
#[derive(Default)]
pub(crate) struct RecordingExecutor {
    truthy: Vec<String>,
    rows: Vec<(String, Vec<String>)>,
    failing: Vec<String>,
    calls: Mutex<Vec<Call>>,
}

impl RecordingExecutor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queries containing `needle` return `value` (only `true` needs registering).
    pub fn with_bool(mut self, needle: &str, value: bool) -> Self {
        if value {
            self.truthy.push(needle.to_string());
        }
        self
    }

    /// Column queries containing `needle` return `rows`.
    pub fn with_rows(mut self, needle: &str, rows: &[&str]) -> Self {
        self.rows.push((
            needle.to_string(),
            rows.iter().map(|r| r.to_string()).collect(),
        ));
        self
    }

    /// Calls containing `needle` fail with a connection error.
    pub fn failing_on(mut self, needle: &str) -> Self {
        self.failing.push(needle.to_string());
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().map(|c| c.clone()).unwrap_or_default()
    }

    fn record(&self, kind: CallKind, conn: &ConnectionDescriptor, sql: &str) -> Result<()> {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(Call {
                kind,
                sql: sql.to_string(),
                database: conn.database().map(str::to_string),
            });
        }
        if self.failing.iter().any(|n| sql.contains(n.as_str())) {
            return Err(FixtureError::connection(
                "simulated failure",
                format!("running {:?}", sql),
            ));
        }
        Ok(())
    }
}

#[async_trait]
impl QueryExecutor for RecordingExecutor {
    async fn query_single_bool(&self, conn: &ConnectionDescriptor, sql: &str) -> Result<bool> {
        self.record(CallKind::Query, conn, sql)?;
        Ok(self.truthy.iter().any(|n| sql.contains(n.as_str())))
    }

    async fn query_text_column(&self, conn: &ConnectionDescriptor, sql: &str) -> Result<Vec<String>> {
        self.record(CallKind::QueryRows, conn, sql)?;
        Ok(self
            .rows
            .iter()
            .find(|(n, _)| sql.contains(n.as_str()))
            .map(|(_, rows)| rows.clone())
            .unwrap_or_default())
    }

    async fn execute_non_query(&self, conn: &ConnectionDescriptor, sql: &str) -> Result<()> {
        self.record(CallKind::Execute, conn, sql)
    }

    fn executor_type(&self) -> &'static str {
        "recording"
    }
}
