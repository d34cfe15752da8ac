//! Database lifecycle management for test runs.
//!
//! Dropping a test database has to tolerate sessions that are still attached:
//! the engine under test, this process, or leftovers from an earlier run. The
//! protocol is an ordered sequence of [`DropPhase`]s, each a separate round
//! trip against the platform's maintenance database:
//!
//! 1. verify presence (logged, never short-circuits)
//! 2. disallow new connections
//! 3. limit the connection count
//! 4. terminate attached sessions
//! 5. drop
//!
//! A step may instead be a query that lists statements to run, one round trip
//! each (MySQL's `KILL` per attached session). Those statements are allowed to
//! fail: a session can disconnect between being listed and being killed.
//!
//! The sequence is best effort, not transactional. A session that sneaks in
//! between steps 4 and 5 makes the drop fail. Test databases are expected to
//! live in disposable containers, so [`DropOutcome::LeakedToContainerTeardown`]
//! is an acceptable result.

mod plan;
mod state;

pub use plan::{DropPhase, DropPlan, DropStep};
pub use state::{FixtureLifecycle, FixtureState};

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::core::{ConnectionDescriptor, QueryExecutor};
use crate::error::{FixtureError, Result};

/// Result of a best-effort drop.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum DropOutcome {
    Dropped,
    LeakedToContainerTeardown { reason: String },
}

impl DropOutcome {
    /// The lifecycle end state this outcome corresponds to.
    pub fn fixture_state(&self) -> FixtureState {
        match self {
            DropOutcome::Dropped => FixtureState::Dropped,
            DropOutcome::LeakedToContainerTeardown { .. } => {
                FixtureState::LeakedToContainerTeardown
            }
        }
    }
}

/// Run `plan` step by step against `maintenance`.
///
/// A failing verify query is a connectivity problem and is returned as is.
/// A failing destructive step is returned as [`FixtureError::Cleanup`] naming
/// the phase; nothing is retried.
pub async fn run_drop_plan(
    executor: &dyn QueryExecutor,
    maintenance: &ConnectionDescriptor,
    plan: &DropPlan,
) -> Result<()> {
    let database = plan.database();

    for step in plan.steps() {
        debug!("Drop {} [{}]: {}", database, step.phase, step.sql);

        if !step.phase.is_destructive() {
            if executor.query_single_bool(maintenance, &step.sql).await? {
                info!("Database {} found in catalog, dropping", database);
            } else {
                warn!(
                    "Database {} not found in catalog, attempting drop anyway",
                    database
                );
            }
            continue;
        }

        let step_failed = |e: FixtureError| {
            FixtureError::cleanup(database, format!("{} step failed: {}", step.phase, e))
        };

        if !step.generates_statements {
            executor
                .execute_non_query(maintenance, &step.sql)
                .await
                .map_err(step_failed)?;
            continue;
        }

        let statements = executor
            .query_text_column(maintenance, &step.sql)
            .await
            .map_err(step_failed)?;
        debug!("Drop {} [{}]: {} statements", database, step.phase, statements.len());

        // A session may end on its own between listing and killing it.
        for statement in &statements {
            if let Err(e) = executor.execute_non_query(maintenance, statement).await {
                warn!("Drop {} [{}]: {} failed: {}", database, step.phase, statement, e);
            }
        }
    }

    info!("Dropped database {}", database);
    Ok(())
}

/// Run `plan`, downgrading any failure to [`DropOutcome::LeakedToContainerTeardown`].
pub async fn run_drop_plan_best_effort(
    executor: &dyn QueryExecutor,
    maintenance: &ConnectionDescriptor,
    plan: &DropPlan,
) -> DropOutcome {
    match run_drop_plan(executor, maintenance, plan).await {
        Ok(()) => DropOutcome::Dropped,
        Err(e) => {
            warn!(
                "Could not drop database {}; leaving it to container teardown: {}",
                plan.database(),
                e
            );
            DropOutcome::LeakedToContainerTeardown {
                reason: e.to_string(),
            }
        }
    }
}
