//! Drop plans: the ordered steps that take a test database down.

use std::fmt;

use serde::Serialize;

use crate::error::{FixtureError, Result};

/// Phases of the drop protocol, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DropPhase {
    /// Look the database up in the system catalog. Informational only.
    VerifyPresence,
    /// Refuse new connections to the database.
    DisallowConnections,
    /// Shrink the connection limit so no new session can race in.
    LimitConnections,
    /// Terminate every session still attached to the database.
    TerminateSessions,
    /// Drop the database.
    Drop,
}

impl DropPhase {
    /// Whether this phase changes server state.
    pub fn is_destructive(&self) -> bool {
        !matches!(self, DropPhase::VerifyPresence)
    }
}

impl fmt::Display for DropPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            DropPhase::VerifyPresence => "verify_presence",
            DropPhase::DisallowConnections => "disallow_connections",
            DropPhase::LimitConnections => "limit_connections",
            DropPhase::TerminateSessions => "terminate_sessions",
            DropPhase::Drop => "drop",
        };
        f.write_str(s)
    }
}

/// One round trip of a drop plan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DropStep {
    pub phase: DropPhase,
    pub sql: String,
    /// `sql` is a query whose rows are statements to run one by one.
    pub generates_statements: bool,
}

impl DropStep {
    pub fn new(phase: DropPhase, sql: impl Into<String>) -> Self {
        Self {
            phase,
            sql: sql.into(),
            generates_statements: false,
        }
    }

    /// A step whose query yields the statements to execute, for engines that
    /// cannot run dynamic SQL over a result set in one statement.
    pub fn generated(phase: DropPhase, sql: impl Into<String>) -> Self {
        Self {
            generates_statements: true,
            ..Self::new(phase, sql)
        }
    }
}

/// The steps a platform runs, against its maintenance database, to drop a database.
///
/// Phases are strictly increasing and the last step is [`DropPhase::Drop`].
/// A platform leaves out phases its engine does not need.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DropPlan {
    database: String,
    steps: Vec<DropStep>,
}

impl DropPlan {
    /// Build and validate a plan.
    ///
    /// # Errors
    ///
    /// Returns `FixtureError::Lifecycle` if the phases are out of order,
    /// repeated, or the plan does not end with a drop.
    pub fn new(database: impl Into<String>, steps: Vec<DropStep>) -> Result<Self> {
        let database = database.into();

        if steps.last().map(|s| s.phase) != Some(DropPhase::Drop) {
            return Err(FixtureError::Lifecycle(format!(
                "Drop plan for {} must end with a drop step",
                database
            )));
        }

        if let Some(pair) = steps.windows(2).find(|w| w[0].phase >= w[1].phase) {
            return Err(FixtureError::Lifecycle(format!(
                "Drop plan for {} has step {} after {}",
                database, pair[1].phase, pair[0].phase
            )));
        }

        Ok(Self { database, steps })
    }

    /// The database this plan drops.
    pub fn database(&self) -> &str {
        &self.database
    }

    /// All steps, in execution order.
    pub fn steps(&self) -> &[DropStep] {
        &self.steps
    }

    /// Phases present in the plan, in order.
    pub fn phases(&self) -> Vec<DropPhase> {
        self.steps.iter().map(|s| s.phase).collect()
    }

    /// Render the plan as one script, one statement per step with a phase comment.
    pub fn to_script(&self) -> String {
        let mut script = String::new();
        for step in &self.steps {
            if step.generates_statements {
                script.push_str(&format!(
                    "-- {} (run each returned statement)\n{}\n\n",
                    step.phase, step.sql
                ));
            } else {
                script.push_str(&format!("-- {}\n{}\n\n", step.phase, step.sql));
            }
        }
        script
    }
}
