//! Per-test fixture lifecycle state machine.

use std::fmt;

use serde::Serialize;
use tracing::debug;

use crate::error::{FixtureError, Result};

/// Where a test is in its fixture lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FixtureState {
    Unconfigured,
    ConnectionResolved,
    /// The test database is known to exist, verified or freshly created.
    DatabaseVerified,
    ObjectsCreated,
    EngineExercised,
    CleanupIssued,
    Dropped,
    /// Drop did not complete; the disposable container takes the database with it.
    LeakedToContainerTeardown,
}

impl FixtureState {
    /// Terminal states accept no further transitions. Both are acceptable end states.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            FixtureState::Dropped | FixtureState::LeakedToContainerTeardown
        )
    }

    fn can_transition_to(self, next: FixtureState) -> bool {
        use FixtureState::*;
        matches!(
            (self, next),
            (Unconfigured, ConnectionResolved)
                | (ConnectionResolved, DatabaseVerified)
                | (DatabaseVerified, ObjectsCreated)
                | (DatabaseVerified, EngineExercised)
                | (ObjectsCreated, EngineExercised)
                | (DatabaseVerified, CleanupIssued)
                | (ObjectsCreated, CleanupIssued)
                | (EngineExercised, CleanupIssued)
                | (CleanupIssued, Dropped)
                | (CleanupIssued, LeakedToContainerTeardown)
        )
    }
}

impl fmt::Display for FixtureState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            FixtureState::Unconfigured => "unconfigured",
            FixtureState::ConnectionResolved => "connection_resolved",
            FixtureState::DatabaseVerified => "database_verified",
            FixtureState::ObjectsCreated => "objects_created",
            FixtureState::EngineExercised => "engine_exercised",
            FixtureState::CleanupIssued => "cleanup_issued",
            FixtureState::Dropped => "dropped",
            FixtureState::LeakedToContainerTeardown => "leaked_to_container_teardown",
        };
        f.write_str(s)
    }
}

/// Tracks one test's progress through [`FixtureState`].
#[derive(Debug, Clone)]
pub struct FixtureLifecycle {
    state: FixtureState,
    history: Vec<FixtureState>,
}

impl Default for FixtureLifecycle {
    fn default() -> Self {
        Self::new()
    }
}

impl FixtureLifecycle {
    pub fn new() -> Self {
        Self {
            state: FixtureState::Unconfigured,
            history: vec![FixtureState::Unconfigured],
        }
    }

    /// Current state.
    pub fn state(&self) -> FixtureState {
        self.state
    }

    /// Every state visited, starting with `Unconfigured`.
    pub fn history(&self) -> &[FixtureState] {
        &self.history
    }

    /// Move to `next`.
    ///
    /// # Errors
    ///
    /// Returns `FixtureError::Lifecycle` for a transition the lifecycle does not allow.
    pub fn advance(&mut self, next: FixtureState) -> Result<()> {
        if !self.state.can_transition_to(next) {
            return Err(FixtureError::Lifecycle(format!(
                "Cannot move fixture lifecycle from {} to {}",
                self.state, next
            )));
        }
        debug!("Fixture lifecycle: {} -> {}", self.state, next);
        self.state = next;
        self.history.push(next);
        Ok(())
    }

    /// Whether the lifecycle reached one of its end states.
    pub fn is_finished(&self) -> bool {
        self.state.is_terminal()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use FixtureState::*;

    #[test]
    fn test_full_happy_path() {
        let mut lifecycle = FixtureLifecycle::new();
        for next in [
            ConnectionResolved,
            DatabaseVerified,
            ObjectsCreated,
            EngineExercised,
            CleanupIssued,
            Dropped,
        ] {
            lifecycle.advance(next).unwrap();
        }
        assert!(lifecycle.is_finished());
        assert_eq!(lifecycle.history().len(), 7);
    }

    #[test]
    fn test_leak_is_an_acceptable_end_state() {
        let mut lifecycle = FixtureLifecycle::new();
        lifecycle.advance(ConnectionResolved).unwrap();
        lifecycle.advance(DatabaseVerified).unwrap();
        lifecycle.advance(CleanupIssued).unwrap();
        lifecycle.advance(LeakedToContainerTeardown).unwrap();
        assert!(lifecycle.is_finished());
    }

    #[test]
    fn test_engine_may_run_without_fixture_objects() {
        let mut lifecycle = FixtureLifecycle::new();
        lifecycle.advance(ConnectionResolved).unwrap();
        lifecycle.advance(DatabaseVerified).unwrap();
        assert!(lifecycle.advance(EngineExercised).is_ok());
    }

    #[test]
    fn test_invalid_transitions_are_rejected() {
        let mut lifecycle = FixtureLifecycle::new();
        let err = lifecycle.advance(DatabaseVerified).unwrap_err();
        assert!(err.to_string().contains("from unconfigured to database_verified"));
        assert_eq!(lifecycle.state(), Unconfigured);

        lifecycle.advance(ConnectionResolved).unwrap();
        assert!(lifecycle.advance(Dropped).is_err());
    }

    #[test]
    fn test_terminal_states_accept_nothing() {
        let mut lifecycle = FixtureLifecycle::new();
        for next in [ConnectionResolved, DatabaseVerified, CleanupIssued, Dropped] {
            lifecycle.advance(next).unwrap();
        }
        assert!(lifecycle.advance(CleanupIssued).is_err());
        assert!(lifecycle.advance(LeakedToContainerTeardown).is_err());
    }
}
