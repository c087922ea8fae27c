//! The `SimulationRun` aggregate and its lifecycle state machine.

use crate::{FiscalShock, SimulationResult};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// Lifecycle state of a `SimulationRun`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SimulationStatus {
    /// Created, not yet started.
    Pending,
    /// Started, numerical phases in progress.
    Running,
    /// Finished successfully; a result is attached.
    Completed,
    /// Finished unsuccessfully; an error message is attached.
    Failed,
}

/// A lifecycle transition was attempted from a state that does not permit
/// it.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
#[error("cannot transition from {from:?} via {attempted}")]
pub struct InvalidTransition {
    /// State the run was in when the transition was attempted.
    pub from: SimulationStatus,
    /// Name of the transition that was attempted (`start`, `complete`, `fail`).
    pub attempted: &'static str,
}

/// Aggregate root for one simulation run.
///
/// Enforces `Pending --start--> Running --{complete|fail}--> {Completed|Failed}`;
/// any other transition returns `InvalidTransition` rather than mutating the
/// run (§4.8, §7).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulationRun {
    /// Run identity.
    pub id: Uuid,
    /// Input shock for this run.
    pub shock: FiscalShock,
    /// SHA-256 hex digest of the parameter/equation files used, for
    /// reproducibility (§6).
    pub parameters_snapshot_hash: String,
    /// Current lifecycle state.
    pub status: SimulationStatus,
    /// Result, present only once `status == Completed`.
    pub result: Option<SimulationResult>,
    /// Error message, present only once `status == Failed`.
    pub error_message: Option<String>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Start timestamp, set by `start()`.
    pub started_at: Option<DateTime<Utc>>,
    /// Completion timestamp, set by `complete()` or `fail()`.
    pub completed_at: Option<DateTime<Utc>>,
}

impl SimulationRun {
    /// Create a new run in the `Pending` state.
    pub fn new(shock: FiscalShock, parameters_snapshot_hash: String) -> Self {
        Self {
            id: Uuid::new_v4(),
            shock,
            parameters_snapshot_hash,
            status: SimulationStatus::Pending,
            result: None,
            error_message: None,
            created_at: Utc::now(),
            started_at: None,
            completed_at: None,
        }
    }

    /// Transition `Pending -> Running`.
    pub fn start(&mut self) -> Result<(), InvalidTransition> {
        if self.status != SimulationStatus::Pending {
            return Err(InvalidTransition {
                from: self.status,
                attempted: "start",
            });
        }
        self.status = SimulationStatus::Running;
        self.started_at = Some(Utc::now());
        Ok(())
    }

    /// Transition `Running -> Completed`, attaching the result.
    pub fn complete(&mut self, result: SimulationResult) -> Result<(), InvalidTransition> {
        if self.status != SimulationStatus::Running {
            return Err(InvalidTransition {
                from: self.status,
                attempted: "complete",
            });
        }
        self.status = SimulationStatus::Completed;
        self.result = Some(result);
        self.completed_at = Some(Utc::now());
        Ok(())
    }

    /// Transition `{Pending, Running} -> Failed`, attaching an error
    /// message.
    pub fn fail(&mut self, error_message: impl Into<String>) -> Result<(), InvalidTransition> {
        if !matches!(
            self.status,
            SimulationStatus::Pending | SimulationStatus::Running
        ) {
            return Err(InvalidTransition {
                from: self.status,
                attempted: "fail",
            });
        }
        self.status = SimulationStatus::Failed;
        self.error_message = Some(error_message.into());
        self.completed_at = Some(Utc::now());
        Ok(())
    }

    /// Whether the run has reached a terminal state.
    pub const fn is_finished(&self) -> bool {
        matches!(
            self.status,
            SimulationStatus::Completed | SimulationStatus::Failed
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_result() -> SimulationResult {
        SimulationResult {
            scenario_id: "s1".to_string(),
            title: "test".to_string(),
            policy_changes: vec![],
            horizon_impacts: vec![],
            regional_impacts: vec![],
            investment_impacts: vec![],
            model_name: "dsge".to_string(),
            model_version: "1.0.0".to_string(),
            confidence: crate::ConfidenceLevel::High,
            assumptions: vec![],
            caveats: vec![],
            causal_chain: vec![],
            key_drivers: vec![],
            winners: vec![],
            losers: vec![],
        }
    }

    #[test]
    fn happy_path_pending_running_completed() {
        let mut run = SimulationRun::new(FiscalShock::ZERO, "hash".to_string());
        assert_eq!(run.status, SimulationStatus::Pending);

        run.start().unwrap();
        assert_eq!(run.status, SimulationStatus::Running);
        assert!(run.started_at.is_some());

        run.complete(sample_result()).unwrap();
        assert_eq!(run.status, SimulationStatus::Completed);
        assert!(run.result.is_some());
        assert!(run.is_finished());
    }

    #[test]
    fn cannot_complete_before_starting() {
        let mut run = SimulationRun::new(FiscalShock::ZERO, "hash".to_string());
        let err = run.complete(sample_result()).unwrap_err();
        assert_eq!(err.from, SimulationStatus::Pending);
        assert_eq!(err.attempted, "complete");
    }

    #[test]
    fn cannot_start_twice() {
        let mut run = SimulationRun::new(FiscalShock::ZERO, "hash".to_string());
        run.start().unwrap();
        let err = run.start().unwrap_err();
        assert_eq!(err.from, SimulationStatus::Running);
    }

    #[test]
    fn fail_allowed_from_pending_and_running_not_from_terminal_states() {
        let mut run = SimulationRun::new(FiscalShock::ZERO, "hash".to_string());
        run.fail("boom").unwrap();
        assert_eq!(run.status, SimulationStatus::Failed);
        assert_eq!(run.error_message.as_deref(), Some("boom"));

        let err = run.fail("again").unwrap_err();
        assert_eq!(err.from, SimulationStatus::Failed);
    }

    #[test]
    fn completed_run_always_has_a_result_failed_run_always_has_a_message() {
        let mut completed = SimulationRun::new(FiscalShock::ZERO, "hash".to_string());
        completed.start().unwrap();
        completed.complete(sample_result()).unwrap();
        assert!(completed.result.is_some());

        let mut failed = SimulationRun::new(FiscalShock::ZERO, "hash".to_string());
        failed.fail("boom").unwrap();
        assert!(failed.result.is_none());
        assert!(failed.error_message.is_some());
    }
}
