//! Error taxonomy for the Fiscal Impact Engine and Simulation Orchestrator.

use dsge_model::InvalidTransition;
use dsge_solve::{GensysError, IrfError, LinearizeError, SteadyStateError};
use std::time::Duration;
use thiserror::Error;

/// Errors the Fiscal Impact Engine itself can raise. Its arithmetic rarely
/// fails; this exists for the genuine input-validation edge cases rather
/// than to wrap a deep call stack.
#[derive(Debug, Error, PartialEq)]
pub enum FiscalError {
    /// `solve_fiscal_shock` was asked to compute over an empty horizon set.
    #[error("cannot solve a fiscal shock over an empty horizon set")]
    EmptyHorizonSet,
}

/// Errors surfaced while attempting the full DSGE solution path, each one
/// a trigger for the Simulation Orchestrator's fallback policy rather than
/// a hard failure of the run.
#[derive(Debug, Error)]
pub enum DsgeSolveError {
    /// The Steady-State Solver did not converge.
    #[error(transparent)]
    SteadyState(#[from] SteadyStateError),
    /// The Linearizer could not assemble a square system.
    #[error(transparent)]
    Linearize(#[from] LinearizeError),
    /// The Gensys Solver could not form or solve the reduced form.
    #[error(transparent)]
    Gensys(#[from] GensysError),
    /// The system is not the unique determinate solution (`eu != (1,1)`).
    #[error("system is not uniquely determinate: eu = {0:?}")]
    Indeterminate((u8, u8)),
    /// The IRF Engine rejected the request.
    #[error(transparent)]
    Irf(#[from] IrfError),
    /// The configured shock symbol does not appear in the linearized
    /// system's shock vector.
    #[error("shock symbol '{0}' is not in the linearized system")]
    UnknownShockSymbol(String),
    /// The configured output variable does not appear in the linearized
    /// system's variable vector.
    #[error("output variable '{0}' is not in the linearized system")]
    UnknownOutputVariable(String),
}

/// Top-level error the CLI matches on to pick an exit code.
#[derive(Debug, Error)]
pub enum OrchestratorError {
    /// A lifecycle transition was attempted out of order.
    #[error(transparent)]
    Lifecycle(#[from] InvalidTransition),
    /// Fiscal Impact Engine input validation failed.
    #[error(transparent)]
    Fiscal(#[from] FiscalError),
    /// The run exceeded its time budget before completing.
    #[error("run exceeded its time budget of {0:?}")]
    Timeout(Duration),
}
