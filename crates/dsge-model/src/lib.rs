#![warn(missing_docs)]
#![forbid(unsafe_code)]
//! Shared value objects for the DSGE fiscal impact engine: parameters,
//! steady states, shocks, results, and the simulation-run lifecycle
//! aggregate. Every other crate in the workspace depends on this one and on
//! nothing upstream of it.

pub mod lifecycle;
pub mod parameter;
pub mod result;
pub mod shock;
pub mod steady_state;

pub use lifecycle::{InvalidTransition, SimulationRun, SimulationStatus};
pub use parameter::{EstimatedParameter, Parameter, ParameterCategory, ParameterSet};
pub use result::{
    ConfidenceLevel, HorizonImpact, ImpactDirection, InvestmentImpact, RegionalImpact,
    SimulationResult,
};
pub use shock::FiscalShock;
pub use steady_state::SteadyState;

/// Horizon years at which the Fiscal Impact Engine reports aggregates.
///
/// Hard-coded per `original_source/` and SPEC_FULL.md's Open Question
/// resolution: not user-configurable.
pub const HORIZONS: [u32; 3] = [1, 5, 15];

/// Crate version, exposed the way the teacher's facade crate exposes its
/// own.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
