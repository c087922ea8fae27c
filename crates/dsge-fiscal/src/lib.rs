#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

//! The Fiscal Impact Engine and Simulation Orchestrator: turns a
//! [`dsge_model::FiscalShock`] into a full [`dsge_model::SimulationResult`],
//! trying the structural DSGE solution path (`dsge-solve`) first and
//! falling back to a reduced-form multiplier model when that path is
//! unavailable or indeterminate.

pub mod error;
pub mod investment;
pub mod multiplier;
pub mod narrative;
pub mod orchestrator;
pub mod regional;

pub use error::{DsgeSolveError, FiscalError, OrchestratorError};
pub use investment::investment_impacts;
pub use multiplier::{baseline, solve_fiscal_shock, FiscalBaseline, FirstRoundImpact, HorizonFiscalImpact};
pub use orchestrator::{run, DsgePath, DEFAULT_TIMEOUT};
pub use regional::regional_impacts;
