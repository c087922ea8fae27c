#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

//! Facade crate re-exporting the DSGE solver and fiscal impact engine's
//! sub-crates under one name: the Parameter Store (`params`), the Equation
//! Library (`equations`), the Gensys/IRF solver (`solve`), the Fiscal Impact
//! Engine and Simulation Orchestrator (`fiscal`), and the shared domain
//! types (`model`).

pub use dsge_equations as equations;
pub use dsge_fiscal as fiscal;
pub use dsge_model as model;
pub use dsge_params as params;
pub use dsge_solve as solve;

/// Version information.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
