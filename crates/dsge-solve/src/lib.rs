#![warn(missing_docs)]
#![deny(unsafe_code)]
//! The numerical core: Steady-State Solver, Linearizer, Gensys Solver, and
//! IRF Engine, in the pipeline order a `dsge-cli` run chains them in.

pub mod gensys;
pub mod irf;
pub mod linearize;
pub mod newton;
pub mod schur;
pub mod steady_state;

pub use gensys::{gensys, DeterminacyFlags, GensysError, GensysSolution, DEFAULT_DIV};
pub use irf::{impulse_responses, ImpulseResponse, IrfError, DEFAULT_HORIZON, MAX_HORIZON};
pub use linearize::{linearize, LinearSystem, LinearizeError};
pub use newton::NewtonError;
pub use steady_state::{solve_steady_state, SteadyStateError};

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn version_is_set() {
        assert!(!VERSION.is_empty());
    }
}
