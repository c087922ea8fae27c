//! The IRF Engine: impulse responses of every endogenous variable to a
//! one-unit innovation in each shock, propagated through the Gensys
//! Solver's reduced-form transition matrix.
//!
//! Grounded on `original_source/.../irf.py`'s tensor recursion: given the
//! reduced form `y_t = G1 y_{t-1} + Impact eps_t`, the response to a unit
//! impulse in shock `j` at `t=0` is `y_0 = Impact[:, j]`, `y_t = G1 y_{t-1}`
//! for `t = 1..=H`. IRFs are only meaningful for a determinate system
//! (`eu == (1, 1)`); anything else is reported as
//! [`IrfError::Indeterminate`] rather than silently propagating an
//! arbitrary sunspot or a non-existent solution.

use crate::gensys::{DeterminacyFlags, GensysSolution};
use crate::linearize::LinearSystem;
use std::collections::BTreeMap;
use thiserror::Error;

/// Default horizon, in periods, matching the original's own default.
pub const DEFAULT_HORIZON: usize = 40;

/// Maximum horizon this engine will compute.
pub const MAX_HORIZON: usize = 200;

/// Errors the IRF Engine can raise.
#[derive(Debug, Error)]
pub enum IrfError {
    /// The underlying Gensys solution is not the unique determinate one.
    #[error("cannot compute impulse responses for an indeterminate system (eu = {0:?})")]
    Indeterminate(DeterminacyFlags),
    /// The requested horizon exceeds [`MAX_HORIZON`].
    #[error("horizon {requested} exceeds the maximum of {MAX_HORIZON}")]
    HorizonTooLarge {
        /// The horizon that was requested.
        requested: usize,
    },
    /// A horizon of zero was requested (nothing to compute).
    #[error("horizon must be at least 1")]
    ZeroHorizon,
}

/// One shock's impulse response: every variable's path from `t=0` through
/// `t=horizon`, inclusive (`horizon + 1` points).
#[derive(Debug, Clone)]
pub struct ImpulseResponse {
    /// Which shock this response is to.
    pub shock: String,
    /// Horizon requested (paths carry `horizon + 1` points).
    pub horizon: usize,
    /// Variable name to its response path, `paths[var][0]` being the impact
    /// period.
    pub paths: BTreeMap<String, Vec<f64>>,
}

/// Compute the impulse response to every shock in `system.shocks`, over
/// `horizon` periods (clamped to `[1, MAX_HORIZON]` — out of range is an
/// error, not a silent clamp).
pub fn impulse_responses(
    system: &LinearSystem,
    solution: &GensysSolution,
    horizon: usize,
) -> Result<Vec<ImpulseResponse>, IrfError> {
    if solution.eu != (1, 1) {
        return Err(IrfError::Indeterminate(solution.eu));
    }
    if horizon == 0 {
        return Err(IrfError::ZeroHorizon);
    }
    if horizon > MAX_HORIZON {
        return Err(IrfError::HorizonTooLarge { requested: horizon });
    }

    let mut responses = Vec::with_capacity(system.shocks.len());

    for (shock_idx, shock_name) in system.shocks.iter().enumerate() {
        let mut history = Vec::with_capacity(horizon + 1);
        let mut current = solution.impact.column(shock_idx).clone_owned();
        history.push(current.clone());
        for _ in 1..=horizon {
            current = &solution.g1 * &current;
            history.push(current.clone());
        }

        let mut paths = BTreeMap::new();
        for (var_idx, var_name) in system.variables.iter().enumerate() {
            let path = history.iter().map(|v| v[(var_idx, 0)]).collect();
            paths.insert(var_name.clone(), path);
        }
        responses.push(ImpulseResponse { shock: shock_name.clone(), horizon, paths });
    }

    Ok(responses)
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::DMatrix;

    fn ar1_solution(rho: f64) -> (LinearSystem, GensysSolution) {
        let system = LinearSystem {
            g0: DMatrix::from_row_slice(1, 1, &[1.0]),
            g1: DMatrix::from_row_slice(1, 1, &[rho]),
            c: DMatrix::zeros(1, 1),
            psi: DMatrix::from_row_slice(1, 1, &[1.0]),
            pi: DMatrix::zeros(1, 0),
            variables: vec!["c".to_string()],
            shocks: vec!["eps_c".to_string()],
            forward_variables: vec![],
            dropped_equations: vec![],
        };
        let solution = GensysSolution {
            g1: DMatrix::from_row_slice(1, 1, &[rho]),
            c: DMatrix::zeros(1, 1),
            impact: DMatrix::from_row_slice(1, 1, &[1.0]),
            eu: (1, 1),
        };
        (system, solution)
    }

    #[test]
    fn ar1_impulse_response_decays_geometrically() {
        let (system, solution) = ar1_solution(0.5);
        let responses = impulse_responses(&system, &solution, 4).unwrap();
        assert_eq!(responses.len(), 1);
        let path = &responses[0].paths["c"];
        assert_eq!(path.len(), 5);
        assert!((path[0] - 1.0).abs() < 1e-10);
        assert!((path[1] - 0.5).abs() < 1e-10);
        assert!((path[4] - 0.0625).abs() < 1e-10);
    }

    #[test]
    fn indeterminate_system_is_rejected() {
        let (system, mut solution) = ar1_solution(0.5);
        solution.eu = (1, 0);
        let err = impulse_responses(&system, &solution, 4).unwrap_err();
        assert!(matches!(err, IrfError::Indeterminate((1, 0))));
    }

    #[test]
    fn horizon_above_the_maximum_is_rejected() {
        let (system, solution) = ar1_solution(0.5);
        let err = impulse_responses(&system, &solution, MAX_HORIZON + 1).unwrap_err();
        assert!(matches!(err, IrfError::HorizonTooLarge { requested } if requested == MAX_HORIZON + 1));
    }
}
