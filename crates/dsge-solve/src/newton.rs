//! A generic damped Newton solver over a vector-valued residual function.
//!
//! Grounded on `original_source/.../steady_state.py`'s
//! `solve_full_steady_state` (a `scipy.optimize.root` hybrid solve) and
//! `build_linear_system.py`'s `_numeric_jacobian` (central finite
//! differences, step `h_i = EPS_JAC * max(1, |x_i|)`). No root-finding crate
//! appears anywhere in the retrieval pack, so both the Jacobian assembly and
//! the linear solve inside each Newton step are hand-rolled here, in the
//! same stance as the teacher's `perth-risk::covariance::utils` Jacobi
//! eigendecomposition: textbook numerical linear algebra directly against
//! `ndarray` rather than a reached-for solver crate.

use ndarray::{Array1, Array2};
use thiserror::Error;

/// Finite-difference step scale, `h_i = EPS_JAC * max(1, |x_i|)`.
pub const EPS_JAC: f64 = 1e-6;

/// Convergence tolerance on the residual's infinity norm.
pub const EPS_SS: f64 = 1e-10;

/// Maximum Newton iterations before giving up.
pub const MAX_ITER: usize = 200;

/// Errors a Newton solve can raise.
#[derive(Debug, Error)]
pub enum NewtonError {
    /// Iteration count exceeded [`MAX_ITER`] without reaching [`EPS_SS`].
    #[error("Newton solve did not converge after {iterations} iterations (max |residual| = {max_residual:.3e})")]
    DidNotConverge {
        /// Iterations actually run.
        iterations: usize,
        /// The worst residual entry at the last iterate.
        max_residual: f64,
    },
    /// The Jacobian was singular (or numerically so) at some iterate, even
    /// after step damping.
    #[error("Jacobian singular at iteration {iteration}")]
    SingularJacobian {
        /// Iteration at which the Jacobian could not be inverted.
        iteration: usize,
    },
}

/// Central finite-difference Jacobian of `f` at `x`.
pub fn numeric_jacobian(f: &dyn Fn(&Array1<f64>) -> Array1<f64>, x: &Array1<f64>) -> Array2<f64> {
    let n = x.len();
    let probe = f(x);
    let m = probe.len();
    let mut jac = Array2::<f64>::zeros((m, n));
    for i in 0..n {
        let h = EPS_JAC * x[i].abs().max(1.0);
        let mut x_up = x.clone();
        let mut x_down = x.clone();
        x_up[i] += h;
        x_down[i] -= h;
        let f_up = f(&x_up);
        let f_down = f(&x_down);
        for j in 0..m {
            jac[[j, i]] = (f_up[j] - f_down[j]) / (2.0 * h);
        }
    }
    jac
}

/// Solve `a * x = b` via Gaussian elimination with partial pivoting.
/// Returns `None` if `a` is singular (or numerically so) under `tol`.
fn solve_linear(a: &Array2<f64>, b: &Array1<f64>, tol: f64) -> Option<Array1<f64>> {
    let n = a.nrows();
    let mut m = a.clone();
    let mut rhs = b.clone();

    for col in 0..n {
        let pivot_row = (col..n)
            .max_by(|&i, &j| m[[i, col]].abs().partial_cmp(&m[[j, col]].abs()).unwrap())
            .unwrap();
        if m[[pivot_row, col]].abs() < tol {
            return None;
        }
        if pivot_row != col {
            for k in 0..n {
                m.swap([col, k], [pivot_row, k]);
            }
            rhs.swap(col, pivot_row);
        }
        for row in (col + 1)..n {
            let factor = m[[row, col]] / m[[col, col]];
            if factor == 0.0 {
                continue;
            }
            for k in col..n {
                m[[row, k]] -= factor * m[[col, k]];
            }
            rhs[row] -= factor * rhs[col];
        }
    }

    let mut x = Array1::<f64>::zeros(n);
    for row in (0..n).rev() {
        let mut sum = rhs[row];
        for k in (row + 1)..n {
            sum -= m[[row, k]] * x[k];
        }
        x[row] = sum / m[[row, row]];
    }
    Some(x)
}

fn inf_norm(v: &Array1<f64>) -> f64 {
    v.iter().fold(0.0_f64, |acc, &x| acc.max(x.abs()))
}

/// Damped Newton iteration: at each step the full Newton direction is
/// accepted if it reduces the residual's infinity norm, otherwise it is
/// halved (up to ten times) before giving up on that iteration and
/// reporting the Jacobian as unusable there.
pub fn solve(
    f: &dyn Fn(&Array1<f64>) -> Array1<f64>,
    x0: &Array1<f64>,
) -> Result<Array1<f64>, NewtonError> {
    let mut x = x0.clone();
    let mut residual = f(&x);
    let mut current_norm = inf_norm(&residual);

    for iteration in 0..MAX_ITER {
        if current_norm < EPS_SS {
            return Ok(x);
        }

        let jac = numeric_jacobian(f, &x);
        let neg_residual = residual.mapv(|v| -v);
        let step = solve_linear(&jac, &neg_residual, 1e-14)
            .ok_or(NewtonError::SingularJacobian { iteration })?;

        let mut damping = 1.0_f64;
        let mut accepted = false;
        for _ in 0..10 {
            let candidate = &x + &(&step * damping);
            let candidate_residual = f(&candidate);
            let candidate_norm = inf_norm(&candidate_residual);
            if candidate_norm < current_norm || candidate_norm < EPS_SS {
                x = candidate;
                residual = candidate_residual;
                current_norm = candidate_norm;
                accepted = true;
                break;
            }
            damping *= 0.5;
        }
        if !accepted {
            return Err(NewtonError::DidNotConverge { iterations: iteration + 1, max_residual: current_norm });
        }
    }

    Err(NewtonError::DidNotConverge { iterations: MAX_ITER, max_residual: current_norm })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn solves_a_linear_system_in_one_damped_step() {
        // f(x) = [2x0 - 4, 3x1 - 9] has root (2, 3); already linear so the
        // Newton step should land on it in a single iteration.
        let f = |x: &Array1<f64>| Array1::from(vec![2.0 * x[0] - 4.0, 3.0 * x[1] - 9.0]);
        let x0 = Array1::from(vec![0.0, 0.0]);
        let solution = solve(&f, &x0).unwrap();
        assert_abs_diff_eq!(solution[0], 2.0, epsilon = 1e-8);
        assert_abs_diff_eq!(solution[1], 3.0, epsilon = 1e-8);
    }

    #[test]
    fn solves_a_mildly_nonlinear_system() {
        // f(x) = [x0^2 - 4, x1 - 2*x0] has root (2, 4) for a positive start.
        let f = |x: &Array1<f64>| Array1::from(vec![x[0] * x[0] - 4.0, x[1] - 2.0 * x[0]]);
        let x0 = Array1::from(vec![1.5, 1.0]);
        let solution = solve(&f, &x0).unwrap();
        assert_abs_diff_eq!(solution[0], 2.0, epsilon = 1e-6);
        assert_abs_diff_eq!(solution[1], 4.0, epsilon = 1e-6);
    }

    #[test]
    fn singular_jacobian_is_reported() {
        // f(x) = [x0 - x1, x0 - x1] has a singular Jacobian everywhere.
        let f = |x: &Array1<f64>| Array1::from(vec![x[0] - x[1], x[0] - x[1]]);
        let x0 = Array1::from(vec![1.0, 0.0]);
        let err = solve(&f, &x0).unwrap_err();
        assert!(matches!(err, NewtonError::SingularJacobian { .. }));
    }

    #[test]
    fn numeric_jacobian_matches_analytic_for_a_linear_map() {
        let f = |x: &Array1<f64>| Array1::from(vec![2.0 * x[0] + 3.0 * x[1]]);
        let x = Array1::from(vec![1.0, 1.0]);
        let jac = numeric_jacobian(&f, &x);
        assert_abs_diff_eq!(jac[[0, 0]], 2.0, epsilon = 1e-6);
        assert_abs_diff_eq!(jac[[0, 1]], 3.0, epsilon = 1e-6);
    }
}
