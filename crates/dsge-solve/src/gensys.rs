//! The Gensys Solver: Sims (2001) saddle-path solution of the linearized
//! rational-expectations system
//! `G0 x_t = G1 x_{t-1} + C + Psi eps_t + Pi eta_t`.
//!
//! Grounded on `original_source/dsge_latvia/.../gensys.py`, which performs
//! a generalized (two-matrix) Schur/QZ decomposition of the pencil
//! `(G0, G1)` via `scipy.linalg.ordqz`. No crate in the retrieval pack
//! offers a generalized Schur decomposition without pulling in a
//! system-LAPACK binding (`nalgebra-lapack`), so this solver instead
//! reduces the pencil to a standard eigenproblem — `M = G1^{-1} G0` — and
//! takes the real Schur form of `M` via `nalgebra::linalg::Schur` (pure
//! Rust). `G1` singularity surfaces as [`GensysError::SingularPencil`]
//! rather than silently producing garbage. The reordering this needs
//! (stable eigenvalues first) is [`crate::schur::reorder_stable_first`];
//! the partition/reconstruction formulas below are the direct
//! `t11 = identity`, `q = Z^T`, `z = Z` specialization of the Python
//! reference's block algebra.

use crate::schur::reorder_stable_first;
use nalgebra::DMatrix;
use thiserror::Error;

/// Default stability threshold on eigenvalue modulus, matching the
/// original's `div = 1.0000001`.
pub const DEFAULT_DIV: f64 = 1.000_000_1;

/// Existence/uniqueness flags, `(eu_exist, eu_unique)`.
pub type DeterminacyFlags = (u8, u8);

/// Errors the Gensys Solver can raise.
#[derive(Debug, Error)]
pub enum GensysError {
    /// `G1` is not invertible, so the pencil cannot be reduced to a
    /// standard eigenproblem.
    #[error("G1 is singular (or numerically so); cannot form G1^-1 G0")]
    SingularPencil,
}

/// The solved reduced-form system.
#[derive(Debug, Clone)]
pub struct GensysSolution {
    /// Reduced-form transition matrix.
    pub g1: DMatrix<f64>,
    /// Reduced-form constant term.
    pub c: DMatrix<f64>,
    /// Reduced-form shock-impact matrix.
    pub impact: DMatrix<f64>,
    /// `(eu_exist, eu_unique)`: `(1,1)` is the unique stable solution,
    /// `(1,0)` multiple stable solutions (sunspots), `(0,0)` no stable
    /// solution exists.
    pub eu: DeterminacyFlags,
}

/// Solve the linear rational-expectations system.
///
/// `psi` may have zero columns (no shocks) and `pi` zero columns (no
/// expectational errors, i.e. a purely backward-looking system) — both are
/// handled as degenerate cases matching the Python reference's `None`
/// defaults.
pub fn gensys(
    g0: &DMatrix<f64>,
    g1: &DMatrix<f64>,
    c: &DMatrix<f64>,
    psi: &DMatrix<f64>,
    pi: &DMatrix<f64>,
    div: Option<f64>,
) -> Result<GensysSolution, GensysError> {
    let div = div.unwrap_or(DEFAULT_DIV);
    let n = g0.nrows();

    let g1_inv = g1.clone().try_inverse().ok_or(GensysError::SingularPencil)?;
    let m = &g1_inv * g0;

    let schur = nalgebra::linalg::Schur::new(m);
    let (mut z, mut t) = schur.unpack();

    let tol = 1e-9;
    let ns = reorder_stable_first(&mut t, &mut z, div, tol);
    let nu = n - ns;

    let z1 = z.columns(0, ns).clone_owned();
    let z2 = z.columns(ns, nu).clone_owned();

    let mut eu_exist: u8 = 1;
    let mut eu_unique: u8 = 1;
    // g1_inv folds into every forcing term here, not just g1 itself: the
    // pencil was reduced via M = g1_inv * g0 before taking its Schur form,
    // so Q in the single-matrix sense is z^T (not an independent left
    // transform as in a true two-matrix QZ), and that z^T must be applied
    // to g1_inv * (c | psi | pi), not to the raw forcing matrices.
    let g1_inv_pi = &g1_inv * pi;
    if nu > 0 {
        let q2 = z2.transpose();
        let q2_pi = &q2 * &g1_inv_pi;
        let rank = matrix_rank(&q2_pi, 1e-10);
        if rank < nu {
            eu_exist = 0;
            eu_unique = 0;
        } else if rank > nu {
            eu_unique = 0;
        } else {
            eu_unique = if q2_pi.ncols() == nu { 1 } else { 0 };
        }
    }

    if ns == 0 {
        return Ok(GensysSolution {
            g1: DMatrix::zeros(n, n),
            c: DMatrix::zeros(n, 1),
            impact: DMatrix::zeros(n, psi.ncols()),
            eu: (eu_exist, eu_unique),
        });
    }

    let t11 = t.view((0, 0), (ns, ns)).clone_owned();
    let t11_inv = t11.try_inverse().ok_or(GensysError::SingularPencil)?;
    let q1 = z1.transpose();
    let g1_inv_c = &g1_inv * c;
    let g1_inv_psi = &g1_inv * psi;

    let mut g1_block = DMatrix::<f64>::zeros(n, n);
    g1_block.view_mut((0, 0), (ns, ns)).copy_from(&t11_inv);
    for i in 0..nu {
        g1_block[(ns + i, ns + i)] = 1.0;
    }
    let g1_reduced = &z * &g1_block * z.transpose();

    let mut c_block = DMatrix::<f64>::zeros(n, 1);
    c_block.view_mut((0, 0), (ns, 1)).copy_from(&(&t11_inv * (&q1 * &g1_inv_c)));
    let c_reduced = &z * &c_block;

    let mut psi_block = DMatrix::<f64>::zeros(n, psi.ncols());
    psi_block
        .view_mut((0, 0), (ns, psi.ncols()))
        .copy_from(&(&t11_inv * (&q1 * &g1_inv_psi)));
    let impact = &z * &psi_block;

    Ok(GensysSolution { g1: g1_reduced, c: c_reduced, impact, eu: (eu_exist, eu_unique) })
}

/// Numeric rank via singular values above a relative tolerance.
fn matrix_rank(m: &DMatrix<f64>, tol: f64) -> usize {
    if m.nrows() == 0 || m.ncols() == 0 {
        return 0;
    }
    let svd = m.clone().svd(false, false);
    svd.singular_values.iter().filter(|&&s| s > tol).count()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fully_determined_scalar_system_inverts_directly() {
        // G0 x_t = G1 x_{t-1} + Psi eps_t with G0=1, G1=2: M = G1^-1 G0 = 0.5,
        // modulus < div, so the whole system lands in the stable block and
        // no expectational (Pi) correction is needed at all (nu = 0). The
        // reduced form must then match the direct solve G0^-1 G1 = 2 and
        // G0^-1 Psi = 1.
        let g0 = DMatrix::from_row_slice(1, 1, &[1.0]);
        let g1 = DMatrix::from_row_slice(1, 1, &[2.0]);
        let c = DMatrix::zeros(1, 1);
        let psi = DMatrix::from_row_slice(1, 1, &[1.0]);
        let pi = DMatrix::zeros(1, 0);

        let solution = gensys(&g0, &g1, &c, &psi, &pi, None).unwrap();
        assert_eq!(solution.eu, (1, 1));
        assert!((solution.g1[(0, 0)] - 2.0).abs() < 1e-8);
        assert!((solution.impact[(0, 0)] - 1.0).abs() < 1e-8);
    }

    #[test]
    fn unstable_root_with_no_pi_to_absorb_it_has_no_solution() {
        // G0=1, G1=0.5: M = G1^-1 G0 = 2, modulus >= div, so this single
        // root lands entirely in the unstable block (ns=0). With no Pi
        // columns there is no expectational error available to satisfy the
        // existence condition, so eu collapses to (0, 0).
        let g0 = DMatrix::from_row_slice(1, 1, &[1.0]);
        let g1 = DMatrix::from_row_slice(1, 1, &[0.5]);
        let c = DMatrix::zeros(1, 1);
        let psi = DMatrix::from_row_slice(1, 1, &[1.0]);
        let pi = DMatrix::zeros(1, 0);

        let solution = gensys(&g0, &g1, &c, &psi, &pi, None).unwrap();
        assert_eq!(solution.eu, (0, 0));
        assert_eq!(solution.g1[(0, 0)], 0.0);
    }

    #[test]
    fn singular_g1_is_rejected() {
        let g0 = DMatrix::from_row_slice(1, 1, &[1.0]);
        let g1 = DMatrix::from_row_slice(1, 1, &[0.0]);
        let c = DMatrix::zeros(1, 1);
        let psi = DMatrix::zeros(1, 0);
        let pi = DMatrix::zeros(1, 0);

        let err = gensys(&g0, &g1, &c, &psi, &pi, None).unwrap_err();
        assert!(matches!(err, GensysError::SingularPencil));
    }
}
