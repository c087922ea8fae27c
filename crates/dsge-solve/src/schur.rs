//! Real Schur form block reordering.
//!
//! `nalgebra::linalg::Schur` produces a quasi-upper-triangular `T` and an
//! orthogonal `Q` with `M = Q T Q^T`, but makes no promise about which
//! eigenvalues land first. Gensys needs the stable eigenvalues (by modulus)
//! leading. This module reorders the diagonal blocks of `T` in place via
//! adjacent-block swaps: solve the Sylvester equation coupling the two
//! blocks, build a (generally non-orthogonal) similarity that
//! block-diagonalizes them, then re-orthonormalize it with a QR step so the
//! accumulated transform stays an honest rotation (Bai & Demmel, 1993).
//! Restricted to block sizes {1, 2} — the only sizes real Schur form ever
//! produces (a real eigenvalue, or a complex-conjugate pair).

use nalgebra::DMatrix;

/// One diagonal block of a quasi-upper-triangular matrix.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Block {
    /// Row/column offset of the block's top-left corner.
    pub pos: usize,
    /// Block size: 1 (real eigenvalue) or 2 (complex-conjugate pair).
    pub size: usize,
}

/// Scan the subdiagonal of a quasi-upper-triangular matrix and return its
/// diagonal blocks in order.
pub fn block_structure(t: &DMatrix<f64>, tol: f64) -> Vec<Block> {
    let n = t.nrows();
    let mut blocks = Vec::new();
    let mut i = 0;
    while i < n {
        if i + 1 < n && t[(i + 1, i)].abs() > tol {
            blocks.push(Block { pos: i, size: 2 });
            i += 2;
        } else {
            blocks.push(Block { pos: i, size: 1 });
            i += 1;
        }
    }
    blocks
}

/// Modulus of the eigenvalue(s) represented by a diagonal block.
///
/// For a 1x1 block this is `|t_ii|`. For a 2x2 block the two eigenvalues
/// are a complex-conjugate pair whose product is the block's determinant,
/// so the shared modulus is `sqrt(det)`.
pub fn block_modulus(t: &DMatrix<f64>, block: Block) -> f64 {
    match block.size {
        1 => t[(block.pos, block.pos)].abs(),
        2 => {
            let p = block.pos;
            let det = t[(p, p)] * t[(p + 1, p + 1)] - t[(p, p + 1)] * t[(p + 1, p)];
            det.abs().sqrt()
        }
        other => panic!("real Schur form never produces a block of size {other}"),
    }
}

/// Solve the Sylvester equation `t11 * x - x * t22 = -t12` for `x` (an
/// `m` by `n` matrix), via column-major vectorization and a direct linear
/// solve. `m, n <= 2` in every caller, so the vectorized system is at most
/// 4 by 4.
fn solve_sylvester(t11: &DMatrix<f64>, t22: &DMatrix<f64>, t12: &DMatrix<f64>) -> DMatrix<f64> {
    let m = t11.nrows();
    let n = t22.nrows();
    let dim = m * n;
    let mut a = DMatrix::<f64>::zeros(dim, dim);
    let mut rhs = DMatrix::<f64>::zeros(dim, 1);

    for j in 0..n {
        for i in 0..m {
            let row = j * m + i;
            rhs[(row, 0)] = -t12[(i, j)];
            for l in 0..n {
                for k in 0..m {
                    let col = l * m + k;
                    let mut value = 0.0;
                    if l == j {
                        value += t11[(i, k)];
                    }
                    if i == k {
                        value -= t22[(l, j)];
                    }
                    a[(row, col)] = value;
                }
            }
        }
    }

    let solution = a
        .lu()
        .solve(&rhs)
        .expect("Sylvester coefficient matrix singular — coincident eigenvalues across the swapped blocks");

    let mut x = DMatrix::<f64>::zeros(m, n);
    for j in 0..n {
        for i in 0..m {
            x[(i, j)] = solution[(j * m + i, 0)];
        }
    }
    x
}

/// Swap two adjacent diagonal blocks of `t` (at `pos`, sizes `size_l` then
/// `size_r`) so the block that was second comes first, updating both `t`
/// and the accumulated orthogonal basis `q` in place.
pub fn swap_adjacent_blocks(
    t: &mut DMatrix<f64>,
    q: &mut DMatrix<f64>,
    pos: usize,
    size_l: usize,
    size_r: usize,
) {
    let m = size_l;
    let n = size_r;
    let size = m + n;

    let t11 = t.view((pos, pos), (m, m)).clone_owned();
    let t22 = t.view((pos + m, pos + m), (n, n)).clone_owned();
    let t12 = t.view((pos, pos + m), (m, n)).clone_owned();

    let x = solve_sylvester(&t11, &t22, &t12);

    // Y*perm = [[X, I_m], [I_n, 0]]: the first n columns span the
    // (previously second) block's invariant subspace in the original
    // basis, the last m columns span the first block's.
    let mut combined = DMatrix::<f64>::zeros(size, size);
    for i in 0..m {
        for j in 0..n {
            combined[(i, j)] = x[(i, j)];
        }
        combined[(i, n + i)] = 1.0;
    }
    for i in 0..n {
        combined[(m + i, i)] = 1.0;
    }

    let qr = combined.qr();
    let local_q = qr.q();

    let mut full_q = DMatrix::<f64>::identity(t.nrows(), t.nrows());
    for i in 0..size {
        for j in 0..size {
            full_q[(pos + i, pos + j)] = local_q[(i, j)];
        }
    }

    *t = full_q.transpose() * &*t * &full_q;
    *q = &*q * &full_q;

    // The swap is exact up to rounding; force the now-subdiagonal coupling
    // to zero rather than carrying numerical noise into later swaps.
    for i in 0..m {
        for j in 0..n {
            t[(pos + n + i, pos + j)] = 0.0;
        }
    }
}

/// Reorder the diagonal blocks of `(t, q)` so every block with modulus
/// `< div` precedes every block with modulus `>= div`, via repeated
/// adjacent swaps (a bubble sort over blocks). Returns the total dimension
/// of the leading stable region.
pub fn reorder_stable_first(t: &mut DMatrix<f64>, q: &mut DMatrix<f64>, div: f64, tol: f64) -> usize {
    loop {
        let blocks = block_structure(t, tol);
        let mut swapped = false;
        let mut idx = 0;
        while idx + 1 < blocks.len() {
            let left = blocks[idx];
            let right = blocks[idx + 1];
            let left_stable = block_modulus(t, left) < div;
            let right_stable = block_modulus(t, right) < div;
            if !left_stable && right_stable {
                swap_adjacent_blocks(t, q, left.pos, left.size, right.size);
                swapped = true;
                break;
            }
            idx += 1;
        }
        if !swapped {
            let blocks = block_structure(t, tol);
            return blocks
                .iter()
                .take_while(|b| block_modulus(t, **b) < div)
                .map(|b| b.size)
                .sum();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn block_structure_detects_1x1_blocks_for_diagonal_matrix() {
        let t = DMatrix::from_row_slice(3, 3, &[1.0, 0.0, 0.0, 0.0, 2.0, 0.0, 0.0, 0.0, 3.0]);
        let blocks = block_structure(&t, 1e-9);
        assert_eq!(blocks.len(), 3);
        assert!(blocks.iter().all(|b| b.size == 1));
    }

    #[test]
    fn block_structure_detects_a_2x2_block() {
        let t = DMatrix::from_row_slice(3, 3, &[0.0, -1.0, 0.3, 1.0, 0.0, 0.2, 0.0, 0.0, 5.0]);
        let blocks = block_structure(&t, 1e-9);
        assert_eq!(blocks, vec![Block { pos: 0, size: 2 }, Block { pos: 2, size: 1 }]);
    }

    #[test]
    fn swap_adjacent_1x1_blocks_exchanges_eigenvalues() {
        let mut t = DMatrix::from_row_slice(2, 2, &[2.0, 1.0, 0.0, 0.5]);
        let mut q = DMatrix::<f64>::identity(2, 2);
        swap_adjacent_blocks(&mut t, &mut q, 0, 1, 1);

        assert_abs_diff_eq!(t[(0, 0)], 0.5, epsilon = 1e-6);
        assert_abs_diff_eq!(t[(1, 1)], 2.0, epsilon = 1e-6);
        assert_abs_diff_eq!(t[(1, 0)], 0.0, epsilon = 1e-9);

        let reconstructed = &q * &t * q.transpose();
        let original = DMatrix::from_row_slice(2, 2, &[2.0, 1.0, 0.0, 0.5]);
        assert_abs_diff_eq!(reconstructed, original, epsilon = 1e-6);
    }

    #[test]
    fn reorder_stable_first_sorts_a_diagonal_matrix() {
        let mut t = DMatrix::from_row_slice(3, 3, &[2.0, 0.0, 0.0, 0.0, 0.3, 0.0, 0.0, 0.0, 0.8]);
        let mut q = DMatrix::<f64>::identity(3, 3);
        let ns = reorder_stable_first(&mut t, &mut q, 1.0, 1e-9);
        assert_eq!(ns, 2);
        assert!(t[(0, 0)].abs() < 1.0);
        assert!(t[(1, 1)].abs() < 1.0);
        assert!(t[(2, 2)].abs() >= 1.0);
    }
}
