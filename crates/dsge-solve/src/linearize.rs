//! The Linearizer: turns a symbolic [`EquationLibrary`] plus a steady-state
//! binding point into the numeric `(G0, G1, C, Psi, Pi)` system the Gensys
//! Solver consumes.
//!
//! Grounded on `original_source/.../build_linear_system.py`: `_numeric_jacobian`
//! (central finite differences, `h_i = EPS_JAC * max(1, |x_i|)`) and the
//! `qr(M.T, pivoting=True)` "squaring up" step that trims a structurally
//! overdetermined equation set down to exactly one equation per variable.
//! Every structural equation is read as a residual `R(y_{t+1}, y_t, y_{t-1},
//! eps_t) = 0`. First-order expanding it around the steady state gives
//! `R_ss + R_{t-1} dy_{t-1} + R_t dy_t + R_{t+1} dy_{t+1} + R_eps deps = 0`;
//! isolating the contemporaneous term and rearranging into Sims' canonical
//! form `G0 y_t = G1 y_{t-1} + C + Psi eps_t + Pi eta_t` gives
//! `G0 = R_t`, `G1 = -R_{t-1}`, `Pi = -R_{t+1}` (restricted to the variables
//! that actually appear one period ahead — Sims' expectational-error
//! loading, one column per forward variable), `Psi = -R_eps`, `C = -R_ss`
//! (zero for an exact steady state, but carried through rather than
//! assumed). Verified against the textbook scalar case `y_t = rho y_{t-1} +
//! eps_t`, written as the residual `y_t - rho y_{t-1} - eps_t = 0`: `R_t=1`,
//! `R_{t-1}=-rho`, `R_eps=-1`, giving `G0=1`, `G1=rho`, `Psi=1` as expected.

use dsge_equations::{Environment, EquationLibrary, ModelConstants, UnboundSymbol};
use dsge_model::ParameterSet;
use nalgebra::DMatrix;
use std::collections::{BTreeMap, BTreeSet};
use thiserror::Error;
use tracing::debug;

/// Finite-difference step scale, matching `crate::newton::EPS_JAC`.
const EPS_JAC: f64 = 1e-6;

/// Tolerance below which a pivot column is considered linearly dependent on
/// the columns already chosen, during squaring-up.
const PIVOT_TOL: f64 = 1e-8;

/// The numeric linear(ized) rational-expectations system, ready for
/// [`crate::gensys::gensys`].
#[derive(Debug, Clone)]
pub struct LinearSystem {
    /// Contemporaneous coefficient matrix.
    pub g0: DMatrix<f64>,
    /// Lagged coefficient matrix.
    pub g1: DMatrix<f64>,
    /// Constant term (the residual at the binding point).
    pub c: DMatrix<f64>,
    /// Shock loading matrix.
    pub psi: DMatrix<f64>,
    /// Expectational-error loading matrix.
    pub pi: DMatrix<f64>,
    /// Endogenous variables, in the column order of `g0`/`g1`.
    pub variables: Vec<String>,
    /// Shocks, in the column order of `psi`.
    pub shocks: Vec<String>,
    /// The subset of `variables` that appear one period ahead somewhere in
    /// the model, in the column order of `pi`.
    pub forward_variables: Vec<String>,
    /// Ids of every equation left out of the final square system, whether
    /// because its Jacobian row was non-finite (and exempt) or because
    /// squaring-up found it redundant.
    pub dropped_equations: Vec<String>,
    /// The subset of `dropped_equations` dropped specifically for carrying
    /// a non-finite Jacobian row (all members of the caller's
    /// skip-allowlist, by construction).
    pub skipped_equations: Vec<String>,
}

/// Errors the Linearizer can raise.
#[derive(Debug, Error)]
pub enum LinearizeError {
    /// A variable the library needs a binding for has none in the supplied
    /// steady-state levels.
    #[error("no steady-state level supplied for variable '{0}'")]
    MissingBinding(String),
    /// A symbol appeared in an equation that is neither a known variable,
    /// shock, nor a parameter in the supplied `ParameterSet`.
    #[error("symbol '{0}' is neither a variable, a shock, nor a known parameter")]
    UnknownParameter(String),
    /// Fewer usable equations than variables, with an explicit
    /// endogenous-variable allowlist in force. An allowlist fixes the
    /// variable set, so there is no room to square it down; absent an
    /// allowlist this is handled instead by trimming the variable set (see
    /// `CoreIncomplete` for when even that cannot restore a square system).
    #[error("underdetermined: {equations} equations for {variables} variables")]
    Underdetermined {
        /// Usable equations supplied (after dropping non-finite rows).
        equations: usize,
        /// Variables needing an equation.
        variables: usize,
    },
    /// The core equation set cannot be completed into a square system:
    /// either the Jacobian rows that remain after dropping non-finite ones
    /// are rank-deficient, or a dropped non-finite row belongs to an
    /// equation outside the caller's skip-allowlist (only indexed/integral
    /// forms may be named there).
    #[error("core incomplete: only {independent} of {needed} equations are usable")]
    CoreIncomplete {
        /// Independent, finite equations found.
        independent: usize,
        /// Variables needing an equation.
        needed: usize,
    },
    /// Evaluating a residual hit an unbound symbol — a binding bug in this
    /// module, surfaced rather than panicking.
    #[error(transparent)]
    Unbound(#[from] UnboundSymbol),
}

/// Assemble the linear system around `steady_state_levels`, a binding from
/// every endogenous variable name the library needs to its steady-state
/// level. Variables are bound to the same level at shifts `-1`, `0`, and
/// `+1` (the definition of a steady state); shocks are bound to zero.
///
/// `skip_allowlist` names equations (by id) allowed to be dropped should
/// their Jacobian row come out non-finite — reserved for indexed/integral
/// forms whose row can genuinely be singular at some calibrations. A
/// non-finite row belonging to any other equation fails the run with
/// `CoreIncomplete` rather than being silently dropped.
pub fn linearize(
    lib: &EquationLibrary,
    params: &ParameterSet,
    steady_state_levels: &BTreeMap<String, f64>,
    skip_allowlist: &[String],
) -> Result<LinearSystem, LinearizeError> {
    let mut variables = lib.variables(params);
    let shocks = lib.shocks();
    let constants = ModelConstants::from_params(params);

    let mut levels = Vec::with_capacity(variables.len());
    for v in &variables {
        let level = steady_state_levels
            .get(v)
            .copied()
            .ok_or_else(|| LinearizeError::MissingBinding(v.clone()))?;
        levels.push(level);
    }

    let mut forward_variables = collect_forward_variables(lib, &variables);

    let base_env = build_environment(lib, params, &constants, &variables, &levels, &shocks)?;
    let n_eq = lib.equations().len();
    let n_vars = variables.len();
    let n_fwd = forward_variables.len();
    let n_shocks = shocks.len();

    let r_ss = eval_all(lib, &base_env)?;

    let mut d_t = DMatrix::<f64>::zeros(n_eq, n_vars);
    let mut d_tm1 = DMatrix::<f64>::zeros(n_eq, n_vars);
    for (col, v) in variables.iter().enumerate() {
        let h = EPS_JAC * levels[col].abs().max(1.0);
        for (shift, target) in [(0i8, &mut d_t), (-1i8, &mut d_tm1)] {
            let mut up = base_env.clone();
            up.bind(v.clone(), shift, levels[col] + h);
            let mut down = base_env.clone();
            down.bind(v.clone(), shift, levels[col] - h);
            let f_up = eval_all(lib, &up)?;
            let f_down = eval_all(lib, &down)?;
            for row in 0..n_eq {
                target[(row, col)] = (f_up[row] - f_down[row]) / (2.0 * h);
            }
        }
    }

    let mut d_tp1 = DMatrix::<f64>::zeros(n_eq, n_fwd);
    for (col, v) in forward_variables.iter().enumerate() {
        let level = levels[variables.iter().position(|x| x == v).unwrap()];
        let h = EPS_JAC * level.abs().max(1.0);
        let mut up = base_env.clone();
        up.bind(v.clone(), 1, level + h);
        let mut down = base_env.clone();
        down.bind(v.clone(), 1, level - h);
        let f_up = eval_all(lib, &up)?;
        let f_down = eval_all(lib, &down)?;
        for row in 0..n_eq {
            d_tp1[(row, col)] = (f_up[row] - f_down[row]) / (2.0 * h);
        }
    }

    let mut d_eps = DMatrix::<f64>::zeros(n_eq, n_shocks);
    for (col, s) in shocks.iter().enumerate() {
        let h = EPS_JAC;
        let mut up = base_env.clone();
        up.bind(s.clone(), 0, h);
        let mut down = base_env.clone();
        down.bind(s.clone(), 0, -h);
        let f_up = eval_all(lib, &up)?;
        let f_down = eval_all(lib, &down)?;
        for row in 0..n_eq {
            d_eps[(row, col)] = (f_up[row] - f_down[row]) / (2.0 * h);
        }
    }

    // Drop rows a bad calibration or a malformed equation made non-finite
    // before they ever reach the pivot selection; a non-exempt one fails
    // the run outright instead of silently entering (and possibly winning)
    // the squaring-up pivot.
    let non_finite_rows: Vec<usize> = (0..n_eq)
        .filter(|&row| {
            !((0..n_vars).all(|c| d_t[(row, c)].is_finite() && d_tm1[(row, c)].is_finite())
                && (0..n_fwd).all(|c| d_tp1[(row, c)].is_finite())
                && (0..n_shocks).all(|c| d_eps[(row, c)].is_finite())
                && r_ss[row].is_finite())
        })
        .collect();

    let skipped_equations: Vec<String> =
        non_finite_rows.iter().map(|&row| lib.equations()[row].id.clone()).collect();
    for id in &skipped_equations {
        if !skip_allowlist.iter().any(|s| s == id) {
            tracing::warn!(equation = %id, "non-finite Jacobian row outside the skip-allowlist");
            let usable = n_eq - non_finite_rows.len();
            return Err(LinearizeError::CoreIncomplete { independent: usable, needed: n_vars });
        }
    }
    if !skipped_equations.is_empty() {
        debug!(skipped = skipped_equations.len(), "dropped non-finite Jacobian rows");
    }

    let valid_rows: Vec<usize> = (0..n_eq).filter(|r| !non_finite_rows.contains(r)).collect();
    let n_valid = valid_rows.len();

    if n_valid < n_vars {
        if lib.allowlist().is_some() {
            return Err(LinearizeError::Underdetermined { equations: n_valid, variables: n_vars });
        }

        // No allowlist: square the variable set down to the usable equation
        // count by column-pivoted QR on G0 (`d_t`), restricted to the valid
        // rows, rather than failing outright.
        let columns: Vec<Vec<f64>> = (0..n_vars)
            .map(|col| valid_rows.iter().map(|&row| d_t[(row, col)]).collect())
            .collect();
        let (selected, _rejected) = select_independent(columns, n_valid)
            .map_err(|found| LinearizeError::CoreIncomplete { independent: found, needed: n_valid })?;

        variables = selected.iter().map(|&i| variables[i].clone()).collect();
        levels = selected.iter().map(|&i| levels[i]).collect();
        d_t = DMatrix::from_fn(n_eq, selected.len(), |row, col| d_t[(row, selected[col])]);
        d_tm1 = DMatrix::from_fn(n_eq, selected.len(), |row, col| d_tm1[(row, selected[col])]);

        let variable_set: BTreeSet<&str> = variables.iter().map(String::as_str).collect();
        let mut keep_fwd: Vec<usize> = Vec::new();
        let mut new_forward = Vec::new();
        for (idx, fv) in forward_variables.iter().enumerate() {
            if variable_set.contains(fv.as_str()) {
                keep_fwd.push(idx);
                new_forward.push(fv.clone());
            }
        }
        forward_variables = new_forward;
        d_tp1 = DMatrix::from_fn(n_eq, keep_fwd.len(), |row, col| d_tp1[(row, keep_fwd[col])]);

        debug!(
            kept = variables.len(),
            dropped = n_vars - variables.len(),
            "underdetermined system squared down by trimming the inferred variable set"
        );
    }

    let n_vars = variables.len();
    let n_fwd = forward_variables.len();

    let (kept, mgs_dropped) = square_up(&d_t, &d_tm1, &d_tp1, &d_eps, &valid_rows, n_vars)?;

    let mut g0 = DMatrix::<f64>::zeros(n_vars, n_vars);
    let mut g1 = DMatrix::<f64>::zeros(n_vars, n_vars);
    let mut c = DMatrix::<f64>::zeros(n_vars, 1);
    let mut psi = DMatrix::<f64>::zeros(n_vars, n_shocks);
    let mut pi = DMatrix::<f64>::zeros(n_vars, n_fwd);
    for (row, &eq_idx) in kept.iter().enumerate() {
        for col in 0..n_vars {
            g0[(row, col)] = d_t[(eq_idx, col)];
            g1[(row, col)] = -d_tm1[(eq_idx, col)];
        }
        c[(row, 0)] = -r_ss[eq_idx];
        for col in 0..n_shocks {
            psi[(row, col)] = -d_eps[(eq_idx, col)];
        }
        for col in 0..n_fwd {
            pi[(row, col)] = -d_tp1[(eq_idx, col)];
        }
    }

    if !mgs_dropped.is_empty() {
        debug!(dropped = mgs_dropped.len(), "squaring-up dropped redundant equations");
    }
    let mut dropped_equations = skipped_equations.clone();
    dropped_equations.extend(mgs_dropped.iter().map(|&i| lib.equations()[i].id.clone()));

    Ok(LinearSystem {
        g0,
        g1,
        c,
        psi,
        pi,
        variables,
        shocks,
        forward_variables,
        dropped_equations,
        skipped_equations,
    })
}

fn collect_forward_variables(lib: &EquationLibrary, variables: &[String]) -> Vec<String> {
    let variable_set: BTreeSet<&str> = variables.iter().map(String::as_str).collect();
    let mut forward = BTreeSet::new();
    for eq in lib.equations() {
        let mut symbols = Vec::new();
        eq.residual.collect_symbols(&mut symbols);
        for (name, shift) in symbols {
            if shift == 1 && variable_set.contains(name.as_str()) {
                forward.insert(name);
            }
        }
    }
    forward.into_iter().collect()
}

fn build_environment<'a>(
    lib: &EquationLibrary,
    params: &ParameterSet,
    constants: &'a ModelConstants,
    variables: &[String],
    levels: &[f64],
    shocks: &[String],
) -> Result<Environment<'a>, LinearizeError> {
    let mut env = Environment::new(constants);
    for (v, &level) in variables.iter().zip(levels) {
        for shift in [-1i8, 0, 1] {
            env.bind(v.clone(), shift, level);
        }
    }
    for s in shocks {
        env.bind(s.clone(), 0, 0.0);
    }

    let variable_set: BTreeSet<&str> = variables.iter().map(String::as_str).collect();
    let shock_set: BTreeSet<&str> = shocks.iter().map(String::as_str).collect();
    for eq in lib.equations() {
        let mut symbols = Vec::new();
        eq.residual.collect_symbols(&mut symbols);
        for (name, shift) in symbols {
            if variable_set.contains(name.as_str()) || shock_set.contains(name.as_str()) {
                continue;
            }
            if env.lookup(&name, shift).is_some() {
                continue;
            }
            let value =
                params.get(&name).ok_or_else(|| LinearizeError::UnknownParameter(name.clone()))?;
            env.bind(name, shift, value);
        }
    }
    Ok(env)
}

fn eval_all(lib: &EquationLibrary, env: &Environment) -> Result<Vec<f64>, UnboundSymbol> {
    lib.evaluate_residuals(env)
}

/// Column-pivoted modified Gram-Schmidt over the transposed stacked
/// Jacobian (rows = equations, after transposition: columns = equations),
/// restricted to `valid_rows` (non-finite rows never enter the pivot).
/// Greedily selects `n_vars` linearly independent equations, returning
/// their original row indices (ascending) and the original indices of the
/// rest of `valid_rows`.
fn square_up(
    d_t: &DMatrix<f64>,
    d_tm1: &DMatrix<f64>,
    d_tp1: &DMatrix<f64>,
    d_eps: &DMatrix<f64>,
    valid_rows: &[usize],
    n_vars: usize,
) -> Result<(Vec<usize>, Vec<usize>), LinearizeError> {
    let width = d_t.ncols() + d_tm1.ncols() + d_tp1.ncols() + d_eps.ncols();
    let vectors: Vec<Vec<f64>> = valid_rows
        .iter()
        .map(|&row| {
            let mut v = Vec::with_capacity(width);
            for block in [d_t, d_tm1, d_tp1, d_eps] {
                for col in 0..block.ncols() {
                    v.push(block[(row, col)]);
                }
            }
            v
        })
        .collect();

    let (selected, rejected) = select_independent(vectors, n_vars)
        .map_err(|independent| LinearizeError::CoreIncomplete { independent, needed: n_vars })?;

    let mut kept: Vec<usize> = selected.iter().map(|&i| valid_rows[i]).collect();
    kept.sort_unstable();
    let dropped: Vec<usize> = rejected.iter().map(|&i| valid_rows[i]).collect();
    Ok((kept, dropped))
}

/// Greedily select `m` linearly independent vectors out of `vectors` via
/// column-pivoted modified Gram-Schmidt, returning the selected indices
/// (ascending) and the rejected indices, both relative to `vectors`.
/// `Err(rank)` reports how many independent vectors were actually found
/// when fewer than `m` exist. Shared by `square_up` (pivoting over
/// equations) and the underdetermined-no-allowlist path in `linearize`
/// (pivoting over variable columns of `G0`).
fn select_independent(mut vectors: Vec<Vec<f64>>, m: usize) -> Result<(Vec<usize>, Vec<usize>), usize> {
    let n = vectors.len();
    let mut pivot: Vec<usize> = (0..n).collect();

    for k in 0..m {
        let (best, _) = (k..n)
            .map(|j| (j, norm(&vectors[j])))
            .fold((k, -1.0_f64), |acc, cur| if cur.1 > acc.1 { cur } else { acc });
        vectors.swap(k, best);
        pivot.swap(k, best);

        let norm_k = norm(&vectors[k]);
        if norm_k < PIVOT_TOL {
            return Err(k);
        }
        let q_k: Vec<f64> = vectors[k].iter().map(|v| v / norm_k).collect();
        for j in (k + 1)..n {
            let dot: f64 = q_k.iter().zip(&vectors[j]).map(|(a, b)| a * b).sum();
            for (entry, &qv) in vectors[j].iter_mut().zip(&q_k) {
                *entry -= dot * qv;
            }
        }
    }

    let mut selected: Vec<usize> = pivot[..m].to_vec();
    selected.sort_unstable();
    let selected_set: BTreeSet<usize> = selected.iter().copied().collect();
    let rejected: Vec<usize> = (0..n).filter(|i| !selected_set.contains(i)).collect();
    Ok((selected, rejected))
}

fn norm(v: &[f64]) -> f64 {
    v.iter().map(|x| x * x).sum::<f64>().sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;
    use dsge_equations::{Equation, EquationSection, Node};
    use dsge_model::{Parameter, ParameterCategory};

    fn two_equation_ar1_library() -> EquationLibrary {
        // c_t - rho*c_{t-1} - eps_c = 0, a purely backward-looking AR(1).
        let eq = Equation::new(
            "c_ar1",
            EquationSection::Behavioral,
            Node::sym("c")
                .sub(Node::sym("rho").mul(Node::sym_shift("c", -1)))
                .sub(Node::sym_shift("eps_c", 0)),
        );
        EquationLibrary::new(vec![eq]).unwrap()
    }

    fn rho_params(rho: f64) -> ParameterSet {
        let mut values = BTreeMap::new();
        values.insert("rho".to_string(), Parameter::new(rho, ParameterCategory::ShockProcess));
        ParameterSet::from_map(values)
    }

    #[test]
    fn linearizes_a_simple_ar1() {
        let lib = two_equation_ar1_library();
        let params = rho_params(0.7);
        let mut levels = BTreeMap::new();
        // c = 0 is the true steady state of c_t = rho*c_{t-1} + eps_c with
        // no shock realized, so C must come out at zero too.
        levels.insert("c".to_string(), 0.0);

        let system = linearize(&lib, &params, &levels, &[]).unwrap();
        assert_eq!(system.variables, vec!["c".to_string()]);
        assert_eq!(system.forward_variables.len(), 0);
        assert!((system.g0[(0, 0)] - 1.0).abs() < 1e-6);
        assert!((system.g1[(0, 0)] - 0.7).abs() < 1e-6);
        assert!((system.psi[(0, 0)] - 1.0).abs() < 1e-6);
        assert!(system.c[(0, 0)].abs() < 1e-9);
        assert!(system.dropped_equations.is_empty());
        assert!(system.skipped_equations.is_empty());
    }

    #[test]
    fn underdetermined_system_is_rejected() {
        // Two variables, one equation.
        let eq = Equation::new(
            "one_eq",
            EquationSection::Behavioral,
            Node::sym("c").sub(Node::sym("k")),
        );
        let lib =
            EquationLibrary::with_allowlist(vec![eq], vec!["c".to_string(), "k".to_string()], &ParameterSet::default())
                .unwrap();
        let mut levels = BTreeMap::new();
        levels.insert("c".to_string(), 1.0);
        levels.insert("k".to_string(), 1.0);
        let err = linearize(&lib, &ParameterSet::default(), &levels, &[]).unwrap_err();
        assert!(matches!(err, LinearizeError::Underdetermined { equations: 1, variables: 2 }));
    }

    #[test]
    fn underdetermined_system_with_no_allowlist_squares_down_the_variable_set() {
        // One equation, two inferred variables, no allowlist: rather than
        // failing, the variable set is squared down to one column.
        let eq = Equation::new(
            "one_eq",
            EquationSection::Behavioral,
            Node::sym("c").sub(Node::sym("k")),
        );
        let lib = EquationLibrary::new(vec![eq]).unwrap();
        let mut levels = BTreeMap::new();
        levels.insert("c".to_string(), 1.0);
        levels.insert("k".to_string(), 1.0);
        let system = linearize(&lib, &ParameterSet::default(), &levels, &[]).unwrap();
        assert_eq!(system.variables.len(), 1);
        assert!(system.variables[0] == "c" || system.variables[0] == "k");
    }

    #[test]
    fn missing_binding_is_reported() {
        let lib = two_equation_ar1_library();
        let params = rho_params(0.7);
        let levels = BTreeMap::new();
        let err = linearize(&lib, &params, &levels, &[]).unwrap_err();
        assert!(matches!(err, LinearizeError::MissingBinding(name) if name == "c"));
    }

    #[test]
    fn non_exempt_non_finite_row_is_core_incomplete() {
        // 1/(c - c) is non-finite at any steady state, and "bad_eq" is not
        // named in the skip-allowlist.
        let bad = Equation::new(
            "bad_eq",
            EquationSection::Behavioral,
            Node::Const(1.0).div(Node::sym("c").sub(Node::sym("c"))),
        );
        let eq = Equation::new(
            "c_ar1",
            EquationSection::Behavioral,
            Node::sym("c").sub(Node::sym("rho").mul(Node::sym_shift("c", -1))).sub(Node::sym_shift("eps_c", 0)),
        );
        let lib = EquationLibrary::new(vec![bad, eq]).unwrap();
        let params = rho_params(0.7);
        let mut levels = BTreeMap::new();
        levels.insert("c".to_string(), 0.0);
        let err = linearize(&lib, &params, &levels, &[]).unwrap_err();
        assert!(matches!(err, LinearizeError::CoreIncomplete { .. }));
    }

    #[test]
    fn exempt_non_finite_row_is_dropped_and_reported() {
        let bad = Equation::new(
            "bad_eq",
            EquationSection::Behavioral,
            Node::Const(1.0).div(Node::sym("c").sub(Node::sym("c"))),
        );
        let eq = Equation::new(
            "c_ar1",
            EquationSection::Behavioral,
            Node::sym("c").sub(Node::sym("rho").mul(Node::sym_shift("c", -1))).sub(Node::sym_shift("eps_c", 0)),
        );
        let lib = EquationLibrary::new(vec![bad, eq]).unwrap();
        let params = rho_params(0.7);
        let mut levels = BTreeMap::new();
        levels.insert("c".to_string(), 0.0);
        let system = linearize(&lib, &params, &levels, &["bad_eq".to_string()]).unwrap();
        assert_eq!(system.skipped_equations, vec!["bad_eq".to_string()]);
        assert_eq!(system.dropped_equations, vec!["bad_eq".to_string()]);
        assert_eq!(system.variables, vec!["c".to_string()]);
    }
}
