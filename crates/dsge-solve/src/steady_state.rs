//! The Steady-State Solver: the deterministic balanced-growth path the
//! model is linearized around.
//!
//! Grounded on `original_source/.../steady_state.py`. Levels are normalized
//! to `output = 1` (the original's own normalization). Nine equations —
//! the production/markup block, the public-debt target, and the three
//! government-composition shares plus the pension-transfer split and
//! aggregation identities — form a genuinely simultaneous core and are
//! handed to [`crate::newton::solve`]; everything else (`compensation-side`
//! quantities, the BGG financial-accelerator block, the search-and-matching
//! labor block) is computed from the core solution in closed form, matching
//! the original's own split between `compute_residuals`'s core block and its
//! `_wage_block_residuals`/`_financial_frictions_residuals` helpers.

use crate::newton::{self, NewtonError};
use dsge_model::{ParameterSet, SteadyState};
use ndarray::Array1;
use std::collections::BTreeMap;
use thiserror::Error;

/// Number of simultaneous core unknowns handed to Newton.
const CORE_DIM: usize = 9;

/// Errors the Steady-State Solver can raise.
#[derive(Debug, Error)]
pub enum SteadyStateError {
    /// The core Newton solve did not converge.
    #[error("core steady-state solve failed: {0}")]
    CoreDidNotConverge(#[from] NewtonError),
    /// A derived quantity violated its invariant (e.g. a negative rate, or
    /// the external finance premium falling below the riskless rate).
    #[error("steady-state invariant violated: {0}")]
    InvariantViolated(String),
}

fn get_or(params: &ParameterSet, name: &str, default: f64) -> f64 {
    params.get(name).unwrap_or(default)
}

/// The nine-dimensional core residual vector, in declaration order:
/// `[wage_share, capital_share, marginal_cost, debt, gov_consumption,
/// gov_investment, transfers, transfers_pillar, transfers_general]`.
fn core_residuals(x: &Array1<f64>, params: &ParameterSet, government: f64) -> Array1<f64> {
    let wage_share = x[0];
    let capital_share = x[1];
    let marginal_cost = x[2];
    let debt = x[3];
    let gov_consumption = x[4];
    let gov_investment = x[5];
    let transfers = x[6];
    let transfers_pillar = x[7];
    let transfers_general = x[8];

    let alpha = get_or(params, "alpha", 0.3);
    let lambda_d = get_or(params, "lambda_d", 1.2);
    let dgy = get_or(params, "dgy", 1.4);
    let tau_c_g = get_or(params, "tau_c_g", 0.55);
    let tau_i_g = get_or(params, "tau_i_g", 0.2);
    let tau_tr_g = get_or(params, "tau_tr_g", 0.25);
    let tau_r_tr = get_or(params, "tau_r_tr", 0.5);
    let lambda_r = get_or(params, "lambda_r", 0.3);

    Array1::from(vec![
        wage_share - (1.0 - alpha) / lambda_d,
        capital_share - alpha / lambda_d,
        marginal_cost - 1.0 / lambda_d,
        debt / 4.0 - dgy,
        gov_consumption / government - tau_c_g,
        gov_investment / government - tau_i_g,
        transfers / government - tau_tr_g,
        tau_r_tr * transfers_pillar - (1.0 - tau_r_tr) * transfers_general,
        transfers - (lambda_r * transfers_pillar + (1.0 - lambda_r) * transfers_general),
    ])
}

fn initial_guess(params: &ParameterSet, government: f64) -> Array1<f64> {
    let alpha = get_or(params, "alpha", 0.3);
    let lambda_d = get_or(params, "lambda_d", 1.2);
    let tau_c_g = get_or(params, "tau_c_g", 0.55);
    let tau_i_g = get_or(params, "tau_i_g", 0.2);
    let tau_tr_g = get_or(params, "tau_tr_g", 0.25);
    let transfers = government * tau_tr_g;
    Array1::from(vec![
        (1.0 - alpha) / lambda_d,
        alpha / lambda_d,
        1.0 / lambda_d,
        get_or(params, "dgy", 1.4) * 4.0,
        government * tau_c_g,
        government * tau_i_g,
        transfers,
        transfers,
        transfers,
    ])
}

/// Acklam's rational approximation to the standard normal quantile
/// function, maximum relative error `1.15e-9`. The evaluator crate only
/// needs the forward CDF, so its inverse lives here, alongside its only
/// caller.
fn inverse_normal_cdf(p: f64) -> f64 {
    const A: [f64; 6] = [
        -3.969683028665376e+01,
        2.209460984245205e+02,
        -2.759285104469687e+02,
        1.383577518672690e+02,
        -3.066479806614716e+01,
        2.506628277459239e+00,
    ];
    const B: [f64; 5] = [
        -5.447609879822406e+01,
        1.615858368580409e+02,
        -1.556989798598866e+02,
        6.680131188771972e+01,
        -1.328068155288572e+01,
    ];
    const C: [f64; 6] = [
        -7.784894002430293e-03,
        -3.223964580411365e-01,
        -2.400758277161838e+00,
        -2.549732539343734e+00,
        4.374664141464968e+00,
        2.938163982698783e+00,
    ];
    const D: [f64; 4] =
        [7.784695709041462e-03, 3.224671290700398e-01, 2.445134137142996e+00, 3.754408661907416e+00];

    let p_low = 0.02425;
    if p < p_low {
        let q = (-2.0 * p.ln()).sqrt();
        (((((C[0] * q + C[1]) * q + C[2]) * q + C[3]) * q + C[4]) * q + C[5])
            / ((((D[0] * q + D[1]) * q + D[2]) * q + D[3]) * q + 1.0)
    } else if p <= 1.0 - p_low {
        let q = p - 0.5;
        let r = q * q;
        (((((A[0] * r + A[1]) * r + A[2]) * r + A[3]) * r + A[4]) * r + A[5]) * q
            / (((((B[0] * r + B[1]) * r + B[2]) * r + B[3]) * r + B[4]) * r + 1.0)
    } else {
        let q = (-2.0 * (1.0 - p).ln()).sqrt();
        -(((((C[0] * q + C[1]) * q + C[2]) * q + C[3]) * q + C[4]) * q + C[5])
            / ((((D[0] * q + D[1]) * q + D[2]) * q + D[3]) * q + 1.0)
    }
}

/// Solve the full steady state: the nine-equation simultaneous core via
/// Newton, then every financial, labor-market and national-accounts
/// quantity in closed form from it.
pub fn solve_steady_state(params: &ParameterSet) -> Result<SteadyState, SteadyStateError> {
    let output = 1.0;
    let tau_g_y = get_or(params, "tau_g_y", 0.36);
    let government = tau_g_y * output;

    let residual_fn = |x: &Array1<f64>| core_residuals(x, params, government);
    let x0 = initial_guess(params, government);
    debug_assert_eq!(x0.len(), CORE_DIM);
    let core = newton::solve(&residual_fn, &x0)?;

    let wage_share = core[0];
    let capital_share = core[1];
    let marginal_cost = core[2];
    let public_debt = core[3];
    let gov_consumption = core[4];
    let gov_investment = core[5];
    let transfers = core[6];
    let transfers_pillar = core[7];
    let transfers_general = core[8];

    let beta = get_or(params, "beta", 0.995);
    let delta = get_or(params, "delta", 0.025);
    let delta_g = get_or(params, "delta_g", delta);
    let mu_m = get_or(params, "mu_m", 0.3);
    let exports_share_y = get_or(params, "exports_share_y", 0.6);

    let rental_rate = 1.0 / beta - (1.0 - delta);
    if rental_rate <= 0.0 {
        return Err(SteadyStateError::InvariantViolated(format!(
            "rental rate must be positive, got {rental_rate}"
        )));
    }
    let wage = wage_share * output;
    let capital = capital_share * output / rental_rate;
    let investment = delta * capital;
    let public_capital = gov_investment / delta_g;
    let exports = exports_share_y * output;
    let imports = mu_m * (investment + gov_consumption + gov_investment);
    let consumption = output - investment - gov_consumption - gov_investment - exports + imports;
    if consumption <= 0.0 {
        return Err(SteadyStateError::InvariantViolated(format!(
            "consumption must be positive, got {consumption}"
        )));
    }
    let resource_wedge = output - (consumption + investment + gov_consumption + gov_investment + exports - imports);

    let sigma_omega = get_or(params, "sigma_omega", 0.5);
    let default_prob_ss = get_or(params, "default_prob_ss", 0.0075);
    let mu_monitor = get_or(params, "mu_monitor", 0.12);
    let net_worth_ratio = get_or(params, "net_worth_ratio", 0.5);
    let gamma_ent = get_or(params, "gamma_ent", 0.975);
    let xi_transfer = get_or(params, "xi_transfer", 0.005);

    let omega_bar = (sigma_omega * inverse_normal_cdf(default_prob_ss) - 0.5 * sigma_omega * sigma_omega).exp();
    let g_omega_bar = dsge_equations::eval::monitoring_g(omega_bar, sigma_omega);
    let gamma_omega_bar = dsge_equations::eval::monitoring_gamma(omega_bar, sigma_omega);
    let share_to_banks = gamma_omega_bar;
    let premium_denominator = gamma_omega_bar - mu_monitor * g_omega_bar;
    if premium_denominator <= 0.0 {
        return Err(SteadyStateError::InvariantViolated(format!(
            "external finance premium denominator must be positive, got {premium_denominator}"
        )));
    }
    let gross_return_ratio = 1.0 / premium_denominator;
    if gross_return_ratio < 1.0 {
        return Err(SteadyStateError::InvariantViolated(format!(
            "gross return ratio must be >= 1, got {gross_return_ratio}"
        )));
    }
    let net_worth = net_worth_ratio * capital;
    let transfer_entrepreneurs = (1.0 - gamma_ent) * xi_transfer * capital;

    let separation_rate = get_or(params, "separation_rate", 0.08);
    let unemployment_ss = get_or(params, "unemployment_ss", 0.08);
    let match_elasticity = get_or(params, "match_elasticity", 0.5);
    let match_efficiency = get_or(params, "match_efficiency", 0.7);
    let job_finding_rate = separation_rate * (1.0 - unemployment_ss) / unemployment_ss;
    let market_tightness = (job_finding_rate / match_efficiency).powf(1.0 / (1.0 - match_elasticity));
    let vacancy_fill_rate = job_finding_rate / market_tightness;

    let mut residuals = BTreeMap::new();
    let core_names = [
        "wage_share",
        "capital_share",
        "marginal_cost",
        "public_debt_target",
        "govt_consumption_share",
        "govt_investment_share",
        "govt_transfer_share",
        "transfer_split_rule",
        "transfer_aggregation",
    ];
    let final_core = core_residuals(&core, params, government);
    for (name, value) in core_names.iter().zip(final_core.iter()) {
        residuals.insert((*name).to_string(), *value);
    }
    residuals.insert("resource_wedge".to_string(), resource_wedge);

    Ok(SteadyState {
        output,
        consumption,
        investment,
        exports,
        imports,
        gov_consumption,
        capital,
        public_capital,
        wage,
        rental_rate,
        marginal_cost,
        public_debt,
        transfers,
        transfers_pillar,
        transfers_general,
        omega_bar,
        g_omega_bar,
        gamma_omega_bar,
        net_worth,
        net_worth_ratio,
        transfer_entrepreneurs,
        share_to_banks,
        gross_return_ratio,
        job_finding_rate,
        vacancy_fill_rate,
        market_tightness,
        residuals,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use dsge_model::{Parameter, ParameterCategory};

    fn default_params() -> ParameterSet {
        ParameterSet::default()
    }

    #[test]
    fn solves_with_default_calibration() {
        let ss = solve_steady_state(&default_params()).unwrap();
        assert_eq!(ss.output, 1.0);
        assert!(ss.consumption > 0.0);
        assert!(ss.capital > 0.0);
        assert!(ss.gross_return_ratio >= 1.0);
        let (max_residual, _) = ss.max_residual(&[]);
        assert!(max_residual < 1e-8);
    }

    #[test]
    fn core_shares_match_the_markup_identities() {
        let params = default_params();
        let ss = solve_steady_state(&params).unwrap();
        let alpha = get_or(&params, "alpha", 0.3);
        let lambda_d = get_or(&params, "lambda_d", 1.2);
        assert!((ss.marginal_cost - 1.0 / lambda_d).abs() < 1e-8);
        // wage_share and capital_share sum to the labor+capital income
        // share implied by the markup, i.e. 1/lambda_d.
        let wage_share = ss.wage / ss.output;
        let capital_share = ss.rental_rate * ss.capital / ss.output;
        assert!((wage_share + capital_share - 1.0 / lambda_d).abs() < 1e-6);
        let _ = alpha;
    }

    #[test]
    fn transfer_split_respects_the_calibrated_rule() {
        let mut values = std::collections::BTreeMap::new();
        values.insert("tau_r_tr".to_string(), Parameter::new(0.5, ParameterCategory::FiscalRate));
        let params = ParameterSet::from_map(values);
        let ss = solve_steady_state(&params).unwrap();
        // tau_r_tr = 0.5 makes the split rule symmetric.
        assert!((ss.transfers_pillar - ss.transfers_general).abs() < 1e-6);
    }

    #[test]
    fn rejects_a_nonpositive_rental_rate() {
        let mut values = std::collections::BTreeMap::new();
        values.insert("beta".to_string(), Parameter::new(1.5, ParameterCategory::Preference));
        values.insert("delta".to_string(), Parameter::new(0.0, ParameterCategory::Technology));
        let params = ParameterSet::from_map(values);
        let err = solve_steady_state(&params).unwrap_err();
        assert!(matches!(err, SteadyStateError::InvariantViolated(_)));
    }
}
