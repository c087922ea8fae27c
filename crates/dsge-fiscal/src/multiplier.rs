//! The Fiscal Impact Engine: reduced-form, steady-state-plus-adjustment-
//! dynamics propagation of a fiscal shock into macro aggregates.
//!
//! Grounded on `original_source/.../dsge_fiscal_solver.py`'s
//! `SimplifiedFiscalSolver`: first-round GDP impact via fixed multipliers,
//! Okun's law for employment, a simple Phillips-curve inflation response,
//! and a geometric adjustment-speed schedule that phases the first-round
//! impact in over the horizon. This is the MVP path the original's own
//! module doc calls out ("Future (v2): Replace with full DSGE solution
//! using Gensys") — here, that v2 path is the Steady-State/Linearizer/
//! Gensys/IRF pipeline in `dsge-solve`, with this module remaining the
//! fallback the Simulation Orchestrator reaches for when the full solver
//! is unavailable or indeterminate.

use crate::error::FiscalError;
use dsge_model::{FiscalShock, HorizonImpact, ParameterSet};

fn get_or(params: &ParameterSet, name: &str, default: f64) -> f64 {
    params.get(name).unwrap_or(default)
}

/// The baseline national accounts the Fiscal Impact Engine scales its
/// impacts against, mirroring `dsge_fiscal_solver.py::SteadyState`
/// (distinct from `dsge_model::SteadyState`, which is normalized to
/// `output = 1.0` for the full solver path; this one carries real levels
/// since the reduced-form engine reports EUR millions and head counts).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FiscalBaseline {
    /// Baseline GDP, EUR millions.
    pub gdp: f64,
    /// Baseline total government spending, EUR millions.
    pub government_spending: f64,
    /// Baseline transfers, EUR millions.
    pub transfers: f64,
    /// Baseline government consumption, EUR millions.
    pub gov_consumption: f64,
    /// Baseline government investment, EUR millions.
    pub gov_investment: f64,
    /// Baseline total employment, persons.
    pub employment_total: f64,
    /// Baseline unemployment rate.
    pub unemployment_rate: f64,
}

/// Compute the baseline from calibration, defaulting to the 2021-Latvia
/// figures the original hard-codes when the parameter store doesn't carry
/// them.
pub fn baseline(params: &ParameterSet) -> FiscalBaseline {
    let gdp = get_or(params, "baseline_gdp_eur_m", 32_000.0);
    let eta_g = get_or(params, "eta_g", 0.38);
    let government_spending = eta_g * gdp;
    FiscalBaseline {
        gdp,
        government_spending,
        transfers: get_or(params, "tau_tr_g", 0.300) * government_spending,
        gov_consumption: get_or(params, "tau_c_g", 0.463) * government_spending,
        gov_investment: get_or(params, "tau_i_g", 0.117) * government_spending,
        employment_total: get_or(params, "baseline_employment", 900_000.0),
        unemployment_rate: get_or(params, "baseline_unemployment_rate", 0.075),
    }
}

/// One horizon year's fiscal impact, carrying the EUR-million-denominated
/// GDP impact and the realized adjustment fraction that the regional and
/// investment allocators need but `HorizonImpact` itself doesn't surface.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HorizonFiscalImpact {
    /// Horizon year.
    pub year: u32,
    /// GDP impact in EUR millions (before conversion to percent).
    pub gdp_impact_eur_m: f64,
    /// Fraction of the first-round impact realized by this horizon.
    pub realized_fraction: f64,
    /// The public-facing horizon impact record.
    pub impact: HorizonImpact,
}

/// First-round (pre-adjustment-dynamics) impact, reported alongside the
/// horizon path for the narrative layer's causal-chain and key-drivers
/// text.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FirstRoundImpact {
    /// GDP impact in EUR millions.
    pub gdp_impact_eur_m: f64,
    /// Employment impact, persons.
    pub employment_impact: f64,
}

fn adjustment_speed(params: &ParameterSet, year: u32) -> f64 {
    if year == 1 {
        get_or(params, "adjustment_speed_short", 0.40)
    } else if year <= 5 {
        get_or(params, "adjustment_speed_medium", 0.25)
    } else {
        get_or(params, "adjustment_speed_long", 0.15)
    }
}

/// Propagate `shock` through the reduced-form multiplier model, returning
/// one `HorizonFiscalImpact` per entry of `horizons` plus the first-round
/// impact they're scaled from.
pub fn solve_fiscal_shock(
    params: &ParameterSet,
    base: &FiscalBaseline,
    shock: &FiscalShock,
    horizons: &[u32],
) -> Result<(Vec<HorizonFiscalImpact>, FirstRoundImpact), FiscalError> {
    if horizons.is_empty() {
        return Err(FiscalError::EmptyHorizonSet);
    }

    let mult_transfers = get_or(params, "fiscal_multiplier_transfers", 0.8);
    let mult_consumption = get_or(params, "fiscal_multiplier_consumption", 1.1);
    let mult_investment = get_or(params, "fiscal_multiplier_investment", 1.3);

    let gdp_impact_transfers = shock.delta_transfers * mult_transfers;
    let gdp_impact_consumption = shock.delta_gov_consumption * mult_consumption;
    let gdp_impact_investment = shock.delta_gov_investment * mult_investment;

    let effective_labor_tax_change = shock.delta_tau_y + shock.delta_tau_we + shock.delta_tau_ww;
    let gdp_impact_labor_tax = -effective_labor_tax_change * 0.01 * base.gdp * 1.2;
    let gdp_impact_consumption_tax = -shock.delta_tau_c * 0.01 * base.gdp * 0.5;

    let gdp_impact_first_round = gdp_impact_transfers
        + gdp_impact_consumption
        + gdp_impact_investment
        + gdp_impact_labor_tax
        + gdp_impact_consumption_tax;

    let employment_elasticity = 0.5; // Okun's law: 1% GDP change ~ 0.5% employment change.
    let employment_impact_first_round =
        (gdp_impact_first_round / base.gdp) * employment_elasticity * base.employment_total;

    let revenue_impact = -(shock.delta_transfers + shock.delta_gov_consumption + shock.delta_gov_investment)
        + (shock.delta_tau_c * 0.01 * base.gdp * 0.6)
        + (effective_labor_tax_change * 0.01 * base.gdp * 0.5);
    let expenditure_impact = shock.delta_transfers + shock.delta_gov_consumption + shock.delta_gov_investment;
    let budget_balance_impact = revenue_impact - expenditure_impact;

    let phillips_slope = get_or(params, "phillips_slope", 0.3);

    let mut horizon_impacts = Vec::with_capacity(horizons.len());
    for &year in horizons {
        let speed = adjustment_speed(params, year);
        let quarters = (year * 4) as i32;
        let realized_fraction = 1.0 - (1.0 - speed).powi(quarters);

        let gdp_impact_eur_m = gdp_impact_first_round * realized_fraction;
        let employment_change = employment_impact_first_round * realized_fraction;
        let gdp_pct = (gdp_impact_eur_m / base.gdp) * 100.0;
        let inflation_pp = gdp_pct * phillips_slope;

        horizon_impacts.push(HorizonFiscalImpact {
            year,
            gdp_impact_eur_m,
            realized_fraction,
            impact: HorizonImpact {
                year,
                budget_balance: budget_balance_impact * realized_fraction,
                revenues: revenue_impact * realized_fraction,
                expenditures: -expenditure_impact * realized_fraction,
                gdp_pct,
                employment_change,
                inflation_pp,
            },
        });
    }

    Ok((
        horizon_impacts,
        FirstRoundImpact {
            gdp_impact_eur_m: gdp_impact_first_round,
            employment_impact: employment_impact_first_round,
        },
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn zero_shock_produces_zero_impact_at_every_horizon() {
        let params = ParameterSet::default();
        let base = baseline(&params);
        let (horizons, first_round) =
            solve_fiscal_shock(&params, &base, &FiscalShock::ZERO, &[1, 5, 15]).unwrap();

        assert_abs_diff_eq!(first_round.gdp_impact_eur_m, 0.0, epsilon = 1e-9);
        for h in &horizons {
            assert_abs_diff_eq!(h.impact.gdp_pct, 0.0, epsilon = 1e-9);
            assert_abs_diff_eq!(h.impact.employment_change, 0.0, epsilon = 1e-9);
        }
    }

    #[test]
    fn transfer_cut_matches_the_hand_derived_first_round_figure() {
        let params = ParameterSet::default();
        let base = baseline(&params);
        let shock = FiscalShock {
            delta_transfers: -200.0,
            ..FiscalShock::ZERO
        };
        let (_, first_round) = solve_fiscal_shock(&params, &base, &shock, &[1, 5, 15]).unwrap();
        // -200 * 0.8 multiplier = -160.
        assert_abs_diff_eq!(first_round.gdp_impact_eur_m, -160.0, epsilon = 1e-9);
    }

    #[test]
    fn realized_fraction_grows_toward_one_with_horizon() {
        let params = ParameterSet::default();
        let base = baseline(&params);
        let shock = FiscalShock {
            delta_gov_investment: 150.0,
            ..FiscalShock::ZERO
        };
        let (horizons, _) = solve_fiscal_shock(&params, &base, &shock, &[1, 5, 15]).unwrap();

        assert!(horizons[0].realized_fraction < horizons[1].realized_fraction);
        assert!(horizons[1].realized_fraction < horizons[2].realized_fraction);
        assert!(horizons[2].realized_fraction < 1.0);
        // year-1 quarterly speed is 0.40: realized = 1 - 0.6^4.
        assert_abs_diff_eq!(horizons[0].realized_fraction, 1.0 - 0.6_f64.powi(4), epsilon = 1e-9);
    }

    #[test]
    fn inflation_follows_the_sign_of_the_gdp_gap() {
        let params = ParameterSet::default();
        let base = baseline(&params);
        let expansion = FiscalShock {
            delta_gov_consumption: 100.0,
            ..FiscalShock::ZERO
        };
        let contraction = FiscalShock {
            delta_gov_consumption: -100.0,
            ..FiscalShock::ZERO
        };
        let (exp_horizons, _) = solve_fiscal_shock(&params, &base, &expansion, &[1]).unwrap();
        let (con_horizons, _) = solve_fiscal_shock(&params, &base, &contraction, &[1]).unwrap();

        assert!(exp_horizons[0].impact.inflation_pp > 0.0);
        assert!(con_horizons[0].impact.inflation_pp < 0.0);
    }

    #[test]
    fn empty_horizon_set_is_rejected() {
        let params = ParameterSet::default();
        let base = baseline(&params);
        let err = solve_fiscal_shock(&params, &base, &FiscalShock::ZERO, &[]).unwrap_err();
        assert_eq!(err, FiscalError::EmptyHorizonSet);
    }
}
