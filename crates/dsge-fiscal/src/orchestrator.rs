//! The Simulation Orchestrator: drives one `SimulationRun` through its
//! lifecycle, attempting the full DSGE solution path before falling back
//! to the reduced-form Fiscal Impact Engine.
//!
//! Grounded on `original_source/.../aggregates/__init__.py`'s
//! `Simulation.start/complete/fail` (here, `dsge_model::SimulationRun`) and
//! on the fallback policy recorded in `DESIGN.md`: the full solver path is
//! tried first when an `EquationLibrary` is supplied, and any
//! `DsgeSolveError` (non-convergence, a non-square linearization, a
//! singular pencil, or an indeterminate/nonexistent solution) routes the
//! run to the reduced-form path rather than failing it outright.

use crate::error::{DsgeSolveError, FiscalError, OrchestratorError};
use crate::investment::investment_impacts;
use crate::multiplier::{baseline, solve_fiscal_shock, FiscalBaseline};
use crate::narrative::{
    build_causal_chain, describe_policy_changes, identify_winners_losers, key_drivers,
    reduced_form_assumptions, reduced_form_caveats,
};
use crate::regional::regional_impacts;
use dsge_equations::EquationLibrary;
use dsge_model::{
    ConfidenceLevel, FiscalShock, HorizonImpact, ParameterSet, SimulationResult, SimulationRun,
    HORIZONS,
};
use dsge_solve::{gensys, impulse_responses, linearize, solve_steady_state};
use std::time::{Duration, Instant};

/// Default time budget for one simulation run, per §5.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Configuration for attempting the full DSGE solution path.
///
/// The Orchestrator is deliberately agnostic to what a supplied
/// `EquationLibrary` models; this struct carries the glue a caller (the
/// `simulate` CLI subcommand, or a test) must supply to translate between
/// the Fiscal Impact Engine's shock/result vocabulary and the library's
/// own variable/shock names.
pub struct DsgePath<'a> {
    /// The structural model to linearize and solve.
    pub equations: &'a EquationLibrary,
    /// Which shock symbol in `equations` absorbs the dominant nonzero
    /// field of the `FiscalShock` being simulated (e.g. `"eps_g_tr"` for a
    /// transfers shock). The Orchestrator picks the first `FiscalShock`
    /// field in priority order (transfers, consumption, investment,
    /// consumption tax, labor tax) that is nonzero and looks up its entry
    /// here; if no entry is found, the DSGE path is skipped.
    pub shock_symbol: String,
    /// The endogenous variable whose impulse response stands in for
    /// output deviations.
    pub output_variable: String,
    /// Model periods per policy-relevant year (4 for a quarterly model).
    pub periods_per_year: usize,
    /// Equation ids allowed to drop out of the linear system should their
    /// Jacobian row come out non-finite (only indexed/integral forms
    /// should ever be named here).
    pub skip_allowlist: Vec<String>,
}

/// The magnitude the dominant nonzero `FiscalShock` field contributes to
/// the shock absorbed by `path.shock_symbol`, in priority order (spending
/// channels first, then tax channels with their sign flipped since a tax
/// increase is contractionary). `None` for the all-zero shock.
fn dominant_shock_magnitude(shock: &FiscalShock) -> Option<f64> {
    if shock.delta_transfers != 0.0 {
        Some(shock.delta_transfers)
    } else if shock.delta_gov_consumption != 0.0 {
        Some(shock.delta_gov_consumption)
    } else if shock.delta_gov_investment != 0.0 {
        Some(shock.delta_gov_investment)
    } else if shock.delta_tau_c != 0.0 {
        Some(-shock.delta_tau_c)
    } else if shock.delta_tau_y != 0.0 {
        Some(-shock.delta_tau_y)
    } else {
        None
    }
}

/// Attempt the full DSGE path, returning one GDP-deviation path (fraction
/// of steady-state output) per requested horizon year, or an error that
/// the caller should treat as a fallback trigger.
fn try_dsge_path(
    params: &ParameterSet,
    shock: &FiscalShock,
    path: &DsgePath<'_>,
) -> Result<Vec<(u32, f64)>, DsgeSolveError> {
    let _span = tracing::info_span!("steady_state").entered();
    let steady_state = solve_steady_state(params)?;
    drop(_span);

    let _span = tracing::info_span!("linearize").entered();
    let system = linearize(path.equations, params, &steady_state.levels(), &path.skip_allowlist)?;
    drop(_span);

    let _span = tracing::info_span!("gensys").entered();
    let solution = gensys(&system.g0, &system.g1, &system.c, &system.psi, &system.pi, None)?;
    drop(_span);

    if solution.eu != (1, 1) {
        return Err(DsgeSolveError::Indeterminate(solution.eu));
    }

    if !system.shocks.iter().any(|s| s == &path.shock_symbol) {
        return Err(DsgeSolveError::UnknownShockSymbol(path.shock_symbol.clone()));
    }
    if !system.variables.iter().any(|v| v == &path.output_variable) {
        return Err(DsgeSolveError::UnknownOutputVariable(path.output_variable.clone()));
    }

    let max_year = HORIZONS.iter().copied().max().unwrap_or(15);
    let max_periods = max_year as usize * path.periods_per_year;

    let _span = tracing::info_span!("irf").entered();
    let responses = impulse_responses(&system, &solution, max_periods)?;
    drop(_span);

    let magnitude = dominant_shock_magnitude(shock).unwrap_or(0.0);
    let response = responses
        .iter()
        .find(|r| r.shock == path.shock_symbol)
        .expect("shock_symbol was confirmed present in system.shocks above");

    let output_path = &response.paths[&path.output_variable];

    Ok(HORIZONS
        .iter()
        .map(|&year| {
            let period = (year as usize * path.periods_per_year).min(output_path.len() - 1);
            (year, output_path[period] * magnitude)
        })
        .collect())
}

/// Run `shock` through the Simulation Orchestrator, trying the DSGE path
/// first when `dsge` is supplied, and always falling back to the
/// reduced-form Fiscal Impact Engine.
pub fn run(
    shock: FiscalShock,
    params: &ParameterSet,
    parameters_snapshot_hash: String,
    scenario_id: String,
    dsge: Option<&DsgePath<'_>>,
    t_max: Duration,
) -> Result<SimulationRun, OrchestratorError> {
    let deadline = Instant::now() + t_max;
    let mut sim_run = SimulationRun::new(shock, parameters_snapshot_hash);
    sim_run.start()?;

    if Instant::now() >= deadline {
        sim_run.fail("run exceeded its time budget before any phase started")?;
        return Err(OrchestratorError::Timeout(t_max));
    }

    let base = baseline(params);
    let result = match build_result(&shock, params, &base, scenario_id, dsge) {
        Ok(result) => result,
        Err(err) => {
            sim_run.fail(err.to_string())?;
            return Err(err.into());
        }
    };

    sim_run.complete(result)?;
    Ok(sim_run)
}

fn build_result(
    shock: &FiscalShock,
    params: &ParameterSet,
    base: &FiscalBaseline,
    scenario_id: String,
    dsge: Option<&DsgePath<'_>>,
) -> Result<SimulationResult, FiscalError> {
    let (mut horizon_fiscal, first_round) = solve_fiscal_shock(params, base, shock, &HORIZONS)?;

    let dsge_overlay = dsge.and_then(|path| match try_dsge_path(params, shock, path) {
        Ok(deviations) => Some(deviations),
        Err(err) => {
            tracing::warn!(error = %err, "DSGE path failed, falling back to reduced-form engine");
            None
        }
    });

    let confidence = if dsge_overlay.is_some() {
        ConfidenceLevel::High
    } else {
        ConfidenceLevel::Medium
    };
    let model_version = if dsge_overlay.is_some() { "1.0.0" } else { "1.0.0-reduced" };

    if let Some(deviations) = &dsge_overlay {
        for h in horizon_fiscal.iter_mut() {
            if let Some(&(_, deviation)) = deviations.iter().find(|(year, _)| *year == h.year) {
                let gdp_impact_eur_m = deviation * base.gdp;
                h.gdp_impact_eur_m = gdp_impact_eur_m;
                h.impact.gdp_pct = deviation * 100.0;
                h.impact.employment_change = deviation * 0.5 * base.employment_total;
                h.impact.inflation_pp = deviation * 100.0 * 0.3;
            }
        }
    }

    let horizon_impacts: Vec<HorizonImpact> = horizon_fiscal.iter().map(|h| h.impact).collect();
    let regional = regional_impacts(&horizon_fiscal);
    let investment = investment_impacts(shock, &horizon_fiscal);

    let mult_transfers = params.get("fiscal_multiplier_transfers").unwrap_or(0.8);
    let mult_consumption = params.get("fiscal_multiplier_consumption").unwrap_or(1.1);
    let mult_investment = params.get("fiscal_multiplier_investment").unwrap_or(1.3);
    let investment_years: Vec<u32> = horizon_fiscal.iter().map(|h| h.year).collect();

    let (winners, losers) = identify_winners_losers(&first_round);

    Ok(SimulationResult {
        scenario_id,
        title: "Fiscal policy simulation".to_string(),
        policy_changes: describe_policy_changes(shock),
        horizon_impacts,
        regional_impacts: regional,
        investment_impacts: investment,
        model_name: "Latvia Fiscal DSGE Model".to_string(),
        model_version: model_version.to_string(),
        confidence,
        assumptions: reduced_form_assumptions(),
        caveats: reduced_form_caveats(),
        causal_chain: build_causal_chain(shock, &first_round),
        key_drivers: key_drivers(mult_transfers, mult_consumption, mult_investment, &investment_years),
        winners,
        losers,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_shock_completes_and_confidence_is_medium_without_a_dsge_path() {
        let params = ParameterSet::default();
        let run = run(
            FiscalShock::ZERO,
            &params,
            "hash".to_string(),
            "s1".to_string(),
            None,
            DEFAULT_TIMEOUT,
        )
        .unwrap();

        assert_eq!(run.status, dsge_model::SimulationStatus::Completed);
        let result = run.result.unwrap();
        assert_eq!(result.confidence, ConfidenceLevel::Medium);
        assert!(result.model_version.ends_with("-reduced"));
        assert_eq!(result.horizon_impacts.len(), HORIZONS.len());
    }

    #[test]
    fn a_timed_out_deadline_fails_the_run() {
        let params = ParameterSet::default();
        let err = run(
            FiscalShock::ZERO,
            &params,
            "hash".to_string(),
            "s1".to_string(),
            None,
            Duration::from_secs(0),
        )
        .unwrap_err();
        assert!(matches!(err, OrchestratorError::Timeout(_)));
    }

    #[test]
    fn nontrivial_shock_produces_regional_and_investment_breakdowns() {
        let params = ParameterSet::default();
        let shock = FiscalShock {
            delta_transfers: -200.0,
            ..FiscalShock::ZERO
        };
        let run = run(
            shock,
            &params,
            "hash".to_string(),
            "s1".to_string(),
            None,
            DEFAULT_TIMEOUT,
        )
        .unwrap();
        let result = run.result.unwrap();
        assert_eq!(result.regional_impacts.len(), HORIZONS.len() * 6);
        assert_eq!(result.investment_impacts.len(), HORIZONS.len());
        assert!(!result.winners.is_empty());
        assert!(!result.losers.is_empty());
    }
}
