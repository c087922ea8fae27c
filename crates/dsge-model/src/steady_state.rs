//! The deterministic balanced-growth path the model is linearized around.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A fully populated steady state.
///
/// Levels are normalized to `output = 1`. In addition to the nine core
/// simultaneous unknowns (output, consumption, investment, exports,
/// government consumption, capital, wage, rental rate, marginal cost) this
/// carries the financial-accelerator and labor-search blocks computed in
/// closed form from them (see `dsge-solve::steady_state`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SteadyState {
    /// Output, normalized to 1.0.
    pub output: f64,
    /// Private consumption.
    pub consumption: f64,
    /// Private investment.
    pub investment: f64,
    /// Exports.
    pub exports: f64,
    /// Imports (derived from Armington shares).
    pub imports: f64,
    /// Government consumption.
    pub gov_consumption: f64,
    /// Capital stock.
    pub capital: f64,
    /// Public capital stock.
    pub public_capital: f64,
    /// Real wage.
    pub wage: f64,
    /// Capital rental rate.
    pub rental_rate: f64,
    /// Real marginal cost.
    pub marginal_cost: f64,
    /// Public debt.
    pub public_debt: f64,
    /// Total transfers (before the `tau_r_tr` split).
    pub transfers: f64,
    /// Transfers routed through the pension-pillar channel.
    pub transfers_pillar: f64,
    /// Transfers routed through the general channel.
    pub transfers_general: f64,

    /// BGG default threshold `ω̄`, from the inverse normal CDF of the
    /// calibrated steady-state default probability.
    pub omega_bar: f64,
    /// Monitoring-cost-adjusted share to entrepreneurs, `G(ω̄)`.
    pub g_omega_bar: f64,
    /// Monitoring-cost-adjusted share to lenders, `Γ(ω̄)`.
    pub gamma_omega_bar: f64,
    /// Entrepreneurial net worth.
    pub net_worth: f64,
    /// Net worth as a share of the capital stock it finances.
    pub net_worth_ratio: f64,
    /// Transfer to entrepreneurs implied by the net-worth law of motion.
    pub transfer_entrepreneurs: f64,
    /// Share of the financed project's gross return going to banks.
    pub share_to_banks: f64,
    /// Gross return on capital over the riskless rate (external finance
    /// premium proxy); must be `>= 1`.
    pub gross_return_ratio: f64,

    /// Job-finding rate in the search-and-matching labor block.
    pub job_finding_rate: f64,
    /// Vacancy-fill rate.
    pub vacancy_fill_rate: f64,
    /// Labor-market tightness (vacancies / searching workers).
    pub market_tightness: f64,

    /// Residuals of every steady-state equation, keyed by a stable name, as
    /// last computed by `compute_residuals`. Empty until residuals have been
    /// evaluated at least once.
    pub residuals: BTreeMap<String, f64>,
}

impl SteadyState {
    /// Every named level as a `{name: value}` map, keyed by the same names
    /// as this struct's fields (`residuals` excluded). This is the binding
    /// point the Linearizer's `steady_state_levels` argument expects: the
    /// Equation Library's symbols are written against these same canonical
    /// names.
    pub fn levels(&self) -> BTreeMap<String, f64> {
        BTreeMap::from([
            ("output".to_string(), self.output),
            ("consumption".to_string(), self.consumption),
            ("investment".to_string(), self.investment),
            ("exports".to_string(), self.exports),
            ("imports".to_string(), self.imports),
            ("gov_consumption".to_string(), self.gov_consumption),
            ("capital".to_string(), self.capital),
            ("public_capital".to_string(), self.public_capital),
            ("wage".to_string(), self.wage),
            ("rental_rate".to_string(), self.rental_rate),
            ("marginal_cost".to_string(), self.marginal_cost),
            ("public_debt".to_string(), self.public_debt),
            ("transfers".to_string(), self.transfers),
            ("transfers_pillar".to_string(), self.transfers_pillar),
            ("transfers_general".to_string(), self.transfers_general),
            ("omega_bar".to_string(), self.omega_bar),
            ("g_omega_bar".to_string(), self.g_omega_bar),
            ("gamma_omega_bar".to_string(), self.gamma_omega_bar),
            ("net_worth".to_string(), self.net_worth),
            ("net_worth_ratio".to_string(), self.net_worth_ratio),
            ("transfer_entrepreneurs".to_string(), self.transfer_entrepreneurs),
            ("share_to_banks".to_string(), self.share_to_banks),
            ("gross_return_ratio".to_string(), self.gross_return_ratio),
            ("job_finding_rate".to_string(), self.job_finding_rate),
            ("vacancy_fill_rate".to_string(), self.vacancy_fill_rate),
            ("market_tightness".to_string(), self.market_tightness),
        ])
    }

    /// Maximum absolute residual across all entries not present in
    /// `exempt`, together with the name that attained it. Returns `(0.0, "")`
    /// if every residual is exempted or none are recorded.
    pub fn max_residual(&self, exempt: &[String]) -> (f64, String) {
        self.residuals
            .iter()
            .filter(|(name, _)| !exempt.iter().any(|e| e == *name))
            .map(|(name, value)| (value.abs(), name.clone()))
            .fold((0.0, String::new()), |acc, cur| {
                if cur.0 > acc.0 { cur } else { acc }
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> SteadyState {
        let mut residuals = BTreeMap::new();
        residuals.insert("resource_wedge".to_string(), 1.0e-3);
        residuals.insert("wage_eq".to_string(), 2.0e-11);
        residuals.insert("capital_eq".to_string(), 5.0e-11);

        SteadyState {
            output: 1.0,
            consumption: 0.6,
            investment: 0.2,
            exports: 0.3,
            imports: 0.1,
            gov_consumption: 0.2,
            capital: 9.0,
            public_capital: 1.0,
            wage: 1.8,
            rental_rate: 0.03,
            marginal_cost: 0.83,
            public_debt: 0.4,
            transfers: 0.1,
            transfers_pillar: 0.04,
            transfers_general: 0.06,
            omega_bar: 0.5,
            g_omega_bar: 0.2,
            gamma_omega_bar: 0.18,
            net_worth: 0.4,
            net_worth_ratio: 0.35,
            transfer_entrepreneurs: 0.01,
            share_to_banks: 0.6,
            gross_return_ratio: 1.02,
            job_finding_rate: 0.4,
            vacancy_fill_rate: 0.7,
            market_tightness: 0.6,
            residuals,
        }
    }

    #[test]
    fn max_residual_excludes_exempt_entries() {
        let ss = sample();
        let (max, key) = ss.max_residual(&["resource_wedge".to_string()]);
        assert_eq!(key, "capital_eq");
        assert!((max - 5.0e-11).abs() < 1.0e-20);
    }

    #[test]
    fn max_residual_includes_everything_with_no_exemptions() {
        let ss = sample();
        let (max, key) = ss.max_residual(&[]);
        assert_eq!(key, "resource_wedge");
        assert!((max - 1.0e-3).abs() < 1.0e-12);
    }
}
