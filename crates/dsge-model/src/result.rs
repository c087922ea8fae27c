//! Simulation results: horizon/regional/investment impacts and the
//! narrative slots attached to them.

use serde::{Deserialize, Serialize};

/// How much the Orchestrator trusts a result, derived from which solution
/// path produced it and whether financial-block telemetry flagged gaps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConfidenceLevel {
    /// Full Gensys/IRF path, `eu = (1,1)`, no telemetry gaps.
    High,
    /// Reduced-form Fiscal Impact Engine (MVP) path.
    Medium,
    /// Full or reduced-form path, but the parameter audit reported
    /// unresolved financial-block calibration gaps.
    Low,
}

/// Macro aggregates at one policy-relevant horizon year.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HorizonImpact {
    /// Horizon year (one of `{1, 5, 15}`, §9).
    pub year: u32,
    /// Change in the budget balance (EUR millions).
    pub budget_balance: f64,
    /// Change in government revenues (EUR millions).
    pub revenues: f64,
    /// Change in government expenditures (EUR millions).
    pub expenditures: f64,
    /// GDP change, in percent of baseline GDP.
    pub gdp_pct: f64,
    /// Change in employment (persons).
    pub employment_change: f64,
    /// Inflation change, in percentage points.
    pub inflation_pp: f64,
}

/// Direction of a region's response, derived from the sign of its
/// employment change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ImpactDirection {
    /// Employment change is positive beyond a small neutral band.
    Increase,
    /// Employment change is negative beyond a small neutral band.
    Decrease,
    /// Employment change is within the neutral band.
    Neutral,
}

/// Regional allocation of the national aggregates for one horizon year.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegionalImpact {
    /// Region name.
    pub region: String,
    /// Horizon year.
    pub year: u32,
    /// Region's share of the national GDP change (EUR millions).
    pub gdp_change: f64,
    /// Region's share of the national employment change (persons).
    pub employment_change: f64,
    /// Direction derived from the sign of `employment_change`.
    pub direction: ImpactDirection,
}

/// Investment decomposition for one horizon year.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct InvestmentImpact {
    /// Horizon year.
    pub year: u32,
    /// Public investment component (EUR millions).
    pub public: f64,
    /// Private investment component (EUR millions).
    pub private: f64,
    /// Foreign direct investment component (EUR millions).
    pub fdi: f64,
}

/// The full result of one simulation run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulationResult {
    /// Stable identifier of the scenario (distinct from the run's UUID).
    pub scenario_id: String,
    /// Short human-readable title.
    pub title: String,
    /// Plain-language description of the policy changes simulated.
    pub policy_changes: Vec<String>,
    /// Horizon impacts, one per entry in the horizon set.
    pub horizon_impacts: Vec<HorizonImpact>,
    /// Regional impacts, one per `(region, year)` pair.
    pub regional_impacts: Vec<RegionalImpact>,
    /// Investment decomposition, one per horizon year.
    pub investment_impacts: Vec<InvestmentImpact>,
    /// Name of the model that produced this result.
    pub model_name: String,
    /// Model/path version string. Carries a `-reduced` suffix when the
    /// reduced-form fallback path produced the result (§4.8).
    pub model_version: String,
    /// Confidence level.
    pub confidence: ConfidenceLevel,
    /// Modeling assumptions surfaced to the caller.
    pub assumptions: Vec<String>,
    /// Caveats, including non-fatal parameter-audit telemetry.
    pub caveats: Vec<String>,
    /// Causal-chain narrative steps.
    pub causal_chain: Vec<String>,
    /// Key drivers of the result.
    pub key_drivers: Vec<String>,
    /// Groups that benefit from the policy.
    pub winners: Vec<String>,
    /// Groups that bear the cost of the policy.
    pub losers: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn confidence_levels_are_distinct() {
        assert_ne!(ConfidenceLevel::High, ConfidenceLevel::Medium);
        assert_ne!(ConfidenceLevel::Medium, ConfidenceLevel::Low);
    }
}
