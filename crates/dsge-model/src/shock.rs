//! The fiscal shock record produced by the (external) policy-text parser.

use serde::{Deserialize, Serialize};

/// An additive perturbation to the fiscal block, expressed in EUR millions
/// for spending items and percentage points for tax-rate items.
///
/// Immutable once constructed; consumed by the Fiscal Impact Engine and,
/// when a full solver path is available, by the Gensys/IRF pipeline via the
/// shock-process block of the Equation Library.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FiscalShock {
    /// Change in transfers (EUR millions).
    pub delta_transfers: f64,
    /// Change in government consumption (EUR millions).
    pub delta_gov_consumption: f64,
    /// Change in government investment (EUR millions).
    pub delta_gov_investment: f64,
    /// Change in the consumption-tax rate (percentage points).
    pub delta_tau_c: f64,
    /// Change in the income-tax rate (percentage points).
    pub delta_tau_y: f64,
    /// Change in the employee social-contribution rate (percentage points).
    pub delta_tau_we: f64,
    /// Change in the employer social-contribution rate (percentage points).
    pub delta_tau_ww: f64,
    /// Seed for the reduced-form engine's illustrative random generator.
    ///
    /// The DSGE path never consults this (§9: "the DSGE path is fully
    /// deterministic"); it exists only so the reduced-form mock path can be
    /// reproduced bit-for-bit across implementations when it needs to
    /// decorate a result with illustrative noise.
    pub rng_seed: Option<u64>,
}

impl FiscalShock {
    /// The all-zero shock: every horizon impact it produces must be zero
    /// (§8, idempotence property).
    pub const ZERO: Self = Self {
        delta_transfers: 0.0,
        delta_gov_consumption: 0.0,
        delta_gov_investment: 0.0,
        delta_tau_c: 0.0,
        delta_tau_y: 0.0,
        delta_tau_we: 0.0,
        delta_tau_ww: 0.0,
        rng_seed: None,
    };

    /// Whether every field of the shock is exactly zero.
    pub const fn is_zero(&self) -> bool {
        self.delta_transfers == 0.0
            && self.delta_gov_consumption == 0.0
            && self.delta_gov_investment == 0.0
            && self.delta_tau_c == 0.0
            && self.delta_tau_y == 0.0
            && self.delta_tau_we == 0.0
            && self.delta_tau_ww == 0.0
    }
}

impl Default for FiscalShock {
    fn default() -> Self {
        Self::ZERO
    }
}
