//! Regional allocation: distributes a national horizon impact across
//! Latvia's six planning regions by a fixed employment-share weight.
//!
//! Grounded on `original_source/.../dsge_simulation_engine.py`'s
//! `REGION_WEIGHTS` map and the regional-breakdown loop in `simulate()`.

use crate::multiplier::HorizonFiscalImpact;
use dsge_model::{ImpactDirection, RegionalImpact};

/// Fixed employment-share weight used to allocate national aggregates to
/// each region. Sums to 1.0.
pub const REGION_WEIGHTS: [(&str, f64); 6] = [
    ("Riga", 0.42),
    ("Pieriga", 0.18),
    ("Kurzeme", 0.12),
    ("Zemgale", 0.09),
    ("Vidzeme", 0.10),
    ("Latgale", 0.09),
];

/// Employment change below this (in persons) is reported as `Neutral`
/// rather than `Increase`/`Decrease`, matching the original's
/// round-to-integer-job treatment of a near-zero allocation.
const NEUTRAL_BAND: f64 = 0.5;

fn direction(employment_change: f64) -> ImpactDirection {
    if employment_change > NEUTRAL_BAND {
        ImpactDirection::Increase
    } else if employment_change < -NEUTRAL_BAND {
        ImpactDirection::Decrease
    } else {
        ImpactDirection::Neutral
    }
}

/// Distribute every horizon's national GDP and employment change across
/// the six regions by [`REGION_WEIGHTS`].
pub fn regional_impacts(horizons: &[HorizonFiscalImpact]) -> Vec<RegionalImpact> {
    let mut out = Vec::with_capacity(horizons.len() * REGION_WEIGHTS.len());
    for horizon in horizons {
        for &(region, weight) in &REGION_WEIGHTS {
            let gdp_change = horizon.gdp_impact_eur_m * weight;
            let employment_change = horizon.impact.employment_change * weight;
            out.push(RegionalImpact {
                region: region.to_string(),
                year: horizon.year,
                gdp_change,
                employment_change,
                direction: direction(employment_change),
            });
        }
    }
    out
}
