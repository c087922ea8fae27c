//! Merging calibration sources into one immutable `ParameterSet`.

use crate::error::{ParameterError, Result};
use crate::source::ParameterSource;
use dsge_model::{Parameter, ParameterSet};

/// Merge calibration sources into one `ParameterSet`.
///
/// Sources are applied in ascending `SourceTier` order (non-fiscal
/// calibrated, then fiscal calibrated, then estimated) regardless of the
/// order they are passed in, matching §4.1's fixed priority. A later source
/// may rebind a name already bound by an earlier one only if the new
/// entry differs by at most `1e-12`, or is explicitly marked as an
/// override.
pub fn merge(sources: &[ParameterSource]) -> Result<ParameterSet> {
    const CONFLICT_TOLERANCE: f64 = 1.0e-12;

    let mut ordered: Vec<&ParameterSource> = sources.iter().collect();
    ordered.sort_by_key(|s| s.tier);

    let mut set = ParameterSet::default();
    let mut bound_by: std::collections::HashMap<String, (f64, crate::source::SourceTier)> =
        std::collections::HashMap::new();

    for source in ordered {
        for (name, entry) in &source.entries {
            if let Some((existing_value, existing_tier)) = bound_by.get(name) {
                let differs = (existing_value - entry.value).abs() > CONFLICT_TOLERANCE;
                if differs && !entry.is_override {
                    return Err(ParameterError::ParameterConflict {
                        name: name.clone(),
                        first: *existing_value,
                        first_tier: existing_tier.to_string(),
                        second: entry.value,
                        second_tier: source.tier.to_string(),
                    });
                }
            }
            bound_by.insert(name.clone(), (entry.value, source.tier));
            set.insert(name.clone(), Parameter::new(entry.value, entry.category));
        }
    }

    Ok(set)
}

/// Look up a parameter, surfacing `MissingParameter` rather than `None`.
pub fn require(set: &ParameterSet, name: &str) -> Result<f64> {
    set.get(name).ok_or_else(|| ParameterError::MissingParameter {
        name: name.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::{ParameterEntry, SourceTier};
    use dsge_model::ParameterCategory;

    #[test]
    fn later_tier_wins_when_values_agree() {
        let mut non_fiscal = ParameterSource::new(SourceTier::NonFiscalCalibrated);
        non_fiscal.insert("beta", ParameterEntry::new(0.995, ParameterCategory::Preference));
        let mut estimated = ParameterSource::new(SourceTier::Estimated);
        estimated.insert("beta", ParameterEntry::new(0.995, ParameterCategory::Preference));

        let set = merge(&[non_fiscal, estimated]).unwrap();
        assert_eq!(set.get("beta"), Some(0.995));
    }

    #[test]
    fn conflicting_values_without_override_fail() {
        let mut non_fiscal = ParameterSource::new(SourceTier::NonFiscalCalibrated);
        non_fiscal.insert("beta", ParameterEntry::new(0.995, ParameterCategory::Preference));
        let mut estimated = ParameterSource::new(SourceTier::Estimated);
        estimated.insert("beta", ParameterEntry::new(0.990, ParameterCategory::Preference));

        let err = merge(&[non_fiscal, estimated]).unwrap_err();
        assert!(matches!(err, ParameterError::ParameterConflict { .. }));
    }

    #[test]
    fn explicit_override_wins_despite_conflict() {
        let mut non_fiscal = ParameterSource::new(SourceTier::NonFiscalCalibrated);
        non_fiscal.insert("beta", ParameterEntry::new(0.995, ParameterCategory::Preference));
        let mut estimated = ParameterSource::new(SourceTier::Estimated);
        estimated.insert(
            "beta",
            ParameterEntry::overriding(0.990, ParameterCategory::Preference),
        );

        let set = merge(&[non_fiscal, estimated]).unwrap();
        assert_eq!(set.get("beta"), Some(0.990));
    }

    #[test]
    fn merge_order_is_independent_of_input_order() {
        let mut non_fiscal = ParameterSource::new(SourceTier::NonFiscalCalibrated);
        non_fiscal.insert("beta", ParameterEntry::new(0.995, ParameterCategory::Preference));
        let mut fiscal = ParameterSource::new(SourceTier::FiscalCalibrated);
        fiscal.insert("tau_c", ParameterEntry::new(0.21, ParameterCategory::FiscalRate));

        let a = merge(&[non_fiscal.clone(), fiscal.clone()]).unwrap();
        let b = merge(&[fiscal, non_fiscal]).unwrap();
        assert_eq!(a.get("beta"), b.get("beta"));
        assert_eq!(a.get("tau_c"), b.get("tau_c"));
    }

    #[test]
    fn require_surfaces_missing_parameter() {
        let set = ParameterSet::default();
        let err = require(&set, "beta").unwrap_err();
        assert!(matches!(err, ParameterError::MissingParameter { name } if name == "beta"));
    }
}
