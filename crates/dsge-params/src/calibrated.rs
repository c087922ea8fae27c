//! Parsing of the non-fiscal/fiscal calibrated parameter files: each is a
//! flat `name: value` YAML map, unlike the estimated file's
//! `{mode, mean, std, prior}` records.
//!
//! Grounded on `original_source/dsge_latvia/.../steady_state.py::load_parameters`'s
//! four-file merge, restricted here to its two calibrated (non-estimated)
//! sources.

use crate::error::{ParameterError, Result};
use crate::source::{ParameterEntry, ParameterSource, SourceTier};
use dsge_model::ParameterCategory;
use std::collections::BTreeMap;

/// Parse a YAML document of `name -> value` scalars into a `ParameterSource`
/// at `tier`, tagging every entry `default_category` unless `categories`
/// supplies an explicit override for that name.
pub fn parse_calibrated(
    yaml: &str,
    tier: SourceTier,
    default_category: ParameterCategory,
    categories: &BTreeMap<String, ParameterCategory>,
) -> Result<ParameterSource> {
    let raw: BTreeMap<String, f64> = serde_yaml::from_str(yaml)?;

    let mut source = ParameterSource::new(tier);
    for (name, value) in raw {
        if !value.is_finite() {
            return Err(ParameterError::MalformedEstimated { name });
        }
        let category = categories.get(&name).copied().unwrap_or(default_category);
        source.insert(name, ParameterEntry::new(value, category));
    }
    Ok(source)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scalars_are_tagged_with_the_default_category() {
        let yaml = "beta: 0.995\nalpha: 0.35\n";
        let source = parse_calibrated(
            yaml,
            SourceTier::NonFiscalCalibrated,
            ParameterCategory::Preference,
            &BTreeMap::new(),
        )
        .unwrap();
        assert_eq!(source.tier, SourceTier::NonFiscalCalibrated);
        assert_eq!(source.entries.get("beta").unwrap().category, ParameterCategory::Preference);
        assert_eq!(source.entries.get("alpha").unwrap().value, 0.35);
    }

    #[test]
    fn explicit_category_overrides_the_default() {
        let yaml = "tau_c: 0.21\n";
        let mut categories = BTreeMap::new();
        categories.insert("tau_c".to_string(), ParameterCategory::FiscalRate);
        let source = parse_calibrated(
            yaml,
            SourceTier::FiscalCalibrated,
            ParameterCategory::FiscalRatio,
            &categories,
        )
        .unwrap();
        assert_eq!(source.entries.get("tau_c").unwrap().category, ParameterCategory::FiscalRate);
    }
}
