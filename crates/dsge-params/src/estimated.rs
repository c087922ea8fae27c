//! Parsing of the estimated-parameters file: each value is either a bare
//! scalar or a `{mode, mean, std, prior}` record. Only `mode` is ever
//! consumed (§6).

use crate::error::{ParameterError, Result};
use crate::source::{ParameterEntry, ParameterSource, SourceTier};
use dsge_model::ParameterCategory;
use serde::Deserialize;
use std::collections::BTreeMap;

/// One raw entry as it appears in the YAML file, before the `mode`-only
/// projection.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
enum RawEstimatedValue {
    Scalar(f64),
    Full {
        mode: f64,
        #[allow(dead_code)]
        mean: f64,
        #[allow(dead_code)]
        std: f64,
        #[allow(dead_code)]
        prior: String,
    },
}

/// Parse a YAML document of `name -> (scalar | {mode,mean,std,prior})`
/// records into an `Estimated`-tier `ParameterSource`.
///
/// All parsed entries are tagged `ParameterCategory::FiscalRate` by default
/// unless `categories` supplies an explicit category for a name; estimated
/// parameters in this model are overwhelmingly fiscal-rate persistence and
/// Taylor-rule coefficients.
pub fn parse_estimated(
    yaml: &str,
    categories: &BTreeMap<String, ParameterCategory>,
) -> Result<ParameterSource> {
    let raw: BTreeMap<String, RawEstimatedValue> = serde_yaml::from_str(yaml)?;

    let mut source = ParameterSource::new(SourceTier::Estimated);
    for (name, value) in raw {
        let mode = match value {
            RawEstimatedValue::Scalar(v) => v,
            RawEstimatedValue::Full { mode, .. } => mode,
        };
        if !mode.is_finite() {
            return Err(ParameterError::MalformedEstimated { name });
        }
        let category = categories
            .get(&name)
            .copied()
            .unwrap_or(ParameterCategory::FiscalRate);
        source.insert(name, ParameterEntry::new(mode, category));
    }
    Ok(source)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scalar_entries_pass_through() {
        let yaml = "rho_g: 0.8\nphi_pi: 1.5\n";
        let source = parse_estimated(yaml, &BTreeMap::new()).unwrap();
        assert_eq!(source.entries.get("rho_g").unwrap().value, 0.8);
        assert_eq!(source.entries.get("phi_pi").unwrap().value, 1.5);
    }

    #[test]
    fn only_mode_is_consumed_from_full_records() {
        let yaml = "phi_pi:\n  mode: 1.45\n  mean: 1.5\n  std: 0.1\n  prior: normal\n";
        let source = parse_estimated(yaml, &BTreeMap::new()).unwrap();
        assert_eq!(source.entries.get("phi_pi").unwrap().value, 1.45);
    }

    #[test]
    fn explicit_category_overrides_default() {
        let yaml = "rho_a: 0.9\n";
        let mut categories = BTreeMap::new();
        categories.insert("rho_a".to_string(), ParameterCategory::ShockProcess);
        let source = parse_estimated(yaml, &categories).unwrap();
        assert_eq!(
            source.entries.get("rho_a").unwrap().category,
            ParameterCategory::ShockProcess
        );
    }
}
