//! Calibration parameters: the immutable named constants that feed every
//! other component.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Category a calibration parameter belongs to.
///
/// Purely descriptive metadata; it does not gate how a parameter is used,
/// only how it is reported (audits, CLI output).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParameterCategory {
    /// Household/firm preference parameters (discount factor, risk aversion).
    Preference,
    /// Production-technology parameters (capital share, depreciation).
    Technology,
    /// Tax and transfer rates.
    FiscalRate,
    /// Debt, spending, and other fiscal ratios to GDP.
    FiscalRatio,
    /// AR(1)/shock-process persistence and volatility.
    ShockProcess,
    /// Foreign-sector/small-open-economy parameters.
    ForeignBlock,
}

/// A single named, immutable calibration constant.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Parameter {
    /// Numeric value.
    pub value: f64,
    /// Descriptive category.
    pub category: ParameterCategory,
}

impl Parameter {
    /// Construct a new parameter.
    pub const fn new(value: f64, category: ParameterCategory) -> Self {
        Self { value, category }
    }
}

/// An estimated-parameter record as it appears in the estimated-parameters
/// file: `{mode, mean, std, prior}`. Only `mode` is ever consumed (§6).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EstimatedParameter {
    /// Posterior mode — the only field the Parameter Store reads.
    pub mode: f64,
    /// Posterior mean (carried through for reporting, unused in computation).
    pub mean: f64,
    /// Posterior standard deviation (carried through, unused in computation).
    pub std: f64,
    /// Prior distribution name (carried through, unused in computation).
    pub prior: String,
}

/// Read-only, merged view over all calibration parameters for one run.
///
/// Constructed once by `dsge-params::ParameterStore::merge` and passed by
/// reference into every downstream phase; never mutated after construction.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ParameterSet {
    values: BTreeMap<String, Parameter>,
}

impl ParameterSet {
    /// Build a parameter set directly from a map (primarily for tests).
    pub fn from_map(values: BTreeMap<String, Parameter>) -> Self {
        Self { values }
    }

    /// Look up a parameter's numeric value by name.
    pub fn get(&self, name: &str) -> Option<f64> {
        self.values.get(name).map(|p| p.value)
    }

    /// Look up a parameter's full record (value + category) by name.
    pub fn get_full(&self, name: &str) -> Option<&Parameter> {
        self.values.get(name)
    }

    /// Number of loaded parameters.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether the set holds no parameters.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Iterate over all `(name, parameter)` pairs in a stable, sorted order —
    /// used for canonical serialization when computing the parameter
    /// fingerprint used by the sub-result cache.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Parameter)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Names of all loaded parameters, in sorted order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(String::as_str)
    }

    /// Insert or overwrite a parameter. Used only during the merge phase in
    /// `dsge-params`; once handed to downstream components the set is never
    /// mutated again.
    pub fn insert(&mut self, name: impl Into<String>, parameter: Parameter) {
        self.values.insert(name.into(), parameter);
    }
}
