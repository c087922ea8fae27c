//! Calibration sources and their merge priority.

use dsge_model::ParameterCategory;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Priority tier of a calibration source, in merge order (lowest first).
///
/// §4.1: "non-fiscal calibrated, fiscal calibrated, then estimated
/// (posterior mode)".
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceTier {
    /// Calibrated parameters outside the fiscal block (preferences,
    /// technology, shock processes, foreign block).
    NonFiscalCalibrated,
    /// Calibrated fiscal rates and ratios.
    FiscalCalibrated,
    /// Estimated (posterior-mode) parameters.
    Estimated,
}

impl fmt::Display for SourceTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::NonFiscalCalibrated => "non_fiscal_calibrated",
            Self::FiscalCalibrated => "fiscal_calibrated",
            Self::Estimated => "estimated",
        };
        f.write_str(s)
    }
}

/// One entry within a calibration source.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ParameterEntry {
    /// Numeric value (the posterior mode, for estimated entries).
    pub value: f64,
    /// Descriptive category.
    pub category: ParameterCategory,
    /// Whether this entry is explicitly marked to override any value bound
    /// by a lower-priority source, bypassing the conflict check.
    pub is_override: bool,
}

impl ParameterEntry {
    /// Construct a non-overriding entry.
    pub const fn new(value: f64, category: ParameterCategory) -> Self {
        Self {
            value,
            category,
            is_override: false,
        }
    }

    /// Construct an overriding entry.
    pub const fn overriding(value: f64, category: ParameterCategory) -> Self {
        Self {
            value,
            category,
            is_override: true,
        }
    }
}

/// A flat map of calibration entries at one priority tier.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParameterSource {
    /// Priority tier.
    pub tier: SourceTier,
    /// Named entries.
    pub entries: BTreeMap<String, ParameterEntry>,
}

impl ParameterSource {
    /// Construct an empty source at the given tier.
    pub fn new(tier: SourceTier) -> Self {
        Self {
            tier,
            entries: BTreeMap::new(),
        }
    }

    /// Insert or overwrite an entry within this source (not to be confused
    /// with cross-source merge override semantics).
    pub fn insert(&mut self, name: impl Into<String>, entry: ParameterEntry) -> &mut Self {
        self.entries.insert(name.into(), entry);
        self
    }
}
