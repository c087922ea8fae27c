//! Parameter completeness audit: cross-references the names the Equation
//! Library consumes against the names the Parameter Store actually holds.
//!
//! Grounded on `original_source/dsge_latvia/.../parameter_audit.py`. This is
//! telemetry, not a hard gate (§4.1 supplement): the Orchestrator logs a
//! non-empty audit at `warn` and records it in `SimulationResult::caveats`
//! rather than failing the run.

use dsge_model::ParameterSet;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// One discrepancy found by the audit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ParamIssue {
    /// A name the Equation Library consumes is absent from the parameter
    /// set.
    Missing {
        /// The missing name.
        name: String,
    },
    /// A name present in the parameter set is never referenced by any
    /// equation, suggesting a stale or mis-keyed calibration entry.
    Unregistered {
        /// The unreferenced name.
        name: String,
    },
}

/// Compare the set of parameter names an `EquationLibrary` reports
/// consuming against what `set` holds.
pub fn build_param_issues(consumed: &BTreeSet<String>, set: &ParameterSet) -> Vec<ParamIssue> {
    let available: BTreeSet<String> = set.names().map(str::to_string).collect();

    let mut issues: Vec<ParamIssue> = consumed
        .difference(&available)
        .map(|name| ParamIssue::Missing { name: name.clone() })
        .collect();

    issues.extend(
        available
            .difference(consumed)
            .map(|name| ParamIssue::Unregistered { name: name.clone() }),
    );

    issues
}

#[cfg(test)]
mod tests {
    use super::*;
    use dsge_model::{Parameter, ParameterCategory};

    #[test]
    fn flags_missing_and_unregistered_names() {
        let mut set = ParameterSet::default();
        set.insert("beta", Parameter::new(0.995, ParameterCategory::Preference));
        set.insert("unused_param", Parameter::new(1.0, ParameterCategory::Technology));

        let consumed: BTreeSet<String> = ["beta", "alpha"].into_iter().map(String::from).collect();
        let issues = build_param_issues(&consumed, &set);

        assert!(issues.contains(&ParamIssue::Missing {
            name: "alpha".to_string()
        }));
        assert!(issues.contains(&ParamIssue::Unregistered {
            name: "unused_param".to_string()
        }));
        assert_eq!(issues.len(), 2);
    }

    #[test]
    fn perfectly_matched_set_has_no_issues() {
        let mut set = ParameterSet::default();
        set.insert("beta", Parameter::new(0.995, ParameterCategory::Preference));
        let consumed: BTreeSet<String> = ["beta"].into_iter().map(String::from).collect();

        assert!(build_param_issues(&consumed, &set).is_empty());
    }
}
