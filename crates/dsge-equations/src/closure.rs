//! Variable/shock closure inference.
//!
//! Grounded on `build_linear_system.py`'s `_collect_variables`/
//! `_collect_shocks`: absent an explicit allowlist, the endogenous variable
//! set is the closure of every shift-0 symbol appearing in any equation,
//! minus parameter names and shock names.

use crate::equation::Equation;
use dsge_model::ParameterSet;
use std::collections::BTreeSet;

/// A symbol name is a shock iff it carries the `eps_` prefix — the
/// convention every AR(1) innovation in the model follows.
pub fn is_shock_name(name: &str) -> bool {
    name.starts_with("eps_")
}

/// Infer the endogenous variable closure: every shift-0 symbol across all
/// equations that is neither a known parameter nor a shock, sorted for a
/// stable ordering (the order Jacobian columns are assigned in).
pub fn infer_variables(equations: &[Equation], params: &ParameterSet) -> Vec<String> {
    let mut names: BTreeSet<String> = BTreeSet::new();
    for eq in equations {
        let mut symbols = Vec::new();
        eq.residual.collect_symbols(&mut symbols);
        for (name, shift) in symbols {
            if shift != 0 {
                continue;
            }
            if params.get(&name).is_some() || is_shock_name(&name) {
                continue;
            }
            names.insert(name);
        }
    }
    names.into_iter().collect()
}

/// Infer the shock closure: every symbol (at any shift) matching
/// [`is_shock_name`], sorted.
pub fn infer_shocks(equations: &[Equation]) -> Vec<String> {
    let mut names: BTreeSet<String> = BTreeSet::new();
    for eq in equations {
        let mut symbols = Vec::new();
        eq.residual.collect_symbols(&mut symbols);
        for (name, _shift) in symbols {
            if is_shock_name(&name) {
                names.insert(name);
            }
        }
    }
    names.into_iter().collect()
}

/// Every symbol across all equations that resolves to a known parameter —
/// the complement of [`infer_variables`]'s parameter exclusion. Feeds the
/// Parameter Store's completeness audit (`dsge-params::audit`), which
/// cross-references this set against what the store actually holds.
pub fn consumed_parameters(equations: &[Equation], params: &ParameterSet) -> BTreeSet<String> {
    let mut names: BTreeSet<String> = BTreeSet::new();
    for eq in equations {
        let mut symbols = Vec::new();
        eq.residual.collect_symbols(&mut symbols);
        for (name, _shift) in symbols {
            if params.get(&name).is_some() {
                names.insert(name);
            }
        }
    }
    names
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::equation::EquationSection;
    use crate::node::Node;
    use dsge_model::{Parameter, ParameterCategory};

    #[test]
    fn infers_variables_excluding_parameters_and_shocks() {
        let mut params = ParameterSet::default();
        params.insert("beta", Parameter::new(0.995, ParameterCategory::Preference));

        let eq = Equation::new(
            "euler",
            EquationSection::Behavioral,
            Node::sym("c")
                .sub(Node::sym("beta"))
                .add(Node::sym("eps_c")),
        );

        let vars = infer_variables(&[eq.clone()], &params);
        assert_eq!(vars, vec!["c".to_string()]);

        let shocks = infer_shocks(&[eq]);
        assert_eq!(shocks, vec!["eps_c".to_string()]);
    }

    #[test]
    fn lagged_and_led_references_do_not_introduce_new_variables_at_shift_zero() {
        let params = ParameterSet::default();
        let eq = Equation::new(
            "ar1",
            EquationSection::ShockProcess,
            Node::sym("k").sub(Node::sym_shift("k", -1)),
        );
        let vars = infer_variables(&[eq], &params);
        assert_eq!(vars, vec!["k".to_string()]);
    }

    #[test]
    fn consumed_parameters_picks_out_only_bound_names() {
        let mut params = ParameterSet::default();
        params.insert("beta", Parameter::new(0.995, ParameterCategory::Preference));

        let eq = Equation::new(
            "euler",
            EquationSection::Behavioral,
            Node::sym("c")
                .sub(Node::sym("beta"))
                .add(Node::sym("eps_c")),
        );

        let consumed = consumed_parameters(&[eq], &params);
        assert_eq!(consumed.len(), 1);
        assert!(consumed.contains("beta"));
    }
}
