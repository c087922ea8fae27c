//! The equation library: the full set of structural equations for one
//! model vintage, plus the variable/shock closure the Linearizer needs.

use crate::closure::{consumed_parameters, infer_shocks, infer_variables};
use crate::equation::{Equation, EquationSection};
use crate::eval::{Environment, UnboundSymbol};
use crate::node::Primitive;
use dsge_model::ParameterSet;
use std::collections::BTreeSet;
use thiserror::Error;

/// Errors raised while assembling an `EquationLibrary`.
#[derive(Debug, Error, PartialEq)]
pub enum EquationError {
    /// An explicit allowlist named a variable that never appears at shift 0
    /// in any equation — the allowlist and the model have drifted apart.
    #[error("endogenous_variables allowlist names '{name}', which no equation references")]
    UnknownAllowlistVariable {
        /// The offending name.
        name: String,
    },
    /// An equation's residual tree calls a primitive with the wrong number
    /// of arguments — reachable whenever an `Equation` is deserialized
    /// directly (e.g. from a hand-authored JSON equation file) rather than
    /// built through `Node::call`, which would have caught it immediately.
    #[error("equation '{equation_id}' calls {func:?} with {found} argument(s), expected {expected}")]
    ArityMismatch {
        /// The equation whose residual tree contains the bad call.
        equation_id: String,
        /// Which primitive.
        func: Primitive,
        /// Its declared arity.
        expected: usize,
        /// How many arguments the call actually supplied.
        found: usize,
    },
}

fn validate_arities(equations: &[Equation]) -> Result<(), EquationError> {
    for eq in equations {
        if let Err((func, expected, found)) = eq.residual.check_arity() {
            return Err(EquationError::ArityMismatch { equation_id: eq.id.clone(), func, expected, found });
        }
    }
    Ok(())
}

/// The full structural model: every equation, plus an optional explicit
/// endogenous-variable allowlist.
///
/// Absent an allowlist, the variable set is inferred as the closure of
/// shift-0 symbols across all equations (`closure::infer_variables`),
/// matching `build_linear_system.py`'s default path.
#[derive(Debug, Clone)]
pub struct EquationLibrary {
    equations: Vec<Equation>,
    allowlist: Option<Vec<String>>,
}

impl EquationLibrary {
    /// Build a library with no explicit allowlist; variables are inferred.
    ///
    /// Validates every residual tree's primitive calls against their arity
    /// — a hand-authored JSON equation file is deserialized directly into
    /// `Node`, bypassing the `Node::call` constructor's own check.
    pub fn new(equations: Vec<Equation>) -> Result<Self, EquationError> {
        validate_arities(&equations)?;
        Ok(Self { equations, allowlist: None })
    }

    /// Build a library with an explicit endogenous-variable allowlist,
    /// rejecting any name the model's equations never reference.
    pub fn with_allowlist(
        equations: Vec<Equation>,
        allowlist: Vec<String>,
        params: &ParameterSet,
    ) -> Result<Self, EquationError> {
        validate_arities(&equations)?;
        let inferred = infer_variables(&equations, params);
        for name in &allowlist {
            if !inferred.contains(name) {
                return Err(EquationError::UnknownAllowlistVariable { name: name.clone() });
            }
        }
        Ok(Self { equations, allowlist: Some(allowlist) })
    }

    /// All equations in the library.
    pub fn equations(&self) -> &[Equation] {
        &self.equations
    }

    /// Equations carrying a given declared section.
    pub fn by_section(&self, section: EquationSection) -> Vec<&Equation> {
        self.equations.iter().filter(|e| e.section == section).collect()
    }

    /// The endogenous variable list: the explicit allowlist if one was
    /// given, otherwise the inferred closure.
    pub fn variables(&self, params: &ParameterSet) -> Vec<String> {
        match &self.allowlist {
            Some(list) => list.clone(),
            None => infer_variables(&self.equations, params),
        }
    }

    /// The shock list: always inferred, since shocks are never part of an
    /// endogenous-variable allowlist.
    pub fn shocks(&self) -> Vec<String> {
        infer_shocks(&self.equations)
    }

    /// The explicit endogenous-variable allowlist, if one was supplied.
    /// `None` means the variable set is inferred and may be squared down
    /// when the model is underdetermined.
    pub fn allowlist(&self) -> Option<&[String]> {
        self.allowlist.as_deref()
    }

    /// Every parameter name this library's equations reference, for the
    /// Parameter Store's completeness audit.
    pub fn consumed_parameters(&self, params: &ParameterSet) -> BTreeSet<String> {
        consumed_parameters(&self.equations, params)
    }

    /// Evaluate every equation's residual under `env`, in declaration
    /// order. The first unbound symbol encountered stops evaluation.
    pub fn evaluate_residuals(&self, env: &Environment) -> Result<Vec<f64>, UnboundSymbol> {
        self.equations.iter().map(|eq| env.eval(&eq.residual)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::eval::ModelConstants;
    use crate::node::Node;

    fn sample_library() -> EquationLibrary {
        let eq1 = Equation::new(
            "euler",
            EquationSection::Behavioral,
            Node::sym("c").sub(Node::sym_shift("c", -1)),
        );
        let eq2 = Equation::new(
            "shock",
            EquationSection::ShockProcess,
            Node::sym("eps_c").sub(Node::Const(0.0)),
        );
        EquationLibrary::new(vec![eq1, eq2]).unwrap()
    }

    #[test]
    fn variables_are_inferred_without_an_allowlist() {
        let lib = sample_library();
        let params = ParameterSet::default();
        assert_eq!(lib.variables(&params), vec!["c".to_string()]);
        assert_eq!(lib.shocks(), vec!["eps_c".to_string()]);
    }

    #[test]
    fn allowlist_rejects_unknown_variables() {
        let params = ParameterSet::default();
        let err = EquationLibrary::with_allowlist(
            sample_library().equations,
            vec!["not_a_variable".to_string()],
            &params,
        )
        .unwrap_err();
        assert_eq!(
            err,
            EquationError::UnknownAllowlistVariable { name: "not_a_variable".to_string() }
        );
    }

    #[test]
    fn a_deserialized_equation_with_bad_arity_is_rejected_at_construction() {
        let bad = Equation::new(
            "bad_min",
            EquationSection::Behavioral,
            Node::Call { func: Primitive::Min, args: vec![Node::Const(1.0)] },
        );
        let err = EquationLibrary::new(vec![bad]).unwrap_err();
        assert_eq!(
            err,
            EquationError::ArityMismatch {
                equation_id: "bad_min".to_string(),
                func: Primitive::Min,
                expected: 2,
                found: 1,
            }
        );
    }

    #[test]
    fn allowlist_is_honored_when_valid() {
        let params = ParameterSet::default();
        let lib = EquationLibrary::with_allowlist(
            sample_library().equations,
            vec!["c".to_string()],
            &params,
        )
        .unwrap();
        assert_eq!(lib.variables(&params), vec!["c".to_string()]);
    }

    #[test]
    fn evaluate_residuals_walks_every_equation() {
        let lib = sample_library();
        let k = ModelConstants { s_dd: 0.0, mu_zplus: 1.0, mu_psi: 1.0, sigma_a: 0.0, sigma_b: 0.0 };
        let mut env = Environment::new(&k);
        env.bind("c", 0, 2.0);
        env.bind("c", -1, 1.5);
        env.bind("eps_c", 0, 0.0);
        let residuals = lib.evaluate_residuals(&env).unwrap();
        assert_eq!(residuals.len(), 2);
        assert!((residuals[0] - 0.5).abs() < 1e-12);
        assert!((residuals[1] - 0.0).abs() < 1e-12);
    }

    #[test]
    fn by_section_filters_correctly() {
        let lib = sample_library();
        assert_eq!(lib.by_section(EquationSection::Behavioral).len(), 1);
        assert_eq!(lib.by_section(EquationSection::ForeignBlock).len(), 0);
    }
}
