//! Structured equation records.

use crate::node::Node;
use serde::{Deserialize, Serialize};

/// The declared section a structural equation belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EquationSection {
    /// Household/firm first-order and market-clearing conditions.
    Behavioral,
    /// Fiscal rule (tax/spending feedback on debt or output gap).
    FiscalRule,
    /// AR(1) exogenous shock process.
    ShockProcess,
    /// Small-open-economy/foreign-block condition.
    ForeignBlock,
    /// Measurement equation linking model concepts to observed series.
    Measurement,
}

/// One structural equation: a residual tree plus identifying metadata.
///
/// The residual convention is `lhs - rhs = 0`, matching
/// `build_linear_system.py`'s `_to_residual`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Equation {
    /// Stable identifier, used in skip/drop reports.
    pub id: String,
    /// Declared section.
    pub section: EquationSection,
    /// The residual expression tree.
    pub residual: Node,
}

impl Equation {
    /// Construct an equation record.
    pub fn new(id: impl Into<String>, section: EquationSection, residual: Node) -> Self {
        Self { id: id.into(), section, residual }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::Node;

    #[test]
    fn equation_carries_its_section() {
        let eq = Equation::new("euler", EquationSection::Behavioral, Node::Const(0.0));
        assert_eq!(eq.section, EquationSection::Behavioral);
        assert_eq!(eq.id, "euler");
    }
}
