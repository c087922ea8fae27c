//! Expression trees for structural equations.
//!
//! Every equation is held as a `Node`, parsed once when the `EquationLibrary`
//! is built and walked repeatedly afterwards — once per residual evaluation,
//! and again (perturbed) for every column of a finite-difference Jacobian.
//! There is no text parser: trees are constructed directly by the code that
//! assembles the model (`original_source/.../build_linear_system.py`'s
//! `_normalize_expr`/`compile` pipeline is a string-to-tree step this crate
//! has no use for, since the model is fixed at compile time rather than read
//! from a YAML-embedded string).

use serde::{Deserialize, Serialize};

/// A binary arithmetic operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BinOp {
    /// Addition.
    Add,
    /// Subtraction.
    Sub,
    /// Multiplication.
    Mul,
    /// Division.
    Div,
    /// Exponentiation (`lhs.powf(rhs)`).
    Pow,
}

/// One of the fixed mathematical primitives equations may call.
///
/// This set is closed: `build_linear_system.py`'s `_build_eval_env` names
/// exactly these identifiers (with the `'`/`''` suffixes of the spec's
/// grammar spelled out as `_prime`/`_double_prime`, since Rust identifiers
/// cannot carry an apostrophe).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Primitive {
    /// Natural logarithm, one argument.
    Log,
    /// Exponential, one argument.
    Exp,
    /// Minimum of two arguments.
    Min,
    /// Maximum of two arguments.
    Max,
    /// Standard normal CDF, one argument.
    Cdf,
    /// Standard normal PDF, one argument.
    Pdf,
    /// BGG monitoring-cost function `G(omega, sigma)`, two arguments.
    G,
    /// BGG monitoring-cost function `Gamma(omega, sigma)`, two arguments.
    Gamma,
    /// Derivative `dG/domega(omega, sigma)`, two arguments.
    GOmega,
    /// Derivative `dGamma/domega(omega, sigma)`, two arguments.
    GammaOmega,
    /// Investment adjustment cost `S_tilde(x)`, one argument.
    STilde,
    /// First derivative of the adjustment cost, one argument.
    STildePrime,
    /// Second derivative of the adjustment cost, one argument.
    STildeDoublePrime,
    /// Capital-utilization cost `a(u)`, one argument.
    A,
    /// Derivative `a'(u)`, one argument.
    APrime,
}

impl Primitive {
    /// Number of arguments this primitive expects.
    pub const fn arity(self) -> usize {
        match self {
            Primitive::Log
            | Primitive::Exp
            | Primitive::Cdf
            | Primitive::Pdf
            | Primitive::STilde
            | Primitive::STildePrime
            | Primitive::STildeDoublePrime
            | Primitive::A
            | Primitive::APrime => 1,
            Primitive::Min | Primitive::Max | Primitive::G | Primitive::Gamma | Primitive::GOmega | Primitive::GammaOmega => 2,
        }
    }
}

/// A time-shift tag on a symbol: `-1` is last period, `0` is current, `+1`
/// is next period (an expectation under rational expectations).
pub type Shift = i8;

/// An expression-tree node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Node {
    /// A numeric literal.
    Const(f64),
    /// A reference to a named symbol at a given time shift — may resolve to
    /// an endogenous variable, a parameter, or a shock depending on what the
    /// binding environment holds.
    Sym {
        /// Symbol name, without any time-shift suffix.
        name: String,
        /// Time shift: `-1`, `0`, or `+1`.
        shift: Shift,
    },
    /// A call to one of the fixed primitives.
    Call {
        /// Which primitive.
        func: Primitive,
        /// Argument sub-trees; length must match `func.arity()`.
        args: Vec<Node>,
    },
    /// A binary operation.
    BinOp {
        /// The operator.
        op: BinOp,
        /// Left operand.
        lhs: Box<Node>,
        /// Right operand.
        rhs: Box<Node>,
    },
}

impl Node {
    /// Build a current-period symbol reference.
    pub fn sym(name: impl Into<String>) -> Self {
        Node::Sym { name: name.into(), shift: 0 }
    }

    /// Build a symbol reference at an explicit time shift.
    pub fn sym_shift(name: impl Into<String>, shift: Shift) -> Self {
        Node::Sym { name: name.into(), shift }
    }

    /// Build a primitive call, panicking if the argument count does not
    /// match the primitive's arity — a model-authoring bug, not a runtime
    /// condition.
    pub fn call(func: Primitive, args: Vec<Node>) -> Self {
        assert_eq!(
            args.len(),
            func.arity(),
            "primitive {func:?} expects {} argument(s), got {}",
            func.arity(),
            args.len()
        );
        Node::Call { func, args }
    }

    /// `self + other`.
    pub fn add(self, other: Node) -> Self {
        Node::BinOp { op: BinOp::Add, lhs: Box::new(self), rhs: Box::new(other) }
    }

    /// `self - other`.
    pub fn sub(self, other: Node) -> Self {
        Node::BinOp { op: BinOp::Sub, lhs: Box::new(self), rhs: Box::new(other) }
    }

    /// `self * other`.
    pub fn mul(self, other: Node) -> Self {
        Node::BinOp { op: BinOp::Mul, lhs: Box::new(self), rhs: Box::new(other) }
    }

    /// `self / other`.
    pub fn div(self, other: Node) -> Self {
        Node::BinOp { op: BinOp::Div, lhs: Box::new(self), rhs: Box::new(other) }
    }

    /// `self.powf(other)`.
    pub fn pow(self, other: Node) -> Self {
        Node::BinOp { op: BinOp::Pow, lhs: Box::new(self), rhs: Box::new(other) }
    }

    /// Recursively verify every `Call` node's argument count matches its
    /// primitive's arity.
    ///
    /// `Node::call` enforces this at construction time, but a `Node` parsed
    /// straight from a hand-authored JSON equation file is built by serde,
    /// not by that constructor, so a bad arity otherwise survives until it
    /// panics deep in `eval::apply`'s unchecked `args[1]` indexing. This is
    /// the check that stands in for the constructor's assertion on that path.
    pub fn check_arity(&self) -> Result<(), (Primitive, usize, usize)> {
        match self {
            Node::Const(_) | Node::Sym { .. } => Ok(()),
            Node::Call { func, args } => {
                if args.len() != func.arity() {
                    return Err((*func, func.arity(), args.len()));
                }
                for arg in args {
                    arg.check_arity()?;
                }
                Ok(())
            }
            Node::BinOp { lhs, rhs, .. } => {
                lhs.check_arity()?;
                rhs.check_arity()
            }
        }
    }

    /// Walk the tree collecting every distinct `(name, shift)` symbol
    /// reference, in first-occurrence order. Used by the closure-inference
    /// pass (`closure.rs`) before parameters/shocks are filtered out.
    pub fn collect_symbols(&self, out: &mut Vec<(String, Shift)>) {
        match self {
            Node::Const(_) => {}
            Node::Sym { name, shift } => {
                let key = (name.clone(), *shift);
                if !out.contains(&key) {
                    out.push(key);
                }
            }
            Node::Call { args, .. } => {
                for arg in args {
                    arg.collect_symbols(out);
                }
            }
            Node::BinOp { lhs, rhs, .. } => {
                lhs.collect_symbols(out);
                rhs.collect_symbols(out);
            }
        }
    }
}
