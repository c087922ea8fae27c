//! Evaluating an expression tree against a binding environment.
//!
//! Grounded on `original_source/.../build_linear_system.py`'s
//! `_build_eval_env`: the investment-adjustment-cost family (`S_tilde` and
//! its derivatives) and the capital-utilization cost family (`a`/`a'`) are
//! closures over calibrated curvature constants rather than taking those
//! constants as explicit arguments, so `ModelConstants` plays the role the
//! Python closure's captured `params` dict plays there. `G`/`Gamma` and
//! their derivatives take `sigma` explicitly, matching `G_func(omega, sigma)`.

use crate::node::{BinOp, Node, Primitive, Shift};
use dsge_model::ParameterSet;
use std::collections::HashMap;

/// Calibrated constants the curvature-family primitives close over.
///
/// Computed once per `ParameterSet` and reused across every residual/Jacobian
/// evaluation for that parameter vector.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ModelConstants {
    /// Investment adjustment-cost curvature, `S''(1)`.
    pub s_dd: f64,
    /// Balanced-growth technology drift, `mu_psi^(alpha/(1-alpha)) * mu_z`.
    pub mu_zplus: f64,
    /// Investment-specific technology drift.
    pub mu_psi: f64,
    /// Capital-utilization cost curvature.
    pub sigma_a: f64,
    /// Capital-utilization cost level (steady-state rental rate proxy).
    pub sigma_b: f64,
}

impl ModelConstants {
    /// Derive the closure constants from a merged parameter set, defaulting
    /// any absent constant to zero (degenerate, flat cost function) rather
    /// than failing — matching the original's `params.get(name, 0.0)`.
    pub fn from_params(set: &ParameterSet) -> Self {
        let alpha = set.get("alpha").unwrap_or(0.0);
        let mu_z = set.get("mu_z").unwrap_or(1.0);
        let mu_psi = set.get("mu_psi").unwrap_or(1.0);
        let mu_zplus = mu_psi.powf(alpha / (1.0 - alpha)) * mu_z;
        Self {
            s_dd: set.get("S_dd").unwrap_or(0.0),
            mu_zplus,
            mu_psi,
            sigma_a: set.get("sigma_a").unwrap_or(0.0),
            sigma_b: set.get("sigma_b").unwrap_or(0.0),
        }
    }
}

/// A binding of symbols (at a given time shift) to numeric values, plus the
/// calibrated constants the curvature primitives need.
#[derive(Debug, Clone)]
pub struct Environment<'a> {
    bindings: HashMap<(String, Shift), f64>,
    constants: &'a ModelConstants,
}

/// Evaluation failed because a symbol the tree referenced has no binding.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("unbound symbol '{name}' at shift {shift}")]
pub struct UnboundSymbol {
    /// The symbol's name.
    pub name: String,
    /// The time shift at which it was referenced.
    pub shift: Shift,
}

impl<'a> Environment<'a> {
    /// Build an empty environment over the given constants.
    pub fn new(constants: &'a ModelConstants) -> Self {
        Self { bindings: HashMap::new(), constants }
    }

    /// Bind a symbol at a given shift.
    pub fn bind(&mut self, name: impl Into<String>, shift: Shift, value: f64) {
        self.bindings.insert((name.into(), shift), value);
    }

    /// Look up a bound value, if any.
    pub fn lookup(&self, name: &str, shift: Shift) -> Option<f64> {
        self.bindings.get(&(name.to_string(), shift)).copied()
    }

    /// Evaluate a tree against this environment.
    pub fn eval(&self, node: &Node) -> Result<f64, UnboundSymbol> {
        match node {
            Node::Const(c) => Ok(*c),
            Node::Sym { name, shift } => {
                self.lookup(name, *shift).ok_or_else(|| UnboundSymbol { name: name.clone(), shift: *shift })
            }
            Node::Call { func, args } => {
                let values: Result<Vec<f64>, UnboundSymbol> = args.iter().map(|a| self.eval(a)).collect();
                Ok(apply(*func, &values?, self.constants))
            }
            Node::BinOp { op, lhs, rhs } => {
                let l = self.eval(lhs)?;
                let r = self.eval(rhs)?;
                Ok(apply_binop(*op, l, r))
            }
        }
    }
}

fn apply_binop(op: BinOp, l: f64, r: f64) -> f64 {
    match op {
        BinOp::Add => l + r,
        BinOp::Sub => l - r,
        BinOp::Mul => l * r,
        BinOp::Div => l / r,
        BinOp::Pow => l.powf(r),
    }
}

/// Apply a primitive to its (already-evaluated) arguments.
fn apply(func: Primitive, args: &[f64], k: &ModelConstants) -> f64 {
    match func {
        Primitive::Log => args[0].ln(),
        Primitive::Exp => args[0].exp(),
        Primitive::Min => args[0].min(args[1]),
        Primitive::Max => args[0].max(args[1]),
        Primitive::Cdf => standard_normal_cdf(args[0]),
        Primitive::Pdf => standard_normal_pdf(args[0]),
        Primitive::G => monitoring_g(args[0], args[1]),
        Primitive::Gamma => monitoring_gamma(args[0], args[1]),
        Primitive::GOmega => monitoring_g_prime(args[0], args[1]),
        Primitive::GammaOmega => monitoring_gamma_prime(args[0], args[1]),
        Primitive::STilde => s_tilde(args[0], k),
        Primitive::STildePrime => s_tilde_prime(args[0], k),
        Primitive::STildeDoublePrime => s_tilde_double_prime(args[0], k),
        Primitive::A => capital_util_cost(args[0], k),
        Primitive::APrime => capital_util_cost_prime(args[0], k),
    }
}

/// Abramowitz & Stegun 7.1.26 rational approximation to `erf`, maximum
/// absolute error `1.5e-7`.
fn erf(x: f64) -> f64 {
    let sign = if x < 0.0 { -1.0 } else { 1.0 };
    let x = x.abs();
    const A1: f64 = 0.254829592;
    const A2: f64 = -0.284496736;
    const A3: f64 = 1.421413741;
    const A4: f64 = -1.453152027;
    const A5: f64 = 1.061405429;
    const P: f64 = 0.3275911;
    let t = 1.0 / (1.0 + P * x);
    let poly = ((((A5 * t + A4) * t + A3) * t + A2) * t + A1) * t;
    sign * (1.0 - poly * (-x * x).exp())
}

/// Standard normal CDF via `erf`.
pub fn standard_normal_cdf(x: f64) -> f64 {
    0.5 * (1.0 + erf(x / std::f64::consts::SQRT_2))
}

/// Standard normal PDF.
pub fn standard_normal_pdf(x: f64) -> f64 {
    (-0.5 * x * x).exp() / (2.0 * std::f64::consts::PI).sqrt()
}

/// BGG monitoring-cost function `G(omega, sigma)`.
pub fn monitoring_g(omega: f64, sigma: f64) -> f64 {
    if sigma <= 0.0 || omega <= 0.0 {
        return 0.0;
    }
    standard_normal_cdf((omega.ln() - 0.5 * sigma * sigma) / sigma)
}

/// BGG monitoring-cost function `Gamma(omega, sigma)`.
pub fn monitoring_gamma(omega: f64, sigma: f64) -> f64 {
    if sigma <= 0.0 || omega <= 0.0 {
        return 0.0;
    }
    let f = standard_normal_cdf((omega.ln() + 0.5 * sigma * sigma) / sigma);
    let g = monitoring_g(omega, sigma);
    omega * (1.0 - f) + g
}

/// `dG/domega(omega, sigma)`.
pub fn monitoring_g_prime(omega: f64, sigma: f64) -> f64 {
    if sigma <= 0.0 || omega <= 0.0 {
        return 0.0;
    }
    let a = (omega.ln() - 0.5 * sigma * sigma) / sigma;
    standard_normal_pdf(a) / (omega * sigma)
}

/// `dGamma/domega(omega, sigma)`.
pub fn monitoring_gamma_prime(omega: f64, sigma: f64) -> f64 {
    if sigma <= 0.0 || omega <= 0.0 {
        return 0.0;
    }
    let a = (omega.ln() - 0.5 * sigma * sigma) / sigma;
    let b = (omega.ln() + 0.5 * sigma * sigma) / sigma;
    let f = standard_normal_cdf(b);
    let phi_a = standard_normal_pdf(a);
    let phi_b = standard_normal_pdf(b);
    (1.0 - f) - phi_b / sigma + phi_a / (omega * sigma)
}

fn s_tilde(x: f64, k: &ModelConstants) -> f64 {
    if k.s_dd == 0.0 {
        return 0.0;
    }
    let root = k.s_dd.sqrt();
    let centered = x - k.mu_zplus * k.mu_psi;
    0.5 * ((root * centered).exp() + (-root * centered).exp() - 2.0)
}

fn s_tilde_prime(x: f64, k: &ModelConstants) -> f64 {
    if k.s_dd == 0.0 {
        return 0.0;
    }
    let root = k.s_dd.sqrt();
    let centered = x - k.mu_zplus * k.mu_psi;
    0.5 * root * ((root * centered).exp() - (-root * centered).exp())
}

fn s_tilde_double_prime(x: f64, k: &ModelConstants) -> f64 {
    if k.s_dd == 0.0 {
        return 0.0;
    }
    let root = k.s_dd.sqrt();
    let centered = x - k.mu_zplus * k.mu_psi;
    0.5 * k.s_dd * ((root * centered).exp() + (-root * centered).exp())
}

fn capital_util_cost(u: f64, k: &ModelConstants) -> f64 {
    0.5 * k.sigma_b * k.sigma_a * u * u + k.sigma_b * (1.0 - k.sigma_a) * u
        + k.sigma_b * (k.sigma_a / 2.0 - 1.0)
}

fn capital_util_cost_prime(u: f64, k: &ModelConstants) -> f64 {
    k.sigma_b * k.sigma_a * u + k.sigma_b * (1.0 - k.sigma_a)
}
