//! # Symbolic Expression Simplification Module
//!
//! Deterministic canonical simplification of [`Expr`] trees.
//!
//! ## Simplification Strategy
//!
//! `simplify_()` works bottom-up. Function nodes get their identities applied
//! (`sin(0) = 0`, `log(exp(u)) = u`, ...). Arithmetic nodes are flattened into a sum of
//! monomials, each monomial being a numeric coefficient times a product of bases raised to
//! numeric exponents:
//!
//! 1. **Constant Folding**: numeric factors multiply into the coefficient
//! 2. **Like Factor Collection**: `x*x**2/x` becomes `x**2`
//! 3. **Like Term Collection**: `3*x + 2*x` becomes `5*x`, zero terms disappear
//! 4. **Distribution of scalars**: `-2*(x - 1)` becomes `-2*x + 2`; products of sums are kept
//! 5. **Canonical order**: terms by descending polynomial degree with the constant last,
//!    factors with plain variables first
//!
//! Bases are keyed by their rendered text in `BTreeMap`s, so the result never depends on
//! hashing order. `simplify()` repeats `simplify_()` until the tree stops changing, which
//! makes it idempotent.

use crate::symbolic::symbolic_engine::Expr;
use std::collections::BTreeMap;
use std::collections::btree_map::Entry;

/// Upper bound of `simplify_` rounds performed by `simplify`.
const MAX_SIMPLIFY_PASSES: usize = 16;
/// Relative distance below which a float is snapped to the nearest integer.
const SNAP_TOLERANCE: f64 = 1e-12;

impl Expr {
    //___________________________________SIMPLIFICATION____________________________________

    /// Simplifies to a fixed point: `e.simplify().simplify() == e.simplify()`.
    pub fn simplify(&self) -> Expr {
        let mut current = self.simplify_();
        for _ in 0..MAX_SIMPLIFY_PASSES {
            let next = current.simplify_();
            if next == current {
                break;
            }
            current = next;
        }
        current
    }

    /// One bottom-up simplification round.
    pub fn simplify_(&self) -> Expr {
        match self {
            Expr::Var(_) | Expr::Const(_) => self.clone(),
            Expr::Add(..) | Expr::Sub(..) | Expr::Mul(..) | Expr::Div(..) | Expr::Pow(..) => {
                let with_simple_children = self.map_children(|child| child.simplify_());
                simplify_polynomial(&with_simple_children)
            }
            _ => match self.function_parts() {
                Some((arg, ctor)) => apply_function_identities(ctor(arg.simplify_().boxed())),
                None => self.clone(),
            },
        }
    }
}

fn apply_function_identities(expr: Expr) -> Expr {
    let replacement = match &expr {
        Expr::Exp(arg) => match arg.as_ref() {
            Expr::Const(c) if *c == 0.0 => Some(Expr::Const(1.0)),
            Expr::Ln(inner) => Some(inner.as_ref().clone()),
            _ => None,
        },
        Expr::Ln(arg) => match arg.as_ref() {
            Expr::Const(c) if *c == 1.0 => Some(Expr::Const(0.0)),
            Expr::Exp(inner) => Some(inner.as_ref().clone()),
            _ => None,
        },
        Expr::sin(arg) | Expr::tg(arg) | Expr::arcsin(arg) | Expr::arctg(arg)
            if arg.is_zero() =>
        {
            Some(Expr::Const(0.0))
        }
        Expr::cos(arg) if arg.is_zero() => Some(Expr::Const(1.0)),
        Expr::arccos(arg) if matches!(arg.as_ref(), Expr::Const(c) if *c == 1.0) => {
            Some(Expr::Const(0.0))
        }
        _ => None,
    };
    replacement.unwrap_or(expr)
}

fn snap(value: f64) -> f64 {
    let rounded = value.round();
    if (value - rounded).abs() <= SNAP_TOLERANCE * value.abs().max(1.0) {
        rounded
    } else {
        value
    }
}

/// Coefficient times a product of bases with numeric exponents, bases keyed by their text.
#[derive(Clone, Debug, PartialEq)]
struct Monomial {
    coeff: f64,
    factors: BTreeMap<String, (Expr, f64)>,
}

impl Monomial {
    fn new(coeff: f64) -> Self {
        Monomial {
            coeff,
            factors: BTreeMap::new(),
        }
    }

    fn push_factor(&mut self, base: &Expr, power: f64) {
        let entry = self
            .factors
            .entry(base.to_string())
            .or_insert_with(|| (base.clone(), 0.0));
        entry.1 += power;
    }

    /// Removes bases whose exponents cancelled out.
    fn drop_unit_factors(&mut self) {
        for (_, exponent) in self.factors.values_mut() {
            *exponent = snap(*exponent);
        }
        self.factors.retain(|_, (_, exponent)| *exponent != 0.0);
    }

    /// Identifies like terms: same bases with the same exponents.
    fn key(&self) -> String {
        self.factors
            .iter()
            .map(|(base, (_, exponent))| format!("{}^{}", base, exponent))
            .collect::<Vec<_>>()
            .join("*")
    }

    /// Total exponent of plain variables.
    fn degree(&self) -> f64 {
        self.factors
            .values()
            .filter(|(base, _)| matches!(base, Expr::Var(_)))
            .map(|(_, exponent)| *exponent)
            .sum()
    }
}

fn multiply_constant(mono: &mut Monomial, constant: &Expr, value: f64, power: f64) {
    let factor = if power == 1.0 {
        value
    } else if power == -1.0 {
        1.0 / value
    } else {
        value.powf(power)
    };
    if factor.is_finite() {
        mono.coeff *= factor;
    } else {
        mono.push_factor(constant, power);
    }
}

/// Multiplies `expr` raised to `power` into `mono`.
fn collect_factors(expr: &Expr, power: f64, mono: &mut Monomial) {
    match expr {
        Expr::Const(c) => multiply_constant(mono, expr, *c, power),
        Expr::Mul(lhs, rhs) => {
            collect_factors(lhs, power, mono);
            collect_factors(rhs, power, mono);
        }
        Expr::Div(lhs, rhs) => {
            collect_factors(lhs, power, mono);
            collect_factors(rhs, -power, mono);
        }
        Expr::Pow(base, exp) => match exp.as_ref() {
            Expr::Const(n) if n.fract() == 0.0 => collect_factors(base, power * n, mono),
            Expr::Const(n) => match base.as_ref() {
                Expr::Const(c) if *c > 0.0 => multiply_constant(mono, base, *c, power * n),
                Expr::Const(_) | Expr::Mul(..) | Expr::Div(..) | Expr::Pow(..) => {
                    mono.push_factor(expr, power)
                }
                _ => mono.push_factor(base, power * n),
            },
            _ => mono.push_factor(expr, power),
        },
        _ => mono.push_factor(expr, power),
    }
}

/// Flattens a sum into monomials, distributing numeric coefficients over a lone sum factor.
fn collect_terms(expr: &Expr, scale: f64, out: &mut Vec<Monomial>) {
    match expr {
        Expr::Add(lhs, rhs) => {
            collect_terms(lhs, scale, out);
            collect_terms(rhs, scale, out);
        }
        Expr::Sub(lhs, rhs) => {
            collect_terms(lhs, scale, out);
            collect_terms(rhs, -scale, out);
        }
        _ => {
            let mut mono = Monomial::new(scale);
            collect_factors(expr, 1.0, &mut mono);
            mono.drop_unit_factors();
            if mono.factors.len() == 1 {
                if let Some((base, exponent)) = mono.factors.values().next() {
                    if *exponent == 1.0 && matches!(base, Expr::Add(..) | Expr::Sub(..)) {
                        collect_terms(base, mono.coeff, out);
                        return;
                    }
                }
            }
            out.push(mono);
        }
    }
}

fn combine_like_terms(terms: Vec<Monomial>) -> Vec<Monomial> {
    let mut grouped: BTreeMap<String, Monomial> = BTreeMap::new();
    for term in terms {
        if term.coeff == 0.0 {
            continue;
        }
        match grouped.entry(term.key()) {
            Entry::Occupied(mut existing) => existing.get_mut().coeff += term.coeff,
            Entry::Vacant(slot) => {
                slot.insert(term);
            }
        }
    }
    let mut combined: Vec<Monomial> = grouped
        .into_values()
        .map(|mut term| {
            term.coeff = snap(term.coeff);
            term
        })
        .filter(|term| term.coeff != 0.0)
        .collect();
    combined.sort_by(|a, b| {
        a.factors
            .is_empty()
            .cmp(&b.factors.is_empty())
            .then(b.degree().total_cmp(&a.degree()))
            .then_with(|| a.key().cmp(&b.key()))
    });
    combined
}

fn factor_rank(base: &Expr) -> u8 {
    match base {
        Expr::Var(_) => 0,
        Expr::Add(..) | Expr::Sub(..) => 2,
        _ => 1,
    }
}

fn power_factor(base: &Expr, exponent: f64) -> Expr {
    if exponent == 1.0 {
        base.clone()
    } else {
        Expr::Pow(Box::new(base.clone()), Box::new(Expr::Const(exponent)))
    }
}

fn product(factors: Vec<Expr>) -> Option<Expr> {
    factors
        .into_iter()
        .reduce(|acc, factor| Expr::Mul(Box::new(acc), Box::new(factor)))
}

fn build_monomial_term(mono: &Monomial) -> Expr {
    let mut ordered: Vec<&(Expr, f64)> = mono.factors.values().collect();
    ordered.sort_by_key(|(base, _)| factor_rank(base));
    let numerator = product(
        ordered
            .iter()
            .filter(|(_, exponent)| *exponent > 0.0)
            .map(|(base, exponent)| power_factor(base, *exponent))
            .collect(),
    );
    let denominator = product(
        ordered
            .iter()
            .filter(|(_, exponent)| *exponent < 0.0)
            .map(|(base, exponent)| power_factor(base, -exponent))
            .collect(),
    );
    let numerator = match numerator {
        None => Expr::Const(mono.coeff),
        Some(factors) if mono.coeff == 1.0 => factors,
        Some(factors) => Expr::Mul(Box::new(Expr::Const(mono.coeff)), Box::new(factors)),
    };
    match denominator {
        None => numerator,
        Some(denominator) => Expr::Div(Box::new(numerator), Box::new(denominator)),
    }
}

/// Rebuilds an arithmetic node whose children are already simplified in canonical form.
fn simplify_polynomial(expr: &Expr) -> Expr {
    let mut terms = Vec::new();
    collect_terms(expr, 1.0, &mut terms);
    combine_like_terms(terms)
        .iter()
        .map(build_monomial_term)
        .reduce(|acc, term| Expr::Add(Box::new(acc), Box::new(term)))
        .unwrap_or(Expr::Const(0.0))
}
