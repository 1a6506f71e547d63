//! # Symbolic Engine Module
//!
//! Expression tree used by the native computer-algebra backend. Every request of the
//! derivative pipeline is parsed into an [`Expr`], differentiated, simplified and rendered
//! back to text with the `Display` implementation of this module.
//!
//! ## Purpose
//!
//! The symbolic engine allows users to:
//! - Build expressions by hand or through the parser (`Expr::parse_expression`)
//! - Render expressions in the same Python syntax the parser accepts
//!
//! ## Main Structures and Methods
//!
//! ### `Expr` Enum
//! - **Variables**: `Var(String)` - symbolic variables like "x", "t"
//! - **Constants**: `Const(f64)` - numerical constants
//! - **Operations**: `Add`, `Sub`, `Mul`, `Div`, `Pow` - basic arithmetic
//! - **Functions**: `Exp`, `Ln`, `sin`, `cos`, etc. - elementary functions
//!
//! ### Key Methods
//! - `contains_variable(var)` - Dependency test used by the differentiation rules
//! - `node_count()` - Size of the tree, used by the size guard of the backend
//!
//! ## Interesting Code Features
//!
//! 1. **Precedence-aware rendering**: `Display` emits the minimal set of parentheses, writes
//!    power as `**` and turns negative terms of a sum into subtraction, so a simplified
//!    derivative prints as `3*x**2 + 4*x - 5`.
//!
//! 2. **Operator Overloading**: std::ops traits (Add, Sub, Mul, Div, Neg) give natural
//!    syntax when trees are assembled in code: `x.clone() * x + Expr::Const(1.0)`.
//!
//! 3. **Non-standard Function Names**: variants use mathematical notation (tg, ctg, arctg)
//!    while rendering uses the conventional names (tan, cot, atan).

#![allow(non_camel_case_types)]

use std::f64;
use std::fmt;

/// Core symbolic expression enum representing mathematical expressions as an abstract syntax tree.
///
/// # Examples
/// ```rust, ignore
/// use RustedDeriv::symbolic::symbolic_engine::Expr;
/// let x = Expr::Var("x".to_string());
/// let expr = Expr::Add(Box::new(x), Box::new(Expr::Const(2.0)));
/// assert_eq!(expr.to_string(), "x + 2");
/// ```
#[derive(Clone, Debug, PartialEq)]
pub enum Expr {
    /// Symbolic variable with a name (e.g., "x", "y")
    Var(String),
    /// Numerical constant value
    Const(f64),
    /// Addition operation: left + right
    Add(Box<Expr>, Box<Expr>),
    /// Subtraction operation: left - right
    Sub(Box<Expr>, Box<Expr>),
    /// Multiplication operation: left * right
    Mul(Box<Expr>, Box<Expr>),
    /// Division operation: left / right
    Div(Box<Expr>, Box<Expr>),
    /// Power operation: base ** exponent
    Pow(Box<Expr>, Box<Expr>),
    /// Exponential function: e^x
    Exp(Box<Expr>),
    /// Natural logarithm, rendered as log(x)
    Ln(Box<Expr>),
    /// Sine function: sin(x)
    sin(Box<Expr>),
    /// Cosine function: cos(x)
    cos(Box<Expr>),
    /// Tangent function, rendered as tan(x)
    tg(Box<Expr>),
    /// Cotangent function, rendered as cot(x)
    ctg(Box<Expr>),
    /// Arcsine function, rendered as asin(x)
    arcsin(Box<Expr>),
    /// Arccosine function, rendered as acos(x)
    arccos(Box<Expr>),
    /// Arctangent function, rendered as atan(x)
    arctg(Box<Expr>),
    /// Arccotangent function, rendered as acot(x)
    arcctg(Box<Expr>),
}

/// Binding strength of a node when rendered; higher binds tighter.
const PREC_SUM: u8 = 1;
const PREC_PRODUCT: u8 = 2;
const PREC_POWER: u8 = 3;
const PREC_ATOM: u8 = 4;

/// Largest denominator a constant is rendered with as a fraction.
const MAX_DENOMINATOR: i64 = 100;
/// A constant needing at most this many decimal places is rendered as a decimal.
const SHORT_DECIMAL_PLACES: i32 = 6;

/// `(p, q)` with the smallest `q` such that `value == p/q`, for constants that have no short
/// decimal form, e.g. `1/3`.
pub(crate) fn as_fraction(value: f64) -> Option<(i64, i64)> {
    if !value.is_finite() || value.fract() == 0.0 || value.abs() >= 1e9 {
        return None;
    }
    let scaled = value * 10f64.powi(SHORT_DECIMAL_PLACES);
    if (scaled - scaled.round()).abs() <= 1e-6 {
        return None;
    }
    (2..=MAX_DENOMINATOR).find_map(|q| {
        let p = (value * q as f64).round();
        let close = (value - p / q as f64).abs() <= 1e-12 * value.abs().max(1.0);
        close.then_some((p as i64, q))
    })
}

/// Renders a numeric constant: integral values without a fractional part, simple
/// fractions as `p/q`, anything else as the shortest decimal.
pub fn format_constant(value: f64) -> String {
    if value.is_finite() && value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else if let Some((p, q)) = as_fraction(value) {
        format!("{}/{}", p, q)
    } else {
        format!("{}", value)
    }
}

/// Display implementation for pretty printing symbolic expressions.
///
/// Output is valid input for the parser, written in Python syntax with minimal parentheses.
impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Expr::Var(name) => write!(f, "{}", name),
            Expr::Const(val) => write!(f, "{}", format_constant(*val)),
            Expr::Add(lhs, rhs) => {
                write!(f, "{}", lhs)?;
                match rhs.negated_term() {
                    Some(positive) => {
                        f.write_str(" - ")?;
                        write_operand(f, &positive, positive.precedence() <= PREC_SUM)
                    }
                    None => {
                        f.write_str(" + ")?;
                        write!(f, "{}", rhs)
                    }
                }
            }
            Expr::Sub(lhs, rhs) => {
                write!(f, "{} - ", lhs)?;
                write_operand(f, rhs, rhs.precedence() <= PREC_SUM || rhs.looks_negative())
            }
            Expr::Mul(lhs, rhs) => {
                if matches!(lhs.as_ref(), Expr::Const(c) if *c == -1.0) {
                    f.write_str("-")?;
                    return write_operand(
                        f,
                        rhs,
                        rhs.precedence() <= PREC_SUM || rhs.looks_negative(),
                    );
                }
                write_operand(f, lhs, lhs.precedence() < PREC_PRODUCT)?;
                f.write_str("*")?;
                write_operand(
                    f,
                    rhs,
                    rhs.precedence() < PREC_PRODUCT || rhs.looks_negative() || rhs.renders_as_quotient(),
                )
            }
            Expr::Div(lhs, rhs) => {
                write_operand(f, lhs, lhs.precedence() < PREC_PRODUCT)?;
                f.write_str("/")?;
                write_operand(f, rhs, rhs.precedence() <= PREC_PRODUCT || rhs.looks_negative())
            }
            Expr::Pow(base, exp) => {
                write_operand(f, base, base.precedence() <= PREC_POWER)?;
                f.write_str("**")?;
                write_operand(f, exp, exp.precedence() <= PREC_POWER)
            }
            Expr::Exp(expr) => write!(f, "exp({})", expr),
            Expr::Ln(expr) => write!(f, "log({})", expr),
            Expr::sin(expr) => write!(f, "sin({})", expr),
            Expr::cos(expr) => write!(f, "cos({})", expr),
            Expr::tg(expr) => write!(f, "tan({})", expr),
            Expr::ctg(expr) => write!(f, "cot({})", expr),
            Expr::arcsin(expr) => write!(f, "asin({})", expr),
            Expr::arccos(expr) => write!(f, "acos({})", expr),
            Expr::arctg(expr) => write!(f, "atan({})", expr),
            Expr::arcctg(expr) => write!(f, "acot({})", expr),
        }
    }
}

fn write_operand(f: &mut fmt::Formatter, expr: &Expr, parenthesize: bool) -> fmt::Result {
    if parenthesize {
        write!(f, "({})", expr)
    } else {
        write!(f, "{}", expr)
    }
}

impl std::ops::Add for Expr {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Expr::Add(self.boxed(), rhs.boxed())
    }
}

impl std::ops::Sub for Expr {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self::Output {
        Expr::Sub(self.boxed(), rhs.boxed())
    }
}

impl std::ops::Mul for Expr {
    type Output = Self;

    fn mul(self, rhs: Self) -> Self::Output {
        Expr::Mul(self.boxed(), rhs.boxed())
    }
}

impl std::ops::Div for Expr {
    type Output = Self;

    fn div(self, rhs: Self) -> Self::Output {
        Expr::Div(self.boxed(), rhs.boxed())
    }
}

impl std::ops::Neg for Expr {
    type Output = Self;

    fn neg(self) -> Self::Output {
        match self {
            Expr::Const(c) => Expr::Const(-c),
            other => Expr::Mul(Box::new(Expr::Const(-1.0)), Box::new(other)),
        }
    }
}

impl Expr {
    /// BASIC FEATURES

    /// Convenience method to wrap expression in Box for recursive structures.
    pub fn boxed(self) -> Box<Self> {
        Box::new(self)
    }

    pub fn pow(self, rhs: Expr) -> Expr {
        Expr::Pow(self.boxed(), rhs.boxed())
    }

    pub fn is_zero(&self) -> bool {
        matches!(self, Expr::Const(c) if *c == 0.0)
    }

    /// Argument and constructor of a one-argument function node, `None` for arithmetic nodes.
    ///
    /// Tuple variants are plain functions, so the constructor rebuilds the same function
    /// around a new argument: `ctor(Box::new(new_arg))`.
    pub fn function_parts(&self) -> Option<(&Expr, fn(Box<Expr>) -> Expr)> {
        match self {
            Expr::Exp(arg) => Some((arg, Expr::Exp)),
            Expr::Ln(arg) => Some((arg, Expr::Ln)),
            Expr::sin(arg) => Some((arg, Expr::sin)),
            Expr::cos(arg) => Some((arg, Expr::cos)),
            Expr::tg(arg) => Some((arg, Expr::tg)),
            Expr::ctg(arg) => Some((arg, Expr::ctg)),
            Expr::arcsin(arg) => Some((arg, Expr::arcsin)),
            Expr::arccos(arg) => Some((arg, Expr::arccos)),
            Expr::arctg(arg) => Some((arg, Expr::arctg)),
            Expr::arcctg(arg) => Some((arg, Expr::arcctg)),
            _ => None,
        }
    }

    /// Applies `f` to the direct children and rebuilds a node of the same kind.
    pub fn map_children<F>(&self, mut f: F) -> Expr
    where
        F: FnMut(&Expr) -> Expr,
    {
        match self {
            Expr::Var(_) | Expr::Const(_) => self.clone(),
            Expr::Add(lhs, rhs) => Expr::Add(f(lhs).boxed(), f(rhs).boxed()),
            Expr::Sub(lhs, rhs) => Expr::Sub(f(lhs).boxed(), f(rhs).boxed()),
            Expr::Mul(lhs, rhs) => Expr::Mul(f(lhs).boxed(), f(rhs).boxed()),
            Expr::Div(lhs, rhs) => Expr::Div(f(lhs).boxed(), f(rhs).boxed()),
            Expr::Pow(base, exp) => Expr::Pow(f(base).boxed(), f(exp).boxed()),
            _ => match self.function_parts() {
                Some((arg, ctor)) => ctor(f(arg).boxed()),
                None => self.clone(),
            },
        }
    }

    /// check if the expression contains a variable
    pub fn contains_variable(&self, var_name: &str) -> bool {
        match self {
            Expr::Var(name) => name == var_name,
            Expr::Const(_) => false,
            Expr::Add(left, right)
            | Expr::Sub(left, right)
            | Expr::Mul(left, right)
            | Expr::Div(left, right)
            | Expr::Pow(left, right) => {
                left.contains_variable(var_name) || right.contains_variable(var_name)
            }
            _ => self
                .function_parts()
                .is_some_and(|(arg, _)| arg.contains_variable(var_name)),
        }
    }

    /// Number of nodes in the tree.
    pub fn node_count(&self) -> usize {
        match self {
            Expr::Var(_) | Expr::Const(_) => 1,
            Expr::Add(l, r)
            | Expr::Sub(l, r)
            | Expr::Mul(l, r)
            | Expr::Div(l, r)
            | Expr::Pow(l, r) => 1 + l.node_count() + r.node_count(),
            _ => 1 + self.function_parts().map_or(0, |(arg, _)| arg.node_count()),
        }
    }

    pub(crate) fn precedence(&self) -> u8 {
        match self {
            Expr::Add(..) | Expr::Sub(..) => PREC_SUM,
            Expr::Mul(..) | Expr::Div(..) => PREC_PRODUCT,
            Expr::Const(c) if *c < 0.0 || as_fraction(*c).is_some() => PREC_PRODUCT,
            Expr::Pow(..) => PREC_POWER,
            _ => PREC_ATOM,
        }
    }

    /// For a term that prints with a leading minus sign, the same term without it.
    pub(crate) fn negated_term(&self) -> Option<Expr> {
        match self {
            Expr::Const(c) if *c < 0.0 => Some(Expr::Const(-c)),
            Expr::Mul(lhs, rhs) => match lhs.as_ref() {
                Expr::Const(c) if *c == -1.0 => Some(rhs.as_ref().clone()),
                Expr::Const(c) if *c < 0.0 => Some(Expr::Mul(Box::new(Expr::Const(-c)), rhs.clone())),
                _ => None,
            },
            Expr::Div(lhs, rhs) => lhs
                .negated_term()
                .map(|numerator| Expr::Div(Box::new(numerator), rhs.clone())),
            _ => None,
        }
    }

    pub(crate) fn looks_negative(&self) -> bool {
        self.negated_term().is_some()
    }

    fn renders_as_quotient(&self) -> bool {
        match self {
            Expr::Div(..) => true,
            Expr::Const(c) => as_fraction(*c).is_some(),
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn x() -> Expr {
        Expr::Var("x".to_string())
    }

    #[test]
    fn test_display_polynomial() {
        let expr = Expr::Add(
            Box::new(Expr::Add(
                Box::new(Expr::Mul(
                    Box::new(Expr::Const(3.0)),
                    Box::new(x().pow(Expr::Const(2.0))),
                )),
                Box::new(Expr::Mul(Box::new(Expr::Const(4.0)), Box::new(x()))),
            )),
            Box::new(Expr::Const(-5.0)),
        );
        assert_eq!(expr.to_string(), "3*x**2 + 4*x - 5");
    }

    #[test]
    fn test_display_negative_terms() {
        let expr = Expr::Add(
            Box::new(x().pow(Expr::Const(2.0))),
            Box::new(-(Expr::sin(x().boxed()))),
        );
        assert_eq!(expr.to_string(), "x**2 - sin(x)");
        assert_eq!((-x()).to_string(), "-x");
        assert_eq!(Expr::Const(-2.5).to_string(), "-2.5");
    }

    #[test]
    fn test_display_parentheses() {
        let sum = x() + Expr::Const(1.0);
        assert_eq!((sum.clone() * x()).to_string(), "(x + 1)*x");
        assert_eq!((x() / (Expr::Const(2.0) * x())).to_string(), "x/(2*x)");
        assert_eq!(sum.clone().pow(Expr::Const(2.0)).to_string(), "(x + 1)**2");
        assert_eq!(x().pow(Expr::Const(-1.0)).to_string(), "x**(-1)");
        assert_eq!((x() - sum).to_string(), "x - (x + 1)");
        assert_eq!(Expr::Ln(x().boxed()).to_string(), "log(x)");
        assert_eq!(Expr::tg(x().boxed()).to_string(), "tan(x)");
    }

    #[test]
    fn test_display_negative_quotient() {
        let expr = Expr::Div(
            Box::new(Expr::Const(-1.0)),
            Box::new(x().pow(Expr::Const(2.0))),
        );
        assert_eq!(expr.to_string(), "-1/x**2");
        let sum = Expr::Add(Box::new(x()), Box::new(expr));
        assert_eq!(sum.to_string(), "x - 1/x**2");
    }

    #[test]
    fn test_constants_render_as_fractions() {
        assert_eq!(format_constant(2.0), "2");
        assert_eq!(format_constant(0.5), "0.5");
        assert_eq!(format_constant(-1.25), "-1.25");
        assert_eq!(format_constant(1.0 / 3.0), "1/3");
        assert_eq!(format_constant(-2.0 / 3.0), "-2/3");
        assert_eq!(format_constant(1.0 / 7.0), "1/7");
        assert_eq!(format_constant(std::f64::consts::PI), "3.141592653589793");

        let third = Expr::Const(1.0 / 3.0);
        let expr = third.clone() / x().pow(Expr::Const(2.0 / 3.0));
        assert_eq!(expr.to_string(), "1/3/x**(2/3)");
        assert_eq!((x() * third.clone()).to_string(), "x*(1/3)");
        assert_eq!((x() - Expr::Const(-1.0 / 3.0)).to_string(), "x - (-1/3)");
        let sum = Expr::Add(Box::new(x()), Box::new(Expr::Const(-1.0 / 3.0) * x()));
        assert_eq!(sum.to_string(), "x - 1/3*x");
    }

    #[test]
    fn test_contains_variable_and_node_count() {
        let expr = Expr::sin(x().boxed()) * Expr::Var("y".to_string());
        assert!(expr.contains_variable("x"));
        assert!(expr.contains_variable("y"));
        assert!(!expr.contains_variable("z"));
        assert_eq!(expr.node_count(), 4);
        assert_eq!(Expr::Exp((x() * x()).boxed()).node_count(), 4);
    }
}
