//! # Symbolic Engine Derivatives Module
//!
//! Analytical differentiation and numeric evaluation of [`Expr`] trees.
//!
//! ## Key Methods
//!
//! - `diff(var)` - Analytical derivative with respect to one variable
//! - `eval_expression(vars, values)` - Numeric evaluation with explicit failure on free
//!   symbols and non-finite results
//!
//! ## Interesting Code Features
//!
//! 1. **Recursive Differentiation Rules**: sum, product, quotient and chain rules by pattern
//!    matching; the power rule is used for constant exponents and the general rule
//!    `d(u**v) = u**v * (v'*ln(u) + v*u'/u)` when the exponent depends on the variable.
//!
//! 2. **Pure transformations**: every method returns a new tree, inputs are never mutated.

use crate::symbolic::symbolic_engine::Expr;
use std::f64::consts::PI;

impl Expr {
    /// DIFFERENTIATION

    /// Computes the analytical derivative of the expression with respect to a variable.
    ///
    /// Implements all standard differentiation rules from calculus:
    /// - Power rule: d/dx(x^n) = n*x^(n-1)
    /// - Product rule: d/dx(f*g) = f'*g + f*g'
    /// - Quotient rule: d/dx(f/g) = (f'*g - f*g')/g^2
    /// - Chain rule: d/dx(f(g(x))) = f'(g(x))*g'(x)
    ///
    /// The result is not simplified.
    ///
    /// # Examples
    /// ```rust, ignore
    /// let x = Expr::Var("x".to_string());
    /// let f = x.clone().pow(Expr::Const(2.0)); // x**2
    /// let df_dx = f.diff("x").simplify(); // 2*x
    /// ```
    pub fn diff(&self, var: &str) -> Expr {
        match self {
            Expr::Var(name) => {
                if name == var {
                    Expr::Const(1.0)
                } else {
                    Expr::Const(0.0)
                }
            }
            Expr::Const(_) => Expr::Const(0.0),
            Expr::Add(lhs, rhs) => Expr::Add(Box::new(lhs.diff(var)), Box::new(rhs.diff(var))),
            Expr::Sub(lhs, rhs) => Expr::Sub(Box::new(lhs.diff(var)), Box::new(rhs.diff(var))),
            Expr::Mul(lhs, rhs) => Expr::Add(
                Box::new(Expr::Mul(Box::new(lhs.diff(var)), rhs.clone())),
                Box::new(Expr::Mul(lhs.clone(), Box::new(rhs.diff(var)))),
            ),
            Expr::Div(lhs, rhs) => Expr::Div(
                Box::new(Expr::Sub(
                    Box::new(Expr::Mul(Box::new(lhs.diff(var)), rhs.clone())),
                    Box::new(Expr::Mul(Box::new(rhs.diff(var)), lhs.clone())),
                )),
                Box::new(Expr::Mul(rhs.clone(), rhs.clone())),
            ),
            Expr::Pow(base, exp) if !exp.contains_variable(var) => {
                let lowered = match exp.as_ref() {
                    Expr::Const(n) => Expr::Const(n - 1.0),
                    _ => Expr::Sub(exp.clone(), Box::new(Expr::Const(1.0))),
                };
                Expr::Mul(
                    Box::new(Expr::Mul(
                        exp.clone(),
                        Box::new(Expr::Pow(base.clone(), Box::new(lowered))),
                    )),
                    Box::new(base.diff(var)),
                )
            }
            // u**v with v depending on var: u**v * (v'*ln(u) + v*u'/u)
            Expr::Pow(base, exp) => Expr::Mul(
                Box::new(self.clone()),
                Box::new(Expr::Add(
                    Box::new(Expr::Mul(
                        Box::new(exp.diff(var)),
                        Box::new(Expr::Ln(base.clone())),
                    )),
                    Box::new(Expr::Div(
                        Box::new(Expr::Mul(exp.clone(), Box::new(base.diff(var)))),
                        base.clone(),
                    )),
                )),
            ),
            Expr::Exp(expr) => {
                Expr::Mul(Box::new(Expr::Exp(expr.clone())), Box::new(expr.diff(var)))
            }
            Expr::Ln(expr) => Expr::Div(Box::new(expr.diff(var)), expr.clone()),
            Expr::sin(expr) => {
                Expr::Mul(Box::new(Expr::cos(expr.clone())), Box::new(expr.diff(var)))
            }
            Expr::cos(expr) => Expr::Mul(
                Box::new(Expr::Mul(
                    Box::new(Expr::Const(-1.0)),
                    Box::new(Expr::sin(expr.clone())),
                )),
                Box::new(expr.diff(var)),
            ),
            Expr::tg(expr) => Expr::Mul(
                Box::new(Expr::Div(
                    Box::new(Expr::Const(1.0)),
                    Box::new(Expr::Pow(
                        Box::new(Expr::cos(expr.clone())),
                        Box::new(Expr::Const(2.0)),
                    )),
                )),
                Box::new(expr.diff(var)),
            ),
            Expr::ctg(expr) => Expr::Mul(
                Box::new(Expr::Div(
                    Box::new(Expr::Const(-1.0)),
                    Box::new(Expr::Pow(
                        Box::new(Expr::sin(expr.clone())),
                        Box::new(Expr::Const(2.0)),
                    )),
                )),
                Box::new(expr.diff(var)),
            ),
            Expr::arcsin(expr) => Expr::Div(
                Box::new(expr.diff(var)),
                Box::new(Expr::Pow(
                    Box::new(Expr::Sub(
                        Box::new(Expr::Const(1.0)),
                        Box::new(Expr::Pow(expr.clone(), Box::new(Expr::Const(2.0)))),
                    )),
                    Box::new(Expr::Const(0.5)),
                )),
            ),
            Expr::arccos(expr) => Expr::Div(
                Box::new(Expr::Mul(
                    Box::new(Expr::Const(-1.0)),
                    Box::new(expr.diff(var)),
                )),
                Box::new(Expr::Pow(
                    Box::new(Expr::Sub(
                        Box::new(Expr::Const(1.0)),
                        Box::new(Expr::Pow(expr.clone(), Box::new(Expr::Const(2.0)))),
                    )),
                    Box::new(Expr::Const(0.5)),
                )),
            ),
            Expr::arctg(expr) => Expr::Div(
                Box::new(expr.diff(var)),
                Box::new(Expr::Add(
                    Box::new(Expr::Const(1.0)),
                    Box::new(Expr::Pow(expr.clone(), Box::new(Expr::Const(2.0)))),
                )),
            ),
            Expr::arcctg(expr) => Expr::Div(
                Box::new(Expr::Mul(
                    Box::new(Expr::Const(-1.0)),
                    Box::new(expr.diff(var)),
                )),
                Box::new(Expr::Add(
                    Box::new(Expr::Const(1.0)),
                    Box::new(Expr::Pow(expr.clone(), Box::new(Expr::Const(2.0)))),
                )),
            ),
        }
    } // end of diff

    /// EVALUATION

    /// Evaluates the expression with `vars[i]` bound to `values[i]`.
    ///
    /// # Errors
    /// A message if a variable has no value or the result is not a finite number.
    pub fn eval_expression(&self, vars: &[&str], values: &[f64]) -> Result<f64, String> {
        let value = self.eval_unchecked(vars, values)?;
        if value.is_finite() {
            Ok(value)
        } else {
            Err(format!("{} evaluates to {}", self, value))
        }
    }

    fn eval_unchecked(&self, vars: &[&str], values: &[f64]) -> Result<f64, String> {
        let value = match self {
            Expr::Var(name) => {
                let index = vars
                    .iter()
                    .position(|&x| x == name)
                    .ok_or_else(|| format!("free symbol '{}' has no value", name))?;
                values
                    .get(index)
                    .copied()
                    .ok_or_else(|| format!("no value supplied for '{}'", name))?
            }
            Expr::Const(val) => *val,
            Expr::Add(lhs, rhs) => lhs.eval_unchecked(vars, values)? + rhs.eval_unchecked(vars, values)?,
            Expr::Sub(lhs, rhs) => lhs.eval_unchecked(vars, values)? - rhs.eval_unchecked(vars, values)?,
            Expr::Mul(lhs, rhs) => lhs.eval_unchecked(vars, values)? * rhs.eval_unchecked(vars, values)?,
            Expr::Div(lhs, rhs) => lhs.eval_unchecked(vars, values)? / rhs.eval_unchecked(vars, values)?,
            Expr::Pow(base, exp) => {
                let base_val = base.eval_unchecked(vars, values)?;
                let exp_val = exp.eval_unchecked(vars, values)?;
                base_val.powf(exp_val)
            }
            Expr::Exp(expr) => expr.eval_unchecked(vars, values)?.exp(),
            Expr::Ln(expr) => expr.eval_unchecked(vars, values)?.ln(),
            Expr::sin(expr) => expr.eval_unchecked(vars, values)?.sin(),
            Expr::cos(expr) => expr.eval_unchecked(vars, values)?.cos(),
            Expr::tg(expr) => expr.eval_unchecked(vars, values)?.tan(),
            Expr::ctg(expr) => 1.0 / expr.eval_unchecked(vars, values)?.tan(),
            Expr::arcsin(expr) => expr.eval_unchecked(vars, values)?.asin(),
            Expr::arccos(expr) => expr.eval_unchecked(vars, values)?.acos(),
            Expr::arctg(expr) => expr.eval_unchecked(vars, values)?.atan(),
            Expr::arcctg(expr) => PI / 2.0 - expr.eval_unchecked(vars, values)?.atan(),
        };
        Ok(value)
    }
}
