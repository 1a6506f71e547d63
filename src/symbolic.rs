#![allow(non_camel_case_types)]
#![allow(non_snake_case)]
/// a module turns a String expression into a symbolic expression
///
///# Example
/// ```
/// use RustedDeriv::symbolic::symbolic_engine::Expr;
/// let parsed_expression = Expr::parse_expression("x**3 + 2*x**2 - 5*x + 1").unwrap();
/// println!(" parsed_expression {}", parsed_expression);
/// assert!(Expr::parse_expression("2x").is_err());
///  ```
/// ________________________________________________________________________________________________________________________________
pub mod parse_expr;
///____________________________________________________________________________________________________________________________
/// # Symbolic engine
/// the expression tree: construction, substitution, rendering back to Python syntax
///# Example#
/// ```
/// use RustedDeriv::symbolic::symbolic_engine::Expr;
/// let x = Expr::Var("x".to_string());
/// let expr = x.clone() * x + Expr::Const(-1.0);
/// assert_eq!(expr.to_string(), "x*x - 1");
/// ```
pub mod symbolic_engine;
/// analytical derivatives and numeric evaluation
///# Example#
/// ```
/// use RustedDeriv::symbolic::symbolic_engine::Expr;
/// let f = Expr::parse_expression("x**2*sin(x)").unwrap();
/// let df_dx = f.diff("x").simplify();
/// assert_eq!(df_dx.to_string(), "x**2*cos(x) + 2*x*sin(x)");
/// let value = df_dx.eval_expression(&["x"], &[0.0]).unwrap();
/// assert_eq!(value, 0.0);
/// ```
pub mod symbolic_engine_derivatives;
/// canonical, deterministic simplification
pub mod symbolic_simplify;
/// the computer-algebra capability trait, the native backend and the backend factory
///# Example#
/// ```
/// use RustedDeriv::symbolic::symbolic_traits::{algebra_from_string, DEFAULT_MAX_NODES};
/// let algebra = algebra_from_string("native", DEFAULT_MAX_NODES).unwrap();
/// let tree = algebra.parse("3*x**4 - 7*x**2 + 2").unwrap();
/// let second = algebra.differentiate(&tree, "x", 2).unwrap();
/// assert_eq!(second.to_string(), "36*x**2 - 14");
/// ```
pub mod symbolic_traits;
/// bracket checks, significant-digit formatting, message truncation
pub mod utils;
