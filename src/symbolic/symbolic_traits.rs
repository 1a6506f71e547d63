// SYMBOLIC TRAITS //////////////////////////////////////////////////////////////////
// The computer-algebra capability consumed by the derivative pipeline.
// The native engine of this crate implements it; add other engines here as needed.
// The capability is built once by the host and handed to the pipeline by reference,
// a missing backend is represented by `None` on the consumer side.

use crate::symbolic::symbolic_engine::Expr;
use log::{debug, warn};
use strum_macros::{Display, EnumString};
use thiserror::Error;

/// Default bound on the size of any tree the native engine hands out.
pub const DEFAULT_MAX_NODES: usize = 100_000;
/// Times a simplified tree is rendered, read back and simplified again before its text settles.
const MAX_REREAD_ROUNDS: usize = 4;

/// Failures of a computer-algebra capability.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum AlgebraError {
    #[error("algebra engine is not available")]
    Unavailable,
    #[error("{0}")]
    Parse(String),
    #[error("expression too large: {nodes} nodes exceeds the limit of {limit}")]
    TooLarge { nodes: usize, limit: usize },
    #[error("cannot evaluate: {0}")]
    Evaluation(String),
}

/// Parse, differentiate, simplify and substitute, plus identification for diagnostics.
///
/// Implementations are stateless from the caller's point of view and may be shared
/// between threads.
pub trait AlgebraCapability: Send + Sync {
    /// short backend name, e.g. "native"
    fn name(&self) -> &str;
    fn version(&self) -> String;
    fn parse(&self, text: &str) -> Result<Expr, AlgebraError>;
    /// `order`-th derivative of `tree` with respect to `var`, simplified.
    fn differentiate(&self, tree: &Expr, var: &str, order: usize) -> Result<Expr, AlgebraError>;
    fn simplify(&self, tree: &Expr) -> Result<Expr, AlgebraError>;
    /// Value of `tree` with `var` replaced by `value`.
    fn substitute(&self, tree: &Expr, var: &str, value: f64) -> Result<f64, AlgebraError>;
}

///////////////// IMPLEMENTATION OF THE TRAIT FOR THE NATIVE ENGINE /////////////////////////

#[derive(Debug, Clone)]
pub struct NativeAlgebra {
    max_nodes: usize,
}

impl Default for NativeAlgebra {
    fn default() -> Self {
        NativeAlgebra {
            max_nodes: DEFAULT_MAX_NODES,
        }
    }
}

impl NativeAlgebra {
    pub fn new(max_nodes: usize) -> Self {
        NativeAlgebra { max_nodes }
    }

    fn check_size(&self, tree: Expr) -> Result<Expr, AlgebraError> {
        let nodes = tree.node_count();
        if nodes > self.max_nodes {
            return Err(AlgebraError::TooLarge {
                nodes,
                limit: self.max_nodes,
            });
        }
        Ok(tree)
    }
}

impl AlgebraCapability for NativeAlgebra {
    fn name(&self) -> &str {
        "native"
    }

    fn version(&self) -> String {
        format!("native {}", env!("CARGO_PKG_VERSION"))
    }

    fn parse(&self, text: &str) -> Result<Expr, AlgebraError> {
        let tree = Expr::parse_expression(text).map_err(AlgebraError::Parse)?;
        self.check_size(tree)
    }

    fn differentiate(&self, tree: &Expr, var: &str, order: usize) -> Result<Expr, AlgebraError> {
        let mut derivative = tree.simplify();
        for pass in 1..=order {
            derivative = self.check_size(derivative.diff(var).simplify())?;
            debug!("pass {}: d/d{} = {}", pass, var, derivative);
        }
        Ok(derivative)
    }

    /// The result renders to text that simplifies back to the same text.
    fn simplify(&self, tree: &Expr) -> Result<Expr, AlgebraError> {
        let mut current = self.check_size(tree.simplify())?;
        for _ in 0..MAX_REREAD_ROUNDS {
            let text = current.to_string();
            // trees past the parser limits keep their first simplification
            let Ok(reread) = Expr::parse_expression(&text) else {
                break;
            };
            let next = self.check_size(reread.simplify())?;
            if next.to_string() == text {
                break;
            }
            debug!("re-read {} as {}", text, next);
            current = next;
        }
        Ok(current)
    }

    fn substitute(&self, tree: &Expr, var: &str, value: f64) -> Result<f64, AlgebraError> {
        tree.eval_expression(&[var], &[value])
            .map_err(AlgebraError::Evaluation)
    }
}

/////////////////////////////////////////////////////////////////////////////////////////
// FACTORY METHODS  ////////////////////////////////////////////////////////////////////

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum AlgebraBackend {
    Native,
    /// no capability at all; every request fails its parse check
    Disabled,
}

/// Builds the capability named by `backend`, `None` for "disabled" or an unknown name.
pub fn algebra_from_string(backend: &str, max_nodes: usize) -> Option<Box<dyn AlgebraCapability>> {
    match backend.trim().parse::<AlgebraBackend>() {
        Ok(AlgebraBackend::Native) => Some(Box::new(NativeAlgebra::new(max_nodes))),
        Ok(AlgebraBackend::Disabled) => None,
        Err(_) => {
            warn!("unknown algebra backend '{}', running without one", backend);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_factory() {
        let native = algebra_from_string("native", 1000).unwrap();
        assert_eq!(native.name(), "native");
        assert!(native.version().starts_with("native "));
        assert!(algebra_from_string(" Native ", 1000).is_some());
        assert!(algebra_from_string("disabled", 1000).is_none());
        assert!(algebra_from_string("sympy", 1000).is_none());
        assert_eq!(AlgebraBackend::Native.to_string(), "native");
    }

    #[test]
    fn test_native_capability_round_trip() {
        let algebra = NativeAlgebra::default();
        let tree = algebra.parse("x**3 + 2*x**2 - 5*x + 1").unwrap();
        let derivative = algebra.differentiate(&tree, "x", 1).unwrap();
        let simplified = algebra.simplify(&derivative).unwrap();
        assert_eq!(simplified.to_string(), "3*x**2 + 4*x - 5");
        assert_eq!(algebra.substitute(&simplified, "x", 1.0).unwrap(), 2.0);
        // the input tree is left untouched
        assert_eq!(tree, algebra.parse("x**3 + 2*x**2 - 5*x + 1").unwrap());
    }

    #[test]
    fn test_simplified_text_reads_back_unchanged() {
        let algebra = NativeAlgebra::default();
        for text in [
            "(x**2 + 2*x)*(x - 1)**3",
            "x**(1/3)",
            "sqrt(x**2 + 1)",
            "(x + 1)**3*(x - 2)**2",
            "sin(x)/(3*x)",
        ] {
            let tree = algebra.parse(text).unwrap();
            let derivative = algebra.differentiate(&tree, "x", 1).unwrap();
            let answer = algebra.simplify(&derivative).unwrap().to_string();
            let reread = algebra.parse(&answer).unwrap();
            assert_eq!(algebra.simplify(&reread).unwrap().to_string(), answer, "{}", text);
        }
    }

    #[test]
    fn test_cube_root_derivative_has_short_constants() {
        let algebra = NativeAlgebra::default();
        let tree = algebra.parse("x**(1/3)").unwrap();
        let derivative = algebra.differentiate(&tree, "x", 1).unwrap();
        let answer = algebra.simplify(&derivative).unwrap().to_string();
        assert!(answer.contains("1/3"), "{}", answer);
        assert!(!answer.contains("0.333"), "{}", answer);
        assert!(!answer.contains("0.666"), "{}", answer);
    }

    #[test]
    fn test_order_zero_is_simplified_input() {
        let algebra = NativeAlgebra::default();
        let tree = algebra.parse("x + x").unwrap();
        assert_eq!(algebra.differentiate(&tree, "x", 0).unwrap().to_string(), "2*x");
    }

    #[test]
    fn test_errors() {
        let algebra = NativeAlgebra::new(5);
        assert!(matches!(algebra.parse("x +"), Err(AlgebraError::Parse(_))));
        assert!(matches!(
            algebra.parse("x + x + x + x"),
            Err(AlgebraError::TooLarge { nodes: 7, limit: 5 })
        ));
        let tree = algebra.parse("1/x").unwrap();
        assert!(matches!(
            algebra.substitute(&tree, "x", 0.0),
            Err(AlgebraError::Evaluation(_))
        ));
        let too_big = NativeAlgebra::new(8);
        let tree = too_big.parse("sin(x)*cos(x)").unwrap();
        assert!(matches!(
            too_big.differentiate(&tree, "x", 1),
            Err(AlgebraError::TooLarge { .. })
        ));
    }
}
