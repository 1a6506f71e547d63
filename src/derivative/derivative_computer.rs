use crate::derivative::errors::ProblemError;
use crate::symbolic::symbolic_engine::Expr;
use crate::symbolic::symbolic_traits::AlgebraCapability;
use crate::symbolic::utils::format_significant;
use log::{debug, error, info, warn};
use serde::Serialize;
use std::time::{Duration, Instant};

/// Shown instead of a number when substitution fails.
pub const EVALUATION_ERROR_SENTINEL: &str = "[evaluation error]";
/// Significant digits of the numeric value.
pub const DEFAULT_POINT_DIGITS: usize = 6;

/// Numeric value of the derivative at the requested point.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum PointValue {
    /// the point field was blank
    NotRequested,
    Value { value: f64, text: String },
    /// substitution failed; the symbolic answer is still valid
    EvaluationError { message: String },
}

impl PointValue {
    /// Text shown to the user, `None` when no evaluation was asked for.
    pub fn display_text(&self) -> Option<&str> {
        match self {
            PointValue::NotRequested => None,
            PointValue::Value { text, .. } => Some(text),
            PointValue::EvaluationError { .. } => Some(EVALUATION_ERROR_SENTINEL),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ComputedDerivative {
    pub derivative: Expr,
    /// rendering of `derivative`
    pub answer: String,
    pub point_value: PointValue,
}

/// Wall-clock guard of one computation.
struct Deadline {
    start: Instant,
    budget: Option<Duration>,
}

impl Deadline {
    fn new(budget: Option<Duration>) -> Self {
        Deadline {
            start: Instant::now(),
            budget,
        }
    }

    fn check(&self, stage: &str) -> Result<(), ProblemError> {
        let Some(budget) = self.budget else {
            return Ok(());
        };
        let elapsed = self.start.elapsed();
        if elapsed >= budget {
            return Err(ProblemError::Computation {
                message: format!(
                    "computation exceeded budget of {} ms ({})",
                    budget.as_millis(),
                    stage
                ),
            });
        }
        Ok(())
    }
}

/// Drives the capability for one validated request.
pub struct DerivativeComputer<'a> {
    algebra: &'a dyn AlgebraCapability,
    budget: Option<Duration>,
    point_digits: usize,
}

impl<'a> DerivativeComputer<'a> {
    pub fn new(algebra: &'a dyn AlgebraCapability) -> Self {
        DerivativeComputer {
            algebra,
            budget: None,
            point_digits: DEFAULT_POINT_DIGITS,
        }
    }

    pub fn with_budget(mut self, budget: Option<Duration>) -> Self {
        self.budget = budget;
        self
    }

    pub fn with_point_digits(mut self, digits: usize) -> Self {
        self.point_digits = digits.max(1);
        self
    }

    /// Differentiates `raw_fx` `order` times with respect to `var` and evaluates the result at
    /// `point` when one is given.
    ///
    /// # Errors
    /// A `ProblemError::Computation` if parsing, differentiating or simplifying fails or the
    /// budget runs out. Evaluation failures are not errors, they end up in `point_value`.
    pub fn compute(
        &self,
        var: &str,
        raw_fx: &str,
        order: usize,
        point: Option<&str>,
    ) -> Result<ComputedDerivative, ProblemError> {
        let deadline = Deadline::new(self.budget);
        let result = self.compute_symbolic(var, raw_fx, order, &deadline);
        let derivative = match result {
            Ok(derivative) => derivative,
            Err(err) => {
                error!("computation of d^{}/d{}^{} [{}] failed: {}", order, var, order, raw_fx, err);
                return Err(err);
            }
        };
        let answer = derivative.to_string();
        info!("d^{}/d{}^{} [{}] = {}", order, var, order, raw_fx.trim(), answer);
        let point_value = self.evaluate(&derivative, var, point);
        Ok(ComputedDerivative {
            derivative,
            answer,
            point_value,
        })
    }

    fn compute_symbolic(
        &self,
        var: &str,
        raw_fx: &str,
        order: usize,
        deadline: &Deadline,
    ) -> Result<Expr, ProblemError> {
        // parsing again keeps the computer independent from the validator
        let mut tree = self.algebra.parse(raw_fx.trim())?;
        deadline.check("parse")?;
        for pass in 1..=order {
            tree = self.algebra.differentiate(&tree, var, 1)?;
            debug!("after pass {}: {}", pass, tree);
            deadline.check("differentiate")?;
        }
        let simplified = self.algebra.simplify(&tree)?;
        deadline.check("simplify")?;
        Ok(simplified)
    }

    fn evaluate(&self, derivative: &Expr, var: &str, point: Option<&str>) -> PointValue {
        let Some(value) = point
            .map(str::trim)
            .filter(|text| !text.is_empty())
            .and_then(|text| text.parse::<f64>().ok())
        else {
            return PointValue::NotRequested;
        };
        match self.algebra.substitute(derivative, var, value) {
            Ok(result) => PointValue::Value {
                value: result,
                text: format_significant(result, self.point_digits),
            },
            Err(err) => {
                warn!("evaluation at {} = {} failed: {}", var, value, err);
                PointValue::EvaluationError {
                    message: err.to_string(),
                }
            }
        }
    }
}
