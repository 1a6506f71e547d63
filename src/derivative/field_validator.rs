//! The six input checks, run as an explicit state machine.
//!
//! ```text
//!  NotStarted --check 2 passes--> ExpressionOk --checks 3..6 done, none failed--> FullyValidated
//!      |                              |
//!      | check 1 or 2 fails           | a field check fails
//!      v                              v
//!  Failed(EmptyExpression |       Failed(Fields)   (remaining field checks still run)
//!         UnparsableExpression)   (checks 3..6 are skipped)
//! ```
//!
//! Every check is guarded by the state it needs; a failed guard yields a SKIP step whose detail
//! names the blocking failure. Checks 3, 4 and 6 are independent of each other, check 5 also
//! needs the order parsed by check 4.
use crate::derivative::errors::ProblemError;
use crate::derivative::validation_step::{Check, FieldErrors, StepStatus, ValidationStep};
use crate::symbolic::symbolic_traits::{AlgebraCapability, AlgebraError};
use crate::symbolic::utils::first_line_truncated;
use log::{debug, info, warn};
use strum::IntoEnumIterator;
use strum_macros::Display;

pub const ORDER_MIN: i64 = 1;
pub const ORDER_MAX: i64 = 10;
/// Used when the variable field is blank.
pub const DEFAULT_VARIABLE: &str = "x";
/// Used when the order field is blank.
pub const DEFAULT_ORDER: &str = "1";
/// Longest excerpt of a parser message quoted in the trail.
const PARSE_MESSAGE_CHARS: usize = 80;

/// Why the expression checks stopped the run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureScope {
    EmptyExpression,
    UnparsableExpression,
    /// one of the independent field checks failed
    Fields,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum ValidatorState {
    NotStarted,
    ExpressionOk,
    FullyValidated,
    Failed(FailureScope),
}

/// Everything the validator learned about one request.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationOutcome {
    pub is_valid: bool,
    pub state: ValidatorState,
    pub steps: Vec<ValidationStep>,
    pub field_errors: FieldErrors,
    /// Present only if check 3 passed.
    pub variable: Option<String>,
    /// Present only if check 4 passed, even when check 5 then failed.
    pub order: Option<i64>,
    /// Present only if the point field was filled in and check 6 passed.
    pub point: Option<f64>,
}

/// Trimmed view of the four raw fields with the syntactic defaults applied.
#[derive(Debug, Clone, Copy)]
struct FieldTexts<'a> {
    fx: &'a str,
    var: &'a str,
    order: &'a str,
    point: &'a str,
}

impl<'a> FieldTexts<'a> {
    fn new(fx: &'a str, var: &'a str, order: &'a str, point: &'a str) -> Self {
        let or_default = |text: &'a str, default: &'a str| {
            let text = text.trim();
            if text.is_empty() { default } else { text }
        };
        FieldTexts {
            fx: fx.trim(),
            var: or_default(var, DEFAULT_VARIABLE),
            order: or_default(order, DEFAULT_ORDER),
            point: point.trim(),
        }
    }
}

struct ValidationRun {
    state: ValidatorState,
    steps: Vec<ValidationStep>,
    field_errors: FieldErrors,
    variable: Option<String>,
    order: Option<i64>,
    point: Option<f64>,
}

impl ValidationRun {
    fn new() -> Self {
        ValidationRun {
            state: ValidatorState::NotStarted,
            steps: Vec::with_capacity(6),
            field_errors: FieldErrors::new(),
            variable: None,
            order: None,
            point: None,
        }
    }

    /// `Err(reason)` when `check` may not run in the current state.
    fn guard(&self, check: Check) -> Result<(), &'static str> {
        let blocked = |scope: FailureScope| match (check, scope) {
            (Check::FxParses, FailureScope::EmptyExpression) => "Skipped (empty input)",
            (_, FailureScope::EmptyExpression) => "Skipped (empty f(x))",
            (_, _) => "Skipped (parse failed)",
        };
        match (check, self.state) {
            (Check::FxPresent | Check::FxParses, ValidatorState::NotStarted) => Ok(()),
            (Check::FxPresent | Check::FxParses, ValidatorState::Failed(scope)) => {
                Err(blocked(scope))
            }
            (
                _,
                ValidatorState::ExpressionOk | ValidatorState::Failed(FailureScope::Fields),
            ) => {
                if check == Check::OrderRange && self.order.is_none() {
                    Err("Skipped (invalid order)")
                } else {
                    Ok(())
                }
            }
            (_, ValidatorState::Failed(scope)) => Err(blocked(scope)),
            (_, state) => {
                // a check reached out of sequence; nothing can vouch for the expression
                warn!("check {:?} reached in state {}", check, state);
                Err("Skipped (parse failed)")
            }
        }
    }

    fn on_pass(&mut self, check: Check) {
        if check == Check::FxParses {
            self.state = ValidatorState::ExpressionOk;
        }
    }

    fn on_fail(&mut self, check: Check, error: &ProblemError) {
        self.state = ValidatorState::Failed(match check {
            Check::FxPresent => FailureScope::EmptyExpression,
            Check::FxParses => FailureScope::UnparsableExpression,
            _ => FailureScope::Fields,
        });
        if let (Some(field), Some(message)) = (error.field(), error.field_message()) {
            self.field_errors.insert(field, message);
        }
    }

    fn finish(mut self) -> ValidationOutcome {
        if self.state == ValidatorState::ExpressionOk {
            self.state = ValidatorState::FullyValidated;
        }
        ValidationOutcome {
            is_valid: self.state == ValidatorState::FullyValidated,
            state: self.state,
            steps: self.steps,
            field_errors: self.field_errors,
            variable: self.variable,
            order: self.order,
            point: self.point,
        }
    }
}

/// Parses an integer the way a person types it; overflowing digit strings saturate so they
/// still count as integers and fail the range check instead.
fn parse_order(text: &str) -> Option<i64> {
    match text.parse::<i64>() {
        Ok(value) => Some(value),
        Err(_) => {
            let digits = text.strip_prefix(['+', '-']).unwrap_or(text);
            if !digits.is_empty() && digits.chars().all(|c| c.is_ascii_digit()) {
                Some(if text.starts_with('-') { i64::MIN } else { i64::MAX })
            } else {
                None
            }
        }
    }
}

/// Runs the six checks against one request. Stateless between calls.
pub struct FieldValidator<'a> {
    algebra: Option<&'a dyn AlgebraCapability>,
}

impl<'a> FieldValidator<'a> {
    pub fn new(algebra: Option<&'a dyn AlgebraCapability>) -> Self {
        FieldValidator { algebra }
    }

    /// Validates the four raw fields; never fails, every problem becomes part of the outcome.
    pub fn validate(&self, fx: &str, var: &str, order: &str, point: &str) -> ValidationOutcome {
        let texts = FieldTexts::new(fx, var, order, point);
        let mut run = ValidationRun::new();
        for check in Check::iter() {
            let step = match run.guard(check) {
                Err(reason) => ValidationStep::for_check(check, StepStatus::Skip, reason),
                Ok(()) => match self.run_check(check, &texts, &mut run) {
                    Ok(detail) => {
                        run.on_pass(check);
                        ValidationStep::for_check(check, StepStatus::Pass, detail)
                    }
                    Err(error) => {
                        run.on_fail(check, &error);
                        ValidationStep::for_check(check, StepStatus::Fail, error.to_string())
                    }
                },
            };
            match step.status {
                StepStatus::Fail => warn!("check {} {}: {}", step.ordinal, step.status, step.detail),
                _ => info!("check {} {}: {}", step.ordinal, step.status, step.detail),
            }
            run.steps.push(step);
        }
        let outcome = run.finish();
        debug!("validation finished in state {}", outcome.state);
        outcome
    }

    /// Runs one check, recording what it resolved; `Ok` holds the PASS detail.
    fn run_check(
        &self,
        check: Check,
        texts: &FieldTexts,
        run: &mut ValidationRun,
    ) -> Result<String, ProblemError> {
        match check {
            Check::FxPresent => {
                if texts.fx.is_empty() {
                    Err(ProblemError::EmptyInput)
                } else {
                    Ok(String::new())
                }
            }
            Check::FxParses => {
                let algebra = self.algebra.ok_or(ProblemError::EngineUnavailable)?;
                let tree = algebra.parse(texts.fx).map_err(|error| match error {
                    AlgebraError::Unavailable => ProblemError::EngineUnavailable,
                    other => ProblemError::Parse {
                        message: first_line_truncated(&other.to_string(), PARSE_MESSAGE_CHARS),
                    },
                })?;
                Ok(format!("Parsed OK: {}", tree))
            }
            Check::Variable => {
                let mut chars = texts.var.chars();
                match (chars.next(), chars.next()) {
                    (Some(c), None) if c.is_ascii_alphabetic() => {
                        run.variable = Some(texts.var.to_string());
                        Ok(format!("'{}' is valid.", texts.var))
                    }
                    _ => Err(ProblemError::InvalidVariable {
                        value: texts.var.to_string(),
                    }),
                }
            }
            Check::OrderInteger => match parse_order(texts.order) {
                Some(order) => {
                    run.order = Some(order);
                    Ok(format!("Order = {}", order))
                }
                None => Err(ProblemError::NonIntegerOrder {
                    value: texts.order.to_string(),
                }),
            },
            Check::OrderRange => {
                let order = run.order.unwrap_or_default();
                if (ORDER_MIN..=ORDER_MAX).contains(&order) {
                    Ok(format!("{} is within [{}, {}].", order, ORDER_MIN, ORDER_MAX))
                } else {
                    Err(ProblemError::OrderOutOfRange { order })
                }
            }
            Check::Point => {
                if texts.point.is_empty() {
                    return Ok("Field is blank, evaluation will be skipped.".to_string());
                }
                match texts.point.parse::<f64>() {
                    Ok(value) if value.is_finite() => {
                        run.point = Some(value);
                        // the point is always reported against x, whatever variable was typed
                        Ok(format!("x = {}", value))
                    }
                    _ => Err(ProblemError::InvalidPoint {
                        value: texts.point.to_string(),
                    }),
                }
            }
        }
    }
}
