//! The result record of one request, the assembler producing it and the pipeline that wires
//! validator, computer and assembler together.
use crate::derivative::derivative_computer::{
    ComputedDerivative, DEFAULT_POINT_DIGITS, DerivativeComputer, PointValue,
};
use crate::derivative::errors::ProblemError;
use crate::derivative::field_validator::{DEFAULT_VARIABLE, FieldValidator, ValidationOutcome};
use crate::derivative::validation_step::{FieldErrors, ValidationStep};
use crate::symbolic::symbolic_traits::AlgebraCapability;
use crate::symbolic::utils::truncate_chars;
use chrono::{DateTime, Local};
use log::{error, info};
use serde::Serialize;
use std::time::Duration;

/// Answer text while nothing was computed.
pub const NOT_COMPUTED_TEXT: &str = "-";
pub const COMPUTATION_ERROR_TEXT: &str = "Computation error, see trail";
/// Reported as the algebra version when no capability is configured.
pub const NOT_INSTALLED: &str = "NOT INSTALLED";
/// Longest excerpt of a computation failure kept in the trail.
const COMPUTATION_MESSAGE_CHARS: usize = 120;
const TIMESTAMP_FORMAT: &str = "%Y-%m-%d  %H:%M:%S";

/// The four raw input fields of one request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ProblemInput {
    pub fx: String,
    pub var: String,
    pub order: String,
    pub point: String,
}

impl ProblemInput {
    pub fn new(fx: &str, var: &str, order: &str, point: &str) -> Self {
        ProblemInput {
            fx: fx.to_string(),
            var: var.to_string(),
            order: order.to_string(),
            point: point.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Answer {
    NotComputed,
    Symbolic(String),
    ComputationError,
}

impl Answer {
    pub fn text(&self) -> &str {
        match self {
            Answer::NotComputed => NOT_COMPUTED_TEXT,
            Answer::Symbolic(text) => text,
            Answer::ComputationError => COMPUTATION_ERROR_TEXT,
        }
    }
}

/// Everything known about one request. Immutable once assembled.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComputationResult {
    pub ok: bool,
    pub raw_fx: String,
    pub raw_var: String,
    pub raw_order: String,
    pub raw_point: String,
    /// variable that passed its check
    pub var: Option<String>,
    /// order that passed the integer check
    pub order: Option<i64>,
    pub steps: Vec<ValidationStep>,
    pub field_errors: FieldErrors,
    pub answer: Answer,
    pub point_value: PointValue,
    pub timestamp: DateTime<Local>,
    pub runtime_version: String,
    pub algebra_version: String,
}

impl ComputationResult {
    /// Variable to show, the default while none was accepted.
    pub fn display_var(&self) -> &str {
        self.var.as_deref().unwrap_or(DEFAULT_VARIABLE)
    }

    pub fn display_order(&self) -> i64 {
        self.order.unwrap_or(1)
    }

    pub fn timestamp_text(&self) -> String {
        self.timestamp.format(TIMESTAMP_FORMAT).to_string()
    }

    /// Step appended because the computation failed, if any.
    pub fn computation_step(&self) -> Option<&ValidationStep> {
        self.steps.get(6)
    }
}

/// Builds the record from the validator outcome and the computation outcome.
pub struct ResultAssembler {
    runtime_version: String,
    algebra_version: String,
}

impl ResultAssembler {
    pub fn new(algebra: Option<&dyn AlgebraCapability>) -> Self {
        ResultAssembler {
            runtime_version: format!("{} {}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION")),
            algebra_version: algebra
                .map(|algebra| algebra.version())
                .unwrap_or_else(|| NOT_INSTALLED.to_string()),
        }
    }

    /// `computation` is `None` when validation failed and nothing was computed.
    pub fn assemble(
        &self,
        input: &ProblemInput,
        outcome: ValidationOutcome,
        computation: Option<Result<ComputedDerivative, ProblemError>>,
    ) -> ComputationResult {
        self.assemble_at(input, outcome, computation, Local::now())
    }

    pub fn assemble_at(
        &self,
        input: &ProblemInput,
        outcome: ValidationOutcome,
        computation: Option<Result<ComputedDerivative, ProblemError>>,
        timestamp: DateTime<Local>,
    ) -> ComputationResult {
        let ValidationOutcome {
            is_valid,
            mut steps,
            field_errors,
            variable,
            order,
            ..
        } = outcome;
        let (ok, answer, point_value) = match computation {
            None => (false, Answer::NotComputed, PointValue::NotRequested),
            Some(Ok(computed)) => (
                is_valid,
                Answer::Symbolic(computed.answer),
                computed.point_value,
            ),
            Some(Err(err)) => {
                steps.push(ValidationStep::computation_failure(truncate_chars(
                    &err.to_string(),
                    COMPUTATION_MESSAGE_CHARS,
                )));
                (false, Answer::ComputationError, PointValue::NotRequested)
            }
        };
        ComputationResult {
            ok,
            raw_fx: input.fx.clone(),
            raw_var: input.var.clone(),
            raw_order: input.order.clone(),
            raw_point: input.point.clone(),
            var: variable,
            order,
            steps,
            field_errors,
            answer,
            point_value,
            timestamp,
            runtime_version: self.runtime_version.clone(),
            algebra_version: self.algebra_version.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PipelineSettings {
    /// wall-clock bound of the computation, unbounded when `None`
    pub compute_budget: Option<Duration>,
    pub point_digits: usize,
}

impl Default for PipelineSettings {
    fn default() -> Self {
        PipelineSettings {
            compute_budget: None,
            point_digits: DEFAULT_POINT_DIGITS,
        }
    }
}

/// validate -> compute -> assemble for one request. Holds no mutable state, so one pipeline can
/// serve any number of requests.
pub struct DerivativePipeline<'a> {
    algebra: Option<&'a dyn AlgebraCapability>,
    settings: PipelineSettings,
}

impl<'a> DerivativePipeline<'a> {
    pub fn new(algebra: Option<&'a dyn AlgebraCapability>, settings: PipelineSettings) -> Self {
        DerivativePipeline { algebra, settings }
    }

    pub fn run(&self, input: &ProblemInput) -> ComputationResult {
        info!(
            "problem: f = '{}', var = '{}', order = '{}', point = '{}'",
            input.fx, input.var, input.order, input.point
        );
        let outcome = FieldValidator::new(self.algebra).validate(
            &input.fx,
            &input.var,
            &input.order,
            &input.point,
        );
        let computation = self.compute(input, &outcome);
        let result = ResultAssembler::new(self.algebra).assemble(input, outcome, computation);
        info!("request finished, ok = {}, answer = {}", result.ok, result.answer.text());
        result
    }

    fn compute(
        &self,
        input: &ProblemInput,
        outcome: &ValidationOutcome,
    ) -> Option<Result<ComputedDerivative, ProblemError>> {
        if !outcome.is_valid {
            return None;
        }
        let (Some(algebra), Some(var), Some(order)) =
            (self.algebra, outcome.variable.as_deref(), outcome.order)
        else {
            error!("validated outcome is missing the engine, variable or order");
            return Some(Err(ProblemError::Computation {
                message: "validated request is incomplete".to_string(),
            }));
        };
        let order = match usize::try_from(order) {
            Ok(order) => order,
            Err(_) => return Some(Err(ProblemError::OrderOutOfRange { order })),
        };
        let computer = DerivativeComputer::new(algebra)
            .with_budget(self.settings.compute_budget)
            .with_point_digits(self.settings.point_digits);
        let point = Some(input.point.as_str()).filter(|point| !point.trim().is_empty());
        Some(computer.compute(var, &input.fx, order, point))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::derivative::validation_step::{COMPUTATION_ORDINAL, StepStatus};
    use crate::symbolic::symbolic_traits::NativeAlgebra;

    fn run(fx: &str, var: &str, order: &str, point: &str) -> ComputationResult {
        let algebra = NativeAlgebra::default();
        DerivativePipeline::new(Some(&algebra), PipelineSettings::default())
            .run(&ProblemInput::new(fx, var, order, point))
    }

    #[test]
    fn test_successful_request() {
        let result = run("x**3 + 2*x**2 - 5*x + 1", "", "", "1");
        assert!(result.ok);
        assert_eq!(result.answer, Answer::Symbolic("3*x**2 + 4*x - 5".to_string()));
        assert_eq!(result.point_value.display_text(), Some("2"));
        assert_eq!(result.steps.len(), 6);
        assert_eq!(result.display_var(), "x");
        assert_eq!(result.display_order(), 1);
        assert_eq!(result.raw_var, "");
        assert!(result.algebra_version.starts_with("native"));
        assert!(result.runtime_version.starts_with("RustedDeriv"));
        assert!(result.computation_step().is_none());
    }

    #[test]
    fn test_invalid_request_is_not_computed() {
        let result = run("x**2", "1", "0", "");
        assert!(!result.ok);
        assert_eq!(result.answer, Answer::NotComputed);
        assert_eq!(result.answer.text(), NOT_COMPUTED_TEXT);
        assert_eq!(result.point_value, PointValue::NotRequested);
        assert_eq!(result.var, None);
        assert_eq!(result.order, Some(0));
        assert_eq!(result.steps.len(), 6);
    }

    #[test]
    fn test_computation_failure_appends_step() {
        let algebra = NativeAlgebra::new(12);
        let pipeline = DerivativePipeline::new(Some(&algebra), PipelineSettings::default());
        let result = pipeline.run(&ProblemInput::new("sin(x)*cos(x)*exp(x)", "x", "5", "1"));
        assert!(!result.ok);
        assert_eq!(result.answer, Answer::ComputationError);
        assert_eq!(result.steps.len(), 7);
        let step = result.computation_step().unwrap();
        assert_eq!(step.ordinal, COMPUTATION_ORDINAL);
        assert_eq!(step.status, StepStatus::Fail);
        assert!(step.detail.starts_with("expression too large"));
        assert!(step.detail.chars().count() <= 120);
        assert!(result.steps[..6].iter().all(|step| step.status == StepStatus::Pass));
    }

    #[test]
    fn test_budget_failure() {
        let algebra = NativeAlgebra::default();
        let settings = PipelineSettings {
            compute_budget: Some(Duration::ZERO),
            ..PipelineSettings::default()
        };
        let result = DerivativePipeline::new(Some(&algebra), settings)
            .run(&ProblemInput::new("x**2", "x", "1", ""));
        assert!(!result.ok);
        assert!(result.steps[6].detail.starts_with("computation exceeded budget"));
    }

    #[test]
    fn test_without_engine() {
        let pipeline = DerivativePipeline::new(None, PipelineSettings::default());
        let result = pipeline.run(&ProblemInput::new("x**2", "x", "1", ""));
        assert!(!result.ok);
        assert_eq!(result.algebra_version, NOT_INSTALLED);
        assert_eq!(result.steps[1].status, StepStatus::Fail);
        assert_eq!(result.steps.len(), 6);
    }

    #[test]
    fn test_timestamp_text_and_json() {
        let result = run("x", "x", "1", "");
        let text = result.timestamp_text();
        assert_eq!(text.len(), 20);
        assert_eq!(&text[10..12], "  ");
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["ok"], true);
        assert_eq!(json["answer"]["symbolic"], "1");
        assert_eq!(json["steps"][0]["status"], "PASS");
        assert_eq!(json["point_value"]["status"], "not_requested");
        assert!(json["timestamp"].as_str().unwrap().contains('T'));
    }
}
