//! Validation and computation of one derivative request.
//!
//! Four raw strings go in (expression, variable, order, optional point); one
//! [`result_assembler::ComputationResult`] comes out, carrying the per-check trail, the per-field
//! errors and the simplified derivative.
//!
//!# Example
//! ```
//! use RustedDeriv::derivative::result_assembler::{DerivativePipeline, PipelineSettings, ProblemInput};
//! use RustedDeriv::symbolic::symbolic_traits::NativeAlgebra;
//! let algebra = NativeAlgebra::default();
//! let pipeline = DerivativePipeline::new(Some(&algebra), PipelineSettings::default());
//! let result = pipeline.run(&ProblemInput::new("x**2*sin(x)", "x", "1", "0"));
//! assert!(result.ok);
//! assert_eq!(result.answer.text(), "x**2*cos(x) + 2*x*sin(x)");
//! assert_eq!(result.point_value.display_text(), Some("0"));
//! ```

/// the record of a single check and the per-field error map
pub mod validation_step;
/// error taxonomy with user-facing hints
pub mod errors;
/// the six checks as a state machine
pub mod field_validator;
/// symbolic computation with a hard/soft error split
pub mod derivative_computer;
/// result record, assembler and the pipeline entry point
pub mod result_assembler;
/// plain-text solution trail
pub mod trail_report;
pub mod samples;
mod derivative_tests;
