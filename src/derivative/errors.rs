use crate::derivative::validation_step::FieldName;
use crate::symbolic::symbolic_traits::AlgebraError;
use thiserror::Error;

/// Every way a derivative request can go wrong.
///
/// The `Display` text is the detail written into the trail and carries the actionable hint;
/// `field_message` is the short text shown next to the offending input.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ProblemError {
    #[error("f(x) cannot be empty.")]
    EmptyInput,
    #[error("Algebra engine is not available.  Hint: set algebra_backend = \"native\" in the configuration.")]
    EngineUnavailable,
    #[error("Cannot parse expression. {message}  Hint: use Python syntax, e.g. x**3 + 2*x - 1")]
    Parse { message: String },
    #[error("'{value}' is not a single letter (a-z / A-Z).")]
    InvalidVariable { value: String },
    #[error("'{value}' is not an integer.  Hint: enter a whole number, e.g. 1, 2, 3.")]
    NonIntegerOrder { value: String },
    #[error("{order} is out of range.  Allowed: 1 <= n <= 10.")]
    OrderOutOfRange { order: i64 },
    #[error("'{value}' is not a number.  Leave blank or enter a real number, e.g. 0, 2.5, -1.")]
    InvalidPoint { value: String },
    /// fatal to the request, reported as an extra trail step
    #[error("{message}")]
    Computation { message: String },
}

impl ProblemError {
    /// Input field the error is attributed to, if any.
    pub fn field(&self) -> Option<FieldName> {
        match self {
            ProblemError::EmptyInput
            | ProblemError::EngineUnavailable
            | ProblemError::Parse { .. } => Some(FieldName::Fx),
            ProblemError::InvalidVariable { .. } => Some(FieldName::Var),
            ProblemError::NonIntegerOrder { .. } | ProblemError::OrderOutOfRange { .. } => {
                Some(FieldName::Order)
            }
            ProblemError::InvalidPoint { .. } => Some(FieldName::Point),
            ProblemError::Computation { .. } => None,
        }
    }

    /// Short message for the field error map.
    pub fn field_message(&self) -> Option<&'static str> {
        let message = match self {
            ProblemError::EmptyInput => "f(x) cannot be empty.",
            ProblemError::EngineUnavailable => "Algebra engine not available.",
            ProblemError::Parse { .. } => "Not a valid math expression.",
            ProblemError::InvalidVariable { .. } => "Must be a single letter, e.g. x, y, t.",
            ProblemError::NonIntegerOrder { .. } => "Must be a whole number (1-10).",
            ProblemError::OrderOutOfRange { .. } => "Order must be between 1 and 10.",
            ProblemError::InvalidPoint { .. } => "Must be a number or left blank.",
            ProblemError::Computation { .. } => return None,
        };
        Some(message)
    }
}

impl From<AlgebraError> for ProblemError {
    /// Capability failures met while computing are fatal to the request.
    fn from(error: AlgebraError) -> Self {
        ProblemError::Computation {
            message: error.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_carry_hints() {
        let err = ProblemError::NonIntegerOrder {
            value: "1.5".into(),
        };
        assert_eq!(
            err.to_string(),
            "'1.5' is not an integer.  Hint: enter a whole number, e.g. 1, 2, 3."
        );
        let err = ProblemError::OrderOutOfRange { order: 11 };
        assert_eq!(err.to_string(), "11 is out of range.  Allowed: 1 <= n <= 10.");
        let err = ProblemError::Parse {
            message: "unknown function 'f'".into(),
        };
        assert!(err.to_string().contains("Hint: use Python syntax"));
    }

    #[test]
    fn test_fields() {
        assert_eq!(ProblemError::EmptyInput.field(), Some(FieldName::Fx));
        assert_eq!(
            ProblemError::InvalidPoint { value: "a".into() }.field_message(),
            Some("Must be a number or left blank.")
        );
        let computation = ProblemError::Computation {
            message: "boom".into(),
        };
        assert_eq!(computation.field(), None);
        assert_eq!(computation.field_message(), None);
    }

    #[test]
    fn test_from_algebra_error() {
        let err: ProblemError = AlgebraError::TooLarge { nodes: 9, limit: 5 }.into();
        assert_eq!(
            err,
            ProblemError::Computation {
                message: "expression too large: 9 nodes exceeds the limit of 5".into()
            }
        );
    }
}
