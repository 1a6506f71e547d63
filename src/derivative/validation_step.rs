//! Records of the validation trail: one [`ValidationStep`] per check, plus the per-field
//! error map shown next to the input fields.
use serde::Serialize;
use std::collections::BTreeMap;
use strum_macros::{Display, EnumIter};

/// Outcome of one check. `Skip` means the check's guard failed, it never ran.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, Serialize)]
#[strum(serialize_all = "UPPERCASE")]
#[serde(rename_all = "UPPERCASE")]
pub enum StepStatus {
    Pass,
    Fail,
    Skip,
    /// advisory, not a failure
    Warn,
}

/// The four user-editable inputs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Display, Serialize)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum FieldName {
    Fx,
    Var,
    Order,
    Point,
}

/// The six validation checks in trail order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter)]
pub enum Check {
    FxPresent,
    FxParses,
    Variable,
    OrderInteger,
    OrderRange,
    Point,
}

impl Check {
    pub fn ordinal(self) -> u8 {
        match self {
            Check::FxPresent => 1,
            Check::FxParses => 2,
            Check::Variable => 3,
            Check::OrderInteger => 4,
            Check::OrderRange => 5,
            Check::Point => 6,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Check::FxPresent => "f(x) field: required, not empty",
            Check::FxParses => "f(x): expression parse check",
            Check::Variable => "Variable: single alpha char",
            Check::OrderInteger => "Derivative order: integer",
            Check::OrderRange => "Derivative order: range 1-10",
            Check::Point => "Evaluate at point: numeric (opt)",
        }
    }

    pub fn field(self) -> FieldName {
        match self {
            Check::FxPresent | Check::FxParses => FieldName::Fx,
            Check::Variable => FieldName::Var,
            Check::OrderInteger | Check::OrderRange => FieldName::Order,
            Check::Point => FieldName::Point,
        }
    }
}

/// Ordinal of the step appended when the computation itself fails.
pub const COMPUTATION_ORDINAL: u8 = 7;
pub const COMPUTATION_LABEL: &str = "Symbolic computation";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValidationStep {
    pub ordinal: u8,
    pub label: String,
    pub status: StepStatus,
    pub detail: String,
}

impl ValidationStep {
    pub fn new(ordinal: u8, label: &str, status: StepStatus, detail: impl Into<String>) -> Self {
        ValidationStep {
            ordinal,
            label: label.to_string(),
            status,
            detail: detail.into(),
        }
    }

    pub fn for_check(check: Check, status: StepStatus, detail: impl Into<String>) -> Self {
        Self::new(check.ordinal(), check.label(), status, detail)
    }

    pub fn computation_failure(detail: impl Into<String>) -> Self {
        Self::new(COMPUTATION_ORDINAL, COMPUTATION_LABEL, StepStatus::Fail, detail)
    }
}

/// At most one message per field, iterated in field order.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct FieldErrors(BTreeMap<FieldName, String>);

impl FieldErrors {
    pub fn new() -> Self {
        FieldErrors(BTreeMap::new())
    }

    /// Replaces any earlier message for the same field.
    pub fn insert(&mut self, field: FieldName, message: impl Into<String>) {
        self.0.insert(field, message.into());
    }

    pub fn get(&self, field: FieldName) -> Option<&str> {
        self.0.get(&field).map(String::as_str)
    }

    pub fn contains(&self, field: FieldName) -> bool {
        self.0.contains_key(&field)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (FieldName, &str)> {
        self.0.iter().map(|(field, message)| (*field, message.as_str()))
    }
}
