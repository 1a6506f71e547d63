//! Plain-text solution trail of one [`ComputationResult`].
//! The report only reads the record; success is whatever `ok` says.
use crate::derivative::derivative_computer::{EVALUATION_ERROR_SENTINEL, PointValue};
use crate::derivative::result_assembler::ComputationResult;
use tabled::{builder::Builder, settings::Style};

const TITLE: &str = "SYMBOLIC DERIVATIVE GENERATOR: SOLUTION TRAIL";
const RULE_WIDTH: usize = 62;

fn section(report: &mut String, number: usize, title: &str) {
    report.push_str(&format!("({}) {}\n", number, title));
    report.push_str(&"-".repeat(RULE_WIDTH));
    report.push('\n');
}

fn line(report: &mut String, key: &str, value: &str) {
    report.push_str(&format!("   {:<14}:  {}\n", key, value));
}

/// Table of the validation steps in record order.
pub fn steps_table(result: &ComputationResult) -> String {
    let mut builder = Builder::default();
    builder.push_record(["#", "check", "status", "detail"].map(String::from));
    for step in &result.steps {
        builder.push_record([
            step.ordinal.to_string(),
            step.label.clone(),
            step.status.to_string(),
            step.detail.clone(),
        ]);
    }
    let mut table = builder.build();
    table.with(Style::modern_rounded());
    table.to_string()
}

pub fn render_trail(result: &ComputationResult) -> String {
    let var = result.display_var();
    let order = result.display_order();
    let mut report = String::new();
    report.push_str(&"=".repeat(RULE_WIDTH));
    report.push_str(&format!("\n   {}\n", TITLE));
    report.push_str(&"=".repeat(RULE_WIDTH));
    report.push_str("\n\n");

    section(&mut report, 1, "GIVEN");
    line(&mut report, &format!("f({})", var), result.raw_fx.trim());
    line(&mut report, "Variable", var);
    line(&mut report, "Order (n)", &order.to_string());
    let point = result.raw_point.trim();
    line(
        &mut report,
        "Evaluate at",
        if point.is_empty() { "Not specified" } else { point },
    );
    report.push('\n');

    section(&mut report, 2, "VALIDATION");
    report.push_str(&steps_table(result));
    report.push_str("\n\n");

    let mut number = 3;
    if !result.field_errors.is_empty() {
        section(&mut report, number, "FIELD ERRORS");
        for (field, message) in result.field_errors.iter() {
            line(&mut report, &field.to_string(), message);
        }
        report.push('\n');
        number += 1;
    }

    section(&mut report, number, "FINAL ANSWER");
    report.push_str(&format!(
        "   d^{}/d{}^{} [{}]  =  {}\n\n",
        order,
        var,
        order,
        result.raw_fx.trim(),
        result.answer.text()
    ));
    number += 1;

    section(&mut report, number, "EVALUATION");
    match &result.point_value {
        PointValue::NotRequested => line(&mut report, "Value", "not requested"),
        PointValue::Value { text, .. } => {
            line(&mut report, &format!("at {} = {}", var, point), text)
        }
        PointValue::EvaluationError { message } => {
            line(&mut report, &format!("at {} = {}", var, point), &point_error(message))
        }
    }
    report.push('\n');
    number += 1;

    section(&mut report, number, "SUMMARY");
    line(&mut report, "Timestamp", &result.timestamp_text());
    line(&mut report, "Runtime", &result.runtime_version);
    line(&mut report, "Algebra", &result.algebra_version);
    line(&mut report, "Status", if result.ok { "OK" } else { "FAILED" });
    report.push_str(&"=".repeat(RULE_WIDTH));
    report.push('\n');
    report
}

fn point_error(message: &str) -> String {
    format!("{} ({})", EVALUATION_ERROR_SENTINEL, message)
}
