//___________________________________END-TO-END TESTS____________________________________
/*
whole pipeline, raw strings in, record out:
step count and ordering
empty and unparsable expressions
order and variable boundaries
blank point vs evaluation error
known derivatives, checked verbatim and numerically
idempotence and determinism
*/
#[cfg(test)]
mod tests {
    use crate::derivative::derivative_computer::PointValue;
    use crate::derivative::result_assembler::{
        Answer, ComputationResult, DerivativePipeline, PipelineSettings, ProblemInput,
    };
    use crate::derivative::samples::sample_problem;
    use crate::derivative::validation_step::{FieldName, StepStatus};
    use crate::symbolic::symbolic_engine::Expr;
    use crate::symbolic::symbolic_traits::{AlgebraCapability, NativeAlgebra};
    use approx::assert_relative_eq;

    fn solve(fx: &str, var: &str, order: &str, point: &str) -> ComputationResult {
        let algebra = NativeAlgebra::default();
        DerivativePipeline::new(Some(&algebra), PipelineSettings::default())
            .run(&ProblemInput::new(fx, var, order, point))
    }

    fn statuses(result: &ComputationResult) -> Vec<StepStatus> {
        result.steps.iter().map(|step| step.status).collect()
    }

    /// Compares two expressions by value at a handful of points.
    fn assert_equivalent(answer: &str, expected: &str, var: &str) {
        assert_equivalent_on(answer, expected, var, &[-2.5, -1.0, 0.3, 1.0, 1.7, 3.0]);
    }

    fn assert_equivalent_on(answer: &str, expected: &str, var: &str, points: &[f64]) {
        let answer = Expr::parse_expression(answer).unwrap();
        let expected = Expr::parse_expression(expected).unwrap();
        for &point in points {
            let lhs = answer.eval_expression(&[var], &[point]).unwrap();
            let rhs = expected.eval_expression(&[var], &[point]).unwrap();
            assert_relative_eq!(lhs, rhs, epsilon = 1e-9, max_relative = 1e-9);
        }
    }

    #[test]
    fn test_six_steps_for_every_input() {
        let inputs = [
            ("", "", "", ""),
            ("x**2", "x", "1", ""),
            ("x +", "x", "1", ""),
            ("x**2", "xy", "1.5", "abc"),
            ("sin(x)", "t", "10", "2"),
            ("   ", "   ", "   ", "   "),
        ];
        for (fx, var, order, point) in inputs {
            let result = solve(fx, var, order, point);
            assert_eq!(result.steps.len(), 6, "{:?}", (fx, var, order, point));
            let ordinals: Vec<u8> = result.steps.iter().map(|step| step.ordinal).collect();
            assert_eq!(ordinals, vec![1, 2, 3, 4, 5, 6]);
        }
    }

    #[test]
    fn test_empty_expression_skips_the_rest() {
        let result = solve("", "x", "1", "");
        assert!(!result.ok);
        assert_eq!(result.steps[0].status, StepStatus::Fail);
        assert_eq!(statuses(&result)[1..], [StepStatus::Skip; 5]);
        assert!(result.field_errors.contains(FieldName::Fx));
        assert_eq!(result.answer, Answer::NotComputed);
    }

    #[test]
    fn test_identical_inputs_identical_records() {
        let first = solve("x**2*sin(x)", "x", "3", "1.5");
        let second = solve("x**2*sin(x)", "x", "3", "1.5");
        assert_eq!(first.steps, second.steps);
        assert_eq!(first.answer, second.answer);
        assert_eq!(first.point_value, second.point_value);
    }

    #[test]
    fn test_order_boundaries() {
        let non_integer = solve("x", "x", "1.5", "");
        assert_eq!(non_integer.steps[3].status, StepStatus::Fail);
        assert_eq!(non_integer.steps[4].status, StepStatus::Skip);
        for (order, status) in [
            ("11", StepStatus::Fail),
            ("10", StepStatus::Pass),
            ("0", StepStatus::Fail),
        ] {
            let result = solve("x**12", "x", order, "");
            assert_eq!(result.steps[4].status, status, "order {}", order);
            assert_eq!(result.ok, status == StepStatus::Pass);
        }
        assert!(solve("x", "x", "11", "").steps[4].detail.contains("out of range"));
    }

    #[test]
    fn test_variable_checked_regardless_of_expression() {
        for var in ["xy", "2"] {
            let result = solve("x**2", var, "1", "");
            assert_eq!(result.steps[2].status, StepStatus::Fail);
            assert!(result.field_errors.contains(FieldName::Var));
        }
        let result = solve("y**2 + 3*y", "y", "1", "2");
        assert!(result.ok);
        assert_eq!(result.answer.text(), "2*y + 3");
        assert_eq!(result.point_value.display_text(), Some("7"));
    }

    #[test]
    fn test_blank_point_is_not_an_evaluation_error() {
        let blank = solve("1/x", "x", "1", "");
        assert_eq!(blank.steps[5].status, StepStatus::Pass);
        assert!(blank.steps[5].detail.contains("evaluation will be skipped"));
        assert_eq!(blank.point_value, PointValue::NotRequested);

        let failed = solve("1/x", "x", "1", "0");
        assert!(failed.ok);
        assert!(matches!(failed.point_value, PointValue::EvaluationError { .. }));
        assert_ne!(blank.point_value, failed.point_value);
        assert_equivalent(failed.answer.text(), "-1/x**2", "x");
    }

    #[test]
    fn test_known_derivatives() {
        let result = solve("x**3 + 2*x**2 - 5*x + 1", "x", "1", "");
        assert_eq!(result.answer.text(), "3*x**2 + 4*x - 5");

        let result = solve("3*x**4 - 7*x**2 + 2", "x", "2", "");
        assert_eq!(result.answer.text(), "36*x**2 - 14");

        let result = solve("x**2 * sin(x)", "x", "1", "0");
        assert!(result.ok);
        let PointValue::Value { value, text } = &result.point_value else {
            panic!("expected a numeric value, got {:?}", result.point_value);
        };
        assert_relative_eq!(*value, 0.0, epsilon = 1e-12);
        assert_eq!(text, "0");
    }

    #[test]
    fn test_transcendental_derivatives_by_value() {
        let cases = [
            ("exp(2*x)", "x", "2", "4*exp(2*x)"),
            ("sin(x)*cos(x)", "x", "1", "cos(x)**2 - sin(x)**2"),
            ("log(x**2 + 1)", "x", "1", "2*x/(x**2 + 1)"),
            ("sqrt(x**2 + 4)", "x", "1", "x/sqrt(x**2 + 4)"),
            ("atan(x)", "x", "1", "1/(1 + x**2)"),
            ("tan(x)", "x", "1", "1/cos(x)**2"),
            ("t**3", "t", "3", "6"),
        ];
        for (fx, var, order, expected) in cases {
            let result = solve(fx, var, order, "");
            assert!(result.ok, "{} failed: {:?}", fx, result.steps);
            assert_equivalent(result.answer.text(), expected, var);
        }
    }

    #[test]
    fn test_trailing_decimal_literals() {
        let result = solve("x**1.5", "x", "1", "4");
        assert!(result.ok);
        assert_equivalent_on(result.answer.text(), "1.5*x**0.5", "x", &[0.3, 1.0, 1.7, 3.0]);
        assert_eq!(result.point_value.display_text(), Some("3"));

        let result = solve("x*0.5", "x", "1", "");
        assert_eq!(result.answer.text(), "0.5");

        let result = solve("(x + 1)*0.25", "x", "1", "2");
        assert_eq!(result.answer.text(), "0.25");
    }

    #[test]
    fn test_cube_root_answer_is_readable() {
        let result = solve("x**(1/3)", "x", "1", "8");
        assert!(result.ok);
        assert_eq!(result.answer.text(), "1/3/x**(2/3)");
        assert_equivalent_on(result.answer.text(), "x**(-2/3)/3", "x", &[0.3, 1.0, 1.7, 3.0]);
        assert_eq!(result.point_value.display_text(), Some("0.0833333"));
    }

    #[test]
    fn test_long_operator_chains_fail_the_parse_check() {
        let long_sum = vec!["x"; 40_000].join("+");
        let sign_run = format!("{}x", "-".repeat(200_000));
        for fx in [long_sum, sign_run] {
            let result = solve(&fx, "x", "1", "");
            assert!(!result.ok);
            assert_eq!(result.steps[1].status, StepStatus::Fail);
            assert!(result.steps[1].detail.contains("operators"), "{}", result.steps[1].detail);
            assert_eq!(statuses(&result)[2..], [StepStatus::Skip; 4]);
            assert_eq!(result.answer, Answer::NotComputed);
        }
        let result = solve(&vec!["x"; 50].join(" + "), "x", "1", "");
        assert!(result.ok);
        assert_eq!(result.answer.text(), "50");
    }

    #[test]
    fn test_answers_are_idempotent_under_simplify() {
        let algebra = NativeAlgebra::default();
        for fx in [
            "x**3 + 2*x**2 - 5*x + 1",
            "x**2*sin(x)",
            "exp(x)/x",
            "(x + 1)**3",
            "x**x",
        ] {
            let result = solve(fx, "x", "2", "");
            let once = algebra.parse(result.answer.text()).unwrap();
            let once = algebra.simplify(&once).unwrap();
            let twice = algebra.simplify(&once).unwrap();
            assert_eq!(once, twice, "{}", fx);
            assert_eq!(once.to_string(), result.answer.text(), "{}", fx);
        }
    }

    #[test]
    fn test_samples_solve() {
        let answers = ["3*x**2 + 4*x - 5", "36*x**2 - 14", "x**4 + cos(x)"];
        for (number, expected) in (1..=3).zip(answers) {
            let input = sample_problem(number).unwrap();
            let algebra = NativeAlgebra::default();
            let result =
                DerivativePipeline::new(Some(&algebra), PipelineSettings::default()).run(&input);
            assert!(result.ok);
            assert_eq!(result.answer.text(), expected);
        }
        let third = solve("x**5 / 5 + sin(x)", "x", "1", "0");
        assert_eq!(third.point_value.display_text(), Some("1"));
    }
}
