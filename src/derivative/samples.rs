use crate::derivative::result_assembler::ProblemInput;

/// A built-in problem: expression, order and (possibly blank) evaluation point.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SampleProblem {
    pub fx: &'static str,
    pub order: &'static str,
    pub point: &'static str,
}

pub const SAMPLE_PROBLEMS: [SampleProblem; 3] = [
    SampleProblem {
        fx: "x**3 + 2*x**2 - 5*x + 1",
        order: "1",
        point: "",
    },
    SampleProblem {
        fx: "3*x**4 - 7*x**2 + 2",
        order: "2",
        point: "",
    },
    SampleProblem {
        fx: "x**5 / 5 + sin(x)",
        order: "1",
        point: "0",
    },
];

impl SampleProblem {
    pub fn to_input(&self) -> ProblemInput {
        ProblemInput::new(self.fx, "x", self.order, self.point)
    }
}

/// Sample `number`, counting from 1.
pub fn sample_problem(number: usize) -> Option<ProblemInput> {
    number
        .checked_sub(1)
        .and_then(|index| SAMPLE_PROBLEMS.get(index))
        .map(SampleProblem::to_input)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sample_lookup() {
        assert_eq!(sample_problem(0), None);
        assert_eq!(sample_problem(4), None);
        let third = sample_problem(3).unwrap();
        assert_eq!(third.fx, "x**5 / 5 + sin(x)");
        assert_eq!(third.var, "x");
        assert_eq!(third.point, "0");
    }
}
