//! # Representation of optimal solutions
//!
//! Once a linear program is fully solved, a solution is derived. It contains every variable of
//! the final program, slacks included, so a reader can check it against any of the intermediate
//! forms.
use std::fmt;

use crate::data::affine::variable::Variable;

/// A feasible assignment together with the objective value it attains.
///
/// Values are listed in the order in which the variables entered the problem: decision variables
/// first, in declaration order, then slacks in the order they were introduced.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Solution<OF> {
    /// Value of the objective function under this assignment, in the problem's original
    /// optimization direction.
    objective_value: OF,
    /// (variable, value) pairs for all variables of the final program.
    values: Vec<(Variable, OF)>,
}

impl<OF> Solution<OF> {
    /// Create a new `Solution` instance.
    ///
    /// A plain constructor.
    pub fn new(objective_value: OF, values: Vec<(Variable, OF)>) -> Self {
        Self { objective_value, values }
    }

    /// Value of the objective function under this assignment.
    pub fn objective_value(&self) -> &OF {
        &self.objective_value
    }

    /// All (variable, value) pairs, in the order the variables entered the problem.
    pub fn values(&self) -> &[(Variable, OF)] {
        &self.values
    }

    /// The value a specific variable takes, if it is part of the solution.
    pub fn value_of(&self, variable: &Variable) -> Option<&OF> {
        self.values
            .iter()
            .find(|(candidate, _)| candidate == variable)
            .map(|(_, value)| value)
    }
}

impl<OF: fmt::Display> fmt::Display for Solution<OF> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "objective value: {}", self.objective_value)?;
        for (variable, value) in &self.values {
            writeln!(f, "{variable} = {value}")?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod test {
    use relp_num::{R64, Rational64};

    use crate::data::affine::variable::Variable;
    use crate::data::linear_program::solution::Solution;

    #[test]
    fn lookup_and_display() {
        let solution: Solution<Rational64> = Solution::new(
            R64!(25),
            vec![
                (Variable::new("x_1"), R64!(5)),
                (Variable::new("x_2"), R64!(10)),
            ],
        );

        assert_eq!(solution.objective_value(), &R64!(25));
        assert_eq!(solution.value_of(&Variable::new("x_2")), Some(&R64!(10)));
        assert_eq!(solution.value_of(&Variable::new("x_9")), None);
        assert_eq!(solution.to_string(), "objective value: 25\nx_1 = 5\nx_2 = 10\n");
    }
}
