//! # Pivot rules
//!
//! Strategies for choosing the variable that enters the basis next.
use num_traits::Zero;
use relp_num::{OrderedField, OrderedFieldRef};

use crate::data::affine::variable::Variable;
use crate::data::linear_program::program::SimplexProgram;

/// Deciding which variable enters the basis.
///
/// During the simplex method, one needs to decide how to move from basic solution to basic
/// solution. The pivot rule describes that behavior: it picks, among the out-of-basis variables
/// with a positive objective coefficient, the one to increase next.
///
/// Once the entering variable is selected, the row to pivot on follows from the minimum ratio
/// test, independent of the strategy.
pub trait PivotRule {
    /// Create a new instance.
    fn new() -> Self;

    /// Select the variable entering the basis, together with its objective coefficient.
    ///
    /// # Return value
    ///
    /// `None` if no out-of-basis variable has a positive objective coefficient; the current
    /// basic solution is then optimal.
    fn select_entering<OF>(&mut self, program: &SimplexProgram<OF>) -> Option<(Variable, OF)>
    where
        OF: OrderedField,
        for<'r> &'r OF: OrderedFieldRef<OF>;
}

/// Pivot on the variable with the largest positive objective coefficient.
///
/// This is the classic textbook rule: per unit increase, that variable improves the objective
/// the most. Ties go to the variable that comes first in name order.
///
/// TODO(ENHANCEMENT): Combined with the first-row tie break of the ratio test, this rule can
///  cycle on degenerate problems; a lexicographic ratio test would remove the iteration cap.
pub struct LargestCoefficient;

impl PivotRule for LargestCoefficient {
    fn new() -> Self {
        Self
    }

    fn select_entering<OF>(&mut self, program: &SimplexProgram<OF>) -> Option<(Variable, OF)>
    where
        OF: OrderedField,
        for<'r> &'r OF: OrderedFieldRef<OF>,
    {
        let mut largest: Option<(&Variable, OF)> = None;
        for (variable, coefficient) in program
            .out_variables()
            .map(|variable| (variable, program.reduced_cost(variable)))
            .filter(|(_, coefficient)| coefficient > &OF::zero())
        {
            match &largest {
                Some((_, selected)) if &coefficient <= selected => {}
                _ => largest = Some((variable, coefficient)),
            }
        }

        largest.map(|(variable, coefficient)| (variable.clone(), coefficient))
    }
}

/// Pivot on the first out-of-basis variable with a positive objective coefficient, in name order.
pub struct FirstPositive;

impl PivotRule for FirstPositive {
    fn new() -> Self {
        Self
    }

    fn select_entering<OF>(&mut self, program: &SimplexProgram<OF>) -> Option<(Variable, OF)>
    where
        OF: OrderedField,
        for<'r> &'r OF: OrderedFieldRef<OF>,
    {
        program
            .out_variables()
            .map(|variable| (variable, program.reduced_cost(variable)))
            .find(|(_, coefficient)| coefficient > &OF::zero())
            .map(|(variable, coefficient)| (variable.clone(), coefficient))
    }
}
