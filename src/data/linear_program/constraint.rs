//! # Symbolic constraints
//!
//! A constraint keeps both of its sides as full affine expressions rather than as a coefficient
//! row. That is redundant for solving, but it is exactly what makes a solve replayable: each
//! rewriting step maps one readable equation onto the next.
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::mem;

use num_traits::{One, Zero};
use relp_num::{OrderedField, OrderedFieldRef};

use crate::data::affine::expression::LinearExpression;
use crate::data::affine::variable::Variable;
use crate::data::linear_program::elements::ConstraintRelation;
use crate::data::linear_program::error::SolveError;

/// Two affine expressions joined by an (in)equality.
///
/// Once a slack or decision variable has been solved for, it is remembered as the constraint's
/// basic variable. Substitutions ordered by a pivot are recorded first and expanded separately,
/// so that both the substituted and the expanded form of the constraint can be observed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Constraint<OF> {
    /// Left-hand side.
    lhs: LinearExpression<OF>,
    /// How the two sides relate.
    relation: ConstraintRelation,
    /// Right-hand side.
    rhs: LinearExpression<OF>,
    /// Replacements recorded by a pivot but not yet expanded into the two sides.
    substitutions: BTreeMap<Variable, LinearExpression<OF>>,
    /// The variable this constraint is solved for, if any.
    basic_variable: Option<Variable>,
}

impl<OF> Constraint<OF> {
    /// Left-hand side of the constraint.
    pub fn lhs(&self) -> &LinearExpression<OF> {
        &self.lhs
    }

    /// How the two sides relate.
    pub fn relation(&self) -> ConstraintRelation {
        self.relation
    }

    /// Right-hand side of the constraint.
    pub fn rhs(&self) -> &LinearExpression<OF> {
        &self.rhs
    }

    /// The variable this constraint is solved for, if any.
    pub fn basic_variable(&self) -> Option<&Variable> {
        self.basic_variable.as_ref()
    }

    /// Replacements recorded by a pivot but not yet expanded.
    pub fn substitutions(&self) -> &BTreeMap<Variable, LinearExpression<OF>> {
        &self.substitutions
    }

    /// All variables appearing on either side, in name order.
    pub fn variables(&self) -> BTreeSet<&Variable> {
        self.lhs.variables().chain(self.rhs.variables()).collect()
    }
}

impl<OF> Constraint<OF>
where
    OF: OrderedField,
    for<'r> &'r OF: OrderedFieldRef<OF>,
{
    /// Create a new constraint relating two expressions.
    pub fn new(
        lhs: LinearExpression<OF>,
        relation: ConstraintRelation,
        rhs: LinearExpression<OF>,
    ) -> Self {
        Self {
            lhs,
            relation,
            rhs,
            substitutions: BTreeMap::new(),
            basic_variable: None,
        }
    }

    /// Rewrite into canonical orientation: variables left, scalars right, relation `<=` or `=`.
    ///
    /// All variable terms are collected on the left-hand side and all constants on the right.
    /// A `>=` constraint is then negated on both sides, turning it into a `<=` constraint.
    pub fn canonize(&mut self) {
        let moved_variables = self.rhs.variable_part();
        let lhs_constant = LinearExpression::from_constant(self.lhs.constant().clone());
        let rhs_constant = LinearExpression::from_constant(self.rhs.constant().clone());

        self.lhs = self.lhs.clone() - moved_variables - lhs_constant.clone();
        self.rhs = rhs_constant - lhs_constant;

        if self.relation == ConstraintRelation::Greater {
            self.lhs = -self.lhs.clone();
            self.rhs = -self.rhs.clone();
            self.relation = !self.relation;
        }
    }

    /// Absorb the inequality into a fresh slack variable.
    ///
    /// The variable is added to the left-hand side with coefficient one and the relation becomes
    /// an equality. It is remembered as this constraint's basic variable: at the origin, it is
    /// the slack that represents the constraint in the basis.
    ///
    /// The constraint must be in canonical orientation and must not contain the variable yet.
    pub fn add_deviation(&mut self, variable: Variable) {
        debug_assert_eq!(self.relation, ConstraintRelation::Less);
        debug_assert!(self.lhs.coefficient(&variable).is_zero());
        debug_assert!(self.rhs.coefficient(&variable).is_zero());

        self.lhs.add_term(variable.clone(), OF::one());
        self.relation = ConstraintRelation::Equal;
        self.basic_variable = Some(variable);
    }

    /// Solve the constraint for a variable, making it the basic variable.
    ///
    /// Both sides are rewritten such that the left-hand side is exactly `variable` and the
    /// right-hand side is an expression free of it: from `lhs = rhs`, the variable's net
    /// coefficient `c` is determined and the sides become `variable = (rhs - lhs + c * variable) / c`.
    ///
    /// # Arguments
    ///
    /// * `variable`: Variable to solve for. It must appear in the constraint.
    ///
    /// # Errors
    ///
    /// If the variable's net coefficient is zero, solving for it is not possible.
    pub fn in_base(&mut self, variable: &Variable) -> Result<(), SolveError<OF>> {
        let coefficient = self.lhs.coefficient(variable) - &self.rhs.coefficient(variable);
        if coefficient.is_zero() {
            return Err(SolveError::DegenerateBasis {
                variable: variable.clone(),
                constraint: None,
            });
        }

        let mut solved = self.rhs.clone() - self.lhs.clone();
        solved.add_term(variable.clone(), coefficient.clone());
        solved.divide(&coefficient);
        debug_assert!(solved.coefficient(variable).is_zero());

        self.lhs = LinearExpression::from_variable(variable.clone());
        self.rhs = solved;
        self.relation = ConstraintRelation::Equal;
        self.basic_variable = Some(variable.clone());

        Ok(())
    }

    /// The nonnegativity requirement this constraint puts on a candidate entering variable.
    ///
    /// With every variable other than the candidate held at zero, the basic variable's value
    /// reduces to `rhs` restricted to the candidate and the constant; requiring it to stay
    /// nonnegative yields the returned constraint. Canonizing that constraint and scaling it to
    /// coefficient one turns it into an upper bound on the candidate, if it bounds it at all.
    pub fn ratio_constraint(&self, candidate: &Variable) -> Self {
        Self {
            lhs: self.rhs.restricted_to(candidate),
            relation: ConstraintRelation::Greater,
            rhs: LinearExpression::zero(),
            substitutions: BTreeMap::new(),
            basic_variable: None,
        }
    }

    /// Divide both sides by a positive value, keeping the relation.
    pub fn divide_both(&mut self, divisor: &OF) {
        debug_assert!(divisor > &OF::zero());

        self.lhs.divide(divisor);
        self.rhs.divide(divisor);
    }

    /// Record a replacement to be expanded by a later `apply_substitutions` call.
    pub fn defer_substitution(&mut self, variable: Variable, replacement: LinearExpression<OF>) {
        self.substitutions.insert(variable, replacement);
    }

    /// Expand all recorded replacements into both sides.
    pub fn apply_substitutions(&mut self) {
        if self.substitutions.is_empty() {
            return;
        }

        let replacements = mem::take(&mut self.substitutions);
        self.lhs.substitute(&replacements);
        self.rhs.substitute(&replacements);
    }

    /// Whether an assignment of values to variables satisfies the constraint.
    pub fn holds_under(&self, value_of: impl Fn(&Variable) -> OF) -> bool {
        let left = self.lhs.evaluate(&value_of);
        let right = self.rhs.evaluate(&value_of);

        match self.relation {
            ConstraintRelation::Less => left <= right,
            ConstraintRelation::Equal => left == right,
            ConstraintRelation::Greater => left >= right,
        }
    }
}

impl<OF> fmt::Display for Constraint<OF>
where
    OF: OrderedField + fmt::Display,
    for<'r> &'r OF: OrderedFieldRef<OF>,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.lhs, self.relation, self.rhs)
    }
}

#[cfg(test)]
mod test {
    use relp_num::{R64, Rational64};

    use crate::data::affine::expression::LinearExpression;
    use crate::data::affine::variable::Variable;
    use crate::data::linear_program::constraint::Constraint;
    use crate::data::linear_program::elements::ConstraintRelation;

    fn x(i: u64) -> Variable {
        Variable::new(format!("x_{i}"))
    }

    fn expression(
        terms: Vec<(Rational64, Variable)>,
        constant: Rational64,
    ) -> LinearExpression<Rational64> {
        let mut expression = LinearExpression::from_constant(constant);
        for (coefficient, variable) in terms {
            expression.add_term(variable, coefficient);
        }
        expression
    }

    #[test]
    fn canonize_moves_terms_across() {
        // 2 x_1 + 3 <= x_2 + 10 becomes 2 x_1 - x_2 <= 7
        let mut constraint = Constraint::new(
            expression(vec![(R64!(2), x(1))], R64!(3)),
            ConstraintRelation::Less,
            expression(vec![(R64!(1), x(2))], R64!(10)),
        );
        constraint.canonize();

        assert_eq!(
            constraint,
            Constraint::new(
                expression(vec![(R64!(2), x(1)), (R64!(-1), x(2))], R64!(0)),
                ConstraintRelation::Less,
                expression(vec![], R64!(7)),
            ),
        );
    }

    #[test]
    fn canonize_negates_greater_constraints() {
        // x_1 >= 5 becomes -x_1 <= -5
        let mut constraint = Constraint::new(
            expression(vec![(R64!(1), x(1))], R64!(0)),
            ConstraintRelation::Greater,
            expression(vec![], R64!(5)),
        );
        constraint.canonize();

        assert_eq!(
            constraint,
            Constraint::new(
                expression(vec![(R64!(-1), x(1))], R64!(0)),
                ConstraintRelation::Less,
                expression(vec![], R64!(-5)),
            ),
        );
    }

    #[test]
    fn canonize_twice_changes_nothing() {
        let mut constraint = Constraint::new(
            expression(vec![(R64!(2), x(1)), (R64!(-3), x(2))], R64!(1)),
            ConstraintRelation::Greater,
            expression(vec![(R64!(1), x(3))], R64!(4)),
        );
        constraint.canonize();

        let once = constraint.clone();
        constraint.canonize();
        assert_eq!(constraint, once);
    }

    #[test]
    fn deviation_variable_becomes_basic() {
        let mut constraint = Constraint::new(
            expression(vec![(R64!(1), x(1)), (R64!(1), x(2))], R64!(0)),
            ConstraintRelation::Less,
            expression(vec![], R64!(15)),
        );
        constraint.add_deviation(x(3));

        assert_eq!(constraint.relation(), ConstraintRelation::Equal);
        assert_eq!(constraint.basic_variable(), Some(&x(3)));
        assert_eq!(constraint.lhs().coefficient(&x(3)), R64!(1));
    }

    #[test]
    fn solving_for_a_variable() {
        // 2 x_1 + 4 x_2 = 8 solved for x_1 gives x_1 = 4 - 2 x_2
        let mut constraint = Constraint::new(
            expression(vec![(R64!(2), x(1)), (R64!(4), x(2))], R64!(0)),
            ConstraintRelation::Equal,
            expression(vec![], R64!(8)),
        );
        constraint.in_base(&x(1)).unwrap();

        assert_eq!(constraint.lhs(), &expression(vec![(R64!(1), x(1))], R64!(0)));
        assert_eq!(constraint.rhs(), &expression(vec![(R64!(-2), x(2))], R64!(4)));
        assert_eq!(constraint.basic_variable(), Some(&x(1)));
    }

    #[test]
    fn solving_for_an_absent_variable_fails() {
        let mut constraint = Constraint::new(
            expression(vec![(R64!(1), x(1))], R64!(0)),
            ConstraintRelation::Equal,
            expression(vec![], R64!(8)),
        );

        assert!(constraint.in_base(&x(9)).is_err());
    }

    #[test]
    fn ratio_constraint_bounds_the_candidate() {
        // x_3 = 30 - 2 x_1 - x_2 bounds x_1 by 30 - 2 x_1 >= 0, i.e. x_1 <= 15
        let mut constraint = Constraint::new(
            expression(vec![(R64!(1), x(3))], R64!(0)),
            ConstraintRelation::Equal,
            expression(vec![(R64!(-2), x(1)), (R64!(-1), x(2))], R64!(30)),
        );

        let mut ratio = constraint.ratio_constraint(&x(1));
        assert_eq!(
            ratio,
            Constraint::new(
                expression(vec![(R64!(-2), x(1))], R64!(30)),
                ConstraintRelation::Greater,
                expression(vec![], R64!(0)),
            ),
        );

        ratio.canonize();
        ratio.divide_both(&R64!(2));
        assert_eq!(
            ratio,
            Constraint::new(
                expression(vec![(R64!(1), x(1))], R64!(0)),
                ConstraintRelation::Less,
                expression(vec![], R64!(15)),
            ),
        );
    }

    #[test]
    fn substitutions_are_deferred_until_applied() {
        // x_3 = 15 - x_1 - x_2 with x_2 -> 10 - x_4 becomes x_3 = 5 - x_1 + x_4
        let mut constraint = Constraint::new(
            expression(vec![(R64!(1), x(3))], R64!(0)),
            ConstraintRelation::Equal,
            expression(vec![(R64!(-1), x(1)), (R64!(-1), x(2))], R64!(15)),
        );
        constraint.defer_substitution(x(2), expression(vec![(R64!(-1), x(4))], R64!(10)));

        // Not yet expanded.
        assert_eq!(constraint.rhs().coefficient(&x(2)), R64!(-1));
        assert_eq!(constraint.substitutions().len(), 1);

        constraint.apply_substitutions();
        assert_eq!(
            constraint.rhs(),
            &expression(vec![(R64!(-1), x(1)), (R64!(1), x(4))], R64!(5)),
        );
        assert!(constraint.substitutions().is_empty());
    }

    #[test]
    fn satisfaction() {
        let constraint = Constraint::new(
            expression(vec![(R64!(1), x(1)), (R64!(1), x(2))], R64!(0)),
            ConstraintRelation::Less,
            expression(vec![], R64!(15)),
        );

        assert!(constraint.holds_under(|v| if v == &x(1) { R64!(5) } else { R64!(10) }));
        assert!(!constraint.holds_under(|_| R64!(10)));
    }

    #[test]
    fn display() {
        let constraint = Constraint::new(
            expression(vec![(R64!(1), x(1)), (R64!(-2), x(2))], R64!(0)),
            ConstraintRelation::Less,
            expression(vec![], R64!(7)),
        );

        assert_eq!(constraint.to_string(), "x_1 - 2*x_2 <= 7");
    }
}
