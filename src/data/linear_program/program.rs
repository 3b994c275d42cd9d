//! # The program being solved
//!
//! `SimplexProgram` is the single value that moves through the whole pipeline. Every
//! transformation of the simplex method is a method on it that rewrites the constraints in place,
//! advances the stage marker and leaves a one-sentence account of what was done. The solver in
//! the `algorithm` module does nothing but call these methods in order and photograph the result
//! after each one.
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use itertools::Itertools;
use num_traits::Zero;
use relp_num::{OrderedField, OrderedFieldRef};

use crate::data::affine::expression::LinearExpression;
use crate::data::affine::variable::Variable;
use crate::data::linear_program::constraint::Constraint;
use crate::data::linear_program::elements::{ConstraintRelation, Objective, Stage};
use crate::data::linear_program::error::{InfeasibleOrigin, SolveError};
use crate::data::linear_program::solution::Solution;

/// Name of the variable holding the objective value.
///
/// The name is reserved; the input layer rejects problems declaring a variable of this name.
pub const OBJECTIVE_NAME: &str = "z";

/// A linear program in whichever form it has currently been rewritten to.
///
/// The objective is kept as a constraint `z = utility`, so that eliminating an entering variable
/// from it works exactly like eliminating it from any other constraint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SimplexProgram<OF> {
    /// Short name of the problem. May be empty.
    title: String,
    /// Free-form description of the problem. May be empty.
    description: String,
    /// All variables, in the order they entered the problem: declared ones first, then slacks.
    variables: Vec<Variable>,
    /// Optimization direction as stated by the modeller. Never changes.
    stated_objective: Objective,
    /// Current optimization direction. Becomes `Maximize` when the canonical form is taken.
    objective: Objective,
    /// The objective function, held as the constraint `z = utility`.
    utility: Constraint<OF>,
    /// The constraint rows.
    constraints: Vec<Constraint<OF>>,
    /// Variables currently in the basis.
    base: BTreeSet<Variable>,
    /// Variables currently out of the basis, all held at zero.
    out: BTreeSet<Variable>,
    /// Value of every variable at the current basic solution. Empty before the first basic
    /// solution is read off.
    current_solution: BTreeMap<Variable, OF>,
    /// How far along the pipeline this program is.
    stage: Stage,
    /// One-sentence account of the latest transformation.
    comment: String,
}

impl<OF> SimplexProgram<OF> {
    /// The reserved variable holding the objective value.
    pub fn objective_variable() -> Variable {
        Variable::new(OBJECTIVE_NAME)
    }

    /// Short name of the problem. May be empty.
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Free-form description of the problem. May be empty.
    pub fn description(&self) -> &str {
        &self.description
    }

    /// All variables in the order they entered the problem.
    pub fn variables(&self) -> &[Variable] {
        &self.variables
    }

    /// Optimization direction as stated by the modeller.
    pub fn stated_objective(&self) -> Objective {
        self.stated_objective
    }

    /// Current optimization direction.
    pub fn objective(&self) -> Objective {
        self.objective
    }

    /// The objective function as the constraint `z = utility`.
    pub fn utility_constraint(&self) -> &Constraint<OF> {
        &self.utility
    }

    /// The objective function's expression.
    pub fn utility(&self) -> &LinearExpression<OF> {
        self.utility.rhs()
    }

    /// The constraint rows.
    pub fn constraints(&self) -> &[Constraint<OF>] {
        &self.constraints
    }

    /// Variables currently out of the basis, in name order.
    pub fn out_variables(&self) -> impl Iterator<Item = &Variable> {
        self.out.iter()
    }

    /// Variables currently in the basis, in name order.
    pub fn basic_variables(&self) -> impl Iterator<Item = &Variable> {
        self.base.iter()
    }

    /// How far along the pipeline this program is.
    pub fn stage(&self) -> Stage {
        self.stage
    }

    /// Whether any constraint or the objective still holds an unexpanded substitution.
    pub fn has_pending_substitutions(&self) -> bool {
        self.constraints.iter().any(|constraint| !constraint.substitutions().is_empty())
            || !self.utility.substitutions().is_empty()
    }

    /// One-sentence account of the latest transformation.
    pub fn comment(&self) -> &str {
        &self.comment
    }
}

impl<OF> SimplexProgram<OF>
where
    OF: OrderedField,
    for<'r> &'r OF: OrderedFieldRef<OF>,
{
    /// Create a program in its initial form.
    ///
    /// # Arguments
    ///
    /// * `objective`: Direction of optimization as stated.
    /// * `utility`: The objective function; the program will hold it as `z = utility`.
    /// * `constraints`: Constraint rows, in statement order.
    /// * `variables`: Declared decision variables, in statement order. All variables of the
    ///   utility and the constraints must be among them, and the objective name is reserved.
    pub fn new(
        objective: Objective,
        utility: LinearExpression<OF>,
        constraints: Vec<Constraint<OF>>,
        variables: Vec<Variable>,
    ) -> Self {
        let program = Self {
            title: String::new(),
            description: String::new(),
            variables,
            stated_objective: objective,
            objective,
            utility: Constraint::new(
                LinearExpression::from_variable(Self::objective_variable()),
                ConstraintRelation::Equal,
                utility,
            ),
            constraints,
            base: BTreeSet::new(),
            out: BTreeSet::new(),
            current_solution: BTreeMap::new(),
            stage: Stage::Initial,
            comment: "The problem as stated.".to_string(),
        };
        debug_assert!(program.is_consistent());

        program
    }

    /// Set the problem title.
    #[must_use]
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    /// Set the problem description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// The coefficient of a variable in the current objective expression.
    ///
    /// Once the program is in standard form, this is the amount by which the objective changes
    /// per unit increase of an out-of-basis variable.
    pub fn reduced_cost(&self, variable: &Variable) -> OF {
        self.utility.rhs().coefficient(variable)
    }

    /// Rewrite into canonical form.
    ///
    /// Every constraint gets its variables on the left and its scalars on the right, `>=`
    /// constraints are negated into `<=` constraints and a minimization is turned into a
    /// maximization by negating the objective function.
    pub fn canonical_form(&mut self) {
        debug_assert_eq!(self.stage, Stage::Initial);

        let mut notes = Vec::new();
        if self.objective == Objective::Minimize {
            let negated = -self.utility.rhs().clone();
            self.utility = Constraint::new(
                LinearExpression::from_variable(Self::objective_variable()),
                ConstraintRelation::Equal,
                negated,
            );
            self.objective = Objective::Maximize;
            notes.push(
                "The minimization is turned into a maximization by negating the objective \
                function; the optimum of the stated problem is the negation of the optimum found."
                    .to_string(),
            );
        }

        if self.constraints.iter().any(|c| c.relation() == ConstraintRelation::Greater) {
            notes.push(
                "Constraints of type >= are negated on both sides into constraints of type <=."
                    .to_string(),
            );
        }
        for constraint in &mut self.constraints {
            constraint.canonize();
        }

        notes.push(
            "Variables are collected on the left of each constraint, scalars on the right."
                .to_string(),
        );
        self.stage = Stage::Canonical;
        self.comment = notes.join(" ");
        debug_assert!(self.is_consistent());
    }

    /// Rewrite into augmented form by adding slack variables.
    ///
    /// Every inequality receives a fresh nonnegative slack variable that absorbs the difference
    /// between its two sides; afterwards all constraints are equalities. The slack is the
    /// constraint's first basic variable.
    pub fn augment(&mut self) {
        debug_assert_eq!(self.stage, Stage::Canonical);

        let mut added = Vec::new();
        for index in 0..self.constraints.len() {
            if self.constraints[index].relation() == ConstraintRelation::Less {
                let slack = self.fresh_variable();
                self.variables.push(slack.clone());
                self.constraints[index].add_deviation(slack.clone());
                added.push(slack);
            }
        }

        self.stage = Stage::Augmented;
        self.comment = if added.is_empty() {
            "All constraints are already equalities; no slack variables are needed.".to_string()
        } else {
            format!(
                "Slack variable{} {} absorb{} the inequalit{}; every constraint is now an \
                equality.",
                if added.len() == 1 { "" } else { "s" },
                added.iter().join(", "),
                if added.len() == 1 { "s" } else { "" },
                if added.len() == 1 { "y" } else { "ies" },
            )
        };
        debug_assert!(self.is_consistent());
    }

    /// Rewrite into standard form by solving every constraint for its basic variable.
    ///
    /// # Errors
    ///
    /// If a constraint has no basic variable to solve for, which happens when it was an equality
    /// from the start and never received a slack, the initial basis can't be constructed.
    pub fn standardize(&mut self) -> Result<(), SolveError<OF>> {
        debug_assert_eq!(self.stage, Stage::Augmented);

        for index in 0..self.constraints.len() {
            let Some(variable) = self.constraints[index].basic_variable().cloned() else {
                return Err(InfeasibleOrigin::NoBasisCandidate { constraint: index }.into());
            };
            self.constraints[index]
                .in_base(&variable)
                .map_err(|error| error.at_constraint(index))?;
        }

        self.stage = Stage::Standard;
        self.comment = "Each constraint is solved for its slack variable.".to_string();
        debug_assert!(self.is_consistent());

        Ok(())
    }

    /// Read off the basic solution at the origin.
    ///
    /// All out-of-basis variables are set to zero; each basic variable then takes the constant of
    /// its constraint's right-hand side.
    ///
    /// # Errors
    ///
    /// If a basic variable would start at a negative value, the origin is not feasible and this
    /// solver can't start.
    pub fn initialize_basis(&mut self) -> Result<(), SolveError<OF>> {
        debug_assert_eq!(self.stage, Stage::Standard);

        let mut base = BTreeSet::new();
        let mut values = BTreeMap::new();
        for (index, constraint) in self.constraints.iter().enumerate() {
            let Some(variable) = constraint.basic_variable().cloned() else {
                return Err(InfeasibleOrigin::NoBasisCandidate { constraint: index }.into());
            };
            let value = constraint.rhs().constant().clone();
            if value < OF::zero() {
                return Err(InfeasibleOrigin::NegativeBasicValue {
                    constraint: index,
                    variable,
                    value,
                }
                .into());
            }
            base.insert(variable.clone());
            values.insert(variable, value);
        }

        for variable in &self.variables {
            if !base.contains(variable) {
                self.out.insert(variable.clone());
                values.insert(variable.clone(), OF::zero());
            }
        }
        self.base = base;
        self.current_solution = values;

        self.stage = Stage::BasicSolution;
        self.comment = "Setting the out-of-basis variables to zero yields a first feasible \
            solution, at the origin."
            .to_string();
        debug_assert!(self.is_consistent());

        Ok(())
    }

    /// Exchange basis membership: the entering variable replaces the basic variable of a row.
    ///
    /// The row is solved for the entering variable and the result is recorded as a pending
    /// substitution in every other constraint and in the objective. The substitutions are
    /// expanded by [`apply_substitutions`](Self::apply_substitutions); until then, the program
    /// shows the pivot in its unexpanded form.
    ///
    /// # Arguments
    ///
    /// * `entering`: Out-of-basis variable to bring into the basis.
    /// * `row`: Zero-based index of the constraint whose basic variable leaves.
    ///
    /// # Errors
    ///
    /// If the entering variable has net coefficient zero in the row.
    pub fn enter_basis(&mut self, entering: &Variable, row: usize) -> Result<(), SolveError<OF>> {
        debug_assert!(matches!(self.stage, Stage::BasicSolution | Stage::Pivoting));
        debug_assert!(self.out.contains(entering));
        debug_assert!(row < self.constraints.len());

        let leaving = self.constraints[row].basic_variable().cloned();
        debug_assert!(leaving.is_some());

        self.constraints[row]
            .in_base(entering)
            .map_err(|error| error.at_constraint(row))?;
        let replacement = self.constraints[row].rhs().clone();

        for (index, constraint) in self.constraints.iter_mut().enumerate() {
            if index != row {
                constraint.defer_substitution(entering.clone(), replacement.clone());
            }
        }
        self.utility.defer_substitution(entering.clone(), replacement.clone());

        self.base.insert(entering.clone());
        self.out.remove(entering);
        self.comment = match &leaving {
            Some(leaving) => {
                self.base.remove(leaving);
                self.out.insert(leaving.clone());
                format!("{entering} enters the basis and {leaving} leaves it.")
            }
            None => format!("{entering} enters the basis."),
        };

        self.stage = Stage::Pivoting;

        Ok(())
    }

    /// Expand all pending substitutions and read off the new basic solution.
    pub fn apply_substitutions(&mut self) {
        debug_assert_eq!(self.stage, Stage::Pivoting);

        for constraint in &mut self.constraints {
            constraint.apply_substitutions();
        }
        self.utility.apply_substitutions();
        self.refresh_solution();

        self.comment =
            "The substitution is expanded and the new basic solution is read off.".to_string();
        debug_assert!(self.is_consistent());
    }

    /// Mark the current basic solution as optimal.
    pub fn mark_optimal(&mut self) {
        debug_assert!(matches!(self.stage, Stage::BasicSolution | Stage::Pivoting));

        self.stage = Stage::Optimal;
        self.comment = "No out-of-basis variable has a positive coefficient left in the \
            objective; the current basic solution is optimal."
            .to_string();
    }

    /// The objective value attained by the current basic solution.
    ///
    /// This is the constant of the objective expression: all variables still appearing in it are
    /// out of the basis and therefore zero. Only meaningful once all substitutions are expanded.
    pub fn objective_value(&self) -> OF {
        self.utility.rhs().constant().clone()
    }

    /// The value of every variable at the current basic solution, in the order the variables
    /// entered the problem.
    ///
    /// Empty before the first basic solution has been read off.
    pub fn assignment(&self) -> Vec<(Variable, OF)> {
        self.variables
            .iter()
            .filter_map(|variable| {
                self.current_solution
                    .get(variable)
                    .map(|value| (variable.clone(), value.clone()))
            })
            .collect()
    }

    /// The optimal solution, in the stated optimization direction.
    ///
    /// If the stated problem was a minimization, the found maximum is negated back.
    pub fn solution(&self) -> Solution<OF> {
        debug_assert_eq!(self.stage, Stage::Optimal);

        let canonical = self.objective_value();
        let objective_value = match self.stated_objective {
            Objective::Maximize => canonical,
            Objective::Minimize => -canonical,
        };

        Solution::new(objective_value, self.assignment())
    }

    /// Smallest `x_k`, `k >= 1`, that is not yet a variable of this program.
    fn fresh_variable(&self) -> Variable {
        let mut index = 1_usize;
        loop {
            let candidate = Variable::new(format!("x_{index}"));
            if !self.variables.contains(&candidate) {
                return candidate;
            }
            index += 1;
        }
    }

    fn refresh_solution(&mut self) {
        self.current_solution.clear();
        for variable in &self.out {
            self.current_solution.insert(variable.clone(), OF::zero());
        }
        for constraint in &self.constraints {
            if let Some(variable) = constraint.basic_variable() {
                self.current_solution
                    .insert(variable.clone(), constraint.rhs().constant().clone());
            }
        }
    }

    /// Debug helper for checking the programs invariants.
    fn is_consistent(&self) -> bool {
        let unique_names =
            self.variables.iter().collect::<BTreeSet<_>>().len() == self.variables.len();
        let objective_name_free = !self.variables.contains(&Self::objective_variable());
        let utility_solved_for_objective =
            self.utility.lhs() == &LinearExpression::from_variable(Self::objective_variable());

        let known = |variable: &Variable| self.variables.contains(variable);
        let constraints_over_known_variables = self
            .constraints
            .iter()
            .all(|constraint| constraint.variables().into_iter().all(known));
        let utility_over_known_variables = self.utility.rhs().variables().all(known);

        let partitioned = if self.stage >= Stage::BasicSolution {
            self.base.is_disjoint(&self.out)
                && self.base.len() + self.out.len() == self.variables.len()
        } else {
            self.base.is_empty() && self.out.is_empty()
        };

        let solution_feasible = if self.stage >= Stage::BasicSolution
            && !self.has_pending_substitutions()
        {
            let value_of = |variable: &Variable| {
                self.current_solution.get(variable).cloned().unwrap_or_else(OF::zero)
            };
            self.constraints.iter().all(|constraint| constraint.holds_under(value_of))
                && self.out.iter().all(|variable| value_of(variable).is_zero())
        } else {
            true
        };

        unique_names
            && objective_name_free
            && utility_solved_for_objective
            && constraints_over_known_variables
            && utility_over_known_variables
            && partitioned
            && solution_feasible
    }
}

impl<OF> fmt::Display for SimplexProgram<OF>
where
    OF: OrderedField + fmt::Display,
    for<'r> &'r OF: OrderedFieldRef<OF>,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{} {}", self.objective, self.utility)?;
        writeln!(f, "subject to")?;
        for constraint in &self.constraints {
            writeln!(f, "    {constraint}")?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod test {
    use relp_num::{R64, Rational64};

    use crate::data::affine::expression::LinearExpression;
    use crate::data::affine::variable::Variable;
    use crate::data::linear_program::constraint::Constraint;
    use crate::data::linear_program::elements::{ConstraintRelation, Objective, Stage};
    use crate::data::linear_program::error::{InfeasibleOrigin, SolveError};
    use crate::data::linear_program::program::SimplexProgram;

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

    /// max z = x_1 + 2 x_2 s.t. x_1 <= 10, x_2 <= 10, x_1 + x_2 <= 15.
    fn example() -> SimplexProgram<Rational64> {
        SimplexProgram::new(
            Objective::Maximize,
            expression(vec![(R64!(1), x(1)), (R64!(2), x(2))], R64!(0)),
            vec![
                Constraint::new(
                    expression(vec![(R64!(1), x(1))], R64!(0)),
                    ConstraintRelation::Less,
                    expression(vec![], R64!(10)),
                ),
                Constraint::new(
                    expression(vec![(R64!(1), x(2))], R64!(0)),
                    ConstraintRelation::Less,
                    expression(vec![], R64!(10)),
                ),
                Constraint::new(
                    expression(vec![(R64!(1), x(1)), (R64!(1), x(2))], R64!(0)),
                    ConstraintRelation::Less,
                    expression(vec![], R64!(15)),
                ),
            ],
            vec![x(1), x(2)],
        )
    }

    #[test]
    fn pipeline_up_to_the_basic_solution() {
        let mut program = example();

        program.canonical_form();
        assert_eq!(program.stage(), Stage::Canonical);

        program.augment();
        assert_eq!(program.variables(), &[x(1), x(2), x(3), x(4), x(5)]);
        assert!(program.constraints().iter().all(|c| c.relation() == ConstraintRelation::Equal));

        program.standardize().unwrap();
        // x_5 = 15 - x_1 - x_2
        assert_eq!(
            program.constraints()[2].rhs(),
            &expression(vec![(R64!(-1), x(1)), (R64!(-1), x(2))], R64!(15)),
        );

        program.initialize_basis().unwrap();
        assert_eq!(
            program.assignment(),
            vec![
                (x(1), R64!(0)),
                (x(2), R64!(0)),
                (x(3), R64!(10)),
                (x(4), R64!(10)),
                (x(5), R64!(15)),
            ],
        );
        assert_eq!(program.objective_value(), R64!(0));
    }

    #[test]
    fn minimization_becomes_maximization() {
        let mut program = SimplexProgram::new(
            Objective::Minimize,
            expression(vec![(R64!(1), x(1))], R64!(0)),
            vec![Constraint::new(
                expression(vec![(R64!(1), x(1))], R64!(0)),
                ConstraintRelation::Less,
                expression(vec![], R64!(4)),
            )],
            vec![x(1)],
        );
        program.canonical_form();

        assert_eq!(program.objective(), Objective::Maximize);
        assert_eq!(program.stated_objective(), Objective::Minimize);
        assert_eq!(program.utility(), &expression(vec![(R64!(-1), x(1))], R64!(0)));
    }

    #[test]
    fn equality_constraints_offer_no_basis() {
        let mut program = SimplexProgram::new(
            Objective::Maximize,
            expression(vec![(R64!(1), x(1))], R64!(0)),
            vec![Constraint::new(
                expression(vec![(R64!(1), x(1))], R64!(0)),
                ConstraintRelation::Equal,
                expression(vec![], R64!(4)),
            )],
            vec![x(1)],
        );
        program.canonical_form();
        program.augment();

        assert_eq!(
            program.standardize(),
            Err(SolveError::InfeasibleOrigin(InfeasibleOrigin::NoBasisCandidate {
                constraint: 0,
            })),
        );
    }

    #[test]
    fn negative_origin_is_rejected() {
        // x_1 >= 3 canonizes to -x_1 <= -3; the slack would start at -3.
        let mut program = SimplexProgram::new(
            Objective::Maximize,
            expression(vec![(R64!(1), x(1))], R64!(0)),
            vec![Constraint::new(
                expression(vec![(R64!(1), x(1))], R64!(0)),
                ConstraintRelation::Greater,
                expression(vec![], R64!(3)),
            )],
            vec![x(1)],
        );
        program.canonical_form();
        program.augment();
        program.standardize().unwrap();

        assert_eq!(
            program.initialize_basis(),
            Err(SolveError::InfeasibleOrigin(InfeasibleOrigin::NegativeBasicValue {
                constraint: 0,
                variable: x(2),
                value: R64!(-3),
            })),
        );
    }

    #[test]
    fn a_single_basis_exchange() {
        let mut program = example();
        program.canonical_form();
        program.augment();
        program.standardize().unwrap();
        program.initialize_basis().unwrap();

        // Bring x_2 in through the second constraint, where x_4 is basic.
        program.enter_basis(&x(2), 1).unwrap();
        assert_eq!(program.stage(), Stage::Pivoting);
        // The other rows still show x_2; the substitution is only recorded.
        assert_eq!(program.constraints()[2].rhs().coefficient(&x(2)), R64!(-1));
        assert_eq!(program.constraints()[2].substitutions().len(), 1);

        program.apply_substitutions();
        // x_5 = 5 - x_1 + x_4 and z = 20 + x_1 - 2 x_4.
        assert_eq!(
            program.constraints()[2].rhs(),
            &expression(vec![(R64!(-1), x(1)), (R64!(1), x(4))], R64!(5)),
        );
        assert_eq!(
            program.utility(),
            &expression(vec![(R64!(1), x(1)), (R64!(-2), x(4))], R64!(20)),
        );
        assert_eq!(program.objective_value(), R64!(20));
        assert_eq!(program.reduced_cost(&x(1)), R64!(1));
        assert_eq!(program.reduced_cost(&x(4)), R64!(-2));
    }
}
