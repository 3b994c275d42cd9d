//! # Solve traces
//!
//! The solver does not only answer, it shows its work. A trace is the ordered collection of
//! photographs taken while the program moved through the pipeline: one per rewriting stage and,
//! per basis exchange, the ratio table and both the substituted and the expanded system. A trace
//! is plain data; rendering it is left to the `presentation` module.
use relp_num::{OrderedField, OrderedFieldRef};

use crate::data::affine::variable::Variable;
use crate::data::linear_program::constraint::Constraint;
use crate::data::linear_program::elements::{Objective, Stage};
use crate::data::linear_program::error::SolveError;
use crate::data::linear_program::program::SimplexProgram;
use crate::data::linear_program::solution::Solution;

/// Everything that happened during one solve.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Trace<OF> {
    /// Title of the problem. May be empty.
    pub title: String,
    /// Description of the problem. May be empty.
    pub description: String,
    /// Optimization direction as stated by the modeller.
    pub stated_objective: Objective,
    /// The program after each rewriting stage, up to and including the first basic solution.
    ///
    /// A solve that fails while rewriting has fewer snapshots; the last one shows the final form
    /// that was still reached.
    pub stages: Vec<StageSnapshot<OF>>,
    /// One entry per basis exchange that was started, in order.
    pub iterations: Vec<IterationSnapshot<OF>>,
    /// The final optimal form, present on success only.
    pub optimal: Option<StageSnapshot<OF>>,
    /// The solution, or why there is none.
    pub outcome: Result<Solution<OF>, SolveError<OF>>,
}

/// The program, photographed directly after a transformation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StageSnapshot<OF> {
    /// Stage the program had just reached.
    pub stage: Stage,
    /// One-sentence account of the transformation that produced this form.
    pub comment: String,
    /// The objective constraint `z = ...` as of this form.
    pub utility: Constraint<OF>,
    /// All constraint rows as of this form.
    pub constraints: Vec<Constraint<OF>>,
    /// Variables of the program as of this form, in the order they entered it.
    pub variables: Vec<Variable>,
    /// The basic solution, once one has been read off and all substitutions are expanded.
    pub solution: Option<Vec<(Variable, OF)>>,
}

impl<OF> StageSnapshot<OF>
where
    OF: OrderedField,
    for<'r> &'r OF: OrderedFieldRef<OF>,
{
    /// Photograph a program in its current form.
    pub fn of(program: &SimplexProgram<OF>) -> Self {
        let solution = if program.stage() >= Stage::BasicSolution
            && !program.has_pending_substitutions()
        {
            Some(program.assignment())
        } else {
            None
        };

        Self {
            stage: program.stage(),
            comment: program.comment().to_string(),
            utility: program.utility_constraint().clone(),
            constraints: program.constraints().to_vec(),
            variables: program.variables().to_vec(),
            solution,
        }
    }
}

/// One basis exchange: the choice of pivot and the system before and after expanding it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IterationSnapshot<OF> {
    /// One-based number of the exchange.
    pub number: usize,
    /// The entering variable, with its objective coefficient at selection time.
    pub entering: (Variable, OF),
    /// The bound each constraint row puts on the entering variable, in row order.
    pub ratio_lines: Vec<RatioLine<OF>>,
    /// The exchange itself; absent when no row bounds the entering variable.
    pub exchange: Option<Exchange<OF>>,
}

/// The bound one constraint row puts on a candidate entering variable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RatioLine<OF> {
    /// Zero-based index of the constraint row this line derives from.
    pub row: usize,
    /// The row's basic variable, whose nonnegativity produces the requirement.
    pub basic_variable: Variable,
    /// The nonnegativity requirement with all variables but the candidate held at zero.
    pub requirement: Constraint<OF>,
    /// The requirement rewritten as `candidate <= value`, with the value separately, when the
    /// row bounds the candidate at all.
    pub bound: Option<(Constraint<OF>, OF)>,
}

/// A performed basis exchange.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Exchange<OF> {
    /// Zero-based index of the constraint row pivoted on.
    pub pivot_row: usize,
    /// The variable that left the basis.
    pub leaving: Variable,
    /// The system directly after the exchange, substitutions recorded but not yet expanded.
    pub substituted: StageSnapshot<OF>,
    /// The system with all substitutions expanded and the new basic solution read off.
    pub expanded: StageSnapshot<OF>,
}
