//! # The simplex method, one visible step at a time
//!
//! The algorithm is implemented as described in introductory courses: rewrite the program into
//! canonical, augmented and standard form, read off the basic solution at the origin, then
//! exchange basis variables until no candidate improves the objective. The driver in this module
//! does nothing clever; all rewriting lives on the program type and every intermediate form is
//! photographed into a [`Trace`](trace::Trace).
use num_traits::Zero;
use relp_num::{OrderedField, OrderedFieldRef};

use crate::algorithm::strategy::pivot_rule::{LargestCoefficient, PivotRule};
use crate::algorithm::trace::{Exchange, IterationSnapshot, RatioLine, StageSnapshot, Trace};
use crate::data::affine::variable::Variable;
use crate::data::linear_program::error::SolveError;
use crate::data::linear_program::program::SimplexProgram;

pub mod strategy;
pub mod trace;

/// Basis exchanges allowed before a solve is abandoned as cycling.
///
/// The pedagogical problems this solver is aimed at take a handful of exchanges; a run that
/// reaches this cap is degenerate and revisiting bases.
pub const DEFAULT_MAX_PIVOTS: usize = 1_000;

/// Knobs for the solve loop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SolveOptions {
    /// Cap on the number of basis exchanges.
    pub max_pivots: usize,
}

impl Default for SolveOptions {
    fn default() -> Self {
        Self { max_pivots: DEFAULT_MAX_PIVOTS }
    }
}

/// Solve a program with the default pivot rule and options.
///
/// # Return value
///
/// The full trace of the solve. Its `outcome` field holds the solution, or the reason there is
/// none; the snapshots collected up to that point are kept either way.
pub fn solve<OF>(program: SimplexProgram<OF>) -> Trace<OF>
where
    OF: OrderedField,
    for<'r> &'r OF: OrderedFieldRef<OF>,
{
    solve_with::<_, LargestCoefficient>(program, &SolveOptions::default())
}

/// Solve a program with a chosen pivot rule.
///
/// # Arguments
///
/// * `program`: Program in its initial form; the solve consumes it.
/// * `options`: Caps and knobs for the loop.
pub fn solve_with<OF, PR>(mut program: SimplexProgram<OF>, options: &SolveOptions) -> Trace<OF>
where
    OF: OrderedField,
    for<'r> &'r OF: OrderedFieldRef<OF>,
    PR: PivotRule,
{
    let title = program.title().to_string();
    let description = program.description().to_string();
    let stated_objective = program.stated_objective();
    let mut stages = vec![StageSnapshot::of(&program)];

    program.canonical_form();
    stages.push(StageSnapshot::of(&program));

    program.augment();
    stages.push(StageSnapshot::of(&program));

    if let Err(error) = program.standardize() {
        return Trace {
            title,
            description,
            stated_objective,
            stages,
            iterations: Vec::new(),
            optimal: None,
            outcome: Err(error),
        };
    }
    stages.push(StageSnapshot::of(&program));

    if let Err(error) = program.initialize_basis() {
        return Trace {
            title,
            description,
            stated_objective,
            stages,
            iterations: Vec::new(),
            optimal: None,
            outcome: Err(error),
        };
    }
    stages.push(StageSnapshot::of(&program));

    let mut rule = PR::new();
    let mut iterations = Vec::new();
    let outcome = loop {
        let Some((entering, coefficient)) = rule.select_entering(&program) else {
            program.mark_optimal();
            break Ok(program.solution());
        };

        if iterations.len() == options.max_pivots {
            break Err(SolveError::CycleDetected { pivots: iterations.len() });
        }

        let ratio_lines = ratio_test(&program, &entering);
        let Some(selected) = select_pivot_line(&ratio_lines) else {
            iterations.push(IterationSnapshot {
                number: iterations.len() + 1,
                entering: (entering.clone(), coefficient),
                ratio_lines,
                exchange: None,
            });
            break Err(SolveError::Unbounded { entering });
        };
        let pivot_row = ratio_lines[selected].row;
        let leaving = ratio_lines[selected].basic_variable.clone();

        if let Err(error) = program.enter_basis(&entering, pivot_row) {
            break Err(error);
        }
        let substituted = StageSnapshot::of(&program);
        program.apply_substitutions();
        let expanded = StageSnapshot::of(&program);

        iterations.push(IterationSnapshot {
            number: iterations.len() + 1,
            entering: (entering, coefficient),
            ratio_lines,
            exchange: Some(Exchange { pivot_row, leaving, substituted, expanded }),
        });
    };

    let optimal = match &outcome {
        Ok(_) => Some(StageSnapshot::of(&program)),
        Err(_) => None,
    };

    Trace { title, description, stated_objective, stages, iterations, optimal, outcome }
}

/// The bound each constraint row puts on a candidate entering variable.
///
/// Per row, the basic variable's nonnegativity requirement is restricted to the candidate,
/// canonized and scaled to coefficient one. Rows in which the candidate's coefficient is not
/// positive after canonization don't bound the candidate and yield a line without a bound.
fn ratio_test<OF>(program: &SimplexProgram<OF>, candidate: &Variable) -> Vec<RatioLine<OF>>
where
    OF: OrderedField,
    for<'r> &'r OF: OrderedFieldRef<OF>,
{
    let mut lines = Vec::new();
    for (row, constraint) in program.constraints().iter().enumerate() {
        let Some(basic_variable) = constraint.basic_variable().cloned() else {
            continue;
        };
        let requirement = constraint.ratio_constraint(candidate);

        let mut normalized = requirement.clone();
        normalized.canonize();
        let coefficient = normalized.lhs().coefficient(candidate);
        let bound = if coefficient > OF::zero() {
            normalized.divide_both(&coefficient);
            let value = normalized.rhs().constant().clone();
            Some((normalized, value))
        } else {
            None
        };

        lines.push(RatioLine { row, basic_variable, requirement, bound });
    }

    lines
}

/// Index into the ratio lines of the row to pivot on: the smallest bound wins.
///
/// The first row attaining the smallest bound is selected, such that the choice is deterministic
/// in the presence of ties.
fn select_pivot_line<OF: Ord>(lines: &[RatioLine<OF>]) -> Option<usize> {
    let mut smallest: Option<(usize, &OF)> = None;
    for (index, line) in lines.iter().enumerate() {
        let Some((_, value)) = &line.bound else {
            continue;
        };
        match smallest {
            Some((_, smallest_value)) if value >= smallest_value => {}
            _ => smallest = Some((index, value)),
        }
    }

    smallest.map(|(index, _)| index)
}
