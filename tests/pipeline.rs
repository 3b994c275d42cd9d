//! # End-to-end solves through the public interface
//!
//! Everything in this file is written the way an external user of the crate would write it:
//! build a program, solve it, look at the trace.
use std::collections::BTreeSet;

use relp_num::{R64, Rational64};

use simplex_steps::algorithm::strategy::pivot_rule::FirstPositive;
use simplex_steps::algorithm::trace::StageSnapshot;
use simplex_steps::algorithm::{SolveOptions, solve, solve_with};
use simplex_steps::data::affine::{LinearExpression, Variable};
use simplex_steps::data::linear_program::constraint::Constraint;
use simplex_steps::data::linear_program::elements::{ConstraintRelation, Objective, Stage};
use simplex_steps::data::linear_program::error::{InfeasibleOrigin, SolveError};
use simplex_steps::data::linear_program::program::SimplexProgram;
use simplex_steps::data::linear_program::solution::Solution;

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

fn less_than(lhs: LinearExpression<Rational64>, bound: Rational64) -> Constraint<Rational64> {
    Constraint::new(lhs, ConstraintRelation::Less, LinearExpression::from_constant(bound))
}

/// max z = x_1 + 2 x_2 s.t. x_1 <= 10, x_2 <= 10, x_1 + x_2 <= 15.
fn textbook_constraints() -> Vec<Constraint<Rational64>> {
    vec![
        less_than(expression(vec![(R64!(1), x(1))], R64!(0)), R64!(10)),
        less_than(expression(vec![(R64!(1), x(2))], R64!(0)), R64!(10)),
        less_than(expression(vec![(R64!(1), x(1)), (R64!(1), x(2))], R64!(0)), R64!(15)),
    ]
}

fn textbook_program() -> SimplexProgram<Rational64> {
    SimplexProgram::new(
        Objective::Maximize,
        expression(vec![(R64!(1), x(1)), (R64!(2), x(2))], R64!(0)),
        textbook_constraints(),
        vec![x(1), x(2)],
    )
}

#[test]
fn a_textbook_maximization() {
    let trace = solve(textbook_program());

    assert_eq!(
        trace.outcome,
        Ok(Solution::new(
            R64!(25),
            vec![
                (x(1), R64!(5)),
                (x(2), R64!(10)),
                (x(3), R64!(5)),
                (x(4), R64!(0)),
                (x(5), R64!(0)),
            ],
        )),
    );

    assert_eq!(trace.iterations.len(), 2);

    // The certificate of optimality: no remaining coefficient is positive.
    let optimal = trace.optimal.unwrap();
    assert_eq!(optimal.stage, Stage::Optimal);
    assert!(optimal.utility.rhs().terms().all(|(_, coefficient)| coefficient < &R64!(0)));
}

#[test]
fn the_solution_satisfies_every_stated_constraint() {
    let constraints = textbook_constraints();
    let utility = expression(vec![(R64!(1), x(1)), (R64!(2), x(2))], R64!(0));

    let trace = solve(textbook_program());
    let solution = trace.outcome.unwrap();
    let value_of = |variable: &Variable| {
        solution.value_of(variable).cloned().unwrap_or_else(|| R64!(0))
    };

    for constraint in &constraints {
        assert!(constraint.holds_under(value_of));
    }
    assert_eq!(&utility.evaluate(value_of), solution.objective_value());
}

#[test]
fn both_pivot_rules_reach_the_same_optimum() {
    let greedy = solve(textbook_program());
    let eager = solve_with::<_, FirstPositive>(textbook_program(), &SolveOptions::default());

    assert_eq!(greedy.outcome, eager.outcome);
}

#[test]
fn solving_is_deterministic() {
    assert_eq!(solve(textbook_program()), solve(textbook_program()));
}

#[test]
fn minimizing_the_negated_objective_finds_the_same_point() {
    let program = SimplexProgram::new(
        Objective::Minimize,
        expression(vec![(R64!(-1), x(1)), (R64!(-2), x(2))], R64!(0)),
        textbook_constraints(),
        vec![x(1), x(2)],
    );

    let trace = solve(program);
    assert_eq!(
        trace.outcome,
        Ok(Solution::new(
            R64!(-25),
            vec![
                (x(1), R64!(5)),
                (x(2), R64!(10)),
                (x(3), R64!(5)),
                (x(4), R64!(0)),
                (x(5), R64!(0)),
            ],
        )),
    );
}

#[test]
fn each_basic_variable_appears_only_in_its_own_row() {
    let trace = solve(textbook_program());
    assert!(trace.outcome.is_ok());

    let mut systems: Vec<&StageSnapshot<Rational64>> = trace
        .stages
        .iter()
        .filter(|snapshot| snapshot.stage >= Stage::Standard)
        .collect();
    systems.extend(
        trace
            .iterations
            .iter()
            .filter_map(|iteration| iteration.exchange.as_ref())
            .map(|exchange| &exchange.expanded),
    );
    systems.extend(&trace.optimal);
    assert_eq!(systems.len(), 5);

    for system in systems {
        let basics = system
            .constraints
            .iter()
            .map(|constraint| constraint.basic_variable().unwrap())
            .collect::<BTreeSet<_>>();
        assert_eq!(basics.len(), system.constraints.len());

        for constraint in &system.constraints {
            let basic = constraint.basic_variable().unwrap();
            assert_eq!(constraint.lhs(), &LinearExpression::from_variable(basic.clone()));
            assert_eq!(system.utility.rhs().coefficient(basic), R64!(0));
            for row in &system.constraints {
                assert_eq!(row.rhs().coefficient(basic), R64!(0));
            }
        }
    }
}

#[test]
fn every_photographed_solution_satisfies_its_system() {
    let trace = solve(textbook_program());

    let mut photographed: Vec<&StageSnapshot<Rational64>> = trace.stages.iter().collect();
    for iteration in &trace.iterations {
        if let Some(exchange) = &iteration.exchange {
            photographed.push(&exchange.substituted);
            photographed.push(&exchange.expanded);
        }
    }
    photographed.extend(&trace.optimal);

    let with_solution = photographed
        .iter()
        .filter_map(|snapshot| snapshot.solution.as_ref().map(|assignment| (*snapshot, assignment)))
        .collect::<Vec<_>>();
    assert_eq!(with_solution.len(), 4);

    for (snapshot, assignment) in with_solution {
        let value_of = |variable: &Variable| {
            assignment
                .iter()
                .find(|(candidate, _)| candidate == variable)
                .map(|(_, value)| value.clone())
                .unwrap_or_else(|| R64!(0))
        };
        for constraint in &snapshot.constraints {
            assert!(constraint.holds_under(value_of));
        }
    }
}

#[test]
fn an_equality_row_stops_the_derivation_before_the_basis() {
    let program = SimplexProgram::new(
        Objective::Maximize,
        expression(vec![(R64!(1), x(1))], R64!(0)),
        vec![Constraint::new(
            expression(vec![(R64!(1), x(1))], R64!(0)),
            ConstraintRelation::Equal,
            LinearExpression::from_constant(R64!(5)),
        )],
        vec![x(1)],
    );

    let trace = solve(program);
    assert_eq!(
        trace.outcome,
        Err(SolveError::InfeasibleOrigin(InfeasibleOrigin::NoBasisCandidate { constraint: 0 })),
    );
    // The rewriting stops where the failure occurred.
    assert_eq!(trace.stages.last().map(|snapshot| snapshot.stage), Some(Stage::Augmented));
    assert!(trace.iterations.is_empty());
}

#[test]
fn a_negative_right_hand_side_is_not_a_feasible_origin() {
    let program = SimplexProgram::new(
        Objective::Maximize,
        expression(vec![(R64!(1), x(1))], R64!(0)),
        vec![less_than(expression(vec![(R64!(1), x(1))], R64!(0)), R64!(-5))],
        vec![x(1)],
    );

    let trace = solve(program);
    assert_eq!(
        trace.outcome,
        Err(SolveError::InfeasibleOrigin(InfeasibleOrigin::NegativeBasicValue {
            constraint: 0,
            variable: x(2),
            value: R64!(-5),
        })),
    );
}
