//! # Rendering of solve traces
//!
//! A trace is plain data; this module turns it into something a reader can follow. Two renderers
//! are provided: a LaTeX document that lays out the full derivation the way it would be written
//! on a blackboard, and a short plain-text summary for the terminal.
use std::fmt;

use relp_num::{OrderedField, OrderedFieldRef};

use crate::algorithm::trace::Trace;

pub mod latex;

/// Knobs for the generated LaTeX document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentOptions {
    /// Page margin, handed to the geometry package verbatim.
    pub margin: String,
}

impl Default for DocumentOptions {
    fn default() -> Self {
        Self { margin: "1.5cm".to_string() }
    }
}

/// A plain-text account of a solve: one line per transformation and exchange, then the outcome.
pub fn summarize<OF>(trace: &Trace<OF>) -> String
where
    OF: OrderedField + fmt::Display,
    for<'r> &'r OF: OrderedFieldRef<OF>,
{
    let mut lines = Vec::new();
    if !trace.title.is_empty() {
        lines.push(trace.title.clone());
    }

    for snapshot in &trace.stages {
        let mut line = format!("  {}", snapshot.stage);
        if !snapshot.comment.is_empty() {
            line.push_str(": ");
            line.push_str(&snapshot.comment);
        }
        lines.push(line);
    }
    for iteration in &trace.iterations {
        let line = match &iteration.exchange {
            Some(exchange) => format!(
                "  exchange {}: {} enters the basis, {} leaves it",
                iteration.number, iteration.entering.0, exchange.leaving,
            ),
            None => format!(
                "  exchange {}: no constraint bounds {}",
                iteration.number, iteration.entering.0,
            ),
        };
        lines.push(line);
    }
    if let Some(optimal) = &trace.optimal {
        let mut line = format!("  {}", optimal.stage);
        if !optimal.comment.is_empty() {
            line.push_str(": ");
            line.push_str(&optimal.comment);
        }
        lines.push(line);
    }

    match &trace.outcome {
        Ok(solution) => lines.push(solution.to_string()),
        Err(error) => lines.push(format!("no solution: {error}")),
    }

    lines.join("\n")
}

#[cfg(test)]
mod test {
    use relp_num::{R64, Rational64};

    use crate::algorithm::solve;
    use crate::data::affine::{LinearExpression, Variable};
    use crate::data::linear_program::constraint::Constraint;
    use crate::data::linear_program::elements::{ConstraintRelation, Objective};
    use crate::data::linear_program::program::SimplexProgram;
    use crate::presentation::summarize;

    fn x(i: u64) -> Variable {
        Variable::new(format!("x_{i}"))
    }

    fn program() -> SimplexProgram<Rational64> {
        let mut utility = LinearExpression::zero();
        utility.add_term(x(1), R64!(3));

        let mut lhs = LinearExpression::zero();
        lhs.add_term(x(1), R64!(2));

        SimplexProgram::new(
            Objective::Maximize,
            utility,
            vec![Constraint::new(
                lhs,
                ConstraintRelation::Less,
                LinearExpression::from_constant(R64!(8)),
            )],
            vec![x(1)],
        )
        .with_title("A one-variable problem")
    }

    #[test]
    fn the_summary_tells_the_story_in_order() {
        let summary = summarize(&solve(program()));

        let expected_order = [
            "A one-variable problem",
            "initial form",
            "canonical form",
            "augmented form",
            "standard form",
            "basic solution",
            "exchange 1: x_1 enters the basis, x_2 leaves it",
            "optimal solution",
            "objective value: 12",
            "x_1 = 4",
        ];
        let mut position = 0;
        for part in expected_order {
            let Some(found) = summary[position..].find(part) else {
                panic!("\"{part}\" missing or out of order in:\n{summary}");
            };
            position += found + part.len();
        }
    }
}
