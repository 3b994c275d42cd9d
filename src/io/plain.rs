//! # Reading of plain-text problems
//!
//! The plain-text format states one problem per file, close to how it would appear in a course
//! text:
//!
//! ```text
//! var: x_1, x_2, x_3
//! max z = 20*x_1 + 15*x_2 + 5*x_3
//! sc
//! x_1 + x_2 + x_3 <= 20
//! 2*x_1 + x_2 <= 25
//! x_1 - x_2 >= -10
//! ```
//!
//! Variable declarations and the objective may appear in any order before the `sc` line, which
//! opens the constraint section. Blank lines and surrounding whitespace are ignored. The text
//! between the objective direction and the `=` sign is not interpreted; it conventionally names
//! the objective variable `z`.
use std::fmt;

use relp_num::{OrderedField, OrderedFieldRef};

use crate::data::affine::{LinearExpression, Variable};
use crate::data::linear_program::elements::Objective;
use crate::io::ProblemStatement;
use crate::io::error::ParseError;
use crate::io::expression::{parse_affine, parse_constraint};

/// Parse the text of a plain-text problem file.
///
/// # Errors
///
/// When a line can not be interpreted, the objective is missing or given twice, or the constraint
/// section is never opened.
pub(super) fn parse<OF>(text: &str) -> Result<ProblemStatement<OF>, ParseError>
where
    OF: OrderedField + fmt::Display,
    for<'r> &'r OF: OrderedFieldRef<OF>,
{
    let mut variables = Vec::new();
    let mut objective: Option<(Objective, LinearExpression<OF>)> = None;
    let mut constraints = Vec::new();
    let mut in_constraint_section = false;

    for (index, raw_line) in text.lines().enumerate() {
        let line_number = index as u64 + 1;
        let line = raw_line.trim();
        if line.is_empty() {
            continue;
        }

        if in_constraint_section {
            let constraint = parse_constraint(line).map_err(|error| {
                ParseError::with_cause(
                    format!("could not parse the constraint at line {line_number}: \"{line}\""),
                    error,
                )
            })?;
            constraints.push(constraint);
        } else if let Some(names) = line.strip_prefix("var:") {
            for name in names.split(',') {
                let name = name.trim();
                if name.is_empty()
                    || !name.chars().all(|character| {
                        character.is_alphanumeric() || character == '_'
                    })
                {
                    return Err(ParseError::with_file_location(
                        format!("\"{name}\" is not a valid variable name"),
                        (line_number, raw_line),
                    ));
                }
                variables.push(Variable::new(name));
            }
        } else if line.starts_with("max") || line.starts_with("min") {
            if objective.is_some() {
                return Err(ParseError::with_file_location(
                    "the objective was already given",
                    (line_number, raw_line),
                ));
            }

            let direction = if line.starts_with("max") {
                Objective::Maximize
            } else {
                Objective::Minimize
            };
            let Some((_, expression_text)) = line.split_once('=') else {
                return Err(ParseError::with_file_location(
                    "expected an = sign after the objective direction",
                    (line_number, raw_line),
                ));
            };
            let expression = parse_affine(expression_text).map_err(|error| {
                ParseError::with_cause(
                    format!("could not parse the objective at line {line_number}: \"{line}\""),
                    error,
                )
            })?;
            objective = Some((direction, expression));
        } else if line == "sc" {
            in_constraint_section = true;
        } else {
            return Err(ParseError::with_file_location(
                "expected a var:, max, min or sc line",
                (line_number, raw_line),
            ));
        }
    }

    let Some((objective, utility)) = objective else {
        return Err(ParseError::new("the file declares no objective (a max or min line)"));
    };
    if !in_constraint_section {
        return Err(ParseError::new("the file has no constraint section (an sc line)"));
    }

    Ok(ProblemStatement {
        title: None,
        description: None,
        variables,
        objective,
        utility,
        constraints,
    })
}

#[cfg(test)]
mod test {
    use relp_num::{R64, Rational64};

    use crate::data::linear_program::elements::{ConstraintRelation, Objective};
    use crate::io::ProblemStatement;
    use crate::io::plain::parse;

    fn statement(text: &str) -> ProblemStatement<Rational64> {
        parse(text).unwrap()
    }

    #[test]
    fn a_complete_file() {
        let text = "\
            var: x_1, x_2, x_3\n\
            max z = 20*x_1 + 15*x_2 + 5*x_3\n\
            sc\n\
            \n\
            x_1 + x_2 + x_3 <= 20\n\
            2*x_1 + x_2 <= 25\n\
            x_1 - x_2 >= -10\n\
        ";
        let statement = statement(text);

        assert_eq!(
            statement.variables.iter().map(ToString::to_string).collect::<Vec<_>>(),
            vec!["x_1", "x_2", "x_3"],
        );
        assert_eq!(statement.objective, Objective::Maximize);
        assert_eq!(statement.utility.coefficient(&statement.variables[0]), R64!(20));
        assert_eq!(statement.constraints.len(), 3);
        assert_eq!(statement.constraints[2].1, ConstraintRelation::Greater);
        assert_eq!(statement.title, None);
    }

    #[test]
    fn declarations_may_span_lines_and_follow_the_objective() {
        let text = "\
            min z = x_1 + x_2\n\
            var: x_1\n\
            var: x_2\n\
            sc\n\
            x_1 + x_2 >= 4\n\
        ";
        let statement = statement(text);

        assert_eq!(statement.objective, Objective::Minimize);
        assert_eq!(statement.variables.len(), 2);
    }

    #[test]
    fn missing_pieces_are_reported() {
        assert!(parse::<Rational64>("var: x_1\nsc\nx_1 <= 1\n").is_err());
        assert!(parse::<Rational64>("var: x_1\nmax z = x_1\n").is_err());
        assert!(parse::<Rational64>("var: x_1\nmax z = x_1\nmin z = x_1\nsc\n").is_err());
    }

    #[test]
    fn errors_name_the_line() {
        let text = "var: x_1\nmax z = x_1\nsc\nx_1 + <= 3\n";
        let error = parse::<Rational64>(text).unwrap_err();

        assert!(error.to_string().contains("line 4"));
    }

    #[test]
    fn invalid_variable_names_are_rejected() {
        assert!(parse::<Rational64>("var: x 1\nmax z = x_1\nsc\n").is_err());
        assert!(parse::<Rational64>("var: \nmax z = x_1\nsc\n").is_err());
    }
}
