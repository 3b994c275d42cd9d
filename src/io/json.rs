//! # Reading of problems from JSON
//!
//! A JSON file holds either a single problem object or an array of them. Expressions and
//! constraints are written as strings in the same syntax as the plain-text format:
//!
//! ```text
//! {
//!     "title": "Production planning",
//!     "description": "Two products compete for the same machine hours.",
//!     "variables": ["x_1", "x_2"],
//!     "optimizer": "max",
//!     "utility": "2*x_1 + x_2",
//!     "constraints": ["x_1 + x_2 <= 10", "x_1 - x_2 >= -4"]
//! }
//! ```
//!
//! The `title` and `description` fields are optional.
use std::fmt;

use relp_num::{OrderedField, OrderedFieldRef};
use serde::Deserialize;

use crate::data::affine::Variable;
use crate::data::linear_program::elements::Objective;
use crate::io::ProblemStatement;
use crate::io::error::ParseError;
use crate::io::expression::{parse_affine, parse_constraint};

/// One problem as it appears in the file, before any expression is parsed.
#[derive(Deserialize)]
struct RawProblem {
    title: Option<String>,
    description: Option<String>,
    variables: Vec<String>,
    optimizer: String,
    utility: String,
    constraints: Vec<String>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawDocument {
    Single(RawProblem),
    Many(Vec<RawProblem>),
}

/// Parse the text of a JSON problem file.
///
/// # Errors
///
/// When the text is not valid JSON of the expected shape, or any of the contained expressions can
/// not be parsed.
pub(super) fn parse<OF>(text: &str) -> Result<Vec<ProblemStatement<OF>>, ParseError>
where
    OF: OrderedField + fmt::Display,
    for<'r> &'r OF: OrderedFieldRef<OF>,
{
    let document: RawDocument = serde_json::from_str(text)
        .map_err(|error| ParseError::new(format!("invalid JSON: {error}")))?;
    let raw_problems = match document {
        RawDocument::Single(problem) => vec![problem],
        RawDocument::Many(problems) => problems,
    };

    raw_problems.into_iter().map(convert).collect()
}

fn convert<OF>(raw: RawProblem) -> Result<ProblemStatement<OF>, ParseError>
where
    OF: OrderedField + fmt::Display,
    for<'r> &'r OF: OrderedFieldRef<OF>,
{
    let objective = match raw.optimizer.trim().to_lowercase().as_str() {
        "max" | "maximize" => Objective::Maximize,
        "min" | "minimize" => Objective::Minimize,
        other => {
            return Err(ParseError::new(format!(
                "could not recognize optimizer \"{other}\", expected max or min",
            )));
        }
    };

    let utility = parse_affine(&raw.utility)
        .map_err(|error| ParseError::with_cause("could not parse the utility function", error))?;

    let constraints = raw
        .constraints
        .iter()
        .enumerate()
        .map(|(index, line)| {
            parse_constraint(line).map_err(|error| {
                ParseError::with_cause(
                    format!("could not parse constraint {}: \"{line}\"", index + 1),
                    error,
                )
            })
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(ProblemStatement {
        title: raw.title,
        description: raw.description,
        variables: raw.variables.into_iter().map(Variable::new).collect(),
        objective,
        utility,
        constraints,
    })
}
