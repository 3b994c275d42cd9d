//! # Reading of problem statements
//!
//! This module provides the front ends that read problem files. A front end parses the text of a
//! file into a `ProblemStatement`, which is checked for consistency and then converted into a
//! `SimplexProgram` for the solver.
use std::collections::BTreeSet;
use std::fmt;
use std::fs;
use std::path::Path;

use relp_num::{OrderedField, OrderedFieldRef};

use crate::data::affine::{LinearExpression, Variable};
use crate::data::linear_program::constraint::Constraint;
use crate::data::linear_program::elements::{ConstraintRelation, Objective};
use crate::data::linear_program::program::{OBJECTIVE_NAME, SimplexProgram};
use crate::io::error::{ImportError, InconsistencyError};

pub mod error;
pub mod expression;
mod json;
mod plain;

/// Import problems from a file.
///
/// The file extension decides the format: `lp` and `txt` files hold a single plain-text problem,
/// `json` files hold one problem object or an array of them.
///
/// # Errors
///
/// When the file extension is unknown, the file can not be read, or its contents can not be
/// parsed.
pub fn import<OF>(file_path: &Path) -> Result<Vec<ProblemStatement<OF>>, ImportError>
where
    OF: OrderedField + fmt::Display,
    for<'r> &'r OF: OrderedFieldRef<OF>,
{
    let text = fs::read_to_string(file_path).map_err(ImportError::IO)?;

    match file_path.extension() {
        Some(extension) => match extension.to_str() {
            Some("lp" | "txt") => Ok(vec![plain::parse(&text)?]),
            Some("json") => Ok(json::parse(&text)?),
            Some(extension_string) => Err(ImportError::FileExtension(format!(
                "Could not recognise file extension \"{}\" of file: {:?}",
                extension_string, file_path,
            ))),
            None => Err(ImportError::FileExtension(format!(
                "Could not convert OsStr to &str, probably invalid unicode: {:?}",
                extension,
            ))),
        },
        None => Err(ImportError::FileExtension(format!(
            "Could not read extension from file path: {:?}",
            file_path,
        ))),
    }
}

/// A problem as stated in a file, after parsing but before any rewriting.
///
/// The fields are public, so a statement can also be built directly when the solver is used as a
/// library without going through a file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProblemStatement<OF> {
    /// Short name of the problem.
    pub title: Option<String>,
    /// Free-form text describing the problem setting.
    pub description: Option<String>,
    /// The decision variables, in declaration order.
    pub variables: Vec<Variable>,
    /// Whether the utility function is to be maximized or minimized.
    pub objective: Objective,
    /// The utility function.
    pub utility: LinearExpression<OF>,
    /// The constraints as written: left-hand side, relation, right-hand side.
    pub constraints: Vec<(LinearExpression<OF>, ConstraintRelation, LinearExpression<OF>)>,
}

impl<OF> ProblemStatement<OF> {
    /// Check the statement for logical consistency.
    ///
    /// # Errors
    ///
    /// When no variables are declared, a variable name is empty, uses characters outside letters,
    /// digits and underscores, collides with the objective variable name or is declared twice, or
    /// an expression uses an undeclared variable.
    pub fn validate(&self) -> Result<(), InconsistencyError> {
        if self.variables.is_empty() {
            return Err(InconsistencyError::new("no variables are declared"));
        }

        let mut declared = BTreeSet::new();
        for variable in &self.variables {
            let name = variable.name();
            if name.is_empty() {
                return Err(InconsistencyError::new("a variable has an empty name"));
            }
            if name == OBJECTIVE_NAME {
                return Err(InconsistencyError::new(format!(
                    "the name \"{OBJECTIVE_NAME}\" is reserved for the objective variable",
                )));
            }
            if !name.chars().all(|character| character.is_alphanumeric() || character == '_') {
                return Err(InconsistencyError::new(format!(
                    "variable name \"{name}\" uses characters outside letters, digits and \
                    underscores",
                )));
            }
            if !declared.insert(variable) {
                return Err(InconsistencyError::new(format!(
                    "variable \"{name}\" is declared twice",
                )));
            }
        }

        for variable in self.utility.variables() {
            if !declared.contains(variable) {
                return Err(InconsistencyError::new(format!(
                    "the utility function uses undeclared variable \"{variable}\"",
                )));
            }
        }
        for (index, (lhs, _, rhs)) in self.constraints.iter().enumerate() {
            for variable in lhs.variables().chain(rhs.variables()) {
                if !declared.contains(variable) {
                    return Err(InconsistencyError::new(format!(
                        "constraint {} uses undeclared variable \"{variable}\"",
                        index + 1,
                    )));
                }
            }
        }

        Ok(())
    }
}

impl<OF> ProblemStatement<OF>
where
    OF: OrderedField,
    for<'r> &'r OF: OrderedFieldRef<OF>,
{
    /// Convert the statement into a program ready for the solver.
    ///
    /// # Errors
    ///
    /// When the statement is not consistent, see [`ProblemStatement::validate`].
    pub fn into_program(self) -> Result<SimplexProgram<OF>, InconsistencyError> {
        self.validate()?;

        let constraints = self
            .constraints
            .into_iter()
            .map(|(lhs, relation, rhs)| Constraint::new(lhs, relation, rhs))
            .collect();
        let mut program =
            SimplexProgram::new(self.objective, self.utility, constraints, self.variables);
        if let Some(title) = self.title {
            program = program.with_title(title);
        }
        if let Some(description) = self.description {
            program = program.with_description(description);
        }

        Ok(program)
    }
}

#[cfg(test)]
mod test {
    use relp_num::{R64, Rational64};

    use crate::data::affine::{LinearExpression, Variable};
    use crate::data::linear_program::elements::{ConstraintRelation, Objective, Stage};
    use crate::io::ProblemStatement;

    fn x(i: u64) -> Variable {
        Variable::new(format!("x_{i}"))
    }

    fn statement() -> ProblemStatement<Rational64> {
        let mut utility = LinearExpression::zero();
        utility.add_term(x(1), R64!(2));
        utility.add_term(x(2), R64!(1));

        let mut lhs = LinearExpression::zero();
        lhs.add_term(x(1), R64!(1));
        lhs.add_term(x(2), R64!(1));

        ProblemStatement {
            title: Some("Production planning".to_string()),
            description: None,
            variables: vec![x(1), x(2)],
            objective: Objective::Maximize,
            utility,
            constraints: vec![(
                lhs,
                ConstraintRelation::Less,
                LinearExpression::from_constant(R64!(10)),
            )],
        }
    }

    #[test]
    fn a_consistent_statement_becomes_a_program() {
        let program = statement().into_program().unwrap();

        assert_eq!(program.title(), "Production planning");
        assert_eq!(program.stage(), Stage::Initial);
        assert_eq!(program.variables(), &[x(1), x(2)]);
        assert_eq!(program.constraints().len(), 1);
    }

    #[test]
    fn undeclared_variables_are_caught() {
        let mut with_undeclared_in_utility = statement();
        with_undeclared_in_utility.utility.add_term(x(3), R64!(1));
        assert!(with_undeclared_in_utility.validate().is_err());

        let mut with_undeclared_in_constraint = statement();
        with_undeclared_in_constraint.constraints[0].0.add_term(x(7), R64!(1));
        assert!(with_undeclared_in_constraint.validate().is_err());
    }

    #[test]
    fn the_objective_name_is_reserved() {
        let mut statement = statement();
        statement.variables.push(Variable::new("z"));

        assert!(statement.validate().is_err());
    }

    #[test]
    fn double_declarations_are_caught() {
        let mut statement = statement();
        statement.variables.push(x(1));

        assert!(statement.validate().is_err());
    }

    #[test]
    fn an_empty_constraint_list_is_allowed() {
        let mut statement = statement();
        statement.constraints.clear();

        assert!(statement.validate().is_ok());
    }
}
