//! # Rendering of traces to LaTeX
//!
//! The generated document follows the layout of a worked example in a course text. Every problem
//! gets a section; every rewriting stage gets a subsection showing the system of constraints as
//! an aligned array; every basis exchange gets the ratio table that picked the pivot and the
//! system both before and after the substitutions are expanded.
//!
//! Up to and including the augmented form the objective is displayed above the system, the way
//! the problem was stated. From the standard form on, `z` is a row of the system itself.
use std::fmt;

use itertools::Itertools;
use num_traits::{One, Zero};
use relp_num::{OrderedField, OrderedFieldRef};

use crate::algorithm::trace::{IterationSnapshot, StageSnapshot, Trace};
use crate::data::affine::{LinearExpression, Variable};
use crate::data::linear_program::constraint::Constraint;
use crate::data::linear_program::elements::{ConstraintRelation, Objective, Stage};
use crate::data::linear_program::error::{InfeasibleOrigin, SolveError};
use crate::presentation::DocumentOptions;

/// Render one LaTeX document holding the full derivation of each trace.
///
/// # Return value
///
/// The document text, ready to be written to a `.tex` file and compiled.
pub fn render_document<OF>(traces: &[Trace<OF>], options: &DocumentOptions) -> String
where
    OF: OrderedField + fmt::Display,
    for<'r> &'r OF: OrderedFieldRef<OF>,
{
    let mut out = String::new();
    out.push_str("\\documentclass{article}\n");
    out.push_str(&format!("\\usepackage[margin={}]{{geometry}}\n", options.margin));
    out.push_str("\\usepackage{amsmath}\n");
    out.push_str("\\begin{document}\n\n");

    for trace in traces {
        render_trace(&mut out, trace);
    }

    out.push_str("\\end{document}\n");
    out
}

fn render_trace<OF>(out: &mut String, trace: &Trace<OF>)
where
    OF: OrderedField + fmt::Display,
    for<'r> &'r OF: OrderedFieldRef<OF>,
{
    let title = if trace.title.is_empty() {
        "Linear program".to_string()
    } else {
        escape_text(&trace.title)
    };
    out.push_str(&format!("\\section*{{{title}}}\n"));
    if !trace.description.is_empty() {
        out.push_str(&escape_text(&trace.description));
        out.push_str("\n\n");
    }

    for snapshot in &trace.stages {
        render_stage(out, snapshot, trace.stated_objective);
    }
    for iteration in &trace.iterations {
        render_iteration(out, iteration);
    }
    if let Some(optimal) = &trace.optimal {
        render_stage(out, optimal, trace.stated_objective);
    }
    render_outcome(out, trace);
}

fn render_stage<OF>(out: &mut String, snapshot: &StageSnapshot<OF>, stated: Objective)
where
    OF: OrderedField + fmt::Display,
    for<'r> &'r OF: OrderedFieldRef<OF>,
{
    out.push_str(&format!("\\subsection*{{{}}}\n", heading(snapshot.stage)));
    if !snapshot.comment.is_empty() {
        out.push_str(&escape_text(&snapshot.comment));
        out.push_str("\n\n");
    }

    match snapshot.stage {
        Stage::Initial => {
            render_written_objective(out, snapshot, stated);
            render_written_system(out, snapshot);
        }
        Stage::Canonical | Stage::Augmented => {
            render_written_objective(out, snapshot, Objective::Maximize);
            render_aligned_system(out, snapshot);
        }
        Stage::Standard => render_standard_system(out, snapshot),
        // The system did not change in these stages; only the conclusion drawn from it is new.
        Stage::BasicSolution | Stage::Pivoting | Stage::Optimal => {}
    }

    if let Some(solution) = &snapshot.solution {
        render_solution_line(out, solution, snapshot);
    }
}

/// The objective displayed above the system, for the forms in which `z` is not yet a row.
fn render_written_objective<OF>(out: &mut String, snapshot: &StageSnapshot<OF>, direction: Objective)
where
    OF: OrderedField + fmt::Display,
    for<'r> &'r OF: OrderedFieldRef<OF>,
{
    let operator = match direction {
        Objective::Maximize => "\\max",
        Objective::Minimize => "\\min",
    };
    out.push_str(&format!(
        "\\[ {operator} \\; z = {} \\]\n",
        latex_expression(snapshot.utility.rhs()),
    ));
}

/// The constraints exactly as stated, one free-form row each.
fn render_written_system<OF>(out: &mut String, snapshot: &StageSnapshot<OF>)
where
    OF: OrderedField + fmt::Display,
    for<'r> &'r OF: OrderedFieldRef<OF>,
{
    if snapshot.constraints.is_empty() {
        return;
    }

    let rows = snapshot
        .constraints
        .iter()
        .map(|constraint| {
            format!(
                "{} & {} & {}",
                latex_expression(constraint.lhs()),
                latex_relation(constraint.relation()),
                latex_expression(constraint.rhs()),
            )
        })
        .join(" \\\\\n");
    out.push_str(&format!(
        "\\[ \\left\\{{ \\begin{{array}}{{rcl}}\n{rows}\n\\end{{array}} \\right. \\]\n",
    ));
}

/// The canonical and augmented forms: variables on the left in declared order, one column pair
/// per variable so that equal variables line up vertically, the scalar on the right.
fn render_aligned_system<OF>(out: &mut String, snapshot: &StageSnapshot<OF>)
where
    OF: OrderedField + fmt::Display,
    for<'r> &'r OF: OrderedFieldRef<OF>,
{
    if snapshot.constraints.is_empty() {
        return;
    }

    let columns = "c".repeat(2 * snapshot.variables.len() + 2);
    let rows = snapshot
        .constraints
        .iter()
        .map(|constraint| {
            let mut cells = sign_term_pairs(constraint.lhs(), &snapshot.variables);
            cells.push(latex_relation(constraint.relation()).to_string());
            cells.push(latex_number(constraint.rhs().constant()));
            cells.join(" & ")
        })
        .join(" \\\\\n");
    out.push_str(&format!(
        "\\[ \\left\\{{ \\begin{{array}}{{{columns}}}\n{rows}\n\\end{{array}} \\right. \\]\n",
    ));
}

/// The standard form and later: `z` and every basic variable each equal to a scalar plus the
/// out-of-basis terms, with pending substitutions shown in parentheses.
fn render_standard_system<OF>(out: &mut String, snapshot: &StageSnapshot<OF>)
where
    OF: OrderedField + fmt::Display,
    for<'r> &'r OF: OrderedFieldRef<OF>,
{
    let columns = "c".repeat(2 * snapshot.variables.len() + 3);
    let mut rows = Vec::with_capacity(snapshot.constraints.len() + 1);
    rows.push(standard_row(&snapshot.utility, &snapshot.variables));
    for constraint in &snapshot.constraints {
        rows.push(standard_row(constraint, &snapshot.variables));
    }
    out.push_str(&format!(
        "\\[ \\left\\{{ \\begin{{array}}{{{columns}}}\n{}\n\\end{{array}} \\right. \\]\n",
        rows.join(" \\\\\n"),
    ));
}

fn standard_row<OF>(constraint: &Constraint<OF>, variables: &[Variable]) -> String
where
    OF: OrderedField + fmt::Display,
    for<'r> &'r OF: OrderedFieldRef<OF>,
{
    let mut cells = Vec::with_capacity(2 * variables.len() + 3);
    cells.push(latex_expression(constraint.lhs()));
    cells.push(latex_relation(constraint.relation()).to_string());
    cells.push(latex_number(constraint.rhs().constant()));
    cells.extend(substituted_pairs(constraint, variables));
    cells.join(" & ")
}

/// One sign cell and one term cell per declared variable, empty when the variable is absent.
///
/// The first present term carries a sign only when negative.
fn sign_term_pairs<OF>(expression: &LinearExpression<OF>, variables: &[Variable]) -> Vec<String>
where
    OF: OrderedField + fmt::Display,
    for<'r> &'r OF: OrderedFieldRef<OF>,
{
    let mut cells = Vec::with_capacity(2 * variables.len());
    let mut any_written = false;
    for variable in variables {
        let coefficient = expression.coefficient(variable);
        if coefficient.is_zero() {
            cells.push(String::new());
            cells.push(String::new());
            continue;
        }

        let negative = coefficient < OF::zero();
        let sign = if negative {
            "-"
        } else if any_written {
            "+"
        } else {
            ""
        };
        cells.push(sign.to_string());
        let magnitude = if negative { -&coefficient } else { coefficient };
        cells.push(latex_term(&magnitude, variable));
        any_written = true;
    }
    cells
}

/// Like [`sign_term_pairs`] over the constraint's right-hand side, but a variable with a pending
/// substitution shows its parenthesized replacement instead of its own name.
fn substituted_pairs<OF>(constraint: &Constraint<OF>, variables: &[Variable]) -> Vec<String>
where
    OF: OrderedField + fmt::Display,
    for<'r> &'r OF: OrderedFieldRef<OF>,
{
    let expression = constraint.rhs();
    let mut cells = Vec::with_capacity(2 * variables.len());
    for variable in variables {
        let coefficient = expression.coefficient(variable);
        if coefficient.is_zero() {
            cells.push(String::new());
            cells.push(String::new());
            continue;
        }

        let negative = coefficient < OF::zero();
        cells.push(if negative { "-" } else { "+" }.to_string());
        let magnitude = if negative { -&coefficient } else { coefficient };
        let cell = match constraint.substitutions().get(variable) {
            Some(replacement) => {
                let inner = latex_expression(replacement);
                if magnitude == OF::one() {
                    format!("\\left( {inner} \\right)")
                } else {
                    format!("{} \\left( {inner} \\right)", latex_number(&magnitude))
                }
            }
            None => latex_term(&magnitude, variable),
        };
        cells.push(cell);
    }
    cells
}

fn render_iteration<OF>(out: &mut String, iteration: &IterationSnapshot<OF>)
where
    OF: OrderedField + fmt::Display,
    for<'r> &'r OF: OrderedFieldRef<OF>,
{
    out.push_str(&format!("\\subsection*{{Basis exchange {}}}\n", iteration.number));

    let (entering, coefficient) = &iteration.entering;
    let entering_name = latex_variable(entering.name());
    out.push_str(&format!(
        "Increasing ${entering_name}$ raises the utility fastest: its coefficient ${}$ is the \
        largest positive one. Each row limits how far ${entering_name}$ can grow before the \
        row's basic variable turns negative.\n\n",
        latex_number(coefficient),
    ));

    if !iteration.ratio_lines.is_empty() {
        let rows = iteration
            .ratio_lines
            .iter()
            .map(|line| {
                let bound = match &line.bound {
                    Some((constraint, _)) => latex_constraint(constraint),
                    None => format!("{entering_name} \\geq 0"),
                };
                format!("{} & \\rightarrow & {bound}", latex_constraint(&line.requirement))
            })
            .join(" \\\\\n");
        out.push_str(&format!("\\[ \\begin{{array}}{{lll}}\n{rows}\n\\end{{array}} \\]\n"));
    }

    match &iteration.exchange {
        Some(exchange) => {
            let selected = iteration.ratio_lines.iter().find(|line| line.row == exchange.pivot_row);
            if let Some((bound, _)) = selected.and_then(|line| line.bound.as_ref()) {
                out.push_str(&format!(
                    "The strongest requirement is ${}$. ",
                    latex_constraint(bound),
                ));
            }
            out.push_str(&format!(
                "It comes from row {}, so ${}$ leaves the basis.\n\n",
                exchange.pivot_row + 1,
                latex_variable(exchange.leaving.name()),
            ));

            render_exchange_snapshot(
                out,
                "Solving that row for the entering variable and substituting it elsewhere:",
                &exchange.substituted,
            );
            render_exchange_snapshot(out, "Expanding the substitutions:", &exchange.expanded);
        }
        None => {
            out.push_str(&format!("No row puts an upper bound on ${entering_name}$.\n\n"));
        }
    }
}

fn render_exchange_snapshot<OF>(out: &mut String, lead: &str, snapshot: &StageSnapshot<OF>)
where
    OF: OrderedField + fmt::Display,
    for<'r> &'r OF: OrderedFieldRef<OF>,
{
    out.push_str(lead);
    out.push('\n');
    render_standard_system(out, snapshot);
    if let Some(solution) = &snapshot.solution {
        render_solution_line(out, solution, snapshot);
    }
    out.push('\n');
}

fn render_solution_line<OF>(out: &mut String, solution: &[(Variable, OF)], snapshot: &StageSnapshot<OF>)
where
    OF: OrderedField + fmt::Display,
    for<'r> &'r OF: OrderedFieldRef<OF>,
{
    let assignments = solution
        .iter()
        .map(|(variable, value)| {
            format!("${} = {}$", latex_variable(variable.name()), latex_number(value))
        })
        .join(" ; ");
    out.push_str(&format!(
        "The basic solution reads {assignments}, with $z = {}$.\n\n",
        latex_number(snapshot.utility.rhs().constant()),
    ));
}

fn render_outcome<OF>(out: &mut String, trace: &Trace<OF>)
where
    OF: OrderedField + fmt::Display,
    for<'r> &'r OF: OrderedFieldRef<OF>,
{
    match &trace.outcome {
        Ok(solution) => {
            let direction = match trace.stated_objective {
                Objective::Maximize => "maximum",
                Objective::Minimize => "minimum",
            };
            let assignments = solution
                .values()
                .iter()
                .map(|(variable, value)| {
                    format!("${} = {}$", latex_variable(variable.name()), latex_number(value))
                })
                .join(" ; ");
            out.push_str(&format!(
                "The {direction} of the utility function is $z = {}$, reached at {assignments}.\n\n",
                latex_number(solution.objective_value()),
            ));
        }
        Err(error) => {
            out.push_str(&failure_sentence(error));
            out.push_str("\n\n");
        }
    }
}

fn failure_sentence<OF: fmt::Display>(error: &SolveError<OF>) -> String {
    match error {
        SolveError::InfeasibleOrigin(InfeasibleOrigin::NegativeBasicValue {
            constraint,
            variable,
            value,
        }) => format!(
            "The origin is not a feasible starting point: in row {}, basic variable ${}$ would \
            start at ${}$.",
            constraint + 1,
            latex_variable(variable.name()),
            latex_number(value),
        ),
        SolveError::InfeasibleOrigin(InfeasibleOrigin::NoBasisCandidate { constraint }) => format!(
            "The origin is not a feasible starting point: row {} has no slack variable to put in \
            the initial basis.",
            constraint + 1,
        ),
        SolveError::Unbounded { entering } => format!(
            "The problem is unbounded: ${}$ can be increased without limit while improving the \
            utility.",
            latex_variable(entering.name()),
        ),
        SolveError::DegenerateBasis { variable, constraint } => match constraint {
            Some(index) => format!(
                "The derivation stops: ${}$ has coefficient zero in row {} and can not be made \
                basic there.",
                latex_variable(variable.name()),
                index + 1,
            ),
            None => format!(
                "The derivation stops: ${}$ can not be made basic in the targeted row.",
                latex_variable(variable.name()),
            ),
        },
        SolveError::CycleDetected { pivots } => format!(
            "No optimum was reached after {pivots} basis exchanges; the derivation appears to \
            cycle and was stopped.",
        ),
    }
}

fn latex_constraint<OF>(constraint: &Constraint<OF>) -> String
where
    OF: OrderedField + fmt::Display,
    for<'r> &'r OF: OrderedFieldRef<OF>,
{
    format!(
        "{} {} {}",
        latex_expression(constraint.lhs()),
        latex_relation(constraint.relation()),
        latex_expression(constraint.rhs()),
    )
}

fn latex_expression<OF>(expression: &LinearExpression<OF>) -> String
where
    OF: OrderedField + fmt::Display,
    for<'r> &'r OF: OrderedFieldRef<OF>,
{
    let mut out = String::new();
    let mut any_written = false;
    for (variable, coefficient) in expression.terms() {
        let negative = coefficient < &OF::zero();
        if any_written {
            out.push_str(if negative { " - " } else { " + " });
        } else if negative {
            out.push('-');
        }

        let magnitude = if negative { -coefficient } else { coefficient.clone() };
        out.push_str(&latex_term(&magnitude, variable));
        any_written = true;
    }

    let constant = expression.constant();
    if !any_written {
        out.push_str(&latex_number(constant));
    } else if !constant.is_zero() {
        if constant < &OF::zero() {
            out.push_str(&format!(" - {}", latex_number(&-constant)));
        } else {
            out.push_str(&format!(" + {}", latex_number(constant)));
        }
    }

    out
}

fn latex_term<OF>(magnitude: &OF, variable: &Variable) -> String
where
    OF: OrderedField + fmt::Display,
    for<'r> &'r OF: OrderedFieldRef<OF>,
{
    if magnitude == &OF::one() {
        latex_variable(variable.name())
    } else {
        format!("{} {}", latex_number(magnitude), latex_variable(variable.name()))
    }
}

/// Typeset everything after the first underscore as a subscript: `x_12` becomes `x_{12}`.
fn latex_variable(name: &str) -> String {
    match name.split_once('_') {
        Some((head, tail)) => format!("{head}_{{{}}}", tail.replace('_', "\\_")),
        None => name.to_string(),
    }
}

/// Typeset a number, turning the `numerator/denominator` display of rationals into `\frac`.
fn latex_number(value: &impl fmt::Display) -> String {
    let text = value.to_string();
    let (sign, magnitude) = match text.strip_prefix('-') {
        Some(magnitude) => ("-", magnitude),
        None => ("", text.as_str()),
    };
    match magnitude.split_once('/') {
        Some((numerator, denominator)) => format!("{sign}\\frac{{{numerator}}}{{{denominator}}}"),
        None => format!("{sign}{magnitude}"),
    }
}

fn latex_relation(relation: ConstraintRelation) -> &'static str {
    match relation {
        ConstraintRelation::Less => "\\leq",
        ConstraintRelation::Equal => "=",
        ConstraintRelation::Greater => "\\geq",
    }
}

fn escape_text(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for character in text.chars() {
        match character {
            '&' | '%' | '$' | '#' | '_' | '{' | '}' => {
                escaped.push('\\');
                escaped.push(character);
            }
            '~' => escaped.push_str("\\textasciitilde{}"),
            '^' => escaped.push_str("\\textasciicircum{}"),
            '\\' => escaped.push_str("\\textbackslash{}"),
            other => escaped.push(other),
        }
    }
    escaped
}

fn heading(stage: Stage) -> String {
    let text = stage.to_string();
    let mut characters = text.chars();
    match characters.next() {
        Some(first) => first.to_uppercase().collect::<String>() + characters.as_str(),
        None => text,
    }
}
