//! # Solver errors
//!
//! Failures the pipeline can run into once a problem has been accepted by the input layer. Each
//! carries the variable or constraint that triggered it, so that a report can point at the exact
//! place where the derivation stopped.
use std::error::Error;
use std::fmt;

use crate::data::affine::variable::Variable;

/// Why a solve did not reach an optimal solution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SolveError<OF> {
    /// The origin can't serve as the first basic solution.
    InfeasibleOrigin(InfeasibleOrigin<OF>),
    /// An improving variable can be increased without bound.
    Unbounded {
        /// The entering variable that no constraint bounds.
        entering: Variable,
    },
    /// A variable was brought into the basis of a constraint it has coefficient zero in.
    DegenerateBasis {
        /// The variable that was to become basic.
        variable: Variable,
        /// Zero-based index of the constraint, if known at the point of failure.
        constraint: Option<usize>,
    },
    /// The iteration cap was reached without the optimality test succeeding.
    CycleDetected {
        /// Number of basis exchanges that were applied.
        pivots: usize,
    },
}

/// Why the origin is not a feasible starting point.
///
/// The simplex variant implemented here starts from the all-slack basis; problems whose origin is
/// cut off would need a phase-one treatment that is out of scope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InfeasibleOrigin<OF> {
    /// A basic variable would start at a negative value.
    NegativeBasicValue {
        /// Zero-based index of the constraint that the variable is basic in.
        constraint: usize,
        /// The basic variable itself.
        variable: Variable,
        /// The negative value it would take at the origin.
        value: OF,
    },
    /// A constraint received no slack variable and therefore offers no basis candidate.
    ///
    /// This happens for constraints that were equalities from the start.
    NoBasisCandidate {
        /// Zero-based index of the constraint.
        constraint: usize,
    },
}

impl<OF> SolveError<OF> {
    /// Attach the constraint index to errors raised below the program level.
    pub(crate) fn at_constraint(self, index: usize) -> Self {
        match self {
            Self::DegenerateBasis { variable, constraint: None } => {
                Self::DegenerateBasis { variable, constraint: Some(index) }
            }
            other => other,
        }
    }
}

impl<OF: fmt::Display> fmt::Display for SolveError<OF> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InfeasibleOrigin(origin) => origin.fmt(f),
            Self::Unbounded { entering } => {
                write!(f, "unbounded problem: no constraint bounds entering variable {entering}")
            }
            Self::DegenerateBasis { variable, constraint: Some(index) } => write!(
                f,
                "variable {variable} has coefficient zero in constraint {} and can't be made \
                basic there",
                index + 1,
            ),
            Self::DegenerateBasis { variable, constraint: None } => write!(
                f,
                "variable {variable} has coefficient zero in the targeted constraint and can't \
                be made basic there",
            ),
            Self::CycleDetected { pivots } => write!(
                f,
                "no optimum after {pivots} basis exchanges; the problem appears to cycle",
            ),
        }
    }
}

impl<OF: fmt::Display> fmt::Display for InfeasibleOrigin<OF> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NegativeBasicValue { constraint, variable, value } => write!(
                f,
                "the origin is not feasible: basic variable {variable} of constraint {} would \
                start at {value}",
                constraint + 1,
            ),
            Self::NoBasisCandidate { constraint } => write!(
                f,
                "the origin is not feasible: constraint {} has no basic variable to represent it \
                in the initial basis",
                constraint + 1,
            ),
        }
    }
}

impl<OF: fmt::Debug + fmt::Display> Error for SolveError<OF> {}

impl<OF: fmt::Debug + fmt::Display> Error for InfeasibleOrigin<OF> {}

impl<OF> From<InfeasibleOrigin<OF>> for SolveError<OF> {
    fn from(origin: InfeasibleOrigin<OF>) -> Self {
        Self::InfeasibleOrigin(origin)
    }
}
