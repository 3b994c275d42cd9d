//! # Building blocks to describe linear programs.
use std::fmt;
use std::ops::Not;

/// A `Constraint` relates its two sides by a type of (in)equality.
#[allow(missing_docs)]
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum ConstraintRelation {
    Less,
    Equal,
    Greater,
}

impl Not for ConstraintRelation {
    type Output = Self;

    fn not(self) -> Self::Output {
        match self {
            Self::Less => Self::Greater,
            Self::Equal => Self::Equal,
            Self::Greater => Self::Less,
        }
    }
}

impl fmt::Display for ConstraintRelation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Less => "<=",
            Self::Equal => "=",
            Self::Greater => ">=",
        })
    }
}

/// Direction of optimization.
#[allow(missing_docs)]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Objective {
    Maximize,
    Minimize,
}

impl Not for Objective {
    type Output = Self;

    fn not(self) -> Self::Output {
        match self {
            Self::Maximize => Self::Minimize,
            Self::Minimize => Self::Maximize,
        }
    }
}

impl fmt::Display for Objective {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Maximize => "maximize",
            Self::Minimize => "minimize",
        })
    }
}

/// How far along the solution pipeline a program has been rewritten.
///
/// Stages are strictly ordered; each transformation moves the program from one stage to the next
/// and a program never moves backwards.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum Stage {
    /// As stated by the modeller, before any rewriting.
    Initial,
    /// Variables on the left, scalars on the right, no `>=` constraints, maximization.
    Canonical,
    /// Slack variables absorb the inequalities; all constraints are equalities.
    Augmented,
    /// Every constraint is solved for its basic variable.
    Standard,
    /// The origin has been read off as a first feasible solution.
    BasicSolution,
    /// At least one basis exchange has been applied.
    Pivoting,
    /// No candidate improves the objective any further.
    Optimal,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Initial => "initial form",
            Self::Canonical => "canonical form",
            Self::Augmented => "augmented form",
            Self::Standard => "standard form",
            Self::BasicSolution => "basic solution",
            Self::Pivoting => "pivoting",
            Self::Optimal => "optimal solution",
        })
    }
}

#[cfg(test)]
mod test {
    use crate::data::linear_program::elements::{ConstraintRelation, Objective, Stage};

    #[test]
    fn relation_negation() {
        assert_eq!(!ConstraintRelation::Less, ConstraintRelation::Greater);
        assert_eq!(!ConstraintRelation::Greater, ConstraintRelation::Less);
        assert_eq!(!ConstraintRelation::Equal, ConstraintRelation::Equal);
    }

    #[test]
    fn objective_negation() {
        assert_eq!(!Objective::Minimize, Objective::Maximize);
    }

    #[test]
    fn stages_are_ordered() {
        assert!(Stage::Initial < Stage::Canonical);
        assert!(Stage::Canonical < Stage::Augmented);
        assert!(Stage::Augmented < Stage::Standard);
        assert!(Stage::Standard < Stage::BasicSolution);
        assert!(Stage::BasicSolution < Stage::Pivoting);
        assert!(Stage::Pivoting < Stage::Optimal);
    }
}
