//! # Affine expressions
//!
//! Symbolic linear (affine) expressions over named variables with exact coefficients. These are
//! the values that constraints and objective functions are built from; all rewriting steps of the
//! simplex method are substitutions and ring operations on them.

pub mod expression;
pub mod variable;

pub use expression::LinearExpression;
pub use variable::Variable;
