//! # Representing linear programs
//!
//! A linear program is held as a collection of symbolic constraints together with an objective.
//! The same value moves through all forms the simplex method needs (canonical, augmented,
//! standard, basic solution); each transformation rewrites the program in place and records which
//! form it is now in.
pub mod constraint;
pub mod elements;
pub mod error;
pub mod program;
pub mod solution;
