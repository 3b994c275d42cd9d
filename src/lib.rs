//! # A step-by-step simplex solver
//!
//! Linear programs over exact rational numbers are solved with the Simplex Method, the way it is
//! taught: the problem is rewritten through a fixed series of algebraic forms (canonical,
//! augmented, standard, basic solution) and then pivoted until optimality. Every intermediate
//! form is kept, such that the full derivation can be rendered as a document afterwards.
#![warn(missing_docs)]

pub mod algorithm;
pub mod data;
pub mod io;
pub mod presentation;
