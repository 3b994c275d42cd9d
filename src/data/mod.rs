//! # Storing of linear programs in memory
//!
//! This module provides the data structures used to represent linear programs symbolically.
//! Algorithms working on these structures live in the `algorithm` module.

pub mod affine;
pub mod linear_program;
