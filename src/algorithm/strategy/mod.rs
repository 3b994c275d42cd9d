//! # Strategies
//!
//! Decisions the simplex method leaves open are separated from the loop that applies them. Only
//! the choice of entering variable is strategic; the leaving variable follows from the minimum
//! ratio test.
pub mod pivot_rule;
