//! # Variables
//!
//! Variables are identified by name only; they carry no bounds or cost. Everything else that is
//! known about a variable during a solve (whether it is basic, its current value) is tracked by
//! the problem it appears in.
use std::fmt;

/// A named decision variable.
///
/// Instances are cheap to clone and compare. The derived `Ord` orders variables by name, which is
/// the order used whenever a deterministic choice between variables has to be made.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Variable {
    /// Name as it appears in the problem statement, e.g. `x_1`.
    name: String,
}

impl Variable {
    /// Create a variable from its name.
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    /// Name as it appears in the problem statement.
    pub fn name(&self) -> &str {
        &self.name
    }
}

impl fmt::Display for Variable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}
