//! # Linear expressions
//!
//! An affine combination of variables with an exact constant term. All problem rewriting done by
//! the solver (moving terms across a relation, eliminating a basic variable, substituting a pivot
//! result) is expressed through the operations in this module.
use std::collections::BTreeMap;
use std::collections::btree_map::Entry;
use std::error::Error;
use std::fmt;
use std::mem;
use std::ops::{Add, Neg, Sub};

use num_traits::{One, Zero};
use relp_num::{OrderedField, OrderedFieldRef};

use crate::data::affine::variable::Variable;

/// An affine expression: a sum of variable terms plus a constant.
///
/// The zero coefficient is never stored; a variable either appears with a nonzero coefficient or
/// not at all. As a consequence, equality of expressions is structural equality of their
/// normalized forms.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinearExpression<OF> {
    /// Nonzero coefficients by variable.
    ///
    /// The map keeps terms in variable name order, which is both the rendering order and the
    /// order used to break ties between variables.
    terms: BTreeMap<Variable, OF>,
    /// Constant part of the expression.
    constant: OF,
}

impl<OF> LinearExpression<OF> {
    /// The constant part of the expression.
    pub fn constant(&self) -> &OF {
        &self.constant
    }

    /// All terms with a nonzero coefficient, in variable name order.
    pub fn terms(&self) -> impl Iterator<Item = (&Variable, &OF)> {
        self.terms.iter()
    }

    /// The variables appearing in this expression, in name order.
    pub fn variables(&self) -> impl Iterator<Item = &Variable> {
        self.terms.keys()
    }

    /// Whether any variable appears with a nonzero coefficient.
    pub fn has_variables(&self) -> bool {
        !self.terms.is_empty()
    }
}

impl<OF> LinearExpression<OF>
where
    OF: OrderedField,
    for<'r> &'r OF: OrderedFieldRef<OF>,
{
    /// The expression consisting of a constant only.
    pub fn from_constant(constant: OF) -> Self {
        Self { terms: BTreeMap::new(), constant }
    }

    /// The expression `0`.
    pub fn zero() -> Self {
        Self::from_constant(OF::zero())
    }

    /// The expression consisting of a single variable with coefficient one.
    pub fn from_variable(variable: Variable) -> Self {
        let mut expression = Self::zero();
        expression.add_term(variable, OF::one());
        expression
    }

    /// The coefficient of a variable, owned.
    ///
    /// Variables that don't appear in the expression have coefficient zero.
    pub fn coefficient(&self, variable: &Variable) -> OF {
        self.terms.get(variable).cloned().unwrap_or_else(OF::zero)
    }

    /// Add `coefficient * variable` to the expression.
    ///
    /// If the variable's total coefficient becomes zero, the term is removed.
    pub fn add_term(&mut self, variable: Variable, coefficient: OF) {
        if coefficient.is_zero() {
            return;
        }

        match self.terms.entry(variable) {
            Entry::Occupied(mut entry) => {
                *entry.get_mut() += &coefficient;
                if entry.get().is_zero() {
                    entry.remove();
                }
            }
            Entry::Vacant(entry) => {
                entry.insert(coefficient);
            }
        }
    }

    /// The expression without its constant part.
    pub fn variable_part(&self) -> Self {
        Self { terms: self.terms.clone(), constant: OF::zero() }
    }

    /// Keep only the given variable's term and the constant, dropping all other terms.
    ///
    /// This is setting all other variables to zero, as done when deriving the bound a constraint
    /// imposes on a candidate entering variable.
    pub fn restricted_to(&self, variable: &Variable) -> Self {
        let mut expression = Self::from_constant(self.constant.clone());
        if let Some(coefficient) = self.terms.get(variable) {
            expression.add_term(variable.clone(), coefficient.clone());
        }
        expression
    }

    /// Multiply the entire expression by a factor.
    pub fn scale(&mut self, factor: &OF) {
        if factor.is_zero() {
            *self = Self::zero();
            return;
        }

        for coefficient in self.terms.values_mut() {
            *coefficient *= factor;
        }
        self.constant *= factor;
    }

    /// Divide the entire expression by a nonzero value.
    pub fn divide(&mut self, divisor: &OF) {
        debug_assert!(!divisor.is_zero());

        for coefficient in self.terms.values_mut() {
            *coefficient /= divisor;
        }
        self.constant /= divisor;
    }

    /// Add `factor` times `other` to this expression.
    pub fn add_scaled(&mut self, factor: &OF, other: &Self) {
        if factor.is_zero() {
            return;
        }

        for (variable, coefficient) in &other.terms {
            self.add_term(variable.clone(), factor * coefficient);
        }
        let constant = factor * &other.constant;
        self.constant += &constant;
    }

    /// Replace variables by entire expressions, simultaneously.
    ///
    /// All replacements read the expression as it was before the call; a replacement expression
    /// reintroducing a variable that is itself being replaced is not expanded further.
    pub fn substitute(&mut self, replacements: &BTreeMap<Variable, Self>) {
        let old_terms = mem::take(&mut self.terms);
        for (variable, coefficient) in old_terms {
            match replacements.get(&variable) {
                Some(replacement) => self.add_scaled(&coefficient, replacement),
                None => self.add_term(variable, coefficient),
            }
        }
    }

    /// Evaluate the expression under an assignment of values to variables.
    pub fn evaluate(&self, value_of: impl Fn(&Variable) -> OF) -> OF {
        let mut total = self.constant.clone();
        for (variable, coefficient) in &self.terms {
            let contribution = coefficient * &value_of(variable);
            total += &contribution;
        }
        total
    }
}

impl<OF> LinearExpression<OF>
where
    OF: OrderedField + fmt::Display,
    for<'r> &'r OF: OrderedFieldRef<OF>,
{
    /// Multiply two expressions, if the result is affine again.
    ///
    /// # Errors
    ///
    /// If both operands contain variables; the product would be of degree two.
    pub fn try_mul(&self, other: &Self) -> Result<Self, NonLinearExpression> {
        match (self.has_variables(), other.has_variables()) {
            (true, true) => Err(NonLinearExpression::multiplication(self, other)),
            (true, false) => {
                let mut product = self.clone();
                product.scale(&other.constant);
                Ok(product)
            }
            (false, _) => {
                let mut product = other.clone();
                product.scale(&self.constant);
                Ok(product)
            }
        }
    }
}

impl<OF> Add for LinearExpression<OF>
where
    OF: OrderedField,
    for<'r> &'r OF: OrderedFieldRef<OF>,
{
    type Output = Self;

    fn add(mut self, other: Self) -> Self::Output {
        for (variable, coefficient) in other.terms {
            self.add_term(variable, coefficient);
        }
        self.constant += &other.constant;
        self
    }
}

impl<OF> Sub for LinearExpression<OF>
where
    OF: OrderedField,
    for<'r> &'r OF: OrderedFieldRef<OF>,
{
    type Output = Self;

    fn sub(self, other: Self) -> Self::Output {
        self + -other
    }
}

impl<OF> Neg for LinearExpression<OF>
where
    OF: OrderedField,
    for<'r> &'r OF: OrderedFieldRef<OF>,
{
    type Output = Self;

    fn neg(mut self) -> Self::Output {
        for coefficient in self.terms.values_mut() {
            *coefficient = -&*coefficient;
        }
        self.constant = -self.constant;
        self
    }
}

impl<OF> fmt::Display for LinearExpression<OF>
where
    OF: OrderedField + fmt::Display,
    for<'r> &'r OF: OrderedFieldRef<OF>,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut any_written = false;

        for (variable, coefficient) in &self.terms {
            let negative = coefficient < &OF::zero();
            if any_written {
                f.write_str(if negative { " - " } else { " + " })?;
            } else if negative {
                f.write_str("-")?;
            }

            let magnitude = if negative { -coefficient } else { coefficient.clone() };
            if magnitude == OF::one() {
                write!(f, "{variable}")?;
            } else {
                write!(f, "{magnitude}*{variable}")?;
            }
            any_written = true;
        }

        if !any_written {
            write!(f, "{}", self.constant)?;
        } else if !self.constant.is_zero() {
            if self.constant < OF::zero() {
                write!(f, " - {}", -&self.constant)?;
            } else {
                write!(f, " + {}", self.constant)?;
            }
        }

        Ok(())
    }
}

/// A multiplication or division that would leave the affine domain.
///
/// Problem statements are written with `*` and `/`, so a statement like `x_1 * x_2 <= 4` is only
/// detected as nonlinear once both operands have been parsed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NonLinearExpression {
    description: String,
}

impl NonLinearExpression {
    /// A product of two expressions that both contain variables.
    pub(crate) fn multiplication(left: &impl fmt::Display, right: &impl fmt::Display) -> Self {
        Self {
            description: format!(
                "product of two expressions that both contain variables: ({left}) * ({right})",
            ),
        }
    }

    /// A division by an expression that contains variables.
    pub(crate) fn division(left: &impl fmt::Display, right: &impl fmt::Display) -> Self {
        Self {
            description: format!(
                "division by an expression that contains variables: ({left}) / ({right})",
            ),
        }
    }
}

impl fmt::Display for NonLinearExpression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "nonlinear expression: {}", self.description)
    }
}

impl Error for NonLinearExpression {}
