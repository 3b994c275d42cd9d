//! # Parsing of affine expressions
//!
//! Problem files write expressions the way they are written on paper: `2*x_1 - x_2/3 + 4`. This
//! module tokenizes such a text and folds it into a `LinearExpression` with exact coefficients.
//! Products and divisions are checked for linearity while parsing, so `x_1 * x_2` is rejected
//! here rather than during solving.
use std::fmt;

use num_traits::{One, Zero};
use relp_num::{OrderedField, OrderedFieldRef};

use crate::data::affine::expression::NonLinearExpression;
use crate::data::affine::{LinearExpression, Variable};
use crate::data::linear_program::elements::ConstraintRelation;
use crate::io::error::ParseError;

/// Parse a complete affine expression.
///
/// # Arguments
///
/// * `input`: Text such as `2*x_1 - x_2/3 + 4`. Multiplication must be written explicitly; `2
/// x_1` is not accepted.
///
/// # Errors
///
/// When the text is not a well-formed affine expression.
pub fn parse_affine<OF>(input: &str) -> Result<LinearExpression<OF>, ParseError>
where
    OF: OrderedField + fmt::Display,
    for<'r> &'r OF: OrderedFieldRef<OF>,
{
    let tokens = tokenize(input)?;
    if tokens.is_empty() {
        return Err(ParseError::new("the expression is empty"));
    }

    let mut parser = Parser::new(&tokens);
    let expression = parser.expression()?;
    if !parser.done() {
        return Err(ParseError::new(
            "the expression has trailing input, note that multiplication is written with *",
        ));
    }

    Ok(expression)
}

/// Parse a line of the form `<expression> <relation> <expression>`.
///
/// The relation is the first `<=` in the line, otherwise the first `>=`, otherwise the first `=`.
///
/// # Errors
///
/// When no relation is present, or either side is not a well-formed affine expression.
pub(crate) fn parse_constraint<OF>(
    line: &str,
) -> Result<(LinearExpression<OF>, ConstraintRelation, LinearExpression<OF>), ParseError>
where
    OF: OrderedField + fmt::Display,
    for<'r> &'r OF: OrderedFieldRef<OF>,
{
    let (lhs_text, relation, rhs_text) = if let Some((lhs, rhs)) = line.split_once("<=") {
        (lhs, ConstraintRelation::Less, rhs)
    } else if let Some((lhs, rhs)) = line.split_once(">=") {
        (lhs, ConstraintRelation::Greater, rhs)
    } else if let Some((lhs, rhs)) = line.split_once('=') {
        (lhs, ConstraintRelation::Equal, rhs)
    } else {
        return Err(ParseError::new("the line contains no relation (<=, >= or =)"));
    };

    let lhs = parse_affine(lhs_text)
        .map_err(|error| ParseError::with_cause("could not parse the left-hand side", error))?;
    let rhs = parse_affine(rhs_text)
        .map_err(|error| ParseError::with_cause("could not parse the right-hand side", error))?;

    Ok((lhs, relation, rhs))
}

#[derive(Debug, Eq, PartialEq)]
enum Token {
    Number(String),
    Identifier(String),
    Plus,
    Minus,
    Star,
    Slash,
    Open,
    Close,
}

fn tokenize(input: &str) -> Result<Vec<Token>, ParseError> {
    let mut tokens = Vec::new();

    let mut characters = input.chars().peekable();
    while let Some(&character) = characters.peek() {
        match character {
            _ if character.is_whitespace() => {
                characters.next();
            }
            '+' => {
                characters.next();
                tokens.push(Token::Plus);
            }
            '-' => {
                characters.next();
                tokens.push(Token::Minus);
            }
            '*' => {
                characters.next();
                tokens.push(Token::Star);
            }
            '/' => {
                characters.next();
                tokens.push(Token::Slash);
            }
            '(' => {
                characters.next();
                tokens.push(Token::Open);
            }
            ')' => {
                characters.next();
                tokens.push(Token::Close);
            }
            '0'..='9' | '.' => {
                let mut text = String::new();
                while let Some(&digit_or_dot) = characters.peek() {
                    if digit_or_dot.is_ascii_digit() || digit_or_dot == '.' {
                        text.push(digit_or_dot);
                        characters.next();
                    } else {
                        break;
                    }
                }
                tokens.push(Token::Number(text));
            }
            _ if character.is_alphabetic() || character == '_' => {
                let mut name = String::new();
                while let Some(&part) = characters.peek() {
                    if part.is_alphanumeric() || part == '_' {
                        name.push(part);
                        characters.next();
                    } else {
                        break;
                    }
                }
                tokens.push(Token::Identifier(name));
            }
            other => {
                return Err(ParseError::new(format!("unexpected character '{other}'")));
            }
        }
    }

    Ok(tokens)
}

/// Recursive descent over a token stream.
///
/// Grammar, with the usual precedence of `*` and `/` over `+` and `-`:
///
/// ```text
/// expression := term (('+' | '-') term)*
/// term       := factor (('*' | '/') factor)*
/// factor     := ('+' | '-') factor | number | identifier | '(' expression ')'
/// ```
struct Parser<'a> {
    tokens: &'a [Token],
    position: usize,
}

impl<'a> Parser<'a> {
    fn new(tokens: &'a [Token]) -> Self {
        Self { tokens, position: 0 }
    }

    fn peek(&self) -> Option<&'a Token> {
        self.tokens.get(self.position)
    }

    fn advance(&mut self) -> Option<&'a Token> {
        let token = self.tokens.get(self.position);
        self.position += 1;
        token
    }

    fn done(&self) -> bool {
        self.position == self.tokens.len()
    }

    fn expression<OF>(&mut self) -> Result<LinearExpression<OF>, ParseError>
    where
        OF: OrderedField + fmt::Display,
        for<'r> &'r OF: OrderedFieldRef<OF>,
    {
        let mut result = self.term()?;

        while let Some(token) = self.peek() {
            match token {
                Token::Plus => {
                    self.advance();
                    result = result + self.term()?;
                }
                Token::Minus => {
                    self.advance();
                    result = result - self.term()?;
                }
                _ => break,
            }
        }

        Ok(result)
    }

    fn term<OF>(&mut self) -> Result<LinearExpression<OF>, ParseError>
    where
        OF: OrderedField + fmt::Display,
        for<'r> &'r OF: OrderedFieldRef<OF>,
    {
        let mut result = self.factor()?;

        while let Some(token) = self.peek() {
            match token {
                Token::Star => {
                    self.advance();
                    let factor = self.factor()?;
                    result = result.try_mul(&factor)?;
                }
                Token::Slash => {
                    self.advance();
                    let divisor = self.factor::<OF>()?;
                    if divisor.has_variables() {
                        return Err(NonLinearExpression::division(&result, &divisor).into());
                    }
                    if divisor.constant().is_zero() {
                        return Err(ParseError::new("division by zero"));
                    }
                    result.divide(divisor.constant());
                }
                _ => break,
            }
        }

        Ok(result)
    }

    fn factor<OF>(&mut self) -> Result<LinearExpression<OF>, ParseError>
    where
        OF: OrderedField + fmt::Display,
        for<'r> &'r OF: OrderedFieldRef<OF>,
    {
        match self.advance() {
            Some(Token::Plus) => self.factor(),
            Some(Token::Minus) => {
                let inner = self.factor::<OF>()?;
                Ok(-inner)
            }
            Some(Token::Number(text)) => Ok(LinearExpression::from_constant(parse_number(text)?)),
            Some(Token::Identifier(name)) => {
                Ok(LinearExpression::from_variable(Variable::new(name.clone())))
            }
            Some(Token::Open) => {
                let inner = self.expression()?;
                match self.advance() {
                    Some(Token::Close) => Ok(inner),
                    _ => Err(ParseError::new("expected a closing parenthesis")),
                }
            }
            Some(Token::Star | Token::Slash | Token::Close) => {
                Err(ParseError::new("expected a number, a variable or an opening parenthesis"))
            }
            None => Err(ParseError::new("the expression ends unexpectedly")),
        }
    }
}

/// Read a decimal number exactly.
///
/// The value is accumulated digit by digit, then divided by a power of ten matching the number of
/// fractional digits, so `2.5` becomes the exact value `5/2` rather than a nearby float.
fn parse_number<OF>(text: &str) -> Result<OF, ParseError>
where
    OF: OrderedField,
    for<'r> &'r OF: OrderedFieldRef<OF>,
{
    let one = OF::one();
    let mut ten = OF::zero();
    for _ in 0..10 {
        ten += &one;
    }

    let mut value = OF::zero();
    let mut scale = OF::one();
    let mut fractional = false;
    let mut any_digit = false;
    for character in text.chars() {
        if character == '.' {
            if fractional {
                return Err(ParseError::new(format!(
                    "number \"{text}\" has more than one decimal separator",
                )));
            }
            fractional = true;
            continue;
        }

        let Some(digit) = character.to_digit(10) else {
            return Err(ParseError::new(format!("unexpected character in number \"{text}\"")));
        };
        let mut digit_value = OF::zero();
        for _ in 0..digit {
            digit_value += &one;
        }

        value = &value * &ten;
        value += &digit_value;
        if fractional {
            scale = &scale * &ten;
        }
        any_digit = true;
    }

    if !any_digit {
        return Err(ParseError::new(format!("number \"{text}\" has no digits")));
    }

    value /= &scale;
    Ok(value)
}

#[cfg(test)]
mod test {
    use relp_num::{R64, Rational64};

    use crate::data::affine::{LinearExpression, Variable};
    use crate::data::linear_program::elements::ConstraintRelation;
    use crate::io::expression::{parse_affine, parse_constraint};

    fn x(i: u64) -> Variable {
        Variable::new(format!("x_{i}"))
    }

    fn parse(input: &str) -> LinearExpression<Rational64> {
        parse_affine(input).unwrap()
    }

    #[test]
    fn terms_signs_and_constants() {
        let expression = parse("2*x_1 - x_2 + 3");

        assert_eq!(expression.coefficient(&x(1)), R64!(2));
        assert_eq!(expression.coefficient(&x(2)), R64!(-1));
        assert_eq!(expression.constant(), &R64!(3));
    }

    #[test]
    fn decimals_are_exact() {
        let expression = parse("2.5*x_1 + 0.125");

        assert_eq!(expression.coefficient(&x(1)), R64!(5, 2));
        assert_eq!(expression.constant(), &R64!(1, 8));
    }

    #[test]
    fn division_builds_fractions() {
        let expression = parse("1/3*x_1 + x_2/2");

        assert_eq!(expression.coefficient(&x(1)), R64!(1, 3));
        assert_eq!(expression.coefficient(&x(2)), R64!(1, 2));
    }

    #[test]
    fn parentheses_and_unary_signs() {
        let expression = parse("-2*(x_1 - 3) + -x_2");

        assert_eq!(expression.coefficient(&x(1)), R64!(-2));
        assert_eq!(expression.coefficient(&x(2)), R64!(-1));
        assert_eq!(expression.constant(), &R64!(6));
    }

    #[test]
    fn nonlinear_input_is_rejected() {
        assert!(parse_affine::<Rational64>("x_1 * x_2").is_err());
        assert!(parse_affine::<Rational64>("1 / x_1").is_err());
        assert!(parse_affine::<Rational64>("x_1 / 0").is_err());
    }

    #[test]
    fn implicit_multiplication_is_rejected() {
        assert!(parse_affine::<Rational64>("2 x_1").is_err());
    }

    #[test]
    fn relations_are_recognized() {
        let (lhs, relation, rhs) = parse_constraint::<Rational64>("x_1 + 2*x_2 <= 10").unwrap();
        assert_eq!(lhs.coefficient(&x(2)), R64!(2));
        assert_eq!(relation, ConstraintRelation::Less);
        assert_eq!(rhs.constant(), &R64!(10));

        let (_, relation, _) = parse_constraint::<Rational64>("x_1 >= 0").unwrap();
        assert_eq!(relation, ConstraintRelation::Greater);
        let (_, relation, _) = parse_constraint::<Rational64>("x_1 = 5").unwrap();
        assert_eq!(relation, ConstraintRelation::Equal);

        assert!(parse_constraint::<Rational64>("x_1 + x_2").is_err());
    }
}
