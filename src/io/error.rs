//! # Error reporting for reading of problem files
//!
//! A collection of enums and structures describing any problems encountered during reading and
//! parsing.
use std::error::Error;
use std::fmt;
use std::io;

use crate::data::affine::expression::NonLinearExpression;

/// An `ImportError` is created when an error was encountered during IO or parsing.
///
/// It is the highest error in the io error hierarchy.
#[derive(Debug)]
pub enum ImportError {
    /// The file extension of the provided file path is not known or supported.
    ///
    /// The contained `String` is a message for the end user.
    FileExtension(String),
    /// The file to read isn't found, or the reading of the file couldn't start or was
    /// interrupted.
    IO(io::Error),
    /// Contents of the file could not be parsed into a problem statement.
    ///
    /// # Note
    ///
    /// If the problem is inconsistent, that will not be represented with this error. This variant
    /// should only be created for syntactically incorrect files.
    Parse(ParseError),
    /// There is a logical inconsistency in the problem described by a file.
    ///
    /// For example, a constraint might use a variable which was never declared.
    Inconsistency(InconsistencyError),
}

impl fmt::Display for ImportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::FileExtension(message) => message.fmt(f),
            Self::IO(error) => error.fmt(f),
            Self::Parse(error) => error.fmt(f),
            Self::Inconsistency(error) => error.fmt(f),
        }
    }
}

impl Error for ImportError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::FileExtension(_) => None,
            Self::IO(error) => Some(error),
            Self::Parse(error) => error.source(),
            Self::Inconsistency(_) => None,
        }
    }
}

impl From<ParseError> for ImportError {
    fn from(error: ParseError) -> Self {
        Self::Parse(error)
    }
}

impl From<InconsistencyError> for ImportError {
    fn from(error: InconsistencyError) -> Self {
        Self::Inconsistency(error)
    }
}

/// A `ParseError` represents all errors encountered during parsing.
///
/// It may recursively hold more `ParseError`s to provide more detail. At the end of this chain,
/// there may be a file location containing a line number and line at which the error was caused,
/// or the nonlinear expression that was found.
#[derive(Debug)]
pub struct ParseError {
    description: String,
    source: Option<ParseErrorSource>,
}

/// What caused a `ParseError`, when more than a description is known.
#[derive(Debug)]
enum ParseErrorSource {
    FileLocation(u64, String),
    NonLinear(NonLinearExpression),
    Nested(Box<ParseError>),
}

impl ParseError {
    /// Create a new `ParseError` with only a description.
    ///
    /// # Arguments
    ///
    /// * `description`: What's wrong at the moment of creation.
    pub fn new(description: impl Into<String>) -> Self {
        Self { description: description.into(), source: None }
    }

    /// Create a new `ParseError` instance with a `FileLocation` as a cause.
    ///
    /// # Arguments
    ///
    /// * `description`: What's wrong at the moment of creation.
    /// * `file_location`: The line number and line that caused the error.
    pub fn with_file_location(description: impl Into<String>, file_location: FileLocation) -> Self {
        let (line_number, line) = file_location;
        Self {
            description: description.into(),
            source: Some(ParseErrorSource::FileLocation(line_number, line.to_string())),
        }
    }

    /// Wrap a new `ParseError` around an existing one.
    ///
    /// # Arguments
    ///
    /// * `description`: What's wrong at the moment of creation.
    /// * `cause`: What caused this `ParseError`.
    pub fn with_cause(description: impl Into<String>, cause: ParseError) -> Self {
        Self {
            description: description.into(),
            source: Some(ParseErrorSource::Nested(Box::new(cause))),
        }
    }

    /// All descriptions in the chain, leading up to this one.
    fn chain_description(&self) -> Vec<String> {
        let mut descriptions = vec![self.description.clone()];

        if let Some(source) = &self.source {
            match source {
                ParseErrorSource::FileLocation(line_number, line) => {
                    descriptions.push(format!("caused at line {line_number}: \"{line}\""));
                }
                ParseErrorSource::NonLinear(error) => {
                    descriptions.push(error.to_string());
                }
                ParseErrorSource::Nested(error) => {
                    descriptions.append(&mut error.chain_description());
                }
            }
        }

        descriptions
    }
}

impl From<NonLinearExpression> for ParseError {
    fn from(error: NonLinearExpression) -> Self {
        Self {
            description: "the expression is not linear".to_string(),
            source: Some(ParseErrorSource::NonLinear(error)),
        }
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "parse error: {}", self.chain_description().join(", "))
    }
}

impl Error for ParseError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match &self.source {
            Some(ParseErrorSource::Nested(error)) => Some(error.as_ref()),
            Some(ParseErrorSource::NonLinear(error)) => Some(error),
            _ => None,
        }
    }
}

/// A `FileLocation` references a line in the file by the line number of the file as originally
/// read from the disk. It contains a reference to the line itself.
pub(super) type FileLocation<'a> = (u64, &'a str);

/// An `InconsistencyError` is created when the problem is inconsistently represented in the file.
///
/// This error is not returned when the problem is infeasible or unbounded. It is meant only for
/// descriptions of problems, and should not be used after the importing process.
#[derive(Debug)]
pub struct InconsistencyError {
    description: String,
}

impl InconsistencyError {
    /// Wrap a text in an `InconsistencyError`.
    ///
    /// # Arguments
    ///
    /// * `description`: A human-readable text meant for the end user.
    pub fn new(description: impl Into<String>) -> Self {
        Self { description: description.into() }
    }
}

impl fmt::Display for InconsistencyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "inconsistent problem: {}", self.description)
    }
}

impl Error for InconsistencyError {}
