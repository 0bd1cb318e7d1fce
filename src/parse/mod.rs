pub mod ast;
pub mod combinators;
pub mod cst;
pub mod grammar;
pub mod visitor;

use thiserror::Error;

pub use combinators::{BoxedParser, ParseResult, Parsed, Parser};
pub use grammar::{parse_expr, parse_program};

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ParseError {
    #[error("Unexpected end of input")]
    UnexpectedEof,

    #[error("Expected literal: {0}")]
    ExpectedLiteral(String),

    #[error("{0}")]
    Message(String),

    #[error("Invalid pattern '{pattern}': {reason}")]
    InvalidPattern { pattern: String, reason: String },

    #[error("Invalid integer literal '{0}'")]
    InvalidInteger(String),

    #[error("Invalid float literal '{0}'")]
    InvalidFloat(String),

    #[error("At least one parser must be provided")]
    NoParsers,

    #[error("Expression nests deeper than {limit} levels")]
    TooDeep { limit: usize },

    #[error("Unexpected input at {line}:{column}: '{found}'")]
    TrailingInput {
        line: usize,
        column: usize,
        found: String,
    },

    #[error("Invalid statement at {line}:{column} ('{found}...'): {cause}")]
    InvalidStatement {
        line: usize,
        column: usize,
        found: String,
        cause: Box<ParseError>,
    },
}

impl ParseError {
    pub fn message(msg: impl Into<String>) -> Self {
        Self::Message(msg.into())
    }

    /// Line and column, for errors that know where they happened.
    pub fn location(&self) -> Option<(usize, usize)> {
        match self {
            Self::TrailingInput { line, column, .. } | Self::InvalidStatement { line, column, .. } => {
                Some((*line, *column))
            }
            _ => None,
        }
    }
}
