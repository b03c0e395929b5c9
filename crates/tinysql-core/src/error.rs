//! Error taxonomy (spec §7). Every fallible engine entry point returns
//! [`Error`]; the host matches on it to differentiate failure kinds, or just
//! prints it.

use thiserror::Error as ThisError;

use crate::token::Token;
use crate::value::TypeId;

#[derive(Debug, ThisError)]
pub enum Error {
    #[error(transparent)]
    Parse(#[from] ParseError),
    #[error(transparent)]
    Resolve(#[from] ResolveError),
    #[error(transparent)]
    Semantic(#[from] SemanticError),
    #[error(transparent)]
    Type(#[from] TypeError),
    #[error(transparent)]
    Function(#[from] FunctionError),
    #[error("{context}: {source}")]
    Source {
        context: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

impl Error {
    /// Wraps an error coming out of a host-supplied [`crate::table::Table`]
    /// row iterator with context about which stage was pulling from it.
    pub fn source(context: impl Into<String>, source: impl std::error::Error + Send + Sync + 'static) -> Self {
        Error::Source {
            context: context.into(),
            source: Box::new(source),
        }
    }
}

#[derive(Debug, ThisError)]
pub enum ParseError {
    #[error("unexpected trailing string: {rest}")]
    UnexpectedTrailing { rest: String },
    #[error("'{ch}' expected")]
    ExpectedChar { ch: char },
    #[error("{expected} expected, got {got}")]
    Expected { expected: String, got: Token },
    #[error("identifier expected, got {got}")]
    ExpectedIdentifier { got: Token },
    #[error("expecting a number after LIMIT, got {got}")]
    ExpectedLimitNumber { got: Token },
    #[error("unexpected token: {got}")]
    UnexpectedToken { got: Token },
    #[error("invalid integer literal: {text}")]
    InvalidInteger { text: String },
}

#[derive(Debug, ThisError)]
pub enum ResolveError {
    #[error("couldn't find a table that matches '{name}'")]
    UnknownTable { name: String },
    #[error("ambiguous table reference '{name}': matches {matches:?}")]
    AmbiguousTable { name: String, matches: Vec<String> },
    #[error("couldn't find a column that matches {table}.{column}")]
    UnknownColumn { table: String, column: String },
    #[error("ambiguous column reference {table}.{column}: matches {matches:?}")]
    AmbiguousColumn {
        table: String,
        column: String,
        matches: Vec<(String, String)>,
    },
}

#[derive(Debug, ThisError)]
pub enum SemanticError {
    #[error("can't use field expressions with aggregations without GROUP BY")]
    MixedScalarAndAggregate,
    #[error("invalid use of star selector")]
    StarOutsideProjection,
    #[error("expected a boolean expression in {context}, got {got}")]
    ExpectedBool { context: &'static str, got: TypeId },
    #[error("couldn't find {table}.{column} in a row")]
    ColumnNotInRow { table: String, column: String },
}

#[derive(Debug, ThisError)]
pub enum TypeError {
    #[error("can't compare values of different types: {left} and {right}")]
    MismatchedTypes { left: TypeId, right: TypeId },
    #[error("don't know how to compare values of type {ty}")]
    Uncomparable { ty: TypeId },
    #[error("unsupported cast from {from} to {to}")]
    UnsupportedCast { from: TypeId, to: TypeId },
    #[error("NULL encountered where a concrete {context} value is required")]
    UnexpectedNull { context: &'static str },
}

#[derive(Debug, ThisError)]
pub enum FunctionError {
    #[error("unknown function {name}")]
    UnknownFunction { name: String },
    #[error("unknown aggregate {name}")]
    UnknownAggregate { name: String },
    #[error("the {name} function expects {expected} argument(s), got {got}")]
    Arity {
        name: &'static str,
        expected: &'static str,
        got: usize,
    },
    #[error("the {name} function's start/length arguments are 1-based, not 0-based")]
    ZeroIndex { name: &'static str },
}
