//! Error types for column spec compilation and line decoding.

use crate::column_spec::FieldType;
use std::io;
use thiserror::Error;

/// A column specification string could not be compiled.
///
/// Only raised when a [`Reader`](crate::Reader) or
/// [`CompiledSpec`](crate::CompiledSpec) is constructed, never while reading.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SpecError {
    #[error("empty spec")]
    Empty,
    #[error("empty token at position {position}")]
    EmptyToken { position: usize },
    #[error("invalid column index in {token:?}")]
    InvalidColumnIndex { token: String },
    #[error("invalid column type in {token:?}")]
    InvalidColumnType { token: String },
}

/// Structural violation of the line format.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MalformedLine {
    #[error("unterminated line at {line}; buffer too small or corrupt input")]
    Unterminated { line: u64 },
    #[error("insufficient token number at line {line}")]
    InsufficientTokens { line: u64 },
}

impl MalformedLine {
    pub fn line_number(&self) -> u64 {
        match self {
            MalformedLine::Unterminated { line } | MalformedLine::InsufficientTokens { line } => {
                *line
            }
        }
    }
}

/// A column's text could not be converted to its declared type.
///
/// `column` is 1-based.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid {field_type} at line {line}, column {column}: {token:?}")]
pub struct DecodeError {
    pub field_type: FieldType,
    pub line: u64,
    pub column: usize,
    pub token: String,
}

/// Failure while reading the next record.
#[derive(Debug, Error)]
pub enum ReadError {
    #[error("cannot read line")]
    Io(#[source] io::Error),
    #[error(transparent)]
    Malformed(#[from] MalformedLine),
    #[error(transparent)]
    Decode(#[from] DecodeError),
}

impl ReadError {
    /// Line the error was detected on, when it is tied to one.
    pub fn line_number(&self) -> Option<u64> {
        match self {
            ReadError::Io(_) => None,
            ReadError::Malformed(m) => Some(m.line_number()),
            ReadError::Decode(d) => Some(d.line),
        }
    }
}

impl From<io::Error> for ReadError {
    fn from(e: io::Error) -> Self {
        ReadError::Io(e)
    }
}
