//! Streaming record reader.
//!
//! A [`Reader`] owns a buffered byte stream and a compiled column spec, and
//! decodes one line per call to [`Reader::read_next`]. The line buffer is
//! reused between calls; every call returns a freshly built [`Record`].

use crate::column_spec::{CompiledSpec, compile};
use crate::decoder::{TERMINATOR, decode_line};
use crate::error::{ReadError, SpecError};
use crate::record::Record;
use serde::{Deserialize, Serialize};
use std::io::{BufRead, Read};

/// Default bound on a raw line, terminator included.
pub const DEFAULT_MAX_LINE_LENGTH: usize = 64 * 1024;

/// Smallest usable bound: room for a bare terminator.
pub const MIN_MAX_LINE_LENGTH: usize = 2;

/// Reader configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReaderOptions {
    /// Accept lines with fewer columns than the column spec references, leaving the
    /// missing fields null.
    pub allow_missing_columns: bool,
    /// Line bound in bytes. A line of this length or longer, terminator
    /// included, is reported as unterminated. Values below
    /// [`MIN_MAX_LINE_LENGTH`] are raised to it when a reader is built.
    pub max_line_length: usize,
}

impl Default for ReaderOptions {
    fn default() -> Self {
        Self {
            allow_missing_columns: false,
            max_line_length: DEFAULT_MAX_LINE_LENGTH,
        }
    }
}

impl ReaderOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn allow_missing_columns(mut self, allow: bool) -> Self {
        self.allow_missing_columns = allow;
        self
    }

    pub fn max_line_length(mut self, len: usize) -> Self {
        self.max_line_length = len.max(MIN_MAX_LINE_LENGTH);
        self
    }

    fn normalized(self) -> Self {
        let len = self.max_line_length;
        self.max_line_length(len)
    }
}

/// Decodes tab-delimited lines from `R` into typed records.
///
/// A single reader must be driven from one place at a time; independent
/// readers share nothing.
///
/// # Example
///
/// ```
/// use tab_reader::{Reader, Value};
///
/// let input = &b"42\thello\n"[..];
/// let mut reader = Reader::new(input, "1s,0u", false).unwrap();
///
/// let record = reader.read_next().unwrap().unwrap();
/// assert_eq!(record[0].as_str(), Some("hello"));
/// assert_eq!(record[1], Value::UInt(42));
/// assert_eq!(reader.line_number(), 1);
///
/// assert!(reader.read_next().unwrap().is_none());
/// ```
#[derive(Debug)]
pub struct Reader<R> {
    inner: R,
    spec: CompiledSpec,
    options: ReaderOptions,
    line_number: u64,
    line: Vec<u8>,
}

impl<R: BufRead> Reader<R> {
    /// Create a reader, compiling `spec` up front.
    pub fn new(inner: R, spec: &str, allow_missing_columns: bool) -> Result<Self, SpecError> {
        Self::with_options(
            inner,
            spec,
            ReaderOptions::default().allow_missing_columns(allow_missing_columns),
        )
    }

    pub fn with_options(inner: R, spec: &str, options: ReaderOptions) -> Result<Self, SpecError> {
        Ok(Self::from_compiled(inner, compile(spec)?, options))
    }

    /// Create a reader from an already compiled spec.
    pub fn from_compiled(inner: R, spec: CompiledSpec, options: ReaderOptions) -> Self {
        Self {
            inner,
            spec,
            options: options.normalized(),
            line_number: 0,
            line: Vec::new(),
        }
    }

    /// Read and decode the next line.
    ///
    /// Returns `Ok(None)` at end of stream. A failed line still counts
    /// towards [`line_number`](Self::line_number) and is not retried.
    pub fn read_next(&mut self) -> Result<Option<Record>, ReadError> {
        self.line.clear();
        // Leave one byte of the bound unused, so a line reaching it never ends
        // in a terminator
        let limit = (self.options.max_line_length - 1) as u64;
        let n = (&mut self.inner)
            .take(limit)
            .read_until(TERMINATOR, &mut self.line)
            .map_err(ReadError::Io)?;
        if n == 0 {
            return Ok(None);
        }

        self.line_number += 1;

        decode_line(
            &self.spec,
            &self.line,
            self.line_number,
            self.options.allow_missing_columns,
        )
        .map(Some)
    }
}

impl<R> Reader<R> {
    /// Number of raw lines consumed so far, including any that failed.
    pub fn line_number(&self) -> u64 {
        self.line_number
    }

    pub fn compiled_spec(&self) -> &CompiledSpec {
        &self.spec
    }

    pub fn options(&self) -> &ReaderOptions {
        &self.options
    }

    pub fn get_ref(&self) -> &R {
        &self.inner
    }

    pub fn into_inner(self) -> R {
        self.inner
    }
}

impl<R: BufRead> Iterator for Reader<R> {
    type Item = Result<Record, ReadError>;

    fn next(&mut self) -> Option<Self::Item> {
        self.read_next().transpose()
    }
}
