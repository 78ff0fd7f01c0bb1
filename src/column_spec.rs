//! Column specification compiler.
//!
//! Spec format:
//! ```text
//! 1s,0u,a,3f
//! ```
//!
//! - Tokens are separated by `,`; each token produces one output field, in order
//! - `a` - the whole raw line, terminator included
//! - `<col><type>` - input column `col` (0-based) decoded as `type`
//!
//! Column types:
//! - `s` - string, bytes as-is
//! - `u` - unsigned integer
//! - `i` - signed integer
//! - `f` - floating point
//!
//! A column referenced twice keeps its last mapping.

use crate::error::SpecError;
use std::fmt;
use std::str::FromStr;
use tracing::debug;

/// Highest column index a spec may reference.
pub const MAX_COLUMN_INDEX: usize = u16::MAX as usize;

/// Declared type of a kept column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldType {
    /// `s`
    String,
    /// `u`
    UnsignedInt,
    /// `i`
    SignedInt,
    /// `f`
    Float,
}

impl FieldType {
    /// Map a type tag character to its field type.
    pub fn from_tag(tag: u8) -> Option<Self> {
        match tag {
            b's' => Some(FieldType::String),
            b'u' => Some(FieldType::UnsignedInt),
            b'i' => Some(FieldType::SignedInt),
            b'f' => Some(FieldType::Float),
            _ => None,
        }
    }

    pub fn tag(&self) -> char {
        match self {
            FieldType::String => 's',
            FieldType::UnsignedInt => 'u',
            FieldType::SignedInt => 'i',
            FieldType::Float => 'f',
        }
    }

    /// Human-readable name for error messages.
    pub fn name(&self) -> &'static str {
        match self {
            FieldType::String => "string",
            FieldType::UnsignedInt => "unsigned int",
            FieldType::SignedInt => "int",
            FieldType::Float => "float",
        }
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// What happens to one input column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ColumnSpec {
    /// Column is consumed but not stored.
    #[default]
    Discard,
    /// Column is decoded into output field `field_index`.
    Keep {
        field_index: usize,
        field_type: FieldType,
    },
}

/// Parsed spec token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Token {
    Verbatim,
    Column { index: usize, field_type: FieldType },
}

/// A compiled column specification. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompiledSpec {
    field_count: usize,
    max_col_idx: Option<usize>,
    column_map: Vec<ColumnSpec>,
    verbatim_field_indices: Vec<usize>,
}

impl CompiledSpec {
    /// Number of fields in every decoded record.
    pub fn field_count(&self) -> usize {
        self.field_count
    }

    /// Highest input column referenced, `None` for verbatim-only specs.
    pub fn max_col_idx(&self) -> Option<usize> {
        self.max_col_idx
    }

    /// Dense map indexed by input column, `max_col_idx + 1` entries long.
    pub fn column_map(&self) -> &[ColumnSpec] {
        &self.column_map
    }

    /// Output fields that receive the whole raw line, in spec order.
    pub fn verbatim_field_indices(&self) -> &[usize] {
        &self.verbatim_field_indices
    }
}

impl FromStr for CompiledSpec {
    type Err = SpecError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        compile(s)
    }
}

/// Compile a column spec string.
pub fn compile(spec: &str) -> Result<CompiledSpec, SpecError> {
    if spec.is_empty() {
        return Err(SpecError::Empty);
    }

    // First pass: validate every token and size the tables
    let mut field_count = 0;
    let mut max_col_idx: Option<usize> = None;
    let mut verbatim_count = 0;
    for (position, raw) in spec.split(',').enumerate() {
        match parse_token(raw, position)? {
            Token::Verbatim => verbatim_count += 1,
            Token::Column { index, .. } => {
                max_col_idx = Some(max_col_idx.map_or(index, |m| m.max(index)));
            }
        }
        field_count += 1;
    }

    // Second pass: populate in token order; later columns overwrite earlier ones
    let mut column_map = vec![ColumnSpec::Discard; max_col_idx.map_or(0, |m| m + 1)];
    let mut verbatim_field_indices = Vec::with_capacity(verbatim_count);
    for (field_index, raw) in spec.split(',').enumerate() {
        match parse_token(raw, field_index)? {
            Token::Verbatim => verbatim_field_indices.push(field_index),
            Token::Column { index, field_type } => {
                column_map[index] = ColumnSpec::Keep {
                    field_index,
                    field_type,
                };
            }
        }
    }

    debug!(
        field_count,
        max_col_idx = ?max_col_idx,
        verbatim = verbatim_field_indices.len(),
        "compiled column spec {:?}",
        spec
    );

    Ok(CompiledSpec {
        field_count,
        max_col_idx,
        column_map,
        verbatim_field_indices,
    })
}

/// Parse one spec token.
fn parse_token(token: &str, position: usize) -> Result<Token, SpecError> {
    if token.is_empty() {
        return Err(SpecError::EmptyToken { position });
    }
    if token == "a" {
        return Ok(Token::Verbatim);
    }

    let digits = token.bytes().take_while(u8::is_ascii_digit).count();
    let index = token[..digits]
        .parse::<usize>()
        .ok()
        .filter(|&i| i <= MAX_COLUMN_INDEX)
        .ok_or_else(|| SpecError::InvalidColumnIndex {
            token: token.to_string(),
        })?;

    let field_type = match &token.as_bytes()[digits..] {
        [tag] => FieldType::from_tag(*tag),
        _ => None,
    }
    .ok_or_else(|| SpecError::InvalidColumnType {
        token: token.to_string(),
    })?;

    Ok(Token::Column { index, field_type })
}
