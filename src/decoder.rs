//! Per-line decode engine.
//!
//! Turns one raw, terminated line into a [`Record`] following a
//! [`CompiledSpec`]. Columns are walked in lock-step with the tokenizer up to
//! the highest referenced column; verbatim fields all share one copy of the
//! raw line.

use crate::column_spec::{ColumnSpec, CompiledSpec, FieldType};
use crate::error::{DecodeError, MalformedLine, ReadError};
use crate::record::{Record, Value};
use crate::tokenizer::Tokenizer;
use std::sync::Arc;
use tracing::debug;

/// Field separator.
pub const SEPARATOR: u8 = b'\t';
/// Record terminator.
pub const TERMINATOR: u8 = b'\n';

const SEPARATORS: &[u8] = &[SEPARATOR];

/// Decode one raw line, terminator included.
///
/// `line_number` is only used for error context. With
/// `allow_missing_columns`, a line that runs out of columns early leaves the
/// remaining fields as [`Value::Null`] instead of failing.
pub fn decode_line(
    spec: &CompiledSpec,
    line: &[u8],
    line_number: u64,
    allow_missing_columns: bool,
) -> Result<Record, ReadError> {
    if line.last() != Some(&TERMINATOR) {
        return Err(MalformedLine::Unterminated { line: line_number }.into());
    }

    let mut record = Record::nulls(spec.field_count());

    if !spec.verbatim_field_indices().is_empty() {
        let raw: Arc<[u8]> = Arc::from(line);
        for &idx in spec.verbatim_field_indices() {
            record.set(idx, Value::Line(Arc::clone(&raw)));
        }
    }

    // Empty for verbatim-only specs
    let mut tokens = Tokenizer::new(line, SEPARATORS, TERMINATOR);
    for (col, column) in spec.column_map().iter().enumerate() {
        let Some(token) = tokens.next_token() else {
            if allow_missing_columns {
                break;
            }
            return Err(MalformedLine::InsufficientTokens { line: line_number }.into());
        };

        if let ColumnSpec::Keep {
            field_index,
            field_type,
        } = *column
        {
            let value = convert(token, field_type).ok_or_else(|| {
                debug!(line = line_number, column = col + 1, %field_type, "decode failed");
                DecodeError {
                    field_type,
                    line: line_number,
                    column: col + 1,
                    token: String::from_utf8_lossy(token).into_owned(),
                }
            })?;
            record.set(field_index, value);
        }
    }

    Ok(record)
}

/// Convert a token to its declared type.
pub fn convert(token: &[u8], field_type: FieldType) -> Option<Value> {
    match field_type {
        FieldType::String => Some(Value::Str(token.to_vec())),
        FieldType::UnsignedInt => parse_unsigned(token).map(Value::UInt),
        FieldType::SignedInt => parse_text::<i64>(token).map(Value::Int),
        FieldType::Float => parse_text::<f64>(token).map(Value::Float),
    }
}

fn parse_text<T: std::str::FromStr>(token: &[u8]) -> Option<T> {
    std::str::from_utf8(token).ok()?.parse().ok()
}

/// Base-10 unsigned parse. A minus sign is only accepted on zero.
fn parse_unsigned(token: &[u8]) -> Option<u64> {
    match token.strip_prefix(b"-") {
        Some(digits) if !digits.is_empty() && digits.iter().all(|&b| b == b'0') => Some(0),
        Some(_) => None,
        None => parse_text::<u64>(token),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::column_spec::compile;

    fn decode(spec: &str, line: &[u8], allow_missing: bool) -> Result<Record, ReadError> {
        decode_line(&compile(spec).unwrap(), line, 1, allow_missing)
    }

    #[test]
    fn test_reorders_columns() {
        let r = decode("1s,0u", b"42\thello\n", false).unwrap();
        assert_eq!(r.len(), 2);
        assert_eq!(r[0], Value::Str(b"hello".to_vec()));
        assert_eq!(r[1], Value::UInt(42));
    }

    #[test]
    fn test_verbatim_keeps_terminator() {
        let r = decode("a,0s", b"x\ty\n", false).unwrap();
        assert_eq!(r[0].as_bytes(), Some(&b"x\ty\n"[..]));
        assert_eq!(r[1].as_str(), Some("x"));
    }

    #[test]
    fn test_verbatim_fields_share_allocation() {
        let r = decode("a,a", b"row\n", false).unwrap();
        match (&r[0], &r[1]) {
            (Value::Line(a), Value::Line(b)) => assert!(Arc::ptr_eq(a, b)),
            _ => panic!("Expected two Line values"),
        }
    }

    #[test]
    fn test_verbatim_only_ignores_columns() {
        let r = decode("a", b"\n", false).unwrap();
        assert_eq!(r[0].as_bytes(), Some(&b"\n"[..]));
    }

    #[test]
    fn test_all_types() {
        let r = decode("0s,1u,2i,3f", b"abc\t7\t-12\t2.5e3\n", false).unwrap();
        assert_eq!(
            r.values(),
            &[
                Value::Str(b"abc".to_vec()),
                Value::UInt(7),
                Value::Int(-12),
                Value::Float(2500.0),
            ]
        );
    }

    #[test]
    fn test_discarded_columns_skipped() {
        let r = decode("3i", b"junk\tmore\t\t9\n", false).unwrap();
        assert_eq!(r.values(), &[Value::Int(9)]);
    }

    #[test]
    fn test_extra_columns_ignored() {
        let r = decode("0u", b"1\t2\t3\n", false).unwrap();
        assert_eq!(r.values(), &[Value::UInt(1)]);
    }

    #[test]
    fn test_negative_unsigned_rejected() {
        let err = decode("0u", b"-5\n", false).unwrap_err();
        match err {
            ReadError::Decode(d) => {
                assert_eq!(d.field_type, FieldType::UnsignedInt);
                assert_eq!(d.line, 1);
                assert_eq!(d.column, 1);
                assert_eq!(d.token, "-5");
            }
            other => panic!("Expected Decode, got {other:?}"),
        }
    }

    #[test]
    fn test_negative_zero_unsigned() {
        let r = decode("0u", b"-0\n", false).unwrap();
        assert_eq!(r[0], Value::UInt(0));
        assert!(decode("0u", b"-\n", false).is_err());
    }

    #[test]
    fn test_integer_failures() {
        for bad in [&b"\n"[..], b"12x\n", b" 1\n", b"1.0\n", b"+\n"] {
            assert!(matches!(
                decode("0i", bad, false),
                Err(ReadError::Decode(_))
            ));
            assert!(matches!(
                decode("0u", bad, false),
                Err(ReadError::Decode(_))
            ));
        }
        assert_eq!(decode("0i", b"+8\n", false).unwrap()[0], Value::Int(8));
        assert!(decode("0u", b"18446744073709551616\n", false).is_err());
    }

    #[test]
    fn test_float_failures() {
        assert!(decode("0f", b"1.5.2\n", false).is_err());
        assert!(decode("0f", b"\n", false).is_err());
        assert_eq!(decode("0f", b"-0.25\n", false).unwrap()[0], Value::Float(-0.25));
    }

    #[test]
    fn test_decode_error_column_is_one_based() {
        let err = decode("0s,2f", b"a\tb\tnope\n", false).unwrap_err();
        match err {
            ReadError::Decode(d) => {
                assert_eq!(d.column, 3);
                assert_eq!(d.field_type, FieldType::Float);
            }
            other => panic!("Expected Decode, got {other:?}"),
        }
    }

    #[test]
    fn test_missing_column_strict() {
        let err = decode("2s", b"a\tb\n", false).unwrap_err();
        assert!(matches!(
            err,
            ReadError::Malformed(MalformedLine::InsufficientTokens { line: 1 })
        ));
    }

    #[test]
    fn test_missing_column_tolerant() {
        let r = decode("2s", b"a\tb\n", true).unwrap();
        assert_eq!(r.values(), &[Value::Null]);

        let r = decode("0s,a,3u", b"only\n", true).unwrap();
        assert_eq!(r[0].as_str(), Some("only"));
        assert_eq!(r[1].as_bytes(), Some(&b"only\n"[..]));
        assert!(r[2].is_null());
    }

    #[test]
    fn test_unterminated() {
        for bad in [&b""[..], b"a\tb"] {
            assert!(matches!(
                decode("0s", bad, true),
                Err(ReadError::Malformed(MalformedLine::Unterminated { line: 1 }))
            ));
        }
    }

    #[test]
    fn test_duplicate_column_orphans_earlier_field() {
        let r = decode("2s,2i", b"a\tb\t5\n", false).unwrap();
        assert!(r[0].is_null());
        assert_eq!(r[1], Value::Int(5));
    }

    #[test]
    fn test_string_bytes_kept_raw() {
        let r = decode("0s", b"\xff\xfe\n", false).unwrap();
        assert_eq!(r[0].as_bytes(), Some(&b"\xff\xfe"[..]));
    }
}
