//! # tab-reader
//!
//! Fast, strict decoding of tab-delimited records into typed tuples.
//!
//! Each input line is split on tabs and terminated by a newline. A compact
//! column spec picks which columns to keep, in which order, and with which
//! type; other columns are skipped, and `a` captures the whole raw line.
//!
//! ## Spec language
//!
//! ```text
//! spec   := token (',' token)*
//! token  := 'a' | column type
//! column := 0-based decimal index
//! type   := 's' | 'u' | 'i' | 'f'
//! ```
//!
//! ## Example
//!
//! ```
//! use tab_reader::{Reader, Value};
//!
//! let input = &b"x\ty\n"[..];
//! let mut reader = Reader::new(input, "a,0s", false).unwrap();
//!
//! let record = reader.read_next().unwrap().unwrap();
//! assert_eq!(record[0].as_str(), Some("x\ty\n"));
//! assert_eq!(record[1], Value::Str(b"x".to_vec()));
//! ```

pub mod column_spec;
pub mod decoder;
pub mod error;
pub mod reader;
pub mod record;
pub mod tokenizer;

pub use column_spec::{ColumnSpec, CompiledSpec, FieldType, MAX_COLUMN_INDEX, compile};
pub use decoder::{SEPARATOR, TERMINATOR, decode_line};
pub use error::{DecodeError, MalformedLine, ReadError, SpecError};
pub use reader::{DEFAULT_MAX_LINE_LENGTH, MIN_MAX_LINE_LENGTH, Reader, ReaderOptions};
pub use record::{Record, Value};
pub use tokenizer::Tokenizer;
