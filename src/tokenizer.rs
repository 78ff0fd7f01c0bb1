//! Re-entrant line tokenizer.
//!
//! Splits a single line on a set of separator bytes, stopping at a
//! terminator byte. All cursor state lives in the [`Tokenizer`] value, so
//! independent lines can be tokenized concurrently.

/// Cursor over one line of input.
///
/// Tokens borrow from the line; nothing is copied.
#[derive(Debug, Clone)]
pub struct Tokenizer<'a> {
    rest: Option<&'a [u8]>,
    separators: &'a [u8],
    terminator: u8,
    terminator_found: bool,
}

impl<'a> Tokenizer<'a> {
    pub fn new(line: &'a [u8], separators: &'a [u8], terminator: u8) -> Self {
        Self {
            rest: Some(line),
            separators,
            terminator,
            terminator_found: false,
        }
    }

    /// Extract the next token, or `None` once the line is exhausted.
    ///
    /// Reaching the end of the buffer without a terminator yields the
    /// remaining bytes as a final token; callers are expected to have
    /// checked termination beforehand.
    pub fn next_token(&mut self) -> Option<&'a [u8]> {
        let s = self.rest?;
        for (i, &b) in s.iter().enumerate() {
            if b == self.terminator {
                self.rest = None;
                self.terminator_found = true;
                return Some(&s[..i]);
            }
            if self.separators.contains(&b) {
                self.rest = Some(&s[i + 1..]);
                return Some(&s[..i]);
            }
        }
        self.rest = None;
        Some(s)
    }

    /// Whether the terminator ended the last token.
    pub fn terminator_found(&self) -> bool {
        self.terminator_found
    }

    pub fn is_exhausted(&self) -> bool {
        self.rest.is_none()
    }
}

impl<'a> Iterator for Tokenizer<'a> {
    type Item = &'a [u8];

    fn next(&mut self) -> Option<Self::Item> {
        self.next_token()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_splits_on_tab() {
        let mut t = Tokenizer::new(b"a\tbb\tccc\n", b"\t", b'\n');
        assert_eq!(t.next_token(), Some(&b"a"[..]));
        assert_eq!(t.next_token(), Some(&b"bb"[..]));
        assert!(!t.is_exhausted());
        assert_eq!(t.next_token(), Some(&b"ccc"[..]));
        assert!(t.is_exhausted());
        assert!(t.terminator_found());
        assert_eq!(t.next_token(), None);
        assert_eq!(t.next_token(), None);
    }

    #[test]
    fn test_empty_fields_preserved() {
        let tokens: Vec<&[u8]> = Tokenizer::new(b"\t\tx\t\n", b"\t", b'\n').collect();
        assert_eq!(tokens, vec![&b""[..], b"", b"x", b""]);
    }

    #[test]
    fn test_terminator_only() {
        let mut t = Tokenizer::new(b"\n", b"\t", b'\n');
        assert_eq!(t.next_token(), Some(&b""[..]));
        assert!(t.terminator_found());
        assert_eq!(t.next_token(), None);
    }

    #[test]
    fn test_unterminated_returns_rest() {
        let mut t = Tokenizer::new(b"x\tyz", b"\t", b'\n');
        assert_eq!(t.next_token(), Some(&b"x"[..]));
        assert_eq!(t.next_token(), Some(&b"yz"[..]));
        assert!(!t.terminator_found());
        assert_eq!(t.next_token(), None);
    }

    #[test]
    fn test_stops_at_terminator() {
        let tokens: Vec<&[u8]> = Tokenizer::new(b"a\nb\tc", b"\t", b'\n').collect();
        assert_eq!(tokens, vec![&b"a"[..]]);
    }

    #[test]
    fn test_multiple_separators() {
        let tokens: Vec<&[u8]> = Tokenizer::new(b"a,b;c\n", b",;", b'\n').collect();
        assert_eq!(tokens, vec![&b"a"[..], b"b", b"c"]);
    }

    #[test]
    fn test_independent_cursors() {
        let line = b"1\t2\n";
        let mut a = Tokenizer::new(line, b"\t", b'\n');
        let mut b = Tokenizer::new(line, b"\t", b'\n');
        assert_eq!(a.next_token(), Some(&b"1"[..]));
        assert_eq!(b.next_token(), Some(&b"1"[..]));
        assert_eq!(a.next_token(), Some(&b"2"[..]));
        assert_eq!(b.next_token(), Some(&b"2"[..]));
    }
}
