// Copyright 2025 rpncalc Contributors
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Source scanner
//!
//! A byte cursor over an ASCII-oriented expression grammar. Both the
//! numeric compiler and the row-filter matcher read their input through a
//! [`Scanner`]; it is `Copy`, so a caller can hand a positioned scanner to
//! a sub-parser and take it back afterwards.

use crate::core::{Error, Result};

/// Cursor into a source string
#[derive(Debug, Clone, Copy)]
pub struct Scanner<'a> {
    src: &'a str,
    pos: usize,
}

impl<'a> Scanner<'a> {
    pub fn new(src: &'a str) -> Self {
        Self { src, pos: 0 }
    }

    /// Current byte offset
    #[inline]
    pub fn position(&self) -> usize {
        self.pos
    }

    #[inline]
    pub fn source(&self) -> &'a str {
        self.src
    }

    /// Unconsumed input
    #[inline]
    pub fn rest(&self) -> &'a str {
        let src = self.src;
        &src[self.pos..]
    }

    pub fn skip_whitespace(&mut self) {
        let src = self.src;
        let bytes = src.as_bytes();
        while self.pos < bytes.len() && bytes[self.pos].is_ascii_whitespace() {
            self.pos += 1;
        }
    }

    /// True when only whitespace remains
    pub fn at_end(&mut self) -> bool {
        self.skip_whitespace();
        self.pos >= self.src.len()
    }

    /// Next character after whitespace, without consuming it
    pub fn peek(&mut self) -> Option<char> {
        self.skip_whitespace();
        self.rest().chars().next()
    }

    /// Next raw byte at the cursor, whitespace included
    #[inline]
    pub fn peek_byte(&self) -> Option<u8> {
        self.src.as_bytes().get(self.pos).copied()
    }

    /// Advance past exactly `len` bytes
    #[inline]
    pub fn advance(&mut self, len: usize) {
        self.pos = (self.pos + len).min(self.src.len());
    }

    /// Advance past one (possibly multi-byte) character
    pub fn bump(&mut self) -> Option<char> {
        let c = self.rest().chars().next()?;
        self.pos += c.len_utf8();
        Some(c)
    }

    /// Consume `expected` if it is the next non-blank character
    pub fn eat(&mut self, expected: char) -> bool {
        if self.peek() == Some(expected) {
            self.pos += expected.len_utf8();
            true
        } else {
            false
        }
    }

    /// Consume `expected` or fail with an error pointing at what was found
    pub fn expect(&mut self, expected: char) -> Result<()> {
        if self.eat(expected) {
            return Ok(());
        }
        Err(self.unexpected())
    }

    /// Error describing the character at the cursor
    pub fn unexpected(&mut self) -> Error {
        let position = {
            self.skip_whitespace();
            self.pos
        };
        match self.rest().chars().next() {
            Some(found) => Error::UnexpectedCharacter { found, position },
            None => Error::UnexpectedEnd { position },
        }
    }

    /// Longest operator from `vocabulary` at the cursor, not consumed
    pub fn peek_operator(&mut self, vocabulary: &[&'static str]) -> Option<&'static str> {
        self.skip_whitespace();
        let rest = self.rest();
        vocabulary
            .iter()
            .copied()
            .filter(|op| rest.starts_with(op))
            .max_by_key(|op| op.len())
    }

    /// Consume the operator at the cursor if it is one of `candidates`.
    ///
    /// The token is first resolved against the full `vocabulary` by longest
    /// match, so `&&` is never mistaken for `&`, nor `<=` for `<`.
    pub fn match_operator<Op: Copy>(
        &mut self,
        vocabulary: &[&'static str],
        candidates: &[(&'static str, Op)],
    ) -> Option<Op> {
        let token = self.peek_operator(vocabulary)?;
        let (_, op) = candidates.iter().find(|(text, _)| *text == token)?;
        self.pos += token.len();
        Some(*op)
    }

    /// Scan `[A-Za-z_][A-Za-z0-9_]*`
    pub fn scan_identifier(&mut self) -> Option<&'a str> {
        self.skip_whitespace();
        let src = self.src;
        let bytes = src.as_bytes();
        let start = self.pos;
        match bytes.get(start) {
            Some(b) if b.is_ascii_alphabetic() || *b == b'_' => {}
            _ => return None,
        }
        let mut end = start + 1;
        while end < bytes.len() && (bytes[end].is_ascii_alphanumeric() || bytes[end] == b'_') {
            end += 1;
        }
        self.pos = end;
        Some(&src[start..end])
    }

    /// Scan an unsigned decimal or `0x` hexadecimal literal.
    ///
    /// Returns `Ok(None)` when no number starts at the cursor.
    pub fn scan_number(&mut self) -> Result<Option<f64>> {
        self.skip_whitespace();
        let src = self.src;
        let bytes = src.as_bytes();
        let start = self.pos;
        let at = |i: usize| bytes.get(i).copied().unwrap_or(0);

        let starts_number =
            at(start).is_ascii_digit() || (at(start) == b'.' && at(start + 1).is_ascii_digit());
        if !starts_number {
            return Ok(None);
        }

        // Hexadecimal
        if at(start) == b'0' && (at(start + 1) == b'x' || at(start + 1) == b'X') {
            let digits_start = start + 2;
            let mut end = digits_start;
            while at(end).is_ascii_hexdigit() {
                end += 1;
            }
            let digits = &src[digits_start..end];
            if digits.is_empty() {
                return Err(Error::InvalidNumber {
                    literal: src[start..end].to_string(),
                    position: start,
                });
            }
            // Past 128 bits the value is rounded like a long decimal literal
            let value = match u128::from_str_radix(digits, 16) {
                Ok(value) => value as f64,
                Err(_) => digits.chars().fold(0.0, |acc, c| {
                    acc * 16.0 + f64::from(c.to_digit(16).unwrap_or(0))
                }),
            };
            self.pos = end;
            return Ok(Some(value));
        }

        // Decimal: digits [. digits] [(e|E) [+-] digits]
        let mut end = start;
        while at(end).is_ascii_digit() {
            end += 1;
        }
        if at(end) == b'.' {
            end += 1;
            while at(end).is_ascii_digit() {
                end += 1;
            }
        }
        if at(end) == b'e' || at(end) == b'E' {
            let mut exp = end + 1;
            if at(exp) == b'+' || at(exp) == b'-' {
                exp += 1;
            }
            if at(exp).is_ascii_digit() {
                while at(exp).is_ascii_digit() {
                    exp += 1;
                }
                end = exp;
            }
        }

        let literal = &src[start..end];
        let value = literal.parse::<f64>().map_err(|_| Error::InvalidNumber {
            literal: literal.to_string(),
            position: start,
        })?;
        self.pos = end;
        Ok(Some(value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, Copy, PartialEq)]
    enum T {
        Lt,
        Le,
        Shl,
        BitAnd,
        And,
    }

    const VOCAB: &[&str] = &["<", "<=", "<<", "&", "&&"];

    #[test]
    fn test_identifier() {
        let mut s = Scanner::new("  foo_1+bar");
        assert_eq!(s.scan_identifier(), Some("foo_1"));
        assert_eq!(s.position(), 7);
        assert_eq!(s.scan_identifier(), None);
        s.advance(1);
        assert_eq!(s.scan_identifier(), Some("bar"));
        assert!(s.at_end());
    }

    #[test]
    fn test_identifier_cannot_start_with_digit() {
        let mut s = Scanner::new("1abc");
        assert_eq!(s.scan_identifier(), None);
        assert_eq!(s.position(), 0);
    }

    #[test]
    fn test_decimal_numbers() {
        for (text, expected, consumed) in [
            ("42", 42.0, 2),
            ("3.25", 3.25, 4),
            (".5", 0.5, 2),
            ("7.", 7.0, 2),
            ("1e3", 1000.0, 3),
            ("2.5E-1", 0.25, 6),
            ("6e", 6.0, 1),
            ("6e+", 6.0, 1),
        ] {
            let mut s = Scanner::new(text);
            assert_eq!(s.scan_number().unwrap(), Some(expected), "{}", text);
            assert_eq!(s.position(), consumed, "{}", text);
        }
    }

    #[test]
    fn test_hex_numbers() {
        let mut s = Scanner::new("0xff");
        assert_eq!(s.scan_number().unwrap(), Some(255.0));
        let mut s = Scanner::new("0X1A+1");
        assert_eq!(s.scan_number().unwrap(), Some(26.0));
        assert_eq!(s.rest(), "+1");
    }

    #[test]
    fn test_long_hex_numbers() {
        let mut s = Scanner::new("0x1ffffffffffffffff");
        assert_eq!(s.scan_number().unwrap(), Some(36893488147419103231.0));
        assert!(s.at_end());

        let long = format!("0x1{}", "0".repeat(40));
        let mut s = Scanner::new(&long);
        assert_eq!(s.scan_number().unwrap(), Some(2f64.powi(160)));
    }

    #[test]
    fn test_hex_without_digits() {
        let mut s = Scanner::new("0x");
        let err = s.scan_number().unwrap_err();
        assert!(matches!(err, Error::InvalidNumber { position: 0, .. }));
    }

    #[test]
    fn test_not_a_number() {
        let mut s = Scanner::new("x");
        assert_eq!(s.scan_number().unwrap(), None);
        let mut s = Scanner::new(".");
        assert_eq!(s.scan_number().unwrap(), None);
    }

    #[test]
    fn test_longest_match_operator() {
        let level = [("<", T::Lt), ("<=", T::Le)];
        let mut s = Scanner::new("<= 1");
        assert_eq!(s.match_operator(VOCAB, &level), Some(T::Le));
        assert_eq!(s.position(), 2);

        // "<<" belongs to another level: nothing consumed
        let mut s = Scanner::new("<<1");
        assert_eq!(s.match_operator(VOCAB, &level), None);
        assert_eq!(s.position(), 0);
        assert_eq!(s.match_operator(VOCAB, &[("<<", T::Shl)]), Some(T::Shl));
    }

    #[test]
    fn test_two_char_before_prefix() {
        let bit = [("&", T::BitAnd)];
        let mut s = Scanner::new("&&");
        assert_eq!(s.match_operator(VOCAB, &bit), None);
        assert_eq!(s.match_operator(VOCAB, &[("&&", T::And)]), Some(T::And));
    }

    #[test]
    fn test_eat_and_expect() {
        let mut s = Scanner::new("  ( )");
        assert!(s.eat('('));
        assert!(!s.eat('('));
        assert!(s.expect(')').is_ok());
        assert_eq!(s.expect(')').unwrap_err(), Error::UnexpectedEnd { position: 5 });
    }

    #[test]
    fn test_unexpected_character() {
        let mut s = Scanner::new("  #");
        assert_eq!(
            s.unexpected(),
            Error::UnexpectedCharacter {
                found: '#',
                position: 2
            }
        );
    }
}
