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

//! Small regular-expression engine
//!
//! Supported syntax:
//!
//! - `^` at the start anchors to the start of the text
//! - `$` at the end anchors to the end of the text
//! - `.` matches any character
//! - `[abc]`, `[a-z]`, `[^...]` match one character from a set
//! - `*` and `+` repeat the preceding atom zero-or-more / one-or-more times
//!
//! Anything else is a literal character, including `*`/`+` with nothing to
//! repeat and an unterminated `[`. Matching is greedy with backtracking;
//! unanchored patterns are tried at every start offset. Failed
//! (piece, offset) states are remembered, so worst-case work is polynomial
//! in the text length.

use smallvec::SmallVec;

/// A single-character matcher
#[derive(Debug, Clone, PartialEq)]
enum Atom {
    Any,
    Char(char),
    Class {
        negated: bool,
        ranges: SmallVec<[(char, char); 4]>,
    },
}

impl Atom {
    #[inline]
    fn matches(&self, c: char) -> bool {
        match self {
            Atom::Any => true,
            Atom::Char(expected) => *expected == c,
            Atom::Class { negated, ranges } => {
                ranges.iter().any(|&(lo, hi)| lo <= c && c <= hi) != *negated
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Repeat {
    One,
    ZeroOrMore,
    OneOrMore,
}

#[derive(Debug, Clone, PartialEq)]
struct Piece {
    atom: Atom,
    repeat: Repeat,
}

/// A compiled pattern
#[derive(Debug, Clone, PartialEq)]
pub struct Pattern {
    pieces: Vec<Piece>,
    anchored_start: bool,
    anchored_end: bool,
}

impl Pattern {
    /// Compile a pattern. Every string is a valid pattern.
    pub fn new(pattern: &str) -> Self {
        let (anchored_start, body) = match pattern.strip_prefix('^') {
            Some(rest) => (true, rest),
            None => (false, pattern),
        };
        let (anchored_end, body) = match body.strip_suffix('$') {
            Some(rest) => (true, rest),
            None => (false, body),
        };

        let chars: Vec<char> = body.chars().collect();
        let mut pieces: Vec<Piece> = Vec::with_capacity(chars.len());
        let mut i = 0;
        while i < chars.len() {
            let c = chars[i];
            i += 1;

            let repeat = match c {
                '*' => Repeat::ZeroOrMore,
                '+' => Repeat::OneOrMore,
                _ => Repeat::One,
            };
            if repeat != Repeat::One {
                if let Some(last) = pieces.last_mut().filter(|p| p.repeat == Repeat::One) {
                    last.repeat = repeat;
                    continue;
                }
            }

            let atom = match c {
                '.' => Atom::Any,
                '[' => match parse_class(&chars[i..]) {
                    Some((atom, consumed)) => {
                        i += consumed;
                        atom
                    }
                    None => Atom::Char('['),
                },
                _ => Atom::Char(c),
            };
            pieces.push(Piece {
                atom,
                repeat: Repeat::One,
            });
        }

        Self {
            pieces,
            anchored_start,
            anchored_end,
        }
    }

    /// True when the pattern matches somewhere in `text`
    pub fn is_match(&self, text: &str) -> bool {
        let mut search = Search::new(&self.pieces, text, self.anchored_end);
        if self.anchored_start {
            return search.at(0, 0);
        }

        // A leading ASCII literal can only match where its byte occurs
        if let Some(Piece {
            atom: Atom::Char(c),
            repeat: Repeat::One | Repeat::OneOrMore,
        }) = self.pieces.first()
        {
            if c.is_ascii() {
                return memchr::memchr_iter(*c as u8, text.as_bytes())
                    .any(|start| search.at(0, start));
            }
        }

        text.char_indices()
            .map(|(start, _)| start)
            .chain(std::iter::once(text.len()))
            .any(|start| search.at(0, start))
    }
}

/// Match `text` against a pattern compiled on the fly
pub fn regex_match(pattern: &str, text: &str) -> bool {
    Pattern::new(pattern).is_match(text)
}

/// Parse the body of a bracket class after its `[`.
/// Returns the atom and the number of chars consumed, including `]`.
fn parse_class(chars: &[char]) -> Option<(Atom, usize)> {
    let mut i = 0;
    let negated = chars.first() == Some(&'^');
    if negated {
        i += 1;
    }

    let mut ranges = SmallVec::new();
    let mut first = true;
    loop {
        let c = *chars.get(i)?;
        // `]` right after `[` or `[^` is a member
        if c == ']' && !first {
            return Some((Atom::Class { negated, ranges }, i + 1));
        }
        first = false;

        match (chars.get(i + 1), chars.get(i + 2)) {
            (Some('-'), Some(&hi)) if hi != ']' => {
                ranges.push((c, hi));
                i += 3;
            }
            _ => {
                ranges.push((c, c));
                i += 1;
            }
        }
    }
}

/// Backtracking search over one text.
///
/// The outcome of matching the pieces from `piece` onwards at byte `offset`
/// depends on nothing else, so failed states are recorded in a bitset and
/// never explored twice. Patterns without repeats skip the bitset.
struct Search<'p, 't> {
    pieces: &'p [Piece],
    text: &'t str,
    anchored_end: bool,
    failed: SmallVec<[u64; 8]>,
}

impl<'p, 't> Search<'p, 't> {
    fn new(pieces: &'p [Piece], text: &'t str, anchored_end: bool) -> Self {
        let states = if pieces.iter().any(|p| p.repeat != Repeat::One) {
            (pieces.len() + 1) * (text.len() + 1)
        } else {
            0
        };
        Self {
            pieces,
            text,
            anchored_end,
            failed: SmallVec::from_elem(0, states.div_ceil(64)),
        }
    }

    fn at(&mut self, piece: usize, offset: usize) -> bool {
        let pieces = self.pieces;
        let text = self.text;
        let Some(current) = pieces.get(piece) else {
            return !self.anchored_end || offset == text.len();
        };

        let slot = piece * (text.len() + 1) + offset;
        let memo = !self.failed.is_empty();
        if memo && self.failed[slot / 64] & (1u64 << (slot % 64)) != 0 {
            return false;
        }

        let found = match current.repeat {
            Repeat::One => match text[offset..].chars().next() {
                Some(c) if current.atom.matches(c) => self.at(piece + 1, offset + c.len_utf8()),
                _ => false,
            },
            Repeat::ZeroOrMore | Repeat::OneOrMore => {
                // Byte offsets after 0, 1, 2, ... repetitions
                let mut ends: SmallVec<[usize; 32]> = SmallVec::new();
                ends.push(offset);
                for (at, c) in text[offset..].char_indices() {
                    if !current.atom.matches(c) {
                        break;
                    }
                    ends.push(offset + at + c.len_utf8());
                }

                let min = usize::from(current.repeat == Repeat::OneOrMore);
                ends.iter()
                    .skip(min)
                    .rev()
                    .any(|&end| self.at(piece + 1, end))
            }
        };

        if !found && memo {
            self.failed[slot / 64] |= 1u64 << (slot % 64);
        }
        found
    }
}
