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

//! Row-filter expressions
//!
//! A boolean predicate over the fields of one already-split row:
//!
//! ```text
//! filter    := or
//! or        := and { ('|' | '||') and }
//! and       := unary { ('&' | '&&') unary }
//! unary     := '!' unary | '(' or ')' | predicate
//! predicate := '$' N ('==' | '!=' | '~' | '!~') string
//! string    := '"' { char | '""' } '"'
//! ```
//!
//! `N` is a 1-based field index. `==`/`!=` compare the whole field; `~`/`!~`
//! run the small regex engine. The expression is parsed and evaluated in
//! a single pass on every call. An empty expression matches nothing.

use rustc_hash::FxHashMap;
use tracing::trace;

use super::pattern::Pattern;
use crate::core::{Error, Result};
use crate::executor::expression::DEFAULT_NESTING_LIMIT;
use crate::parser::{climb, Level, PrecedenceGrammar, Scanner};

/// Default limit on the length of one string literal, in bytes
pub const DEFAULT_LITERAL_CAPACITY: usize = 1024;

/// Compiled patterns kept per filter before the cache is reset
const MAX_CACHED_PATTERNS: usize = 256;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Logic {
    And,
    Or,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Predicate {
    Equal,
    NotEqual,
    Matches,
    NotMatches,
}

const PREDICATES: &[(&str, Predicate)] = &[
    ("==", Predicate::Equal),
    ("!=", Predicate::NotEqual),
    ("~", Predicate::Matches),
    ("!~", Predicate::NotMatches),
];

const PREDICATE_VOCABULARY: &[&str] = &["==", "!=", "~", "!~"];

/// Reusable row filter
///
/// Keeps the expression text, a literal buffer and a cache of compiled
/// regex patterns across rows.
#[derive(Debug, Clone)]
pub struct RowFilter {
    expression: String,
    literal_capacity: usize,
    nesting_limit: usize,
    literal: String,
    patterns: FxHashMap<String, Pattern>,
    valid: bool,
}

impl RowFilter {
    pub fn new(expression: impl Into<String>) -> Self {
        Self {
            expression: expression.into(),
            literal_capacity: DEFAULT_LITERAL_CAPACITY,
            nesting_limit: DEFAULT_NESTING_LIMIT,
            literal: String::new(),
            patterns: FxHashMap::default(),
            valid: true,
        }
    }

    pub fn with_literal_capacity(mut self, capacity: usize) -> Self {
        self.literal_capacity = capacity;
        self
    }

    /// Deepest nesting of groups and `!` before `NestingTooDeep`
    pub fn with_nesting_limit(mut self, limit: usize) -> Self {
        self.nesting_limit = limit;
        self
    }

    #[inline]
    pub fn expression(&self) -> &str {
        &self.expression
    }

    /// Whether the expression parsed on the last call
    #[inline]
    pub fn is_valid(&self) -> bool {
        self.valid
    }

    /// Evaluate against one row; a malformed expression never matches
    pub fn matches<S: AsRef<str>>(&mut self, fields: &[S]) -> bool {
        match self.try_match(fields) {
            Ok(matched) => matched,
            Err(err) => {
                trace!(expression = %self.expression, error = %err, "row filter rejected");
                false
            }
        }
    }

    /// Evaluate against one row, reporting why a malformed expression failed
    pub fn try_match<S: AsRef<str>>(&mut self, fields: &[S]) -> Result<bool> {
        let result = self.evaluate(fields);
        self.valid = result.is_ok();
        result
    }

    fn evaluate<S: AsRef<str>>(&mut self, fields: &[S]) -> Result<bool> {
        let mut scanner = Scanner::new(&self.expression);
        if scanner.at_end() {
            return Ok(false);
        }

        if self.patterns.len() > MAX_CACHED_PATTERNS {
            self.patterns.clear();
        }

        let mut matcher = Matcher {
            scanner,
            fields,
            literal: &mut self.literal,
            literal_capacity: self.literal_capacity,
            patterns: &mut self.patterns,
            values: Vec::with_capacity(4),
            depth: 0,
            nesting_limit: self.nesting_limit,
        };
        climb(&mut matcher)?;
        if !matcher.scanner.at_end() {
            return Err(Error::TrailingInput {
                position: matcher.scanner.position(),
            });
        }

        Ok(matcher.values.pop().unwrap_or(false))
    }
}

/// Match `fields[..field_count]` against a filter expression.
/// Any error in the expression yields `false`.
pub fn match_fields<S: AsRef<str>>(fields: &[S], field_count: usize, expression: &str) -> bool {
    let fields = &fields[..field_count.min(fields.len())];
    RowFilter::new(expression).matches(fields)
}

/// One evaluation pass over one row
struct Matcher<'f, 'src, S> {
    scanner: Scanner<'src>,
    fields: &'f [S],
    literal: &'f mut String,
    literal_capacity: usize,
    patterns: &'f mut FxHashMap<String, Pattern>,
    values: Vec<bool>,
    depth: usize,
    nesting_limit: usize,
}

impl<'f, 'src, S: AsRef<str>> Matcher<'f, 'src, S> {
    fn enter(&mut self) -> Result<()> {
        self.depth += 1;
        if self.depth > self.nesting_limit {
            return Err(Error::NestingTooDeep {
                limit: self.nesting_limit,
            });
        }
        Ok(())
    }

    fn predicate(&mut self) -> Result<bool> {
        self.scanner.skip_whitespace();
        let position = self.scanner.position();
        if !self.scanner.eat('$') {
            return Err(self.scanner.unexpected());
        }

        let index = self.field_index(position)?;
        if index == 0 || index > self.fields.len() {
            return Err(Error::FieldOutOfRange {
                index,
                count: self.fields.len(),
            });
        }

        self.scanner.skip_whitespace();
        let op_position = self.scanner.position();
        let predicate = self
            .scanner
            .match_operator(PREDICATE_VOCABULARY, PREDICATES)
            .ok_or_else(|| Error::filter("expected '==', '!=', '~' or '!~'", op_position))?;

        self.string_literal()?;
        let field = self.fields[index - 1].as_ref();
        let literal = self.literal.as_str();

        Ok(match predicate {
            Predicate::Equal => field == literal,
            Predicate::NotEqual => field != literal,
            Predicate::Matches => cached_match(self.patterns, literal, field),
            Predicate::NotMatches => !cached_match(self.patterns, literal, field),
        })
    }

    fn field_index(&mut self, dollar: usize) -> Result<usize> {
        let rest = self.scanner.rest();
        let digits = rest.bytes().take_while(u8::is_ascii_digit).count();
        if digits == 0 {
            return Err(Error::filter("expected field number after '$'", dollar));
        }
        self.scanner.advance(digits);
        Ok(rest[..digits].parse().unwrap_or(usize::MAX))
    }

    /// Read a quoted literal into the shared buffer
    fn string_literal(&mut self) -> Result<()> {
        self.scanner.skip_whitespace();
        let open = self.scanner.position();
        if !self.scanner.eat('"') {
            return Err(Error::filter("expected string literal", open));
        }

        self.literal.clear();
        loop {
            match self.scanner.bump() {
                None => return Err(Error::UnterminatedString { position: open }),
                Some('"') => {
                    if self.scanner.peek_byte() == Some(b'"') {
                        self.scanner.advance(1);
                        self.push_literal('"')?;
                    } else {
                        return Ok(());
                    }
                }
                Some(c) => self.push_literal(c)?,
            }
        }
    }

    #[inline]
    fn push_literal(&mut self, c: char) -> Result<()> {
        if self.literal.len() + c.len_utf8() > self.literal_capacity {
            return Err(Error::LiteralTooLong {
                capacity: self.literal_capacity,
            });
        }
        self.literal.push(c);
        Ok(())
    }
}

fn cached_match(patterns: &mut FxHashMap<String, Pattern>, pattern: &str, text: &str) -> bool {
    if let Some(compiled) = patterns.get(pattern) {
        return compiled.is_match(text);
    }
    let compiled = Pattern::new(pattern);
    let matched = compiled.is_match(text);
    patterns.insert(pattern.to_string(), compiled);
    matched
}

impl<'f, 'src, S: AsRef<str>> PrecedenceGrammar<'src> for Matcher<'f, 'src, S> {
    type Op = Logic;

    const LEVELS: &'static [Level<Logic>] = &[
        &[("|", Logic::Or), ("||", Logic::Or)],
        &[("&", Logic::And), ("&&", Logic::And)],
    ];
    const VOCABULARY: &'static [&'static str] = &["|", "||", "&", "&&"];

    #[inline]
    fn scanner(&mut self) -> &mut Scanner<'src> {
        &mut self.scanner
    }

    #[inline]
    fn mark(&self) -> usize {
        self.values.len()
    }

    fn operand(&mut self) -> Result<()> {
        self.scanner.skip_whitespace();
        let open = self.scanner.position();

        if self.scanner.eat('!') {
            self.enter()?;
            self.operand()?;
            self.depth -= 1;
            if let Some(top) = self.values.last_mut() {
                *top = !*top;
            }
            return Ok(());
        }

        if self.scanner.eat('(') {
            self.enter()?;
            climb(self)?;
            self.depth -= 1;
            if !self.scanner.eat(')') {
                if self.scanner.at_end() {
                    return Err(Error::UnterminatedGroup { position: open });
                }
                return Err(self.scanner.unexpected());
            }
            return Ok(());
        }

        let matched = self.predicate()?;
        self.values.push(matched);
        Ok(())
    }

    fn reduce(&mut self, op: Logic, _start: usize) -> Result<()> {
        let (Some(b), Some(a)) = (self.values.pop(), self.values.pop()) else {
            return Err(Error::filter("missing operand", self.scanner.position()));
        };
        self.values.push(match op {
            Logic::And => a && b,
            Logic::Or => a || b,
        });
        Ok(())
    }
}
