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

//! Precedence climbing shared by the numeric compiler and the row filter
//!
//! A grammar lists its binary operator levels from loosest to tightest.
//! Each level is parsed as a loop: one operand of the next tighter level,
//! then, while one of this level's operators follows, consume it, parse
//! the next operand, and reduce. All binary levels are left-associative.

use super::scanner::Scanner;
use crate::core::Result;

/// One precedence level: operator spellings and what they reduce to
pub type Level<Op> = &'static [(&'static str, Op)];

/// A grammar driven by [`climb`]
pub trait PrecedenceGrammar<'src> {
    /// What a matched operator reduces to
    type Op: Copy + 'static;

    /// Binary levels, loosest binding first
    const LEVELS: &'static [Level<Self::Op>];

    /// Every operator spelling of the grammar, used for longest-match
    const VOCABULARY: &'static [&'static str];

    fn scanner(&mut self) -> &mut Scanner<'src>;

    /// Output position before a level starts; handed back to `reduce`
    fn mark(&self) -> usize;

    /// Parse the tightest-binding term
    fn operand(&mut self) -> Result<()>;

    /// Combine the two most recent results with `op`.
    /// `start` is the mark taken before the left operand was parsed.
    fn reduce(&mut self, op: Self::Op, start: usize) -> Result<()>;
}

/// Parse one full binary expression, starting at the loosest level
#[inline]
pub fn climb<'src, G: PrecedenceGrammar<'src>>(grammar: &mut G) -> Result<()> {
    climb_level(grammar, 0)
}

fn climb_level<'src, G: PrecedenceGrammar<'src>>(grammar: &mut G, level: usize) -> Result<()> {
    let Some(operators) = G::LEVELS.get(level) else {
        return grammar.operand();
    };

    let start = grammar.mark();
    climb_level(grammar, level + 1)?;
    while let Some(op) = grammar
        .scanner()
        .match_operator(G::VOCABULARY, operators)
    {
        climb_level(grammar, level + 1)?;
        grammar.reduce(op, start)?;
    }
    Ok(())
}
