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

// Compiled Expression Program
//
// A Program is the append-only postfix instruction sequence produced by one
// compile pass. Its encoded width is bounded: every `emit` checks the
// capacity before appending, which is what turns an oversized expression
// into a capacity error instead of unbounded growth.

use std::fmt::Write;

use super::ops::Op;
use crate::core::{Error, Result};
use crate::symbols::{SymbolId, SymbolTable};

/// Default program capacity in encoded units
pub const DEFAULT_PROGRAM_CAPACITY: usize = 1000;

/// Compiled expression program
#[derive(Clone)]
pub struct Program {
    /// The operation sequence
    ops: Vec<Op>,

    /// Sum of the encoded widths of `ops`
    width: usize,

    /// Maximum encoded width
    capacity: usize,
}

impl Program {
    /// Create an empty program with the given capacity in encoded units
    pub fn new(capacity: usize) -> Self {
        Self {
            ops: Vec::with_capacity(32),
            width: 0,
            capacity,
        }
    }

    /// Create a program from raw operations without a capacity bound.
    /// Used for hand-built programs in tests and tools.
    pub fn from_ops(ops: Vec<Op>) -> Self {
        let width = ops.iter().map(Op::width).sum();
        Self {
            ops,
            width,
            capacity: usize::MAX,
        }
    }

    /// Create a program that pushes a single constant
    pub fn constant(value: f64) -> Self {
        Self::from_ops(vec![Op::Const(value)])
    }

    /// Append an operation, failing if it would exceed the capacity
    #[inline]
    pub fn emit(&mut self, op: Op) -> Result<()> {
        let width = op.width();
        if self.width + width > self.capacity {
            return Err(Error::ProgramTooLarge {
                capacity: self.capacity,
            });
        }
        self.width += width;
        self.ops.push(op);
        Ok(())
    }

    /// Remove every operation at or after `position`
    pub fn truncate(&mut self, position: usize) {
        if position < self.ops.len() {
            let removed: usize = self.ops[position..].iter().map(Op::width).sum();
            self.width -= removed;
            self.ops.truncate(position);
        }
    }

    /// Encoded width the program would have after truncating at `position`
    /// and appending `op`
    pub fn width_after_replace(&self, position: usize, op: &Op) -> usize {
        let kept: usize = self.ops[..position.min(self.ops.len())]
            .iter()
            .map(Op::width)
            .sum();
        kept + op.width()
    }

    /// Reset to empty, keeping the capacity
    pub fn clear(&mut self) {
        self.ops.clear();
        self.width = 0;
    }

    /// Get the operations
    #[inline]
    pub fn ops(&self) -> &[Op] {
        &self.ops
    }

    /// Get current position (number of operations)
    #[inline]
    pub fn position(&self) -> usize {
        self.ops.len()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.ops.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }

    /// Current encoded width
    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// The value of a program that is a single inlined constant
    pub fn as_constant(&self) -> Option<f64> {
        match self.ops.as_slice() {
            [Op::Const(v)] => Some(*v),
            _ => None,
        }
    }

    /// Check if any instruction reads a symbol
    pub fn uses_variables(&self) -> bool {
        self.ops.iter().any(Op::is_variable)
    }

    /// Number of distinct symbols referenced
    pub fn variable_count(&self) -> usize {
        let mut ids: Vec<SymbolId> = self
            .ops
            .iter()
            .filter_map(|op| match op {
                Op::Var(id) => Some(*id),
                _ => None,
            })
            .collect();
        ids.sort_unstable();
        ids.dedup();
        ids.len()
    }

    /// Maximum stack depth reached while executing this program
    pub fn max_stack_depth(&self) -> usize {
        let mut depth: i32 = 0;
        let mut max_depth: i32 = 0;
        for op in &self.ops {
            depth += op.stack_effect();
            max_depth = max_depth.max(depth);
        }
        max_depth.max(0) as usize
    }

    /// Disassemble the program for debugging.
    /// Variable names are resolved when a symbol table is supplied.
    pub fn disassemble(&self, symbols: Option<&SymbolTable>) -> String {
        let mut result = String::new();
        for (i, op) in self.ops.iter().enumerate() {
            let _ = match op {
                Op::Const(v) => writeln!(result, "{:04}: {} {}", i, op.mnemonic(), v),
                Op::Var(id) => match symbols {
                    Some(table) if id.index() < table.len() => {
                        writeln!(result, "{:04}: {} {}", i, op.mnemonic(), table.name(*id))
                    }
                    _ => writeln!(result, "{:04}: {} #{}", i, op.mnemonic(), id.index()),
                },
                _ => writeln!(result, "{:04}: {}", i, op.mnemonic()),
            };
        }
        result
    }
}

impl Default for Program {
    fn default() -> Self {
        Self::new(DEFAULT_PROGRAM_CAPACITY)
    }
}

impl std::fmt::Debug for Program {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Program")
            .field("ops", &self.ops)
            .field("width", &self.width)
            .field("capacity", &self.capacity)
            .finish()
    }
}
