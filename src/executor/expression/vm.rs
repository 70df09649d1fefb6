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

// Expression Virtual Machine
//
// The VM executes Programs against a symbol table.
// Design goals:
// - Fixed-capacity operand stack (overflow is an error, never a reallocation)
// - Linear instruction dispatch, single pass, no recursion
// - Reusable across executions (stack cleared at the start of each run)

use smallvec::SmallVec;

use super::ops::Op;
use super::program::Program;
use crate::core::{Error, Result};
use crate::symbols::SymbolTable;

/// Default operand stack capacity
pub const DEFAULT_STACK_CAPACITY: usize = 30;

/// Inline storage for the operand stack; deeper stacks spill to the heap
const STACK_INLINE_CAPACITY: usize = 32;

/// Result of `x / 0` for non-zero `x`: the largest single-precision value
pub const DIV_BY_ZERO: f64 = f32::MAX as f64;

/// Outcome of executing a program slice
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Evaluation {
    /// The single value left on the stack
    pub value: f64,
    /// Whether any variable instruction was executed
    pub uses_variables: bool,
}

impl Evaluation {
    /// True when the value does not depend on any symbol
    #[inline]
    pub fn is_constant(&self) -> bool {
        !self.uses_variables
    }
}

/// Expression Virtual Machine
///
/// Executes compiled Programs. The VM is reusable: call `execute` with
/// different programs; the stack is reset each time.
pub struct ExprVM {
    /// Evaluation stack (reused between executions)
    stack: SmallVec<[f64; STACK_INLINE_CAPACITY]>,

    /// Maximum stack depth
    capacity: usize,
}

impl ExprVM {
    /// Create a new VM with [`DEFAULT_STACK_CAPACITY`]
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_STACK_CAPACITY)
    }

    /// Create a VM with a specific stack capacity
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            stack: SmallVec::with_capacity(capacity.min(STACK_INLINE_CAPACITY)),
            capacity,
        }
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Execute a whole program and return its value
    #[inline]
    pub fn execute(&mut self, program: &Program, symbols: &SymbolTable) -> Result<f64> {
        self.run(program.ops(), symbols).map(|eval| eval.value)
    }

    /// Execute the program starting at instruction `from`.
    ///
    /// The slice must itself be a complete postfix expression; the compiler
    /// relies on this to fold a just-emitted sub-expression.
    #[inline]
    pub fn execute_from(
        &mut self,
        program: &Program,
        from: usize,
        symbols: &SymbolTable,
    ) -> Result<Evaluation> {
        let ops = program.ops();
        self.run(&ops[from.min(ops.len())..], symbols)
    }

    /// Execute a raw instruction slice
    pub fn run(&mut self, ops: &[Op], symbols: &SymbolTable) -> Result<Evaluation> {
        self.stack.clear();
        let mut uses_variables = false;

        for op in ops {
            match *op {
                // =============================================================
                // OPERANDS
                // =============================================================
                Op::Const(v) => self.push(v)?,
                Op::Var(id) => {
                    uses_variables = true;
                    self.push(symbols.get(id))?;
                }
                Op::Pi => self.push(std::f64::consts::PI)?,
                Op::E => self.push(std::f64::consts::E)?,
                Op::Nan => self.push(f64::NAN)?,

                // =============================================================
                // TERNARY
                // =============================================================
                Op::Ternary => {
                    let otherwise = self.pop()?;
                    let then = self.pop()?;
                    let cond = self.pop()?;
                    self.stack.push(if cond != 0.0 { then } else { otherwise });
                }

                // =============================================================
                // UNARY (top of stack replaced in place)
                // =============================================================
                op if op.arity() == 1 => {
                    let top = self
                        .stack
                        .last_mut()
                        .ok_or(Error::StackImbalance { depth: 0 })?;
                    *top = Self::unary_op(op, *top);
                }

                // =============================================================
                // BINARY
                // =============================================================
                op => {
                    let b = self.pop()?;
                    let a = self.pop()?;
                    self.stack.push(Self::binary_op(op, a, b));
                }
            }
        }

        if self.stack.len() != 1 {
            return Err(Error::StackImbalance {
                depth: self.stack.len(),
            });
        }

        Ok(Evaluation {
            value: self.stack[0],
            uses_variables,
        })
    }

    #[inline]
    fn push(&mut self, value: f64) -> Result<()> {
        if self.stack.len() >= self.capacity {
            return Err(Error::StackOverflow {
                capacity: self.capacity,
            });
        }
        self.stack.push(value);
        Ok(())
    }

    #[inline]
    fn pop(&mut self) -> Result<f64> {
        self.stack.pop().ok_or(Error::StackImbalance { depth: 0 })
    }

    /// Apply a one-operand instruction
    pub fn unary_op(op: Op, x: f64) -> f64 {
        match op {
            Op::Neg => -x,
            Op::Not => bool_to_f64(x == 0.0),
            Op::BitNot => (!to_u32(x)) as f64,
            Op::Abs => x.abs(),
            Op::Acos => x.acos(),
            Op::Asin => x.asin(),
            Op::Atan => x.atan(),
            Op::Ceil => x.ceil(),
            Op::Cos => x.cos(),
            Op::Cosh => x.cosh(),
            Op::Exp => x.exp(),
            Op::Floor => x.floor(),
            // Non-positive arguments give 0.0 rather than NaN / -inf
            Op::Log if x <= 0.0 => 0.0,
            Op::Log => x.ln(),
            Op::Log10 if x <= 0.0 => 0.0,
            Op::Log10 => x.log10(),
            Op::Sqrt if x <= 0.0 => 0.0,
            Op::Sqrt => x.sqrt(),
            Op::Round => x.round(),
            Op::Sin => x.sin(),
            Op::Sinh => x.sinh(),
            Op::Tan => x.tan(),
            Op::Tanh => x.tanh(),
            _ => x,
        }
    }

    /// Apply a two-operand instruction
    pub fn binary_op(op: Op, a: f64, b: f64) -> f64 {
        match op {
            Op::Add => a + b,
            Op::Sub => a - b,
            Op::Mul => a * b,
            Op::Div => div_op(a, b),
            Op::Mod => mod_op(a, b),

            Op::Shl => to_u32(a).wrapping_shl(to_u32(b)) as f64,
            Op::Shr => to_u32(a).wrapping_shr(to_u32(b)) as f64,
            Op::BitAnd => (to_u32(a) & to_u32(b)) as f64,
            Op::BitXor => (to_u32(a) ^ to_u32(b)) as f64,
            Op::BitOr => (to_u32(a) | to_u32(b)) as f64,

            Op::Lt => bool_to_f64(a < b),
            Op::Gt => bool_to_f64(a > b),
            Op::Le => bool_to_f64(a <= b),
            Op::Ge => bool_to_f64(a >= b),
            Op::Eq => bool_to_f64(nan_aware_eq(a, b)),
            Op::Ne => bool_to_f64(!nan_aware_eq(a, b)),
            Op::And => bool_to_f64(a != 0.0 && b != 0.0),
            Op::Or => bool_to_f64(a != 0.0 || b != 0.0),

            Op::Atan2 => a.atan2(b),
            Op::Max => a.max(b),
            Op::Min => a.min(b),
            Op::Pow => a.powf(b),
            _ => f64::NAN,
        }
    }
}

impl Default for ExprVM {
    fn default() -> Self {
        Self::new()
    }
}

#[inline(always)]
fn bool_to_f64(b: bool) -> f64 {
    if b {
        1.0
    } else {
        0.0
    }
}

/// Truncate toward zero and wrap into 32 bits
#[inline(always)]
fn to_u32(x: f64) -> u32 {
    (x as i64) as u32
}

/// NaN equals NaN; NaN never equals a number
#[inline]
fn nan_aware_eq(a: f64, b: f64) -> bool {
    match (a.is_nan(), b.is_nan()) {
        (true, true) => true,
        (false, false) => a == b,
        _ => false,
    }
}

/// `0 / 0` is 0 for compatibility; other divisions by zero give [`DIV_BY_ZERO`]
#[inline]
fn div_op(a: f64, b: f64) -> f64 {
    if a.is_nan() || b.is_nan() {
        f64::NAN
    } else if b == 0.0 {
        if a == 0.0 {
            0.0
        } else {
            DIV_BY_ZERO
        }
    } else {
        a / b
    }
}

#[inline]
fn mod_op(a: f64, b: f64) -> f64 {
    if b == 0.0 && !a.is_nan() {
        0.0
    } else {
        a % b
    }
}
