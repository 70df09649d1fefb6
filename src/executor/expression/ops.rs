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

// Compiled Expression Operations
//
// The instruction set for the expression VM. Every program is postfix:
// operands are pushed, operators pop their inputs and push one result.
// Constants and variable references are carried inline by the instruction.

use crate::symbols::SymbolId;

/// Encoded width of an operator tag
pub const TAG_WIDTH: usize = 1;

/// Encoded width of an inlined constant (tag + 8-byte double)
pub const CONST_WIDTH: usize = TAG_WIDTH + 8;

/// Encoded width of a variable reference (tag + 8-byte handle)
pub const VAR_WIDTH: usize = TAG_WIDTH + 8;

/// A single VM instruction
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Op {
    // =========================================================================
    // Operands
    // =========================================================================
    /// Push an inlined literal
    Const(f64),
    /// Push the current value of a symbol
    Var(SymbolId),

    // =========================================================================
    // Binary arithmetic
    // =========================================================================
    Add,
    Sub,
    Mul,
    Div,
    Mod,

    // =========================================================================
    // Bitwise (operands truncated to u32)
    // =========================================================================
    Shl,
    Shr,
    BitAnd,
    BitXor,
    BitOr,

    // =========================================================================
    // Comparison and logic (result is 1.0 or 0.0)
    // =========================================================================
    Lt,
    Gt,
    Le,
    Ge,
    Eq,
    Ne,
    And,
    Or,

    // =========================================================================
    // Unary
    // =========================================================================
    Neg,
    Not,
    BitNot,

    // =========================================================================
    // Functions
    // =========================================================================
    Abs,
    Acos,
    Asin,
    Atan,
    Atan2,
    Ceil,
    Cos,
    Cosh,
    Exp,
    Floor,
    Log,
    Log10,
    Max,
    Min,
    Pow,
    Round,
    Sin,
    Sinh,
    Sqrt,
    Tan,
    Tanh,

    // =========================================================================
    // Named constants
    // =========================================================================
    Pi,
    E,
    Nan,

    /// cond a b -> cond != 0 ? a : b
    Ternary,
}

impl Op {
    /// Width of this instruction in encoded units
    #[inline]
    pub fn width(&self) -> usize {
        match self {
            Op::Const(_) => CONST_WIDTH,
            Op::Var(_) => VAR_WIDTH,
            _ => TAG_WIDTH,
        }
    }

    /// Number of values popped from the stack
    pub fn arity(&self) -> usize {
        match self {
            Op::Const(_) | Op::Var(_) | Op::Pi | Op::E | Op::Nan => 0,

            Op::Neg
            | Op::Not
            | Op::BitNot
            | Op::Abs
            | Op::Acos
            | Op::Asin
            | Op::Atan
            | Op::Ceil
            | Op::Cos
            | Op::Cosh
            | Op::Exp
            | Op::Floor
            | Op::Log
            | Op::Log10
            | Op::Round
            | Op::Sin
            | Op::Sinh
            | Op::Sqrt
            | Op::Tan
            | Op::Tanh => 1,

            Op::Ternary => 3,

            Op::Add
            | Op::Sub
            | Op::Mul
            | Op::Div
            | Op::Mod
            | Op::Shl
            | Op::Shr
            | Op::BitAnd
            | Op::BitXor
            | Op::BitOr
            | Op::Lt
            | Op::Gt
            | Op::Le
            | Op::Ge
            | Op::Eq
            | Op::Ne
            | Op::And
            | Op::Or
            | Op::Atan2
            | Op::Max
            | Op::Min
            | Op::Pow => 2,
        }
    }

    /// Net change in stack depth
    #[inline]
    pub fn stack_effect(&self) -> i32 {
        1 - self.arity() as i32
    }

    #[inline]
    pub fn is_variable(&self) -> bool {
        matches!(self, Op::Var(_))
    }

    /// Short name used by the disassembler
    pub fn mnemonic(&self) -> &'static str {
        match self {
            Op::Const(_) => "CONST",
            Op::Var(_) => "VAR",
            Op::Add => "ADD",
            Op::Sub => "SUB",
            Op::Mul => "MUL",
            Op::Div => "DIV",
            Op::Mod => "MOD",
            Op::Shl => "SHL",
            Op::Shr => "SHR",
            Op::BitAnd => "BAND",
            Op::BitXor => "BXOR",
            Op::BitOr => "BOR",
            Op::Lt => "LT",
            Op::Gt => "GT",
            Op::Le => "LE",
            Op::Ge => "GE",
            Op::Eq => "EQ",
            Op::Ne => "NE",
            Op::And => "AND",
            Op::Or => "OR",
            Op::Neg => "NEG",
            Op::Not => "NOT",
            Op::BitNot => "BNOT",
            Op::Abs => "ABS",
            Op::Acos => "ACOS",
            Op::Asin => "ASIN",
            Op::Atan => "ATAN",
            Op::Atan2 => "ATAN2",
            Op::Ceil => "CEIL",
            Op::Cos => "COS",
            Op::Cosh => "COSH",
            Op::Exp => "EXP",
            Op::Floor => "FLOOR",
            Op::Log => "LOG",
            Op::Log10 => "LOG10",
            Op::Max => "MAX",
            Op::Min => "MIN",
            Op::Pow => "POW",
            Op::Round => "ROUND",
            Op::Sin => "SIN",
            Op::Sinh => "SINH",
            Op::Sqrt => "SQRT",
            Op::Tan => "TAN",
            Op::Tanh => "TANH",
            Op::Pi => "PI",
            Op::E => "E",
            Op::Nan => "NAN",
            Op::Ternary => "TERNARY",
        }
    }
}
