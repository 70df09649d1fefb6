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

//! Error types for rpncalc
//!
//! Every failure of a compile, execute, assign or filter call is reported
//! through [`Error`]. Runtime numeric edge cases (division by zero, log of a
//! negative number, NaN comparisons) have defined results and never show up
//! here.

use thiserror::Error;

/// Result type alias for rpncalc operations
pub type Result<T> = std::result::Result<T, Error>;

/// Broad classification of an [`Error`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Malformed input: the expression is wrong
    Syntax,
    /// A fixed capacity was exceeded: the expression is too complex
    Capacity,
    /// A new symbol could not be allocated; not retryable
    Allocation,
    /// The engine was asked to do something its current state forbids
    State,
    /// Invalid configuration parameters
    Config,
}

/// Main error type
///
/// Positions are byte offsets into the source text.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    // =========================================================================
    // Syntax errors
    // =========================================================================
    /// Identifier is neither a function, a constant nor a known variable
    #[error("unknown identifier '{name}' at position {position}")]
    UnknownIdentifier { name: String, position: usize },

    /// Character that cannot start or continue an expression
    #[error("unexpected character '{found}' at position {position}")]
    UnexpectedCharacter { found: char, position: usize },

    /// Input ended where an operand was required
    #[error("unexpected end of input at position {position}")]
    UnexpectedEnd { position: usize },

    /// Opening parenthesis without its closing partner
    #[error("unterminated group opened at position {position}")]
    UnterminatedGroup { position: usize },

    /// Function called with the wrong number of arguments
    #[error("function '{function}' expects {expected} argument(s), found {found}")]
    ArgumentCount {
        function: &'static str,
        expected: usize,
        found: usize,
    },

    /// Function name not followed by an argument list
    #[error("function '{function}' requires an argument list at position {position}")]
    MissingArguments {
        function: &'static str,
        position: usize,
    },

    /// Input remains after a complete top-level expression
    #[error("unexpected trailing input at position {position}")]
    TrailingInput { position: usize },

    /// Numeric literal that could not be parsed
    #[error("invalid number '{literal}' at position {position}")]
    InvalidNumber { literal: String, position: usize },

    /// Assignment target is not an identifier
    #[error("expected identifier at position {position}")]
    ExpectedIdentifier { position: usize },

    /// Assignment target not followed by '='
    #[error("expected '=' at position {position}")]
    ExpectedAssignment { position: usize },

    /// Row-filter field reference outside 1..=count
    #[error("field ${index} out of range, row has {count} field(s)")]
    FieldOutOfRange { index: usize, count: usize },

    /// String literal without its closing quote
    #[error("unterminated string literal starting at position {position}")]
    UnterminatedString { position: usize },

    /// Assignment target names a built-in function or constant
    #[error("'{name}' is a reserved name at position {position}")]
    ReservedName { name: String, position: usize },

    /// Any other row-filter grammar violation
    #[error("invalid filter expression: {message} at position {position}")]
    Filter { message: String, position: usize },

    // =========================================================================
    // Capacity errors
    // =========================================================================
    /// Bytecode would not fit in the program buffer
    #[error("expression too complex: program exceeds {capacity} units")]
    ProgramTooLarge { capacity: usize },

    /// Operand stack would grow past its capacity
    #[error("expression too complex: operand stack exceeds {capacity} entries")]
    StackOverflow { capacity: usize },

    /// Row-filter string literal longer than the literal buffer
    #[error("string literal exceeds {capacity} bytes")]
    LiteralTooLong { capacity: usize },

    /// Parentheses or unary operators nested past the parser limit
    #[error("expression too complex: nesting exceeds {limit} levels")]
    NestingTooDeep { limit: usize },

    // =========================================================================
    // State errors
    // =========================================================================
    /// Execution finished with a stack depth other than one
    #[error("malformed program: {depth} value(s) left on the stack")]
    StackImbalance { depth: usize },

    /// Execute called without a program from a successful compile
    #[error("no successfully compiled program to execute")]
    NoProgram,

    // =========================================================================
    // Allocation errors
    // =========================================================================
    /// Symbol storage could not grow
    #[error("cannot allocate storage for symbol '{name}'")]
    SymbolAllocation { name: String },

    // =========================================================================
    // Configuration errors
    // =========================================================================
    /// Unknown key or unparsable value in configuration parameters
    #[error("invalid configuration: {message}")]
    InvalidConfig { message: String },
}

impl Error {
    /// Create a new Filter error
    pub fn filter(message: impl Into<String>, position: usize) -> Self {
        Error::Filter {
            message: message.into(),
            position,
        }
    }

    /// Create a new InvalidConfig error
    pub fn invalid_config(message: impl Into<String>) -> Self {
        Error::InvalidConfig {
            message: message.into(),
        }
    }

    /// Classify this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::ProgramTooLarge { .. }
            | Error::StackOverflow { .. }
            | Error::LiteralTooLong { .. }
            | Error::NestingTooDeep { .. } => ErrorKind::Capacity,
            Error::StackImbalance { .. } | Error::NoProgram => ErrorKind::State,
            Error::SymbolAllocation { .. } => ErrorKind::Allocation,
            Error::InvalidConfig { .. } => ErrorKind::Config,
            _ => ErrorKind::Syntax,
        }
    }

    /// Check if the expression itself is malformed
    pub fn is_syntax(&self) -> bool {
        self.kind() == ErrorKind::Syntax
    }

    /// Check if this is an "expression too complex" error
    pub fn is_capacity(&self) -> bool {
        self.kind() == ErrorKind::Capacity
    }

    /// Check if symbol allocation failed
    pub fn is_allocation(&self) -> bool {
        self.kind() == ErrorKind::Allocation
    }

    /// Byte offset in the source the error refers to, when it has one
    pub fn position(&self) -> Option<usize> {
        match self {
            Error::UnknownIdentifier { position, .. }
            | Error::UnexpectedCharacter { position, .. }
            | Error::UnexpectedEnd { position }
            | Error::UnterminatedGroup { position }
            | Error::MissingArguments { position, .. }
            | Error::TrailingInput { position }
            | Error::InvalidNumber { position, .. }
            | Error::ExpectedIdentifier { position }
            | Error::ExpectedAssignment { position }
            | Error::UnterminatedString { position }
            | Error::ReservedName { position, .. }
            | Error::Filter { position, .. } => Some(*position),
            _ => None,
        }
    }
}
