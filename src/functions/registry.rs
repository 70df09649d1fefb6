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

//! Built-in function table
//!
//! Names are kept sorted so lookups can binary search. Names with no
//! arguments (`pi`, `e`, `nan`) are named constants and are written without
//! parentheses.

use crate::executor::expression::ops::Op;

/// A built-in function or named constant
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FunctionDef {
    pub name: &'static str,
    pub op: Op,
}

impl FunctionDef {
    /// Number of arguments the call takes
    #[inline]
    pub fn arity(&self) -> usize {
        self.op.arity()
    }

    /// Named constant, used without an argument list
    #[inline]
    pub fn is_constant(&self) -> bool {
        self.arity() == 0
    }
}

const fn def(name: &'static str, op: Op) -> FunctionDef {
    FunctionDef { name, op }
}

/// Every built-in, sorted by name
pub static FUNCTIONS: &[FunctionDef] = &[
    def("abs", Op::Abs),
    def("acos", Op::Acos),
    def("asin", Op::Asin),
    def("atan", Op::Atan),
    def("atan2", Op::Atan2),
    def("ceil", Op::Ceil),
    def("cos", Op::Cos),
    def("cosh", Op::Cosh),
    def("e", Op::E),
    def("exp", Op::Exp),
    def("floor", Op::Floor),
    def("log", Op::Log),
    def("log10", Op::Log10),
    def("max", Op::Max),
    def("min", Op::Min),
    def("nan", Op::Nan),
    def("pi", Op::Pi),
    def("pow", Op::Pow),
    def("round", Op::Round),
    def("sin", Op::Sin),
    def("sinh", Op::Sinh),
    def("sqrt", Op::Sqrt),
    def("tan", Op::Tan),
    def("tanh", Op::Tanh),
];

/// Find a built-in by exact name
#[inline]
pub fn lookup_function(name: &str) -> Option<&'static FunctionDef> {
    FUNCTIONS
        .binary_search_by(|f| f.name.cmp(name))
        .ok()
        .map(|i| &FUNCTIONS[i])
}

/// Check whether a name is taken by a built-in
#[inline]
pub fn is_reserved(name: &str) -> bool {
    lookup_function(name).is_some()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_is_sorted() {
        for pair in FUNCTIONS.windows(2) {
            assert!(
                pair[0].name < pair[1].name,
                "{} must sort before {}",
                pair[0].name,
                pair[1].name
            );
        }
    }

    #[test]
    fn test_lookup() {
        assert_eq!(lookup_function("sqrt").unwrap().op, Op::Sqrt);
        assert_eq!(lookup_function("atan2").unwrap().arity(), 2);
        assert_eq!(lookup_function("abs").unwrap().arity(), 1);
        assert!(lookup_function("pi").unwrap().is_constant());
        assert!(lookup_function("sqr").is_none());
        assert!(lookup_function("SQRT").is_none());
        assert!(lookup_function("").is_none());
    }

    #[test]
    fn test_every_entry_found() {
        for f in FUNCTIONS {
            assert_eq!(lookup_function(f.name), Some(f));
        }
        assert!(is_reserved("e"));
        assert!(!is_reserved("x"));
    }
}
