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

//! # rpncalc - Embeddable infix expression engine
//!
//! rpncalc compiles infix numeric expressions into compact postfix
//! programs, folding constant sub-expressions while it parses, and runs
//! them on a fixed-capacity stack machine against a table of named
//! variables. A separate row-filter language matches already-split text
//! fields with string equality and a small regex engine.
//!
//! ## Quick Start
//!
//! ```rust
//! use rpncalc::Engine;
//!
//! let mut engine = Engine::new();
//! engine.assign("x = 2; y = x * 3").unwrap();
//!
//! engine.compile("y > 5 ? sqrt(y + 10) : 0").unwrap();
//! assert_eq!(engine.execute().unwrap(), 4.0);
//!
//! assert!(rpncalc::match_fields(&["abc", "123"], 2, r#"$1 == "abc" && $2 ~ "^[0-9]+$""#));
//! ```
//!
//! ## Modules
//!
//! - [`api`] - [`Engine`] facade and [`EngineConfig`]
//! - [`core`] - [`Error`] and [`Result`]
//! - [`executor`] - Compiler, program buffer, VM and assignment driver
//! - [`symbols`] - Hash-chained variable table
//! - [`functions`] - Built-in math functions and constants
//! - [`filter`] - Row-filter matcher and regex engine
//! - [`parser`] - Scanner and the shared precedence climber
//! - [`common`] - Hashing helpers

pub mod api;
pub mod common;
pub mod core;
pub mod executor;
pub mod filter;
pub mod functions;
pub mod parser;
pub mod symbols;

pub use api::{Engine, EngineConfig};
pub use core::{Error, ErrorKind, Result};
pub use executor::{
    run_assignments, Assignment, CompileOptions, CompileSummary, Evaluation, ExprCompiler, ExprVM,
    Op, Program,
};
pub use filter::{match_fields, regex_match, Pattern, RowFilter};
pub use functions::{lookup_function, FunctionDef, FUNCTIONS};
pub use symbols::{Symbol, SymbolId, SymbolTable};
