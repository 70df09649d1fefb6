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

//! Expression execution
//!
//! - [`expression`] - Compiler, program buffer and stack VM
//! - [`assign`] - `name = expr` statement driver

pub mod assign;
pub mod expression;

pub use assign::{run_assignments, Assignment};
pub use expression::{
    CompileOptions, CompileSummary, Evaluation, ExprCompiler, ExprVM, Op, Program,
};
