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

// Compiled Expression Engine
//
// Infix source is compiled directly into postfix instructions and executed
// on a fixed-capacity stack machine.
//
//   ┌─────────────┐     ┌──────────────┐     ┌─────────────┐
//   │   Source    │ ──► │ ExprCompiler │ ──► │   Program   │
//   │   (text)    │     │  (+ folding) │     │ (postfix)   │
//   └─────────────┘     └──────────────┘     └─────────────┘
//                              │ ▲                  │
//                              ▼ │                  ▼
//                       ┌──────────────┐     ┌─────────────┐
//                       │    ExprVM    │ ◄── │ SymbolTable │
//                       └──────────────┘     └─────────────┘

pub mod compiler;
pub mod ops;
pub mod program;
pub mod vm;

pub use compiler::{CompileOptions, CompileSummary, ExprCompiler, DEFAULT_NESTING_LIMIT};
pub use ops::Op;
pub use program::{Program, DEFAULT_PROGRAM_CAPACITY};
pub use vm::{Evaluation, ExprVM, DEFAULT_STACK_CAPACITY, DIV_BY_ZERO};

#[cfg(test)]
mod tests;
