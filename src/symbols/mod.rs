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

//! Symbol table
//!
//! Named, mutable numeric slots shared between compiled programs. Symbols
//! are created on first install and live as long as the table; there is no
//! removal. Programs refer to symbols by [`SymbolId`], an index into the
//! table's arena, so a compiled program stays valid while new symbols are
//! added.

mod table;

pub use table::{Symbol, SymbolId, SymbolTable, DEFAULT_BUCKETS};
