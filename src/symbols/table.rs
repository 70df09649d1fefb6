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

use crate::common::hash::bucket_of;
use crate::core::{Error, Result};

/// Default number of hash chains
pub const DEFAULT_BUCKETS: usize = 128;

/// Handle to a symbol's storage slot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SymbolId(u32);

impl SymbolId {
    /// Position of the symbol in its table's arena
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// A named numeric slot
#[derive(Debug, Clone)]
pub struct Symbol {
    name: Box<str>,
    value: f64,
    /// Next symbol in the same hash chain
    next: Option<SymbolId>,
}

impl Symbol {
    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    pub fn value(&self) -> f64 {
        self.value
    }
}

/// Hash-chained store of symbols with a fixed bucket count
///
/// Chains are singly linked through the arena; a newly installed symbol
/// becomes the head of its bucket's chain.
#[derive(Debug, Clone)]
pub struct SymbolTable {
    symbols: Vec<Symbol>,
    buckets: Box<[Option<SymbolId>]>,
}

impl SymbolTable {
    /// Create a table with [`DEFAULT_BUCKETS`] chains
    pub fn new() -> Self {
        Self::with_buckets(DEFAULT_BUCKETS)
    }

    /// Create a table with a fixed number of chains (at least one)
    pub fn with_buckets(buckets: usize) -> Self {
        Self {
            symbols: Vec::new(),
            buckets: vec![None; buckets.max(1)].into_boxed_slice(),
        }
    }

    /// Find an existing symbol
    pub fn lookup(&self, name: &str) -> Option<SymbolId> {
        let mut cursor = self.buckets[bucket_of(name, self.buckets.len())];
        while let Some(id) = cursor {
            let symbol = &self.symbols[id.index()];
            if &*symbol.name == name {
                return Some(id);
            }
            cursor = symbol.next;
        }
        None
    }

    /// Find a symbol, creating it with value 0.0 if absent
    pub fn install(&mut self, name: &str) -> Result<SymbolId> {
        if let Some(id) = self.lookup(name) {
            return Ok(id);
        }

        let alloc_err = || Error::SymbolAllocation {
            name: name.to_string(),
        };

        let raw = u32::try_from(self.symbols.len()).map_err(|_| alloc_err())?;
        self.symbols.try_reserve(1).map_err(|_| alloc_err())?;
        let mut owned = String::new();
        owned.try_reserve_exact(name.len()).map_err(|_| alloc_err())?;
        owned.push_str(name);

        let id = SymbolId(raw);
        let bucket = bucket_of(name, self.buckets.len());
        self.symbols.push(Symbol {
            name: owned.into_boxed_str(),
            value: 0.0,
            next: self.buckets[bucket],
        });
        self.buckets[bucket] = Some(id);
        Ok(id)
    }

    /// Current value of a symbol
    #[inline]
    pub fn get(&self, id: SymbolId) -> f64 {
        self.symbols[id.index()].value
    }

    /// Overwrite the value of a symbol
    #[inline]
    pub fn set(&mut self, id: SymbolId, value: f64) {
        self.symbols[id.index()].value = value;
    }

    #[inline]
    pub fn symbol(&self, id: SymbolId) -> &Symbol {
        &self.symbols[id.index()]
    }

    #[inline]
    pub fn name(&self, id: SymbolId) -> &str {
        &self.symbols[id.index()].name
    }

    /// Number of installed symbols
    #[inline]
    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    /// Number of hash chains (fixed at construction)
    #[inline]
    pub fn bucket_count(&self) -> usize {
        self.buckets.len()
    }

    /// Symbols in installation order
    pub fn iter(&self) -> impl Iterator<Item = (SymbolId, &Symbol)> {
        self.symbols
            .iter()
            .enumerate()
            .map(|(i, s)| (SymbolId(i as u32), s))
    }

    /// Walk the chain holding `name`, head first
    pub fn chain_of(&self, name: &str) -> Vec<SymbolId> {
        let mut out = Vec::new();
        let mut cursor = self.buckets[bucket_of(name, self.buckets.len())];
        while let Some(id) = cursor {
            out.push(id);
            cursor = self.symbols[id.index()].next;
        }
        out
    }
}

impl Default for SymbolTable {
    fn default() -> Self {
        Self::new()
    }
}
