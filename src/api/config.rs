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

//! Engine configuration
//!
//! Capacities are in encoded units for the program (tag 1, constant 9,
//! variable 9) and in entries for the operand stack.

use crate::core::{Error, Result};
use crate::executor::expression::{
    CompileOptions, DEFAULT_NESTING_LIMIT, DEFAULT_PROGRAM_CAPACITY, DEFAULT_STACK_CAPACITY,
};
use crate::filter::DEFAULT_LITERAL_CAPACITY;
use crate::symbols::DEFAULT_BUCKETS;

/// Engine configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineConfig {
    /// Program buffer size in encoded units
    pub program_capacity: usize,
    /// Operand stack depth
    pub stack_capacity: usize,
    /// Hash buckets in the symbol table, fixed for its lifetime
    pub symbol_buckets: usize,
    /// Longest row-filter string literal, in bytes
    pub literal_capacity: usize,
    /// Deepest nesting of groups, calls and unary prefixes
    pub nesting_limit: usize,
    /// Create unknown identifiers as zero-valued variables while compiling
    pub auto_install: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            program_capacity: DEFAULT_PROGRAM_CAPACITY,
            stack_capacity: DEFAULT_STACK_CAPACITY,
            symbol_buckets: DEFAULT_BUCKETS,
            literal_capacity: DEFAULT_LITERAL_CAPACITY,
            nesting_limit: DEFAULT_NESTING_LIMIT,
            auto_install: false,
        }
    }
}

impl EngineConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_program_capacity(mut self, capacity: usize) -> Self {
        self.program_capacity = capacity;
        self
    }

    pub fn with_stack_capacity(mut self, capacity: usize) -> Self {
        self.stack_capacity = capacity;
        self
    }

    pub fn with_symbol_buckets(mut self, buckets: usize) -> Self {
        self.symbol_buckets = buckets;
        self
    }

    pub fn with_literal_capacity(mut self, capacity: usize) -> Self {
        self.literal_capacity = capacity;
        self
    }

    pub fn with_nesting_limit(mut self, limit: usize) -> Self {
        self.nesting_limit = limit;
        self
    }

    pub fn with_auto_install(mut self, auto_install: bool) -> Self {
        self.auto_install = auto_install;
        self
    }

    /// Compiler switches derived from this configuration
    pub fn compile_options(&self) -> CompileOptions {
        CompileOptions {
            auto_install: self.auto_install,
            nesting_limit: self.nesting_limit,
        }
    }

    /// Parse `key=value&key=value` parameters on top of the defaults.
    ///
    /// Recognized keys:
    /// - `program_capacity`, `stack_capacity`, `symbol_buckets`,
    ///   `literal_capacity`, `nesting_limit`: positive integers
    /// - `auto_install`: `on|off|true|false|yes|no|1|0`
    pub fn from_params(params: &str) -> Result<Self> {
        let mut config = Self::default();

        for param in params.split('&').filter(|p| !p.trim().is_empty()) {
            let mut parts = param.splitn(2, '=');
            let key = parts.next().unwrap_or("").trim();
            let value = parts
                .next()
                .ok_or_else(|| Error::invalid_config(format!("missing value for '{}'", key)))?
                .trim();

            match key {
                "program_capacity" => config.program_capacity = parse_positive(key, value)?,
                "stack_capacity" => config.stack_capacity = parse_positive(key, value)?,
                "symbol_buckets" | "buckets" => {
                    config.symbol_buckets = parse_positive(key, value)?
                }
                "literal_capacity" => config.literal_capacity = parse_positive(key, value)?,
                "nesting_limit" => config.nesting_limit = parse_positive(key, value)?,
                "auto_install" => {
                    config.auto_install = match value.to_lowercase().as_str() {
                        "on" | "true" | "yes" | "1" => true,
                        "off" | "false" | "no" | "0" => false,
                        _ => {
                            return Err(Error::invalid_config(format!(
                                "invalid boolean '{}' for '{}'",
                                value, key
                            )))
                        }
                    }
                }
                _ => {
                    return Err(Error::invalid_config(format!(
                        "unknown parameter '{}'",
                        key
                    )))
                }
            }
        }

        Ok(config)
    }
}

fn parse_positive(key: &str, value: &str) -> Result<usize> {
    match value.parse::<usize>() {
        Ok(n) if n > 0 => Ok(n),
        _ => Err(Error::invalid_config(format!(
            "'{}' must be a positive integer, got '{}'",
            key, value
        ))),
    }
}
