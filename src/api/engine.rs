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

//! Engine facade
//!
//! Owns the symbol table, the program buffer and the VM, and keeps the
//! success flag of the last call.

use tracing::warn;

use super::config::EngineConfig;
use crate::core::{Error, Result};
use crate::executor::{run_assignments, Assignment, CompileSummary, ExprCompiler, ExprVM, Program};
use crate::filter::RowFilter;
use crate::symbols::{SymbolId, SymbolTable};

/// Expression engine
///
/// # Examples
///
/// ```
/// use rpncalc::Engine;
///
/// let mut engine = Engine::new();
/// engine.assign("x = 5").unwrap();
/// engine.compile("x + 1").unwrap();
/// assert_eq!(engine.execute().unwrap(), 6.0);
/// ```
pub struct Engine {
    config: EngineConfig,
    symbols: SymbolTable,
    program: Program,
    /// Buffer for assignment right-hand sides, so `assign` leaves the
    /// compiled program alone
    scratch: Program,
    vm: ExprVM,
    /// `program` holds the output of a successful compile
    compiled: bool,
    ok: bool,
}

impl Engine {
    pub fn new() -> Self {
        Self::with_config(EngineConfig::default())
    }

    pub fn with_config(config: EngineConfig) -> Self {
        Self {
            symbols: SymbolTable::with_buckets(config.symbol_buckets),
            program: Program::new(config.program_capacity),
            scratch: Program::new(config.program_capacity),
            vm: ExprVM::with_capacity(config.stack_capacity),
            compiled: false,
            ok: true,
            config,
        }
    }

    #[inline]
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Compile `source` into the program buffer
    pub fn compile(&mut self, source: &str) -> Result<CompileSummary> {
        let result = ExprCompiler::new(
            source,
            &mut self.symbols,
            &mut self.program,
            &mut self.vm,
        )
        .with_options(self.config.compile_options())
        .compile();

        self.compiled = result.is_ok();
        self.ok = self.compiled;
        result
    }

    /// Execute the program from the last successful compile
    pub fn execute(&mut self) -> Result<f64> {
        if !self.compiled {
            warn!("execute refused: no successfully compiled program");
            self.ok = false;
            return Err(Error::NoProgram);
        }

        let result = self.vm.execute(&self.program, &self.symbols);
        self.ok = result.is_ok();
        result
    }

    /// Execute, reporting failure only through [`Engine::is_ok`]; a failed
    /// run yields 0.0
    pub fn execute_value(&mut self) -> f64 {
        self.execute().unwrap_or(0.0)
    }

    /// Compile and execute in one call
    pub fn evaluate(&mut self, source: &str) -> Result<f64> {
        self.compile(source)?;
        self.execute()
    }

    /// Run `name = expr [; name = expr]*`
    pub fn assign(&mut self, source: &str) -> Result<Vec<Assignment>> {
        let result = run_assignments(
            source,
            &mut self.symbols,
            &mut self.scratch,
            &mut self.vm,
            self.config.compile_options(),
        );
        self.ok = result.is_ok();
        result
    }

    /// Success flag of the last compile, execute or assign
    #[inline]
    pub fn is_ok(&self) -> bool {
        self.ok
    }

    #[inline]
    pub fn lookup(&self, name: &str) -> Option<SymbolId> {
        self.symbols.lookup(name)
    }

    #[inline]
    pub fn install(&mut self, name: &str) -> Result<SymbolId> {
        self.symbols.install(name)
    }

    /// Current value of a variable
    pub fn value(&self, name: &str) -> Option<f64> {
        self.symbols.lookup(name).map(|id| self.symbols.get(id))
    }

    /// Set a variable, installing it first if needed
    pub fn set(&mut self, name: &str, value: f64) -> Result<SymbolId> {
        let id = self.symbols.install(name)?;
        self.symbols.set(id, value);
        Ok(id)
    }

    #[inline]
    pub fn symbols(&self) -> &SymbolTable {
        &self.symbols
    }

    /// The program buffer. Empty after a failed compile.
    #[inline]
    pub fn program(&self) -> &Program {
        &self.program
    }

    /// Listing of the current program with variable names resolved
    pub fn disassemble(&self) -> String {
        self.program.disassemble(Some(&self.symbols))
    }

    /// Row filter using this engine's literal capacity and nesting limit
    pub fn row_filter(&self, expression: impl Into<String>) -> RowFilter {
        RowFilter::new(expression)
            .with_literal_capacity(self.config.literal_capacity)
            .with_nesting_limit(self.config.nesting_limit)
    }
}

impl Default for Engine {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_execute_requires_successful_compile() {
        let mut engine = Engine::new();
        assert_eq!(engine.execute(), Err(Error::NoProgram));
        assert!(!engine.is_ok());

        engine.compile("1+1").unwrap();
        assert_eq!(engine.execute(), Ok(2.0));
        assert!(engine.is_ok());

        assert!(engine.compile("1+").is_err());
        assert!(!engine.is_ok());
        assert_eq!(engine.execute(), Err(Error::NoProgram));
        assert_eq!(engine.execute_value(), 0.0);
    }

    #[test]
    fn test_assign_keeps_compiled_program() {
        let mut engine = Engine::new();
        engine.set("x", 1.0).unwrap();
        engine.compile("x*2").unwrap();
        engine.assign("x=21").unwrap();
        assert_eq!(engine.execute(), Ok(42.0));
    }

    #[test]
    fn test_failed_assign_clears_flag() {
        let mut engine = Engine::new();
        assert!(engine.assign("x=").is_err());
        assert!(!engine.is_ok());
        assert!(engine.assign("x=1").is_ok());
        assert!(engine.is_ok());
        assert_eq!(engine.value("x"), Some(1.0));
    }

    #[test]
    fn test_stack_capacity_from_config() {
        let mut engine = Engine::with_config(EngineConfig::default().with_stack_capacity(2));
        engine.set("x", 1.0).unwrap();
        // three values on the stack at once
        engine.compile("x+(x+x)").unwrap();
        assert_eq!(
            engine.execute().unwrap_err(),
            Error::StackOverflow { capacity: 2 }
        );
        assert!(!engine.is_ok());
        engine.compile("x+x").unwrap();
        assert_eq!(engine.execute_value(), 2.0);
        assert!(engine.is_ok());
    }

    #[test]
    fn test_auto_install_config() {
        let mut engine = Engine::with_config(EngineConfig::default().with_auto_install(true));
        assert_eq!(engine.evaluate("fresh + 2"), Ok(2.0));
        assert_eq!(engine.value("fresh"), Some(0.0));
    }

    #[test]
    fn test_row_filter_uses_literal_capacity() {
        let engine = Engine::with_config(EngineConfig::default().with_literal_capacity(2));
        let mut filter = engine.row_filter(r#"$1=="abc""#);
        assert!(!filter.matches(&["abc"]));
        assert!(!filter.is_valid());
    }

    #[test]
    fn test_row_filter_uses_nesting_limit() {
        let engine = Engine::with_config(EngineConfig::default().with_nesting_limit(2));
        let mut filter = engine.row_filter(r#"(($1=="a"))"#);
        assert!(filter.matches(&["a"]));

        let mut filter = engine.row_filter(r#"((($1=="a")))"#);
        assert_eq!(
            filter.try_match(&["a"]),
            Err(Error::NestingTooDeep { limit: 2 })
        );
    }

    #[test]
    fn test_disassemble() {
        let mut engine = Engine::new();
        engine.set("x", 0.0).unwrap();
        engine.compile("x+2*3").unwrap();
        assert_eq!(engine.disassemble(), "0000: VAR x\n0001: CONST 6\n0002: ADD\n");
    }
}
