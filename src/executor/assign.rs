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

//! Assignment statements
//!
//! `name = expr [; name = expr]*`. Each right-hand side is compiled into
//! the shared program buffer, executed at once, and stored into its
//! target. The first failure aborts the rest; assignments already made in
//! the same call stay in effect.

use tracing::debug;

use super::expression::{CompileOptions, ExprCompiler, ExprVM, Program};
use crate::core::{Error, Result};
use crate::functions::is_reserved;
use crate::parser::Scanner;
use crate::symbols::{SymbolId, SymbolTable};

/// One executed assignment
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Assignment {
    pub symbol: SymbolId,
    pub value: f64,
}

/// Run every assignment in `source`, in order
pub fn run_assignments(
    source: &str,
    symbols: &mut SymbolTable,
    program: &mut Program,
    vm: &mut ExprVM,
    options: CompileOptions,
) -> Result<Vec<Assignment>> {
    let mut scanner = Scanner::new(source);
    let mut done = Vec::new();

    // A trailing ';' and an empty statement list are both accepted
    while !scanner.at_end() {
        let position = scanner.position();
        let name = scanner
            .scan_identifier()
            .ok_or(Error::ExpectedIdentifier { position })?;
        if is_reserved(name) {
            return Err(Error::ReservedName {
                name: name.to_string(),
                position,
            });
        }

        scanner.skip_whitespace();
        if scanner.rest().starts_with("==") || !scanner.eat('=') {
            return Err(Error::ExpectedAssignment {
                position: scanner.position(),
            });
        }

        let symbol = symbols.install(name)?;
        scanner = {
            let mut compiler = ExprCompiler::with_scanner(scanner, symbols, program, vm)
                .with_options(options);
            compiler.compile_expression()?;
            compiler.scanner()
        };

        let value = vm.execute(program, symbols)?;
        symbols.set(symbol, value);
        debug!(name, value, "assigned");
        done.push(Assignment { symbol, value });

        if !scanner.eat(';') {
            if !scanner.at_end() {
                return Err(Error::TrailingInput {
                    position: scanner.position(),
                });
            }
            break;
        }
    }

    Ok(done)
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Fixture {
        symbols: SymbolTable,
        program: Program,
        vm: ExprVM,
    }

    impl Fixture {
        fn new() -> Self {
            Self {
                symbols: SymbolTable::new(),
                program: Program::default(),
                vm: ExprVM::new(),
            }
        }

        fn assign(&mut self, src: &str) -> Result<Vec<Assignment>> {
            run_assignments(
                src,
                &mut self.symbols,
                &mut self.program,
                &mut self.vm,
                CompileOptions::default(),
            )
        }

        fn value(&self, name: &str) -> Option<f64> {
            self.symbols.lookup(name).map(|id| self.symbols.get(id))
        }
    }

    #[test]
    fn test_chained_assignments() {
        let mut f = Fixture::new();
        let done = f.assign("x=2;y=x*3;z=y+1").unwrap();
        assert_eq!(done.len(), 3);
        assert_eq!(f.value("x"), Some(2.0));
        assert_eq!(f.value("y"), Some(6.0));
        assert_eq!(f.value("z"), Some(7.0));
    }

    #[test]
    fn test_whitespace_and_trailing_separator() {
        let mut f = Fixture::new();
        f.assign("  a = 1 ;  b = a + 1 ; ").unwrap();
        assert_eq!(f.value("b"), Some(2.0));
        assert!(f.assign("").unwrap().is_empty());
    }

    #[test]
    fn test_target_is_visible_to_its_own_expression() {
        let mut f = Fixture::new();
        f.assign("n = n + 1").unwrap();
        f.assign("n = n + 1").unwrap();
        assert_eq!(f.value("n"), Some(2.0));
    }

    #[test]
    fn test_comparison_on_right_hand_side() {
        let mut f = Fixture::new();
        f.assign("t = 1 == 1").unwrap();
        assert_eq!(f.value("t"), Some(1.0));
    }

    #[test]
    fn test_failure_aborts_remaining() {
        let mut f = Fixture::new();
        let err = f.assign("x=1;y=undefined+1;z=3").unwrap_err();
        assert!(matches!(err, Error::UnknownIdentifier { ref name, .. } if name == "undefined"));
        assert_eq!(f.value("x"), Some(1.0));
        // y was installed before its expression failed
        assert_eq!(f.value("y"), Some(0.0));
        assert_eq!(f.value("z"), None);
    }

    #[test]
    fn test_malformed_statements() {
        let mut f = Fixture::new();
        assert_eq!(
            f.assign("1=2").unwrap_err(),
            Error::ExpectedIdentifier { position: 0 }
        );
        assert_eq!(
            f.assign("x 2").unwrap_err(),
            Error::ExpectedAssignment { position: 2 }
        );
        assert_eq!(
            f.assign("x==2").unwrap_err(),
            Error::ExpectedAssignment { position: 1 }
        );
        assert_eq!(
            f.assign("x=1 y=2").unwrap_err(),
            Error::TrailingInput { position: 4 }
        );
        assert_eq!(
            f.assign("pi=3").unwrap_err(),
            Error::ReservedName {
                name: "pi".to_string(),
                position: 0
            }
        );
        assert!(f.assign("x=").unwrap_err().is_syntax());
    }
}
