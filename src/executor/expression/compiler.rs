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

// Expression Compiler
//
// Compiles infix source text straight into a postfix Program, no AST.
// Binary levels are driven by the shared precedence climber; the ternary,
// unary prefixes and primaries are parsed here.
//
// Constant folding is fused into emission: after each operator is appended,
// the slice that operator closes is executed on the VM. If it read no
// variable, the slice is truncated and replaced by one inlined constant.
// The slice is always a complete postfix sub-expression that has already
// been emitted, so the VM never observes a partial program.

use tracing::{debug, trace};

use super::ops::Op;
use super::program::Program;
use super::vm::ExprVM;
use crate::core::{Error, Result};
use crate::functions::{lookup_function, FunctionDef};
use crate::parser::{climb, Level, PrecedenceGrammar, Scanner};
use crate::symbols::SymbolTable;

/// Default limit on nested groups, calls, ternaries and unary prefixes
pub const DEFAULT_NESTING_LIMIT: usize = 128;

/// Binary operator levels, loosest binding first
const BINARY_LEVELS: &[Level<Op>] = &[
    &[("||", Op::Or)],
    &[("&&", Op::And)],
    &[("|", Op::BitOr)],
    &[("^", Op::BitXor)],
    &[("&", Op::BitAnd)],
    &[("==", Op::Eq), ("!=", Op::Ne)],
    &[("<", Op::Lt), (">", Op::Gt), ("<=", Op::Le), (">=", Op::Ge)],
    &[("<<", Op::Shl), (">>", Op::Shr)],
    &[("+", Op::Add), ("-", Op::Sub)],
    &[("*", Op::Mul), ("/", Op::Div), ("%", Op::Mod)],
];

const BINARY_VOCABULARY: &[&str] = &[
    "||", "&&", "|", "^", "&", "==", "!=", "<", ">", "<=", ">=", "<<", ">>", "+", "-", "*", "/",
    "%",
];

/// Compiler switches carried by the engine configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CompileOptions {
    /// Install unknown identifiers as zero-valued variables
    pub auto_install: bool,
    pub nesting_limit: usize,
}

impl Default for CompileOptions {
    fn default() -> Self {
        Self {
            auto_install: false,
            nesting_limit: DEFAULT_NESTING_LIMIT,
        }
    }
}

/// Shape of a successfully compiled program
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CompileSummary {
    /// Number of instructions
    pub ops: usize,
    /// Encoded width in units
    pub width: usize,
    /// Distinct variables referenced; zero means the program is one constant
    pub variables: usize,
}

/// Expression compiler
///
/// Borrows the engine's symbol table, program buffer and VM for the length
/// of one compile.
pub struct ExprCompiler<'e, 'src> {
    scanner: Scanner<'src>,
    symbols: &'e mut SymbolTable,
    program: &'e mut Program,
    vm: &'e mut ExprVM,
    auto_install: bool,
    nesting_limit: usize,
    depth: usize,
}

impl<'e, 'src> ExprCompiler<'e, 'src> {
    pub fn new(
        source: &'src str,
        symbols: &'e mut SymbolTable,
        program: &'e mut Program,
        vm: &'e mut ExprVM,
    ) -> Self {
        Self::with_scanner(Scanner::new(source), symbols, program, vm)
    }

    /// Start compiling at an already positioned scanner
    pub fn with_scanner(
        scanner: Scanner<'src>,
        symbols: &'e mut SymbolTable,
        program: &'e mut Program,
        vm: &'e mut ExprVM,
    ) -> Self {
        Self {
            scanner,
            symbols,
            program,
            vm,
            auto_install: false,
            nesting_limit: DEFAULT_NESTING_LIMIT,
            depth: 0,
        }
    }

    /// Install unknown identifiers as new variables instead of failing
    pub fn with_auto_install(mut self, auto_install: bool) -> Self {
        self.auto_install = auto_install;
        self
    }

    pub fn with_nesting_limit(mut self, limit: usize) -> Self {
        self.nesting_limit = limit;
        self
    }

    pub fn with_options(self, options: CompileOptions) -> Self {
        self.with_auto_install(options.auto_install)
            .with_nesting_limit(options.nesting_limit)
    }

    /// Scanner positioned after the last compiled expression
    #[inline]
    pub fn scanner(&self) -> Scanner<'src> {
        self.scanner
    }

    /// Compile the whole source. Input left after the expression is an error.
    ///
    /// On failure the program buffer is left empty.
    pub fn compile(&mut self) -> Result<CompileSummary> {
        let result = self.compile_expression().and_then(|summary| {
            if self.scanner.at_end() {
                Ok(summary)
            } else {
                Err(Error::TrailingInput {
                    position: self.scanner.position(),
                })
            }
        });

        match &result {
            Ok(summary) => debug!(
                source = self.scanner.source(),
                ops = summary.ops,
                width = summary.width,
                variables = summary.variables,
                "compiled expression"
            ),
            Err(err) => {
                self.program.clear();
                debug!(source = self.scanner.source(), error = %err, "compile failed");
            }
        }
        result
    }

    /// Compile one expression at the cursor and stop at the first token
    /// that cannot continue it.
    pub fn compile_expression(&mut self) -> Result<CompileSummary> {
        self.program.clear();
        self.depth = 0;

        if let Err(err) = self.expression().and_then(|()| self.fold(0)) {
            self.program.clear();
            return Err(err);
        }

        Ok(CompileSummary {
            ops: self.program.len(),
            width: self.program.width(),
            variables: self.program.variable_count(),
        })
    }

    // =========================================================================
    // Grammar
    // =========================================================================

    /// ternary := binary [ '?' ternary ':' ternary ]
    fn expression(&mut self) -> Result<()> {
        self.enter()?;
        let start = self.program.position();
        climb(self)?;

        if self.scanner.eat('?') {
            self.expression()?;
            self.scanner.expect(':')?;
            self.expression()?;
            self.program.emit(Op::Ternary)?;
            self.fold(start)?;
        }

        self.leave();
        Ok(())
    }

    /// unary := ('-' | '+' | '!' | '~') unary | primary
    fn unary(&mut self) -> Result<()> {
        let op = match self.scanner.peek() {
            Some('-') => Some(Op::Neg),
            Some('!') => Some(Op::Not),
            Some('~') => Some(Op::BitNot),
            Some('+') => None,
            _ => return self.primary(),
        };
        self.scanner.bump();

        self.enter()?;
        let start = self.program.position();
        self.unary()?;
        self.leave();

        match op {
            Some(op) => {
                self.program.emit(op)?;
                self.fold(start)
            }
            None => Ok(()),
        }
    }

    /// primary := number | '(' ternary ')' | constant | call | variable
    fn primary(&mut self) -> Result<()> {
        self.scanner.skip_whitespace();
        let position = self.scanner.position();

        if let Some(value) = self.scanner.scan_number()? {
            return self.program.emit(Op::Const(value));
        }

        if self.scanner.eat('(') {
            self.expression()?;
            return self.close_group(position);
        }

        if let Some(name) = self.scanner.scan_identifier() {
            return self.identifier(name, position);
        }

        Err(self.scanner.unexpected())
    }

    fn identifier(&mut self, name: &'src str, position: usize) -> Result<()> {
        if let Some(def) = lookup_function(name) {
            if def.is_constant() {
                let start = self.program.position();
                self.program.emit(def.op)?;
                return self.fold(start);
            }
            return self.call(def, position);
        }

        let id = match self.symbols.lookup(name) {
            Some(id) => id,
            None if self.auto_install => self.symbols.install(name)?,
            None => {
                return Err(Error::UnknownIdentifier {
                    name: name.to_string(),
                    position,
                })
            }
        };
        self.program.emit(Op::Var(id))
    }

    /// call := name '(' [ ternary { ',' ternary } ] ')'
    fn call(&mut self, def: &'static FunctionDef, position: usize) -> Result<()> {
        self.scanner.skip_whitespace();
        let open = self.scanner.position();
        if !self.scanner.eat('(') {
            return Err(Error::MissingArguments {
                function: def.name,
                position,
            });
        }

        let start = self.program.position();
        let mut found = 0;
        if !self.scanner.eat(')') {
            loop {
                self.expression()?;
                found += 1;
                if !self.scanner.eat(',') {
                    self.close_group(open)?;
                    break;
                }
            }
        }

        if found != def.arity() {
            return Err(Error::ArgumentCount {
                function: def.name,
                expected: def.arity(),
                found,
            });
        }

        self.program.emit(def.op)?;
        self.fold(start)
    }

    fn close_group(&mut self, open: usize) -> Result<()> {
        if self.scanner.eat(')') {
            return Ok(());
        }
        if self.scanner.at_end() {
            return Err(Error::UnterminatedGroup { position: open });
        }
        Err(self.scanner.unexpected())
    }

    fn enter(&mut self) -> Result<()> {
        self.depth += 1;
        if self.depth > self.nesting_limit {
            return Err(Error::NestingTooDeep {
                limit: self.nesting_limit,
            });
        }
        Ok(())
    }

    #[inline]
    fn leave(&mut self) {
        self.depth -= 1;
    }

    // =========================================================================
    // Folding
    // =========================================================================

    /// Replace the sub-expression starting at `start` by its value when it
    /// reads no variable, runs without error and the constant fits in the
    /// buffer. A failed trial run leaves the ops in place for `execute` to
    /// report.
    fn fold(&mut self, start: usize) -> Result<()> {
        match &self.program.ops()[start.min(self.program.len())..] {
            [] | [Op::Const(_)] | [Op::Var(_)] => return Ok(()),
            _ => {}
        }

        let eval = match self.vm.execute_from(&*self.program, start, &*self.symbols) {
            Ok(eval) => eval,
            Err(err) => {
                trace!(start, error = %err, "fold skipped");
                return Ok(());
            }
        };
        if eval.uses_variables {
            return Ok(());
        }

        let folded = Op::Const(eval.value);
        if self.program.width_after_replace(start, &folded) > self.program.capacity() {
            return Ok(());
        }

        trace!(
            start,
            removed = self.program.len() - start,
            value = eval.value,
            "folded constant"
        );
        self.program.truncate(start);
        self.program.emit(folded)
    }
}

impl<'e, 'src> PrecedenceGrammar<'src> for ExprCompiler<'e, 'src> {
    type Op = Op;

    const LEVELS: &'static [Level<Op>] = BINARY_LEVELS;
    const VOCABULARY: &'static [&'static str] = BINARY_VOCABULARY;

    #[inline]
    fn scanner(&mut self) -> &mut Scanner<'src> {
        &mut self.scanner
    }

    #[inline]
    fn mark(&self) -> usize {
        self.program.position()
    }

    fn operand(&mut self) -> Result<()> {
        self.unary()
    }

    fn reduce(&mut self, op: Op, start: usize) -> Result<()> {
        self.program.emit(op)?;
        self.fold(start)
    }
}
