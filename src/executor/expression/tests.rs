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

// Tests for the expression compiler and VM working together

use super::compiler::{CompileSummary, ExprCompiler};
use super::ops::Op;
use super::program::Program;
use super::vm::{ExprVM, DIV_BY_ZERO};
use crate::core::{Error, Result};
use crate::symbols::SymbolTable;

struct Harness {
    symbols: SymbolTable,
    program: Program,
    vm: ExprVM,
}

impl Harness {
    fn new() -> Self {
        Self::with_capacity(1000)
    }

    fn with_capacity(capacity: usize) -> Self {
        Self {
            symbols: SymbolTable::new(),
            program: Program::new(capacity),
            vm: ExprVM::new(),
        }
    }

    fn compile(&mut self, src: &str) -> Result<CompileSummary> {
        ExprCompiler::new(src, &mut self.symbols, &mut self.program, &mut self.vm).compile()
    }

    fn eval(&mut self, src: &str) -> f64 {
        self.compile(src).unwrap();
        self.vm.execute(&self.program, &self.symbols).unwrap()
    }

    fn var(&mut self, name: &str, value: f64) {
        let id = self.symbols.install(name).unwrap();
        self.symbols.set(id, value);
    }
}

fn eval(src: &str) -> f64 {
    Harness::new().eval(src)
}

// =============================================================================
// Precedence and grammar
// =============================================================================

#[test]
fn test_precedence() {
    assert_eq!(eval("2+3*4"), 14.0);
    assert_eq!(eval("(2+3)*4"), 20.0);
    assert_eq!(eval("10-4-3"), 3.0);
    assert_eq!(eval("2*3%4"), 2.0);
    assert_eq!(eval("1+1<<2"), 8.0);
    assert_eq!(eval("1<<2<5"), 1.0);
    assert_eq!(eval("3<4==1"), 1.0);
    assert_eq!(eval("6&3==3"), 0.0);
    assert_eq!(eval("5^1&3"), 4.0);
    assert_eq!(eval("4|1^1"), 4.0);
    assert_eq!(eval("1|0&&0"), 0.0);
    assert_eq!(eval("0&&0||1"), 1.0);
}

#[test]
fn test_two_character_operators() {
    assert_eq!(eval("3<=3"), 1.0);
    assert_eq!(eval("3>=4"), 0.0);
    assert_eq!(eval("1<<4"), 16.0);
    assert_eq!(eval("256>>4"), 16.0);
    assert_eq!(eval("1&&2"), 1.0);
    assert_eq!(eval("0||0"), 0.0);
    assert_eq!(eval("3!=3"), 0.0);
    assert_eq!(eval("6&3"), 2.0);
    assert_eq!(eval("6|3"), 7.0);
}

#[test]
fn test_unary() {
    assert_eq!(eval("-3"), -3.0);
    assert_eq!(eval("--3"), 3.0);
    assert_eq!(eval("+3"), 3.0);
    assert_eq!(eval("2--3"), 5.0);
    assert_eq!(eval("-2*3"), -6.0);
    assert_eq!(eval("!0"), 1.0);
    assert_eq!(eval("!5"), 0.0);
    assert_eq!(eval("~0"), u32::MAX as f64);
}

#[test]
fn test_ternary() {
    assert_eq!(eval("1==1?2:3"), 2.0);
    assert_eq!(eval("0?2:3"), 3.0);
    // right-associative
    assert_eq!(eval("0?1:0?2:3"), 3.0);
    assert_eq!(eval("1?0?4:5:6"), 5.0);
    assert_eq!(eval("1+1?10:20"), 10.0);
}

#[test]
fn test_literals() {
    assert_eq!(eval("0x10"), 16.0);
    assert_eq!(eval("0xff+1"), 256.0);
    assert_eq!(eval("0x1ffffffffffffffff"), 2f64.powi(65));
    assert_eq!(eval("1.5e2"), 150.0);
    assert_eq!(eval(".5"), 0.5);
    assert_eq!(eval("  7  "), 7.0);
}

#[test]
fn test_functions() {
    assert_eq!(eval("sqrt(16)"), 4.0);
    assert_eq!(eval("pow(2,10)"), 1024.0);
    assert_eq!(eval("max(3, 7)"), 7.0);
    assert_eq!(eval("min(3, 7)"), 3.0);
    assert_eq!(eval("abs(-2)"), 2.0);
    assert_eq!(eval("floor(2.7)+ceil(2.1)"), 5.0);
    assert_eq!(eval("sin(0)"), 0.0);
    assert!((eval("pi") - std::f64::consts::PI).abs() < 1e-12);
    assert!((eval("e") - std::f64::consts::E).abs() < 1e-12);
    assert!(eval("nan").is_nan());
    assert!((eval("atan2(1,1)") - std::f64::consts::FRAC_PI_4).abs() < 1e-12);
}

// =============================================================================
// Numeric rules
// =============================================================================

#[test]
fn test_nan_equality() {
    assert_eq!(eval("nan==nan"), 1.0);
    assert_eq!(eval("nan!=nan"), 0.0);
    assert_eq!(eval("nan==1"), 0.0);
    assert_eq!(eval("nan!=1"), 1.0);
}

#[test]
fn test_division_edges() {
    assert_eq!(eval("5/0"), DIV_BY_ZERO);
    assert_eq!(eval("0/0"), 0.0);
    assert!(eval("nan/1").is_nan());
    assert!(eval("1/nan").is_nan());
    assert_eq!(eval("5%0"), 0.0);
    assert_eq!(eval("log(0)"), 0.0);
    assert_eq!(eval("sqrt(-4)"), 0.0);
}

// =============================================================================
// Folding
// =============================================================================

#[test]
fn test_constant_folds_to_single_constant() {
    let mut h = Harness::new();
    let summary = h.compile("3+4*2").unwrap();
    assert_eq!(summary.variables, 0);
    assert_eq!(summary.ops, 1);
    assert_eq!(h.program.as_constant(), Some(11.0));

    h.compile("2*3+sin(0)").unwrap();
    assert_eq!(h.program.as_constant(), Some(6.0));

    h.compile("pi").unwrap();
    assert_eq!(h.program.as_constant(), Some(std::f64::consts::PI));
}

#[test]
fn test_partial_folding() {
    let mut h = Harness::new();
    h.var("x", 1.0);
    let summary = h.compile("x+2*3").unwrap();
    assert_eq!(summary.variables, 1);

    let x = h.symbols.lookup("x").unwrap();
    assert_eq!(h.program.ops(), &[Op::Var(x), Op::Const(6.0), Op::Add]);
    assert_eq!(h.vm.execute(&h.program, &h.symbols).unwrap(), 7.0);
}

#[test]
fn test_variable_subtrees_are_kept() {
    let mut h = Harness::new();
    h.var("x", 3.0);
    h.compile("sqrt(x*x)+(1+1)").unwrap();
    let x = h.symbols.lookup("x").unwrap();
    assert_eq!(
        h.program.ops(),
        &[
            Op::Var(x),
            Op::Var(x),
            Op::Mul,
            Op::Sqrt,
            Op::Const(2.0),
            Op::Add
        ]
    );
    assert_eq!(h.program.variable_count(), 1);
    assert_eq!(h.vm.execute(&h.program, &h.symbols).unwrap(), 5.0);
}

#[test]
fn test_program_sees_later_symbol_values() {
    let mut h = Harness::new();
    h.var("x", 1.0);
    h.compile("x*10").unwrap();
    assert_eq!(h.vm.execute(&h.program, &h.symbols).unwrap(), 10.0);

    let x = h.symbols.lookup("x").unwrap();
    h.symbols.set(x, 4.0);
    assert_eq!(h.vm.execute(&h.program, &h.symbols).unwrap(), 40.0);
}

#[test]
fn test_fold_skipped_when_constant_does_not_fit() {
    // A constant is 9 units; `pi` alone is 1
    let mut h = Harness::with_capacity(5);
    h.compile("pi").unwrap();
    assert_eq!(h.program.ops(), &[Op::Pi]);
    assert!((h.vm.execute(&h.program, &h.symbols).unwrap() - std::f64::consts::PI).abs() < 1e-12);
}

// =============================================================================
// Errors
// =============================================================================

#[test]
fn test_unknown_identifier() {
    let mut h = Harness::new();
    assert_eq!(
        h.compile("x+1").unwrap_err(),
        Error::UnknownIdentifier {
            name: "x".to_string(),
            position: 0
        }
    );
    assert!(h.program.is_empty());

    h.var("x", 5.0);
    assert_eq!(h.eval("x+1"), 6.0);
}

#[test]
fn test_auto_install() {
    let mut h = Harness::new();
    let summary =
        ExprCompiler::new("y+1", &mut h.symbols, &mut h.program, &mut h.vm)
            .with_auto_install(true)
            .compile()
            .unwrap();
    assert_eq!(summary.variables, 1);
    assert_eq!(h.symbols.get(h.symbols.lookup("y").unwrap()), 0.0);
}

#[test]
fn test_syntax_errors() {
    let mut h = Harness::new();
    assert_eq!(
        h.compile("(1+2").unwrap_err(),
        Error::UnterminatedGroup { position: 0 }
    );
    assert_eq!(
        h.compile("1+2)").unwrap_err(),
        Error::TrailingInput { position: 3 }
    );
    assert_eq!(h.compile("").unwrap_err(), Error::UnexpectedEnd { position: 0 });
    assert_eq!(
        h.compile("1+").unwrap_err(),
        Error::UnexpectedEnd { position: 2 }
    );
    assert_eq!(
        h.compile("1 @ 2").unwrap_err(),
        Error::TrailingInput { position: 2 }
    );
    assert_eq!(
        h.compile("1?2").unwrap_err(),
        Error::UnexpectedEnd { position: 3 }
    );
    assert!(h.compile("2 3").unwrap_err().is_syntax());
}

#[test]
fn test_call_errors() {
    let mut h = Harness::new();
    assert_eq!(
        h.compile("sqrt 4").unwrap_err(),
        Error::MissingArguments {
            function: "sqrt",
            position: 0
        }
    );
    assert_eq!(
        h.compile("pow(2)").unwrap_err(),
        Error::ArgumentCount {
            function: "pow",
            expected: 2,
            found: 1
        }
    );
    assert_eq!(
        h.compile("sin()").unwrap_err(),
        Error::ArgumentCount {
            function: "sin",
            expected: 1,
            found: 0
        }
    );
    assert_eq!(
        h.compile("max(1,2").unwrap_err(),
        Error::UnterminatedGroup { position: 3 }
    );
    assert_eq!(
        h.compile("max(1 2)").unwrap_err(),
        Error::UnexpectedCharacter {
            found: '2',
            position: 6
        }
    );
    assert!(h.compile("max(1,)").unwrap_err().is_syntax());
    assert!(h.compile("pi(1)").unwrap_err().is_syntax());
}

#[test]
fn test_recovery_after_failure() {
    let mut h = Harness::new();
    assert!(h.compile("(1+2").is_err());
    assert_eq!(h.eval("1+2"), 3.0);
}

#[test]
fn test_nesting_limit() {
    let mut h = Harness::new();
    let deep = format!("{}1{}", "(".repeat(200), ")".repeat(200));
    assert_eq!(
        h.compile(&deep).unwrap_err(),
        Error::NestingTooDeep { limit: 128 }
    );

    let shallow = format!("{}1{}", "(".repeat(100), ")".repeat(100));
    assert_eq!(h.eval(&shallow), 1.0);

    let minus = format!("{}1", "-".repeat(200));
    assert!(h.compile(&minus).unwrap_err().is_capacity());
}

// =============================================================================
// Capacity boundaries
// =============================================================================

#[test]
fn test_program_capacity_boundary() {
    // x+x+...: 9 units per variable, 1 per ADD
    let src = |n: usize| vec!["x"; n].join("+");
    let width = |n: usize| 9 * n + (n - 1);

    let mut h = Harness::with_capacity(width(5));
    h.var("x", 1.0);
    let summary = h.compile(&src(5)).unwrap();
    assert_eq!(summary.width, width(5));
    assert_eq!(h.vm.execute(&h.program, &h.symbols).unwrap(), 5.0);

    assert_eq!(
        h.compile(&src(6)).unwrap_err(),
        Error::ProgramTooLarge {
            capacity: width(5)
        }
    );
}

#[test]
fn test_stack_capacity_boundary() {
    // x+(x+(x+...)) keeps n values on the stack
    let src = |n: usize| {
        let mut s = "x".to_string();
        for _ in 1..n {
            s = format!("x+({})", s);
        }
        s
    };

    let mut h = Harness::new();
    h.var("x", 1.0);
    assert_eq!(h.eval(&src(30)), 30.0);
    // too deep for the stack: compiles, then fails when run
    h.compile(&src(31)).unwrap();
    assert_eq!(
        h.vm.execute(&h.program, &h.symbols).unwrap_err(),
        Error::StackOverflow { capacity: 30 }
    );
}

#[test]
fn test_fold_skipped_when_trial_run_fails() {
    let mut h = Harness::new();
    h.vm = ExprVM::with_capacity(1);
    // 1+2 needs two stack slots, so the fold run fails and the ops stay
    h.compile("1+2").unwrap();
    assert_eq!(
        h.program.ops(),
        &[Op::Const(1.0), Op::Const(2.0), Op::Add][..]
    );
    assert_eq!(
        h.vm.execute(&h.program, &h.symbols).unwrap_err(),
        Error::StackOverflow { capacity: 1 }
    );
}

#[test]
fn test_constant_input_is_never_deep() {
    // constants fold as they are built, so depth stays small
    let src = (0..100).fold("1".to_string(), |acc, _| format!("1+({})", acc));
    let mut h = Harness::new();
    assert_eq!(h.eval(&src), 101.0);
    assert_eq!(h.program.len(), 1);
}

#[test]
fn test_idempotent_recompile() {
    let mut h = Harness::new();
    h.var("x", 2.5);
    let first = h.compile("x*x-1").map(|_| h.vm.execute(&h.program, &h.symbols));
    let ops = h.program.ops().to_vec();
    let second = h.compile("x*x-1").map(|_| h.vm.execute(&h.program, &h.symbols));
    assert_eq!(first, second);
    assert_eq!(ops, h.program.ops());
}
