#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use rpncalc::{Engine, EngineConfig};

/// Small capacities so the fuzzer reaches the limits quickly
#[derive(Debug, Arbitrary)]
struct Input {
    program_capacity: u8,
    stack_capacity: u8,
    auto_install: bool,
    assignments: String,
    expression: String,
}

fuzz_target!(|input: Input| {
    let config = EngineConfig::default()
        .with_program_capacity(input.program_capacity as usize + 1)
        .with_stack_capacity(input.stack_capacity as usize % 40 + 1)
        .with_auto_install(input.auto_install);
    let mut engine = Engine::with_config(config);

    let _ = engine.assign(&input.assignments);

    match engine.compile(&input.expression) {
        Ok(summary) => {
            assert!(summary.width <= engine.config().program_capacity);
            assert_eq!(summary.width, engine.program().width());
            // a program that compiled has already been run once by the folder
            assert!(engine.execute().is_ok());
        }
        Err(_) => {
            assert!(!engine.is_ok());
            assert!(engine.program().is_empty());
        }
    }
});
