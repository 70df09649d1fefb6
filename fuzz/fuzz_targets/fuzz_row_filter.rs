#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use rpncalc::{regex_match, RowFilter};

#[derive(Debug, Arbitrary)]
struct Input {
    expression: String,
    fields: Vec<String>,
    pattern: String,
    text: String,
}

fuzz_target!(|input: Input| {
    let mut filter = RowFilter::new(input.expression).with_literal_capacity(64);
    let matched = filter.matches(&input.fields);
    if !filter.is_valid() {
        assert!(!matched);
    }

    let _ = regex_match(&input.pattern, &input.text);
});
