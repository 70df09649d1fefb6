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

//! Row Filter Tests
//!
//! Field predicates, boolean structure and the regex engine, checked
//! against the `regex` crate for the syntax both understand

use proptest::prelude::*;
use regex::Regex;
use rpncalc::{match_fields, regex_match, Engine, EngineConfig, RowFilter};

// ============================================================================
// Matching
// ============================================================================

#[test]
fn test_literal_and_regex_predicates() {
    let row = ["abc", "123"];
    assert!(match_fields(&row, 2, r#"$1=="abc" && $2~"^[0-9]+$""#));
    assert!(!match_fields(&row, 2, r#"$1!="abc""#));
}

#[test]
fn test_csv_rows() {
    let lines = [
        "GET,/index.html,200",
        "POST,/login,302",
        "GET,/missing,404",
        "GET,/api/v1,500",
    ];
    let mut filter = RowFilter::new(r#"$1 == "GET" & !($3 ~ "^2") & $3 !~ "^5""#);
    let matched: Vec<&str> = lines
        .iter()
        .filter(|line| filter.matches(&line.split(',').collect::<Vec<_>>()))
        .copied()
        .collect();
    assert_eq!(matched, vec!["GET,/missing,404"]);
    assert!(filter.is_valid());
}

#[test]
fn test_rows_shorter_than_expression() {
    let mut filter = RowFilter::new(r#"$3 == "x""#);
    assert!(!filter.matches(&["a", "b"]));
    assert!(!filter.is_valid());
    assert!(filter.matches(&["a", "b", "x"]));
    assert!(filter.is_valid());
}

#[test]
fn test_engine_literal_capacity() {
    let engine = Engine::with_config(EngineConfig::default().with_literal_capacity(4));
    assert!(engine.row_filter(r#"$1 == "abcd""#).matches(&["abcd"]));
    assert!(!engine.row_filter(r#"$1 == "abcde""#).matches(&["abcde"]));
}

#[test]
fn test_regex_match_free_function() {
    assert!(regex_match("^a.c$", "abc"));
    assert!(regex_match("b+", "abbbc"));
    assert!(!regex_match("^b", "abc"));
}

// ============================================================================
// Differential check against the regex crate
// ============================================================================

fn atom() -> impl Strategy<Value = &'static str> {
    prop_oneof![
        Just("a"),
        Just("b"),
        Just("c"),
        Just("."),
        Just("[ab]"),
        Just("[^a]"),
        Just("[a-c]"),
    ]
}

fn piece() -> impl Strategy<Value = String> {
    (atom(), prop_oneof![Just(""), Just("*"), Just("+")])
        .prop_map(|(atom, repeat)| format!("{}{}", atom, repeat))
}

fn pattern() -> impl Strategy<Value = String> {
    (
        any::<bool>(),
        prop::collection::vec(piece(), 0..5),
        any::<bool>(),
    )
        .prop_map(|(start, pieces, end)| {
            format!(
                "{}{}{}",
                if start { "^" } else { "" },
                pieces.concat(),
                if end { "$" } else { "" }
            )
        })
}

proptest! {
    #[test]
    fn prop_regex_agrees_with_regex_crate(pattern in pattern(), text in "[abcd ]{0,8}") {
        let oracle = Regex::new(&pattern).unwrap();
        prop_assert_eq!(
            regex_match(&pattern, &text),
            oracle.is_match(&text),
            "pattern {:?} on {:?}",
            pattern,
            text
        );
    }

    #[test]
    fn prop_equality_is_exact(field in "[a-z\"]{0,6}", literal in "[a-z\"]{0,6}") {
        let quoted = literal.replace('"', "\"\"");
        let expr = format!("$1 == \"{}\"", quoted);
        prop_assert_eq!(match_fields(&[field.as_str()], 1, &expr), field == literal);
    }
}
