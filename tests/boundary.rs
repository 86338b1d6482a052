//! Boundary behaviors named in the spec: empty/whitespace-only input,
//! trailing garbage, integer width boundaries, escape coverage, and the
//! exact-vs-one-past nesting depth edge.

use strict_json::error::ErrorKind;
use strict_json::{build_value, BuilderLimits, DomCollector, Value};

fn unbounded() -> BuilderLimits {
    BuilderLimits::unbounded()
}

#[test]
fn empty_input_has_no_value_to_offer() {
    let err = build_value("", &unbounded(), &DomCollector).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Grammar);
}

#[test]
fn whitespace_only_input_has_no_value_to_offer() {
    let err = build_value("   \n\t\r  ", &unbounded(), &DomCollector).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Grammar);
}

#[test]
fn trailing_garbage_after_the_document_value_is_rejected() {
    let err = build_value("1 true", &unbounded(), &DomCollector).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Grammar);
}

#[test]
fn int32_boundary_values_round_trip() {
    let max = build_value("2147483647", &unbounded(), &DomCollector).unwrap();
    assert_eq!(max, Value::Int32(i32::MAX));

    // one past the boundary widens to Int64 rather than erroring.
    let past_max = build_value("2147483648", &unbounded(), &DomCollector).unwrap();
    assert_eq!(past_max, Value::Int64(i32::MAX as i64 + 1));

    let min = build_value("-2147483648", &unbounded(), &DomCollector).unwrap();
    assert_eq!(min, Value::Int32(i32::MIN));
}

#[test]
fn int64_boundary_values_round_trip() {
    let max = build_value("9223372036854775807", &unbounded(), &DomCollector).unwrap();
    assert_eq!(max, Value::Int64(i64::MAX));

    // one past the boundary widens to BigInt rather than erroring.
    let past_max = build_value("9223372036854775808", &unbounded(), &DomCollector).unwrap();
    match past_max {
        Value::BigInt(_) => {}
        other => panic!("expected BigInt, got {other:?}"),
    }
}

#[test]
fn every_legal_escape_decodes_to_its_literal_character() {
    let input = r#""\"\\\/\b\f\n\r\tA""#;
    let value = build_value(input, &unbounded(), &DomCollector).unwrap();
    assert_eq!(value, Value::String("\"\\/\u{0008}\u{000C}\n\r\tA".to_string()));
}

#[test]
fn nesting_depth_at_the_exact_limit_is_accepted() {
    let limits = unbounded().with_max_nesting_depth(3);
    assert!(build_value("[[[]]]", &limits, &DomCollector).is_ok());
}

#[test]
fn nesting_depth_one_past_the_limit_is_rejected() {
    let limits = unbounded().with_max_nesting_depth(3);
    let err = build_value("[[[[]]]]", &limits, &DomCollector).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Limit);
}
