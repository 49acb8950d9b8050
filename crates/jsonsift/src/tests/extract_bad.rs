//! Fatal-path coverage: malformed documents, ceiling violations, and the
//! report-once contract.

use alloc::string::String;

use rstest::rstest;

use crate::{
    ExtractError, ExtractorOptions, FieldRule, Poll, Schema, StreamingExtractor,
    tests::chunk_helpers::extract_whole,
};

fn small_schema() -> Schema {
    Schema::new()
        .field("a", FieldRule::collect(100))
        .field("files", FieldRule::collect_each(100))
}

#[rstest]
#[case::not_an_object("[1,2]")]
#[case::empty_object("{}")]
#[case::unquoted_key("{a:1}")]
#[case::missing_colon(r#"{"a" 1}"#)]
#[case::array_required(r#"{"files":{"x":1}}"#)]
#[case::after_pair(r#"{"a":1 2}"#)]
#[case::after_element(r#"{"files":[1;2]}"#)]
fn structural_errors_are_fatal(#[case] payload: &str) {
    let err = extract_whole(small_schema(), ExtractorOptions::default(), payload).unwrap_err();
    assert!(
        matches!(err, ExtractError::ExpectedCharacter { .. }),
        "payload {payload:?}: {err:?}"
    );
    assert_eq!(err.status_code(), 400);
}

#[rstest]
#[case::semicolon(r#"{"a":;}"#, ';')]
#[case::bare_closer(r#"{"a":]}"#, ']')]
fn unexpected_character_at_value_start(#[case] payload: &str, #[case] found: char) {
    let err = extract_whole(small_schema(), ExtractorOptions::default(), payload).unwrap_err();
    assert_eq!(err, ExtractError::UnexpectedCharacter { found, at: 5 });
}

#[test]
fn unknown_top_level_key_is_fatal_before_any_item() {
    let mut extractor = StreamingExtractor::new(small_schema(), ExtractorOptions::default());
    extractor.feed(r#"{"unknown":1,"a":2}"#).unwrap();
    let err = extractor.poll().unwrap_err();
    assert_eq!(
        err,
        ExtractError::UnknownKey {
            key: String::from("unknown")
        }
    );
    // nothing was emitted and nothing will be
    assert_eq!(extractor.poll().unwrap(), Poll::Done);
}

#[test]
fn malformed_literal_is_a_mismatch_not_a_prefix_match() {
    let err =
        extract_whole(small_schema(), ExtractorOptions::default(), r#"{"a": truee}"#).unwrap_err();
    assert_eq!(
        err,
        ExtractError::LiteralMismatch {
            expected: "true",
            at: 6
        }
    );
}

#[test]
fn literal_with_wrong_characters_is_a_mismatch() {
    let err =
        extract_whole(small_schema(), ExtractorOptions::default(), r#"{"a": tru }"#).unwrap_err();
    assert_eq!(
        err,
        ExtractError::LiteralMismatch {
            expected: "true",
            at: 6
        }
    );
}

#[test]
fn completed_value_over_its_ceiling_is_a_size_error() {
    let schema = Schema::new().field("a", FieldRule::collect(5));
    let err = extract_whole(schema, ExtractorOptions::default(), r#"{"a":"abcdefgh"}"#).unwrap_err();
    assert_eq!(
        err,
        ExtractError::ValueTooLarge {
            key: String::from("a"),
            limit: 5
        }
    );
    assert_eq!(err.status_code(), 413);
}

#[test]
fn oversized_value_is_rejected_before_it_completes() {
    let schema = Schema::new().field("a", FieldRule::collect(10));
    let mut extractor = StreamingExtractor::new(schema, ExtractorOptions::default());
    // the string never terminates, but the held span already exceeds the
    // ceiling, so there is no point waiting for more input
    extractor.feed(r#"{"a":"0123456789abcdef"#).unwrap();
    let err = extractor.poll().unwrap_err();
    assert!(matches!(err, ExtractError::ValueTooLarge { .. }));
    assert_eq!(err.status_code(), 413);
}

#[test]
fn each_array_element_gets_its_own_ceiling() {
    let schema = Schema::new().field("files", FieldRule::collect_each(8));
    let payload = r#"{"files":["ok","0123456789"]}"#;
    let mut extractor = StreamingExtractor::new(schema, ExtractorOptions::default());
    extractor.feed(payload).unwrap();
    assert!(matches!(extractor.poll().unwrap(), Poll::Item(_)));
    let err = extractor.poll().unwrap_err();
    assert!(matches!(err, ExtractError::ValueTooLarge { .. }));
}

#[test]
fn total_byte_ceiling_is_enforced_across_chunks() {
    let options = ExtractorOptions {
        max_bytes: 10,
        ..Default::default()
    };
    let mut extractor = StreamingExtractor::new(small_schema(), options);
    extractor.feed(r#"{"a":"#).unwrap();
    let err = extractor.feed("\"0123456789\"").unwrap_err();
    assert_eq!(err, ExtractError::PayloadTooLarge { limit: 10 });
    assert_eq!(err.status_code(), 413);
}

#[test]
fn unterminated_key_over_the_ceiling_is_fatal() {
    let options = ExtractorOptions {
        max_key_length: 4,
        ..Default::default()
    };
    let mut extractor = StreamingExtractor::new(small_schema(), options);
    extractor.feed("{\"abcdefgh").unwrap();
    let err = extractor.poll().unwrap_err();
    assert_eq!(err, ExtractError::KeyTooLong { limit: 4 });
    assert_eq!(err.status_code(), 413);
}

#[test]
fn nesting_over_the_depth_ceiling_is_fatal() {
    let options = ExtractorOptions {
        max_depth: 3,
        ..Default::default()
    };
    let err = extract_whole(small_schema(), options, r#"{"a":[[[[1]]]]}"#).unwrap_err();
    assert_eq!(err, ExtractError::DepthLimitExceeded { limit: 3 });
    assert_eq!(err.status_code(), 400);
}

#[test]
fn oversized_number_is_fatal_not_pending() {
    let options = ExtractorOptions {
        max_number_length: 4,
        ..Default::default()
    };
    let err = extract_whole(small_schema(), options, r#"{"a":123456}"#).unwrap_err();
    assert!(matches!(
        err,
        ExtractError::NumberTooLong { limit: 4, .. }
    ));
}

#[test]
fn shallow_number_scan_defers_validation_to_decoding() {
    // `1..2` passes the numeric character class; full validation happens
    // when the completed span is decoded
    let err = extract_whole(small_schema(), ExtractorOptions::default(), r#"{"a":1..2}"#).unwrap_err();
    assert!(matches!(err, ExtractError::InvalidValue { .. }));
}

#[test]
fn mismatched_container_closer_is_fatal() {
    let err = extract_whole(small_schema(), ExtractorOptions::default(), r#"{"a":[1}}"#).unwrap_err();
    assert!(matches!(
        err,
        ExtractError::UnexpectedCharacter { found: '}', .. }
    ));
}

#[test]
fn input_ending_mid_document_is_fatal() {
    let mut extractor = StreamingExtractor::new(small_schema(), ExtractorOptions::default());
    extractor.feed(r#"{"a":"#).unwrap();
    let mut closed = extractor.finish();
    assert_eq!(closed.poll().unwrap_err(), ExtractError::UnexpectedEndOfInput);
    assert_eq!(closed.poll().unwrap(), Poll::Done);
}

#[test]
fn empty_input_is_fatal_on_finish() {
    let extractor = StreamingExtractor::new(small_schema(), ExtractorOptions::default());
    let mut closed = extractor.finish();
    assert_eq!(closed.poll().unwrap_err(), ExtractError::UnexpectedEndOfInput);
}

#[test]
fn engine_is_inert_after_a_fatal_error() {
    let mut extractor = StreamingExtractor::new(small_schema(), ExtractorOptions::default());
    extractor.feed(r#"{"unknown":"#).unwrap();
    assert!(extractor.poll().is_err());
    assert_eq!(extractor.poll().unwrap(), Poll::Done);
    // fed after the failure: ignored
    extractor.feed(r#"{"a":1}"#).unwrap();
    assert_eq!(extractor.poll().unwrap(), Poll::Done);
}

#[test]
fn invalid_utf8_bytes_are_fatal() {
    let mut extractor = StreamingExtractor::new(small_schema(), ExtractorOptions::default());
    extractor.feed_bytes(b"{\"a\":1").unwrap();
    let err = extractor.feed_bytes(b"\xff").unwrap_err();
    assert!(matches!(err, ExtractError::InvalidUtf8 { .. }));
    assert_eq!(err.status_code(), 400);
    assert_eq!(extractor.poll().unwrap(), Poll::Done);
}

#[rstest]
#[case(ExtractError::UnexpectedEndOfInput, 400)]
#[case(ExtractError::DepthLimitExceeded { limit: 1 }, 400)]
#[case(ExtractError::KeyTooLong { limit: 1 }, 413)]
#[case(ExtractError::PayloadTooLarge { limit: 1 }, 413)]
fn status_classification(#[case] err: ExtractError, #[case] code: u16) {
    assert_eq!(err.status_code(), code);
}
