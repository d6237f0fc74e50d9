// Property-based tests for the parsing engine.
//
// These validate invariants across generated inputs: the parser never panics,
// parsing is deterministic, and a failed ordered choice never leaks consumed
// input.

use proptest::prelude::*;
use protoidl::syntax::{normalize, try_choice, Alternative, Grammar};
use protoidl::{parse, ParseOptions};

/// Fragments that look like IDL, so generated inputs get past the first token.
fn snippet() -> impl Strategy<Value = String> {
    let token = prop_oneof![
        Just("message".to_string()),
        Just("method".to_string()),
        Just("{".to_string()),
        Just("}".to_string()),
        Just("(".to_string()),
        Just(")".to_string()),
        Just("->".to_string()),
        Just(":".to_string()),
        Just(",".to_string()),
        Just(";".to_string()),
        Just("#".to_string()),
        "[A-Za-z][A-Za-z0-9]{0,6}",
        "array\\[[a-z0-9]{1,6}\\]",
    ];
    prop::collection::vec((token, prop_oneof![Just(""), Just(" "), Just("\n")]), 0..24).prop_map(
        |parts| {
            parts
                .into_iter()
                .map(|(token, sep)| format!("{token}{sep}"))
                .collect()
        },
    )
}

#[test]
fn prop_parser_never_panics() {
    proptest!(|(source in "\\PC{0,300}")| {
        let _result = parse(&source);
    });
}

#[test]
fn prop_parsing_is_deterministic() {
    proptest!(|(source in snippet())| {
        let first = parse(&source);
        let second = parse(&source);
        prop_assert_eq!(first, second);
    });
}

#[test]
fn prop_failed_choice_restores_cursor() {
    proptest!(|(source in snippet(), skip in 0usize..8)| {
        let mut grammar = Grammar::new(normalize(&source), ParseOptions::default());
        // consume a few declarations first so failures happen mid-buffer
        for _ in 0..skip {
            if grammar.cursor().is_at_end() || grammar.declaration().is_err() {
                break;
            }
        }

        let alternatives = [
            Alternative::new("anyType", Grammar::any_type),
            Alternative::new("message", |g: &mut Grammar| {
                g.message().map(|(name, body)| protoidl::syntax::Declaration::Message { name, body })
            }),
        ];
        let before = grammar.cursor().offset();
        match try_choice(&mut grammar, &alternatives) {
            Ok(Some(_)) => prop_assert!(grammar.cursor().offset() > before),
            Ok(None) | Err(_) => prop_assert_eq!(grammar.cursor().offset(), before),
        }
    });
}

#[test]
fn prop_message_fields_roundtrip_in_order() {
    proptest!(|(names in prop::collection::btree_set("[a-z][a-z0-9]{0,5}", 1..8))| {
        let names: Vec<String> = names.into_iter().rev().collect();
        let body = names
            .iter()
            .map(|name| format!("{name}: int32"))
            .collect::<Vec<_>>()
            .join(", ");
        let source = format!("message M {{ {body} }} method Call(M) -> M;");
        let file = parse(&source).unwrap();
        let parsed: Vec<&str> = file.methods()[0]
            .request
            .descriptor
            .iter()
            .map(|(name, _)| name)
            .collect();
        prop_assert_eq!(parsed, names.iter().map(String::as_str).collect::<Vec<_>>());
    });
}
