// tests/parser_tests.rs

use protoidl::syntax::compile_ranges;
use protoidl::{
    parse, DuplicatePolicy, ErrorKind, FieldDescriptor, IdlParser, ParseOptions, TrailingComma,
};
use serde_json::json;

const MATRIX: &str = "\
message MatrixRequest { rows: int32, cols: int32, data: array[int32] }
message BasicBooleanResponse { value: bool }
method RequestMatrixProcessing(MatrixRequest) -> BasicBooleanResponse;
";

// ---
// Range compilation
// ---

#[test]
fn test_identifier_ranges() {
    let set = compile_ranges("0-9A-Za-z[]").unwrap();
    let elements: Vec<String> = set.elements().iter().map(ToString::to_string).collect();
    assert_eq!(elements, vec!["0-9", "A-Z", "a-z", "[", "]"]);
}

#[test]
fn test_reversed_range_is_invalid() {
    assert!(matches!(
        compile_ranges("z-a"),
        Err(ErrorKind::InvalidRange { .. })
    ));
}

// ---
// Messages
// ---

#[test]
fn test_empty_body_message() {
    let mut parser = IdlParser::new();
    let file = parser.parse("message M {}").unwrap();
    assert!(file.is_empty());
    let registry = parser.registry().unwrap();
    assert!(registry.get("M").unwrap().is_empty());
}

#[test]
fn test_field_order_preserved() {
    let mut parser = IdlParser::new();
    parser.parse("message M { b: int32, a: string }").unwrap();
    let message = parser.registry().unwrap().get("M").unwrap();
    let fields: Vec<_> = message.fields().cloned().collect();
    assert_eq!(
        fields,
        vec![
            FieldDescriptor::new("b", "int32"),
            FieldDescriptor::new("a", "string")
        ]
    );
}

#[test]
fn test_multiline_with_comments() {
    let source = "# service definition\n\
                  message Req {   # request\n\
                  \tid : uint64 ,\n\
                  \ttags: array[string]\n\
                  }\n\
                  message Resp { ok: bool }\n\
                  method Get(Req) -> Resp; # trailing\n";
    let file = parse(source).unwrap();
    assert_eq!(file.len(), 1);
    let request = &file.methods()[0].request.descriptor;
    assert_eq!(request.get("id"), Some("uint64"));
    assert_eq!(request.get("tags"), Some("array[string]"));
}

#[test]
fn test_trailing_comma_modes() {
    let source = "message M { a: int32, }";
    assert!(parse(source).is_ok());

    let strict = ParseOptions::default().with_trailing_comma(TrailingComma::Reject);
    let err = IdlParser::with_options(strict).parse(source).unwrap_err();
    assert_eq!(err.kind, ErrorKind::DanglingComma { found: Some('}') });
    assert_eq!(err.position, 22);
    assert!(err.is_fatal());
}

#[test]
fn test_duplicate_message_overwrites_by_default() {
    let source = "message M { a: int32 } message M { b: bool } \
                  method Call(M) -> M;";
    let file = parse(source).unwrap();
    let method = file.get("Call").unwrap();
    assert_eq!(method.request.descriptor.get("a"), None);
    assert_eq!(method.request.descriptor.get("b"), Some("bool"));
}

#[test]
fn test_duplicate_message_rejected_when_configured() {
    let source = "message M { a: int32 } message M { b: bool }";
    let options = ParseOptions::default().with_duplicate_messages(DuplicatePolicy::Reject);
    let err = IdlParser::with_options(options).parse(source).unwrap_err();
    assert_eq!(err.kind, ErrorKind::DuplicateMessage { name: "M".into() });
    assert_eq!(err.position, 31);
}

#[test]
fn test_method_uses_message_as_declared_at_that_point() {
    let source = "message M { a: int32 } method First(M) -> M; \
                  message M { b: bool } method Second(M) -> M;";
    let file = parse(source).unwrap();
    assert_eq!(file.get("First").unwrap().request.descriptor.get("a"), Some("int32"));
    assert_eq!(file.get("Second").unwrap().request.descriptor.get("b"), Some("bool"));
}

// ---
// Methods
// ---

#[test]
fn test_forward_reference_rejected() {
    let err = parse("method Foo(Req) -> Req;").unwrap_err();
    match &err.kind {
        ErrorKind::UndefinedMessage { name, .. } => assert_eq!(name, "Req"),
        other => panic!("expected UndefinedMessage, got {other:?}"),
    }
    assert_eq!(err.position, 11);
}

#[test]
fn test_forward_reference_rejected_even_if_declared_later() {
    let source = "message A {} method Call(A) -> B; message B {}";
    let err = parse(source).unwrap_err();
    assert!(matches!(err.kind, ErrorKind::UndefinedMessage { .. }));
}

#[test]
fn test_full_round_trip() {
    let file = parse(MATRIX).unwrap();
    assert_eq!(file.len(), 1);
    let value = serde_json::to_value(&file).unwrap();
    assert_eq!(
        value,
        json!([{
            "RequestMatrixProcessing": {
                "request": {
                    "MatrixRequest": {"rows": "int32", "cols": "int32", "data": "array[int32]"}
                },
                "response": {"BasicBooleanResponse": {"value": "bool"}}
            }
        }])
    );
}

#[test]
fn test_methods_keep_declaration_order() {
    let source = "message A {} method Zeta(A) -> A; method Alpha(A) -> A; method Mid(A) -> A;";
    let names: Vec<_> = parse(source)
        .unwrap()
        .iter()
        .map(|method| method.name.clone())
        .collect();
    assert_eq!(names, vec!["Zeta", "Alpha", "Mid"]);
}

#[test]
fn test_missing_semicolon() {
    let source = "message A {} method Call(A) -> A";
    assert!(parse(source).is_err());
}

#[test]
fn test_idempotent_across_instances() {
    let first = IdlParser::new().parse(MATRIX).unwrap();
    let second = IdlParser::new().parse(MATRIX).unwrap();
    assert_eq!(first, second);
}

#[test]
fn test_reuse_rejected() {
    let mut parser = IdlParser::new();
    let first = parser.parse(MATRIX).unwrap();
    let err = parser.parse(MATRIX).unwrap_err();
    assert_eq!(err.kind, ErrorKind::AlreadyConsumed);
    assert_eq!(parser.file_descriptor(), Some(&first));
}

// ---
// Diagnostics
// ---

#[test]
fn test_unknown_top_level_token_is_ambiguous() {
    let err = parse("message A {} ;").unwrap_err();
    assert_eq!(err.position, 13);
    assert!(matches!(err.kind, ErrorKind::AmbiguousFailure { .. }));
}

#[test]
fn test_diagnostic_points_into_normalized_buffer() {
    let err = IdlParser::new()
        .parse_named("api.idl", "method\n\n   Foo(Req) -> Req;")
        .unwrap_err();
    let rendered = format!("{:?}", miette::Report::new(err));
    assert!(rendered.contains("protoidl::parse::undefined_message"));
    assert!(rendered.contains("api.idl"));
}
