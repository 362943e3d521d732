use regex_emit::{syntax, Builder, ErrorKind, Options};

fn syntax_error(pattern: &str) -> syntax::Error {
    let err = Builder::new().build(pattern).unwrap_err();
    match *err.kind() {
        ErrorKind::Syntax(ref err) => err.clone(),
        ref kind => panic!("expected a syntax error, got {:?}", kind),
    }
}

#[test]
fn unbalanced_parens() {
    let err = syntax_error("(a");
    assert_eq!(&syntax::ErrorKind::NotEnoughParens, err.kind());
    assert_eq!(2, err.offset());
    assert_eq!("(a", err.pattern());

    let err = syntax_error("a)");
    assert_eq!(&syntax::ErrorKind::TooManyParens, err.kind());
}

#[test]
fn nested_quantifier() {
    let err = syntax_error("a**");
    assert_eq!(&syntax::ErrorKind::NestedQuantifier('*'), err.kind());
    assert_eq!(3, err.offset());
}

#[test]
fn unterminated_bracket() {
    let err = syntax_error("[a-");
    assert_eq!(&syntax::ErrorKind::UnterminatedBracket, err.kind());
    assert_eq!(3, err.offset());
}

#[test]
fn undefined_backreference() {
    let err = syntax_error(r"\1");
    assert_eq!(&syntax::ErrorKind::UndefinedBackref(1), err.kind());
    // A reference to a group declared later in the pattern is fine.
    assert!(Builder::new().build(r"\1(a)").is_ok());
}

#[test]
fn offsets_count_chars() {
    let err = syntax_error("ééé(");
    assert_eq!(&syntax::ErrorKind::NotEnoughParens, err.kind());
    assert_eq!(4, err.offset());
}

#[test]
fn error_messages_name_the_pattern() {
    let msg = Builder::new().build("a**").unwrap_err().to_string();
    assert!(msg.contains("a**"), "{}", msg);
}

#[test]
fn ecmascript_with_right_to_left() {
    let options = Options::ECMASCRIPT | Options::RIGHT_TO_LEFT;
    // The options are rejected before the pattern is parsed.
    let err = Builder::new()
        .syntax(syntax::Config::new().options(options))
        .build("(")
        .unwrap_err();
    match *err.kind() {
        ErrorKind::Options(ref err) => assert_eq!(options, err.options()),
        ref kind => panic!("expected an options error, got {:?}", kind),
    }
    assert!(regex_emit::emit("a", options).is_err());
}

#[test]
fn ecmascript_allows_ignore_case_and_multiline() {
    let options = Options::ECMASCRIPT | Options::IGNORE_CASE | Options::MULTILINE;
    assert!(regex_emit::emit("a", options).is_ok());
}
