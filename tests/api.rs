use regex_emit::{
    compiler::{self, StartStrategy},
    syntax,
    util::anchors::{Anchor, AnchorSet},
    Builder, Culture, Options,
};

fn build(pattern: &str) -> regex_emit::Emitted {
    match Builder::new().build(pattern) {
        Ok(emitted) => emitted,
        Err(err) => panic!("{}", err),
    }
}

#[test]
fn anchors_at_both_ends() {
    let emitted = build("^a+b$");
    let want = AnchorSet::empty().insert(Anchor::Beginning).insert(Anchor::EndZ);
    assert_eq!(want, emitted.anchors());
    assert_eq!(
        StartStrategy::Anchors(AnchorSet::empty().insert(Anchor::Beginning)),
        emitted.compiled().start_strategy()
    );
}

#[test]
fn multiline_anchors() {
    let emitted = Builder::new()
        .syntax(syntax::Config::new().options(Options::MULTILINE))
        .build("^a$")
        .unwrap();
    assert!(emitted.anchors().contains(Anchor::Bol));
    assert!(emitted.anchors().contains(Anchor::Eol));
    assert!(!emitted.anchors().contains(Anchor::Beginning));
}

#[test]
fn group_names_follow_numbering() {
    let emitted = build(r"(?<year>\d{4})-(?<month>\d{2})");
    assert_eq!(vec!["0", "year", "month"], emitted.program().group_names());
    assert_eq!(&[0, 1, 2], emitted.program().capture_numbers());

    // Named groups are numbered after every unnamed one.
    let emitted = build(r"(?<n>x)(y)");
    assert_eq!(vec!["0", "1", "n"], emitted.program().group_names());
}

#[test]
fn scoped_ignore_case() {
    let ast = syntax::parse("(?i:A)a", Options::NONE).unwrap();
    let concat = &ast.root().children()[0];
    assert!(concat.children()[0].is_ignore_case());
    assert!(!concat.children()[1].is_ignore_case());

    let emitted = build("(?i:A)a");
    let ops = emitted.program().operations();
    assert!(ops.iter().any(|op| op.is_ignore_case()));
    assert!(ops.iter().any(|op| !op.is_ignore_case()));
}

#[test]
fn culture_reaches_the_matcher() {
    let emitted = Builder::new()
        .syntax(
            syntax::Config::new()
                .options(Options::IGNORE_CASE)
                .culture(Culture::Turkic),
        )
        .build("I")
        .unwrap();
    assert_eq!(Culture::Turkic, emitted.program().culture());
    assert!(emitted.source().contains("Culture::Turkic"));

    let emitted = Builder::new()
        .syntax(
            syntax::Config::new()
                .options(Options::IGNORE_CASE | Options::CULTURE_INVARIANT)
                .culture(Culture::Turkic),
        )
        .build("I")
        .unwrap();
    assert_eq!(Culture::Invariant, emitted.program().culture());
}

#[test]
fn emit_names_the_pattern() {
    let src = regex_emit::emit(r"a\d", Options::NONE).unwrap();
    assert!(src.starts_with("// Generated by regex-emit. Do not edit.\n"));
    assert!(src.contains("// pattern: a\\d\n"));
    assert!(src.contains("pub struct Pattern;"));
    assert!(src.contains("use regex_emit::runtime::{"));
}

#[test]
fn compiler_configuration() {
    let emitted = Builder::new()
        .compiler(
            compiler::Config::new()
                .module(Some("digits"))
                .struct_name("Digits")
                .runtime_path("crate::rt"),
        )
        .build(r"\d+")
        .unwrap();
    let src = emitted.source();
    assert!(src.contains("pub mod digits {"));
    assert!(src.contains("pub struct Digits;"));
    assert!(src.contains("use crate::rt::{"));
}

#[test]
fn right_to_left() {
    let emitted = Builder::new()
        .syntax(syntax::Config::new().options(Options::RIGHT_TO_LEFT))
        .build("abc")
        .unwrap();
    assert!(emitted.program().is_right_to_left());
    let lines: Vec<&str> = emitted.source().lines().map(str::trim).collect();
    let at = lines
        .iter()
        .position(|&line| line == "fn right_to_left(&self) -> bool {")
        .unwrap();
    assert_eq!("true", lines[at + 1]);
}

#[test]
fn backtracks_are_registered() {
    let emitted = build("a*b|c");
    assert!(!emitted.backtracks().is_empty());
    for (i, op) in emitted.backtracks().iter().enumerate() {
        assert_eq!(i, op.tag());
        assert!(op.op_id() < emitted.program().operations().len());
    }
}
