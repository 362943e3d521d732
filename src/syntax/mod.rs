/*!
The pattern parser.

This module turns pattern text into a syntax tree ([`Ast`]) along with the
table of capture groups the pattern declares. Parsing is configured with a
[`Config`], which carries the options and the culture used to lower
case-insensitive literals.

```
use regex_emit::{syntax, Options};

let ast = syntax::Config::new()
    .options(Options::IGNORE_CASE)
    .parse(r"(?<word>Ab)c")?;
assert_eq!(Some(1), ast.captures().number_of("word"));
# Ok::<(), Box<dyn std::error::Error>>(())
```
*/

pub use self::{
    ast::{Node, NodeKind, INFINITE},
    captures::CaptureTable,
    class::CharClass,
    error::{Error, ErrorKind},
};

use crate::{options::Options, util::culture::Culture};

mod ast;
mod captures;
mod class;
mod error;
mod escape;
mod parse;

/// The configuration used for parsing a pattern.
#[derive(Clone, Copy, Debug, Default)]
pub struct Config {
    options: Option<Options>,
    culture: Option<Culture>,
}

impl Config {
    /// Return a new default parser configuration.
    pub fn new() -> Config {
        Config::default()
    }

    /// The options the pattern starts with. Inline groups may change some
    /// of them for part of the pattern.
    ///
    /// By default, no options are set.
    pub fn options(mut self, options: Options) -> Config {
        self.options = Some(options);
        self
    }

    /// The culture used to lower case-insensitive literals and classes.
    ///
    /// This is ignored when `Options::CULTURE_INVARIANT` is set. By
    /// default, this is `Culture::Invariant`.
    pub fn culture(mut self, culture: Culture) -> Config {
        self.culture = Some(culture);
        self
    }

    pub fn get_options(&self) -> Options {
        self.options.unwrap_or(Options::NONE)
    }

    /// The culture that parsing actually uses, after accounting for
    /// `Options::CULTURE_INVARIANT`.
    pub fn get_culture(&self) -> Culture {
        if self.get_options().contains(Options::CULTURE_INVARIANT) {
            return Culture::Invariant;
        }
        self.culture.unwrap_or_default()
    }

    /// Overwrite the default configuration such that the options in `o` are
    /// always used. If an option in `o` is not set, then the corresponding
    /// option in `self` is used.
    pub(crate) fn overwrite(self, o: Config) -> Config {
        Config {
            options: o.options.or(self.options),
            culture: o.culture.or(self.culture),
        }
    }

    /// Parse a pattern with this configuration.
    pub fn parse(&self, pattern: &str) -> Result<Ast, Error> {
        let chars: Vec<char> = pattern.chars().collect();
        let options = self.get_options();
        let culture = self.get_culture();
        let (root, captures) =
            parse::Parser::new(&chars, options, culture).parse()?;
        Ok(Ast { root, captures, options, culture })
    }
}

/// Parse a pattern with the given starting options and the invariant
/// culture.
pub fn parse(pattern: &str, options: Options) -> Result<Ast, Error> {
    Config::new().options(options).parse(pattern)
}

/// A parsed pattern.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Ast {
    root: Node,
    captures: CaptureTable,
    options: Options,
    culture: Culture,
}

impl Ast {
    /// The root of the tree, which is always the capture of group `0`.
    pub fn root(&self) -> &Node {
        &self.root
    }

    pub fn captures(&self) -> &CaptureTable {
        &self.captures
    }

    /// The options the pattern was parsed with.
    pub fn options(&self) -> Options {
        self.options
    }

    pub fn culture(&self) -> Culture {
        self.culture
    }

    pub fn is_right_to_left(&self) -> bool {
        self.options.contains(Options::RIGHT_TO_LEFT)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse_ok(pattern: &str, options: Options) -> Ast {
        match parse(pattern, options) {
            Ok(ast) => ast,
            Err(err) => panic!("{}", err),
        }
    }

    fn parse_err(pattern: &str) -> Error {
        parse(pattern, Options::NONE).unwrap_err()
    }

    /// The single child of the root capture.
    fn body(ast: &Ast) -> &Node {
        &ast.root().children()[0]
    }

    fn kinds(node: &Node) -> Vec<&NodeKind> {
        node.children().iter().map(|c| c.kind()).collect()
    }

    #[test]
    fn anchored_loop() {
        let ast = parse_ok("^a+b$", Options::NONE);
        assert_eq!(
            &NodeKind::Capture { number: Some(0), uncapture: None },
            ast.root().kind()
        );
        assert_eq!(
            vec![
                &NodeKind::Beginning,
                &NodeKind::Oneloop { ch: 'a', min: 1, max: INFINITE },
                &NodeKind::One('b'),
                &NodeKind::EndZ,
            ],
            kinds(body(&ast))
        );
    }

    #[test]
    fn literal_runs_batch() {
        let ast = parse_ok("abc", Options::NONE);
        assert_eq!(&NodeKind::Multi("abc".into()), body(&ast).kind());

        let ast = parse_ok("abc*", Options::NONE);
        assert_eq!(
            vec![
                &NodeKind::Multi("ab".into()),
                &NodeKind::Oneloop { ch: 'c', min: 0, max: INFINITE },
            ],
            kinds(body(&ast))
        );
    }

    #[test]
    fn braces_that_are_not_quantifiers() {
        let ast = parse_ok("a{,2}", Options::NONE);
        assert_eq!(&NodeKind::Multi("a{,2}".into()), body(&ast).kind());
        let ast = parse_ok("a{2,}", Options::NONE);
        assert_eq!(
            &NodeKind::Oneloop { ch: 'a', min: 2, max: INFINITE },
            body(&ast).kind()
        );
    }

    #[test]
    fn scoped_ignore_case() {
        let ast = parse_ok("(?i:A)a", Options::NONE);
        let concat = body(&ast);
        // The scoped literal is lowered and flagged; the outer one isn't.
        assert_eq!(vec![&NodeKind::One('a'), &NodeKind::One('a')], kinds(concat));
        assert!(concat.children()[0].is_ignore_case());
        assert!(!concat.children()[1].is_ignore_case());

        let ast = parse_ok("(?i:A)A", Options::NONE);
        assert_eq!(
            vec![&NodeKind::One('a'), &NodeKind::One('A')],
            kinds(body(&ast))
        );
    }

    #[test]
    fn option_only_group_persists_to_group_end() {
        let ast = parse_ok("(a(?i)b)c", Options::NONE);
        let outer = body(&ast);
        let group = &outer.children()[0];
        assert_eq!(
            &NodeKind::Capture { number: Some(1), uncapture: None },
            group.kind()
        );
        let inner = &group.children()[0];
        assert!(!inner.children()[0].is_ignore_case());
        assert!(inner.children()[1].is_ignore_case());
        assert!(!outer.children()[1].is_ignore_case());
    }

    #[test]
    fn named_groups_numbered_last() {
        let ast = parse_ok(r"(?<year>\d{4})-(\d{2})", Options::NONE);
        assert_eq!(Some(2), ast.captures().number_of("year"));
        assert_eq!(vec!["0", "1", "year"], ast.captures().group_names());

        let ast = parse_ok(r"(?<year>\d{4})-(?<month>\d{2})", Options::NONE);
        assert_eq!(Some(1), ast.captures().number_of("year"));
        assert_eq!(Some(2), ast.captures().number_of("month"));
    }

    #[test]
    fn forward_reference_resolves() {
        let ast = parse_ok(r"\k<later>(?<later>x)", Options::NONE);
        assert_eq!(&NodeKind::Ref(1), body(&ast).children()[0].kind());
    }

    #[test]
    fn balancing_group() {
        let ast = parse_ok(r"(?<o>a)(?<-o>b)", Options::NONE);
        let second = &body(&ast).children()[1];
        assert_eq!(
            &NodeKind::Capture { number: None, uncapture: Some(1) },
            second.kind()
        );
    }

    #[test]
    fn conditionals() {
        let ast = parse_ok(r"(a)?(?(1)b|c)", Options::NONE);
        let cond = &body(&ast).children()[1];
        assert_eq!(&NodeKind::Testref(1), cond.kind());
        assert_eq!(2, cond.children().len());

        let ast = parse_ok(r"(?((?=a))ab|c)(d)", Options::NONE);
        let cond = &body(&ast).children()[0];
        assert_eq!(&NodeKind::Testgroup, cond.kind());
        assert_eq!(3, cond.children().len());
        // The condition's paren does not consume a capture number.
        assert_eq!(2, ast.captures().len());
    }

    #[test]
    fn classes() {
        let ast = parse_ok("[a-z-[aeiou]]", Options::NONE);
        match body(&ast).kind() {
            NodeKind::Set(cls) => {
                assert!(cls.contains('b'));
                assert!(!cls.contains('e'));
            }
            kind => panic!("expected a set, got {:?}", kind),
        }
        let ast = parse_ok("[x]", Options::NONE);
        assert_eq!(&NodeKind::One('x'), body(&ast).kind());
        let ast = parse_ok("[^\n]", Options::NONE);
        assert_eq!(&NodeKind::Notone('\n'), body(&ast).kind());
        let ast = parse_ok("[]a]", Options::NONE);
        match body(&ast).kind() {
            NodeKind::Set(cls) => assert!(cls.contains(']')),
            kind => panic!("expected a set, got {:?}", kind),
        }
    }

    #[test]
    fn whitespace_mode() {
        let ast = parse_ok("a b # comment\n c", Options::IGNORE_PATTERN_WHITESPACE);
        assert_eq!(&NodeKind::Multi("abc".into()), body(&ast).kind());
        let ast = parse_ok("a(?#note)b", Options::NONE);
        assert_eq!(&NodeKind::Multi("ab".into()), body(&ast).kind());
    }

    #[test]
    fn right_to_left_children_reversed() {
        let ast = parse_ok("a.b", Options::RIGHT_TO_LEFT);
        assert_eq!(
            vec![&NodeKind::One('b'), &NodeKind::Notone('\n'), &NodeKind::One('a')],
            kinds(body(&ast))
        );
    }

    #[test]
    fn escapes() {
        let ast = parse_ok(r"\x41B\cC\101\n", Options::NONE);
        assert_eq!(&NodeKind::Multi("AB\u{3}A\n".into()), body(&ast).kind());
    }

    #[test]
    fn ecmascript_backref_digits() {
        let opts = Options::ECMASCRIPT;
        let ast = parse_ok(r"(a)\10", opts);
        let kinds = kinds(body(&ast));
        assert_eq!(&NodeKind::Ref(1), kinds[1]);
        assert_eq!(&NodeKind::One('0'), kinds[2]);
    }

    #[test]
    fn error_kinds_and_offsets() {
        let cases: Vec<(&str, ErrorKind)> = vec![
            ("(a", ErrorKind::NotEnoughParens),
            ("a)", ErrorKind::TooManyParens),
            ("a**", ErrorKind::NestedQuantifier('*')),
            ("*a", ErrorKind::QuantifierAfterNothing),
            ("[a-", ErrorKind::UnterminatedBracket),
            (r"\1", ErrorKind::UndefinedBackref(1)),
            ("[z-a]", ErrorKind::ReversedCharRange),
            ("a{3,2}", ErrorKind::ReversedQuantifierRange),
            (r"\k<nope>", ErrorKind::UndefinedNameRef("nope".into())),
            (r"\k", ErrorKind::MalformedNameRef),
            (r"\p{Nope}", ErrorKind::UnknownCategory("Nope".into())),
            (r"\pLxx", ErrorKind::MalformedCategory),
            (r"[a-\d]", ErrorKind::BadClassInCharRange('d')),
            ("[a-z-[b]c]", ErrorKind::SubtractionMustBeLast),
            (r"\c", ErrorKind::MissingControl),
            (r"\x4", ErrorKind::InsufficientHex),
            (r"\uD800", ErrorKind::SurrogateEscape),
            (r"\q", ErrorKind::UnrecognizedEscape('q')),
            ("a\\", ErrorKind::IllegalEndEscape),
            ("(?(1)a)", ErrorKind::UndefinedReference(1)),
            ("(a)(?(1)a|b|c)", ErrorKind::TooManyAlternates),
            ("(?(?#x)a)", ErrorKind::ConditionCantComment),
            ("(?(?<n>x)a)", ErrorKind::ConditionCantCapture),
            ("(?z)", ErrorKind::UnrecognizedGrouping),
            ("(?<0>a)", ErrorKind::CaptureNumberZero),
            ("(?#abc", ErrorKind::UnterminatedComment),
            ("a{99999999999}", ErrorKind::CaptureNumberOverflow),
        ];
        for (pattern, kind) in cases {
            let err = parse_err(pattern);
            assert_eq!(&kind, err.kind(), "pattern: {:?}", pattern);
            assert!(
                err.offset() <= pattern.chars().count(),
                "offset {} out of range for {:?}",
                err.offset(),
                pattern
            );
        }
    }

    #[test]
    fn deep_nesting_does_not_overflow() {
        let depth = 50_000;
        let pattern = format!("{}a{}", "(?:".repeat(depth), ")".repeat(depth));
        let ast = parse_ok(&pattern, Options::NONE);
        assert_eq!(&NodeKind::One('a'), body(&ast).kind());
    }
}
