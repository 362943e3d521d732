/// An error that occurred while parsing a pattern.
///
/// Every error carries the offset, counted in `char`s, at which the parser
/// gave up. The offset is always in the range `0..=pattern_len`. Parsing
/// stops at the first error: there is no recovery and no partial result.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Error {
    kind: ErrorKind,
    pattern: String,
    offset: usize,
}

/// The kind of a pattern syntax error.
#[non_exhaustive]
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum ErrorKind {
    /// A character class was opened with `[` but never closed.
    UnterminatedBracket,
    /// A `(?#...)` comment was never closed.
    UnterminatedComment,
    /// A `)` appeared without a matching `(`.
    TooManyParens,
    /// The pattern ended while one or more groups were still open.
    NotEnoughParens,
    /// A quantifier directly followed another quantifier, as in `a**`.
    NestedQuantifier(char),
    /// A quantifier had nothing to quantify, as in `*a` or `(|+)`.
    QuantifierAfterNothing,
    /// A class range whose start is greater than its end, as in `[z-a]`.
    ReversedCharRange,
    /// A counted repetition whose minimum exceeds its maximum.
    ReversedQuantifierRange,
    /// A group name was empty or contained invalid characters.
    InvalidGroupName,
    /// A group tried to explicitly use capture number zero.
    CaptureNumberZero,
    /// A numbered backreference to a group that doesn't exist.
    UndefinedBackref(u32),
    /// A named backreference to a group that doesn't exist.
    UndefinedNameRef(String),
    /// A `\k` escape not followed by `<name>` or `'name'`.
    MalformedNameRef,
    /// A conditional whose numbered reference wasn't closed by `)`.
    MalformedReference(u32),
    /// A conditional that tests a capture number that doesn't exist.
    UndefinedReference(u32),
    /// A `\p` or `\P` escape that ended too early.
    IncompleteCategory,
    /// A `\p` or `\P` escape not followed by `{`.
    MalformedCategory,
    /// A `\p{...}` escape naming an unknown Unicode category.
    UnknownCategory(String),
    /// A shorthand class such as `\d` used as a range endpoint.
    BadClassInCharRange(char),
    /// A class subtraction `-[...]` that wasn't the last element of its
    /// class.
    SubtractionMustBeLast,
    /// A `\c` escape at the end of the pattern.
    MissingControl,
    /// A `\c` escape followed by a character with no control code.
    UnrecognizedControl,
    /// A `\x` or `\u` escape without enough hexadecimal digits.
    InsufficientHex,
    /// A `\u` escape naming a lone surrogate code unit.
    SurrogateEscape,
    /// A number in a capture, backreference or quantifier was too big.
    CaptureNumberOverflow,
    /// An escape of a word character that has no meaning.
    UnrecognizedEscape(char),
    /// The pattern ended with a single `\`.
    IllegalEndEscape,
    /// A conditional group whose condition was missing.
    IllegalCondition,
    /// A conditional whose condition tried to capture.
    ConditionCantCapture,
    /// A conditional whose condition was a comment.
    ConditionCantComment,
    /// A conditional group with more than two alternatives.
    TooManyAlternates,
    /// A `(?` construct that isn't recognized.
    UnrecognizedGrouping,
}

impl Error {
    pub(crate) fn new(kind: ErrorKind, pattern: &[char], offset: usize) -> Error {
        Error {
            kind,
            pattern: pattern.iter().collect(),
            offset: core::cmp::min(offset, pattern.len()),
        }
    }

    /// Return the kind of this error.
    pub fn kind(&self) -> &ErrorKind {
        &self.kind
    }

    /// Return the pattern that failed to parse.
    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    /// Return the offset, in `char`s, at which parsing failed.
    pub fn offset(&self) -> usize {
        self.offset
    }
}

impl std::error::Error for Error {}

impl core::fmt::Display for Error {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(
            f,
            "invalid pattern {:?} at offset {}: {}",
            self.pattern, self.offset, self.kind,
        )
    }
}

impl core::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        use self::ErrorKind::*;

        match *self {
            UnterminatedBracket => write!(f, "unterminated [] set"),
            UnterminatedComment => write!(f, "unterminated (?#...) comment"),
            TooManyParens => write!(f, "too many )'s"),
            NotEnoughParens => write!(f, "not enough )'s"),
            NestedQuantifier(ch) => {
                write!(f, "nested quantifier '{}'", ch)
            }
            QuantifierAfterNothing => {
                write!(f, "quantifier following nothing")
            }
            ReversedCharRange => {
                write!(f, "[x-y] range in reverse order")
            }
            ReversedQuantifierRange => {
                write!(f, "illegal {{x,y}} with x > y")
            }
            InvalidGroupName => {
                write!(f, "invalid group name: group names must begin with a \
                           word character")
            }
            CaptureNumberZero => {
                write!(f, "capture number cannot be zero")
            }
            UndefinedBackref(n) => {
                write!(f, "reference to undefined group number {}", n)
            }
            UndefinedNameRef(ref name) => {
                write!(f, "reference to undefined group name {}", name)
            }
            MalformedNameRef => write!(f, "malformed \\k<...> named back reference"),
            MalformedReference(n) => {
                write!(f, "(?({}) ) malformed", n)
            }
            UndefinedReference(n) => {
                write!(f, "(?({}) ) reference to undefined group", n)
            }
            IncompleteCategory => write!(f, "incomplete \\p{{X}} character escape"),
            MalformedCategory => write!(f, "malformed \\p{{X}} character escape"),
            UnknownCategory(ref name) => {
                write!(f, "unknown property '{}'", name)
            }
            BadClassInCharRange(ch) => {
                write!(f, "cannot include class \\{} in character range", ch)
            }
            SubtractionMustBeLast => {
                write!(f, "a subtraction must be the last element in a \
                           character class")
            }
            MissingControl => write!(f, "missing control character"),
            UnrecognizedControl => write!(f, "unrecognized control character"),
            InsufficientHex => write!(f, "insufficient hexadecimal digits"),
            SurrogateEscape => {
                write!(f, "escape names a lone surrogate code unit")
            }
            CaptureNumberOverflow => {
                write!(f, "capture group numbers must be less than or equal \
                           to Int32.MaxValue")
            }
            UnrecognizedEscape(ch) => {
                write!(f, "unrecognized escape sequence \\{}", ch)
            }
            IllegalEndEscape => write!(f, "illegal \\ at end of pattern"),
            IllegalCondition => {
                write!(f, "illegal conditional (?(...)) expression")
            }
            ConditionCantCapture => {
                write!(f, "alternation conditions do not capture and cannot \
                           be named")
            }
            ConditionCantComment => {
                write!(f, "alternation conditions cannot be comments")
            }
            TooManyAlternates => {
                write!(f, "too many | in (?()|)")
            }
            UnrecognizedGrouping => {
                write!(f, "unrecognized grouping construct")
            }
        }
    }
}
