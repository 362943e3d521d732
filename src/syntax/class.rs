/*!
Character classes, resolved at parse time into sorted code-point ranges.

Unicode general categories and the `\w`, `\d` and `\s` shorthands are
looked up in `regex-syntax`'s Unicode tables. Once a class has been fully
scanned, its explicit ranges, categories, negation and subtraction are
folded into one canonical set of ranges, which is what the rest of the
pipeline (and the emitted matcher) sees.
*/

use regex_syntax::hir::{self, ClassUnicode, ClassUnicodeRange};

use crate::util::culture::Culture;

/// A resolved character class: a sorted, non-overlapping, non-adjacent
/// sequence of inclusive ranges.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct CharClass {
    ranges: Vec<(char, char)>,
}

impl CharClass {
    /// The class matching every character.
    pub fn any() -> CharClass {
        CharClass { ranges: vec![('\0', char::MAX)] }
    }

    /// Build a class from arbitrary ranges. Ranges are sorted and merged.
    pub fn new<I>(ranges: I) -> CharClass
    where
        I: IntoIterator<Item = (char, char)>,
    {
        let cls = ClassUnicode::new(
            ranges.into_iter().map(|(s, e)| ClassUnicodeRange::new(s, e)),
        );
        CharClass::from_unicode(&cls)
    }

    fn from_unicode(cls: &ClassUnicode) -> CharClass {
        CharClass {
            ranges: cls.iter().map(|r| (r.start(), r.end())).collect(),
        }
    }

    /// The ranges of this class in ascending order.
    pub fn ranges(&self) -> &[(char, char)] {
        &self.ranges
    }

    pub fn is_empty(&self) -> bool {
        self.ranges.is_empty()
    }

    pub fn contains(&self, ch: char) -> bool {
        self.ranges
            .binary_search_by(|&(s, e)| {
                if e < ch {
                    core::cmp::Ordering::Less
                } else if s > ch {
                    core::cmp::Ordering::Greater
                } else {
                    core::cmp::Ordering::Equal
                }
            })
            .is_ok()
    }

    /// If this class matches exactly one character, return it.
    pub fn single_char(&self) -> Option<char> {
        match self.ranges[..] {
            [(s, e)] if s == e => Some(s),
            _ => None,
        }
    }

    /// If this class matches everything except exactly one character,
    /// return that character.
    pub fn negated_single_char(&self) -> Option<char> {
        match self.ranges[..] {
            [('\0', e)] if e != char::MAX => {
                // The single gap is at the top of the code space.
                let ch = next_char(e)?;
                if ch == char::MAX {
                    Some(ch)
                } else {
                    None
                }
            }
            [(s, char::MAX)] if s != '\0' => {
                let ch = prev_char(s)?;
                if ch == '\0' {
                    Some(ch)
                } else {
                    None
                }
            }
            [('\0', e1), (s2, char::MAX)] => {
                let ch = next_char(e1)?;
                if prev_char(s2) == Some(ch) {
                    Some(ch)
                } else {
                    None
                }
            }
            _ => None,
        }
    }
}

fn next_char(ch: char) -> Option<char> {
    match ch {
        '\u{D7FF}' => Some('\u{E000}'),
        char::MAX => None,
        ch => char::from_u32(ch as u32 + 1),
    }
}

fn prev_char(ch: char) -> Option<char> {
    match ch {
        '\u{E000}' => Some('\u{D7FF}'),
        '\0' => None,
        ch => char::from_u32(ch as u32 - 1),
    }
}

/// A shorthand class escape.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) enum Shorthand {
    Word,
    Digit,
    Space,
}

impl Shorthand {
    pub(crate) fn from_escape(ch: char) -> Option<(Shorthand, bool)> {
        match ch {
            'w' => Some((Shorthand::Word, false)),
            'W' => Some((Shorthand::Word, true)),
            'd' => Some((Shorthand::Digit, false)),
            'D' => Some((Shorthand::Digit, true)),
            's' => Some((Shorthand::Space, false)),
            'S' => Some((Shorthand::Space, true)),
            _ => None,
        }
    }

    fn class(self, ecma: bool) -> ClassUnicode {
        if ecma {
            let ranges: &[(char, char)] = match self {
                Shorthand::Word => {
                    &[('0', '9'), ('A', 'Z'), ('_', '_'), ('a', 'z')]
                }
                Shorthand::Digit => &[('0', '9')],
                Shorthand::Space => &[('\t', '\r'), (' ', ' ')],
            };
            return ClassUnicode::new(
                ranges.iter().map(|&(s, e)| ClassUnicodeRange::new(s, e)),
            );
        }
        let pattern = match self {
            Shorthand::Word => r"\w",
            Shorthand::Digit => r"\d",
            Shorthand::Space => r"\s",
        };
        // The Perl classes are always available with the 'unicode'
        // feature enabled, so lookup cannot fail.
        unicode_class(pattern).unwrap_or_else(|| ClassUnicode::empty())
    }
}

/// Unicode general category names accepted in `\p{..}`.
const CATEGORIES: &[&str] = &[
    "C", "Cc", "Cf", "Cn", "Co", "L", "Ll", "Lm", "Lo", "Lt", "Lu", "M",
    "Mc", "Me", "Mn", "N", "Nd", "Nl", "No", "P", "Pc", "Pd", "Pe", "Pf",
    "Pi", "Po", "Ps", "S", "Sc", "Sk", "Sm", "So", "Z", "Zl", "Zp", "Zs",
];

/// Look up a general category by name. Under case insensitivity, each of
/// the cased letter categories stands for all of them.
pub(crate) fn category(name: &str, ignore_case: bool) -> Option<ClassUnicode> {
    if !CATEGORIES.contains(&name) {
        return None;
    }
    if ignore_case && (name == "Ll" || name == "Lu" || name == "Lt") {
        let mut cls = ClassUnicode::empty();
        for n in &["Ll", "Lu", "Lt"] {
            cls.union(&unicode_class(&format!(r"\p{{{}}}", n))?);
        }
        return Some(cls);
    }
    unicode_class(&format!(r"\p{{{}}}", name))
}

fn unicode_class(pattern: &str) -> Option<ClassUnicode> {
    let hir = regex_syntax::ParserBuilder::new()
        .unicode(true)
        .build()
        .parse(pattern)
        .ok()?;
    match hir.into_kind() {
        hir::HirKind::Class(hir::Class::Unicode(cls)) => Some(cls),
        _ => None,
    }
}

/// Accumulates the pieces of one bracketed class (or one level of a
/// subtraction chain) while it is being scanned.
#[derive(Clone, Debug)]
pub(crate) struct ClassBuilder {
    ranges: ClassUnicode,
    categories: ClassUnicode,
    negated: bool,
}

impl ClassBuilder {
    pub(crate) fn new() -> ClassBuilder {
        ClassBuilder {
            ranges: ClassUnicode::empty(),
            categories: ClassUnicode::empty(),
            negated: false,
        }
    }

    /// A builder holding just one shorthand class, as produced by a bare
    /// `\d` outside of brackets.
    pub(crate) fn shorthand(sh: Shorthand, negated: bool, ecma: bool) -> ClassBuilder {
        let mut b = ClassBuilder::new();
        b.add_shorthand(sh, negated, ecma);
        b
    }

    pub(crate) fn negate(&mut self) {
        self.negated = true;
    }

    pub(crate) fn add_range(&mut self, start: char, end: char) {
        self.ranges.push(ClassUnicodeRange::new(start, end));
    }

    pub(crate) fn add_char(&mut self, ch: char) {
        self.add_range(ch, ch);
    }

    pub(crate) fn add_shorthand(&mut self, sh: Shorthand, negated: bool, ecma: bool) {
        let mut cls = sh.class(ecma);
        if negated {
            cls.negate();
        }
        self.categories.union(&cls);
    }

    pub(crate) fn add_category(&mut self, mut cls: ClassUnicode, negated: bool) {
        if negated {
            cls.negate();
        }
        self.categories.union(&cls);
    }

    /// Add the culture's lowercase mapping of every explicit range.
    pub(crate) fn add_lowercase(&mut self, culture: Culture) {
        let mut lowered = ClassUnicode::empty();
        for r in self.ranges.iter() {
            let mut run: Option<(char, char)> = None;
            for ch in r.start()..=r.end() {
                let lower = culture.to_lower(ch);
                if lower == ch {
                    continue;
                }
                run = match run {
                    Some((s, e)) if next_char(e) == Some(lower) => Some((s, lower)),
                    Some((s, e)) => {
                        lowered.push(ClassUnicodeRange::new(s, e));
                        Some((lower, lower))
                    }
                    None => Some((lower, lower)),
                };
            }
            if let Some((s, e)) = run {
                lowered.push(ClassUnicodeRange::new(s, e));
            }
        }
        self.ranges.union(&lowered);
    }

    /// Resolve this level into a set, ignoring any subtraction.
    pub(crate) fn resolve(mut self) -> ClassUnicode {
        self.ranges.union(&self.categories);
        if self.negated {
            self.ranges.negate();
        }
        self.ranges
    }
}

/// Resolve a subtraction chain `[a-[b-[c]]]`, given outermost first.
pub(crate) fn resolve_chain(chain: Vec<ClassBuilder>) -> CharClass {
    let mut acc: Option<ClassUnicode> = None;
    for level in chain.into_iter().rev() {
        let mut cls = level.resolve();
        if let Some(sub) = acc.take() {
            cls.difference(&sub);
        }
        acc = Some(cls);
    }
    match acc {
        Some(cls) => CharClass::from_unicode(&cls),
        None => CharClass { ranges: vec![] },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn build(f: impl FnOnce(&mut ClassBuilder)) -> CharClass {
        let mut b = ClassBuilder::new();
        f(&mut b);
        resolve_chain(vec![b])
    }

    #[test]
    fn merge_and_contains() {
        let cls = CharClass::new(vec![('d', 'f'), ('a', 'c'), ('x', 'x')]);
        assert_eq!(&[('a', 'f'), ('x', 'x')], cls.ranges());
        assert!(cls.contains('e'));
        assert!(cls.contains('x'));
        assert!(!cls.contains('g'));
    }

    #[test]
    fn single_and_negated_single() {
        let one = build(|b| b.add_char('q'));
        assert_eq!(Some('q'), one.single_char());

        let not_nl = build(|b| {
            b.add_char('\n');
            b.negate();
        });
        assert_eq!(None, not_nl.single_char());
        assert_eq!(Some('\n'), not_nl.negated_single_char());

        let not_nul = build(|b| {
            b.add_char('\0');
            b.negate();
        });
        assert_eq!(Some('\0'), not_nul.negated_single_char());
        assert_eq!(None, CharClass::any().negated_single_char());
    }

    #[test]
    fn subtraction_after_negation() {
        let mut outer = ClassBuilder::new();
        outer.add_range('a', 'z');
        let mut inner = ClassBuilder::new();
        for ch in "aeiou".chars() {
            inner.add_char(ch);
        }
        let cls = resolve_chain(vec![outer, inner]);
        assert!(cls.contains('b'));
        assert!(!cls.contains('e'));

        let mut outer = ClassBuilder::new();
        outer.add_range('a', 'z');
        outer.negate();
        let mut inner = ClassBuilder::new();
        inner.add_range('0', '9');
        let cls = resolve_chain(vec![outer, inner]);
        assert!(!cls.contains('q'));
        assert!(!cls.contains('5'));
        assert!(cls.contains('!'));
    }

    #[test]
    fn lowercase_of_ranges_only() {
        let cls = build(|b| {
            b.add_range('A', 'C');
            b.add_lowercase(Culture::Invariant);
        });
        assert_eq!(&[('A', 'C'), ('a', 'c')], cls.ranges());
    }

    #[test]
    fn shorthand_and_categories() {
        let ecma = build(|b| b.add_shorthand(Shorthand::Word, false, true));
        assert!(!ecma.contains('é'));
        let uni = build(|b| b.add_shorthand(Shorthand::Word, false, false));
        assert!(uni.contains('é'));

        let lu = category("Lu", false).unwrap();
        let cls = build(|b| b.add_category(lu, false));
        assert!(cls.contains('Q'));
        assert!(!cls.contains('q'));

        let cased = category("Lu", true).unwrap();
        let cls = build(|b| b.add_category(cased, false));
        assert!(cls.contains('q'));
        assert!(category("Bogus", false).is_none());
    }
}
