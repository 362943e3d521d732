/// The collation used for case-insensitive matching.
///
/// Case-insensitive patterns are lowered at parse time with the culture's
/// lowercase mapping, and emitted matchers apply the same mapping to the
/// input at match time. A culture is a plain `Copy` value, so any number of
/// concurrent compilations can share one.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum Culture {
    /// Unicode simple lowercase mapping.
    Invariant,
    /// Like `Invariant`, except that `I` lowers to dotless `ı` and `İ`
    /// lowers to `i`.
    Turkic,
}

impl Default for Culture {
    fn default() -> Culture {
        Culture::Invariant
    }
}

impl Culture {
    /// Map a character to its lowercase form under this culture.
    ///
    /// Characters whose full lowercase mapping expands to more than one
    /// character map to the first character of the expansion, which agrees
    /// with the simple case mapping.
    #[inline]
    pub fn to_lower(self, ch: char) -> char {
        if ch.is_ascii() {
            if self == Culture::Turkic && ch == 'I' {
                return '\u{131}';
            }
            return ch.to_ascii_lowercase();
        }
        if self == Culture::Turkic && ch == '\u{130}' {
            return 'i';
        }
        ch.to_lowercase().next().unwrap_or(ch)
    }

    /// Lowercase every character in `s`.
    pub fn lower_str(self, s: &str) -> String {
        s.chars().map(|ch| self.to_lower(ch)).collect()
    }

    /// The Rust path expression naming this culture, for emitted code.
    pub(crate) fn rust_path(self) -> &'static str {
        match self {
            Culture::Invariant => "Culture::Invariant",
            Culture::Turkic => "Culture::Turkic",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invariant() {
        let c = Culture::Invariant;
        assert_eq!('a', c.to_lower('A'));
        assert_eq!('i', c.to_lower('I'));
        assert_eq!('σ', c.to_lower('Σ'));
        assert_eq!('i', c.to_lower('\u{130}'));
        assert_eq!('1', c.to_lower('1'));
        assert_eq!("straße", c.lower_str("STRAßE"));
    }

    #[test]
    fn turkic() {
        let c = Culture::Turkic;
        assert_eq!('\u{131}', c.to_lower('I'));
        assert_eq!('i', c.to_lower('\u{130}'));
        assert_eq!('a', c.to_lower('A'));
    }
}
