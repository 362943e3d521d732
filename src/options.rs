/*!
The flag set that controls how a pattern is parsed and matched.
*/

/// A set of options that influence parsing and matching.
///
/// Options combine with `|`. Most of them can also be toggled inside a
/// pattern with an inline group like `(?i)` or `(?-m:...)`, in which case
/// the change is scoped to the enclosing group.
#[derive(Clone, Copy, Default, Eq, Hash, PartialEq)]
pub struct Options {
    bits: u16,
}

impl Options {
    /// No options set.
    pub const NONE: Options = Options { bits: 0 };
    /// Literals, classes and backreferences match without regard to case.
    pub const IGNORE_CASE: Options = Options { bits: 1 << 0 };
    /// `^` and `$` match at line boundaries instead of only at the ends of
    /// the input.
    pub const MULTILINE: Options = Options { bits: 1 << 1 };
    /// Unnamed groups do not capture.
    pub const EXPLICIT_CAPTURE: Options = Options { bits: 1 << 2 };
    /// `.` matches every character, including `\n`.
    pub const SINGLELINE: Options = Options { bits: 1 << 3 };
    /// Unescaped whitespace is ignored and `#` starts a comment.
    pub const IGNORE_PATTERN_WHITESPACE: Options = Options { bits: 1 << 4 };
    /// The search proceeds from the end of the input towards its start.
    pub const RIGHT_TO_LEFT: Options = Options { bits: 1 << 5 };
    /// ECMAScript-compatible behavior for classes, escapes and
    /// backreferences.
    pub const ECMASCRIPT: Options = Options { bits: 1 << 6 };
    /// Case folding ignores the configured culture.
    pub const CULTURE_INVARIANT: Options = Options { bits: 1 << 7 };

    const ALL: u16 = (1 << 8) - 1;

    /// The only options that may be combined with `ECMASCRIPT`.
    const ECMA_COMPATIBLE: Options = Options {
        bits: Options::IGNORE_CASE.bits
            | Options::MULTILINE.bits
            | Options::ECMASCRIPT.bits
            | Options::CULTURE_INVARIANT.bits,
    };

    /// Return an empty option set.
    #[inline]
    pub const fn empty() -> Options {
        Options::NONE
    }

    /// Create an option set from its raw representation, dropping any
    /// unknown bits.
    #[inline]
    pub const fn from_bits(bits: u16) -> Options {
        Options { bits: bits & Options::ALL }
    }

    /// Return the raw representation of this option set.
    #[inline]
    pub const fn bits(self) -> u16 {
        self.bits
    }

    #[inline]
    pub const fn is_empty(self) -> bool {
        self.bits == 0
    }

    /// Returns true if and only if every option in `other` is set in
    /// `self`.
    #[inline]
    pub const fn contains(self, other: Options) -> bool {
        self.bits & other.bits == other.bits
    }

    #[inline]
    pub const fn union(self, other: Options) -> Options {
        Options { bits: self.bits | other.bits }
    }

    #[inline]
    pub const fn difference(self, other: Options) -> Options {
        Options { bits: self.bits & !other.bits }
    }

    /// Set or clear `other` depending on `yes`.
    #[inline]
    pub const fn set(self, other: Options, yes: bool) -> Options {
        if yes {
            self.union(other)
        } else {
            self.difference(other)
        }
    }

    /// Return the option that corresponds to the given inline flag letter,
    /// as used in `(?imnsx-imnsx)`.
    ///
    /// Only the scoping options are recognized. Options that can only be
    /// set for the whole pattern (right-to-left, ECMAScript, culture
    /// invariance) return `None`.
    pub fn from_inline_flag(ch: char) -> Option<Options> {
        match ch {
            'i' | 'I' => Some(Options::IGNORE_CASE),
            'm' | 'M' => Some(Options::MULTILINE),
            'n' | 'N' => Some(Options::EXPLICIT_CAPTURE),
            's' | 'S' => Some(Options::SINGLELINE),
            'x' | 'X' => Some(Options::IGNORE_PATTERN_WHITESPACE),
            _ => None,
        }
    }

    /// Check that this combination of options is permitted.
    ///
    /// ECMAScript mode may only be combined with `IGNORE_CASE`,
    /// `MULTILINE` and `CULTURE_INVARIANT`.
    pub fn validate(self) -> Result<(), OptionsError> {
        if self.contains(Options::ECMASCRIPT)
            && !self.difference(Options::ECMA_COMPATIBLE).is_empty()
        {
            return Err(OptionsError { given: self });
        }
        Ok(())
    }
}

impl core::ops::BitOr for Options {
    type Output = Options;

    fn bitor(self, rhs: Options) -> Options {
        self.union(rhs)
    }
}

impl core::ops::BitOrAssign for Options {
    fn bitor_assign(&mut self, rhs: Options) {
        *self = self.union(rhs);
    }
}

impl core::fmt::Debug for Options {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        const NAMES: &[(Options, &str)] = &[
            (Options::IGNORE_CASE, "i"),
            (Options::MULTILINE, "m"),
            (Options::EXPLICIT_CAPTURE, "n"),
            (Options::SINGLELINE, "s"),
            (Options::IGNORE_PATTERN_WHITESPACE, "x"),
            (Options::RIGHT_TO_LEFT, "r"),
            (Options::ECMASCRIPT, "e"),
            (Options::CULTURE_INVARIANT, "c"),
        ];
        write!(f, "Options(")?;
        for &(opt, name) in NAMES {
            if self.contains(opt) {
                write!(f, "{}", name)?;
            }
        }
        write!(f, ")")
    }
}

/// An error that occurs when an unsupported combination of options is
/// given.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct OptionsError {
    given: Options,
}

impl OptionsError {
    /// The rejected option set.
    pub fn options(&self) -> Options {
        self.given
    }
}

impl std::error::Error for OptionsError {}

impl core::fmt::Display for OptionsError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(
            f,
            "ECMAScript mode can only be combined with ignore-case, \
             multiline and culture-invariant options, but got {:?}",
            self.given,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ecmascript_combinations() {
        let ok = Options::ECMASCRIPT
            | Options::IGNORE_CASE
            | Options::MULTILINE
            | Options::CULTURE_INVARIANT;
        assert!(ok.validate().is_ok());

        let bad = Options::ECMASCRIPT | Options::SINGLELINE;
        assert_eq!(bad, bad.validate().unwrap_err().options());
        assert!((Options::ECMASCRIPT | Options::RIGHT_TO_LEFT)
            .validate()
            .is_err());
        // Without ECMAScript anything goes.
        assert!(Options::from_bits(!0).difference(Options::ECMASCRIPT)
            .validate()
            .is_ok());
    }

    #[test]
    fn inline_flags() {
        assert_eq!(Some(Options::IGNORE_CASE), Options::from_inline_flag('i'));
        assert_eq!(
            Some(Options::IGNORE_PATTERN_WHITESPACE),
            Options::from_inline_flag('X')
        );
        assert_eq!(None, Options::from_inline_flag('r'));
        assert_eq!(None, Options::from_inline_flag('e'));
    }

    #[test]
    fn debug_lists_letters() {
        let opts = Options::IGNORE_CASE | Options::RIGHT_TO_LEFT;
        assert_eq!("Options(ir)", format!("{:?}", opts));
    }
}
