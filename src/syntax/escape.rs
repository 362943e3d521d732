// Escapes and bracketed classes.

use crate::{
    options::Options,
    syntax::{
        ast::{Node, NodeKind},
        class::{self, CharClass, ClassBuilder, Shorthand},
        error::{Error, ErrorKind},
        parse::{is_word_char, Parser},
    },
};

/// How one level of a bracketed class ended.
enum LevelEnd {
    /// The closing `]` was consumed.
    Closed,
    /// A subtraction `-[` was consumed and its class begins at the cursor.
    Subtraction,
}

impl<'p> Parser<'p> {
    /// Scan an escape outside of a class, with the cursor just past `\`.
    pub(super) fn scan_backslash(&mut self) -> Result<Node, Error> {
        if self.chars_right() == 0 {
            return Err(self.error(ErrorKind::IllegalEndEscape));
        }
        let ecma = self.uses(Options::ECMASCRIPT);
        let ch = self.right_char();
        if !matches!(ch, 'b' | 'B' | 'A' | 'G' | 'Z' | 'z' | 'p' | 'P')
            && Shorthand::from_escape(ch).is_none()
        {
            return self.scan_basic_backslash();
        }
        self.move_right();
        let kind = match ch {
            'b' if ecma => NodeKind::EcmaBoundary,
            'b' => NodeKind::Boundary,
            'B' if ecma => NodeKind::NonEcmaBoundary,
            'B' => NodeKind::Nonboundary,
            'A' => NodeKind::Beginning,
            'G' => NodeKind::Start,
            'Z' => NodeKind::EndZ,
            'z' => NodeKind::End,
            'p' | 'P' => {
                let name = self.parse_property()?;
                let ignore_case = self.uses(Options::IGNORE_CASE);
                let cls = self.lookup_category(&name, ignore_case)?;
                let mut builder = ClassBuilder::new();
                builder.add_category(cls, ch == 'P');
                NodeKind::Set(class::resolve_chain(vec![builder]))
            }
            _ => {
                // Everything else was filtered to a shorthand above.
                let (sh, negated) = Shorthand::from_escape(ch).unwrap();
                let builder = ClassBuilder::shorthand(sh, negated, ecma);
                NodeKind::Set(class::resolve_chain(vec![builder]))
            }
        };
        Ok(Node::new(kind, self.options))
    }

    /// Scan a backreference or a character escape.
    fn scan_basic_backslash(&mut self) -> Result<Node, Error> {
        let backpos = self.pos;
        let mut ch = self.right_char();
        let mut close = None;

        if ch == 'k' {
            if self.chars_right() >= 2 {
                self.move_right();
                ch = self.move_right_get();
                if ch == '<' || ch == '\'' {
                    close = Some(if ch == '\'' { '\'' } else { '>' });
                }
            }
            if close.is_none() || self.chars_right() == 0 {
                return Err(self.error(ErrorKind::MalformedNameRef));
            }
            ch = self.right_char();
        } else if (ch == '<' || ch == '\'') && self.chars_right() > 1 {
            close = Some(if ch == '\'' { '\'' } else { '>' });
            self.move_right();
            ch = self.right_char();
        }

        match close {
            Some(close) if ch.is_ascii_digit() => {
                let n = self.scan_decimal()?;
                if self.chars_right() > 0 && self.move_right_get() == close {
                    if self.caps.contains(n) {
                        return Ok(Node::new(NodeKind::Ref(n), self.options));
                    }
                    return Err(self.error(ErrorKind::UndefinedBackref(n)));
                }
            }
            Some(close) if is_word_char(ch) => {
                let name = self.scan_capname();
                if self.chars_right() > 0 && self.move_right_get() == close {
                    if let Some(n) = self.caps.number_of(&name) {
                        return Ok(Node::new(NodeKind::Ref(n), self.options));
                    }
                    return Err(self.error(ErrorKind::UndefinedNameRef(name)));
                }
            }
            None if ('1'..='9').contains(&ch) => {
                if self.uses(Options::ECMASCRIPT) {
                    if let Some(n) = self.scan_ecma_backref(backpos) {
                        return Ok(Node::new(NodeKind::Ref(n), self.options));
                    }
                } else {
                    let n = self.scan_decimal()?;
                    if self.caps.contains(n) {
                        return Ok(Node::new(NodeKind::Ref(n), self.options));
                    }
                    if n <= 9 {
                        return Err(self.error(ErrorKind::UndefinedBackref(n)));
                    }
                }
            }
            _ => {}
        }

        // Not a backreference, so it must be a character code.
        self.pos = backpos;
        let mut ch = self.scan_char_escape()?;
        if self.uses(Options::IGNORE_CASE) {
            ch = self.culture.to_lower(ch);
        }
        Ok(Node::new(NodeKind::One(ch), self.options))
    }

    /// Take the longest run of digits that names a group declared before
    /// the backslash at `backslash + 1`, and return that group's number.
    fn scan_ecma_backref(&mut self, digits: usize) -> Option<u32> {
        let slash = digits - 1;
        let mut found = None;
        let mut n = self.right_char().to_digit(10)?;
        while n <= self.caps.top() {
            if self.caps.offset(n).map_or(false, |at| at < slash) {
                found = Some(n);
            }
            self.move_right();
            if self.chars_right() == 0 || !self.right_char().is_ascii_digit() {
                break;
            }
            // The guard above ensures an ASCII digit.
            let d = u32::from(self.right_char() as u8 - b'0');
            n = match n.checked_mul(10).and_then(|n| n.checked_add(d)) {
                Some(n) => n,
                None => break,
            };
        }
        found
    }

    /// Scan a single escaped character, with the cursor just past `\`.
    pub(super) fn scan_char_escape(&mut self) -> Result<char, Error> {
        let ch = self.move_right_get();
        if ('0'..='7').contains(&ch) {
            self.move_left();
            return Ok(self.scan_octal());
        }
        Ok(match ch {
            'x' => self.scan_hex(2)?,
            'u' => self.scan_hex(4)?,
            'a' => '\u{7}',
            'b' => '\u{8}',
            'e' => '\u{1B}',
            'f' => '\u{C}',
            'n' => '\n',
            'r' => '\r',
            't' => '\t',
            'v' => '\u{B}',
            'c' => self.scan_control()?,
            ch => {
                if !self.uses(Options::ECMASCRIPT) && is_word_char(ch) {
                    return Err(self.error(ErrorKind::UnrecognizedEscape(ch)));
                }
                ch
            }
        })
    }

    /// Up to three octal digits. Values above `0o377` keep their low eight
    /// bits. In ECMAScript mode the escape stops once it reaches `0o40`.
    fn scan_octal(&mut self) -> char {
        let mut n: u32 = 0;
        let mut left = core::cmp::min(3, self.chars_right());
        while left > 0 {
            let d = match self.right_char().to_digit(8) {
                Some(d) => d,
                None => break,
            };
            self.move_right();
            n = n * 8 + d;
            left -= 1;
            if self.uses(Options::ECMASCRIPT) && n >= 0x20 {
                break;
            }
        }
        // Eight bits always make a valid char.
        char::from_u32(n & 0xFF).unwrap_or('\0')
    }

    fn scan_hex(&mut self, digits: usize) -> Result<char, Error> {
        let mut n: u32 = 0;
        if self.chars_right() < digits {
            return Err(self.error(ErrorKind::InsufficientHex));
        }
        for _ in 0..digits {
            match self.move_right_get().to_digit(16) {
                Some(d) => n = n * 16 + d,
                None => return Err(self.error(ErrorKind::InsufficientHex)),
            }
        }
        char::from_u32(n).ok_or_else(|| self.error(ErrorKind::SurrogateEscape))
    }

    fn scan_control(&mut self) -> Result<char, Error> {
        if self.chars_right() == 0 {
            return Err(self.error(ErrorKind::MissingControl));
        }
        let ch = self.move_right_get().to_ascii_uppercase();
        match (ch as u32).checked_sub('@' as u32) {
            Some(code) if code < 0x20 => Ok(char::from(code as u8)),
            _ => Err(self.error(ErrorKind::UnrecognizedControl)),
        }
    }

    /// Scan `{Name}` after `\p`, returning the name.
    fn parse_property(&mut self) -> Result<String, Error> {
        if self.chars_right() < 3 {
            return Err(self.error(ErrorKind::IncompleteCategory));
        }
        if self.move_right_get() != '{' {
            return Err(self.error(ErrorKind::MalformedCategory));
        }
        let start = self.pos;
        while self.chars_right() > 0 {
            let ch = self.right_char();
            if !(is_word_char(ch) || ch == '-') {
                break;
            }
            self.move_right();
        }
        let name: String = self.pattern[start..self.pos].iter().collect();
        if self.chars_right() == 0 || self.move_right_get() != '}' {
            return Err(self.error(ErrorKind::IncompleteCategory));
        }
        Ok(name)
    }

    fn lookup_category(
        &self,
        name: &str,
        ignore_case: bool,
    ) -> Result<regex_syntax::hir::ClassUnicode, Error> {
        class::category(name, ignore_case)
            .ok_or_else(|| self.error(ErrorKind::UnknownCategory(name.to_string())))
    }

    /// Scan a bracketed class, with the cursor just past `[`. A chain of
    /// subtractions is scanned level by level and resolved innermost first.
    pub(super) fn scan_char_class(
        &mut self,
        ignore_case: bool,
    ) -> Result<CharClass, Error> {
        let mut chain = vec![];
        loop {
            let mut level = ClassBuilder::new();
            let end = self.scan_class_level(&mut level, ignore_case)?;
            if ignore_case {
                level.add_lowercase(self.culture);
            }
            chain.push(level);
            if let LevelEnd::Closed = end {
                break;
            }
        }
        // Each enclosing level must close right after its subtraction.
        for _ in 1..chain.len() {
            if self.chars_right() == 0 {
                return Err(self.error(ErrorKind::UnterminatedBracket));
            }
            if self.right_char() != ']' {
                return Err(self.error(ErrorKind::SubtractionMustBeLast));
            }
            self.move_right();
        }
        Ok(class::resolve_chain(chain))
    }

    fn scan_class_level(
        &mut self,
        cc: &mut ClassBuilder,
        ignore_case: bool,
    ) -> Result<LevelEnd, Error> {
        let ecma = self.uses(Options::ECMASCRIPT);
        let mut prev = '\0';
        let mut in_range = false;
        let mut first = true;

        if self.chars_right() > 0 && self.right_char() == '^' {
            self.move_right();
            cc.negate();
        }
        while self.chars_right() > 0 {
            let was_first = core::mem::replace(&mut first, false);
            let mut translated = false;
            let mut ch = self.move_right_get();
            if ch == ']' {
                if !was_first {
                    return Ok(LevelEnd::Closed);
                }
            } else if ch == '\\' && self.chars_right() > 0 {
                ch = self.move_right_get();
                if let Some((sh, negated)) = Shorthand::from_escape(ch) {
                    if in_range {
                        return Err(self.error(ErrorKind::BadClassInCharRange(ch)));
                    }
                    cc.add_shorthand(sh, negated, ecma);
                    continue;
                }
                match ch {
                    'p' | 'P' => {
                        if in_range {
                            return Err(self.error(ErrorKind::BadClassInCharRange(ch)));
                        }
                        let name = self.parse_property()?;
                        let cls = self.lookup_category(&name, ignore_case)?;
                        cc.add_category(cls, ch == 'P');
                        continue;
                    }
                    '-' => {
                        if in_range {
                            in_range = false;
                            if prev > ch {
                                return Err(self.error(ErrorKind::ReversedCharRange));
                            }
                            cc.add_range(prev, ch);
                        } else {
                            cc.add_char(ch);
                        }
                        continue;
                    }
                    _ => {
                        self.move_left();
                        ch = self.scan_char_escape()?;
                        translated = true;
                    }
                }
            } else if ch == '[' && !in_range {
                self.skip_posix_name();
            }

            if in_range {
                in_range = false;
                if ch == '[' && !translated && !was_first {
                    // Not a range after all: `a-[` starts a subtraction.
                    cc.add_char(prev);
                    return Ok(LevelEnd::Subtraction);
                }
                if prev > ch {
                    return Err(self.error(ErrorKind::ReversedCharRange));
                }
                cc.add_range(prev, ch);
            } else if self.chars_right() >= 2
                && self.right_char() == '-'
                && self.right_char_at(1) != ']'
            {
                prev = ch;
                in_range = true;
                self.move_right();
            } else if self.chars_right() >= 1
                && ch == '-'
                && !translated
                && self.right_char() == '['
                && !was_first
            {
                self.move_right();
                return Ok(LevelEnd::Subtraction);
            } else {
                cc.add_char(ch);
            }
        }
        Err(self.error(ErrorKind::UnterminatedBracket))
    }
}
