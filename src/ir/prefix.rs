use crate::syntax::CharClass;

/// The set of characters a match can begin with.
///
/// For a right-to-left pattern, "begin" means the character just before
/// the starting position, since that is the first one the matcher reads.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct FirstChars {
    class: CharClass,
    ignore_case: bool,
}

impl FirstChars {
    pub fn new(class: CharClass, ignore_case: bool) -> FirstChars {
        FirstChars { class, ignore_case }
    }

    pub fn class(&self) -> &CharClass {
        &self.class
    }

    /// When true, input characters are lowered before testing membership.
    pub fn is_ignore_case(&self) -> bool {
        self.ignore_case
    }

    /// The only possible first character, if there is exactly one.
    pub fn single_char(&self) -> Option<char> {
        self.class.single_char()
    }
}

/// A literal that every match must begin with, along with the shift table
/// used to search for it.
///
/// The search is Horspool's simplification of Boyer-Moore: the window is
/// compared against the literal, and on a mismatch it moves by a distance
/// looked up from the character at the far end of the window.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct SkipPrefix {
    literal: Vec<char>,
    ignore_case: bool,
    right_to_left: bool,
    shifts: Vec<(char, usize)>,
}

impl SkipPrefix {
    /// Build a skip prefix. Case-insensitive literals must already be
    /// lowered.
    pub fn new(literal: &str, ignore_case: bool, right_to_left: bool) -> SkipPrefix {
        let literal: Vec<char> = literal.chars().collect();
        let n = literal.len();
        let mut shifts: Vec<(char, usize)> = vec![];
        let mut set = |ch: char, shift: usize| {
            match shifts.iter_mut().find(|(c, _)| *c == ch) {
                Some(entry) => entry.1 = shift,
                None => shifts.push((ch, shift)),
            }
        };
        if right_to_left {
            // The window's first char decides the shift. The nearest
            // occurrence in literal[1..] wins.
            for i in (1..n).rev() {
                set(literal[i], i);
            }
        } else {
            // The window's last char decides the shift. The last occurrence
            // in literal[..n - 1] wins.
            for i in 0..n.saturating_sub(1) {
                set(literal[i], n - 1 - i);
            }
        }
        shifts.sort();
        SkipPrefix { literal, ignore_case, right_to_left, shifts }
    }

    pub fn literal(&self) -> &[char] {
        &self.literal
    }

    pub fn len(&self) -> usize {
        self.literal.len()
    }

    pub fn is_empty(&self) -> bool {
        self.literal.is_empty()
    }

    pub fn is_ignore_case(&self) -> bool {
        self.ignore_case
    }

    pub fn is_right_to_left(&self) -> bool {
        self.right_to_left
    }

    /// The shift for each character that occurs in the literal, sorted by
    /// character. Every other character shifts by the full length.
    pub fn shifts(&self) -> &[(char, usize)] {
        &self.shifts
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn forward_shifts() {
        let p = SkipPrefix::new("abcab", false, false);
        assert_eq!(&[('a', 1), ('b', 3), ('c', 2)], p.shifts());
    }

    #[test]
    fn reverse_shifts() {
        let p = SkipPrefix::new("abcab", false, true);
        assert_eq!(&[('a', 3), ('b', 1), ('c', 2)], p.shifts());
    }
}
