use crate::util::culture::Culture;

/// A literal search table for a matcher's start-position search.
///
/// Emitted matchers declare one as a `static` when every match begins with
/// a known literal. Searching uses the shift table to skip ahead by more
/// than one position after a mismatch.
#[derive(Clone, Copy, Debug)]
pub struct SkipTable {
    literal: &'static [char],
    shifts: &'static [(char, usize)],
    ignore_case: bool,
    right_to_left: bool,
    culture: Culture,
}

impl SkipTable {
    /// Create a table. `shifts` must be sorted by char, and a
    /// case-insensitive `literal` must already be lowered.
    pub const fn new(
        literal: &'static [char],
        shifts: &'static [(char, usize)],
        ignore_case: bool,
        right_to_left: bool,
        culture: Culture,
    ) -> SkipTable {
        SkipTable { literal, shifts, ignore_case, right_to_left, culture }
    }

    #[inline]
    fn fold(&self, ch: char) -> char {
        if self.ignore_case {
            self.culture.to_lower(ch)
        } else {
            ch
        }
    }

    #[inline]
    fn shift(&self, ch: char) -> usize {
        match self.shifts.binary_search_by_key(&ch, |&(c, _)| c) {
            Ok(i) => self.shifts[i].1,
            Err(_) => self.literal.len(),
        }
    }

    fn matches_at(&self, text: &[char], at: usize) -> bool {
        self.literal
            .iter()
            .zip(&text[at..])
            .all(|(&lit, &ch)| self.fold(ch) == lit)
    }

    /// Find the next place a match could start, searching from `pos`
    /// within `beg..end`.
    ///
    /// Searching forward, this is the start of the first occurrence at or
    /// after `pos`. Searching right-to-left, it is the end of the last
    /// occurrence that ends at or before `pos`.
    pub fn find(
        &self,
        text: &[char],
        beg: usize,
        pos: usize,
        end: usize,
    ) -> Option<usize> {
        let n = self.literal.len();
        if n == 0 {
            return Some(pos);
        }
        if self.right_to_left {
            let mut j = pos;
            while j >= beg + n {
                let at = j - n;
                if self.matches_at(text, at) {
                    return Some(j);
                }
                j -= self.shift(self.fold(text[at]));
            }
        } else {
            let mut i = pos;
            while i + n <= end {
                if self.matches_at(text, i) {
                    return Some(i);
                }
                i += self.shift(self.fold(text[i + n - 1]));
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chars(s: &str) -> Vec<char> {
        s.chars().collect()
    }

    const ABCAB: &[char] = &['a', 'b', 'c', 'a', 'b'];

    #[test]
    fn forward() {
        let t = SkipTable::new(
            ABCAB,
            &[('a', 1), ('b', 3), ('c', 2)],
            false,
            false,
            Culture::Invariant,
        );
        let text = chars("xxabcabcabyy");
        assert_eq!(Some(2), t.find(&text, 0, 0, text.len()));
        assert_eq!(Some(5), t.find(&text, 0, 3, text.len()));
        assert_eq!(None, t.find(&text, 0, 6, text.len()));
        assert_eq!(None, t.find(&text, 0, 0, 6));
    }

    #[test]
    fn backward() {
        let t = SkipTable::new(
            ABCAB,
            &[('a', 3), ('b', 1), ('c', 2)],
            false,
            true,
            Culture::Invariant,
        );
        let text = chars("xxabcabcabyy");
        assert_eq!(Some(10), t.find(&text, 0, 12, text.len()));
        assert_eq!(Some(7), t.find(&text, 0, 9, text.len()));
        assert_eq!(None, t.find(&text, 0, 6, text.len()));
    }

    #[test]
    fn ignore_case() {
        let t = SkipTable::new(
            &['o', 'k'],
            &[('o', 1)],
            true,
            false,
            Culture::Invariant,
        );
        let text = chars("sure, OK");
        assert_eq!(Some(6), t.find(&text, 0, 0, text.len()));
    }
}
