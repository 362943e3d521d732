/*!
The runtime that emitted matchers are compiled against.

An emitted matcher is a unit struct implementing [`Matcher`]. It supplies a
start-position search and a match routine, both operating on a [`Runner`].
The functions in this module drive the two in the usual scan loop: search
for a candidate start, run the match routine there, and on failure bump the
position by one and search again.

# Example

A matcher is normally generated, but nothing stops one from being written
by hand. This one matches a single `a`:

```
use regex_emit::runtime::{self, Matcher, Runner};

struct A;

impl Matcher for A {
    fn find_first_char(&self, r: &mut Runner) -> bool {
        while r.text_pos < r.text_end {
            if r.text[r.text_pos] == 'a' {
                return true;
            }
            r.text_pos += 1;
        }
        false
    }

    fn go(&self, r: &mut Runner) {
        let pos = r.text_pos;
        if pos < r.text_end && r.text[pos] == 'a' {
            r.capture(0, pos, pos + 1);
            r.text_pos = pos + 1;
        }
    }

    fn track_count(&self) -> usize { 0 }
    fn capture_numbers(&self) -> &'static [u32] { &[0] }
    fn group_names(&self) -> &'static [&'static str] { &["0"] }
    fn right_to_left(&self) -> bool { false }
}

let m = runtime::find(&A, "xxa").unwrap();
assert_eq!((2, 3), (m.start(), m.end()));
let all: Vec<usize> = runtime::find_iter(&A, "aba").map(|m| m.start()).collect();
assert_eq!(vec![0, 2], all);
```
*/

pub use crate::util::culture::Culture;

pub use self::{
    matches::{Capture, Group, Match},
    runner::{is_ecma_word_char, is_word_char, Runner},
    skip::SkipTable,
};

mod captures;
mod matches;
mod runner;
mod skip;

/// A compiled pattern.
pub trait Matcher {
    /// Move `r.text_pos` to the next position where a match could start,
    /// returning false if there is none.
    fn find_first_char(&self, r: &mut Runner) -> bool;

    /// Attempt a match at `r.text_pos`. On success, capture slot `0` holds
    /// the match and `r.text_pos` is where matching stopped.
    fn go(&self, r: &mut Runner);

    /// The number of backtracking instructions, used to size the stacks.
    fn track_count(&self) -> usize;

    /// The capture number of each slot, ascending.
    fn capture_numbers(&self) -> &'static [u32];

    /// The name of each slot. Unnamed groups are named by their number.
    fn group_names(&self) -> &'static [&'static str];

    /// Returns true if the pattern matches right-to-left.
    fn right_to_left(&self) -> bool;
}

/// Returns true if `ch` is in the class given by sorted, non-overlapping
/// inclusive ranges.
#[inline]
pub fn char_in_class(ch: char, class: &[(char, char)]) -> bool {
    class
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

/// Find the first match in `text`. A right-to-left matcher finds the last
/// one instead.
pub fn find<M: Matcher + ?Sized>(matcher: &M, text: &str) -> Option<Match> {
    let mut r = runner_for(matcher, text);
    let start = if matcher.right_to_left() { r.text_end } else { 0 };
    scan(matcher, &mut r, start, None)
}

/// Find the first match starting the search at char offset `start`.
///
/// # Panics
///
/// When `start` is greater than the number of chars in `text`.
pub fn find_at<M: Matcher + ?Sized>(
    matcher: &M,
    text: &str,
    start: usize,
) -> Option<Match> {
    let mut r = runner_for(matcher, text);
    assert!(start <= r.text_end, "start {} is past the end of the text", start);
    scan(matcher, &mut r, start, None)
}

/// Returns true if `matcher` matches anywhere in `text`.
pub fn is_match<M: Matcher + ?Sized>(matcher: &M, text: &str) -> bool {
    find(matcher, text).is_some()
}

/// Iterate over successive non-overlapping matches.
pub fn find_iter<'m, M: Matcher + ?Sized>(
    matcher: &'m M,
    text: &str,
) -> FindIter<'m, M> {
    let r = runner_for(matcher, text);
    let next = if matcher.right_to_left() { r.text_end } else { 0 };
    FindIter { matcher, runner: r, next, prev_len: None, done: false }
}

/// An iterator over matches, created by [`find_iter`].
#[derive(Debug)]
pub struct FindIter<'m, M: ?Sized> {
    matcher: &'m M,
    runner: Runner,
    next: usize,
    prev_len: Option<usize>,
    done: bool,
}

impl<'m, M: Matcher + ?Sized> Iterator for FindIter<'m, M> {
    type Item = Match;

    fn next(&mut self) -> Option<Match> {
        if self.done {
            return None;
        }
        match scan(self.matcher, &mut self.runner, self.next, self.prev_len) {
            None => {
                self.done = true;
                None
            }
            Some(m) => {
                self.next = m.text_pos();
                self.prev_len = Some(m.len());
                Some(m)
            }
        }
    }
}

fn runner_for<M: Matcher + ?Sized>(matcher: &M, text: &str) -> Runner {
    Runner::new(text, matcher.capture_numbers().len(), matcher.track_count())
}

/// The scan loop. `prev_len` is the length of the previous match when
/// continuing an iteration, so that an empty match is not found twice.
fn scan<M: Matcher + ?Sized>(
    matcher: &M,
    r: &mut Runner,
    start: usize,
    prev_len: Option<usize>,
) -> Option<Match> {
    let rtl = matcher.right_to_left();
    let stop = if rtl { r.text_beg } else { r.text_end };
    r.text_start = start;
    r.text_pos = start;
    if prev_len == Some(0) {
        if r.text_pos == stop {
            return None;
        }
        bump(r, rtl);
    }
    loop {
        if matcher.find_first_char(r) {
            r.reset();
            matcher.go(r);
            if r.captures().count(0) > 0 {
                return Some(Match::from_runner(matcher, r));
            }
        }
        if r.text_pos == stop {
            return None;
        }
        bump(r, rtl);
    }
}

#[inline]
fn bump(r: &mut Runner, rtl: bool) {
    if rtl {
        r.text_pos -= 1;
    } else {
        r.text_pos += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn class_membership() {
        let class = &[('0', '9'), ('a', 'f'), ('x', 'x')];
        assert!(char_in_class('0', class));
        assert!(char_in_class('c', class));
        assert!(char_in_class('x', class));
        assert!(!char_in_class('g', class));
        assert!(!char_in_class('/', class));
        assert!(!char_in_class('a', &[]));
    }
}
