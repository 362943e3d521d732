use crate::runtime::captures::CaptureState;

/// The mutable state of one search, shared by a matcher's start-position
/// search and its match routine.
///
/// A runner owns three stacks:
///
/// * the track stack, holding backtrack tags along with whatever state
///   each resumption needs,
/// * the mark stack (`stack`), holding saved positions and loop counters,
/// * the crawl stack, recording which slot each capture was made in so
///   that captures can be undone in reverse order.
///
/// Positions are indices into `text`, counted in `char`s. Stack entries
/// are signed because marks and counters may be negative.
#[derive(Clone, Debug)]
pub struct Runner {
    /// The input.
    pub text: Vec<char>,
    /// The lowest position a match may touch.
    pub text_beg: usize,
    /// One past the highest position a match may touch.
    pub text_end: usize,
    /// Where the current search started. `\G` matches here.
    pub text_start: usize,
    /// The current position. The start-position search moves it to a
    /// candidate, and the match routine leaves it where the match ended.
    pub text_pos: usize,
    track: Vec<isize>,
    stack: Vec<isize>,
    crawl: Vec<usize>,
    captures: CaptureState,
    track_count: usize,
}

impl Runner {
    /// Create a runner over `text` for a matcher with the given number of
    /// capture slots and backtracking instructions.
    pub fn new(text: &str, slots: usize, track_count: usize) -> Runner {
        let text: Vec<char> = text.chars().collect();
        let end = text.len();
        Runner {
            text,
            text_beg: 0,
            text_end: end,
            text_start: 0,
            text_pos: 0,
            track: Vec::with_capacity(track_count * 8),
            stack: Vec::with_capacity(track_count * 8),
            crawl: Vec::with_capacity(16),
            captures: CaptureState::new(slots),
            track_count,
        }
    }

    /// Clear all stacks and captures before a match attempt.
    pub(crate) fn reset(&mut self) {
        self.track.clear();
        self.stack.clear();
        self.crawl.clear();
        self.captures.reset();
    }

    pub(crate) fn captures(&self) -> &CaptureState {
        &self.captures
    }

    pub(crate) fn captures_mut(&mut self) -> &mut CaptureState {
        &mut self.captures
    }

    /// Make room for at least one more pass over every backtracking
    /// instruction. Called before any backward jump.
    #[inline]
    pub fn ensure_storage(&mut self) {
        let room = self.track_count * 4 + 8;
        if self.track.capacity() - self.track.len() < room {
            self.track.reserve(room * 2);
        }
        if self.stack.capacity() - self.stack.len() < room {
            self.stack.reserve(room * 2);
        }
    }

    #[inline]
    pub fn track_push(&mut self, value: isize) {
        self.track.push(value);
    }

    /// Push `a`, then `b`. Popping yields `b` first.
    #[inline]
    pub fn track_push2(&mut self, a: isize, b: isize) {
        self.track.push(a);
        self.track.push(b);
    }

    #[inline]
    pub fn track_pop(&mut self) -> isize {
        match self.track.pop() {
            Some(value) => value,
            None => panic!("track stack underflow"),
        }
    }

    /// The depth of the track stack.
    #[inline]
    pub fn track_pos(&self) -> usize {
        self.track.len()
    }

    /// Discard track entries down to a saved depth.
    #[inline]
    pub fn track_to(&mut self, depth: usize) {
        self.track.truncate(depth);
    }

    #[inline]
    pub fn stack_push(&mut self, value: isize) {
        self.stack.push(value);
    }

    /// Push `a`, then `b`. Popping yields `b` first.
    #[inline]
    pub fn stack_push2(&mut self, a: isize, b: isize) {
        self.stack.push(a);
        self.stack.push(b);
    }

    #[inline]
    pub fn stack_pop(&mut self) -> isize {
        match self.stack.pop() {
            Some(value) => value,
            None => panic!("mark stack underflow"),
        }
    }

    /// The depth of the crawl stack.
    #[inline]
    pub fn crawl_pos(&self) -> usize {
        self.crawl.len()
    }

    /// Record a capture of `start..end` in `slot`. The bounds may be given
    /// in either order, as a right-to-left group ends before it starts.
    pub fn capture(&mut self, slot: usize, start: usize, end: usize) {
        let (start, end) = if end < start { (end, start) } else { (start, end) };
        self.crawl.push(slot);
        self.captures.add(slot, start as isize, (end - start) as isize);
    }

    /// Balance away the most recent capture of `uncapture`, and if `slot`
    /// is given, capture in it the text between the balanced capture and
    /// `start..end`. When the two overlap, that is their intersection.
    pub fn transfer_capture(
        &mut self,
        slot: Option<usize>,
        uncapture: usize,
        start: usize,
        end: usize,
    ) {
        let (mut start, mut end) =
            if end < start { (end, start) } else { (start, end) };
        let start2 = self.captures.index(uncapture);
        let end2 = start2 + self.captures.length(uncapture);
        // The new capture gets the innermost defined interval.
        if start >= end2 {
            end = start;
            start = end2;
        } else if end <= start2 {
            start = end;
            end = start2;
        } else {
            if end > end2 {
                end = end2;
            }
            if start2 > start {
                start = start2;
            }
        }
        self.crawl.push(uncapture);
        self.captures.balance(uncapture);
        if let Some(slot) = slot {
            self.crawl.push(slot);
            self.captures.add(slot, start as isize, (end - start) as isize);
        }
    }

    /// Undo the most recent capture.
    pub fn uncapture(&mut self) {
        match self.crawl.pop() {
            Some(slot) => self.captures.remove(slot),
            None => panic!("crawl stack underflow"),
        }
    }

    #[inline]
    pub fn is_matched(&self, slot: usize) -> bool {
        self.captures.is_matched(slot)
    }

    #[inline]
    pub fn match_index(&self, slot: usize) -> usize {
        self.captures.index(slot)
    }

    #[inline]
    pub fn match_length(&self, slot: usize) -> usize {
        self.captures.length(slot)
    }

    /// Returns true if `pos` lies between a word char and a non-word char.
    pub fn is_boundary(&self, pos: usize) -> bool {
        let before = pos > self.text_beg && is_word_char(self.text[pos - 1]);
        let after = pos < self.text_end && is_word_char(self.text[pos]);
        before != after
    }

    /// Like `is_boundary`, using the ECMAScript notion of a word char.
    pub fn is_ecma_boundary(&self, pos: usize) -> bool {
        let before =
            pos > self.text_beg && is_ecma_word_char(self.text[pos - 1]);
        let after = pos < self.text_end && is_ecma_word_char(self.text[pos]);
        before != after
    }
}

/// Returns true for `\w` chars, along with the zero-width joiner and
/// non-joiner, which never split a word.
pub fn is_word_char(ch: char) -> bool {
    regex_syntax::is_word_character(ch) || ch == '\u{200C}' || ch == '\u{200D}'
}

pub fn is_ecma_word_char(ch: char) -> bool {
    ch.is_ascii_alphanumeric() || ch == '_' || ch == '\u{130}' || ch == '\u{131}'
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stacks_pop_in_reverse() {
        let mut r = Runner::new("", 1, 1);
        r.track_push2(1, 2);
        assert_eq!(2, r.track_pop());
        assert_eq!(1, r.track_pop());
        r.stack_push2(-1, 5);
        assert_eq!(5, r.stack_pop());
        assert_eq!(-1, r.stack_pop());
    }

    #[test]
    fn capture_orders_bounds() {
        let mut r = Runner::new("abcdef", 2, 1);
        r.capture(1, 4, 2);
        assert!(r.is_matched(1));
        assert_eq!((2, 2), (r.match_index(1), r.match_length(1)));
        assert_eq!(1, r.crawl_pos());
        r.uncapture();
        assert!(!r.is_matched(1));
    }

    #[test]
    fn transfer_takes_inner_interval() {
        // Group 1 captured "b" at 1..2 and the balancing group ends at 5.
        let mut r = Runner::new("abcdef", 3, 1);
        r.capture(1, 1, 2);
        r.transfer_capture(Some(2), 1, 4, 5);
        assert!(!r.is_matched(1));
        assert_eq!((2, 2), (r.match_index(2), r.match_length(2)));
        assert_eq!(3, r.crawl_pos());
        r.uncapture();
        r.uncapture();
        assert!(r.is_matched(1));
        assert!(!r.is_matched(2));
    }

    #[test]
    fn transfer_from_a_later_capture() {
        // Group 1 captured "c" at 2..3 and the balancing group matched "a"
        // at 0..1, so the new capture is the "b" between them.
        let mut r = Runner::new("abc", 3, 1);
        r.capture(1, 2, 3);
        r.transfer_capture(Some(2), 1, 1, 0);
        assert!(!r.is_matched(1));
        assert_eq!((1, 1), (r.match_index(2), r.match_length(2)));

        // Adjacent captures leave an empty one.
        let mut r = Runner::new("ab", 3, 1);
        r.capture(1, 1, 2);
        r.transfer_capture(Some(2), 1, 0, 1);
        assert_eq!((1, 0), (r.match_index(2), r.match_length(2)));
    }

    #[test]
    fn boundaries() {
        let r = Runner::new("ab cd", 1, 1);
        assert!(r.is_boundary(0));
        assert!(!r.is_boundary(1));
        assert!(r.is_boundary(2));
        assert!(r.is_boundary(5));
        let r = Runner::new("é", 1, 1);
        assert!(r.is_boundary(0));
        assert!(!r.is_ecma_boundary(0));
    }
}
