/*!
Capture bookkeeping for a running match.

Each slot keeps the full history of its captures as `(index, length)`
pairs. A balancing group does not delete a capture from the history.
Instead it appends an entry that refers back to the capture before the one
being balanced, so that undoing the balance on backtrack is just a matter
of dropping the last entry. References are encoded as negative numbers:
an entry whose index is `-3 - k` refers to the pair whose index lives at
position `k`. A length of `-2` marks a group that has been balanced down to
nothing.
*/

#[derive(Clone, Debug, Default)]
pub(crate) struct CaptureState {
    matches: Vec<Vec<isize>>,
    counts: Vec<usize>,
    balancing: bool,
}

impl CaptureState {
    pub(crate) fn new(slots: usize) -> CaptureState {
        CaptureState {
            matches: vec![vec![]; slots],
            counts: vec![0; slots],
            balancing: false,
        }
    }

    pub(crate) fn reset(&mut self) {
        for m in self.matches.iter_mut() {
            m.clear();
        }
        for c in self.counts.iter_mut() {
            *c = 0;
        }
        self.balancing = false;
    }

    pub(crate) fn count(&self, slot: usize) -> usize {
        self.counts.get(slot).copied().unwrap_or(0)
    }

    pub(crate) fn add(&mut self, slot: usize, index: isize, length: isize) {
        let at = self.counts[slot] * 2;
        let pairs = &mut self.matches[slot];
        pairs.truncate(at);
        pairs.push(index);
        pairs.push(length);
        self.counts[slot] += 1;
    }

    /// Balance away the most recent capture of `slot`.
    pub(crate) fn balance(&mut self, slot: usize) {
        self.balancing = true;
        let pairs = &self.matches[slot];
        let mut target = self.counts[slot] as isize * 2 - 2;
        // The last entry may itself be a reference, in which case start
        // from the capture it refers to.
        if pairs[target as usize] < 0 {
            target = -3 - pairs[target as usize];
        }
        target -= 2;
        if target >= 0 && pairs[target as usize] < 0 {
            let (index, length) =
                (pairs[target as usize], pairs[target as usize + 1]);
            self.add(slot, index, length);
        } else {
            self.add(slot, -3 - target, -4 - target);
        }
    }

    pub(crate) fn remove(&mut self, slot: usize) {
        self.counts[slot] -= 1;
    }

    pub(crate) fn is_matched(&self, slot: usize) -> bool {
        let count = self.count(slot);
        count > 0 && self.matches[slot][count * 2 - 1] != -2
    }

    pub(crate) fn index(&self, slot: usize) -> usize {
        let pairs = &self.matches[slot];
        let i = pairs[self.counts[slot] * 2 - 2];
        let i = if i >= 0 { i } else { pairs[(-3 - i) as usize] };
        i as usize
    }

    pub(crate) fn length(&self, slot: usize) -> usize {
        let pairs = &self.matches[slot];
        let i = pairs[self.counts[slot] * 2 - 1];
        let i = if i >= 0 { i } else { pairs[(-3 - i) as usize] };
        i as usize
    }

    /// Remove balanced entries, leaving each slot's history as the plain
    /// list of captures that survived.
    pub(crate) fn tidy(&mut self) {
        if !self.balancing {
            return;
        }
        for (slot, pairs) in self.matches.iter_mut().enumerate() {
            let limit = self.counts[slot] * 2;
            let mut i = 0;
            while i < limit && pairs[i] >= 0 {
                i += 1;
            }
            let mut j = i;
            while i < limit {
                if pairs[i] < 0 {
                    // A negative entry cancels the capture before it.
                    j -= 1;
                } else {
                    if i != j {
                        pairs[j] = pairs[i];
                    }
                    j += 1;
                }
                i += 1;
            }
            self.counts[slot] = j / 2;
        }
        self.balancing = false;
    }

    /// The surviving `(index, length)` captures of a slot, oldest first.
    /// Only meaningful after `tidy`.
    pub(crate) fn history(&self, slot: usize) -> Vec<(usize, usize)> {
        let pairs = &self.matches[slot];
        (0..self.counts[slot])
            .map(|k| (pairs[2 * k] as usize, pairs[2 * k + 1] as usize))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_and_remove() {
        let mut caps = CaptureState::new(2);
        assert!(!caps.is_matched(1));
        caps.add(1, 3, 2);
        caps.add(1, 7, 1);
        assert!(caps.is_matched(1));
        assert_eq!((7, 1), (caps.index(1), caps.length(1)));
        caps.remove(1);
        assert_eq!((3, 2), (caps.index(1), caps.length(1)));
        assert!(!caps.is_matched(5));
    }

    #[test]
    fn balancing_pops_captures() {
        let mut caps = CaptureState::new(2);
        caps.add(1, 0, 1);
        caps.add(1, 1, 1);
        caps.balance(1);
        // The group now reads as its first capture.
        assert!(caps.is_matched(1));
        assert_eq!((0, 1), (caps.index(1), caps.length(1)));
        caps.balance(1);
        assert!(!caps.is_matched(1));

        caps.tidy();
        assert_eq!(Vec::<(usize, usize)>::new(), caps.history(1));
    }

    #[test]
    fn tidy_keeps_unbalanced() {
        let mut caps = CaptureState::new(1);
        caps.add(0, 0, 1);
        caps.add(0, 1, 1);
        caps.balance(0);
        caps.add(0, 4, 2);
        caps.tidy();
        assert_eq!(vec![(0, 1), (4, 2)], caps.history(0));
    }
}
