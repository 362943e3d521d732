use std::collections::BTreeMap;

/// The capture groups declared by a pattern.
///
/// Numbers map to the offset (in `char`s) of the parenthesis that first
/// declared them. Names map to the number they were assigned. Named groups
/// are numbered after every explicitly or implicitly numbered group, in
/// the order the names first appear, filling any gaps left by explicit
/// numbering. Number `0` is always present and stands for the whole match.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct CaptureTable {
    offsets: BTreeMap<u32, usize>,
    names: BTreeMap<String, u32>,
    /// Names in declaration order along with their first-use offset. Only
    /// populated until names are assigned numbers.
    pending: Vec<(String, usize)>,
    top: u32,
}

impl CaptureTable {
    pub(crate) fn new() -> CaptureTable {
        CaptureTable::default()
    }

    /// Record a use of `number` at `offset`, keeping the first.
    pub(crate) fn note_number(&mut self, number: u32, offset: usize) {
        if self.offsets.contains_key(&number) {
            return;
        }
        self.offsets.insert(number, offset);
        if self.top <= number {
            self.top = number.saturating_add(1);
        }
    }

    /// Record a use of `name` at `offset`, keeping the first.
    pub(crate) fn note_name(&mut self, name: &str, offset: usize) {
        if self.pending.iter().any(|(n, _)| n == name) {
            return;
        }
        self.pending.push((name.to_string(), offset));
    }

    /// Give every pending name the next unused number, starting at `next`.
    pub(crate) fn assign_names(&mut self, mut next: u32) {
        for (name, offset) in core::mem::replace(&mut self.pending, vec![]) {
            while self.offsets.contains_key(&next) {
                next += 1;
            }
            self.names.insert(name, next);
            self.note_number(next, offset);
            next += 1;
        }
    }

    /// The number of capture groups, including group `0`.
    pub fn len(&self) -> usize {
        self.offsets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.offsets.is_empty()
    }

    /// One more than the largest capture number.
    pub fn top(&self) -> u32 {
        self.top
    }

    /// Returns true when capture numbers are exactly `0..len`.
    pub fn is_dense(&self) -> bool {
        self.top as usize == self.offsets.len()
    }

    pub fn contains(&self, number: u32) -> bool {
        self.offsets.contains_key(&number)
    }

    /// All capture numbers in ascending order.
    pub fn numbers(&self) -> impl Iterator<Item = u32> + '_ {
        self.offsets.keys().copied()
    }

    /// The offset of the parenthesis that first declared `number`.
    pub fn offset(&self, number: u32) -> Option<usize> {
        self.offsets.get(&number).copied()
    }

    /// The number assigned to a named group.
    pub fn number_of(&self, name: &str) -> Option<u32> {
        self.names.get(name).copied()
    }

    /// The explicit name of a group, if it has one.
    pub fn name_of(&self, number: u32) -> Option<&str> {
        self.names
            .iter()
            .find(|&(_, &n)| n == number)
            .map(|(name, _)| name.as_str())
    }

    /// Every explicit name with its number, ordered by number.
    pub fn names(&self) -> Vec<(&str, u32)> {
        let mut names: Vec<(&str, u32)> =
            self.names.iter().map(|(k, &v)| (k.as_str(), v)).collect();
        names.sort_by_key(|&(_, n)| n);
        names
    }

    /// The display name of every group, ordered by number. Unnamed groups
    /// are named by their number.
    pub fn group_names(&self) -> Vec<String> {
        self.numbers()
            .map(|n| match self.name_of(n) {
                Some(name) => name.to_string(),
                None => n.to_string(),
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_fill_gaps() {
        let mut caps = CaptureTable::new();
        caps.note_number(0, 0);
        caps.note_number(1, 0);
        caps.note_number(3, 5);
        caps.note_name("x", 10);
        caps.note_name("y", 20);
        caps.note_name("x", 30);
        caps.assign_names(2);
        assert_eq!(Some(2), caps.number_of("x"));
        assert_eq!(Some(4), caps.number_of("y"));
        assert_eq!(Some(10), caps.offset(2));
        assert_eq!(5, caps.top());
        assert!(caps.is_dense());
        assert_eq!(vec!["0", "1", "x", "3", "y"], caps.group_names());
    }

    #[test]
    fn sparse_numbers() {
        let mut caps = CaptureTable::new();
        caps.note_number(0, 0);
        caps.note_number(7, 0);
        caps.assign_names(1);
        assert!(!caps.is_dense());
        assert_eq!(vec![0, 7], caps.numbers().collect::<Vec<_>>());
        assert_eq!(None, caps.name_of(7));
    }
}
