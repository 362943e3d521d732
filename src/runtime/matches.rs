use crate::runtime::{Matcher, Runner};

/// A single capture: the text one group matched on one occasion.
///
/// Offsets are counted in `char`s.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Capture {
    index: usize,
    length: usize,
    value: String,
}

impl Capture {
    pub fn index(&self) -> usize {
        self.index
    }

    pub fn len(&self) -> usize {
        self.length
    }

    pub fn is_empty(&self) -> bool {
        self.length == 0
    }

    pub fn end(&self) -> usize {
        self.index + self.length
    }

    pub fn as_str(&self) -> &str {
        &self.value
    }
}

/// A capture group of a match, with every capture it made.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Group {
    number: u32,
    name: &'static str,
    captures: Vec<Capture>,
}

impl Group {
    pub fn number(&self) -> u32 {
        self.number
    }

    /// The group's name, or its number when it has no explicit name.
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Returns true if the group captured anything in the match.
    pub fn is_success(&self) -> bool {
        !self.captures.is_empty()
    }

    /// The group's value: its last capture.
    pub fn get(&self) -> Option<&Capture> {
        self.captures.last()
    }

    /// The group's value as a string, or `""` if the group did not
    /// participate.
    pub fn as_str(&self) -> &str {
        self.get().map_or("", |c| c.as_str())
    }

    /// Every capture the group made, in order.
    pub fn captures(&self) -> &[Capture] {
        &self.captures
    }
}

/// A successful match and all of its groups.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Match {
    groups: Vec<Group>,
    text_pos: usize,
}

impl Match {
    /// Build a match from a runner whose slot `0` holds a capture.
    pub(crate) fn from_runner<M: Matcher + ?Sized>(
        matcher: &M,
        r: &mut Runner,
    ) -> Match {
        r.captures_mut().tidy();
        let numbers = matcher.capture_numbers();
        let names = matcher.group_names();
        let groups = numbers
            .iter()
            .enumerate()
            .map(|(slot, &number)| {
                let captures = r
                    .captures()
                    .history(slot)
                    .into_iter()
                    .map(|(index, length)| Capture {
                        index,
                        length,
                        value: r.text[index..index + length].iter().collect(),
                    })
                    .collect();
                Group {
                    number,
                    name: names.get(slot).copied().unwrap_or(""),
                    captures,
                }
            })
            .collect();
        Match { groups, text_pos: r.text_pos }
    }

    fn whole(&self) -> &Capture {
        // Slot 0 is the whole match, and a match always has a capture there.
        &self.groups[0].captures[self.groups[0].captures.len() - 1]
    }

    pub fn start(&self) -> usize {
        self.whole().index()
    }

    pub fn end(&self) -> usize {
        self.whole().end()
    }

    pub fn len(&self) -> usize {
        self.whole().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn as_str(&self) -> &str {
        self.whole().as_str()
    }

    /// Where the match routine stopped: the end of the match, or its start
    /// for a right-to-left pattern. The next search continues from here.
    pub fn text_pos(&self) -> usize {
        self.text_pos
    }

    /// All groups ordered by number, group `0` first.
    pub fn groups(&self) -> &[Group] {
        &self.groups
    }

    /// The group with the given number.
    pub fn group(&self, number: u32) -> Option<&Group> {
        self.groups.iter().find(|g| g.number == number)
    }

    /// The group with the given name.
    pub fn name(&self, name: &str) -> Option<&Group> {
        self.groups.iter().find(|g| g.name == name)
    }
}
