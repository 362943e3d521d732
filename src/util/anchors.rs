/// A zero-width positional assertion that may anchor where a match starts.
///
/// Anchors are derived from the leading elements of a pattern. A matcher's
/// start-position search consults them to reject or clamp a candidate
/// starting offset before running the full match routine.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Anchor {
    /// `\A` or `^` without multiline: the beginning of the input.
    Beginning = 1 << 0,
    /// `^` with multiline: the beginning of a line.
    Bol = 1 << 1,
    /// `\G`: the position where the current search started.
    Start = 1 << 2,
    /// `$` with multiline: the end of a line.
    Eol = 1 << 3,
    /// `\Z` or `$` without multiline: the end of the input, or just before
    /// a final `\n`.
    EndZ = 1 << 4,
    /// `\z`: the end of the input.
    End = 1 << 5,
    /// `\b`: a word boundary.
    Boundary = 1 << 6,
    /// `\b` in ECMAScript mode: an ASCII word boundary.
    EcmaBoundary = 1 << 7,
}

impl Anchor {
    const COUNT: usize = 8;

    #[inline]
    pub const fn from_index(index: usize) -> Option<Anchor> {
        if index < Anchor::COUNT {
            Some(Anchor::from_index_unchecked(index))
        } else {
            None
        }
    }

    #[inline]
    const fn from_index_unchecked(index: usize) -> Anchor {
        const BY_INDEX: [Anchor; Anchor::COUNT] = [
            Anchor::Beginning,
            Anchor::Bol,
            Anchor::Start,
            Anchor::Eol,
            Anchor::EndZ,
            Anchor::End,
            Anchor::Boundary,
            Anchor::EcmaBoundary,
        ];
        BY_INDEX[index]
    }

    /// Return the underlying bit for this anchor.
    #[inline]
    pub const fn as_repr(self) -> u8 {
        self as u8
    }

    #[inline]
    pub const fn as_char(self) -> char {
        match self {
            Anchor::Beginning => 'A',
            Anchor::Bol => '^',
            Anchor::Start => 'G',
            Anchor::Eol => '$',
            Anchor::EndZ => 'Z',
            Anchor::End => 'z',
            Anchor::Boundary => 'b',
            Anchor::EcmaBoundary => 'e',
        }
    }
}

/// A memory-efficient set of anchors.
///
/// Sets are immutable values: `insert` and `remove` return new sets.
#[derive(Clone, Copy, Default, Eq, Hash, PartialEq)]
pub struct AnchorSet {
    bits: u8,
}

impl AnchorSet {
    /// The anchors that a start-position search open-codes. Other anchors
    /// are only checked by the match routine itself.
    pub const POSITIONAL: AnchorSet = AnchorSet {
        bits: Anchor::Beginning.as_repr()
            | Anchor::Start.as_repr()
            | Anchor::EndZ.as_repr()
            | Anchor::End.as_repr(),
    };

    #[inline]
    pub const fn empty() -> AnchorSet {
        AnchorSet { bits: 0 }
    }

    /// Return an anchor set from its representation.
    #[inline]
    pub const fn from_repr(repr: u8) -> AnchorSet {
        AnchorSet { bits: repr }
    }

    /// Return the internal byte representation of this set.
    #[inline]
    pub const fn to_repr(self) -> u8 {
        self.bits
    }

    #[inline]
    pub const fn is_empty(self) -> bool {
        self.bits == 0
    }

    #[inline]
    pub const fn len(self) -> usize {
        self.bits.count_ones() as usize
    }

    #[inline]
    pub const fn insert(self, anchor: Anchor) -> AnchorSet {
        AnchorSet { bits: self.bits | anchor.as_repr() }
    }

    #[inline]
    pub const fn remove(self, anchor: Anchor) -> AnchorSet {
        AnchorSet { bits: self.bits & !anchor.as_repr() }
    }

    #[inline]
    pub const fn contains(self, anchor: Anchor) -> bool {
        anchor.as_repr() & self.bits != 0
    }

    #[inline]
    pub const fn union(self, other: AnchorSet) -> AnchorSet {
        AnchorSet { bits: self.bits | other.bits }
    }

    #[inline]
    pub const fn intersect(self, other: AnchorSet) -> AnchorSet {
        AnchorSet { bits: self.bits & other.bits }
    }

    /// Return the subset of this set that the start-position search
    /// handles.
    #[inline]
    pub const fn positional(self) -> AnchorSet {
        self.intersect(AnchorSet::POSITIONAL)
    }

    #[inline]
    pub const fn iter(self) -> AnchorSetIter {
        AnchorSetIter { set: self }
    }
}

impl core::fmt::Debug for AnchorSet {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        write!(f, "AnchorSet(")?;
        for anchor in self.iter() {
            write!(f, "{}", anchor.as_char())?;
        }
        write!(f, ")")
    }
}

/// An iterator over all anchors in an [`AnchorSet`].
#[derive(Clone, Debug)]
pub struct AnchorSetIter {
    set: AnchorSet,
}

impl Iterator for AnchorSetIter {
    type Item = Anchor;

    #[inline]
    fn next(&mut self) -> Option<Anchor> {
        let index = self.set.bits.trailing_zeros() as usize;
        let anchor = Anchor::from_index(index)?;
        self.set = self.set.remove(anchor);
        Some(anchor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insert_remove_iter() {
        let set = AnchorSet::empty()
            .insert(Anchor::EndZ)
            .insert(Anchor::Beginning)
            .insert(Anchor::Boundary);
        assert_eq!(3, set.len());
        assert!(set.contains(Anchor::EndZ));
        assert!(!set.contains(Anchor::End));
        let got: Vec<Anchor> = set.iter().collect();
        assert_eq!(
            vec![Anchor::Beginning, Anchor::EndZ, Anchor::Boundary],
            got
        );
        assert!(set.remove(Anchor::Boundary).positional() == set.positional());
        assert_eq!("AnchorSet(AZb)", format!("{:?}", set));
    }

    #[test]
    fn positional_subset() {
        let set = AnchorSet::empty()
            .insert(Anchor::Bol)
            .insert(Anchor::Eol)
            .insert(Anchor::EcmaBoundary);
        assert!(set.positional().is_empty());
        let set = set.insert(Anchor::Start);
        assert_eq!(
            AnchorSet::empty().insert(Anchor::Start),
            set.positional()
        );
    }
}
