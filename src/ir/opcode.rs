/*!
The opcodes of the flat instruction stream.

An instruction is an opcode word followed by a fixed number of operand
words. The opcode word may also carry the [`RTL`] and [`CI`] modifier bits,
which mark character-consuming instructions as matching right-to-left or
case-insensitively.
*/

/// Modifier bit: the instruction matches right-to-left.
pub const RTL: i32 = 64;
/// Modifier bit: the instruction compares case-insensitively.
pub const CI: i32 = 512;
/// Mask selecting the opcode proper from an opcode word.
pub const MASK: i32 = 63;

/// An instruction's opcode, without modifiers.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
#[repr(i32)]
pub enum Opcode {
    /// `ch, count`: exactly `count` occurrences of `ch`.
    Onerep = 0,
    /// `ch, count`: exactly `count` characters other than `ch`.
    Notonerep = 1,
    /// `class, count`: exactly `count` characters from a class.
    Setrep = 2,
    /// `ch, max`: greedily up to `max` occurrences of `ch`.
    Oneloop = 3,
    /// `ch, max`: greedily up to `max` characters other than `ch`.
    Notoneloop = 4,
    /// `class, max`: greedily up to `max` characters from a class.
    Setloop = 5,
    /// `ch, max`: lazily up to `max` occurrences of `ch`.
    Onelazy = 6,
    /// `ch, max`: lazily up to `max` characters other than `ch`.
    Notonelazy = 7,
    /// `class, max`: lazily up to `max` characters from a class.
    Setlazy = 8,
    /// `ch`
    One = 9,
    /// `ch`
    Notone = 10,
    /// `class`
    Set = 11,
    /// `string`
    Multi = 12,
    /// `slot`: a backreference.
    Ref = 13,
    Bol = 14,
    Eol = 15,
    Boundary = 16,
    Nonboundary = 17,
    Beginning = 18,
    Start = 19,
    EndZ = 20,
    End = 21,
    /// Always fails.
    Nothing = 22,
    /// `target`: continue, or jump to `target` on backtrack.
    Lazybranch = 23,
    /// `target`: loop back to `target` unless the last iteration was empty.
    Branchmark = 24,
    /// `target`: lazily loop back to `target`.
    Lazybranchmark = 25,
    /// `count`: push a zero-based iteration counter.
    Nullcount = 26,
    /// `count`: push an iteration counter starting at `count`.
    Setcount = 27,
    /// `target, limit`: counted greedy loop.
    Branchcount = 28,
    /// `target, limit`: counted lazy loop.
    Lazybranchcount = 29,
    /// Push a null mark.
    Nullmark = 30,
    /// Push the current position as a mark.
    Setmark = 31,
    /// `slot, uncapture`: capture from the last mark to here.
    Capturemark = 32,
    /// Pop a mark and move back to it.
    Getmark = 33,
    /// Save the track and capture depth for an atomic region.
    Setjump = 34,
    /// Fail out of an atomic region, restoring the saved depth.
    Backjump = 35,
    /// Commit an atomic region, discarding its backtrack state.
    Forejump = 36,
    /// `slot`: continue if the group has matched, else backtrack.
    Testref = 37,
    /// `target`
    Goto = 38,
    /// Successful end of the program.
    Stop = 40,
    EcmaBoundary = 41,
    NonEcmaBoundary = 42,
}

impl Opcode {
    /// Decode an opcode word, ignoring modifier bits.
    pub fn from_word(word: i32) -> Option<Opcode> {
        use self::Opcode::*;

        let op = match word & MASK {
            0 => Onerep,
            1 => Notonerep,
            2 => Setrep,
            3 => Oneloop,
            4 => Notoneloop,
            5 => Setloop,
            6 => Onelazy,
            7 => Notonelazy,
            8 => Setlazy,
            9 => One,
            10 => Notone,
            11 => Set,
            12 => Multi,
            13 => Ref,
            14 => Bol,
            15 => Eol,
            16 => Boundary,
            17 => Nonboundary,
            18 => Beginning,
            19 => Start,
            20 => EndZ,
            21 => End,
            22 => Nothing,
            23 => Lazybranch,
            24 => Branchmark,
            25 => Lazybranchmark,
            26 => Nullcount,
            27 => Setcount,
            28 => Branchcount,
            29 => Lazybranchcount,
            30 => Nullmark,
            31 => Setmark,
            32 => Capturemark,
            33 => Getmark,
            34 => Setjump,
            35 => Backjump,
            36 => Forejump,
            37 => Testref,
            38 => Goto,
            40 => Stop,
            41 => EcmaBoundary,
            42 => NonEcmaBoundary,
            _ => return None,
        };
        Some(op)
    }

    /// The instruction's total size in words, opcode included.
    pub fn size(self) -> usize {
        use self::Opcode::*;

        match self {
            Nothing | Bol | Eol | Boundary | Nonboundary | EcmaBoundary
            | NonEcmaBoundary | Beginning | Start | EndZ | End | Nullmark
            | Setmark | Getmark | Setjump | Backjump | Forejump | Stop => 1,
            One | Notone | Multi | Ref | Testref | Goto | Nullcount
            | Setcount | Lazybranch | Branchmark | Lazybranchmark | Set => 2,
            Capturemark | Branchcount | Lazybranchcount | Onerep
            | Notonerep | Oneloop | Notoneloop | Onelazy | Notonelazy
            | Setlazy | Setrep | Setloop => 3,
        }
    }

    /// Returns true if this instruction pushes backtracking state, and so
    /// may be resumed from the backtrack dispatcher.
    pub fn backtracks(self) -> bool {
        use self::Opcode::*;

        matches!(
            self,
            Oneloop
                | Notoneloop
                | Setloop
                | Onelazy
                | Notonelazy
                | Setlazy
                | Lazybranch
                | Branchmark
                | Lazybranchmark
                | Nullcount
                | Setcount
                | Branchcount
                | Lazybranchcount
                | Setmark
                | Capturemark
                | Getmark
                | Setjump
                | Backjump
                | Forejump
                | Goto
        )
    }

    pub fn as_word(self) -> i32 {
        self as i32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn words_round_trip() {
        for word in 0..64 {
            if let Some(op) = Opcode::from_word(word) {
                assert_eq!(word, op.as_word());
                assert_eq!(Some(op), Opcode::from_word(word | RTL | CI));
            }
        }
        assert_eq!(None, Opcode::from_word(39));
        assert_eq!(None, Opcode::from_word(43));
    }
}
