/*!
The flat instruction stream that sits between the parser and the compiler.

A [`Code`] is the raw form: a vector of integer words in which every
instruction is an opcode word followed by its operands, plus the tables
and metadata the instructions refer to. [`Program::new`] validates a `Code`
and decodes it into [`Operation`]s, which is what the compiler consumes.

The usual way to get a program is [`Program::from_ast`], which lowers a
parsed pattern and runs the anchor and prefix analyses over it.
*/

use core::convert::TryFrom;

use crate::{
    syntax::{Ast, CharClass},
    util::{anchors::AnchorSet, culture::Culture},
};

pub use self::{
    opcode::{Opcode, CI, MASK, RTL},
    prefix::{FirstChars, SkipPrefix},
};

pub mod analysis;
mod opcode;
mod prefix;
mod writer;

/// The raw, unvalidated form of a program.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Code {
    /// The instruction words.
    pub codes: Vec<i32>,
    /// Literal strings referenced by `Multi`.
    pub strings: Vec<String>,
    /// Classes referenced by `Set`, `Setrep`, `Setloop` and `Setlazy`.
    pub classes: Vec<CharClass>,
    /// Anchors that every match starts with, in matching order.
    pub leading_anchors: AnchorSet,
    /// Anchors that every match ends with, in matching order.
    pub trailing_anchors: AnchorSet,
    pub first_chars: Option<FirstChars>,
    pub skip: Option<SkipPrefix>,
    /// The number of backtracking instructions.
    pub track_count: usize,
    /// The capture number stored in each slot, ascending.
    pub capture_numbers: Vec<u32>,
    /// Every explicitly named group along with its number.
    pub capture_names: Vec<(String, u32)>,
    pub right_to_left: bool,
    pub ecmascript: bool,
    pub culture: Culture,
}

/// A validated and decoded program.
#[derive(Clone, Debug)]
pub struct Program {
    code: Code,
    operations: Vec<Operation>,
}

impl Program {
    /// Validate a raw program and decode its instructions.
    pub fn new(code: Code) -> Result<Program, ProgramError> {
        let operations = decode(&code)?;
        Ok(Program { code, operations })
    }

    /// Lower a parsed pattern into a program.
    pub fn from_ast(ast: &Ast) -> Program {
        let code = writer::lower(ast);
        match Program::new(code) {
            Ok(program) => program,
            // Lowering only refers to tables it builds itself.
            Err(err) => panic!("lowering produced an invalid program: {}", err),
        }
    }

    pub fn code(&self) -> &Code {
        &self.code
    }

    pub fn operations(&self) -> &[Operation] {
        &self.operations
    }

    pub fn operation(&self, id: usize) -> &Operation {
        &self.operations[id]
    }

    pub fn string(&self, index: usize) -> &str {
        &self.code.strings[index]
    }

    pub fn class(&self, index: usize) -> &CharClass {
        &self.code.classes[index]
    }

    pub fn classes(&self) -> &[CharClass] {
        &self.code.classes
    }

    /// All anchors found at either end of the pattern.
    pub fn anchors(&self) -> AnchorSet {
        self.code.leading_anchors.union(self.code.trailing_anchors)
    }

    /// The anchors that must hold where a match starts.
    pub fn leading_anchors(&self) -> AnchorSet {
        self.code.leading_anchors
    }

    pub fn first_chars(&self) -> Option<&FirstChars> {
        self.code.first_chars.as_ref()
    }

    pub fn skip(&self) -> Option<&SkipPrefix> {
        self.code.skip.as_ref()
    }

    pub fn track_count(&self) -> usize {
        self.code.track_count
    }

    /// The number of capture slots.
    pub fn capture_slots(&self) -> usize {
        self.code.capture_numbers.len()
    }

    pub fn capture_numbers(&self) -> &[u32] {
        &self.code.capture_numbers
    }

    /// The display name of each slot: the group's explicit name, or else
    /// its number.
    pub fn group_names(&self) -> Vec<String> {
        self.code
            .capture_numbers
            .iter()
            .map(|&n| {
                match self.code.capture_names.iter().find(|&(_, m)| *m == n) {
                    Some((name, _)) => name.clone(),
                    None => n.to_string(),
                }
            })
            .collect()
    }

    pub fn is_right_to_left(&self) -> bool {
        self.code.right_to_left
    }

    pub fn is_ecmascript(&self) -> bool {
        self.code.ecmascript
    }

    pub fn culture(&self) -> Culture {
        self.code.culture
    }
}

/// A decoded instruction.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Operation {
    id: usize,
    offset: usize,
    op: Op,
    right_to_left: bool,
    ignore_case: bool,
}

impl Operation {
    /// The dense index of this operation.
    pub fn id(&self) -> usize {
        self.id
    }

    /// The word offset of this operation in its code.
    pub fn offset(&self) -> usize {
        self.offset
    }

    pub fn op(&self) -> &Op {
        &self.op
    }

    pub fn opcode(&self) -> Opcode {
        self.op.opcode()
    }

    pub fn is_right_to_left(&self) -> bool {
        self.right_to_left
    }

    pub fn is_ignore_case(&self) -> bool {
        self.ignore_case
    }
}

/// An instruction's opcode with its decoded operands.
///
/// Jump targets are operation ids, not word offsets. Class and string
/// operands index the program's tables. Capture operands are slots.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Op {
    Onerep { ch: char, count: u32 },
    Notonerep { ch: char, count: u32 },
    Setrep { class: usize, count: u32 },
    Oneloop { ch: char, max: u32 },
    Notoneloop { ch: char, max: u32 },
    Setloop { class: usize, max: u32 },
    Onelazy { ch: char, max: u32 },
    Notonelazy { ch: char, max: u32 },
    Setlazy { class: usize, max: u32 },
    One(char),
    Notone(char),
    Set(usize),
    Multi(usize),
    Ref(usize),
    Bol,
    Eol,
    Boundary,
    Nonboundary,
    Beginning,
    Start,
    EndZ,
    End,
    Nothing,
    Lazybranch(usize),
    Branchmark(usize),
    Lazybranchmark(usize),
    Nullcount(i32),
    Setcount(i32),
    Branchcount { target: usize, limit: u32 },
    Lazybranchcount { target: usize, limit: u32 },
    Nullmark,
    Setmark,
    Capturemark { slot: Option<usize>, uncapture: Option<usize> },
    Getmark,
    Setjump,
    Backjump,
    Forejump,
    Testref(usize),
    Goto(usize),
    Stop,
    EcmaBoundary,
    NonEcmaBoundary,
}

impl Op {
    pub fn opcode(&self) -> Opcode {
        match *self {
            Op::Onerep { .. } => Opcode::Onerep,
            Op::Notonerep { .. } => Opcode::Notonerep,
            Op::Setrep { .. } => Opcode::Setrep,
            Op::Oneloop { .. } => Opcode::Oneloop,
            Op::Notoneloop { .. } => Opcode::Notoneloop,
            Op::Setloop { .. } => Opcode::Setloop,
            Op::Onelazy { .. } => Opcode::Onelazy,
            Op::Notonelazy { .. } => Opcode::Notonelazy,
            Op::Setlazy { .. } => Opcode::Setlazy,
            Op::One(_) => Opcode::One,
            Op::Notone(_) => Opcode::Notone,
            Op::Set(_) => Opcode::Set,
            Op::Multi(_) => Opcode::Multi,
            Op::Ref(_) => Opcode::Ref,
            Op::Bol => Opcode::Bol,
            Op::Eol => Opcode::Eol,
            Op::Boundary => Opcode::Boundary,
            Op::Nonboundary => Opcode::Nonboundary,
            Op::Beginning => Opcode::Beginning,
            Op::Start => Opcode::Start,
            Op::EndZ => Opcode::EndZ,
            Op::End => Opcode::End,
            Op::Nothing => Opcode::Nothing,
            Op::Lazybranch(_) => Opcode::Lazybranch,
            Op::Branchmark(_) => Opcode::Branchmark,
            Op::Lazybranchmark(_) => Opcode::Lazybranchmark,
            Op::Nullcount(_) => Opcode::Nullcount,
            Op::Setcount(_) => Opcode::Setcount,
            Op::Branchcount { .. } => Opcode::Branchcount,
            Op::Lazybranchcount { .. } => Opcode::Lazybranchcount,
            Op::Nullmark => Opcode::Nullmark,
            Op::Setmark => Opcode::Setmark,
            Op::Capturemark { .. } => Opcode::Capturemark,
            Op::Getmark => Opcode::Getmark,
            Op::Setjump => Opcode::Setjump,
            Op::Backjump => Opcode::Backjump,
            Op::Forejump => Opcode::Forejump,
            Op::Testref(_) => Opcode::Testref,
            Op::Goto(_) => Opcode::Goto,
            Op::Stop => Opcode::Stop,
            Op::EcmaBoundary => Opcode::EcmaBoundary,
            Op::NonEcmaBoundary => Opcode::NonEcmaBoundary,
        }
    }

    /// The jump target of this instruction, if it has one.
    pub fn target(&self) -> Option<usize> {
        match *self {
            Op::Lazybranch(t)
            | Op::Branchmark(t)
            | Op::Lazybranchmark(t)
            | Op::Goto(t)
            | Op::Branchcount { target: t, .. }
            | Op::Lazybranchcount { target: t, .. } => Some(t),
            _ => None,
        }
    }
}

/// An error that occurs when a raw program violates the instruction
/// stream's contract.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ProgramError {
    kind: ProgramErrorKind,
}

/// The kind of a [`ProgramError`]. Offsets are word offsets of the
/// offending instruction.
#[derive(Clone, Debug, Eq, PartialEq)]
#[non_exhaustive]
pub enum ProgramErrorKind {
    Empty,
    UnknownOpcode { offset: usize, word: i32 },
    Truncated { offset: usize },
    BadTarget { offset: usize, target: i32 },
    BadChar { offset: usize, word: i32 },
    NegativeCount { offset: usize, count: i32 },
    StringIndex { offset: usize, index: i32 },
    ClassIndex { offset: usize, index: i32 },
    SlotIndex { offset: usize, slot: i32 },
}

impl ProgramError {
    fn new(kind: ProgramErrorKind) -> ProgramError {
        ProgramError { kind }
    }

    pub fn kind(&self) -> &ProgramErrorKind {
        &self.kind
    }
}

impl std::error::Error for ProgramError {}

impl core::fmt::Display for ProgramError {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        use self::ProgramErrorKind::*;

        match self.kind {
            Empty => write!(f, "program has no instructions"),
            UnknownOpcode { offset, word } => {
                write!(f, "unknown opcode word {} at offset {}", word, offset)
            }
            Truncated { offset } => {
                write!(f, "instruction at offset {} is truncated", offset)
            }
            BadTarget { offset, target } => write!(
                f,
                "jump at offset {} targets {}, which is not an instruction",
                offset, target,
            ),
            BadChar { offset, word } => write!(
                f,
                "operand {} at offset {} is not a character",
                word, offset,
            ),
            NegativeCount { offset, count } => {
                write!(f, "negative count {} at offset {}", count, offset)
            }
            StringIndex { offset, index } => write!(
                f,
                "string index {} at offset {} is out of range",
                index, offset,
            ),
            ClassIndex { offset, index } => write!(
                f,
                "class index {} at offset {} is out of range",
                index, offset,
            ),
            SlotIndex { offset, slot } => write!(
                f,
                "capture slot {} at offset {} is out of range",
                slot, offset,
            ),
        }
    }
}

/// Split the code into instructions, then decode each one.
fn decode(code: &Code) -> Result<Vec<Operation>, ProgramError> {
    let codes = &code.codes;
    if codes.is_empty() {
        return Err(ProgramError::new(ProgramErrorKind::Empty));
    }
    let mut starts = vec![];
    let mut offset = 0;
    while offset < codes.len() {
        let word = codes[offset];
        let unknown = ProgramErrorKind::UnknownOpcode { offset, word };
        if word < 0 || word & !(MASK | RTL | CI) != 0 {
            return Err(ProgramError::new(unknown));
        }
        let opcode = match Opcode::from_word(word) {
            Some(opcode) => opcode,
            None => return Err(ProgramError::new(unknown)),
        };
        if offset + opcode.size() > codes.len() {
            return Err(ProgramError::new(ProgramErrorKind::Truncated {
                offset,
            }));
        }
        starts.push((offset, opcode));
        offset += opcode.size();
    }

    let mut ops = Vec::with_capacity(starts.len());
    for (id, &(offset, opcode)) in starts.iter().enumerate() {
        let d = Decoder { code, starts: &starts, offset };
        let word = codes[offset];
        let op = d.op(opcode)?;
        ops.push(Operation {
            id,
            offset,
            op,
            right_to_left: word & RTL != 0,
            ignore_case: word & CI != 0,
        });
    }
    Ok(ops)
}

struct Decoder<'a> {
    code: &'a Code,
    starts: &'a [(usize, Opcode)],
    offset: usize,
}

impl<'a> Decoder<'a> {
    fn operand(&self, i: usize) -> i32 {
        self.code.codes[self.offset + 1 + i]
    }

    fn err(&self, kind: ProgramErrorKind) -> ProgramError {
        ProgramError::new(kind)
    }

    fn ch(&self, i: usize) -> Result<char, ProgramError> {
        let word = self.operand(i);
        u32::try_from(word)
            .ok()
            .and_then(char::from_u32)
            .ok_or_else(|| {
                self.err(ProgramErrorKind::BadChar { offset: self.offset, word })
            })
    }

    fn count(&self, i: usize) -> Result<u32, ProgramError> {
        let count = self.operand(i);
        u32::try_from(count).map_err(|_| {
            self.err(ProgramErrorKind::NegativeCount {
                offset: self.offset,
                count,
            })
        })
    }

    fn target(&self, i: usize) -> Result<usize, ProgramError> {
        let target = self.operand(i);
        usize::try_from(target)
            .ok()
            .and_then(|t| self.starts.binary_search_by_key(&t, |s| s.0).ok())
            .ok_or_else(|| {
                self.err(ProgramErrorKind::BadTarget {
                    offset: self.offset,
                    target,
                })
            })
    }

    fn string(&self, i: usize) -> Result<usize, ProgramError> {
        let index = self.operand(i);
        usize::try_from(index)
            .ok()
            .filter(|&x| x < self.code.strings.len())
            .ok_or_else(|| {
                self.err(ProgramErrorKind::StringIndex {
                    offset: self.offset,
                    index,
                })
            })
    }

    fn class(&self, i: usize) -> Result<usize, ProgramError> {
        let index = self.operand(i);
        usize::try_from(index)
            .ok()
            .filter(|&x| x < self.code.classes.len())
            .ok_or_else(|| {
                self.err(ProgramErrorKind::ClassIndex {
                    offset: self.offset,
                    index,
                })
            })
    }

    fn slot(&self, i: usize) -> Result<usize, ProgramError> {
        let slot = self.operand(i);
        usize::try_from(slot)
            .ok()
            .filter(|&x| x < self.code.capture_numbers.len())
            .ok_or_else(|| {
                self.err(ProgramErrorKind::SlotIndex {
                    offset: self.offset,
                    slot,
                })
            })
    }

    /// A slot operand where `-1` means "none".
    fn maybe_slot(&self, i: usize) -> Result<Option<usize>, ProgramError> {
        if self.operand(i) == -1 {
            Ok(None)
        } else {
            self.slot(i).map(Some)
        }
    }

    fn op(&self, opcode: Opcode) -> Result<Op, ProgramError> {
        let op = match opcode {
            Opcode::Onerep => {
                Op::Onerep { ch: self.ch(0)?, count: self.count(1)? }
            }
            Opcode::Notonerep => {
                Op::Notonerep { ch: self.ch(0)?, count: self.count(1)? }
            }
            Opcode::Setrep => {
                Op::Setrep { class: self.class(0)?, count: self.count(1)? }
            }
            Opcode::Oneloop => {
                Op::Oneloop { ch: self.ch(0)?, max: self.count(1)? }
            }
            Opcode::Notoneloop => {
                Op::Notoneloop { ch: self.ch(0)?, max: self.count(1)? }
            }
            Opcode::Setloop => {
                Op::Setloop { class: self.class(0)?, max: self.count(1)? }
            }
            Opcode::Onelazy => {
                Op::Onelazy { ch: self.ch(0)?, max: self.count(1)? }
            }
            Opcode::Notonelazy => {
                Op::Notonelazy { ch: self.ch(0)?, max: self.count(1)? }
            }
            Opcode::Setlazy => {
                Op::Setlazy { class: self.class(0)?, max: self.count(1)? }
            }
            Opcode::One => Op::One(self.ch(0)?),
            Opcode::Notone => Op::Notone(self.ch(0)?),
            Opcode::Set => Op::Set(self.class(0)?),
            Opcode::Multi => Op::Multi(self.string(0)?),
            Opcode::Ref => Op::Ref(self.slot(0)?),
            Opcode::Bol => Op::Bol,
            Opcode::Eol => Op::Eol,
            Opcode::Boundary => Op::Boundary,
            Opcode::Nonboundary => Op::Nonboundary,
            Opcode::Beginning => Op::Beginning,
            Opcode::Start => Op::Start,
            Opcode::EndZ => Op::EndZ,
            Opcode::End => Op::End,
            Opcode::Nothing => Op::Nothing,
            Opcode::Lazybranch => Op::Lazybranch(self.target(0)?),
            Opcode::Branchmark => Op::Branchmark(self.target(0)?),
            Opcode::Lazybranchmark => Op::Lazybranchmark(self.target(0)?),
            Opcode::Nullcount => Op::Nullcount(self.operand(0)),
            Opcode::Setcount => Op::Setcount(self.operand(0)),
            Opcode::Branchcount => Op::Branchcount {
                target: self.target(0)?,
                limit: self.count(1)?,
            },
            Opcode::Lazybranchcount => Op::Lazybranchcount {
                target: self.target(0)?,
                limit: self.count(1)?,
            },
            Opcode::Nullmark => Op::Nullmark,
            Opcode::Setmark => Op::Setmark,
            Opcode::Capturemark => Op::Capturemark {
                slot: self.maybe_slot(0)?,
                uncapture: self.maybe_slot(1)?,
            },
            Opcode::Getmark => Op::Getmark,
            Opcode::Setjump => Op::Setjump,
            Opcode::Backjump => Op::Backjump,
            Opcode::Forejump => Op::Forejump,
            Opcode::Testref => Op::Testref(self.slot(0)?),
            Opcode::Goto => Op::Goto(self.target(0)?),
            Opcode::Stop => Op::Stop,
            Opcode::EcmaBoundary => Op::EcmaBoundary,
            Opcode::NonEcmaBoundary => Op::NonEcmaBoundary,
        };
        Ok(op)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn code(codes: Vec<i32>) -> Code {
        Code {
            codes,
            capture_numbers: vec![0],
            ..Code::default()
        }
    }

    #[test]
    fn decodes_targets_as_ids() {
        let s = Opcode::Setmark.as_word();
        let program = Program::new(code(vec![
            Opcode::Lazybranch.as_word(),
            6,
            s,
            Opcode::One.as_word() | CI,
            'a' as i32,
            Opcode::Capturemark.as_word(),
            0,
            -1,
            Opcode::Stop.as_word(),
        ]));
        // Offset 6 is in the middle of the capture.
        assert_eq!(
            &ProgramErrorKind::BadTarget { offset: 0, target: 6 },
            program.unwrap_err().kind(),
        );

        let program = Program::new(code(vec![
            Opcode::Lazybranch.as_word(),
            8,
            s,
            Opcode::One.as_word() | CI,
            'a' as i32,
            Opcode::Capturemark.as_word(),
            0,
            -1,
            Opcode::Stop.as_word(),
        ]))
        .unwrap();
        let ops = program.operations();
        assert_eq!(5, ops.len());
        assert_eq!(&Op::Lazybranch(4), ops[0].op());
        assert_eq!(&Op::One('a'), ops[2].op());
        assert!(ops[2].is_ignore_case());
        assert!(!ops[2].is_right_to_left());
        assert_eq!(
            &Op::Capturemark { slot: Some(0), uncapture: None },
            ops[3].op()
        );
        assert_eq!(8, ops[4].offset());
    }

    #[test]
    fn rejects_malformed() {
        let err = |codes| Program::new(code(codes)).unwrap_err().kind().clone();

        assert_eq!(ProgramErrorKind::Empty, err(vec![]));
        assert_eq!(
            ProgramErrorKind::UnknownOpcode { offset: 0, word: 39 },
            err(vec![39])
        );
        assert_eq!(
            ProgramErrorKind::Truncated { offset: 1 },
            err(vec![Opcode::Stop.as_word(), Opcode::One.as_word()])
        );
        assert_eq!(
            ProgramErrorKind::StringIndex { offset: 0, index: 0 },
            err(vec![Opcode::Multi.as_word(), 0])
        );
        assert_eq!(
            ProgramErrorKind::SlotIndex { offset: 0, slot: 3 },
            err(vec![Opcode::Ref.as_word(), 3])
        );
        assert_eq!(
            ProgramErrorKind::BadChar { offset: 0, word: 0xD800 },
            err(vec![Opcode::One.as_word(), 0xD800])
        );
        assert_eq!(
            ProgramErrorKind::NegativeCount { offset: 0, count: -2 },
            err(vec![Opcode::Oneloop.as_word(), 'a' as i32, -2])
        );
    }
}
