/*!
Lowering of a syntax tree into the flat instruction stream.

The tree is walked with an explicit stack. Every interior node gets a
chance to emit instructions before and after each of its children, and
leaves emit their instructions once. Forward jumps are emitted with a
placeholder target whose offset is pushed on a patch stack, and are filled
in once the target is known.
*/

use core::convert::TryFrom;

use crate::{
    ir::{
        analysis,
        opcode::{Opcode, CI, RTL},
        Code,
    },
    options::Options,
    syntax::{Ast, CharClass, Node, NodeKind, INFINITE},
};

/// Lower a parsed pattern. The result always begins with a `Lazybranch`
/// to the final `Stop`, so that exhausting every alternative fails out of
/// the match routine.
pub(crate) fn lower(ast: &Ast) -> Code {
    let numbers: Vec<u32> = ast.captures().numbers().collect();
    let mut w = Writer {
        codes: vec![],
        strings: vec![],
        classes: vec![],
        patches: vec![],
        numbers: &numbers,
        track_count: 0,
    };
    w.walk(ast.root());

    let anchors = analysis::anchors(ast.root());
    let options = ast.options();
    let right_to_left = options.contains(Options::RIGHT_TO_LEFT);
    let (first_chars, skip) = analysis::prefixes(ast.root(), ast.culture());
    debug!(
        "lowered pattern to {} words, {} backtracking instructions, \
         anchors {:?}",
        w.codes.len(),
        w.track_count,
        anchors.leading,
    );
    Code {
        codes: w.codes,
        strings: w.strings,
        classes: w.classes,
        leading_anchors: anchors.leading,
        trailing_anchors: anchors.trailing,
        first_chars,
        skip,
        track_count: w.track_count,
        capture_names: ast
            .captures()
            .names()
            .into_iter()
            .map(|(name, n)| (name.to_string(), n))
            .collect(),
        capture_numbers: numbers,
        right_to_left,
        ecmascript: options.contains(Options::ECMASCRIPT),
        culture: ast.culture(),
    }
}

struct Writer<'a> {
    codes: Vec<i32>,
    strings: Vec<String>,
    classes: Vec<CharClass>,
    /// Offsets of instructions whose targets are not yet known.
    patches: Vec<usize>,
    numbers: &'a [u32],
    track_count: usize,
}

impl<'a> Writer<'a> {
    fn walk(&mut self, root: &Node) {
        self.emit(Opcode::Lazybranch, &[0]);

        let mut stack: Vec<(&Node, usize)> = vec![];
        let mut node = root;
        let mut child = 0;
        loop {
            if node.children().is_empty() {
                self.leaf(node);
            } else if child < node.children().len() {
                self.before_child(node, child);
                stack.push((node, child));
                node = &node.children()[child];
                child = 0;
                continue;
            }
            match stack.pop() {
                None => break,
                Some((parent, index)) => {
                    node = parent;
                    child = index;
                }
            }
            self.after_child(node, child);
            child += 1;
        }

        let end = self.pos();
        self.patch(0, end);
        self.emit(Opcode::Stop, &[]);
    }

    fn pos(&self) -> usize {
        self.codes.len()
    }

    fn emit(&mut self, opcode: Opcode, operands: &[i32]) {
        self.emit_word(opcode.as_word(), operands);
    }

    fn emit_word(&mut self, word: i32, operands: &[i32]) {
        if let Some(opcode) = Opcode::from_word(word) {
            debug_assert_eq!(opcode.size(), 1 + operands.len());
            if opcode.backtracks() {
                self.track_count += 1;
            }
        }
        self.codes.push(word);
        self.codes.extend_from_slice(operands);
    }

    /// Emit a jump whose target is patched later.
    fn emit_jump(&mut self, opcode: Opcode) {
        self.patches.push(self.pos());
        self.emit(opcode, &[0]);
    }

    fn patch(&mut self, offset: usize, target: usize) {
        self.codes[offset + 1] = to_word(target);
    }

    fn pop_patch(&mut self) -> usize {
        // Every pop is paired with an earlier push by the same node.
        self.patches.pop().unwrap()
    }

    fn string(&mut self, s: &str) -> i32 {
        let index = match self.strings.iter().position(|x| x == s) {
            Some(i) => i,
            None => {
                self.strings.push(s.to_string());
                self.strings.len() - 1
            }
        };
        to_word(index)
    }

    fn class(&mut self, cls: &CharClass) -> i32 {
        let index = match self.classes.iter().position(|x| x == cls) {
            Some(i) => i,
            None => {
                self.classes.push(cls.clone());
                self.classes.len() - 1
            }
        };
        to_word(index)
    }

    /// The slot a capture number is stored in. Slots are dense even when
    /// capture numbers are not.
    fn slot(&self, number: u32) -> i32 {
        match self.numbers.binary_search(&number) {
            Ok(slot) => to_word(slot),
            // An out-of-range slot is rejected when the program is decoded.
            Err(_) => to_word(self.numbers.len()),
        }
    }

    fn maybe_slot(&self, number: Option<u32>) -> i32 {
        number.map_or(-1, |n| self.slot(n))
    }

    fn before_child(&mut self, node: &Node, index: usize) {
        let count = node.children().len();
        match *node.kind() {
            NodeKind::Alternate => {
                if index < count - 1 {
                    self.emit_jump(Opcode::Lazybranch);
                }
            }
            NodeKind::Testref(number) => {
                if index == 0 {
                    self.emit(Opcode::Setjump, &[]);
                    self.emit_jump(Opcode::Lazybranch);
                    let slot = self.slot(number);
                    self.emit(Opcode::Testref, &[slot]);
                    self.emit(Opcode::Forejump, &[]);
                }
            }
            NodeKind::Testgroup => {
                if index == 0 {
                    self.emit(Opcode::Setjump, &[]);
                    self.emit(Opcode::Setmark, &[]);
                    self.emit_jump(Opcode::Lazybranch);
                }
            }
            NodeKind::Loop { min, max } | NodeKind::Lazyloop { min, max } => {
                if max < INFINITE || min > 1 {
                    if min == 0 {
                        self.emit(Opcode::Nullcount, &[0]);
                    } else {
                        self.emit(Opcode::Setcount, &[1 - to_count(min)]);
                    }
                } else if min == 0 {
                    self.emit(Opcode::Nullmark, &[]);
                } else {
                    self.emit(Opcode::Setmark, &[]);
                }
                if min == 0 {
                    self.emit_jump(Opcode::Goto);
                }
                // The loop body starts here.
                let start = self.pos();
                self.patches.push(start);
            }
            NodeKind::Capture { .. } => self.emit(Opcode::Setmark, &[]),
            NodeKind::Require => {
                self.emit(Opcode::Setjump, &[]);
                self.emit(Opcode::Setmark, &[]);
            }
            NodeKind::Prevent => {
                self.emit(Opcode::Setjump, &[]);
                self.emit_jump(Opcode::Lazybranch);
            }
            NodeKind::Greedy => self.emit(Opcode::Setjump, &[]),
            _ => {}
        }
    }

    fn after_child(&mut self, node: &Node, index: usize) {
        let count = node.children().len();
        match *node.kind() {
            NodeKind::Alternate => {
                if index < count - 1 {
                    let branch = self.pop_patch();
                    self.emit_jump(Opcode::Goto);
                    let here = self.pos();
                    self.patch(branch, here);
                } else {
                    // Every alternative but the last ends in a jump here.
                    let here = self.pos();
                    for _ in 0..index {
                        let jump = self.pop_patch();
                        self.patch(jump, here);
                    }
                }
            }
            NodeKind::Testref(_) => match index {
                0 => {
                    let branch = self.pop_patch();
                    self.emit_jump(Opcode::Goto);
                    let here = self.pos();
                    self.patch(branch, here);
                    self.emit(Opcode::Forejump, &[]);
                    if count == 1 {
                        let jump = self.pop_patch();
                        let here = self.pos();
                        self.patch(jump, here);
                    }
                }
                _ => {
                    let jump = self.pop_patch();
                    let here = self.pos();
                    self.patch(jump, here);
                }
            },
            NodeKind::Testgroup => match index {
                0 => {
                    self.emit(Opcode::Getmark, &[]);
                    self.emit(Opcode::Forejump, &[]);
                }
                1 => {
                    let branch = self.pop_patch();
                    self.emit_jump(Opcode::Goto);
                    let here = self.pos();
                    self.patch(branch, here);
                    self.emit(Opcode::Getmark, &[]);
                    self.emit(Opcode::Forejump, &[]);
                    if count == 2 {
                        let jump = self.pop_patch();
                        let here = self.pos();
                        self.patch(jump, here);
                    }
                }
                _ => {
                    let jump = self.pop_patch();
                    let here = self.pos();
                    self.patch(jump, here);
                }
            },
            NodeKind::Loop { min, max } | NodeKind::Lazyloop { min, max } => {
                let lazy = matches!(node.kind(), NodeKind::Lazyloop { .. });
                let branch = self.pos();
                let start = to_word(self.pop_patch());
                if max < INFINITE || min > 1 {
                    let opcode = if lazy {
                        Opcode::Lazybranchcount
                    } else {
                        Opcode::Branchcount
                    };
                    let limit =
                        if max == INFINITE { max } else { max - min };
                    self.emit(opcode, &[start, to_count(limit)]);
                } else {
                    let opcode = if lazy {
                        Opcode::Lazybranchmark
                    } else {
                        Opcode::Branchmark
                    };
                    self.emit(opcode, &[start]);
                }
                if min == 0 {
                    // The leading goto enters the loop at its test.
                    let jump = self.pop_patch();
                    self.patch(jump, branch);
                }
            }
            NodeKind::Capture { number, uncapture } => {
                let slot = self.maybe_slot(number);
                let unslot = self.maybe_slot(uncapture);
                self.emit(Opcode::Capturemark, &[slot, unslot]);
            }
            NodeKind::Require => {
                self.emit(Opcode::Getmark, &[]);
                self.emit(Opcode::Forejump, &[]);
            }
            NodeKind::Prevent => {
                self.emit(Opcode::Backjump, &[]);
                let branch = self.pop_patch();
                let here = self.pos();
                self.patch(branch, here);
                self.emit(Opcode::Forejump, &[]);
            }
            NodeKind::Greedy => self.emit(Opcode::Forejump, &[]),
            _ => {}
        }
    }

    fn leaf(&mut self, node: &Node) {
        let mut bits = 0;
        if node.is_right_to_left() {
            bits |= RTL;
        }
        if node.is_ignore_case() {
            bits |= CI;
        }
        let ch = |c: char| c as i32;
        match *node.kind() {
            NodeKind::One(c) => {
                self.emit_word(Opcode::One.as_word() | bits, &[ch(c)])
            }
            NodeKind::Notone(c) => {
                self.emit_word(Opcode::Notone.as_word() | bits, &[ch(c)])
            }
            NodeKind::Oneloop { ch: c, min, max } => {
                self.char_repeat(Opcode::Onerep, Opcode::Oneloop, bits, ch(c), min, max)
            }
            NodeKind::Onelazy { ch: c, min, max } => {
                self.char_repeat(Opcode::Onerep, Opcode::Onelazy, bits, ch(c), min, max)
            }
            NodeKind::Notoneloop { ch: c, min, max } => self.char_repeat(
                Opcode::Notonerep,
                Opcode::Notoneloop,
                bits,
                ch(c),
                min,
                max,
            ),
            NodeKind::Notonelazy { ch: c, min, max } => self.char_repeat(
                Opcode::Notonerep,
                Opcode::Notonelazy,
                bits,
                ch(c),
                min,
                max,
            ),
            NodeKind::Setloop { ref class, min, max } => {
                let cls = self.class(class);
                self.char_repeat(Opcode::Setrep, Opcode::Setloop, bits, cls, min, max)
            }
            NodeKind::Setlazy { ref class, min, max } => {
                let cls = self.class(class);
                self.char_repeat(Opcode::Setrep, Opcode::Setlazy, bits, cls, min, max)
            }
            NodeKind::Set(ref class) => {
                let cls = self.class(class);
                self.emit_word(Opcode::Set.as_word() | bits, &[cls])
            }
            NodeKind::Multi(ref s) => {
                let index = self.string(s);
                self.emit_word(Opcode::Multi.as_word() | bits, &[index])
            }
            NodeKind::Ref(number) => {
                let slot = self.slot(number);
                self.emit_word(Opcode::Ref.as_word() | bits, &[slot])
            }
            NodeKind::Nothing => self.emit(Opcode::Nothing, &[]),
            NodeKind::Bol => self.emit(Opcode::Bol, &[]),
            NodeKind::Eol => self.emit(Opcode::Eol, &[]),
            NodeKind::Boundary => self.emit(Opcode::Boundary, &[]),
            NodeKind::Nonboundary => self.emit(Opcode::Nonboundary, &[]),
            NodeKind::EcmaBoundary => self.emit(Opcode::EcmaBoundary, &[]),
            NodeKind::NonEcmaBoundary => {
                self.emit(Opcode::NonEcmaBoundary, &[])
            }
            NodeKind::Beginning => self.emit(Opcode::Beginning, &[]),
            NodeKind::Start => self.emit(Opcode::Start, &[]),
            NodeKind::EndZ => self.emit(Opcode::EndZ, &[]),
            NodeKind::End => self.emit(Opcode::End, &[]),
            _ => {}
        }
    }

    /// Emit a bounded repeat as a fixed run of `min` followed by a loop
    /// over the remaining `max - min`.
    fn char_repeat(
        &mut self,
        rep: Opcode,
        looping: Opcode,
        bits: i32,
        operand: i32,
        min: u32,
        max: u32,
    ) {
        if min > 0 {
            self.emit_word(rep.as_word() | bits, &[operand, to_count(min)]);
        }
        if max > min {
            let rest = if max == INFINITE { max } else { max - min };
            self.emit_word(looping.as_word() | bits, &[operand, to_count(rest)]);
        }
    }
}

fn to_word(n: usize) -> i32 {
    i32::try_from(n).unwrap_or(i32::MAX)
}

fn to_count(n: u32) -> i32 {
    i32::try_from(n).unwrap_or(i32::MAX)
}

#[cfg(test)]
mod tests {
    use crate::{
        ir::{Op, Program},
        options::Options,
        syntax,
    };

    fn ops(pattern: &str, options: Options) -> Vec<Op> {
        let ast = syntax::parse(pattern, options).unwrap();
        Program::from_ast(&ast)
            .operations()
            .iter()
            .map(|op| op.op().clone())
            .collect()
    }

    #[test]
    fn capture_and_stop() {
        assert_eq!(
            vec![
                Op::Lazybranch(4),
                Op::Setmark,
                Op::One('a'),
                Op::Capturemark { slot: Some(0), uncapture: None },
                Op::Stop,
            ],
            ops("a", Options::empty())
        );
    }

    #[test]
    fn alternation_chains() {
        assert_eq!(
            vec![
                Op::Lazybranch(10),
                Op::Setmark,
                Op::Lazybranch(5),
                Op::One('a'),
                Op::Goto(9),
                Op::Lazybranch(8),
                Op::One('b'),
                Op::Goto(9),
                Op::One('c'),
                Op::Capturemark { slot: Some(0), uncapture: None },
                Op::Stop,
            ],
            ops("a|b|c", Options::empty())
        );
    }

    #[test]
    fn char_repeats() {
        let got = ops("a{2,5}", Options::empty());
        assert_eq!(Op::Onerep { ch: 'a', count: 2 }, got[2]);
        assert_eq!(Op::Oneloop { ch: 'a', max: 3 }, got[3]);

        let got = ops("[ab]*?", Options::empty());
        assert_eq!(Op::Setlazy { class: 0, max: i32::MAX as u32 }, got[2]);
    }

    #[test]
    fn group_loops() {
        // A nullable unbounded loop enters at its branch.
        let got = ops("(?:ab)*", Options::empty());
        assert_eq!(Op::Nullmark, got[2]);
        assert_eq!(Op::Goto(5), got[3]);
        assert_eq!(Op::Multi(0), got[4]);
        assert_eq!(Op::Branchmark(4), got[5]);

        let got = ops("(?:ab){2,3}?", Options::empty());
        assert_eq!(Op::Setcount(-1), got[2]);
        assert_eq!(Op::Multi(0), got[3]);
        assert_eq!(Op::Lazybranchcount { target: 3, limit: 1 }, got[4]);
    }

    #[test]
    fn sparse_captures_use_slots() {
        let ast = syntax::parse(r"(?<5>a)\5", Options::empty()).unwrap();
        let program = Program::from_ast(&ast);
        assert_eq!(&[0, 5], program.capture_numbers());
        let got: Vec<Op> =
            program.operations().iter().map(|op| op.op().clone()).collect();
        assert!(got.contains(&Op::Capturemark { slot: Some(1), uncapture: None }));
        assert!(got.contains(&Op::Ref(1)));
    }

    #[test]
    fn track_count_counts_backtracking_ops() {
        let ast = syntax::parse("a*b", Options::empty()).unwrap();
        let program = Program::from_ast(&ast);
        // Lazybranch, Setmark, Oneloop and Capturemark.
        assert_eq!(4, program.track_count());
    }

    #[test]
    fn modifiers() {
        let ast =
            syntax::parse("ab", Options::IGNORE_CASE | Options::RIGHT_TO_LEFT)
                .unwrap();
        let program = Program::from_ast(&ast);
        let multi = &program.operations()[2];
        assert_eq!(&Op::Multi(0), multi.op());
        assert!(multi.is_ignore_case());
        assert!(multi.is_right_to_left());
        assert!(program.is_right_to_left());
    }
}
