use std::collections::BTreeSet;

use crate::{
    codegen::SourceWriter,
    compiler::{
        backtrack::{BacktrackOperation, Registry},
        Needs,
    },
    ir::{Op, Operation, Program},
    syntax::INFINITE,
    util::escape,
};

/// Literals longer than this are compared in a loop instead of a single
/// unrolled condition.
const MAX_UNROLL: usize = 16;

/// Emit the body of `go`. Returns the backtrack operations registered for
/// the dispatcher, ordered by tag.
pub(crate) fn emit(
    program: &Program,
    labels: &BTreeSet<usize>,
    out: &mut SourceWriter,
    needs: &mut Needs,
) -> Vec<BacktrackOperation> {
    let mut e = Emitter {
        program,
        needs,
        w: SourceWriter::new(),
        registry: Registry::new(),
        cases: vec![],
    };
    e.w.stmt("r.ensure_storage()");
    e.w.declare("beg", "r.text_beg");
    e.w.declare("end", "r.text_end");
    e.w.declare("start", "r.text_start");
    e.w.declare_mut("pos", "r.text_pos");
    e.w.line("let mut state: usize = 0;");
    e.w.open("'run: loop");
    e.w.open("match state");

    let mut open = false;
    let mut terminated = false;
    for op in program.operations() {
        if labels.contains(&op.id()) {
            if open {
                if !terminated {
                    e.w.stmt(format!("state = {}", op.id()));
                }
                e.w.close();
            }
            e.w.open(format!("{} =>", op.id()));
            open = true;
        }
        e.w.comment(format!("{}: {}", op.id(), escape::comment(&describe(op))));
        terminated = e.operation(op);
    }
    if open {
        if !terminated {
            e.stop();
        }
        e.w.close();
    }

    let Emitter { mut w, registry, mut cases, .. } = e;
    cases.sort_by_key(|&(tag, _)| tag);
    w.open("BACKTRACK => match r.track_pop()");
    for (tag, case) in cases {
        w.open(format!("{} =>", tag));
        w.append(case);
        w.close();
    }
    w.line("_ => unreachable!(\"unknown backtrack tag\"),");
    w.close_with(",");
    w.line("_ => unreachable!(\"unknown state\"),");
    w.close();
    w.close();
    out.append(w);
    registry.into_operations()
}

fn describe(op: &Operation) -> String {
    let mut s = format!("{:?}", op.op());
    if op.is_right_to_left() {
        s.push_str(" rtl");
    }
    if op.is_ignore_case() {
        s.push_str(" ci");
    }
    s
}

/// The character test of a one, notone or set instruction.
#[derive(Clone, Copy, Debug)]
enum CharTest {
    One(char),
    Notone(char),
    Set(usize),
}

struct Emitter<'a> {
    program: &'a Program,
    needs: &'a mut Needs,
    /// Where code is currently written: the state machine, or a
    /// backtrack case while one is being built.
    w: SourceWriter,
    registry: Registry,
    cases: Vec<(usize, SourceWriter)>,
}

impl<'a> Emitter<'a> {
    /// Emit the forward code of one instruction and register its
    /// backtrack cases. Returns true if control never falls through to
    /// the next instruction.
    fn operation(&mut self, op: &Operation) -> bool {
        let id = op.id();
        match *op.op() {
            Op::One(ch) => self.single(op, CharTest::One(ch)),
            Op::Notone(ch) => self.single(op, CharTest::Notone(ch)),
            Op::Set(class) => self.single(op, CharTest::Set(class)),
            Op::Multi(index) => self.multi(op, index),
            Op::Ref(slot) => self.backreference(op, slot),
            Op::Onerep { ch, count } => self.rep(op, CharTest::One(ch), count),
            Op::Notonerep { ch, count } => {
                self.rep(op, CharTest::Notone(ch), count)
            }
            Op::Setrep { class, count } => {
                self.rep(op, CharTest::Set(class), count)
            }
            Op::Oneloop { ch, max } => self.greedy(op, CharTest::One(ch), max),
            Op::Notoneloop { ch, max } => {
                self.greedy(op, CharTest::Notone(ch), max)
            }
            Op::Setloop { class, max } => {
                self.greedy(op, CharTest::Set(class), max)
            }
            Op::Onelazy { ch, max } => self.lazy(op, CharTest::One(ch), max),
            Op::Notonelazy { ch, max } => {
                self.lazy(op, CharTest::Notone(ch), max)
            }
            Op::Setlazy { class, max } => {
                self.lazy(op, CharTest::Set(class), max)
            }
            Op::Bol => self.fail_if("pos > beg && r.text[pos - 1] != '\\n'"),
            Op::Eol => self.fail_if("pos < end && r.text[pos] != '\\n'"),
            Op::Boundary => self.fail_if("!r.is_boundary(pos)"),
            Op::Nonboundary => self.fail_if("r.is_boundary(pos)"),
            Op::EcmaBoundary => self.fail_if("!r.is_ecma_boundary(pos)"),
            Op::NonEcmaBoundary => self.fail_if("r.is_ecma_boundary(pos)"),
            Op::Beginning => self.fail_if("pos > beg"),
            Op::Start => self.fail_if("pos != start"),
            Op::EndZ => self.fail_if(
                "pos + 1 < end || (pos + 1 == end && r.text[pos] != '\\n')",
            ),
            Op::End => self.fail_if("pos < end"),
            Op::Nothing => {
                self.fail();
                return true;
            }
            Op::Lazybranch(target) => {
                self.w.stmt("r.track_push(pos as isize)");
                self.push_tag(id, false);
                self.begin_case();
                self.w.stmt("pos = r.track_pop() as usize");
                self.goto(target, id);
                self.end_case(id, false);
            }
            Op::Setmark | Op::Nullmark => {
                let value =
                    if *op.op() == Op::Setmark { "pos as isize" } else { "-1" };
                self.w.stmt(format!("r.stack_push({})", value));
                self.push_tag(id, false);
                self.begin_case();
                self.w.stmt("r.stack_pop()");
                self.fail();
                self.end_case(id, false);
            }
            Op::Getmark => {
                self.w.declare("mark", "r.stack_pop()");
                self.w.stmt("r.track_push(mark)");
                self.w.stmt("pos = mark as usize");
                self.push_tag(id, false);
                self.begin_case();
                self.w.declare("mark", "r.track_pop()");
                self.w.stmt("r.stack_push(mark)");
                self.fail();
                self.end_case(id, false);
            }
            Op::Capturemark { slot, uncapture } => {
                self.capturemark(id, slot, uncapture)
            }
            Op::Branchmark(target) => self.branchmark(id, target),
            Op::Lazybranchmark(target) => self.lazybranchmark(id, target),
            Op::Setcount(n) | Op::Nullcount(n) => {
                let value = if let Op::Setcount(_) = *op.op() {
                    "pos as isize"
                } else {
                    "-1"
                };
                self.w.stmt(format!("r.stack_push2({}, {})", value, n));
                self.push_tag(id, false);
                self.begin_case();
                self.w.stmt("r.stack_pop()");
                self.w.stmt("r.stack_pop()");
                self.fail();
                self.end_case(id, false);
            }
            Op::Branchcount { target, limit } => {
                self.branchcount(id, target, limit)
            }
            Op::Lazybranchcount { target, limit } => {
                self.lazybranchcount(id, target, limit)
            }
            Op::Setjump => {
                self.w.declare("track", "r.track_pos() as isize");
                self.w.declare("crawl", "r.crawl_pos() as isize");
                self.w.stmt("r.stack_push2(track, crawl)");
                self.push_tag(id, false);
                self.begin_case();
                self.w.stmt("r.stack_pop()");
                self.w.stmt("r.stack_pop()");
                self.fail();
                self.end_case(id, false);
            }
            Op::Backjump => {
                self.w.declare("crawl", "r.stack_pop() as usize");
                self.w.declare("track", "r.stack_pop() as usize");
                self.w.stmt("r.track_to(track)");
                self.uncapture_to("crawl");
                self.fail();
                return true;
            }
            Op::Forejump => {
                self.w.declare("crawl", "r.stack_pop()");
                self.w.declare("track", "r.stack_pop() as usize");
                self.w.stmt("r.track_to(track)");
                self.w.stmt("r.track_push(crawl)");
                self.push_tag(id, false);
                self.begin_case();
                self.w.declare("crawl", "r.track_pop() as usize");
                self.uncapture_to("crawl");
                self.fail();
                self.end_case(id, false);
            }
            Op::Testref(slot) => {
                self.fail_if(&format!("!r.is_matched({})", slot))
            }
            Op::Goto(target) => {
                self.goto(target, id);
                return true;
            }
            Op::Stop => {
                self.stop();
                return true;
            }
        }
        false
    }

    fn fail(&mut self) {
        self.w.stmt("state = BACKTRACK");
        self.w.stmt("continue 'run");
    }

    fn fail_if(&mut self, cond: &str) {
        self.w.open_if(cond);
        self.fail();
        self.w.close();
    }

    /// Jump to `target` from instruction `from`. Jumping backward first
    /// checks that the stacks have room for another iteration.
    fn goto(&mut self, target: usize, from: usize) {
        if target <= from {
            self.w.stmt("r.ensure_storage()");
        }
        self.w.stmt(format!("state = {}", target));
        self.w.stmt("continue 'run");
    }

    fn stop(&mut self) {
        self.w.stmt("r.text_pos = pos");
        self.w.line("return;");
    }

    fn push_tag(&mut self, id: usize, secondary: bool) {
        let tag = self.registry.tag(id, secondary);
        trace!("operation {} pushes backtrack tag {}", id, tag);
        self.w.stmt(format!("r.track_push({})", tag));
    }

    fn begin_case(&mut self) {
        let outer = core::mem::replace(&mut self.w, SourceWriter::new());
        self.cases.push((usize::MAX, outer));
    }

    fn end_case(&mut self, id: usize, secondary: bool) {
        let tag = self.registry.tag(id, secondary);
        let (_, outer) = match self.cases.pop() {
            Some(pending) => pending,
            None => panic!("backtrack case ended without being started"),
        };
        let case = core::mem::replace(&mut self.w, outer);
        self.cases.push((tag, case));
    }

    fn uncapture_to(&mut self, crawl: &str) {
        self.w.open_while(format!("r.crawl_pos() != {}", crawl));
        self.w.stmt("r.uncapture()");
        self.w.close();
    }

    /// The index of the next char in the instruction's direction.
    fn next_index(op: &Operation) -> &'static str {
        if op.is_right_to_left() {
            "pos - 1"
        } else {
            "pos"
        }
    }

    fn step(op: &Operation) -> &'static str {
        if op.is_right_to_left() {
            "pos -= 1"
        } else {
            "pos += 1"
        }
    }

    /// The position before the most recent step.
    fn stepped_back(op: &Operation) -> &'static str {
        if op.is_right_to_left() {
            "pos + 1"
        } else {
            "pos - 1"
        }
    }

    fn available(op: &Operation) -> &'static str {
        if op.is_right_to_left() {
            "pos - beg"
        } else {
            "end - pos"
        }
    }

    /// Read the char at `index`, lowered when the instruction ignores case.
    fn read(&mut self, op: &Operation, index: &str) -> String {
        if op.is_ignore_case() {
            self.needs.culture = true;
            format!("CULTURE.to_lower(r.text[{}])", index)
        } else {
            format!("r.text[{}]", index)
        }
    }

    /// A condition that holds when `ch` passes the test.
    fn test(&mut self, test: CharTest, ch: &str) -> String {
        match test {
            CharTest::One(c) => format!("{} == {}", ch, escape::char_literal(c)),
            CharTest::Notone(c) => {
                format!("{} != {}", ch, escape::char_literal(c))
            }
            CharTest::Set(class) => {
                self.needs.char_in_class = true;
                format!("char_in_class({}, CLASS_{})", ch, class)
            }
        }
    }

    /// A condition that holds when `ch` fails the test.
    fn mismatch(&mut self, test: CharTest, ch: &str) -> String {
        match test {
            CharTest::One(c) => format!("{} != {}", ch, escape::char_literal(c)),
            CharTest::Notone(c) => {
                format!("{} == {}", ch, escape::char_literal(c))
            }
            CharTest::Set(class) => {
                self.needs.char_in_class = true;
                format!("!char_in_class({}, CLASS_{})", ch, class)
            }
        }
    }

    fn single(&mut self, op: &Operation, test: CharTest) {
        let at_limit = if op.is_right_to_left() { "pos <= beg" } else { "pos >= end" };
        let ch = self.read(op, Self::next_index(op));
        let mismatch = self.mismatch(test, &ch);
        self.fail_if(&format!("{} || {}", at_limit, mismatch));
        self.w.stmt(Self::step(op));
    }

    fn multi(&mut self, op: &Operation, index: usize) {
        let literal: Vec<char> = self.program.string(index).chars().collect();
        let n = literal.len();
        let rtl = op.is_right_to_left();
        if n <= MAX_UNROLL {
            let mut cond = vec![format!("{} < {}", Self::available(op), n)];
            for (i, &c) in literal.iter().enumerate() {
                let at = if rtl {
                    format!("pos - {}", n - i)
                } else if i == 0 {
                    "pos".to_string()
                } else {
                    format!("pos + {}", i)
                };
                let ch = self.read(op, &at);
                cond.push(format!("{} != {}", ch, escape::char_literal(c)));
            }
            self.fail_if(&cond.join(" || "));
        } else {
            self.fail_if(&format!("{} < {}", Self::available(op), n));
            let chars: Vec<String> =
                literal.iter().map(|&c| escape::char_literal(c)).collect();
            self.w.open(format!(
                "for (i, &c) in [{}].iter().enumerate()",
                chars.join(", ")
            ));
            let at = if rtl { format!("pos - {} + i", n) } else { "pos + i".to_string() };
            let ch = self.read(op, &at);
            self.fail_if(&format!("{} != c", ch));
            self.w.close();
        }
        self.w.stmt(if rtl { format!("pos -= {}", n) } else { format!("pos += {}", n) });
    }

    fn backreference(&mut self, op: &Operation, slot: usize) {
        let rtl = op.is_right_to_left();
        self.w.open_if(format!("r.is_matched({})", slot));
        self.w.declare("index", format!("r.match_index({})", slot));
        self.w.declare("len", format!("r.match_length({})", slot));
        self.fail_if(&format!("{} < len", Self::available(op)));
        self.w.open("for i in 0..len");
        let captured = self.read(op, "index + i");
        let at = if rtl { "pos - len + i" } else { "pos + i" };
        let ch = self.read(op, at);
        self.fail_if(&format!("{} != {}", captured, ch));
        self.w.close();
        self.w.stmt(if rtl { "pos -= len" } else { "pos += len" });
        if !self.program.is_ecmascript() {
            // Outside ECMAScript a reference to an unset group never matches.
            self.w.open_else();
            self.fail();
        }
        self.w.close();
    }

    fn rep(&mut self, op: &Operation, test: CharTest, count: u32) {
        if count == 0 {
            return;
        }
        let at = if op.is_right_to_left() { "pos - 1 - i" } else { "pos + i" };
        self.fail_if(&format!("{} < {}", Self::available(op), count));
        self.w.open(format!("for i in 0..{}", count));
        let ch = self.read(op, at);
        let mismatch = self.mismatch(test, &ch);
        self.fail_if(&mismatch);
        self.w.close();
        self.w.stmt(if op.is_right_to_left() {
            format!("pos -= {}", count)
        } else {
            format!("pos += {}", count)
        });
    }

    fn limit(&mut self, op: &Operation, max: u32) {
        self.w.declare("avail", Self::available(op));
        if max == INFINITE {
            self.w.declare("limit", "avail");
        } else {
            self.w.declare(
                "limit",
                format!("if avail < {0} {{ avail }} else {{ {0} }}", max),
            );
        }
    }

    fn greedy(&mut self, op: &Operation, test: CharTest, max: u32) {
        let id = op.id();
        self.w.open("");
        self.limit(op, max);
        self.w.declare_mut("i", "limit");
        let ch = self.read(op, Self::next_index(op));
        let test = self.test(test, &ch);
        self.w.open_while(format!("i > 0 && {}", test));
        self.w.stmt(Self::step(op));
        self.w.stmt("i -= 1");
        self.w.close();
        self.w.open_if("limit > i");
        self.w.stmt(format!(
            "r.track_push2((limit - i - 1) as isize, ({}) as isize)",
            Self::stepped_back(op)
        ));
        self.push_tag(id, false);
        self.w.close();
        self.w.close();

        // Give back one char per backtrack.
        self.begin_case();
        self.w.declare("p", "r.track_pop() as usize");
        self.w.declare("i", "r.track_pop()");
        self.w.stmt("pos = p");
        self.w.open_if("i > 0");
        self.w.stmt(format!(
            "r.track_push2(i - 1, ({}) as isize)",
            Self::stepped_back(op)
        ));
        self.push_tag(id, false);
        self.w.close();
        self.goto(id + 1, id);
        self.end_case(id, false);
    }

    fn lazy(&mut self, op: &Operation, test: CharTest, max: u32) {
        let id = op.id();
        self.w.open("");
        self.limit(op, max);
        self.w.open_if("limit > 0");
        self.w.stmt("r.track_push2((limit - 1) as isize, pos as isize)");
        self.push_tag(id, false);
        self.w.close();
        self.w.close();

        // Take one more char per backtrack.
        self.begin_case();
        self.w.declare("p", "r.track_pop() as usize");
        self.w.declare("i", "r.track_pop()");
        self.w.stmt("pos = p");
        let ch = self.read(op, Self::next_index(op));
        let mismatch = self.mismatch(test, &ch);
        self.fail_if(&mismatch);
        self.w.stmt(Self::step(op));
        self.w.open_if("i > 0");
        self.w.stmt("r.track_push2(i - 1, pos as isize)");
        self.push_tag(id, false);
        self.w.close();
        self.goto(id + 1, id);
        self.end_case(id, false);
    }

    fn capturemark(
        &mut self,
        id: usize,
        slot: Option<usize>,
        uncapture: Option<usize>,
    ) {
        if let Some(u) = uncapture {
            self.fail_if(&format!("!r.is_matched({})", u));
        }
        self.w.declare("mark", "r.stack_pop()");
        match (slot, uncapture) {
            (slot, Some(u)) => {
                let slot = match slot {
                    Some(s) => format!("Some({})", s),
                    None => "None".to_string(),
                };
                self.w.stmt(format!(
                    "r.transfer_capture({}, {}, mark as usize, pos)",
                    slot, u
                ));
            }
            (Some(s), None) => {
                self.w.stmt(format!("r.capture({}, mark as usize, pos)", s));
            }
            (None, None) => {}
        }
        self.w.stmt("r.track_push(mark)");
        self.push_tag(id, false);

        self.begin_case();
        self.w.declare("mark", "r.track_pop()");
        self.w.stmt("r.stack_push(mark)");
        for _ in slot.iter().chain(uncapture.iter()) {
            self.w.stmt("r.uncapture()");
        }
        self.fail();
        self.end_case(id, false);
    }

    /// The bottom of a greedy loop over a group that may match empty.
    fn branchmark(&mut self, id: usize, target: usize) {
        self.w.declare("mark", "r.stack_pop()");
        self.w.open_if("pos as isize != mark");
        self.w.stmt("r.track_push2(mark, pos as isize)");
        self.push_tag(id, false);
        self.w.stmt("r.stack_push(pos as isize)");
        self.goto(target, id);
        self.w.close();
        self.w.stmt("r.track_push(mark)");
        self.push_tag(id, true);

        // Stop looping: continue after the loop from the saved position.
        self.begin_case();
        self.w.declare("p", "r.track_pop() as usize");
        self.w.declare("mark", "r.track_pop()");
        self.w.stmt("r.stack_pop()");
        self.w.stmt("pos = p");
        self.w.stmt("r.track_push(mark)");
        self.push_tag(id, true);
        self.goto(id + 1, id);
        self.end_case(id, false);

        self.begin_case();
        self.w.declare("mark", "r.track_pop()");
        self.w.stmt("r.stack_push(mark)");
        self.fail();
        self.end_case(id, true);
    }

    fn lazybranchmark(&mut self, id: usize, target: usize) {
        self.w.declare("old", "r.stack_pop()");
        self.w.open_if("pos as isize != old");
        self.w.stmt(
            "r.track_push2(if old != -1 { old } else { pos as isize }, pos as isize)",
        );
        self.push_tag(id, false);
        self.w.open_else();
        self.w.stmt("r.stack_push(old)");
        self.w.stmt("r.track_push(old)");
        self.push_tag(id, true);
        self.w.close();

        // Loop once more.
        self.begin_case();
        self.w.declare("p", "r.track_pop()");
        self.w.declare("old", "r.track_pop()");
        self.w.stmt("r.track_push(old)");
        self.push_tag(id, true);
        self.w.stmt("r.stack_push(p)");
        self.w.stmt("pos = p as usize");
        self.goto(target, id);
        self.end_case(id, false);

        self.begin_case();
        self.w.stmt("r.stack_pop()");
        self.w.declare("old", "r.track_pop()");
        self.w.stmt("r.stack_push(old)");
        self.fail();
        self.end_case(id, true);
    }

    fn branchcount(&mut self, id: usize, target: usize, limit: u32) {
        self.w.declare("count", "r.stack_pop()");
        self.w.declare("mark", "r.stack_pop()");
        self.w.open_if(format!(
            "count >= {} || (pos as isize == mark && count >= 0)",
            limit
        ));
        self.w.stmt("r.track_push2(mark, count)");
        self.push_tag(id, true);
        self.w.open_else();
        self.w.stmt("r.track_push(mark)");
        self.push_tag(id, false);
        self.w.stmt("r.stack_push2(pos as isize, count + 1)");
        self.goto(target, id);
        self.w.close();

        // Leave the loop after one iteration fewer.
        self.begin_case();
        self.w.declare("mark", "r.track_pop()");
        self.w.declare("count", "r.stack_pop()");
        self.w.declare("here", "r.stack_pop()");
        self.w.open_if("count > 0");
        self.w.stmt("pos = here as usize");
        self.w.stmt("r.track_push2(mark, count - 1)");
        self.push_tag(id, true);
        self.goto(id + 1, id);
        self.w.close();
        self.w.stmt("r.stack_push2(mark, count - 1)");
        self.fail();
        self.end_case(id, false);

        self.begin_case();
        self.w.declare("count", "r.track_pop()");
        self.w.declare("mark", "r.track_pop()");
        self.w.stmt("r.stack_push2(mark, count)");
        self.fail();
        self.end_case(id, true);
    }

    fn lazybranchcount(&mut self, id: usize, target: usize, limit: u32) {
        self.w.declare("count", "r.stack_pop()");
        self.w.declare("mark", "r.stack_pop()");
        self.w.open_if("count < 0");
        self.w.stmt("r.track_push(mark)");
        self.push_tag(id, true);
        self.w.stmt("r.stack_push2(pos as isize, count + 1)");
        self.goto(target, id);
        self.w.close();
        self.w.stmt("r.track_push(mark)");
        self.w.stmt("r.track_push(count)");
        self.w.stmt("r.track_push(pos as isize)");
        self.push_tag(id, false);

        // Run the body once more.
        self.begin_case();
        self.w.declare("p", "r.track_pop()");
        self.w.declare("count", "r.track_pop()");
        self.w.declare("mark", "r.track_pop()");
        self.w.open_if(format!("count < {} && p != mark", limit));
        self.w.stmt("pos = p as usize");
        self.w.stmt("r.stack_push2(p, count + 1)");
        self.w.stmt("r.track_push(mark)");
        self.push_tag(id, true);
        self.goto(target, id);
        self.w.close();
        self.w.stmt("r.stack_push2(mark, count)");
        self.fail();
        self.end_case(id, false);

        self.begin_case();
        self.w.declare("mark", "r.track_pop()");
        self.w.declare("count", "r.stack_pop()");
        self.w.stmt("r.stack_pop()");
        self.w.stmt("r.stack_push2(mark, count - 1)");
        self.fail();
        self.end_case(id, true);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{options::Options, syntax};

    fn go(pattern: &str, options: Options) -> (String, Vec<BacktrackOperation>) {
        let ast = syntax::parse(pattern, options).unwrap();
        let program = Program::from_ast(&ast);
        let labels = crate::compiler::labels(&program);
        let mut w = SourceWriter::new();
        let mut needs = Needs::default();
        let ops = emit(&program, &labels, &mut w, &mut needs);
        (w.finish(), ops)
    }

    #[test]
    fn dispatcher_has_one_case_per_tag() {
        let (src, ops) = go(r"(?:ab|c)+?x*\d{2,5}?", Options::empty());
        let at = src.find("BACKTRACK => match r.track_pop() {").unwrap();
        let dispatcher = &src[at..];
        for (i, op) in ops.iter().enumerate() {
            assert_eq!(i, op.tag());
            assert_eq!(1, dispatcher.matches(&format!(" {} => {{", i)).count());
        }
    }

    #[test]
    fn backward_jumps_ensure_storage() {
        let (src, _) = go("(?:a|b)*c", Options::empty());
        let jumps = src.matches("r.ensure_storage();").count();
        // Once on entry and at least once for the loop's jump back.
        assert!(jumps >= 2, "{}", src);
    }

    #[test]
    fn right_to_left_reads_behind() {
        let (src, _) = go("ab", Options::RIGHT_TO_LEFT);
        assert!(src.contains("pos - beg < 2"));
        assert!(src.contains("pos -= 2;"));
        let (src, _) = go("a", Options::RIGHT_TO_LEFT);
        assert!(src.contains("r.text[pos - 1]"));
    }

    #[test]
    fn ignore_case_lowers_input() {
        let (src, _) = go("ab", Options::IGNORE_CASE);
        assert!(src.contains("CULTURE.to_lower(r.text[pos])"));
    }

    #[test]
    fn long_literals_loop() {
        let (src, _) = go("abcdefghijklmnopqrstuvwxyz", Options::empty());
        assert!(src.contains("for (i, &c) in ['a', 'b'"));
        assert!(src.contains("pos += 26;"));
    }
}
