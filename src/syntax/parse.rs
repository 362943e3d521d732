/*!
The pattern scanner.

Parsing happens in two passes over the same cursor. The first pass only
discovers capture groups, so that the second pass can resolve references
to groups declared later in the pattern (and so that named groups can be
numbered after all numbered ones). The second pass builds the syntax tree.

Neither pass recurses on nesting depth. Open groups live on an explicit
stack of frames, and inline option changes live on an explicit option
stack that is pushed at every `(` and popped at the matching `)`.
*/

use core::mem;

use crate::{
    options::Options,
    syntax::{
        ast::{Node, NodeKind, INFINITE},
        captures::CaptureTable,
        class::CharClass,
        error::{Error, ErrorKind},
    },
    util::culture::Culture,
};

/// The accumulators of a group that is still open.
#[derive(Debug)]
struct Frame {
    group: Node,
    alternation: Node,
    concatenation: Node,
}

/// What stopped a run of literal characters.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
enum Stop {
    /// The end of the pattern.
    End,
    /// Whitespace or a comment that will be skipped.
    Blank,
    /// A character with special meaning, which has been consumed.
    Special(char),
}

#[derive(Debug)]
pub(crate) struct Parser<'p> {
    pub(super) pattern: &'p [char],
    pub(super) pos: usize,
    pub(super) options: Options,
    option_stack: Vec<Options>,
    pub(super) culture: Culture,
    pub(super) caps: CaptureTable,
    autocap: u32,
    ignore_next_paren: bool,
    stack: Vec<Frame>,
    group: Node,
    alternation: Node,
    concatenation: Node,
    unit: Option<Node>,
}

impl<'p> Parser<'p> {
    pub(crate) fn new(
        pattern: &'p [char],
        options: Options,
        culture: Culture,
    ) -> Parser<'p> {
        Parser {
            pattern,
            pos: 0,
            options,
            option_stack: vec![],
            culture,
            caps: CaptureTable::new(),
            autocap: 1,
            ignore_next_paren: false,
            stack: vec![],
            group: Node::new(NodeKind::Nothing, options),
            alternation: Node::new(NodeKind::Alternate, options),
            concatenation: Node::new(NodeKind::Concatenate, options),
            unit: None,
        }
    }

    /// Run both passes, returning the root of the tree and the capture
    /// table.
    pub(crate) fn parse(mut self) -> Result<(Node, CaptureTable), Error> {
        let initial = self.options;
        self.count_captures()?;
        debug!(
            "capture pre-scan found {} groups (top {}, dense: {})",
            self.caps.len(),
            self.caps.top(),
            self.caps.is_dense(),
        );
        self.pos = 0;
        self.options = initial;
        self.option_stack.clear();
        self.ignore_next_paren = false;
        self.autocap = 1;
        let root = self.scan_regex()?;
        Ok((root, self.caps))
    }

    pub(super) fn error(&self, kind: ErrorKind) -> Error {
        Error::new(kind, self.pattern, self.pos)
    }

    // Cursor primitives.

    #[inline]
    pub(super) fn chars_right(&self) -> usize {
        self.pattern.len() - self.pos
    }

    /// The character under the cursor. Callers check `chars_right` first.
    #[inline]
    pub(super) fn right_char(&self) -> char {
        self.pattern[self.pos]
    }

    #[inline]
    pub(super) fn right_char_at(&self, i: usize) -> char {
        self.pattern[self.pos + i]
    }

    #[inline]
    pub(super) fn move_right(&mut self) {
        self.pos += 1;
    }

    #[inline]
    pub(super) fn move_left(&mut self) {
        self.pos -= 1;
    }

    #[inline]
    pub(super) fn move_right_get(&mut self) -> char {
        let ch = self.pattern[self.pos];
        self.pos += 1;
        ch
    }

    #[inline]
    pub(super) fn uses(&self, opt: Options) -> bool {
        self.options.contains(opt)
    }

    fn push_options(&mut self) {
        self.option_stack.push(self.options);
    }

    fn pop_options(&mut self) {
        if let Some(opts) = self.option_stack.pop() {
            self.options = opts;
        }
    }

    fn pop_keep_options(&mut self) {
        self.option_stack.pop();
    }

    /// Scan a decimal number, failing if it exceeds `i32::MAX`.
    pub(super) fn scan_decimal(&mut self) -> Result<u32, Error> {
        let mut n: u32 = 0;
        while self.chars_right() > 0 {
            let d = match self.right_char().to_digit(10) {
                Some(d) if self.right_char().is_ascii_digit() => d,
                _ => break,
            };
            self.move_right();
            n = n
                .checked_mul(10)
                .and_then(|n| n.checked_add(d))
                .filter(|&n| n <= i32::MAX as u32)
                .ok_or_else(|| self.error(ErrorKind::CaptureNumberOverflow))?;
        }
        Ok(n)
    }

    /// Scan a run of word characters.
    pub(super) fn scan_capname(&mut self) -> String {
        let start = self.pos;
        while self.chars_right() > 0 && is_word_char(self.right_char()) {
            self.move_right();
        }
        self.pattern[start..self.pos].iter().collect()
    }

    /// Skip whitespace and `#` comments in whitespace-insensitive mode, and
    /// `(?#...)` comments always.
    fn scan_blank(&mut self) -> Result<(), Error> {
        loop {
            if self.uses(Options::IGNORE_PATTERN_WHITESPACE) {
                while self.chars_right() > 0 && is_space(self.right_char()) {
                    self.move_right();
                }
                if self.chars_right() == 0 {
                    return Ok(());
                }
                if self.right_char() == '#' {
                    while self.chars_right() > 0 && self.right_char() != '\n' {
                        self.move_right();
                    }
                    continue;
                }
            }
            if self.chars_right() < 3
                || self.right_char() != '('
                || self.right_char_at(1) != '?'
                || self.right_char_at(2) != '#'
            {
                return Ok(());
            }
            while self.chars_right() > 0 && self.right_char() != ')' {
                self.move_right();
            }
            if self.chars_right() == 0 {
                return Err(self.error(ErrorKind::UnterminatedComment));
            }
            self.move_right();
        }
    }

    /// Apply a run of inline flags like `i-mx`, stopping at the first
    /// character that isn't one.
    fn scan_options(&mut self) {
        let mut off = false;
        while self.chars_right() > 0 {
            match self.right_char() {
                '-' => off = true,
                '+' => off = false,
                ch => match Options::from_inline_flag(ch) {
                    Some(opt) => self.options = self.options.set(opt, !off),
                    None => return,
                },
            }
            self.move_right();
        }
    }

    /// Returns true when the cursor is at a quantifier. A `{` only counts
    /// when it begins a well formed `{n}`, `{n,}` or `{n,m}`.
    fn is_true_quantifier(&self) -> bool {
        if self.chars_right() == 0 {
            return false;
        }
        let ch = self.right_char();
        if ch != '{' {
            return is_quantifier(ch);
        }
        let rest = &self.pattern[self.pos + 1..];
        let digits = rest.iter().take_while(|c| c.is_ascii_digit()).count();
        if digits == 0 {
            return false;
        }
        match rest.get(digits) {
            Some('}') => true,
            Some(',') => {
                let rest = &rest[digits + 1..];
                let digits = rest.iter().take_while(|c| c.is_ascii_digit()).count();
                rest.get(digits) == Some(&'}')
            }
            _ => false,
        }
    }

    // The capture pre-scan.

    fn count_captures(&mut self) -> Result<(), Error> {
        self.caps.note_number(0, 0);
        self.autocap = 1;
        while self.chars_right() > 0 {
            let pos = self.pos;
            match self.move_right_get() {
                '\\' => {
                    if self.chars_right() > 0 {
                        self.move_right();
                    }
                }
                '#' => {
                    if self.uses(Options::IGNORE_PATTERN_WHITESPACE) {
                        self.move_left();
                        self.scan_blank()?;
                    }
                }
                '[' => self.skip_char_class()?,
                ')' => self.pop_options(),
                '(' => {
                    if self.chars_right() >= 2
                        && self.right_char() == '?'
                        && self.right_char_at(1) == '#'
                    {
                        self.move_left();
                        self.scan_blank()?;
                    } else if self.count_group_open(pos)? {
                        // The next paren opens a condition, so the flag
                        // must survive until then.
                        continue;
                    }
                    self.ignore_next_paren = false;
                }
                _ => {}
            }
        }
        self.caps.assign_names(self.autocap);
        Ok(())
    }

    /// Note whatever capture the group opening at `pos` declares. Returns
    /// true when the group is a conditional with an expression condition.
    fn count_group_open(&mut self, pos: usize) -> Result<bool, Error> {
        self.push_options();
        if self.chars_right() == 0 || self.right_char() != '?' {
            if !self.uses(Options::EXPLICIT_CAPTURE) && !self.ignore_next_paren {
                self.caps.note_number(self.autocap, pos);
                self.autocap += 1;
            }
            return Ok(false);
        }
        self.move_right();
        if self.chars_right() > 1
            && (self.right_char() == '<' || self.right_char() == '\'')
        {
            self.move_right();
            let ch = self.right_char();
            if ch != '0' && is_word_char(ch) {
                if ('1'..='9').contains(&ch) {
                    let n = self.scan_decimal()?;
                    self.caps.note_number(n, pos);
                } else {
                    let name = self.scan_capname();
                    self.caps.note_name(&name, pos);
                }
            }
            return Ok(false);
        }
        self.scan_options();
        if self.chars_right() > 0 {
            if self.right_char() == ')' {
                self.move_right();
                self.pop_keep_options();
            } else if self.right_char() == '(' {
                self.ignore_next_paren = true;
                return Ok(true);
            }
        }
        Ok(false)
    }

    /// Skip over a bracketed class without interpreting it.
    fn skip_char_class(&mut self) -> Result<(), Error> {
        let mut depth = 1;
        let mut first = true;
        let mut after_dash = false;
        if self.chars_right() > 0 && self.right_char() == '^' {
            self.move_right();
        }
        while self.chars_right() > 0 {
            let ch = self.move_right_get();
            let was_first = mem::replace(&mut first, false);
            let dash = mem::replace(&mut after_dash, false);
            match ch {
                ']' if !was_first => {
                    depth -= 1;
                    if depth == 0 {
                        return Ok(());
                    }
                }
                '\\' => {
                    if self.chars_right() > 0 {
                        self.move_right();
                    }
                }
                '-' => after_dash = true,
                '[' if dash => {
                    depth += 1;
                    first = true;
                    if self.chars_right() > 0 && self.right_char() == '^' {
                        self.move_right();
                    }
                }
                '[' => self.skip_posix_name(),
                _ => {}
            }
        }
        Err(self.error(ErrorKind::UnterminatedBracket))
    }

    /// Skip a POSIX-style `[:name:]` inside a class, if one is there. The
    /// name is not interpreted.
    pub(super) fn skip_posix_name(&mut self) {
        if self.chars_right() == 0 || self.right_char() != ':' {
            return;
        }
        let save = self.pos;
        self.move_right();
        self.scan_capname();
        if self.chars_right() < 2
            || self.move_right_get() != ':'
            || self.move_right_get() != ']'
        {
            self.pos = save;
        }
    }

    // The main scan.

    fn scan_regex(&mut self) -> Result<Node, Error> {
        let mut is_quant = false;
        let root = Node::new(
            NodeKind::Capture { number: Some(0), uncapture: None },
            self.options,
        );
        self.start_group(root);

        while self.chars_right() > 0 {
            let mut was_prev_quant = is_quant;
            is_quant = false;
            self.scan_blank()?;

            let start = self.pos;
            let xmode = self.uses(Options::IGNORE_PATTERN_WHITESPACE);
            while self.chars_right() > 0 {
                let ch = self.right_char();
                let stops = if xmode { is_stopper_x(ch) } else { is_special(ch) };
                if stops && !(ch == '{' && !self.is_true_quantifier()) {
                    break;
                }
                self.move_right();
            }
            let end = self.pos;
            self.scan_blank()?;

            let stop = if self.chars_right() == 0 {
                Stop::End
            } else if is_special(self.right_char()) {
                let ch = self.move_right_get();
                is_quant = is_quantifier(ch);
                Stop::Special(ch)
            } else {
                Stop::Blank
            };

            if start < end {
                let unquantified = end - start - if is_quant { 1 } else { 0 };
                was_prev_quant = false;
                if unquantified > 0 {
                    self.add_literal_run(start, unquantified);
                }
                if is_quant {
                    let ch = self.pattern[end - 1];
                    self.add_unit_one(ch);
                }
            }

            match stop {
                Stop::End => break,
                Stop::Blank => continue,
                Stop::Special('[') => {
                    let class =
                        self.scan_char_class(self.uses(Options::IGNORE_CASE))?;
                    self.add_unit_set(class);
                }
                Stop::Special('(') => {
                    self.push_options();
                    match self.scan_group_open()? {
                        None => self.pop_keep_options(),
                        Some(group) => self.push_group(group),
                    }
                    continue;
                }
                Stop::Special('|') => {
                    self.add_alternate();
                    continue;
                }
                Stop::Special(')') => {
                    if self.stack.is_empty() {
                        return Err(self.error(ErrorKind::TooManyParens));
                    }
                    self.add_group()?;
                    self.pop_group()?;
                    self.pop_options();
                    if self.unit.is_none() {
                        continue;
                    }
                }
                Stop::Special('\\') => {
                    let node = self.scan_backslash()?;
                    self.unit = Some(node);
                }
                Stop::Special('^') => {
                    let kind = if self.uses(Options::MULTILINE) {
                        NodeKind::Bol
                    } else {
                        NodeKind::Beginning
                    };
                    self.add_unit_kind(kind);
                }
                Stop::Special('$') => {
                    let kind = if self.uses(Options::MULTILINE) {
                        NodeKind::Eol
                    } else {
                        NodeKind::EndZ
                    };
                    self.add_unit_kind(kind);
                }
                Stop::Special('.') => {
                    if self.uses(Options::SINGLELINE) {
                        self.add_unit_set(CharClass::any());
                    } else {
                        self.add_unit_kind(NodeKind::Notone('\n'));
                    }
                }
                Stop::Special(ch @ '{')
                | Stop::Special(ch @ '*')
                | Stop::Special(ch @ '+')
                | Stop::Special(ch @ '?') => {
                    if self.unit.is_none() {
                        let kind = if was_prev_quant {
                            ErrorKind::NestedQuantifier(ch)
                        } else {
                            ErrorKind::QuantifierAfterNothing
                        };
                        return Err(self.error(kind));
                    }
                    self.move_left();
                }
                Stop::Special(ch) => {
                    unreachable!("unexpected special character {:?}", ch)
                }
            }

            self.scan_blank()?;
            is_quant = self.is_true_quantifier();
            if !is_quant {
                self.add_concatenate();
                continue;
            }

            let ch = self.move_right_get();
            let (min, max) = match ch {
                '*' => (0, INFINITE),
                '?' => (0, 1),
                '+' => (1, INFINITE),
                '{' => {
                    let start = self.pos;
                    let min = self.scan_decimal()?;
                    let mut max = min;
                    if start < self.pos
                        && self.chars_right() > 0
                        && self.right_char() == ','
                    {
                        self.move_right();
                        max = if self.chars_right() == 0
                            || self.right_char() == '}'
                        {
                            INFINITE
                        } else {
                            self.scan_decimal()?
                        };
                    }
                    if start == self.pos
                        || self.chars_right() == 0
                        || self.move_right_get() != '}'
                    {
                        self.add_concatenate();
                        self.pos = start - 1;
                        continue;
                    }
                    (min, max)
                }
                _ => unreachable!("is_true_quantifier accepted {:?}", ch),
            };

            self.scan_blank()?;
            let lazy = self.chars_right() > 0 && self.right_char() == '?';
            if lazy {
                self.move_right();
            }
            if min > max {
                return Err(self.error(ErrorKind::ReversedQuantifierRange));
            }
            self.add_quantified(lazy, min, max);
        }

        if !self.stack.is_empty() {
            return Err(self.error(ErrorKind::NotEnoughParens));
        }
        self.add_group()?;
        // add_group always leaves the finished group as the unit.
        Ok(self.unit.take().unwrap())
    }

    /// Scan what follows an opening parenthesis. Returns `None` for an
    /// option-only group like `(?i)`, which produces no node.
    fn scan_group_open(&mut self) -> Result<Option<Node>, Error> {
        let ignore = mem::replace(&mut self.ignore_next_paren, false);
        if self.chars_right() == 0
            || self.right_char() != '?'
            || (self.chars_right() > 1 && self.right_char_at(1) == ')')
        {
            if self.uses(Options::EXPLICIT_CAPTURE) || ignore {
                return Ok(Some(Node::new(NodeKind::Group, self.options)));
            }
            let number = self.autocap;
            self.autocap += 1;
            let kind = NodeKind::Capture { number: Some(number), uncapture: None };
            return Ok(Some(Node::new(kind, self.options)));
        }
        self.move_right();
        if self.chars_right() == 0 {
            return Err(self.error(ErrorKind::UnrecognizedGrouping));
        }

        let kind = match self.move_right_get() {
            ':' => NodeKind::Group,
            '=' => {
                self.options = self.options.difference(Options::RIGHT_TO_LEFT);
                NodeKind::Require
            }
            '!' => {
                self.options = self.options.difference(Options::RIGHT_TO_LEFT);
                NodeKind::Prevent
            }
            '>' => NodeKind::Greedy,
            open @ '<' | open @ '\'' => {
                let close = if open == '\'' { '\'' } else { '>' };
                if self.chars_right() == 0 {
                    return Err(self.error(ErrorKind::UnrecognizedGrouping));
                }
                match self.move_right_get() {
                    '=' if close == '>' => {
                        self.options = self.options.union(Options::RIGHT_TO_LEFT);
                        NodeKind::Require
                    }
                    '!' if close == '>' => {
                        self.options = self.options.union(Options::RIGHT_TO_LEFT);
                        NodeKind::Prevent
                    }
                    _ => {
                        self.move_left();
                        return self.scan_capture_name(close).map(Some);
                    }
                }
            }
            '(' => return self.scan_condition().map(Some),
            _ => {
                self.move_left();
                self.scan_options();
                if self.chars_right() == 0 {
                    return Err(self.error(ErrorKind::UnrecognizedGrouping));
                }
                match self.move_right_get() {
                    ')' => return Ok(None),
                    ':' => NodeKind::Group,
                    _ => {
                        return Err(self.error(ErrorKind::UnrecognizedGrouping))
                    }
                }
            }
        };
        Ok(Some(Node::new(kind, self.options)))
    }

    /// Scan `name>`, `name-other>`, `-other>` or the numbered forms, with
    /// the cursor just past `<` (or `'`).
    fn scan_capture_name(&mut self, close: char) -> Result<Node, Error> {
        let ch = self.right_char();
        let mut number = None;
        let mut balancing_only = false;
        if ch.is_ascii_digit() {
            let n = self.scan_decimal()?;
            if n == 0 {
                return Err(self.error(ErrorKind::CaptureNumberZero));
            }
            if self.caps.contains(n) {
                number = Some(n);
            }
            if self.chars_right() > 0
                && !(self.right_char() == close || self.right_char() == '-')
            {
                return Err(self.error(ErrorKind::InvalidGroupName));
            }
        } else if is_word_char(ch) {
            let name = self.scan_capname();
            number = self.caps.number_of(&name);
            if self.chars_right() > 0
                && !(self.right_char() == close || self.right_char() == '-')
            {
                return Err(self.error(ErrorKind::InvalidGroupName));
            }
        } else if ch == '-' {
            balancing_only = true;
        } else {
            return Err(self.error(ErrorKind::InvalidGroupName));
        }

        let mut uncapture = None;
        if (number.is_some() || balancing_only)
            && self.chars_right() > 0
            && self.right_char() == '-'
        {
            self.move_right();
            if self.chars_right() == 0 {
                return Err(self.error(ErrorKind::InvalidGroupName));
            }
            let ch = self.right_char();
            if ('1'..='9').contains(&ch) {
                let n = self.scan_decimal()?;
                if !self.caps.contains(n) {
                    return Err(self.error(ErrorKind::UndefinedBackref(n)));
                }
                uncapture = Some(n);
            } else if is_word_char(ch) {
                let name = self.scan_capname();
                match self.caps.number_of(&name) {
                    Some(n) => uncapture = Some(n),
                    None => {
                        return Err(self.error(ErrorKind::UndefinedNameRef(name)))
                    }
                }
            } else {
                return Err(self.error(ErrorKind::InvalidGroupName));
            }
            if self.chars_right() > 0 && self.right_char() != close {
                return Err(self.error(ErrorKind::InvalidGroupName));
            }
        }

        if (number.is_some() || uncapture.is_some())
            && self.chars_right() > 0
            && self.move_right_get() == close
        {
            let kind = NodeKind::Capture { number, uncapture };
            return Ok(Node::new(kind, self.options));
        }
        Err(self.error(ErrorKind::UnrecognizedGrouping))
    }

    /// Scan the condition of `(?(...)`, with the cursor just past the
    /// second `(`.
    fn scan_condition(&mut self) -> Result<Node, Error> {
        let paren = self.pos;
        if self.chars_right() > 0 {
            let ch = self.right_char();
            if ch.is_ascii_digit() {
                let n = self.scan_decimal()?;
                if self.chars_right() > 0 && self.move_right_get() == ')' {
                    if self.caps.contains(n) {
                        return Ok(Node::new(NodeKind::Testref(n), self.options));
                    }
                    return Err(self.error(ErrorKind::UndefinedReference(n)));
                }
                return Err(self.error(ErrorKind::MalformedReference(n)));
            } else if is_word_char(ch) {
                let name = self.scan_capname();
                if let Some(n) = self.caps.number_of(&name) {
                    if self.chars_right() > 0 && self.move_right_get() == ')' {
                        return Ok(Node::new(NodeKind::Testref(n), self.options));
                    }
                }
            }
        }

        // Not a reference: rewind so the condition is scanned as a group of
        // its own, which must not capture.
        self.pos = paren - 1;
        self.ignore_next_paren = true;
        let right = self.chars_right();
        if right >= 3 && self.right_char_at(1) == '?' {
            let ch = self.right_char_at(2);
            if ch == '#' {
                return Err(self.error(ErrorKind::ConditionCantComment));
            }
            if ch == '\''
                || (right >= 4
                    && ch == '<'
                    && self.right_char_at(3) != '!'
                    && self.right_char_at(3) != '=')
            {
                return Err(self.error(ErrorKind::ConditionCantCapture));
            }
        }
        Ok(Node::new(NodeKind::Testgroup, self.options))
    }

    // Tree building.

    fn start_group(&mut self, group: Node) {
        self.group = group;
        self.alternation = Node::new(NodeKind::Alternate, self.options);
        self.concatenation = Node::new(NodeKind::Concatenate, self.options);
    }

    fn push_group(&mut self, group: Node) {
        let alternation = Node::new(NodeKind::Alternate, self.options);
        let concatenation = Node::new(NodeKind::Concatenate, self.options);
        self.stack.push(Frame {
            group: mem::replace(&mut self.group, group),
            alternation: mem::replace(&mut self.alternation, alternation),
            concatenation: mem::replace(&mut self.concatenation, concatenation),
        });
    }

    fn pop_group(&mut self) -> Result<(), Error> {
        // Callers check that the stack is non-empty.
        let frame = self.stack.pop().unwrap();
        self.group = frame.group;
        self.alternation = frame.alternation;
        self.concatenation = frame.concatenation;

        if self.group.kind() == &NodeKind::Testgroup
            && self.group.child_count() == 0
        {
            match self.unit.take() {
                Some(cond) => self.group.add_child(cond),
                None => return Err(self.error(ErrorKind::IllegalCondition)),
            }
        }
        Ok(())
    }

    fn take_concatenation(&mut self) -> Node {
        let fresh = Node::new(NodeKind::Concatenate, self.options);
        mem::replace(&mut self.concatenation, fresh).reverse_left()
    }

    fn add_alternate(&mut self) {
        let concat = self.take_concatenation();
        let conditional = matches!(
            self.group.kind(),
            NodeKind::Testgroup | NodeKind::Testref(_)
        );
        if conditional {
            self.group.add_child(concat);
        } else {
            self.alternation.add_child(concat);
        }
    }

    fn add_group(&mut self) -> Result<(), Error> {
        let concat = self.take_concatenation();
        let limit = match self.group.kind() {
            NodeKind::Testgroup => Some(3),
            NodeKind::Testref(_) => Some(2),
            _ => None,
        };
        match limit {
            Some(limit) => {
                self.group.add_child(concat);
                if self.group.child_count() > limit {
                    return Err(self.error(ErrorKind::TooManyAlternates));
                }
            }
            None => {
                self.alternation.add_child(concat);
                let fresh = Node::new(NodeKind::Alternate, self.options);
                let alternation = mem::replace(&mut self.alternation, fresh);
                self.group.add_child(alternation);
            }
        }
        let placeholder = Node::new(NodeKind::Nothing, self.options);
        self.unit = Some(mem::replace(&mut self.group, placeholder));
        Ok(())
    }

    fn add_concatenate(&mut self) {
        if let Some(unit) = self.unit.take() {
            self.concatenation.add_child(unit);
        }
    }

    fn add_quantified(&mut self, lazy: bool, min: u32, max: u32) {
        if let Some(unit) = self.unit.take() {
            self.concatenation.add_child(unit.make_quantifier(lazy, min, max));
        }
    }

    fn add_literal_run(&mut self, start: usize, len: usize) {
        let ignore_case = self.uses(Options::IGNORE_CASE);
        let chars = &self.pattern[start..start + len];
        let kind = if len == 1 {
            let mut ch = chars[0];
            if ignore_case {
                ch = self.culture.to_lower(ch);
            }
            NodeKind::One(ch)
        } else {
            let s = chars
                .iter()
                .map(|&ch| if ignore_case { self.culture.to_lower(ch) } else { ch })
                .collect();
            NodeKind::Multi(s)
        };
        let node = Node::new(kind, self.options);
        self.concatenation.add_child(node);
    }

    fn add_unit_one(&mut self, mut ch: char) {
        if self.uses(Options::IGNORE_CASE) {
            ch = self.culture.to_lower(ch);
        }
        self.unit = Some(Node::new(NodeKind::One(ch), self.options));
    }

    fn add_unit_set(&mut self, class: CharClass) {
        self.unit = Some(Node::new(NodeKind::Set(class), self.options));
    }

    fn add_unit_kind(&mut self, kind: NodeKind) {
        self.unit = Some(Node::new(kind, self.options));
    }
}

/// Characters that end a literal run.
fn is_special(ch: char) -> bool {
    matches!(
        ch,
        '\\' | '[' | '(' | ')' | '|' | '^' | '$' | '.' | '{' | '*' | '+' | '?'
    )
}

fn is_quantifier(ch: char) -> bool {
    matches!(ch, '{' | '*' | '+' | '?')
}

/// Characters that end a literal run in whitespace-insensitive mode.
fn is_stopper_x(ch: char) -> bool {
    is_special(ch) || is_space(ch) || ch == '#'
}

fn is_space(ch: char) -> bool {
    matches!(ch, ' ' | '\t' | '\n' | '\u{B}' | '\u{C}' | '\r')
}

/// Characters allowed in group names.
pub(super) fn is_word_char(ch: char) -> bool {
    regex_syntax::is_word_character(ch)
}
