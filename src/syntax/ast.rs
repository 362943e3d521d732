/*!
The abstract syntax tree produced by the parser.

Every node records the options in effect when it was created. Since an
inline option change only affects nodes created after it, a subtree never
changes meaning when a later `(?i)` or `(?-m)` is seen.
*/

use crate::{options::Options, syntax::class::CharClass};

/// The repetition bound used for "no upper limit".
pub const INFINITE: u32 = i32::MAX as u32;

/// A single node in a pattern's syntax tree.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Node {
    kind: NodeKind,
    options: Options,
    children: Vec<Node>,
}

/// The kind of a node, along with any payload specific to that kind.
///
/// Literal characters (in `One`, `Notone`, `Multi` and the single-character
/// repetitions) are already lowered when the node is case insensitive.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum NodeKind {
    /// Exactly one character.
    One(char),
    /// Any character except the given one.
    Notone(char),
    /// Any character in a class.
    Set(CharClass),
    /// A literal string of two or more characters.
    Multi(String),
    /// A backreference to a capture number.
    Ref(u32),
    /// A greedy repetition of one character.
    Oneloop { ch: char, min: u32, max: u32 },
    /// A greedy repetition of anything but one character.
    Notoneloop { ch: char, min: u32, max: u32 },
    /// A greedy repetition of a class.
    Setloop { class: CharClass, min: u32, max: u32 },
    /// A lazy repetition of one character.
    Onelazy { ch: char, min: u32, max: u32 },
    /// A lazy repetition of anything but one character.
    Notonelazy { ch: char, min: u32, max: u32 },
    /// A lazy repetition of a class.
    Setlazy { class: CharClass, min: u32, max: u32 },
    /// A greedy repetition of its only child.
    Loop { min: u32, max: u32 },
    /// A lazy repetition of its only child.
    Lazyloop { min: u32, max: u32 },
    /// `^` with multiline.
    Bol,
    /// `$` with multiline.
    Eol,
    /// `\b`.
    Boundary,
    /// `\B`.
    Nonboundary,
    /// `\b` in ECMAScript mode.
    EcmaBoundary,
    /// `\B` in ECMAScript mode.
    NonEcmaBoundary,
    /// `\A`, or `^` without multiline.
    Beginning,
    /// `\G`.
    Start,
    /// `\Z`, or `$` without multiline.
    EndZ,
    /// `\z`.
    End,
    /// Never matches.
    Nothing,
    /// Always matches the empty string.
    Empty,
    /// One of the children.
    Alternate,
    /// All of the children in sequence.
    Concatenate,
    /// A capturing group. `number` is `None` for a balancing group that
    /// only uncaptures, as in `(?<-name>...)`.
    Capture { number: Option<u32>, uncapture: Option<u32> },
    /// A non-capturing group. Groups never survive reduction.
    Group,
    /// A positive lookaround.
    Require,
    /// A negative lookaround.
    Prevent,
    /// An atomic group.
    Greedy,
    /// `(?(number)yes|no)`: children are `yes` and an optional `no`.
    Testref(u32),
    /// `(?(cond)yes|no)`: children are `cond`, `yes` and an optional `no`.
    Testgroup,
}

impl Node {
    pub(crate) fn new(kind: NodeKind, options: Options) -> Node {
        Node { kind, options, children: vec![] }
    }

    pub fn kind(&self) -> &NodeKind {
        &self.kind
    }

    /// The options in effect when this node was created.
    pub fn options(&self) -> Options {
        self.options
    }

    pub fn children(&self) -> &[Node] {
        &self.children
    }

    pub fn is_right_to_left(&self) -> bool {
        self.options.contains(Options::RIGHT_TO_LEFT)
    }

    pub fn is_ignore_case(&self) -> bool {
        self.options.contains(Options::IGNORE_CASE)
    }

    /// Add a child, reducing it first.
    pub(crate) fn add_child(&mut self, child: Node) {
        self.children.push(child.reduce());
    }

    pub(crate) fn child_count(&self) -> usize {
        self.children.len()
    }

    /// Reverse a concatenation's children when it is right-to-left, so that
    /// children are stored in the order they are matched.
    pub(crate) fn reverse_left(mut self) -> Node {
        if self.is_right_to_left()
            && self.kind == NodeKind::Concatenate
        {
            self.children.reverse();
        }
        self
    }

    /// Wrap this node in a quantifier.
    pub(crate) fn make_quantifier(self, lazy: bool, min: u32, max: u32) -> Node {
        if min == 0 && max == 0 {
            return Node::new(NodeKind::Empty, self.options);
        }
        if min == 1 && max == 1 {
            return self;
        }
        let kind = match self.kind {
            NodeKind::One(ch) if lazy => Some(NodeKind::Onelazy { ch, min, max }),
            NodeKind::One(ch) => Some(NodeKind::Oneloop { ch, min, max }),
            NodeKind::Notone(ch) if lazy => {
                Some(NodeKind::Notonelazy { ch, min, max })
            }
            NodeKind::Notone(ch) => Some(NodeKind::Notoneloop { ch, min, max }),
            NodeKind::Set(ref class) if lazy => {
                Some(NodeKind::Setlazy { class: class.clone(), min, max })
            }
            NodeKind::Set(ref class) => {
                Some(NodeKind::Setloop { class: class.clone(), min, max })
            }
            _ => None,
        };
        match kind {
            Some(kind) => Node::new(kind, self.options),
            None => {
                let kind = if lazy {
                    NodeKind::Lazyloop { min, max }
                } else {
                    NodeKind::Loop { min, max }
                };
                let mut wrapper = Node::new(kind, self.options);
                wrapper.add_child(self);
                wrapper
            }
        }
    }

    /// Apply local simplifications that don't change what a node matches.
    pub(crate) fn reduce(self) -> Node {
        match self.kind {
            NodeKind::Alternate => self.reduce_alternation(),
            NodeKind::Concatenate => self.reduce_concatenation(),
            NodeKind::Group => self.reduce_group(),
            NodeKind::Set(_)
            | NodeKind::Setloop { .. }
            | NodeKind::Setlazy { .. } => self.reduce_set(),
            _ => self,
        }
    }

    fn reduce_group(mut self) -> Node {
        while self.kind == NodeKind::Group && self.children.len() == 1 {
            // Checked by the loop condition.
            self = self.children.pop().unwrap();
        }
        self
    }

    fn reduce_set(mut self) -> Node {
        let (class, rep) = match self.kind {
            NodeKind::Set(ref class) => (class, None),
            NodeKind::Setloop { ref class, min, max } => {
                (class, Some((false, min, max)))
            }
            NodeKind::Setlazy { ref class, min, max } => {
                (class, Some((true, min, max)))
            }
            _ => return self,
        };
        let kind = if let Some(ch) = class.single_char() {
            match rep {
                None => NodeKind::One(ch),
                Some((false, min, max)) => NodeKind::Oneloop { ch, min, max },
                Some((true, min, max)) => NodeKind::Onelazy { ch, min, max },
            }
        } else if let Some(ch) = class.negated_single_char() {
            match rep {
                None => NodeKind::Notone(ch),
                Some((false, min, max)) => NodeKind::Notoneloop { ch, min, max },
                Some((true, min, max)) => NodeKind::Notonelazy { ch, min, max },
            }
        } else {
            return self;
        };
        self.kind = kind;
        self
    }

    fn reduce_alternation(mut self) -> Node {
        let children = core::mem::replace(&mut self.children, vec![]);
        let mut stack: Vec<Node> = children.into_iter().rev().collect();
        while let Some(mut child) = stack.pop() {
            match child.kind {
                NodeKind::Nothing => {}
                NodeKind::Alternate => {
                    let grand = core::mem::replace(&mut child.children, vec![]);
                    stack.extend(grand.into_iter().rev());
                }
                _ => self.children.push(child),
            }
        }
        self.strip(NodeKind::Nothing)
    }

    fn reduce_concatenation(mut self) -> Node {
        let rtl = self.is_right_to_left();
        let children = core::mem::replace(&mut self.children, vec![]);
        let mut stack: Vec<Node> = children.into_iter().rev().collect();
        while let Some(mut child) = stack.pop() {
            match child.kind {
                NodeKind::Empty => continue,
                NodeKind::Concatenate if child.is_right_to_left() == rtl => {
                    let grand = core::mem::replace(&mut child.children, vec![]);
                    stack.extend(grand.into_iter().rev());
                    continue;
                }
                _ => {}
            }
            if let Some(prev) = self.children.last_mut() {
                if prev.options == child.options {
                    if let Some(merged) = merge_literals(prev, &child) {
                        prev.kind = merged;
                        continue;
                    }
                }
            }
            self.children.push(child);
        }
        self.strip(NodeKind::Empty)
    }

    /// Collapse a node with zero children into `empty` and a node with one
    /// child into that child.
    fn strip(mut self, empty: NodeKind) -> Node {
        match self.children.len() {
            0 => Node::new(empty, self.options),
            // Checked by the match arm.
            1 => self.children.pop().unwrap(),
            _ => self,
        }
    }

    /// Take this node's children, leaving it a leaf.
    pub(crate) fn take_children(&mut self) -> Vec<Node> {
        core::mem::replace(&mut self.children, vec![])
    }
}

fn literal_text(node: &Node) -> Option<String> {
    match node.kind {
        NodeKind::One(ch) => Some(ch.to_string()),
        NodeKind::Multi(ref s) => Some(s.clone()),
        _ => None,
    }
}

/// Merge `next` into the adjacent literal `prev`. Right-to-left nodes are
/// stored in match order, so `next` precedes `prev` in the text.
fn merge_literals(prev: &Node, next: &Node) -> Option<NodeKind> {
    let a = literal_text(prev)?;
    let b = literal_text(next)?;
    if prev.is_right_to_left() {
        Some(NodeKind::Multi(b + &a))
    } else {
        Some(NodeKind::Multi(a + &b))
    }
}

impl Drop for Node {
    fn drop(&mut self) {
        if self.children.iter().all(|c| c.children.is_empty()) {
            return;
        }
        let mut stack = core::mem::replace(&mut self.children, vec![]);
        while let Some(mut node) = stack.pop() {
            stack.extend(node.take_children());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn one(ch: char) -> Node {
        Node::new(NodeKind::One(ch), Options::empty())
    }

    fn concat(children: Vec<Node>, options: Options) -> Node {
        let mut node = Node::new(NodeKind::Concatenate, options);
        for c in children {
            node.add_child(c);
        }
        node
    }

    #[test]
    fn literals_merge() {
        let node = concat(vec![one('a'), one('b'), one('c')], Options::empty())
            .reduce();
        assert_eq!(&NodeKind::Multi("abc".to_string()), node.kind());
    }

    #[test]
    fn literals_merge_right_to_left() {
        let rtl = Options::RIGHT_TO_LEFT;
        let mut node = Node::new(NodeKind::Concatenate, rtl);
        node.add_child(Node::new(NodeKind::One('b'), rtl));
        node.add_child(Node::new(NodeKind::One('a'), rtl));
        assert_eq!(&NodeKind::Multi("ab".to_string()), node.reduce().kind());
    }

    #[test]
    fn different_options_do_not_merge() {
        let mut node = Node::new(NodeKind::Concatenate, Options::empty());
        node.add_child(Node::new(NodeKind::One('a'), Options::IGNORE_CASE));
        node.add_child(one('a'));
        let node = node.reduce();
        assert_eq!(&NodeKind::Concatenate, node.kind());
        assert_eq!(2, node.children().len());
    }

    #[test]
    fn alternation_drops_nothing() {
        let mut alt = Node::new(NodeKind::Alternate, Options::empty());
        alt.add_child(Node::new(NodeKind::Nothing, Options::empty()));
        alt.add_child(one('x'));
        assert_eq!(&NodeKind::One('x'), alt.reduce().kind());

        let empty = Node::new(NodeKind::Alternate, Options::empty());
        assert_eq!(&NodeKind::Nothing, empty.reduce().kind());
    }

    #[test]
    fn quantifier_shapes() {
        assert_eq!(
            &NodeKind::Oneloop { ch: 'a', min: 1, max: INFINITE },
            one('a').make_quantifier(false, 1, INFINITE).kind()
        );
        assert_eq!(&NodeKind::Empty, one('a').make_quantifier(true, 0, 0).kind());
        assert_eq!(&NodeKind::One('a'), one('a').make_quantifier(false, 1, 1).kind());
        let multi = Node::new(NodeKind::Multi("ab".into()), Options::empty());
        let q = multi.make_quantifier(true, 0, 2);
        assert_eq!(&NodeKind::Lazyloop { min: 0, max: 2 }, q.kind());
        assert_eq!(1, q.children().len());
    }

    #[test]
    fn deep_tree_drops() {
        let mut node = one('a');
        for _ in 0..200_000 {
            let mut parent = Node::new(NodeKind::Greedy, Options::empty());
            parent.children.push(node);
            node = parent;
        }
        drop(node);
    }
}
