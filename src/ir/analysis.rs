/*!
Analyses over a syntax tree that let a matcher skip hopeless starting
positions.

All three analyses look at the elements a match must begin with, in the
order they are matched. Since a right-to-left concatenation stores its
children in matching order, the same walk serves both directions.
*/

use crate::{
    ir::prefix::{FirstChars, SkipPrefix},
    syntax::{CharClass, Node, NodeKind},
    util::{
        anchors::{Anchor, AnchorSet},
        culture::Culture,
    },
};

/// The longest literal prefix kept for skip searching.
const MAX_PREFIX: usize = 64;

/// First-character sets larger than this are not worth scanning for.
const MAX_FIRST_CHARS: u32 = 0x4000;

/// The anchors at the start and end of a pattern.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct Anchors {
    /// Anchors that must hold where a match starts.
    pub leading: AnchorSet,
    /// Anchors that must hold where a match ends.
    pub trailing: AnchorSet,
}

/// Find the anchors at both ends of a pattern.
///
/// Leading anchors are collected through concatenations, captures and
/// atomic groups, stepping over other zero-width elements, up to the first
/// element that consumes input. Trailing anchors are found the same way
/// from the other end.
pub fn anchors(root: &Node) -> Anchors {
    Anchors {
        leading: edge_anchors(root, false),
        trailing: edge_anchors(root, true),
    }
}

fn edge_anchors(root: &Node, from_end: bool) -> AnchorSet {
    let mut set = AnchorSet::empty();
    let mut node = root;
    // The concatenation being walked along with the number of its children
    // visited so far.
    let mut concat: Option<(&Node, usize)> = None;
    loop {
        match *node.kind() {
            NodeKind::Concatenate if !node.children().is_empty() => {
                concat = Some((node, 0));
            }
            NodeKind::Capture { .. } | NodeKind::Greedy
                if !node.children().is_empty() =>
            {
                node = &node.children()[0];
                concat = None;
                continue;
            }
            NodeKind::Empty | NodeKind::Require | NodeKind::Prevent => {}
            ref kind => match anchor_of(kind) {
                Some(anchor) => set = set.insert(anchor),
                None => return set,
            },
        }
        match concat {
            Some((c, visited)) if visited < c.children().len() => {
                let index = if from_end {
                    c.children().len() - 1 - visited
                } else {
                    visited
                };
                node = &c.children()[index];
                concat = Some((c, visited + 1));
            }
            _ => return set,
        }
    }
}

fn anchor_of(kind: &NodeKind) -> Option<Anchor> {
    let anchor = match *kind {
        NodeKind::Beginning => Anchor::Beginning,
        NodeKind::Bol => Anchor::Bol,
        NodeKind::Start => Anchor::Start,
        NodeKind::Eol => Anchor::Eol,
        NodeKind::EndZ => Anchor::EndZ,
        NodeKind::End => Anchor::End,
        NodeKind::Boundary => Anchor::Boundary,
        NodeKind::EcmaBoundary => Anchor::EcmaBoundary,
        _ => return None,
    };
    Some(anchor)
}

/// Compute the start-search prefixes of a pattern: a skip prefix when
/// every match begins with a literal of two or more characters, else a
/// first-character set when one can be determined.
pub fn prefixes(
    root: &Node,
    culture: Culture,
) -> (Option<FirstChars>, Option<SkipPrefix>) {
    if let Some((literal, ignore_case, rtl)) = literal_prefix(root) {
        if literal.chars().count() >= 2 {
            let skip = SkipPrefix::new(&literal, ignore_case, rtl);
            return (None, Some(skip));
        }
    }
    (first_chars(root, culture), None)
}

/// The literal every match begins with, along with whether it is case
/// insensitive and right-to-left.
pub fn literal_prefix(root: &Node) -> Option<(String, bool, bool)> {
    let mut node = root;
    let mut concat: Option<(&Node, usize)> = None;
    loop {
        match *node.kind() {
            NodeKind::Concatenate if !node.children().is_empty() => {
                concat = Some((node, 0));
            }
            NodeKind::Capture { .. } | NodeKind::Greedy
                if !node.children().is_empty() =>
            {
                node = &node.children()[0];
                concat = None;
                continue;
            }
            NodeKind::Oneloop { ch, min, .. }
            | NodeKind::Onelazy { ch, min, .. } => {
                if min == 0 {
                    return None;
                }
                let n = (min as usize).min(MAX_PREFIX);
                let literal: String = core::iter::repeat(ch).take(n).collect();
                return Some(flagged(node, literal));
            }
            NodeKind::One(ch) => return Some(flagged(node, ch.to_string())),
            NodeKind::Multi(ref s) => {
                let mut literal: Vec<char> = s.chars().collect();
                if literal.len() > MAX_PREFIX {
                    // Keep the chars matched first.
                    if node.is_right_to_left() {
                        literal.drain(..literal.len() - MAX_PREFIX);
                    } else {
                        literal.truncate(MAX_PREFIX);
                    }
                }
                return Some(flagged(node, literal.into_iter().collect()));
            }
            NodeKind::Empty | NodeKind::Require | NodeKind::Prevent => {}
            ref kind if anchor_of(kind).is_some() => {}
            _ => return None,
        }
        match concat {
            Some((c, visited)) if visited < c.children().len() => {
                node = &c.children()[visited];
                concat = Some((c, visited + 1));
            }
            _ => return None,
        }
    }
}

fn flagged(node: &Node, literal: String) -> (String, bool, bool) {
    (literal, node.is_ignore_case(), node.is_right_to_left())
}

/// What is known about the first char of the strings a subtree matches.
#[derive(Clone, Debug)]
struct Fc {
    ranges: Vec<(char, char)>,
    /// The subtree can match the empty string.
    nullable: bool,
    ignore_case: bool,
}

impl Fc {
    fn of(ranges: Vec<(char, char)>, nullable: bool, node: &Node) -> Fc {
        Fc { ranges, nullable, ignore_case: node.is_ignore_case() }
    }

    fn empty(nullable: bool) -> Fc {
        Fc { ranges: vec![], nullable, ignore_case: false }
    }
}

/// Compute the set of chars that every match must begin with. Returns
/// `None` if the pattern can match the empty string, or if the set cannot
/// be determined (because of a backreference or conditional).
pub fn first_chars(root: &Node, culture: Culture) -> Option<FirstChars> {
    // Post-order walk. `None` in the results means "unknown".
    let mut stack: Vec<(&Node, bool)> = vec![(root, false)];
    let mut results: Vec<Option<Fc>> = vec![];
    while let Some((node, expanded)) = stack.pop() {
        if !expanded && !node.children().is_empty() {
            stack.push((node, true));
            for child in node.children().iter().rev() {
                stack.push((child, false));
            }
            continue;
        }
        let at = results.len() - node.children().len().min(results.len());
        let children: Vec<Option<Fc>> = if expanded {
            results.drain(at..).collect()
        } else {
            vec![]
        };
        results.push(combine(node, children));
    }
    let fc = results.pop()??;
    if fc.nullable {
        return None;
    }
    let cls = CharClass::new(fc.ranges);
    let size: u32 = cls
        .ranges()
        .iter()
        .map(|&(s, e)| u32::from(e) - u32::from(s) + 1)
        .sum();
    if size > MAX_FIRST_CHARS {
        return None;
    }
    if !fc.ignore_case {
        return Some(FirstChars::new(cls, false));
    }
    // Input is lowered before the membership test, so the set must hold
    // the lowercase form of every member.
    let mut ranges = cls.ranges().to_vec();
    for &(s, e) in cls.ranges() {
        for ch in (u32::from(s)..=u32::from(e)).filter_map(char::from_u32) {
            let lower = culture.to_lower(ch);
            if lower != ch {
                ranges.push((lower, lower));
            }
        }
    }
    Some(FirstChars::new(CharClass::new(ranges), true))
}

fn combine(node: &Node, children: Vec<Option<Fc>>) -> Option<Fc> {
    let fc = match *node.kind() {
        NodeKind::One(ch) => Fc::of(vec![(ch, ch)], false, node),
        NodeKind::Notone(ch) => Fc::of(except(ch), false, node),
        NodeKind::Set(ref cls) => Fc::of(cls.ranges().to_vec(), false, node),
        NodeKind::Multi(ref s) => {
            let first = if node.is_right_to_left() {
                s.chars().next_back()
            } else {
                s.chars().next()
            };
            match first {
                Some(ch) => Fc::of(vec![(ch, ch)], false, node),
                None => Fc::empty(true),
            }
        }
        NodeKind::Oneloop { ch, min, .. }
        | NodeKind::Onelazy { ch, min, .. } => {
            Fc::of(vec![(ch, ch)], min == 0, node)
        }
        NodeKind::Notoneloop { ch, min, .. }
        | NodeKind::Notonelazy { ch, min, .. } => {
            Fc::of(except(ch), min == 0, node)
        }
        NodeKind::Setloop { ref class, min, .. }
        | NodeKind::Setlazy { ref class, min, .. } => {
            Fc::of(class.ranges().to_vec(), min == 0, node)
        }
        NodeKind::Nothing => Fc::empty(false),
        NodeKind::Ref(_) | NodeKind::Testref(_) | NodeKind::Testgroup => {
            return None
        }
        NodeKind::Empty
        | NodeKind::Require
        | NodeKind::Prevent
        | NodeKind::Bol
        | NodeKind::Eol
        | NodeKind::Boundary
        | NodeKind::Nonboundary
        | NodeKind::EcmaBoundary
        | NodeKind::NonEcmaBoundary
        | NodeKind::Beginning
        | NodeKind::Start
        | NodeKind::EndZ
        | NodeKind::End => Fc::empty(true),
        NodeKind::Capture { .. } | NodeKind::Greedy | NodeKind::Group => {
            return children.into_iter().next().unwrap_or(Some(Fc::empty(true)))
        }
        NodeKind::Loop { min, .. } | NodeKind::Lazyloop { min, .. } => {
            let mut fc =
                children.into_iter().next().unwrap_or(Some(Fc::empty(true)))?;
            fc.nullable |= min == 0;
            fc
        }
        NodeKind::Concatenate => {
            let mut acc = Fc::empty(true);
            for child in children {
                if !acc.nullable {
                    break;
                }
                let child = child?;
                acc.ranges.extend(child.ranges);
                acc.ignore_case |= child.ignore_case;
                acc.nullable = child.nullable;
            }
            acc
        }
        NodeKind::Alternate => {
            let mut acc = Fc::empty(false);
            for child in children {
                let child = child?;
                acc.ranges.extend(child.ranges);
                acc.ignore_case |= child.ignore_case;
                acc.nullable |= child.nullable;
            }
            acc
        }
    };
    Some(fc)
}

/// Every char except `ch`.
fn except(ch: char) -> Vec<(char, char)> {
    let mut ranges = vec![];
    if ch != '\0' {
        let before = match ch {
            '\u{E000}' => '\u{D7FF}',
            _ => char::from_u32(u32::from(ch) - 1).unwrap_or('\0'),
        };
        ranges.push(('\0', before));
    }
    if ch != char::MAX {
        let after = match ch {
            '\u{D7FF}' => '\u{E000}',
            _ => char::from_u32(u32::from(ch) + 1).unwrap_or(char::MAX),
        };
        ranges.push((after, char::MAX));
    }
    ranges
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{options::Options, syntax};

    fn root(pattern: &str, options: Options) -> Node {
        syntax::parse(pattern, options).unwrap().root().clone()
    }

    #[test]
    fn leading_and_trailing_anchors() {
        let got = anchors(&root("^a+b$", Options::empty()));
        assert_eq!(AnchorSet::empty().insert(Anchor::Beginning), got.leading);
        assert_eq!(AnchorSet::empty().insert(Anchor::EndZ), got.trailing);

        let got = anchors(&root(r"(?=x)\A\Gx", Options::empty()));
        assert_eq!(
            AnchorSet::empty().insert(Anchor::Beginning).insert(Anchor::Start),
            got.leading
        );

        let got = anchors(&root("a|^b", Options::empty()));
        assert!(got.leading.is_empty());
    }

    #[test]
    fn literal_prefixes() {
        let got = literal_prefix(&root(r"\bfoo\d", Options::empty()));
        assert_eq!(Some(("foo".to_string(), false, false)), got);

        let got = literal_prefix(&root("a{3}b", Options::IGNORE_CASE));
        assert_eq!(Some(("aaa".to_string(), true, false)), got);

        assert_eq!(None, literal_prefix(&root("a*b", Options::empty())));
        assert_eq!(None, literal_prefix(&root("a|b", Options::empty())));
    }

    #[test]
    fn first_char_sets() {
        let fc = first_chars(&root("a*b|c", Options::empty()), Culture::Invariant)
            .unwrap();
        assert_eq!(&[('a', 'c')], fc.class().ranges());
        assert!(!fc.is_ignore_case());

        let fc = first_chars(&root("(?i:a)|B", Options::empty()), Culture::Invariant)
            .unwrap();
        assert!(fc.is_ignore_case());
        assert!(fc.class().contains('b'));

        assert!(first_chars(&root("a?", Options::empty()), Culture::Invariant)
            .is_none());
        assert!(first_chars(&root(r"(a)\1", Options::empty()), Culture::Invariant)
            .is_some());
        assert!(first_chars(&root(r"\1?(a)", Options::empty()), Culture::Invariant)
            .is_none());
    }

    #[test]
    fn right_to_left_begins_at_the_end() {
        let fc = first_chars(
            &root("ab|cd", Options::RIGHT_TO_LEFT),
            Culture::Invariant,
        )
        .unwrap();
        assert!(fc.class().contains('b'));
        assert!(fc.class().contains('d'));
        assert!(!fc.class().contains('a'));
    }
}
