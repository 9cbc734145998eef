//! 2-3 tree nodes and the split-and-promote insert.
//!
//! A node holds one key (2-node) or two ordered keys (3-node) and, unless it
//! is a leaf, exactly one more child than it has keys. Growth only happens at
//! the leaves: a full node splits, its middle key rises into the parent, and
//! a root split adds one level above every leaf at once. Nothing ever
//! rebalances after the fact.

use std::mem;

use crate::error::Result;
use crate::occurrences::Occurrences;
use crate::try_owned;

/// A key together with its occurrence list.
#[derive(Clone, Debug)]
pub(crate) struct Entry {
    pub(crate) key: String,
    pub(crate) lines: Occurrences,
}

impl Entry {
    /// Copy `key` and start its occurrence list at `line`. All allocation
    /// happens here so that the structural insert that follows cannot fail.
    pub(crate) fn try_new(key: &str, line: u32) -> Result<Self> {
        Ok(Self {
            key: try_owned(key)?,
            lines: Occurrences::try_with_line(line)?,
        })
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Branch {
    Left,
    Middle,
    Right,
}

/// One node of the 2-3 tree.
///
/// A 2-node uses `left` and `middle`; a 3-node additionally uses `right`.
/// A leaf has no children at all.
#[derive(Clone, Debug)]
pub struct Node {
    low: Entry,
    high: Option<Entry>,
    left: Option<Box<Node>>,
    middle: Option<Box<Node>>,
    right: Option<Box<Node>>,
}

/// Outcome of inserting a new key below some subtree root.
pub(crate) enum Insertion {
    /// The subtree absorbed the key. The same root is handed back.
    Unchanged(Box<Node>),
    /// The subtree root split. The carried 2-node holds the promoted key and
    /// the two halves, and must be merged into the parent (or become the new
    /// root).
    Replaced(Box<Node>),
}

impl Node {
    /// A leaf holding exactly one key.
    pub(crate) fn new(entry: Entry) -> Self {
        Self {
            low: entry,
            high: None,
            left: None,
            middle: None,
            right: None,
        }
    }

    fn with_children(entry: Entry, left: Box<Node>, middle: Box<Node>) -> Self {
        Self {
            low: entry,
            high: None,
            left: Some(left),
            middle: Some(middle),
            right: None,
        }
    }

    #[inline]
    pub fn is_leaf(&self) -> bool {
        self.left.is_none() && self.middle.is_none() && self.right.is_none()
    }

    #[inline]
    pub fn is_three_node(&self) -> bool {
        self.high.is_some()
    }

    /// 1 for a 2-node, 2 for a 3-node.
    #[inline]
    pub fn key_count(&self) -> usize {
        1 + usize::from(self.high.is_some())
    }

    pub fn first_key(&self) -> &str {
        &self.low.key
    }

    pub fn first_lines(&self) -> &Occurrences {
        &self.low.lines
    }

    pub fn second_key(&self) -> Option<&str> {
        self.high.as_ref().map(|e| e.key.as_str())
    }

    pub fn second_lines(&self) -> Option<&Occurrences> {
        self.high.as_ref().map(|e| &e.lines)
    }

    /// Present children, left to right.
    pub fn children(&self) -> impl Iterator<Item = &Node> + '_ {
        [&self.left, &self.middle, &self.right]
            .into_iter()
            .filter_map(|c| c.as_deref())
    }

    pub(crate) fn low(&self) -> &Entry {
        &self.low
    }

    pub(crate) fn high(&self) -> Option<&Entry> {
        self.high.as_ref()
    }

    pub(crate) fn left(&self) -> Option<&Node> {
        self.left.as_deref()
    }

    pub(crate) fn middle(&self) -> Option<&Node> {
        self.middle.as_deref()
    }

    pub(crate) fn right(&self) -> Option<&Node> {
        self.right.as_deref()
    }

    /// Number of levels in this subtree, counting this node.
    pub fn height(&self) -> usize {
        1 + self.children().map(Node::height).max().unwrap_or(0)
    }

    /// Which child subtree would hold `key`. Only meaningful when `key`
    /// matches neither key of this node.
    fn branch_for(&self, key: &str) -> Branch {
        if key < self.low.key.as_str() {
            return Branch::Left;
        }
        match &self.high {
            Some(high) if key >= high.key.as_str() => Branch::Right,
            _ => Branch::Middle,
        }
    }

    fn child(&self, branch: Branch) -> Option<&Node> {
        match branch {
            Branch::Left => self.left.as_deref(),
            Branch::Middle => self.middle.as_deref(),
            Branch::Right => self.right.as_deref(),
        }
    }

    fn child_slot(&mut self, branch: Branch) -> &mut Option<Box<Node>> {
        match branch {
            Branch::Left => &mut self.left,
            Branch::Middle => &mut self.middle,
            Branch::Right => &mut self.right,
        }
    }

    /// Occurrence list of `key` if it lives in this subtree.
    pub(crate) fn find(&self, key: &str) -> Option<&Occurrences> {
        let mut node = self;
        loop {
            if node.low.key == key {
                return Some(&node.low.lines);
            }
            if let Some(high) = &node.high {
                if high.key == key {
                    return Some(&high.lines);
                }
            }
            node = node.child(node.branch_for(key))?;
        }
    }

    pub(crate) fn find_mut(&mut self, key: &str) -> Option<&mut Occurrences> {
        if self.low.key == key {
            return Some(&mut self.low.lines);
        }
        if self.high.as_ref().is_some_and(|high| high.key == key) {
            return self.high.as_mut().map(|high| &mut high.lines);
        }
        let branch = self.branch_for(key);
        self.child_slot(branch).as_deref_mut()?.find_mut(key)
    }

    /// Insert a key that is not yet present anywhere below `node`.
    ///
    /// Descends to the leaf whose range brackets the key, merges a fresh
    /// one-key node into it and carries any split back up, merging each
    /// promoted node into the parent it came from.
    pub(crate) fn insert(mut node: Box<Node>, entry: Entry) -> Insertion {
        debug_assert!(
            node.low.key != entry.key && node.high.as_ref().map_or(true, |h| h.key != entry.key),
            "existing keys take the append path"
        );

        let branch = node.branch_for(&entry.key);
        match node.child_slot(branch).take() {
            None => {
                debug_assert!(node.is_leaf(), "internal node missing {branch:?} child");
                Node::merge(node, Box::new(Node::new(entry)))
            }
            Some(child) => match Node::insert(child, entry) {
                Insertion::Unchanged(child) => {
                    *node.child_slot(branch) = Some(child);
                    Insertion::Unchanged(node)
                }
                Insertion::Replaced(promoted) => Node::merge(node, promoted),
            },
        }
    }

    /// Absorb `incoming` into `existing`, splitting `existing` if it is full.
    ///
    /// `incoming` is a one-key node whose `left`/`middle` are the two halves
    /// of a split one level down (or empty when it is a fresh leaf). The
    /// child slot of `existing` it descended through must already be vacated;
    /// the halves take its place.
    pub(crate) fn merge(mut existing: Box<Node>, incoming: Box<Node>) -> Insertion {
        debug_assert!(incoming.high.is_none() && incoming.right.is_none());

        let Some(high) = existing.high.take() else {
            Node::absorb(&mut existing, *incoming);
            return Insertion::Unchanged(existing);
        };

        let promoted = if incoming.low.key < existing.low.key {
            // Came from the left: `low` rises, `existing` keeps `high` and
            // its former middle/right children.
            debug_assert!(existing.left.is_none());
            let rising = mem::replace(&mut existing.low, high);
            existing.left = existing.middle.take();
            existing.middle = existing.right.take();
            Node::with_children(rising, incoming, existing)
        } else if incoming.low.key < high.key {
            // Came from the middle: the incoming key is the median and rises
            // itself. Its halves are shared between the two sides.
            debug_assert!(existing.middle.is_none());
            let Node {
                low: rising,
                left: lower_half,
                middle: upper_half,
                ..
            } = *incoming;
            let sibling = Node {
                low: high,
                high: None,
                left: upper_half,
                middle: existing.right.take(),
                right: None,
            };
            existing.middle = lower_half;
            Node::with_children(rising, existing, Box::new(sibling))
        } else {
            // Came from the right: `high` rises, `existing` keeps `low` and
            // its former left/middle children.
            debug_assert!(existing.right.is_none());
            Node::with_children(high, existing, incoming)
        };

        Insertion::Replaced(Box::new(promoted))
    }

    /// Case where `existing` is a 2-node and simply becomes a 3-node.
    fn absorb(existing: &mut Node, incoming: Node) {
        let Node {
            low: entry,
            left: lower_half,
            middle: upper_half,
            ..
        } = incoming;

        if entry.key > existing.low.key {
            debug_assert!(existing.middle.is_none() && existing.right.is_none());
            existing.high = Some(entry);
            existing.middle = lower_half;
            existing.right = upper_half;
        } else {
            debug_assert!(existing.left.is_none() && existing.right.is_none());
            let displaced = mem::replace(&mut existing.low, entry);
            existing.high = Some(displaced);
            existing.right = existing.middle.take();
            existing.middle = upper_half;
            existing.left = lower_half;
        }
    }
}

impl Insertion {
    /// The subtree root after the insert, and whether it split.
    pub(crate) fn into_root(self) -> (Box<Node>, bool) {
        match self {
            Insertion::Unchanged(node) => (node, false),
            Insertion::Replaced(node) => (node, true),
        }
    }
}
