use std::iter::FusedIterator;

use crate::node::{Entry, Node};
use crate::occurrences::Occurrences;

/// Traversal discipline for [`TwoThreeIndex::traverse`].
///
/// Within a node the keys always come out in ascending order. In-order
/// visits `left, key1, middle, key2, right`, which yields every key sorted.
///
/// [`TwoThreeIndex::traverse`]: crate::TwoThreeIndex::traverse
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Order {
    /// A node's keys, then its children left to right.
    Pre,
    /// Children interleaved with the keys that separate them.
    In,
    /// A node's children left to right, then its keys.
    Post,
}

enum Step<'a> {
    Visit(&'a Node),
    Emit(&'a Entry),
}

/// Explicit-stack walk shared by [`Traverse`] and [`Iter`].
struct Walk<'a> {
    order: Order,
    stack: Vec<Step<'a>>,
}

impl<'a> Walk<'a> {
    fn new(root: Option<&'a Node>, order: Order) -> Self {
        let mut stack = Vec::new();
        if let Some(root) = root {
            stack.push(Step::Visit(root));
        }
        Self { order, stack }
    }

    fn expand(&mut self, node: &'a Node) {
        let low = Some(Step::Emit(node.low()));
        let high = node.high().map(Step::Emit);
        let [left, middle, right] =
            [node.left(), node.middle(), node.right()].map(|c| c.map(Step::Visit));

        let steps = match self.order {
            Order::Pre => [low, high, left, middle, right],
            Order::In => [left, low, middle, high, right],
            Order::Post => [left, middle, right, low, high],
        };
        // Reversed so the first step ends up on top.
        self.stack.extend(steps.into_iter().rev().flatten());
    }

    fn next_entry(&mut self) -> Option<&'a Entry> {
        while let Some(step) = self.stack.pop() {
            match step {
                Step::Visit(node) => self.expand(node),
                Step::Emit(entry) => return Some(entry),
            }
        }
        None
    }
}

/// Lazy walk over the keys of an index in a chosen [`Order`].
///
/// Borrowing the index keeps it frozen for the lifetime of the walk; call
/// `traverse` again to restart.
pub struct Traverse<'a> {
    walk: Walk<'a>,
}

impl<'a> Traverse<'a> {
    pub(crate) fn new(root: Option<&'a Node>, order: Order) -> Self {
        Self {
            walk: Walk::new(root, order),
        }
    }
}

impl<'a> Iterator for Traverse<'a> {
    type Item = &'a str;

    fn next(&mut self) -> Option<Self::Item> {
        self.walk.next_entry().map(|e| e.key.as_str())
    }
}

impl FusedIterator for Traverse<'_> {}

/// Sorted iterator over `(key, occurrences)` pairs.
pub struct Iter<'a> {
    walk: Walk<'a>,
}

impl<'a> Iter<'a> {
    pub(crate) fn new(root: Option<&'a Node>) -> Self {
        Self {
            walk: Walk::new(root, Order::In),
        }
    }
}

impl<'a> Iterator for Iter<'a> {
    type Item = (&'a str, &'a Occurrences);

    fn next(&mut self) -> Option<Self::Item> {
        self.walk.next_entry().map(|e| (e.key.as_str(), &e.lines))
    }
}

impl FusedIterator for Iter<'_> {}
