//! # two-three-index
//!
//! An inverted line index over words, backed by a 2-3 search tree.
//!
//! Every distinct word maps to the line numbers it was seen on, in the order
//! they were reported. The tree keeps all leaves at the same depth by
//! splitting full nodes and promoting their middle key, so lookups and
//! inserts touch `O(log n)` nodes.
//!
//! Tokenizing text is left to the caller: the index consumes already
//! normalized `(word, line)` pairs.
//!
//! ## Example
//!
//! ```rust
//! use two_three_index::{Order, TwoThreeIndex};
//!
//! let mut index = TwoThreeIndex::new();
//! index.insert("the", 1).unwrap();
//! index.insert("quick", 1).unwrap();
//! index.insert("the", 2).unwrap();
//!
//! assert_eq!(index.search("the").unwrap(), &[1, 2]);
//! assert!(index.search("cat").is_err());
//!
//! let sorted: Vec<&str> = index.traverse(Order::In).collect();
//! assert_eq!(sorted, ["quick", "the"]);
//! ```

use std::fmt;
use std::time::Instant;

mod error;
mod node;
mod occurrences;
mod traverse;

pub use error::{IndexError, Result};
pub use node::Node;
pub use occurrences::Occurrences;
pub use traverse::{Iter, Order, Traverse};

use node::Entry;

// =============================================================================
// Configuration
// =============================================================================

/// Room reserved up front in a new key's occurrence list.
pub const INITIAL_OCCURRENCE_CAPACITY: usize = 10;
/// Word list capacity reserved by [`TwoThreeIndex::with_word_capacity`]
/// callers that do not know their input size.
pub const INITIAL_WORD_CAPACITY: usize = 1000;

/// Copy `s` into a fresh `String`, reporting allocation failure instead of
/// aborting.
pub(crate) fn try_owned(s: &str) -> Result<String> {
    let mut owned = String::new();
    owned.try_reserve_exact(s.len())?;
    owned.push_str(s);
    Ok(owned)
}

// =============================================================================
// Word list
// =============================================================================

/// One reported `(word, line)` pair, kept in arrival order so the tree can
/// be rebuilt from scratch.
#[derive(Clone, Debug, PartialEq, Eq)]
struct Word {
    token: String,
    line: u32,
}

/// Summary of a bulk build.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct BuildStats {
    /// Non-empty tokens consumed.
    pub total_words: usize,
    /// Keys that were new to the index.
    pub distinct_words: usize,
    /// Height of the tree after the build.
    pub height: usize,
}

// =============================================================================
// Index
// =============================================================================

/// Word to line-number index stored in a 2-3 tree.
///
/// Invariants:
/// - each node holds one or two keys, ordered, with zero children (leaf) or
///   one more child than keys
/// - keys in a child subtree fall strictly between the keys around it
/// - all leaves sit at the same depth
/// - each key appears once
#[derive(Clone, Default)]
pub struct TwoThreeIndex {
    root: Option<Box<Node>>,
    /// Every pair ever inserted, duplicates included. Source of truth for
    /// [`delete`](Self::delete).
    words: Vec<Word>,
    /// Distinct keys in the tree.
    count: usize,
}

impl TwoThreeIndex {
    pub fn new() -> Self {
        Self {
            root: None,
            words: Vec::new(),
            count: 0,
        }
    }

    /// Empty index whose word list can take `capacity` pairs before
    /// reallocating.
    pub fn with_word_capacity(capacity: usize) -> Result<Self> {
        let mut index = Self::new();
        index.words.try_reserve(capacity)?;
        Ok(index)
    }

    /// Number of distinct keys.
    #[inline]
    pub fn len(&self) -> usize {
        self.count
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Number of `(word, line)` pairs inserted and not deleted.
    #[inline]
    pub fn word_count(&self) -> usize {
        self.words.len()
    }

    /// Levels in the tree; 0 when empty.
    pub fn height(&self) -> usize {
        self.root.as_deref().map_or(0, Node::height)
    }

    /// Root node, for callers that render or inspect the tree shape.
    pub fn root(&self) -> Option<&Node> {
        self.root.as_deref()
    }

    pub fn get(&self, key: &str) -> Option<&Occurrences> {
        self.root.as_deref()?.find(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    /// Line numbers recorded for `key`, in insertion order.
    pub fn search(&self, key: &str) -> Result<&Occurrences> {
        self.get(key).ok_or_else(|| IndexError::not_found(key))
    }

    /// Record that `key` occurs on `line`.
    ///
    /// A known key gets `line` appended to its occurrences (repeats
    /// included); the tree shape is untouched. A new key is added to the
    /// tree, possibly splitting nodes up to and including the root.
    ///
    /// Allocation failure is reported before anything changes, leaving the
    /// index as it was.
    pub fn insert(&mut self, key: &str, line: u32) -> Result<()> {
        self.words.try_reserve(1)?;
        let word = Word {
            token: try_owned(key)?,
            line,
        };

        if let Some(lines) = self.root.as_deref_mut().and_then(|root| root.find_mut(key)) {
            lines.try_push(line)?;
            self.words.push(word);
            return Ok(());
        }

        let entry = Entry::try_new(key, line)?;
        self.words.push(word);
        self.insert_new(entry);
        Ok(())
    }

    fn insert_new(&mut self, entry: Entry) {
        let root = match self.root.take() {
            None => Box::new(Node::new(entry)),
            Some(root) => {
                let (root, split) = Node::insert(root, entry).into_root();
                if split {
                    tracing::trace!(height = root.height(), "root split");
                }
                root
            }
        };
        self.root = Some(root);
        self.count += 1;
    }

    /// Insert every `(word, line)` pair in order, skipping empty words.
    ///
    /// Each pair is inserted atomically; on error the pairs before the
    /// failing one stay inserted.
    pub fn extend_from<I, S>(&mut self, pairs: I) -> Result<BuildStats>
    where
        I: IntoIterator<Item = (S, u32)>,
        S: AsRef<str>,
    {
        let span = tracing::debug_span!("two_three_index_build", words_before = self.words.len());
        let _guard = span.enter();

        let start = Instant::now();
        let distinct_before = self.count;
        let mut total_words = 0usize;

        for (token, line) in pairs {
            let token = token.as_ref();
            if token.is_empty() {
                continue;
            }
            self.insert(token, line)?;
            total_words += 1;
        }

        let stats = BuildStats {
            total_words,
            distinct_words: self.count - distinct_before,
            height: self.height(),
        };
        tracing::debug!(
            total_words = stats.total_words,
            distinct_words = stats.distinct_words,
            height = stats.height,
            elapsed = ?start.elapsed(),
            "built index"
        );
        Ok(stats)
    }

    /// Remove `key` and all of its occurrences.
    ///
    /// There is no in-place 2-3 deletion: the key's pairs are dropped from
    /// the word list and a new tree is built by re-inserting the remaining
    /// pairs in their original order. The new tree replaces the current one
    /// only once it is complete, so a failure leaves the index unchanged.
    pub fn delete(&mut self, key: &str) -> Result<()> {
        let removed = self.words.iter().filter(|w| w.token == key).count();
        if removed == 0 {
            return Err(IndexError::not_found(key));
        }

        let retained = self.words.len() - removed;
        let span = tracing::debug_span!("two_three_index_delete", key, retained);
        let _guard = span.enter();

        let mut rebuilt = Self::with_word_capacity(retained)?;
        for word in self.words.iter().filter(|w| w.token != key) {
            rebuilt.insert(&word.token, word.line)?;
        }
        debug_assert!(rebuilt.get(key).is_none());

        tracing::debug!(distinct = rebuilt.count, height = rebuilt.height(), "rebuilt index");
        *self = rebuilt;
        Ok(())
    }

    /// Drop every node and the word list.
    pub fn clear(&mut self) {
        self.root = None;
        self.words.clear();
        self.count = 0;
    }

    /// Lazily walk the keys in the given order.
    pub fn traverse(&self, order: Order) -> Traverse<'_> {
        Traverse::new(self.root.as_deref(), order)
    }

    /// Sorted `(key, occurrences)` pairs.
    pub fn iter(&self) -> Iter<'_> {
        Iter::new(self.root.as_deref())
    }
}

impl<'a> IntoIterator for &'a TwoThreeIndex {
    type Item = (&'a str, &'a Occurrences);
    type IntoIter = Iter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl fmt::Debug for TwoThreeIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}


#[cfg(test)]
mod proptests;
