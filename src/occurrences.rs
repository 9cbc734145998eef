use std::fmt;
use std::ops::Deref;

use crate::error::Result;
use crate::INITIAL_OCCURRENCE_CAPACITY;

/// Line numbers at which a key was seen, in discovery order.
///
/// The list is append-only. Repeated lines are kept, so inserting the same
/// `(key, line)` pair twice records `line` twice.
#[derive(Clone, Default, PartialEq, Eq, Hash)]
pub struct Occurrences {
    lines: Vec<u32>,
}

impl Occurrences {
    pub fn new() -> Self {
        Self { lines: Vec::new() }
    }

    /// Start a list holding only `line`, reserving room for the lines that
    /// usually follow.
    pub(crate) fn try_with_line(line: u32) -> Result<Self> {
        let mut lines = Vec::new();
        lines.try_reserve(INITIAL_OCCURRENCE_CAPACITY)?;
        lines.push(line);
        Ok(Self { lines })
    }

    /// Append `line`. On allocation failure the list is left untouched.
    pub(crate) fn try_push(&mut self, line: u32) -> Result<()> {
        self.lines.try_reserve(1)?;
        self.lines.push(line);
        Ok(())
    }

    #[inline]
    pub fn as_slice(&self) -> &[u32] {
        &self.lines
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

impl Deref for Occurrences {
    type Target = [u32];

    fn deref(&self) -> &[u32] {
        &self.lines
    }
}

impl AsRef<[u32]> for Occurrences {
    fn as_ref(&self) -> &[u32] {
        &self.lines
    }
}

impl PartialEq<[u32]> for Occurrences {
    fn eq(&self, other: &[u32]) -> bool {
        self.lines == other
    }
}

impl<const N: usize> PartialEq<[u32; N]> for Occurrences {
    fn eq(&self, other: &[u32; N]) -> bool {
        self.lines == other
    }
}

impl<'a> IntoIterator for &'a Occurrences {
    type Item = &'a u32;
    type IntoIter = std::slice::Iter<'a, u32>;

    fn into_iter(self) -> Self::IntoIter {
        self.lines.iter()
    }
}

impl fmt::Debug for Occurrences {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(&self.lines).finish()
    }
}

/// Renders as `1, 2, 5`.
impl fmt::Display for Occurrences {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut lines = self.lines.iter();
        if let Some(first) = lines.next() {
            write!(f, "{first}")?;
            for line in lines {
                write!(f, ", {line}")?;
            }
        }
        Ok(())
    }
}
