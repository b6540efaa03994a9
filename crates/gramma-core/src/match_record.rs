//! The match tree: the unit of output produced by a successful parse.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// A tag identifying which production produced a [`Match`].
///
/// Kept as an owned `String` rather than an interned symbol at this
/// layer — match trees are meant to be handed to an external
/// dispatch-processor that walks them long after the grammar (and its
/// interner) may have gone out of scope.
pub type Tag = String;

/// A node in the match tree: `(tag, start, stop, children)`.
///
/// Implementations that need positional tuple-style access (index
/// `0..3`, for generic tree walkers ported from the original source)
/// should use [`Match::as_tuple`].
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Match {
    pub tag: Tag,
    pub start: usize,
    pub stop: usize,
    pub children: Vec<Match>,
}

impl Match {
    pub fn new(tag: impl Into<Tag>, start: usize, stop: usize, children: Vec<Match>) -> Self {
        Self {
            tag: tag.into(),
            start,
            stop,
            children,
        }
    }

    /// Positional tuple view, matching the stable externally-observed
    /// shape `(tag, start, stop, children)`.
    pub fn as_tuple(&self) -> (&str, usize, usize, &[Match]) {
        (&self.tag, self.start, self.stop, &self.children)
    }

    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }
}
