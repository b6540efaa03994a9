//! Character-range membership predicate for the `Range` primitive.
//!
//! The grammar compiler may hand the engine a range expressed as a sorted
//! list of code-point pairs, a string of allowed characters, or any other
//! shape with a `c ∈ S` semantics. We normalize all of those into one
//! canonical representation at grammar-compile time so that `Range`
//! matching is a binary search over disjoint inclusive intervals rather
//! than a linear scan of whatever shape the caller handed us.
//!
//! Intervals are stored as `u32` code points rather than `char` so the
//! same `CharSet` backs `Range` over both `&str`/`&[char]` buffers and
//! `&[u8]` buffers — see [`crate::element::RangeMember`].

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// An inclusive code-point interval `[lo, hi]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct CodePointInterval {
    pub lo: u32,
    pub hi: u32,
}

impl CodePointInterval {
    pub fn new(lo: u32, hi: u32) -> Self {
        assert!(lo <= hi, "CodePointInterval: lo must be <= hi");
        Self { lo, hi }
    }
}

/// A canonical, sorted, disjoint set of inclusive code-point ranges.
///
/// This is the internal representation backing the `Range` element
/// token's `value` field.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct CharSet {
    intervals: Vec<CodePointInterval>,
}

impl CharSet {
    /// Build a `CharSet` from an arbitrary list of (possibly overlapping,
    /// possibly unsorted) intervals, normalizing into sorted disjoint form.
    pub fn from_intervals(mut intervals: Vec<CodePointInterval>) -> Self {
        intervals.sort();
        let mut merged: Vec<CodePointInterval> = Vec::with_capacity(intervals.len());
        for iv in intervals {
            match merged.last_mut() {
                Some(last) if can_merge(last, &iv) => {
                    last.hi = last.hi.max(iv.hi);
                }
                _ => merged.push(iv),
            }
        }
        Self { intervals: merged }
    }

    /// Build a `CharSet` from a literal string of individually-allowed
    /// characters, e.g. grammar syntax like `[abc]`.
    pub fn from_chars(chars: &str) -> Self {
        let intervals = chars
            .chars()
            .map(|c| CodePointInterval::new(c as u32, c as u32))
            .collect();
        Self::from_intervals(intervals)
    }

    /// A single inclusive character range, e.g. grammar syntax like `[a-z]`.
    pub fn from_char_range(lo: char, hi: char) -> Self {
        Self::from_intervals(vec![CodePointInterval::new(lo as u32, hi as u32)])
    }

    /// A single inclusive byte range, for grammars matching over `&[u8]`.
    pub fn from_byte_range(lo: u8, hi: u8) -> Self {
        Self::from_intervals(vec![CodePointInterval::new(lo as u32, hi as u32)])
    }

    /// Membership test: is `c ∈ S`?
    pub fn contains_code_point(&self, c: u32) -> bool {
        self.intervals
            .binary_search_by(|iv| {
                if c < iv.lo {
                    std::cmp::Ordering::Greater
                } else if c > iv.hi {
                    std::cmp::Ordering::Less
                } else {
                    std::cmp::Ordering::Equal
                }
            })
            .is_ok()
    }

    pub fn contains(&self, c: char) -> bool {
        self.contains_code_point(c as u32)
    }

    pub fn intervals(&self) -> &[CodePointInterval] {
        &self.intervals
    }
}

/// Two intervals can be merged into one if they overlap or are adjacent
/// (e.g. `[a-m]` and `[n-z]` merge into `[a-z]`).
fn can_merge(a: &CodePointInterval, b: &CodePointInterval) -> bool {
    // `b` comes after `a` in sort order, so only check a.hi against b.lo.
    match a.hi.checked_add(1) {
        Some(next) => next >= b.lo,
        None => true,
    }
}
