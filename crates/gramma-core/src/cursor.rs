//! The backtracking cursor: three indices into a materialized buffer.

use thiserror::Error;

/// `start ≤ current ≤ stop` is maintained by every public constructor;
/// matcher code is free to advance `current` past `stop` only
/// transiently (e.g. mid Literal comparison) and must not leave it
/// there on return.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cursor {
    start: usize,
    stop: usize,
    current: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum CursorError {
    #[error("cursor construction error: stop ({stop}) < start ({start})")]
    StopBeforeStart { start: usize, stop: usize },
}

impl Cursor {
    /// Construct a cursor directly from already-normalized bounds.
    /// Prefer [`Cursor::normalized`] when bounds come from user input
    /// (they may be out of range or negative-relative, per §4.6).
    pub fn new(start: usize, stop: usize) -> Result<Self, CursorError> {
        if stop < start {
            return Err(CursorError::StopBeforeStart { start, stop });
        }
        Ok(Self {
            start,
            stop,
            current: start,
        })
    }

    /// Build a cursor from `(buffer_len, start, stop)` applying the
    /// top-level driver's normalization rules (§4.6):
    /// - `stop = None` ⇒ `stop = buffer_len`
    /// - negative-relative `start`/`stop` (expressed here as an `isize`,
    ///   since there is no Python-style negative indexing on `usize`)
    ///   are resolved against `buffer_len` and clamped to `0`
    /// - `stop > buffer_len` ⇒ `stop = buffer_len`
    /// - `stop < start` ⇒ `stop = start` (lenient mode) or a
    ///   construction error (`strict = true`)
    pub fn normalized(
        buffer_len: usize,
        start: isize,
        stop: Option<isize>,
        strict: bool,
    ) -> Result<Self, CursorError> {
        let resolve = |v: isize| -> usize {
            if v < 0 {
                (buffer_len as isize + v).max(0) as usize
            } else {
                v as usize
            }
        };

        let start = resolve(start);
        let mut stop = match stop {
            None => buffer_len,
            Some(v) => resolve(v),
        };
        stop = stop.min(buffer_len);

        if stop < start {
            if strict {
                return Err(CursorError::StopBeforeStart { start, stop });
            }
            stop = start;
        }

        Ok(Self {
            start,
            stop,
            current: start,
        })
    }

    #[inline]
    pub fn start(&self) -> usize {
        self.start
    }

    #[inline]
    pub fn stop(&self) -> usize {
        self.stop
    }

    #[inline]
    pub fn current(&self) -> usize {
        self.current
    }

    #[inline]
    pub fn at_end(&self) -> bool {
        self.current >= self.stop
    }

    #[inline]
    pub fn remaining(&self) -> usize {
        self.stop.saturating_sub(self.current)
    }

    /// Advance `current` to `new_current`. Matcher code calls this on
    /// success; `new_current` must be `>= current()` per the primitive
    /// matcher contract (§4.1).
    #[inline]
    pub fn advance_to(&mut self, new_current: usize) {
        debug_assert!(new_current >= self.current, "cursor must not move backward on success");
        self.current = new_current;
    }

    /// Save the current position for a speculative call. Backtracking
    /// wrappers (optional, choice, negative, lookahead) call this before
    /// attempting a child and [`Cursor::restore`] on failure (or always,
    /// for lookahead).
    #[inline]
    pub fn save(&self) -> usize {
        self.current
    }

    #[inline]
    pub fn restore(&mut self, saved: usize) {
        self.current = saved;
    }
}
