//! Errors that can occur while building or running a grammar.
//!
//! Three kinds (see the design's error handling section): internal
//! match failures never leave this crate (`MatchFail`, crate-private,
//! defined in [`crate::matchers`]); [`SyntaxError`] is the user-facing
//! failure raised by an `errorOnFail` wrapper; [`EngineError`] covers
//! everything else that is a programmer mistake rather than an
//! ordinary parse outcome.

use std::fmt;

use gramma_core::Elem;

/// Unrecoverable, programmer-facing errors: undefined productions,
/// duplicate registration, malformed ranges, bad cursor bounds, or a
/// grammar that recurses deeper than the configured limit.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EngineError {
    #[error("undefined production: {name:?}")]
    UndefinedProduction { name: String },

    #[error("production {name:?} is already registered")]
    DuplicateDefinition { name: String },

    #[error("invalid range: {detail}")]
    InvalidRange { detail: String },

    #[error("invalid cursor bounds: start {start}, stop {stop}")]
    InvalidCursorBounds { start: usize, stop: usize },

    #[error("recursion limit exceeded (production nesting too deep)")]
    RecursionLimitExceeded,

    #[error("step limit exceeded (grammar did not terminate within the configured budget)")]
    StepLimitExceeded,
}

/// A user-facing syntax error raised by an `errorOnFail`-wrapped element
/// when its inner matcher fails with `NoMatch`.
///
/// Carries a full snapshot of the buffer being parsed alongside
/// `position`, so a caller can render a caret diagnostic (point at
/// `position` within `buffer`, show surrounding context) without having
/// to keep the original input around separately — the error is commonly
/// the only thing that survives past the `Parser::parse` call that
/// produced it.
///
/// `message` may contain `{production}` and `{expected}` placeholders,
/// substituted from `production`/`expected` at raise time (empty string
/// and a comma-joined list, respectively, when absent).
#[derive(Debug, Clone, PartialEq)]
pub struct SyntaxError<T: Elem> {
    pub position: usize,
    pub production: Option<String>,
    pub expected: Vec<String>,
    pub buffer: Vec<T>,
    message_template: String,
}

impl<T: Elem> SyntaxError<T> {
    pub fn new(
        position: usize,
        production: Option<String>,
        expected: Vec<String>,
        buffer: Vec<T>,
        message_template: impl Into<String>,
    ) -> Self {
        Self {
            position,
            production,
            expected,
            buffer,
            message_template: message_template.into(),
        }
    }

    /// The message with `{production}`/`{expected}` placeholders substituted.
    pub fn rendered_message(&self) -> String {
        let production = self.production.as_deref().unwrap_or("");
        let expected = self.expected.join(", ");
        self.message_template
            .replace("{production}", production)
            .replace("{expected}", &expected)
    }
}

impl<T: Elem> fmt::Display for SyntaxError<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} at byte {}", self.rendered_message(), self.position)?;
        if !self.expected.is_empty() {
            write!(f, " (expected: {})", self.expected.join(", "))?;
        }
        Ok(())
    }
}

impl<T: Elem> std::error::Error for SyntaxError<T> {}

/// The error type returned by [`crate::driver::Parser::parse`].
///
/// A parse can fail two distinct ways: an `errorOnFail` wrapper raised
/// a [`SyntaxError`] (the input was malformed), or the grammar itself
/// hit a programmer-level problem while running (an undefined
/// production discovered lazily, or a fuel limit tripped). Ordinary
/// backtracking failure is not an error at all — it is reported as
/// `(false, [], start)` from a successful `Result::Ok`.
#[derive(Debug, Clone, thiserror::Error)]
pub enum ParseError<T: Elem> {
    #[error(transparent)]
    Syntax(#[from] SyntaxError<T>),
    #[error(transparent)]
    Engine(#[from] EngineError),
}
