//! Modifier flags attached to an element token.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// The modifier flags that alter how an element token matches and reports.
///
/// `optional` and `errorOnFail` are mutually exclusive — an optional match
/// can never "require" success — and construction enforces that (see
/// [`ElementFlags::validate`]).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ElementFlags {
    pub negative: bool,
    pub optional: bool,
    pub repeating: bool,
    pub lookahead: bool,
    pub report: bool,
    pub expanded: bool,
    pub error_on_fail: Option<ErrorOnFail>,
}

impl ElementFlags {
    /// Flags for a plain, reporting, once-only match.
    pub fn reporting() -> Self {
        Self {
            report: true,
            ..Self::default()
        }
    }

    /// Flags for a plain, non-reporting, once-only match (most grammar
    /// glue — sequence members, literals inside a production — never
    /// report their own node).
    pub fn silent() -> Self {
        Self::default()
    }

    pub fn with_optional(mut self, optional: bool) -> Self {
        self.optional = optional;
        self
    }

    pub fn with_repeating(mut self, repeating: bool) -> Self {
        self.repeating = repeating;
        self
    }

    pub fn with_negative(mut self, negative: bool) -> Self {
        self.negative = negative;
        self
    }

    pub fn with_lookahead(mut self, lookahead: bool) -> Self {
        self.lookahead = lookahead;
        self
    }

    pub fn with_expanded(mut self, expanded: bool) -> Self {
        self.expanded = expanded;
        self
    }

    pub fn with_error_on_fail(mut self, descriptor: ErrorOnFail) -> Self {
        self.error_on_fail = Some(descriptor);
        self
    }

    /// Validates the flag invariants documented on the data model.
    /// Grammar compilers should call this once per element token at
    /// construction time; the engine itself never re-checks it.
    pub fn validate(&self) -> Result<(), FlagError> {
        if self.optional && self.error_on_fail.is_some() {
            return Err(FlagError::OptionalWithErrorOnFail);
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum FlagError {
    #[error("an element cannot be both optional and error-on-fail")]
    OptionalWithErrorOnFail,
}

/// Configuration for the error-on-fail wrapper: when the inner matcher
/// fails with `NoMatch`, this is used to raise a user-facing
/// [`crate::SyntaxError`](../gramma_engine/struct.SyntaxError.html)-equivalent instead of backtracking.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ErrorOnFail {
    /// Name of the production this descriptor is attached to, for
    /// diagnostics (`None` if the element is anonymous/inline).
    pub production: Option<String>,
    /// Format string; may contain `{production}` / `{expected}` placeholders.
    pub message: String,
    /// Human-readable description(s) of what was expected at this point.
    pub expected: Vec<String>,
}

impl ErrorOnFail {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            production: None,
            message: message.into(),
            expected: Vec::new(),
        }
    }

    pub fn with_production(mut self, production: impl Into<String>) -> Self {
        self.production = Some(production.into());
        self
    }

    pub fn with_expected(mut self, expected: Vec<String>) -> Self {
        self.expected = expected;
        self
    }
}
