//! Flag → variant dispatch.
//!
//! §4.3's composition rule selects one of eight base behaviors from the
//! `{negative, repeating, optional}` flags, then wraps it with
//! lookahead and/or error-on-fail. Variant selection is a pure function
//! of three booleans known at grammar-compile time, so instead of the
//! dynamic method-name dispatch the design notes describe, we resolve
//! it once per element into a plain enum and match on that at every
//! invocation — no closures, no per-call string work.

use gramma_core::{ElementFlags, ErrorOnFail};

/// One of the eight base matcher behaviors, selected from
/// `{negative, repeating, optional}` in that order (§4.3 step 2).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatcherVariant {
    Base,
    Optional,
    Repeating,
    RepeatingOptional,
    Negative,
    NegativeOptional,
    NegativeRepeating,
    NegativeRepeatingOptional,
}

impl MatcherVariant {
    pub fn from_flags(flags: &ElementFlags) -> Self {
        match (flags.negative, flags.repeating, flags.optional) {
            (false, false, false) => Self::Base,
            (false, false, true) => Self::Optional,
            (false, true, false) => Self::Repeating,
            (false, true, true) => Self::RepeatingOptional,
            (true, false, false) => Self::Negative,
            (true, false, true) => Self::NegativeOptional,
            (true, true, false) => Self::NegativeRepeating,
            (true, true, true) => Self::NegativeRepeatingOptional,
        }
    }

    pub fn is_negative(self) -> bool {
        matches!(
            self,
            Self::Negative | Self::NegativeOptional | Self::NegativeRepeating | Self::NegativeRepeatingOptional
        )
    }

    pub fn is_repeating(self) -> bool {
        matches!(
            self,
            Self::Repeating | Self::RepeatingOptional | Self::NegativeRepeating | Self::NegativeRepeatingOptional
        )
    }

    pub fn is_optional(self) -> bool {
        matches!(
            self,
            Self::Optional | Self::RepeatingOptional | Self::NegativeOptional | Self::NegativeRepeatingOptional
        )
    }
}

/// The fully-resolved compiled shape of one element token: its base
/// variant plus the two possible outer wrappers (§4.3 steps 3-5).
/// Computed once per element the first time it is invoked and cached
/// alongside the element in the unit's compiled-element table.
#[derive(Debug, Clone)]
pub struct CompiledElement {
    pub variant: MatcherVariant,
    pub lookahead: bool,
    pub error_on_fail: Option<ErrorOnFail>,
}

impl CompiledElement {
    pub fn from_flags(flags: &ElementFlags) -> Self {
        Self {
            variant: MatcherVariant::from_flags(flags),
            lookahead: flags.lookahead,
            error_on_fail: flags.error_on_fail.clone(),
        }
    }
}
