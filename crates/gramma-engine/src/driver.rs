//! Top-level driver: the `Parser` entry point (§4.6, §6).

use gramma_core::{CaseFold, Cursor, Match, RangeMember};

use crate::error::{EngineError, ParseError};
use crate::matchers::{match_element, MatchContext, Signal};
use crate::registry::{ElementRef, GrammarRegistry, GrammarUnit};

/// Default recursion-depth guard (§12): generous enough for realistic
/// grammars, low enough to fail gracefully well before overflowing the
/// native call stack.
pub const DEFAULT_MAX_RECURSION_DEPTH: u32 = 512;

/// Entry point that owns a compiled grammar and runs it against
/// buffers. Construct via [`Parser::build`], tune fuel via
/// [`Parser::with_recursion_limit`]/[`Parser::with_step_limit`], then
/// call [`Parser::parse`] once per input.
pub struct Parser<T: CaseFold + RangeMember> {
    registry: GrammarRegistry<T>,
    root: ElementRef,
    max_recursion_depth: Option<u32>,
    max_steps: Option<u64>,
}

impl<T: CaseFold + RangeMember> Parser<T> {
    /// Resolve `root_name` in `unit` and build a parser for it.
    pub fn build(unit: GrammarUnit<T>, root_name: &str) -> Result<Self, EngineError> {
        let registry = GrammarRegistry::new(unit);
        let primary = registry.primary_unit();
        let id = registry
            .unit(primary)
            .get(root_name)
            .ok_or_else(|| EngineError::UndefinedProduction { name: root_name.to_string() })?;
        Ok(Self {
            registry,
            root: ElementRef { unit: primary, id },
            max_recursion_depth: Some(DEFAULT_MAX_RECURSION_DEPTH),
            max_steps: None,
        })
    }

    /// Build a parser directly from a registry whose primary unit
    /// already has `root_name` registered — used when the grammar
    /// needs library fallback sources wired up before the first parse
    /// (`add_source` on the registry before calling this).
    pub fn from_registry(registry: GrammarRegistry<T>, root_name: &str) -> Result<Self, EngineError> {
        let primary = registry.primary_unit();
        let id = registry
            .unit(primary)
            .get(root_name)
            .ok_or_else(|| EngineError::UndefinedProduction { name: root_name.to_string() })?;
        Ok(Self {
            registry,
            root: ElementRef { unit: primary, id },
            max_recursion_depth: Some(DEFAULT_MAX_RECURSION_DEPTH),
            max_steps: None,
        })
    }

    /// Override the recursion-depth guard (§12). `None` disables it —
    /// not recommended outside of tests, since a deeply/infinitely
    /// left-recursive grammar will overflow the native stack instead
    /// of returning `EngineError::RecursionLimitExceeded`.
    pub fn with_recursion_limit(mut self, limit: Option<u32>) -> Self {
        self.max_recursion_depth = limit;
        self
    }

    /// Override the step-count guard (§12). Unset by default.
    pub fn with_step_limit(mut self, limit: Option<u64>) -> Self {
        self.max_steps = limit;
        self
    }

    pub fn registry(&self) -> &GrammarRegistry<T> {
        &self.registry
    }

    pub fn registry_mut(&mut self) -> &mut GrammarRegistry<T> {
        &mut self.registry
    }

    /// Run the grammar against `buffer`, starting at `start` and
    /// stopping at `stop` (normalized per §4.6 — `None` means "end of
    /// buffer", negative values are relative to `buffer.len()`).
    ///
    /// Returns `(success, children, final_position)` on any ordinary
    /// outcome, including backtracking failure (`success = false`).
    /// Only an `errorOnFail`-raised [`crate::SyntaxError`] or a
    /// programmer-level [`EngineError`] surfaces as `Err`.
    pub fn parse(
        &mut self,
        buffer: &[T],
        start: isize,
        stop: Option<isize>,
    ) -> Result<(bool, Vec<Match>, usize), ParseError<T>> {
        let mut cursor = Cursor::normalized(buffer.len(), start, stop, false)
            .expect("lenient cursor normalization never fails");
        let start_pos = cursor.current();

        let mut ctx = MatchContext {
            buffer,
            registry: &mut self.registry,
            max_recursion_depth: self.max_recursion_depth,
            max_steps: self.max_steps,
            depth: 0,
            steps: 0,
        };

        match match_element(&mut ctx, self.root.unit, self.root.id, &mut cursor) {
            Ok(children) => Ok((true, children, cursor.current())),
            Err(Signal::Fail(_)) => Ok((false, Vec::new(), start_pos)),
            Err(Signal::Syntax(e)) => Err(ParseError::Syntax(e)),
            Err(Signal::Fatal(e)) => Err(ParseError::Engine(e)),
        }
    }
}
