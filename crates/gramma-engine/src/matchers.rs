//! The recursive matcher: primitive dispatch, modifier-variant
//! behavior, lookahead/error-on-fail wrapping, and match-tree assembly.
//!
//! Everything here is internal. The only public surface this module
//! feeds is [`crate::driver::Parser`].

use gramma_core::{
    CaseFold, CharSet, Cursor, Element, ElementFlags, ElementId, ElementKind, Match, RangeMember,
};

use crate::error::{EngineError, SyntaxError};
use crate::registry::{ElementRef, GrammarRegistry, ResolvedRef, UnitId};

/// Internal, non-`std::error::Error` control-flow signal. Never part of
/// a public `Result` — see §7's three-kind error split.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum MatchFail {
    NoMatch,
    EofReached,
}

/// The full internal failure channel a matcher call can raise.
/// Wrappers (optional/choice/repeating/negative) only ever catch
/// `Fail`; `Syntax` and `Fatal` always propagate past them.
#[derive(Debug, Clone)]
pub(crate) enum Signal<T: gramma_core::Elem> {
    Fail(MatchFail),
    Syntax(SyntaxError<T>),
    Fatal(EngineError),
}

impl<T: gramma_core::Elem> From<EngineError> for Signal<T> {
    fn from(e: EngineError) -> Self {
        Signal::Fatal(e)
    }
}

type MResult<T> = Result<Vec<Match>, Signal<T>>;

/// Per-parse mutable state threaded through every recursive call:
/// the buffer, the grammar, and the two fuel counters from §12.
pub(crate) struct MatchContext<'a, T: CaseFold + RangeMember> {
    pub buffer: &'a [T],
    pub registry: &'a mut GrammarRegistry<T>,
    pub max_recursion_depth: Option<u32>,
    pub max_steps: Option<u64>,
    pub depth: u32,
    pub steps: u64,
}

/// Entry point: match the element `id` (in `unit`) against `cursor`,
/// applying its full flag-derived behavior (variant, lookahead,
/// error-on-fail) and assembling its contribution to the match tree.
pub(crate) fn match_element<T: CaseFold + RangeMember>(
    ctx: &mut MatchContext<T>,
    unit: UnitId,
    id: ElementId,
    cursor: &mut Cursor,
) -> MResult<T> {
    ctx.steps += 1;
    if let Some(max) = ctx.max_steps {
        if ctx.steps > max {
            return Err(Signal::Fatal(EngineError::StepLimitExceeded));
        }
    }

    let element = ctx.registry.unit(unit).element(id).clone();
    let compiled = crate::compile::CompiledElement::from_flags(&element.flags);

    let saved = cursor.save();
    let variant_result = match_variant(ctx, unit, id, &element, compiled.variant, cursor);

    let after_lookahead = if compiled.lookahead {
        match variant_result {
            Ok(children) => {
                cursor.restore(saved);
                Ok(children)
            }
            Err(e) => Err(e),
        }
    } else {
        variant_result
    };

    if let (Err(Signal::Fail(_)), Some(descriptor)) = (&after_lookahead, &compiled.error_on_fail) {
        return Err(Signal::Syntax(SyntaxError::new(
            cursor.current(),
            descriptor.production.clone(),
            descriptor.expected.clone(),
            ctx.buffer.to_vec(),
            descriptor.message.clone(),
        )));
    }
    after_lookahead
}

/// Dispatch on the `{negative, repeating, optional}` variant, calling
/// `base_once` (the unwrapped primitive parse) one or more times per
/// §4.3's behavior table.
fn match_variant<T: CaseFold + RangeMember>(
    ctx: &mut MatchContext<T>,
    unit: UnitId,
    id: ElementId,
    element: &Element<T>,
    variant: crate::compile::MatcherVariant,
    cursor: &mut Cursor,
) -> MResult<T> {
    use crate::compile::MatcherVariant as V;
    match variant {
        V::Base => base_once(ctx, unit, id, element, cursor),
        V::Optional => match_optional(ctx, unit, id, element, cursor),
        V::Repeating => match_repeating(ctx, unit, id, element, cursor, false),
        V::RepeatingOptional => match_repeating(ctx, unit, id, element, cursor, true),
        V::Negative => match_negative(ctx, unit, id, element, cursor),
        V::NegativeOptional => match_negative_optional(ctx, unit, id, element, cursor),
        V::NegativeRepeating => match_negative_repeating(ctx, unit, id, element, cursor, false),
        V::NegativeRepeatingOptional => match_negative_repeating(ctx, unit, id, element, cursor, true),
    }
}

fn match_optional<T: CaseFold + RangeMember>(
    ctx: &mut MatchContext<T>,
    unit: UnitId,
    id: ElementId,
    element: &Element<T>,
    cursor: &mut Cursor,
) -> MResult<T> {
    let saved = cursor.save();
    match base_once(ctx, unit, id, element, cursor) {
        Ok(children) => Ok(children),
        Err(Signal::Fail(_)) => {
            cursor.restore(saved);
            Ok(Vec::new())
        }
        Err(other) => Err(other),
    }
}

fn match_repeating<T: CaseFold + RangeMember>(
    ctx: &mut MatchContext<T>,
    unit: UnitId,
    id: ElementId,
    element: &Element<T>,
    cursor: &mut Cursor,
    optional: bool,
) -> MResult<T> {
    let mut all_children = Vec::new();
    let mut count = 0usize;
    let mut last_fail: Option<Signal<T>> = None;

    loop {
        let before = cursor.current();
        let saved = cursor.save();
        match base_once(ctx, unit, id, element, cursor) {
            Ok(children) => {
                count += 1;
                all_children.extend(children);
                // Zero-length-match guard (§9 open question): a
                // production that matched without advancing the
                // cursor would otherwise repeat forever.
                if cursor.current() == before {
                    break;
                }
            }
            Err(Signal::Fail(f)) => {
                cursor.restore(saved);
                last_fail = Some(Signal::Fail(f));
                break;
            }
            Err(other) => return Err(other),
        }
    }

    if count == 0 && !optional {
        Err(last_fail.expect("loop recorded a failure before producing zero matches"))
    } else {
        Ok(all_children)
    }
}

fn match_negative<T: CaseFold + RangeMember>(
    ctx: &mut MatchContext<T>,
    unit: UnitId,
    id: ElementId,
    element: &Element<T>,
    cursor: &mut Cursor,
) -> MResult<T> {
    let saved = cursor.save();
    match base_once(ctx, unit, id, element, cursor) {
        Ok(_) => {
            // Inner matched: negative fails. Undo whatever it consumed.
            cursor.restore(saved);
            Err(Signal::Fail(MatchFail::NoMatch))
        }
        Err(Signal::Fail(MatchFail::EofReached)) => {
            cursor.restore(saved);
            Err(Signal::Fail(MatchFail::EofReached))
        }
        Err(Signal::Fail(MatchFail::NoMatch)) => {
            cursor.restore(saved);
            if cursor.current() >= cursor.stop() {
                Err(Signal::Fail(MatchFail::EofReached))
            } else {
                let pos = cursor.current();
                cursor.advance_to(pos + 1);
                Ok(Vec::new())
            }
        }
        Err(other) => Err(other),
    }
}

fn match_negative_optional<T: CaseFold + RangeMember>(
    ctx: &mut MatchContext<T>,
    unit: UnitId,
    id: ElementId,
    element: &Element<T>,
    cursor: &mut Cursor,
) -> MResult<T> {
    let saved = cursor.save();
    match match_negative(ctx, unit, id, element, cursor) {
        Ok(children) => Ok(children),
        Err(Signal::Fail(_)) => {
            cursor.restore(saved);
            Ok(Vec::new())
        }
        Err(other) => Err(other),
    }
}

fn match_negative_repeating<T: CaseFold + RangeMember>(
    ctx: &mut MatchContext<T>,
    unit: UnitId,
    id: ElementId,
    element: &Element<T>,
    cursor: &mut Cursor,
    optional: bool,
) -> MResult<T> {
    let mut consumed = 0usize;
    loop {
        if cursor.current() >= cursor.stop() {
            break;
        }
        let before = cursor.current();
        let saved = cursor.save();
        match base_once(ctx, unit, id, element, cursor) {
            Ok(_) => {
                // Inner would match here: stop before it, don't consume it.
                cursor.restore(saved);
                break;
            }
            Err(Signal::Fail(MatchFail::EofReached)) => {
                cursor.restore(saved);
                break;
            }
            Err(Signal::Fail(MatchFail::NoMatch)) => {
                cursor.restore(saved);
                cursor.advance_to(before + 1);
                consumed += 1;
            }
            Err(other) => return Err(other),
        }
    }

    if consumed == 0 && !optional {
        Err(Signal::Fail(MatchFail::NoMatch))
    } else {
        Ok(Vec::new())
    }
}

/// Run the element's primitive matcher exactly once, with no
/// backtracking wrapper of its own — the contract of §4.1.
fn base_once<T: CaseFold + RangeMember>(
    ctx: &mut MatchContext<T>,
    unit: UnitId,
    id: ElementId,
    element: &Element<T>,
    cursor: &mut Cursor,
) -> MResult<T> {
    match &element.kind {
        ElementKind::Literal(value) => {
            match_literal(ctx.buffer, cursor, value).map(|_| Vec::new()).map_err(Signal::Fail)
        }
        ElementKind::CILiteral(value) => match_ci_literal(ctx.buffer, cursor, value)
            .map(|_| Vec::new())
            .map_err(Signal::Fail),
        ElementKind::Range(set) => {
            match_range(ctx.buffer, cursor, set).map(|_| Vec::new()).map_err(Signal::Fail)
        }
        ElementKind::Eof => match_eof(cursor).map(|_| Vec::new()).map_err(Signal::Fail),
        ElementKind::Sequence(children) => match_sequence(ctx, unit, children, cursor),
        ElementKind::FirstOf(children) => match_first_of(ctx, unit, children, cursor),
        ElementKind::Name(name) => {
            match_reference(ctx, unit, id, name, &element.flags, cursor, false)
        }
        ElementKind::LibraryElement(name) => {
            match_reference(ctx, unit, id, name, &element.flags, cursor, true)
        }
    }
}

fn match_literal<T: Copy + PartialEq>(buffer: &[T], cursor: &mut Cursor, value: &[T]) -> Result<(), MatchFail> {
    let start = cursor.current();
    let end = start + value.len();
    let within = end <= cursor.stop();
    let matched = within && buffer[start..end] == *value;
    if matched {
        cursor.advance_to(end);
        Ok(())
    } else if end >= cursor.stop() {
        Err(MatchFail::EofReached)
    } else {
        Err(MatchFail::NoMatch)
    }
}

fn match_ci_literal<T: CaseFold>(buffer: &[T], cursor: &mut Cursor, folded_value: &[T]) -> Result<(), MatchFail> {
    let start = cursor.current();
    let end = start + folded_value.len();
    let within = end <= cursor.stop();
    let matched = within
        && buffer[start..end]
            .iter()
            .zip(folded_value.iter())
            .all(|(a, b)| a.fold() == *b);
    if matched {
        cursor.advance_to(end);
        Ok(())
    } else if end >= cursor.stop() {
        Err(MatchFail::EofReached)
    } else {
        Err(MatchFail::NoMatch)
    }
}

fn match_range<T: RangeMember>(buffer: &[T], cursor: &mut Cursor, set: &CharSet) -> Result<(), MatchFail> {
    if cursor.current() >= cursor.stop() {
        return Err(MatchFail::EofReached);
    }
    let c = buffer[cursor.current()];
    if set.contains_code_point(c.code_point()) {
        let pos = cursor.current();
        cursor.advance_to(pos + 1);
        Ok(())
    } else {
        Err(MatchFail::NoMatch)
    }
}

fn match_eof(cursor: &Cursor) -> Result<(), MatchFail> {
    if cursor.current() >= cursor.stop() {
        Ok(())
    } else {
        Err(MatchFail::NoMatch)
    }
}

fn match_sequence<T: CaseFold + RangeMember>(
    ctx: &mut MatchContext<T>,
    unit: UnitId,
    children: &[ElementId],
    cursor: &mut Cursor,
) -> MResult<T> {
    let mut all_children = Vec::new();
    for &child in children {
        let children_of_child = match_element(ctx, unit, child, cursor)?;
        all_children.extend(children_of_child);
    }
    Ok(all_children)
}

fn match_first_of<T: CaseFold + RangeMember>(
    ctx: &mut MatchContext<T>,
    unit: UnitId,
    children: &[ElementId],
    cursor: &mut Cursor,
) -> MResult<T> {
    for &child in children {
        let saved = cursor.save();
        match match_element(ctx, unit, child, cursor) {
            Ok(children) => return Ok(children),
            Err(Signal::Fail(_)) => {
                cursor.restore(saved);
            }
            Err(other) => return Err(other),
        }
    }
    Err(Signal::Fail(MatchFail::NoMatch))
}

/// Shared resolution + assembly logic for `Name` and `LibraryElement`.
///
/// Both primitives resolve a production name through the same registry
/// fallback chain (§4.4) — `LibraryElement` differs only in that its
/// result is always treated as expanded (its target's own `expanded`
/// flag is ignored), per §4.2's "always shaped as if the target were
/// expanded" rule.
#[tracing::instrument(level = "trace", skip(ctx, self_flags, cursor), fields(pos = cursor.current()))]
fn match_reference<T: CaseFold + RangeMember>(
    ctx: &mut MatchContext<T>,
    referrer_unit: UnitId,
    referrer_id: ElementId,
    name: &str,
    self_flags: &ElementFlags,
    cursor: &mut Cursor,
    force_expand: bool,
) -> MResult<T> {
    if let Some(max) = ctx.max_recursion_depth {
        if ctx.depth >= max {
            return Err(Signal::Fatal(EngineError::RecursionLimitExceeded));
        }
    }

    let resolved = match ctx.registry.unit(referrer_unit).cached_resolution(referrer_id) {
        Some(r) => r,
        None => {
            let target: ElementRef = ctx
                .registry
                .resolve(referrer_unit, name)
                .ok_or_else(|| EngineError::UndefinedProduction { name: name.to_string() })?;
            let target_flags = &ctx.registry.unit(target.unit).element(target.id).flags;
            let r = ResolvedRef {
                target,
                expand_child: force_expand || target_flags.expanded,
                report_child: self_flags.report && target_flags.report,
            };
            ctx.registry.unit_mut(referrer_unit).cache_resolution(referrer_id, r);
            r
        }
    };

    ctx.depth += 1;
    let original = cursor.current();
    let result = match_element(ctx, resolved.target.unit, resolved.target.id, cursor);
    ctx.depth -= 1;
    let children = result?;
    let current = cursor.current();

    Ok(assemble(name, original, current, children, resolved, self_flags.lookahead))
}

/// Match-tree assembly at a `Name`/`LibraryElement` boundary (§4.5).
fn assemble(
    tag: &str,
    original: usize,
    current: usize,
    children: Vec<Match>,
    resolved: ResolvedRef,
    lookahead: bool,
) -> Vec<Match> {
    if !resolved.report_child {
        return children;
    }
    if resolved.expand_child {
        return children;
    }
    if current == original && !lookahead {
        // Zero-length, non-lookahead match: non-reportable (§4.5) to
        // avoid unbounded tree growth under a repeating-optional
        // reference that keeps matching the empty string.
        return Vec::new();
    }
    vec![Match::new(tag.to_string(), original, current, children)]
}

