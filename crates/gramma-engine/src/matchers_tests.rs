use gramma_core::{CharSet, Cursor, Element, ElementArena, ElementFlags, ElementId, ElementKind};

use crate::error::EngineError;
use crate::matchers::{match_element, MatchContext, MatchFail, Signal};
use crate::registry::{DefinitionSource, ElementRef, GrammarRegistry, GrammarUnit};

fn ctx_for<'a>(buffer: &'a [char], registry: &'a mut GrammarRegistry<char>) -> MatchContext<'a, char> {
    MatchContext {
        buffer,
        registry,
        max_recursion_depth: Some(512),
        max_steps: None,
        depth: 0,
        steps: 0,
    }
}

fn literal_arena(text: &str) -> (ElementArena<char>, ElementId) {
    let mut arena = ElementArena::new();
    let id = arena.insert(Element::new(
        ElementKind::Literal(text.chars().collect()),
        ElementFlags::reporting(),
    ));
    (arena, id)
}

#[test]
fn literal_matches_and_advances_cursor() {
    let (arena, id) = literal_arena("abc");
    let unit = GrammarUnit::new(arena);
    let mut registry = GrammarRegistry::new(unit);
    let buffer: Vec<char> = "abcdef".chars().collect();
    let unit = registry.primary_unit();
    let mut ctx = ctx_for(&buffer, &mut registry);
    let mut cursor = Cursor::new(0, buffer.len()).unwrap();
    let result = match_element(&mut ctx, unit, id, &mut cursor);
    assert!(result.is_ok());
    assert_eq!(cursor.current(), 3);
}

#[test]
fn literal_mismatch_at_eof_boundary_raises_eof_reached() {
    let (arena, id) = literal_arena("abcd");
    let unit = GrammarUnit::new(arena);
    let mut registry = GrammarRegistry::new(unit);
    let buffer: Vec<char> = "abc".chars().collect();
    let unit = registry.primary_unit();
    let mut ctx = ctx_for(&buffer, &mut registry);
    let mut cursor = Cursor::new(0, buffer.len()).unwrap();
    let err = match_element(&mut ctx, unit, id, &mut cursor).unwrap_err();
    assert!(matches!(err, Signal::Fail(MatchFail::EofReached)));
}

#[test]
fn optional_never_fails() {
    let (arena, id) = {
        let mut arena = ElementArena::new();
        let id = arena.insert(Element::new(
            ElementKind::Literal(vec!['z']),
            ElementFlags::reporting().with_optional(true),
        ));
        (arena, id)
    };
    let unit = GrammarUnit::new(arena);
    let mut registry = GrammarRegistry::new(unit);
    let buffer: Vec<char> = "abc".chars().collect();
    let unit = registry.primary_unit();
    let mut ctx = ctx_for(&buffer, &mut registry);
    let mut cursor = Cursor::new(0, buffer.len()).unwrap();
    let result = match_element(&mut ctx, unit, id, &mut cursor).unwrap();
    assert!(result.is_empty());
    assert_eq!(cursor.current(), 0);
}

#[test]
fn repeating_optional_matches_zero_times_without_failing() {
    let mut arena = ElementArena::new();
    let id = arena.insert(Element::new(
        ElementKind::Literal(vec!['a']),
        ElementFlags::silent().with_repeating(true).with_optional(true),
    ));
    let unit = GrammarUnit::new(arena);
    let mut registry = GrammarRegistry::new(unit);
    let buffer: Vec<char> = "bbbb".chars().collect();
    let unit = registry.primary_unit();
    let mut ctx = ctx_for(&buffer, &mut registry);
    let mut cursor = Cursor::new(0, buffer.len()).unwrap();
    let result = match_element(&mut ctx, unit, id, &mut cursor).unwrap();
    assert!(result.is_empty());
    assert_eq!(cursor.current(), 0);
}

#[test]
fn negative_consumes_exactly_one_character_on_mismatch() {
    let mut arena = ElementArena::new();
    let id = arena.insert(Element::new(
        ElementKind::Literal(vec![';']),
        ElementFlags::silent().with_negative(true),
    ));
    let unit = GrammarUnit::new(arena);
    let mut registry = GrammarRegistry::new(unit);
    let buffer: Vec<char> = "abc".chars().collect();
    let unit = registry.primary_unit();
    let mut ctx = ctx_for(&buffer, &mut registry);
    let mut cursor = Cursor::new(0, buffer.len()).unwrap();
    let result = match_element(&mut ctx, unit, id, &mut cursor).unwrap();
    assert!(result.is_empty());
    assert_eq!(cursor.current(), 1);
}

#[test]
fn negative_repeating_stops_before_the_literal() {
    let mut arena = ElementArena::new();
    let id = arena.insert(Element::new(
        ElementKind::Literal(vec![';']),
        ElementFlags::silent().with_negative(true).with_repeating(true),
    ));
    let unit = GrammarUnit::new(arena);
    let mut registry = GrammarRegistry::new(unit);
    let buffer: Vec<char> = "abc;xyz".chars().collect();
    let unit = registry.primary_unit();
    let mut ctx = ctx_for(&buffer, &mut registry);
    let mut cursor = Cursor::new(0, buffer.len()).unwrap();
    let result = match_element(&mut ctx, unit, id, &mut cursor).unwrap();
    assert!(result.is_empty());
    assert_eq!(cursor.current(), 3);
}

#[test]
fn lookahead_restores_cursor_on_success() {
    let mut arena = ElementArena::new();
    let id = arena.insert(Element::new(
        ElementKind::Literal(vec!['a', 'b']),
        ElementFlags::reporting().with_lookahead(true),
    ));
    let unit = GrammarUnit::new(arena);
    let mut registry = GrammarRegistry::new(unit);
    let buffer: Vec<char> = "ab".chars().collect();
    let unit = registry.primary_unit();
    let mut ctx = ctx_for(&buffer, &mut registry);
    let mut cursor = Cursor::new(0, buffer.len()).unwrap();
    match_element(&mut ctx, unit, id, &mut cursor).unwrap();
    assert_eq!(cursor.current(), 0);
}

#[test]
fn first_of_returns_first_successful_child_in_order() {
    let mut arena = ElementArena::new();
    let a = arena.insert(Element::new(ElementKind::Literal(vec!['a', 'b', 'c']), ElementFlags::silent()));
    let b = arena.insert(Element::new(ElementKind::Literal(vec!['a', 'b', 'd']), ElementFlags::silent()));
    let choice = arena.insert(Element::new(ElementKind::FirstOf(vec![a, b]), ElementFlags::reporting()));
    let unit = GrammarUnit::new(arena);
    let mut registry = GrammarRegistry::new(unit);
    let buffer: Vec<char> = "abd".chars().collect();
    let unit = registry.primary_unit();
    let mut ctx = ctx_for(&buffer, &mut registry);
    let mut cursor = Cursor::new(0, buffer.len()).unwrap();
    let result = match_element(&mut ctx, unit, choice, &mut cursor).unwrap();
    assert!(result.is_empty()); // FirstOf itself emits no tag; only Name boundaries do
    assert_eq!(cursor.current(), 3);
}

#[test]
fn name_reference_assembles_a_tagged_match_node() {
    let mut arena = ElementArena::new();
    let lit = arena.insert(Element::new(ElementKind::Literal(vec!['o', 'k']), ElementFlags::reporting()));
    let name = arena.insert(Element::new(
        ElementKind::Name("inner".to_string()),
        ElementFlags::reporting(),
    ));
    let mut unit = GrammarUnit::new(arena);
    unit.add("inner", lit).unwrap();
    let mut registry = GrammarRegistry::new(unit);
    let buffer: Vec<char> = "ok".chars().collect();
    let unit = registry.primary_unit();
    let mut ctx = ctx_for(&buffer, &mut registry);
    let mut cursor = Cursor::new(0, buffer.len()).unwrap();
    let result = match_element(&mut ctx, unit, name, &mut cursor).unwrap();
    assert_eq!(result.len(), 1);
    assert_eq!(result[0].tag, "inner");
    assert_eq!((result[0].start, result[0].stop), (0, 2));
}

#[test]
fn undefined_name_raises_fatal_error() {
    let mut arena = ElementArena::new();
    let name = arena.insert(Element::new(
        ElementKind::Name("missing".to_string()),
        ElementFlags::reporting(),
    ));
    let unit = GrammarUnit::new(arena);
    let mut registry = GrammarRegistry::new(unit);
    let buffer: Vec<char> = "x".chars().collect();
    let unit = registry.primary_unit();
    let mut ctx = ctx_for(&buffer, &mut registry);
    let mut cursor = Cursor::new(0, buffer.len()).unwrap();
    let err = match_element(&mut ctx, unit, name, &mut cursor).unwrap_err();
    assert!(matches!(err, Signal::Fatal(EngineError::UndefinedProduction { .. })));
}

#[test]
fn lookahead_error_on_fail_succeeds_without_advancing_cursor() {
    use gramma_core::ErrorOnFail;

    let mut arena = ElementArena::new();
    let id = arena.insert(Element::new(
        ElementKind::Literal(vec!['x']),
        ElementFlags::silent()
            .with_lookahead(true)
            .with_error_on_fail(ErrorOnFail::new("expected x")),
    ));
    let unit = GrammarUnit::new(arena);
    let mut registry = GrammarRegistry::new(unit);
    let buffer: Vec<char> = "xyz".chars().collect();
    let unit = registry.primary_unit();
    let mut ctx = ctx_for(&buffer, &mut registry);
    let mut cursor = Cursor::new(0, buffer.len()).unwrap();
    let result = match_element(&mut ctx, unit, id, &mut cursor).unwrap();
    assert!(result.is_empty());
    // Lookahead restores the cursor on success; no syntax error is raised
    // since the inner matcher succeeded (§9 open question: errorOnFail
    // only fires on the inner matcher's failure, post-lookahead).
    assert_eq!(cursor.current(), 0);
}

#[test]
fn lookahead_error_on_fail_raises_syntax_error_on_inner_failure() {
    use gramma_core::ErrorOnFail;

    let mut arena = ElementArena::new();
    let id = arena.insert(Element::new(
        ElementKind::Literal(vec!['x']),
        ElementFlags::silent()
            .with_lookahead(true)
            .with_error_on_fail(ErrorOnFail::new("expected x")),
    ));
    let unit = GrammarUnit::new(arena);
    let mut registry = GrammarRegistry::new(unit);
    let buffer: Vec<char> = "yyy".chars().collect();
    let unit = registry.primary_unit();
    let mut ctx = ctx_for(&buffer, &mut registry);
    let mut cursor = Cursor::new(0, buffer.len()).unwrap();
    let err = match_element(&mut ctx, unit, id, &mut cursor).unwrap_err();
    match err {
        Signal::Syntax(e) => assert_eq!(e.position, 0),
        other => panic!("expected Signal::Syntax, got {other:?}"),
    }
}

#[test]
fn error_on_fail_raises_syntax_error_with_current_position() {
    use gramma_core::ErrorOnFail;

    let mut arena = ElementArena::new();
    let id = arena.insert(Element::new(
        ElementKind::Literal(vec!['y']),
        ElementFlags::silent().with_error_on_fail(ErrorOnFail::new("expected y")),
    ));
    let unit = GrammarUnit::new(arena);
    let mut registry = GrammarRegistry::new(unit);
    let buffer: Vec<char> = "xz".chars().collect();
    let unit = registry.primary_unit();
    let mut ctx = ctx_for(&buffer, &mut registry);
    let mut cursor = Cursor::new(1, buffer.len()).unwrap();
    let err = match_element(&mut ctx, unit, id, &mut cursor).unwrap_err();
    match err {
        Signal::Syntax(e) => assert_eq!(e.position, 1),
        other => panic!("expected Signal::Syntax, got {other:?}"),
    }
}

#[test]
fn error_on_fail_syntax_error_carries_the_buffer_snapshot() {
    use gramma_core::ErrorOnFail;

    let mut arena = ElementArena::new();
    let id = arena.insert(Element::new(
        ElementKind::Literal(vec!['y']),
        ElementFlags::silent().with_error_on_fail(ErrorOnFail::new("expected y")),
    ));
    let unit = GrammarUnit::new(arena);
    let mut registry = GrammarRegistry::new(unit);
    let buffer: Vec<char> = "xz".chars().collect();
    let unit = registry.primary_unit();
    let mut ctx = ctx_for(&buffer, &mut registry);
    let mut cursor = Cursor::new(1, buffer.len()).unwrap();
    let err = match_element(&mut ctx, unit, id, &mut cursor).unwrap_err();
    match err {
        Signal::Syntax(e) => assert_eq!(e.buffer, buffer),
        other => panic!("expected Signal::Syntax, got {other:?}"),
    }
}

#[test]
fn ci_literal_matches_case_folded() {
    let mut arena = ElementArena::new();
    let id = arena.insert(Element::new(
        ElementKind::CILiteral("abc".chars().collect()),
        ElementFlags::reporting(),
    ));
    let unit = GrammarUnit::new(arena);
    let mut registry = GrammarRegistry::new(unit);
    let buffer: Vec<char> = "ABCdef".chars().collect();
    let unit = registry.primary_unit();
    let mut ctx = ctx_for(&buffer, &mut registry);
    let mut cursor = Cursor::new(0, buffer.len()).unwrap();
    let result = match_element(&mut ctx, unit, id, &mut cursor).unwrap();
    assert!(result.is_empty());
    assert_eq!(cursor.current(), 3);
}

#[test]
fn ci_literal_mismatch_raises_no_match() {
    let mut arena = ElementArena::new();
    let id = arena.insert(Element::new(
        ElementKind::CILiteral("abc".chars().collect()),
        ElementFlags::reporting(),
    ));
    let unit = GrammarUnit::new(arena);
    let mut registry = GrammarRegistry::new(unit);
    let buffer: Vec<char> = "abXdef".chars().collect();
    let unit = registry.primary_unit();
    let mut ctx = ctx_for(&buffer, &mut registry);
    let mut cursor = Cursor::new(0, buffer.len()).unwrap();
    let err = match_element(&mut ctx, unit, id, &mut cursor).unwrap_err();
    assert!(matches!(err, Signal::Fail(MatchFail::NoMatch)));
    assert_eq!(cursor.current(), 0);
}

#[test]
fn eof_succeeds_only_at_stop() {
    let mut arena = ElementArena::new();
    let id = arena.insert(Element::new(ElementKind::Eof, ElementFlags::silent()));
    let unit = GrammarUnit::new(arena);
    let mut registry = GrammarRegistry::new(unit);
    let buffer: Vec<char> = "ab".chars().collect();
    let unit = registry.primary_unit();

    let mut ctx = ctx_for(&buffer, &mut registry);
    let mut cursor = Cursor::new(2, buffer.len()).unwrap();
    let result = match_element(&mut ctx, unit, id, &mut cursor).unwrap();
    assert!(result.is_empty());
    assert_eq!(cursor.current(), 2);
}

#[test]
fn eof_fails_mid_buffer() {
    let mut arena = ElementArena::new();
    let id = arena.insert(Element::new(ElementKind::Eof, ElementFlags::silent()));
    let unit = GrammarUnit::new(arena);
    let mut registry = GrammarRegistry::new(unit);
    let buffer: Vec<char> = "ab".chars().collect();
    let unit = registry.primary_unit();

    let mut ctx = ctx_for(&buffer, &mut registry);
    let mut cursor = Cursor::new(1, buffer.len()).unwrap();
    let err = match_element(&mut ctx, unit, id, &mut cursor).unwrap_err();
    assert!(matches!(err, Signal::Fail(MatchFail::NoMatch)));
    assert_eq!(cursor.current(), 1);
}

/// A fallback source wired to a single library unit, mimicking the
/// pre-built name index a separately-compiled library grammar would
/// hand the primary registry (§4.2: `LibraryElement` resolves into a
/// registry "pre-packaged with its own registry").
struct LibraryNameTable {
    unit: crate::registry::UnitId,
    names: std::collections::HashMap<String, ElementId>,
}

impl DefinitionSource<char> for LibraryNameTable {
    fn lookup(&self, name: &str) -> Option<ElementRef> {
        self.names.get(name).map(|&id| ElementRef { unit: self.unit, id })
    }
}

#[test]
fn library_element_resolves_cross_unit_and_inlines_its_children() {
    // Library grammar, compiled into its own unit: `greeting := word`
    // where `word` is a reporting `Name` reference to a literal —
    // `greeting` itself is not flagged `expanded`.
    let mut lib_arena: ElementArena<char> = ElementArena::new();
    let word_lit = lib_arena.insert(Element::new(ElementKind::Literal(vec!['h', 'i']), ElementFlags::reporting()));
    let word_ref = lib_arena.insert(Element::new(ElementKind::Name("word".to_string()), ElementFlags::reporting()));
    let mut lib_unit = GrammarUnit::new(lib_arena);
    lib_unit.add("word", word_lit).unwrap();
    lib_unit.add("greeting", word_ref).unwrap();

    // Primary grammar: `root := @greeting` (a `LibraryElement`
    // reference resolved through a fallback source into the library
    // unit above).
    let mut arena: ElementArena<char> = ElementArena::new();
    let root_id = arena.insert(Element::new(
        ElementKind::LibraryElement("greeting".to_string()),
        ElementFlags::reporting(),
    ));
    let primary = GrammarUnit::new(arena);
    let mut registry = GrammarRegistry::new(primary);
    let lib_unit_id = registry.add_library_unit(lib_unit);
    registry.add_source(Box::new(LibraryNameTable {
        unit: lib_unit_id,
        names: std::collections::HashMap::from([("greeting".to_string(), word_ref)]),
    }));

    let primary_unit = registry.primary_unit();
    let buffer: Vec<char> = "hi".chars().collect();
    let mut ctx = ctx_for(&buffer, &mut registry);
    let mut cursor = Cursor::new(0, buffer.len()).unwrap();
    let result = match_element(&mut ctx, primary_unit, root_id, &mut cursor).unwrap();

    // `greeting` is inlined (force_expand=true for LibraryElement,
    // regardless of its own `expanded` flag): no "greeting"-tagged
    // wrapper node, just `word`'s own reported `Match` promoted
    // straight into the referrer's children.
    assert_eq!(result.len(), 1);
    assert_eq!(result[0].tag, "word");
    assert_eq!((result[0].start, result[0].stop), (0, 2));
    assert_eq!(cursor.current(), 2);
}

#[test]
fn range_hit_and_miss() {
    let mut arena: ElementArena<char> = ElementArena::new();
    let id = arena.insert(Element::new(
        ElementKind::Range(CharSet::from_char_range('a', 'z')),
        ElementFlags::silent(),
    ));
    let unit = GrammarUnit::new(arena);
    let mut registry = GrammarRegistry::new(unit);
    let buffer: Vec<char> = "aZ".chars().collect();
    let unit = registry.primary_unit();

    let mut ctx = ctx_for(&buffer, &mut registry);
    let mut cursor = Cursor::new(0, buffer.len()).unwrap();
    match_element(&mut ctx, unit, id, &mut cursor).unwrap();
    assert_eq!(cursor.current(), 1);

    let err = match_element(&mut ctx, unit, id, &mut cursor).unwrap_err();
    assert!(matches!(err, Signal::Fail(MatchFail::NoMatch)));
}
