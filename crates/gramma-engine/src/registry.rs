//! Grammar registry: production-name lookup, fallback definition
//! sources, and cross-unit references used by `LibraryElement`.
//!
//! A single `GrammarRegistry` owns one or more [`GrammarUnit`]s. The
//! "primary" unit is the grammar under active construction; any unit
//! appended as a fallback source represents a separately-compiled,
//! pre-packaged grammar (the `LibraryElement` primitive's target) — it
//! gets its own arena so resolving a library reference never has to
//! copy element trees across arenas or remap `ElementId`s.

use std::sync::OnceLock;

use indexmap::IndexMap;

use gramma_core::{Elem, Element, ElementArena, ElementId};

use crate::error::EngineError;

/// A stable handle to one [`GrammarUnit`] inside a [`GrammarRegistry`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct UnitId(u32);

impl UnitId {
    fn index(self) -> usize {
        self.0 as usize
    }
}

/// A cross-unit element reference: the unit it lives in, plus its id
/// within that unit's arena. `Name` resolves within the same unit;
/// `LibraryElement` resolves into a different unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ElementRef {
    pub unit: UnitId,
    pub id: ElementId,
}

/// The memoized result of resolving a `Name`/`LibraryElement` token:
/// the target it points to, plus the two latched bits from §4.4.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolvedRef {
    pub target: ElementRef,
    pub expand_child: bool,
    pub report_child: bool,
}

/// One self-contained grammar: an arena of element tokens, a name →
/// id map, and a parallel side-table of [`OnceLock`]s memoizing each
/// element's resolved reference (only `Name`/`LibraryElement` tokens
/// ever populate their slot; everything else's slot stays empty).
///
/// The memoization lives here rather than on `Element` itself so that
/// `gramma-core`'s data types stay plain and `Clone`-able with no
/// interior mutability — see the design notes on the Name-memoization
/// open question.
pub struct GrammarUnit<T: Elem> {
    names: IndexMap<String, ElementId>,
    arena: ElementArena<T>,
    resolved: Vec<OnceLock<ResolvedRef>>,
}

impl<T: Elem> GrammarUnit<T> {
    pub fn new(arena: ElementArena<T>) -> Self {
        let len = arena.len();
        Self {
            names: IndexMap::new(),
            arena,
            resolved: (0..len).map(|_| OnceLock::new()).collect(),
        }
    }

    /// Register a production name for an already-inserted element.
    /// Duplicate names are a programmer error.
    pub fn add(&mut self, name: impl Into<String>, id: ElementId) -> Result<(), EngineError> {
        let name = name.into();
        if self.names.contains_key(&name) {
            return Err(EngineError::DuplicateDefinition { name });
        }
        self.names.insert(name, id);
        Ok(())
    }

    /// Look up a production by name within this unit only (no fallback
    /// traversal — that is `GrammarRegistry::resolve`'s job).
    pub fn get(&self, name: &str) -> Option<ElementId> {
        self.names.get(name).copied()
    }

    pub fn element(&self, id: ElementId) -> &Element<T> {
        self.arena.get(id)
    }

    pub fn arena(&self) -> &ElementArena<T> {
        &self.arena
    }

    /// The memoization slot for `id`, growing the side-table if the
    /// arena gained elements since this unit was constructed (grammar
    /// compilers may insert elements and register names interleaved).
    fn slot(&mut self, id: ElementId) -> &OnceLock<ResolvedRef> {
        while self.resolved.len() <= id.index() {
            self.resolved.push(OnceLock::new());
        }
        &self.resolved[id.index()]
    }

    /// Read the memoized resolution for `id`, if any has been latched.
    pub fn cached_resolution(&self, id: ElementId) -> Option<ResolvedRef> {
        self.resolved.get(id.index()).and_then(|slot| slot.get().copied())
    }

    /// Latch a resolution for `id`. A second call for the same `id` is a
    /// no-op — set-once, as the data model requires — which also makes
    /// this safe if two (hypothetical, parallel) first-uses race: both
    /// would compute the same value from the same immutable element,
    /// and only one write wins.
    pub fn cache_resolution(&mut self, id: ElementId, value: ResolvedRef) {
        let _ = self.slot(id).set(value);
    }
}

/// A source of fallback production definitions consulted when a
/// registry's primary unit lacks a name — the corpus's equivalent of a
/// search path. `GrammarRegistry` itself implements this trivially for
/// `GrammarUnit`, but the trait exists so callers can supply other
/// lookup shapes (e.g. a merged view over several registries) without
/// the engine needing to know about it.
pub trait DefinitionSource<T: Elem> {
    fn lookup(&self, name: &str) -> Option<ElementRef>;
}

/// Owns one primary [`GrammarUnit`] plus an ordered list of fallback
/// [`DefinitionSource`]s (per §6, `add_source`). `Name` resolution
/// checks the primary unit first, then each fallback source in order.
pub struct GrammarRegistry<T: Elem> {
    units: Vec<GrammarUnit<T>>,
    primary: UnitId,
    fallbacks: Vec<Box<dyn DefinitionSource<T>>>,
}

impl<T: Elem> GrammarRegistry<T> {
    pub fn new(primary: GrammarUnit<T>) -> Self {
        Self {
            units: vec![primary],
            primary: UnitId(0),
            fallbacks: Vec::new(),
        }
    }

    pub fn primary_unit(&self) -> UnitId {
        self.primary
    }

    pub fn unit(&self, id: UnitId) -> &GrammarUnit<T> {
        &self.units[id.index()]
    }

    pub fn unit_mut(&mut self, id: UnitId) -> &mut GrammarUnit<T> {
        &mut self.units[id.index()]
    }

    /// Register a library unit (the target of a `LibraryElement`
    /// reference), returning the id assigned to it.
    pub fn add_library_unit(&mut self, unit: GrammarUnit<T>) -> UnitId {
        let id = UnitId(self.units.len() as u32);
        self.units.push(unit);
        id
    }

    /// Append a fallback definition source, consulted after the
    /// primary unit's own name map is exhausted (§6 `add_source`).
    pub fn add_source(&mut self, source: Box<dyn DefinitionSource<T>>) {
        self.fallbacks.push(source);
    }

    /// Resolve `name` against `unit`'s own map, then against every
    /// fallback source in registration order (§4.4). Both `Name` and
    /// `LibraryElement` tokens resolve through this same path; they
    /// differ only in how the caller treats the result afterward
    /// (`LibraryElement` is always assembled as if `expanded` were
    /// set, regardless of the target's own flag — see
    /// `match_reference`'s `force_expand` parameter), not in how the
    /// name lookup itself is performed.
    pub fn resolve(&self, unit: UnitId, name: &str) -> Option<ElementRef> {
        if let Some(id) = self.unit(unit).get(name) {
            return Some(ElementRef { unit, id });
        }
        self.fallbacks.iter().find_map(|source| source.lookup(name))
    }
}
