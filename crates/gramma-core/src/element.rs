//! Element tokens: the immutable nodes of a compiled grammar tree.
//!
//! An [`ElementArena`] owns every [`Element`] reachable from a grammar's
//! root productions. `Name`/`LibraryElement` tokens reference other
//! productions by name (a `String`, resolved lazily by the engine's
//! registry) rather than by `ElementId`, since the referenced production
//! may not exist yet when the referrer is constructed — this is what
//! makes forward and mutually recursive references possible without
//! requiring a topological construction order.
//!
//! The arena is generic over the buffer's item type `T` so the same
//! element tree shape works over `&str`, `&[u8]`, and `&[T]` inputs
//! alike (see [`CaseFold`] and [`RangeMember`] for the narrower bounds
//! needed by specific primitives).

use crate::flags::ElementFlags;
use crate::range::CharSet;

/// A stable, non-owning handle to an [`Element`] inside an [`ElementArena`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ElementId(u32);

impl ElementId {
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }

    /// Construct from a raw arena index. Only the arena that produced the
    /// index should call this.
    #[inline]
    pub(crate) fn from_index(index: usize) -> Self {
        Self(index as u32)
    }
}

/// Marker bound for buffer item types the engine can scan.
///
/// Blanket-implemented for every `Copy + PartialEq + 'static` type, so
/// byte strings, character strings, and sequences of arbitrary integers
/// all satisfy it identically — only `Literal`'s slice-equality contract
/// is required.
pub trait Elem: Copy + PartialEq + std::fmt::Debug + 'static {}
impl<T: Copy + PartialEq + std::fmt::Debug + 'static> Elem for T {}

/// Case-folding bound required by `CILiteral`. Only meaningful for
/// character/byte inputs, per the data model's invariants.
pub trait CaseFold: Elem {
    fn fold(self) -> Self;
}

impl CaseFold for char {
    #[inline]
    fn fold(self) -> Self {
        self.to_ascii_lowercase()
    }
}

impl CaseFold for u8 {
    #[inline]
    fn fold(self) -> Self {
        self.to_ascii_lowercase()
    }
}

/// Bound required by `Range`: the buffer item must be reducible to a code
/// point so it can be tested against a [`CharSet`].
pub trait RangeMember: Elem {
    fn code_point(self) -> u32;
}

impl RangeMember for char {
    #[inline]
    fn code_point(self) -> u32 {
        self as u32
    }
}

impl RangeMember for u8 {
    #[inline]
    fn code_point(self) -> u32 {
        self as u32
    }
}

/// The payload of an element token. See §4.2 of the design for the
/// matching semantics of each variant.
#[derive(Debug, Clone, PartialEq)]
pub enum ElementKind<T: Elem> {
    /// Exact literal match.
    Literal(Vec<T>),
    /// Case-folded literal match. The payload is the already-lowered
    /// value (`_lower` in the original design) so matching never folds
    /// the pattern twice.
    CILiteral(Vec<T>),
    /// Single-item membership test.
    Range(CharSet),
    /// Ordered sequence of children run against the same cursor.
    Sequence(Vec<ElementId>),
    /// Ordered choice ("first of") over children.
    FirstOf(Vec<ElementId>),
    /// Reference to another production defined in the same grammar
    /// (resolved lazily through the registry).
    Name(String),
    /// Reference to a production defined in a separately-compiled,
    /// pre-packaged grammar (its own registry).
    LibraryElement(String),
    /// Matches only at end-of-input.
    Eof,
}

/// An immutable element token: a payload plus the modifier flags that
/// alter its matching and reporting behavior.
#[derive(Debug, Clone, PartialEq)]
pub struct Element<T: Elem> {
    pub kind: ElementKind<T>,
    pub flags: ElementFlags,
}

impl<T: Elem> Element<T> {
    pub fn new(kind: ElementKind<T>, flags: ElementFlags) -> Self {
        Self { kind, flags }
    }
}

/// Arena owning every element token reachable from a grammar's roots.
///
/// Mutually recursive productions create cycles between element tokens
/// via production-name references; the arena sidesteps ownership cycles
/// entirely by storing elements by value in a `Vec` and handing out
/// `ElementId` indices rather than parent/child pointers.
#[derive(Debug, Clone, Default)]
pub struct ElementArena<T: Elem> {
    elements: Vec<Element<T>>,
}

impl<T: Elem> ElementArena<T> {
    pub fn new() -> Self {
        Self {
            elements: Vec::new(),
        }
    }

    /// Insert an element token, returning its stable id.
    pub fn insert(&mut self, element: Element<T>) -> ElementId {
        let id = ElementId::from_index(self.elements.len());
        self.elements.push(element);
        id
    }

    pub fn get(&self, id: ElementId) -> &Element<T> {
        &self.elements[id.index()]
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }
}
