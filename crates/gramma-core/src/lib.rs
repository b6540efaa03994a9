#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

//! Core data structures for the Gramma parsing engine.
//!
//! This crate has no matching logic in it — it is the immutable,
//! shared vocabulary the engine crate and a grammar compiler both build
//! on: [`element`] tokens and their [`flags`], the [`cursor`], the
//! [`match_record`] tree, and the [`range`] membership predicate used by
//! the `Range` primitive.
//!
//! # Example
//!
//! ```
//! use gramma_core::cursor::Cursor;
//! use gramma_core::element::{Element, ElementArena, ElementKind};
//! use gramma_core::flags::ElementFlags;
//!
//! let mut arena: ElementArena<char> = ElementArena::new();
//! let lit = arena.insert(Element::new(
//!     ElementKind::Literal(vec!['o', 'k']),
//!     ElementFlags::reporting(),
//! ));
//! assert!(matches!(arena.get(lit).kind, ElementKind::Literal(_)));
//!
//! let cursor = Cursor::new(0, 2).unwrap();
//! assert_eq!(cursor.remaining(), 2);
//! ```

pub mod cursor;
pub mod element;
pub mod flags;
pub mod interner;
pub mod match_record;
pub mod range;


pub use cursor::{Cursor, CursorError};
pub use element::{CaseFold, Elem, Element, ElementArena, ElementId, ElementKind, RangeMember};
pub use flags::{ElementFlags, ErrorOnFail, FlagError};
pub use interner::{Interner, Symbol};
pub use match_record::{Match, Tag};
pub use range::{CharSet, CodePointInterval};
