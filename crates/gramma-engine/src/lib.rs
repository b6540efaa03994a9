#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

//! Backtracking combinator engine that executes compiled grammars.
//!
//! This crate takes an already-constructed tree of [`gramma_core`]
//! element tokens plus a name resolver and produces [`gramma_core::Match`]
//! trees — it has no EBNF front-end and no dispatch-processor of its
//! own, those are external collaborators.
//!
//! # Example
//!
//! ```
//! use gramma_core::{Element, ElementArena, ElementFlags, ElementKind};
//! use gramma_engine::{GrammarUnit, Parser};
//!
//! // Match-tree assembly only happens at a `Name`/`LibraryElement`
//! // boundary (a bare `Literal` root never tags itself), so the
//! // production is registered under its own name and the parser is
//! // built from a thin `Name` reference to it.
//! let mut arena: ElementArena<char> = ElementArena::new();
//! let lit = arena.insert(Element::new(
//!     ElementKind::Literal("babc".chars().collect()),
//!     ElementFlags::reporting(),
//! ));
//! let start = arena.insert(Element::new(
//!     ElementKind::Name("p".to_string()),
//!     ElementFlags::reporting(),
//! ));
//! let mut unit = GrammarUnit::new(arena);
//! unit.add("p", lit).unwrap();
//! unit.add("start", start).unwrap();
//!
//! let mut parser = Parser::build(unit, "start").unwrap();
//! let buffer: Vec<char> = "babc".chars().collect();
//! let (success, children, final_position) = parser.parse(&buffer, 0, None).unwrap();
//! assert!(success);
//! assert_eq!(final_position, 4);
//! assert_eq!(children.len(), 1);
//! assert_eq!(children[0].tag, "p");
//! ```

pub mod compile;
pub mod driver;
pub mod error;
mod matchers;
pub mod registry;

#[cfg(test)]
mod matchers_tests;

pub use compile::{CompiledElement, MatcherVariant};
pub use driver::Parser;
pub use error::{EngineError, SyntaxError};
pub use registry::{DefinitionSource, ElementRef, GrammarRegistry, GrammarUnit, ResolvedRef, UnitId};
