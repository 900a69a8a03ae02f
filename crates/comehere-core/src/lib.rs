#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

//! Core data structures shared by the comehere rewriter.
//!
//! This crate is deliberately tree-free: it knows nothing about the host
//! language's grammar or about `rowan`. It provides:
//! - `span` - byte-offset source ranges, independent of any CST library
//! - `diagnostics` - diagnostic collection and rendering
//! - `interner` - string interning (`Symbol`)
//! - `name_pool` - collision-free fresh-identifier allocation

mod invariants;

pub mod colors;
pub mod diagnostics;
pub mod interner;
pub mod name_pool;
pub mod span;

#[cfg(test)]
mod interner_tests;
#[cfg(test)]
mod lib_tests;

pub use colors::Colors;
pub use diagnostics::{DiagnosticBuilder, Diagnostics, DiagnosticsPrinter, Severity};
pub use interner::{Interner, Symbol};
pub use name_pool::NamePool;
pub use span::Span;
