//! Invariant checks excluded from coverage reports.

#![cfg_attr(coverage_nightly, coverage(off))]

use crate::interner::{Interner, Symbol};

impl Interner {
    /// Resolve a symbol that the caller has guaranteed came from this
    /// interner. Panics instead of returning `Option` at call sites where a
    /// missing symbol means a prior pass built an inconsistent name table.
    pub(crate) fn ensure_resolve(&self, sym: Symbol) -> &str {
        self.try_resolve(sym).unwrap_or_else(|| {
            panic!("Interner: symbol {} not found (name table is inconsistent)", sym.as_u32())
        })
    }
}
