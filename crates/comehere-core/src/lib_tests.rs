use crate::{Diagnostics, Interner, NamePool, Span};

#[test]
fn public_surface_composes() {
    let mut interner = Interner::new();
    let sym = interner.intern("comehere");

    let mut pool = NamePool::new();
    pool.seed([interner.resolve(sym).to_string()]);
    let fresh = pool.fresh("comehere");
    assert_ne!(fresh, "comehere");

    let mut diagnostics = Diagnostics::new();
    diagnostics
        .warning(format!("allocated {fresh}"), Span::new(0, 1))
        .emit();
    assert_eq!(diagnostics.len(), 1);
}
