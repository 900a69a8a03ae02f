//! Data shared across the extraction and driving passes: goal
//! descriptions, the active-frame bit registry, and support-name slots.

use std::cell::Cell;
use std::collections::HashMap;

use comehere_core::Span;

use crate::ast::FunctionLike;

/// One `COMEHERE` site, as recorded by the extractor (C6) and consumed by
/// the control driver (C7).
#[derive(Debug, Clone)]
pub struct GoalBlock {
    /// 1-based, unique per module, allocated in source order.
    pub id: u32,
    /// First positional argument, if it was a string literal.
    pub description: Option<String>,
    /// Ordered `(dotted.path, expression source)` pairs extracted from the
    /// remaining positional arguments. Consumed left-to-right by call
    /// synthesis; anything left over after driving is reported.
    pub initializers: Vec<Initializer>,
    /// Source span of the original `with (...)` head, kept for
    /// diagnostics even after the node itself has been replaced.
    pub span: Span,
    /// [`function_identity`] of the nearest enclosing function/method, if
    /// any, so call synthesis can group every goal living inside the same
    /// function under one guard.
    pub enclosing_function: Option<String>,
}

#[derive(Debug, Clone)]
pub struct Initializer {
    pub path: Vec<String>,
    pub expr_text: String,
    consumed: Cell<bool>,
}

impl Initializer {
    pub fn new(path: Vec<String>, expr_text: String) -> Self {
        Self {
            path,
            expr_text,
            consumed: Cell::new(false),
        }
    }

    pub fn dotted(&self) -> String {
        self.path.join(".")
    }

    /// True if `qualified` (e.g. `C.foo.a`) matches this initializer's
    /// dotted path exactly.
    pub fn matches(&self, qualified: &[&str]) -> bool {
        self.path.len() == qualified.len() && self.path.iter().zip(qualified).all(|(a, b)| a == b)
    }

    pub fn is_consumed(&self) -> bool {
        self.consumed.get()
    }

    /// Marks this initializer as having supplied a resolved argument or
    /// receiver. Takes `&self` (not `&mut self`) so call synthesis can mark
    /// initializers consumed while only holding `&[GoalBlock]`.
    pub fn mark_consumed(&self) {
        self.consumed.set(true);
    }
}

/// Maps each function that contains, or lies on the ancestor chain of, a
/// goal to a distinct activation-mask bit index. Bit indices are drawn
/// from the same counter as synthesized names so they never collide with
/// a name the name pool later vends.
#[derive(Debug, Clone, Default)]
pub struct ActiveFrameRegistry {
    bits: HashMap<u64, u32>,
    next_bit: u32,
}

impl ActiveFrameRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the bit index for a function identified by `function_key`
    /// (the stable key callers use, typically the function node's text
    /// range packed into a u64), allocating one on first use.
    pub fn bit_for(&mut self, function_key: u64) -> u32 {
        *self.bits.entry(function_key).or_insert_with(|| {
            let bit = self.next_bit;
            self.next_bit += 1;
            bit
        })
    }

    pub fn local_name(bit: u32) -> String {
        format!("active_{bit}")
    }

    /// Looks up a bit without allocating one, for callers that only act
    /// on functions extraction already gave a bit to.
    pub fn peek_bit(&self, function_key: u64) -> Option<u32> {
        self.bits.get(&function_key).copied()
    }
}

/// A name stable across rewrites, used to key [`ActiveFrameRegistry`]:
/// the declared name for a named function/method, or the binding a
/// function expression/arrow is assigned to. Byte offsets don't survive
/// from extraction (C6) to driving (C7) since every rewrite shifts them,
/// so identity has to come from spelling instead.
///
/// A method's identity is qualified with its class name (`Class.method`)
/// so two classes with a same-named method never collide, and so call
/// synthesis can tell a method from a same-named top-level function.
pub fn function_identity(func: &FunctionLike) -> Option<String> {
    if let FunctionLike::MethodDef(method) = func {
        let method_name = method.name()?.text().to_string();
        return Some(match method.enclosing_class_name() {
            Some(class) => format!("{class}.{method_name}"),
            None => method_name,
        });
    }
    if let Some(name) = func.name() {
        return Some(name.text().to_string());
    }
    func.as_cst()
        .parent()
        .and_then(crate::ast::VarDeclarator::cast)
        .and_then(|d| d.name())
        .map(|t| t.text().to_string())
}

/// FNV-1a over a function's [`function_identity`], used as the
/// [`ActiveFrameRegistry::bit_for`] key so both extraction and driving
/// agree on which bit belongs to which function without sharing node
/// identities across trees.
pub fn identity_key(identity: &str) -> u64 {
    let mut hash: u64 = 0xcbf29ce484222325;
    for byte in identity.bytes() {
        hash ^= u64::from(byte);
        hash = hash.wrapping_mul(0x100000001b3);
    }
    hash
}

/// Single-assignment slots for the helpers the preamble (C9) emits: each
/// materializes its name the first time a pass asks for it, so the
/// preamble only declares what was actually used.
#[derive(Debug, Clone, Default)]
pub struct SupportNames {
    pub seek: Option<String>,
    pub active_mask: Option<String>,
    pub maybe_not_empty_iterator: Option<String>,
    pub maybe_not_empty_key_iterator: Option<String>,
    pub or_helper: Option<String>,
    pub and_helper: Option<String>,
}

impl SupportNames {
    pub fn new() -> Self {
        Self::default()
    }
}
