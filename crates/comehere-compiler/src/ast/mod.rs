//! Lossless syntax tree: lexer, grammar, typed node wrappers, and the
//! mutation primitives every rewrite pass builds on.

mod builders;
mod core;
mod cst;
mod grammar;
mod lexer;
mod mutate;
mod nodes;

#[cfg(test)]
mod tests;

pub use builders::TreeBuilder;
pub use core::{ParseResult, parse};
pub use cst::{HostLang, SyntaxElement, SyntaxKind, SyntaxNode, SyntaxToken, TokenSet, token_sets};
pub use mutate::{build_node, copy_verbatim, rewrite_node};
pub use nodes::*;
