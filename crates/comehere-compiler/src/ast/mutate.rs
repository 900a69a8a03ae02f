//! Whole-tree rebuild with substitution.
//!
//! Every rewrite pass needs to replace a handful of subtrees inside a much
//! larger, otherwise-unchanged tree. Rather than splice `GreenNode`s
//! bottom-up by hand, [`rewrite_node`] walks the existing tree once and
//! re-emits it through the same [`GreenNodeBuilder`] the parser uses,
//! substituting new content wherever `should_replace` matches. This costs
//! an extra full traversal per pass but means every pass reuses one
//! well-tested code path instead of each hand-rolling tree surgery.

use rowan::{GreenNodeBuilder, NodeOrToken};

use super::cst::{SyntaxKind, SyntaxNode};

/// Rebuilds `root`, substituting `emit_replacement`'s output at every node
/// for which `should_replace` returns true. Matched nodes are not
/// recursed into; the closure is responsible for emitting their entire
/// replacement (including copying any parts of the original it wants to
/// keep, via [`copy_verbatim`]).
pub fn rewrite_node(
    root: &SyntaxNode,
    mut should_replace: impl FnMut(&SyntaxNode) -> bool,
    mut emit_replacement: impl FnMut(&mut GreenNodeBuilder<'static>, &SyntaxNode),
) -> SyntaxNode {
    let mut builder = GreenNodeBuilder::new();
    walk(root, &mut builder, &mut should_replace, &mut emit_replacement);
    SyntaxNode::new_root(builder.finish())
}

fn walk(
    node: &SyntaxNode,
    builder: &mut GreenNodeBuilder<'static>,
    should_replace: &mut impl FnMut(&SyntaxNode) -> bool,
    emit_replacement: &mut impl FnMut(&mut GreenNodeBuilder<'static>, &SyntaxNode),
) {
    if should_replace(node) {
        emit_replacement(builder, node);
        return;
    }

    builder.start_node(node.kind().into());
    for child in node.children_with_tokens() {
        match child {
            NodeOrToken::Node(child_node) => {
                walk(&child_node, builder, should_replace, emit_replacement);
            }
            NodeOrToken::Token(token) => {
                builder.token(token.kind().into(), token.text());
            }
        }
    }
    builder.finish_node();
}

/// Emits an exact copy of `node` into `builder`. Used inside
/// `emit_replacement` closures that want to keep most of a matched
/// subtree (e.g. wrapping a loop body in a new guarded block).
pub fn copy_verbatim(builder: &mut GreenNodeBuilder<'static>, node: &SyntaxNode) {
    builder.start_node(node.kind().into());
    for child in node.children_with_tokens() {
        match child {
            NodeOrToken::Node(child_node) => copy_verbatim(builder, &child_node),
            NodeOrToken::Token(token) => builder.token(token.kind().into(), token.text()),
        }
    }
    builder.finish_node();
}

/// Wraps a bare `SyntaxKind::Error` build-out: starts a node of `kind`,
/// runs `body` to emit its contents, and closes it. Kept here rather than
/// in `builders` since every rewrite pass reaches for it immediately
/// after `rewrite_node`.
pub fn build_node(
    builder: &mut GreenNodeBuilder<'static>,
    kind: SyntaxKind,
    body: impl FnOnce(&mut GreenNodeBuilder<'static>),
) {
    builder.start_node(kind.into());
    body(builder);
    builder.finish_node();
}
