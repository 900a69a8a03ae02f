//! Invariant checks excluded from coverage reports.

#![cfg_attr(coverage_nightly, coverage(off))]

use crate::ast::{SyntaxKind, SyntaxNode};

/// A `LogicalExpr`/`BinaryExpr` node always wraps exactly two node children,
/// per the grammar's binary-expression parsing; this extracts them,
/// panicking if that shape was ever violated upstream.
pub(crate) fn ensure_binary_operands(node: &SyntaxNode) -> (SyntaxNode, SyntaxNode) {
    let mut children = node.children();
    let left = children
        .next()
        .unwrap_or_else(|| panic!("{:?} missing its left operand", node.kind()));
    let right = children
        .next()
        .unwrap_or_else(|| panic!("{:?} missing its right operand", node.kind()));
    (left, right)
}

/// A `GoalGuardMarker` always wraps exactly one synthesized `IfStmt`,
/// emitted by the extractor; this locates it, panicking if an earlier
/// rewrite ever dropped it.
pub(crate) fn ensure_guard_if(marker: &SyntaxNode) -> SyntaxNode {
    marker
        .children()
        .find(|c| c.kind() == SyntaxKind::IfStmt)
        .unwrap_or_else(|| panic!("GoalGuardMarker missing its guard IfStmt"))
}
