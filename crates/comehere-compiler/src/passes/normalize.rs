//! Block-normalizer (C3): wraps every single-statement control-flow arm
//! and every expression-bodied arrow function in a block, so later passes
//! always have an insertion site.
//!
//! Idempotent by construction: a node already shaped as a `Block` (or, for
//! arrows, already `=> { ... }`) is never a normalization target, so a
//! second run finds nothing left to do.

use std::collections::HashSet;

use rowan::GreenNodeBuilder;

use crate::ast::{SyntaxKind::*, SyntaxNode, build_node, copy_verbatim, rewrite_node};

pub fn normalize(root: &SyntaxNode) -> SyntaxNode {
    let targets = collect_targets(root);
    rewrite_node(
        root,
        |node| targets.contains(node),
        |builder, node| emit_wrapped(builder, node),
    )
}

/// Child slots that must be a `Block`: the then/else arms of an `if`, the
/// bodies of loops, and an arrow function's expression body.
fn collect_targets(root: &SyntaxNode) -> HashSet<SyntaxNode> {
    let mut targets = HashSet::new();
    for node in root.descendants() {
        match node.kind() {
            IfStmt => {
                let mut children = node.children();
                let _condition = children.next();
                if let Some(then_branch) = children.next() {
                    mark_if_not_block(&mut targets, then_branch);
                }
                if let Some(else_branch) = children.next() {
                    mark_if_not_block(&mut targets, else_branch);
                }
            }
            WhileStmt | ForStmt | ForInStmt | ForOfStmt => {
                if let Some(body) = node.children().last() {
                    mark_if_not_block(&mut targets, body);
                }
            }
            DoWhileStmt => {
                if let Some(body) = node.children().next() {
                    mark_if_not_block(&mut targets, body);
                }
            }
            ArrowFunction => {
                // Body is the last child: either a `Block` already, or an
                // expression that needs wrapping into `{ return expr; }`.
                if let Some(body) = node.children().last() {
                    if body.kind() != Block {
                        targets.insert(body);
                    }
                }
            }
            _ => {}
        }
    }
    targets
}

fn mark_if_not_block(targets: &mut HashSet<SyntaxNode>, branch: SyntaxNode) {
    if branch.kind() != Block && branch.kind() != IfStmt {
        // `else if` chains: the else-arm is itself an `IfStmt`, which is
        // normalized on its own turn through the descendants walk, not
        // wrapped again here.
        targets.insert(branch);
    }
}

fn emit_wrapped(builder: &mut GreenNodeBuilder<'static>, node: &SyntaxNode) {
    build_node(builder, Block, |builder| {
        builder.token(BraceOpen.into(), "{");
        if is_statement_kind(node.kind()) {
            copy_verbatim(builder, node);
        } else {
            // Arrow expression body: `expr` becomes `return expr;`.
            build_node(builder, ReturnStmt, |builder| {
                builder.token(KwReturn.into(), "return");
                builder.token(Whitespace.into(), " ");
                copy_verbatim(builder, node);
                builder.token(Semicolon.into(), ";");
            });
        }
        builder.token(BraceClose.into(), "}");
    });
}

fn is_statement_kind(kind: crate::ast::SyntaxKind) -> bool {
    !matches!(
        kind,
        CallExpr
            | MemberExpr
            | ComputedMemberExpr
            | BinaryExpr
            | LogicalExpr
            | UnaryExpr
            | UpdateExpr
            | AssignExpr
            | ConditionalExpr
            | SequenceExpr
            | ParenExpr
            | Identifier
            | CaptureIdentifier
            | NumberLiteral
            | StringLiteral
            | BooleanLiteral
            | NullLiteral
            | UndefinedLiteral
            | ThisExpr
            | SuperExpr
            | TemplateLiteral
            | ObjectExpr
            | ArrayExpr
            | NewExpr
            | FunctionExpr
            | ArrowFunction
            | ClassExpr
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::parse;

    fn normalized_text(source: &str) -> String {
        let root = parse(source).unwrap().root;
        normalize(&root).text().to_string()
    }

    #[test]
    fn wraps_bare_if_arm() {
        let out = normalized_text("if (x) y();\n");
        assert!(out.contains("{y();}") || out.contains("{ y(); }"), "{out}");
    }

    #[test]
    fn leaves_existing_block_untouched() {
        let source = "if (x) { y(); }\n";
        assert_eq!(normalized_text(source), source);
    }

    #[test]
    fn wraps_while_body() {
        let out = normalized_text("while (x) y();\n");
        assert!(out.starts_with("while (x) {"), "{out}");
        assert!(out.contains("y();"), "{out}");
    }

    #[test]
    fn wraps_arrow_expression_body() {
        let out = normalized_text("const f = x => x + 1;\n");
        assert!(out.contains("return x + 1;"), "{out}");
        assert!(out.contains("{") && out.contains("}"), "{out}");
    }

    #[test]
    fn is_idempotent() {
        let root = parse("if (x) y();\n").unwrap().root;
        let once = normalize(&root);
        let twice = normalize(&once);
        assert_eq!(once.text().to_string(), twice.text().to_string());
    }
}
