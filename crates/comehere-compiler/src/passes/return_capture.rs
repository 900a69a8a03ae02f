//! Return-trailing capture (C5): lifts `COMEHERE` blocks that immediately
//! follow a `return` into a `finally` clause, so they can observe the
//! returned value before extraction proper.
//!
//! Unlike the other passes this one changes the *number* of statements at
//! a site (one `return` plus N `COMEHERE` siblings collapses to a single
//! `try`/`finally`), so it can't be expressed as the 1:1 substitution
//! [`crate::ast::rewrite_node`] supports; it walks the tree directly.

use rowan::{GreenNodeBuilder, NodeOrToken};

use crate::ast::{SyntaxKind::*, SyntaxNode};
use crate::names::NameRegistry;

pub fn lift_return_trailing_captures(root: &SyntaxNode, names: &mut NameRegistry) -> SyntaxNode {
    let mut builder = GreenNodeBuilder::new();
    rebuild(root, &mut builder, names);
    SyntaxNode::new_root(builder.finish())
}

fn rebuild(node: &SyntaxNode, builder: &mut GreenNodeBuilder<'static>, names: &mut NameRegistry) {
    if matches!(node.kind(), Module | Block) {
        builder.start_node(node.kind().into());
        emit_statement_sequence(node, builder, names);
        builder.finish_node();
        return;
    }

    builder.start_node(node.kind().into());
    for child in node.children_with_tokens() {
        match child {
            NodeOrToken::Node(child_node) => rebuild(&child_node, builder, names),
            NodeOrToken::Token(token) => builder.token(token.kind().into(), token.text()),
        }
    }
    builder.finish_node();
}

/// Emits `node`'s direct children (tokens verbatim, statement-shaped nodes
/// through `rebuild`/the runs-collapsing logic), leaving brace tokens for
/// the caller (already inside `start_node`/`finish_node`).
fn emit_statement_sequence(
    node: &SyntaxNode,
    builder: &mut GreenNodeBuilder<'static>,
    names: &mut NameRegistry,
) {
    let children: Vec<crate::ast::SyntaxElement> =
        node.children_with_tokens().collect();
    let mut i = 0;
    while i < children.len() {
        match &children[i] {
            NodeOrToken::Token(token) => {
                builder.token(token.kind().into(), token.text());
                i += 1;
            }
            NodeOrToken::Node(stmt) if stmt.kind() == ReturnStmt => {
                let mut run_end = i + 1;
                // Skip trivia-only tokens between statements when looking
                // for the next statement node.
                let mut j = i + 1;
                let mut trailing: Vec<crate::ast::SyntaxElement> = Vec::new();
                while j < children.len() {
                    match &children[j] {
                        NodeOrToken::Node(n) if n.kind() == LabelledStmt && is_comehere(n) => {
                            trailing.push(children[j].clone());
                            run_end = j + 1;
                            j += 1;
                        }
                        NodeOrToken::Token(t) if t.kind().is_trivia() => j += 1,
                        _ => break,
                    }
                }

                if trailing.is_empty() {
                    rebuild(stmt, builder, names);
                } else {
                    emit_lifted_return(stmt, &trailing, builder, names);
                }
                i = run_end;
            }
            NodeOrToken::Node(n) => {
                rebuild(n, builder, names);
                i += 1;
            }
        }
    }
}

fn is_comehere(node: &SyntaxNode) -> bool {
    crate::ast::LabelledStmt::cast(node.clone())
        .map(|l| l.as_comehere_with().is_some())
        .unwrap_or(false)
}

/// `return E;` followed by one or more COMEHERE siblings becomes
/// `let R; try { return (R = E); } finally { <siblings, Function.return -> R> }`.
fn emit_lifted_return(
    return_stmt: &SyntaxNode,
    trailing: &[crate::ast::SyntaxElement],
    builder: &mut GreenNodeBuilder<'static>,
    names: &mut NameRegistry,
) {
    let r_name = names.fresh("R");
    let return_expr = return_stmt.children().next();

    crate::ast::build_node(builder, VarDecl, |b| {
        b.token(KwLet.into(), "let");
        b.token(Whitespace.into(), " ");
        crate::ast::build_node(b, VarDeclarator, |b| {
            crate::ast::build_node(b, Identifier, |b| b.token(Id.into(), &r_name));
        });
        b.token(Semicolon.into(), ";");
    });

    crate::ast::build_node(builder, TryStmt, |b| {
        b.token(KwTry.into(), "try");
        b.token(Whitespace.into(), " ");
        crate::ast::build_node(b, Block, |b| {
            b.token(BraceOpen.into(), "{");
            crate::ast::build_node(b, ReturnStmt, |b| {
                b.token(KwReturn.into(), "return");
                b.token(Whitespace.into(), " ");
                b.token(ParenOpen.into(), "(");
                crate::ast::build_node(b, AssignExpr, |b| {
                    crate::ast::build_node(b, Identifier, |b| b.token(Id.into(), &r_name));
                    b.token(Whitespace.into(), " ");
                    b.token(Eq.into(), "=");
                    b.token(Whitespace.into(), " ");
                    match &return_expr {
                        Some(expr) => emit_with_return_value_substituted(b, expr, &r_name),
                        None => crate::ast::build_node(b, UndefinedLiteral, |b| {
                            b.token(KwUndefined.into(), "undefined")
                        }),
                    }
                });
                b.token(ParenClose.into(), ")");
                b.token(Semicolon.into(), ";");
            });
            b.token(BraceClose.into(), "}");
        });
        b.token(Whitespace.into(), " ");
        b.token(KwFinally.into(), "finally");
        b.token(Whitespace.into(), " ");
        crate::ast::build_node(b, Block, |b| {
            b.token(BraceOpen.into(), "{");
            for element in trailing {
                if let NodeOrToken::Node(n) = element {
                    emit_with_return_value_substituted(b, n, &r_name);
                }
            }
            b.token(BraceClose.into(), "}");
        });
    });
}

/// Copies `node`, rewriting every occurrence of the magic `Function.return`
/// expression to a reference to the fresh `R` local.
fn emit_with_return_value_substituted(
    builder: &mut GreenNodeBuilder<'static>,
    node: &SyntaxNode,
    r_name: &str,
) {
    if is_function_return_sentinel(node) {
        crate::ast::build_node(builder, Identifier, |b| b.token(Id.into(), r_name));
        return;
    }

    builder.start_node(node.kind().into());
    for child in node.children_with_tokens() {
        match child {
            NodeOrToken::Node(n) => emit_with_return_value_substituted(builder, &n, r_name),
            NodeOrToken::Token(t) => builder.token(t.kind().into(), t.text()),
        }
    }
    builder.finish_node();
}

fn is_function_return_sentinel(node: &SyntaxNode) -> bool {
    let Some(member) = crate::ast::MemberExpr::cast(node.clone()) else {
        return false;
    };
    let Some(object) = member.object() else {
        return false;
    };
    let Some(property) = member.property() else {
        return false;
    };
    object.kind() == Identifier && object.text() == "Function" && property.text() == "return"
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::parse;
    use comehere_core::NamePool;

    #[test]
    fn lifts_return_followed_by_comehere() {
        let source = "function f() {\nreturn (a + b) * c;\nCOMEHERE: with (_) {\nlog(Function.return);\n}\n}\n";
        let root = parse(source).unwrap().root;
        let mut names = NameRegistry::new(NamePool::new());
        let out = lift_return_trailing_captures(&root, &mut names);
        let text = out.text().to_string();
        assert!(text.contains("try"));
        assert!(text.contains("finally"));
        assert!(!text.contains("Function.return"));
    }

    #[test]
    fn leaves_plain_return_untouched() {
        let source = "function f() {\nreturn 1;\n}\n";
        let root = parse(source).unwrap().root;
        let mut names = NameRegistry::new(NamePool::new());
        let out = lift_return_trailing_captures(&root, &mut names);
        assert_eq!(out.text().to_string(), source);
    }
}
