//! Capture-variable pass (C8): auto-declares each `$$name` capture
//! variable as a `[text, value]` pair at its dominating scope, then
//! rewrites reads to `name[1]` and assignments to also update `name[0]`
//! with the assignment's textual form.
//!
//! `$$name` is lexically an ordinary identifier (`$` is a valid identifier
//! character), so the capture variable and its backing declaration share
//! one spelling; no renaming is needed.

use std::collections::{BTreeMap, HashSet};

use rowan::{GreenNodeBuilder, NodeOrToken};

use crate::ast::{AssignExpr, SyntaxKind, SyntaxKind::*, SyntaxNode, build_node, rewrite_node};

pub fn rewrite_capture_variables(root: &SyntaxNode) -> SyntaxNode {
    let names = distinct_capture_names(root);
    if names.is_empty() {
        return root.clone();
    }

    let mut current = root.clone();
    for name in &names {
        current = rewrite_one_capture(&current, name);
    }
    current
}

fn distinct_capture_names(root: &SyntaxNode) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut ordered = Vec::new();
    for token in root.descendants_with_tokens().filter_map(|e| e.into_token()) {
        if token.kind() == CaptureIdent && seen.insert(token.text().to_string()) {
            ordered.push(token.text().to_string());
        }
    }
    ordered
}

fn rewrite_one_capture(root: &SyntaxNode, name: &str) -> SyntaxNode {
    let uses: Vec<SyntaxNode> = root
        .descendants()
        .filter(|n| n.kind() == CaptureIdentifier && n.text().to_string() == name)
        .collect();
    if uses.is_empty() {
        return root.clone();
    }

    let scope = dominating_scope(root, &uses);

    // First pass: replace each use. An assignment `name = rhs` becomes a
    // sequence updating both slots; a bare read becomes `name[1]`.
    let assign_uses: BTreeMap<usize, SyntaxNode> = uses
        .iter()
        .enumerate()
        .filter_map(|(i, use_node)| {
            use_node
                .parent()
                .filter(|p| p.kind() == SyntaxKind::AssignExpr)
                .and_then(|p| AssignExpr::cast(p.clone()))
                .filter(|assign| assign.lhs().as_ref() == Some(use_node))
                .map(|_| (i, use_node.parent().unwrap()))
        })
        .collect();

    let mut rewritten = rewrite_node(
        root,
        |node| {
            assign_uses.values().any(|a| a == node)
                || uses.iter().any(|u| u == node && !is_inside_any(u, assign_uses.values()))
        },
        |builder, node| {
            if let Some((_, assign_node)) = assign_uses.iter().find(|(_, a)| *a == node) {
                emit_assignment_rewrite(builder, assign_node, name);
            } else {
                emit_value_read(builder, name);
            }
        },
    );

    rewritten = prepend_declaration(&rewritten, &scope, name);
    rewritten
}

fn is_inside_any<'a>(node: &SyntaxNode, containers: impl Iterator<Item = &'a SyntaxNode>) -> bool {
    containers.into_iter().any(|c| node.ancestors().any(|a| &a == c))
}

fn emit_value_read(builder: &mut GreenNodeBuilder<'static>, name: &str) {
    build_node(builder, ComputedMemberExpr, |b| {
        build_node(b, Identifier, |b| b.token(Id.into(), name));
        b.token(BracketOpen.into(), "[");
        build_node(b, NumberLiteral, |b| b.token(Number.into(), "1"));
        b.token(BracketClose.into(), "]");
    });
}

/// `name = rhs` becomes `(name[0] = "<rhs text> =", name[1] = rhs)`; the
/// sequence's value is the last element, so the expression still
/// evaluates to `rhs` like the original assignment did.
fn emit_assignment_rewrite(builder: &mut GreenNodeBuilder<'static>, assign_node: &SyntaxNode, name: &str) {
    let assign = AssignExpr::cast(assign_node.clone()).unwrap();
    let rhs = assign.rhs();
    let rhs_text = rhs.as_ref().map(|r| r.text().to_string()).unwrap_or_default();
    let text_slot = format!("\"{} =\"", escape(&rhs_text));

    build_node(builder, ParenExpr, |b| {
        b.token(ParenOpen.into(), "(");
        build_node(b, SequenceExpr, |b| {
            build_node(b, SyntaxKind::AssignExpr, |b| {
                build_node(b, ComputedMemberExpr, |b| {
                    build_node(b, Identifier, |b| b.token(Id.into(), name));
                    b.token(BracketOpen.into(), "[");
                    build_node(b, NumberLiteral, |b| b.token(Number.into(), "0"));
                    b.token(BracketClose.into(), "]");
                });
                b.token(Whitespace.into(), " ");
                b.token(Eq.into(), "=");
                b.token(Whitespace.into(), " ");
                build_node(b, StringLiteral, |b| b.token(StringLit.into(), &text_slot));
            });
            b.token(Comma.into(), ",");
            b.token(Whitespace.into(), " ");
            build_node(b, SyntaxKind::AssignExpr, |b| {
                build_node(b, ComputedMemberExpr, |b| {
                    build_node(b, Identifier, |b| b.token(Id.into(), name));
                    b.token(BracketOpen.into(), "[");
                    build_node(b, NumberLiteral, |b| b.token(Number.into(), "1"));
                    b.token(BracketClose.into(), "]");
                });
                b.token(Whitespace.into(), " ");
                b.token(Eq.into(), "=");
                b.token(Whitespace.into(), " ");
                match &rhs {
                    Some(expr) => crate::ast::copy_verbatim(b, expr),
                    None => build_node(b, UndefinedLiteral, |b| b.token(KwUndefined.into(), "undefined")),
                }
            });
        });
        b.token(ParenClose.into(), ")");
    });
}

fn escape(text: &str) -> String {
    text.replace('\\', "\\\\").replace('"', "\\\"")
}

/// The deepest `Module`/function body `Block` that contains every use;
/// falls back to the module root if uses span more than one function.
fn dominating_scope(root: &SyntaxNode, uses: &[SyntaxNode]) -> SyntaxNode {
    let mut candidate = enclosing_scope(&uses[0]);
    for use_node in &uses[1..] {
        let scope = enclosing_scope(use_node);
        if scope != candidate {
            return root.clone();
        }
    }
    candidate
}

fn enclosing_scope(node: &SyntaxNode) -> SyntaxNode {
    node.ancestors()
        .find(|a| {
            a.kind() == Module
                || (a.kind() == Block && crate::ast::FunctionLike::cast(a.parent().unwrap_or(a.clone())).is_some())
        })
        .unwrap_or_else(|| node.ancestors().last().unwrap())
}

fn prepend_declaration(root: &SyntaxNode, scope: &SyntaxNode, name: &str) -> SyntaxNode {
    rewrite_node(
        root,
        |node| node == scope,
        |builder, node| {
            builder.start_node(node.kind().into());
            if node.kind() == Block {
                builder.token(BraceOpen.into(), "{");
            }
            emit_declarator(builder, name);
            for child in node.children_with_tokens() {
                match child {
                    NodeOrToken::Node(n) => crate::ast::copy_verbatim(builder, &n),
                    NodeOrToken::Token(t) => {
                        if node.kind() != Block || !matches!(t.kind(), BraceOpen | BraceClose) {
                            builder.token(t.kind().into(), t.text());
                        }
                    }
                }
            }
            if node.kind() == Block {
                builder.token(BraceClose.into(), "}");
            }
            builder.finish_node();
        },
    )
}

fn emit_declarator(builder: &mut GreenNodeBuilder<'static>, name: &str) {
    build_node(builder, VarDecl, |b| {
        b.token(KwConst.into(), "const");
        b.token(Whitespace.into(), " ");
        build_node(b, VarDeclarator, |b| {
            build_node(b, Identifier, |b| b.token(Id.into(), name));
            b.token(Whitespace.into(), " ");
            b.token(Eq.into(), "=");
            b.token(Whitespace.into(), " ");
            build_node(b, ArrayExpr, |b| {
                b.token(BracketOpen.into(), "[");
                build_node(b, StringLiteral, |b| b.token(StringLit.into(), "\"\""));
                b.token(Comma.into(), ",");
                b.token(Whitespace.into(), " ");
                build_node(b, UndefinedLiteral, |b| b.token(KwUndefined.into(), "undefined"));
                b.token(BracketClose.into(), "]");
            });
        });
        b.token(Semicolon.into(), ";");
    });
    builder.token(Newline.into(), "\n");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::parse;

    #[test]
    fn declares_and_rewrites_a_capture_variable() {
        let root = parse("function f() {\n$$result = compute();\nlog($$result);\n}\n").unwrap().root;
        let out = rewrite_capture_variables(&root);
        let text = out.text().to_string();
        assert!(text.contains("const $$result = [\"\", undefined]"));
        assert!(text.contains("$$result[1]"));
        assert!(text.contains("$$result[0]"));
    }

    #[test]
    fn leaves_source_without_captures_untouched() {
        let source = "function f() {\nreturn 1;\n}\n";
        let root = parse(source).unwrap().root;
        let out = rewrite_capture_variables(&root);
        assert_eq!(out.text().to_string(), source);
    }
}
