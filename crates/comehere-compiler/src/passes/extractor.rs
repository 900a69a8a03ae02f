//! Extractor (C6): rewrites every `COMEHERE: with (...) { body }` into a
//! guarded `if (seek == id) { seek = 0; body }`, recording a [`GoalBlock`]
//! per site.

use comehere_core::{Diagnostics, Span};
use rowan::GreenNodeBuilder;

use crate::ast::{
    ComeHereWith, FunctionLike, LabelledStmt, SyntaxKind::*, SyntaxNode, build_node, copy_verbatim,
    rewrite_node,
};
use crate::model::{ActiveFrameRegistry, GoalBlock, Initializer, function_identity, identity_key};
use crate::names::NameRegistry;

pub struct ExtractResult {
    pub root: SyntaxNode,
    pub goals: Vec<GoalBlock>,
}

/// Walks `root` once, replacing each `COMEHERE`-labelled `with` in source
/// order. Allocates ids 1..N as they're encountered so id order matches
/// source order, per the data model's invariant.
pub fn extract(
    root: &SyntaxNode,
    names: &mut NameRegistry,
    frames: &mut ActiveFrameRegistry,
    diagnostics: &mut Diagnostics,
) -> ExtractResult {
    let sites: Vec<SyntaxNode> = root
        .descendants()
        .filter(|n| {
            n.kind() == LabelledStmt
                && LabelledStmt::cast(n.clone())
                    .map(|l| l.as_comehere_with().is_some())
                    .unwrap_or(false)
        })
        .collect();

    let mut goals = Vec::with_capacity(sites.len());
    let seek_name = names.seek();

    // Allocate ids and active-frame bits up front, in source order, before
    // mutating anything: the replacement closure below only needs to look
    // up a precomputed id/bit by node identity.
    let mut planned: Vec<(SyntaxNode, u32, Option<u32>, GoalBlock)> = Vec::new();
    for (i, site) in sites.iter().enumerate() {
        let id = (i + 1) as u32;
        let labelled = LabelledStmt::cast(site.clone()).unwrap();
        let with = labelled.as_comehere_with().unwrap();

        let (description, initializers) = parse_with_args(&with, diagnostics);
        let span = span_of(with.as_cst());

        let identity = enclosing_function(site).and_then(|func| function_identity(&func));
        let bit = identity.as_ref().map(|identity| frames.bit_for(identity_key(identity)));

        let goal = GoalBlock {
            id,
            description,
            initializers,
            span,
            enclosing_function: identity,
        };
        planned.push((site.clone(), id, bit, goal));
    }

    for (_, _, _, goal) in &planned {
        goals.push(goal.clone());
    }

    let mut new_root = root.clone();
    // Replace one at a time: each replacement invalidates node identities,
    // so re-root before looking up the next site via its stable position.
    for (site, id, bit, _) in planned.into_iter() {
        let labelled = LabelledStmt::cast(site.clone()).unwrap();
        let with = labelled.as_comehere_with().unwrap();
        let body = with.body().unwrap();
        let active_name = bit.map(|b| crate::model::ActiveFrameRegistry::local_name(b));

        new_root = rewrite_node(
            &new_root,
            |node| node == &site,
            |builder, _node| {
                emit_guard(builder, &seek_name, id, active_name.as_deref(), body.as_cst());
            },
        );
    }

    ExtractResult {
        root: new_root,
        goals,
    }
}

fn span_of(node: &SyntaxNode) -> Span {
    let range = node.text_range();
    Span::new(u32::from(range.start()), u32::from(range.end()))
}

fn enclosing_function(node: &SyntaxNode) -> Option<FunctionLike> {
    node.ancestors().find_map(FunctionLike::cast)
}

/// Classifies the `with(...)` argument list into an optional leading
/// description and an ordered list of `dotted.path = expr` initializers.
/// A lone `_` placeholder yields an empty initializer list. Anything else
/// is reported and skipped.
fn parse_with_args(with: &ComeHereWith, diagnostics: &mut Diagnostics) -> (Option<String>, Vec<Initializer>) {
    let mut description = None;
    let mut initializers = Vec::new();
    let mut first = true;

    for arg in with.args() {
        if first {
            first = false;
            if arg.kind() == StringLiteral {
                description = Some(unquote(&arg.text().to_string()));
                continue;
            }
            if arg.kind() == Identifier && arg.text() == "_" {
                continue;
            }
        }

        match cast_initializer_assignment(&arg) {
            Some((path, expr_text)) => initializers.push(Initializer::new(path, expr_text)),
            None => {
                diagnostics
                    .error(
                        format!(
                            "malformed COMEHERE initializer: expected `dotted.path = expression`, found `{}`",
                            arg.text()
                        ),
                        span_of(&arg),
                    )
                    .emit();
            }
        }
    }

    (description, initializers)
}

fn unquote(text: &str) -> String {
    text.trim_matches(|c| c == '"' || c == '\'').to_string()
}

/// Extracts `(dotted.path, rhs source text)` from an `=` assignment whose
/// left side is a chain of `Identifier`/`MemberExpr` nodes, or `None` if
/// the shape doesn't match.
fn cast_initializer_assignment(node: &SyntaxNode) -> Option<(Vec<String>, String)> {
    if node.kind() != AssignExpr {
        return None;
    }
    let assign = crate::ast::AssignExpr::cast(node.clone())?;
    let lhs = assign.lhs()?;
    let rhs = assign.rhs()?;
    let path = dotted_path(&lhs)?;
    Some((path, rhs.text().to_string()))
}

fn dotted_path(node: &SyntaxNode) -> Option<Vec<String>> {
    match node.kind() {
        Identifier => Some(vec![node.text().to_string()]),
        MemberExpr => {
            let member = crate::ast::MemberExpr::cast(node.clone())?;
            let object = member.object()?;
            let property = member.property()?;
            let mut path = dotted_path(&object)?;
            path.push(property.text().to_string());
            Some(path)
        }
        _ => None,
    }
}

/// Wraps the synthesized guard in a `GoalGuardMarker` so the control
/// driver (C7) can find it again by kind after its own rewrites, instead
/// of relying on node identity surviving a tree rebuild.
fn emit_guard(
    builder: &mut GreenNodeBuilder<'static>,
    seek_name: &str,
    id: u32,
    active_name: Option<&str>,
    body: &SyntaxNode,
) {
    build_node(builder, GoalGuardMarker, |builder| {
        emit_if_guard(builder, seek_name, id, active_name, body);
    });
}

fn emit_if_guard(
    builder: &mut GreenNodeBuilder<'static>,
    seek_name: &str,
    id: u32,
    active_name: Option<&str>,
    body: &SyntaxNode,
) {
    build_node(builder, IfStmt, |builder| {
        builder.token(KwIf.into(), "if");
        builder.token(Whitespace.into(), " ");
        builder.token(ParenOpen.into(), "(");

        let emit_seek_eq_id = |builder: &mut GreenNodeBuilder<'static>| {
            build_node(builder, crate::ast::SyntaxKind::BinaryExpr, |builder| {
                build_node(builder, crate::ast::SyntaxKind::Identifier, |builder| {
                    builder.token(Id.into(), seek_name);
                });
                builder.token(Whitespace.into(), " ");
                builder.token(EqEq.into(), "==");
                builder.token(Whitespace.into(), " ");
                build_node(builder, crate::ast::SyntaxKind::NumberLiteral, |builder| {
                    builder.token(Number.into(), &id.to_string());
                });
            });
        };

        if let Some(active_name) = active_name {
            build_node(builder, crate::ast::SyntaxKind::LogicalExpr, |builder| {
                build_node(builder, crate::ast::SyntaxKind::Identifier, |builder| {
                    builder.token(Id.into(), active_name);
                });
                builder.token(Whitespace.into(), " ");
                builder.token(AmpAmp.into(), "&&");
                builder.token(Whitespace.into(), " ");
                emit_seek_eq_id(builder);
            });
        } else {
            emit_seek_eq_id(builder);
        }

        builder.token(ParenClose.into(), ")");
        builder.token(Whitespace.into(), " ");

        build_node(builder, Block, |builder| {
            builder.token(BraceOpen.into(), "{");
            build_node(builder, ExprStmt, |builder| {
                build_node(builder, AssignExpr, |builder| {
                    build_node(builder, crate::ast::SyntaxKind::Identifier, |builder| {
                        builder.token(Id.into(), seek_name);
                    });
                    builder.token(Whitespace.into(), " ");
                    builder.token(Eq.into(), "=");
                    builder.token(Whitespace.into(), " ");
                    build_node(builder, crate::ast::SyntaxKind::NumberLiteral, |builder| {
                        builder.token(Number.into(), "0");
                    });
                });
                builder.token(Semicolon.into(), ";");
            });
            for child in body.children_with_tokens() {
                match child {
                    rowan::NodeOrToken::Node(n) => copy_verbatim(builder, &n),
                    rowan::NodeOrToken::Token(t) => {
                        if !matches!(t.kind(), BraceOpen | BraceClose) {
                            builder.token(t.kind().into(), t.text());
                        }
                    }
                }
            }
            builder.token(BraceClose.into(), "}");
        });
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::parse;
    use comehere_core::NamePool;

    #[test]
    fn extracts_trivial_module_level_block() {
        let root = parse("COMEHERE: with (\"bar\") {\n}\n").unwrap().root;
        let mut names = NameRegistry::new(NamePool::new());
        let mut frames = ActiveFrameRegistry::new();
        let mut diagnostics = Diagnostics::new();
        let result = extract(&root, &mut names, &mut frames, &mut diagnostics);

        assert_eq!(result.goals.len(), 1);
        assert_eq!(result.goals[0].id, 1);
        assert_eq!(result.goals[0].description.as_deref(), Some("bar"));
        assert!(!diagnostics.has_errors());
        let text = result.root.text().to_string();
        assert!(text.contains("if"));
        assert!(text.contains("1"));
        assert!(!text.contains("COMEHERE"));
    }

    #[test]
    fn extracts_initializers_in_order() {
        let root = parse("COMEHERE: with (n = 10, C.foo = 1) {\n}\n").unwrap().root;
        let mut names = NameRegistry::new(NamePool::new());
        let mut frames = ActiveFrameRegistry::new();
        let mut diagnostics = Diagnostics::new();
        let result = extract(&root, &mut names, &mut frames, &mut diagnostics);

        assert_eq!(result.goals[0].initializers.len(), 2);
        assert_eq!(result.goals[0].initializers[0].dotted(), "n");
        assert_eq!(result.goals[0].initializers[1].dotted(), "C.foo");
    }

    #[test]
    fn reports_malformed_initializer() {
        let root = parse("COMEHERE: with (1 + 1) {\n}\n").unwrap().root;
        let mut names = NameRegistry::new(NamePool::new());
        let mut frames = ActiveFrameRegistry::new();
        let mut diagnostics = Diagnostics::new();
        let result = extract(&root, &mut names, &mut frames, &mut diagnostics);

        assert!(result.goals[0].initializers.is_empty());
        assert!(diagnostics.has_errors());
    }
}
