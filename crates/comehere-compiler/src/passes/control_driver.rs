//! Control driver (C7): the control-flow surgery that makes each goal
//! guard (wrapped in a `GoalGuardMarker` by the extractor) reachable from
//! module top, then synthesizes the calls needed to reach functions that
//! nothing at the top level calls naturally.
//!
//! Per goal, the driver walks from its guard up to the module root. Each
//! control construct on that path is rewritten so the branch/iteration/
//! case containing the guard always runs when `seek` targets it:
//!
//! - two-branch conditional: OR the branch condition with `seek == id`
//! - counted/condition loop (`while`, `do`/`while`): same OR, on the test
//! - `for`/`for-of` iteration: wrap the iterable so an empty collection
//!   still yields once when seeking (see [`crate::passes::preamble`])
//! - `try`/`catch`: prepend a forced `throw` to the `try` block when the
//!   guard lives in the `catch`
//! - `||`/`&&`: replace with a synthesized `or`/`and` call that forces
//!   evaluation of the side containing the guard
//!
//! Plain `for (;;)` loops are left untouched: the untyped child list
//! doesn't distinguish the test clause from init/update positionally, so
//! forcing it safely needs a parser-level tag this grammar doesn't carry
//! (see `DESIGN.md`).
//!
//! A second, module-wide pass then gives every function, method, or
//! constructor that contains a goal an active-frame prologue and a
//! synthesized, guarded invocation at module end: `if (seek == id) {
//! try { activeMask |= 1n << bit; <call>; } finally { seek = 0; } }`, so
//! a cold load (`seek == 0`) never runs one and `seek` is always restored
//! even if the call throws.

use indexmap::IndexMap;
use rowan::{GreenNodeBuilder, NodeOrToken};

use comehere_core::Diagnostics;

use crate::ast::{ClassDecl, FunctionLike, MethodDef, SyntaxKind::*, SyntaxNode, build_node, copy_verbatim, parse};
use crate::model::{ActiveFrameRegistry, GoalBlock, function_identity, identity_key};
use crate::names::NameRegistry;

pub fn drive(
    root: &SyntaxNode,
    goals: &[GoalBlock],
    names: &mut NameRegistry,
    frames: &mut ActiveFrameRegistry,
    diagnostics: &mut Diagnostics,
) -> SyntaxNode {
    let mut current = root.clone();
    for goal in goals {
        if let Some(marker) = find_marker(&current, goal.id) {
            current = drive_one(&current, &marker, goal.id, names, frames);
        }
    }
    synthesize_calls(&current, goals, names, frames, diagnostics)
}

fn find_marker(root: &SyntaxNode, id: u32) -> Option<SyntaxNode> {
    root.descendants().find(|n| n.kind() == GoalGuardMarker && marker_id(n) == Some(id))
}

fn marker_id(marker: &SyntaxNode) -> Option<u32> {
    let if_stmt = crate::invariants::ensure_guard_if(marker);
    let cond = if_stmt.children().next()?;
    cond.descendants_with_tokens()
        .filter_map(|e| e.into_token())
        .find(|t| t.kind() == Number)
        .and_then(|t| t.text().parse().ok())
}

fn contains(ancestor: &SyntaxNode, target: &SyntaxNode) -> bool {
    std::iter::successors(Some(target.clone()), |n| n.parent()).any(|n| &n == ancestor)
}

fn drive_one(
    root: &SyntaxNode,
    marker: &SyntaxNode,
    id: u32,
    names: &mut NameRegistry,
    frames: &mut ActiveFrameRegistry,
) -> SyntaxNode {
    let mut builder = GreenNodeBuilder::new();
    rebuild_path(root, marker, id, names, frames, &mut builder);
    SyntaxNode::new_root(builder.finish())
}

fn rebuild_path(
    node: &SyntaxNode,
    marker: &SyntaxNode,
    id: u32,
    names: &mut NameRegistry,
    frames: &mut ActiveFrameRegistry,
    builder: &mut GreenNodeBuilder<'static>,
) {
    if node == marker || !contains(node, marker) {
        copy_verbatim(builder, node);
        return;
    }

    match node.kind() {
        IfStmt => rebuild_if(node, marker, id, names, frames, builder),
        WhileStmt => rebuild_while(node, marker, id, names, frames, builder),
        DoWhileStmt => rebuild_do_while(node, marker, id, names, frames, builder),
        ForInStmt => rebuild_for_each(node, marker, id, names, frames, builder, false),
        ForOfStmt => rebuild_for_each(node, marker, id, names, frames, builder, true),
        TryStmt => rebuild_try(node, marker, id, names, frames, builder),
        SwitchStmt => rebuild_switch(node, marker, id, names, frames, builder),
        LogicalExpr if contains(&node.children().nth(1).unwrap(), marker) => {
            rebuild_logical_force(node, marker, id, names, frames, builder)
        }
        FunctionDecl | FunctionExpr | ArrowFunction | MethodDef => {
            rebuild_function(node, marker, id, names, frames, builder)
        }
        _ => generic_recurse(node, marker, id, names, frames, builder),
    }
}

fn generic_recurse(
    node: &SyntaxNode,
    marker: &SyntaxNode,
    id: u32,
    names: &mut NameRegistry,
    frames: &mut ActiveFrameRegistry,
    builder: &mut GreenNodeBuilder<'static>,
) {
    builder.start_node(node.kind().into());
    for child in node.children_with_tokens() {
        match child {
            NodeOrToken::Token(t) => builder.token(t.kind().into(), t.text()),
            NodeOrToken::Node(n) => {
                if contains(&n, marker) {
                    rebuild_path(&n, marker, id, names, frames, builder);
                } else {
                    copy_verbatim(builder, &n);
                }
            }
        }
    }
    builder.finish_node();
}

fn emit_forced_condition(builder: &mut GreenNodeBuilder<'static>, cond: &SyntaxNode, seek_name: &str, id: u32) {
    build_node(builder, LogicalExpr, |b| {
        copy_verbatim(b, cond);
        b.token(Whitespace.into(), " ");
        b.token(PipePipe.into(), "||");
        b.token(Whitespace.into(), " ");
        emit_seek_eq_id(b, seek_name, id);
    });
}

fn emit_seek_eq_id(builder: &mut GreenNodeBuilder<'static>, seek_name: &str, id: u32) {
    build_node(builder, BinaryExpr, |b| {
        build_node(b, Identifier, |b| b.token(Id.into(), seek_name));
        b.token(Whitespace.into(), " ");
        b.token(EqEq.into(), "==");
        b.token(Whitespace.into(), " ");
        build_node(b, NumberLiteral, |b| b.token(Number.into(), &id.to_string()));
    });
}

/// Rewrites an `IfStmt`'s condition (first node child) and recurses into
/// whichever branch (second or third node child) holds the guard, copying
/// the other verbatim.
fn rebuild_if(
    node: &SyntaxNode,
    marker: &SyntaxNode,
    id: u32,
    names: &mut NameRegistry,
    frames: &mut ActiveFrameRegistry,
    builder: &mut GreenNodeBuilder<'static>,
) {
    let seek_name = names.seek();
    let mut index = 0;
    builder.start_node(IfStmt.into());
    for child in node.children_with_tokens() {
        match child {
            NodeOrToken::Token(t) => builder.token(t.kind().into(), t.text()),
            NodeOrToken::Node(n) => {
                if index == 0 {
                    emit_forced_condition(builder, &n, &seek_name, id);
                } else if contains(&n, marker) {
                    rebuild_path(&n, marker, id, names, frames, builder);
                } else {
                    copy_verbatim(builder, &n);
                }
                index += 1;
            }
        }
    }
    builder.finish_node();
}

fn rebuild_while(
    node: &SyntaxNode,
    marker: &SyntaxNode,
    id: u32,
    names: &mut NameRegistry,
    frames: &mut ActiveFrameRegistry,
    builder: &mut GreenNodeBuilder<'static>,
) {
    let seek_name = names.seek();
    let mut index = 0;
    builder.start_node(WhileStmt.into());
    for child in node.children_with_tokens() {
        match child {
            NodeOrToken::Token(t) => builder.token(t.kind().into(), t.text()),
            NodeOrToken::Node(n) => {
                if index == 0 {
                    emit_forced_condition(builder, &n, &seek_name, id);
                } else {
                    rebuild_path(&n, marker, id, names, frames, builder);
                }
                index += 1;
            }
        }
    }
    builder.finish_node();
}

fn rebuild_do_while(
    node: &SyntaxNode,
    marker: &SyntaxNode,
    id: u32,
    names: &mut NameRegistry,
    frames: &mut ActiveFrameRegistry,
    builder: &mut GreenNodeBuilder<'static>,
) {
    let seek_name = names.seek();
    let mut index = 0;
    builder.start_node(DoWhileStmt.into());
    for child in node.children_with_tokens() {
        match child {
            NodeOrToken::Token(t) => builder.token(t.kind().into(), t.text()),
            NodeOrToken::Node(n) => {
                if index == 0 {
                    rebuild_path(&n, marker, id, names, frames, builder);
                } else {
                    emit_forced_condition(builder, &n, &seek_name, id);
                }
                index += 1;
            }
        }
    }
    builder.finish_node();
}

/// Shared by `for-in`/`for-of`: children are `[binding, iterable, body]`;
/// wraps the iterable in `maybeNotEmptyIterator`/`maybeNotEmptyKeyIterator`
/// so the loop runs at least once when seeking this goal even over an
/// empty collection.
fn rebuild_for_each(
    node: &SyntaxNode,
    marker: &SyntaxNode,
    id: u32,
    names: &mut NameRegistry,
    frames: &mut ActiveFrameRegistry,
    builder: &mut GreenNodeBuilder<'static>,
    of_values: bool,
) {
    let seek_name = names.seek();
    let helper = if of_values {
        names.maybe_not_empty_iterator()
    } else {
        names.maybe_not_empty_key_iterator()
    };
    let mut index = 0;
    builder.start_node(node.kind().into());
    for child in node.children_with_tokens() {
        match child {
            NodeOrToken::Token(t) => builder.token(t.kind().into(), t.text()),
            NodeOrToken::Node(n) => {
                match index {
                    1 => emit_wrapped_iterable(builder, &n, &helper, &seek_name),
                    _ => {
                        if contains(&n, marker) {
                            rebuild_path(&n, marker, id, names, frames, builder);
                        } else {
                            copy_verbatim(builder, &n);
                        }
                    }
                }
                index += 1;
            }
        }
    }
    builder.finish_node();
}

fn emit_wrapped_iterable(builder: &mut GreenNodeBuilder<'static>, iterable: &SyntaxNode, helper: &str, seek_name: &str) {
    build_node(builder, CallExpr, |b| {
        build_node(b, Identifier, |b| b.token(Id.into(), helper));
        b.token(ParenOpen.into(), "(");
        copy_verbatim(b, iterable);
        b.token(Comma.into(), ",");
        b.token(Whitespace.into(), " ");
        build_node(b, Identifier, |b| b.token(Id.into(), seek_name));
        b.token(ParenClose.into(), ")");
    });
}

/// `try`/`catch`/`finally`: if the guard is in the `catch` clause,
/// prepend a forced `throw` to the `try` block; otherwise the construct
/// already runs unconditionally once reached, so just recurse.
fn rebuild_try(
    node: &SyntaxNode,
    marker: &SyntaxNode,
    id: u32,
    names: &mut NameRegistry,
    frames: &mut ActiveFrameRegistry,
    builder: &mut GreenNodeBuilder<'static>,
) {
    let catch_clause = node.children().find(|c| c.kind() == CatchClause);
    let in_catch = catch_clause.as_ref().is_some_and(|c| contains(c, marker));

    let mut index = 0;
    builder.start_node(TryStmt.into());
    for child in node.children_with_tokens() {
        match child {
            NodeOrToken::Token(t) => builder.token(t.kind().into(), t.text()),
            NodeOrToken::Node(n) => {
                if index == 0 && in_catch {
                    emit_try_block_with_forced_throw(builder, &n, names, id);
                } else if contains(&n, marker) {
                    rebuild_path(&n, marker, id, names, frames, builder);
                } else {
                    copy_verbatim(builder, &n);
                }
                index += 1;
            }
        }
    }
    builder.finish_node();
}

fn emit_try_block_with_forced_throw(builder: &mut GreenNodeBuilder<'static>, block: &SyntaxNode, names: &mut NameRegistry, id: u32) {
    let seek_name = names.seek();
    build_node(builder, Block, |b| {
        b.token(BraceOpen.into(), "{");
        build_node(b, IfStmt, |b| {
            b.token(KwIf.into(), "if");
            b.token(Whitespace.into(), " ");
            b.token(ParenOpen.into(), "(");
            emit_seek_eq_id(b, &seek_name, id);
            b.token(ParenClose.into(), ")");
            b.token(Whitespace.into(), " ");
            build_node(b, Block, |b| {
                b.token(BraceOpen.into(), "{");
                build_node(b, ThrowStmt, |b| {
                    b.token(KwThrow.into(), "throw");
                    b.token(Whitespace.into(), " ");
                    build_node(b, NewExpr, |b| {
                        b.token(KwNew.into(), "new");
                        b.token(Whitespace.into(), " ");
                        build_node(b, Identifier, |b| b.token(Id.into(), "Error"));
                        b.token(ParenOpen.into(), "(");
                        build_node(b, StringLiteral, |b| b.token(StringLit.into(), "\"COMEHERE\""));
                        b.token(ParenClose.into(), ")");
                    });
                    b.token(Semicolon.into(), ";");
                });
                b.token(BraceClose.into(), "}");
            });
        });
        b.token(Newline.into(), "\n");
        for child in block.children_with_tokens() {
            match child {
                NodeOrToken::Node(n) => copy_verbatim(b, &n),
                NodeOrToken::Token(t) => {
                    if !matches!(t.kind(), BraceOpen | BraceClose) {
                        b.token(t.kind().into(), t.text());
                    }
                }
            }
        }
        b.token(BraceClose.into(), "}");
    });
}

/// Rewrites a `switch`'s discriminant to pick a sentinel token when
/// seeking this goal, and stacks a `case <token>:` label directly in
/// front of the case that holds the guard so it falls through into that
/// case's untouched body — the original cases are otherwise left alone.
fn rebuild_switch(
    node: &SyntaxNode,
    marker: &SyntaxNode,
    id: u32,
    names: &mut NameRegistry,
    frames: &mut ActiveFrameRegistry,
    builder: &mut GreenNodeBuilder<'static>,
) {
    let seek_name = names.seek();
    let token = names.fresh("comehereCase");

    let mut index = 0;
    builder.start_node(SwitchStmt.into());
    for child in node.children_with_tokens() {
        match child {
            NodeOrToken::Token(t) => builder.token(t.kind().into(), t.text()),
            NodeOrToken::Node(n) => {
                if index == 0 {
                    emit_switch_discriminant(builder, &n, &seek_name, id, &token);
                } else if n.kind() == SwitchCase && contains(&n, marker) {
                    emit_case_with_stacked_label(builder, &n, marker, id, names, frames, &token);
                } else {
                    copy_verbatim(builder, &n);
                }
                index += 1;
            }
        }
    }
    builder.finish_node();
}

fn emit_switch_discriminant(
    builder: &mut GreenNodeBuilder<'static>,
    original: &SyntaxNode,
    seek_name: &str,
    id: u32,
    token: &str,
) {
    build_node(builder, ParenExpr, |b| {
        b.token(ParenOpen.into(), "(");
        build_node(b, ConditionalExpr, |b| {
            emit_seek_eq_id(b, seek_name, id);
            b.token(Whitespace.into(), " ");
            b.token(Question.into(), "?");
            b.token(Whitespace.into(), " ");
            build_node(b, StringLiteral, |b| {
                b.token(StringLit.into(), &format!("\"{token}\""));
            });
            b.token(Whitespace.into(), " ");
            b.token(Colon.into(), ":");
            b.token(Whitespace.into(), " ");
            copy_verbatim(b, original);
        });
        b.token(ParenClose.into(), ")");
    });
}

/// A `SwitchCase` node holds `[case-value?, stmt*]`; this emits an extra
/// `case <token>:` clause with an empty body right before the original
/// one, then recurses the original case (value and body) unchanged so
/// the guard inside it still gets driven.
fn emit_case_with_stacked_label(
    builder: &mut GreenNodeBuilder<'static>,
    case: &SyntaxNode,
    marker: &SyntaxNode,
    id: u32,
    names: &mut NameRegistry,
    frames: &mut ActiveFrameRegistry,
    token: &str,
) {
    build_node(builder, SwitchCase, |b| {
        b.token(KwCase.into(), "case");
        b.token(Whitespace.into(), " ");
        build_node(b, StringLiteral, |b| {
            b.token(StringLit.into(), &format!("\"{token}\""));
        });
        b.token(Colon.into(), ":");
    });
    builder.token(Newline.into(), "\n");
    rebuild_path(case, marker, id, names, frames, builder);
}

/// Replaces `left || right`/`left && right` with a call to the
/// synthesized `or`/`and` helper (see [`crate::passes::preamble`]),
/// forcing evaluation of `right` (which holds the guard) when seeking
/// this goal.
fn rebuild_logical_force(
    node: &SyntaxNode,
    marker: &SyntaxNode,
    id: u32,
    names: &mut NameRegistry,
    frames: &mut ActiveFrameRegistry,
    builder: &mut GreenNodeBuilder<'static>,
) {
    let seek_name = names.seek();
    let is_and = node
        .children_with_tokens()
        .filter_map(|e| e.into_token())
        .any(|t| t.kind() == AmpAmp);
    let helper = if is_and { names.and_helper() } else { names.or_helper() };

    let (left, right) = crate::invariants::ensure_binary_operands(node);

    build_node(builder, CallExpr, |b| {
        build_node(b, Identifier, |b| b.token(Id.into(), &helper));
        b.token(ParenOpen.into(), "(");
        copy_verbatim(b, &left);
        b.token(Comma.into(), ",");
        b.token(Whitespace.into(), " ");
        build_node(b, ArrowFunction, |b| {
            build_node(b, Params, |b| {
                b.token(ParenOpen.into(), "(");
                b.token(ParenClose.into(), ")");
            });
            b.token(Whitespace.into(), " ");
            b.token(Arrow.into(), "=>");
            b.token(Whitespace.into(), " ");
            rebuild_path(&right, marker, id, names, frames, b);
        });
        b.token(Comma.into(), ",");
        b.token(Whitespace.into(), " ");
        emit_seek_eq_id(b, &seek_name, id);
        b.token(ParenClose.into(), ")");
    });
}

/// A function-shaped ancestor gets the active-frame prologue prepended to
/// its body (allocating a bit if it doesn't have one yet), then recursion
/// continues into the body towards the guard.
fn rebuild_function(
    node: &SyntaxNode,
    marker: &SyntaxNode,
    id: u32,
    names: &mut NameRegistry,
    frames: &mut ActiveFrameRegistry,
    builder: &mut GreenNodeBuilder<'static>,
) {
    let bit = FunctionLike::cast(node.clone())
        .as_ref()
        .and_then(function_identity)
        .map(|identity| frames.bit_for(identity_key(&identity)));

    let mask_name = bit.map(|_| names.active_mask());

    let mut seen_block = false;
    builder.start_node(node.kind().into());
    for child in node.children_with_tokens() {
        match child {
            NodeOrToken::Token(t) => builder.token(t.kind().into(), t.text()),
            NodeOrToken::Node(n) if n.kind() == Block && !seen_block => {
                seen_block = true;
                match (bit, &mask_name) {
                    (Some(bit), Some(mask_name)) => {
                        emit_block_with_prologue(builder, &n, marker, id, names, frames, bit, mask_name)
                    }
                    _ => rebuild_path(&n, marker, id, names, frames, builder),
                }
            }
            NodeOrToken::Node(n) => {
                if contains(&n, marker) {
                    rebuild_path(&n, marker, id, names, frames, builder);
                } else {
                    copy_verbatim(builder, &n);
                }
            }
        }
    }
    builder.finish_node();
}

#[allow(clippy::too_many_arguments)]
fn emit_block_with_prologue(
    builder: &mut GreenNodeBuilder<'static>,
    block: &SyntaxNode,
    marker: &SyntaxNode,
    id: u32,
    names: &mut NameRegistry,
    frames: &mut ActiveFrameRegistry,
    bit: u32,
    mask_name: &str,
) {
    let local = ActiveFrameRegistry::local_name(bit);
    build_node(builder, Block, |b| {
        b.token(BraceOpen.into(), "{");
        // const active_N = (mask >> bit) & 1;
        build_node(b, VarDecl, |b| {
            b.token(KwConst.into(), "const");
            b.token(Whitespace.into(), " ");
            build_node(b, VarDeclarator, |b| {
                build_node(b, Identifier, |b| b.token(Id.into(), &local));
                b.token(Whitespace.into(), " ");
                b.token(Eq.into(), "=");
                b.token(Whitespace.into(), " ");
                build_node(b, BinaryExpr, |b| {
                    build_node(b, ParenExpr, |b| {
                        b.token(ParenOpen.into(), "(");
                        build_node(b, BinaryExpr, |b| {
                            build_node(b, Identifier, |b| b.token(Id.into(), mask_name));
                            b.token(Whitespace.into(), " ");
                            b.token(Shr.into(), ">>");
                            b.token(Whitespace.into(), " ");
                            build_node(b, NumberLiteral, |b| b.token(Number.into(), &format!("{bit}n")));
                        });
                        b.token(ParenClose.into(), ")");
                    });
                    b.token(Whitespace.into(), " ");
                    b.token(Amp.into(), "&");
                    b.token(Whitespace.into(), " ");
                    build_node(b, NumberLiteral, |b| b.token(Number.into(), "1n"));
                });
            });
            b.token(Semicolon.into(), ";");
        });
        b.token(Newline.into(), "\n");
        // mask &= ~(1 << bit);
        build_node(b, ExprStmt, |b| {
            build_node(b, AssignExpr, |b| {
                build_node(b, Identifier, |b| b.token(Id.into(), mask_name));
                b.token(Whitespace.into(), " ");
                b.token(CompoundAssign.into(), "&=");
                b.token(Whitespace.into(), " ");
                build_node(b, UnaryExpr, |b| {
                    b.token(Tilde.into(), "~");
                    build_node(b, ParenExpr, |b| {
                        b.token(ParenOpen.into(), "(");
                        build_node(b, BinaryExpr, |b| {
                            build_node(b, NumberLiteral, |b| b.token(Number.into(), "1n"));
                            b.token(Whitespace.into(), " ");
                            b.token(Shl.into(), "<<");
                            b.token(Whitespace.into(), " ");
                            build_node(b, NumberLiteral, |b| b.token(Number.into(), &format!("{bit}n")));
                        });
                        b.token(ParenClose.into(), ")");
                    });
                });
            });
            b.token(Semicolon.into(), ";");
        });
        b.token(Newline.into(), "\n");
        for child in block.children_with_tokens() {
            match child {
                NodeOrToken::Node(n) => {
                    if contains(&n, marker) {
                        rebuild_path(&n, marker, id, names, frames, b);
                    } else {
                        copy_verbatim(b, &n);
                    }
                }
                NodeOrToken::Token(t) => {
                    if !matches!(t.kind(), BraceOpen | BraceClose) {
                        b.token(t.kind().into(), t.text());
                    }
                }
            }
        }
        b.token(BraceClose.into(), "}");
    });
}

/// What a synthesized call ultimately invokes, resolved independently of
/// how its guard/mask bookkeeping is emitted.
enum Invocation {
    /// A bare identifier call: a top-level function, or `Class.method(...)`
    /// for a static method.
    Call { callee: String },
    /// `receiver.method(...)`, where `receiver` is already a complete
    /// expression (an initializer's value, or a synthesized `new` call).
    MethodCall { receiver: String, method: String },
    /// `new Class(...)`, for a goal living directly in a constructor.
    Construct { class: String },
}

struct AppendedCall {
    /// Every goal id this call's guard must cover.
    ids: Vec<u32>,
    bit: u32,
    args: IndexMap<String, String>,
    invocation: Invocation,
    is_generator: bool,
}

/// Module-wide pass run once after all goals are driven: every function,
/// method, or constructor with an allocated active-frame bit gets a
/// guarded, self-restoring synthesized call at module end — `if (seek ==
/// id) { try { activeMask |= 1n << bit; <call>; } finally { seek = 0; } }`
/// — so a cold load (`seek == 0`) never runs one. Arguments are resolved
/// positionally from initializers, in parameter order. Whatever is left
/// unconsumed afterwards is reported.
fn synthesize_calls(
    root: &SyntaxNode,
    goals: &[GoalBlock],
    names: &mut NameRegistry,
    frames: &ActiveFrameRegistry,
    diagnostics: &mut Diagnostics,
) -> SyntaxNode {
    let mut to_append: Vec<AppendedCall> = Vec::new();

    for decl in root.descendants().filter_map(crate::ast::FunctionDecl::cast) {
        let func = FunctionLike::FunctionDecl(decl.clone());
        let Some(identity) = function_identity(&func) else {
            continue;
        };
        let Some(bit) = frames.peek_bit(identity_key(&identity)) else {
            continue;
        };
        if called_from_outside(root, decl.as_cst(), &identity) {
            continue;
        }
        let ids = goal_ids_for(goals, &identity);
        if ids.is_empty() {
            continue;
        }

        let args = resolve_args(&func, goals, &[vec![identity.as_str()], vec![]]);
        to_append.push(AppendedCall {
            ids,
            bit,
            args,
            invocation: Invocation::Call { callee: identity },
            is_generator: is_generator_decl(func.as_cst()),
        });
    }

    for class in root.descendants().filter_map(ClassDecl::cast) {
        let Some(class_name) = class.name().map(|t| t.text().to_string()) else {
            continue;
        };
        let constructor = class.methods().find(MethodDef::is_constructor);

        for method in class.methods() {
            let func = FunctionLike::MethodDef(method.clone());
            let Some(identity) = function_identity(&func) else {
                continue;
            };
            let Some(bit) = frames.peek_bit(identity_key(&identity)) else {
                continue;
            };
            let ids = goal_ids_for(goals, &identity);
            if ids.is_empty() {
                continue;
            }

            let method_name = method.name().map(|t| t.text().to_string()).unwrap_or_default();
            let prefixes = [vec![class_name.as_str(), method_name.as_str()], vec![method_name.as_str()], vec![]];
            let args = resolve_args(&func, goals, &prefixes);
            let is_generator = is_generator_decl(func.as_cst());

            let invocation = if method.is_constructor() {
                Invocation::Construct { class: class_name.clone() }
            } else if method.is_static() {
                Invocation::Call {
                    callee: format!("{class_name}.{method_name}"),
                }
            } else {
                let receiver = resolve_receiver(goals, &class_name, &method_name, constructor.as_ref());
                Invocation::MethodCall { receiver, method: method_name }
            };

            to_append.push(AppendedCall { ids, bit, args, invocation, is_generator });
        }
    }

    let result = if to_append.is_empty() {
        root.clone()
    } else {
        let mask_name = names.active_mask();
        let seek_name = names.seek();
        let mut builder = GreenNodeBuilder::new();
        builder.start_node(Module.into());
        for child in root.children_with_tokens() {
            match child {
                NodeOrToken::Node(n) => copy_verbatim(&mut builder, &n),
                NodeOrToken::Token(t) => builder.token(t.kind().into(), t.text()),
            }
        }
        for call in &to_append {
            splice_guarded_call(&mut builder, &seek_name, &mask_name, call);
        }
        builder.finish_node();
        SyntaxNode::new_root(builder.finish())
    };

    report_unconsumed_initializers(goals, diagnostics);
    result
}

/// True if some call elsewhere in the module already reaches `identity`
/// by name from outside `func_node`'s own subtree. A function's own
/// recursive self-calls don't count: nothing reaches them unless the
/// function is itself invoked from somewhere, which is exactly the
/// reachability question being asked.
fn called_from_outside(root: &SyntaxNode, func_node: &SyntaxNode, identity: &str) -> bool {
    root.descendants()
        .filter(|n| n.kind() == CallExpr)
        .filter(|call| !contains(func_node, call))
        .filter_map(|call| call.children().next())
        .any(|callee| callee.kind() == Identifier && callee.text() == identity)
}

/// Every goal id whose [`GoalBlock::enclosing_function`] names `identity`,
/// in ascending order — a function housing more than one goal gets a
/// single guard disjoined over all of their ids.
fn goal_ids_for(goals: &[GoalBlock], identity: &str) -> Vec<u32> {
    goals.iter().filter(|g| g.enclosing_function.as_deref() == Some(identity)).map(|g| g.id).collect()
}

/// Resolves a function's positional parameters against its goals'
/// initializers, trying each prefix in `prefixes` in order and consuming
/// the first initializer that matches `<prefix>.<param>` (or bare `param`
/// for an empty prefix). Unresolved parameters fall back to `undefined`.
/// The returned map preserves parameter order, matching the call's
/// eventual positional argument list.
fn resolve_args(func: &FunctionLike, goals: &[GoalBlock], prefixes: &[Vec<&str>]) -> IndexMap<String, String> {
    let mut out = IndexMap::new();
    let Some(params) = func.params() else {
        return out;
    };
    for param in params.params() {
        let param_name = param.name().map(|t| t.text().to_string()).unwrap_or_default();
        let expr = resolve_path(goals, prefixes, &param_name).unwrap_or_else(|| "undefined".to_string());
        out.insert(param_name, expr);
    }
    out
}

/// Tries `<prefix>.<leaf>` for each prefix in order, returning and
/// consuming the first matching, not-yet-consumed initializer.
fn resolve_path(goals: &[GoalBlock], prefixes: &[Vec<&str>], leaf: &str) -> Option<String> {
    for prefix in prefixes {
        let mut path: Vec<&str> = prefix.clone();
        path.push(leaf);
        let found = goals
            .iter()
            .flat_map(|g| &g.initializers)
            .find(|init| !init.is_consumed() && init.matches(&path));
        if let Some(init) = found {
            init.mark_consumed();
            return Some(init.expr_text.clone());
        }
    }
    None
}

/// Resolves the receiver for a non-static, non-constructor method call:
/// an explicit `<class>.this` / `<method>.this` / bare `this` initializer
/// if one was given, otherwise a `new Class(...)` built from the
/// constructor's own parameters resolved under `<class>.this.<p>` then
/// `this.<p>` (no bare fallback — an unqualified `p` belongs to whichever
/// function/method it's actually inside).
fn resolve_receiver(goals: &[GoalBlock], class_name: &str, method_name: &str, constructor: Option<&MethodDef>) -> String {
    let this_prefixes = [vec![class_name, "this"], vec![method_name, "this"], vec!["this"]];
    if let Some(path) = this_prefixes
        .iter()
        .find_map(|prefix| {
            goals
                .iter()
                .flat_map(|g| &g.initializers)
                .find(|init| !init.is_consumed() && init.matches(prefix))
        })
    {
        path.mark_consumed();
        return path.expr_text.clone();
    }

    let ctor_params: Vec<String> = constructor
        .and_then(|c| FunctionLike::MethodDef(c.clone()).params())
        .map(|params| params.params().map(|p| p.name().map(|t| t.text().to_string()).unwrap_or_default()).collect())
        .unwrap_or_default();

    let ctor_prefixes = [vec![class_name, "this"], vec!["this"]];
    let args: Vec<String> = ctor_params
        .iter()
        .map(|p| resolve_path(goals, &ctor_prefixes, p).unwrap_or_else(|| "undefined".to_string()))
        .collect();
    format!("new {class_name}({})", args.join(", "))
}

fn report_unconsumed_initializers(goals: &[GoalBlock], diagnostics: &mut Diagnostics) {
    for goal in goals {
        for init in &goal.initializers {
            if !init.is_consumed() {
                diagnostics
                    .warning(
                        format!(
                            "unconsumed COMEHERE initializer `{}` (value `{}`): no matching parameter found on the ancestor chain",
                            init.dotted(),
                            init.expr_text
                        ),
                        goal.span,
                    )
                    .emit();
            }
        }
    }
}

/// `*` is consumed as a bare token directly under `FunctionDecl`/
/// `FunctionExpr`/`MethodDef`, ahead of the binding name and params, so a
/// direct (non-descending) token scan finds it without risk of matching
/// a `*` inside a nested expression.
fn is_generator_decl(decl: &SyntaxNode) -> bool {
    decl.children_with_tokens().filter_map(|e| e.into_token()).any(|t| t.kind() == Star)
}

fn invocation_text(invocation: &Invocation, args: &str, is_generator: bool) -> String {
    let call = match invocation {
        Invocation::Call { callee } => format!("{callee}({args})"),
        Invocation::MethodCall { receiver, method } => format!("{receiver}.{method}({args})"),
        Invocation::Construct { class } => format!("new {class}({args})"),
    };
    if is_generator { format!("{call}.next()") } else { call }
}

/// Builds the guarded call as source text and parses it with the crate's
/// own parser (the same "parse a snippet, then splice" technique the
/// preamble uses), then splices the single resulting statement in as a
/// module-level child. Hand-building `try`/`finally`/`new`/member-call
/// shapes token-by-token would just re-implement the grammar; text keeps
/// this in one place.
fn splice_guarded_call(builder: &mut GreenNodeBuilder<'static>, seek_name: &str, mask_name: &str, call: &AppendedCall) {
    let guard = call.ids.iter().map(|id| format!("{seek_name} == {id}")).collect::<Vec<_>>().join(" || ");
    // Resolved values go straight in positionally, in parameter order (the
    // `IndexMap` keeps that order from `resolve_args`); each later
    // initializer's source text may itself refer back to an earlier
    // parameter's name, which still resolves correctly since they're
    // spliced in the same left-to-right order the parameter list had.
    let args = call.args.values().cloned().collect::<Vec<_>>().join(", ");
    let invocation = invocation_text(&call.invocation, &args, call.is_generator);

    let src = format!(
        "if ({guard}) {{\ntry {{\n{mask_name} = {mask_name} | (1n << {}n);\n{invocation};\n}} finally {{\n{seek_name} = 0;\n}}\n}}\n",
        call.bit
    );

    let parsed = parse(&src).expect("synthesized call must parse").root;
    let stmt = parsed.children().next().expect("synthesized call produces one statement");
    copy_verbatim(builder, &stmt);
    builder.token(Newline.into(), "\n");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::parse;
    use crate::passes::extractor::extract;
    use comehere_core::{Diagnostics, NamePool};

    fn drive_source(source: &str) -> String {
        drive_source_with_diagnostics(source).0
    }

    fn drive_source_with_diagnostics(source: &str) -> (String, Diagnostics) {
        let root = parse(source).unwrap().root;
        let mut names = NameRegistry::new(NamePool::new());
        let mut frames = ActiveFrameRegistry::new();
        let mut diagnostics = Diagnostics::new();
        let extracted = extract(&root, &mut names, &mut frames, &mut diagnostics);
        let driven = drive(&extracted.root, &extracted.goals, &mut names, &mut frames, &mut diagnostics);
        (driven.text().to_string(), diagnostics)
    }

    #[test]
    fn forces_the_branch_containing_the_goal() {
        let text = drive_source(
            "if (ready) {\nCOMEHERE: with (_) {\nlog(1);\n}\n} else {\nlog(2);\n}\n",
        );
        assert!(text.contains("ready || seek"));
    }

    #[test]
    fn wraps_for_of_iterable() {
        let text = drive_source("for (const x of items) {\nCOMEHERE: with (_) {\nlog(x);\n}\n}\n");
        assert!(text.contains("maybeNotEmptyIterator(items, seek)"));
    }

    #[test]
    fn forces_throw_when_goal_is_in_catch() {
        let text = drive_source(
            "try {\nrisky();\n} catch (e) {\nCOMEHERE: with (_) {\nlog(e);\n}\n}\n",
        );
        assert!(text.contains("throw new Error"));
    }

    #[test]
    fn stacks_a_case_label_ahead_of_the_goal_case() {
        let text = drive_source(
            "switch (which) {\ncase 1:\nlog(1);\nbreak;\ncase 2:\nCOMEHERE: with (_) {\nlog(2);\n}\nbreak;\n}\n",
        );
        assert!(text.contains("seek == 1 ?"));
        assert!(text.contains("case \"comehereCase"));
        assert!(text.contains("case 2:"));
    }

    #[test]
    fn suffixes_generator_calls_with_next() {
        let text = drive_source(
            "function* f() {\nCOMEHERE: with (_) {\nlog(1);\n}\n}\n",
        );
        assert!(text.contains("f().next();"));
    }

    #[test]
    fn synthesized_call_is_guarded_and_self_restoring() {
        let text = drive_source(
            "function f(n) {\nif (n <= 1) return 1;\nf(n - 2);\nf(n - 1);\nCOMEHERE: with (n = 10) {\nlog(n);\n}\n}\n",
        );
        assert!(text.contains("if (seek == 1)"));
        assert!(text.contains("try {"));
        assert!(text.contains("f(10)"));
        assert!(text.contains("} finally {"));
        assert!(text.contains("seek = 0;"));
        assert!(text.contains("activeMask = activeMask | (1n << 0n);"));
    }

    #[test]
    fn synthesized_call_uses_bigint_active_mask() {
        let text = drive_source("function f() {\nCOMEHERE: with (_) {\nlog(1);\n}\n}\n");
        assert!(text.contains("1n << 0n"));
        assert!(!text.contains("1 << 0"));
    }

    #[test]
    fn constructor_goal_synthesizes_new_expression() {
        let text = drive_source(
            "class C {\nconstructor(x) {\nCOMEHERE: with (C.constructor.x = 5) {\nlog(x);\n}\n}\n}\n",
        );
        assert!(text.contains("new C(5)"));
    }

    #[test]
    fn static_method_goal_calls_through_class_name() {
        let text = drive_source(
            "class C {\nstatic m() {\nCOMEHERE: with (_) {\nlog(1);\n}\n}\n}\n",
        );
        assert!(text.contains("C.m()"));
    }

    #[test]
    fn instance_method_goal_constructs_receiver_from_own_class_this() {
        // Mirrors the boundary scenario: `C.this.x = 1, C.this.y = 2` feed
        // the constructor, and the method's own `n = 3` feeds `method`.
        let text = drive_source(
            "class C {\nconstructor(x, y) {\n}\nmethod(n) {\nCOMEHERE: with (C.this.x = 1, C.this.y = 2, n = 3) {\nlog(n);\n}\n}\n}\n",
        );
        assert!(text.contains("new C(1, 2).method(3)"));
    }

    #[test]
    fn bare_initializer_resolves_as_last_resort_argument() {
        let text = drive_source("function f(n) {\nCOMEHERE: with (n = 3) {\nlog(n);\n}\n}\n");
        assert!(text.contains("f(3)"));
    }

    #[test]
    fn unconsumed_initializer_is_reported_after_driving() {
        let (_, diagnostics) =
            drive_source_with_diagnostics("function f() {\nCOMEHERE: with (unused.path = 7) {\nlog(1);\n}\n}\n");
        assert!(diagnostics.has_warnings());
    }

    #[test]
    fn consumed_initializer_is_not_reported() {
        let (_, diagnostics) = drive_source_with_diagnostics("function f(n) {\nCOMEHERE: with (n = 3) {\nlog(n);\n}\n}\n");
        assert!(!diagnostics.has_warnings());
    }
}
