//! Recursive-descent grammar for the host language superset.
//!
//! Statement/expression shapes follow a mainstream C-family scripting
//! language; the two superset additions (`COMEHERE` labelled-`with` blocks
//! and `$$`-prefixed capture identifiers) are woven into the ordinary
//! labelled-statement and primary-expression productions rather than
//! bolted on as a separate pre-pass, since both are lexically ordinary
//! tokens once the lexer has classified them.

use super::core::Parser;
use super::cst::SyntaxKind::{self, *};
use super::cst::token_sets::{ASSIGN_OPS, STMT_RECOVERY};

pub fn parse_module(p: &mut Parser) {
    p.start_node(Module);
    while !p.should_stop() {
        parse_stmt(p);
    }
    p.finish_node();
}

// ---------------------------------------------------------------------
// Statements
// ---------------------------------------------------------------------

fn parse_stmt(p: &mut Parser) {
    if !p.enter_recursion() {
        return;
    }
    match p.peek() {
        BraceOpen => parse_block(p),
        KwVar | KwLet | KwConst => parse_var_decl_stmt(p),
        KwIf => parse_if_stmt(p),
        KwFor => parse_for_stmt(p),
        KwWhile => parse_while_stmt(p),
        KwDo => parse_do_while_stmt(p),
        KwSwitch => parse_switch_stmt(p),
        KwTry => parse_try_stmt(p),
        KwThrow => parse_throw_stmt(p),
        KwReturn => parse_return_stmt(p),
        KwBreak => parse_break_stmt(p),
        KwContinue => parse_continue_stmt(p),
        KwFunction => parse_function_decl(p, false),
        KwAsync if p.peek_nth(1) == KwFunction => parse_function_decl(p, true),
        KwClass => parse_class_decl(p),
        Semicolon => {
            p.start_node(EmptyStmt);
            p.bump();
            p.finish_node();
        }
        Id if p.peek_nth(1) == Colon => parse_labelled_stmt(p),
        _ => parse_expr_stmt(p),
    }
    p.exit_recursion();
}

fn parse_block(p: &mut Parser) {
    p.start_node(Block);
    p.expect(BraceOpen, "'{'");
    while !p.at(BraceClose) && !p.should_stop() {
        parse_stmt(p);
    }
    p.expect(BraceClose, "'}'");
    p.finish_node();
}

fn parse_var_decl_stmt(p: &mut Parser) {
    p.start_node(VarDecl);
    p.bump(); // var/let/const
    loop {
        parse_var_declarator(p);
        if !p.eat(Comma) {
            break;
        }
    }
    p.eat(Semicolon);
    p.finish_node();
}

fn parse_var_declarator(p: &mut Parser) {
    p.start_node(VarDeclarator);
    parse_binding_identifier(p);
    if p.eat(Eq) {
        parse_assign_expr(p);
    }
    p.finish_node();
}

fn parse_binding_identifier(p: &mut Parser) {
    if p.eat(DotDotDot) {
        // rest binding, e.g. in a parameter list
    }
    if p.at(Id) {
        p.start_node(Identifier);
        p.bump();
        p.finish_node();
    } else {
        p.error_and_bump("expected a binding name");
    }
}

fn parse_if_stmt(p: &mut Parser) {
    p.start_node(IfStmt);
    p.bump(); // if
    p.expect(ParenOpen, "'('");
    parse_expr(p);
    p.expect(ParenClose, "')'");
    parse_stmt(p);
    if p.at(KwElse) {
        p.bump();
        parse_stmt(p);
    }
    p.finish_node();
}

fn parse_for_stmt(p: &mut Parser) {
    let checkpoint = p.checkpoint();
    p.bump(); // for
    p.expect(ParenOpen, "'('");

    // Speculative classification: scan forward for `in`/`of` before the
    // matching close-paren to tell a counted loop from for-in/for-of.
    let kind = classify_for_head(p);

    match p.peek() {
        KwVar | KwLet | KwConst => {
            p.start_node(VarDecl);
            p.bump();
            parse_binding_identifier(p);
            match kind {
                ForHead::In | ForHead::Of => {}
                ForHead::Counted => {
                    if p.eat(Eq) {
                        parse_assign_expr(p);
                    }
                }
            }
            p.finish_node();
        }
        Semicolon if matches!(kind, ForHead::Counted) => {}
        _ if !matches!(kind, ForHead::Counted) => {
            parse_assign_expr(p);
        }
        _ => parse_expr(p),
    }

    match kind {
        ForHead::In => {
            p.expect(KwIn, "'in'");
            parse_expr(p);
            p.expect(ParenClose, "')'");
            parse_stmt(p);
            p.start_node_at(checkpoint, ForInStmt);
        }
        ForHead::Of => {
            p.expect(KwOf, "'of'");
            parse_assign_expr(p);
            p.expect(ParenClose, "')'");
            parse_stmt(p);
            p.start_node_at(checkpoint, ForOfStmt);
        }
        ForHead::Counted => {
            p.expect(Semicolon, "';'");
            if !p.at(Semicolon) {
                parse_expr(p);
            }
            p.expect(Semicolon, "';'");
            if !p.at(ParenClose) {
                parse_expr(p);
            }
            p.expect(ParenClose, "')'");
            parse_stmt(p);
            p.start_node_at(checkpoint, ForStmt);
        }
    }
    p.finish_node();
}

enum ForHead {
    Counted,
    In,
    Of,
}

/// Looks ahead past the loop head (balancing parens) for a top-level `in`
/// or `of` keyword, without consuming anything.
fn classify_for_head(p: &Parser) -> ForHead {
    let mut depth = 0i32;
    let mut n = 0usize;
    loop {
        let kind = p.nth(n);
        match kind {
            ParenOpen => depth += 1,
            ParenClose => {
                if depth == 0 {
                    return ForHead::Counted;
                }
                depth -= 1;
            }
            Semicolon if depth == 0 => return ForHead::Counted,
            KwIn if depth == 0 => return ForHead::In,
            KwOf if depth == 0 => return ForHead::Of,
            Error => return ForHead::Counted,
            _ => {}
        }
        n += 1;
        if n > 4096 {
            return ForHead::Counted;
        }
    }
}

fn parse_while_stmt(p: &mut Parser) {
    p.start_node(WhileStmt);
    p.bump();
    p.expect(ParenOpen, "'('");
    parse_expr(p);
    p.expect(ParenClose, "')'");
    parse_stmt(p);
    p.finish_node();
}

fn parse_do_while_stmt(p: &mut Parser) {
    p.start_node(DoWhileStmt);
    p.bump();
    parse_stmt(p);
    p.expect(KwWhile, "'while'");
    p.expect(ParenOpen, "'('");
    parse_expr(p);
    p.expect(ParenClose, "')'");
    p.eat(Semicolon);
    p.finish_node();
}

fn parse_switch_stmt(p: &mut Parser) {
    p.start_node(SwitchStmt);
    p.bump();
    p.expect(ParenOpen, "'('");
    parse_expr(p);
    p.expect(ParenClose, "')'");
    p.expect(BraceOpen, "'{'");
    while p.at(KwCase) || p.at(KwDefault) {
        parse_switch_case(p);
    }
    p.expect(BraceClose, "'}'");
    p.finish_node();
}

fn parse_switch_case(p: &mut Parser) {
    p.start_node(SwitchCase);
    if p.eat(KwCase) {
        parse_expr(p);
    } else {
        p.expect(KwDefault, "'default'");
    }
    p.expect(Colon, "':'");
    while !p.at(KwCase) && !p.at(KwDefault) && !p.at(BraceClose) && !p.should_stop() {
        parse_stmt(p);
    }
    p.finish_node();
}

fn parse_try_stmt(p: &mut Parser) {
    p.start_node(TryStmt);
    p.bump();
    parse_block(p);
    if p.at(KwCatch) {
        p.start_node(CatchClause);
        p.bump();
        if p.eat(ParenOpen) {
            parse_binding_identifier(p);
            p.expect(ParenClose, "')'");
        }
        parse_block(p);
        p.finish_node();
    }
    if p.eat(KwFinally) {
        parse_block(p);
    }
    p.finish_node();
}

fn parse_throw_stmt(p: &mut Parser) {
    p.start_node(ThrowStmt);
    p.bump();
    parse_expr(p);
    p.eat(Semicolon);
    p.finish_node();
}

fn parse_return_stmt(p: &mut Parser) {
    p.start_node(ReturnStmt);
    p.bump();
    if !p.at(Semicolon) && !p.at(BraceClose) && !p.should_stop() {
        parse_expr(p);
    }
    p.eat(Semicolon);
    p.finish_node();
}

fn parse_break_stmt(p: &mut Parser) {
    p.start_node(BreakStmt);
    p.bump();
    if p.at(Id) {
        parse_binding_identifier(p);
    }
    p.eat(Semicolon);
    p.finish_node();
}

fn parse_continue_stmt(p: &mut Parser) {
    p.start_node(ContinueStmt);
    p.bump();
    if p.at(Id) {
        parse_binding_identifier(p);
    }
    p.eat(Semicolon);
    p.finish_node();
}

/// A label followed directly by `with` and text `COMEHERE` is the
/// superset's goal-block syntax; every other label wraps an ordinary
/// statement.
fn parse_labelled_stmt(p: &mut Parser) {
    p.start_node(LabelledStmt);
    let is_comehere = p.current_text() == "COMEHERE";
    p.start_node(Identifier);
    p.bump(); // label name
    p.finish_node();
    p.expect(Colon, "':'");
    if is_comehere && p.at(KwWith) {
        parse_comehere_with(p);
    } else {
        parse_stmt(p);
    }
    p.finish_node();
}

fn parse_comehere_with(p: &mut Parser) {
    p.start_node(ComeHereWith);
    p.bump(); // with
    p.expect(ParenOpen, "'('");
    if !p.at(ParenClose) {
        // Each argument is either a description string, a bare `_`
        // placeholder, or a `dotted.path = expression` initializer; all
        // three parse as an ordinary assignment-level expression and are
        // classified later by the extractor.
        parse_assign_expr(p);
        while p.eat(Comma) {
            if p.at(ParenClose) {
                break;
            }
            parse_assign_expr(p);
        }
    }
    p.expect(ParenClose, "')'");
    parse_block(p);
    p.finish_node();
}

fn parse_expr_stmt(p: &mut Parser) {
    p.start_node(ExprStmt);
    if p.at_set(super::cst::token_sets::EXPR_FIRST) {
        parse_expr(p);
    } else {
        p.error_msg("expected a statement");
        p.recover_to(STMT_RECOVERY);
    }
    p.eat(Semicolon);
    p.finish_node();
}

// ---------------------------------------------------------------------
// Functions and classes
// ---------------------------------------------------------------------

fn parse_function_decl(p: &mut Parser, is_async: bool) {
    p.start_node(FunctionDecl);
    if is_async {
        p.bump();
    }
    p.bump(); // function
    p.eat(Star); // generator
    parse_binding_identifier(p);
    parse_params(p);
    parse_block(p);
    p.finish_node();
}

fn parse_function_expr(p: &mut Parser) {
    p.start_node(FunctionExpr);
    if p.at(KwAsync) {
        p.bump();
    }
    p.bump(); // function
    p.eat(Star);
    if p.at(Id) {
        parse_binding_identifier(p);
    }
    parse_params(p);
    parse_block(p);
    p.finish_node();
}

fn parse_params(p: &mut Parser) {
    p.start_node(Params);
    p.expect(ParenOpen, "'('");
    while !p.at(ParenClose) && !p.should_stop() {
        parse_param(p);
        if !p.eat(Comma) {
            break;
        }
    }
    p.expect(ParenClose, "')'");
    p.finish_node();
}

fn parse_param(p: &mut Parser) {
    p.start_node(Param);
    parse_binding_identifier(p);
    if p.eat(Eq) {
        parse_assign_expr(p);
    }
    p.finish_node();
}

fn parse_class_decl(p: &mut Parser) {
    p.start_node(ClassDecl);
    p.bump();
    if p.at(Id) {
        parse_binding_identifier(p);
    }
    if p.eat(KwExtends) {
        parse_unary_expr(p);
    }
    parse_class_body(p);
    p.finish_node();
}

fn parse_class_expr(p: &mut Parser) {
    p.start_node(ClassExpr);
    p.bump();
    if p.at(Id) {
        parse_binding_identifier(p);
    }
    if p.eat(KwExtends) {
        parse_unary_expr(p);
    }
    parse_class_body(p);
    p.finish_node();
}

fn parse_class_body(p: &mut Parser) {
    p.start_node(ClassBody);
    p.expect(BraceOpen, "'{'");
    while !p.at(BraceClose) && !p.should_stop() {
        if p.eat(Semicolon) {
            continue;
        }
        parse_class_member(p);
    }
    p.expect(BraceClose, "'}'");
    p.finish_node();
}

fn parse_class_member(p: &mut Parser) {
    let checkpoint = p.checkpoint();
    let is_static = p.at(KwStatic) && p.peek_nth(1) != ParenOpen && p.peek_nth(1) != Eq;
    if is_static {
        p.bump();
    }

    let is_accessor =
        (p.at(KwGet) || p.at(KwSet)) && p.peek_nth(1) != ParenOpen && p.peek_nth(1) != Eq;
    if is_accessor {
        p.bump();
    }

    let is_async = p.at(KwAsync) && p.peek_nth(1) != ParenOpen && p.peek_nth(1) != Eq;
    if is_async {
        p.bump();
    }

    let is_generator = p.eat(Star);

    parse_property_key(p);

    if p.at(ParenOpen) {
        parse_params(p);
        parse_block(p);
        p.start_node_at(checkpoint, MethodDef);
        let _ = (is_static, is_accessor, is_async, is_generator);
    } else {
        if p.eat(Eq) {
            parse_assign_expr(p);
        }
        p.eat(Semicolon);
        p.start_node_at(checkpoint, FieldDef);
    }
    p.finish_node();
}

fn parse_property_key(p: &mut Parser) {
    match p.peek() {
        BracketOpen => {
            p.bump();
            parse_assign_expr(p);
            p.expect(BracketClose, "']'");
        }
        StringLit | Number => {
            p.bump();
        }
        _ => {
            if p.at(Id) {
                p.bump();
            } else {
                p.error_and_bump("expected a property name");
            }
        }
    }
}

// ---------------------------------------------------------------------
// Expressions
// ---------------------------------------------------------------------

pub(super) fn parse_expr(p: &mut Parser) {
    let checkpoint = p.checkpoint();
    parse_assign_expr(p);
    if p.at(Comma) {
        while p.eat(Comma) {
            parse_assign_expr(p);
        }
        p.start_node_at(checkpoint, SequenceExpr);
        p.finish_node();
    }
}

fn parse_assign_expr(p: &mut Parser) {
    if is_arrow_function_ahead(p) {
        parse_arrow_function(p);
        return;
    }

    let checkpoint = p.checkpoint();
    parse_conditional_expr(p);
    if p.at_set(ASSIGN_OPS) {
        p.bump();
        parse_assign_expr(p);
        p.start_node_at(checkpoint, AssignExpr);
        p.finish_node();
    }
}

fn parse_conditional_expr(p: &mut Parser) {
    let checkpoint = p.checkpoint();
    parse_binary_expr(p, 0);
    if p.eat(Question) {
        parse_assign_expr(p);
        p.expect(Colon, "':'");
        parse_assign_expr(p);
        p.start_node_at(checkpoint, ConditionalExpr);
        p.finish_node();
    }
}

fn binop_info(kind: SyntaxKind) -> Option<(u8, SyntaxKind)> {
    Some(match kind {
        PipePipe | QuestionQuestion => (1, LogicalExpr),
        AmpAmp => (2, LogicalExpr),
        PipeTok => (3, BinaryExpr),
        Caret => (4, BinaryExpr),
        Amp => (5, BinaryExpr),
        EqEq | NotEq | EqEqEq | NotEqEq => (6, BinaryExpr),
        Lt | Gt | Le | Ge | KwInstanceof | KwIn => (7, BinaryExpr),
        Shl | Shr | UShr => (8, BinaryExpr),
        Plus | Minus => (9, BinaryExpr),
        Star | Slash | Percent => (10, BinaryExpr),
        StarStar => (11, BinaryExpr),
        _ => return None,
    })
}

fn parse_binary_expr(p: &mut Parser, min_prec: u8) {
    let checkpoint = p.checkpoint();
    parse_unary_expr(p);

    loop {
        let Some((prec, wrap_kind)) = binop_info(p.peek()) else {
            break;
        };
        if prec < min_prec {
            break;
        }
        p.bump(); // operator
        let next_min = if wrap_kind == BinaryExpr && prec == 11 {
            prec // ** is right-associative
        } else {
            prec + 1
        };
        parse_binary_expr(p, next_min);
        p.start_node_at(checkpoint, wrap_kind);
        p.finish_node();
    }
}

fn parse_unary_expr(p: &mut Parser) {
    match p.peek() {
        Bang | Tilde | Plus | Minus | KwTypeof | KwVoid | KwDelete | KwAwait => {
            p.start_node(UnaryExpr);
            p.bump();
            parse_unary_expr(p);
            p.finish_node();
        }
        PlusPlus | MinusMinus => {
            p.start_node(UpdateExpr);
            p.bump();
            parse_unary_expr(p);
            p.finish_node();
        }
        KwYield => {
            p.start_node(UnaryExpr);
            p.bump();
            p.eat(Star);
            if p.at_set(super::cst::token_sets::EXPR_FIRST) {
                parse_assign_expr(p);
            }
            p.finish_node();
        }
        _ => parse_postfix_expr(p),
    }
}

fn parse_postfix_expr(p: &mut Parser) {
    let checkpoint = p.checkpoint();
    parse_call_member_expr(p);
    if p.at(PlusPlus) || p.at(MinusMinus) {
        p.bump();
        p.start_node_at(checkpoint, UpdateExpr);
        p.finish_node();
    }
}

fn parse_call_member_expr(p: &mut Parser) {
    let checkpoint = p.checkpoint();
    parse_primary_expr(p);
    loop {
        match p.peek() {
            Dot | QuestionDot => {
                p.bump();
                if p.at(Id) {
                    p.bump();
                } else {
                    p.error_and_bump("expected a member name");
                }
                p.start_node_at(checkpoint, MemberExpr);
                p.finish_node();
            }
            BracketOpen => {
                p.bump();
                parse_expr(p);
                p.expect(BracketClose, "']'");
                p.start_node_at(checkpoint, ComputedMemberExpr);
                p.finish_node();
            }
            ParenOpen => {
                parse_arguments(p);
                p.start_node_at(checkpoint, CallExpr);
                p.finish_node();
            }
            _ => break,
        }
    }
}

fn parse_arguments(p: &mut Parser) {
    p.start_node(Arguments);
    p.expect(ParenOpen, "'('");
    while !p.at(ParenClose) && !p.should_stop() {
        if p.at(DotDotDot) {
            p.start_node(SpreadElement);
            p.bump();
            parse_assign_expr(p);
            p.finish_node();
        } else {
            parse_assign_expr(p);
        }
        if !p.eat(Comma) {
            break;
        }
    }
    p.expect(ParenClose, "')'");
    p.finish_node();
}

fn parse_new_expr(p: &mut Parser) {
    p.start_node(NewExpr);
    p.bump(); // new
    parse_member_expr_no_call(p);
    if p.at(ParenOpen) {
        parse_arguments(p);
    }
    p.finish_node();
}

/// Like `parse_call_member_expr` but stops before a call's `(...)`, so a
/// `new` expression's callee doesn't swallow its own argument list.
fn parse_member_expr_no_call(p: &mut Parser) {
    let checkpoint = p.checkpoint();
    if p.at(KwNew) {
        parse_new_expr(p);
    } else {
        parse_primary_expr(p);
    }
    loop {
        match p.peek() {
            Dot | QuestionDot => {
                p.bump();
                if p.at(Id) {
                    p.bump();
                } else {
                    p.error_and_bump("expected a member name");
                }
                p.start_node_at(checkpoint, MemberExpr);
                p.finish_node();
            }
            BracketOpen => {
                p.bump();
                parse_expr(p);
                p.expect(BracketClose, "']'");
                p.start_node_at(checkpoint, ComputedMemberExpr);
                p.finish_node();
            }
            _ => break,
        }
    }
}

fn parse_primary_expr(p: &mut Parser) {
    match p.peek() {
        Number => wrap_token(p, NumberLiteral),
        StringLit => wrap_token(p, StringLiteral),
        TemplateLit => wrap_token(p, TemplateLiteral),
        KwTrue | KwFalse => wrap_token(p, BooleanLiteral),
        KwNull => wrap_token(p, NullLiteral),
        KwUndefined => wrap_token(p, UndefinedLiteral),
        KwThis => wrap_token(p, ThisExpr),
        KwSuper => wrap_token(p, SuperExpr),
        CaptureIdent => wrap_token(p, CaptureIdentifier),
        Id => wrap_token(p, Identifier),
        KwNew => parse_new_expr(p),
        KwFunction => parse_function_expr(p),
        KwAsync if p.peek_nth(1) == KwFunction => parse_function_expr(p),
        KwClass => parse_class_expr(p),
        BraceOpen => parse_object_expr(p),
        BracketOpen => parse_array_expr(p),
        ParenOpen => parse_paren_expr(p),
        DotDotDot => {
            p.start_node(SpreadElement);
            p.bump();
            parse_assign_expr(p);
            p.finish_node();
        }
        _ => p.error_and_bump("expected an expression"),
    }
}

fn wrap_token(p: &mut Parser, kind: SyntaxKind) {
    p.start_node(kind);
    p.bump();
    p.finish_node();
}

fn parse_paren_expr(p: &mut Parser) {
    p.start_node(ParenExpr);
    p.bump(); // (
    parse_expr(p);
    p.expect(ParenClose, "')'");
    p.finish_node();
}

fn parse_object_expr(p: &mut Parser) {
    p.start_node(ObjectExpr);
    p.bump(); // {
    while !p.at(BraceClose) && !p.should_stop() {
        parse_object_member(p);
        if !p.eat(Comma) {
            break;
        }
    }
    p.expect(BraceClose, "'}'");
    p.finish_node();
}

fn parse_object_member(p: &mut Parser) {
    if p.at(DotDotDot) {
        p.start_node(SpreadElement);
        p.bump();
        parse_assign_expr(p);
        p.finish_node();
        return;
    }

    let checkpoint = p.checkpoint();
    let is_accessor =
        (p.at(KwGet) || p.at(KwSet)) && p.peek_nth(1) != Colon && p.peek_nth(1) != ParenOpen;
    if is_accessor {
        p.bump();
    }
    let is_async = p.at(KwAsync) && p.peek_nth(1) != Colon && p.peek_nth(1) != ParenOpen;
    if is_async {
        p.bump();
    }
    p.eat(Star);
    parse_property_key(p);

    if p.at(ParenOpen) {
        parse_params(p);
        parse_block(p);
        p.start_node_at(checkpoint, ObjectMethod);
    } else if p.eat(Colon) {
        parse_assign_expr(p);
        p.start_node_at(checkpoint, ObjectProperty);
    } else {
        // shorthand { name }
        p.start_node_at(checkpoint, ObjectProperty);
    }
    p.finish_node();
}

fn parse_array_expr(p: &mut Parser) {
    p.start_node(ArrayExpr);
    p.bump(); // [
    while !p.at(BracketClose) && !p.should_stop() {
        if p.at(Comma) {
            // elision
        } else if p.at(DotDotDot) {
            p.start_node(SpreadElement);
            p.bump();
            parse_assign_expr(p);
            p.finish_node();
        } else {
            parse_assign_expr(p);
        }
        if !p.eat(Comma) {
            break;
        }
    }
    p.expect(BracketClose, "']'");
    p.finish_node();
}

fn parse_arrow_function(p: &mut Parser) {
    p.start_node(ArrowFunction);
    if p.at(KwAsync) {
        p.bump();
    }
    if p.at(ParenOpen) {
        parse_params(p);
    } else {
        p.start_node(Params);
        p.start_node(Param);
        parse_binding_identifier(p);
        p.finish_node();
        p.finish_node();
    }
    p.expect(Arrow, "'=>'");
    if p.at(BraceOpen) {
        parse_block(p);
    } else {
        parse_assign_expr(p);
    }
    p.finish_node();
}

/// Distinguishes `(params) => ...` / `id => ...` from an ordinary
/// parenthesized or identifier expression, by scanning ahead without
/// consuming input.
fn is_arrow_function_ahead(p: &Parser) -> bool {
    if p.current() == Id && p.nth(1) == Arrow {
        return true;
    }
    if p.current() == KwAsync && p.nth(1) == Id && p.nth(2) == Arrow {
        return true;
    }
    let start = if p.current() == KwAsync { 1 } else { 0 };
    if p.nth(start) != ParenOpen {
        return false;
    }
    let mut depth = 0i32;
    let mut n = start;
    loop {
        match p.nth(n) {
            ParenOpen => depth += 1,
            ParenClose => {
                depth -= 1;
                if depth == 0 {
                    return p.nth(n + 1) == Arrow;
                }
            }
            Error => return false,
            _ => {}
        }
        n += 1;
        if n > 8192 {
            return false;
        }
    }
}
