//! Synthesizing brand-new subtrees for injected code: guards, preamble
//! declarations, synthesized calls. Unlike [`super::mutate`], nothing here
//! copies from an existing tree; every token is built from scratch.

use rowan::GreenNodeBuilder;

use super::cst::SyntaxKind::{self, *};

/// Thin wrapper over `GreenNodeBuilder` with helpers for the token shapes
/// a rewrite pass synthesizes most often: identifiers, operators, and
/// whitespace separators, so call sites read like the grammar they mimic
/// rather than a sequence of raw `token()` calls.
pub struct TreeBuilder {
    builder: GreenNodeBuilder<'static>,
}

impl Default for TreeBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl TreeBuilder {
    pub fn new() -> Self {
        Self {
            builder: GreenNodeBuilder::new(),
        }
    }

    pub fn inner(&mut self) -> &mut GreenNodeBuilder<'static> {
        &mut self.builder
    }

    pub fn start_node(&mut self, kind: SyntaxKind) -> &mut Self {
        self.builder.start_node(kind.into());
        self
    }

    pub fn finish_node(&mut self) -> &mut Self {
        self.builder.finish_node();
        self
    }

    pub fn token(&mut self, kind: SyntaxKind, text: &str) -> &mut Self {
        self.builder.token(kind.into(), text);
        self
    }

    pub fn space(&mut self) -> &mut Self {
        self.token(Whitespace, " ")
    }

    pub fn newline(&mut self) -> &mut Self {
        self.token(Newline, "\n")
    }

    pub fn ident(&mut self, name: &str) -> &mut Self {
        self.start_node(Identifier);
        self.token(Id, name);
        self.finish_node()
    }

    /// `name(args...)` as a full `CallExpr`. Each element of `args` is run
    /// against a fresh `TreeBuilder`-style closure so callers can nest
    /// arbitrary argument expressions.
    pub fn call(&mut self, callee: &str, args: impl FnOnce(&mut Self)) -> &mut Self {
        self.start_node(CallExpr);
        self.ident(callee);
        self.start_node(Arguments);
        self.token(ParenOpen, "(");
        args(self);
        self.token(ParenClose, ")");
        self.finish_node();
        self.finish_node()
    }

    /// One positional argument followed by a `, ` separator; callers build
    /// an argument list by calling this once per argument except the last.
    pub fn arg_sep(&mut self) -> &mut Self {
        self.token(Comma, ",").space()
    }

    pub fn number(&mut self, value: &str) -> &mut Self {
        self.start_node(NumberLiteral);
        self.token(Number, value);
        self.finish_node()
    }

    pub fn string_lit(&mut self, quoted_text: &str) -> &mut Self {
        self.start_node(StringLiteral);
        self.token(StringLit, quoted_text);
        self.finish_node()
    }

    pub fn member(&mut self, object: impl FnOnce(&mut Self), property: &str) -> &mut Self {
        self.start_node(MemberExpr);
        object(self);
        self.token(Dot, ".");
        self.token(Id, property);
        self.finish_node()
    }

    pub fn finish(self) -> rowan::GreenNode {
        self.builder.finish()
    }
}
