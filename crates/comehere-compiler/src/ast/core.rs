//! Parser state machine and low-level operations.

use rowan::{Checkpoint, GreenNode, GreenNodeBuilder, TextRange, TextSize};

use comehere_core::{Diagnostics, Span};

use super::cst::{SyntaxKind, SyntaxNode, TokenSet};
use super::lexer::{Token, lex, token_text};
use crate::Error;

fn span_from_range(range: TextRange) -> Span {
    Span::new(u32::from(range.start()), u32::from(range.end()))
}

#[derive(Debug)]
pub struct ParseResult {
    pub root: SyntaxNode,
    pub diagnostics: Diagnostics,
}

/// Trivia tokens (whitespace, comments) are buffered and flushed as leading
/// trivia when starting a new node. This gives predictable trivia
/// attachment without backtracking.
pub struct Parser<'src> {
    pub(super) source: &'src str,
    pub(super) tokens: Vec<Token>,
    pub(super) pos: usize,
    pub(super) trivia_buffer: Vec<Token>,
    pub(super) builder: GreenNodeBuilder<'static>,
    pub(super) diagnostics: Diagnostics,
    pub(super) depth: u32,
    last_diagnostic_pos: Option<TextSize>,
    debug_fuel: std::cell::Cell<u32>,
    exec_fuel_remaining: Option<u32>,
    recursion_fuel_limit: Option<u32>,
    fatal_error: Option<Error>,
}

impl<'src> Parser<'src> {
    pub fn new(source: &'src str) -> Self {
        Self {
            source,
            tokens: lex(source),
            pos: 0,
            trivia_buffer: Vec::with_capacity(4),
            builder: GreenNodeBuilder::new(),
            diagnostics: Diagnostics::new(),
            depth: 0,
            last_diagnostic_pos: None,
            debug_fuel: std::cell::Cell::new(256),
            exec_fuel_remaining: Some(2_000_000),
            recursion_fuel_limit: Some(512),
            fatal_error: None,
        }
    }

    pub(super) fn finish(mut self) -> Result<(GreenNode, Diagnostics), Error> {
        self.drain_trivia();
        if let Some(err) = self.fatal_error {
            return Err(err);
        }
        Ok((self.builder.finish(), self.diagnostics))
    }

    pub(super) fn has_fatal_error(&self) -> bool {
        self.fatal_error.is_some()
    }

    pub(super) fn current(&self) -> SyntaxKind {
        self.nth(0)
    }

    fn reset_debug_fuel(&self) {
        self.debug_fuel.set(256);
    }

    fn ensure_progress(&self) {
        let fuel = self.debug_fuel.get();
        assert!(fuel > 0, "parser stuck without making progress");
        self.debug_fuel.set(fuel - 1);
    }

    pub(super) fn nth(&self, lookahead: usize) -> SyntaxKind {
        self.ensure_progress();
        self.tokens
            .get(self.pos + lookahead)
            .map_or(SyntaxKind::Error, |t| t.kind)
    }

    fn consume_exec_fuel(&mut self) {
        if let Some(ref mut remaining) = self.exec_fuel_remaining {
            if *remaining == 0 {
                if self.fatal_error.is_none() {
                    self.fatal_error = Some(Error::ExecFuelExhausted);
                }
                return;
            }
            *remaining -= 1;
        }
    }

    pub(super) fn current_span(&self) -> TextRange {
        self.tokens
            .get(self.pos)
            .map_or_else(|| TextRange::empty(self.eof_offset()), |t| t.span)
    }

    pub(super) fn eof_offset(&self) -> TextSize {
        TextSize::from(self.source.len() as u32)
    }

    pub(super) fn eof(&self) -> bool {
        self.pos >= self.tokens.len()
    }

    pub(super) fn should_stop(&self) -> bool {
        self.eof() || self.has_fatal_error()
    }

    pub(super) fn at(&self, kind: SyntaxKind) -> bool {
        self.current() == kind
    }

    pub(super) fn at_set(&self, set: TokenSet) -> bool {
        set.contains(self.current())
    }

    pub(super) fn peek(&mut self) -> SyntaxKind {
        self.skip_trivia_to_buffer();
        self.current()
    }

    /// Text of the current (non-trivia) token, for the handful of
    /// productions that key off an identifier's spelling (the reserved
    /// `COMEHERE` label).
    pub(super) fn current_text(&mut self) -> &'src str {
        self.skip_trivia_to_buffer();
        self.tokens
            .get(self.pos)
            .map_or("", |t| token_text(self.source, t))
    }

    pub(super) fn peek_nth(&mut self, n: usize) -> SyntaxKind {
        self.skip_trivia_to_buffer();
        let mut count = 0;
        let mut pos = self.pos;
        while pos < self.tokens.len() {
            let kind = self.tokens[pos].kind;
            if !kind.is_trivia() {
                if count == n {
                    return kind;
                }
                count += 1;
            }
            pos += 1;
        }
        SyntaxKind::Error
    }

    fn skip_trivia_to_buffer(&mut self) {
        while self.pos < self.tokens.len() && self.tokens[self.pos].kind.is_trivia() {
            self.trivia_buffer.push(self.tokens[self.pos]);
            self.pos += 1;
        }
    }

    fn drain_trivia(&mut self) {
        for token in self.trivia_buffer.drain(..) {
            let text = token_text(self.source, &token);
            self.builder.token(token.kind.into(), text);
        }
    }

    pub(super) fn start_node(&mut self, kind: SyntaxKind) {
        self.drain_trivia();
        self.builder.start_node(kind.into());
    }

    pub(super) fn start_node_at(&mut self, checkpoint: Checkpoint, kind: SyntaxKind) {
        self.builder.start_node_at(checkpoint, kind.into());
    }

    pub(super) fn finish_node(&mut self) {
        self.builder.finish_node();
    }

    pub(super) fn checkpoint(&mut self) -> Checkpoint {
        self.drain_trivia();
        self.builder.checkpoint()
    }

    pub(super) fn bump(&mut self) {
        assert!(!self.eof(), "bump called at EOF");
        self.reset_debug_fuel();
        self.consume_exec_fuel();

        self.skip_trivia_to_buffer();
        self.drain_trivia();

        let token = self.tokens[self.pos];
        let text = token_text(self.source, &token);
        self.builder.token(token.kind.into(), text);
        self.pos += 1;
    }

    pub(super) fn eat(&mut self, kind: SyntaxKind) -> bool {
        if self.peek() == kind {
            self.bump();
            true
        } else {
            false
        }
    }

    /// On mismatch: emit diagnostic but don't consume (allows parent recovery).
    pub(super) fn expect(&mut self, kind: SyntaxKind, what: &str) -> bool {
        if self.eat(kind) {
            return true;
        }
        self.error_msg(format!("expected {what}"));
        false
    }

    pub(super) fn error_msg(&mut self, message: impl Into<String>) {
        let range = self.current_span();
        let pos = range.start();
        if self.last_diagnostic_pos == Some(pos) {
            return;
        }
        self.last_diagnostic_pos = Some(pos);
        self.diagnostics.error(message, span_from_range(range)).emit();
    }

    pub(super) fn error_and_bump(&mut self, message: impl Into<String>) {
        self.error_msg(message);
        if !self.eof() {
            self.start_node(SyntaxKind::Error);
            self.bump();
            self.finish_node();
        }
    }

    /// Skips tokens until `recovery` or end of input, wrapping the skipped
    /// span in an `Error` node. Used when a statement starter is unrecognized.
    pub(super) fn recover_to(&mut self, recovery: TokenSet) {
        if self.at_set(recovery) || self.should_stop() {
            return;
        }
        self.start_node(SyntaxKind::Error);
        while !self.at_set(recovery) && !self.should_stop() {
            self.bump();
        }
        self.finish_node();
    }

    pub(super) fn enter_recursion(&mut self) -> bool {
        if let Some(limit) = self.recursion_fuel_limit {
            if self.depth >= limit {
                if self.fatal_error.is_none() {
                    self.fatal_error = Some(Error::RecursionLimitExceeded);
                }
                return false;
            }
        }
        self.depth += 1;
        self.reset_debug_fuel();
        true
    }

    pub(super) fn exit_recursion(&mut self) {
        self.depth = self.depth.saturating_sub(1);
        self.reset_debug_fuel();
    }
}

pub fn parse(source: &str) -> Result<ParseResult, Error> {
    let mut parser = Parser::new(source);
    super::grammar::parse_module(&mut parser);
    let (green, diagnostics) = parser.finish()?;
    Ok(ParseResult {
        root: SyntaxNode::new_root(green),
        diagnostics,
    })
}
