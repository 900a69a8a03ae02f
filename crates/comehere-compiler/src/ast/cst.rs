//! Syntax kinds for the host language superset.
//!
//! `SyntaxKind` serves dual roles: token kinds (from the lexer) and node
//! kinds (from the parser). Logos derives token recognition; node kinds
//! lack token/regex attributes. `HostLang` implements Rowan's `Language`
//! trait for tree construction.

#![allow(dead_code)]

use logos::Logos;
use rowan::Language;

/// All token and node kinds. Tokens first (so the small FIRST-set token
/// sets below stay under the 64-bit `TokenSet` capacity), then nodes, then
/// the `__LAST` sentinel. `#[repr(u16)]` enables safe transmute in
/// `kind_from_raw`.
#[derive(Logos, Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u16)]
pub enum SyntaxKind {
    #[token("(")]
    ParenOpen = 0,
    #[token(")")]
    ParenClose,
    #[token("{")]
    BraceOpen,
    #[token("}")]
    BraceClose,
    #[token("[")]
    BracketOpen,
    #[token("]")]
    BracketClose,
    #[token(";")]
    Semicolon,
    #[token(",")]
    Comma,
    #[token("...")]
    DotDotDot,
    #[token(".")]
    Dot,
    #[token("?.")]
    QuestionDot,
    #[token(":")]
    Colon,
    #[token("=>")]
    Arrow,
    #[token("??")]
    QuestionQuestion,
    #[token("?")]
    Question,
    #[token("===")]
    EqEqEq,
    #[token("!==")]
    NotEqEq,
    #[token("==")]
    EqEq,
    #[token("!=")]
    NotEq,
    #[token("<=")]
    Le,
    #[token(">=")]
    Ge,
    #[token("<<")]
    Shl,
    #[token(">>>")]
    UShr,
    #[token(">>")]
    Shr,
    #[token("<")]
    Lt,
    #[token(">")]
    Gt,
    #[token("&&")]
    AmpAmp,
    #[token("||")]
    PipePipe,
    #[token("&")]
    Amp,
    #[token("|")]
    PipeTok,
    #[token("^")]
    Caret,
    #[token("~")]
    Tilde,
    #[token("!")]
    Bang,
    #[token("++")]
    PlusPlus,
    #[token("--")]
    MinusMinus,
    #[token("**")]
    StarStar,
    #[token("+")]
    Plus,
    #[token("-")]
    Minus,
    #[token("*")]
    Star,
    #[token("/")]
    Slash,
    #[token("%")]
    Percent,
    #[regex(r"(\+|-|\*\*|\*|/|%|<<|>>>|>>|&&|\|\||\?\?|&|\||\^)=")]
    CompoundAssign,
    #[token("=")]
    Eq,

    #[token("var")]
    KwVar,
    #[token("let")]
    KwLet,
    #[token("const")]
    KwConst,
    #[token("function")]
    KwFunction,
    #[token("return")]
    KwReturn,
    #[token("if")]
    KwIf,
    #[token("else")]
    KwElse,
    #[token("for")]
    KwFor,
    #[token("while")]
    KwWhile,
    #[token("do")]
    KwDo,
    #[token("switch")]
    KwSwitch,
    #[token("case")]
    KwCase,
    #[token("default")]
    KwDefault,
    #[token("break")]
    KwBreak,
    #[token("continue")]
    KwContinue,
    #[token("try")]
    KwTry,
    #[token("catch")]
    KwCatch,
    #[token("finally")]
    KwFinally,
    #[token("throw")]
    KwThrow,
    #[token("class")]
    KwClass,
    #[token("extends")]
    KwExtends,
    #[token("new")]
    KwNew,
    #[token("this")]
    KwThis,
    #[token("super")]
    KwSuper,
    #[token("typeof")]
    KwTypeof,
    #[token("void")]
    KwVoid,
    #[token("delete")]
    KwDelete,
    #[token("in")]
    KwIn,
    #[token("of")]
    KwOf,
    #[token("instanceof")]
    KwInstanceof,
    #[token("true")]
    KwTrue,
    #[token("false")]
    KwFalse,
    #[token("null")]
    KwNull,
    #[token("undefined")]
    KwUndefined,
    #[token("with")]
    KwWith,
    #[token("static")]
    KwStatic,
    #[token("get")]
    KwGet,
    #[token("set")]
    KwSet,
    #[token("async")]
    KwAsync,
    #[token("await")]
    KwAwait,
    #[token("yield")]
    KwYield,

    #[regex(r"[0-9]+(\.[0-9]+)?([eE][+-]?[0-9]+)?n?")]
    Number,
    #[regex(r#""(?:[^"\\]|\\.)*""#)]
    #[regex(r"'(?:[^'\\]|\\.)*'")]
    StringLit,
    #[regex(r"`(?:[^`\\]|\\.)*`")]
    TemplateLit,

    /// Two-sigil capture variable identifier (`$$name`, `$$0`, ...), matched
    /// before the plain identifier rule so it keeps both sigils in its text.
    #[regex(r"\$\$[A-Za-z0-9_]+")]
    CaptureIdent,

    #[regex(r"#?[A-Za-z_][A-Za-z0-9_]*")]
    Id,

    #[regex(r"[ \t]+")]
    Whitespace,
    #[token("\n")]
    #[token("\r\n")]
    Newline,
    #[regex(r"//[^\n]*", allow_greedy = true)]
    LineComment,
    #[regex(r"/\*(?:[^*]|\*[^/])*\*/")]
    BlockComment,

    Garbage,
    Error,

    // --- Node kinds (non-terminals) ---
    Module,
    Block,
    ExprStmt,
    EmptyStmt,
    VarDecl,
    VarDeclarator,
    IfStmt,
    ForStmt,
    ForInStmt,
    ForOfStmt,
    WhileStmt,
    DoWhileStmt,
    SwitchStmt,
    SwitchCase,
    TryStmt,
    CatchClause,
    ThrowStmt,
    ReturnStmt,
    BreakStmt,
    ContinueStmt,
    LabelledStmt,
    ComeHereWith,
    FunctionDecl,
    FunctionExpr,
    ArrowFunction,
    Params,
    Param,
    ClassDecl,
    ClassExpr,
    ClassBody,
    MethodDef,
    FieldDef,
    ObjectExpr,
    ObjectProperty,
    ObjectMethod,
    ArrayExpr,
    SpreadElement,
    CallExpr,
    NewExpr,
    MemberExpr,
    ComputedMemberExpr,
    Arguments,
    BinaryExpr,
    LogicalExpr,
    UnaryExpr,
    UpdateExpr,
    AssignExpr,
    ConditionalExpr,
    SequenceExpr,
    ParenExpr,
    Identifier,
    CaptureIdentifier,
    NumberLiteral,
    StringLiteral,
    BooleanLiteral,
    NullLiteral,
    UndefinedLiteral,
    ThisExpr,
    SuperExpr,
    TemplateLiteral,

    /// Internal marker wrapping a goal's guard so the control driver can
    /// re-locate it by id after the tree has been rerooted by a prior
    /// mutation, without carrying fragile index-based paths across edits.
    /// Never emitted as source text: `SyntaxNode::to_string()` only
    /// concatenates token text, so this wrapper node is invisible in output.
    GoalGuardMarker,

    // Must be last - used for bounds checking in `kind_from_raw`.
    #[doc(hidden)]
    __LAST,
}

use SyntaxKind::*;

impl SyntaxKind {
    #[inline]
    pub fn is_trivia(self) -> bool {
        matches!(self, Whitespace | Newline | LineComment | BlockComment)
    }

    #[inline]
    pub fn is_error(self) -> bool {
        matches!(self, Error | Garbage)
    }
}

impl From<SyntaxKind> for rowan::SyntaxKind {
    #[inline]
    fn from(kind: SyntaxKind) -> Self {
        Self(kind as u16)
    }
}

/// Language tag for Rowan's tree types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum HostLang {}

impl Language for HostLang {
    type Kind = SyntaxKind;

    fn kind_from_raw(raw: rowan::SyntaxKind) -> Self::Kind {
        assert!(raw.0 < __LAST as u16);
        // SAFETY: bounds-checked above, and SyntaxKind is repr(u16).
        unsafe { std::mem::transmute::<u16, SyntaxKind>(raw.0) }
    }

    fn kind_to_raw(kind: Self::Kind) -> rowan::SyntaxKind {
        kind.into()
    }
}

pub type SyntaxNode = rowan::SyntaxNode<HostLang>;
pub type SyntaxToken = rowan::SyntaxToken<HostLang>;
pub type SyntaxElement = rowan::NodeOrToken<SyntaxNode, SyntaxToken>;

/// 64-bit bitset of `SyntaxKind`s for O(1) membership testing. Only the
/// low-discriminant token kinds referenced below ever go into a `TokenSet`;
/// node kinds live past bit 64 and are never tested this way.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct TokenSet(u64);

impl TokenSet {
    pub const EMPTY: TokenSet = TokenSet(0);

    #[inline]
    pub const fn new(kinds: &[SyntaxKind]) -> Self {
        let mut bits = 0u64;
        let mut i = 0;
        while i < kinds.len() {
            let kind = kinds[i] as u16;
            assert!(kind < 64, "SyntaxKind value exceeds TokenSet capacity");
            bits |= 1 << kind;
            i += 1;
        }
        TokenSet(bits)
    }

    #[inline]
    pub const fn contains(&self, kind: SyntaxKind) -> bool {
        let kind = kind as u16;
        if kind >= 64 {
            return false;
        }
        self.0 & (1 << kind) != 0
    }

    #[inline]
    pub const fn union(self, other: TokenSet) -> TokenSet {
        TokenSet(self.0 | other.0)
    }
}

/// Pre-defined token sets for the parser.
pub mod token_sets {
    use super::*;

    pub const STMT_RECOVERY: TokenSet = TokenSet::new(&[Semicolon, BraceClose]);

    pub const EXPR_FIRST: TokenSet = TokenSet::new(&[
        ParenOpen,
        BracketOpen,
        BraceOpen,
        Id,
        CaptureIdent,
        Number,
        StringLit,
        TemplateLit,
        Bang,
        Tilde,
        Plus,
        Minus,
        PlusPlus,
        MinusMinus,
        KwNew,
        KwThis,
        KwSuper,
        KwTypeof,
        KwVoid,
        KwDelete,
        KwFunction,
        KwClass,
        KwAsync,
        KwYield,
        KwTrue,
        KwFalse,
        KwNull,
        KwUndefined,
    ]);

    pub const ASSIGN_OPS: TokenSet = TokenSet::new(&[Eq, CompoundAssign]);
}
