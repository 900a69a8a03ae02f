//! Typed AST wrappers over CST nodes.
//!
//! Each struct wraps a `SyntaxNode` and provides typed accessors. Cast is
//! infallible for correct `SyntaxKind` - validation happens during parsing.

use super::cst::{SyntaxKind, SyntaxNode, SyntaxToken};

macro_rules! ast_node {
    ($name:ident, $kind:ident) => {
        #[derive(Debug, Clone, PartialEq, Eq, Hash)]
        pub struct $name(SyntaxNode);

        impl $name {
            pub fn cast(node: SyntaxNode) -> Option<Self> {
                (node.kind() == SyntaxKind::$kind).then(|| Self(node))
            }

            pub fn as_cst(&self) -> &SyntaxNode {
                &self.0
            }
        }
    };
}

ast_node!(Module, Module);
ast_node!(Block, Block);
ast_node!(VarDecl, VarDecl);
ast_node!(VarDeclarator, VarDeclarator);
ast_node!(IfStmt, IfStmt);
ast_node!(ForStmt, ForStmt);
ast_node!(ForInStmt, ForInStmt);
ast_node!(ForOfStmt, ForOfStmt);
ast_node!(WhileStmt, WhileStmt);
ast_node!(DoWhileStmt, DoWhileStmt);
ast_node!(SwitchStmt, SwitchStmt);
ast_node!(SwitchCase, SwitchCase);
ast_node!(TryStmt, TryStmt);
ast_node!(CatchClause, CatchClause);
ast_node!(ThrowStmt, ThrowStmt);
ast_node!(ReturnStmt, ReturnStmt);
ast_node!(BreakStmt, BreakStmt);
ast_node!(ContinueStmt, ContinueStmt);
ast_node!(LabelledStmt, LabelledStmt);
ast_node!(ComeHereWith, ComeHereWith);
ast_node!(FunctionDecl, FunctionDecl);
ast_node!(FunctionExpr, FunctionExpr);
ast_node!(ArrowFunction, ArrowFunction);
ast_node!(Params, Params);
ast_node!(Param, Param);
ast_node!(ClassDecl, ClassDecl);
ast_node!(ClassExpr, ClassExpr);
ast_node!(ClassBody, ClassBody);
ast_node!(MethodDef, MethodDef);
ast_node!(FieldDef, FieldDef);
ast_node!(CallExpr, CallExpr);
ast_node!(MemberExpr, MemberExpr);
ast_node!(Identifier, Identifier);
ast_node!(CaptureIdentifier, CaptureIdentifier);
ast_node!(AssignExpr, AssignExpr);

/// Any statement-level node. Used by callers that need to walk a block's
/// direct children without caring which concrete shape each one is.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Stmt {
    Block(Block),
    ExprStmt(SyntaxNode),
    EmptyStmt(SyntaxNode),
    VarDecl(VarDecl),
    IfStmt(IfStmt),
    ForStmt(ForStmt),
    ForInStmt(ForInStmt),
    ForOfStmt(ForOfStmt),
    WhileStmt(WhileStmt),
    DoWhileStmt(DoWhileStmt),
    SwitchStmt(SwitchStmt),
    TryStmt(TryStmt),
    ThrowStmt(ThrowStmt),
    ReturnStmt(ReturnStmt),
    BreakStmt(BreakStmt),
    ContinueStmt(ContinueStmt),
    LabelledStmt(LabelledStmt),
    FunctionDecl(FunctionDecl),
    ClassDecl(ClassDecl),
}

impl Stmt {
    pub fn cast(node: SyntaxNode) -> Option<Self> {
        match node.kind() {
            SyntaxKind::Block => Block::cast(node).map(Stmt::Block),
            SyntaxKind::ExprStmt => Some(Stmt::ExprStmt(node)),
            SyntaxKind::EmptyStmt => Some(Stmt::EmptyStmt(node)),
            SyntaxKind::VarDecl => VarDecl::cast(node).map(Stmt::VarDecl),
            SyntaxKind::IfStmt => IfStmt::cast(node).map(Stmt::IfStmt),
            SyntaxKind::ForStmt => ForStmt::cast(node).map(Stmt::ForStmt),
            SyntaxKind::ForInStmt => ForInStmt::cast(node).map(Stmt::ForInStmt),
            SyntaxKind::ForOfStmt => ForOfStmt::cast(node).map(Stmt::ForOfStmt),
            SyntaxKind::WhileStmt => WhileStmt::cast(node).map(Stmt::WhileStmt),
            SyntaxKind::DoWhileStmt => DoWhileStmt::cast(node).map(Stmt::DoWhileStmt),
            SyntaxKind::SwitchStmt => SwitchStmt::cast(node).map(Stmt::SwitchStmt),
            SyntaxKind::TryStmt => TryStmt::cast(node).map(Stmt::TryStmt),
            SyntaxKind::ThrowStmt => ThrowStmt::cast(node).map(Stmt::ThrowStmt),
            SyntaxKind::ReturnStmt => ReturnStmt::cast(node).map(Stmt::ReturnStmt),
            SyntaxKind::BreakStmt => BreakStmt::cast(node).map(Stmt::BreakStmt),
            SyntaxKind::ContinueStmt => ContinueStmt::cast(node).map(Stmt::ContinueStmt),
            SyntaxKind::LabelledStmt => LabelledStmt::cast(node).map(Stmt::LabelledStmt),
            SyntaxKind::FunctionDecl => FunctionDecl::cast(node).map(Stmt::FunctionDecl),
            SyntaxKind::ClassDecl => ClassDecl::cast(node).map(Stmt::ClassDecl),
            _ => None,
        }
    }

    pub fn as_cst(&self) -> &SyntaxNode {
        match self {
            Stmt::Block(n) => n.as_cst(),
            Stmt::ExprStmt(n) | Stmt::EmptyStmt(n) => n,
            Stmt::VarDecl(n) => n.as_cst(),
            Stmt::IfStmt(n) => n.as_cst(),
            Stmt::ForStmt(n) => n.as_cst(),
            Stmt::ForInStmt(n) => n.as_cst(),
            Stmt::ForOfStmt(n) => n.as_cst(),
            Stmt::WhileStmt(n) => n.as_cst(),
            Stmt::DoWhileStmt(n) => n.as_cst(),
            Stmt::SwitchStmt(n) => n.as_cst(),
            Stmt::TryStmt(n) => n.as_cst(),
            Stmt::ThrowStmt(n) => n.as_cst(),
            Stmt::ReturnStmt(n) => n.as_cst(),
            Stmt::BreakStmt(n) => n.as_cst(),
            Stmt::ContinueStmt(n) => n.as_cst(),
            Stmt::LabelledStmt(n) => n.as_cst(),
            Stmt::FunctionDecl(n) => n.as_cst(),
            Stmt::ClassDecl(n) => n.as_cst(),
        }
    }
}

/// Any node shaped like a function: has `Params` and a `Block` body, and is
/// the boundary a synthesized call is attached to in the control driver.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum FunctionLike {
    FunctionDecl(FunctionDecl),
    FunctionExpr(FunctionExpr),
    ArrowFunction(ArrowFunction),
    MethodDef(MethodDef),
}

impl FunctionLike {
    pub fn cast(node: SyntaxNode) -> Option<Self> {
        match node.kind() {
            SyntaxKind::FunctionDecl => FunctionDecl::cast(node).map(FunctionLike::FunctionDecl),
            SyntaxKind::FunctionExpr => FunctionExpr::cast(node).map(FunctionLike::FunctionExpr),
            SyntaxKind::ArrowFunction => ArrowFunction::cast(node).map(FunctionLike::ArrowFunction),
            SyntaxKind::MethodDef => MethodDef::cast(node).map(FunctionLike::MethodDef),
            _ => None,
        }
    }

    pub fn as_cst(&self) -> &SyntaxNode {
        match self {
            FunctionLike::FunctionDecl(n) => n.as_cst(),
            FunctionLike::FunctionExpr(n) => n.as_cst(),
            FunctionLike::ArrowFunction(n) => n.as_cst(),
            FunctionLike::MethodDef(n) => n.as_cst(),
        }
    }

    pub fn params(&self) -> Option<Params> {
        self.as_cst().children().find_map(Params::cast)
    }

    pub fn body_block(&self) -> Option<Block> {
        self.as_cst().children().find_map(Block::cast)
    }

    pub fn name(&self) -> Option<SyntaxToken> {
        binding_name(self.as_cst())
    }
}

fn first_token(node: &SyntaxNode, kind: SyntaxKind) -> Option<SyntaxToken> {
    node.children_with_tokens()
        .filter_map(|it| it.into_token())
        .find(|t| t.kind() == kind)
}

/// A bound name (function/class/var/param name, catch param, label) is
/// parsed as an `Id` token wrapped in a child `Identifier` node, not as a
/// direct token of the binding node itself. Falls back to a direct token
/// for call sites that don't go through that wrapping.
fn binding_name(node: &SyntaxNode) -> Option<SyntaxToken> {
    node.children()
        .find(|n| n.kind() == SyntaxKind::Identifier)
        .and_then(|id| first_token(&id, SyntaxKind::Id))
        .or_else(|| first_token(node, SyntaxKind::Id))
}

impl Module {
    pub fn stmts(&self) -> impl Iterator<Item = Stmt> + '_ {
        self.0.children().filter_map(Stmt::cast)
    }
}

impl Block {
    pub fn stmts(&self) -> impl Iterator<Item = Stmt> + '_ {
        self.0.children().filter_map(Stmt::cast)
    }

    pub fn is_empty(&self) -> bool {
        self.stmts().next().is_none()
    }
}

impl VarDecl {
    pub fn declarators(&self) -> impl Iterator<Item = VarDeclarator> + '_ {
        self.0.children().filter_map(VarDeclarator::cast)
    }

    pub fn keyword(&self) -> Option<SyntaxToken> {
        self.0
            .children_with_tokens()
            .filter_map(|it| it.into_token())
            .find(|t| matches!(t.kind(), SyntaxKind::KwVar | SyntaxKind::KwLet | SyntaxKind::KwConst))
    }
}

impl VarDeclarator {
    pub fn name(&self) -> Option<SyntaxToken> {
        binding_name(&self.0)
    }

    pub fn init(&self) -> Option<SyntaxNode> {
        self.0.children().last()
    }
}

impl IfStmt {
    pub fn condition(&self) -> Option<SyntaxNode> {
        self.0.children().next()
    }

    pub fn then_branch(&self) -> Option<SyntaxNode> {
        self.0.children().nth(1)
    }

    pub fn else_branch(&self) -> Option<SyntaxNode> {
        self.0.children().nth(2)
    }
}

impl SwitchStmt {
    pub fn discriminant(&self) -> Option<SyntaxNode> {
        self.0.children().next()
    }

    pub fn cases(&self) -> impl Iterator<Item = SwitchCase> + '_ {
        self.0.children().filter_map(SwitchCase::cast)
    }
}

impl SwitchCase {
    pub fn is_default(&self) -> bool {
        first_token(&self.0, SyntaxKind::KwDefault).is_some()
    }

    pub fn test(&self) -> Option<SyntaxNode> {
        if self.is_default() {
            None
        } else {
            self.0.children().next()
        }
    }

    pub fn stmts(&self) -> impl Iterator<Item = Stmt> + '_ {
        self.0.children().filter_map(Stmt::cast)
    }
}

impl TryStmt {
    pub fn try_block(&self) -> Option<Block> {
        self.0.children().find_map(Block::cast)
    }

    pub fn catch_clause(&self) -> Option<CatchClause> {
        self.0.children().find_map(CatchClause::cast)
    }

    pub fn finally_block(&self) -> Option<Block> {
        self.0.children().filter_map(Block::cast).nth(1)
    }
}

impl CatchClause {
    pub fn param(&self) -> Option<SyntaxToken> {
        binding_name(&self.0)
    }

    pub fn body(&self) -> Option<Block> {
        self.0.children().find_map(Block::cast)
    }
}

impl LabelledStmt {
    pub fn label(&self) -> Option<SyntaxToken> {
        binding_name(&self.0)
    }

    pub fn body(&self) -> Option<SyntaxNode> {
        self.0.children().last()
    }

    pub fn as_comehere_with(&self) -> Option<ComeHereWith> {
        self.0.children().find_map(ComeHereWith::cast)
    }
}

impl ComeHereWith {
    /// Every initializer/description argument in the `with(...)` head, in
    /// source order: either a bare expression (the `_` placeholder or a
    /// description string) or an `expr = value` assignment.
    pub fn args(&self) -> impl Iterator<Item = SyntaxNode> + '_ {
        let body = self.body();
        self.0
            .children()
            .take_while(move |n| Some(n) != body.as_ref().map(|b| b.as_cst()).as_ref())
    }

    pub fn body(&self) -> Option<Block> {
        self.0.children().find_map(Block::cast)
    }
}

impl Params {
    pub fn params(&self) -> impl Iterator<Item = Param> + '_ {
        self.0.children().filter_map(Param::cast)
    }
}

impl Param {
    pub fn name(&self) -> Option<SyntaxToken> {
        binding_name(&self.0)
    }
}

impl ClassDecl {
    pub fn name(&self) -> Option<SyntaxToken> {
        binding_name(&self.0)
    }

    pub fn methods(&self) -> impl Iterator<Item = MethodDef> + '_ {
        self.0
            .children()
            .find_map(ClassBody::cast)
            .into_iter()
            .flat_map(|body| body.as_cst().children().filter_map(MethodDef::cast).collect::<Vec<_>>())
    }
}

impl ClassExpr {
    pub fn name(&self) -> Option<SyntaxToken> {
        binding_name(&self.0)
    }
}

impl ClassBody {}

impl MethodDef {
    pub fn name(&self) -> Option<SyntaxToken> {
        first_token(&self.0, SyntaxKind::Id)
    }

    pub fn is_constructor(&self) -> bool {
        self.name().map(|t| t.text() == "constructor").unwrap_or(false)
    }

    pub fn is_static(&self) -> bool {
        first_token(&self.0, SyntaxKind::KwStatic).is_some()
    }

    /// Name of the nearest `ClassDecl`/`ClassExpr` ancestor, if any.
    pub fn enclosing_class_name(&self) -> Option<String> {
        self.0.ancestors().find_map(|n| {
            ClassDecl::cast(n.clone())
                .and_then(|c| c.name())
                .or_else(|| ClassExpr::cast(n).and_then(|c| c.name()))
                .map(|t| t.text().to_string())
        })
    }
}

impl CallExpr {
    pub fn callee(&self) -> Option<SyntaxNode> {
        self.0.children().next()
    }

    pub fn arguments(&self) -> Option<SyntaxNode> {
        self.0
            .children()
            .find(|n| n.kind() == SyntaxKind::Arguments)
    }
}

impl MemberExpr {
    pub fn object(&self) -> Option<SyntaxNode> {
        self.0.children().next()
    }

    pub fn property(&self) -> Option<SyntaxToken> {
        self.0
            .children_with_tokens()
            .filter_map(|it| it.into_token())
            .filter(|t| t.kind() == SyntaxKind::Id)
            .last()
    }
}

impl Identifier {
    pub fn text(&self) -> String {
        self.0.text().to_string()
    }
}

impl CaptureIdentifier {
    pub fn text(&self) -> String {
        self.0.text().to_string()
    }
}

impl AssignExpr {
    pub fn lhs(&self) -> Option<SyntaxNode> {
        self.0.children().next()
    }

    pub fn rhs(&self) -> Option<SyntaxNode> {
        self.0.children().nth(1)
    }
}
