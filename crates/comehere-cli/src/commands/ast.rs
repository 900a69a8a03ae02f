//! `ast`: dump the parsed syntax tree, for debugging the rewriter itself.

use comehere_compiler::ast::{SyntaxKind, SyntaxNode, SyntaxToken, parse};
use rowan::NodeOrToken;

use crate::cli::SourceArgs;
use crate::util::load_source;

pub struct AstArgs {
    pub source: SourceArgs,
    pub raw: bool,
}

pub fn run(args: AstArgs) {
    let source = load_source(&args.source);
    let parsed = match parse(&source) {
        Ok(parsed) => parsed,
        Err(err) => {
            eprintln!("error: {err}");
            std::process::exit(1);
        }
    };

    if !parsed.diagnostics.is_empty() {
        eprintln!("{}", parsed.diagnostics.printer().render());
    }

    print!("{}", dump_node(&parsed.root, 0, args.raw));
}

fn is_trivia(kind: SyntaxKind) -> bool {
    matches!(
        kind,
        SyntaxKind::Whitespace | SyntaxKind::Newline | SyntaxKind::LineComment | SyntaxKind::BlockComment
    )
}

fn dump_node(node: &SyntaxNode, depth: usize, raw: bool) -> String {
    let indent = "  ".repeat(depth);
    let mut out = format!("{indent}({:?}\n", node.kind());
    for child in node.children_with_tokens() {
        match child {
            NodeOrToken::Node(n) => out.push_str(&dump_node(&n, depth + 1, raw)),
            NodeOrToken::Token(t) => {
                if raw || !is_trivia(t.kind()) {
                    out.push_str(&dump_token(&t, depth + 1));
                }
            }
        }
    }
    out.push_str(&indent);
    out.push_str(")\n");
    out
}

fn dump_token(token: &SyntaxToken, depth: usize) -> String {
    let indent = "  ".repeat(depth);
    format!("{indent}{:?} {:?}\n", token.kind(), token.text())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dumps_module_with_trivia_filtered_by_default() {
        let parsed = parse("let x = 1;\n").unwrap();
        let dump = dump_node(&parsed.root, 0, false);
        assert!(dump.contains("Module"));
        assert!(!dump.contains("Whitespace"));
    }

    #[test]
    fn raw_dump_includes_trivia() {
        let parsed = parse("let x = 1;\n").unwrap();
        let dump = dump_node(&parsed.root, 0, true);
        assert!(dump.contains("Whitespace"));
    }
}
