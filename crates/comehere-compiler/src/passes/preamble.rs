//! Preamble emitter (C9): prepends the support declarations referenced by
//! earlier passes — the seek cursor, the active-frame mask, and whichever
//! iterator/short-circuit helpers got synthesized — to the top of the
//! module. Emits only what's actually referenced, per
//! [`crate::names::SupportNames`].

use rowan::NodeOrToken;

use crate::ast::{SyntaxKind::*, SyntaxNode, parse};
use crate::names::NameRegistry;

/// `module_id` identifies this module to the host's `debugHooks`; callers
/// typically pass the source file's path.
pub fn emit_preamble(root: &SyntaxNode, names: &NameRegistry, module_id: &str) -> SyntaxNode {
    let source = preamble_source(names, module_id);
    if source.is_empty() {
        return root.clone();
    }

    let preamble_root = parse(&source).expect("synthesized preamble must parse").root;
    splice_front(root, &preamble_root)
}

fn preamble_source(names: &NameRegistry, module_id: &str) -> String {
    let support = names.support();
    let mut out = String::new();

    if let Some(seek) = &support.seek {
        out.push_str(&format!(
            "let {seek} = host.debugHooks?.getWhichSeeking(\"{module_id}\") || 0;\n"
        ));
    }
    if let Some(mask) = &support.active_mask {
        // Arbitrary-precision so a module with more than 31 goal-owning
        // functions doesn't silently truncate under `|`/`&`/`<<`.
        out.push_str(&format!("let {mask} = 0n;\n"));
    }
    if let Some(iter) = &support.maybe_not_empty_iterator {
        out.push_str(&format!(
            "function* {iter}(items, seek) {{\n\
             \x20\x20let any = false;\n\
             \x20\x20for (const item of items) {{\n\
             \x20\x20\x20\x20any = true;\n\
             \x20\x20\x20\x20yield item;\n\
             \x20\x20}}\n\
             \x20\x20if (!any && seek !== 0) {{\n\
             \x20\x20\x20\x20yield undefined;\n\
             \x20\x20}}\n\
             }}\n"
        ));
    }
    if let Some(iter) = &support.maybe_not_empty_key_iterator {
        out.push_str(&format!(
            "function* {iter}(obj, seek) {{\n\
             \x20\x20let any = false;\n\
             \x20\x20for (const key in obj) {{\n\
             \x20\x20\x20\x20any = true;\n\
             \x20\x20\x20\x20yield key;\n\
             \x20\x20}}\n\
             \x20\x20if (!any && seek !== 0) {{\n\
             \x20\x20\x20\x20yield undefined;\n\
             \x20\x20}}\n\
             }}\n"
        ));
    }
    if let Some(or_name) = &support.or_helper {
        out.push_str(&format!(
            "function {or_name}(left, rightThunk, force) {{\n\
             \x20\x20if (force) return rightThunk();\n\
             \x20\x20if (left) return left;\n\
             \x20\x20return rightThunk();\n\
             }}\n"
        ));
    }
    if let Some(and_name) = &support.and_helper {
        out.push_str(&format!(
            "function {and_name}(left, rightThunk, force) {{\n\
             \x20\x20if (force) return rightThunk();\n\
             \x20\x20if (!left) return left;\n\
             \x20\x20return rightThunk();\n\
             }}\n"
        ));
    }

    out
}

/// Copies every statement of `preamble_root` in front of `root`'s own
/// statements. Both are `Module` nodes; the result keeps `root`'s
/// trivia/shebang handling by leaving its own children in source order
/// after the spliced-in declarations.
fn splice_front(root: &SyntaxNode, preamble_root: &SyntaxNode) -> SyntaxNode {
    let mut builder = rowan::GreenNodeBuilder::new();
    builder.start_node(Module.into());
    for child in preamble_root.children_with_tokens() {
        match child {
            NodeOrToken::Node(n) => crate::ast::copy_verbatim(&mut builder, &n),
            NodeOrToken::Token(t) => builder.token(t.kind().into(), t.text()),
        }
    }
    for child in root.children_with_tokens() {
        match child {
            NodeOrToken::Node(n) => crate::ast::copy_verbatim(&mut builder, &n),
            NodeOrToken::Token(t) => builder.token(t.kind().into(), t.text()),
        }
    }
    builder.finish_node();
    SyntaxNode::new_root(builder.finish())
}

#[cfg(test)]
mod tests {
    use super::*;
    use comehere_core::NamePool;

    #[test]
    fn emits_nothing_when_no_support_names_were_allocated() {
        let root = parse("function f() {}\n").unwrap().root;
        let names = NameRegistry::new(NamePool::new());
        let out = emit_preamble(&root, &names, "mod.js");
        assert_eq!(out.text().to_string(), "function f() {}\n");
    }

    #[test]
    fn emits_seek_and_active_mask_when_referenced() {
        let root = parse("function f() {}\n").unwrap().root;
        let mut names = NameRegistry::new(NamePool::new());
        names.seek();
        names.active_mask();
        let out = emit_preamble(&root, &names, "mod.js");
        let text = out.text().to_string();
        assert!(text.contains("getWhichSeeking(\"mod.js\")"));
        assert!(text.contains("= 0n;"));
        assert!(text.ends_with("function f() {}\n"));
    }
}
