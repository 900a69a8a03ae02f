//! Orchestration (C10): runs the fixed pass pipeline in order — parse,
//! normalize (C3), return-capture (C5), extract (C6), drive (C7),
//! capture variables (C8), preamble (C9) — and assembles the public
//! result.

use comehere_core::{Diagnostics, NamePool};

use crate::Error;
use crate::ast::{SyntaxKind, SyntaxNode, parse};
use crate::model::{ActiveFrameRegistry, GoalBlock};
use crate::names::NameRegistry;
use crate::passes::{capture_vars, control_driver, extractor, normalize, preamble, return_capture};

/// The rewritten source plus one description-or-`None` entry per goal, in
/// id order, for hosts that want to render a goal list without
/// re-parsing the output.
#[derive(Debug, Clone)]
pub struct TransformOutput {
    pub code: String,
    pub blocks: Vec<Option<String>>,
}

/// `module_id` identifies this source to the host's `debugHooks`,
/// typically the file path; it ends up in the emitted preamble verbatim.
pub fn transform(source: &str, module_id: &str) -> Result<(TransformOutput, Diagnostics), Error> {
    let parsed = parse(source)?;
    if parsed.diagnostics.has_errors() {
        return Err(Error::UnparsableSource);
    }

    let mut diagnostics = Diagnostics::new();

    let mut pool = NamePool::new();
    pool.seed(existing_identifiers(&parsed.root));
    let mut names = NameRegistry::new(pool);
    let mut frames = ActiveFrameRegistry::new();

    let normalized = normalize::normalize(&parsed.root);
    let lifted = return_capture::lift_return_trailing_captures(&normalized, &mut names);
    let extracted = extractor::extract(&lifted, &mut names, &mut frames, &mut diagnostics);
    let driven = control_driver::drive(&extracted.root, &extracted.goals, &mut names, &mut frames, &mut diagnostics);
    let captured = capture_vars::rewrite_capture_variables(&driven);
    let with_preamble = preamble::emit_preamble(&captured, &names, module_id);

    Ok((
        TransformOutput {
            code: with_preamble.text().to_string(),
            blocks: assemble_blocks(&extracted.goals),
        },
        diagnostics,
    ))
}

fn existing_identifiers(root: &SyntaxNode) -> Vec<String> {
    root.descendants_with_tokens()
        .filter_map(|e| e.into_token())
        .filter(|t| t.kind() == SyntaxKind::Id)
        .map(|t| t.text().to_string())
        .collect()
}

fn assemble_blocks(goals: &[GoalBlock]) -> Vec<Option<String>> {
    goals.iter().map(|goal| goal.description.clone()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transforms_a_trivial_goal_to_completion() {
        let source = "function f() {\nCOMEHERE: with (\"reached\") {\nlog(1);\n}\n}\n";
        let (output, diagnostics) = transform(source, "test.js").unwrap();
        assert!(!diagnostics.has_errors());
        assert_eq!(output.blocks, vec![Some("reached".to_string())]);
        assert!(!output.code.contains("COMEHERE"));
        assert!(output.code.contains("getWhichSeeking(\"test.js\")"));
    }

    #[test]
    fn rejects_source_with_parse_errors() {
        let result = transform("function f( {\n", "test.js");
        assert!(result.is_err());
    }

    #[test]
    fn gives_a_recursive_function_an_active_frame_bit() {
        let source = "function f(n) {\nif (n <= 1) return 1;\nf(n - 2);\nf(n - 1);\nCOMEHERE: with (n = 10) {\nlog(n);\n}\n}\n";
        let (output, diagnostics) = transform(source, "test.js").unwrap();
        assert!(!diagnostics.has_errors());
        assert!(output.code.contains("active_0"));
        assert!(output.code.contains("f(10)"));
    }

    #[test]
    fn rewrites_a_switch_case_discriminant() {
        let source = "switch (which) {\ncase 1:\nlog(1);\nbreak;\ncase 2:\nCOMEHERE: with (_) {\nlog(2);\n}\nbreak;\n}\n";
        let (output, diagnostics) = transform(source, "test.js").unwrap();
        assert!(!diagnostics.has_errors());
        assert!(output.code.contains("seek == 1 ?"));
        assert!(output.code.contains("case 2:"));
    }

    #[test]
    fn forces_a_throw_to_reach_a_catch_block_goal() {
        let source = "try {\nrisky();\n} catch (e) {\nCOMEHERE: with (_) {\nlog(e);\n}\n}\n";
        let (output, diagnostics) = transform(source, "test.js").unwrap();
        assert!(!diagnostics.has_errors());
        assert!(output.code.contains("throw new Error"));
    }
}
