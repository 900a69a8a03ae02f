//! `transform`: rewrite a module so every COMEHERE block is reachable.

use std::path::PathBuf;

use comehere_compiler::transform;

use crate::cli::SourceArgs;
use crate::util::{load_source, resolve_module_id, write_output};

pub struct TransformArgs {
    pub source: SourceArgs,
    pub module_id: Option<String>,
    pub goal: Option<u32>,
    pub blocks: bool,
    pub output: Option<PathBuf>,
    pub color: bool,
}

pub fn run(args: TransformArgs) {
    let source = load_source(&args.source);
    let module_id = resolve_module_id(&args.module_id, &args.source);

    let (mut output, diagnostics) = match transform(&source, &module_id) {
        Ok(ok) => ok,
        Err(err) => {
            eprintln!("error: {err}");
            std::process::exit(1);
        }
    };

    if !diagnostics.is_empty() {
        eprintln!("{}", diagnostics.printer().colored(args.color).render());
    }
    if diagnostics.has_errors() {
        std::process::exit(1);
    }

    if let Some(goal) = args.goal {
        output.code = simulate_goal(&output.code, goal);
    }

    if args.blocks {
        let manifest = serde_json::to_string_pretty(&output.blocks).expect("blocks manifest must serialize");
        eprintln!("{manifest}");
    }

    write_output(&args.output, &output.code);
}

/// Replaces the emitted `= host.debugHooks?.getWhichSeeking(...) || 0;`
/// initializer with a literal, so the driven code for a specific goal can
/// be inspected without a host runtime.
fn simulate_goal(code: &str, goal: u32) -> String {
    code.lines()
        .map(|line| match line.find("host.debugHooks") {
            Some(_) => {
                let assign_at = line.find('=').expect("getWhichSeeking line always has an assignment");
                format!("{}= {goal};", &line[..assign_at])
            }
            None => line.to_string(),
        })
        .collect::<Vec<_>>()
        .join("\n")
        + "\n"
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rewrites_the_seek_initializer_to_a_literal() {
        let code = "let seek = host.debugHooks?.getWhichSeeking(\"m\") || 0;\nfunction f() {}\n";
        let out = simulate_goal(code, 3);
        assert!(out.contains("let seek = 3;"));
        assert!(out.contains("function f() {}"));
    }
}
