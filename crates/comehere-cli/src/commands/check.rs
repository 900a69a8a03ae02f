//! `check`: parse a module and run only the diagnostic-producing parts of
//! the pipeline (parse errors, malformed COMEHERE initializers) without
//! performing the control-flow drive. Useful for editor tooling that wants
//! fast feedback without paying for a full rewrite.

use comehere_compiler::ast::parse;
use comehere_compiler::model::ActiveFrameRegistry;
use comehere_compiler::names::NameRegistry;
use comehere_compiler::passes::extractor::extract;
use comehere_core::{Diagnostics, NamePool};

use crate::cli::SourceArgs;
use crate::util::load_source;

pub struct CheckArgs {
    pub source: SourceArgs,
    pub strict: bool,
    pub color: bool,
}

pub fn run(args: CheckArgs) {
    let source = load_source(&args.source);

    let parsed = match parse(&source) {
        Ok(parsed) => parsed,
        Err(err) => {
            eprintln!("error: {err}");
            std::process::exit(1);
        }
    };

    let mut diagnostics = Diagnostics::new();
    diagnostics.extend(parsed.diagnostics);

    if !diagnostics.has_errors() {
        let mut names = NameRegistry::new(NamePool::new());
        let mut frames = ActiveFrameRegistry::new();
        let _ = extract(&parsed.root, &mut names, &mut frames, &mut diagnostics);
    }

    let is_valid = if args.strict {
        !diagnostics.has_errors() && !diagnostics.has_warnings()
    } else {
        !diagnostics.has_errors()
    };

    if !diagnostics.is_empty() {
        eprint!("{}", diagnostics.printer().colored(args.color).render());
    }

    if !is_valid {
        std::process::exit(1);
    }

    // Silent on success, like cargo check.
}
