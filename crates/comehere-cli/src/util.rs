use std::fs;
use std::io::{self, Read, Write};
use std::path::PathBuf;

use crate::cli::SourceArgs;

pub fn load_source(args: &SourceArgs) -> String {
    if let Some(text) = &args.source_text {
        return text.clone();
    }
    if let Some(path) = &args.source_file {
        if path.as_os_str() == "-" {
            let mut buf = String::new();
            io::stdin()
                .read_to_string(&mut buf)
                .expect("failed to read stdin");
            return buf;
        }
        return fs::read_to_string(path).expect("failed to read source file");
    }
    unreachable!("clap requires exactly one of --source/--source-file")
}

/// Falls back to the source file's path (or `"<inline>"` for `--source`/stdin)
/// when `--module-id` wasn't given explicitly.
pub fn resolve_module_id(explicit: &Option<String>, source: &SourceArgs) -> String {
    if let Some(id) = explicit {
        return id.clone();
    }
    match &source.source_file {
        Some(path) if path.as_os_str() != "-" => path.display().to_string(),
        _ => "<inline>".to_string(),
    }
}

pub fn write_output(output: &Option<PathBuf>, code: &str) {
    match output {
        Some(path) => fs::write(path, code).expect("failed to write output file"),
        None => io::stdout()
            .write_all(code.as_bytes())
            .expect("failed to write stdout"),
    }
}
