use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

#[derive(Clone, Copy, Debug, Default, ValueEnum)]
pub enum ColorChoice {
    #[default]
    Auto,
    Always,
    Never,
}

impl ColorChoice {
    pub fn should_colorize(self) -> bool {
        match self {
            ColorChoice::Always => true,
            ColorChoice::Never => false,
            ColorChoice::Auto => std::io::IsTerminal::is_terminal(&std::io::stderr()),
        }
    }
}

#[derive(Parser)]
#[command(name = "comehere", bin_name = "comehere")]
#[command(about = "COMEHERE/capture-variable source-to-source rewriter")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Rewrite a module so every COMEHERE block is reachable
    #[command(after_help = r#"EXAMPLES:
  comehere transform -s app.js
  comehere transform -s app.js -o app.rewritten.js
  comehere transform -s app.js --goal 2
  comehere transform -s app.js --blocks"#)]
    Transform {
        #[command(flatten)]
        source: SourceArgs,

        /// Identifier passed to debugHooks.getWhichSeeking; defaults to the source path
        #[arg(long, value_name = "ID")]
        module_id: Option<String>,

        /// Simulate seeking this goal id by writing it into the preamble as a literal
        #[arg(long, value_name = "ID")]
        goal: Option<u32>,

        /// Print the per-goal description manifest (JSON) to stderr
        #[arg(long)]
        blocks: bool,

        /// Write the rewritten module here instead of stdout
        #[arg(short = 'o', long, value_name = "FILE")]
        output: Option<PathBuf>,

        #[command(flatten)]
        color: ColorArgs,
    },

    /// Dump the parsed syntax tree of a module
    #[command(after_help = r#"EXAMPLES:
  comehere ast -s app.js
  comehere ast -s app.js --raw"#)]
    Ast {
        #[command(flatten)]
        source: SourceArgs,

        /// Include trivia tokens (whitespace, comments) in the dump
        #[arg(long)]
        raw: bool,
    },

    /// Parse a module and report diagnostics without rewriting it
    #[command(after_help = r#"EXAMPLES:
  comehere check -s app.js
  comehere check -s app.js --strict"#)]
    Check {
        #[command(flatten)]
        source: SourceArgs,

        /// Treat warnings as failures too
        #[arg(long)]
        strict: bool,

        #[command(flatten)]
        color: ColorArgs,
    },
}

#[derive(Args)]
#[group(id = "source_input", multiple = false, required = true)]
pub struct SourceArgs {
    /// Source code as inline text
    #[arg(long = "source", value_name = "SOURCE")]
    pub source_text: Option<String>,

    /// Source code from file (use "-" for stdin)
    #[arg(short = 's', long = "source-file", value_name = "FILE")]
    pub source_file: Option<PathBuf>,
}

#[derive(Args)]
pub struct ColorArgs {
    /// Colorize diagnostics (auto-detected by default)
    #[arg(long, default_value = "auto", value_name = "WHEN")]
    pub color: ColorChoice,
}
