mod cli;
mod commands;
mod util;

use clap::Parser;

use cli::{Cli, Command};

fn main() {
    let cli = Cli::parse();

    match cli.command {
        Command::Transform {
            source,
            module_id,
            goal,
            blocks,
            output,
            color,
        } => commands::transform::run(commands::transform::TransformArgs {
            source,
            module_id,
            goal,
            blocks,
            output,
            color: color.color.should_colorize(),
        }),
        Command::Ast { source, raw } => commands::ast::run(commands::ast::AstArgs { source, raw }),
        Command::Check {
            source,
            strict,
            color,
        } => commands::check::run(commands::check::CheckArgs {
            source,
            strict,
            color: color.color.should_colorize(),
        }),
    }
}
