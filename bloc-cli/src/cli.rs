// Shared with build.rs, which generates shell completions from it: clap only.

use clap::{value_parser, Arg, ArgAction, ArgGroup, Command, ValueHint};
use std::path::PathBuf;

fn file_arg() -> Arg {
    Arg::new("file")
        .help("Path to the bloc script")
        .required(true)
        .index(1)
        .value_parser(value_parser!(PathBuf))
        .value_hint(ValueHint::FilePath)
}

fn format_arg() -> Arg {
    Arg::new("format")
        .long("format")
        .short('f')
        .help("Output format")
        .value_parser(["text", "json"])
        .default_value("text")
}

/// `--offset N`, or `--line L --column C` (both 1-based).
fn with_position(cmd: Command) -> Command {
    cmd.arg(
        Arg::new("offset")
            .long("offset")
            .short('o')
            .help("Byte offset in the file")
            .value_parser(value_parser!(usize)),
    )
    .arg(
        Arg::new("line")
            .long("line")
            .short('l')
            .help("Line number, starting at 1")
            .value_parser(value_parser!(usize))
            .requires("column"),
    )
    .arg(
        Arg::new("column")
            .long("column")
            .short('c')
            .help("Byte column on the line, starting at 1")
            .value_parser(value_parser!(usize))
            .requires("line"),
    )
    .group(
        ArgGroup::new("position")
            .args(["offset", "line"])
            .required(true),
    )
}

pub fn build_cli() -> Command {
    Command::new("bloc")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Structural queries on bloc scripts")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .arg(
            Arg::new("config")
                .long("config")
                .help("Configuration file layered over the defaults and ./bloc.toml")
                .global(true)
                .value_parser(value_parser!(PathBuf))
                .value_hint(ValueHint::FilePath),
        )
        .subcommand(
            Command::new("tokens")
                .about("List the tokens of a script")
                .arg(file_arg())
                .arg(format_arg()),
        )
        .subcommand(
            Command::new("indent")
                .about("Reindent a script")
                .arg(file_arg())
                .arg(
                    Arg::new("write")
                        .long("write")
                        .short('w')
                        .help("Rewrite the file instead of printing the result")
                        .action(ArgAction::SetTrue),
                )
                .arg(
                    Arg::new("indent-width")
                        .long("indent-width")
                        .help("Columns per indentation level")
                        .value_parser(value_parser!(u32).range(1..)),
                )
                .arg(
                    Arg::new("tabs")
                        .long("tabs")
                        .help("Indent with tabs")
                        .action(ArgAction::SetTrue),
                ),
        )
        .subcommand(with_position(
            Command::new("match")
                .about("Find the construct boundary matching the keyword at a position")
                .arg(file_arg()),
        ))
        .subcommand(with_position(
            Command::new("close")
                .about("Print the text that closes the innermost open construct")
                .arg(file_arg()),
        ))
        .subcommand(with_position(
            Command::new("context")
                .about("List the constructs open at a position, outermost first")
                .arg(file_arg())
                .arg(format_arg()),
        ))
        .subcommand(
            Command::new("highlight")
                .about("Print highlight spans")
                .arg(file_arg())
                .arg(format_arg()),
        )
        .subcommand(
            Command::new("names")
                .about("List bloc names and report begin/end pairs whose names differ")
                .arg(file_arg())
                .arg(format_arg()),
        )
        .subcommand(
            Command::new("check")
                .about("Run the configured linter on a script")
                .arg(file_arg())
                .arg(format_arg()),
        )
        .subcommand(Command::new("grammar").about("Print the block grammar's precedence relations"))
}
