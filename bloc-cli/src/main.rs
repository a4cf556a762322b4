//! Command-line interface for bloc
//! Runs the structural queries an editor asks while a script is edited, on files.
//!
//! Usage:
//!   bloc tokens `<file>` [--format json]            - List tokens
//!   bloc indent `<file>` [--write]                  - Reindent
//!   bloc match `<file>` --offset N | --line L --column C
//!   bloc close `<file>` --offset N                  - Text closing the innermost construct
//!   bloc context `<file>` --offset N                - Constructs open at a position
//!   bloc highlight `<file>`                         - Highlight spans
//!   bloc names `<file>`                             - Bloc names and mismatched pairs
//!   bloc check `<file>`                             - Run the external linter
//!   bloc grammar                                    - Precedence relations

mod cli;

use anyhow::{bail, Context, Result};
use bloc_analysis::{CheckSession, Severity};
use bloc_config::{BlocConfig, Loader};
use bloc_syntax::bloc::grammar::BLOCK_TABLE;
use bloc_syntax::{default_trees, Engine, Highlighter};
use clap::ArgMatches;
use serde::Serialize;
use std::fs;
use std::path::PathBuf;
use tracing::debug;
use tracing_subscriber::EnvFilter;

const LOCAL_CONFIG: &str = "bloc.toml";

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let matches = cli::build_cli().get_matches();
    match matches.subcommand() {
        Some(("tokens", sub)) => handle_tokens_command(sub),
        Some(("indent", sub)) => handle_indent_command(sub),
        Some(("match", sub)) => handle_match_command(sub),
        Some(("close", sub)) => handle_close_command(sub),
        Some(("context", sub)) => handle_context_command(sub),
        Some(("highlight", sub)) => handle_highlight_command(sub),
        Some(("names", sub)) => handle_names_command(sub),
        Some(("check", sub)) => handle_check_command(sub),
        Some(("grammar", _)) => handle_grammar_command(),
        _ => bail!("no command given, see `bloc --help`"),
    }
}

/// Defaults, then `./bloc.toml` when present, then `--config`.
fn loader(matches: &ArgMatches) -> Loader {
    let loader = Loader::new().with_optional_file(LOCAL_CONFIG);
    match matches.get_one::<PathBuf>("config") {
        Some(path) => {
            debug!(path = %path.display(), "layering configuration file");
            loader.with_file(path)
        }
        None => loader,
    }
}

fn load_config(matches: &ArgMatches) -> Result<BlocConfig> {
    loader(matches)
        .build()
        .context("failed to load configuration")
}

fn engine(config: &BlocConfig) -> Engine {
    Engine::new(&config.syntax, config.engine.clone())
}

struct Script {
    path: PathBuf,
    source: String,
}

fn read_script(matches: &ArgMatches) -> Result<Script> {
    let path = matches
        .get_one::<PathBuf>("file")
        .context("a file is required")?
        .clone();
    let source =
        fs::read_to_string(&path).with_context(|| format!("cannot read {}", path.display()))?;
    Ok(Script { path, source })
}

fn json_output(matches: &ArgMatches) -> bool {
    matches
        .get_one::<String>("format")
        .is_some_and(|format| format == "json")
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Byte offset named by `--offset` or `--line`/`--column`.
fn position(matches: &ArgMatches, source: &str) -> Result<usize> {
    if let Some(&offset) = matches.get_one::<usize>("offset") {
        if offset > source.len() || !source.is_char_boundary(offset) {
            bail!("offset {offset} is not a character position of the file");
        }
        return Ok(offset);
    }
    let line = *matches.get_one::<usize>("line").context("a position is required")?;
    let column = *matches
        .get_one::<usize>("column")
        .context("--line needs --column")?;
    offset_at(source, line, column)
}

fn offset_at(source: &str, line: usize, column: usize) -> Result<usize> {
    if line == 0 || column == 0 {
        bail!("lines and columns start at 1");
    }
    let mut start = 0;
    for _ in 1..line {
        match source[start..].find('\n') {
            Some(newline) => start += newline + 1,
            None => bail!("line {line} is past the end of the file"),
        }
    }
    let end = source[start..].find('\n').map_or(source.len(), |i| start + i);
    let offset = start + column - 1;
    if offset > end || !source.is_char_boundary(offset) {
        bail!("column {column} is not on line {line}");
    }
    Ok(offset)
}

/// 1-based line and byte column of `offset`.
fn line_column(source: &str, offset: usize) -> (usize, usize) {
    let before = &source[..offset];
    let line = before.matches('\n').count() + 1;
    let column = offset - before.rfind('\n').map_or(0, |i| i + 1) + 1;
    (line, column)
}

fn handle_tokens_command(matches: &ArgMatches) -> Result<()> {
    let config = load_config(matches)?;
    let script = read_script(matches)?;
    let tokens = engine(&config).tokenize(&script.source);
    if json_output(matches) {
        return print_json(&tokens);
    }
    for token in &tokens {
        let (line, column) = line_column(&script.source, token.position());
        println!(
            "{line}:{column}\t{}\t{:?}",
            token.kind,
            token.text(&script.source)
        );
    }
    Ok(())
}

fn handle_indent_command(matches: &ArgMatches) -> Result<()> {
    let mut loader = loader(matches);
    if let Some(&width) = matches.get_one::<u32>("indent-width") {
        loader = loader.set_override("engine.indent_width", i64::from(width))?;
    }
    if matches.get_flag("tabs") {
        loader = loader.set_override("engine.use_tabs", true)?;
    }
    let config = loader.build().context("failed to load configuration")?;
    let script = read_script(matches)?;
    let indented = engine(&config).reindent(&script.source);

    if !matches.get_flag("write") {
        print!("{indented}");
        return Ok(());
    }
    if indented != script.source {
        fs::write(&script.path, indented)
            .with_context(|| format!("cannot write {}", script.path.display()))?;
        debug!(path = %script.path.display(), "reindented");
    }
    Ok(())
}

fn handle_match_command(matches: &ArgMatches) -> Result<()> {
    let config = load_config(matches)?;
    let script = read_script(matches)?;
    let at = position(matches, &script.source)?;
    let Some(other) = engine(&config).matching_boundary(&script.source, at) else {
        let (line, column) = line_column(&script.source, at);
        bail!("nothing matches the keyword at {line}:{column}");
    };
    let (line, column) = line_column(&script.source, other);
    println!("{line}:{column}\t{other}");
    Ok(())
}

fn handle_close_command(matches: &ArgMatches) -> Result<()> {
    let config = load_config(matches)?;
    let script = read_script(matches)?;
    let at = position(matches, &script.source)?;
    println!("{}", engine(&config).closing_text(&script.source, at)?);
    Ok(())
}

fn handle_context_command(matches: &ArgMatches) -> Result<()> {
    let config = load_config(matches)?;
    let script = read_script(matches)?;
    let at = position(matches, &script.source)?;
    let context = engine(&config).context_at(&script.source, at);
    if json_output(matches) {
        return print_json(&context);
    }
    for construct in &context.constructs {
        let (line, column) = line_column(&script.source, construct.position);
        println!("{line}:{column}\t{}", construct.kind);
    }
    Ok(())
}

fn handle_highlight_command(matches: &ArgMatches) -> Result<()> {
    let config = load_config(matches)?;
    let script = read_script(matches)?;
    let highlighter = Highlighter::new(&default_trees(), &config.syntax)?;
    let spans = highlighter.highlight(&script.source, 0..script.source.len());
    if json_output(matches) {
        return print_json(&spans);
    }
    for span in &spans {
        let (line, column) = line_column(&script.source, span.range.start);
        println!(
            "{line}:{column}\t{}\t{:?}",
            span.class,
            &script.source[span.range.clone()]
        );
    }
    Ok(())
}

fn handle_names_command(matches: &ArgMatches) -> Result<()> {
    let config = load_config(matches)?;
    let script = read_script(matches)?;
    let engine = engine(&config);
    let spans = engine.named_spans(&script.source);
    let mismatches = engine.name_mismatches(&script.source);
    if json_output(matches) {
        return print_json(&serde_json::json!({
            "names": spans,
            "mismatches": mismatches,
        }));
    }
    for span in &spans {
        let (line, column) = line_column(&script.source, span.range.start);
        println!("{line}:{column}\t{:?}\t{}", span.side, span.name);
    }
    for mismatch in &mismatches {
        let (line, column) = line_column(&script.source, mismatch.end.position());
        let (begin_line, _) = line_column(&script.source, mismatch.begin.position());
        eprintln!(
            "{}:{line}:{column}: `end {}` closes `begin {}` from line {begin_line}",
            script.path.display(),
            mismatch.found,
            mismatch.expected
        );
    }
    Ok(())
}

fn handle_check_command(matches: &ArgMatches) -> Result<()> {
    let config = load_config(matches)?;
    let script = read_script(matches)?;
    let runtime = tokio::runtime::Runtime::new().context("cannot start the async runtime")?;
    let diagnostics = runtime.block_on(async {
        let mut session = CheckSession::new(config.checker.options());
        let outcome = session.start(&script.source)?.wait().await?;
        anyhow::Ok(session.accept(outcome).unwrap_or_default())
    })?;

    if json_output(matches) {
        print_json(&diagnostics)?;
    } else {
        for diagnostic in &diagnostics {
            let (line, column) = line_column(&script.source, diagnostic.range.start);
            println!(
                "{}:{line}:{column}: {}: {}",
                script.path.display(),
                diagnostic.severity,
                diagnostic.message
            );
        }
    }
    if diagnostics.iter().any(|d| d.severity == Severity::Error) {
        std::process::exit(1);
    }
    Ok(())
}

fn handle_grammar_command() -> Result<()> {
    for (left, right, prec) in BLOCK_TABLE.relations() {
        println!("{:>10} {} {}", left.as_str(), prec.symbol(), right);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn line_and_column_round_trip() {
        let source = "sub a\n  x\n\nend sub";
        for offset in [0, 3, 6, 8, 10, 11, source.len()] {
            let (line, column) = line_column(source, offset);
            assert_eq!(offset_at(source, line, column).unwrap(), offset);
        }
        assert_eq!(line_column(source, 8), (2, 3));
    }

    #[test]
    fn positions_outside_the_file() {
        let source = "a\nbc\n";
        assert!(offset_at(source, 2, 4).is_err());
        assert_eq!(offset_at(source, 3, 1).unwrap(), 5);
        assert!(offset_at(source, 4, 1).is_err());
    }

    #[test]
    fn cli_definition_is_consistent() {
        cli::build_cli().debug_assert();
    }
}
